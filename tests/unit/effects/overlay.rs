use super::*;
use crate::foundation::core::Rgb8;

fn grid(n: u32, d: u32, dir: ScanDirection) -> MotionParameters {
    MotionParameters {
        frame_count: n,
        line_density_pixels: d,
        scan_direction: dir,
        grid_opacity: 1.0,
        ..MotionParameters::default()
    }
}

#[test]
fn bands_repeat_with_period_density_times_frames() {
    let p = grid(4, 5, ScanDirection::Horizontal);
    let bands = overlay_bands(&p, 100.0, 100.0);
    assert!(bands.len() >= 2);
    for pair in bands.windows(2) {
        assert_eq!(pair[1].y0 - pair[0].y0, 20.0);
    }
    assert_eq!(bands[0], Rect::new(0.0, 5.0, 100.0, 20.0));
}

#[test]
fn vertical_bands_span_full_height() {
    let p = grid(3, 4, ScanDirection::Vertical);
    let bands = overlay_bands(&p, 30.0, 7.0);
    assert_eq!(bands[0], Rect::new(4.0, 0.0, 12.0, 7.0));
    assert_eq!(bands[1], Rect::new(16.0, 0.0, 24.0, 7.0));
    // last band clipped to the canvas
    assert_eq!(bands[2], Rect::new(28.0, 0.0, 30.0, 7.0));
}

#[test]
fn single_frame_overlay_is_fully_opaque() {
    let p = grid(1, 10, ScanDirection::Horizontal);
    let bmp = render_overlay(&p, 8, 8).unwrap();
    assert!(bmp.pixels().chunks_exact(4).all(|px| px[3] == 255));
}

#[test]
fn rendered_rows_follow_the_band_pattern() {
    let mut p = grid(2, 3, ScanDirection::Horizontal);
    p.ink_color = Rgb8::new(10, 20, 30);
    let bmp = render_overlay(&p, 4, 12).unwrap();
    let alpha: Vec<u8> = (0..12).map(|y| bmp.pixel(0, y).unwrap()[3]).collect();
    assert_eq!(alpha, vec![0, 0, 0, 255, 255, 255, 0, 0, 0, 255, 255, 255]);
    assert_eq!(bmp.pixel(2, 4), Some([10, 20, 30, 255]));
}

#[test]
fn opacity_sets_band_alpha() {
    let mut p = grid(2, 1, ScanDirection::Vertical);
    p.grid_opacity = 0.9;
    let bmp = render_overlay(&p, 4, 1).unwrap();
    assert_eq!(bmp.pixel(1, 0).unwrap()[3], 230);
    assert_eq!(bmp.pixel(0, 0).unwrap()[3], 0);
}

#[test]
fn scaled_overlay_multiplies_geometry() {
    let p = grid(2, 2, ScanDirection::Vertical);
    let bmp = render_overlay_scaled(&p, 8, 2, 3).unwrap();
    assert_eq!(bmp.dims(), (24, 6));
    // band [2, 4) at 1x becomes [6, 12) at 3x
    assert_eq!(bmp.pixel(5, 0).unwrap()[3], 0);
    assert_eq!(bmp.pixel(6, 0).unwrap()[3], 255);
    assert_eq!(bmp.pixel(11, 5).unwrap()[3], 255);
    assert_eq!(bmp.pixel(12, 5).unwrap()[3], 0);
    assert!(render_overlay_scaled(&p, 8, 2, 0).is_err());
}

#[test]
fn document_has_one_rect_per_band() {
    let p = grid(4, 5, ScanDirection::Horizontal);
    let doc = overlay_document(&p, 50, 50);
    let svg = doc.to_svg_string();
    assert_eq!(svg.matches("<rect").count(), overlay_bands(&p, 50.0, 50.0).len());
}

#[test]
fn flatten_blends_partial_alpha_over_opaque_base() {
    let base = Bitmap::white(1, 1).unwrap();
    let top = Bitmap::from_rgba8(1, 1, vec![0, 0, 0, 128]).unwrap();
    let out = flatten_over(&base, &top).unwrap();
    let px = out.pixel(0, 0).unwrap();
    assert_eq!(px[3], 255);
    assert!((126..=128).contains(&px[0]));
    assert!(flatten_over(&base, &Bitmap::white(2, 1).unwrap()).is_err());
}
