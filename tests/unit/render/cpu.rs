use super::*;

#[test]
fn empty_plan_is_white_paper() {
    let mut r = CpuRasterizer::new();
    let bmp = r.rasterize(&MarkPlan::empty(16, 9)).unwrap();
    assert_eq!(bmp.dims(), (16, 9));
    assert!(bmp.pixels().chunks_exact(4).all(|px| px == [255, 255, 255, 255]));
}

#[test]
fn vertical_line_inks_its_column_only() {
    let mut plan = MarkPlan::empty(20, 20);
    plan.marks.push(Mark::Line {
        from: Point::new(10.0, 2.0),
        to: Point::new(10.0, 18.0),
        width: 4.0,
        color: Rgb8::BLACK,
    });
    let bmp = CpuRasterizer::new().rasterize(&plan).unwrap();
    assert_eq!(bmp.pixel(9, 10), Some([0, 0, 0, 255]));
    assert_eq!(bmp.pixel(10, 10), Some([0, 0, 0, 255]));
    assert_eq!(bmp.pixel(2, 10), Some([255, 255, 255, 255]));
    assert_eq!(bmp.pixel(17, 10), Some([255, 255, 255, 255]));
}

#[test]
fn circle_fills_with_mark_color() {
    let mut plan = MarkPlan::empty(20, 20);
    plan.marks.push(Mark::Circle {
        center: Point::new(10.0, 10.0),
        radius: 5.0,
        color: Rgb8::new(200, 10, 10),
    });
    let bmp = CpuRasterizer::new().rasterize(&plan).unwrap();
    assert_eq!(bmp.pixel(10, 10), Some([200, 10, 10, 255]));
    assert_eq!(bmp.pixel(0, 0), Some([255, 255, 255, 255]));
}

#[test]
fn context_is_reused_across_sizes() {
    let mut r = CpuRasterizer::new();
    let a = r.rasterize(&MarkPlan::empty(8, 8)).unwrap();
    let b = r.rasterize(&MarkPlan::empty(12, 4)).unwrap();
    let c = r.rasterize(&MarkPlan::empty(8, 8)).unwrap();
    assert_eq!(a, c);
    assert_eq!(b.dims(), (12, 4));
}

#[test]
fn oversized_canvas_is_rejected() {
    let err = CpuRasterizer::new()
        .rasterize(&MarkPlan::empty(70_000, 1))
        .unwrap_err();
    assert!(err.to_string().contains("exceeds u16"));
}

#[test]
fn unpremultiply_restores_straight_color() {
    let mut px = vec![64u8, 0, 128, 128];
    unpremultiply_rgba8_in_place(&mut px);
    assert_eq!(px, vec![128, 0, 255, 128]);
}
