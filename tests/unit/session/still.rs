use super::*;
use crate::scene::params::EffectParameters;

fn gray(w: u32, h: u32, v: u8) -> Bitmap {
    Bitmap::filled(w, h, [v, v, v, 255]).unwrap()
}

fn small_params(mode: EffectMode) -> StillParams {
    StillParams {
        effect: EffectParameters {
            mode,
            grid_columns: 12,
            grid_rows: 6,
            ..EffectParameters::default()
        },
        canvas_percent: 20,
        ..StillParams::default()
    }
}

fn session(params: StillParams) -> StillSession {
    StillSession::with_rng(params, fastrand::Rng::with_seed(7)).unwrap()
}

fn has_ink(bmp: &Bitmap) -> bool {
    bmp.pixels()
        .chunks_exact(4)
        .any(|px| px[..3] != [255, 255, 255])
}

#[test]
fn canvas_keeps_aspect_on_long_side() {
    assert_eq!(fit_canvas(1200, 600, 100).unwrap(), (600, 300));
    assert_eq!(fit_canvas(300, 600, 50).unwrap(), (150, 300));
    assert_eq!(fit_canvas(10, 10, 200).unwrap(), (1200, 1200));
    assert!(fit_canvas(10, 10, 0).is_err());
    assert!(fit_canvas(0, 10, 100).is_err());
}

#[test]
fn tiers_switch_at_cell_limits() {
    assert_eq!(preview_tier(20_000), PreviewTier::Full);
    assert_eq!(preview_tier(20_001), PreviewTier::Lightweight);
    assert_eq!(preview_tier(40_000), PreviewTier::Lightweight);
    assert_eq!(preview_tier(40_001), PreviewTier::Skip);
    assert_eq!(preview_grid_cap(EffectMode::Raster), 120);
    assert_eq!(preview_grid_cap(EffectMode::Dots), 100);
    assert_eq!(preview_grid_cap(EffectMode::Texture), 80);
}

#[test]
fn nothing_renders_without_a_source() {
    let mut s = session(small_params(EffectMode::Raster));
    assert!(s.render_full().unwrap().is_none());
    assert!(s.export(OutputFormat::Png).unwrap().is_none());
    assert!(s.canvas_size().unwrap().is_none());
}

#[test]
fn full_render_uses_fitted_canvas_and_caches() {
    let mut s = session(small_params(EffectMode::Raster));
    s.set_source(gray(200, 100, 90)).unwrap();
    assert_eq!(s.canvas_size().unwrap(), Some((120, 60)));
    let out = s.render_full().unwrap().unwrap();
    assert_eq!(out.dims(), (120, 60));
    assert!(has_ink(&out));
    assert_eq!(s.last_result(), Some(&out));
}

#[test]
fn bright_source_above_threshold_stays_white() {
    let mut s = session(small_params(EffectMode::Dots));
    s.set_source(gray(50, 50, 255)).unwrap();
    let out = s.render_full().unwrap().unwrap();
    assert!(!has_ink(&out));
}

#[test]
fn hidden_effect_outputs_preprocessed_source() {
    let mut params = small_params(EffectMode::Raster);
    params.show_effect = false;
    let mut s = session(params);
    s.set_source(gray(60, 60, 90)).unwrap();
    let out = s.render_full().unwrap().unwrap();
    assert_eq!(out.dims(), (120, 120));
    assert_eq!(out.pixel(5, 5), Some([90, 90, 90, 255]));
}

#[test]
fn param_changes_drop_the_cache_only_when_different() {
    let params = small_params(EffectMode::Raster);
    let mut s = session(params.clone());
    s.set_source(gray(40, 40, 90)).unwrap();
    s.render_full().unwrap();
    s.set_params(params.clone()).unwrap();
    assert!(s.last_result().is_some());

    let mut changed = params;
    changed.effect.threshold = 10;
    s.set_params(changed).unwrap();
    assert!(s.last_result().is_none());
}

#[test]
fn resize_view_scales_cached_result_without_touching_params() {
    let mut s = session(small_params(EffectMode::Raster));
    s.set_source(gray(200, 100, 90)).unwrap();
    s.render_full().unwrap();
    let view = s.resize_view(10).unwrap().unwrap();
    assert_eq!(view.dims(), (60, 30));
    assert_eq!(s.params().canvas_percent, 20);
    assert_eq!(s.last_result().map(Bitmap::dims), Some((120, 60)));
}

#[test]
fn resize_view_renders_when_nothing_is_cached() {
    let mut s = session(small_params(EffectMode::Raster));
    s.set_source(gray(100, 100, 90)).unwrap();
    let view = s.resize_view(10).unwrap().unwrap();
    assert_eq!(view.dims(), (60, 60));
    assert!(s.last_result().is_some());
}

#[test]
fn svg_export_matches_marks() {
    let mut s = session(small_params(EffectMode::Raster));
    s.set_source(gray(40, 40, 90)).unwrap();
    let Some(StillExport::Svg(svg)) = s.export(OutputFormat::Svg).unwrap() else {
        panic!("expected svg export");
    };
    assert_eq!(svg.matches("<line").count(), 12 * 6);
}

#[test]
fn svg_export_without_marks_is_background_only() {
    let mut s = session(small_params(EffectMode::None));
    s.set_source(gray(40, 40, 90)).unwrap();
    let Some(StillExport::Svg(svg)) = s.export(OutputFormat::Svg).unwrap() else {
        panic!("expected svg export");
    };
    assert!(svg.contains(r#"fill="white""#));
    assert!(!svg.contains("<line"));
    assert!(!svg.contains("<circle"));
}

#[test]
fn png_export_decodes_back_to_canvas_size() {
    let mut s = session(small_params(EffectMode::Texture));
    s.set_source(gray(40, 20, 60)).unwrap();
    let Some(StillExport::Png(bytes)) = s.export(OutputFormat::Png).unwrap() else {
        panic!("expected png export");
    };
    let back = crate::assets::decode::decode_image(&bytes).unwrap();
    assert_eq!(back.dims(), (120, 60));
}

#[test]
fn dense_grids_skip_interactive_updates() {
    let mut params = small_params(EffectMode::Raster);
    params.effect.grid_columns = 300;
    params.effect.grid_rows = 300;
    let mut s = session(params);
    s.set_source(gray(40, 40, 90)).unwrap();
    assert!(s.render_interactive().unwrap().is_none());
}

#[test]
fn mid_density_grids_use_the_capped_preview() {
    let mut params = small_params(EffectMode::Raster);
    params.effect.grid_columns = 150;
    params.effect.grid_rows = 150;
    let mut s = session(params);
    s.set_source(gray(40, 40, 90)).unwrap();
    let out = s.render_interactive().unwrap().unwrap();
    assert_eq!(out.dims(), (120, 120));
    assert!(s.last_result().is_none());
}

#[test]
fn transparent_source_reads_as_paper() {
    let clear = Bitmap::filled(600, 600, [0, 0, 0, 0]).unwrap();
    let mut sess = session(StillParams {
        canvas_percent: 20,
        ..StillParams::default()
    });
    sess.set_source(clear).unwrap();
    let doc = sess.vector_document().unwrap().unwrap();
    assert!(doc.primitives().is_empty());
    assert!(!has_ink(&sess.render_full().unwrap().unwrap()));
    assert!(!has_ink(&sess.render_preview().unwrap().unwrap()));
}

#[test]
fn half_transparent_source_is_lightened_by_paper() {
    let mut sess = session(StillParams {
        show_effect: false,
        canvas_percent: 1,
        ..StillParams::default()
    });
    sess.set_source(Bitmap::filled(10, 10, [0, 0, 0, 128]).unwrap())
        .unwrap();
    let out = sess.render_full().unwrap().unwrap();
    let px = out.pixel(0, 0).unwrap();
    assert_eq!(px[3], 255);
    assert!((126..=128).contains(&px[0]), "got {px:?}");
}

#[test]
fn texture_preset_on_tiny_canvas_leaves_white_paper_clean() {
    let params = StillParams {
        canvas_percent: 10,
        ..crate::scene::preset::builtin_preset(EffectMode::Texture)
    };
    let mut sess = session(params);
    sess.set_source(Bitmap::white(600, 600).unwrap()).unwrap();
    let out = sess.render_full().unwrap().unwrap();
    assert_eq!(out.dims(), (60, 60));
    assert!(!has_ink(&out));
}
