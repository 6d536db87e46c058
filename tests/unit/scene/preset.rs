use super::*;

#[test]
fn dots_builtin_matches_tool_preset() {
    let p = builtin_preset(EffectMode::Dots);
    assert_eq!(p.effect.grid_columns, 78);
    assert_eq!(p.effect.grid_rows, 78);
    assert_eq!(p.effect.threshold, 255);
    assert!((p.preprocess.gamma - 1.4).abs() < 1e-12);
    assert!((p.effect.min_size - 1.7).abs() < 1e-12);
    assert!((p.effect.max_size - 7.1).abs() < 1e-12);
}

#[test]
fn texture_builtin_sets_levels() {
    let p = builtin_preset(EffectMode::Texture);
    assert_eq!(p.preprocess.black_point, 25.0);
    assert_eq!(p.preprocess.white_point, 230.0);
    assert_eq!((p.effect.grid_columns, p.effect.grid_rows), (110, 120));
}

#[test]
fn resolve_without_entry_is_builtin() {
    let store = PresetStore::new();
    assert_eq!(
        store.resolve(EffectMode::Raster).unwrap(),
        builtin_preset(EffectMode::Raster)
    );
}

#[test]
fn partial_entry_merges_over_builtin() {
    let store = PresetStore::from_reader(
        r#"{"raster": {"effect": {"threshold": 90}, "preprocess": {"gamma": 2.0}}}"#.as_bytes(),
    )
    .unwrap();
    let p = store.resolve(EffectMode::Raster).unwrap();
    assert_eq!(p.effect.threshold, 90);
    assert_eq!(p.preprocess.gamma, 2.0);
    assert_eq!(
        p.effect.grid_columns,
        builtin_preset(EffectMode::Raster).effect.grid_columns
    );
    assert!(p.effect.use_original_color);
}

#[test]
fn save_then_reload_through_json() {
    let mut store = PresetStore::new();
    let mut params = builtin_preset(EffectMode::Dots);
    params.effect.use_decoration = true;
    store.save(&params).unwrap();
    assert!(store.contains(EffectMode::Dots));

    let mut buf = Vec::new();
    store.to_writer(&mut buf).unwrap();
    let back = PresetStore::from_reader(buf.as_slice()).unwrap();
    assert_eq!(back.resolve(EffectMode::Dots).unwrap(), params);
}

#[test]
fn non_object_entries_are_rejected() {
    assert!(PresetStore::from_reader(r#"{"raster": 3}"#.as_bytes()).is_err());
}

#[test]
fn missing_store_file_is_empty() {
    let store = PresetStore::from_path("/nonexistent/rasterline/presets.json").unwrap();
    assert_eq!(store, PresetStore::new());
}
