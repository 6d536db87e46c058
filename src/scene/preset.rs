use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;

use anyhow::Context;
use serde_json::Value;

use crate::foundation::error::{RasterError, RasterResult};
use crate::scene::params::{EffectMode, EffectParameters, PreprocessParams, StillParams, load_json};

/// Built-in starting point for `mode`.
pub fn builtin_preset(mode: EffectMode) -> StillParams {
    let base = StillParams::default();
    match mode {
        EffectMode::Raster | EffectMode::None => StillParams {
            effect: EffectParameters {
                mode,
                use_original_color: true,
                use_decoration: false,
                ..base.effect
            },
            show_effect: true,
            ..base
        },
        EffectMode::Dots => StillParams {
            preprocess: PreprocessParams {
                blur_radius: 0.0,
                grain_amount: 0.0,
                gamma: 1.4,
                black_point: 0.0,
                white_point: 255.0,
            },
            effect: EffectParameters {
                mode,
                threshold: 255,
                grid_columns: 78,
                grid_rows: 78,
                min_size: 1.7,
                max_size: 7.1,
                angle_degrees: 95.0,
                use_original_color: true,
                use_decoration: false,
                ..base.effect
            },
            show_effect: true,
            ..base
        },
        EffectMode::Texture => StillParams {
            preprocess: PreprocessParams {
                blur_radius: 0.0,
                grain_amount: 0.0,
                gamma: 1.7,
                black_point: 25.0,
                white_point: 230.0,
            },
            effect: EffectParameters {
                mode,
                threshold: 255,
                grid_columns: 110,
                grid_rows: 120,
                min_size: 0.6,
                max_size: 4.5,
                angle_degrees: 0.0,
                use_original_color: true,
                use_decoration: false,
                ..base.effect
            },
            show_effect: true,
            ..base
        },
    }
}

/// Keyed store of saved still settings, one entry per effect mode.
///
/// Entries may be partial: [`PresetStore::resolve`] overlays them on the built-in preset, so
/// fields missing from a saved entry keep their built-in values.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PresetStore {
    entries: BTreeMap<String, Value>,
}

impl PresetStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a store from JSON (`{"raster": {...}, "dots": {...}}`).
    pub fn from_reader<R: std::io::Read>(r: R) -> RasterResult<Self> {
        let entries: BTreeMap<String, Value> = load_json(r, "preset store")?;
        for (key, value) in &entries {
            if !value.is_object() {
                return Err(RasterError::validation(format!(
                    "preset '{key}' must be a JSON object"
                )));
            }
        }
        Ok(Self { entries })
    }

    /// Load a store file; a missing file yields an empty store.
    pub fn from_path(path: impl AsRef<Path>) -> RasterResult<Self> {
        let path = path.as_ref();
        match std::fs::File::open(path) {
            Ok(f) => Self::from_reader(std::io::BufReader::new(f)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::new()),
            Err(e) => Err(RasterError::validation(format!(
                "open preset store '{}': {e}",
                path.display()
            ))),
        }
    }

    /// Serialize the store as pretty JSON.
    pub fn to_writer<W: Write>(&self, w: W) -> RasterResult<()> {
        serde_json::to_writer_pretty(w, &self.entries)
            .map_err(|e| RasterError::serde(format!("write preset store JSON: {e}")))
    }

    /// Write the store to `path`, replacing any previous file.
    pub fn save_to_path(&self, path: impl AsRef<Path>) -> RasterResult<()> {
        let path = path.as_ref();
        let f = std::fs::File::create(path)
            .with_context(|| format!("create preset store '{}'", path.display()))?;
        self.to_writer(std::io::BufWriter::new(f))
    }

    /// Remember `params` under its effect mode.
    pub fn save(&mut self, params: &StillParams) -> RasterResult<()> {
        let value = serde_json::to_value(params)
            .map_err(|e| RasterError::serde(format!("encode preset: {e}")))?;
        self.entries
            .insert(params.effect.mode.as_str().to_owned(), value);
        Ok(())
    }

    /// Forget the saved entry for `mode`.
    pub fn remove(&mut self, mode: EffectMode) -> bool {
        self.entries.remove(mode.as_str()).is_some()
    }

    /// `true` when a saved entry exists for `mode`.
    pub fn contains(&self, mode: EffectMode) -> bool {
        self.entries.contains_key(mode.as_str())
    }

    /// Saved entry for `mode` merged over its built-in preset.
    pub fn resolve(&self, mode: EffectMode) -> RasterResult<StillParams> {
        let builtin = builtin_preset(mode);
        let Some(saved) = self.entries.get(mode.as_str()) else {
            return Ok(builtin);
        };
        let mut merged = serde_json::to_value(&builtin)
            .map_err(|e| RasterError::serde(format!("encode preset: {e}")))?;
        merge_over(&mut merged, saved);
        let mut out: StillParams = serde_json::from_value(merged).map_err(|e| {
            RasterError::serde(format!("decode preset '{}': {e}", mode.as_str()))
        })?;
        out.effect.mode = mode;
        Ok(out)
    }
}

fn merge_over(base: &mut Value, patch: &Value) {
    match (base, patch) {
        (Value::Object(base), Value::Object(patch)) => {
            for (k, v) in patch {
                match base.get_mut(k) {
                    Some(slot) => merge_over(slot, v),
                    None => {
                        base.insert(k.clone(), v.clone());
                    }
                }
            }
        }
        (slot, v) => *slot = v.clone(),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/preset.rs"]
mod tests;
