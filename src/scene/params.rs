use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::foundation::core::Rgb8;
use crate::foundation::error::{RasterError, RasterResult};

/// Which mark family the still pipeline draws.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EffectMode {
    /// Angled parallel line segments, one per cell.
    #[default]
    Raster,
    /// Circles, optionally with four decorative satellites.
    Dots,
    /// Noise-steered curved strokes.
    Texture,
    /// No marks; the preprocessed bitmap is the output.
    None,
}

impl EffectMode {
    /// Stable lowercase name, also the preset key.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Raster => "raster",
            Self::Dots => "dots",
            Self::Texture => "texture",
            Self::None => "none",
        }
    }
}

/// Export encoding for still renders.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Raster PNG.
    #[default]
    Png,
    /// Vector SVG text.
    Svg,
}

/// Tone adjustments applied to the source before sampling.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PreprocessParams {
    /// Gaussian blur sigma in pixels; `0` disables.
    pub blur_radius: f64,
    /// Film grain strength; `0` disables.
    pub grain_amount: f64,
    /// Power applied to normalized channels.
    pub gamma: f64,
    /// Input level mapped to 0.
    pub black_point: f64,
    /// Input level mapped to 255.
    pub white_point: f64,
}

impl Default for PreprocessParams {
    fn default() -> Self {
        Self {
            blur_radius: 0.0,
            grain_amount: 0.0,
            gamma: 1.0,
            black_point: 0.0,
            white_point: 255.0,
        }
    }
}

impl PreprocessParams {
    /// Reject non-finite values and clamp to usable ranges.
    pub fn normalized(&self) -> RasterResult<Self> {
        for (name, v) in [
            ("blurRadius", self.blur_radius),
            ("grainAmount", self.grain_amount),
            ("gamma", self.gamma),
            ("blackPoint", self.black_point),
            ("whitePoint", self.white_point),
        ] {
            if !v.is_finite() {
                return Err(RasterError::validation(format!("{name} must be finite")));
            }
        }
        if self.gamma <= 0.0 {
            return Err(RasterError::validation("gamma must be > 0"));
        }
        Ok(Self {
            blur_radius: self.blur_radius.max(0.0),
            grain_amount: self.grain_amount.max(0.0),
            gamma: self.gamma,
            black_point: self.black_point.clamp(0.0, 255.0),
            white_point: self.white_point.clamp(0.0, 255.0),
        })
    }

    /// `true` when the levels stage would change pixels.
    pub fn has_levels(&self) -> bool {
        self.black_point != 0.0 || self.white_point != 255.0
    }
}

/// Cell grid, inclusion threshold and mark styling for the still pipeline.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EffectParameters {
    /// Mark family.
    pub mode: EffectMode,
    /// A cell is drawn when its brightness is strictly below this (`0..=256`).
    pub threshold: u16,
    /// Cells across.
    pub grid_columns: u32,
    /// Cells down.
    pub grid_rows: u32,
    /// Mark size for white cells, before canvas scaling.
    pub min_size: f64,
    /// Mark size for black cells, before canvas scaling.
    pub max_size: f64,
    /// Raster line angle; `0` is vertical, positive turns clockwise.
    pub angle_degrees: f64,
    /// Paint each mark with its cell's mean color instead of `ink_color`.
    pub use_original_color: bool,
    /// Add halftone satellites around dots.
    pub use_decoration: bool,
    /// Export encoding.
    pub output_format: OutputFormat,
    /// Flat mark color when not using original colors.
    pub ink_color: Rgb8,
    /// Above this many cells the texture effect draws fewer, straight strokes.
    pub texture_performance_cells: u64,
}

impl Default for EffectParameters {
    fn default() -> Self {
        Self {
            mode: EffectMode::Raster,
            threshold: 200,
            grid_columns: 60,
            grid_rows: 60,
            min_size: 0.5,
            max_size: 4.0,
            angle_degrees: 0.0,
            use_original_color: true,
            use_decoration: false,
            output_format: OutputFormat::Png,
            ink_color: Rgb8::BLACK,
            texture_performance_cells: 25_000,
        }
    }
}

impl EffectParameters {
    /// Highest meaningful threshold: every cell drawn.
    pub const MAX_THRESHOLD: u16 = 256;

    /// Validate the grid and threshold, and reorder `min_size`/`max_size` when inverted.
    pub fn normalized(&self) -> RasterResult<Self> {
        if self.grid_columns == 0 || self.grid_rows == 0 {
            return Err(RasterError::validation(
                "gridColumns and gridRows must be >= 1",
            ));
        }
        if self.threshold > Self::MAX_THRESHOLD {
            return Err(RasterError::validation(format!(
                "threshold must be in 0..={}",
                Self::MAX_THRESHOLD
            )));
        }
        for (name, v) in [
            ("minSize", self.min_size),
            ("maxSize", self.max_size),
            ("angleDegrees", self.angle_degrees),
        ] {
            if !v.is_finite() {
                return Err(RasterError::validation(format!("{name} must be finite")));
            }
        }
        let mut out = self.clone();
        if out.min_size > out.max_size {
            std::mem::swap(&mut out.min_size, &mut out.max_size);
        }
        out.min_size = out.min_size.max(0.0);
        out.max_size = out.max_size.max(0.0);
        Ok(out)
    }

    /// Total cell count.
    pub fn cell_count(&self) -> u64 {
        u64::from(self.grid_columns) * u64::from(self.grid_rows)
    }
}

/// Full parameter record of a still render.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StillParams {
    /// Tone adjustments.
    pub preprocess: PreprocessParams,
    /// Effect settings.
    pub effect: EffectParameters,
    /// When `false`, output the preprocessed bitmap without marks.
    pub show_effect: bool,
    /// Canvas long side as a percentage of 600 px.
    pub canvas_percent: u32,
}

impl Default for StillParams {
    fn default() -> Self {
        Self {
            preprocess: PreprocessParams::default(),
            effect: EffectParameters::default(),
            show_effect: true,
            canvas_percent: 100,
        }
    }
}

impl StillParams {
    /// Parse from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> RasterResult<Self> {
        load_json(r, "still parameters")
    }

    /// Parse from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> RasterResult<Self> {
        open_json(path.as_ref(), "still parameters")
    }

    /// Normalize every nested record.
    pub fn normalized(&self) -> RasterResult<Self> {
        if self.canvas_percent == 0 {
            return Err(RasterError::validation("canvasPercent must be >= 1"));
        }
        Ok(Self {
            preprocess: self.preprocess.normalized()?,
            effect: self.effect.normalized()?,
            show_effect: self.show_effect,
            canvas_percent: self.canvas_percent,
        })
    }

    /// `true` when marks are drawn at all.
    pub fn draws_marks(&self) -> bool {
        self.show_effect && self.effect.mode != EffectMode::None
    }
}

/// Axis along which barrier-grid bands repeat.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanDirection {
    /// Horizontal bands; frames alternate down the y axis.
    #[default]
    Horizontal,
    /// Vertical bands; frames alternate along the x axis.
    Vertical,
}

/// Settings of the multi-frame (scanimation) pipeline.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MotionParameters {
    /// Frames pulled from the video.
    pub frame_count: u32,
    /// Seconds between sampled frames.
    pub frame_interval_seconds: f64,
    /// Width of one frame's strip, in pixels.
    pub line_density_pixels: u32,
    /// Ink strength multiplier in `0..=1`.
    pub line_thickness_ratio: f64,
    /// Per-frame shift orthogonal to the scan axis, in pixels.
    pub x_offset_per_frame: f64,
    /// Interlace strips (`true`) or multiply all frames together (`false`).
    pub interlace_mode: bool,
    /// Invert brightness before inking.
    pub invert_mask: bool,
    /// Strip orientation.
    pub scan_direction: ScanDirection,
    /// Ink color of raster and overlay.
    pub ink_color: Rgb8,
    /// Overlay band alpha for on-screen display.
    pub grid_opacity: f64,
    /// Whether the display composite includes the overlay.
    pub show_overlay: bool,
}

impl Default for MotionParameters {
    fn default() -> Self {
        Self {
            frame_count: 8,
            frame_interval_seconds: 0.5,
            line_density_pixels: 10,
            line_thickness_ratio: 0.5,
            x_offset_per_frame: 2.0,
            interlace_mode: true,
            invert_mask: false,
            scan_direction: ScanDirection::Horizontal,
            ink_color: Rgb8::BLACK,
            grid_opacity: 0.9,
            show_overlay: true,
        }
    }
}

impl MotionParameters {
    /// Parse from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> RasterResult<Self> {
        load_json(r, "motion parameters")
    }

    /// Parse from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> RasterResult<Self> {
        open_json(path.as_ref(), "motion parameters")
    }

    /// Reject non-finite values and clamp ratios into `0..=1`.
    pub fn normalized(&self) -> RasterResult<Self> {
        for (name, v) in [
            ("frameIntervalSeconds", self.frame_interval_seconds),
            ("lineThicknessRatio", self.line_thickness_ratio),
            ("xOffsetPerFrame", self.x_offset_per_frame),
            ("gridOpacity", self.grid_opacity),
        ] {
            if !v.is_finite() {
                return Err(RasterError::validation(format!("{name} must be finite")));
            }
        }
        let mut out = self.clone();
        out.frame_interval_seconds = out.frame_interval_seconds.max(0.0);
        out.line_thickness_ratio = out.line_thickness_ratio.clamp(0.0, 1.0);
        out.grid_opacity = out.grid_opacity.clamp(0.0, 1.0);
        Ok(out)
    }

    /// Strip width with zero treated as one pixel.
    pub fn effective_density(&self) -> u32 {
        self.line_density_pixels.max(1)
    }
}

pub(crate) fn load_json<T: DeserializeOwned, R: std::io::Read>(
    r: R,
    what: &str,
) -> RasterResult<T> {
    serde_json::from_reader(r).map_err(|e| RasterError::serde(format!("parse {what} JSON: {e}")))
}

fn open_json<T: DeserializeOwned>(path: &Path, what: &str) -> RasterResult<T> {
    let f = File::open(path).map_err(|e| {
        RasterError::validation(format!("open {what} JSON '{}': {e}", path.display()))
    })?;
    load_json(BufReader::new(f), what)
}

#[cfg(test)]
#[path = "../../tests/unit/scene/params.rs"]
mod tests;
