//! Rasterline turns images into print-style line, dot and texture renderings, and video clips
//! into scanimation (barrier-grid) prints.
//!
//! The still pipeline runs:
//!
//! - [`preprocess`] the source (blur, gamma, levels, grain)
//! - [`sample_grid`] it into per-cell brightness and color
//! - [`compile_marks`] into a backend-neutral [`MarkPlan`]
//! - draw the plan with [`CpuRasterizer`] or serialize it with [`emit_vector`]
//!
//! The motion pipeline extracts frames from a [`VideoSource`], combines them with
//! [`composite_frames`] and pairs the result with a barrier grid from [`render_overlay`].
//! [`StillSession`] and [`MotionSession`] drive both end to end.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod assets;
mod foundation;

pub(crate) mod compile;
pub(crate) mod effects;
/// Raster and vector backends.
pub mod render;
/// Parameter records and presets.
pub mod scene;
/// Stateful still and motion pipelines.
pub mod session;

pub use crate::foundation::core::{Bitmap, Point, Rect, Rgb8, Vec2};
pub use crate::foundation::error::{RasterError, RasterResult};

pub use crate::assets::decode::{decode_image, encode_png, load_image, resize_bitmap};
pub use crate::assets::media::{
    DEFAULT_SEEK_TIMEOUT, ExtractOpts, FfmpegVideoSource, SeekOutcome, VideoInfo, VideoSource,
    extract_frames, probe_video, sample_times,
};
pub use crate::compile::compiler::{REFERENCE_CANVAS_PX, compile_marks};
pub use crate::compile::plan::{Mark, MarkPlan};
pub use crate::effects::compositor::composite_frames;
pub use crate::effects::overlay::{
    flatten_over, overlay_bands, overlay_document, render_overlay, render_overlay_scaled,
};
pub use crate::effects::preprocess::{blur_bitmap, preprocess, preprocess_light};
pub use crate::effects::sampler::{CellAggregate, CellGrid, cell_span, compute_cell, sample_grid};
pub use crate::render::cpu::CpuRasterizer;
pub use crate::render::svg::{Primitive, VectorDocument, emit_vector};
pub use crate::scene::params::{
    EffectMode, EffectParameters, MotionParameters, OutputFormat, PreprocessParams,
    ScanDirection, StillParams,
};
pub use crate::scene::preset::{PresetStore, builtin_preset};
pub use crate::session::motion::{MotionLayers, MotionSession, place_centered};
pub use crate::session::still::{
    PreviewTier, StillExport, StillSession, fit_canvas, preview_grid_cap, preview_tier,
};
