//! Stateful pipelines driving the stages end to end.

/// Multi-frame barrier-grid pipeline.
pub mod motion;
/// Single-image effect pipeline.
pub mod still;
