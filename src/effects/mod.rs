//! Bitmap-level stages: preprocessing, cell sampling, frame compositing and the barrier grid.

pub(crate) mod compositor;
pub(crate) mod overlay;
pub(crate) mod preprocess;
pub(crate) mod sampler;
