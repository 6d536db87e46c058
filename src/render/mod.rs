//! Mark plan backends.
//!
//! Both backends consume the same [`MarkPlan`](crate::MarkPlan), so a raster and a vector export
//! of one render always agree on which marks exist and where.

/// `vello_cpu` rasterizer.
pub mod cpu;
/// SVG document model, serializer and `resvg` preview.
pub mod svg;
