use crate::foundation::core::{Point, Rgb8};

/// One drawing primitive, in canvas pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Mark {
    /// Round-capped straight stroke.
    Line {
        /// Start point.
        from: Point,
        /// End point.
        to: Point,
        /// Stroke width.
        width: f64,
        /// Stroke color.
        color: Rgb8,
    },
    /// Filled circle.
    Circle {
        /// Center point.
        center: Point,
        /// Radius.
        radius: f64,
        /// Fill color.
        color: Rgb8,
    },
    /// Round-capped quadratic Bezier stroke.
    Quad {
        /// Start point.
        from: Point,
        /// Control point.
        control: Point,
        /// End point.
        to: Point,
        /// Stroke width.
        width: f64,
        /// Stroke color.
        color: Rgb8,
    },
}

/// Backend-agnostic list of marks for one canvas, drawn in order over white paper.
///
/// The CPU rasterizer and the vector emitter both consume this, so every raster mark has
/// exactly one vector counterpart.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MarkPlan {
    /// Canvas width in pixels.
    pub width: u32,
    /// Canvas height in pixels.
    pub height: u32,
    /// Marks in paint order.
    pub marks: Vec<Mark>,
    /// Set when the texture effect dropped to fewer, straight strokes.
    pub performance_mode: bool,
}

impl MarkPlan {
    /// Empty plan for a `width x height` canvas.
    pub fn empty(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            marks: Vec::new(),
            performance_mode: false,
        }
    }

    /// Number of marks.
    pub fn len(&self) -> usize {
        self.marks.len()
    }

    /// `true` when nothing would be drawn.
    pub fn is_empty(&self) -> bool {
        self.marks.is_empty()
    }
}
