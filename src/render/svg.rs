use std::fmt::Write as _;

use crate::compile::plan::{Mark, MarkPlan};
use crate::foundation::core::{Bitmap, Point, Rect, Rgb8};
use crate::foundation::error::{RasterError, RasterResult};
use crate::render::cpu::unpremultiply_rgba8_in_place;

/// One vector element.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Primitive {
    /// `<line>` with round caps.
    Line {
        /// Start point.
        from: Point,
        /// End point.
        to: Point,
        /// Stroke color.
        stroke: Rgb8,
        /// Stroke width.
        width: f64,
    },
    /// Filled `<circle>`.
    Circle {
        /// Center point.
        center: Point,
        /// Radius.
        radius: f64,
        /// Fill color.
        fill: Rgb8,
    },
    /// Quadratic `<path>` with round caps and no fill.
    Path {
        /// Start point.
        from: Point,
        /// Control point.
        control: Point,
        /// End point.
        to: Point,
        /// Stroke color.
        stroke: Rgb8,
        /// Stroke width.
        width: f64,
    },
    /// Filled `<rect>`.
    Rect {
        /// Rectangle in document units.
        rect: Rect,
        /// Fill color.
        fill: Rgb8,
        /// Fill opacity in `0..=1`.
        opacity: f64,
    },
}

impl From<Mark> for Primitive {
    fn from(mark: Mark) -> Self {
        match mark {
            Mark::Line {
                from,
                to,
                width,
                color,
            } => Self::Line {
                from,
                to,
                stroke: color,
                width,
            },
            Mark::Circle {
                center,
                radius,
                color,
            } => Self::Circle {
                center,
                radius,
                fill: color,
            },
            Mark::Quad {
                from,
                control,
                to,
                width,
                color,
            } => Self::Path {
                from,
                control,
                to,
                stroke: color,
                width,
            },
        }
    }
}

/// Ordered vector primitives over an optional white background.
#[derive(Clone, Debug, PartialEq)]
pub struct VectorDocument {
    width: u32,
    height: u32,
    background: bool,
    primitives: Vec<Primitive>,
}

impl VectorDocument {
    /// Empty document with a white background.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            background: true,
            primitives: Vec::new(),
        }
    }

    /// Drop the white background rectangle.
    pub fn without_background(mut self) -> Self {
        self.background = false;
        self
    }

    /// Append a primitive.
    pub fn push(&mut self, primitive: Primitive) {
        self.primitives.push(primitive);
    }

    /// Primitives in paint order.
    pub fn primitives(&self) -> &[Primitive] {
        &self.primitives
    }

    /// `(width, height)` of the document.
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Serialize as standalone SVG text. Coordinates are written with two decimals.
    pub fn to_svg_string(&self) -> String {
        let mut out = String::with_capacity(128 + self.primitives.len() * 120);
        let _ = writeln!(out, r#"<?xml version="1.0" encoding="UTF-8"?>"#);
        let _ = writeln!(
            out,
            r#"<svg width="{}" height="{}" viewBox="0 0 {} {}" xmlns="http://www.w3.org/2000/svg">"#,
            self.width, self.height, self.width, self.height
        );
        if self.background {
            let _ = writeln!(out, r#"<rect width="100%" height="100%" fill="white"/>"#);
        }
        for p in &self.primitives {
            write_primitive(&mut out, p);
        }
        out.push_str("</svg>\n");
        out
    }

    /// Parse the serialized document with `usvg`.
    pub fn to_tree(&self) -> RasterResult<usvg::Tree> {
        usvg::Tree::from_str(&self.to_svg_string(), &usvg::Options::default())
            .map_err(|e| RasterError::render(format!("emitted svg does not parse: {e}")))
    }

    /// Render the serialized document at its own size with `resvg`.
    pub fn rasterize(&self) -> RasterResult<Bitmap> {
        let tree = self.to_tree()?;
        let mut pixmap = resvg::tiny_skia::Pixmap::new(self.width, self.height)
            .ok_or_else(|| RasterError::render("failed to allocate svg pixmap"))?;
        resvg::render(
            &tree,
            resvg::tiny_skia::Transform::identity(),
            &mut pixmap.as_mut(),
        );
        let mut data = pixmap.data().to_vec();
        unpremultiply_rgba8_in_place(&mut data);
        Bitmap::from_rgba8(self.width, self.height, data)
    }
}

/// Vector counterpart of a mark plan: one primitive per mark, in the same order.
pub fn emit_vector(plan: &MarkPlan) -> VectorDocument {
    let mut doc = VectorDocument::new(plan.width, plan.height);
    doc.primitives
        .extend(plan.marks.iter().copied().map(Primitive::from));
    doc
}

fn rgb(c: Rgb8) -> String {
    format!("rgb({}, {}, {})", c.r, c.g, c.b)
}

fn write_primitive(out: &mut String, p: &Primitive) {
    let _ = match *p {
        Primitive::Line {
            from,
            to,
            stroke,
            width,
        } => writeln!(
            out,
            r#"<line x1="{:.2}" y1="{:.2}" x2="{:.2}" y2="{:.2}" stroke="{}" stroke-width="{:.2}" stroke-linecap="round"/>"#,
            from.x,
            from.y,
            to.x,
            to.y,
            rgb(stroke),
            width
        ),
        Primitive::Circle {
            center,
            radius,
            fill,
        } => writeln!(
            out,
            r#"<circle cx="{:.2}" cy="{:.2}" r="{:.2}" fill="{}"/>"#,
            center.x,
            center.y,
            radius,
            rgb(fill)
        ),
        Primitive::Path {
            from,
            control,
            to,
            stroke,
            width,
        } => writeln!(
            out,
            r#"<path d="M{:.2},{:.2} Q{:.2},{:.2} {:.2},{:.2}" stroke="{}" stroke-width="{:.2}" fill="none" stroke-linecap="round"/>"#,
            from.x,
            from.y,
            control.x,
            control.y,
            to.x,
            to.y,
            rgb(stroke),
            width
        ),
        Primitive::Rect {
            rect,
            fill,
            opacity,
        } => writeln!(
            out,
            r#"<rect x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" fill="{}" fill-opacity="{:.2}"/>"#,
            rect.x0,
            rect.y0,
            rect.width(),
            rect.height(),
            rgb(fill),
            opacity
        ),
    };
}

#[cfg(test)]
#[path = "../../tests/unit/render/svg.rs"]
mod tests;
