use kurbo::Shape;

use crate::compile::plan::{Mark, MarkPlan};
use crate::foundation::core::{Bitmap, Point, Rgb8};
use crate::foundation::error::{RasterError, RasterResult};

/// Rasterizes [`MarkPlan`]s with `vello_cpu`, reusing one render context across calls.
#[derive(Default)]
pub struct CpuRasterizer {
    ctx: Option<vello_cpu::RenderContext>,
}

impl std::fmt::Debug for CpuRasterizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CpuRasterizer")
            .field("has_ctx", &self.ctx.is_some())
            .finish()
    }
}

impl CpuRasterizer {
    /// New rasterizer; the render context is created lazily.
    pub fn new() -> Self {
        Self::default()
    }

    /// Draw every mark of `plan` over white paper.
    #[tracing::instrument(
        skip(self, plan),
        fields(w = plan.width, h = plan.height, marks = plan.len())
    )]
    pub fn rasterize(&mut self, plan: &MarkPlan) -> RasterResult<Bitmap> {
        let width: u16 = plan
            .width
            .try_into()
            .map_err(|_| RasterError::render("pixmap width exceeds u16"))?;
        let height: u16 = plan
            .height
            .try_into()
            .map_err(|_| RasterError::render("pixmap height exceeds u16"))?;
        if width == 0 || height == 0 {
            return Err(RasterError::render("cannot rasterize an empty canvas"));
        }

        let mut ctx = match self.ctx.take() {
            Some(ctx) if ctx.width() == width && ctx.height() == height => ctx,
            _ => vello_cpu::RenderContext::new(width, height),
        };
        ctx.reset();
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);

        ctx.set_paint(paint(Rgb8::WHITE));
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(width),
            f64::from(height),
        ));

        for mark in &plan.marks {
            match *mark {
                Mark::Line {
                    from,
                    to,
                    width,
                    color,
                } => {
                    let mut p = vello_cpu::kurbo::BezPath::new();
                    p.move_to(cpu_point(from));
                    p.line_to(cpu_point(to));
                    stroke(&mut ctx, &p, width, color);
                }
                Mark::Quad {
                    from,
                    control,
                    to,
                    width,
                    color,
                } => {
                    let mut p = vello_cpu::kurbo::BezPath::new();
                    p.move_to(cpu_point(from));
                    p.quad_to(cpu_point(control), cpu_point(to));
                    stroke(&mut ctx, &p, width, color);
                }
                Mark::Circle {
                    center,
                    radius,
                    color,
                } => {
                    if radius <= 0.0 {
                        continue;
                    }
                    let circle = kurbo::Circle::new(center, radius);
                    ctx.set_paint(paint(color));
                    ctx.fill_path(&bezpath_to_cpu(&circle.to_path(0.1)));
                }
            }
        }

        let mut pixmap = vello_cpu::Pixmap::new(width, height);
        ctx.flush();
        ctx.render_to_pixmap(&mut pixmap);
        self.ctx = Some(ctx);

        let mut data = pixmap.data_as_u8_slice().to_vec();
        unpremultiply_rgba8_in_place(&mut data);
        Bitmap::from_rgba8(plan.width, plan.height, data)
    }
}

fn stroke(
    ctx: &mut vello_cpu::RenderContext,
    path: &vello_cpu::kurbo::BezPath,
    width: f64,
    color: Rgb8,
) {
    if width <= 0.0 {
        return;
    }
    ctx.set_stroke(
        vello_cpu::kurbo::Stroke::new(width).with_caps(vello_cpu::kurbo::Cap::Round),
    );
    ctx.set_paint(paint(color));
    ctx.stroke_path(path);
}

fn paint(c: Rgb8) -> vello_cpu::peniko::Color {
    vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, 255)
}

fn cpu_point(p: Point) -> vello_cpu::kurbo::Point {
    vello_cpu::kurbo::Point::new(p.x, p.y)
}

fn bezpath_to_cpu(path: &kurbo::BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(cpu_point(p)),
            PathEl::LineTo(p) => out.line_to(cpu_point(p)),
            PathEl::QuadTo(p1, p2) => out.quad_to(cpu_point(p1), cpu_point(p2)),
            PathEl::CurveTo(p1, p2, p3) => {
                out.curve_to(cpu_point(p1), cpu_point(p2), cpu_point(p3))
            }
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

pub(crate) fn unpremultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = u16::from(px[3]);
        if a == 0 || a == 255 {
            continue;
        }
        for c in px.iter_mut().take(3) {
            *c = ((u16::from(*c) * 255 + a / 2) / a).min(255) as u8;
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
