use crate::foundation::core::{Bitmap, Rect};
use crate::foundation::error::{RasterError, RasterResult};
use crate::foundation::math::{clamp_u8, mul_div255_u8};
use crate::render::svg::{Primitive, VectorDocument};
use crate::scene::params::{MotionParameters, ScanDirection};

/// Opaque band rectangles of the barrier grid over a `width x height` canvas.
///
/// Each cycle of `density * frame_count` pixels is one transparent slit of `density` followed by
/// an opaque band of `density * (frame_count - 1)`. With a single frame there is nothing to hide
/// between slits, so the grid degenerates to one opaque band covering the whole canvas.
pub fn overlay_bands(params: &MotionParameters, width: f64, height: f64) -> Vec<Rect> {
    let d = f64::from(params.effective_density());
    let n = params.frame_count.max(1);
    let vertical = params.scan_direction == ScanDirection::Vertical;
    if width <= 0.0 || height <= 0.0 {
        return Vec::new();
    }
    if n == 1 {
        return vec![Rect::new(0.0, 0.0, width, height)];
    }

    let opaque = d * f64::from(n - 1);
    let cycle = d * f64::from(n);
    let extent = if vertical { width } else { height };
    let mut bands = Vec::new();
    let mut pos = 0.0;
    while pos < extent + cycle {
        let start = pos + d;
        let end = (start + opaque).min(extent);
        if start < extent && end > start {
            bands.push(if vertical {
                Rect::new(start, 0.0, end, height)
            } else {
                Rect::new(0.0, start, width, end)
            });
        }
        pos += cycle;
    }
    bands
}

/// Barrier-grid bitmap at display resolution, bands in ink at `grid_opacity`.
pub fn render_overlay(params: &MotionParameters, width: u32, height: u32) -> RasterResult<Bitmap> {
    render_overlay_scaled(params, width, height, 1)
}

/// Barrier grid laid out for `width x height` and rasterized at `scale` times that size.
#[tracing::instrument(skip(params))]
pub fn render_overlay_scaled(
    params: &MotionParameters,
    width: u32,
    height: u32,
    scale: u32,
) -> RasterResult<Bitmap> {
    if scale == 0 {
        return Err(RasterError::validation("overlay scale must be >= 1"));
    }
    let params = params.normalized()?;
    let out_w = width
        .checked_mul(scale)
        .ok_or_else(|| RasterError::validation("overlay width overflow"))?;
    let out_h = height
        .checked_mul(scale)
        .ok_or_else(|| RasterError::validation("overlay height overflow"))?;
    let mut out = Bitmap::filled(out_w, out_h, [0, 0, 0, 0])?;
    let alpha = clamp_u8(params.grid_opacity * 255.0);
    if alpha == 0 || out.is_empty() {
        return Ok(out);
    }
    let ink = params.ink_color.with_alpha(alpha);
    let s = f64::from(scale);
    let stride = out_w as usize * 4;
    let data = out.pixels_mut();
    for band in overlay_bands(&params, f64::from(width), f64::from(height)) {
        let x0 = (band.x0 * s).round().clamp(0.0, f64::from(out_w)) as usize;
        let x1 = (band.x1 * s).round().clamp(0.0, f64::from(out_w)) as usize;
        let y0 = (band.y0 * s).round().clamp(0.0, f64::from(out_h)) as usize;
        let y1 = (band.y1 * s).round().clamp(0.0, f64::from(out_h)) as usize;
        for row in y0..y1 {
            for px in data[row * stride + x0 * 4..row * stride + x1 * 4].chunks_exact_mut(4) {
                px.copy_from_slice(&ink);
            }
        }
    }
    Ok(out)
}

/// Barrier grid as a vector document (no background, so it can be printed on film).
pub fn overlay_document(params: &MotionParameters, width: u32, height: u32) -> VectorDocument {
    let mut doc = VectorDocument::new(width, height).without_background();
    let opacity = params.grid_opacity.clamp(0.0, 1.0);
    for band in overlay_bands(params, f64::from(width), f64::from(height)) {
        doc.push(Primitive::Rect {
            rect: band,
            fill: params.ink_color,
            opacity,
        });
    }
    doc
}

/// Straight-alpha source-over of `top` onto `base`. Both must have the same size.
pub fn flatten_over(base: &Bitmap, top: &Bitmap) -> RasterResult<Bitmap> {
    if base.dims() != top.dims() {
        return Err(RasterError::validation(format!(
            "cannot composite {}x{} over {}x{}",
            top.width(),
            top.height(),
            base.width(),
            base.height()
        )));
    }
    let mut out = base.clone();
    for (d, s) in out.pixels_mut().chunks_exact_mut(4).zip(top.pixels().chunks_exact(4)) {
        let sa = u16::from(s[3]);
        if sa == 0 {
            continue;
        }
        let inv = 255 - sa;
        let da = mul_div255_u8(u16::from(d[3]), inv);
        let out_a = (u16::from(s[3]) + u16::from(da)).min(255);
        for c in 0..3 {
            let num = u32::from(s[c]) * u32::from(sa) + u32::from(d[c]) * u32::from(da);
            d[c] = if out_a == 0 {
                0
            } else {
                ((num + u32::from(out_a) / 2) / u32::from(out_a)).min(255) as u8
            };
        }
        d[3] = out_a as u8;
    }
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/effects/overlay.rs"]
mod tests;
