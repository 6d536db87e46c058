use crate::effects::sampler::pixel_brightness;
use crate::foundation::core::{Bitmap, Rgb8};
use crate::foundation::error::{RasterError, RasterResult};
use crate::foundation::math::clamp_u8;
use crate::scene::params::{MotionParameters, ScanDirection};

/// Combine a frame sequence into one inked raster.
///
/// Interlaced mode gives each `line_density_pixels` strip along the scan axis to one frame in
/// turn; composite mode multiplies every frame's whiteness together. Frame `i` is sampled
/// shifted by `floor(i * x_offset_per_frame)` across the scan axis, and samples that land
/// outside the frame read as paper (interlaced) or contribute nothing (composite).
///
/// Returns `Ok(None)` for an empty sequence so callers can keep their previous output.
#[tracing::instrument(skip(frames, params), fields(n = frames.len()))]
pub fn composite_frames(
    frames: &[Bitmap],
    params: &MotionParameters,
) -> RasterResult<Option<Bitmap>> {
    let Some(first) = frames.first() else {
        return Ok(None);
    };
    let (w, h) = first.dims();
    if let Some(bad) = frames.iter().position(|f| f.dims() != (w, h)) {
        return Err(RasterError::validation(format!(
            "frame {bad} is {}x{}, expected {w}x{h}",
            frames[bad].width(),
            frames[bad].height()
        )));
    }
    let params = params.normalized()?;

    let offsets: Vec<i64> = (0..frames.len())
        .map(|i| (i as f64 * params.x_offset_per_frame).floor() as i64)
        .collect();
    let ink = Inker {
        ratio: params.line_thickness_ratio,
        invert: params.invert_mask,
        color: params.ink_color,
    };
    let vertical = params.scan_direction == ScanDirection::Vertical;
    let density = i64::from(params.effective_density());
    let n = frames.len() as i64;

    let mut out = Vec::with_capacity(w as usize * h as usize * 4);
    for y in 0..i64::from(h) {
        for x in 0..i64::from(w) {
            let px = if params.interlace_mode {
                let scan = if vertical { x } else { y };
                let fi = ((scan / density) % n) as usize;
                match frames[fi].pixel(
                    if vertical { x } else { x - offsets[fi] },
                    if vertical { y - offsets[fi] } else { y },
                ) {
                    Some(src) => ink.blend(ink.amount(src) / 255.0),
                    None => [255, 255, 255, 255],
                }
            } else {
                let mut min_val = 255.0;
                for (frame, &off) in frames.iter().zip(&offsets) {
                    let (sx, sy) = if vertical { (x, y - off) } else { (x - off, y) };
                    if let Some(src) = frame.pixel(sx, sy) {
                        min_val = min_val * (255.0 - ink.amount(src)) / 255.0;
                    }
                }
                ink.blend((255.0 - min_val) / 255.0)
            };
            out.extend_from_slice(&px);
        }
    }
    Ok(Some(Bitmap::from_rgba8(w, h, out)?))
}

struct Inker {
    ratio: f64,
    invert: bool,
    color: Rgb8,
}

impl Inker {
    fn amount(&self, src: [u8; 4]) -> f64 {
        let mut b = pixel_brightness(src);
        if self.invert {
            b = 255.0 - b;
        }
        (255.0 - b) * self.ratio
    }

    fn blend(&self, ink_ratio: f64) -> [u8; 4] {
        let mix = |c: u8| clamp_u8((1.0 - ink_ratio) * 255.0 + ink_ratio * f64::from(c));
        [mix(self.color.r), mix(self.color.g), mix(self.color.b), 255]
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/compositor.rs"]
mod tests;
