use crate::foundation::core::Bitmap;
use crate::foundation::error::{RasterError, RasterResult};
use crate::foundation::math::clamp_u8;
use crate::scene::params::PreprocessParams;

/// Blur, gamma, levels and grain, in that order. Alpha is left untouched.
///
/// `rng` drives grain only; pass a seeded generator for reproducible output.
#[tracing::instrument(skip(src, rng), fields(w = src.width(), h = src.height()))]
pub fn preprocess(
    src: &Bitmap,
    params: &PreprocessParams,
    rng: &mut fastrand::Rng,
) -> RasterResult<Bitmap> {
    let params = params.normalized()?;
    let mut out = blur_bitmap(src, params.blur_radius)?;
    let lut = tone_lut(&params, true);
    let grain = params.grain_amount;
    for px in out.pixels_mut().chunks_exact_mut(4) {
        let mut rgb = [lut[px[0] as usize], lut[px[1] as usize], lut[px[2] as usize]];
        if grain > 0.0 {
            add_grain(&mut rgb, grain, rng);
        }
        px[0] = clamp_u8(rgb[0]);
        px[1] = clamp_u8(rgb[1]);
        px[2] = clamp_u8(rgb[2]);
    }
    Ok(out)
}

/// Preview variant: no blur and no grain; gamma and levels only when they are not identity.
pub fn preprocess_light(src: &Bitmap, params: &PreprocessParams) -> RasterResult<Bitmap> {
    let params = params.normalized()?;
    if params.gamma == 1.0 && !params.has_levels() {
        return Ok(src.clone());
    }
    let lut = tone_lut(&params, params.has_levels());
    let mut out = src.clone();
    for px in out.pixels_mut().chunks_exact_mut(4) {
        for c in px.iter_mut().take(3) {
            *c = clamp_u8(lut[*c as usize]);
        }
    }
    Ok(out)
}

// Gamma then levels for every input level, unrounded.
fn tone_lut(params: &PreprocessParams, with_levels: bool) -> [f64; 256] {
    let mut lut = [0.0f64; 256];
    let span = params.white_point - params.black_point;
    for (i, slot) in lut.iter_mut().enumerate() {
        let mut v = (i as f64 / 255.0).powf(params.gamma) * 255.0;
        if with_levels && span != 0.0 {
            v = ((v - params.black_point) * 255.0 / span).clamp(0.0, 255.0);
        }
        *slot = v;
    }
    lut
}

fn add_grain(rgb: &mut [f64; 3], grain: f64, rng: &mut fastrand::Rng) {
    let base = grain * 2.5;
    let layer1 = (rng.f64() - 0.5) * base;
    let layer2 = if rng.f64() < 0.5 {
        (rng.f64() - 0.5) * base * 1.5
    } else {
        0.0
    };
    let layer3 = if rng.f64() < 0.2 {
        (rng.f64() - 0.5) * base * 3.0
    } else {
        0.0
    };
    let total = layer1 + layer2 + layer3;
    for c in rgb.iter_mut() {
        let jitter = (rng.f64() - 0.5) * grain * 0.3;
        *c = (*c + total + jitter).clamp(0.0, 255.0);
    }
}

/// Separable gaussian blur of the color channels with sigma `radius` px.
///
/// The kernel reaches `ceil(3 * radius)` px each way and edges are clamped. Alpha is copied
/// through unchanged; callers blur sources that are already flattened onto paper.
pub fn blur_bitmap(src: &Bitmap, radius: f64) -> RasterResult<Bitmap> {
    if !radius.is_finite() {
        return Err(RasterError::validation("blur radius must be finite"));
    }
    if radius <= 0.0 || src.is_empty() {
        return Ok(src.clone());
    }
    let weights = gaussian_weights(radius);
    let (w, h) = (src.width() as usize, src.height() as usize);
    let plane: Vec<[f32; 3]> = src
        .pixels()
        .chunks_exact(4)
        .map(|px| [f32::from(px[0]), f32::from(px[1]), f32::from(px[2])])
        .collect();
    let rows = convolve(&plane, w, h, &weights, Axis::Rows);
    let cols = convolve(&rows, w, h, &weights, Axis::Columns);

    let mut out = src.clone();
    for (px, rgb) in out.pixels_mut().chunks_exact_mut(4).zip(&cols) {
        for c in 0..3 {
            px[c] = clamp_u8(f64::from(rgb[c]));
        }
    }
    Ok(out)
}

#[derive(Clone, Copy)]
enum Axis {
    Rows,
    Columns,
}

fn gaussian_weights(sigma: f64) -> Vec<f32> {
    let reach = (sigma * 3.0).ceil().min(1024.0) as i32;
    let two_sigma_sq = 2.0 * sigma * sigma;
    let raw: Vec<f64> = (-reach..=reach)
        .map(|i| (-f64::from(i * i) / two_sigma_sq).exp())
        .collect();
    let total: f64 = raw.iter().sum();
    raw.into_iter().map(|v| (v / total) as f32).collect()
}

fn convolve(src: &[[f32; 3]], w: usize, h: usize, weights: &[f32], axis: Axis) -> Vec<[f32; 3]> {
    let reach = (weights.len() / 2) as isize;
    let mut dst = vec![[0.0f32; 3]; src.len()];
    for y in 0..h {
        for x in 0..w {
            let mut acc = [0.0f32; 3];
            for (k, &weight) in weights.iter().enumerate() {
                let offset = k as isize - reach;
                let idx = match axis {
                    Axis::Rows => y * w + (x as isize + offset).clamp(0, w as isize - 1) as usize,
                    Axis::Columns => (y as isize + offset).clamp(0, h as isize - 1) as usize * w + x,
                };
                let sample = src[idx];
                for c in 0..3 {
                    acc[c] += weight * sample[c];
                }
            }
            dst[y * w + x] = acc;
        }
    }
    dst
}

#[cfg(test)]
#[path = "../../tests/unit/effects/preprocess.rs"]
mod tests;
