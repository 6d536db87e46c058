use std::io::Cursor;
use std::path::Path;

use anyhow::Context;

use crate::foundation::core::Bitmap;
use crate::foundation::error::{RasterError, RasterResult};

/// Decode any format supported by `image` into a straight-alpha [`Bitmap`].
pub fn decode_image(bytes: &[u8]) -> RasterResult<Bitmap> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();
    Bitmap::from_rgba8(width, height, rgba.into_raw())
}

/// Read and decode an image file.
pub fn load_image(path: impl AsRef<Path>) -> RasterResult<Bitmap> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)
        .map_err(|e| RasterError::validation(format!("read image '{}': {e}", path.display())))?;
    decode_image(&bytes)
}

/// Encode a bitmap as PNG bytes.
pub fn encode_png(bitmap: &Bitmap) -> RasterResult<Vec<u8>> {
    let img = image::RgbaImage::from_raw(bitmap.width(), bitmap.height(), bitmap.pixels().to_vec())
        .ok_or_else(|| RasterError::render("bitmap buffer does not match its dimensions"))?;
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .context("encode png")?;
    Ok(buf)
}

/// Resample to `width x height` with a triangle filter. Same-size requests return the input.
pub fn resize_bitmap(bitmap: &Bitmap, width: u32, height: u32) -> RasterResult<Bitmap> {
    if width == 0 || height == 0 {
        return Err(RasterError::validation("resize target must be non-empty"));
    }
    if bitmap.dims() == (width, height) {
        return Ok(bitmap.clone());
    }
    let img = image::RgbaImage::from_raw(bitmap.width(), bitmap.height(), bitmap.pixels().to_vec())
        .ok_or_else(|| RasterError::validation("bitmap buffer does not match its dimensions"))?;
    let out = image::imageops::resize(&img, width, height, image::imageops::FilterType::Triangle);
    Bitmap::from_rgba8(width, height, out.into_raw())
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
