use std::sync::Arc;

use crate::foundation::error::{RasterError, RasterResult};

pub use kurbo::{Point, Rect, Vec2};

/// Opaque 8-bit sRGB color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct Rgb8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl Rgb8 {
    /// Pure black, the default ink.
    pub const BLACK: Self = Self::new(0, 0, 0);
    /// Pure white, the paper color.
    pub const WHITE: Self = Self::new(255, 255, 255);

    /// Build a color from its channels.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Expand to straight RGBA with the given alpha.
    pub fn with_alpha(self, a: u8) -> [u8; 4] {
        [self.r, self.g, self.b, a]
    }

    /// Lowercase `#rrggbb` form.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Row-major, tightly packed RGBA8 bitmap with straight (non-premultiplied) alpha.
///
/// Pixel storage is shared: cloning a bitmap is cheap, and writes through
/// [`Bitmap::pixels_mut`] copy the buffer first when another owner still holds it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Bitmap {
    width: u32,
    height: u32,
    data: Arc<Vec<u8>>,
}

impl Bitmap {
    /// Wrap an existing RGBA8 buffer, checking it matches `width * height * 4`.
    pub fn from_rgba8(width: u32, height: u32, data: Vec<u8>) -> RasterResult<Self> {
        let expected = byte_len(width, height)?;
        if data.len() != expected {
            return Err(RasterError::validation(format!(
                "bitmap byte len mismatch: got {}, expected {expected} for {width}x{height}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data: Arc::new(data),
        })
    }

    /// Bitmap where every pixel is `rgba`.
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> RasterResult<Self> {
        let n = (width as usize)
            .checked_mul(height as usize)
            .ok_or_else(|| RasterError::validation("bitmap size overflow"))?;
        Self::from_rgba8(width, height, rgba.repeat(n))
    }

    /// Opaque white bitmap, used as the blank page and the fallback frame.
    pub fn white(width: u32, height: u32) -> RasterResult<Self> {
        Self::filled(width, height, [255, 255, 255, 255])
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// `(width, height)`.
    pub fn dims(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Return `true` when the bitmap has no pixels.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Raw RGBA8 bytes.
    pub fn pixels(&self) -> &[u8] {
        &self.data
    }

    /// Mutable RGBA8 bytes (copy-on-write).
    pub fn pixels_mut(&mut self) -> &mut [u8] {
        Arc::make_mut(&mut self.data).as_mut_slice()
    }

    /// Pixel at `(x, y)`, or `None` outside the bitmap.
    pub fn pixel(&self, x: i64, y: i64) -> Option<[u8; 4]> {
        if x < 0 || y < 0 || x >= i64::from(self.width) || y >= i64::from(self.height) {
            return None;
        }
        let idx = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        let px = &self.data[idx..idx + 4];
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Take the buffer out, cloning only when it is still shared.
    pub fn into_rgba8(self) -> Vec<u8> {
        Arc::try_unwrap(self.data).unwrap_or_else(|shared| (*shared).clone())
    }
}

fn byte_len(width: u32, height: u32) -> RasterResult<usize> {
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|v| v.checked_mul(4))
        .ok_or_else(|| RasterError::validation("bitmap size overflow"))
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
