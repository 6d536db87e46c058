/// Rec. 601 luma of an sRGB triple, in `0..=255`.
pub(crate) fn luma(r: u8, g: u8, b: u8) -> f64 {
    0.299 * f64::from(r) + 0.587 * f64::from(g) + 0.114 * f64::from(b)
}

pub(crate) fn mul_div255_u8(x: u16, y: u16) -> u8 {
    (((u32::from(x) * u32::from(y)) + 127) / 255).min(255) as u8
}

/// Round and clamp a channel value into `u8`.
pub(crate) fn clamp_u8(v: f64) -> u8 {
    if v.is_nan() {
        return 0;
    }
    v.round().clamp(0.0, 255.0) as u8
}

/// Deterministic LCG used by the texture effect.
///
/// `s = (s * 9301 + 49297) mod 233280`, yielding `s / 233280` in `[0, 1)`. Identical seeds
/// reproduce identical stroke layouts in both the raster and vector outputs.
#[derive(Clone, Copy, Debug)]
pub(crate) struct TextureRng(u64);

impl TextureRng {
    const MUL: u64 = 9301;
    const INC: u64 = 49297;
    const MOD: u64 = 233_280;

    /// Seed for the cell at `(column, row)`.
    pub(crate) fn for_cell(column: u32, row: u32) -> Self {
        Self(u64::from(column) * 10_000 + u64::from(row))
    }

    pub(crate) fn next_f64(&mut self) -> f64 {
        self.0 = (self.0.wrapping_mul(Self::MUL).wrapping_add(Self::INC)) % Self::MOD;
        self.0 as f64 / Self::MOD as f64
    }
}

/// Smooth periodic field in `[0, 1]` steering texture stroke direction.
pub(crate) fn pseudo_noise(x: f64, y: f64) -> f64 {
    ((x * 0.3 + y * 0.2).sin() + (x * 0.7 + y * 0.5).cos() + 2.0) / 4.0
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
