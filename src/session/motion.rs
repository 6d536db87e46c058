use crate::assets::decode::resize_bitmap;
use crate::assets::media::{ExtractOpts, VideoSource, extract_frames};
use crate::effects::compositor::composite_frames;
use crate::effects::overlay::{
    flatten_over, overlay_document, render_overlay, render_overlay_scaled,
};
use crate::foundation::core::Bitmap;
use crate::foundation::error::{RasterError, RasterResult};
use crate::render::svg::VectorDocument;
use crate::scene::params::MotionParameters;

/// Canvas used before any frame or explicit size is known.
pub const DEFAULT_CANVAS: (u32, u32) = (500, 500);

/// Print-ready pair: the inked raster on white paper and the fully opaque barrier grid.
#[derive(Clone, Debug, PartialEq)]
pub struct MotionLayers {
    /// Raster centered on the canvas.
    pub raster: Bitmap,
    /// Barrier grid with opaque bands over transparency.
    pub overlay: Bitmap,
}

/// Frame sequence, motion parameters and the last composite.
#[derive(Clone, Debug)]
pub struct MotionSession {
    params: MotionParameters,
    frames: Vec<Bitmap>,
    raster: Option<Bitmap>,
    canvas: Option<(u32, u32)>,
}

impl MotionSession {
    /// Empty session.
    pub fn new(params: MotionParameters) -> RasterResult<Self> {
        Ok(Self {
            params: params.normalized()?,
            frames: Vec::new(),
            raster: None,
            canvas: None,
        })
    }

    /// Current (normalized) parameters.
    pub fn params(&self) -> &MotionParameters {
        &self.params
    }

    /// Replace the parameters. The previous composite stays until the next [`Self::render`].
    pub fn set_params(&mut self, params: MotionParameters) -> RasterResult<()> {
        self.params = params.normalized()?;
        Ok(())
    }

    /// Loaded frames.
    pub fn frames(&self) -> &[Bitmap] {
        &self.frames
    }

    /// Replace the frame sequence. All frames must share one size.
    pub fn set_frames(&mut self, frames: Vec<Bitmap>) -> RasterResult<()> {
        if let Some(first) = frames.first() {
            let dims = first.dims();
            if frames.iter().any(|f| f.dims() != dims) {
                return Err(RasterError::validation("frames must share one size"));
            }
        }
        self.frames = frames;
        Ok(())
    }

    /// Pull `frame_count` frames from `source` at `frame_interval_seconds` spacing.
    pub fn load_frames(
        &mut self,
        source: &mut dyn VideoSource,
        opts: ExtractOpts,
    ) -> RasterResult<usize> {
        let frames = extract_frames(
            source,
            self.params.frame_count,
            self.params.frame_interval_seconds,
            opts,
        )?;
        tracing::info!(frames = frames.len(), "loaded video frames");
        self.set_frames(frames)?;
        Ok(self.frames.len())
    }

    /// Fix the display/export canvas instead of following the raster size.
    pub fn set_canvas_size(&mut self, width: u32, height: u32) -> RasterResult<()> {
        if width == 0 || height == 0 {
            return Err(RasterError::validation("canvas must be non-empty"));
        }
        self.canvas = Some((width, height));
        Ok(())
    }

    /// Explicit canvas, else the raster size, else the frame size, else [`DEFAULT_CANVAS`].
    pub fn canvas_size(&self) -> (u32, u32) {
        self.canvas
            .or_else(|| self.raster.as_ref().map(Bitmap::dims))
            .or_else(|| self.frames.first().map(Bitmap::dims))
            .unwrap_or(DEFAULT_CANVAS)
    }

    /// Last composite, if any.
    pub fn raster(&self) -> Option<&Bitmap> {
        self.raster.as_ref()
    }

    /// Recompute the composite. Without frames the previous composite is kept.
    pub fn render(&mut self) -> RasterResult<Option<&Bitmap>> {
        if let Some(out) = composite_frames(&self.frames, &self.params)? {
            self.raster = Some(out);
        }
        Ok(self.raster.as_ref())
    }

    /// Barrier grid at display opacity over a `width x height` canvas.
    ///
    /// The slit period follows the loaded frame count, which may differ from `frame_count`
    /// when frames were supplied directly.
    pub fn render_overlay(&self, width: u32, height: u32) -> RasterResult<Bitmap> {
        render_overlay(&self.grid_params(), width, height)
    }

    /// What a viewer sees: the centered raster with the overlay on top when enabled.
    pub fn render_display(&self) -> RasterResult<Option<Bitmap>> {
        let Some(raster) = self.raster.as_ref() else {
            return Ok(None);
        };
        let (w, h) = self.canvas_size();
        let base = place_centered(raster, w, h, 1)?;
        if !self.params.show_overlay {
            return Ok(Some(base));
        }
        Ok(Some(flatten_over(&base, &self.render_overlay(w, h)?)?))
    }

    /// Raster and opaque overlay at `scale` times the canvas size.
    #[tracing::instrument(skip(self))]
    pub fn export_layers(&self, scale: u32) -> RasterResult<Option<MotionLayers>> {
        if scale == 0 {
            return Err(RasterError::validation("export scale must be >= 1"));
        }
        let Some(raster) = self.raster.as_ref() else {
            return Ok(None);
        };
        let (w, h) = self.canvas_size();
        Ok(Some(MotionLayers {
            raster: place_centered(raster, w, h, scale)?,
            overlay: render_overlay_scaled(&self.print_params(), w, h, scale)?,
        }))
    }

    /// Opaque barrier grid as a vector document over the canvas.
    pub fn overlay_vector(&self) -> VectorDocument {
        let (w, h) = self.canvas_size();
        overlay_document(&self.print_params(), w, h)
    }

    fn grid_params(&self) -> MotionParameters {
        let mut params = self.params.clone();
        if !self.frames.is_empty() {
            params.frame_count = u32::try_from(self.frames.len()).unwrap_or(u32::MAX);
        }
        params
    }

    fn print_params(&self) -> MotionParameters {
        MotionParameters {
            grid_opacity: 1.0,
            ..self.grid_params()
        }
    }
}

/// Draw `raster`, scaled by `scale`, centered on a white `width*scale x height*scale` page.
///
/// Parts of the raster that fall outside the page are cropped.
pub fn place_centered(
    raster: &Bitmap,
    width: u32,
    height: u32,
    scale: u32,
) -> RasterResult<Bitmap> {
    let out_w = width
        .checked_mul(scale)
        .ok_or_else(|| RasterError::validation("canvas width overflow"))?;
    let out_h = height
        .checked_mul(scale)
        .ok_or_else(|| RasterError::validation("canvas height overflow"))?;
    let mut out = Bitmap::white(out_w, out_h)?;
    if raster.is_empty() || out.is_empty() {
        return Ok(out);
    }
    let src = if scale == 1 {
        raster.clone()
    } else {
        let sw = raster
            .width()
            .checked_mul(scale)
            .ok_or_else(|| RasterError::validation("raster width overflow"))?;
        let sh = raster
            .height()
            .checked_mul(scale)
            .ok_or_else(|| RasterError::validation("raster height overflow"))?;
        resize_bitmap(raster, sw, sh)?
    };

    let (sw, sh) = (i64::from(src.width()), i64::from(src.height()));
    let (ow, oh) = (i64::from(out_w), i64::from(out_h));
    let ox = (ow - sw).div_euclid(2);
    let oy = (oh - sh).div_euclid(2);
    let x0 = ox.max(0);
    let x1 = (ox + sw).min(ow);
    if x1 <= x0 {
        return Ok(out);
    }
    let src_px = src.pixels();
    let dst = out.pixels_mut();
    for y in oy.max(0)..(oy + sh).min(oh) {
        let sy = y - oy;
        let s = ((sy * sw + (x0 - ox)) * 4) as usize;
        let d = ((y * ow + x0) * 4) as usize;
        let n = ((x1 - x0) * 4) as usize;
        dst[d..d + n].copy_from_slice(&src_px[s..s + n]);
    }
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/session/motion.rs"]
mod tests;
