use crate::assets::decode::{encode_png, resize_bitmap};
use crate::compile::compiler::{REFERENCE_CANVAS_PX, compile_marks};
use crate::compile::plan::MarkPlan;
use crate::effects::overlay::flatten_over;
use crate::effects::preprocess::{preprocess, preprocess_light};
use crate::effects::sampler::sample_grid;
use crate::foundation::core::Bitmap;
use crate::foundation::error::{RasterError, RasterResult};
use crate::render::cpu::CpuRasterizer;
use crate::render::svg::{VectorDocument, emit_vector};
use crate::scene::params::{EffectMode, OutputFormat, StillParams};

/// Above this many cells interactive updates are skipped entirely.
pub const PREVIEW_SKIP_CELLS: u64 = 40_000;
/// Above this many cells interactive updates use the lightweight preview.
pub const PREVIEW_LIGHT_CELLS: u64 = 20_000;

/// How an interactive parameter change should be rendered.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PreviewTier {
    /// Full pipeline.
    Full,
    /// Capped grid, no blur or grain.
    Lightweight,
    /// Too dense to preview; keep the previous result.
    Skip,
}

/// Pick the interactive tier for a grid of `total_cells`.
pub fn preview_tier(total_cells: u64) -> PreviewTier {
    if total_cells > PREVIEW_SKIP_CELLS {
        PreviewTier::Skip
    } else if total_cells > PREVIEW_LIGHT_CELLS {
        PreviewTier::Lightweight
    } else {
        PreviewTier::Full
    }
}

/// Per-axis grid cap of the lightweight preview.
pub fn preview_grid_cap(mode: EffectMode) -> u32 {
    match mode {
        EffectMode::Raster | EffectMode::None => 120,
        EffectMode::Dots => 100,
        EffectMode::Texture => 80,
    }
}

/// Output canvas for a `src_w x src_h` source: long side `round(600 * percent / 100)`, aspect kept.
pub fn fit_canvas(src_w: u32, src_h: u32, percent: u32) -> RasterResult<(u32, u32)> {
    if src_w == 0 || src_h == 0 {
        return Err(RasterError::validation("source image is empty"));
    }
    if percent == 0 {
        return Err(RasterError::validation("canvas percent must be >= 1"));
    }
    let long = (REFERENCE_CANVAS_PX * f64::from(percent) / 100.0).round().max(1.0);
    let (w, h) = (f64::from(src_w), f64::from(src_h));
    let (out_w, out_h) = if w >= h {
        (long, (long * h / w).round().max(1.0))
    } else {
        ((long * w / h).round().max(1.0), long)
    };
    Ok((out_w as u32, out_h as u32))
}

/// Exported still.
#[derive(Clone, Debug, PartialEq)]
pub enum StillExport {
    /// PNG bytes.
    Png(Vec<u8>),
    /// SVG text.
    Svg(String),
}

#[derive(Clone, Debug)]
struct LastRender {
    bitmap: Bitmap,
    plan: MarkPlan,
}

/// Still-image pipeline with a one-entry result cache.
///
/// The cache only serves [`StillSession::resize_view`] and exports; it is dropped whenever the
/// source or the parameters change.
#[derive(Debug)]
pub struct StillSession {
    source: Option<Bitmap>,
    params: StillParams,
    rasterizer: CpuRasterizer,
    rng: fastrand::Rng,
    last: Option<LastRender>,
}

impl StillSession {
    /// Session without a source. Grain is seeded from entropy.
    pub fn new(params: StillParams) -> RasterResult<Self> {
        Self::with_rng(params, fastrand::Rng::new())
    }

    /// Session whose grain comes from `rng`.
    pub fn with_rng(params: StillParams, rng: fastrand::Rng) -> RasterResult<Self> {
        Ok(Self {
            source: None,
            params: params.normalized()?,
            rasterizer: CpuRasterizer::new(),
            rng,
            last: None,
        })
    }

    /// Current (normalized) parameters.
    pub fn params(&self) -> &StillParams {
        &self.params
    }

    /// Source bitmap, if any.
    pub fn source(&self) -> Option<&Bitmap> {
        self.source.as_ref()
    }

    /// Replace the source image.
    pub fn set_source(&mut self, source: Bitmap) -> RasterResult<()> {
        if source.is_empty() {
            return Err(RasterError::validation("source image is empty"));
        }
        self.source = Some(source);
        self.last = None;
        Ok(())
    }

    /// Replace the parameters; the cached result is dropped when they differ.
    pub fn set_params(&mut self, params: StillParams) -> RasterResult<()> {
        let params = params.normalized()?;
        if params != self.params {
            self.params = params;
            self.last = None;
        }
        Ok(())
    }

    /// Canvas size for the current source and `canvas_percent`.
    pub fn canvas_size(&self) -> RasterResult<Option<(u32, u32)>> {
        self.source
            .as_ref()
            .map(|s| fit_canvas(s.width(), s.height(), self.params.canvas_percent))
            .transpose()
    }

    /// Last full render, if still valid.
    pub fn last_result(&self) -> Option<&Bitmap> {
        self.last.as_ref().map(|l| &l.bitmap)
    }

    /// Run the full pipeline. `Ok(None)` when no source is loaded.
    #[tracing::instrument(skip(self), fields(mode = ?self.params.effect.mode))]
    pub fn render_full(&mut self) -> RasterResult<Option<Bitmap>> {
        let Some(canvas) = self.fitted_source()? else {
            return Ok(None);
        };
        let pre = preprocess(&canvas, &self.params.preprocess, &mut self.rng)?;
        let (bitmap, plan) = if self.params.draws_marks() {
            let grid = sample_grid(
                &pre,
                self.params.effect.grid_columns,
                self.params.effect.grid_rows,
            )?;
            let plan = compile_marks(&grid, &self.params.effect)?;
            (self.rasterizer.rasterize(&plan)?, plan)
        } else {
            (pre.clone(), MarkPlan::empty(pre.width(), pre.height()))
        };
        self.last = Some(LastRender {
            bitmap: bitmap.clone(),
            plan,
        });
        Ok(Some(bitmap))
    }

    /// Cheap approximation for interactive feedback: capped grid, gamma/levels only.
    ///
    /// Does not touch the cached full result.
    #[tracing::instrument(skip(self), fields(mode = ?self.params.effect.mode))]
    pub fn render_preview(&mut self) -> RasterResult<Option<Bitmap>> {
        let Some(canvas) = self.fitted_source()? else {
            return Ok(None);
        };
        let pre = preprocess_light(&canvas, &self.params.preprocess)?;
        if !self.params.draws_marks() {
            return Ok(Some(pre));
        }
        let cap = preview_grid_cap(self.params.effect.mode);
        let mut effect = self.params.effect.clone();
        effect.grid_columns = effect.grid_columns.min(cap);
        effect.grid_rows = effect.grid_rows.min(cap);
        let grid = sample_grid(&pre, effect.grid_columns, effect.grid_rows)?;
        let plan = compile_marks(&grid, &effect)?;
        Ok(Some(self.rasterizer.rasterize(&plan)?))
    }

    /// Render at the tier suited to the grid density.
    ///
    /// [`PreviewTier::Skip`] returns the cached result (possibly `None`) without rendering.
    pub fn render_interactive(&mut self) -> RasterResult<Option<Bitmap>> {
        let tier = preview_tier(self.params.effect.cell_count());
        tracing::debug!(?tier, cells = self.params.effect.cell_count(), "interactive render");
        match tier {
            PreviewTier::Full => self.render_full(),
            PreviewTier::Lightweight => self.render_preview(),
            PreviewTier::Skip => Ok(self.last_result().cloned()),
        }
    }

    /// Cached result resampled to a different canvas percentage.
    ///
    /// Falls back to a full render when nothing is cached. The parameters are not changed.
    pub fn resize_view(&mut self, percent: u32) -> RasterResult<Option<Bitmap>> {
        let Some(source) = self.source.as_ref() else {
            return Ok(None);
        };
        let (w, h) = fit_canvas(source.width(), source.height(), percent)?;
        if self.last.is_none() {
            self.render_full()?;
        }
        match self.last.as_ref() {
            Some(last) => Ok(Some(resize_bitmap(&last.bitmap, w, h)?)),
            None => Ok(None),
        }
    }

    /// Vector document of the cached (or freshly rendered) result.
    pub fn vector_document(&mut self) -> RasterResult<Option<VectorDocument>> {
        if self.last.is_none() {
            self.render_full()?;
        }
        Ok(self.last.as_ref().map(|l| emit_vector(&l.plan)))
    }

    /// Export in `format`. `Ok(None)` when no source is loaded.
    pub fn export(&mut self, format: OutputFormat) -> RasterResult<Option<StillExport>> {
        match format {
            OutputFormat::Png => {
                if self.last.is_none() {
                    self.render_full()?;
                }
                self.last
                    .as_ref()
                    .map(|l| encode_png(&l.bitmap).map(StillExport::Png))
                    .transpose()
            }
            OutputFormat::Svg => Ok(self
                .vector_document()?
                .map(|doc| StillExport::Svg(doc.to_svg_string()))),
        }
    }

    fn fitted_source(&self) -> RasterResult<Option<Bitmap>> {
        let Some(source) = self.source.as_ref() else {
            return Ok(None);
        };
        let (w, h) = fit_canvas(source.width(), source.height(), self.params.canvas_percent)?;
        let resized = resize_bitmap(source, w, h)?;
        // Sampling ignores alpha; transparent areas must read as paper.
        Ok(Some(flatten_over(&Bitmap::white(w, h)?, &resized)?))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/still.rs"]
mod tests;
