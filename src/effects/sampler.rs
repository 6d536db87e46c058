use crate::foundation::core::{Bitmap, Rect, Rgb8};
use crate::foundation::error::{RasterError, RasterResult};
use crate::foundation::math::luma;

/// Brightness and mean color of one sampled cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CellAggregate {
    /// Mean Rec. 601 luma, `0..=255`.
    pub brightness: f64,
    /// Per-channel mean, each rounded independently.
    pub mean_color: Rgb8,
}

impl CellAggregate {
    /// Result for a cell that covers no pixels.
    pub const NEUTRAL: Self = Self {
        brightness: 128.0,
        mean_color: Rgb8::BLACK,
    };
}

/// Aggregate the pixels of `[x, x + w) x [y, y + h)`, clamped to the bitmap.
///
/// A request that misses the bitmap yields [`CellAggregate::NEUTRAL`]. Alpha is ignored, so
/// callers flatten transparent sources onto paper first.
pub fn compute_cell(bitmap: &Bitmap, x: i64, y: i64, w: i64, h: i64) -> CellAggregate {
    let bw = i64::from(bitmap.width());
    let bh = i64::from(bitmap.height());
    let x0 = x.clamp(0, bw);
    let y0 = y.clamp(0, bh);
    let x1 = x.saturating_add(w.max(0)).clamp(0, bw);
    let y1 = y.saturating_add(h.max(0)).clamp(0, bh);
    if x1 <= x0 || y1 <= y0 {
        return CellAggregate::NEUTRAL;
    }

    let data = bitmap.pixels();
    let stride = bw as usize * 4;
    let mut sum = [0u64; 3];
    for row in y0 as usize..y1 as usize {
        let line = &data[row * stride + x0 as usize * 4..row * stride + x1 as usize * 4];
        for px in line.chunks_exact(4) {
            sum[0] += u64::from(px[0]);
            sum[1] += u64::from(px[1]);
            sum[2] += u64::from(px[2]);
        }
    }
    let n = ((x1 - x0) * (y1 - y0)) as f64;
    let mean = sum.map(|s| s as f64 / n);
    CellAggregate {
        // Luma is linear, so the luma of the mean equals the mean luma.
        brightness: 0.299 * mean[0] + 0.587 * mean[1] + 0.114 * mean[2],
        mean_color: Rgb8::new(
            mean[0].round() as u8,
            mean[1].round() as u8,
            mean[2].round() as u8,
        ),
    }
}

/// Integer span `[start, end)` of cell `index` when `extent` pixels are split into `count`.
///
/// Consecutive spans tile `0..extent` exactly when `count <= extent`. With more cells than
/// pixels, a span that would be empty is widened to the single pixel it falls on, so every
/// in-bounds cell samples real image data.
pub fn cell_span(extent: u32, count: u32, index: u32) -> (u32, u32) {
    let count = u64::from(count.max(1));
    let extent = u64::from(extent);
    let start = u64::from(index) * extent / count;
    let end = ((u64::from(index) + 1) * extent / count).min(extent);
    if end > start || extent == 0 {
        return (start as u32, end as u32);
    }
    let start = start.min(extent - 1);
    (start as u32, (start + 1) as u32)
}

/// Per-cell aggregates of a bitmap partitioned into `columns x rows`.
#[derive(Clone, Debug, PartialEq)]
pub struct CellGrid {
    columns: u32,
    rows: u32,
    width: u32,
    height: u32,
    cells: Vec<CellAggregate>,
}

impl CellGrid {
    /// Cells across.
    pub fn columns(&self) -> u32 {
        self.columns
    }

    /// Cells down.
    pub fn rows(&self) -> u32 {
        self.rows
    }

    /// Size of the sampled bitmap.
    pub fn canvas_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Fractional cell width used for mark geometry.
    pub fn cell_width(&self) -> f64 {
        f64::from(self.width) / f64::from(self.columns)
    }

    /// Fractional cell height used for mark geometry.
    pub fn cell_height(&self) -> f64 {
        f64::from(self.height) / f64::from(self.rows)
    }

    /// Total number of cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// `true` for a grid without cells.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Aggregate of cell `(column, row)`.
    pub fn get(&self, column: u32, row: u32) -> Option<&CellAggregate> {
        if column >= self.columns || row >= self.rows {
            return None;
        }
        self.cells
            .get(row as usize * self.columns as usize + column as usize)
    }

    /// Geometric cell rectangle in canvas pixels.
    pub fn cell_rect(&self, column: u32, row: u32) -> Rect {
        let cw = self.cell_width();
        let ch = self.cell_height();
        let x = f64::from(column) * cw;
        let y = f64::from(row) * ch;
        Rect::new(x, y, x + cw, y + ch)
    }

    /// Cells in row-major order as `(column, row, aggregate)`.
    pub fn iter(&self) -> impl Iterator<Item = (u32, u32, &CellAggregate)> + '_ {
        let columns = self.columns as usize;
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, c)| ((i % columns) as u32, (i / columns) as u32, c))
    }
}

/// Sample every cell of a `columns x rows` partition of `bitmap`.
#[tracing::instrument(skip(bitmap), fields(w = bitmap.width(), h = bitmap.height()))]
pub fn sample_grid(bitmap: &Bitmap, columns: u32, rows: u32) -> RasterResult<CellGrid> {
    if columns == 0 || rows == 0 {
        return Err(RasterError::validation("grid needs at least one column and row"));
    }
    if bitmap.is_empty() {
        return Err(RasterError::validation("cannot sample an empty bitmap"));
    }
    let (w, h) = bitmap.dims();
    let mut cells = Vec::with_capacity(columns as usize * rows as usize);
    for row in 0..rows {
        let (y0, y1) = cell_span(h, rows, row);
        for column in 0..columns {
            let (x0, x1) = cell_span(w, columns, column);
            cells.push(compute_cell(
                bitmap,
                i64::from(x0),
                i64::from(y0),
                i64::from(x1 - x0),
                i64::from(y1 - y0),
            ));
        }
    }
    Ok(CellGrid {
        columns,
        rows,
        width: w,
        height: h,
        cells,
    })
}

/// Luma of one pixel, shared with the frame compositor.
pub(crate) fn pixel_brightness(px: [u8; 4]) -> f64 {
    luma(px[0], px[1], px[2])
}

#[cfg(test)]
#[path = "../../tests/unit/effects/sampler.rs"]
mod tests;
