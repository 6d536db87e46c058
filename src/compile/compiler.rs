use std::f64::consts::{FRAC_PI_2, TAU};

use crate::compile::plan::{Mark, MarkPlan};
use crate::effects::sampler::{CellAggregate, CellGrid};
use crate::foundation::core::{Point, Rgb8};
use crate::foundation::error::RasterResult;
use crate::foundation::math::{TextureRng, pseudo_noise};
use crate::scene::params::{EffectMode, EffectParameters};

/// Canvas long side at which mark sizes are taken literally.
pub const REFERENCE_CANVAS_PX: f64 = 600.0;

const RASTER_LENGTH_FACTOR: f64 = 1.2;
const SATELLITE_COUNT: u32 = 4;
const SATELLITE_DISTANCE: f64 = 0.8;
const SATELLITE_RADIUS: f64 = 0.15;
const TEXTURE_LENGTH_FACTOR: f64 = 0.8;
const TEXTURE_NOISE_SCALE: f64 = 0.05;

/// Turn sampled cells into marks according to `effect`.
///
/// A cell gets marks only when its brightness is strictly below `effect.threshold`. Mark size
/// grows linearly from `min_size` (white) to `max_size` (black) and is scaled by the canvas long
/// side relative to [`REFERENCE_CANVAS_PX`].
#[tracing::instrument(skip(grid, effect), fields(mode = ?effect.mode, cells = grid.len()))]
pub fn compile_marks(grid: &CellGrid, effect: &EffectParameters) -> RasterResult<MarkPlan> {
    let effect = effect.normalized()?;
    let (w, h) = grid.canvas_size();
    let mut plan = MarkPlan::empty(w, h);
    if effect.mode == EffectMode::None {
        return Ok(plan);
    }

    let cx = MarkContext {
        effect: &effect,
        scale: f64::from(w.max(h)) / REFERENCE_CANVAS_PX,
        cell_w: grid.cell_width(),
        cell_h: grid.cell_height(),
    };
    plan.performance_mode = effect.mode == EffectMode::Texture
        && grid.len() as u64 > effect.texture_performance_cells;
    if plan.performance_mode {
        tracing::debug!(
            cells = grid.len(),
            limit = effect.texture_performance_cells,
            "texture performance mode"
        );
    }

    let threshold = f64::from(effect.threshold);
    for (column, row, cell) in grid.iter() {
        if cell.brightness >= threshold {
            continue;
        }
        let origin = Point::new(f64::from(column) * cx.cell_w, f64::from(row) * cx.cell_h);
        match effect.mode {
            EffectMode::Raster => cx.raster(origin, cell, &mut plan.marks),
            EffectMode::Dots => cx.dots(origin, cell, &mut plan.marks),
            EffectMode::Texture => cx.texture(
                column,
                row,
                origin,
                cell,
                plan.performance_mode,
                &mut plan.marks,
            ),
            EffectMode::None => {}
        }
    }
    Ok(plan)
}

struct MarkContext<'a> {
    effect: &'a EffectParameters,
    scale: f64,
    cell_w: f64,
    cell_h: f64,
}

impl MarkContext<'_> {
    fn size(&self, brightness: f64) -> f64 {
        let e = self.effect;
        (e.min_size + (e.max_size - e.min_size) * (1.0 - brightness / 255.0)) * self.scale
    }

    fn color(&self, cell: &CellAggregate) -> Rgb8 {
        if self.effect.use_original_color {
            cell.mean_color
        } else {
            self.effect.ink_color
        }
    }

    fn center(&self, origin: Point) -> Point {
        Point::new(origin.x + self.cell_w / 2.0, origin.y + self.cell_h / 2.0)
    }

    fn raster(&self, origin: Point, cell: &CellAggregate, out: &mut Vec<Mark>) {
        let angle = self.effect.angle_degrees.to_radians() + FRAC_PI_2;
        let half = self.cell_w.max(self.cell_h) * RASTER_LENGTH_FACTOR / 2.0;
        let c = self.center(origin);
        let (dx, dy) = (angle.cos() * half, angle.sin() * half);
        out.push(Mark::Line {
            from: Point::new(c.x - dx, c.y - dy),
            to: Point::new(c.x + dx, c.y + dy),
            width: self.size(cell.brightness),
            color: self.color(cell),
        });
    }

    fn dots(&self, origin: Point, cell: &CellAggregate, out: &mut Vec<Mark>) {
        let size = self.size(cell.brightness);
        let color = self.color(cell);
        let c = self.center(origin);
        out.push(Mark::Circle {
            center: c,
            radius: size / 2.0,
            color,
        });
        if !self.effect.use_decoration {
            return;
        }
        let distance = size * SATELLITE_DISTANCE;
        for i in 0..SATELLITE_COUNT {
            let a = f64::from(i) / f64::from(SATELLITE_COUNT) * TAU;
            out.push(Mark::Circle {
                center: Point::new(c.x + a.cos() * distance, c.y + a.sin() * distance),
                radius: size * SATELLITE_RADIUS,
                color,
            });
        }
    }

    fn texture(
        &self,
        column: u32,
        row: u32,
        origin: Point,
        cell: &CellAggregate,
        performance: bool,
        out: &mut Vec<Mark>,
    ) {
        let width = self.size(cell.brightness);
        let color = self.color(cell);
        let short = self.cell_w.min(self.cell_h);
        let length = short * TEXTURE_LENGTH_FACTOR;
        let density = if performance {
            ((short / 16.0).floor() as u32).max(1)
        } else {
            ((short / 8.0).floor() as u32).max(2)
        };

        let mut rng = TextureRng::for_cell(column, row);
        for _ in 0..density {
            let rx = rng.next_f64();
            let ry = rng.next_f64();
            let from = Point::new(origin.x + rx * self.cell_w, origin.y + ry * self.cell_h);
            let angle = pseudo_noise(
                (f64::from(column) + rx) * TEXTURE_NOISE_SCALE,
                (f64::from(row) + ry) * TEXTURE_NOISE_SCALE,
            ) * TAU;
            let variation = rng.next_f64() * 0.5 + 0.5;
            let to = Point::new(
                from.x + angle.cos() * length * variation,
                from.y + angle.sin() * length * variation,
            );
            if performance {
                out.push(Mark::Line {
                    from,
                    to,
                    width,
                    color,
                });
                continue;
            }
            let control = Point::new(
                (from.x + to.x) / 2.0 + (rng.next_f64() - 0.5) * self.cell_w / 4.0,
                (from.y + to.y) / 2.0 + (rng.next_f64() - 0.5) * self.cell_h / 4.0,
            );
            out.push(Mark::Quad {
                from,
                control,
                to,
                width,
                color,
            });
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compile/compiler.rs"]
mod tests;
