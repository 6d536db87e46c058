use super::*;

fn checker(w: u32, h: u32) -> Bitmap {
    let mut data = Vec::with_capacity((w * h * 4) as usize);
    for y in 0..h {
        for x in 0..w {
            let v = if (x + y) % 2 == 0 { 0 } else { 255 };
            data.extend_from_slice(&[v, v, v, 255]);
        }
    }
    Bitmap::from_rgba8(w, h, data).unwrap()
}

#[test]
fn out_of_bounds_and_empty_cells_are_neutral() {
    let bmp = Bitmap::white(4, 4).unwrap();
    assert_eq!(compute_cell(&bmp, 10, 10, 3, 3), CellAggregate::NEUTRAL);
    assert_eq!(compute_cell(&bmp, 0, 0, 0, 2), CellAggregate::NEUTRAL);
    assert_eq!(compute_cell(&bmp, -5, 0, 5, 2), CellAggregate::NEUTRAL);
}

#[test]
fn partially_outside_cells_are_clamped() {
    let bmp = Bitmap::filled(4, 4, [200, 100, 50, 255]).unwrap();
    let c = compute_cell(&bmp, 2, 2, 10, 10);
    assert_eq!(c.mean_color, Rgb8::new(200, 100, 50));
}

#[test]
fn mean_color_rounds_each_channel() {
    let bmp = Bitmap::from_rgba8(2, 1, vec![0, 1, 10, 255, 1, 2, 11, 255]).unwrap();
    let c = compute_cell(&bmp, 0, 0, 2, 1);
    // 0.5 -> 1, 1.5 -> 2, 10.5 -> 11
    assert_eq!(c.mean_color, Rgb8::new(1, 2, 11));
    assert!((c.brightness - luma(0, 1, 10) / 2.0 - luma(1, 2, 11) / 2.0).abs() < 1e-9);
}

#[test]
fn spans_tile_the_extent_exactly() {
    for (extent, count) in [(600u32, 7u32), (10, 3), (5, 5), (601, 100)] {
        let mut next = 0;
        for i in 0..count {
            let (s, e) = cell_span(extent, count, i);
            assert_eq!(s, next);
            assert!(e >= s);
            next = e;
        }
        assert_eq!(next, extent);
    }
}

#[test]
fn spans_never_empty_with_more_cells_than_pixels() {
    for (extent, count) in [(5u32, 8u32), (10, 20), (1, 3), (60, 110)] {
        for i in 0..count {
            let (s, e) = cell_span(extent, count, i);
            assert_eq!(e - s, 1, "extent {extent} count {count} index {i}");
            assert!(e <= extent);
        }
    }
}

#[test]
fn oversubdivided_white_grid_stays_white() {
    let grid = sample_grid(&Bitmap::white(10, 10).unwrap(), 20, 20).unwrap();
    assert_eq!(grid.len(), 400);
    assert!(grid.iter().all(|(_, _, c)| c.brightness == 255.0));
}

#[test]
fn grid_covers_every_pixel_once() {
    let bmp = checker(37, 23);
    let grid = sample_grid(&bmp, 6, 5).unwrap();
    let mut covered = 0u64;
    for row in 0..grid.rows() {
        let (y0, y1) = cell_span(23, 5, row);
        for column in 0..grid.columns() {
            let (x0, x1) = cell_span(37, 6, column);
            covered += u64::from((x1 - x0) * (y1 - y0));
        }
    }
    assert_eq!(covered, 37 * 23);
    assert_eq!(grid.len(), 30);
}

#[test]
fn grid_iterates_row_major() {
    let grid = sample_grid(&Bitmap::white(4, 4).unwrap(), 2, 2).unwrap();
    let order: Vec<(u32, u32)> = grid.iter().map(|(c, r, _)| (c, r)).collect();
    assert_eq!(order, vec![(0, 0), (1, 0), (0, 1), (1, 1)]);
    assert_eq!(grid.cell_rect(1, 1), Rect::new(2.0, 2.0, 4.0, 4.0));
}

#[test]
fn zero_columns_is_rejected() {
    assert!(sample_grid(&Bitmap::white(2, 2).unwrap(), 0, 1).is_err());
}
