#![allow(clippy::float_cmp)]

use super::*;

const EPSILON: f64 = 1e-10;

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

// --- Cell ---

#[test]
fn cell_distance_axis_aligned() {
    assert!(approx_eq(Cell::new(2, 5).distance(Cell::new(8, 5)), 6.0));
}

#[test]
fn cell_distance_diagonal() {
    assert!(approx_eq(Cell::new(0, 0).distance(Cell::new(3, 4)), 5.0));
}

#[test]
fn cell_distance_to_self_is_zero() {
    assert!(approx_eq(Cell::new(7, -3).distance(Cell::new(7, -3)), 0.0));
}

#[test]
fn cell_neighbors_are_orthogonal() {
    let n = Cell::new(4, 4).neighbors();
    assert!(n.contains(&Cell::new(5, 4)));
    assert!(n.contains(&Cell::new(3, 4)));
    assert!(n.contains(&Cell::new(4, 5)));
    assert!(n.contains(&Cell::new(4, 3)));
}

// --- Grid construction ---

#[test]
fn grid_default_cell_size() {
    let grid = Grid::default();
    assert_eq!(grid.cell_size, DEFAULT_CELL_SIZE);
}

#[test]
fn grid_new_rejects_nonpositive_cell_size() {
    assert_eq!(Grid::new(0.0, 0.0, 0.0).cell_size, DEFAULT_CELL_SIZE);
    assert_eq!(Grid::new(-4.0, 0.0, 0.0).cell_size, DEFAULT_CELL_SIZE);
    assert_eq!(Grid::new(f64::NAN, 0.0, 0.0).cell_size, DEFAULT_CELL_SIZE);
}

#[test]
fn grid_new_normalizes_offsets_modulo_cell_size() {
    let grid = Grid::new(50.0, 120.0, -30.0);
    assert!(approx_eq(grid.offset_x, 20.0));
    assert!(approx_eq(grid.offset_y, 20.0));
}

// --- Conversions ---

#[test]
fn cell_center_is_half_cell_in() {
    let grid = Grid::new(50.0, 0.0, 0.0);
    let c = grid.cell_center(Cell::new(2, 5));
    assert!(approx_eq(c.x, 125.0));
    assert!(approx_eq(c.y, 275.0));
}

#[test]
fn cell_center_respects_offset() {
    let grid = Grid::new(50.0, 10.0, 5.0);
    let c = grid.cell_center(Cell::new(0, 0));
    assert!(approx_eq(c.x, 35.0));
    assert!(approx_eq(c.y, 30.0));
}

#[test]
fn corner_point_is_cell_corner() {
    let grid = Grid::new(50.0, 0.0, 0.0);
    let p = grid.corner_point(Corner::new(5, 10));
    assert!(approx_eq(p.x, 250.0));
    assert!(approx_eq(p.y, 500.0));
}

#[test]
fn world_to_cell_floors() {
    let grid = Grid::new(50.0, 0.0, 0.0);
    assert_eq!(grid.world_to_cell(Point::new(49.9, 0.1)), Cell::new(0, 0));
    assert_eq!(grid.world_to_cell(Point::new(50.0, 0.1)), Cell::new(1, 0));
    assert_eq!(grid.world_to_cell(Point::new(-0.1, -0.1)), Cell::new(-1, -1));
}

#[test]
fn world_to_cell_round_trips_cell_center() {
    let grid = Grid::new(37.5, 12.0, 3.0);
    for cell in [Cell::new(0, 0), Cell::new(4, 9), Cell::new(13, 2)] {
        assert_eq!(grid.world_to_cell(grid.cell_center(cell)), cell);
    }
}

#[test]
fn snap_corner_picks_nearest_intersection() {
    let grid = Grid::new(50.0, 0.0, 0.0);
    assert_eq!(grid.snap_corner(Point::new(24.0, 26.0)), Corner::new(0, 1));
    assert_eq!(grid.snap_corner(Point::new(26.0, 24.0)), Corner::new(1, 0));
    assert_eq!(grid.snap_corner(Point::new(249.0, 501.0)), Corner::new(5, 10));
}

#[test]
fn cells_to_world_scales_by_cell_size() {
    let grid = Grid::new(50.0, 0.0, 0.0);
    assert!(approx_eq(grid.cells_to_world(3.0), 150.0));
}

// --- Feet conversion boundary ---

#[test]
fn feet_per_cell_convention() {
    assert!(approx_eq(cells_to_feet(6.0), 30.0));
    assert!(approx_eq(feet_to_cells(30.0), 6.0));
}

#[test]
fn feet_round_trip() {
    assert!(approx_eq(feet_to_cells(cells_to_feet(7.3)), 7.3));
}
