//! Grid coordinates and world-unit conversions.
//!
//! Two integer coordinate systems cover the map: [`Cell`] addresses a grid
//! square by its column/row, and [`Corner`] addresses a grid intersection
//! (one unit per cell corner). Wall endpoints live on corners; tokens and
//! terrain live on cells. [`Grid`] converts both into world units, which is
//! the space all geometry runs in.

#[cfg(test)]
#[path = "grid_test.rs"]
mod grid_test;

use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_CELL_SIZE, FEET_PER_CELL};
use crate::geometry::Point;

/// A grid cell coordinate. `(0, 0)` is the top-left cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    #[must_use]
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another cell, in cells.
    #[must_use]
    pub fn distance(self, other: Cell) -> f64 {
        let dx = f64::from(other.x - self.x);
        let dy = f64::from(other.y - self.y);
        dx.hypot(dy)
    }

    /// The four orthogonal neighbors.
    #[must_use]
    pub fn neighbors(self) -> [Cell; 4] {
        [
            Cell::new(self.x + 1, self.y),
            Cell::new(self.x - 1, self.y),
            Cell::new(self.x, self.y + 1),
            Cell::new(self.x, self.y - 1),
        ]
    }
}

/// A grid-intersection coordinate. Corner `(x, y)` is the top-left corner of
/// cell `(x, y)`; a map of `w × h` cells has `(w+1) × (h+1)` corners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Corner {
    pub x: i32,
    pub y: i32,
}

impl Corner {
    #[must_use]
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Grid geometry for one map: cell size in world units plus a rendering
/// alignment offset.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Grid {
    pub cell_size: f64,
    #[serde(default)]
    pub offset_x: f64,
    #[serde(default)]
    pub offset_y: f64,
}

impl Default for Grid {
    fn default() -> Self {
        Self { cell_size: DEFAULT_CELL_SIZE, offset_x: 0.0, offset_y: 0.0 }
    }
}

impl Grid {
    /// Build a grid, substituting the default cell size when the given one is
    /// not positive and normalizing offsets modulo the cell size.
    #[must_use]
    pub fn new(cell_size: f64, offset_x: f64, offset_y: f64) -> Self {
        let cell_size = if cell_size > 0.0 && cell_size.is_finite() {
            cell_size
        } else {
            DEFAULT_CELL_SIZE
        };
        Self {
            cell_size,
            offset_x: offset_x.rem_euclid(cell_size),
            offset_y: offset_y.rem_euclid(cell_size),
        }
    }

    /// World position of a cell's center.
    #[must_use]
    pub fn cell_center(&self, cell: Cell) -> Point {
        Point {
            x: self.offset_x + (f64::from(cell.x) + 0.5) * self.cell_size,
            y: self.offset_y + (f64::from(cell.y) + 0.5) * self.cell_size,
        }
    }

    /// World position of a grid intersection.
    #[must_use]
    pub fn corner_point(&self, corner: Corner) -> Point {
        Point {
            x: self.offset_x + f64::from(corner.x) * self.cell_size,
            y: self.offset_y + f64::from(corner.y) * self.cell_size,
        }
    }

    /// The cell containing a world point.
    #[must_use]
    pub fn world_to_cell(&self, p: Point) -> Cell {
        #[allow(clippy::cast_possible_truncation)]
        Cell {
            x: ((p.x - self.offset_x) / self.cell_size).floor() as i32,
            y: ((p.y - self.offset_y) / self.cell_size).floor() as i32,
        }
    }

    /// The grid intersection nearest to a world point.
    #[must_use]
    pub fn snap_corner(&self, p: Point) -> Corner {
        #[allow(clippy::cast_possible_truncation)]
        Corner {
            x: ((p.x - self.offset_x) / self.cell_size).round() as i32,
            y: ((p.y - self.offset_y) / self.cell_size).round() as i32,
        }
    }

    /// Convert a distance in cells to world units.
    #[must_use]
    pub fn cells_to_world(&self, cells: f64) -> f64 {
        cells * self.cell_size
    }
}

/// Convert a distance in cells to feet at the rules-engine boundary.
#[must_use]
pub fn cells_to_feet(cells: f64) -> f64 {
    cells * FEET_PER_CELL
}

/// Convert a distance in feet to cells at the rules-engine boundary.
#[must_use]
pub fn feet_to_cells(feet: f64) -> f64 {
    feet / FEET_PER_CELL
}
