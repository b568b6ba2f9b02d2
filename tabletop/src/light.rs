//! Lighting compositor: per-cell bright/dim/dark classification.
//!
//! Light level is a per-cell property independent of line of sight. Each
//! cell takes the maximum of the ambient level and every active source
//! covering it: bright inside the source's bright radius, dim inside its dim
//! radius. Walls do not occlude light here; visibility additionally requires
//! an unbroken sightline, which [`crate::visibility`] checks separately.
//!
//! Darkvision is observer-relative: it promotes dark cells to dim (never to
//! bright) within the observer's darkvision range, for that observer only.

#[cfg(test)]
#[path = "light_test.rs"]
mod light_test;

use serde::{Deserialize, Serialize};

use crate::grid::Cell;
use crate::world::{AmbientLight, WorldModel};

/// Light classification of one cell. Ordered so `max` composites correctly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LightLevel {
    Dark,
    Dim,
    Bright,
}

impl From<AmbientLight> for LightLevel {
    fn from(ambient: AmbientLight) -> Self {
        match ambient {
            AmbientLight::Bright => LightLevel::Bright,
            AmbientLight::Dim => LightLevel::Dim,
            AmbientLight::Darkness => LightLevel::Dark,
        }
    }
}

/// Composite light level of a cell with no observer in play: the maximum of
/// ambient and every active source covering the cell.
#[must_use]
pub fn cell_light(world: &WorldModel, cell: Cell) -> LightLevel {
    let grid = &world.map.grid;
    let target = grid.cell_center(cell);

    let mut level = LightLevel::from(world.ambient());
    for source in world.lights().filter(|l| l.active) {
        if level == LightLevel::Bright {
            break;
        }
        let Some(source_cell) = world.light_cell(source) else {
            continue;
        };
        let center = grid.cell_center(source_cell);
        let bright = grid.cells_to_world(f64::from(source.bright_radius));
        let dim = grid.cells_to_world(f64::from(source.dim_radius));

        let contribution = if crate::geometry::point_in_circle(target, center, bright) {
            LightLevel::Bright
        } else if crate::geometry::point_in_circle(target, center, dim) {
            LightLevel::Dim
        } else {
            continue;
        };
        level = level.max(contribution);
    }
    level
}

/// Composite light level as one observer perceives it: [`cell_light`] plus
/// the darkvision promotion dark→dim within `darkvision` cells of
/// `observer_cell`.
#[must_use]
pub fn cell_light_for_observer(
    world: &WorldModel,
    cell: Cell,
    observer_cell: Cell,
    darkvision: u32,
) -> LightLevel {
    let level = cell_light(world, cell);
    if level == LightLevel::Dark
        && darkvision > 0
        && observer_cell.distance(cell) <= f64::from(darkvision)
    {
        return LightLevel::Dim;
    }
    level
}
