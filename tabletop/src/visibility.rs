//! Visibility computer: which cells an observer currently sees.
//!
//! The host is omniscient — every map cell is visible and fog never hides
//! anything from it. A token observer sees a cell when an unobstructed ray
//! runs from its center to the cell's center (solid walls and closed doors
//! block; windows and open doors do not) AND the cell's composited light
//! level is not dark for that observer.
//!
//! The result is a full replacement for the previous visible set, never a
//! merge; [`crate::fog::FogOfWar::refresh`] handles the monotonic union into
//! the explored layer.

#[cfg(test)]
#[path = "visibility_test.rs"]
mod visibility_test;

use std::collections::BTreeSet;

use crate::geometry;
use crate::grid::Cell;
use crate::light::{LightLevel, cell_light_for_observer};
use crate::world::{TokenId, WorldModel};

/// Whose fog/visibility is being computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Observer {
    /// The game master: omniscient, all cells visible.
    Host,
    /// A token on the map; ranges and darkvision come from the token.
    Token(TokenId),
}

/// Compute the set of cells currently visible to an observer.
///
/// An unknown token id yields the empty set: a stale recompute request after
/// a token was removed reveals nothing rather than erring.
#[must_use]
pub fn compute_visible(world: &WorldModel, observer: Observer) -> BTreeSet<Cell> {
    match observer {
        Observer::Host => all_cells(world),
        Observer::Token(id) => world
            .token(id)
            .map_or_else(BTreeSet::new, |token| token_visible(world, token.center_cell(), token.vision_range, token.darkvision)),
    }
}

/// Union of visibility over every player-controlled token: the shared
/// "players" fog category.
#[must_use]
pub fn player_visible(world: &WorldModel) -> BTreeSet<Cell> {
    let mut out = BTreeSet::new();
    for token in world.tokens().filter(|t| t.player_controlled) {
        out.extend(token_visible(world, token.center_cell(), token.vision_range, token.darkvision));
    }
    out
}

fn all_cells(world: &WorldModel) -> BTreeSet<Cell> {
    let mut out = BTreeSet::new();
    for y in 0..world.map.rows() {
        for x in 0..world.map.cols() {
            out.insert(Cell::new(x, y));
        }
    }
    out
}

fn token_visible(world: &WorldModel, origin: Cell, range: u32, darkvision: u32) -> BTreeSet<Cell> {
    let mut out = BTreeSet::new();
    // Zero-range perception (blinded) still sees the cell stood on.
    if world.map.contains_cell(origin) {
        out.insert(origin);
    }
    if range == 0 {
        return out;
    }

    let grid = &world.map.grid;
    let origin_pt = grid.cell_center(origin);
    let range_f = f64::from(range);
    let blockers = world.sight_blockers();

    #[allow(clippy::cast_possible_wrap)]
    let r = range as i32;
    for dy in -r..=r {
        for dx in -r..=r {
            let cell = Cell::new(origin.x + dx, origin.y + dy);
            if cell == origin || !world.map.contains_cell(cell) {
                continue;
            }
            if origin.distance(cell) > range_f {
                continue;
            }
            let target_pt = grid.cell_center(cell);
            if geometry::cast_ray(origin_pt, target_pt, &blockers).is_some() {
                continue;
            }
            if cell_light_for_observer(world, cell, origin, darkvision) == LightLevel::Dark {
                continue;
            }
            out.insert(cell);
        }
    }
    out
}
