//! Movement validator: allow/deny plus cost for a proposed token relocation.
//!
//! Pure and side-effect-free: the same function validates a live drag (for a
//! "can I reach here" preview) and authoritatively gates a committed move.
//! Cost is the Euclidean cell distance converted to feet (5 ft per cell),
//! plus a surcharge for each cell entered along a straight-line
//! approximation of the path: a cell with cost multiplier m costs m cells
//! of travel instead of one. Impassable terrain or a movement-blocking wall
//! across the path rejects outright. No partial move is ever synthesized;
//! on rejection the caller snaps the token back.

#[cfg(test)]
#[path = "movement_test.rs"]
mod movement_test;

use serde::{Deserialize, Serialize};

use crate::consts::PATH_SAMPLE_STEP;
use crate::geometry;
use crate::grid::{Cell, cells_to_feet};
use crate::world::{TokenId, WorldModel};

/// Why a proposed move was denied.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "reason")]
pub enum MoveRejection {
    /// Destination footprint leaves the map.
    OutOfBounds,
    /// The straight path touches impassable terrain.
    Impassable,
    /// The straight path crosses a solid wall, closed door, or window.
    WallBlocked,
    /// The effective cost exceeds the remaining movement budget.
    InsufficientMovement { cost_ft: f64, remaining_ft: f64 },
}

/// Outcome of validating one proposed move. Not an error type: an illegal
/// move is a normal result the caller renders, never an exception.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MoveDecision {
    /// The move is legal; debit `cost_ft` from the turn budget.
    Allowed { cost_ft: f64 },
    /// The move is illegal; nothing was applied.
    Rejected(MoveRejection),
}

impl MoveDecision {
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        matches!(self, MoveDecision::Allowed { .. })
    }
}

/// Validate relocating `token_id` to top-left cell `to` with
/// `remaining_ft` of movement budget left this turn.
///
/// Reads the world, never writes it. An unknown token rejects as
/// out-of-bounds rather than panicking; the host treats that as a stale
/// request.
#[must_use]
pub fn validate_move(world: &WorldModel, token_id: TokenId, to: Cell, remaining_ft: f64) -> MoveDecision {
    let Some(token) = world.token(token_id) else {
        return MoveDecision::Rejected(MoveRejection::OutOfBounds);
    };

    // Destination footprint must stay on the map.
    let mut probe = token.clone();
    probe.cell = to;
    if probe.footprint().any(|c| !world.map.contains_cell(c)) {
        return MoveDecision::Rejected(MoveRejection::OutOfBounds);
    }

    let from_center = token.center_cell();
    let to_center = probe.center_cell();

    // A no-op move costs nothing and is always legal.
    if from_center == to_center {
        return MoveDecision::Allowed { cost_ft: 0.0 };
    }

    let grid = &world.map.grid;
    let start = grid.cell_center(from_center);
    let end = grid.cell_center(to_center);

    // Walls: a movement-blocking wall across the straight path rejects.
    let blockers = world.movement_blockers();
    if geometry::cast_ray(start, end, &blockers).is_some() {
        return MoveDecision::Rejected(MoveRejection::WallBlocked);
    }

    // Terrain: every cell the straight path enters (start excluded) adds
    // its surcharge — a cell with multiplier m costs m cells of travel
    // instead of one. Impassable ground rejects outright.
    let mut extra_cells = 0.0;
    for cell in path_cells(from_center, to_center).into_iter().skip(1) {
        if let Some(terrain) = world.terrain_at(cell) {
            if terrain.impassable {
                return MoveDecision::Rejected(MoveRejection::Impassable);
            }
            extra_cells += f64::from(terrain.cost_multiplier - 1);
        }
    }

    let cost_ft = cells_to_feet(from_center.distance(to_center) + extra_cells);
    if cost_ft > remaining_ft {
        return MoveDecision::Rejected(MoveRejection::InsufficientMovement { cost_ft, remaining_ft });
    }
    MoveDecision::Allowed { cost_ft }
}

/// Cells touched by the straight line between two cell centers, start and
/// end included, in traversal order without duplicates.
#[must_use]
pub fn path_cells(from: Cell, to: Cell) -> Vec<Cell> {
    let mut out = vec![from];
    if from == to {
        return out;
    }

    let fx = f64::from(from.x) + 0.5;
    let fy = f64::from(from.y) + 0.5;
    let dx = f64::from(to.x - from.x);
    let dy = f64::from(to.y - from.y);
    let len = dx.hypot(dy);
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let steps = (len / PATH_SAMPLE_STEP).ceil() as u32;

    for i in 1..=steps {
        let t = f64::from(i) / f64::from(steps);
        #[allow(clippy::cast_possible_truncation)]
        let cell = Cell::new((fx + dx * t).floor() as i32, (fy + dy * t).floor() as i32);
        if out.last() != Some(&cell) && !out.contains(&cell) {
            out.push(cell);
        }
    }
    out
}
