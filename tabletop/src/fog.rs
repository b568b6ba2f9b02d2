//! Fog of war: persistent exploration plus the ephemeral visible set.
//!
//! Two parallel per-cell layers, kept per observer category (players vs the
//! omniscient host). `explored` survives sessions and only ever grows,
//! except through the host's explicit hide brush. `visible` is replaced
//! wholesale on every recompute and is never persisted.
//!
//! Renderers draw `explored ∖ visible` dimmed, `visible` fully lit, and
//! cells in neither as blank.

#[cfg(test)]
#[path = "fog_test.rs"]
mod fog_test;

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::grid::{Cell, Grid};

/// Fog classification of one cell for one observer category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FogState {
    /// Never seen; rendered blank.
    Hidden,
    /// Seen before but not currently; rendered dimmed.
    Explored,
    /// Currently lit and unobstructed; rendered fully.
    Visible,
}

/// Brush mode for direct host edits of the explored layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrushMode {
    Reveal,
    Hide,
}

/// Fog layers for one observer category.
#[derive(Debug, Clone, Default)]
pub struct FogOfWar {
    explored: BTreeSet<Cell>,
    visible: BTreeSet<Cell>,
}

impl FogOfWar {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from a persisted explored list. `visible` starts empty until
    /// the first recompute.
    #[must_use]
    pub fn from_explored(explored: impl IntoIterator<Item = Cell>) -> Self {
        Self { explored: explored.into_iter().collect(), visible: BTreeSet::new() }
    }

    /// Classify a cell.
    #[must_use]
    pub fn state(&self, cell: Cell) -> FogState {
        if self.visible.contains(&cell) {
            FogState::Visible
        } else if self.explored.contains(&cell) {
            FogState::Explored
        } else {
            FogState::Hidden
        }
    }

    /// Replace the visible set with a fresh computation and union it into
    /// the explored layer. The only way `explored` grows outside the brush.
    pub fn refresh(&mut self, visible: BTreeSet<Cell>) {
        self.explored.extend(visible.iter().copied());
        self.visible = visible;
    }

    /// Apply a circular reveal/hide brush to the explored layer.
    ///
    /// Hide is the one permitted non-monotonic edit: it removes cells from
    /// `explored`, and from `visible` as well so a hidden room stays blank
    /// until the next recompute.
    pub fn apply_brush(&mut self, grid: &Grid, center: Cell, radius: u32, mode: BrushMode) {
        let center_pt = grid.cell_center(center);
        let r = grid.cells_to_world(f64::from(radius));
        #[allow(clippy::cast_possible_wrap)]
        let span = radius as i32;

        for dy in -span..=span {
            for dx in -span..=span {
                let cell = Cell::new(center.x + dx, center.y + dy);
                if !crate::geometry::point_in_circle(grid.cell_center(cell), center_pt, r) {
                    continue;
                }
                match mode {
                    BrushMode::Reveal => {
                        self.explored.insert(cell);
                    }
                    BrushMode::Hide => {
                        self.explored.remove(&cell);
                        self.visible.remove(&cell);
                    }
                }
            }
        }
    }

    /// Reveal an explicit set of cells (used by the flood-fill reveal tool).
    pub fn reveal_cells(&mut self, cells: impl IntoIterator<Item = Cell>) {
        self.explored.extend(cells);
    }

    /// The persistent explored layer, sorted.
    #[must_use]
    pub fn explored(&self) -> &BTreeSet<Cell> {
        &self.explored
    }

    /// The ephemeral visible set from the last recompute, sorted.
    #[must_use]
    pub fn visible(&self) -> &BTreeSet<Cell> {
        &self.visible
    }
}
