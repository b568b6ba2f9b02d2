//! Input model: tools, pointer buttons, modifiers, and the gesture state
//! machine.
//!
//! `Tool` is a closed enum with one variant per tool; the engine dispatches
//! on it exhaustively, so adding a tool is a compile-time-checked change.
//! `Gesture` is the active pointer interaction between pointer-down and
//! pointer-up, carrying all context needed to emit final actions on release.
//! Tool switches and cancel always clear the gesture — no dangling partial
//! walls or measurements.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use crate::fog::BrushMode;
use crate::geometry::Point;
use crate::grid::{Cell, Corner};
use crate::world::TokenId;

/// Which tool is currently active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tool {
    /// Pointer / token-drag tool (default).
    #[default]
    Select,
    /// Place a new token on a clicked cell.
    PlaceToken,
    /// Paint fog away (host only).
    FogReveal,
    /// Paint fog back (host only).
    FogHide,
    /// Measure straight-line distance in feet.
    Measure,
    /// Paint terrain overrides.
    Terrain,
    /// Draw wall segments between grid intersections.
    Wall,
    /// Flood-reveal a wall-bounded region (host only).
    Fill,
}

impl Tool {
    /// Whether this tool edits the fog explored layer.
    #[must_use]
    pub fn is_fog_brush(self) -> bool {
        matches!(self, Self::FogReveal | Self::FogHide)
    }

    /// Whether this tool is restricted to the host.
    #[must_use]
    pub fn host_only(self) -> bool {
        matches!(self, Self::FogReveal | Self::FogHide | Self::Fill | Self::Wall | Self::Terrain | Self::PlaceToken)
    }
}

/// Keyboard modifier keys held during a pointer event.
#[derive(Debug, Clone, Copy, Default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
}

/// Pointer button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    Primary,
    Middle,
    Secondary,
}

/// The active pointer gesture.
///
/// Each variant carries the context needed to compute deltas while the
/// pointer is held and to emit final actions on release.
#[derive(Debug, Clone, PartialEq)]
pub enum Gesture {
    /// No gesture in progress.
    Idle,
    /// Dragging empty ground (or middle button): panning the camera.
    Panning {
        /// Screen position of the previous pointer event.
        last_screen: Point,
    },
    /// Dragging a token. Nothing is committed until release passes the
    /// movement validator; until then the drag is a local preview.
    DraggingToken {
        id: TokenId,
        /// Top-left cell at drag start; the snap-back target on rejection.
        start: Cell,
        /// World-space offset from the pointer to the token's top-left
        /// corner, captured at drag start so the token doesn't jump.
        grab_offset: Point,
    },
    /// Wall tool: first endpoint placed, waiting for the second click.
    PlacingWall { start: Corner },
    /// Measure tool: origin placed, previewing distance to the pointer.
    Measuring { origin: Cell },
    /// Fog brush held down; `last_cell` dedupes per-cell brush application.
    PaintingFog { mode: BrushMode, last_cell: Cell },
    /// Terrain brush held down.
    PaintingTerrain { last_cell: Cell },
}

impl Default for Gesture {
    fn default() -> Self {
        Self::Idle
    }
}
