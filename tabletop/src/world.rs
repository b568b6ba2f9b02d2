//! World model: the authoritative state of one battle map.
//!
//! [`WorldModel`] owns the map definition plus all tokens, wall segments,
//! terrain cells, and light sources. Mutators preserve invariants and never
//! partially apply: a token footprint must lie within the map bounds, walls
//! may not be zero-length, light radii satisfy `bright <= dim`, and only
//! doors toggle. Everything that crosses the wire or the save file derives
//! serde; the host replicates mutations field-for-field to observer mirrors.

#[cfg(test)]
#[path = "world_test.rs"]
mod world_test;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::consts::DEFAULT_VISION_RANGE;
use crate::geometry::BlockingSegment;
use crate::grid::{Cell, Corner, Grid};

/// Unique identifier for a token.
pub type TokenId = Uuid;

/// Unique identifier for a wall segment.
pub type WallId = Uuid;

/// Unique identifier for a light source.
pub type LightId = Uuid;

// =============================================================================
// ERRORS
// =============================================================================

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum WorldError {
    #[error("token footprint out of map bounds at ({x}, {y})", x = .cell.x, y = .cell.y)]
    OutOfBounds { cell: Cell },
    #[error("token not found: {0}")]
    TokenNotFound(TokenId),
    #[error("wall not found: {0}")]
    WallNotFound(WallId),
    #[error("light source not found: {0}")]
    LightNotFound(LightId),
    #[error("wall endpoints coincide at ({x}, {y})", x = .corner.x, y = .corner.y)]
    DegenerateWall { corner: Corner },
    #[error("wall {0} is not a door")]
    NotADoor(WallId),
    #[error("token size must be at least 1x1")]
    ZeroSizeToken,
}

// =============================================================================
// MAP DEFINITION
// =============================================================================

/// Static definition of one map: world-unit dimensions and grid geometry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapDefinition {
    pub id: Uuid,
    /// Map width in world units.
    pub width: f64,
    /// Map height in world units.
    pub height: f64,
    pub grid: Grid,
    /// Background image, if any. Purely a rendering concern.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_path: Option<String>,
}

impl MapDefinition {
    /// Number of whole cells across the map width.
    #[must_use]
    pub fn cols(&self) -> i32 {
        #[allow(clippy::cast_possible_truncation)]
        let cols = (self.width / self.grid.cell_size).floor() as i32;
        cols.max(0)
    }

    /// Number of whole cells down the map height.
    #[must_use]
    pub fn rows(&self) -> i32 {
        #[allow(clippy::cast_possible_truncation)]
        let rows = (self.height / self.grid.cell_size).floor() as i32;
        rows.max(0)
    }

    /// Whether a cell lies within `[0, cols) × [0, rows)`.
    #[must_use]
    pub fn contains_cell(&self, cell: Cell) -> bool {
        cell.x >= 0 && cell.y >= 0 && cell.x < self.cols() && cell.y < self.rows()
    }

    /// Clamp a cell into the map bounds.
    #[must_use]
    pub fn clamp_cell(&self, cell: Cell) -> Cell {
        Cell {
            x: cell.x.clamp(0, (self.cols() - 1).max(0)),
            y: cell.y.clamp(0, (self.rows() - 1).max(0)),
        }
    }
}

// =============================================================================
// TOKENS
// =============================================================================

/// Hit points carried for rendering badges only; the rules engine owns them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HitPoints {
    pub current: i32,
    pub max: i32,
}

/// A creature or object marker occupying a rectangle of cells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Token {
    pub id: TokenId,
    /// Owning game entity in the rules engine.
    pub entity_id: Uuid,
    /// Top-left cell of the footprint.
    pub cell: Cell,
    /// Footprint width in cells. Derived once from the creature's size
    /// category; immutable except by explicit edit.
    pub size_x: u32,
    /// Footprint height in cells.
    pub size_y: u32,
    /// Whether observers see this token at all.
    pub visible_to_players: bool,
    /// Whether this token contributes to the shared player fog layer.
    #[serde(default)]
    pub player_controlled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hp: Option<HitPoints>,
    /// Maximum perception range in cells. Zero means blinded: only the
    /// token's own cell is ever visible to it.
    #[serde(default = "default_vision_range")]
    pub vision_range: u32,
    /// Darkvision range in cells; zero when absent.
    #[serde(default)]
    pub darkvision: u32,
}

fn default_vision_range() -> u32 {
    DEFAULT_VISION_RANGE
}

impl Token {
    /// The cell at the center of the footprint, from which rays are cast.
    #[must_use]
    pub fn center_cell(&self) -> Cell {
        #[allow(clippy::cast_possible_wrap)]
        Cell {
            x: self.cell.x + (self.size_x as i32 - 1) / 2,
            y: self.cell.y + (self.size_y as i32 - 1) / 2,
        }
    }

    /// All cells the footprint occupies.
    pub fn footprint(&self) -> impl Iterator<Item = Cell> + '_ {
        #[allow(clippy::cast_possible_wrap)]
        let (sx, sy) = (self.size_x as i32, self.size_y as i32);
        (0..sy).flat_map(move |dy| (0..sx).map(move |dx| Cell::new(self.cell.x + dx, self.cell.y + dy)))
    }
}

// =============================================================================
// WALLS
// =============================================================================

/// Wall behavior class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WallKind {
    /// Blocks sight and movement.
    Solid,
    /// Blocks sight and movement while closed; nothing while open.
    Door,
    /// Blocks movement but never sight.
    Window,
}

/// A wall segment between two grid intersections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WallSegment {
    pub id: WallId,
    pub a: Corner,
    pub b: Corner,
    pub kind: WallKind,
    /// Meaningful only for doors.
    #[serde(default)]
    pub door_open: bool,
}

impl WallSegment {
    /// Whether this wall currently blocks sightlines.
    #[must_use]
    pub fn blocks_sight(&self) -> bool {
        match self.kind {
            WallKind::Solid => true,
            WallKind::Door => !self.door_open,
            WallKind::Window => false,
        }
    }

    /// Whether this wall currently blocks movement.
    #[must_use]
    pub fn blocks_movement(&self) -> bool {
        match self.kind {
            WallKind::Solid | WallKind::Window => true,
            WallKind::Door => !self.door_open,
        }
    }
}

// =============================================================================
// TERRAIN & LIGHT
// =============================================================================

/// Per-cell terrain override. Cells without an entry cost 1× and are passable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TerrainCell {
    pub cell: Cell,
    /// Movement cost multiplier, at least 1 (2 = difficult terrain).
    pub cost_multiplier: u32,
    #[serde(default)]
    pub impassable: bool,
}

/// Where a light source sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LightAnchor {
    /// Follows the owning token's center.
    Token(TokenId),
    /// Fixed at a cell.
    Fixed(Cell),
}

/// A point light with a bright core and a dim halo, radii in cells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LightSource {
    pub id: LightId,
    pub anchor: LightAnchor,
    pub bright_radius: u32,
    pub dim_radius: u32,
    #[serde(default = "default_true")]
    pub active: bool,
}

fn default_true() -> bool {
    true
}

/// Map-wide base light level, set by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AmbientLight {
    Bright,
    Dim,
    #[default]
    Darkness,
}

// =============================================================================
// WORLD MODEL
// =============================================================================

/// The authoritative state of one map. Exclusively host-owned; observers
/// hold read-only mirrors patched by replicated mutations.
#[derive(Debug, Clone)]
pub struct WorldModel {
    pub map: MapDefinition,
    tokens: HashMap<TokenId, Token>,
    walls: HashMap<WallId, WallSegment>,
    terrain: HashMap<Cell, TerrainCell>,
    lights: HashMap<LightId, LightSource>,
    ambient: AmbientLight,
}

impl WorldModel {
    /// Create an empty world for the given map.
    #[must_use]
    pub fn new(map: MapDefinition) -> Self {
        Self {
            map,
            tokens: HashMap::new(),
            walls: HashMap::new(),
            terrain: HashMap::new(),
            lights: HashMap::new(),
            ambient: AmbientLight::default(),
        }
    }

    // --- Tokens ---

    /// Place a token. Rejects zero-size footprints and footprints that
    /// extend outside the map.
    pub fn place_token(&mut self, token: Token) -> Result<(), WorldError> {
        if token.size_x == 0 || token.size_y == 0 {
            return Err(WorldError::ZeroSizeToken);
        }
        self.check_footprint(&token)?;
        self.tokens.insert(token.id, token);
        Ok(())
    }

    /// Relocate a token's top-left cell. The caller is responsible for
    /// movement legality; this only enforces map bounds.
    pub fn move_token(&mut self, id: TokenId, to: Cell) -> Result<(), WorldError> {
        let Some(token) = self.tokens.get(&id) else {
            return Err(WorldError::TokenNotFound(id));
        };
        let mut moved = token.clone();
        moved.cell = to;
        self.check_footprint(&moved)?;
        self.tokens.insert(id, moved);
        Ok(())
    }

    /// Remove a token, returning it if present.
    pub fn remove_token(&mut self, id: TokenId) -> Option<Token> {
        self.tokens.remove(&id)
    }

    #[must_use]
    pub fn token(&self, id: TokenId) -> Option<&Token> {
        self.tokens.get(&id)
    }

    pub fn tokens(&self) -> impl Iterator<Item = &Token> {
        self.tokens.values()
    }

    /// The token whose footprint covers `cell`, if any.
    #[must_use]
    pub fn token_at(&self, cell: Cell) -> Option<&Token> {
        self.tokens
            .values()
            .find(|t| t.footprint().any(|c| c == cell))
    }

    fn check_footprint(&self, token: &Token) -> Result<(), WorldError> {
        for cell in token.footprint() {
            if !self.map.contains_cell(cell) {
                return Err(WorldError::OutOfBounds { cell });
            }
        }
        Ok(())
    }

    // --- Walls ---

    /// Place a wall segment. Zero-length walls are rejected here, before
    /// they can enter the model.
    pub fn place_wall(&mut self, wall: WallSegment) -> Result<(), WorldError> {
        if wall.a == wall.b {
            return Err(WorldError::DegenerateWall { corner: wall.a });
        }
        self.walls.insert(wall.id, wall);
        Ok(())
    }

    /// Toggle a door's open state, returning the new state.
    pub fn toggle_door(&mut self, id: WallId) -> Result<bool, WorldError> {
        let Some(wall) = self.walls.get_mut(&id) else {
            return Err(WorldError::WallNotFound(id));
        };
        if wall.kind != WallKind::Door {
            return Err(WorldError::NotADoor(id));
        }
        wall.door_open = !wall.door_open;
        Ok(wall.door_open)
    }

    /// Remove a wall, returning it if present.
    pub fn remove_wall(&mut self, id: WallId) -> Option<WallSegment> {
        self.walls.remove(&id)
    }

    #[must_use]
    pub fn wall(&self, id: WallId) -> Option<&WallSegment> {
        self.walls.get(&id)
    }

    pub fn walls(&self) -> impl Iterator<Item = &WallSegment> {
        self.walls.values()
    }

    /// World-space segments for all walls that currently block sight.
    #[must_use]
    pub fn sight_blockers(&self) -> Vec<BlockingSegment> {
        self.blockers(WallSegment::blocks_sight)
    }

    /// World-space segments for all walls that currently block movement.
    #[must_use]
    pub fn movement_blockers(&self) -> Vec<BlockingSegment> {
        self.blockers(WallSegment::blocks_movement)
    }

    fn blockers(&self, pred: impl Fn(&WallSegment) -> bool) -> Vec<BlockingSegment> {
        self.walls
            .values()
            .filter(|w| pred(w))
            .map(|w| BlockingSegment {
                wall_id: w.id,
                a: self.map.grid.corner_point(w.a),
                b: self.map.grid.corner_point(w.b),
            })
            .collect()
    }

    /// The existing wall endpoint nearest to a world point, with its
    /// distance in world units. Used by the wall tool's auto-close snap.
    #[must_use]
    pub fn nearest_wall_endpoint(&self, p: crate::geometry::Point) -> Option<(Corner, f64)> {
        self.walls
            .values()
            .flat_map(|w| [w.a, w.b])
            .map(|c| (c, self.map.grid.corner_point(c).distance(p)))
            .min_by(|(_, d1), (_, d2)| d1.total_cmp(d2))
    }

    // --- Terrain ---

    /// Set or replace the terrain override for a cell. A multiplier below 1
    /// is raised to 1.
    pub fn set_terrain(&mut self, terrain: TerrainCell) {
        let mut terrain = terrain;
        terrain.cost_multiplier = terrain.cost_multiplier.max(1);
        self.terrain.insert(terrain.cell, terrain);
    }

    /// Clear the terrain override for a cell.
    pub fn clear_terrain(&mut self, cell: Cell) -> Option<TerrainCell> {
        self.terrain.remove(&cell)
    }

    #[must_use]
    pub fn terrain_at(&self, cell: Cell) -> Option<&TerrainCell> {
        self.terrain.get(&cell)
    }

    pub fn terrain(&self) -> impl Iterator<Item = &TerrainCell> {
        self.terrain.values()
    }

    // --- Lights ---

    /// Add or replace a light source. `dim_radius` is raised to at least
    /// `bright_radius` so the bright core stays inside the halo.
    pub fn set_light(&mut self, light: LightSource) {
        let mut light = light;
        light.dim_radius = light.dim_radius.max(light.bright_radius);
        self.lights.insert(light.id, light);
    }

    /// Remove a light source, returning it if present.
    pub fn remove_light(&mut self, id: LightId) -> Option<LightSource> {
        self.lights.remove(&id)
    }

    #[must_use]
    pub fn light(&self, id: LightId) -> Option<&LightSource> {
        self.lights.get(&id)
    }

    pub fn lights(&self) -> impl Iterator<Item = &LightSource> {
        self.lights.values()
    }

    /// The cell a light source currently shines from. `None` when a
    /// token-anchored light's token no longer exists.
    #[must_use]
    pub fn light_cell(&self, light: &LightSource) -> Option<Cell> {
        match light.anchor {
            LightAnchor::Fixed(cell) => Some(cell),
            LightAnchor::Token(id) => self.tokens.get(&id).map(Token::center_cell),
        }
    }

    // --- Ambient ---

    #[must_use]
    pub fn ambient(&self) -> AmbientLight {
        self.ambient
    }

    pub fn set_ambient(&mut self, ambient: AmbientLight) {
        self.ambient = ambient;
    }
}
