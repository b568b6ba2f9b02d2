//! Top-level map engine: pointer events in, actions out.
//!
//! `EngineCore` owns one [`WorldModel`] plus the players' fog layer, the
//! camera, and the gesture state machine. Input handlers turn low-level
//! pointer events into intents dispatched to the components, and return
//! [`Action`]s for the embedding layer to process — the engine never talks
//! to a renderer or a socket directly.
//!
//! Every mutation that can affect visibility (token move, wall edit, door
//! toggle, light change) refreshes the player fog synchronously; there is no
//! background recompute and no reactive dependency tracking.

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

use uuid::Uuid;

use crate::camera::Camera;
use crate::consts::WALL_SNAP_PX;
use crate::fog::{BrushMode, FogOfWar};
use crate::geometry::Point;
use crate::grid::{Cell, Corner, cells_to_feet};
use crate::input::{Button, Gesture, Modifiers, Tool};
use crate::movement::{self, MoveDecision, MoveRejection};
use crate::visibility::player_visible;
use crate::world::{
    AmbientLight, LightSource, TerrainCell, Token, TokenId, WallId, WallKind, WallSegment,
    WorldModel,
};

// =============================================================================
// ACTIONS
// =============================================================================

/// Actions returned from input handlers for the embedding layer to process
/// (broadcast, persist, or re-render).
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// A token move passed validation and was committed.
    TokenMoved { id: TokenId, from: Cell, to: Cell, cost_ft: f64 },
    /// A token move failed validation; nothing changed. The view snaps the
    /// token back to its pre-drag cell.
    MoveRejected { id: TokenId, to: Cell, reason: MoveRejection },
    /// A new token was placed.
    TokenPlaced(Token),
    /// A wall segment was committed.
    WallPlaced(WallSegment),
    /// A fog brush stroke touched a cell.
    FogBrushed { center: Cell, radius: u32, mode: BrushMode },
    /// A flood-fill reveal uncovered a wall-bounded region.
    RegionRevealed { cells: Vec<Cell> },
    /// A terrain override was painted.
    TerrainPainted(TerrainCell),
    /// A terrain override was cleared.
    TerrainCleared(Cell),
    /// The measurement preview changed.
    MeasureUpdated { origin: Cell, current: Cell, feet: f64 },
    /// The measurement was dismissed.
    MeasureCleared,
    /// The selected token changed.
    SelectionChanged(Option<TokenId>),
    /// Camera or preview state changed; redraw.
    RenderNeeded,
}

// =============================================================================
// UI STATE
// =============================================================================

/// Prototype for tokens created by the place-token tool, supplied by the
/// embedding layer (the rules engine owns entities and size categories).
#[derive(Debug, Clone)]
pub struct TokenTemplate {
    pub entity_id: Uuid,
    pub size_x: u32,
    pub size_y: u32,
    pub visible_to_players: bool,
    pub player_controlled: bool,
    pub vision_range: u32,
    pub darkvision: u32,
}

/// Movement budget for the entity whose turn it is, supplied by the external
/// turn engine in feet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TurnBudget {
    pub token_id: TokenId,
    pub remaining_ft: f64,
    pub max_ft: f64,
}

/// Persistent UI state visible to the renderer.
#[derive(Debug, Clone, Default)]
pub struct UiState {
    pub tool: Tool,
    pub selected: Option<TokenId>,
    /// Template used by the place-token tool; the tool is inert without one.
    pub place_template: Option<TokenTemplate>,
}

// =============================================================================
// ENGINE CORE
// =============================================================================

/// Core engine state: the world, the players' fog layer, camera, UI, and the
/// active gesture. Headless and synchronous.
pub struct EngineCore {
    pub world: WorldModel,
    /// Shared fog layer for the "players" observer category. The host
    /// renders without fog but still computes this to preview what players
    /// see.
    pub player_fog: FogOfWar,
    pub camera: Camera,
    pub ui: UiState,
    pub gesture: Gesture,
    /// Active turn budget, if a structured turn is underway. Moves by other
    /// tokens (or outside a turn) are not budget-gated.
    pub turn: Option<TurnBudget>,
    /// Whether this engine drives the host view. Host-only tools are
    /// refused otherwise.
    pub host_mode: bool,
}

impl EngineCore {
    #[must_use]
    pub fn new(world: WorldModel) -> Self {
        let mut engine = Self {
            world,
            player_fog: FogOfWar::new(),
            camera: Camera::default(),
            ui: UiState::default(),
            gesture: Gesture::Idle,
            turn: None,
            host_mode: true,
        };
        engine.refresh_player_fog();
        engine
    }

    // --- Replicated state inputs ---

    /// Hydrate world and fog from a snapshot (session load or join).
    pub fn load_snapshot(&mut self, world: WorldModel, fog: FogOfWar) {
        self.world = world;
        self.player_fog = fog;
        self.ui.selected = None;
        self.gesture = Gesture::Idle;
        self.refresh_player_fog();
    }

    /// Apply a host-confirmed token move (observer mirror path).
    pub fn apply_token_move(&mut self, id: TokenId, to: Cell) {
        if self.world.move_token(id, to).is_ok() {
            self.refresh_player_fog();
        }
    }

    /// Apply a host-confirmed wall placement (observer mirror path).
    pub fn apply_wall(&mut self, wall: WallSegment) {
        if self.world.place_wall(wall).is_ok() {
            self.refresh_player_fog();
        }
    }

    /// Apply a host-confirmed door toggle (observer mirror path).
    pub fn apply_door_toggle(&mut self, id: WallId) {
        if self.world.toggle_door(id).is_ok() {
            self.refresh_player_fog();
        }
    }

    /// Apply a host-confirmed light update (observer mirror path).
    pub fn apply_light(&mut self, light: LightSource) {
        self.world.set_light(light);
        self.refresh_player_fog();
    }

    /// Apply a host-confirmed ambient light change (observer mirror path).
    pub fn apply_ambient(&mut self, ambient: AmbientLight) {
        self.world.set_ambient(ambient);
        self.refresh_player_fog();
    }

    /// Recompute the players' visible set from the current world and fold it
    /// into the explored layer. Invoked after every relevant mutation.
    pub fn refresh_player_fog(&mut self) {
        self.player_fog.refresh(player_visible(&self.world));
    }

    // --- Tool / turn management ---

    /// Set the active tool, clearing any in-progress gesture for the
    /// previous tool. Host-only tools are refused outside host mode.
    pub fn set_tool(&mut self, tool: Tool) -> Vec<Action> {
        if !self.host_mode && tool.host_only() {
            return Vec::new();
        }
        let mut actions = Vec::new();
        if matches!(self.gesture, Gesture::Measuring { .. }) {
            actions.push(Action::MeasureCleared);
        }
        self.gesture = Gesture::Idle;
        self.ui.tool = tool;
        actions
    }

    /// Cancel the in-progress gesture (escape). Clears pending state with no
    /// further side effects.
    pub fn cancel(&mut self) -> Vec<Action> {
        let mut actions = Vec::new();
        if matches!(self.gesture, Gesture::Measuring { .. }) {
            actions.push(Action::MeasureCleared);
        }
        if self.gesture != Gesture::Idle {
            actions.push(Action::RenderNeeded);
        }
        self.gesture = Gesture::Idle;
        actions
    }

    /// Install the movement budget for the active turn.
    pub fn set_turn(&mut self, turn: TurnBudget) {
        self.turn = Some(turn);
    }

    /// End the active turn.
    pub fn clear_turn(&mut self) {
        self.turn = None;
    }

    // --- Pointer events ---

    pub fn on_pointer_down(&mut self, screen: Point, button: Button, modifiers: Modifiers) -> Vec<Action> {
        if button == Button::Middle {
            self.gesture = Gesture::Panning { last_screen: screen };
            return Vec::new();
        }

        let world_pt = self.camera.screen_to_world(screen);
        let cell = self.world.map.grid.world_to_cell(world_pt);

        match self.ui.tool {
            Tool::Select => self.begin_select(world_pt, screen, cell),
            Tool::PlaceToken => self.place_token_at(cell),
            Tool::FogReveal => self.begin_fog_paint(cell, BrushMode::Reveal),
            Tool::FogHide => self.begin_fog_paint(cell, BrushMode::Hide),
            Tool::Measure => self.measure_click(cell),
            Tool::Terrain => self.begin_terrain_paint(cell, modifiers),
            Tool::Wall => self.wall_click(world_pt, modifiers),
            Tool::Fill => self.flood_reveal(cell),
        }
    }

    pub fn on_pointer_move(&mut self, screen: Point, modifiers: Modifiers) -> Vec<Action> {
        let world_pt = self.camera.screen_to_world(screen);
        let cell = self.world.map.grid.world_to_cell(world_pt);

        match self.gesture {
            Gesture::Idle => Vec::new(),
            Gesture::Panning { last_screen } => {
                self.camera.pan_by(screen.x - last_screen.x, screen.y - last_screen.y);
                self.gesture = Gesture::Panning { last_screen: screen };
                vec![Action::RenderNeeded]
            }
            Gesture::DraggingToken { .. } | Gesture::PlacingWall { .. } => {
                // Preview only; nothing committed until release/click.
                vec![Action::RenderNeeded]
            }
            Gesture::Measuring { origin } => {
                vec![Action::MeasureUpdated { origin, current: cell, feet: cells_to_feet(origin.distance(cell)) }]
            }
            Gesture::PaintingFog { mode, last_cell } => {
                // One brush application per newly entered cell, not one per
                // pointer-move event.
                if cell == last_cell {
                    return Vec::new();
                }
                self.gesture = Gesture::PaintingFog { mode, last_cell: cell };
                self.brush_fog(cell, mode)
            }
            Gesture::PaintingTerrain { last_cell } => {
                if cell == last_cell {
                    return Vec::new();
                }
                self.gesture = Gesture::PaintingTerrain { last_cell: cell };
                self.paint_terrain(cell, modifiers)
            }
        }
    }

    pub fn on_pointer_up(&mut self, screen: Point, button: Button) -> Vec<Action> {
        if button == Button::Middle {
            if matches!(self.gesture, Gesture::Panning { .. }) {
                self.gesture = Gesture::Idle;
            }
            return Vec::new();
        }

        match self.gesture.clone() {
            Gesture::Panning { .. } => {
                self.gesture = Gesture::Idle;
                Vec::new()
            }
            Gesture::DraggingToken { id, start, grab_offset } => {
                self.gesture = Gesture::Idle;
                self.finish_drag(screen, id, start, grab_offset)
            }
            Gesture::PaintingFog { .. } | Gesture::PaintingTerrain { .. } => {
                self.gesture = Gesture::Idle;
                Vec::new()
            }
            // Click-click gestures survive pointer-up.
            Gesture::Idle | Gesture::PlacingWall { .. } | Gesture::Measuring { .. } => Vec::new(),
        }
    }

    /// Zoom toward the cursor. Positive `delta_y` (scroll down) zooms out.
    pub fn on_wheel(&mut self, cursor: Point, delta_y: f64) -> Vec<Action> {
        let factor = if delta_y < 0.0 { 1.1 } else { 1.0 / 1.1 };
        self.camera.zoom_at(cursor, self.camera.zoom * factor);
        vec![Action::RenderNeeded]
    }

    // --- Select / drag ---

    fn begin_select(&mut self, world_pt: Point, screen: Point, cell: Cell) -> Vec<Action> {
        if let Some(token) = self.world.token_at(cell) {
            let id = token.id;
            let start = token.cell;
            let top_left = self.world.map.grid.corner_point(Corner::new(start.x, start.y));
            let grab_offset = Point::new(world_pt.x - top_left.x, world_pt.y - top_left.y);
            self.gesture = Gesture::DraggingToken { id, start, grab_offset };

            if self.ui.selected != Some(id) {
                self.ui.selected = Some(id);
                return vec![Action::SelectionChanged(Some(id))];
            }
            return Vec::new();
        }

        let mut actions = Vec::new();
        if self.ui.selected.is_some() {
            self.ui.selected = None;
            actions.push(Action::SelectionChanged(None));
        }
        self.gesture = Gesture::Panning { last_screen: screen };
        actions
    }

    fn finish_drag(&mut self, screen: Point, id: TokenId, start: Cell, grab_offset: Point) -> Vec<Action> {
        let world_pt = self.camera.screen_to_world(screen);
        let grid = self.world.map.grid;
        // Nearest destination cell for the token's top-left corner.
        let top_left = Point::new(world_pt.x - grab_offset.x, world_pt.y - grab_offset.y);
        let dest = grid.world_to_cell(Point::new(
            top_left.x + grid.cell_size / 2.0,
            top_left.y + grid.cell_size / 2.0,
        ));

        // Release on the start cell is a no-op move, not an error.
        if dest == start {
            return vec![Action::RenderNeeded];
        }

        let remaining_ft = match self.turn {
            Some(turn) if turn.token_id == id => turn.remaining_ft,
            _ => f64::INFINITY,
        };

        match movement::validate_move(&self.world, id, dest, remaining_ft) {
            MoveDecision::Allowed { cost_ft } => {
                if self.world.move_token(id, dest).is_err() {
                    return vec![Action::MoveRejected { id, to: dest, reason: MoveRejection::OutOfBounds }];
                }
                if let Some(turn) = &mut self.turn {
                    if turn.token_id == id {
                        turn.remaining_ft -= cost_ft;
                    }
                }
                self.refresh_player_fog();
                vec![Action::TokenMoved { id, from: start, to: dest, cost_ft }]
            }
            MoveDecision::Rejected(reason) => {
                vec![Action::MoveRejected { id, to: dest, reason }]
            }
        }
    }

    // --- Token placement ---

    fn place_token_at(&mut self, cell: Cell) -> Vec<Action> {
        let Some(template) = &self.ui.place_template else {
            return Vec::new();
        };
        let token = Token {
            id: Uuid::new_v4(),
            entity_id: template.entity_id,
            cell,
            size_x: template.size_x,
            size_y: template.size_y,
            visible_to_players: template.visible_to_players,
            player_controlled: template.player_controlled,
            hp: None,
            vision_range: template.vision_range,
            darkvision: template.darkvision,
        };
        match self.world.place_token(token.clone()) {
            Ok(()) => {
                self.refresh_player_fog();
                vec![Action::TokenPlaced(token)]
            }
            Err(_) => Vec::new(),
        }
    }

    // --- Fog brushes ---

    fn begin_fog_paint(&mut self, cell: Cell, mode: BrushMode) -> Vec<Action> {
        self.gesture = Gesture::PaintingFog { mode, last_cell: cell };
        self.brush_fog(cell, mode)
    }

    fn brush_fog(&mut self, cell: Cell, mode: BrushMode) -> Vec<Action> {
        let radius = 1;
        self.player_fog.apply_brush(&self.world.map.grid, cell, radius, mode);
        vec![Action::FogBrushed { center: cell, radius, mode }]
    }

    /// Flood-reveal the wall-bounded region around `origin`: spread across
    /// orthogonal neighbors whose shared border no sight-blocking wall
    /// crosses.
    fn flood_reveal(&mut self, origin: Cell) -> Vec<Action> {
        if !self.world.map.contains_cell(origin) {
            return Vec::new();
        }
        let grid = self.world.map.grid;
        let blockers = self.world.sight_blockers();

        let mut region = vec![origin];
        let mut seen: std::collections::BTreeSet<Cell> = region.iter().copied().collect();
        let mut queue = std::collections::VecDeque::from([origin]);
        while let Some(cell) = queue.pop_front() {
            let from_pt = grid.cell_center(cell);
            for next in cell.neighbors() {
                if seen.contains(&next) || !self.world.map.contains_cell(next) {
                    continue;
                }
                if crate::geometry::cast_ray(from_pt, grid.cell_center(next), &blockers).is_some() {
                    continue;
                }
                seen.insert(next);
                region.push(next);
                queue.push_back(next);
            }
        }

        self.player_fog.reveal_cells(region.iter().copied());
        vec![Action::RegionRevealed { cells: region }]
    }

    // --- Measure ---

    fn measure_click(&mut self, cell: Cell) -> Vec<Action> {
        match self.gesture {
            Gesture::Measuring { .. } => {
                self.gesture = Gesture::Idle;
                vec![Action::MeasureCleared]
            }
            _ => {
                self.gesture = Gesture::Measuring { origin: cell };
                vec![Action::MeasureUpdated { origin: cell, current: cell, feet: 0.0 }]
            }
        }
    }

    // --- Terrain ---

    fn begin_terrain_paint(&mut self, cell: Cell, modifiers: Modifiers) -> Vec<Action> {
        self.gesture = Gesture::PaintingTerrain { last_cell: cell };
        self.paint_terrain(cell, modifiers)
    }

    fn paint_terrain(&mut self, cell: Cell, modifiers: Modifiers) -> Vec<Action> {
        if !self.world.map.contains_cell(cell) {
            return Vec::new();
        }
        if modifiers.shift {
            return match self.world.clear_terrain(cell) {
                Some(_) => vec![Action::TerrainCleared(cell)],
                None => Vec::new(),
            };
        }
        let terrain = TerrainCell {
            cell,
            cost_multiplier: if modifiers.alt { 1 } else { 2 },
            impassable: modifiers.alt,
        };
        self.world.set_terrain(terrain);
        vec![Action::TerrainPainted(terrain)]
    }

    // --- Walls ---

    fn wall_click(&mut self, world_pt: Point, modifiers: Modifiers) -> Vec<Action> {
        let corner = self.snap_wall_endpoint(world_pt);
        match self.gesture {
            Gesture::PlacingWall { start } => {
                self.gesture = Gesture::Idle;
                // Identical endpoints: cancelled, not an error.
                if corner == start {
                    return vec![Action::RenderNeeded];
                }
                let kind = if modifiers.alt {
                    WallKind::Door
                } else if modifiers.ctrl {
                    WallKind::Window
                } else {
                    WallKind::Solid
                };
                let wall = WallSegment { id: Uuid::new_v4(), a: start, b: corner, kind, door_open: false };
                match self.world.place_wall(wall.clone()) {
                    Ok(()) => {
                        self.refresh_player_fog();
                        vec![Action::WallPlaced(wall)]
                    }
                    Err(_) => vec![Action::RenderNeeded],
                }
            }
            _ => {
                self.gesture = Gesture::PlacingWall { start: corner };
                vec![Action::RenderNeeded]
            }
        }
    }

    /// Snap a wall endpoint to an existing wall endpoint within the snap
    /// threshold (auto-close, so adjoining walls share the exact corner), or
    /// to the nearest grid intersection.
    fn snap_wall_endpoint(&self, world_pt: Point) -> Corner {
        let snap_world = self.camera.screen_dist_to_world(WALL_SNAP_PX);
        if let Some((corner, dist)) = self.world.nearest_wall_endpoint(world_pt) {
            if dist <= snap_world {
                return corner;
            }
        }
        self.world.map.grid.snap_corner(world_pt)
    }

    // --- Queries ---

    /// The currently selected token, if any.
    #[must_use]
    pub fn selection(&self) -> Option<TokenId> {
        self.ui.selected
    }

    /// The current camera state.
    #[must_use]
    pub fn camera(&self) -> Camera {
        self.camera
    }
}
