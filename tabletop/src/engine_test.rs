use super::*;

use crate::fog::FogState;
use crate::grid::Grid;
use crate::input::{Button, Modifiers, Tool};
use crate::world::MapDefinition;

fn world() -> WorldModel {
    WorldModel::new(MapDefinition {
        id: Uuid::new_v4(),
        width: 500.0,
        height: 500.0,
        grid: Grid::new(50.0, 0.0, 0.0),
        image_path: None,
    })
}

fn engine() -> EngineCore {
    EngineCore::new(world())
}

fn token(cell: Cell) -> Token {
    Token {
        id: Uuid::new_v4(),
        entity_id: Uuid::new_v4(),
        cell,
        size_x: 1,
        size_y: 1,
        visible_to_players: true,
        player_controlled: true,
        hp: None,
        vision_range: 24,
        darkvision: 0,
    }
}

fn engine_with_token(cell: Cell) -> (EngineCore, TokenId) {
    let mut w = world();
    let t = token(cell);
    let id = t.id;
    w.place_token(t).unwrap();
    (EngineCore::new(w), id)
}

/// Screen point over the center of a cell (camera starts at identity).
fn center(cell: Cell) -> Point {
    Point::new(f64::from(cell.x) * 50.0 + 25.0, f64::from(cell.y) * 50.0 + 25.0)
}

fn no_mods() -> Modifiers {
    Modifiers::default()
}

// --- Select and drag ---

#[test]
fn clicking_a_token_selects_and_starts_a_drag() {
    let (mut eng, id) = engine_with_token(Cell::new(2, 5));
    let actions = eng.on_pointer_down(center(Cell::new(2, 5)), Button::Primary, no_mods());
    assert_eq!(actions, vec![Action::SelectionChanged(Some(id))]);
    assert!(matches!(eng.gesture, Gesture::DraggingToken { .. }));
    assert_eq!(eng.selection(), Some(id));
}

#[test]
fn clicking_empty_ground_deselects_and_pans() {
    let (mut eng, _id) = engine_with_token(Cell::new(2, 5));
    eng.on_pointer_down(center(Cell::new(2, 5)), Button::Primary, no_mods());
    eng.on_pointer_up(center(Cell::new(2, 5)), Button::Primary);

    let actions = eng.on_pointer_down(center(Cell::new(8, 8)), Button::Primary, no_mods());
    assert_eq!(actions, vec![Action::SelectionChanged(None)]);
    assert!(matches!(eng.gesture, Gesture::Panning { .. }));
}

#[test]
fn drag_release_commits_a_valid_move() {
    let (mut eng, id) = engine_with_token(Cell::new(2, 5));
    eng.on_pointer_down(center(Cell::new(2, 5)), Button::Primary, no_mods());
    let actions = eng.on_pointer_up(center(Cell::new(8, 5)), Button::Primary);

    assert_eq!(
        actions,
        vec![Action::TokenMoved { id, from: Cell::new(2, 5), to: Cell::new(8, 5), cost_ft: 30.0 }]
    );
    assert_eq!(eng.world.token(id).unwrap().cell, Cell::new(8, 5));
    assert_eq!(eng.gesture, Gesture::Idle);
}

#[test]
fn drag_release_on_start_cell_is_a_noop() {
    let (mut eng, id) = engine_with_token(Cell::new(2, 5));
    eng.on_pointer_down(center(Cell::new(2, 5)), Button::Primary, no_mods());
    let actions = eng.on_pointer_up(Point::new(130.0, 270.0), Button::Primary);

    assert_eq!(actions, vec![Action::RenderNeeded]);
    assert_eq!(eng.world.token(id).unwrap().cell, Cell::new(2, 5));
}

#[test]
fn rejected_drag_leaves_the_token_in_place() {
    let (mut eng, id) = engine_with_token(Cell::new(2, 5));
    eng.world
        .place_wall(WallSegment {
            id: Uuid::new_v4(),
            a: Corner::new(5, 0),
            b: Corner::new(5, 10),
            kind: WallKind::Solid,
            door_open: false,
        })
        .unwrap();

    eng.on_pointer_down(center(Cell::new(2, 5)), Button::Primary, no_mods());
    let actions = eng.on_pointer_up(center(Cell::new(8, 5)), Button::Primary);

    assert_eq!(
        actions,
        vec![Action::MoveRejected { id, to: Cell::new(8, 5), reason: MoveRejection::WallBlocked }]
    );
    assert_eq!(eng.world.token(id).unwrap().cell, Cell::new(2, 5));
}

// --- Turn budgets ---

#[test]
fn turn_budget_gates_and_debits_moves() {
    let (mut eng, id) = engine_with_token(Cell::new(1, 5));
    eng.set_turn(TurnBudget { token_id: id, remaining_ft: 30.0, max_ft: 30.0 });

    // 7 cells = 35 ft: over budget.
    eng.on_pointer_down(center(Cell::new(1, 5)), Button::Primary, no_mods());
    let actions = eng.on_pointer_up(center(Cell::new(8, 5)), Button::Primary);
    assert!(matches!(
        actions.as_slice(),
        [Action::MoveRejected { reason: MoveRejection::InsufficientMovement { .. }, .. }]
    ));

    // 6 cells = 30 ft: fits exactly and drains the budget.
    eng.on_pointer_down(center(Cell::new(1, 5)), Button::Primary, no_mods());
    let actions = eng.on_pointer_up(center(Cell::new(7, 5)), Button::Primary);
    assert!(matches!(actions.as_slice(), [Action::TokenMoved { .. }]));
    let turn = eng.turn.unwrap();
    assert!(turn.remaining_ft.abs() < 1e-9);
}

#[test]
fn other_tokens_move_freely_during_a_turn() {
    let mut w = world();
    let active = token(Cell::new(1, 1));
    let bystander = token(Cell::new(1, 5));
    let bystander_id = bystander.id;
    let active_id = active.id;
    w.place_token(active).unwrap();
    w.place_token(bystander).unwrap();
    let mut eng = EngineCore::new(w);
    eng.set_turn(TurnBudget { token_id: active_id, remaining_ft: 5.0, max_ft: 30.0 });

    // An 8-cell move would exceed the active turn's budget, but the
    // bystander is not budget-gated.
    eng.on_pointer_down(center(Cell::new(1, 5)), Button::Primary, no_mods());
    let actions = eng.on_pointer_up(center(Cell::new(9, 5)), Button::Primary);
    assert!(matches!(actions.as_slice(), [Action::TokenMoved { id, .. }] if *id == bystander_id));
}

// --- Tools and gestures ---

#[test]
fn host_only_tools_are_refused_outside_host_mode() {
    let mut eng = engine();
    eng.host_mode = false;
    assert!(eng.set_tool(Tool::Wall).is_empty());
    assert_eq!(eng.ui.tool, Tool::Select);
    assert!(eng.set_tool(Tool::Measure).is_empty());
    assert_eq!(eng.ui.tool, Tool::Measure);
}

#[test]
fn switching_tools_clears_the_gesture() {
    let mut eng = engine();
    eng.set_tool(Tool::Measure);
    eng.on_pointer_down(center(Cell::new(2, 2)), Button::Primary, no_mods());
    assert!(matches!(eng.gesture, Gesture::Measuring { .. }));

    let actions = eng.set_tool(Tool::Select);
    assert_eq!(actions, vec![Action::MeasureCleared]);
    assert_eq!(eng.gesture, Gesture::Idle);
}

#[test]
fn cancel_clears_a_pending_wall_endpoint() {
    let mut eng = engine();
    eng.set_tool(Tool::Wall);
    eng.on_pointer_down(Point::new(200.0, 100.0), Button::Primary, no_mods());
    assert!(matches!(eng.gesture, Gesture::PlacingWall { .. }));

    let actions = eng.cancel();
    assert_eq!(actions, vec![Action::RenderNeeded]);
    assert_eq!(eng.gesture, Gesture::Idle);
}

// --- Measure ---

#[test]
fn measure_previews_then_dismisses_on_second_click() {
    let mut eng = engine();
    eng.set_tool(Tool::Measure);

    let actions = eng.on_pointer_down(center(Cell::new(1, 1)), Button::Primary, no_mods());
    assert_eq!(
        actions,
        vec![Action::MeasureUpdated { origin: Cell::new(1, 1), current: Cell::new(1, 1), feet: 0.0 }]
    );

    let actions = eng.on_pointer_move(center(Cell::new(4, 5)), no_mods());
    assert_eq!(
        actions,
        vec![Action::MeasureUpdated { origin: Cell::new(1, 1), current: Cell::new(4, 5), feet: 25.0 }]
    );

    let actions = eng.on_pointer_down(center(Cell::new(4, 5)), Button::Primary, no_mods());
    assert_eq!(actions, vec![Action::MeasureCleared]);
}

// --- Fog brushes ---

#[test]
fn fog_brush_applies_once_per_entered_cell() {
    let mut eng = engine();
    eng.set_tool(Tool::FogReveal);

    let actions = eng.on_pointer_down(center(Cell::new(3, 3)), Button::Primary, no_mods());
    assert_eq!(
        actions,
        vec![Action::FogBrushed { center: Cell::new(3, 3), radius: 1, mode: BrushMode::Reveal }]
    );
    assert_eq!(eng.player_fog.state(Cell::new(3, 3)), FogState::Explored);

    // Moving within the same cell emits nothing.
    assert!(eng.on_pointer_move(Point::new(160.0, 170.0), no_mods()).is_empty());

    // Entering the next cell brushes again.
    let actions = eng.on_pointer_move(center(Cell::new(4, 3)), no_mods());
    assert_eq!(
        actions,
        vec![Action::FogBrushed { center: Cell::new(4, 3), radius: 1, mode: BrushMode::Reveal }]
    );

    eng.on_pointer_up(center(Cell::new(4, 3)), Button::Primary);
    assert_eq!(eng.gesture, Gesture::Idle);
}

#[test]
fn fog_hide_brush_conceals_explored_ground() {
    let mut eng = engine();
    eng.set_tool(Tool::FogReveal);
    eng.on_pointer_down(center(Cell::new(3, 3)), Button::Primary, no_mods());
    eng.on_pointer_up(center(Cell::new(3, 3)), Button::Primary);

    eng.set_tool(Tool::FogHide);
    eng.on_pointer_down(center(Cell::new(3, 3)), Button::Primary, no_mods());
    assert_eq!(eng.player_fog.state(Cell::new(3, 3)), FogState::Hidden);
}

#[test]
fn flood_reveal_stops_at_walls() {
    let mut eng = engine();
    eng.world
        .place_wall(WallSegment {
            id: Uuid::new_v4(),
            a: Corner::new(5, 0),
            b: Corner::new(5, 10),
            kind: WallKind::Solid,
            door_open: false,
        })
        .unwrap();
    eng.set_tool(Tool::Fill);

    let actions = eng.on_pointer_down(center(Cell::new(2, 5)), Button::Primary, no_mods());
    let [Action::RegionRevealed { cells }] = actions.as_slice() else {
        panic!("expected RegionRevealed, got {actions:?}");
    };
    // The left half of the map: 5 columns x 10 rows.
    assert_eq!(cells.len(), 50);
    assert!(cells.contains(&Cell::new(4, 9)));
    assert!(!cells.contains(&Cell::new(5, 5)));
    assert_eq!(eng.player_fog.state(Cell::new(4, 9)), FogState::Explored);
    assert_eq!(eng.player_fog.state(Cell::new(5, 5)), FogState::Hidden);
}

// --- Token placement ---

#[test]
fn place_token_tool_is_inert_without_a_template() {
    let mut eng = engine();
    eng.set_tool(Tool::PlaceToken);
    assert!(eng.on_pointer_down(center(Cell::new(4, 4)), Button::Primary, no_mods()).is_empty());
}

#[test]
fn place_token_tool_stamps_the_template() {
    let mut eng = engine();
    let entity_id = Uuid::new_v4();
    eng.ui.place_template = Some(TokenTemplate {
        entity_id,
        size_x: 2,
        size_y: 2,
        visible_to_players: true,
        player_controlled: false,
        vision_range: 12,
        darkvision: 6,
    });
    eng.set_tool(Tool::PlaceToken);

    let actions = eng.on_pointer_down(center(Cell::new(4, 4)), Button::Primary, no_mods());
    let [Action::TokenPlaced(placed)] = actions.as_slice() else {
        panic!("expected TokenPlaced, got {actions:?}");
    };
    assert_eq!(placed.entity_id, entity_id);
    assert_eq!(placed.cell, Cell::new(4, 4));
    assert_eq!((placed.size_x, placed.size_y), (2, 2));
    assert!(eng.world.token(placed.id).is_some());
}

// --- Terrain ---

#[test]
fn terrain_brush_paints_clears_and_marks_impassable() {
    let mut eng = engine();
    eng.set_tool(Tool::Terrain);
    let at = center(Cell::new(3, 3));

    let actions = eng.on_pointer_down(at, Button::Primary, no_mods());
    assert_eq!(
        actions,
        vec![Action::TerrainPainted(TerrainCell { cell: Cell::new(3, 3), cost_multiplier: 2, impassable: false })]
    );
    eng.on_pointer_up(at, Button::Primary);

    let actions = eng.on_pointer_down(at, Button::Primary, Modifiers { alt: true, ..Modifiers::default() });
    assert_eq!(
        actions,
        vec![Action::TerrainPainted(TerrainCell { cell: Cell::new(3, 3), cost_multiplier: 1, impassable: true })]
    );
    eng.on_pointer_up(at, Button::Primary);

    let actions = eng.on_pointer_down(at, Button::Primary, Modifiers { shift: true, ..Modifiers::default() });
    assert_eq!(actions, vec![Action::TerrainCleared(Cell::new(3, 3))]);
    assert!(eng.world.terrain_at(Cell::new(3, 3)).is_none());
}

// --- Walls ---

#[test]
fn wall_tool_places_between_two_clicked_corners() {
    let mut eng = engine();
    eng.set_tool(Tool::Wall);

    // Clicks snap to the nearest grid intersection.
    assert_eq!(
        eng.on_pointer_down(Point::new(203.0, 98.0), Button::Primary, no_mods()),
        vec![Action::RenderNeeded]
    );
    let actions = eng.on_pointer_down(Point::new(298.0, 102.0), Button::Primary, no_mods());
    let [Action::WallPlaced(wall)] = actions.as_slice() else {
        panic!("expected WallPlaced, got {actions:?}");
    };
    assert_eq!((wall.a, wall.b), (Corner::new(4, 2), Corner::new(6, 2)));
    assert_eq!(wall.kind, WallKind::Solid);
    assert!(eng.world.wall(wall.id).is_some());
}

#[test]
fn wall_modifiers_pick_door_or_window() {
    let mut eng = engine();
    eng.set_tool(Tool::Wall);

    eng.on_pointer_down(Point::new(100.0, 100.0), Button::Primary, no_mods());
    let alt = Modifiers { alt: true, ..Modifiers::default() };
    let actions = eng.on_pointer_down(Point::new(200.0, 100.0), Button::Primary, alt);
    let [Action::WallPlaced(door)] = actions.as_slice() else {
        panic!("expected WallPlaced, got {actions:?}");
    };
    assert_eq!(door.kind, WallKind::Door);
    assert!(!door.door_open);

    eng.on_pointer_down(Point::new(100.0, 200.0), Button::Primary, no_mods());
    let ctrl = Modifiers { ctrl: true, ..Modifiers::default() };
    let actions = eng.on_pointer_down(Point::new(200.0, 200.0), Button::Primary, ctrl);
    let [Action::WallPlaced(window)] = actions.as_slice() else {
        panic!("expected WallPlaced, got {actions:?}");
    };
    assert_eq!(window.kind, WallKind::Window);
}

#[test]
fn wall_endpoint_snaps_to_an_existing_corner() {
    let mut eng = engine();
    eng.world
        .place_wall(WallSegment {
            id: Uuid::new_v4(),
            a: Corner::new(4, 2),
            b: Corner::new(4, 6),
            kind: WallKind::Solid,
            door_open: false,
        })
        .unwrap();
    eng.set_tool(Tool::Wall);

    // (203, 97) is ~4.2 world units from corner (4,2) at (200, 100), inside
    // the 8 px snap threshold at zoom 1.
    eng.on_pointer_down(Point::new(203.0, 97.0), Button::Primary, no_mods());
    let actions = eng.on_pointer_down(Point::new(300.0, 100.0), Button::Primary, no_mods());
    let [Action::WallPlaced(wall)] = actions.as_slice() else {
        panic!("expected WallPlaced, got {actions:?}");
    };
    assert_eq!(wall.a, Corner::new(4, 2));
}

#[test]
fn clicking_the_same_corner_twice_cancels_the_wall() {
    let mut eng = engine();
    eng.set_tool(Tool::Wall);
    eng.on_pointer_down(Point::new(150.0, 150.0), Button::Primary, no_mods());
    let actions = eng.on_pointer_down(Point::new(151.0, 149.0), Button::Primary, no_mods());
    assert_eq!(actions, vec![Action::RenderNeeded]);
    assert!(eng.world.walls().next().is_none());
    assert_eq!(eng.gesture, Gesture::Idle);
}

// --- Camera ---

#[test]
fn middle_button_pans_the_camera() {
    let mut eng = engine();
    eng.on_pointer_down(Point::new(100.0, 100.0), Button::Middle, no_mods());
    let actions = eng.on_pointer_move(Point::new(130.0, 90.0), no_mods());
    assert_eq!(actions, vec![Action::RenderNeeded]);
    assert!((eng.camera.pan_x - 30.0).abs() < 1e-9);
    assert!((eng.camera.pan_y - -10.0).abs() < 1e-9);
    eng.on_pointer_up(Point::new(130.0, 90.0), Button::Middle);
    assert_eq!(eng.gesture, Gesture::Idle);
}

#[test]
fn wheel_zooms_toward_the_cursor() {
    let mut eng = engine();
    let cursor = Point::new(250.0, 250.0);
    let anchor = eng.camera.screen_to_world(cursor);

    eng.on_wheel(cursor, -1.0);
    assert!(eng.camera.zoom > 1.0);
    let after = eng.camera.screen_to_world(cursor);
    assert!((after.x - anchor.x).abs() < 1e-9);
    assert!((after.y - anchor.y).abs() < 1e-9);

    eng.on_wheel(cursor, 1.0);
    assert!((eng.camera.zoom - 1.0).abs() < 1e-9);
}

// --- Fog refresh on mutation ---

#[test]
fn player_token_move_updates_the_fog() {
    let (mut eng, _id) = engine_with_token(Cell::new(2, 2));
    // Default ambient is darkness: only the token's own cell is visible.
    assert_eq!(eng.player_fog.state(Cell::new(2, 2)), FogState::Visible);

    eng.on_pointer_down(center(Cell::new(2, 2)), Button::Primary, no_mods());
    eng.on_pointer_up(center(Cell::new(5, 5)), Button::Primary);

    assert_eq!(eng.player_fog.state(Cell::new(5, 5)), FogState::Visible);
    // The vacated cell drops to explored but is never forgotten.
    assert_eq!(eng.player_fog.state(Cell::new(2, 2)), FogState::Explored);
}
