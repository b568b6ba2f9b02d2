//! Shared host state.
//!
//! DESIGN
//! ======
//! `HostState` holds the live map sessions behind one `RwLock`. Each session
//! owns the authoritative world, the shared player fog layer, the connected
//! clients' outbound channels, and a dirty flag for deferred persistence.
//! Everything a dispatch handler touches lives here; the handlers themselves
//! stay free of locking concerns by receiving `&mut MapSession`.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{RwLock, mpsc};
use uuid::Uuid;

use intents::Frame;
use tabletop::consts::DEFAULT_CELL_SIZE;
use tabletop::fog::FogOfWar;
use tabletop::grid::Grid;
use tabletop::visibility::player_visible;
use tabletop::world::{MapDefinition, WorldModel};

use crate::config::HostConfig;
use crate::turn::TurnState;

/// Identifies one connected client (one channel, one role).
pub type ClientId = Uuid;

/// A blank 20x20 map at the default cell size, used when a session starts
/// with no snapshot on disk.
#[must_use]
pub fn default_map() -> MapDefinition {
    MapDefinition {
        id: Uuid::new_v4(),
        width: 20.0 * DEFAULT_CELL_SIZE,
        height: 20.0 * DEFAULT_CELL_SIZE,
        grid: Grid::new(DEFAULT_CELL_SIZE, 0.0, 0.0),
        image_path: None,
    }
}

/// What a connected client is allowed to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// The game master: full visibility, all ops permitted.
    Host,
    /// A player: sees through the player fog, may only move tokens.
    Player,
}

// =============================================================================
// MAP SESSION
// =============================================================================

/// Per-map live state. Kept in memory while any client is connected and
/// flushed to the snapshot file on eviction.
pub struct MapSession {
    /// Authoritative world. Observers hold mirrors, never this.
    pub world: WorldModel,
    /// Shared fog layer for the players observer category.
    pub player_fog: FogOfWar,
    /// Connected clients: `client_id` -> sender for outgoing frames.
    pub clients: HashMap<ClientId, mpsc::Sender<Frame>>,
    pub roles: HashMap<ClientId, Role>,
    /// Active turn budget, installed by the external turn engine.
    pub turn: TurnState,
    /// Whether the world has mutated since the last flush.
    pub dirty: bool,
}

impl MapSession {
    #[must_use]
    pub fn new(world: WorldModel, player_fog: FogOfWar) -> Self {
        let mut session = Self {
            world,
            player_fog,
            clients: HashMap::new(),
            roles: HashMap::new(),
            turn: TurnState::new(),
            dirty: false,
        };
        session.refresh_player_fog();
        session
    }

    /// Recompute the players' visible set and fold it into the explored
    /// layer. Called after every visibility-affecting mutation.
    pub fn refresh_player_fog(&mut self) {
        self.player_fog.refresh(player_visible(&self.world));
    }

    /// The role of a connected client, defaulting to the restrictive one.
    #[must_use]
    pub fn role_of(&self, client_id: ClientId) -> Role {
        self.roles.get(&client_id).copied().unwrap_or(Role::Player)
    }
}

// =============================================================================
// HOST STATE
// =============================================================================

/// Shared host state. Clone is cheap; all inner fields are Arc-wrapped.
#[derive(Clone)]
pub struct HostState {
    pub sessions: Arc<RwLock<HashMap<Uuid, MapSession>>>,
    pub config: Arc<HostConfig>,
}

impl HostState {
    #[must_use]
    pub fn new(config: HostConfig) -> Self {
        Self { sessions: Arc::new(RwLock::new(HashMap::new())), config: Arc::new(config) }
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================


#[cfg(test)]
mod tests {
    use super::*;

    use tabletop::world::AmbientLight;

    #[test]
    fn new_session_has_no_clients_and_fresh_fog() {
        let world = WorldModel::new(test_helpers::test_map());
        let session = MapSession::new(world, FogOfWar::new());
        assert!(session.clients.is_empty());
        assert!(!session.dirty);
        assert!(session.turn.active().is_none());
    }

    #[test]
    fn constructing_a_session_refreshes_fog_from_tokens() {
        let mut world = WorldModel::new(test_helpers::test_map());
        world.set_ambient(AmbientLight::Bright);
        world.place_token(test_helpers::player_token(2, 2)).unwrap();

        let session = MapSession::new(world, FogOfWar::new());
        assert!(session.player_fog.visible().contains(&tabletop::grid::Cell::new(2, 2)));
        assert!(session.player_fog.visible().contains(&tabletop::grid::Cell::new(5, 2)));
    }

    #[test]
    fn unknown_clients_default_to_player_role() {
        let world = WorldModel::new(test_helpers::test_map());
        let session = MapSession::new(world, FogOfWar::new());
        assert_eq!(session.role_of(Uuid::new_v4()), Role::Player);
    }
}
