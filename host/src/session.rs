//! Session lifecycle: join, part, broadcast.
//!
//! DESIGN
//! ======
//! Sessions are hydrated from the snapshot file when the first client joins
//! and kept in memory while any client is connected. Joining replies with a
//! role-shaped snapshot: the host sees everything; players get only tokens
//! marked visible to them plus the shared explored layer.
//!
//! ERROR HANDLING
//! ==============
//! On last-client part, a dirty session is flushed before eviction. If that
//! flush fails the session is intentionally kept in memory with its dirty
//! flag intact so a later part can retry instead of losing edits.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use tokio::sync::mpsc;
use tracing::info;
use uuid::Uuid;

use intents::snapshot::MapSnapshot;
use intents::{ErrorCode, Frame};
use tabletop::fog::FogOfWar;
use tabletop::world::WorldModel;

use crate::persistence;
use crate::state::{ClientId, HostState, MapSession, Role};

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("map not found: {0}")]
    NotFound(Uuid),
    #[error("snapshot load failed: {0}")]
    Load(#[from] persistence::PersistError),
}

impl ErrorCode for SessionError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "E_MAP_NOT_FOUND",
            Self::Load(_) => "E_SNAPSHOT",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Load(_))
    }
}

// =============================================================================
// JOIN / PART
// =============================================================================

/// Join a map session, hydrating it from disk if this is the first client.
///
/// Returns the snapshot the joining client should render, shaped by role.
///
/// # Errors
///
/// Returns [`SessionError::Load`] when a snapshot exists on disk but cannot
/// be read, and [`SessionError::NotFound`] when a different map lives at the
/// configured path.
pub async fn join(
    state: &HostState,
    map_id: Uuid,
    client_id: ClientId,
    role: Role,
    tx: mpsc::Sender<Frame>,
) -> Result<MapSnapshot, SessionError> {
    let mut sessions = state.sessions.write().await;
    if !sessions.contains_key(&map_id) {
        let (world, fog) = match persistence::load_snapshot(&state.config.map_path).await? {
            Some((world, fog)) if world.map.id == map_id => (world, fog),
            Some((world, _)) => return Err(SessionError::NotFound(world.map.id)),
            None => {
                // Fresh session: an empty world under this id.
                let mut map = crate::state::default_map();
                map.id = map_id;
                (WorldModel::new(map), FogOfWar::new())
            }
        };
        sessions.insert(map_id, MapSession::new(world, fog));
        info!(%map_id, "session hydrated");
    }

    let session = sessions
        .get_mut(&map_id)
        .ok_or(SessionError::NotFound(map_id))?;
    session.clients.insert(client_id, tx);
    session.roles.insert(client_id, role);

    info!(%map_id, %client_id, ?role, clients = session.clients.len(), "client joined");
    Ok(snapshot_for(session, role))
}

/// Leave a session. If this was the last client, flush and evict.
pub async fn part(state: &HostState, map_id: Uuid, client_id: ClientId) {
    let mut sessions = state.sessions.write().await;
    let Some(session) = sessions.get_mut(&map_id) else {
        return;
    };

    session.clients.remove(&client_id);
    session.roles.remove(&client_id);
    info!(%map_id, %client_id, remaining = session.clients.len(), "client left");

    if !session.clients.is_empty() {
        return;
    }

    let flushed = if state.config.autosave {
        persistence::flush_if_dirty(
            &state.config.map_path,
            &session.world,
            &session.player_fog,
            session.dirty,
        )
        .await
    } else {
        true
    };

    if flushed {
        sessions.remove(&map_id);
        info!(%map_id, "session evicted");
    } else {
        // Keep the session (dirty flag intact) so the next part retries.
        tracing::warn!(%map_id, "flush failed; session retained for retry");
    }
}

// =============================================================================
// BROADCAST
// =============================================================================

/// Send a frame to every client in a session, optionally excluding one.
pub async fn broadcast(state: &HostState, map_id: Uuid, frame: &Frame, exclude: Option<ClientId>) {
    let sessions = state.sessions.read().await;
    let Some(session) = sessions.get(&map_id) else {
        return;
    };
    broadcast_to(session, frame, exclude);
}

/// Same as [`broadcast`] for callers already holding the session.
pub fn broadcast_to(session: &MapSession, frame: &Frame, exclude: Option<ClientId>) {
    for (client_id, tx) in &session.clients {
        if exclude == Some(*client_id) {
            continue;
        }
        // Best-effort: a client with a full channel misses the frame.
        let _ = tx.try_send(frame.clone());
    }
}

// =============================================================================
// SNAPSHOT SHAPING
// =============================================================================

/// The snapshot a client of the given role should see.
///
/// The host receives the full world. Players receive only tokens flagged
/// visible to them; terrain, walls, and the explored layer are shared
/// knowledge once rendered, so they pass through unfiltered.
#[must_use]
pub fn snapshot_for(session: &MapSession, role: Role) -> MapSnapshot {
    let mut snapshot = MapSnapshot::from_world(&session.world, &session.player_fog);
    if role == Role::Player {
        snapshot.tokens.retain(|t| t.visible_to_players);
    }
    snapshot
}
