//! Frame dispatch: parse, authorize, validate, apply, fan out.
//!
//! DESIGN
//! ======
//! `handle_frame` is the single entry point for inbound request frames. It
//! parses the op into a typed intent, checks the sender's role, applies the
//! change to the session's world, recomputes the player fog, and fans the
//! applied change out to the session's other clients. The return value is the
//! list of frames owed to the sender.
//!
//! A rejected `token:move` is not an error: the reply is a normal done frame
//! carrying `allowed: false` and a reason, because an illegal move is an
//! expected outcome the client renders, not a protocol failure. Error frames
//! are reserved for malformed payloads, missing authority, and ops that name
//! things which do not exist.
//!
//! Nothing is applied partially: every handler validates before mutating, so
//! an error reply always means the world is unchanged.

#[cfg(test)]
#[path = "dispatch_test.rs"]
mod dispatch_test;

use serde_json::json;
use tracing::{debug, info};
use uuid::Uuid;

use intents::intent::{Intent, IntentError};
use intents::{Data, ErrorCode, Frame, Status};
use tabletop::movement::{self, MoveDecision, MoveRejection};
use tabletop::world::{LightSource, WallSegment, WorldError};

use crate::session;
use crate::state::{ClientId, HostState, MapSession, Role};

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("op {0} requires the host role")]
    Forbidden(String),
    #[error("map not joined: {0}")]
    MapNotJoined(Uuid),
    #[error(transparent)]
    Intent(#[from] IntentError),
    #[error(transparent)]
    World(#[from] WorldError),
}

impl ErrorCode for DispatchError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Forbidden(_) => "E_FORBIDDEN",
            Self::MapNotJoined(_) => "E_MAP_NOT_FOUND",
            Self::Intent(e) => e.error_code(),
            Self::World(e) => match e {
                WorldError::OutOfBounds { .. } => "E_OUT_OF_BOUNDS",
                WorldError::TokenNotFound(_) => "E_TOKEN_NOT_FOUND",
                WorldError::WallNotFound(_) => "E_WALL_NOT_FOUND",
                WorldError::LightNotFound(_) => "E_LIGHT_NOT_FOUND",
                WorldError::DegenerateWall { .. } => "E_DEGENERATE_WALL",
                WorldError::NotADoor(_) => "E_NOT_A_DOOR",
                WorldError::ZeroSizeToken => "E_BAD_TOKEN",
            },
        }
    }
}

/// How an applied intent propagates.
enum Applied {
    /// Reply to the sender only.
    Reply(Data),
    /// Reply to the sender and copy the payload to every other client.
    Broadcast(Data),
}

// =============================================================================
// ENTRY POINT
// =============================================================================

/// Dispatch one inbound frame against a joined session.
///
/// Returns the frames owed to the sender. Broadcasts to the session's other
/// clients happen as a side effect; peers receive a fresh-id copy of the
/// applied payload with no `parent_id`, so it reads as an event rather than
/// a reply to a request they never made.
pub async fn handle_frame(
    state: &HostState,
    map_id: Uuid,
    client_id: ClientId,
    frame: &Frame,
) -> Vec<Frame> {
    if frame.status != Status::Request {
        return Vec::new();
    }

    let intent = match Intent::from_frame(frame) {
        Ok(intent) => intent,
        Err(e) => {
            debug!(op = %frame.op, error = %e, "rejected frame");
            return vec![frame.error_from(&e)];
        }
    };

    let mut sessions = state.sessions.write().await;
    let Some(session) = sessions.get_mut(&map_id) else {
        return vec![frame.error_from(&DispatchError::MapNotJoined(map_id))];
    };

    if intent.host_only() && session.role_of(client_id) != Role::Host {
        let err = DispatchError::Forbidden(frame.op.clone());
        debug!(%client_id, op = %frame.op, "refused player op");
        return vec![frame.error_from(&err)];
    }

    match apply(session, intent) {
        Ok(Applied::Reply(data)) => vec![frame.done_with(data)],
        Ok(Applied::Broadcast(data)) => {
            let reply = frame.done_with(data);
            let mut event = reply.clone();
            event.id = Uuid::new_v4();
            event.parent_id = None;
            session::broadcast_to(session, &event, Some(client_id));
            vec![reply]
        }
        Err(e) => {
            debug!(op = %frame.op, error = %e, "apply failed");
            vec![frame.error_from(&e)]
        }
    }
}

// =============================================================================
// HANDLERS
// =============================================================================

fn apply(session: &mut MapSession, intent: Intent) -> Result<Applied, DispatchError> {
    match intent {
        Intent::MoveToken(p) => move_token(session, &p),
        Intent::PlaceToken(p) => {
            session.world.place_token(p.token.clone())?;
            session.refresh_player_fog();
            session.dirty = true;
            info!(token_id = %p.token.id, cell = ?p.token.cell, "token placed");
            Ok(Applied::Broadcast(payload(json!({ "token": p.token }))))
        }
        Intent::BrushFog(p) => {
            let grid = session.world.map.grid;
            // The radius comes off the wire and drives a quadratic scan;
            // cap it at the map span so a hostile value cannot stall the
            // session lock. The clamped radius is what gets rebroadcast.
            let span = session.world.map.cols().max(session.world.map.rows());
            let radius = p.radius.min(span.unsigned_abs());
            session.player_fog.apply_brush(&grid, p.center(), radius, p.mode);
            session.dirty = true;
            Ok(Applied::Broadcast(payload(json!({
                "centerX": p.center_x,
                "centerY": p.center_y,
                "radius": radius,
                "mode": p.mode,
            }))))
        }
        Intent::PlaceWall(p) => {
            let wall = WallSegment {
                id: Uuid::new_v4(),
                a: p.a(),
                b: p.b(),
                kind: p.kind,
                door_open: false,
            };
            let wall_id = wall.id;
            session.world.place_wall(wall)?;
            session.refresh_player_fog();
            session.dirty = true;
            Ok(Applied::Broadcast(payload(json!({
                "wallId": wall_id,
                "x1": p.x1,
                "y1": p.y1,
                "x2": p.x2,
                "y2": p.y2,
                "type": p.kind,
            }))))
        }
        Intent::ToggleDoor(p) => {
            let open = session.world.toggle_door(p.wall_id)?;
            session.refresh_player_fog();
            session.dirty = true;
            info!(wall_id = %p.wall_id, open, "door toggled");
            Ok(Applied::Broadcast(payload(json!({ "wallId": p.wall_id, "open": open }))))
        }
        Intent::UpdateAmbient(p) => {
            session.world.set_ambient(p.ambient_light);
            session.refresh_player_fog();
            session.dirty = true;
            Ok(Applied::Broadcast(payload(json!({ "ambientLight": p.ambient_light }))))
        }
        Intent::UpsertLight(p) => {
            let anchor = p.anchor()?;
            session.world.set_light(LightSource {
                id: p.light_id,
                anchor,
                bright_radius: p.bright_radius,
                dim_radius: p.dim_radius,
                active: p.active,
            });
            session.refresh_player_fog();
            session.dirty = true;
            Ok(Applied::Broadcast(payload(json!({
                "lightId": p.light_id,
                "brightRadius": p.bright_radius,
                "dimRadius": p.dim_radius,
                "active": p.active,
            }))))
        }
        Intent::SetTurn(p) => {
            session.turn.set(p.token_id, p.max_ft);
            info!(token_id = %p.token_id, max_ft = p.max_ft, "turn budget set");
            Ok(Applied::Broadcast(payload(json!({
                "tokenId": p.token_id,
                "maxFt": p.max_ft,
            }))))
        }
        Intent::ClearTurn => {
            session.turn.clear();
            Ok(Applied::Broadcast(Data::new()))
        }
    }
}

fn move_token(
    session: &mut MapSession,
    p: &intents::intent::MoveToken,
) -> Result<Applied, DispatchError> {
    let to = p.to_cell();
    let remaining = session.turn.remaining_for(p.token_id);

    match movement::validate_move(&session.world, p.token_id, to, remaining) {
        MoveDecision::Allowed { cost_ft } => {
            session.world.move_token(p.token_id, to)?;
            let remaining_ft = session.turn.debit(p.token_id, cost_ft);
            session.refresh_player_fog();
            session.dirty = true;
            info!(token_id = %p.token_id, to = ?to, cost_ft, "token moved");

            let mut data = payload(json!({
                "allowed": true,
                "tokenId": p.token_id,
                "toX": p.to_x,
                "toY": p.to_y,
                "costFt": cost_ft,
            }));
            if let Some(remaining_ft) = remaining_ft {
                data.insert("remainingFt".into(), json!(remaining_ft));
            }
            Ok(Applied::Broadcast(data))
        }
        MoveDecision::Rejected(rejection) => {
            let mut data = payload(json!({
                "allowed": false,
                "tokenId": p.token_id,
                "reason": reason(&rejection),
            }));
            if let MoveRejection::InsufficientMovement { cost_ft, remaining_ft } = rejection {
                data.insert("costFt".into(), json!(cost_ft));
                data.insert("remainingFt".into(), json!(remaining_ft));
            }
            Ok(Applied::Reply(data))
        }
    }
}

fn reason(rejection: &MoveRejection) -> &'static str {
    match rejection {
        MoveRejection::OutOfBounds => "outOfBounds",
        MoveRejection::Impassable => "impassable",
        MoveRejection::WallBlocked => "wallBlocked",
        MoveRejection::InsufficientMovement { .. } => "insufficientMovement",
    }
}

fn payload(value: serde_json::Value) -> Data {
    match value {
        serde_json::Value::Object(map) => map.into_iter().collect(),
        _ => Data::new(),
    }
}
