//! Typed views of the map ops carried inside [`Frame`] payloads.
//!
//! The frame layer routes on op names without looking at `data`; this module
//! is where payloads get their shapes. `Intent::from_frame` turns an inbound
//! request into a typed value (or a structured [`IntentError`] the dispatcher
//! can reply with), and `Intent::into_frame` builds the matching request for
//! the client side.
//!
//! Wire payloads spell coordinates out as flat numeric fields (`toX`, `x1`,
//! `centerY`) rather than nested cell objects, so a payload is always one
//! level deep.

#[cfg(test)]
#[path = "intent_test.rs"]
mod intent_test;

use serde::{Deserialize, Serialize};

use tabletop::fog::BrushMode;
use tabletop::grid::{Cell, Corner};
use tabletop::world::{
    AmbientLight, LightAnchor, TokenId, WallId, WallKind,
};

use crate::{Data, ErrorCode, Frame};

// =============================================================================
// ERRORS
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum IntentError {
    #[error("unknown op: {0}")]
    UnknownOp(String),
    #[error("malformed payload for {op}: {source}")]
    Malformed {
        op: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("light source needs either a tokenId or a fixed x/y anchor")]
    MissingAnchor,
}

impl ErrorCode for IntentError {
    fn error_code(&self) -> &'static str {
        match self {
            IntentError::UnknownOp(_) => "E_UNKNOWN_OP",
            IntentError::Malformed { .. } => "E_BAD_PAYLOAD",
            IntentError::MissingAnchor => "E_BAD_PAYLOAD",
        }
    }
}

// =============================================================================
// PAYLOADS
// =============================================================================

/// `token:move` — relocate a token; the host validates before applying.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveToken {
    pub token_id: TokenId,
    pub from_x: i32,
    pub from_y: i32,
    pub to_x: i32,
    pub to_y: i32,
}

impl MoveToken {
    #[must_use]
    pub fn from_cell(&self) -> Cell {
        Cell::new(self.from_x, self.from_y)
    }

    #[must_use]
    pub fn to_cell(&self) -> Cell {
        Cell::new(self.to_x, self.to_y)
    }
}

/// `token:place` — host-only; stamp a new token onto the map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceToken {
    pub token: tabletop::world::Token,
}

/// `fog:brush` — host-only manual fog edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrushFog {
    pub center_x: i32,
    pub center_y: i32,
    pub radius: u32,
    pub mode: BrushMode,
}

impl BrushFog {
    #[must_use]
    pub fn center(&self) -> Cell {
        Cell::new(self.center_x, self.center_y)
    }
}

/// `wall:place` — host-only; corners in grid-intersection coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceWall {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
    #[serde(rename = "type")]
    pub kind: WallKind,
}

impl PlaceWall {
    #[must_use]
    pub fn a(&self) -> Corner {
        Corner::new(self.x1, self.y1)
    }

    #[must_use]
    pub fn b(&self) -> Corner {
        Corner::new(self.x2, self.y2)
    }
}

/// `wall:toggleDoor` — host-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleDoor {
    pub wall_id: WallId,
}

/// `light:update` — host-only ambient light change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAmbient {
    pub ambient_light: AmbientLight,
}

/// `light:source` — host-only light source upsert. The anchor is either a
/// token (`tokenId`) or a fixed cell (`x`/`y`); exactly one must be present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertLight {
    pub light_id: tabletop::world::LightId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_id: Option<TokenId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<i32>,
    pub bright_radius: u32,
    pub dim_radius: u32,
    pub active: bool,
}

impl UpsertLight {
    /// Resolve the anchor fields.
    ///
    /// # Errors
    ///
    /// Returns [`IntentError::MissingAnchor`] when neither a token id nor a
    /// complete fixed position is present. A token id wins if both appear.
    pub fn anchor(&self) -> Result<LightAnchor, IntentError> {
        if let Some(token_id) = self.token_id {
            return Ok(LightAnchor::Token(token_id));
        }
        match (self.x, self.y) {
            (Some(x), Some(y)) => Ok(LightAnchor::Fixed(Cell::new(x, y))),
            _ => Err(IntentError::MissingAnchor),
        }
    }
}

/// `turn:set` — the external turn engine installs a movement budget, in feet.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetTurn {
    pub token_id: TokenId,
    pub max_ft: f64,
}

// =============================================================================
// INTENT
// =============================================================================

/// A parsed, typed map op.
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    MoveToken(MoveToken),
    PlaceToken(PlaceToken),
    BrushFog(BrushFog),
    PlaceWall(PlaceWall),
    ToggleDoor(ToggleDoor),
    UpdateAmbient(UpdateAmbient),
    UpsertLight(UpsertLight),
    SetTurn(SetTurn),
    ClearTurn,
}

impl Intent {
    /// The wire op name for this intent.
    #[must_use]
    pub fn op(&self) -> &'static str {
        match self {
            Intent::MoveToken(_) => "token:move",
            Intent::PlaceToken(_) => "token:place",
            Intent::BrushFog(_) => "fog:brush",
            Intent::PlaceWall(_) => "wall:place",
            Intent::ToggleDoor(_) => "wall:toggleDoor",
            Intent::UpdateAmbient(_) => "light:update",
            Intent::UpsertLight(_) => "light:source",
            Intent::SetTurn(_) => "turn:set",
            Intent::ClearTurn => "turn:clear",
        }
    }

    /// Whether only the host may submit this op.
    #[must_use]
    pub fn host_only(&self) -> bool {
        !matches!(self, Intent::MoveToken(_))
    }

    /// Parse a request frame into a typed intent.
    ///
    /// # Errors
    ///
    /// Returns [`IntentError::UnknownOp`] for an unrecognized op and
    /// [`IntentError::Malformed`] when the payload does not deserialize.
    pub fn from_frame(frame: &Frame) -> Result<Self, IntentError> {
        match frame.op.as_str() {
            "token:move" => Ok(Intent::MoveToken(parse(frame)?)),
            "token:place" => Ok(Intent::PlaceToken(parse(frame)?)),
            "fog:brush" => Ok(Intent::BrushFog(parse(frame)?)),
            "wall:place" => Ok(Intent::PlaceWall(parse(frame)?)),
            "wall:toggleDoor" => Ok(Intent::ToggleDoor(parse(frame)?)),
            "light:update" => Ok(Intent::UpdateAmbient(parse(frame)?)),
            "light:source" => Ok(Intent::UpsertLight(parse(frame)?)),
            "turn:set" => Ok(Intent::SetTurn(parse(frame)?)),
            "turn:clear" => Ok(Intent::ClearTurn),
            other => Err(IntentError::UnknownOp(other.to_owned())),
        }
    }

    /// Build the request frame carrying this intent.
    #[must_use]
    pub fn into_frame(self) -> Frame {
        let op = self.op();
        let data = match &self {
            Intent::MoveToken(p) => to_data(p),
            Intent::PlaceToken(p) => to_data(p),
            Intent::BrushFog(p) => to_data(p),
            Intent::PlaceWall(p) => to_data(p),
            Intent::ToggleDoor(p) => to_data(p),
            Intent::UpdateAmbient(p) => to_data(p),
            Intent::UpsertLight(p) => to_data(p),
            Intent::SetTurn(p) => to_data(p),
            Intent::ClearTurn => Data::new(),
        };
        Frame::request(op, data)
    }
}

fn parse<T: serde::de::DeserializeOwned>(frame: &Frame) -> Result<T, IntentError> {
    let value = serde_json::Value::Object(
        frame.data.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
    );
    serde_json::from_value(value).map_err(|source| IntentError::Malformed {
        op: frame.op.clone(),
        source,
    })
}

fn to_data<T: Serialize>(payload: &T) -> Data {
    match serde_json::to_value(payload) {
        Ok(serde_json::Value::Object(map)) => map.into_iter().collect(),
        _ => Data::new(),
    }
}
