//! Request/response bodies and error mapping.
//!
//! Every JSON body carries `success` and `message` so clients can branch on
//! the body alone; the status code mirrors the failure class.

use std::collections::BTreeMap;

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::rooms::room::RematchTally;
use crate::rooms::session::rematch_message;
use crate::rooms::{JoinTicket, RoomError, RoomSnapshot, RoomStatus};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinRoomRequest {
    pub player_name: String,
    pub room_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRoomResponse {
    pub success: bool,
    pub message: String,
    pub room_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinRoomResponse {
    pub success: bool,
    pub message: String,
    pub websocket_redirect: String,
    pub token: String,
}

impl From<JoinTicket> for JoinRoomResponse {
    fn from(ticket: JoinTicket) -> Self {
        Self {
            success: true,
            message: format!("Joined room {} as {}.", ticket.room_id, ticket.player_name),
            websocket_redirect: ticket.websocket_path(),
            token: ticket.token,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomStatusResponse {
    pub success: bool,
    pub message: String,
    pub status: RoomStatus,
    pub players: Vec<String>,
    pub current_turn: String,
    pub winner: String,
}

impl From<RoomSnapshot> for RoomStatusResponse {
    fn from(snapshot: RoomSnapshot) -> Self {
        Self {
            success: true,
            message: format!("{} player(s) connected.", snapshot.connections),
            status: snapshot.status,
            players: snapshot.players,
            current_turn: snapshot.current_turn,
            winner: snapshot.winner,
        }
    }
}

/// Rematch ballot cast over REST; the token identifies the voter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RematchVoteRequest {
    pub token: String,
    pub vote: bool,
    /// Informational, like the name on a socket move.
    #[serde(default)]
    pub player_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RematchVoteResponse {
    pub success: bool,
    pub message: String,
    pub votes: BTreeMap<String, bool>,
    pub all_voted: bool,
}

impl From<RematchTally> for RematchVoteResponse {
    fn from(tally: RematchTally) -> Self {
        Self {
            success: true,
            message: rematch_message(&tally),
            votes: tally.votes,
            all_voted: tally.all_voted,
        }
    }
}

/// Failure body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
}

/// Failures surfaced over HTTP.
#[derive(Debug)]
pub enum ApiError {
    Room(RoomError),
    /// Body missing, not JSON, or of the wrong shape.
    BadRequest(String),
}

impl From<RoomError> for ApiError {
    fn from(e: RoomError) -> Self {
        Self::Room(e)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        let room_error = match self {
            Self::Room(e) => e,
            Self::BadRequest(_) => return StatusCode::BAD_REQUEST,
        };
        match room_error {
            RoomError::NotFound(_) => StatusCode::NOT_FOUND,
            RoomError::InvalidName(_) | RoomError::Move(_) => StatusCode::BAD_REQUEST,
            RoomError::InvalidToken => StatusCode::UNAUTHORIZED,
            RoomError::NameTaken(_)
            | RoomError::Full
            | RoomError::AlreadyConnected(_)
            | RoomError::NotPlaying
            | RoomError::NotYourTurn { .. }
            | RoomError::NoRematchPending => StatusCode::CONFLICT,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorResponse {
            success: false,
            message: match self {
                Self::Room(e) => e.to_string(),
                Self::BadRequest(message) => message,
            },
        };
        (status, Json(body)).into_response()
    }
}
