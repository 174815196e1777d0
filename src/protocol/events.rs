//! WebSocket event envelope.
//!
//! Every frame is a JSON text frame shaped as:
//! ```text
//! {"type_": "<event type>", "data": { ... }}
//! ```
//! Server and client speak disjoint sets of events, except `rematch_vote`
//! which carries a ballot one way and the tally the other.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::game::{Board, WinResult};
use crate::rooms::RoomStatus;

/// Wire form of the board: `0` empty, `1` X, `2` O.
pub type BoardRows = [[u8; 3]; 3];

/// Errors decoding a client frame.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("invalid event: {0}")]
    InvalidEvent(#[from] serde_json::Error),

    #[error("binary frames are not supported, send JSON text frames")]
    BinaryFrame,
}

/// Events pushed from the server to connected players.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type_", content = "data", rename_all = "snake_case")]
pub enum ServerEvent {
    Message {
        message: String,
    },
    Board {
        board: BoardRows,
    },
    AskMove {
        player: String,
    },
    Result {
        board: BoardRows,
        result: ResultData,
        message: String,
    },
    RoomStatus {
        status: RoomStatus,
        players: Vec<String>,
        current_turn: String,
        winner: String,
    },
    RematchVote {
        votes: BTreeMap<String, bool>,
        all_voted: bool,
    },
}

impl ServerEvent {
    pub fn message(message: impl Into<String>) -> Self {
        ServerEvent::Message {
            message: message.into(),
        }
    }

    pub fn board(board: &Board) -> Self {
        ServerEvent::Board {
            board: board.rows(),
        }
    }

    pub fn ask_move(player: impl Into<String>) -> Self {
        ServerEvent::AskMove {
            player: player.into(),
        }
    }

    pub fn to_json(&self) -> Result<String, ProtocolError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Final line of a finished game, as shown to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultData {
    pub victory: bool,
    pub winner: Option<String>,
    pub coordinates: Vec<(usize, usize)>,
}

impl ResultData {
    /// `winner` is the display name of the player holding `result.winner`.
    pub fn new(result: &WinResult, winner: Option<String>) -> Self {
        Self {
            victory: result.victory,
            winner,
            coordinates: result.coordinates.clone(),
        }
    }

    pub fn draw() -> Self {
        Self {
            victory: false,
            winner: None,
            coordinates: Vec::new(),
        }
    }
}

/// A move as sent by the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveData {
    pub position: u8,
    /// Informational; the server acts on the name bound to the connection token.
    #[serde(default)]
    pub player_name: String,
}

/// Events received from players.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type_", content = "data", rename_all = "snake_case")]
pub enum ClientEvent {
    Move {
        #[serde(rename = "move")]
        mv: MoveData,
    },
    RematchVote {
        vote: bool,
    },
    Quit {},
}

impl ClientEvent {
    pub fn parse(text: &str) -> Result<Self, ProtocolError> {
        Ok(serde_json::from_str(text)?)
    }
}
