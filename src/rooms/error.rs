//! Room error definitions.

use thiserror::Error;

use crate::game::MoveError;

/// Errors from room management and gameplay.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoomError {
    /// No live room has this id.
    #[error("room {0} not found")]
    NotFound(String),

    /// Player name failed validation.
    #[error("{0}")]
    InvalidName(String),

    /// The other player already uses this name.
    #[error("a player named {0} already exists in the room, try again with a different name")]
    NameTaken(String),

    /// Both player slots are taken.
    #[error("this room is already full")]
    Full,

    /// Token does not belong to any player of the room.
    #[error("invalid or expired token")]
    InvalidToken,

    /// The player already has an open connection to the room.
    #[error("{0} is already connected to this room")]
    AlreadyConnected(String),

    /// Moves are only accepted while a game is running.
    #[error("no game in progress")]
    NotPlaying,

    #[error("it's not your turn, waiting for {expected}")]
    NotYourTurn { expected: String },

    /// Rematch votes are only accepted after a game ended.
    #[error("no finished game to vote a rematch on")]
    NoRematchPending,

    #[error(transparent)]
    Move(#[from] MoveError),
}

/// Result type for room operations.
pub type RoomResult<T> = Result<T, RoomError>;
