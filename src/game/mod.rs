//! Game rules.
//!
//! Pure board logic with no I/O; rooms own a [`Board`] and drive it.

pub mod board;

pub use board::{Board, Mark, MoveError, WinResult};
