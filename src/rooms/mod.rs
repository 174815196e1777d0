//! Room management subsystem.
//!
//! # Data Flow
//! ```text
//! POST /rooms/create → registry.rs (allocate id) → Room { Waiting }
//! POST /rooms/join   → registry.rs (validate name, issue token) → room.rs
//! GET  /ws/{id}      → registry.rs (verify token) → room.rs (attach connection)
//!                    → session.rs (client events → room → broadcast)
//! sweeper.rs         → registry.rs (drop expired, unattended rooms)
//! ```
//!
//! # Design Decisions
//! - Rooms live in memory only; a restart forgets them
//! - A player's token survives disconnects, so a dropped client can reconnect
//! - Each connection is keyed by its own UUID, independent of the player name

pub mod error;
pub mod ids;
pub mod registry;
pub mod room;
pub mod session;
pub mod sweeper;

pub use error::{RoomError, RoomResult};
pub use registry::{JoinTicket, RoomRegistry};
pub use room::{Room, RoomSnapshot, RoomStatus};
pub use sweeper::RoomSweeper;
