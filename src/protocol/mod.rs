//! Player-facing wire protocol.
//!
//! # Data Flow
//! ```text
//! client text frame
//!     → ClientEvent::parse
//!     → rooms::session (apply to room)
//!     → ServerEvent fan-out through each connection's channel
//!     → websocket writer task → text frame
//! ```

pub mod events;

pub use events::{BoardRows, ClientEvent, MoveData, ProtocolError, ResultData, ServerEvent};
