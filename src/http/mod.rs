//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → handlers.rs (home, room create/join/status)
//!     → websocket.rs (token check, upgrade, frame pump)
//!     → response.rs (JSON bodies, error → status mapping)
//! ```

pub mod handlers;
pub mod response;
pub mod server;
pub mod websocket;

pub use server::{AppState, HttpServer};
