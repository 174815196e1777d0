//! Two-player tic-tac-toe room server library.

pub mod config;
pub mod game;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod protocol;
pub mod rooms;

pub use config::ServerConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
