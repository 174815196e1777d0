//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (tracing, timeouts, body limit, request ID)
//! - Run the room sweeper alongside the server
//! - Close every room on shutdown

use axum::{
    routing::{get, post},
    Router,
};
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ServerConfig;
use crate::http::{handlers, websocket};
use crate::lifecycle::Shutdown;
use crate::rooms::{RoomRegistry, RoomSweeper};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub registry: RoomRegistry,
}

/// HTTP server for the game.
pub struct HttpServer {
    router: Router,
    config: ServerConfig,
    registry: RoomRegistry,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ServerConfig) -> Self {
        let registry = RoomRegistry::new(config.rooms.clone());
        let state = AppState {
            registry: registry.clone(),
        };
        let router = Self::build_router(&config, state);
        Self {
            router,
            config,
            registry,
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ServerConfig, state: AppState) -> Router {
        Router::new()
            .route("/", get(handlers::home))
            .route("/rooms/create", post(handlers::create_room))
            .route("/rooms/join", post(handlers::join_room))
            .route("/rooms/{room_id}", get(handlers::room_status))
            .route("/rooms/{room_id}/rematch", post(handlers::rematch_vote))
            .route("/ws/{room_id}", get(websocket::ws_handler))
            .with_state(state)
            .layer(RequestBodyLimitLayer::new(config.listener.max_body_bytes))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// Run the server, accepting connections on the given listener until
    /// `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: Shutdown,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            "HTTP server starting"
        );

        let sweeper = RoomSweeper::new(self.registry.clone(), &self.config.rooms);
        let sweeper_handle = tokio::spawn(sweeper.run(shutdown.subscribe()));

        let registry = self.registry.clone();
        let server_shutdown = shutdown.subscribe();
        let graceful = async move {
            Shutdown::wait(server_shutdown).await;
            // Upgraded sockets are not tracked by the server; closing the
            // rooms ends their sessions.
            registry.clear();
        };

        axum::serve(listener, self.router)
            .with_graceful_shutdown(graceful)
            .await?;

        let _ = sweeper_handle.await;
        tracing::info!("HTTP server stopped");
        Ok(())
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Shared room registry, for embedding and tests.
    pub fn registry(&self) -> &RoomRegistry {
        &self.registry
    }
}
