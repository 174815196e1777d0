//! Tic-tac-toe room server.
//!
//! # Architecture Overview
//!
//! ```text
//!                       ┌──────────────────────────────────────────────┐
//!                       │                 GAME SERVER                  │
//!                       │                                              │
//!   POST /rooms/*       │  ┌──────────┐    ┌──────────────────────┐    │
//!   ────────────────────┼─▶│   http   │───▶│  rooms::registry     │    │
//!                       │  │ handlers │    │  id → Room           │    │
//!                       │  └──────────┘    └──────────┬───────────┘    │
//!                       │                             │                │
//!   GET /ws/{id}?token  │  ┌──────────┐    ┌──────────▼───────────┐    │
//!   ◀──────────────────▶┼─▶│websocket │◀──▶│  Room                │    │
//!                       │  │  pump    │    │  players, board,     │    │
//!                       │  └──────────┘    │  uuid → connection   │    │
//!                       │                  └──────────────────────┘    │
//!                       │                                              │
//!                       │  sweeper · config · observability · lifecycle│
//!                       └──────────────────────────────────────────────┘
//! ```

use clap::Parser;
use std::path::PathBuf;

use tictactoe_server::http::HttpServer;
use tictactoe_server::lifecycle::{signals, startup, Shutdown};
use tictactoe_server::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "tictactoe-server")]
#[command(about = "Two-player tic-tac-toe room server", long_about = None)]
struct Args {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listener bind address (e.g. 0.0.0.0:8080).
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = startup::resolve_config(args.config.as_deref(), args.bind)?;
    logging::init_logging(&config.observability);

    tracing::info!("tictactoe-server v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        room_ttl_secs = config.rooms.room_ttl_secs,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = match startup::bind_listener(&config).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(error = %e, "Startup failed");
            return Err(e.into());
        }
    };
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    signals::spawn_signal_handler(shutdown.clone());

    let server = HttpServer::new(config);
    server.run(listener, shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
