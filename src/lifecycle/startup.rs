//! Startup orchestration.
//!
//! # Responsibilities
//! - Resolve configuration (file or defaults, CLI overrides)
//! - Bind the listener
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Listener binds last, after everything else is ready

use std::path::Path;
use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::{load_config, validation::validate_config, ConfigError, ServerConfig};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },
}

/// Load the config file when given, otherwise defaults; then apply the bind override.
pub fn resolve_config(
    path: Option<&Path>,
    bind_override: Option<String>,
) -> Result<ServerConfig, StartupError> {
    let mut config = match path {
        Some(path) => load_config(path)?,
        None => ServerConfig::default(),
    };

    if let Some(bind) = bind_override {
        config.listener.bind_address = bind;
        validate_config(&config).map_err(ConfigError::Validation)?;
    }

    Ok(config)
}

/// Bind the HTTP listener.
pub async fn bind_listener(config: &ServerConfig) -> Result<TcpListener, StartupError> {
    let address = &config.listener.bind_address;
    TcpListener::bind(address.as_str())
        .await
        .map_err(|source| StartupError::Bind {
            address: address.clone(),
            source,
        })
}
