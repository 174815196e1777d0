//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, ports valid)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServerConfig → Result<(), Vec<ValidationError>>

use std::net::SocketAddr;
use thiserror::Error;

use crate::config::schema::ServerConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Check every section; collects all failures.
pub fn validate_config(config: &ServerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if let Err(message) = check_host_port(&config.listener.bind_address) {
        errors.push(ValidationError::new("listener.bind_address", message));
    }
    if config.listener.max_body_bytes == 0 {
        errors.push(ValidationError::new("listener.max_body_bytes", "must be greater than 0"));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be greater than 0"));
    }

    let rooms = &config.rooms;
    if rooms.room_ttl_secs == 0 {
        errors.push(ValidationError::new("rooms.room_ttl_secs", "must be greater than 0"));
    }
    if rooms.sweep_interval_secs == 0 {
        errors.push(ValidationError::new("rooms.sweep_interval_secs", "must be greater than 0"));
    }
    if rooms.max_player_name_len == 0 {
        errors.push(ValidationError::new("rooms.max_player_name_len", "must be greater than 0"));
    }
    if !(4..=32).contains(&rooms.room_id_len) {
        errors.push(ValidationError::new(
            "rooms.room_id_len",
            format!("must be between 4 and 32, got {}", rooms.room_id_len),
        ));
    }

    let obs = &config.observability;
    if !LOG_LEVELS.contains(&obs.log_level.to_ascii_lowercase().as_str()) {
        errors.push(ValidationError::new(
            "observability.log_level",
            format!("unknown level {:?}, expected one of {}", obs.log_level, LOG_LEVELS.join(", ")),
        ));
    }
    if obs.metrics_enabled && obs.metrics_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("{:?} is not a socket address", obs.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Accepts `host:port` where host may be a name (e.g. `localhost`).
fn check_host_port(address: &str) -> Result<(), String> {
    let (host, port) = address
        .rsplit_once(':')
        .ok_or_else(|| format!("{:?} is missing a port", address))?;
    if host.is_empty() {
        return Err(format!("{:?} is missing a host", address));
    }
    port.parse::<u16>()
        .map(|_| ())
        .map_err(|_| format!("{:?} has an invalid port", address))
}
