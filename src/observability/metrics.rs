//! Metrics collection and exposition.
//!
//! # Metrics
//! - `rooms_created_total` (counter)
//! - `rooms_removed_total{reason}` (counter): expired, shutdown
//! - `ws_connections_active` (gauge): open player connections
//! - `moves_total` (counter): accepted moves
//! - `games_finished_total{outcome}` (counter): win, draw
//!
//! Recording is a no-op until [`init_metrics`] installs the exporter.

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Install the Prometheus exporter with its own scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(
            address = %addr,
            error = %e,
            "Failed to install metrics exporter"
        ),
    }
}

pub fn record_room_created() {
    metrics::counter!("rooms_created_total").increment(1);
}

pub fn record_room_removed(reason: &'static str) {
    metrics::counter!("rooms_removed_total", "reason" => reason).increment(1);
}

pub fn record_connection_opened() {
    metrics::gauge!("ws_connections_active").increment(1.0);
}

pub fn record_connection_closed() {
    metrics::gauge!("ws_connections_active").decrement(1.0);
}

pub fn record_move() {
    metrics::counter!("moves_total").increment(1);
}

pub fn record_game_finished(outcome: &'static str) {
    metrics::counter!("games_finished_total", "outcome" => outcome).increment(1);
}
