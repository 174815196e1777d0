//! Stale room cleanup.
//!
//! # Responsibilities
//! - Periodically scan the registry
//! - Remove rooms past their TTL that nobody is connected to

use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time;

use crate::config::RoomsConfig;
use crate::rooms::registry::RoomRegistry;

pub struct RoomSweeper {
    registry: RoomRegistry,
    interval: Duration,
    ttl: Duration,
}

impl RoomSweeper {
    pub fn new(registry: RoomRegistry, config: &RoomsConfig) -> Self {
        Self {
            registry,
            interval: Duration::from_secs(config.sweep_interval_secs),
            ttl: Duration::from_secs(config.room_ttl_secs),
        }
    }

    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(
            interval_secs = self.interval.as_secs(),
            ttl_secs = self.ttl.as_secs(),
            "Room sweeper starting"
        );

        let mut ticker = time::interval(self.interval);
        // First tick completes immediately; nothing can be stale yet.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.sweep_once();
                }
                _ = shutdown.recv() => {
                    tracing::info!("Room sweeper received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }

    fn sweep_once(&self) {
        let removed = self.registry.sweep(self.ttl);
        if removed.is_empty() {
            tracing::debug!(rooms = self.registry.len(), "Sweep found no stale rooms");
        } else {
            tracing::info!(
                removed = removed.len(),
                remaining = self.registry.len(),
                rooms = ?removed,
                "Removed stale rooms"
            );
        }
    }
}
