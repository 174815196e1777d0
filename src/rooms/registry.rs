//! Live room registry.

use std::sync::Arc;
use std::time::Duration;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::config::RoomsConfig;
use crate::observability::metrics;
use crate::rooms::error::{RoomError, RoomResult};
use crate::rooms::ids::{generate_room_id, generate_token};
use crate::rooms::room::{Room, RoomSnapshot};

/// Credentials handed to a player after a successful join.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinTicket {
    pub room_id: String,
    pub player_name: String,
    pub token: String,
}

impl JoinTicket {
    /// Path the client upgrades to, token passed as a query parameter.
    pub fn websocket_path(&self) -> String {
        format!("/ws/{}", self.room_id)
    }
}

/// Thread-safe map of room id to room.
#[derive(Clone)]
pub struct RoomRegistry {
    rooms: Arc<DashMap<String, Arc<Room>>>,
    config: RoomsConfig,
}

impl RoomRegistry {
    pub fn new(config: RoomsConfig) -> Self {
        Self {
            rooms: Arc::new(DashMap::new()),
            config,
        }
    }

    pub fn config(&self) -> &RoomsConfig {
        &self.config
    }

    /// Create an empty room under a fresh id.
    pub fn create_room(&self) -> Arc<Room> {
        loop {
            let id = generate_room_id(self.config.room_id_len);
            match self.rooms.entry(id) {
                Entry::Occupied(_) => continue,
                Entry::Vacant(slot) => {
                    let room = Arc::new(Room::new(slot.key().clone()));
                    slot.insert(room.clone());
                    metrics::record_room_created();
                    tracing::info!(room_id = %room.id(), "Room created");
                    return room;
                }
            }
        }
    }

    pub fn get(&self, room_id: &str) -> RoomResult<Arc<Room>> {
        self.rooms
            .get(room_id)
            .map(|r| r.value().clone())
            .ok_or_else(|| RoomError::NotFound(room_id.to_string()))
    }

    /// Add `player_name` to the room and issue their token.
    pub fn join(&self, room_id: &str, player_name: &str) -> RoomResult<JoinTicket> {
        let room = self.get(room_id)?;
        let player_name = player_name.trim();
        self.validate_name(player_name)?;

        let token = generate_token();
        room.add_player(player_name, token.clone())?;

        tracing::info!(room_id = %room_id, player = %player_name, "Player joined room");
        Ok(JoinTicket {
            room_id: room_id.to_string(),
            player_name: player_name.to_string(),
            token,
        })
    }

    /// Resolve a token to its room and player.
    pub fn verify(&self, room_id: &str, token: &str) -> RoomResult<(Arc<Room>, String)> {
        let room = self.get(room_id)?;
        let player = room
            .player_for_token(token)
            .ok_or(RoomError::InvalidToken)?;
        Ok((room, player))
    }

    pub fn status(&self, room_id: &str) -> RoomResult<RoomSnapshot> {
        Ok(self.get(room_id)?.snapshot())
    }

    /// Remove a room and close its connections.
    pub fn remove(&self, room_id: &str, reason: &'static str) -> bool {
        match self.rooms.remove(room_id) {
            Some((_, room)) => {
                let closed = room.close_all();
                metrics::record_room_removed(reason);
                tracing::info!(room_id = %room_id, reason, closed, "Room removed");
                true
            }
            None => false,
        }
    }

    /// Drop rooms at least `ttl` old with nobody connected. Returns removed ids.
    pub fn sweep(&self, ttl: Duration) -> Vec<String> {
        let candidates: Vec<String> = self
            .rooms
            .iter()
            .filter(|r| r.value().age() >= ttl && r.value().connection_count() == 0)
            .map(|r| r.key().clone())
            .collect();

        let mut removed = Vec::new();
        for id in candidates {
            // A player may have connected since the scan; closing under the
            // room lock also turns away anyone past the upgrade checks.
            let gone = self
                .rooms
                .remove_if(&id, |_, room| room.close_if_idle())
                .is_some();
            if gone {
                metrics::record_room_removed("expired");
                removed.push(id);
            }
        }
        removed
    }

    /// Remove every room; used on shutdown.
    pub fn clear(&self) {
        let ids: Vec<String> = self.rooms.iter().map(|r| r.key().clone()).collect();
        for id in ids {
            self.remove(&id, "shutdown");
        }
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    fn validate_name(&self, name: &str) -> RoomResult<()> {
        if name.is_empty() {
            return Err(RoomError::InvalidName("player name can't be empty".into()));
        }
        if name.chars().count() > self.config.max_player_name_len {
            return Err(RoomError::InvalidName(format!(
                "player name can't be longer than {} characters",
                self.config.max_player_name_len
            )));
        }
        if !name.chars().all(char::is_alphanumeric) {
            return Err(RoomError::InvalidName(
                "invalid name, only letters and numbers are allowed".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn registry() -> RoomRegistry {
        RoomRegistry::new(RoomsConfig::default())
    }

    #[test]
    fn test_create_room_ids_are_unique() {
        let registry = registry();
        let a = registry.create_room();
        let b = registry.create_room();
        assert_ne!(a.id(), b.id());
        assert_eq!(a.id().len(), 6);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_join_and_verify() {
        let registry = registry();
        let room_id = registry.create_room().id().to_string();

        let ticket = registry.join(&room_id, "alice").unwrap();
        assert_eq!(ticket.websocket_path(), format!("/ws/{}", room_id));

        let (room, player) = registry.verify(&room_id, &ticket.token).unwrap();
        assert_eq!(player, "alice");
        assert_eq!(room.id(), room_id);

        assert!(matches!(
            registry.verify(&room_id, "bogus"),
            Err(RoomError::InvalidToken)
        ));
    }

    #[test]
    fn test_join_unknown_room() {
        let registry = registry();
        for name in ["alice", "", "a,b"] {
            assert_eq!(
                registry.join("zzzzzz", name),
                Err(RoomError::NotFound("zzzzzz".into()))
            );
        }
    }

    #[test]
    fn test_name_validation() {
        let registry = registry();
        let room_id = registry.create_room().id().to_string();

        let too_long = "x".repeat(51);
        for bad in ["", "   ", "a,b", "bob!", too_long.as_str()] {
            assert!(
                matches!(registry.join(&room_id, bad), Err(RoomError::InvalidName(_))),
                "{:?} should be rejected",
                bad
            );
        }
        assert!(registry.join(&room_id, &"x".repeat(50)).is_ok());
    }

    #[test]
    fn test_remove_closes_connections() {
        let registry = registry();
        let room = registry.create_room();
        registry.join(room.id(), "alice").unwrap();
        let (tx, mut rx) = mpsc::unbounded_channel();
        room.connect("alice", tx).unwrap();

        assert!(registry.remove(room.id(), "test"));
        assert!(!registry.remove(room.id(), "test"));
        assert!(registry.is_empty());
        // Sender dropped with the connection.
        assert_eq!(rx.try_recv(), Err(mpsc::error::TryRecvError::Disconnected));
    }

    #[test]
    fn test_sweep_skips_connected_and_young_rooms() {
        let registry = registry();
        let idle = registry.create_room();
        let busy = registry.create_room();
        registry.join(busy.id(), "alice").unwrap();
        let (tx, _rx) = mpsc::unbounded_channel();
        busy.connect("alice", tx).unwrap();

        assert!(registry.sweep(Duration::from_secs(3600)).is_empty());

        let removed = registry.sweep(Duration::ZERO);
        assert_eq!(removed, vec![idle.id().to_string()]);
        assert!(registry.get(busy.id()).is_ok());
        assert!(registry.get(idle.id()).is_err());
    }

    #[test]
    fn test_swept_room_refuses_pending_connection() {
        let registry = registry();
        let room_id = registry.create_room().id().to_string();
        let ticket = registry.join(&room_id, "alice").unwrap();

        // Upgrade checks pass, then the sweeper runs before the socket attaches.
        let (room, player) = registry.verify(&room_id, &ticket.token).unwrap();
        room.can_connect(&player).unwrap();
        assert_eq!(registry.sweep(Duration::ZERO), vec![room_id.clone()]);

        let (tx, _rx) = mpsc::unbounded_channel();
        assert_eq!(
            room.connect(&player, tx).map(|_| ()),
            Err(RoomError::NotFound(room_id))
        );
    }

    #[test]
    fn test_status_snapshot() {
        let registry = registry();
        let room_id = registry.create_room().id().to_string();
        registry.join(&room_id, "alice").unwrap();
        let snap = registry.status(&room_id).unwrap();
        assert_eq!(snap.players, vec!["alice"]);
        assert_eq!(snap.room_id, room_id);
    }
}
