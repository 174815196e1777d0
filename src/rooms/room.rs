//! A single two-player room.
//!
//! # States
//! ```text
//! Waiting ──second player joins──▶ Playing ──win/draw──▶ Finished
//!                                     ▲                     │ vote
//!                                     │                     ▼
//!                                     └──both vote yes── RematchVoting
//!                                                           │ vote no
//!                                                           ▼
//!                                                        Finished
//! ```
//!
//! All state sits behind one mutex. Nothing awaits while holding it: events
//! are pushed into unbounded per-connection channels and written out by each
//! connection's own task.
//!
//! A second lock, taken through [`Room::order`], spans a state change and the
//! broadcasts describing it, so every connection sees changes in the order
//! they were applied. Take it before any state access, never after.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::game::{Board, Mark, WinResult};
use crate::protocol::{BoardRows, ServerEvent};
use crate::rooms::error::{RoomError, RoomResult};

/// Players per room.
pub const MAX_PLAYERS: usize = 2;

/// Outbound half of a connection.
pub type EventSender = mpsc::UnboundedSender<ServerEvent>;

/// Room lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomStatus {
    #[default]
    Waiting,
    Playing,
    Finished,
    RematchVoting,
}

#[derive(Debug, Clone)]
struct Player {
    name: String,
    token: String,
}

struct Connection {
    player: String,
    sender: EventSender,
}

#[derive(Default)]
struct RoomState {
    players: Vec<Player>,
    status: RoomStatus,
    board: Board,
    current_turn: Option<String>,
    winner: Option<String>,
    rematch_votes: BTreeMap<String, bool>,
    connections: HashMap<Uuid, Connection>,
    /// Set once the room left the registry; no new players or connections.
    closed: bool,
}

impl RoomState {
    fn mark_of(&self, player: &str) -> Option<Mark> {
        match self.players.iter().position(|p| p.name == player) {
            Some(0) => Some(Mark::X),
            Some(1) => Some(Mark::O),
            _ => None,
        }
    }

    fn name_of(&self, mark: Mark) -> Option<String> {
        let slot = match mark {
            Mark::X => 0,
            Mark::O => 1,
        };
        self.players.get(slot).map(|p| p.name.clone())
    }

    fn opponent_of(&self, player: &str) -> Option<String> {
        self.players
            .iter()
            .find(|p| p.name != player)
            .map(|p| p.name.clone())
    }

    /// Fresh board with player 1 to move.
    fn start_game(&mut self) {
        self.status = RoomStatus::Playing;
        self.board = Board::new();
        self.current_turn = self.players.first().map(|p| p.name.clone());
        self.winner = None;
        self.rematch_votes.clear();
    }
}

/// Point-in-time view of a room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomSnapshot {
    pub room_id: String,
    pub status: RoomStatus,
    pub players: Vec<String>,
    pub current_turn: String,
    pub winner: String,
    pub board: String,
    pub connections: usize,
}

impl RoomSnapshot {
    pub fn to_event(&self) -> ServerEvent {
        ServerEvent::RoomStatus {
            status: self.status,
            players: self.players.clone(),
            current_turn: self.current_turn.clone(),
            winner: self.winner.clone(),
        }
    }
}

/// What a successful move led to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveOutcome {
    Continue { next: String },
    Win { winner: String, result: WinResult },
    Draw,
}

/// Board after a move plus the outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveReport {
    pub board: BoardRows,
    pub outcome: MoveOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RematchOutcome {
    /// Waiting on the other player.
    Pending,
    /// Both agreed; a new game is running.
    Started { first: String },
    Declined { by: String },
}

/// Votes as they stood when the ballot was counted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RematchTally {
    pub votes: BTreeMap<String, bool>,
    pub all_voted: bool,
    pub outcome: RematchOutcome,
}

impl RematchTally {
    pub fn to_event(&self) -> ServerEvent {
        ServerEvent::RematchVote {
            votes: self.votes.clone(),
            all_voted: self.all_voted,
        }
    }
}

/// A room and the connections attached to it.
pub struct Room {
    id: String,
    created_at: Instant,
    state: Mutex<RoomState>,
    order: Mutex<()>,
}

impl Room {
    pub fn new(id: String) -> Self {
        Self {
            id,
            created_at: Instant::now(),
            state: Mutex::new(RoomState::default()),
            order: Mutex::new(()),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn age(&self) -> Duration {
        self.created_at.elapsed()
    }

    fn lock(&self) -> MutexGuard<'_, RoomState> {
        self.state.lock().expect("room state mutex poisoned")
    }

    /// Serialize a state change with its broadcasts.
    pub fn order(&self) -> MutexGuard<'_, ()> {
        self.order.lock().expect("room order mutex poisoned")
    }

    /// Claim a player slot. The second join starts the game.
    pub fn add_player(&self, name: &str, token: String) -> RoomResult<()> {
        let mut state = self.lock();

        if state.closed {
            return Err(RoomError::NotFound(self.id.clone()));
        }
        if state.players.iter().any(|p| p.name == name) {
            return Err(RoomError::NameTaken(name.to_string()));
        }
        if state.players.len() >= MAX_PLAYERS {
            return Err(RoomError::Full);
        }

        state.players.push(Player {
            name: name.to_string(),
            token,
        });

        if state.players.len() == MAX_PLAYERS {
            state.start_game();
            tracing::info!(room_id = %self.id, "Both players joined, game started");
        }
        Ok(())
    }

    /// Name of the player owning `token`.
    pub fn player_for_token(&self, token: &str) -> Option<String> {
        self.lock()
            .players
            .iter()
            .find(|p| p.token == token)
            .map(|p| p.name.clone())
    }

    /// Check whether `player` could attach a connection right now.
    pub fn can_connect(&self, player: &str) -> RoomResult<()> {
        self.check_connect(&self.lock(), player)
    }

    fn check_connect(&self, state: &RoomState, player: &str) -> RoomResult<()> {
        if state.closed {
            return Err(RoomError::NotFound(self.id.clone()));
        }
        if state.connections.values().any(|c| c.player == player) {
            return Err(RoomError::AlreadyConnected(player.to_string()));
        }
        if state.connections.len() >= MAX_PLAYERS {
            return Err(RoomError::Full);
        }
        Ok(())
    }

    /// Attach a connection for `player`; returns its id.
    pub fn connect(&self, player: &str, sender: EventSender) -> RoomResult<Uuid> {
        let mut state = self.lock();
        self.check_connect(&state, player)?;

        let conn_id = Uuid::new_v4();
        state.connections.insert(
            conn_id,
            Connection {
                player: player.to_string(),
                sender,
            },
        );
        Ok(conn_id)
    }

    /// Detach a connection; dropping its sender ends the writer task.
    pub fn disconnect(&self, conn_id: Uuid) -> Option<String> {
        self.lock().connections.remove(&conn_id).map(|c| c.player)
    }

    /// Close the room and drop every connection.
    pub fn close_all(&self) -> usize {
        let mut state = self.lock();
        state.closed = true;
        let closed = state.connections.len();
        state.connections.clear();
        closed
    }

    /// Close the room if nobody is connected. Checked and applied under one
    /// lock so a connection cannot slip in between.
    pub fn close_if_idle(&self) -> bool {
        let mut state = self.lock();
        if state.connections.is_empty() {
            state.closed = true;
        }
        state.closed
    }

    pub fn connection_count(&self) -> usize {
        self.lock().connections.len()
    }

    pub fn broadcast(&self, event: &ServerEvent) {
        let state = self.lock();
        for (conn_id, conn) in state.connections.iter() {
            if conn.sender.send(event.clone()).is_err() {
                tracing::debug!(
                room_id = %self.id,
                conn_id = %conn_id,
                "Dropped event for closing connection"
            );
            }
        }
    }

    pub fn send_to(&self, conn_id: Uuid, event: ServerEvent) {
        if let Some(conn) = self.lock().connections.get(&conn_id) {
            let _ = conn.sender.send(event);
        }
    }

    pub fn status(&self) -> RoomStatus {
        self.lock().status
    }

    pub fn current_turn(&self) -> Option<String> {
        self.lock().current_turn.clone()
    }

    pub fn board_event(&self) -> ServerEvent {
        ServerEvent::board(&self.lock().board)
    }

    pub fn snapshot(&self) -> RoomSnapshot {
        let state = self.lock();
        RoomSnapshot {
            room_id: self.id.clone(),
            status: state.status,
            players: state.players.iter().map(|p| p.name.clone()).collect(),
            current_turn: state.current_turn.clone().unwrap_or_default(),
            winner: state.winner.clone().unwrap_or_default(),
            board: state.board.to_text(),
            connections: state.connections.len(),
        }
    }

    /// Place `player`'s mark at `position` (1..=9).
    pub fn apply_move(&self, player: &str, position: u8) -> RoomResult<MoveReport> {
        let mut state = self.lock();

        if state.status != RoomStatus::Playing {
            return Err(RoomError::NotPlaying);
        }
        let expected = state.current_turn.clone().unwrap_or_default();
        if expected != player {
            return Err(RoomError::NotYourTurn { expected });
        }
        let mark = state.mark_of(player).ok_or(RoomError::InvalidToken)?;

        state.board.place(position, mark)?;

        let result = state.board.check_win();
        let outcome = if result.victory {
            let winner = result
                .winner
                .and_then(|m| state.name_of(m))
                .unwrap_or_else(|| player.to_string());
            state.status = RoomStatus::Finished;
            state.winner = Some(winner.clone());
            state.current_turn = None;
            MoveOutcome::Win { winner, result }
        } else if state.board.is_full() {
            state.status = RoomStatus::Finished;
            state.winner = None;
            state.current_turn = None;
            MoveOutcome::Draw
        } else {
            let next = state.opponent_of(player).unwrap_or_default();
            state.current_turn = Some(next.clone());
            MoveOutcome::Continue { next }
        };

        tracing::debug!(
            room_id = %self.id,
            player = %player,
            position,
            board = %state.board.to_text(),
            "Move applied"
        );

        Ok(MoveReport {
            board: state.board.rows(),
            outcome,
        })
    }

    /// Record a rematch ballot. A single "no" ends the vote.
    pub fn vote_rematch(&self, player: &str, vote: bool) -> RoomResult<RematchTally> {
        let mut state = self.lock();

        if !matches!(state.status, RoomStatus::Finished | RoomStatus::RematchVoting) {
            return Err(RoomError::NoRematchPending);
        }

        state.rematch_votes.insert(player.to_string(), vote);
        let votes = state.rematch_votes.clone();
        let all_voted = votes.len() == state.players.len();

        let outcome = if !vote {
            state.status = RoomStatus::Finished;
            state.rematch_votes.clear();
            RematchOutcome::Declined {
                by: player.to_string(),
            }
        } else if all_voted && votes.values().all(|v| *v) {
            state.start_game();
            RematchOutcome::Started {
                first: state.current_turn.clone().unwrap_or_default(),
            }
        } else {
            state.status = RoomStatus::RematchVoting;
            RematchOutcome::Pending
        };

        Ok(RematchTally {
            votes,
            all_voted,
            outcome,
        })
    }
}
