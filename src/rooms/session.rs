//! Per-connection game flow.
//!
//! Turns decoded client events into room actions and fans the resulting
//! server events out to the room. Transport-agnostic: the WebSocket layer
//! only feeds frames in and writes channel output back out.
//!
//! Every state change and its broadcasts run under [`Room::order`].

use uuid::Uuid;

use crate::observability::metrics;
use crate::protocol::{ClientEvent, ProtocolError, ResultData, ServerEvent};
use crate::rooms::error::RoomResult;
use crate::rooms::room::{MoveOutcome, RematchOutcome, RematchTally, Room, RoomStatus};

/// Whether the session keeps reading after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Leave,
}

/// Announce a freshly attached connection.
pub fn on_join(room: &Room, conn_id: Uuid, player: &str) {
    let _order = room.order();
    room.broadcast(&ServerEvent::message(format!("{} joined the room", player)));

    let snapshot = room.snapshot();
    room.broadcast(&snapshot.to_event());

    match snapshot.status {
        RoomStatus::Waiting => {
            room.send_to(conn_id, ServerEvent::message("Waiting for another player to join."));
        }
        RoomStatus::Playing => {
            room.broadcast(&room.board_event());
            room.broadcast(&ServerEvent::ask_move(snapshot.current_turn));
        }
        RoomStatus::Finished | RoomStatus::RematchVoting => {
            room.send_to(conn_id, room.board_event());
        }
    }
}

/// Announce a detached connection.
pub fn on_leave(room: &Room, player: &str) {
    let _order = room.order();
    room.broadcast(&ServerEvent::message(format!("{} left the room", player)));
    room.broadcast(&room.snapshot().to_event());
}

/// Decode one text frame and act on it.
pub fn on_text(room: &Room, conn_id: Uuid, player: &str, text: &str) -> Flow {
    match ClientEvent::parse(text) {
        Ok(event) => on_event(room, conn_id, player, event),
        Err(e) => {
            reject_frame(room, conn_id, player, e);
            Flow::Continue
        }
    }
}

/// Tell the sender their frame was unusable.
pub fn reject_frame(room: &Room, conn_id: Uuid, player: &str, error: ProtocolError) {
    tracing::debug!(
        room_id = %room.id(),
        player = %player,
        error = %error,
        "Rejected client frame"
    );
    room.send_to(conn_id, ServerEvent::message(error.to_string()));
}

pub fn on_event(room: &Room, conn_id: Uuid, player: &str, event: ClientEvent) -> Flow {
    match event {
        ClientEvent::Move { mv } => {
            if !mv.player_name.is_empty() && mv.player_name != player {
                tracing::debug!(
                    room_id = %room.id(),
                    player = %player,
                    claimed = %mv.player_name,
                    "Move names a different player, using the authenticated one"
                );
            }
            handle_move(room, conn_id, player, mv.position);
            Flow::Continue
        }
        ClientEvent::RematchVote { vote } => {
            handle_rematch_vote(room, conn_id, player, vote);
            Flow::Continue
        }
        ClientEvent::Quit {} => {
            tracing::info!(room_id = %room.id(), player = %player, "Player quit");
            Flow::Leave
        }
    }
}

fn handle_move(room: &Room, conn_id: Uuid, player: &str, position: u8) {
    let _order = room.order();
    let report = match room.apply_move(player, position) {
        Ok(report) => report,
        Err(e) => {
            room.send_to(conn_id, ServerEvent::message(e.to_string()));
            // Remind the mover whose turn it is while a game runs.
            if let Some(turn) = room.current_turn() {
                room.send_to(conn_id, ServerEvent::ask_move(turn));
            }
            return;
        }
    };

    metrics::record_move();
    room.broadcast(&ServerEvent::Board {
        board: report.board,
    });

    match report.outcome {
        MoveOutcome::Continue { next } => {
            room.broadcast(&ServerEvent::ask_move(next));
        }
        MoveOutcome::Win { winner, result } => {
            tracing::info!(room_id = %room.id(), winner = %winner, "Game won");
            metrics::record_game_finished("win");
            room.broadcast(&ServerEvent::Result {
                board: report.board,
                message: format!("{} wins!", winner),
                result: ResultData::new(&result, Some(winner)),
            });
            room.broadcast(&room.snapshot().to_event());
        }
        MoveOutcome::Draw => {
            tracing::info!(room_id = %room.id(), "Game drawn");
            metrics::record_game_finished("draw");
            room.broadcast(&ServerEvent::Result {
                board: report.board,
                result: ResultData::draw(),
                message: "It's a draw.".to_string(),
            });
            room.broadcast(&room.snapshot().to_event());
        }
    }
}

fn handle_rematch_vote(room: &Room, conn_id: Uuid, player: &str, vote: bool) {
    if let Err(e) = cast_rematch_vote(room, player, vote) {
        room.send_to(conn_id, ServerEvent::message(e.to_string()));
    }
}

/// Count a rematch ballot and announce the tally to the room. Shared by the
/// socket and the REST endpoint.
pub fn cast_rematch_vote(room: &Room, player: &str, vote: bool) -> RoomResult<RematchTally> {
    let _order = room.order();
    let tally = room.vote_rematch(player, vote)?;

    room.broadcast(&tally.to_event());
    match &tally.outcome {
        RematchOutcome::Pending => {}
        RematchOutcome::Started { first } => {
            tracing::info!(room_id = %room.id(), "Rematch started");
            room.broadcast(&ServerEvent::message(rematch_message(&tally)));
            room.broadcast(&room.board_event());
            room.broadcast(&ServerEvent::ask_move(first.clone()));
        }
        RematchOutcome::Declined { .. } => {
            room.broadcast(&ServerEvent::message(rematch_message(&tally)));
        }
    }
    room.broadcast(&room.snapshot().to_event());
    Ok(tally)
}

/// Human-readable summary of a tally.
pub fn rematch_message(tally: &RematchTally) -> String {
    match &tally.outcome {
        RematchOutcome::Pending => "Vote recorded, waiting for the other player.".to_string(),
        RematchOutcome::Started { first } => format!("Rematch! {} starts.", first),
        RematchOutcome::Declined { by } => format!("{} declined the rematch.", by),
    }
}
