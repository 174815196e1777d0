//! WebSocket endpoint for players.
//!
//! # Responsibilities
//! - Authenticate the upgrade with the join token
//! - Register the connection in its room under a fresh UUID
//! - Pump frames between the socket and the room
//!
//! # Data Flow
//! ```text
//!            ┌──────── reader loop ────────┐
//! socket ───▶│ text frame → rooms::session │──▶ room.broadcast / send_to
//!            └─────────────────────────────┘            │
//!                                                      ▼
//! socket ◀─── writer task ◀─── mpsc::UnboundedReceiver<ServerEvent>
//! ```
//!
//! # Design Decisions
//! - The room owns the only sender; removing the connection (or the room)
//!   ends the writer, which closes the socket
//! - Token and capacity are checked before the upgrade so clients get a
//!   proper HTTP status; capacity is re-checked on attach

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, Query, State,
    },
    response::{IntoResponse, Response},
};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;

use crate::http::response::ApiError;
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::protocol::{ProtocolError, ServerEvent};
use crate::rooms::room::Room;
use crate::rooms::session::{self, Flow};

#[derive(Debug, Deserialize)]
pub struct WsParams {
    pub token: String,
}

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Path(room_id): Path<String>,
    Query(params): Query<WsParams>,
) -> Response {
    let (room, player) = match state.registry.verify(&room_id, &params.token) {
        Ok(found) => found,
        Err(e) => {
            tracing::info!(room_id = %room_id, error = %e, "WebSocket upgrade rejected");
            return ApiError::from(e).into_response();
        }
    };

    if let Err(e) = room.can_connect(&player) {
        tracing::info!(
            room_id = %room_id,
            player = %player,
            error = %e,
            "WebSocket upgrade rejected"
        );
        return ApiError::from(e).into_response();
    }

    ws.on_upgrade(move |socket| run_session(room, player, socket))
}

async fn run_session(room: Arc<Room>, player: String, socket: WebSocket) {
    let (mut sink, mut stream) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerEvent>();

    let conn_id = match room.connect(&player, tx) {
        Ok(id) => id,
        Err(e) => {
            tracing::info!(
                room_id = %room.id(),
                player = %player,
                error = %e,
                "Connection refused after upgrade"
            );
            let _ = sink.send(Message::Close(None)).await;
            return;
        }
    };

    metrics::record_connection_opened();
    tracing::info!(room_id = %room.id(), player = %player, conn_id = %conn_id, "Player connected");

    let mut writer = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            let text = match event.to_json() {
                Ok(text) => text,
                Err(e) => {
                    tracing::error!(error = %e, "Failed to encode event");
                    continue;
                }
            };
            if sink.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
        let _ = sink.send(Message::Close(None)).await;
    });

    session::on_join(&room, conn_id, &player);

    let mut writer_done = false;
    loop {
        tokio::select! {
            frame = stream.next() => {
                let flow = match frame {
                    Some(Ok(Message::Text(text))) => {
                        session::on_text(&room, conn_id, &player, text.as_str())
                    }
                    Some(Ok(Message::Binary(_))) => {
                        session::reject_frame(&room, conn_id, &player, ProtocolError::BinaryFrame);
                        Flow::Continue
                    }
                    // Pings are answered by axum.
                    Some(Ok(Message::Ping(_))) | Some(Ok(Message::Pong(_))) => Flow::Continue,
                    Some(Ok(Message::Close(_))) | None => Flow::Leave,
                    Some(Err(e)) => {
                        tracing::debug!(conn_id = %conn_id, error = %e, "WebSocket read error");
                        Flow::Leave
                    }
                };
                if flow == Flow::Leave {
                    break;
                }
            }
            _ = &mut writer => {
                writer_done = true;
                break;
            }
        }
    }

    if room.disconnect(conn_id).is_some() {
        session::on_leave(&room, &player);
    }
    if !writer_done {
        let _ = writer.await;
    }

    metrics::record_connection_closed();
    tracing::info!(
        room_id = %room.id(),
        player = %player,
        conn_id = %conn_id,
        "Player disconnected"
    );
}
