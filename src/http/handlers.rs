//! REST handlers.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};

use crate::http::response::{
    ApiError, CreateRoomResponse, JoinRoomRequest, JoinRoomResponse, RematchVoteRequest,
    RematchVoteResponse, RoomStatusResponse,
};
use crate::http::server::AppState;
use crate::rooms::session;

/// Body served at `/`.
pub const HOME_BODY: &str = "Hey there!";

pub async fn home() -> (StatusCode, &'static str) {
    (StatusCode::OK, HOME_BODY)
}

pub async fn create_room(State(state): State<AppState>) -> Json<CreateRoomResponse> {
    let room = state.registry.create_room();
    Json(CreateRoomResponse {
        success: true,
        message: "Room created.".to_string(),
        room_id: room.id().to_string(),
    })
}

pub async fn join_room(
    State(state): State<AppState>,
    payload: Result<Json<JoinRoomRequest>, JsonRejection>,
) -> Result<Json<JoinRoomResponse>, ApiError> {
    let Json(request) = payload?;
    let ticket = state
        .registry
        .join(&request.room_id, &request.player_name)
        .inspect_err(|e| {
            tracing::info!(room_id = %request.room_id, error = %e, "Join rejected");
        })?;
    Ok(Json(ticket.into()))
}

pub async fn room_status(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
) -> Result<Json<RoomStatusResponse>, ApiError> {
    let snapshot = state.registry.status(&room_id)?;
    Ok(Json(snapshot.into()))
}

/// Cast a rematch ballot without a socket; connected players still see the
/// tally over their sockets.
pub async fn rematch_vote(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
    payload: Result<Json<RematchVoteRequest>, JsonRejection>,
) -> Result<Json<RematchVoteResponse>, ApiError> {
    let Json(request) = payload?;
    let (room, player) = state.registry.verify(&room_id, &request.token)?;
    let tally = session::cast_rematch_vote(&room, &player, request.vote).inspect_err(|e| {
        tracing::info!(room_id = %room_id, player = %player, error = %e, "Rematch vote rejected");
    })?;
    Ok(Json(tally.into()))
}
