use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use std::sync::Arc;

use super::{error_response, AppState};
use crate::api::models::{CreatePlayerRequest, LimitParams, RenamePlayerRequest};
use crate::rating::types::PlayerId;

/// Listing players doubles as the leaderboard: rating order with
/// win/loss tallies.
pub async fn list_players(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.tracker.leaderboard().await).into_response()
}

pub async fn create_player(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreatePlayerRequest>,
) -> impl IntoResponse {
    match state.tracker.register_player(&req.name).await {
        Ok(player) => (StatusCode::CREATED, Json(player)).into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn get_player(
    State(state): State<Arc<AppState>>,
    Path(player_id): Path<PlayerId>,
) -> impl IntoResponse {
    match state.tracker.player(player_id).await {
        Ok(view) => Json(view).into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn rename_player(
    State(state): State<Arc<AppState>>,
    Path(player_id): Path<PlayerId>,
    Json(req): Json<RenamePlayerRequest>,
) -> impl IntoResponse {
    match state.tracker.rename_player(player_id, &req.name).await {
        Ok(player) => Json(player).into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn delete_player(
    State(state): State<Arc<AppState>>,
    Path(player_id): Path<PlayerId>,
) -> impl IntoResponse {
    match state.tracker.remove_player(player_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn get_player_stats(
    State(state): State<Arc<AppState>>,
    Path(player_id): Path<PlayerId>,
) -> impl IntoResponse {
    match state.tracker.player_stats(player_id).await {
        Ok(stats) => Json(stats).into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn get_head_to_head(
    State(state): State<Arc<AppState>>,
    Path(player_id): Path<PlayerId>,
) -> impl IntoResponse {
    match state.tracker.head_to_head(player_id).await {
        Ok(records) => Json(records).into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn get_rating_history(
    State(state): State<Arc<AppState>>,
    Path(player_id): Path<PlayerId>,
) -> impl IntoResponse {
    match state.tracker.rating_history(player_id).await {
        Ok(points) => Json(points).into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn get_recent_games(
    State(state): State<Arc<AppState>>,
    Path(player_id): Path<PlayerId>,
    Query(params): Query<LimitParams>,
) -> impl IntoResponse {
    match state.tracker.recent_games(player_id, params.limit).await {
        Ok(games) => Json(games).into_response(),
        Err(e) => error_response(e),
    }
}
