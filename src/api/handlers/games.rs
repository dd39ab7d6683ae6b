use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use std::sync::Arc;

use super::{error_response, AppState};
use crate::api::models::{CreateGameRequest, EditGameRequest, LimitParams};
use crate::rating::types::GameId;

pub async fn list_games(
    State(state): State<Arc<AppState>>,
    Query(params): Query<LimitParams>,
) -> impl IntoResponse {
    Json(state.tracker.games(params.limit).await).into_response()
}

pub async fn create_game(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateGameRequest>,
) -> impl IntoResponse {
    match state.tracker.record_game(req.game_type, req.teams).await {
        Ok(view) => (StatusCode::CREATED, Json(view)).into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn update_game(
    State(state): State<Arc<AppState>>,
    Path(game_id): Path<GameId>,
    Json(req): Json<EditGameRequest>,
) -> impl IntoResponse {
    match state
        .tracker
        .edit_game(game_id, req.team1_score, req.team2_score)
        .await
    {
        Ok(view) => Json(view).into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn delete_game(
    State(state): State<Arc<AppState>>,
    Path(game_id): Path<GameId>,
) -> impl IntoResponse {
    match state.tracker.delete_game(game_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response(e),
    }
}
