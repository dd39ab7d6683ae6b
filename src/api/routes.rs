use axum::{
    routing::{get, put},
    Router,
};
use std::sync::Arc;

use crate::api::handlers::{games, health, players, AppState};

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/players", get(players::list_players).post(players::create_player))
        .route(
            "/api/players/:id",
            get(players::get_player)
                .put(players::rename_player)
                .delete(players::delete_player),
        )
        .route("/api/players/:id/stats", get(players::get_player_stats))
        .route("/api/players/:id/head-to-head", get(players::get_head_to_head))
        .route("/api/players/:id/rating-history", get(players::get_rating_history))
        .route("/api/players/:id/recent-games", get(players::get_recent_games))
        .route("/api/games", get(games::list_games).post(games::create_game))
        .route("/api/games/:id", put(games::update_game).delete(games::delete_game))
        .route("/api/leaderboard", get(players::list_players))
        .with_state(state)
}
