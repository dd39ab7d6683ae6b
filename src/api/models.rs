use serde::{Deserialize, Serialize};

use crate::domain::models::{GameType, TeamInput};

#[derive(Debug, Deserialize)]
pub struct CreatePlayerRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct RenamePlayerRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateGameRequest {
    pub game_type: GameType,
    pub teams: Vec<TeamInput>,
}

#[derive(Debug, Deserialize)]
pub struct EditGameRequest {
    pub team1_score: i32,
    pub team2_score: i32,
}

#[derive(Debug, Deserialize)]
pub struct LimitParams {
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}
