use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::rating::types::{GameId, PlayerId, RatingValue, Sequence};

/// Match format. Determines how many players each side takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameType {
    Singles,
    Doubles,
}

impl GameType {
    pub fn team_size(self) -> usize {
        match self {
            GameType::Singles => 1,
            GameType::Doubles => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            GameType::Singles => "singles",
            GameType::Doubles => "doubles",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "singles" => Some(GameType::Singles),
            "doubles" => Some(GameType::Doubles),
            _ => None,
        }
    }
}

/// Registered player. `rating` is derived state: only a ledger commit
/// writes it, everything else reads it.
#[derive(Debug, Clone, Serialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub rating: RatingValue,
    pub created_at: DateTime<Utc>,
}

/// Per (game, player) record. `score` and `team` come from the
/// submission; `rating_before`/`rating_after` are derived snapshots
/// rewritten by replay whenever this game or an earlier one changes.
#[derive(Debug, Clone)]
pub struct Participant {
    pub player_id: PlayerId,
    pub team: u8,
    pub score: i32,
    pub rating_before: RatingValue,
    pub rating_after: RatingValue,
}

/// Ledger entry. `sequence` is assigned at append time and is the only
/// replay order; `created_at` is display metadata.
#[derive(Debug, Clone)]
pub struct Game {
    pub id: GameId,
    pub sequence: Sequence,
    pub game_type: GameType,
    pub created_at: DateTime<Utc>,
    pub participants: Vec<Participant>,
}

impl Game {
    pub fn team_members(&self, team: u8) -> impl Iterator<Item = &Participant> {
        self.participants.iter().filter(move |p| p.team == team)
    }

    /// Score posted by the given side, if the side has any players.
    pub fn team_score(&self, team: u8) -> Option<i32> {
        self.team_members(team).next().map(|p| p.score)
    }

    pub fn participant(&self, player_id: PlayerId) -> Option<&Participant> {
        self.participants.iter().find(|p| p.player_id == player_id)
    }

    pub fn involves(&self, player_id: PlayerId) -> bool {
        self.participant(player_id).is_some()
    }
}

/// One side of a game submission: who played and what they scored.
#[derive(Debug, Clone, Deserialize)]
pub struct TeamInput {
    pub player_ids: Vec<PlayerId>,
    pub score: i32,
}
