use thiserror::Error;

use crate::rating::types::{GameId, PlayerId};

/// Failures surfaced by ledger mutations and lookups. Validation
/// variants are detected before anything is staged, so a failed call
/// never leaves a partial mutation behind.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("invalid game submission: {0}")]
    Validation(String),

    #[error("player {0} is not registered")]
    UnknownPlayer(PlayerId),

    #[error("game {0} does not exist")]
    GameNotFound(GameId),

    #[error("player {0} does not exist")]
    PlayerNotFound(PlayerId),

    #[error("player {0} has recorded games and cannot be removed")]
    PlayerHasGames(PlayerId),

    #[error("replay aborted: {0}")]
    Replay(#[from] ReplayError),
}

/// Internal consistency failure during a replay walk. Aborts the whole
/// mutation; the committed ledger is left untouched and the caller may
/// retry the original request.
#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("game {game} has a side with no players")]
    EmptySide { game: GameId },

    #[error("game {game} has a participant outside teams 1 and 2")]
    UnknownSide { game: GameId },
}

/// Error shape exposed by the tracker service: a typed domain failure
/// or an infrastructure failure from the storage layer.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}
