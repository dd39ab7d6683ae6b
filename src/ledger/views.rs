//! Read models over the ledger: every function here is a pure fold in
//! ascending sequence order, recomputable from scratch at any time.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::Ledger;
use crate::domain::models::{Game, Participant};
use crate::errors::LedgerError;
use crate::rating::types::{GameId, PlayerId, RatingValue, Sequence};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GameOutcome {
    Win,
    Loss,
    Draw,
}

/// Outcome of `game` as seen by one of its participants.
fn outcome_for(game: &Game, p: &Participant) -> GameOutcome {
    let opponent = if p.team == 1 { 2 } else { 1 };
    let theirs = game.team_score(opponent).unwrap_or(0);
    if p.score > theirs {
        GameOutcome::Win
    } else if p.score < theirs {
        GameOutcome::Loss
    } else {
        GameOutcome::Draw
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PlayerView {
    pub id: PlayerId,
    pub name: String,
    pub rating: RatingValue,
    pub games_played: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LeaderboardEntry {
    pub id: PlayerId,
    pub name: String,
    pub rating: RatingValue,
    pub wins: i32,
    pub losses: i32,
    pub games_played: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlayerStats {
    pub total_games: i32,
    pub wins: i32,
    pub losses: i32,
    pub win_rate: f64,
    pub current_streak: i32,
    pub longest_win_streak: i32,
    pub longest_losing_streak: i32,
    pub peak_rating: RatingValue,
    pub peak_rating_date: Option<DateTime<Utc>>,
    pub avg_rating_change: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct HeadToHeadRecord {
    pub opponent_id: PlayerId,
    pub opponent_name: String,
    pub total_games: i32,
    pub wins: i32,
    pub losses: i32,
    pub win_rate: f64,
    pub last_result: GameOutcome,
}

#[derive(Debug, Clone, Serialize)]
pub struct RatingPoint {
    pub sequence: Sequence,
    pub played_at: DateTime<Utc>,
    pub rating: RatingValue,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecentGame {
    pub game_id: GameId,
    pub won: bool,
}

/// Game as served to clients, with names resolved and the snapshot
/// rating movement of every participant.
#[derive(Debug, Clone, Serialize)]
pub struct GameView {
    pub id: GameId,
    pub game_type: String,
    pub created_at: DateTime<Utc>,
    pub players: Vec<GameParticipantView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GameParticipantView {
    pub player_id: PlayerId,
    pub player_name: String,
    pub team: u8,
    pub score: i32,
    pub rating_before: RatingValue,
    pub rating_after: RatingValue,
}

pub fn player_view(ledger: &Ledger, id: PlayerId) -> Result<PlayerView, LedgerError> {
    let player = ledger.player(id)?;
    let games_played = ledger.games().iter().filter(|g| g.involves(id)).count() as i32;
    Ok(PlayerView {
        id: player.id,
        name: player.name.clone(),
        rating: player.rating,
        games_played,
        created_at: player.created_at,
    })
}

/// Players ordered by rating descending; ties go to whoever has played
/// fewer games, then to the lower id so the order is total.
pub fn leaderboard(ledger: &Ledger) -> Vec<LeaderboardEntry> {
    let mut tallies: HashMap<PlayerId, (i32, i32, i32)> = HashMap::new();
    for game in ledger.games() {
        for p in &game.participants {
            let entry = tallies.entry(p.player_id).or_default();
            entry.2 += 1;
            match outcome_for(game, p) {
                GameOutcome::Win => entry.0 += 1,
                GameOutcome::Loss => entry.1 += 1,
                GameOutcome::Draw => {}
            }
        }
    }

    let mut entries: Vec<LeaderboardEntry> = ledger
        .players()
        .map(|player| {
            let (wins, losses, games_played) =
                tallies.get(&player.id).copied().unwrap_or_default();
            LeaderboardEntry {
                id: player.id,
                name: player.name.clone(),
                rating: player.rating,
                wins,
                losses,
                games_played,
            }
        })
        .collect();

    entries.sort_by(|a, b| {
        b.rating
            .total_cmp(&a.rating)
            .then(a.games_played.cmp(&b.games_played))
            .then(a.id.cmp(&b.id))
    });
    entries
}

pub fn player_stats(ledger: &Ledger, id: PlayerId) -> Result<PlayerStats, LedgerError> {
    ledger.player(id)?;

    let mut wins = 0;
    let mut losses = 0;
    let mut draws = 0;
    let mut streak = 0i32;
    let mut longest_win_streak = 0i32;
    let mut longest_losing_streak = 0i32;
    let mut peak_rating = ledger.settings().baseline_rating;
    let mut peak_rating_date = None;
    let mut rating_change_sum = 0.0;

    for game in ledger.games() {
        let Some(p) = game.participant(id) else { continue };
        match outcome_for(game, p) {
            GameOutcome::Win => {
                wins += 1;
                streak = if streak > 0 { streak + 1 } else { 1 };
                longest_win_streak = longest_win_streak.max(streak);
            }
            GameOutcome::Loss => {
                losses += 1;
                streak = if streak < 0 { streak - 1 } else { -1 };
                longest_losing_streak = longest_losing_streak.max(-streak);
            }
            GameOutcome::Draw => {
                draws += 1;
                streak = 0;
            }
        }
        if p.rating_after > peak_rating {
            peak_rating = p.rating_after;
            peak_rating_date = Some(game.created_at);
        }
        rating_change_sum += p.rating_after - p.rating_before;
    }

    let total_games = wins + losses + draws;
    Ok(PlayerStats {
        total_games,
        wins,
        losses,
        win_rate: ratio(wins, total_games),
        current_streak: streak,
        longest_win_streak,
        longest_losing_streak,
        peak_rating,
        peak_rating_date,
        avg_rating_change: if total_games > 0 {
            rating_change_sum / f64::from(total_games)
        } else {
            0.0
        },
    })
}

/// Record against every opponent the player has faced, singles and
/// doubles weighted identically. Ordered by games shared, then id.
pub fn head_to_head(ledger: &Ledger, id: PlayerId) -> Result<Vec<HeadToHeadRecord>, LedgerError> {
    ledger.player(id)?;

    struct Tally {
        total: i32,
        wins: i32,
        losses: i32,
        last: GameOutcome,
    }
    let mut tallies: HashMap<PlayerId, Tally> = HashMap::new();

    for game in ledger.games() {
        let Some(me) = game.participant(id) else { continue };
        let outcome = outcome_for(game, me);
        let opposing = if me.team == 1 { 2 } else { 1 };
        for opponent in game.team_members(opposing) {
            let tally = tallies.entry(opponent.player_id).or_insert(Tally {
                total: 0,
                wins: 0,
                losses: 0,
                last: outcome,
            });
            tally.total += 1;
            match outcome {
                GameOutcome::Win => tally.wins += 1,
                GameOutcome::Loss => tally.losses += 1,
                GameOutcome::Draw => {}
            }
            // Ascending fold, so the last write is the latest result.
            tally.last = outcome;
        }
    }

    let mut records: Vec<HeadToHeadRecord> = tallies
        .into_iter()
        .map(|(opponent_id, tally)| HeadToHeadRecord {
            opponent_id,
            opponent_name: ledger
                .player(opponent_id)
                .map(|p| p.name.clone())
                .unwrap_or_else(|_| "Unknown Player".to_string()),
            total_games: tally.total,
            wins: tally.wins,
            losses: tally.losses,
            win_rate: ratio(tally.wins, tally.total),
            last_result: tally.last,
        })
        .collect();

    records.sort_by(|a, b| {
        b.total_games
            .cmp(&a.total_games)
            .then(a.opponent_id.cmp(&b.opponent_id))
    });
    Ok(records)
}

pub fn rating_history(ledger: &Ledger, id: PlayerId) -> Result<Vec<RatingPoint>, LedgerError> {
    ledger.player(id)?;
    Ok(ledger
        .games()
        .iter()
        .filter_map(|game| {
            game.participant(id).map(|p| RatingPoint {
                sequence: game.sequence,
                played_at: game.created_at,
                rating: p.rating_after,
            })
        })
        .collect())
}

/// Newest-first results for the "recent form" strip. A draw reports
/// `won: false`.
pub fn recent_games(
    ledger: &Ledger,
    id: PlayerId,
    limit: usize,
) -> Result<Vec<RecentGame>, LedgerError> {
    ledger.player(id)?;
    Ok(ledger
        .games()
        .iter()
        .rev()
        .filter_map(|game| {
            game.participant(id).map(|p| RecentGame {
                game_id: game.id,
                won: outcome_for(game, p) == GameOutcome::Win,
            })
        })
        .take(limit)
        .collect())
}

pub fn game_view(ledger: &Ledger, game: &Game) -> GameView {
    GameView {
        id: game.id,
        game_type: game.game_type.as_str().to_string(),
        created_at: game.created_at,
        players: game
            .participants
            .iter()
            .map(|p| GameParticipantView {
                player_id: p.player_id,
                player_name: player_name(ledger, p.player_id),
                team: p.team,
                score: p.score,
                rating_before: p.rating_before,
                rating_after: p.rating_after,
            })
            .collect(),
    }
}

/// Newest-first game listing for display.
pub fn recent_game_views(ledger: &Ledger, limit: usize) -> Vec<GameView> {
    ledger
        .games()
        .iter()
        .rev()
        .take(limit)
        .map(|game| game_view(ledger, game))
        .collect()
}

fn player_name(ledger: &Ledger, id: PlayerId) -> String {
    ledger
        .player(id)
        .map(|p| p.name.clone())
        .unwrap_or_else(|_| "Unknown Player".to_string())
}

fn ratio(part: i32, whole: i32) -> f64 {
    if whole > 0 {
        f64::from(part) / f64::from(whole)
    } else {
        0.0
    }
}
