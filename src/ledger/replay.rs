use crate::config::settings::RatingSettings;
use crate::domain::models::Game;
use crate::errors::ReplayError;
use crate::rating;
use crate::rating::types::{RatingMap, RatingValue};

/// Recomputes every snapshot in `games[start..]` in ascending sequence
/// order and returns the final working rating of every player that
/// appears anywhere in `games`.
///
/// Working ratings are seeded from the untouched prefix: each player's
/// `rating_after` from their last game before `start`, or the baseline
/// if they have none. Callers pass a scratch copy of the game list, so
/// an error here leaves the committed ledger untouched.
pub fn replay_suffix(
    games: &mut [Game],
    start: usize,
    settings: &RatingSettings,
) -> Result<RatingMap, ReplayError> {
    let mut working = RatingMap::new();
    for game in &games[..start] {
        for p in &game.participants {
            working.insert(p.player_id, p.rating_after);
        }
    }

    for game in &mut games[start..] {
        apply_game(game, &mut working, settings)?;
    }
    Ok(working)
}

fn apply_game(
    game: &mut Game,
    working: &mut RatingMap,
    settings: &RatingSettings,
) -> Result<(), ReplayError> {
    if game.participants.iter().any(|p| p.team != 1 && p.team != 2) {
        return Err(ReplayError::UnknownSide { game: game.id });
    }

    let team1 = member_ratings(game, 1, working, settings);
    let team2 = member_ratings(game, 2, working, settings);
    if team1.is_empty() || team2.is_empty() {
        return Err(ReplayError::EmptySide { game: game.id });
    }

    let score1 = game.team_score(1).unwrap_or(0);
    let score2 = game.team_score(2).unwrap_or(0);
    let (delta1, delta2) = rating::rating_deltas(
        rating::team_rating(&team1),
        rating::team_rating(&team2),
        score1,
        score2,
        settings.k_factor,
    );

    for p in &mut game.participants {
        let before = working
            .get(&p.player_id)
            .copied()
            .unwrap_or(settings.baseline_rating);
        let delta = if p.team == 1 { delta1 } else { delta2 };
        p.rating_before = before;
        p.rating_after = before + delta;
        working.insert(p.player_id, p.rating_after);
    }
    Ok(())
}

fn member_ratings(
    game: &Game,
    team: u8,
    working: &RatingMap,
    settings: &RatingSettings,
) -> Vec<RatingValue> {
    game.team_members(team)
        .map(|p| {
            working
                .get(&p.player_id)
                .copied()
                .unwrap_or(settings.baseline_rating)
        })
        .collect()
}
