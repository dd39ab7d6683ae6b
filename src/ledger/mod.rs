pub mod replay;
pub mod views;

use std::collections::{HashMap, HashSet};

use chrono::Utc;

use crate::config::settings::RatingSettings;
use crate::domain::models::{Game, GameType, Participant, Player, TeamInput};
use crate::errors::LedgerError;
use crate::rating::types::{GameId, PlayerId, RatingMap, Sequence};

/// The authoritative, sequence-ordered record of games plus the player
/// registry that backs it.
///
/// Mutations are two-phase: `stage_*` validates the request, applies it
/// to a scratch copy of the game list, and replays the affected suffix;
/// `commit` swaps the scratch state in. Readers holding `&Ledger` never
/// observe a half-replayed state, and a failed stage leaves everything
/// untouched.
pub struct Ledger {
    settings: RatingSettings,
    players: HashMap<PlayerId, Player>,
    games: Vec<Game>,
    next_player_id: PlayerId,
    next_game_id: GameId,
    next_sequence: Sequence,
}

/// What a staged mutation did, for persistence and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerChange {
    Recorded(GameId),
    Edited(GameId),
    Deleted(GameId),
}

/// A fully replayed mutation waiting to be committed. Holds the
/// complete post-mutation game list and the final rating of every
/// player that appears in it.
pub struct LedgerUpdate {
    change: LedgerChange,
    games: Vec<Game>,
    replay_start: usize,
    ratings: RatingMap,
}

impl LedgerUpdate {
    pub fn change(&self) -> LedgerChange {
        self.change
    }

    /// Games whose snapshots were rewritten by the replay walk.
    pub fn changed_games(&self) -> &[Game] {
        &self.games[self.replay_start..]
    }

    pub fn final_rating(&self, player_id: PlayerId) -> Option<f64> {
        self.ratings.get(&player_id).copied()
    }
}

impl Ledger {
    pub fn new(settings: RatingSettings) -> Self {
        Self {
            settings,
            players: HashMap::new(),
            games: Vec::new(),
            next_player_id: 1,
            next_game_id: 1,
            next_sequence: 1,
        }
    }

    /// Rebuilds a ledger from stored rows. Games are reordered by
    /// sequence and every snapshot and current rating is recomputed
    /// from scratch, so stale stored values cannot survive a restart.
    pub fn from_parts(
        settings: RatingSettings,
        players: Vec<Player>,
        mut games: Vec<Game>,
    ) -> Result<Self, LedgerError> {
        games.sort_by_key(|g| g.sequence);

        let mut ledger = Self::new(settings);
        for player in players {
            ledger.commit_player(player);
        }
        ledger.next_game_id = games.iter().map(|g| g.id + 1).max().unwrap_or(1);
        ledger.next_sequence = games.iter().map(|g| g.sequence + 1).max().unwrap_or(1);

        let ratings = replay::replay_suffix(&mut games, 0, &ledger.settings)?;
        ledger.games = games;
        ledger.apply_ratings(&ratings);
        Ok(ledger)
    }

    pub fn settings(&self) -> &RatingSettings {
        &self.settings
    }

    // --- registry ---

    pub fn player(&self, id: PlayerId) -> Result<&Player, LedgerError> {
        self.players.get(&id).ok_or(LedgerError::PlayerNotFound(id))
    }

    pub fn players(&self) -> impl Iterator<Item = &Player> {
        self.players.values()
    }

    pub fn player_has_games(&self, id: PlayerId) -> bool {
        self.games.iter().any(|g| g.involves(id))
    }

    /// Builds the player a registration would create, without touching
    /// the registry. Committed with `commit_player`.
    pub fn stage_player(&self, name: &str) -> Result<Player, LedgerError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(LedgerError::Validation("player name is required".into()));
        }
        Ok(Player {
            id: self.next_player_id,
            name: name.to_string(),
            rating: self.settings.baseline_rating,
            created_at: Utc::now(),
        })
    }

    pub fn stage_rename(&self, id: PlayerId, name: &str) -> Result<Player, LedgerError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(LedgerError::Validation("player name is required".into()));
        }
        let mut player = self.player(id)?.clone();
        player.name = name.to_string();
        Ok(player)
    }

    /// Upserts a staged player into the registry.
    pub fn commit_player(&mut self, player: Player) {
        self.next_player_id = self.next_player_id.max(player.id + 1);
        self.players.insert(player.id, player);
    }

    /// Removal is refused while the player appears in the ledger:
    /// historical snapshots must never reference a vanished player.
    pub fn stage_remove_player(&self, id: PlayerId) -> Result<(), LedgerError> {
        self.player(id)?;
        if self.player_has_games(id) {
            return Err(LedgerError::PlayerHasGames(id));
        }
        Ok(())
    }

    pub fn commit_remove_player(&mut self, id: PlayerId) {
        self.players.remove(&id);
    }

    // --- games ---

    pub fn games(&self) -> &[Game] {
        &self.games
    }

    pub fn game(&self, id: GameId) -> Result<&Game, LedgerError> {
        self.games
            .iter()
            .find(|g| g.id == id)
            .ok_or(LedgerError::GameNotFound(id))
    }

    fn game_index(&self, id: GameId) -> Result<usize, LedgerError> {
        self.games
            .iter()
            .position(|g| g.id == id)
            .ok_or(LedgerError::GameNotFound(id))
    }

    /// Appending is a replay whose suffix is exactly the new game, so
    /// snapshots come out against current ratings.
    pub fn stage_record(
        &self,
        game_type: GameType,
        teams: &[TeamInput],
    ) -> Result<(LedgerUpdate, Game), LedgerError> {
        self.validate_teams(game_type, teams)?;

        let participants = teams
            .iter()
            .enumerate()
            .flat_map(|(idx, team)| {
                team.player_ids.iter().map(move |&player_id| Participant {
                    player_id,
                    team: idx as u8 + 1,
                    score: team.score,
                    rating_before: 0.0,
                    rating_after: 0.0,
                })
            })
            .collect();

        let mut games = self.games.clone();
        games.push(Game {
            id: self.next_game_id,
            sequence: self.next_sequence,
            game_type,
            created_at: Utc::now(),
            participants,
        });
        let start = games.len() - 1;
        let update = self.stage(games, start, LedgerChange::Recorded(self.next_game_id))?;
        let game = update.games[start].clone();
        Ok((update, game))
    }

    pub fn stage_edit(
        &self,
        id: GameId,
        team1_score: i32,
        team2_score: i32,
    ) -> Result<(LedgerUpdate, Game), LedgerError> {
        let idx = self.game_index(id)?;
        if team1_score < 0 || team2_score < 0 {
            return Err(LedgerError::Validation("scores must be non-negative".into()));
        }

        let mut games = self.games.clone();
        for p in &mut games[idx].participants {
            p.score = if p.team == 1 { team1_score } else { team2_score };
        }
        let update = self.stage(games, idx, LedgerChange::Edited(id))?;
        let game = update.games[idx].clone();
        Ok((update, game))
    }

    pub fn stage_delete(&self, id: GameId) -> Result<LedgerUpdate, LedgerError> {
        let idx = self.game_index(id)?;
        let mut games = self.games.clone();
        games.remove(idx);
        // Replay from the next remaining game; deleting the tail still
        // recomputes final ratings from the surviving prefix.
        self.stage(games, idx, LedgerChange::Deleted(id))
    }

    fn stage(
        &self,
        mut games: Vec<Game>,
        start: usize,
        change: LedgerChange,
    ) -> Result<LedgerUpdate, LedgerError> {
        let ratings = replay::replay_suffix(&mut games, start, &self.settings)?;
        Ok(LedgerUpdate {
            change,
            games,
            replay_start: start,
            ratings,
        })
    }

    /// Swaps a staged mutation in. Every registered player's rating is
    /// rewritten from the replay result, falling back to the baseline
    /// for players with no games left.
    pub fn commit(&mut self, update: LedgerUpdate) {
        if let LedgerChange::Recorded(_) = update.change {
            self.next_game_id += 1;
            self.next_sequence += 1;
        }
        self.apply_ratings(&update.ratings);
        self.games = update.games;
    }

    fn apply_ratings(&mut self, ratings: &RatingMap) {
        let baseline = self.settings.baseline_rating;
        for player in self.players.values_mut() {
            player.rating = ratings.get(&player.id).copied().unwrap_or(baseline);
        }
    }

    fn validate_teams(&self, game_type: GameType, teams: &[TeamInput]) -> Result<(), LedgerError> {
        if teams.len() != 2 {
            return Err(LedgerError::Validation("exactly two teams are required".into()));
        }
        for team in teams {
            if team.player_ids.len() != game_type.team_size() {
                return Err(LedgerError::Validation(format!(
                    "{} games take {} player(s) per side",
                    game_type.as_str(),
                    game_type.team_size()
                )));
            }
            if team.score < 0 {
                return Err(LedgerError::Validation("scores must be non-negative".into()));
            }
        }

        let mut seen = HashSet::new();
        for team in teams {
            for &player_id in &team.player_ids {
                if !seen.insert(player_id) {
                    return Err(LedgerError::Validation(format!(
                        "player {player_id} appears more than once"
                    )));
                }
                if !self.players.contains_key(&player_id) {
                    return Err(LedgerError::UnknownPlayer(player_id));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ledger_with_players(n: usize) -> Ledger {
        let mut ledger = Ledger::new(RatingSettings::default());
        for i in 0..n {
            let player = ledger.stage_player(&format!("Player {}", i + 1)).unwrap();
            ledger.commit_player(player);
        }
        ledger
    }

    fn singles(a: PlayerId, score_a: i32, b: PlayerId, score_b: i32) -> Vec<TeamInput> {
        vec![
            TeamInput { player_ids: vec![a], score: score_a },
            TeamInput { player_ids: vec![b], score: score_b },
        ]
    }

    fn record(ledger: &mut Ledger, game_type: GameType, teams: Vec<TeamInput>) -> Game {
        let (update, game) = ledger.stage_record(game_type, &teams).unwrap();
        ledger.commit(update);
        game
    }

    #[test]
    fn first_game_moves_both_players_off_baseline() {
        let mut ledger = ledger_with_players(2);
        let game = record(&mut ledger, GameType::Singles, singles(1, 10, 2, 3));

        assert_eq!(game.sequence, 1);
        assert_eq!(game.participant(1).unwrap().rating_before, 1500.0);
        assert_eq!(game.participant(1).unwrap().rating_after, 1516.0);
        assert_eq!(game.participant(2).unwrap().rating_after, 1484.0);
        assert_eq!(ledger.player(1).unwrap().rating, 1516.0);
        assert_eq!(ledger.player(2).unwrap().rating, 1484.0);
    }

    #[test]
    fn chain_invariant_holds_across_appends() {
        let mut ledger = ledger_with_players(3);
        record(&mut ledger, GameType::Singles, singles(1, 10, 2, 3));
        record(&mut ledger, GameType::Singles, singles(2, 10, 3, 5));
        record(&mut ledger, GameType::Singles, singles(1, 10, 2, 8));

        for player in [1, 2, 3] {
            let mut previous = ledger.settings().baseline_rating;
            for game in ledger.games() {
                if let Some(p) = game.participant(player) {
                    assert_eq!(p.rating_before, previous);
                    previous = p.rating_after;
                }
            }
            assert_eq!(ledger.player(player).unwrap().rating, previous);
        }
    }

    #[test]
    fn doubles_partners_move_together() {
        let mut ledger = ledger_with_players(4);
        let game = record(
            &mut ledger,
            GameType::Doubles,
            vec![
                TeamInput { player_ids: vec![1, 2], score: 10 },
                TeamInput { player_ids: vec![3, 4], score: 7 },
            ],
        );

        let delta_1 = game.participant(1).unwrap().rating_after - 1500.0;
        let delta_2 = game.participant(2).unwrap().rating_after - 1500.0;
        let delta_3 = game.participant(3).unwrap().rating_after - 1500.0;
        assert_eq!(delta_1, delta_2);
        assert_eq!(delta_1, -delta_3);
        assert_eq!(delta_1, 16.0);
    }

    #[test]
    fn deleting_the_last_game_restores_prior_ratings() {
        let mut ledger = ledger_with_players(2);
        record(&mut ledger, GameType::Singles, singles(1, 10, 2, 3));
        let second = record(&mut ledger, GameType::Singles, singles(2, 10, 1, 5));

        let update = ledger.stage_delete(second.id).unwrap();
        ledger.commit(update);

        assert_eq!(ledger.player(1).unwrap().rating, 1516.0);
        assert_eq!(ledger.player(2).unwrap().rating, 1484.0);
    }

    #[test]
    fn deleting_the_first_game_replays_the_survivor_from_baseline() {
        let mut ledger = ledger_with_players(2);
        let first = record(&mut ledger, GameType::Singles, singles(1, 10, 2, 3));
        record(&mut ledger, GameType::Singles, singles(2, 10, 1, 5));

        let update = ledger.stage_delete(first.id).unwrap();
        ledger.commit(update);

        // Only the second game remains: B beat A from a fresh 1500/1500.
        assert_eq!(ledger.games().len(), 1);
        let survivor = &ledger.games()[0];
        assert_eq!(survivor.participant(2).unwrap().rating_before, 1500.0);
        assert_eq!(survivor.participant(2).unwrap().rating_after, 1516.0);
        assert_eq!(ledger.player(2).unwrap().rating, 1516.0);
        assert_eq!(ledger.player(1).unwrap().rating, 1484.0);
    }

    #[test]
    fn deleting_a_player_only_game_returns_them_to_baseline() {
        let mut ledger = ledger_with_players(2);
        let game = record(&mut ledger, GameType::Singles, singles(1, 10, 2, 3));

        let update = ledger.stage_delete(game.id).unwrap();
        ledger.commit(update);

        assert_eq!(ledger.player(1).unwrap().rating, 1500.0);
        assert_eq!(ledger.player(2).unwrap().rating, 1500.0);
    }

    #[test]
    fn editing_an_outcome_back_restores_everything() {
        let mut ledger = ledger_with_players(3);
        let first = record(&mut ledger, GameType::Singles, singles(1, 10, 2, 3));
        record(&mut ledger, GameType::Singles, singles(2, 10, 3, 5));
        record(&mut ledger, GameType::Singles, singles(3, 10, 1, 9));

        let before: Vec<(f64, f64)> = ledger
            .games()
            .iter()
            .flat_map(|g| g.participants.iter().map(|p| (p.rating_before, p.rating_after)))
            .collect();

        let (update, _) = ledger.stage_edit(first.id, 3, 10).unwrap();
        ledger.commit(update);
        let (update, _) = ledger.stage_edit(first.id, 10, 3).unwrap();
        ledger.commit(update);

        let after: Vec<(f64, f64)> = ledger
            .games()
            .iter()
            .flat_map(|g| g.participants.iter().map(|p| (p.rating_before, p.rating_after)))
            .collect();
        assert_eq!(before, after);
        assert_eq!(ledger.player(1).unwrap().rating, ledger.games()[2].participant(1).unwrap().rating_after);
    }

    #[test]
    fn editing_an_early_game_ripples_forward() {
        let mut ledger = ledger_with_players(2);
        let first = record(&mut ledger, GameType::Singles, singles(1, 10, 2, 3));
        record(&mut ledger, GameType::Singles, singles(1, 10, 2, 7));

        let (update, edited) = ledger.stage_edit(first.id, 2, 10).unwrap();
        ledger.commit(update);

        assert_eq!(edited.participant(1).unwrap().rating_after, 1484.0);
        // The later game now starts from the flipped ratings.
        let second = &ledger.games()[1];
        assert_eq!(second.participant(1).unwrap().rating_before, 1484.0);
        assert_eq!(second.participant(2).unwrap().rating_before, 1516.0);
    }

    #[test]
    fn failed_stage_leaves_the_ledger_untouched() {
        let mut ledger = ledger_with_players(2);
        record(&mut ledger, GameType::Singles, singles(1, 10, 2, 3));

        assert!(matches!(
            ledger.stage_record(GameType::Singles, &singles(1, 10, 99, 3)),
            Err(LedgerError::UnknownPlayer(99))
        ));
        assert!(matches!(
            ledger.stage_edit(999, 1, 0),
            Err(LedgerError::GameNotFound(999))
        ));
        assert_eq!(ledger.games().len(), 1);
        assert_eq!(ledger.player(1).unwrap().rating, 1516.0);
    }

    #[test]
    fn validation_rejects_malformed_teams() {
        let ledger = ledger_with_players(4);

        let wrong_size = vec![
            TeamInput { player_ids: vec![1, 2], score: 10 },
            TeamInput { player_ids: vec![3], score: 5 },
        ];
        assert!(matches!(
            ledger.stage_record(GameType::Singles, &wrong_size),
            Err(LedgerError::Validation(_))
        ));

        let overlapping = vec![
            TeamInput { player_ids: vec![1, 2], score: 10 },
            TeamInput { player_ids: vec![2, 3], score: 5 },
        ];
        assert!(matches!(
            ledger.stage_record(GameType::Doubles, &overlapping),
            Err(LedgerError::Validation(_))
        ));

        let negative = singles(1, -1, 2, 5);
        assert!(matches!(
            ledger.stage_record(GameType::Singles, &negative),
            Err(LedgerError::Validation(_))
        ));
    }

    #[test]
    fn player_with_history_cannot_be_removed() {
        let mut ledger = ledger_with_players(2);
        record(&mut ledger, GameType::Singles, singles(1, 10, 2, 3));

        assert!(matches!(
            ledger.stage_remove_player(1),
            Err(LedgerError::PlayerHasGames(1))
        ));

        let player = ledger.stage_player("Bystander").unwrap();
        let id = player.id;
        ledger.commit_player(player);
        assert!(ledger.stage_remove_player(id).is_ok());
    }

    #[test]
    fn rebuild_from_rows_recomputes_stale_snapshots() {
        let mut ledger = ledger_with_players(2);
        record(&mut ledger, GameType::Singles, singles(1, 10, 2, 3));
        record(&mut ledger, GameType::Singles, singles(2, 10, 1, 5));

        let players: Vec<Player> = ledger.players().cloned().collect();
        let mut games = ledger.games().to_vec();
        // Corrupt the stored snapshots; a rebuild must not trust them.
        for game in &mut games {
            for p in &mut game.participants {
                p.rating_before = 0.0;
                p.rating_after = 0.0;
            }
        }

        let rebuilt = Ledger::from_parts(RatingSettings::default(), players, games).unwrap();
        for (a, b) in rebuilt.games().iter().zip(ledger.games()) {
            for (pa, pb) in a.participants.iter().zip(&b.participants) {
                assert_eq!(pa.rating_before, pb.rating_before);
                assert_eq!(pa.rating_after, pb.rating_after);
            }
        }
        assert_eq!(
            rebuilt.player(1).unwrap().rating,
            ledger.player(1).unwrap().rating
        );
    }
}
