use anyhow::{Context, Result};
use log::info;
use tokio::sync::RwLock;

use crate::config::settings::AppConfig;
use crate::database::{self, DbPool};
use crate::domain::models::{GameType, Player, TeamInput};
use crate::errors::ServiceError;
use crate::ledger::views::{
    self, GameView, HeadToHeadRecord, LeaderboardEntry, PlayerStats, PlayerView, RatingPoint,
    RecentGame,
};
use crate::ledger::{Ledger, LedgerChange, LedgerUpdate};
use crate::rating::types::{GameId, PlayerId};

/// Owns the ledger and serializes access to it: reads share the lock,
/// every mutation (validate, replay, persist, swap in) runs under the
/// exclusive half, so readers only ever see committed state.
///
/// Mutations persist before the in-memory commit. A storage failure
/// therefore leaves both the ledger and the database on the previous
/// state, and the caller can retry the original request.
pub struct TrackerService {
    config: AppConfig,
    pool: DbPool,
    ledger: RwLock<Ledger>,
}

impl TrackerService {
    /// Loads the stored history and rebuilds all derived state from a
    /// full replay; stale stored snapshots do not survive a restart.
    pub fn load(config: AppConfig, pool: DbPool) -> Result<Self> {
        let conn = database::get_connection(&pool)?;
        database::setup::init_schema(&conn)?;

        let players = database::players::list_all(&conn)?;
        let games = database::games::list_all(&conn)?;
        info!(
            "Loaded {} players and {} games from storage",
            players.len(),
            games.len()
        );

        let ledger = Ledger::from_parts(config.rating.clone(), players, games)
            .context("Stored history failed to replay")?;
        Ok(Self {
            config,
            pool,
            ledger: RwLock::new(ledger),
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    // --- mutations ---

    pub async fn record_game(
        &self,
        game_type: GameType,
        teams: Vec<TeamInput>,
    ) -> Result<GameView, ServiceError> {
        let mut ledger = self.ledger.write().await;
        let (update, game) = ledger.stage_record(game_type, &teams)?;
        self.persist(&ledger, &update)?;
        ledger.commit(update);
        info!("Recorded game {} ({})", game.id, game.game_type.as_str());
        Ok(views::game_view(&ledger, &game))
    }

    pub async fn edit_game(
        &self,
        id: GameId,
        team1_score: i32,
        team2_score: i32,
    ) -> Result<GameView, ServiceError> {
        let mut ledger = self.ledger.write().await;
        let (update, game) = ledger.stage_edit(id, team1_score, team2_score)?;
        let replayed = update.changed_games().len();
        self.persist(&ledger, &update)?;
        ledger.commit(update);
        info!("Edited game {id}, replayed {replayed} game(s)");
        Ok(views::game_view(&ledger, &game))
    }

    pub async fn delete_game(&self, id: GameId) -> Result<(), ServiceError> {
        let mut ledger = self.ledger.write().await;
        let update = ledger.stage_delete(id)?;
        let replayed = update.changed_games().len();
        self.persist(&ledger, &update)?;
        ledger.commit(update);
        info!("Deleted game {id}, replayed {replayed} game(s)");
        Ok(())
    }

    pub async fn register_player(&self, name: &str) -> Result<Player, ServiceError> {
        let mut ledger = self.ledger.write().await;
        let player = ledger.stage_player(name)?;

        let conn = database::get_connection(&self.pool)?;
        database::players::insert(&conn, &player)?;
        ledger.commit_player(player.clone());
        info!("Registered player {} ({})", player.id, player.name);
        Ok(player)
    }

    pub async fn rename_player(&self, id: PlayerId, name: &str) -> Result<Player, ServiceError> {
        let mut ledger = self.ledger.write().await;
        let player = ledger.stage_rename(id, name)?;

        let conn = database::get_connection(&self.pool)?;
        database::players::update_name(&conn, id, &player.name)?;
        ledger.commit_player(player.clone());
        Ok(player)
    }

    pub async fn remove_player(&self, id: PlayerId) -> Result<(), ServiceError> {
        let mut ledger = self.ledger.write().await;
        ledger.stage_remove_player(id)?;

        let conn = database::get_connection(&self.pool)?;
        database::players::delete(&conn, id)?;
        ledger.commit_remove_player(id);
        info!("Removed player {id}");
        Ok(())
    }

    // --- reads ---

    pub async fn player(&self, id: PlayerId) -> Result<PlayerView, ServiceError> {
        let ledger = self.ledger.read().await;
        Ok(views::player_view(&ledger, id)?)
    }

    pub async fn leaderboard(&self) -> Vec<LeaderboardEntry> {
        let ledger = self.ledger.read().await;
        views::leaderboard(&ledger)
    }

    pub async fn player_stats(&self, id: PlayerId) -> Result<PlayerStats, ServiceError> {
        let ledger = self.ledger.read().await;
        Ok(views::player_stats(&ledger, id)?)
    }

    pub async fn head_to_head(&self, id: PlayerId) -> Result<Vec<HeadToHeadRecord>, ServiceError> {
        let ledger = self.ledger.read().await;
        Ok(views::head_to_head(&ledger, id)?)
    }

    pub async fn rating_history(&self, id: PlayerId) -> Result<Vec<RatingPoint>, ServiceError> {
        let ledger = self.ledger.read().await;
        Ok(views::rating_history(&ledger, id)?)
    }

    pub async fn recent_games(
        &self,
        id: PlayerId,
        limit: Option<usize>,
    ) -> Result<Vec<RecentGame>, ServiceError> {
        let ledger = self.ledger.read().await;
        let limit = limit.unwrap_or(self.config.server.recent_games_limit);
        Ok(views::recent_games(&ledger, id, limit)?)
    }

    pub async fn games(&self, limit: Option<usize>) -> Vec<GameView> {
        let ledger = self.ledger.read().await;
        let limit = limit.unwrap_or(self.config.server.games_page_limit);
        views::recent_game_views(&ledger, limit)
    }

    /// Writes a staged mutation to storage in one transaction: the
    /// structural change, every replayed snapshot, and the resulting
    /// current rating of every registered player.
    fn persist(&self, ledger: &Ledger, update: &LedgerUpdate) -> Result<(), ServiceError> {
        let mut conn = database::get_connection(&self.pool)?;
        let tx = conn
            .transaction()
            .context("Failed to start transaction")
            .map_err(ServiceError::Storage)?;

        match update.change() {
            LedgerChange::Recorded(id) => {
                let game = update
                    .changed_games()
                    .iter()
                    .find(|g| g.id == id)
                    .context("Staged game missing from its own update")?;
                database::games::insert_game(&tx, game)?;
            }
            LedgerChange::Edited(_) => {
                for game in update.changed_games() {
                    database::games::update_snapshots(&tx, game)?;
                }
            }
            LedgerChange::Deleted(id) => {
                database::games::delete_game(&tx, id)?;
                for game in update.changed_games() {
                    database::games::update_snapshots(&tx, game)?;
                }
            }
        }

        let baseline = self.config.rating.baseline_rating;
        for player in ledger.players() {
            let rating = update.final_rating(player.id).unwrap_or(baseline);
            database::players::update_rating(&tx, player.id, rating)?;
        }

        tx.commit()
            .context("Failed to commit transaction")
            .map_err(ServiceError::Storage)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use r2d2_sqlite::SqliteConnectionManager;

    fn memory_service() -> TrackerService {
        // One pooled connection, so every checkout sees the same
        // in-memory database.
        let pool = r2d2::Pool::builder()
            .max_size(1)
            .build(SqliteConnectionManager::memory())
            .unwrap();
        TrackerService::load(AppConfig::new(), pool).unwrap()
    }

    fn singles(a: PlayerId, score_a: i32, b: PlayerId, score_b: i32) -> Vec<TeamInput> {
        vec![
            TeamInput { player_ids: vec![a], score: score_a },
            TeamInput { player_ids: vec![b], score: score_b },
        ]
    }

    #[tokio::test]
    async fn record_and_read_round_trip() {
        let service = memory_service();
        let alice = service.register_player("Alice").await.unwrap();
        let bob = service.register_player("Bob").await.unwrap();

        let view = service
            .record_game(GameType::Singles, singles(alice.id, 10, bob.id, 3))
            .await
            .unwrap();
        assert_eq!(view.players.len(), 2);
        assert_eq!(view.players[0].rating_after, 1516.0);

        let board = service.leaderboard().await;
        assert_eq!(board[0].name, "Alice");
        assert_eq!(board[0].wins, 1);
        assert_eq!(board[1].rating, 1484.0);
    }

    #[tokio::test]
    async fn delete_rolls_ratings_back() {
        let service = memory_service();
        let alice = service.register_player("Alice").await.unwrap();
        let bob = service.register_player("Bob").await.unwrap();

        let game = service
            .record_game(GameType::Singles, singles(alice.id, 10, bob.id, 3))
            .await
            .unwrap();
        service.delete_game(game.id).await.unwrap();

        let view = service.player(alice.id).await.unwrap();
        assert_eq!(view.rating, 1500.0);
        assert_eq!(view.games_played, 0);
    }

    #[tokio::test]
    async fn edits_ripple_into_later_stats() {
        let service = memory_service();
        let alice = service.register_player("Alice").await.unwrap();
        let bob = service.register_player("Bob").await.unwrap();

        let first = service
            .record_game(GameType::Singles, singles(alice.id, 10, bob.id, 3))
            .await
            .unwrap();
        service
            .record_game(GameType::Singles, singles(alice.id, 10, bob.id, 7))
            .await
            .unwrap();

        service.edit_game(first.id, 2, 10).await.unwrap();

        let stats = service.player_stats(alice.id).await.unwrap();
        assert_eq!(stats.wins, 1);
        assert_eq!(stats.losses, 1);
        assert_eq!(stats.current_streak, 1);
    }

    #[tokio::test]
    async fn player_removal_honors_history() {
        let service = memory_service();
        let alice = service.register_player("Alice").await.unwrap();
        let bob = service.register_player("Bob").await.unwrap();
        service
            .record_game(GameType::Singles, singles(alice.id, 10, bob.id, 3))
            .await
            .unwrap();

        let err = service.remove_player(alice.id).await.unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Ledger(crate::errors::LedgerError::PlayerHasGames(_))
        ));

        let carol = service.register_player("Carol").await.unwrap();
        service.remove_player(carol.id).await.unwrap();
    }

    #[tokio::test]
    async fn rename_keeps_rating_untouched() {
        let service = memory_service();
        let alice = service.register_player("Alice").await.unwrap();
        let renamed = service.rename_player(alice.id, "Alicia").await.unwrap();
        assert_eq!(renamed.name, "Alicia");
        assert_eq!(renamed.rating, 1500.0);
    }
}
