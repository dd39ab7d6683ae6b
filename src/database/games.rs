use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};

use crate::domain::models::{Game, GameType, Participant};
use crate::rating::types::{GameId, Sequence};

/// Writes a game and its participant snapshots.
pub fn insert_game(conn: &Connection, game: &Game) -> Result<()> {
    let sql = "INSERT INTO games (id, sequence, game_type, created_at) VALUES (?1, ?2, ?3, ?4)";
    conn.execute(
        sql,
        params![
            game.id,
            game.sequence,
            game.game_type.as_str(),
            game.created_at
        ],
    )
    .context("Failed to insert game")?;

    for p in &game.participants {
        insert_participant(conn, game.id, p)?;
    }
    Ok(())
}

fn insert_participant(conn: &Connection, game_id: GameId, p: &Participant) -> Result<()> {
    let sql = "INSERT INTO game_participants (game_id, player_id, team, score, rating_before, rating_after) VALUES (?1, ?2, ?3, ?4, ?5, ?6)";
    conn.execute(
        sql,
        params![
            game_id,
            p.player_id,
            p.team,
            p.score,
            p.rating_before,
            p.rating_after
        ],
    )
    .context("Failed to insert game participant")?;
    Ok(())
}

/// Rewrites the stored scores and rating snapshots of one game after a
/// replay walk touched it.
pub fn update_snapshots(conn: &Connection, game: &Game) -> Result<()> {
    let sql = "UPDATE game_participants SET score = ?1, rating_before = ?2, rating_after = ?3 WHERE game_id = ?4 AND player_id = ?5";
    for p in &game.participants {
        conn.execute(
            sql,
            params![p.score, p.rating_before, p.rating_after, game.id, p.player_id],
        )
        .context("Failed to update participant snapshot")?;
    }
    Ok(())
}

pub fn delete_game(conn: &Connection, id: GameId) -> Result<()> {
    conn.execute("DELETE FROM game_participants WHERE game_id = ?1", params![id])
        .context("Failed to delete game participants")?;
    conn.execute("DELETE FROM games WHERE id = ?1", params![id])
        .context("Failed to delete game")?;
    Ok(())
}

/// Loads every game with its participants, ascending by sequence.
pub fn list_all(conn: &Connection) -> Result<Vec<Game>> {
    let sql = "
        SELECT g.id, g.sequence, g.game_type, g.created_at,
               gp.player_id, gp.team, gp.score, gp.rating_before, gp.rating_after
        FROM games g
        JOIN game_participants gp ON g.id = gp.game_id
        ORDER BY g.sequence, gp.team, gp.player_id
    ";

    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map([], parse_joined_row)?
        .collect::<rusqlite::Result<Vec<_>>>()
        .context("Failed to load games")?;

    let mut games: Vec<Game> = Vec::new();
    for row in rows {
        let game_type = GameType::parse(&row.game_type)
            .ok_or_else(|| anyhow!("Unknown game type in games table: {}", row.game_type))?;
        match games.last_mut() {
            Some(last) if last.id == row.id => last.participants.push(row.participant),
            _ => games.push(Game {
                id: row.id,
                sequence: row.sequence,
                game_type,
                created_at: row.created_at,
                participants: vec![row.participant],
            }),
        }
    }
    Ok(games)
}

struct JoinedRow {
    id: GameId,
    sequence: Sequence,
    game_type: String,
    created_at: DateTime<Utc>,
    participant: Participant,
}

fn parse_joined_row(row: &rusqlite::Row) -> rusqlite::Result<JoinedRow> {
    Ok(JoinedRow {
        id: row.get(0)?,
        sequence: row.get(1)?,
        game_type: row.get(2)?,
        created_at: row.get(3)?,
        participant: Participant {
            player_id: row.get(4)?,
            team: row.get(5)?,
            score: row.get(6)?,
            rating_before: row.get(7)?,
            rating_after: row.get(8)?,
        },
    })
}
