use anyhow::{Context, Result};
use rusqlite::{params, Connection};

use crate::domain::models::Player;
use crate::rating::types::PlayerId;

pub fn insert(conn: &Connection, player: &Player) -> Result<()> {
    let sql = "INSERT INTO players (id, name, rating, created_at) VALUES (?1, ?2, ?3, ?4)";
    conn.execute(
        sql,
        params![player.id, player.name, player.rating, player.created_at],
    )
    .context("Failed to insert player")?;
    Ok(())
}

pub fn update_name(conn: &Connection, id: PlayerId, name: &str) -> Result<()> {
    conn.execute("UPDATE players SET name = ?1 WHERE id = ?2", params![name, id])
        .context("Failed to rename player")?;
    Ok(())
}

pub fn update_rating(conn: &Connection, id: PlayerId, rating: f64) -> Result<()> {
    conn.execute(
        "UPDATE players SET rating = ?1 WHERE id = ?2",
        params![rating, id],
    )
    .context("Failed to update player rating")?;
    Ok(())
}

pub fn delete(conn: &Connection, id: PlayerId) -> Result<()> {
    conn.execute("DELETE FROM players WHERE id = ?1", params![id])
        .context("Failed to delete player")?;
    Ok(())
}

pub fn list_all(conn: &Connection) -> Result<Vec<Player>> {
    let sql = "SELECT id, name, rating, created_at FROM players";
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map([], parse_player_row)?
        .collect::<rusqlite::Result<Vec<_>>>()
        .context("Failed to load players")?;
    Ok(rows)
}

fn parse_player_row(row: &rusqlite::Row) -> rusqlite::Result<Player> {
    Ok(Player {
        id: row.get(0)?,
        name: row.get(1)?,
        rating: row.get(2)?,
        created_at: row.get(3)?,
    })
}
