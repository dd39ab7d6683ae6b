use anyhow::{Context, Result};
use rusqlite::Connection;

/// Applies the schema. Statements are idempotent, so this runs on
/// every startup.
pub fn init_schema(conn: &Connection) -> Result<()> {
    let schema_sql = include_str!("schema.sql");
    for (idx, statement) in split_sql_statements(schema_sql).iter().enumerate() {
        conn.execute(statement, [])
            .with_context(|| format!("Failed to execute schema statement {}", idx + 1))?;
    }
    Ok(())
}

/// Drops every table and re-applies the schema.
pub fn reset_schema(conn: &Connection) -> Result<()> {
    for table in ["game_participants", "games", "players"] {
        conn.execute(&format!("DROP TABLE IF EXISTS {table}"), [])
            .with_context(|| format!("Failed to drop table {table}"))?;
    }
    init_schema(conn)?;
    log::info!("Database schema reset");
    Ok(())
}

fn split_sql_statements(sql: &str) -> Vec<String> {
    sql.split(';')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
