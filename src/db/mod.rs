//! Database module for SQLite persistence.
//!
//! SQLite is the source of truth for all application data. Array-valued
//! fields (team membership, session score lists) are stored as JSON text.

mod ledger;
mod repository;

pub use repository::*;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;

/// Initialize the database connection pool and run migrations.
pub async fn init_database(db_path: &Path) -> Result<SqlitePool, sqlx::Error> {
    // Ensure the parent directory exists
    if let Some(parent) = db_path.parent() {
        tokio::fs::create_dir_all(parent).await.ok();
    }

    let db_url = format!("sqlite:{}?mode=rwc", db_path.display());

    let options = SqliteConnectOptions::from_str(&db_url)?
        .create_if_missing(true)
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
        .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
        .busy_timeout(std::time::Duration::from_secs(30));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    // Run embedded migrations
    run_migrations(&pool).await?;

    Ok(pool)
}

/// Run database migrations.
async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    // Create tables if they don't exist
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS groups (
            id TEXT PRIMARY KEY,
            group_code TEXT NOT NULL UNIQUE,
            group_name TEXT NOT NULL,
            created_date TEXT NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS players (
            id TEXT PRIMARY KEY,
            player_name TEXT NOT NULL,
            group_id TEXT NOT NULL,
            emoji TEXT NOT NULL DEFAULT '😀',
            total_score INTEGER NOT NULL DEFAULT 0,
            games_played INTEGER NOT NULL DEFAULT 0,
            created_date TEXT NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS teams (
            id TEXT PRIMARY KEY,
            team_name TEXT NOT NULL,
            group_id TEXT NOT NULL,
            player_ids TEXT NOT NULL DEFAULT '[]',
            total_score INTEGER NOT NULL DEFAULT 0,
            games_played INTEGER NOT NULL DEFAULT 0,
            created_date TEXT NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS game_sessions (
            id TEXT PRIMARY KEY,
            group_id TEXT NOT NULL,
            game_name TEXT NOT NULL,
            game_date TEXT NOT NULL,
            player_scores TEXT NOT NULL DEFAULT '[]',
            team_scores TEXT NOT NULL DEFAULT '[]',
            created_date TEXT NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create indexes for common queries
    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_players_group_id ON players(group_id);
        CREATE INDEX IF NOT EXISTS idx_players_total_score ON players(total_score);
        CREATE INDEX IF NOT EXISTS idx_teams_group_id ON teams(group_id);
        CREATE INDEX IF NOT EXISTS idx_sessions_group_id ON game_sessions(group_id);
        CREATE INDEX IF NOT EXISTS idx_sessions_game_name ON game_sessions(game_name);
        CREATE INDEX IF NOT EXISTS idx_sessions_game_date ON game_sessions(game_date);
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
