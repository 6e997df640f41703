//! Database module for SQLite persistence.
//!
//! SQLite is the source of truth for all session records.

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
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS sessions (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            agency_name TEXT NOT NULL,
            email TEXT NOT NULL,
            mobile TEXT,
            biggest_challenge TEXT,
            total_user_score INTEGER NOT NULL DEFAULT 0,
            total_preston_score INTEGER NOT NULL DEFAULT 0,
            future_readiness_score INTEGER NOT NULL DEFAULT 0,
            completed_at TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS task_scores (
            session_id TEXT NOT NULL,
            task_number INTEGER NOT NULL,
            user_score INTEGER NOT NULL,
            preston_score INTEGER NOT NULL,
            completed_at TEXT NOT NULL,
            details TEXT,
            PRIMARY KEY (session_id, task_number),
            FOREIGN KEY (session_id) REFERENCES sessions(id) ON DELETE CASCADE
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Index for leaderboard queries
    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_sessions_leaderboard
            ON sessions(total_user_score, completed_at);
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
