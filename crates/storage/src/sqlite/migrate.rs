use chrono::Utc;
use sqlx::SqlitePool;

use super::SqliteInitError;

/// Runs the consolidated migration for the current schema.
///
/// Creates users, their flashcard sets and the terms of each set. Every table
/// carries a `position` column so enumeration order survives a round trip.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), SqliteInitError> {
    async fn is_applied(pool: &SqlitePool, version: i64) -> Result<bool, sqlx::Error> {
        let row = sqlx::query("SELECT 1 FROM schema_migrations WHERE version = ?1")
            .bind(version)
            .fetch_optional(pool)
            .await?;
        Ok(row.is_some())
    }

    sqlx::query(
        r"
            CREATE TABLE IF NOT EXISTS schema_migrations (
                version INTEGER PRIMARY KEY,
                applied_at TEXT NOT NULL
            );
            ",
    )
    .execute(pool)
    .await?;

    // Version 1: full schema.
    if !is_applied(pool, 1).await? {
        let mut tx = pool.begin().await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS users (
                    username TEXT PRIMARY KEY,
                    credential TEXT NOT NULL,
                    position INTEGER NOT NULL
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS flashcard_sets (
                    username TEXT NOT NULL,
                    name TEXT NOT NULL,
                    category TEXT NOT NULL,
                    stats_correct INTEGER NOT NULL CHECK (stats_correct >= 0),
                    stats_total INTEGER NOT NULL CHECK (stats_total >= 0),
                    stats_percentage REAL NOT NULL,
                    position INTEGER NOT NULL,
                    PRIMARY KEY (username, name),
                    FOREIGN KEY (username) REFERENCES users(username) ON DELETE CASCADE
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS terms (
                    username TEXT NOT NULL,
                    set_name TEXT NOT NULL,
                    term TEXT NOT NULL,
                    definition TEXT NOT NULL,
                    correct INTEGER NOT NULL CHECK (correct >= 0),
                    total INTEGER NOT NULL CHECK (total >= correct),
                    position INTEGER NOT NULL,
                    PRIMARY KEY (username, set_name, term),
                    FOREIGN KEY (username, set_name)
                        REFERENCES flashcard_sets(username, name) ON DELETE CASCADE
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE INDEX IF NOT EXISTS idx_terms_set_position
                    ON terms (username, set_name, position);
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                INSERT INTO schema_migrations (version, applied_at)
                VALUES (?1, ?2)
                ON CONFLICT(version) DO NOTHING
            ",
        )
        .bind(1_i64)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
    }

    Ok(())
}
