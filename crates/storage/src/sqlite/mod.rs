//! Relational store for the user mapping.
//!
//! Three tables mirror the document shape: `users`, `flashcard_sets` and
//! `terms`, each carrying a `position` column so insertion order survives a
//! round trip. A save rewrites all three inside one transaction.

use std::time::Duration;

use sqlx::{SqlitePool, sqlite::SqlitePoolOptions};
use thiserror::Error;

mod mapping;
mod migrate;
mod user_repo;

/// The shell is the only writer; a handful of connections covers reads
/// issued while a save is committing.
const MAX_CONNECTIONS: u32 = 4;

#[derive(Clone)]
pub struct SqliteRepository {
    pool: SqlitePool,
}

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SqliteInitError {
    #[error("sqlite setup failed: {0}")]
    Sqlx(#[from] sqlx::Error),
}

impl SqliteRepository {
    /// Open the database at `database_url` with cascading deletes enabled.
    ///
    /// Schema setup is separate; see [`SqliteRepository::open`].
    ///
    /// # Errors
    ///
    /// Returns `SqliteInitError` if no connection can be made or a
    /// per-connection pragma is rejected.
    pub async fn connect(database_url: &str) -> Result<Self, SqliteInitError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .acquire_timeout(Duration::from_secs(5))
            .after_connect(|conn, _meta| {
                Box::pin(async move {
                    // Deleting a user must cascade to its sets and terms.
                    sqlx::query("PRAGMA foreign_keys = ON;")
                        .execute(&mut *conn)
                        .await?;
                    sqlx::query("PRAGMA busy_timeout = 5000;")
                        .execute(&mut *conn)
                        .await?;
                    Ok(())
                })
            })
            .connect(database_url)
            .await?;
        Ok(Self { pool })
    }

    /// Connect and bring the users/sets/terms schema up to date.
    ///
    /// # Errors
    ///
    /// Returns `SqliteInitError` if connecting or migrating fails.
    pub async fn open(database_url: &str) -> Result<Self, SqliteInitError> {
        let repo = Self::connect(database_url).await?;
        repo.migrate().await?;
        log::info!("sqlite user store ready at {database_url}");
        Ok(repo)
    }

    /// Apply pending schema versions. Already applied versions are skipped,
    /// so running this on every start is safe.
    ///
    /// # Errors
    ///
    /// Returns `SqliteInitError` if a migration statement fails.
    pub async fn migrate(&self) -> Result<(), SqliteInitError> {
        migrate::run_migrations(&self.pool).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::UserStore;

    #[test]
    fn repository_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SqliteRepository>();
    }

    #[tokio::test]
    async fn open_prepares_an_empty_store() {
        let repo = SqliteRepository::open("sqlite:file:memdb_open?mode=memory&cache=shared")
            .await
            .unwrap();
        assert!(repo.load().await.unwrap().is_empty());
    }
}
