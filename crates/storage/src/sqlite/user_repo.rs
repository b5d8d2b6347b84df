use flash_core::model::UserDirectory;

use super::SqliteRepository;
use super::mapping::{map_set_row, map_term_row, map_user_row, position_to_i64};
use crate::records::{DirectoryRecord, SetRecord, TermRow, UserRecord};
use crate::repository::{StorageError, UserStore};

fn conn(e: sqlx::Error) -> StorageError {
    StorageError::Connection(e.to_string())
}

fn orphan(what: &str, owner: &str) -> StorageError {
    StorageError::Serialization(format!("{what} without owner `{owner}`"))
}

#[async_trait::async_trait]
impl UserStore for SqliteRepository {
    async fn load(&self) -> Result<UserDirectory, StorageError> {
        let user_rows = sqlx::query("SELECT username, credential FROM users ORDER BY position")
            .fetch_all(&self.pool)
            .await
            .map_err(conn)?;
        let mut document = DirectoryRecord::default();
        for row in &user_rows {
            let (username, record) = map_user_row(row)?;
            document.0.insert(username, record);
        }

        let set_rows = sqlx::query(
            r"
            SELECT username, name, category, stats_correct, stats_total, stats_percentage
            FROM flashcard_sets
            ORDER BY username, position
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;
        for row in &set_rows {
            let (username, name, record) = map_set_row(row)?;
            document
                .0
                .get_mut(&username)
                .ok_or_else(|| orphan("set", &username))?
                .flashcard_sets
                .insert(name, record);
        }

        let term_rows = sqlx::query(
            r"
            SELECT username, set_name, term, definition, correct, total
            FROM terms
            ORDER BY username, set_name, position
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;
        for row in &term_rows {
            let (username, set_name, term, record) = map_term_row(row)?;
            document
                .0
                .get_mut(&username)
                .and_then(|user| user.flashcard_sets.get_mut(&set_name))
                .and_then(|set| set.terms.as_mut())
                .ok_or_else(|| orphan("term", &set_name))?
                .insert(term, record);
        }

        let directory = document.into_directory()?;
        log::debug!("loaded {} user(s) from sqlite", directory.len());
        Ok(directory)
    }

    async fn save(&self, directory: &UserDirectory) -> Result<(), StorageError> {
        let document = DirectoryRecord::from_directory(directory);
        let mut tx = self.pool.begin().await.map_err(conn)?;

        // Sets and terms go with their users through ON DELETE CASCADE.
        sqlx::query("DELETE FROM users")
            .execute(&mut *tx)
            .await
            .map_err(conn)?;

        for (user_pos, (username, user)) in document.0.iter().enumerate() {
            insert_user(&mut tx, user_pos, username, user).await?;
        }

        tx.commit().await.map_err(conn)?;
        log::debug!("saved {} user(s) to sqlite", directory.len());
        Ok(())
    }
}

type Tx<'a> = sqlx::Transaction<'a, sqlx::Sqlite>;

async fn insert_user(
    tx: &mut Tx<'_>,
    position: usize,
    username: &str,
    user: &UserRecord,
) -> Result<(), StorageError> {
    sqlx::query(
        r"
        INSERT INTO users (username, credential, position)
        VALUES (?1, ?2, ?3)
        ",
    )
    .bind(username)
    .bind(user.password.as_deref().unwrap_or_default())
    .bind(position_to_i64(position)?)
    .execute(&mut **tx)
    .await
    .map_err(conn)?;

    for (set_pos, (name, set)) in user.flashcard_sets.iter().enumerate() {
        insert_set(tx, set_pos, username, name, set).await?;
    }
    Ok(())
}

async fn insert_set(
    tx: &mut Tx<'_>,
    position: usize,
    username: &str,
    name: &str,
    set: &SetRecord,
) -> Result<(), StorageError> {
    let stats = set.stats.unwrap_or_default();
    sqlx::query(
        r"
        INSERT INTO flashcard_sets
            (username, name, category, stats_correct, stats_total, stats_percentage, position)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        ",
    )
    .bind(username)
    .bind(name)
    .bind(set.category.as_deref().unwrap_or_default())
    .bind(i64::from(stats.correct))
    .bind(i64::from(stats.total))
    .bind(stats.percentage)
    .bind(position_to_i64(position)?)
    .execute(&mut **tx)
    .await
    .map_err(conn)?;

    if let Some(terms) = &set.terms {
        for (term_pos, (term, row)) in terms.iter().enumerate() {
            insert_term(tx, term_pos, username, name, term, row).await?;
        }
    }
    Ok(())
}

async fn insert_term(
    tx: &mut Tx<'_>,
    position: usize,
    username: &str,
    set_name: &str,
    term: &str,
    row: &TermRow,
) -> Result<(), StorageError> {
    sqlx::query(
        r"
        INSERT INTO terms (username, set_name, term, definition, correct, total, position)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        ",
    )
    .bind(username)
    .bind(set_name)
    .bind(term)
    .bind(row.definition.as_deref().unwrap_or_default())
    .bind(i64::from(row.correct.unwrap_or_default()))
    .bind(i64::from(row.total.unwrap_or_default()))
    .bind(position_to_i64(position)?)
    .execute(&mut **tx)
    .await
    .map_err(conn)?;
    Ok(())
}
