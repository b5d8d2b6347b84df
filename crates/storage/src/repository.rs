use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use flash_core::model::UserDirectory;
use thiserror::Error;

use crate::file::GzipJsonRepository;
use crate::sqlite::{SqliteInitError, SqliteRepository};

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("invalid stored data: {0}")]
    Invalid(#[from] flash_core::Error),
}

impl From<SqliteInitError> for StorageError {
    fn from(err: SqliteInitError) -> Self {
        StorageError::Connection(err.to_string())
    }
}

/// Repository contract for the whole user mapping.
///
/// The store is loaded once per session and written back in full after every
/// mutating operation, so there is no partial update API.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Load every account. An empty store yields an empty directory.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backing store cannot be read or holds
    /// malformed records.
    async fn load(&self) -> Result<UserDirectory, StorageError>;

    /// Overwrite the store with `directory`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the directory cannot be written.
    async fn save(&self, directory: &UserDirectory) -> Result<(), StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    users: Arc<Mutex<UserDirectory>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self {
            users: Arc::new(Mutex::new(UserDirectory::new())),
        }
    }

    /// Start from an existing directory.
    #[must_use]
    pub fn with_directory(directory: UserDirectory) -> Self {
        Self {
            users: Arc::new(Mutex::new(directory)),
        }
    }
}

#[async_trait]
impl UserStore for InMemoryRepository {
    async fn load(&self) -> Result<UserDirectory, StorageError> {
        let guard = self
            .users
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.clone())
    }

    async fn save(&self, directory: &UserDirectory) -> Result<(), StorageError> {
        let mut guard = self
            .users
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        *guard = directory.clone();
        Ok(())
    }
}

/// Where the user mapping lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreLocation {
    Memory,
    /// A `sqlite:` connection URL.
    Sqlite(String),
    /// A gzip-compressed JSON document on disk.
    GzipJson(PathBuf),
}

impl StoreLocation {
    /// Classify a configured location: `memory`, a `sqlite:` URL, or a path.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.eq_ignore_ascii_case("memory") {
            StoreLocation::Memory
        } else if raw.starts_with("sqlite:") {
            StoreLocation::Sqlite(raw.to_owned())
        } else {
            StoreLocation::GzipJson(PathBuf::from(raw))
        }
    }
}

/// Aggregates the repository behind a trait object so callers are agnostic
/// of the backend.
#[derive(Clone)]
pub struct Storage {
    pub users: Arc<dyn UserStore>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let users: Arc<dyn UserStore> = Arc::new(InMemoryRepository::new());
        Self { users }
    }

    #[must_use]
    pub fn gzip_json(path: impl Into<PathBuf>) -> Self {
        let users: Arc<dyn UserStore> = Arc::new(GzipJsonRepository::new(path));
        Self { users }
    }

    /// Open the backend named by `location`, running migrations for sqlite.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the sqlite database cannot be
    /// opened or migrated.
    pub async fn open(location: &StoreLocation) -> Result<Self, StorageError> {
        log::debug!("opening store {location:?}");
        match location {
            StoreLocation::Memory => Ok(Self::in_memory()),
            StoreLocation::GzipJson(path) => Ok(Self::gzip_json(path.clone())),
            StoreLocation::Sqlite(url) => {
                let repo = SqliteRepository::open(url).await?;
                let users: Arc<dyn UserStore> = Arc::new(repo);
                Ok(Self { users })
            }
        }
    }
}
