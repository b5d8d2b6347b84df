//! Shared error types for the services crate.

use thiserror::Error;

use storage::repository::StorageError;

/// Errors emitted by `AccountService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AccountError {
    #[error("user `{0}` does not exist")]
    UnknownUser(String),
    #[error("incorrect password")]
    WrongPassword,
    #[error("password must not be empty")]
    EmptyPassword,
    #[error("confirmation did not match the username")]
    ConfirmationMismatch,
    #[error(transparent)]
    Domain(#[from] flash_core::Error),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `SetService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SetServiceError {
    #[error(transparent)]
    Domain(#[from] flash_core::Error),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by study sessions.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("no terms available for session")]
    Empty,
    #[error("session already completed")]
    Completed,
    #[error("option {choice} is out of range (1..={options})")]
    InvalidChoice { choice: usize, options: usize },
    #[error(transparent)]
    Domain(#[from] flash_core::Error),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Domain(#[from] flash_core::Error),
}
