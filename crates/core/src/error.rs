use thiserror::Error;

/// Rejected construction of a domain entity.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ValidationError {
    #[error("term cannot be empty")]
    EmptyTerm,

    #[error("definition cannot be empty")]
    EmptyDefinition,

    #[error("set name cannot be empty")]
    EmptySetName,

    #[error("username cannot be empty")]
    EmptyUsername,

    #[error("correct answers ({correct}) exceed total attempts ({total})")]
    CorrectExceedsTotal { correct: u32, total: u32 },

    #[error("daily goal must be > 0")]
    InvalidGoal,

    #[error("missing required field `{0}`")]
    MissingField(&'static str),
}

/// Attempted mutation of an entity the domain keeps alive.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("set `{0}` is protected and cannot be deleted")]
pub struct ProtectedEntityError(pub String);

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum NotFound {
    #[error("user `{0}` not found")]
    User(String),

    #[error("flashcard set `{0}` not found")]
    Set(String),

    #[error("term `{0}` not found")]
    Term(String),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AlreadyExists {
    #[error("username `{0}` is already taken")]
    User(String),

    #[error("flashcard set `{0}` already exists")]
    Set(String),

    #[error("term `{0}` already exists")]
    Term(String),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Protected(#[from] ProtectedEntityError),
    #[error(transparent)]
    NotFound(#[from] NotFound),
    #[error(transparent)]
    AlreadyExists(#[from] AlreadyExists),
}
