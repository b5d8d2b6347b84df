#![forbid(unsafe_code)]

pub mod account_service;
pub mod app_services;
pub mod challenge_service;
pub mod credentials;
pub mod error;
pub mod set_service;
pub mod sessions;

pub use flash_core::Clock;

pub use account_service::{AccountDetails, AccountService};
pub use app_services::{AppServices, StudySettings};
pub use challenge_service::ChallengeService;
pub use credentials::{CredentialProvider, Sha256Credentials};
pub use error::{AccountError, AppServicesError, SessionError, SetServiceError};
pub use set_service::{SearchHit, SetOverview, SetService};
pub use sessions::{
    FillBlankSession, PracticeSession, QuizSession, RevisionSession, SessionProgress,
    SessionSummary, StudyService,
};
