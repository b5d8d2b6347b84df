use std::sync::Arc;

use flash_core::ValidationError;
use flash_core::challenge::DEFAULT_DAILY_GOAL;
use flash_core::leaderboard::{self, LeaderboardEntry, LevelOrdering};
use flash_core::model::UserDirectory;
use storage::repository::{Storage, StoreLocation};

use crate::Clock;
use crate::account_service::AccountService;
use crate::challenge_service::ChallengeService;
use crate::credentials::{CredentialProvider, Sha256Credentials};
use crate::error::AppServicesError;
use crate::sessions::StudyService;
use crate::set_service::SetService;

/// Tunables read from the environment or command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StudySettings {
    pub daily_goal: u32,
    pub leaderboard: LevelOrdering,
}

impl Default for StudySettings {
    fn default() -> Self {
        Self {
            daily_goal: DEFAULT_DAILY_GOAL,
            leaderboard: LevelOrdering::default(),
        }
    }
}

/// Assembles app-facing services over one store.
#[derive(Clone)]
pub struct AppServices {
    storage: Storage,
    clock: Clock,
    settings: StudySettings,
    accounts: Arc<AccountService>,
    sets: Arc<SetService>,
    study: Arc<StudyService>,
}

impl AppServices {
    /// Open the configured store and wire the services to it.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError::Domain` for a zero daily goal and
    /// `AppServicesError::Storage` if the store cannot be opened.
    pub async fn open(
        location: &StoreLocation,
        clock: Clock,
        settings: StudySettings,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::open(location).await?;
        Self::with_storage(storage, clock, settings)
    }

    /// Services over a fresh in-memory store.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError::Domain` for a zero daily goal.
    pub fn in_memory(clock: Clock, settings: StudySettings) -> Result<Self, AppServicesError> {
        Self::with_storage(Storage::in_memory(), clock, settings)
    }

    /// Services over an already opened store.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError::Domain` for a zero daily goal.
    pub fn with_storage(
        storage: Storage,
        clock: Clock,
        settings: StudySettings,
    ) -> Result<Self, AppServicesError> {
        if settings.daily_goal == 0 {
            return Err(flash_core::Error::from(ValidationError::InvalidGoal).into());
        }

        let credentials: Arc<dyn CredentialProvider> = Arc::new(Sha256Credentials);
        let accounts = Arc::new(AccountService::new(
            Arc::clone(&storage.users),
            credentials,
        ));
        let sets = Arc::new(SetService::new(Arc::clone(&storage.users)));
        let study = Arc::new(StudyService::new(Arc::clone(&storage.users)));

        Ok(Self {
            storage,
            clock,
            settings,
            accounts,
            sets,
            study,
        })
    }

    /// Read the whole directory; the caller owns it for the session.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError::Storage` if the store cannot be read.
    pub async fn load_directory(&self) -> Result<UserDirectory, AppServicesError> {
        let directory = self.storage.users.load().await?;
        log::info!("loaded {} account(s)", directory.len());
        Ok(directory)
    }

    #[must_use]
    pub fn clock(&self) -> Clock {
        self.clock
    }

    #[must_use]
    pub fn settings(&self) -> StudySettings {
        self.settings
    }

    #[must_use]
    pub fn accounts(&self) -> Arc<AccountService> {
        Arc::clone(&self.accounts)
    }

    #[must_use]
    pub fn sets(&self) -> Arc<SetService> {
        Arc::clone(&self.sets)
    }

    #[must_use]
    pub fn study(&self) -> Arc<StudyService> {
        Arc::clone(&self.study)
    }

    /// A fresh daily challenge tracker for one login session.
    #[must_use]
    pub fn challenge(&self) -> ChallengeService {
        ChallengeService::new(self.clock, self.settings.daily_goal)
    }

    /// Rank every account with the configured level ordering.
    #[must_use]
    pub fn leaderboard(&self, directory: &UserDirectory) -> Vec<LeaderboardEntry> {
        leaderboard::rank(directory, self.settings.leaderboard)
    }
}
