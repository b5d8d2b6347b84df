use std::sync::Arc;

use flash_core::AlreadyExists;
use flash_core::level::{self, Achievement, Level};
use flash_core::model::{UserAccount, UserDirectory};
use storage::repository::UserStore;

use crate::credentials::CredentialProvider;
use crate::error::AccountError;

/// Username the login prompt reads as "create an account".
pub const RESERVED_USERNAME: &str = "new";

/// What the account screen shows.
#[derive(Debug, Clone, PartialEq)]
pub struct AccountDetails {
    pub username: String,
    pub level: Level,
    pub set_names: Vec<String>,
    pub achievements: Vec<Achievement>,
}

impl AccountDetails {
    #[must_use]
    pub fn set_count(&self) -> usize {
        self.set_names.len()
    }
}

/// Signup, login and account maintenance over the loaded directory.
///
/// Every mutating call writes the whole directory back to the store.
#[derive(Clone)]
pub struct AccountService {
    store: Arc<dyn UserStore>,
    credentials: Arc<dyn CredentialProvider>,
}

impl AccountService {
    #[must_use]
    pub fn new(store: Arc<dyn UserStore>, credentials: Arc<dyn CredentialProvider>) -> Self {
        Self { store, credentials }
    }

    /// Create an account seeded with the default set.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::EmptyPassword` for a blank password,
    /// `AccountError::Domain` for a blank or taken username, and
    /// `AccountError::Storage` if persistence fails.
    pub async fn signup(
        &self,
        directory: &mut UserDirectory,
        username: &str,
        password: &str,
    ) -> Result<(), AccountError> {
        if password.trim().is_empty() {
            return Err(AccountError::EmptyPassword);
        }
        if username.trim().eq_ignore_ascii_case(RESERVED_USERNAME) {
            return Err(reserved(username).into());
        }

        let token = self.credentials.hash(password.trim());
        let account = directory.insert_user(username, UserAccount::new(token))?;
        account.ensure_default_set();
        self.store.save(directory).await?;
        log::info!("created account `{}`", username.trim());
        Ok(())
    }

    /// Check a password and make sure the default set exists.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::UnknownUser` or `AccountError::WrongPassword`,
    /// and `AccountError::Storage` if seeding the default set cannot be saved.
    pub async fn login(
        &self,
        directory: &mut UserDirectory,
        username: &str,
        password: &str,
    ) -> Result<(), AccountError> {
        let account = directory
            .user_mut(username)
            .map_err(|_| AccountError::UnknownUser(username.to_owned()))?;
        if !self.credentials.verify(account.credential(), password.trim()) {
            log::warn!("failed login for `{username}`");
            return Err(AccountError::WrongPassword);
        }

        if account.ensure_default_set() {
            log::debug!("seeded default set for `{username}`");
            self.store.save(directory).await?;
        }
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `AccountError::Domain` if `to` is blank or taken, and
    /// `AccountError::Storage` if persistence fails.
    pub async fn rename(
        &self,
        directory: &mut UserDirectory,
        from: &str,
        to: &str,
    ) -> Result<(), AccountError> {
        if to.trim().eq_ignore_ascii_case(RESERVED_USERNAME) {
            return Err(reserved(to).into());
        }
        directory.rename_user(from, to)?;
        self.store.save(directory).await?;
        log::info!("renamed account `{from}` to `{}`", to.trim());
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `AccountError::EmptyPassword` for a blank password,
    /// `AccountError::Domain` for unknown users, and `AccountError::Storage`
    /// if persistence fails.
    pub async fn change_password(
        &self,
        directory: &mut UserDirectory,
        username: &str,
        new_password: &str,
    ) -> Result<(), AccountError> {
        if new_password.trim().is_empty() {
            return Err(AccountError::EmptyPassword);
        }
        let token = self.credentials.hash(new_password.trim());
        directory.user_mut(username)?.set_credential(token);
        self.store.save(directory).await?;
        Ok(())
    }

    /// Delete an account once the caller has typed the username again.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::ConfirmationMismatch` if `confirmation` differs
    /// from `username`; nothing is deleted in that case.
    pub async fn delete(
        &self,
        directory: &mut UserDirectory,
        username: &str,
        confirmation: &str,
    ) -> Result<(), AccountError> {
        if confirmation.trim() != username {
            return Err(AccountError::ConfirmationMismatch);
        }
        directory.remove_user(username)?;
        self.store.save(directory).await?;
        log::info!("deleted account `{username}`");
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `AccountError::Domain` for unknown users.
    pub fn details(
        &self,
        directory: &UserDirectory,
        username: &str,
    ) -> Result<AccountDetails, AccountError> {
        let sets = directory.user(username)?.sets();
        Ok(AccountDetails {
            username: username.to_owned(),
            level: level::level(sets),
            set_names: sets.keys().cloned().collect(),
            achievements: level::achievements(sets),
        })
    }
}

fn reserved(username: &str) -> flash_core::Error {
    AlreadyExists::User(username.trim().to_owned()).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::Sha256Credentials;
    use flash_core::model::DEFAULT_SET_NAME;
    use storage::repository::InMemoryRepository;

    fn service() -> (AccountService, InMemoryRepository) {
        let repo = InMemoryRepository::new();
        let store: Arc<dyn UserStore> = Arc::new(repo.clone());
        (
            AccountService::new(store, Arc::new(Sha256Credentials)),
            repo,
        )
    }

    #[tokio::test]
    async fn signup_seeds_default_set_and_persists() {
        let (svc, repo) = service();
        let mut dir = UserDirectory::new();
        svc.signup(&mut dir, "ada", "pw").await.unwrap();

        let stored = repo.load().await.unwrap();
        let ada = stored.user("ada").unwrap();
        assert_ne!(ada.credential(), "pw");
        assert!(ada.set(DEFAULT_SET_NAME).is_ok());
    }

    #[tokio::test]
    async fn signup_rejects_duplicates_and_reserved_names() {
        let (svc, _) = service();
        let mut dir = UserDirectory::new();
        svc.signup(&mut dir, "ada", "pw").await.unwrap();
        assert!(matches!(
            svc.signup(&mut dir, "ada", "other").await,
            Err(AccountError::Domain(flash_core::Error::AlreadyExists(_)))
        ));
        assert!(svc.signup(&mut dir, "new", "pw").await.is_err());
        assert!(matches!(
            svc.signup(&mut dir, "bob", "  ").await,
            Err(AccountError::EmptyPassword)
        ));
    }

    #[tokio::test]
    async fn login_distinguishes_unknown_user_from_wrong_password() {
        let (svc, _) = service();
        let mut dir = UserDirectory::new();
        svc.signup(&mut dir, "ada", "pw").await.unwrap();

        assert!(svc.login(&mut dir, "ada", "pw").await.is_ok());
        assert!(matches!(
            svc.login(&mut dir, "ada", "nope").await,
            Err(AccountError::WrongPassword)
        ));
        assert!(matches!(
            svc.login(&mut dir, "bob", "pw").await,
            Err(AccountError::UnknownUser(name)) if name == "bob"
        ));
    }

    #[tokio::test]
    async fn login_restores_missing_default_set() {
        let (svc, repo) = service();
        let mut dir = UserDirectory::new();
        dir.insert_user("old", UserAccount::new(Sha256Credentials.hash("pw")))
            .unwrap();

        svc.login(&mut dir, "old", "pw").await.unwrap();
        let stored = repo.load().await.unwrap();
        assert!(stored.user("old").unwrap().set(DEFAULT_SET_NAME).is_ok());
    }

    #[tokio::test]
    async fn rename_and_change_password() {
        let (svc, _) = service();
        let mut dir = UserDirectory::new();
        svc.signup(&mut dir, "ada", "pw").await.unwrap();
        svc.signup(&mut dir, "bob", "pw").await.unwrap();

        assert!(svc.rename(&mut dir, "ada", "bob").await.is_err());
        svc.rename(&mut dir, "ada", "lovelace").await.unwrap();
        assert!(dir.user("ada").is_err());

        svc.change_password(&mut dir, "lovelace", "secret")
            .await
            .unwrap();
        assert!(svc.login(&mut dir, "lovelace", "pw").await.is_err());
        assert!(svc.login(&mut dir, "lovelace", "secret").await.is_ok());
    }

    #[tokio::test]
    async fn delete_requires_matching_confirmation() {
        let (svc, repo) = service();
        let mut dir = UserDirectory::new();
        svc.signup(&mut dir, "ada", "pw").await.unwrap();

        assert!(matches!(
            svc.delete(&mut dir, "ada", "Ada").await,
            Err(AccountError::ConfirmationMismatch)
        ));
        assert!(dir.contains("ada"));

        svc.delete(&mut dir, "ada", "ada").await.unwrap();
        assert!(repo.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn details_list_level_sets_and_achievements() {
        let (svc, _) = service();
        let mut dir = UserDirectory::new();
        svc.signup(&mut dir, "ada", "pw").await.unwrap();

        let details = svc.details(&dir, "ada").unwrap();
        assert_eq!(details.level, Level::Unranked);
        assert_eq!(details.set_names, [DEFAULT_SET_NAME]);
        assert_eq!(details.set_count(), 1);
        assert!(details.achievements.is_empty());
    }
}
