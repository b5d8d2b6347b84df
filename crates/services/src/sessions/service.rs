use std::sync::Arc;

use rand::Rng;

use flash_core::model::{FlashcardSet, UserDirectory};
use storage::repository::UserStore;

use super::fill_blank::FillBlankSession;
use super::practice::{PracticeAnswer, PracticeSession};
use super::quiz::QuizSession;
use super::revision::RevisionSession;
use crate::error::SessionError;

/// Starts study sessions over a user's set and persists graded practice.
#[derive(Clone)]
pub struct StudyService {
    store: Arc<dyn UserStore>,
}

impl StudyService {
    #[must_use]
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }

    /// # Errors
    ///
    /// Returns `SessionError::Domain` for unknown names and
    /// `SessionError::Empty` for a set without terms.
    pub fn start_practice(
        &self,
        directory: &UserDirectory,
        username: &str,
        set_name: &str,
    ) -> Result<PracticeSession, SessionError> {
        PracticeSession::new(set_name, lookup(directory, username, set_name)?)
    }

    /// Grade one answer, then write the directory back.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Completed` after the last term,
    /// `SessionError::Domain` if the set or term is gone, and
    /// `SessionError::Storage` if persistence fails.
    pub async fn answer_practice(
        &self,
        directory: &mut UserDirectory,
        username: &str,
        session: &mut PracticeSession,
        answer: &str,
    ) -> Result<PracticeAnswer, SessionError> {
        let set = directory
            .user_mut(username)?
            .set_mut(session.set_name())?;
        let result = session.answer_current(set, answer)?.clone();
        self.store.save(directory).await?;
        Ok(result)
    }

    /// # Errors
    ///
    /// Returns `SessionError::Domain` for unknown names and
    /// `SessionError::Empty` for a set without terms.
    pub fn start_quiz<R: Rng + ?Sized>(
        &self,
        directory: &UserDirectory,
        username: &str,
        set_name: &str,
        rng: &mut R,
    ) -> Result<QuizSession, SessionError> {
        QuizSession::new(lookup(directory, username, set_name)?, rng)
    }

    /// # Errors
    ///
    /// Returns `SessionError::Domain` for unknown names and
    /// `SessionError::Empty` for a set without terms.
    pub fn start_revision<R: Rng + ?Sized>(
        &self,
        directory: &UserDirectory,
        username: &str,
        set_name: &str,
        rng: &mut R,
    ) -> Result<RevisionSession, SessionError> {
        RevisionSession::new(lookup(directory, username, set_name)?, rng)
    }

    /// # Errors
    ///
    /// Returns `SessionError::Domain` for unknown names and
    /// `SessionError::Empty` when no definition has enough words.
    pub fn start_fill_blank<R: Rng + ?Sized>(
        &self,
        directory: &UserDirectory,
        username: &str,
        set_name: &str,
        rng: &mut R,
    ) -> Result<FillBlankSession, SessionError> {
        FillBlankSession::new(lookup(directory, username, set_name)?, rng)
    }
}

fn lookup<'a>(
    directory: &'a UserDirectory,
    username: &str,
    set_name: &str,
) -> Result<&'a FlashcardSet, SessionError> {
    Ok(directory.user(username)?.set(set_name)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flash_core::model::{DEFAULT_SET_NAME, UserAccount};
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use storage::repository::InMemoryRepository;

    fn setup() -> (StudyService, InMemoryRepository, UserDirectory) {
        let repo = InMemoryRepository::new();
        let store: Arc<dyn UserStore> = Arc::new(repo.clone());
        let mut dir = UserDirectory::new();
        dir.insert_user("ada", UserAccount::new("t"))
            .unwrap()
            .ensure_default_set();
        (StudyService::new(store), repo, dir)
    }

    #[tokio::test]
    async fn practice_answers_are_persisted() {
        let (svc, repo, mut dir) = setup();
        let mut session = svc.start_practice(&dir, "ada", DEFAULT_SET_NAME).unwrap();
        let answer = svc
            .answer_practice(&mut dir, "ada", &mut session, "A high-level programming language.")
            .await
            .unwrap();
        assert_eq!(answer.term, "Python");

        let stored = repo.load().await.unwrap();
        let set = stored.user("ada").unwrap().set(DEFAULT_SET_NAME).unwrap();
        assert_eq!(set.term("Python").unwrap().correct(), 1);
        assert_eq!(set.stats().correct, 1);
    }

    #[tokio::test]
    async fn deleted_set_ends_practice() {
        let (svc, _, mut dir) = setup();
        dir.user_mut("ada").unwrap().create_set("Tmp", None).unwrap();
        dir.user_mut("ada")
            .unwrap()
            .set_mut("Tmp")
            .unwrap()
            .add_term("x", "y")
            .unwrap();
        let mut session = svc.start_practice(&dir, "ada", "Tmp").unwrap();
        dir.user_mut("ada").unwrap().delete_set("Tmp").unwrap();

        let err = svc
            .answer_practice(&mut dir, "ada", &mut session, "y")
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::Domain(_)));
    }

    #[test]
    fn unknown_set_cannot_start() {
        let (svc, _, dir) = setup();
        let mut rng = StdRng::seed_from_u64(0);
        assert!(svc.start_quiz(&dir, "ada", "Nope", &mut rng).is_err());
        assert!(svc.start_revision(&dir, "bob", DEFAULT_SET_NAME, &mut rng).is_err());
        assert!(svc.start_fill_blank(&dir, "ada", DEFAULT_SET_NAME, &mut rng).is_ok());
    }
}
