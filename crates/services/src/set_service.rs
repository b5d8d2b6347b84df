use std::path::{Path, PathBuf};
use std::sync::Arc;

use flash_core::model::{FlashcardSet, SetStats, UserDirectory};
use flash_core::stats::{ProgressReport, progress_report};
use storage::repository::UserStore;
use storage::transfer::{self, SetFormat};

use crate::error::SetServiceError;

/// One line of the set listing.
#[derive(Debug, Clone, PartialEq)]
pub struct SetOverview {
    pub name: String,
    pub category: String,
    pub term_count: usize,
    pub stats: SetStats,
}

impl SetOverview {
    fn new(name: &str, set: &FlashcardSet) -> Self {
        Self {
            name: name.to_owned(),
            category: set.category().to_owned(),
            term_count: set.len(),
            stats: set.stats(),
        }
    }
}

/// A search hit inside one set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub term: String,
    pub definition: String,
}

/// Creates, edits and inspects a user's flashcard sets.
#[derive(Clone)]
pub struct SetService {
    store: Arc<dyn UserStore>,
}

impl SetService {
    #[must_use]
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }

    /// Create an empty set. A blank category becomes `Uncategorized`.
    ///
    /// # Errors
    ///
    /// Returns `SetServiceError::Domain` for unknown users, blank names and
    /// name clashes; `SetServiceError::Storage` if persistence fails.
    pub async fn create_set(
        &self,
        directory: &mut UserDirectory,
        username: &str,
        name: &str,
        category: Option<String>,
    ) -> Result<(), SetServiceError> {
        directory.user_mut(username)?.create_set(name, category)?;
        self.store.save(directory).await?;
        log::info!("`{username}` created set `{}`", name.trim());
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `SetServiceError::Domain` for unknown users or sets, blank
    /// input and duplicate terms; `SetServiceError::Storage` if persistence
    /// fails.
    pub async fn add_term(
        &self,
        directory: &mut UserDirectory,
        username: &str,
        set_name: &str,
        term: &str,
        definition: &str,
    ) -> Result<(), SetServiceError> {
        directory
            .user_mut(username)?
            .set_mut(set_name)?
            .add_term(term, definition)?;
        self.store.save(directory).await?;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `SetServiceError::Domain` for unknown names or a blank
    /// definition; `SetServiceError::Storage` if persistence fails.
    pub async fn edit_definition(
        &self,
        directory: &mut UserDirectory,
        username: &str,
        set_name: &str,
        term: &str,
        definition: &str,
    ) -> Result<(), SetServiceError> {
        directory
            .user_mut(username)?
            .set_mut(set_name)?
            .edit_definition(term, definition)?;
        self.store.save(directory).await?;
        Ok(())
    }

    /// Remove a term and refresh the set's stats.
    ///
    /// # Errors
    ///
    /// Returns `SetServiceError::Domain` for unknown names;
    /// `SetServiceError::Storage` if persistence fails.
    pub async fn delete_term(
        &self,
        directory: &mut UserDirectory,
        username: &str,
        set_name: &str,
        term: &str,
    ) -> Result<(), SetServiceError> {
        let set = directory.user_mut(username)?.set_mut(set_name)?;
        set.remove_term(term)?;
        flash_core::stats::recompute_stats(set);
        self.store.save(directory).await?;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `SetServiceError::Domain` wrapping `ProtectedEntityError` for
    /// the default set, or `NotFound` for unknown names.
    pub async fn delete_set(
        &self,
        directory: &mut UserDirectory,
        username: &str,
        set_name: &str,
    ) -> Result<(), SetServiceError> {
        directory.user_mut(username)?.delete_set(set_name)?;
        self.store.save(directory).await?;
        log::info!("`{username}` deleted set `{set_name}`");
        Ok(())
    }

    /// Every set of the user, in creation order.
    ///
    /// # Errors
    ///
    /// Returns `SetServiceError::Domain` for unknown users.
    pub fn overview(
        &self,
        directory: &UserDirectory,
        username: &str,
    ) -> Result<Vec<SetOverview>, SetServiceError> {
        let account = directory.user(username)?;
        Ok(account
            .sets()
            .iter()
            .map(|(name, set)| SetOverview::new(name, set))
            .collect())
    }

    /// Distinct categories, first-seen order.
    ///
    /// # Errors
    ///
    /// Returns `SetServiceError::Domain` for unknown users.
    pub fn categories(
        &self,
        directory: &UserDirectory,
        username: &str,
    ) -> Result<Vec<String>, SetServiceError> {
        Ok(directory
            .user(username)?
            .categories()
            .into_iter()
            .map(str::to_owned)
            .collect())
    }

    /// # Errors
    ///
    /// Returns `SetServiceError::Domain` for unknown users.
    pub fn sets_in_category(
        &self,
        directory: &UserDirectory,
        username: &str,
        category: &str,
    ) -> Result<Vec<SetOverview>, SetServiceError> {
        Ok(directory
            .user(username)?
            .sets_in_category(category)
            .into_iter()
            .map(|(name, set)| SetOverview::new(name, set))
            .collect())
    }

    /// Case-insensitive substring search over terms and definitions.
    ///
    /// # Errors
    ///
    /// Returns `SetServiceError::Domain` for unknown users or sets.
    pub fn search(
        &self,
        directory: &UserDirectory,
        username: &str,
        set_name: &str,
        query: &str,
    ) -> Result<Vec<SearchHit>, SetServiceError> {
        let set = directory.user(username)?.set(set_name)?;
        Ok(set
            .search(query)
            .into_iter()
            .map(|(term, definition)| SearchHit {
                term: term.to_owned(),
                definition: definition.to_owned(),
            })
            .collect())
    }

    /// # Errors
    ///
    /// Returns `SetServiceError::Domain` for unknown users or sets.
    pub fn progress(
        &self,
        directory: &UserDirectory,
        username: &str,
        set_name: &str,
    ) -> Result<ProgressReport, SetServiceError> {
        let set = directory.user(username)?.set(set_name)?;
        Ok(progress_report(set))
    }

    /// Reports for every set of the user, in creation order.
    ///
    /// # Errors
    ///
    /// Returns `SetServiceError::Domain` for unknown users.
    pub fn progress_all(
        &self,
        directory: &UserDirectory,
        username: &str,
    ) -> Result<Vec<(String, ProgressReport)>, SetServiceError> {
        let account = directory.user(username)?;
        Ok(account
            .sets()
            .iter()
            .map(|(name, set)| (name.clone(), progress_report(set)))
            .collect())
    }

    /// Write a set to `<out_dir>/<set name>.<ext>` and return the path.
    ///
    /// # Errors
    ///
    /// Returns `SetServiceError::Domain` for unknown names and
    /// `SetServiceError::Storage` if the file cannot be written.
    pub fn export_set(
        &self,
        directory: &UserDirectory,
        username: &str,
        set_name: &str,
        format: SetFormat,
        out_dir: &Path,
    ) -> Result<PathBuf, SetServiceError> {
        let set = directory.user(username)?.set(set_name)?;
        let path = out_dir.join(format.file_name(set_name));
        transfer::export_to_path(set, format, &path)?;
        Ok(path)
    }

    /// Import a `.json` or `.csv` file as a new set named `set_name`.
    ///
    /// # Errors
    ///
    /// Returns `SetServiceError::Storage` for unreadable or malformed files
    /// and `SetServiceError::Domain` if the name is already taken.
    pub async fn import_set(
        &self,
        directory: &mut UserDirectory,
        username: &str,
        set_name: &str,
        path: &Path,
    ) -> Result<usize, SetServiceError> {
        let account = directory.user_mut(username)?;
        if account.set(set_name.trim()).is_ok() {
            return Err(flash_core::Error::from(flash_core::AlreadyExists::Set(
                set_name.trim().to_owned(),
            ))
            .into());
        }
        let set = transfer::import_from_path(path)?;
        let imported = set.len();
        account.insert_set(set_name, set)?;
        self.store.save(directory).await?;
        log::info!("`{username}` imported {imported} term(s) into `{}`", set_name.trim());
        Ok(imported)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flash_core::model::{DEFAULT_SET_NAME, UserAccount};
    use flash_core::{Error, NotFound, ProtectedEntityError};
    use storage::repository::InMemoryRepository;

    fn setup() -> (SetService, InMemoryRepository, UserDirectory) {
        let repo = InMemoryRepository::new();
        let store: Arc<dyn UserStore> = Arc::new(repo.clone());
        let mut dir = UserDirectory::new();
        dir.insert_user("ada", UserAccount::new("t"))
            .unwrap()
            .ensure_default_set();
        (SetService::new(store), repo, dir)
    }

    #[tokio::test]
    async fn create_and_fill_a_set() {
        let (svc, repo, mut dir) = setup();
        svc.create_set(&mut dir, "ada", "Rust", Some("Languages".into()))
            .await
            .unwrap();
        svc.add_term(&mut dir, "ada", "Rust", "Borrow", "A reference to a value")
            .await
            .unwrap();
        assert!(
            svc.add_term(&mut dir, "ada", "Rust", "Borrow", "again")
                .await
                .is_err()
        );

        let stored = repo.load().await.unwrap();
        let rust = stored.user("ada").unwrap().set("Rust").unwrap();
        assert_eq!(rust.category(), "Languages");
        assert_eq!(rust.len(), 1);
    }

    #[tokio::test]
    async fn default_set_cannot_be_deleted() {
        let (svc, _, mut dir) = setup();
        let err = svc
            .delete_set(&mut dir, "ada", DEFAULT_SET_NAME)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SetServiceError::Domain(Error::Protected(ProtectedEntityError(_)))
        ));

        let err = svc.delete_set(&mut dir, "ada", "Nope").await.unwrap_err();
        assert!(matches!(
            err,
            SetServiceError::Domain(Error::NotFound(NotFound::Set(_)))
        ));
    }

    #[tokio::test]
    async fn edit_and_delete_terms() {
        let (svc, _, mut dir) = setup();
        svc.edit_definition(&mut dir, "ada", DEFAULT_SET_NAME, "Loop", "Repeats code.")
            .await
            .unwrap();
        svc.delete_term(&mut dir, "ada", DEFAULT_SET_NAME, "Python")
            .await
            .unwrap();

        let set = dir.user("ada").unwrap().set(DEFAULT_SET_NAME).unwrap();
        assert_eq!(set.term("Loop").unwrap().definition(), "Repeats code.");
        assert_eq!(set.len(), 3);
    }

    #[tokio::test]
    async fn overview_and_categories() {
        let (svc, _, mut dir) = setup();
        svc.create_set(&mut dir, "ada", "Misc", None).await.unwrap();
        svc.create_set(&mut dir, "ada", "Rust", Some("Programming".into()))
            .await
            .unwrap();

        let names: Vec<String> = svc
            .overview(&dir, "ada")
            .unwrap()
            .into_iter()
            .map(|o| o.name)
            .collect();
        assert_eq!(names, [DEFAULT_SET_NAME, "Misc", "Rust"]);
        assert_eq!(
            svc.categories(&dir, "ada").unwrap(),
            ["Programming", "Uncategorized"]
        );
        let programming = svc.sets_in_category(&dir, "ada", "Programming").unwrap();
        assert_eq!(programming.len(), 2);
        assert_eq!(programming[0].term_count, 4);
    }

    #[test]
    fn search_matches_terms_and_definitions() {
        let (svc, _, dir) = setup();
        let hits = svc.search(&dir, "ada", DEFAULT_SET_NAME, "BLOCK").unwrap();
        let terms: Vec<&str> = hits.iter().map(|h| h.term.as_str()).collect();
        assert_eq!(terms, ["Function", "Loop"]);
        assert!(svc.search(&dir, "ada", "Missing", "x").is_err());
    }

    #[tokio::test]
    async fn export_then_import_under_new_name() {
        let (svc, _, mut dir) = setup();
        let out = tempfile::tempdir().unwrap();
        let path = svc
            .export_set(&dir, "ada", DEFAULT_SET_NAME, SetFormat::Csv, out.path())
            .unwrap();
        assert!(path.ends_with("Python (default).csv"));

        let err = svc
            .import_set(&mut dir, "ada", DEFAULT_SET_NAME, &path)
            .await
            .unwrap_err();
        assert!(matches!(err, SetServiceError::Domain(Error::AlreadyExists(_))));

        let imported = svc
            .import_set(&mut dir, "ada", "Copy", &path)
            .await
            .unwrap();
        assert_eq!(imported, 4);
        let report = svc.progress(&dir, "ada", "Copy").unwrap();
        assert_eq!(report.total_terms, 4);
        assert_eq!(report.learned_terms, 0);
        assert_eq!(svc.progress_all(&dir, "ada").unwrap().len(), 2);
    }
}
