use indexmap::IndexMap;

use crate::error::{AlreadyExists, Error, NotFound, ProtectedEntityError, ValidationError};
use crate::model::set::{DEFAULT_SET_NAME, FlashcardSet};

/// Every set a user owns, keyed by set name in creation order.
pub type SetMap = IndexMap<String, FlashcardSet>;

//
// ─── ACCOUNT ───────────────────────────────────────────────────────────────────
//

/// A user's credential token and owned flashcard sets.
///
/// The username is the key in `UserDirectory`, not a field here, so renames
/// never leave two copies out of sync.
#[derive(Debug, Clone, PartialEq)]
pub struct UserAccount {
    credential: String,
    sets: SetMap,
}

impl UserAccount {
    #[must_use]
    pub fn new(credential: impl Into<String>) -> Self {
        Self::from_persisted(credential, SetMap::new())
    }

    #[must_use]
    pub fn from_persisted(credential: impl Into<String>, sets: SetMap) -> Self {
        Self {
            credential: credential.into(),
            sets,
        }
    }

    // Accessors
    #[must_use]
    pub fn credential(&self) -> &str {
        &self.credential
    }

    pub fn set_credential(&mut self, credential: impl Into<String>) {
        self.credential = credential.into();
    }

    #[must_use]
    pub fn sets(&self) -> &SetMap {
        &self.sets
    }

    /// Look up a set by name.
    ///
    /// # Errors
    ///
    /// Returns `NotFound::Set` if the user has no such set.
    pub fn set(&self, name: &str) -> Result<&FlashcardSet, Error> {
        self.sets
            .get(name)
            .ok_or_else(|| NotFound::Set(name.to_owned()).into())
    }

    /// Mutable lookup of a set by name.
    ///
    /// # Errors
    ///
    /// Returns `NotFound::Set` if the user has no such set.
    pub fn set_mut(&mut self, name: &str) -> Result<&mut FlashcardSet, Error> {
        self.sets
            .get_mut(name)
            .ok_or_else(|| NotFound::Set(name.to_owned()).into())
    }

    /// Creates an empty set.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::EmptySetName` for a blank name and
    /// `AlreadyExists::Set` if the name is taken.
    pub fn create_set(
        &mut self,
        name: impl Into<String>,
        category: Option<String>,
    ) -> Result<&mut FlashcardSet, Error> {
        self.insert_set(name, FlashcardSet::new(category))
    }

    /// Adds a fully built set, e.g. one produced by an import.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::EmptySetName` for a blank name and
    /// `AlreadyExists::Set` if the name is taken.
    pub fn insert_set(
        &mut self,
        name: impl Into<String>,
        set: FlashcardSet,
    ) -> Result<&mut FlashcardSet, Error> {
        let name = name.into().trim().to_owned();
        if name.is_empty() {
            return Err(ValidationError::EmptySetName.into());
        }
        match self.sets.entry(name) {
            indexmap::map::Entry::Occupied(entry) => {
                Err(AlreadyExists::Set(entry.key().clone()).into())
            }
            indexmap::map::Entry::Vacant(entry) => Ok(entry.insert(set)),
        }
    }

    /// Deletes a set. The seeded default set is protected.
    ///
    /// # Errors
    ///
    /// Returns `ProtectedEntityError` for the default set and `NotFound::Set`
    /// for unknown names.
    pub fn delete_set(&mut self, name: &str) -> Result<FlashcardSet, Error> {
        if name == DEFAULT_SET_NAME {
            return Err(ProtectedEntityError(name.to_owned()).into());
        }
        self.sets
            .shift_remove(name)
            .ok_or_else(|| NotFound::Set(name.to_owned()).into())
    }

    /// Seeds the default set if missing. Returns true when it was added.
    pub fn ensure_default_set(&mut self) -> bool {
        if self.sets.contains_key(DEFAULT_SET_NAME) {
            return false;
        }
        self.sets
            .insert(DEFAULT_SET_NAME.to_owned(), FlashcardSet::default_python());
        true
    }

    /// Distinct categories in first-seen order.
    #[must_use]
    pub fn categories(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for set in self.sets.values() {
            if !seen.contains(&set.category()) {
                seen.push(set.category());
            }
        }
        seen
    }

    /// Sets filed under the given category.
    #[must_use]
    pub fn sets_in_category(&self, category: &str) -> Vec<(&str, &FlashcardSet)> {
        self.sets
            .iter()
            .filter(|(_, set)| set.category() == category)
            .map(|(name, set)| (name.as_str(), set))
            .collect()
    }
}

//
// ─── DIRECTORY ─────────────────────────────────────────────────────────────────
//

/// In-memory mapping of every user, owned by the driving shell for a session.
///
/// Loaded from a persistence provider at session start and handed back to
/// it, whole, at the end.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct UserDirectory {
    users: IndexMap<String, UserAccount>,
}

impl UserDirectory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.users.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    #[must_use]
    pub fn contains(&self, username: &str) -> bool {
        self.users.contains_key(username)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &UserAccount)> {
        self.users.iter().map(|(name, user)| (name.as_str(), user))
    }

    /// Look up a user.
    ///
    /// # Errors
    ///
    /// Returns `NotFound::User` for unknown usernames.
    pub fn user(&self, username: &str) -> Result<&UserAccount, Error> {
        self.users
            .get(username)
            .ok_or_else(|| NotFound::User(username.to_owned()).into())
    }

    /// Mutable lookup of a user.
    ///
    /// # Errors
    ///
    /// Returns `NotFound::User` for unknown usernames.
    pub fn user_mut(&mut self, username: &str) -> Result<&mut UserAccount, Error> {
        self.users
            .get_mut(username)
            .ok_or_else(|| NotFound::User(username.to_owned()).into())
    }

    /// Registers a new account.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::EmptyUsername` for blank names and
    /// `AlreadyExists::User` if the name is taken.
    pub fn insert_user(
        &mut self,
        username: impl Into<String>,
        account: UserAccount,
    ) -> Result<&mut UserAccount, Error> {
        let username = validate_username(username)?;
        match self.users.entry(username) {
            indexmap::map::Entry::Occupied(entry) => {
                Err(AlreadyExists::User(entry.key().clone()).into())
            }
            indexmap::map::Entry::Vacant(entry) => Ok(entry.insert(account)),
        }
    }

    /// Moves an account to a new username. The renamed account is re-keyed
    /// at the end of the enumeration order.
    ///
    /// # Errors
    ///
    /// Returns `NotFound::User` if `from` is unknown, `AlreadyExists::User` if
    /// `to` is taken, and `ValidationError::EmptyUsername` for a blank name.
    pub fn rename_user(&mut self, from: &str, to: impl Into<String>) -> Result<(), Error> {
        let to = validate_username(to)?;
        if !self.users.contains_key(from) {
            return Err(NotFound::User(from.to_owned()).into());
        }
        if self.users.contains_key(&to) {
            return Err(AlreadyExists::User(to).into());
        }
        if let Some(account) = self.users.shift_remove(from) {
            self.users.insert(to, account);
        }
        Ok(())
    }

    /// Removes an account and every set it owns.
    ///
    /// # Errors
    ///
    /// Returns `NotFound::User` for unknown usernames.
    pub fn remove_user(&mut self, username: &str) -> Result<UserAccount, Error> {
        self.users
            .shift_remove(username)
            .ok_or_else(|| NotFound::User(username.to_owned()).into())
    }
}

fn validate_username(username: impl Into<String>) -> Result<String, ValidationError> {
    let username = username.into().trim().to_owned();
    if username.is_empty() {
        return Err(ValidationError::EmptyUsername);
    }
    Ok(username)
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    fn account_with_default() -> UserAccount {
        let mut account = UserAccount::new("token");
        assert!(account.ensure_default_set());
        account
    }

    #[test]
    fn ensure_default_set_is_idempotent() {
        let mut account = account_with_default();
        assert!(!account.ensure_default_set());
        assert_eq!(account.sets().len(), 1);
    }

    #[test]
    fn default_set_cannot_be_deleted() {
        let mut account = account_with_default();
        let err = account.delete_set(DEFAULT_SET_NAME).unwrap_err();
        assert_eq!(
            err,
            Error::Protected(ProtectedEntityError(DEFAULT_SET_NAME.into()))
        );
        assert!(account.set(DEFAULT_SET_NAME).is_ok());
    }

    #[test]
    fn create_and_delete_set() {
        let mut account = account_with_default();
        account.create_set("Spanish", Some("Languages".into())).unwrap();
        let err = account.create_set("Spanish", None).unwrap_err();
        assert_eq!(err, Error::AlreadyExists(AlreadyExists::Set("Spanish".into())));

        account.delete_set("Spanish").unwrap();
        let err = account.delete_set("Spanish").unwrap_err();
        assert_eq!(err, Error::NotFound(NotFound::Set("Spanish".into())));
    }

    #[test]
    fn categories_are_distinct_in_first_seen_order() {
        let mut account = account_with_default();
        account.create_set("Algebra", Some("Math".into())).unwrap();
        account.create_set("Rust", Some("Programming".into())).unwrap();
        account.create_set("Misc", None).unwrap();

        assert_eq!(account.categories(), ["Programming", "Math", "Uncategorized"]);
        let names: Vec<&str> = account
            .sets_in_category("Programming")
            .into_iter()
            .map(|(name, _)| name)
            .collect();
        assert_eq!(names, [DEFAULT_SET_NAME, "Rust"]);
    }

    #[test]
    fn directory_rejects_duplicate_and_blank_usernames() {
        let mut dir = UserDirectory::new();
        dir.insert_user("alice", UserAccount::new("t")).unwrap();
        assert!(matches!(
            dir.insert_user("alice", UserAccount::new("t")),
            Err(Error::AlreadyExists(AlreadyExists::User(_)))
        ));
        assert!(matches!(
            dir.insert_user("  ", UserAccount::new("t")),
            Err(Error::Validation(ValidationError::EmptyUsername))
        ));
    }

    #[test]
    fn rename_moves_account_to_end() {
        let mut dir = UserDirectory::new();
        dir.insert_user("alice", UserAccount::new("a")).unwrap();
        dir.insert_user("bob", UserAccount::new("b")).unwrap();

        assert!(dir.rename_user("alice", "bob").is_err());
        dir.rename_user("alice", "carol").unwrap();

        let names: Vec<&str> = dir.iter().map(|(name, _)| name).collect();
        assert_eq!(names, ["bob", "carol"]);
        assert_eq!(dir.user("carol").unwrap().credential(), "a");
        assert!(!dir.contains("alice"));
    }

    #[test]
    fn remove_user_drops_owned_sets() {
        let mut dir = UserDirectory::new();
        dir.insert_user("alice", account_with_default()).unwrap();
        let removed = dir.remove_user("alice").unwrap();
        assert_eq!(removed.sets().len(), 1);
        assert!(dir.is_empty());
        assert!(dir.remove_user("alice").is_err());
    }
}
