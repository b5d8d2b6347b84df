//! Serialized shapes of the user mapping.
//!
//! These mirror the document layout used on disk (`{username: {password,
//! flashcard_sets: {name: {category, terms, stats}}}}`) so repositories and
//! codecs can convert without leaking storage concerns into the domain.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use flash_core::ValidationError;
use flash_core::model::{FlashcardSet, SetMap, SetStats, TermRecord, UserAccount, UserDirectory};
use flash_core::stats::recompute_stats;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermRow {
    #[serde(default)]
    pub definition: Option<String>,
    #[serde(default)]
    pub correct: Option<u32>,
    #[serde(default)]
    pub total: Option<u32>,
}

impl TermRow {
    #[must_use]
    pub fn from_term(term: &TermRecord) -> Self {
        Self {
            definition: Some(term.definition().to_owned()),
            correct: Some(term.correct()),
            total: Some(term.total()),
        }
    }

    /// # Errors
    ///
    /// Returns `ValidationError::MissingField` for absent fields, or the
    /// term's own validation errors.
    pub fn into_term(self) -> Result<TermRecord, ValidationError> {
        TermRecord::from_persisted(
            self.definition
                .ok_or(ValidationError::MissingField("definition"))?,
            self.correct.ok_or(ValidationError::MissingField("correct"))?,
            self.total.ok_or(ValidationError::MissingField("total"))?,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct StatsRecord {
    #[serde(default)]
    pub correct: u32,
    #[serde(default)]
    pub total: u32,
    #[serde(default)]
    pub percentage: f64,
}

impl From<SetStats> for StatsRecord {
    fn from(stats: SetStats) -> Self {
        Self {
            correct: stats.correct,
            total: stats.total,
            percentage: stats.percentage,
        }
    }
}

impl From<StatsRecord> for SetStats {
    fn from(record: StatsRecord) -> Self {
        Self {
            correct: record.correct,
            total: record.total,
            percentage: record.percentage,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetRecord {
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub terms: Option<IndexMap<String, TermRow>>,
    #[serde(default)]
    pub stats: Option<StatsRecord>,
}

impl SetRecord {
    #[must_use]
    pub fn from_set(set: &FlashcardSet) -> Self {
        Self {
            category: Some(set.category().to_owned()),
            terms: Some(
                set.terms()
                    .iter()
                    .map(|(term, record)| (term.clone(), TermRow::from_term(record)))
                    .collect(),
            ),
            stats: Some(set.stats().into()),
        }
    }

    /// Rebuild the domain set. Missing cached stats are recomputed.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if `terms` is absent or any term is invalid.
    pub fn into_set(self) -> Result<FlashcardSet, ValidationError> {
        let rows = self.terms.ok_or(ValidationError::MissingField("terms"))?;
        let mut terms = Vec::with_capacity(rows.len());
        for (term, row) in rows {
            terms.push((term, row.into_term()?));
        }

        let cached = self.stats;
        let mut set = FlashcardSet::from_persisted(
            self.category,
            terms,
            cached.map(SetStats::from).unwrap_or_default(),
        )?;
        if cached.is_none() {
            recompute_stats(&mut set);
        }
        Ok(set)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub flashcard_sets: IndexMap<String, SetRecord>,
}

impl UserRecord {
    #[must_use]
    pub fn from_account(account: &UserAccount) -> Self {
        Self {
            password: Some(account.credential().to_owned()),
            flashcard_sets: account
                .sets()
                .iter()
                .map(|(name, set)| (name.clone(), SetRecord::from_set(set)))
                .collect(),
        }
    }

    /// # Errors
    ///
    /// Returns `ValidationError` if the password or any set is invalid.
    pub fn into_account(self) -> Result<UserAccount, ValidationError> {
        let credential = self
            .password
            .ok_or(ValidationError::MissingField("password"))?;
        let mut sets = SetMap::with_capacity(self.flashcard_sets.len());
        for (name, record) in self.flashcard_sets {
            if name.trim().is_empty() {
                return Err(ValidationError::EmptySetName);
            }
            sets.insert(name, record.into_set()?);
        }
        Ok(UserAccount::from_persisted(credential, sets))
    }
}

/// The whole persisted mapping, username to account.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DirectoryRecord(pub IndexMap<String, UserRecord>);

impl DirectoryRecord {
    #[must_use]
    pub fn from_directory(directory: &UserDirectory) -> Self {
        Self(
            directory
                .iter()
                .map(|(name, account)| (name.to_owned(), UserRecord::from_account(account)))
                .collect(),
        )
    }

    /// # Errors
    ///
    /// Returns `flash_core::Error` if any account fails validation.
    pub fn into_directory(self) -> Result<UserDirectory, flash_core::Error> {
        let mut directory = UserDirectory::new();
        for (name, record) in self.0 {
            directory.insert_user(name, record.into_account()?)?;
        }
        Ok(directory)
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_document_written_by_older_versions() {
        let raw = r#"{
            "alice": {
                "password": "abc",
                "flashcard_sets": {
                    "Python (default)": {
                        "category": "Programming",
                        "terms": {
                            "Python": {"definition": "A high-level programming language.", "correct": 1, "total": 2}
                        },
                        "stats": {"correct": 1, "total": 2, "percentage": 50.0}
                    },
                    "Bare": {"terms": {}}
                }
            }
        }"#;
        let record: DirectoryRecord = serde_json::from_str(raw).unwrap();
        let directory = record.into_directory().unwrap();
        let alice = directory.user("alice").unwrap();
        assert_eq!(alice.credential(), "abc");
        assert_eq!(alice.sets().len(), 2);
        assert_eq!(alice.set("Bare").unwrap().category(), "Uncategorized");
        let python = alice.set("Python (default)").unwrap();
        assert_eq!(python.term("Python").unwrap().total(), 2);
        assert_eq!(python.stats().correct, 1);
    }

    #[test]
    fn missing_definition_is_rejected() {
        let raw = r#"{"terms": {"Loop": {"correct": 0, "total": 0}}}"#;
        let record: SetRecord = serde_json::from_str(raw).unwrap();
        assert_eq!(
            record.into_set().unwrap_err(),
            ValidationError::MissingField("definition")
        );
    }

    #[test]
    fn missing_terms_are_rejected() {
        let record: SetRecord = serde_json::from_str(r#"{"category": "x"}"#).unwrap();
        assert_eq!(
            record.into_set().unwrap_err(),
            ValidationError::MissingField("terms")
        );
    }

    #[test]
    fn missing_stats_are_recomputed() {
        let raw = r#"{"terms": {"a": {"definition": "d", "correct": 2, "total": 4}}}"#;
        let set = serde_json::from_str::<SetRecord>(raw)
            .unwrap()
            .into_set()
            .unwrap();
        assert_eq!(set.stats().total, 4);
        assert!((set.stats().percentage - 50.0).abs() < 1e-9);
    }

    #[test]
    fn counters_above_total_are_rejected() {
        let raw = r#"{"terms": {"a": {"definition": "d", "correct": 5, "total": 4}}}"#;
        let record: SetRecord = serde_json::from_str(raw).unwrap();
        assert!(matches!(
            record.into_set(),
            Err(ValidationError::CorrectExceedsTotal { .. })
        ));
    }
}
