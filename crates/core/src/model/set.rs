use indexmap::IndexMap;

use crate::error::{AlreadyExists, Error, NotFound, ValidationError};
use crate::model::term::TermRecord;

pub const DEFAULT_CATEGORY: &str = "Uncategorized";

/// Name of the seeded set every user gets; it cannot be deleted.
pub const DEFAULT_SET_NAME: &str = "Python (default)";

const DEFAULT_SET_CATEGORY: &str = "Programming";

const DEFAULT_SET_TERMS: [(&str, &str); 4] = [
    ("Python", "A high-level programming language."),
    (
        "Variable",
        "A storage location paired with an associated symbolic name.",
    ),
    (
        "Function",
        "A block of reusable code that performs a specific task.",
    ),
    ("Loop", "A programming construct that repeats a block of code."),
];

//
// ─── STATS ─────────────────────────────────────────────────────────────────────
//

/// Denormalized per-set totals, refreshed by `stats::recompute_stats`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SetStats {
    pub correct: u32,
    pub total: u32,
    pub percentage: f64,
}

//
// ─── SET ───────────────────────────────────────────────────────────────────────
//

/// A categorized collection of terms, keyed by term text in insertion order.
#[derive(Debug, Clone, PartialEq)]
pub struct FlashcardSet {
    category: String,
    terms: IndexMap<String, TermRecord>,
    pub(crate) stats: SetStats,
}

impl FlashcardSet {
    /// Creates an empty set. Blank or missing categories fall back to
    /// `DEFAULT_CATEGORY`.
    #[must_use]
    pub fn new(category: Option<String>) -> Self {
        Self {
            category: normalize_category(category),
            terms: IndexMap::new(),
            stats: SetStats::default(),
        }
    }

    /// Rehydrates a set from storage or an import.
    ///
    /// Cached stats are taken as given; callers that cannot vouch for them
    /// should run `recompute_stats` afterwards.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::EmptyTerm` if any term key is blank.
    pub fn from_persisted(
        category: Option<String>,
        terms: impl IntoIterator<Item = (String, TermRecord)>,
        stats: SetStats,
    ) -> Result<Self, ValidationError> {
        let mut map = IndexMap::new();
        for (term, record) in terms {
            if term.trim().is_empty() {
                return Err(ValidationError::EmptyTerm);
            }
            map.insert(term, record);
        }

        Ok(Self {
            category: normalize_category(category),
            terms: map,
            stats,
        })
    }

    /// The seeded "Python (default)" set with its four sample terms.
    #[must_use]
    pub fn default_python() -> Self {
        let mut set = Self::new(Some(DEFAULT_SET_CATEGORY.to_owned()));
        for (term, definition) in DEFAULT_SET_TERMS {
            set.terms
                .insert(term.to_owned(), TermRecord::seeded(definition));
        }
        set
    }

    // Accessors
    #[must_use]
    pub fn category(&self) -> &str {
        &self.category
    }

    #[must_use]
    pub fn terms(&self) -> &IndexMap<String, TermRecord> {
        &self.terms
    }

    #[must_use]
    pub fn stats(&self) -> SetStats {
        self.stats
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Look up a term.
    ///
    /// # Errors
    ///
    /// Returns `NotFound::Term` if the set has no such term.
    pub fn term(&self, term: &str) -> Result<&TermRecord, Error> {
        self.terms
            .get(term)
            .ok_or_else(|| NotFound::Term(term.to_owned()).into())
    }

    /// Mutable lookup of a term.
    ///
    /// # Errors
    ///
    /// Returns `NotFound::Term` if the set has no such term.
    pub fn term_mut(&mut self, term: &str) -> Result<&mut TermRecord, Error> {
        self.terms
            .get_mut(term)
            .ok_or_else(|| NotFound::Term(term.to_owned()).into())
    }

    /// Adds a new term with zeroed counters.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` for a blank term or definition, and
    /// `AlreadyExists::Term` if the term is already in the set.
    pub fn add_term(
        &mut self,
        term: impl Into<String>,
        definition: impl Into<String>,
    ) -> Result<(), Error> {
        let term = term.into().trim().to_owned();
        if term.is_empty() {
            return Err(ValidationError::EmptyTerm.into());
        }
        if self.terms.contains_key(&term) {
            return Err(AlreadyExists::Term(term).into());
        }
        let record = TermRecord::new(definition)?;
        self.terms.insert(term, record);
        Ok(())
    }

    /// Replaces the definition of an existing term.
    ///
    /// # Errors
    ///
    /// Returns `NotFound::Term` for unknown terms and `ValidationError` for a
    /// blank definition.
    pub fn edit_definition(&mut self, term: &str, definition: impl Into<String>) -> Result<(), Error> {
        self.term_mut(term)?.set_definition(definition)?;
        Ok(())
    }

    /// Removes a term, preserving the order of the remaining ones.
    ///
    /// # Errors
    ///
    /// Returns `NotFound::Term` if the set has no such term.
    pub fn remove_term(&mut self, term: &str) -> Result<TermRecord, Error> {
        self.terms
            .shift_remove(term)
            .ok_or_else(|| NotFound::Term(term.to_owned()).into())
    }

    /// Case-insensitive substring search over terms and definitions.
    #[must_use]
    pub fn search(&self, query: &str) -> Vec<(&str, &str)> {
        let query = query.trim().to_lowercase();
        self.terms
            .iter()
            .filter(|(term, record)| {
                term.to_lowercase().contains(&query)
                    || record.definition().to_lowercase().contains(&query)
            })
            .map(|(term, record)| (term.as_str(), record.definition()))
            .collect()
    }
}

fn normalize_category(category: Option<String>) -> String {
    category
        .map(|c| c.trim().to_owned())
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| DEFAULT_CATEGORY.to_owned())
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
