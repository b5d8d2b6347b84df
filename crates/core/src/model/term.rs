use crate::error::ValidationError;
use crate::grader::Tier;

/// A single flashcard: the reference definition plus usage counters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermRecord {
    definition: String,
    correct: u32,
    total: u32,
}

impl TermRecord {
    /// Creates a fresh term with zeroed counters.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::EmptyDefinition` if the definition is blank.
    pub fn new(definition: impl Into<String>) -> Result<Self, ValidationError> {
        Self::from_persisted(definition, 0, 0)
    }

    /// Rehydrates a term from storage or an import.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::EmptyDefinition` if the definition is blank,
    /// or `ValidationError::CorrectExceedsTotal` if the counters disagree.
    pub fn from_persisted(
        definition: impl Into<String>,
        correct: u32,
        total: u32,
    ) -> Result<Self, ValidationError> {
        let definition = definition.into();
        if definition.trim().is_empty() {
            return Err(ValidationError::EmptyDefinition);
        }
        if correct > total {
            return Err(ValidationError::CorrectExceedsTotal { correct, total });
        }

        Ok(Self {
            definition: definition.trim().to_owned(),
            correct,
            total,
        })
    }

    pub(crate) fn seeded(definition: &str) -> Self {
        Self {
            definition: definition.to_owned(),
            correct: 0,
            total: 0,
        }
    }

    // Accessors
    #[must_use]
    pub fn definition(&self) -> &str {
        &self.definition
    }

    #[must_use]
    pub fn correct(&self) -> u32 {
        self.correct
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.total
    }

    /// Attempts that were not judged correct; higher means weaker.
    #[must_use]
    pub fn weakness(&self) -> u32 {
        self.total - self.correct
    }

    /// True once the term has been answered correctly at least once.
    #[must_use]
    pub fn is_learned(&self) -> bool {
        self.correct > 0
    }

    /// Replaces the reference definition, keeping counters.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::EmptyDefinition` if the definition is blank.
    pub fn set_definition(&mut self, definition: impl Into<String>) -> Result<(), ValidationError> {
        let definition = definition.into();
        if definition.trim().is_empty() {
            return Err(ValidationError::EmptyDefinition);
        }
        self.definition = definition.trim().to_owned();
        Ok(())
    }

    /// Records one graded attempt.
    pub fn apply(&mut self, tier: Tier) {
        self.total = self.total.saturating_add(1);
        if tier == Tier::Correct {
            self.correct = self.correct.saturating_add(1);
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_term_starts_at_zero() {
        let term = TermRecord::new("A loop construct.").unwrap();
        assert_eq!(term.correct(), 0);
        assert_eq!(term.total(), 0);
        assert!(!term.is_learned());
    }

    #[test]
    fn rejects_blank_definition() {
        let err = TermRecord::new("   ").unwrap_err();
        assert_eq!(err, ValidationError::EmptyDefinition);
    }

    #[test]
    fn rejects_correct_above_total() {
        let err = TermRecord::from_persisted("x", 3, 2).unwrap_err();
        assert_eq!(
            err,
            ValidationError::CorrectExceedsTotal {
                correct: 3,
                total: 2
            }
        );
    }

    #[test]
    fn apply_counts_every_tier_but_only_credits_correct() {
        let mut term = TermRecord::new("def").unwrap();
        let tiers = [Tier::Correct, Tier::Partial, Tier::Incorrect, Tier::Correct];
        for tier in tiers {
            term.apply(tier);
            assert!(term.correct() <= term.total());
        }
        assert_eq!(term.total(), 4);
        assert_eq!(term.correct(), 2);
        assert_eq!(term.weakness(), 2);
    }

    #[test]
    fn set_definition_keeps_counters() {
        let mut term = TermRecord::from_persisted("old", 1, 2).unwrap();
        term.set_definition("  new  ").unwrap();
        assert_eq!(term.definition(), "new");
        assert_eq!(term.total(), 2);
    }
}
