use rand::Rng;

use flash_core::model::FlashcardSet;
use flash_core::review::StudyMode;

use super::plan::StudyPlanner;
use super::progress::SessionProgress;
use crate::error::SessionError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevisionCard {
    pub term: String,
    pub definition: String,
}

/// Reveal-only flipping through a shuffled set. Nothing is graded.
#[derive(Debug, Clone)]
pub struct RevisionSession {
    cards: Vec<RevisionCard>,
    revealed: usize,
}

impl RevisionSession {
    /// # Errors
    ///
    /// Returns `SessionError::Empty` if the set has no terms.
    pub fn new<R: Rng + ?Sized>(set: &FlashcardSet, rng: &mut R) -> Result<Self, SessionError> {
        let plan = StudyPlanner::new(set, StudyMode::Revision).build_with(rng);
        if plan.is_empty() {
            return Err(SessionError::Empty);
        }
        let cards = plan
            .terms
            .into_iter()
            .map(|term| {
                let definition = set.term(&term)?.definition().to_owned();
                Ok(RevisionCard { term, definition })
            })
            .collect::<Result<Vec<_>, flash_core::Error>>()?;
        Ok(Self { cards, revealed: 0 })
    }

    /// The term waiting to be revealed.
    #[must_use]
    pub fn current_term(&self) -> Option<&str> {
        self.cards.get(self.revealed).map(|c| c.term.as_str())
    }

    /// Show the current card's definition and move on.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Completed` after the last card.
    pub fn reveal(&mut self) -> Result<&RevisionCard, SessionError> {
        let card = self
            .cards
            .get(self.revealed)
            .ok_or(SessionError::Completed)?;
        self.revealed += 1;
        Ok(card)
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.revealed >= self.cards.len()
    }

    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        SessionProgress::new(self.cards.len(), self.revealed)
    }
}
