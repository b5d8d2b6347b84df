use rand::Rng;

use flash_core::model::FlashcardSet;
use flash_core::review::StudyMode;

use super::plan::StudyPlanner;
use super::progress::{SessionProgress, SessionSummary};
use crate::error::SessionError;

/// Placeholder for the hidden word.
pub const BLANK: &str = "____";

/// Definitions shorter than this are skipped.
pub const MIN_WORDS: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlankPrompt {
    pub term: String,
    /// The definition with one word replaced by [`BLANK`].
    pub masked: String,
    missing: String,
}

impl BlankPrompt {
    fn build<R: Rng + ?Sized>(term: String, definition: &str, rng: &mut R) -> Option<Self> {
        let mut words: Vec<&str> = definition.split_whitespace().collect();
        if words.len() < MIN_WORDS {
            return None;
        }
        let index = rng.random_range(0..words.len());
        let missing = words[index].to_owned();
        words[index] = BLANK;
        Some(Self {
            term,
            masked: words.join(" "),
            missing,
        })
    }

    #[must_use]
    pub fn missing_word(&self) -> &str {
        &self.missing
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlankAnswer {
    pub term: String,
    pub correct: bool,
    pub expected: String,
}

/// Guess the hidden word of each definition. Term counters are never touched.
#[derive(Debug, Clone)]
pub struct FillBlankSession {
    prompts: Vec<BlankPrompt>,
    skipped: usize,
    answers: Vec<BlankAnswer>,
    score: u32,
}

impl FillBlankSession {
    /// # Errors
    ///
    /// Returns `SessionError::Empty` if no definition has enough words.
    pub fn new<R: Rng + ?Sized>(set: &FlashcardSet, rng: &mut R) -> Result<Self, SessionError> {
        let plan = StudyPlanner::new(set, StudyMode::FillBlank).build_with(&mut *rng);
        let total = plan.total();

        let mut prompts = Vec::with_capacity(total);
        for term in plan.terms {
            let definition = set.term(&term)?.definition().to_owned();
            if let Some(prompt) = BlankPrompt::build(term, &definition, &mut *rng) {
                prompts.push(prompt);
            }
        }
        if prompts.is_empty() {
            return Err(SessionError::Empty);
        }

        Ok(Self {
            skipped: total - prompts.len(),
            prompts,
            answers: Vec::new(),
            score: 0,
        })
    }

    #[must_use]
    pub fn current(&self) -> Option<&BlankPrompt> {
        self.prompts.get(self.answers.len())
    }

    /// Terms left out because their definition was too short.
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.answers.len() >= self.prompts.len()
    }

    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        SessionProgress::new(self.prompts.len(), self.answers.len())
    }

    #[must_use]
    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            score: self.score,
            answered: self.answers.len(),
            total: self.prompts.len(),
        }
    }

    /// Compare `guess` with the hidden word, ignoring case.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Completed` after the last prompt.
    pub fn answer_current(&mut self, guess: &str) -> Result<&BlankAnswer, SessionError> {
        let Some(prompt) = self.current() else {
            return Err(SessionError::Completed);
        };
        let correct = guess.trim().to_lowercase() == prompt.missing.to_lowercase();
        let answer = BlankAnswer {
            term: prompt.term.clone(),
            correct,
            expected: prompt.missing.clone(),
        };
        if correct {
            self.score += 1;
        }
        self.answers.push(answer);
        self.answers.last().ok_or(SessionError::Completed)
    }
}
