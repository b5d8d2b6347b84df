use rand::Rng;
use rand::seq::SliceRandom;

use flash_core::model::FlashcardSet;
use flash_core::review::StudyMode;

use super::plan::StudyPlanner;
use super::progress::{SessionProgress, SessionSummary};
use crate::error::SessionError;

/// Options shown per question, the correct one included.
pub const QUIZ_OPTIONS: usize = 4;

/// A term with its shuffled candidate definitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizQuestion {
    pub term: String,
    pub options: Vec<String>,
    definition: String,
}

impl QuizQuestion {
    #[must_use]
    pub fn definition(&self) -> &str {
        &self.definition
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizAnswer {
    pub term: String,
    pub correct: bool,
    pub expected: String,
}

/// Multiple-choice quiz. Term counters are never touched.
#[derive(Debug, Clone)]
pub struct QuizSession {
    questions: Vec<QuizQuestion>,
    answers: Vec<QuizAnswer>,
    score: u32,
}

impl QuizSession {
    /// Build every question up front: the correct definition plus up to
    /// three distinct definitions of other terms, shuffled.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Empty` if the set has no terms.
    pub fn new<R: Rng + ?Sized>(set: &FlashcardSet, rng: &mut R) -> Result<Self, SessionError> {
        let plan = StudyPlanner::new(set, StudyMode::Quiz).build_with(&mut *rng);
        if plan.is_empty() {
            return Err(SessionError::Empty);
        }

        let mut distinct: Vec<&str> = Vec::new();
        for record in set.terms().values() {
            if !distinct.contains(&record.definition()) {
                distinct.push(record.definition());
            }
        }

        let mut questions = Vec::with_capacity(plan.total());
        for term in plan.terms {
            let definition = set.term(&term)?.definition().to_owned();
            let mut others: Vec<&str> = distinct
                .iter()
                .copied()
                .filter(|d| *d != definition)
                .collect();
            others.shuffle(&mut *rng);
            others.truncate(QUIZ_OPTIONS - 1);

            let mut options: Vec<String> = others.into_iter().map(str::to_owned).collect();
            options.push(definition.clone());
            options.shuffle(&mut *rng);

            questions.push(QuizQuestion {
                term,
                options,
                definition,
            });
        }

        Ok(Self {
            questions,
            answers: Vec::new(),
            score: 0,
        })
    }

    #[must_use]
    pub fn current(&self) -> Option<&QuizQuestion> {
        self.questions.get(self.answers.len())
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.answers.len() >= self.questions.len()
    }

    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        SessionProgress::new(self.questions.len(), self.answers.len())
    }

    #[must_use]
    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            score: self.score,
            answered: self.answers.len(),
            total: self.questions.len(),
        }
    }

    /// Pick option `choice` (1-based) for the current question.
    ///
    /// An out-of-range choice leaves the question open.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidChoice` or `SessionError::Completed`.
    pub fn answer_current(&mut self, choice: usize) -> Result<&QuizAnswer, SessionError> {
        let Some(question) = self.current() else {
            return Err(SessionError::Completed);
        };
        let options = question.options.len();
        if choice == 0 || choice > options {
            return Err(SessionError::InvalidChoice { choice, options });
        }

        let correct = question.options[choice - 1] == question.definition;
        let answer = QuizAnswer {
            term: question.term.clone(),
            correct,
            expected: question.definition.clone(),
        };
        if correct {
            self.score += 1;
        }
        self.answers.push(answer);
        self.answers.last().ok_or(SessionError::Completed)
    }
}
