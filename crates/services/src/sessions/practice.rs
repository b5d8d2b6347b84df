use flash_core::grader::{Grade, Tier, grade};
use flash_core::model::FlashcardSet;
use flash_core::review::StudyMode;
use flash_core::stats::recompute_stats;

use super::plan::StudyPlanner;
use super::progress::{SessionProgress, SessionSummary};
use crate::error::SessionError;

/// Outcome of one graded answer.
#[derive(Debug, Clone, PartialEq)]
pub struct PracticeAnswer {
    pub term: String,
    pub definition: String,
    pub grade: Grade,
}

/// Free-text practice over one set, weakest terms first.
///
/// Every answer updates the term counters and the set's cached stats.
#[derive(Debug, Clone)]
pub struct PracticeSession {
    set_name: String,
    order: Vec<String>,
    results: Vec<PracticeAnswer>,
    score: u32,
}

impl PracticeSession {
    /// # Errors
    ///
    /// Returns `SessionError::Empty` if the set has no terms.
    pub fn new(set_name: impl Into<String>, set: &FlashcardSet) -> Result<Self, SessionError> {
        let plan = StudyPlanner::new(set, StudyMode::Practice).build();
        if plan.is_empty() {
            return Err(SessionError::Empty);
        }
        Ok(Self {
            set_name: set_name.into(),
            order: plan.terms,
            results: Vec::new(),
            score: 0,
        })
    }

    #[must_use]
    pub fn set_name(&self) -> &str {
        &self.set_name
    }

    #[must_use]
    pub fn current_term(&self) -> Option<&str> {
        self.order.get(self.results.len()).map(String::as_str)
    }

    #[must_use]
    pub fn results(&self) -> &[PracticeAnswer] {
        &self.results
    }

    /// Answers graded `Correct` so far.
    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.results.len() >= self.order.len()
    }

    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        SessionProgress::new(self.order.len(), self.results.len())
    }

    #[must_use]
    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            score: self.score,
            answered: self.results.len(),
            total: self.order.len(),
        }
    }

    /// Grade `answer` against the current term and advance.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Completed` once every term was asked, and
    /// `SessionError::Domain` if the term vanished from `set`.
    pub fn answer_current(
        &mut self,
        set: &mut FlashcardSet,
        answer: &str,
    ) -> Result<&PracticeAnswer, SessionError> {
        let Some(term) = self.current_term().map(str::to_owned) else {
            return Err(SessionError::Completed);
        };

        let record = set.term_mut(&term)?;
        let graded = grade(answer.trim(), record.definition());
        record.apply(graded.tier);
        let definition = record.definition().to_owned();
        recompute_stats(set);

        if graded.tier == Tier::Correct {
            self.score += 1;
        }
        log::debug!("practice `{term}`: {:?} ({:.2})", graded.tier, graded.ratio);

        self.results.push(PracticeAnswer {
            term,
            definition,
            grade: graded,
        });
        self.results.last().ok_or(SessionError::Completed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn answers_update_counters_and_stats() {
        let mut set = FlashcardSet::default_python();
        let mut session = PracticeSession::new("Python (default)", &set).unwrap();
        assert_eq!(session.current_term(), Some("Python"));

        let first = session
            .answer_current(&mut set, "a high level programming language")
            .unwrap();
        assert_eq!(first.grade.tier, Tier::Correct);

        let second = session.answer_current(&mut set, "random text").unwrap();
        assert_eq!(second.term, "Variable");
        assert_eq!(second.grade.tier, Tier::Incorrect);
        assert!(second.grade.hint.is_none());

        assert_eq!(set.term("Python").unwrap().correct(), 1);
        assert_eq!(set.term("Variable").unwrap().total(), 1);
        assert_eq!(set.stats().total, 2);
        assert_eq!(set.stats().correct, 1);
        assert_eq!(session.score(), 1);
        assert_eq!(
            session.progress(),
            SessionProgress {
                total: 4,
                answered: 2,
                remaining: 2,
                is_complete: false
            }
        );
    }

    #[test]
    fn partial_answer_carries_hint() {
        let mut set = FlashcardSet::default_python();
        let mut session = PracticeSession::new("p", &set).unwrap();
        let answer = session.answer_current(&mut set, "high level language").unwrap();
        assert_eq!(answer.grade.tier, Tier::Partial);
        assert_eq!(answer.grade.hint.as_deref(), Some("A high-level prog"));
        assert_eq!(set.term("Python").unwrap().correct(), 0);
        assert_eq!(set.term("Python").unwrap().total(), 1);
    }

    #[test]
    fn completes_after_every_term() {
        let mut set = FlashcardSet::default_python();
        let mut session = PracticeSession::new("p", &set).unwrap();
        for _ in 0..4 {
            session.answer_current(&mut set, "").unwrap();
        }
        assert!(session.is_complete());
        assert!(matches!(
            session.answer_current(&mut set, "x"),
            Err(SessionError::Completed)
        ));
        assert_eq!(
            session.summary(),
            SessionSummary {
                score: 0,
                answered: 4,
                total: 4
            }
        );
        assert_eq!(set.stats().total, 4);
    }

    #[test]
    fn weakest_term_is_asked_first() {
        let mut set = FlashcardSet::default_python();
        set.term_mut("Function").unwrap().apply(Tier::Incorrect);
        let session = PracticeSession::new("p", &set).unwrap();
        assert_eq!(session.current_term(), Some("Function"));
    }

    #[test]
    fn empty_set_cannot_be_practiced() {
        assert!(matches!(
            PracticeSession::new("blank", &FlashcardSet::new(None)),
            Err(SessionError::Empty)
        ));
    }
}
