//! Presentation order for study sessions.

use std::fmt;
use std::str::FromStr;

use crate::model::FlashcardSet;

/// How a session walks through a set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StudyMode {
    /// Free-text answers, graded and counted; weakest terms first.
    Practice,
    /// Multiple choice over the set's definitions.
    Quiz,
    /// Reveal-only flipping; nothing is graded.
    Revision,
    /// Guess one blanked word of each definition.
    FillBlank,
}

impl StudyMode {
    /// Only practice uses weakness order; every other mode is shuffled.
    #[must_use]
    pub fn uses_weakness_order(self) -> bool {
        matches!(self, StudyMode::Practice)
    }

    /// Only practice mutates term counters.
    #[must_use]
    pub fn records_attempts(self) -> bool {
        matches!(self, StudyMode::Practice)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            StudyMode::Practice => "practice",
            StudyMode::Quiz => "quiz",
            StudyMode::Revision => "revision",
            StudyMode::FillBlank => "fill-blank",
        }
    }
}

impl fmt::Display for StudyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownStudyMode(pub String);

impl fmt::Display for UnknownStudyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown study mode: {}", self.0)
    }
}

impl std::error::Error for UnknownStudyMode {}

impl FromStr for StudyMode {
    type Err = UnknownStudyMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "practice" => Ok(StudyMode::Practice),
            "quiz" => Ok(StudyMode::Quiz),
            "revision" => Ok(StudyMode::Revision),
            "fill-blank" | "fill_blank" | "fillblank" => Ok(StudyMode::FillBlank),
            other => Err(UnknownStudyMode(other.to_owned())),
        }
    }
}

/// Term keys ordered most-missed first (`total - correct`, descending).
///
/// Ties keep insertion order. Every key appears exactly once.
#[must_use]
pub fn order_for_review(set: &FlashcardSet) -> Vec<String> {
    let mut keyed: Vec<(&String, u32)> = set
        .terms()
        .iter()
        .map(|(term, record)| (term, record.weakness()))
        .collect();
    keyed.sort_by(|a, b| b.1.cmp(&a.1));
    keyed.into_iter().map(|(term, _)| term.clone()).collect()
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
