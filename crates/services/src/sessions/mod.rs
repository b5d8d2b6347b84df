mod fill_blank;
mod plan;
mod practice;
mod progress;
mod quiz;
mod revision;
mod service;

// Public API of the study subsystem.
pub use crate::error::SessionError;
pub use fill_blank::{BLANK, BlankAnswer, BlankPrompt, FillBlankSession, MIN_WORDS};
pub use plan::{StudyPlan, StudyPlanner};
pub use practice::{PracticeAnswer, PracticeSession};
pub use progress::{SessionProgress, SessionSummary};
pub use quiz::{QUIZ_OPTIONS, QuizAnswer, QuizQuestion, QuizSession};
pub use revision::{RevisionCard, RevisionSession};
pub use service::StudyService;
