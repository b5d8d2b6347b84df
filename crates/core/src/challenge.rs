//! Daily challenge: reach a number of correct answers in one calendar day.

use chrono::NaiveDate;

use crate::error::ValidationError;

pub const DEFAULT_DAILY_GOAL: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChallengeState {
    Active,
    /// Absorbing: once reached, nothing moves the challenge again.
    Completed,
}

/// What `apply_correct_answers` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChallengeUpdate {
    AlreadyCompleted,
    Progressed { progress: u32, goal: u32 },
    JustCompleted { progress: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyChallenge {
    date: NaiveDate,
    goal: u32,
    progress: u32,
    completed: bool,
}

impl DailyChallenge {
    /// A fresh challenge with the default goal.
    #[must_use]
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            goal: DEFAULT_DAILY_GOAL,
            progress: 0,
            completed: false,
        }
    }

    /// A fresh challenge with a custom goal.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidGoal` if `goal` is zero.
    pub fn with_goal(date: NaiveDate, goal: u32) -> Result<Self, ValidationError> {
        if goal == 0 {
            return Err(ValidationError::InvalidGoal);
        }
        Ok(Self {
            goal,
            ..Self::new(date)
        })
    }

    /// Keep `existing` if it belongs to `today`, otherwise start over.
    ///
    /// Yesterday's progress is discarded, never carried over.
    #[must_use]
    pub fn for_day(existing: Option<Self>, today: NaiveDate, goal: u32) -> Self {
        match existing {
            Some(challenge) if challenge.date == today => challenge,
            _ => Self::with_goal(today, goal).unwrap_or_else(|_| Self::new(today)),
        }
    }

    // Accessors
    #[must_use]
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    #[must_use]
    pub fn goal(&self) -> u32 {
        self.goal
    }

    #[must_use]
    pub fn progress(&self) -> u32 {
        self.progress
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.completed
    }

    #[must_use]
    pub fn state(&self) -> ChallengeState {
        if self.completed {
            ChallengeState::Completed
        } else {
            ChallengeState::Active
        }
    }

    /// Credit `count` correct answers.
    pub fn apply_correct_answers(&mut self, count: u32) -> ChallengeUpdate {
        if self.completed {
            return ChallengeUpdate::AlreadyCompleted;
        }

        self.progress = self.progress.saturating_add(count);
        if self.progress >= self.goal {
            self.completed = true;
            ChallengeUpdate::JustCompleted {
                progress: self.progress,
            }
        } else {
            ChallengeUpdate::Progressed {
                progress: self.progress,
                goal: self.goal,
            }
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
