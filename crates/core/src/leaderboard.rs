//! Ranking of every user by level and total correct answers.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::level::{Level, Totals};
use crate::model::UserDirectory;

/// How levels compare when ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LevelOrdering {
    /// Compare level labels as text. `Unranked` sorts above `Expert` and
    /// `Intermediate` above `Advanced`; kept for parity with existing rankings.
    #[default]
    Lexical,
    /// Compare by skill: Unranked < Beginner < Intermediate < Advanced < Expert.
    Skill,
}

impl LevelOrdering {
    #[must_use]
    pub fn compare(self, a: Level, b: Level) -> Ordering {
        match self {
            LevelOrdering::Lexical => a.label().cmp(b.label()),
            LevelOrdering::Skill => a.skill_rank().cmp(&b.skill_rank()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownLevelOrdering(pub String);

impl fmt::Display for UnknownLevelOrdering {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown leaderboard ordering: {} (expected lexical or skill)", self.0)
    }
}

impl std::error::Error for UnknownLevelOrdering {}

impl FromStr for LevelOrdering {
    type Err = UnknownLevelOrdering;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lexical" => Ok(LevelOrdering::Lexical),
            "skill" => Ok(LevelOrdering::Skill),
            other => Err(UnknownLevelOrdering(other.to_owned())),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LeaderboardEntry {
    pub username: String,
    pub level: Level,
    pub total_correct: u64,
    pub total_attempts: u64,
    pub accuracy: f64,
}

/// Rank every user, best first, by `(level, total_correct)`.
///
/// Equal keys keep the directory's enumeration order.
#[must_use]
pub fn rank(directory: &UserDirectory, ordering: LevelOrdering) -> Vec<LeaderboardEntry> {
    let mut entries: Vec<LeaderboardEntry> = directory
        .iter()
        .map(|(username, account)| {
            let totals = Totals::of_sets(account.sets().values());
            LeaderboardEntry {
                username: username.to_owned(),
                level: Level::from_totals(totals),
                total_correct: totals.correct,
                total_attempts: totals.total,
                accuracy: totals.accuracy(),
            }
        })
        .collect();

    entries.sort_by(|a, b| {
        ordering
            .compare(b.level, a.level)
            .then_with(|| b.total_correct.cmp(&a.total_correct))
    });
    entries
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
