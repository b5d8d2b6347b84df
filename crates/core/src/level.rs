//! Skill levels and achievements derived from a user's sets.

use std::fmt;

use crate::model::{FlashcardSet, SetMap};
use crate::stats::percentage;

const FIVE_SETS: usize = 5;
const HUNDRED_ANSWERS: u64 = 100;
const HIGH_ACCURACY_PCT: f64 = 80.0;

//
// ─── TOTALS ────────────────────────────────────────────────────────────────────
//

/// Raw counters summed over every term of every set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Totals {
    pub correct: u64,
    pub total: u64,
}

impl Totals {
    /// Sums term counters directly, so stale cached set stats are ignored.
    #[must_use]
    pub fn of_sets<'a>(sets: impl IntoIterator<Item = &'a FlashcardSet>) -> Self {
        sets.into_iter()
            .flat_map(|set| set.terms().values())
            .fold(Self::default(), |acc, term| Self {
                correct: acc.correct + u64::from(term.correct()),
                total: acc.total + u64::from(term.total()),
            })
    }

    /// Overall accuracy in percent; `0.0` without attempts.
    #[must_use]
    pub fn accuracy(&self) -> f64 {
        percentage(self.correct, self.total)
    }
}

//
// ─── LEVEL ─────────────────────────────────────────────────────────────────────
//

/// Coarse skill tier from overall accuracy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Level {
    Unranked,
    Beginner,
    Intermediate,
    Advanced,
    Expert,
}

impl Level {
    /// Level for the given totals. Boundaries are inclusive upper edges:
    /// `<= 40` Beginner, `<= 70` Intermediate, `<= 90` Advanced.
    #[must_use]
    pub fn from_totals(totals: Totals) -> Self {
        if totals.total == 0 {
            return Level::Unranked;
        }
        let pct = totals.accuracy();
        if pct <= 40.0 {
            Level::Beginner
        } else if pct <= 70.0 {
            Level::Intermediate
        } else if pct <= 90.0 {
            Level::Advanced
        } else {
            Level::Expert
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Level::Unranked => "Unranked",
            Level::Beginner => "Beginner",
            Level::Intermediate => "Intermediate",
            Level::Advanced => "Advanced",
            Level::Expert => "Expert",
        }
    }

    /// Numeric skill rank, `Unranked` lowest.
    #[must_use]
    pub fn skill_rank(self) -> u8 {
        match self {
            Level::Unranked => 0,
            Level::Beginner => 1,
            Level::Intermediate => 2,
            Level::Advanced => 3,
            Level::Expert => 4,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Level across every set a user owns.
#[must_use]
pub fn level(sets: &SetMap) -> Level {
    Level::from_totals(Totals::of_sets(sets.values()))
}

//
// ─── ACHIEVEMENTS ──────────────────────────────────────────────────────────────
//

/// Milestones, recomputed on every call and never stored.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Achievement {
    FiveSetsCreated,
    HundredQuestionsAnswered,
    HighAccuracy,
    /// Every term of the named set has been answered correctly at least once.
    MasteredSet(String),
}

impl fmt::Display for Achievement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Achievement::FiveSetsCreated => f.write_str("Completed 5 flashcard sets!"),
            Achievement::HundredQuestionsAnswered => f.write_str("Answered 100 questions!"),
            Achievement::HighAccuracy => f.write_str("Achieved 80% or higher accuracy!"),
            Achievement::MasteredSet(name) => write!(f, "Mastered all terms in '{name}'!"),
        }
    }
}

/// Achievements unlocked by the given sets, in a fixed order.
///
/// A set without terms counts as mastered: there is no term left to learn.
#[must_use]
pub fn achievements(sets: &SetMap) -> Vec<Achievement> {
    let totals = Totals::of_sets(sets.values());
    let mut unlocked = Vec::new();

    if sets.len() >= FIVE_SETS {
        unlocked.push(Achievement::FiveSetsCreated);
    }
    if totals.total >= HUNDRED_ANSWERS {
        unlocked.push(Achievement::HundredQuestionsAnswered);
    }
    if totals.total > 0 && totals.accuracy() >= HIGH_ACCURACY_PCT {
        unlocked.push(Achievement::HighAccuracy);
    }
    for (name, set) in sets {
        if set.terms().values().all(|term| term.is_learned()) {
            unlocked.push(Achievement::MasteredSet(name.clone()));
        }
    }

    unlocked
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{SetStats, TermRecord};

    fn single_term_sets(correct: u32, total: u32) -> SetMap {
        let set = FlashcardSet::from_persisted(
            None,
            [(
                "t".to_owned(),
                TermRecord::from_persisted("d", correct, total).unwrap(),
            )],
            SetStats::default(),
        )
        .unwrap();
        SetMap::from([("s".to_owned(), set)])
    }

    #[test]
    fn no_attempts_is_unranked() {
        assert_eq!(level(&SetMap::new()), Level::Unranked);
        assert_eq!(level(&single_term_sets(0, 0)), Level::Unranked);
    }

    #[test]
    fn boundaries_are_inclusive_upper_edges() {
        let cases = [
            (0, Level::Beginner),
            (40, Level::Beginner),
            (41, Level::Intermediate),
            (70, Level::Intermediate),
            (71, Level::Advanced),
            (90, Level::Advanced),
            (91, Level::Expert),
            (100, Level::Expert),
        ];
        for (correct, expected) in cases {
            assert_eq!(level(&single_term_sets(correct, 100)), expected, "{correct}%");
        }
    }

    #[test]
    fn level_is_monotonic_in_accuracy() {
        let mut previous = Level::Beginner.skill_rank();
        for correct in 0..=100 {
            let rank = level(&single_term_sets(correct, 100)).skill_rank();
            assert!(rank >= previous);
            previous = rank;
        }
    }

    #[test]
    fn level_ignores_stale_cached_stats() {
        let mut sets = single_term_sets(9, 10);
        let stale = FlashcardSet::from_persisted(
            None,
            [("u".to_owned(), TermRecord::from_persisted("d", 0, 0).unwrap())],
            SetStats {
                correct: 0,
                total: 50,
                percentage: 0.0,
            },
        )
        .unwrap();
        sets.insert("stale".into(), stale);
        assert_eq!(level(&sets), Level::Advanced);
    }

    #[test]
    fn achievements_are_independent() {
        let mut sets = single_term_sets(85, 100);
        let unlocked = achievements(&sets);
        assert_eq!(
            unlocked,
            vec![
                Achievement::HundredQuestionsAnswered,
                Achievement::HighAccuracy,
                Achievement::MasteredSet("s".into()),
            ]
        );

        for i in 0..4 {
            sets.insert(format!("extra {i}"), FlashcardSet::default_python());
        }
        let unlocked = achievements(&sets);
        assert!(unlocked.contains(&Achievement::FiveSetsCreated));
        assert_eq!(
            unlocked
                .iter()
                .filter(|a| matches!(a, Achievement::MasteredSet(_)))
                .count(),
            1
        );
    }

    #[test]
    fn no_accuracy_achievement_without_attempts() {
        let unlocked = achievements(&single_term_sets(0, 0));
        assert!(unlocked.is_empty());
    }

    #[test]
    fn empty_set_counts_as_mastered() {
        let sets = SetMap::from([("blank".to_owned(), FlashcardSet::new(None))]);
        assert_eq!(
            achievements(&sets),
            vec![Achievement::MasteredSet("blank".into())]
        );
    }

    #[test]
    fn achievement_messages() {
        assert_eq!(
            Achievement::MasteredSet("Rust".into()).to_string(),
            "Mastered all terms in 'Rust'!"
        );
        assert_eq!(Level::Intermediate.to_string(), "Intermediate");
    }
}
