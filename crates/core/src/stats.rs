//! Per-set aggregation and progress reports.

use crate::model::{FlashcardSet, SetStats, TermRecord};

/// Terms answered correctly less often than this need more practice.
const NEEDS_PRACTICE_BELOW: f64 = 0.5;

/// `correct / total * 100`, or `0.0` when nothing was attempted.
#[must_use]
pub fn percentage(correct: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let pct = correct as f64 / total as f64 * 100.0;
    pct
}

impl SetStats {
    /// Sums the counters of the given terms.
    #[must_use]
    pub fn from_terms<'a>(terms: impl IntoIterator<Item = &'a TermRecord>) -> Self {
        let (correct, total) = terms.into_iter().fold((0_u32, 0_u32), |(c, t), term| {
            (c.saturating_add(term.correct()), t.saturating_add(term.total()))
        });
        Self {
            correct,
            total,
            percentage: percentage(u64::from(correct), u64::from(total)),
        }
    }
}

/// Refresh the cached stats of `set` from its terms and return them.
pub fn recompute_stats(set: &mut FlashcardSet) -> SetStats {
    let stats = SetStats::from_terms(set.terms().values());
    set.stats = stats;
    stats
}

//
// ─── PROGRESS REPORT ───────────────────────────────────────────────────────────
//

/// A term with a poor track record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeakTerm {
    pub term: String,
    pub correct: u32,
    pub total: u32,
}

/// Learning progress for a single set.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressReport {
    pub total_terms: usize,
    pub learned_terms: usize,
    pub total_attempts: u32,
    pub correct_answers: u32,
    pub accuracy: f64,
    /// Attempted terms below 50% accuracy, in set order.
    pub needs_practice: Vec<WeakTerm>,
}

/// Build a progress report from the set's cached stats and its terms.
#[must_use]
pub fn progress_report(set: &FlashcardSet) -> ProgressReport {
    let stats = set.stats();
    let needs_practice = set
        .terms()
        .iter()
        .filter(|(_, record)| {
            record.total() > 0
                && f64::from(record.correct()) / f64::from(record.total()) < NEEDS_PRACTICE_BELOW
        })
        .map(|(term, record)| WeakTerm {
            term: term.clone(),
            correct: record.correct(),
            total: record.total(),
        })
        .collect();

    ProgressReport {
        total_terms: set.len(),
        learned_terms: set.terms().values().filter(|t| t.is_learned()).count(),
        total_attempts: stats.total,
        correct_answers: stats.correct,
        accuracy: percentage(u64::from(stats.correct), u64::from(stats.total)),
        needs_practice,
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grader::Tier;

    fn set_with_counts(counts: &[(&str, u32, u32)]) -> FlashcardSet {
        let terms = counts.iter().map(|(term, correct, total)| {
            (
                (*term).to_owned(),
                TermRecord::from_persisted("definition", *correct, *total).unwrap(),
            )
        });
        FlashcardSet::from_persisted(None, terms, SetStats::default()).unwrap()
    }

    #[test]
    fn empty_set_has_zero_percentage() {
        let mut set = FlashcardSet::new(None);
        let stats = recompute_stats(&mut set);
        assert_eq!(stats, SetStats::default());
        assert_eq!(stats.percentage, 0.0);
    }

    #[test]
    fn recompute_sums_term_counters() {
        let mut set = set_with_counts(&[("a", 1, 2), ("b", 2, 2), ("c", 0, 4)]);
        let stats = recompute_stats(&mut set);
        assert_eq!(stats.correct, 3);
        assert_eq!(stats.total, 8);
        assert!((stats.percentage - 37.5).abs() < 1e-9);
        assert_eq!(set.stats(), stats);
    }

    #[test]
    fn recompute_is_idempotent() {
        let mut set = set_with_counts(&[("a", 1, 3)]);
        let first = recompute_stats(&mut set);
        let second = recompute_stats(&mut set);
        assert_eq!(first, second);
    }

    #[test]
    fn stale_cache_is_refreshed_after_grading() {
        let mut set = set_with_counts(&[("a", 0, 0)]);
        set.term_mut("a").unwrap().apply(Tier::Correct);
        assert_eq!(set.stats().total, 0);
        recompute_stats(&mut set);
        assert_eq!(set.stats().total, 1);
        assert_eq!(set.stats().correct, 1);
    }

    #[test]
    fn progress_report_flags_weak_terms() {
        let mut set = set_with_counts(&[
            ("fresh", 0, 0),
            ("weak", 1, 3),
            ("even", 1, 2),
            ("strong", 3, 3),
        ]);
        recompute_stats(&mut set);

        let report = progress_report(&set);
        assert_eq!(report.total_terms, 4);
        assert_eq!(report.learned_terms, 3);
        assert_eq!(report.total_attempts, 8);
        assert_eq!(report.correct_answers, 5);
        assert!((report.accuracy - 62.5).abs() < 1e-9);
        assert_eq!(
            report.needs_practice,
            vec![WeakTerm {
                term: "weak".into(),
                correct: 1,
                total: 3
            }]
        );
    }
}
