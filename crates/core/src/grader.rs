//! Fuzzy grading of free-text answers.
//!
//! Similarity is the Ratcliff/Obershelp ratio: find the longest common block,
//! recurse on the pieces to its left and right, and score `2 * M / T` where
//! `M` is the matched length and `T` the combined length of both strings.

use std::collections::HashMap;

/// Ratios strictly above this are graded correct.
pub const CORRECT_THRESHOLD: f64 = 0.70;

/// Ratios strictly above this (and not correct) are graded partial.
pub const PARTIAL_THRESHOLD: f64 = 0.40;

/// References at least this long drop over-represented characters from the
/// match index, so common letters and spaces cannot seed spurious blocks.
const AUTOJUNK_MIN_LEN: usize = 200;

//
// ─── TIER ──────────────────────────────────────────────────────────────────────
//

/// Grading outcome bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tier {
    Correct,
    Partial,
    Incorrect,
}

/// Result of grading one answer.
#[derive(Debug, Clone, PartialEq)]
pub struct Grade {
    pub tier: Tier,
    pub ratio: f64,
    /// First half of the reference, only for `Tier::Partial`.
    pub hint: Option<String>,
}

/// Grade `answer` against `reference`, ignoring case.
///
/// Callers trim both strings first. Pure: no counters are touched.
#[must_use]
pub fn grade(answer: &str, reference: &str) -> Grade {
    let ratio = similarity(&answer.to_lowercase(), &reference.to_lowercase());

    if ratio > CORRECT_THRESHOLD {
        Grade {
            tier: Tier::Correct,
            ratio,
            hint: None,
        }
    } else if ratio > PARTIAL_THRESHOLD {
        Grade {
            tier: Tier::Partial,
            ratio,
            hint: Some(hint_for(reference)),
        }
    } else {
        Grade {
            tier: Tier::Incorrect,
            ratio,
            hint: None,
        }
    }
}

/// First `len / 2` characters of the reference.
#[must_use]
pub fn hint_for(reference: &str) -> String {
    let half = reference.chars().count() / 2;
    reference.chars().take(half).collect()
}

/// Case-sensitive similarity ratio in `[0, 1]`. Two empty strings score 1.
#[must_use]
pub fn similarity(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }

    let matched = Matcher::new(&a, &b).matched_len();

    #[allow(clippy::cast_precision_loss)]
    let ratio = (2 * matched) as f64 / total as f64;
    ratio
}

//
// ─── MATCHER ───────────────────────────────────────────────────────────────────
//

/// A matching block: `a[a_start..a_start + len] == b[b_start..b_start + len]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Block {
    a_start: usize,
    b_start: usize,
    len: usize,
}

struct Matcher<'a> {
    a: &'a [char],
    b: &'a [char],
    /// Positions of each character in `b`, ascending.
    b_index: HashMap<char, Vec<usize>>,
}

impl<'a> Matcher<'a> {
    fn new(a: &'a [char], b: &'a [char]) -> Self {
        let mut b_index: HashMap<char, Vec<usize>> = HashMap::new();
        for (j, ch) in b.iter().enumerate() {
            b_index.entry(*ch).or_default().push(j);
        }

        if b.len() >= AUTOJUNK_MIN_LEN {
            let limit = b.len() / 100 + 1;
            b_index.retain(|_, positions| positions.len() <= limit);
        }

        Self { a, b, b_index }
    }

    /// Longest block within the given ranges; ties go to the earliest start
    /// in `a`, then the earliest in `b`.
    fn longest_match(&self, a_lo: usize, a_hi: usize, b_lo: usize, b_hi: usize) -> Block {
        let mut best = Block {
            a_start: a_lo,
            b_start: b_lo,
            len: 0,
        };
        // Length of the run ending at (i - 1, j), keyed by j.
        let mut run_ending: HashMap<usize, usize> = HashMap::new();

        for i in a_lo..a_hi {
            let mut next_run: HashMap<usize, usize> = HashMap::new();
            if let Some(positions) = self.b_index.get(&self.a[i]) {
                for &j in positions {
                    if j < b_lo {
                        continue;
                    }
                    if j >= b_hi {
                        break;
                    }
                    let len = j
                        .checked_sub(1)
                        .and_then(|prev| run_ending.get(&prev))
                        .copied()
                        .unwrap_or(0)
                        + 1;
                    next_run.insert(j, len);
                    if len > best.len {
                        best = Block {
                            a_start: i + 1 - len,
                            b_start: j + 1 - len,
                            len,
                        };
                    }
                }
            }
            run_ending = next_run;
        }

        // Characters dropped from the index can still extend a block.
        while best.a_start > a_lo
            && best.b_start > b_lo
            && self.a[best.a_start - 1] == self.b[best.b_start - 1]
        {
            best.a_start -= 1;
            best.b_start -= 1;
            best.len += 1;
        }
        while best.a_start + best.len < a_hi
            && best.b_start + best.len < b_hi
            && self.a[best.a_start + best.len] == self.b[best.b_start + best.len]
        {
            best.len += 1;
        }

        best
    }

    /// Total length of all matching blocks.
    fn matched_len(&self) -> usize {
        let mut matched = 0;
        let mut pending = vec![(0, self.a.len(), 0, self.b.len())];

        while let Some((a_lo, a_hi, b_lo, b_hi)) = pending.pop() {
            let block = self.longest_match(a_lo, a_hi, b_lo, b_hi);
            if block.len == 0 {
                continue;
            }
            matched += block.len;
            if a_lo < block.a_start && b_lo < block.b_start {
                pending.push((a_lo, block.a_start, b_lo, block.b_start));
            }
            let a_end = block.a_start + block.len;
            let b_end = block.b_start + block.len;
            if a_end < a_hi && b_end < b_hi {
                pending.push((a_end, a_hi, b_end, b_hi));
            }
        }

        matched
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
