use rand::Rng;
use rand::rng;
use rand::seq::SliceRandom;

use flash_core::model::FlashcardSet;
use flash_core::review::{StudyMode, order_for_review};

/// Term keys in the order a session presents them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudyPlan {
    pub mode: StudyMode,
    pub terms: Vec<String>,
}

impl StudyPlan {
    #[must_use]
    pub fn total(&self) -> usize {
        self.terms.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

/// Orders a set for one study mode.
pub struct StudyPlanner<'a> {
    set: &'a FlashcardSet,
    mode: StudyMode,
}

impl<'a> StudyPlanner<'a> {
    #[must_use]
    pub fn new(set: &'a FlashcardSet, mode: StudyMode) -> Self {
        Self { set, mode }
    }

    /// Build the plan with the thread-local generator.
    #[must_use]
    pub fn build(self) -> StudyPlan {
        let mut rng = rng();
        self.build_with(&mut rng)
    }

    /// Practice walks weakest terms first; every other mode is shuffled.
    pub fn build_with<R: Rng + ?Sized>(self, rng: &mut R) -> StudyPlan {
        let terms = if self.mode.uses_weakness_order() {
            order_for_review(self.set)
        } else {
            let mut keys: Vec<String> = self.set.terms().keys().cloned().collect();
            keys.as_mut_slice().shuffle(rng);
            keys
        };
        StudyPlan {
            mode: self.mode,
            terms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flash_core::grader::Tier;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn practice_plan_is_weakest_first() {
        let mut set = FlashcardSet::default_python();
        set.term_mut("Loop").unwrap().apply(Tier::Incorrect);
        let plan = StudyPlanner::new(&set, StudyMode::Practice).build();
        assert_eq!(plan.terms[0], "Loop");
        assert_eq!(plan.total(), 4);
    }

    #[test]
    fn shuffled_plans_are_permutations() {
        let set = FlashcardSet::default_python();
        let mut rng = StdRng::seed_from_u64(7);
        for mode in [StudyMode::Quiz, StudyMode::Revision, StudyMode::FillBlank] {
            let mut terms = StudyPlanner::new(&set, mode).build_with(&mut rng).terms;
            terms.sort();
            assert_eq!(terms, ["Function", "Loop", "Python", "Variable"]);
        }
    }

    #[test]
    fn same_seed_gives_same_order() {
        let set = FlashcardSet::default_python();
        let a = StudyPlanner::new(&set, StudyMode::Quiz).build_with(&mut StdRng::seed_from_u64(3));
        let b = StudyPlanner::new(&set, StudyMode::Quiz).build_with(&mut StdRng::seed_from_u64(3));
        assert_eq!(a, b);
    }

    #[test]
    fn empty_set_plans_nothing() {
        let set = FlashcardSet::new(None);
        assert!(StudyPlanner::new(&set, StudyMode::Revision).build().is_empty());
    }
}
