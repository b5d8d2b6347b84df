use flash_core::Clock;
use flash_core::challenge::{ChallengeUpdate, DailyChallenge};

/// Holds today's challenge for one login session.
///
/// The challenge lives in memory only and starts over when the calendar day
/// changes.
#[derive(Debug, Clone)]
pub struct ChallengeService {
    clock: Clock,
    goal: u32,
    current: Option<DailyChallenge>,
}

impl ChallengeService {
    #[must_use]
    pub fn new(clock: Clock, goal: u32) -> Self {
        Self {
            clock,
            goal,
            current: None,
        }
    }

    #[must_use]
    pub fn clock(&self) -> Clock {
        self.clock
    }

    /// Move the clock, e.g. to simulate a day boundary in tests.
    pub fn set_clock(&mut self, clock: Clock) {
        self.clock = clock;
    }

    /// Today's challenge, replacing one left over from a previous day.
    pub fn today(&mut self) -> &DailyChallenge {
        let challenge =
            DailyChallenge::for_day(self.current.take(), self.clock.today(), self.goal);
        self.current.insert(challenge)
    }

    /// Credit correct answers from a finished practice session.
    pub fn record_correct_answers(&mut self, count: u32) -> ChallengeUpdate {
        let challenge =
            DailyChallenge::for_day(self.current.take(), self.clock.today(), self.goal);
        let challenge = self.current.insert(challenge);
        let update = challenge.apply_correct_answers(count);
        log::debug!("daily challenge: {update:?}");
        update
    }
}
