/// Aggregated view of session progress, useful for the shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionProgress {
    pub total: usize,
    pub answered: usize,
    pub remaining: usize,
    pub is_complete: bool,
}

impl SessionProgress {
    pub(crate) fn new(total: usize, answered: usize) -> Self {
        Self {
            total,
            answered,
            remaining: total.saturating_sub(answered),
            is_complete: answered >= total,
        }
    }
}

/// Final tally of a session, including one stopped early.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSummary {
    pub score: u32,
    pub answered: usize,
    pub total: usize,
}
