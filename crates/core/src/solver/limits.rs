//! Hard caps and cooperative cancellation for puzzle searches.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

pub const DEFAULT_MAX_STATES: usize = 240_000;

/// Searches poll their cancel token once per this many expanded states.
pub(crate) const CANCEL_CHECK_INTERVAL: usize = 1024;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SolveLimits {
    /// Distinct states recorded before the search gives up.
    pub max_states: usize,
    pub max_pushes: Option<u32>,
    pub max_steps: Option<u32>,
}

impl Default for SolveLimits {
    fn default() -> Self {
        Self { max_states: DEFAULT_MAX_STATES, max_pushes: None, max_steps: None }
    }
}

impl SolveLimits {
    pub fn with_max_states(max_states: usize) -> Self {
        Self { max_states, ..Self::default() }
    }

    pub(crate) fn allows(&self, pushes: u32, steps: u32) -> bool {
        self.max_pushes.is_none_or(|max| pushes <= max) && self.max_steps.is_none_or(|max| steps <= max)
    }
}

/// Shared stop signal for generation and search, with an optional wall-clock deadline.
///
/// Clones share the same flag, so a caller can keep one handle and cancel work
/// running on other threads.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_deadline(budget: Duration) -> Self {
        Self { flag: Arc::default(), deadline: Some(Instant::now() + budget) }
    }

    /// A token sharing this one's flag whose deadline is at most `budget` from now.
    pub fn with_budget(&self, budget: Duration) -> Self {
        let candidate = Instant::now() + budget;
        let deadline = self.deadline.map_or(candidate, |existing| existing.min(candidate));
        Self { flag: Arc::clone(&self.flag), deadline: Some(deadline) }
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed) || self.deadline.is_some_and(|deadline| Instant::now() >= deadline)
    }
}
