use crate::utils::timer::{Scheduler, TimerHandle};
use std::time::Duration;

/// A debouncer that keeps at most one live timer: every trigger cancels the
/// previous timer and arms a new one for the full quiet period.
#[derive(Debug, Clone)]
pub struct Debouncer {
    /// The duration to wait after the last event before triggering
    delay: Duration,
    /// The only timer allowed to fire
    pending: Option<TimerHandle>,
}

impl Debouncer {
    /// Create a new debouncer with the specified delay in milliseconds
    pub fn new(delay_ms: u64) -> Self {
        Self {
            delay: Duration::from_millis(delay_ms),
            pending: None,
        }
    }

    /// Register that an event occurred, restarting the quiet period
    pub fn trigger(&mut self, scheduler: &mut dyn Scheduler) -> TimerHandle {
        if let Some(previous) = self.pending.take() {
            scheduler.cancel(previous);
        }
        let handle = scheduler.schedule(self.delay);
        self.pending = Some(handle);
        handle
    }

    /// Called when a timer fires. Returns true only for the live timer, which
    /// is consumed; anything else is a leftover of a cancelled trigger.
    pub fn should_execute(&mut self, fired: TimerHandle) -> bool {
        if self.pending == Some(fired) {
            self.pending = None;
            true
        } else {
            false
        }
    }

    /// Reset the debouncer, canceling any pending action
    pub fn reset(&mut self, scheduler: &mut dyn Scheduler) {
        if let Some(previous) = self.pending.take() {
            scheduler.cancel(previous);
        }
    }

    /// Check if there's a pending action
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}
