//! Cancelable one-shot timers
//!
//! A [`Scheduler`] hands out a [`TimerHandle`] for every scheduled delay and
//! reports the same handle back once the delay has elapsed. Cancelled handles
//! are never reported.

use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(u64);

impl TimerHandle {
    pub fn id(&self) -> u64 {
        self.0
    }
}

pub trait Scheduler {
    /// Arm a timer that fires once after `delay`
    fn schedule(&mut self, delay: Duration) -> TimerHandle;

    /// Disarm a timer. Unknown or already fired handles are ignored.
    fn cancel(&mut self, handle: TimerHandle);
}

/// Timers backed by tokio tasks. A fired timer is delivered as the message
/// built by `wrap`, so it arrives on the same channel as every other event.
pub struct TokioScheduler<E> {
    tx: UnboundedSender<E>,
    wrap: fn(TimerHandle) -> E,
    tasks: HashMap<TimerHandle, JoinHandle<()>>,
    next_id: u64,
}

impl<E: Send + 'static> TokioScheduler<E> {
    pub fn new(tx: UnboundedSender<E>, wrap: fn(TimerHandle) -> E) -> Self {
        Self {
            tx,
            wrap,
            tasks: HashMap::new(),
            next_id: 0,
        }
    }

    /// Number of timers that are armed and not yet fired
    pub fn armed(&self) -> usize {
        self.tasks.values().filter(|task| !task.is_finished()).count()
    }
}

impl<E: Send + 'static> Scheduler for TokioScheduler<E> {
    fn schedule(&mut self, delay: Duration) -> TimerHandle {
        self.tasks.retain(|_, task| !task.is_finished());

        self.next_id += 1;
        let handle = TimerHandle(self.next_id);
        let tx = self.tx.clone();
        let message = (self.wrap)(handle);

        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // Receiver gone means the runtime shut down
            let _ = tx.send(message);
        });
        trace!(target: "timer", "Armed timer {} for {:?}", handle.0, delay);
        self.tasks.insert(handle, task);
        handle
    }

    fn cancel(&mut self, handle: TimerHandle) {
        if let Some(task) = self.tasks.remove(&handle) {
            task.abort();
            trace!(target: "timer", "Cancelled timer {}", handle.0);
        }
    }
}

impl<E> Drop for TokioScheduler<E> {
    fn drop(&mut self) {
        for task in self.tasks.values() {
            task.abort();
        }
    }
}

/// Virtual-clock scheduler. Nothing fires on its own: the owner advances the
/// clock and collects due timers with [`ManualScheduler::pop_due`].
#[derive(Debug, Default)]
pub struct ManualScheduler {
    now: Duration,
    next_id: u64,
    pending: Vec<(Duration, TimerHandle)>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    /// Earliest armed deadline
    pub fn next_due(&self) -> Option<Duration> {
        self.pending.iter().map(|(due, _)| *due).min()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Remove and return the earliest timer due at or before `until`,
    /// moving the clock to its deadline.
    pub fn pop_due(&mut self, until: Duration) -> Option<(Duration, TimerHandle)> {
        let index = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, (due, _))| *due <= until)
            .min_by_key(|(_, (due, handle))| (*due, *handle))
            .map(|(index, _)| index)?;

        let (due, handle) = self.pending.remove(index);
        self.now = self.now.max(due);
        Some((due, handle))
    }

    /// Move the clock forward without firing anything
    pub fn advance_to(&mut self, at: Duration) {
        self.now = self.now.max(at);
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&mut self, delay: Duration) -> TimerHandle {
        self.next_id += 1;
        let handle = TimerHandle(self.next_id);
        self.pending.push((self.now + delay, handle));
        handle
    }

    fn cancel(&mut self, handle: TimerHandle) {
        self.pending.retain(|(_, armed)| *armed != handle);
    }
}
