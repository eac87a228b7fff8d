#![forbid(unsafe_code)]

//! Deterministic, single-threaded delayed tasks.
//!
//! [`Scheduler`] holds tasks keyed by deadline. Nothing runs on its own: the
//! owner calls [`drain_due`](Scheduler::drain_due) from its event loop with
//! the current time and executes what comes back. Time is always passed in,
//! which lets tests drive the scheduler with a [`ManualClock`].
//!
//! # Invariants
//!
//! 1. `drain_due(now)` returns tasks with `deadline <= now`, ordered by
//!    deadline and then by scheduling order.
//! 2. A cancelled task is never returned.
//! 3. `debounce(task)` leaves at most one pending copy of `task`.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

use web_time::{Duration, Instant};

/// Source of "now".
pub trait Clock: fmt::Debug {
    fn now(&self) -> Instant;
}

/// Wall-clock monotonic time.
#[derive(Debug, Clone, Copy, Default)]
pub struct MonotonicClock;

impl Clock for MonotonicClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Virtual clock advanced by hand. Clones share the same time.
#[derive(Debug, Clone)]
pub struct ManualClock {
    origin: Instant,
    elapsed_nanos: Arc<AtomicU64>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualClock {
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            elapsed_nanos: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Move time forward by `by`.
    pub fn advance(&self, by: Duration) {
        let nanos = u64::try_from(by.as_nanos()).unwrap_or(u64::MAX);
        self.elapsed_nanos.fetch_add(nanos, AtomicOrdering::SeqCst);
    }

    /// Time elapsed since the clock was created.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        Duration::from_nanos(self.elapsed_nanos.load(AtomicOrdering::SeqCst))
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + self.elapsed()
    }
}

/// Handle for a scheduled task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

impl TaskId {
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

struct Scheduled<T> {
    id: TaskId,
    deadline: Instant,
    task: T,
}

impl<T> PartialEq for Scheduled<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<T> Eq for Scheduled<T> {}

impl<T> PartialOrd for Scheduled<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Scheduled<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Earliest deadline first (max-heap, so reversed), FIFO on ties.
        other
            .deadline
            .cmp(&self.deadline)
            .then_with(|| other.id.cmp(&self.id))
    }
}

/// Pending tasks ordered by deadline.
pub struct Scheduler<T> {
    queue: BinaryHeap<Scheduled<T>>,
    live: HashSet<TaskId>,
    next_id: u64,
}

impl<T> fmt::Debug for Scheduler<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduler")
            .field("pending", &self.live.len())
            .field("next_id", &self.next_id)
            .finish()
    }
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Scheduler<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            queue: BinaryHeap::new(),
            live: HashSet::new(),
            next_id: 0,
        }
    }

    /// Run `task` once `delay` has passed after `now`.
    pub fn schedule_after(&mut self, now: Instant, delay: Duration, task: T) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id += 1;
        self.queue.push(Scheduled {
            id,
            deadline: now + delay,
            task,
        });
        self.live.insert(id);
        tracing::trace!(
            target: "notepin.scheduler",
            task_id = id.0,
            delay_ms = delay.as_millis() as u64,
            "task scheduled"
        );
        id
    }

    /// Cancel a pending task. Returns `false` if it already ran or was
    /// cancelled.
    pub fn cancel(&mut self, id: TaskId) -> bool {
        let removed = self.live.remove(&id);
        if removed {
            tracing::trace!(target: "notepin.scheduler", task_id = id.0, "task cancelled");
            self.compact();
        }
        removed
    }

    #[must_use]
    pub fn is_pending(&self, id: TaskId) -> bool {
        self.live.contains(&id)
    }

    /// Number of pending tasks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.live.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    /// Deadline of the next pending task.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.queue
            .iter()
            .filter(|entry| self.live.contains(&entry.id))
            .map(|entry| entry.deadline)
            .min()
    }

    /// Remove and return every task due at `now`, in run order.
    pub fn drain_due(&mut self, now: Instant) -> Vec<T> {
        let mut due = Vec::new();
        while self
            .queue
            .peek()
            .is_some_and(|entry| entry.deadline <= now)
        {
            let Some(entry) = self.queue.pop() else {
                break;
            };
            if self.live.remove(&entry.id) {
                due.push(entry.task);
            }
        }
        if !due.is_empty() {
            tracing::trace!(target: "notepin.scheduler", count = due.len(), "tasks due");
        }
        due
    }

    /// Drop every pending task.
    pub fn clear(&mut self) {
        self.queue.clear();
        self.live.clear();
    }

    // Cancelled entries stay in the heap until popped; rebuild once they
    // dominate so long-lived debounces do not grow it without bound.
    fn compact(&mut self) {
        if self.queue.len() > 32 && self.queue.len() > self.live.len() * 2 {
            let live = &self.live;
            self.queue.retain(|entry| live.contains(&entry.id));
        }
    }
}

impl<T: PartialEq> Scheduler<T> {
    /// Cancel every pending copy of `task`, then schedule it afresh.
    pub fn debounce(&mut self, now: Instant, delay: Duration, task: T) -> TaskId {
        let stale: Vec<TaskId> = self
            .queue
            .iter()
            .filter(|entry| entry.task == task && self.live.contains(&entry.id))
            .map(|entry| entry.id)
            .collect();
        for id in stale {
            self.cancel(id);
        }
        self.schedule_after(now, delay, task)
    }

    /// Whether a copy of `task` is pending.
    #[must_use]
    pub fn contains(&self, task: &T) -> bool {
        self.queue
            .iter()
            .any(|entry| entry.task == *task && self.live.contains(&entry.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn drains_in_deadline_order() {
        let clock = ManualClock::new();
        let mut sched = Scheduler::new();
        sched.schedule_after(clock.now(), ms(30), "c");
        sched.schedule_after(clock.now(), ms(10), "a");
        sched.schedule_after(clock.now(), ms(20), "b");

        clock.advance(ms(25));
        assert_eq!(sched.drain_due(clock.now()), vec!["a", "b"]);
        assert_eq!(sched.len(), 1);
        clock.advance(ms(5));
        assert_eq!(sched.drain_due(clock.now()), vec!["c"]);
        assert!(sched.is_empty());
    }

    #[test]
    fn ties_run_fifo() {
        let clock = ManualClock::new();
        let mut sched = Scheduler::new();
        for n in 0..5 {
            sched.schedule_after(clock.now(), ms(10), n);
        }
        clock.advance(ms(10));
        assert_eq!(sched.drain_due(clock.now()), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn nothing_due_before_deadline() {
        let clock = ManualClock::new();
        let mut sched = Scheduler::new();
        sched.schedule_after(clock.now(), ms(300), ());
        clock.advance(ms(299));
        assert!(sched.drain_due(clock.now()).is_empty());
        assert_eq!(sched.next_deadline(), Some(clock.now() + ms(1)));
    }

    #[test]
    fn cancelled_task_never_runs() {
        let clock = ManualClock::new();
        let mut sched = Scheduler::new();
        let id = sched.schedule_after(clock.now(), ms(5), "x");
        assert!(sched.is_pending(id));
        assert!(sched.cancel(id));
        assert!(!sched.cancel(id));
        clock.advance(ms(10));
        assert!(sched.drain_due(clock.now()).is_empty());
        assert_eq!(sched.next_deadline(), None);
    }

    #[test]
    fn debounce_replaces_pending_copy() {
        let clock = ManualClock::new();
        let mut sched = Scheduler::new();
        sched.debounce(clock.now(), ms(100), "save");
        clock.advance(ms(60));
        sched.debounce(clock.now(), ms(100), "save");
        sched.schedule_after(clock.now(), ms(10), "other");
        assert_eq!(sched.len(), 2);

        clock.advance(ms(60));
        assert_eq!(sched.drain_due(clock.now()), vec!["other"]);
        assert!(sched.contains(&"save"));
        clock.advance(ms(40));
        assert_eq!(sched.drain_due(clock.now()), vec!["save"]);
    }

    #[test]
    fn heavy_cancellation_compacts() {
        let clock = ManualClock::new();
        let mut sched = Scheduler::new();
        for _ in 0..200 {
            sched.debounce(clock.now(), ms(5), 1u8);
        }
        assert_eq!(sched.len(), 1);
        assert!(sched.queue.len() <= 64);
    }

    #[test]
    fn manual_clock_clones_share_time() {
        let clock = ManualClock::new();
        let other = clock.clone();
        clock.advance(ms(42));
        assert_eq!(other.elapsed(), ms(42));
        assert_eq!(other.now(), clock.now());
    }
}
