//! Cancellable one-shot timers for the single-threaded event loop.
//!
//! Components never sleep or spawn ticker threads. They ask a `Scheduler`
//! for a `TaskId`, keep it, and either receive it back from the event loop
//! when it is due or cancel it when the reason for the timer goes away.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

/// Handle to one scheduled wake-up.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskId(u64);

pub trait Scheduler {
    /// Schedule a wake-up `delay` from now and return its handle.
    fn schedule(&mut self, delay: Duration) -> TaskId;
    /// Cancel a pending wake-up. Returns false if it already fired or was cancelled.
    fn cancel(&mut self, id: TaskId) -> bool;
}

/// Deadline-ordered timer queue driven by the runtime loop.
#[derive(Debug, Default)]
pub struct TimerQueue {
    next_id: u64,
    pending: BTreeMap<TaskId, Instant>,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    fn schedule_at(&mut self, due: Instant) -> TaskId {
        self.next_id += 1;
        let id = TaskId(self.next_id);
        self.pending.insert(id, due);
        id
    }

    /// Earliest pending deadline, if any.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.values().min().copied()
    }

    /// Time left until the earliest deadline, capped at `max`.
    pub fn timeout(&self, now: Instant, max: Duration) -> Duration {
        self.next_deadline()
            .map(|due| due.saturating_duration_since(now).min(max))
            .unwrap_or(max)
    }

    /// Remove and return every task due at `now`, earliest first.
    pub fn take_due(&mut self, now: Instant) -> Vec<TaskId> {
        let mut due: Vec<(Instant, TaskId)> = self
            .pending
            .iter()
            .filter(|&(_, &at)| at <= now)
            .map(|(&id, &at)| (at, id))
            .collect();
        due.sort();
        for (_, id) in &due {
            self.pending.remove(id);
        }
        due.into_iter().map(|(_, id)| id).collect()
    }

    pub fn is_pending(&self, id: TaskId) -> bool {
        self.pending.contains_key(&id)
    }

    pub fn outstanding(&self) -> usize {
        self.pending.len()
    }
}

impl Scheduler for TimerQueue {
    fn schedule(&mut self, delay: Duration) -> TaskId {
        self.schedule_at(Instant::now() + delay)
    }

    fn cancel(&mut self, id: TaskId) -> bool {
        self.pending.remove(&id).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn take_due_returns_only_expired_tasks_in_deadline_order() {
        let mut q = TimerQueue::new();
        let now = Instant::now();
        let late = q.schedule_at(now + Duration::from_millis(30));
        let early = q.schedule_at(now + Duration::from_millis(10));
        let future = q.schedule_at(now + Duration::from_secs(60));

        let due = q.take_due(now + Duration::from_millis(40));
        assert_eq!(due, vec![early, late]);
        assert!(q.is_pending(future));
        assert_eq!(q.outstanding(), 1);
    }

    #[test]
    fn cancel_is_reported_once() {
        let mut q = TimerQueue::new();
        let id = q.schedule(Duration::from_secs(1));
        assert!(q.cancel(id));
        assert!(!q.cancel(id));
        assert_eq!(q.outstanding(), 0);
        assert!(q.take_due(Instant::now() + Duration::from_secs(5)).is_empty());
    }

    #[test]
    fn timeout_is_capped_and_saturates() {
        let mut q = TimerQueue::new();
        let now = Instant::now();
        assert_eq!(q.timeout(now, Duration::from_millis(50)), Duration::from_millis(50));

        q.schedule_at(now + Duration::from_millis(5));
        assert_eq!(q.timeout(now, Duration::from_millis(50)), Duration::from_millis(5));
        assert_eq!(
            q.timeout(now + Duration::from_secs(1), Duration::from_millis(50)),
            Duration::ZERO
        );
    }

    #[test]
    fn ids_are_never_reused() {
        let mut q = TimerQueue::new();
        let a = q.schedule(Duration::ZERO);
        q.cancel(a);
        let b = q.schedule(Duration::ZERO);
        assert_ne!(a, b);
    }
}
