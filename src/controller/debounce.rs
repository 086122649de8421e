//! Trailing debouncer for route refetching.
//!
//! Standard trailing semantics: every trigger replaces the pending payload
//! and restarts the quiet window; only the last trigger fires, and only
//! after the full window of silence. The clock is injectable so the
//! behavior is testable without timers.

use std::time::{ Duration, Instant };

pub const ROUTE_DEBOUNCE: Duration = Duration::from_millis(1000);

#[derive(Debug)]
pub struct Debouncer<T> {
    delay: Duration,
    generation: u64,
    pending: Option<Pending<T>>,
}

#[derive(Debug)]
struct Pending<T> {
    generation: u64,
    deadline: Instant,
    payload: T,
}

impl<T> Debouncer<T> {
    pub fn new(delay: Duration) -> Self {
        Self { delay, generation: 0, pending: None }
    }

    /// Record a trigger: supersedes any pending payload and restarts the
    /// quiet window. Returns the new generation.
    pub fn trigger_at(&mut self, now: Instant, payload: T) -> u64 {
        self.generation += 1;
        self.pending = Some(Pending {
            generation: self.generation,
            deadline: now + self.delay,
            payload,
        });
        self.generation
    }

    pub fn trigger(&mut self, payload: T) -> u64 {
        self.trigger_at(Instant::now(), payload)
    }

    /// Deadline of the pending trigger, if any. Hosts sleep until this.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|p| p.deadline)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Drop any pending trigger without firing it.
    pub fn cancel(&mut self) {
        self.pending = None;
    }

    /// Take the payload if its quiet window has elapsed at `now`.
    pub fn take_ready_at(&mut self, now: Instant) -> Option<T> {
        match &self.pending {
            Some(p) if now >= p.deadline => self.pending.take().map(|p| p.payload),
            _ => None,
        }
    }

    pub fn take_ready(&mut self) -> Option<T> {
        self.take_ready_at(Instant::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_fire_after_quiet_window() {
        let mut debouncer: Debouncer<u32> = Debouncer::new(Duration::from_millis(1000));
        let start = Instant::now();

        debouncer.trigger_at(start, 1);
        // nothing fires before the window elapses
        assert!(debouncer.take_ready_at(start + Duration::from_millis(999)).is_none());
        assert!(debouncer.is_pending());

        assert_eq!(debouncer.take_ready_at(start + Duration::from_millis(1000)), Some(1));
        assert!(!debouncer.is_pending());
    }

    #[test]
    fn test_retrigger_supersedes_and_restarts() {
        let mut debouncer: Debouncer<u32> = Debouncer::new(Duration::from_millis(1000));
        let start = Instant::now();

        debouncer.trigger_at(start, 1);
        debouncer.trigger_at(start + Duration::from_millis(500), 2);

        // the first trigger's deadline has passed, but it was superseded
        assert!(debouncer.take_ready_at(start + Duration::from_millis(1100)).is_none());
        // only the trailing payload fires, one full window after its trigger
        assert_eq!(debouncer.take_ready_at(start + Duration::from_millis(1500)), Some(2));
        // and only once
        assert!(debouncer.take_ready_at(start + Duration::from_millis(5000)).is_none());
    }

    #[test]
    fn test_cancel() {
        let mut debouncer: Debouncer<u32> = Debouncer::new(Duration::from_millis(1000));
        let start = Instant::now();

        debouncer.trigger_at(start, 1);
        debouncer.cancel();
        assert!(debouncer.take_ready_at(start + Duration::from_millis(2000)).is_none());
        assert!(debouncer.deadline().is_none());
    }

    #[test]
    fn test_generations_increase() {
        let mut debouncer: Debouncer<()> = Debouncer::new(Duration::from_millis(1));
        let g1 = debouncer.trigger(());
        let g2 = debouncer.trigger(());
        assert!(g2 > g1);
    }
}
