//! Debouncing for viewport resize bursts.
//!
//! Window resizes arrive in bursts. Repositioning regions is a pure re-render,
//! so only the last size of a burst matters: each resize restarts the quiet
//! period and the reposition pass runs once it elapses.

use std::time::Duration;
use web_time::Instant;

use crate::constants::RESIZE_DEBOUNCE;

/// Coalesces repeated triggers into one deferred action.
#[derive(Debug)]
pub struct Debouncer {
    /// Quiet period required after the last trigger.
    delay: Duration,

    /// Time of the most recent trigger not yet fired.
    last_trigger: Option<Instant>,

    /// Number of triggers folded into the pending firing.
    coalesced: usize,
}

impl Debouncer {
    /// Create a debouncer with the given quiet period.
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            last_trigger: None,
            coalesced: 0,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Record a trigger at `now`, restarting the quiet period.
    pub fn trigger_at(&mut self, now: Instant) {
        self.last_trigger = Some(now);
        self.coalesced += 1;
        log::trace!("Debounce: trigger #{}", self.coalesced);
    }

    /// Record a trigger now.
    pub fn trigger(&mut self) {
        self.trigger_at(Instant::now());
    }

    /// Whether a firing is waiting for its quiet period.
    pub fn is_pending(&self) -> bool {
        self.last_trigger.is_some()
    }

    /// Fire if the quiet period has elapsed at `now`.
    ///
    /// Returns how many triggers were coalesced into this firing, or `None`
    /// if nothing is due.
    pub fn poll_at(&mut self, now: Instant) -> Option<usize> {
        let last = self.last_trigger?;
        if now.saturating_duration_since(last) < self.delay {
            return None;
        }
        let count = self.coalesced;
        self.last_trigger = None;
        self.coalesced = 0;
        log::trace!("Debounce: firing after {} trigger(s)", count);
        Some(count)
    }

    /// Fire if the quiet period has elapsed now.
    pub fn poll(&mut self) -> Option<usize> {
        self.poll_at(Instant::now())
    }

    /// Drop any pending firing.
    pub fn cancel(&mut self) {
        self.last_trigger = None;
        self.coalesced = 0;
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(RESIZE_DEBOUNCE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let mut debouncer = Debouncer::default();
        assert!(!debouncer.is_pending());
        assert_eq!(debouncer.poll(), None);
    }

    #[test]
    fn test_burst_fires_once_after_quiet_period() {
        let mut debouncer = Debouncer::new(Duration::from_millis(100));
        let start = Instant::now();
        debouncer.trigger_at(start);
        debouncer.trigger_at(start + Duration::from_millis(30));
        debouncer.trigger_at(start + Duration::from_millis(60));

        // 100ms after the first trigger but only 40ms after the last
        assert_eq!(debouncer.poll_at(start + Duration::from_millis(100)), None);
        assert_eq!(debouncer.poll_at(start + Duration::from_millis(160)), Some(3));
        assert!(!debouncer.is_pending());
        assert_eq!(debouncer.poll_at(start + Duration::from_millis(500)), None);
    }

    #[test]
    fn test_zero_delay_fires_immediately() {
        let mut debouncer = Debouncer::new(Duration::ZERO);
        debouncer.trigger();
        assert_eq!(debouncer.poll(), Some(1));
    }

    #[test]
    fn test_cancel() {
        let mut debouncer = Debouncer::new(Duration::ZERO);
        debouncer.trigger();
        debouncer.cancel();
        assert_eq!(debouncer.poll(), None);
    }
}
