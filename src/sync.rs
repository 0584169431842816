//! Timing and ordering helpers for background refreshes

use std::time::{Duration, Instant};

/// Window used for the analytics refresh after viewport resizes
pub const RESIZE_DEBOUNCE: Duration = Duration::from_millis(250);

/// Trailing-edge debounce: every trigger pushes the deadline out again, and
/// only the last trigger of a burst fires once the window has passed.
#[derive(Debug, Clone)]
pub struct Debouncer {
    window: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self { window, deadline: None }
    }

    pub fn trigger(&mut self, now: Instant) {
        self.deadline = Some(now + self.window);
    }

    /// Returns true exactly once per quiet period.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    /// Time left before the pending trigger fires
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.deadline.map(|d| d.saturating_duration_since(now))
    }
}

/// Independent request streams, each with its own generation counter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchKind {
    Search,
    Detail,
    History,
    Analytics,
}

impl FetchKind {
    fn index(self) -> usize {
        match self {
            FetchKind::Search => 0,
            FetchKind::Detail => 1,
            FetchKind::History => 2,
            FetchKind::Analytics => 3,
        }
    }
}

/// A response is applied only if no newer request of the same kind has been
/// dispatched since it was sent.
#[derive(Debug, Clone, Default)]
pub struct RequestGenerations {
    latest: [u64; 4],
}

impl RequestGenerations {
    pub fn next(&mut self, kind: FetchKind) -> u64 {
        let slot = &mut self.latest[kind.index()];
        *slot += 1;
        *slot
    }

    pub fn is_current(&self, kind: FetchKind, generation: u64) -> bool {
        self.latest[kind.index()] == generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debounce_fires_once_after_quiet_period() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(RESIZE_DEBOUNCE);
        debouncer.trigger(start);

        assert!(!debouncer.poll(start + Duration::from_millis(249)));
        assert!(debouncer.poll(start + Duration::from_millis(250)));
        assert!(!debouncer.poll(start + Duration::from_millis(500)));
        assert_eq!(debouncer.remaining(start + Duration::from_millis(500)), None);
    }

    #[test]
    fn test_debounce_burst_resets_window() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(RESIZE_DEBOUNCE);
        for step in 0..5 {
            let at = start + Duration::from_millis(step * 100);
            debouncer.trigger(at);
            assert!(!debouncer.poll(at));
        }
        // Last trigger at 400ms
        assert!(!debouncer.poll(start + Duration::from_millis(600)));
        assert_eq!(
            debouncer.remaining(start + Duration::from_millis(600)),
            Some(Duration::from_millis(50))
        );
        assert!(debouncer.poll(start + Duration::from_millis(650)));
    }

    #[test]
    fn test_generations_are_per_kind() {
        let mut generations = RequestGenerations::default();
        let first_search = generations.next(FetchKind::Search);
        let history = generations.next(FetchKind::History);
        let second_search = generations.next(FetchKind::Search);

        assert!(!generations.is_current(FetchKind::Search, first_search));
        assert!(generations.is_current(FetchKind::Search, second_search));
        assert!(generations.is_current(FetchKind::History, history));
    }
}
