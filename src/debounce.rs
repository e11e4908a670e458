//! Trailing-edge debounce driven by explicit clock ticks.

use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    /// Arm (or push back) the deadline from `now`.
    pub fn schedule(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// True once per armed deadline, on the first tick at or past it.
    pub fn fire_if_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_once_after_the_delay() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(Duration::from_millis(250));
        debouncer.schedule(start);
        assert!(!debouncer.fire_if_due(start + Duration::from_millis(100)));
        assert!(debouncer.fire_if_due(start + Duration::from_millis(250)));
        assert!(!debouncer.fire_if_due(start + Duration::from_millis(500)));
    }

    #[test]
    fn new_events_push_the_deadline_back() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(Duration::from_millis(250));
        debouncer.schedule(start);
        debouncer.schedule(start + Duration::from_millis(200));
        assert!(!debouncer.fire_if_due(start + Duration::from_millis(300)));
        assert!(debouncer.fire_if_due(start + Duration::from_millis(450)));
    }

    #[test]
    fn cancel_disarms() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(Duration::from_millis(10));
        debouncer.schedule(start);
        debouncer.cancel();
        assert!(!debouncer.is_pending());
        assert!(!debouncer.fire_if_due(start + Duration::from_secs(1)));
    }
}
