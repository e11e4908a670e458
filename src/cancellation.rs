use anyhow::{Result, anyhow};
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use tracing::debug;

#[derive(Clone, Debug, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    pub fn check_cancelled(&self, stage: &'static str) -> Result<()> {
        if self.is_cancelled() {
            return Err(anyhow!("operation cancelled at stage={stage}"));
        }
        Ok(())
    }
}

/// Handle for one in-flight navigation.
#[derive(Clone, Debug)]
pub struct RequestTicket {
    pub generation: u64,
    pub token: CancellationToken,
}

/// Hands out navigation generations; only the newest one is current.
#[derive(Debug)]
pub struct RequestTracker {
    next_generation: u64,
    active: Option<RequestTicket>,
}

impl Default for RequestTracker {
    fn default() -> Self {
        Self {
            next_generation: 1,
            active: None,
        }
    }
}

impl RequestTracker {
    /// Start a new request, cancelling whichever one was in flight.
    pub fn begin(&mut self) -> RequestTicket {
        if let Some(previous) = self.active.take() {
            previous.token.cancel();
            debug!(generation = previous.generation, "Superseded in-flight request");
        }
        let generation = self.next_generation;
        self.next_generation = self.next_generation.wrapping_add(1).max(1);
        let ticket = RequestTicket {
            generation,
            token: CancellationToken::new(),
        };
        self.active = Some(ticket.clone());
        ticket
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.active
            .as_ref()
            .is_some_and(|ticket| ticket.generation == generation)
    }

    /// Close the active request if `generation` is it. Returns false for
    /// stale or unknown generations.
    pub fn finish(&mut self, generation: u64) -> bool {
        if self.is_current(generation) {
            self.active = None;
            true
        } else {
            false
        }
    }

    pub fn in_flight(&self) -> bool {
        self.active.is_some()
    }

    pub fn cancel_active(&mut self) {
        if let Some(ticket) = self.active.take() {
            ticket.token.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_request_cancels_the_previous_one() {
        let mut tracker = RequestTracker::default();
        let first = tracker.begin();
        let second = tracker.begin();
        assert!(first.token.is_cancelled());
        assert!(!second.token.is_cancelled());
        assert!(!tracker.is_current(first.generation));
        assert!(tracker.is_current(second.generation));
        assert!(first.token.check_cancelled("fetch").is_err());
    }

    #[test]
    fn finish_only_accepts_the_active_generation() {
        let mut tracker = RequestTracker::default();
        let first = tracker.begin();
        let second = tracker.begin();
        assert!(!tracker.finish(first.generation));
        assert!(tracker.in_flight());
        assert!(tracker.finish(second.generation));
        assert!(!tracker.in_flight());
        assert!(!tracker.finish(second.generation));
    }
}
