//! Circuit breaker shared by the HTTP sources.
//!
//! When a provider answers 403 (IP ban) or keeps failing, the breaker trips
//! and refuses further requests for a cooldown period so one bad provider
//! does not stall every section of a render on retries.

use std::cell::Cell;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakerState {
    /// Requests are allowed.
    Closed,
    /// All requests are refused until the cooldown expires.
    Open { tripped_at: Instant },
}

#[derive(Debug)]
pub struct CircuitBreaker {
    state: Cell<BreakerState>,
    cooldown: Duration,
    consecutive_failures: Cell<u32>,
    failure_threshold: u32,
}

impl CircuitBreaker {
    pub fn new(cooldown: Duration, failure_threshold: u32) -> Self {
        Self {
            state: Cell::new(BreakerState::Closed),
            cooldown,
            consecutive_failures: Cell::new(0),
            failure_threshold: failure_threshold.max(1),
        }
    }

    /// Check if requests are currently allowed.
    pub fn is_allowed(&self) -> bool {
        match self.state.get() {
            BreakerState::Closed => true,
            BreakerState::Open { tripped_at } => {
                if tripped_at.elapsed() >= self.cooldown {
                    self.state.set(BreakerState::Closed);
                    self.consecutive_failures.set(0);
                    true
                } else {
                    false
                }
            }
        }
    }

    pub fn record_success(&self) {
        self.consecutive_failures.set(0);
    }

    /// Record a failure; trips once the threshold is reached.
    pub fn record_failure(&self) {
        let failures = self.consecutive_failures.get() + 1;
        self.consecutive_failures.set(failures);
        if failures >= self.failure_threshold {
            self.trip();
        }
    }

    /// Immediately trip the breaker (403 Forbidden).
    pub fn trip(&self) {
        self.state.set(BreakerState::Open {
            tripped_at: Instant::now(),
        });
    }

    /// Remaining cooldown (zero if not tripped).
    pub fn remaining_cooldown(&self) -> Duration {
        match self.state.get() {
            BreakerState::Closed => Duration::ZERO,
            BreakerState::Open { tripped_at } => self.cooldown.saturating_sub(tripped_at.elapsed()),
        }
    }
}
