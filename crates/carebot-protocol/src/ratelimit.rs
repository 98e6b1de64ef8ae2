//! Per-sender sliding-window rate limiting.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tracing::debug;

/// Time source for the limiter.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Hand-advanced clock. Clones share the same time.
#[derive(Debug, Clone)]
pub struct ManualClock {
    base: Instant,
    offset: Arc<Mutex<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            base: Instant::now(),
            offset: Arc::new(Mutex::new(Duration::ZERO)),
        }
    }

    pub fn advance(&self, by: Duration) {
        *self.offset.lock() += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.base + *self.offset.lock()
    }
}

/// Allows at most `max_calls` per identifier within any `window`.
pub struct RateLimiter<C: Clock = SystemClock> {
    max_calls: usize,
    window: Duration,
    clock: C,
    calls: Mutex<HashMap<String, VecDeque<Instant>>>,
}

impl RateLimiter<SystemClock> {
    pub fn new(max_calls: usize, window: Duration) -> Self {
        Self::with_clock(max_calls, window, SystemClock)
    }
}

impl<C: Clock> RateLimiter<C> {
    pub fn with_clock(max_calls: usize, window: Duration, clock: C) -> Self {
        Self {
            max_calls,
            window,
            clock,
            calls: Mutex::new(HashMap::new()),
        }
    }

    /// Record a call for `identifier` if it is under the limit.
    /// Rejected calls are not recorded.
    pub fn is_allowed(&self, identifier: &str) -> bool {
        let now = self.clock.now();
        let mut calls = self.calls.lock();
        let history = calls.entry(identifier.to_string()).or_default();
        Self::evict(history, now, self.window);

        if history.len() < self.max_calls {
            history.push_back(now);
            true
        } else {
            debug!("Rate limit reached ({} calls in window)", history.len());
            false
        }
    }

    /// Calls still available to `identifier` in the current window.
    pub fn remaining(&self, identifier: &str) -> usize {
        let now = self.clock.now();
        let mut calls = self.calls.lock();
        match calls.get_mut(identifier) {
            Some(history) => {
                Self::evict(history, now, self.window);
                self.max_calls.saturating_sub(history.len())
            }
            None => self.max_calls,
        }
    }

    /// Drop identifiers with no calls left in the window. Returns how many
    /// were dropped.
    pub fn prune(&self) -> usize {
        let now = self.clock.now();
        let mut calls = self.calls.lock();
        let before = calls.len();
        calls.retain(|_, history| {
            Self::evict(history, now, self.window);
            !history.is_empty()
        });
        before - calls.len()
    }

    /// Number of identifiers currently tracked.
    pub fn tracked(&self) -> usize {
        self.calls.lock().len()
    }

    fn evict(history: &mut VecDeque<Instant>, now: Instant, window: Duration) {
        while let Some(&oldest) = history.front() {
            if now.duration_since(oldest) >= window {
                history.pop_front();
            } else {
                break;
            }
        }
    }
}
