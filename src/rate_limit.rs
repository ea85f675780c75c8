//! Process-wide ceiling on model invocations.
//!
//! Backed by a GCRA limiter whose state is a single atomic, so one instance
//! can be shared across concurrent pipelines without extra locking. Callers
//! that exceed the ceiling wait for capacity; nothing is dropped.

use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use std::num::NonZeroU32;
use std::time::Duration;
use tracing::debug;

/// Ceiling used when a zero limit is configured.
const DEFAULT_MAX_PER_WINDOW: u32 = 5;

/// Limits how many model invocations may start per window.
pub struct InvocationLimiter {
    limiter: RateLimiter<NotKeyed, InMemoryState, DefaultClock>,
    max_per_window: u32,
    window: Duration,
}

impl InvocationLimiter {
    /// Allow at most `max_per_minute` invocations per minute. Zero falls back to 5.
    pub fn per_minute(max_per_minute: u32) -> Self {
        Self::with_window(max_per_minute, Duration::from_secs(60))
    }

    /// Allow at most `max_per_window` invocations per `window`, with the full
    /// allowance available as an initial burst.
    pub fn with_window(max_per_window: u32, window: Duration) -> Self {
        let max_per_window = if max_per_window == 0 {
            DEFAULT_MAX_PER_WINDOW
        } else {
            max_per_window
        };
        let max = NonZeroU32::new(max_per_window).unwrap_or(NonZeroU32::MIN);
        let period = (window / max.get()).max(Duration::from_nanos(1));
        let quota = Quota::with_period(period)
            .unwrap_or_else(|| Quota::per_minute(max))
            .allow_burst(max);

        Self {
            limiter: RateLimiter::direct(quota),
            max_per_window: max.get(),
            window,
        }
    }

    /// Wait until another invocation is allowed, then claim it.
    pub async fn acquire(&self) {
        if self.limiter.check().is_err() {
            debug!(
                "Invocation ceiling of {} per {:?} reached; waiting",
                self.max_per_window, self.window
            );
            self.limiter.until_ready().await;
        }
    }

    /// Claim an invocation without waiting. Returns false if the ceiling is reached.
    #[cfg(test)]
    fn try_acquire(&self) -> bool {
        self.limiter.check().is_ok()
    }

    pub fn max_per_window(&self) -> u32 {
        self.max_per_window
    }
}
