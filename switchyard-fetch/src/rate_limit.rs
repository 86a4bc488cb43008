//! Process-wide minimum-interval rate limiter.
//!
//! One limiter guards every outbound call, regardless of provider. That is a
//! known limitation: a slow provider's spacing also delays a fast one.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::trace;

use crate::error::TransportError;

/// Serializes call start times so no two starts are closer than
/// `min_interval`.
///
/// Slots are reserved under a lock and then awaited outside it, so
/// concurrent callers queue up one interval apart without holding the lock
/// while they sleep.
#[derive(Debug)]
pub struct RateLimiter {
    min_interval: Duration,
    next_slot: Mutex<Option<Instant>>,
}

impl RateLimiter {
    /// Creates a limiter.
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            next_slot: Mutex::new(None),
        }
    }

    /// Returns the configured interval.
    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Waits until the caller may start a call.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Cancelled`] if `cancel` fires while waiting.
    pub async fn await_slot(&self, cancel: &CancellationToken) -> Result<(), TransportError> {
        let slot = self.reserve().await;
        let wait = slot.saturating_duration_since(Instant::now());
        if wait.is_zero() {
            return Ok(());
        }

        trace!(wait_ms = wait.as_millis(), "Waiting for rate-limit slot");
        tokio::select! {
            () = cancel.cancelled() => Err(TransportError::Cancelled),
            () = tokio::time::sleep_until(slot) => Ok(()),
        }
    }

    async fn reserve(&self) -> Instant {
        let mut next = self.next_slot.lock().await;
        let now = Instant::now();
        let slot = match *next {
            Some(reserved) if reserved > now => reserved,
            _ => now,
        };
        *next = Some(slot + self.min_interval);
        slot
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(Duration::from_millis(500))
    }
}
