//! Sliding-window rate limiting for store API callouts
//!
//! Every call to the tabular store goes through [`RateLimiter::acquire`] first.
//! Callouts may burst up to the configured limit; once the limit is reached
//! within the trailing minute, the caller is paused until the oldest callout
//! ages out of the window.
//!
//! # Example
//!
//! ```
//! use linksync::limiter::RateLimiter;
//!
//! # async fn example() {
//! let mut limiter = RateLimiter::new(60);
//! limiter.acquire().await;
//! // ... call the store
//! # }
//! ```

mod window;

pub use window::CalloutWindow;

use std::time::Duration;
use tokio::time::Instant;

/// Default callouts allowed per minute
pub const DEFAULT_RATE_LIMIT: u32 = 60;

/// Length of the rate limiting window
pub const RATE_WINDOW: Duration = Duration::from_secs(60);

/// Per-process limiter for store callouts
///
/// The limiter is owned by a single pipeline and passed by `&mut` to each
/// stage, so no synchronization is needed.
#[derive(Debug)]
pub struct RateLimiter {
    window: CalloutWindow,
    total_paused: Duration,
}

impl RateLimiter {
    /// Creates a limiter allowing `callouts_per_minute` callouts per minute
    pub fn new(callouts_per_minute: u32) -> Self {
        Self::with_window(callouts_per_minute, RATE_WINDOW)
    }

    /// Creates a limiter with a custom window length
    pub fn with_window(limit: u32, window: Duration) -> Self {
        Self {
            window: CalloutWindow::new(limit as usize, window),
            total_paused: Duration::ZERO,
        }
    }

    /// Waits until another callout is allowed, then records it
    ///
    /// This never fails. The pause is a plain sleep; the pipelines are batch
    /// jobs with nothing else to do in the meantime.
    pub async fn acquire(&mut self) {
        if let Some(pause) = self.window.record(Instant::now()) {
            tracing::info!(
                "Pausing {:.1} sec. to respect store API rate limit of {} callouts per minute",
                pause.as_secs_f64(),
                self.window.limit()
            );
            self.total_paused += pause;
            tokio::time::sleep(pause).await;
        }
    }

    /// Returns the total time spent paused so far
    pub fn total_paused(&self) -> Duration {
        self.total_paused
    }

    /// Returns the configured callout limit
    pub fn limit(&self) -> usize {
        self.window.limit()
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_RATE_LIMIT)
    }
}
