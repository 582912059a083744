use std::collections::VecDeque;
use std::time::Duration;
use tokio::time::Instant;

/// Sliding window of recent store callout timestamps
///
/// This is the bookkeeping half of the rate limiter: it records callouts and
/// computes how long the caller must pause, but never sleeps itself.
#[derive(Debug, Clone)]
pub struct CalloutWindow {
    /// Callout timestamps, oldest first
    callouts: VecDeque<Instant>,

    /// Maximum callouts allowed within one window
    limit: usize,

    /// Length of the trailing window
    window: Duration,
}

impl CalloutWindow {
    /// Creates an empty window
    ///
    /// A `limit` of zero is treated as one.
    pub fn new(limit: usize, window: Duration) -> Self {
        Self {
            callouts: VecDeque::new(),
            limit: limit.max(1),
            window,
        }
    }

    /// Records a callout made at `now` and returns the pause it requires
    ///
    /// # Steps
    ///
    /// 1. Drop timestamps older than one window before `now`
    /// 2. Append `now`
    /// 3. If the count reached the limit, the pause is the time until the
    ///    oldest remaining callout leaves the window
    ///
    /// # Returns
    ///
    /// * `Some(Duration)` - The caller must wait this long
    /// * `None` - The caller may proceed immediately
    pub fn record(&mut self, now: Instant) -> Option<Duration> {
        while let Some(&oldest) = self.callouts.front() {
            if now.saturating_duration_since(oldest) >= self.window {
                self.callouts.pop_front();
            } else {
                break;
            }
        }

        self.callouts.push_back(now);

        if self.callouts.len() < self.limit {
            return None;
        }

        let oldest = *self.callouts.front()?;
        let pause = (oldest + self.window).saturating_duration_since(now);
        if pause.is_zero() {
            None
        } else {
            Some(pause)
        }
    }

    /// Returns the number of callouts currently inside the window
    pub fn len(&self) -> usize {
        self.callouts.len()
    }

    /// Returns true if no callouts are recorded
    pub fn is_empty(&self) -> bool {
        self.callouts.is_empty()
    }

    /// Returns the configured callout limit
    pub fn limit(&self) -> usize {
        self.limit
    }
}
