//! Session time.
//!
//! Monotonic time is measured as a [`Duration`] since the session started;
//! wall time is only needed for the day-granular meditation marker.

use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub trait Clock: Send + Sync {
    /// Monotonic time since session start.
    fn now(&self) -> Duration;

    /// Wall-clock time, used for calendar comparisons.
    fn wall_now(&self) -> DateTime<Utc>;
}

/// Real time. Built on `tokio::time::Instant` so paused-time tests drive it too.
#[derive(Debug, Clone)]
pub struct SystemClock {
    started: tokio::time::Instant,
    wall_origin: DateTime<Utc>,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            started: tokio::time::Instant::now(),
            wall_origin: Utc::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.started.elapsed()
    }

    fn wall_now(&self) -> DateTime<Utc> {
        let elapsed = chrono::Duration::from_std(self.now()).unwrap_or_else(|_| chrono::Duration::zero());
        self.wall_origin + elapsed
    }
}

#[derive(Debug)]
struct ManualState {
    elapsed: Duration,
    wall_origin: DateTime<Utc>,
}

/// Virtual clock for tests. Clones share the same time.
#[derive(Debug, Clone)]
pub struct ManualClock {
    inner: Arc<Mutex<ManualState>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::starting_at(Utc::now())
    }

    pub fn starting_at(wall_origin: DateTime<Utc>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ManualState {
                elapsed: Duration::ZERO,
                wall_origin,
            })),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut state = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        state.elapsed += by;
    }

    pub fn advance_ms(&self, ms: u64) {
        self.advance(Duration::from_millis(ms));
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).elapsed
    }

    fn wall_now(&self) -> DateTime<Utc> {
        let state = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        let elapsed = chrono::Duration::from_std(state.elapsed).unwrap_or_else(|_| chrono::Duration::zero());
        state.wall_origin + elapsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_manual_clock_shared_between_clones() {
        let clock = ManualClock::new();
        let view = clock.clone();
        clock.advance_ms(1500);
        assert_eq!(view.now(), Duration::from_millis(1500));
    }

    #[test]
    fn test_manual_wall_time_follows_elapsed() {
        let origin = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let clock = ManualClock::starting_at(origin);
        clock.advance(Duration::from_secs(3600));
        assert_eq!(clock.wall_now(), origin + chrono::Duration::hours(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_system_clock_follows_paused_tokio_time() {
        let clock = SystemClock::new();
        tokio::time::advance(Duration::from_secs(2)).await;
        assert!(clock.now() >= Duration::from_secs(2));
    }
}
