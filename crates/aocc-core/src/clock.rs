//! Clock providers.
//!
//! Every deadline in the console (toast expiry, recommendation countdown,
//! delayed navigation) is measured against a [`Clock`] so tests can drive
//! time by hand instead of sleeping.
//!
//! - [`SystemClock`] - wall clock and `std::time::Instant`
//! - [`TokioClock`] - follows tokio's clock, so `tokio::time::pause()` works
//! - [`ManualClock`] - only moves when [`ManualClock::advance`] is called

use std::sync::Mutex;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};

use crate::error::{AoccError, Result};

/// Longest delay any console timer accepts (one day).
pub const MAX_TIMER_DELAY: Duration = Duration::from_secs(24 * 60 * 60);

/// Deadline `delay` after `now`.
///
/// Fails with `TimerOutOfRange` instead of overflowing when `delay` is
/// longer than [`MAX_TIMER_DELAY`] or the instant cannot be represented.
pub fn deadline_after(now: Instant, delay: Duration) -> Result<Instant> {
    let out_of_range = || AoccError::TimerOutOfRange {
        delay_ms: u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
        max_ms: MAX_TIMER_DELAY.as_millis() as u64,
    };
    if delay > MAX_TIMER_DELAY {
        return Err(out_of_range());
    }
    now.checked_add(delay).ok_or_else(out_of_range)
}

/// Source of monotonic time for deadlines and wall time for display.
pub trait Clock: Send + Sync {
    /// Monotonic instant used for deadlines.
    fn now(&self) -> Instant;

    /// Wall-clock time used for display timestamps.
    fn wall_now(&self) -> DateTime<Utc>;
}

/// Real system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn wall_now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Time as seen by the tokio runtime.
///
/// Under `tokio::time::pause()` this clock advances only when the runtime
/// auto-advances or `tokio::time::advance` is called.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

impl Clock for TokioClock {
    fn now(&self) -> Instant {
        tokio::time::Instant::now().into_std()
    }

    fn wall_now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Hand-driven clock for deterministic tests.
#[derive(Debug)]
pub struct ManualClock {
    origin: Instant,
    wall_origin: DateTime<Utc>,
    elapsed: Mutex<Duration>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualClock {
    /// Create a clock frozen at the current moment.
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            wall_origin: Utc::now(),
            elapsed: Mutex::new(Duration::ZERO),
        }
    }

    /// Move time forward.
    pub fn advance(&self, by: Duration) {
        let mut elapsed = self.elapsed.lock().unwrap_or_else(|e| e.into_inner());
        *elapsed += by;
    }

    /// Move time forward by a number of milliseconds.
    pub fn advance_millis(&self, millis: u64) {
        self.advance(Duration::from_millis(millis));
    }

    /// Total time advanced since creation.
    pub fn elapsed(&self) -> Duration {
        *self.elapsed.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + self.elapsed()
    }

    fn wall_now(&self) -> DateTime<Utc> {
        let elapsed = chrono::Duration::from_std(self.elapsed()).unwrap_or(chrono::Duration::zero());
        self.wall_origin + elapsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_only_moves_on_advance() {
        let clock = ManualClock::new();
        let t0 = clock.now();
        assert_eq!(clock.now(), t0);

        clock.advance_millis(1500);
        assert_eq!(clock.now() - t0, Duration::from_millis(1500));
        assert_eq!(clock.elapsed(), Duration::from_millis(1500));
    }

    #[test]
    fn test_manual_clock_wall_tracks_monotonic() {
        let clock = ManualClock::new();
        let w0 = clock.wall_now();
        clock.advance(Duration::from_secs(30));
        assert_eq!((clock.wall_now() - w0).num_seconds(), 30);
    }

    #[test]
    fn test_deadline_after_rejects_huge_delays() {
        let now = Instant::now();
        assert_eq!(deadline_after(now, Duration::from_secs(30)).unwrap(), now + Duration::from_secs(30));
        assert!(deadline_after(now, MAX_TIMER_DELAY).is_ok());

        let err = deadline_after(now, Duration::MAX).unwrap_err();
        assert!(matches!(err, AoccError::TimerOutOfRange { delay_ms: u64::MAX, .. }));
        assert!(deadline_after(now, MAX_TIMER_DELAY + Duration::from_millis(1)).is_err());
    }

    #[test]
    fn test_system_clock_monotonic() {
        let clock = SystemClock;
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
    }
}
