//! Wall-clock access and random timestamps within a lookback window.

use chrono::{DateTime, TimeDelta, Utc};
use rand::Rng;

/// Default lookback window: roughly nine months.
pub const DEFAULT_LOOKBACK_DAYS: u32 = 270;

/// Source of "now".
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// The system wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock frozen at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Window of recent history that session start times are drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimestampWindow {
    lookback: TimeDelta,
}

impl TimestampWindow {
    /// Window reaching `days` back from now.
    #[must_use]
    pub fn days(days: u32) -> Self {
        Self {
            lookback: TimeDelta::days(i64::from(days)),
        }
    }

    /// Length of the window.
    #[must_use]
    pub const fn lookback(&self) -> TimeDelta {
        self.lookback
    }

    /// Draw a whole-second instant uniformly from `[now - lookback, now]`.
    ///
    /// Both ends are inclusive. When `now` has a fractional second the
    /// bounds are rounded inward so the result never leaves the window.
    pub fn sample<R: Rng + ?Sized>(&self, now: DateTime<Utc>, rng: &mut R) -> DateTime<Utc> {
        let start = now
            .checked_sub_signed(self.lookback)
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        let earliest = if start.timestamp_subsec_nanos() == 0 {
            start.timestamp()
        } else {
            start.timestamp() + 1
        };
        let latest = now.timestamp();
        if earliest > latest {
            // empty window around a fractional `now`
            return now;
        }

        let secs = rng.random_range(earliest..=latest);
        DateTime::from_timestamp(secs, 0).unwrap_or(now)
    }
}

impl Default for TimestampWindow {
    fn default() -> Self {
        Self::days(DEFAULT_LOOKBACK_DAYS)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{TimeZone, Timelike};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 14, 15, 9, 26).unwrap() + TimeDelta::milliseconds(535)
    }

    #[test]
    fn test_system_clock_is_recent() {
        let before = Utc::now();
        let now = SystemClock.now();
        assert!(now >= before);
    }

    #[test]
    fn test_fixed_clock() {
        assert_eq!(FixedClock(fixed_now()).now(), fixed_now());
    }

    #[test]
    fn test_samples_stay_inside_window() {
        let now = fixed_now();
        let window = TimestampWindow::default();
        let mut rng = StdRng::seed_from_u64(270);
        for _ in 0..10_000 {
            let ts = window.sample(now, &mut rng);
            assert!(ts <= now);
            assert!(ts >= now - window.lookback());
            assert_eq!(ts.nanosecond(), 0);
        }
    }

    #[test]
    fn test_zero_day_window() {
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(TimestampWindow::days(0).sample(now, &mut rng), now);
    }

    #[test]
    fn test_samples_spread_across_window() {
        let now = fixed_now();
        let window = TimestampWindow::days(10);
        let mut rng = StdRng::seed_from_u64(9);
        let midpoint = now - TimeDelta::days(5);
        let older = (0..1_000)
            .filter(|_| window.sample(now, &mut rng) < midpoint)
            .count();
        assert!((300..700).contains(&older), "skewed sample: {older}");
    }

    #[test]
    fn test_same_seed_same_timestamps() {
        let now = fixed_now();
        let window = TimestampWindow::default();
        let a: Vec<_> = {
            let mut rng = StdRng::seed_from_u64(5);
            (0..5).map(|_| window.sample(now, &mut rng)).collect()
        };
        let b: Vec<_> = {
            let mut rng = StdRng::seed_from_u64(5);
            (0..5).map(|_| window.sample(now, &mut rng)).collect()
        };
        assert_eq!(a, b);
    }
}
