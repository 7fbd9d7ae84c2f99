//! Injectable time source.
//!
//! Everything time-dependent in this crate (timestamp generation, skew
//! enforcement, bewit expiry) reads through a [`Clock`], so hosts and tests
//! can substitute their own.  [`SystemClock`] is the default and reads the
//! operating system clock.

use std::time::{SystemTime, UNIX_EPOCH};

/// A source of the current time.
pub trait Clock: Send + Sync {
    /// Milliseconds since the Unix epoch.
    fn now_ms(&self) -> i64;
}

/// The default clock, reading the operating system time.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        match SystemTime::now().duration_since(UNIX_EPOCH) {
            Ok(elapsed) => elapsed.as_millis() as i64,
            // A pre-epoch system clock; treat as the epoch itself.
            Err(_) => 0,
        }
    }
}

/// A clock frozen at a fixed instant, for tests and replay.
pub struct FixedClock(pub i64);

impl Clock for FixedClock {
    fn now_ms(&self) -> i64 {
        self.0
    }
}

pub(crate) fn now_ms(clock: &dyn Clock, offset_ms: i64) -> i64 {
    clock.now_ms() + offset_ms
}

pub(crate) fn now_sec(clock: &dyn Clock, offset_ms: i64) -> i64 {
    now_ms(clock, offset_ms).div_euclid(1000)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn fixed_clock_applies_offset() {
        let clock = FixedClock(1356420407000);
        assert_eq!(now_ms(&clock, 0), 1356420407000);
        assert_eq!(now_ms(&clock, -7000), 1356420400000);
        assert_eq!(now_sec(&clock, 0), 1356420407);
    }

    #[test]
    fn now_sec_floors_toward_negative_infinity() {
        let clock = FixedClock(-1500);
        assert_eq!(now_sec(&clock, 0), -2);
    }

    #[test]
    fn system_clock_is_past_2020() {
        assert!(SystemClock.now_ms() > 1_577_836_800_000);
    }
}
