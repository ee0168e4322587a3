//! A settable [`Clock`] for deterministic scheduling.

use chrono::{DateTime, Duration, Local, Utc};
use mockable::Clock;
use std::sync::{PoisonError, RwLock};

/// Clock frozen at a chosen instant until moved explicitly.
#[derive(Debug)]
pub struct FixedClock {
    now: RwLock<DateTime<Utc>>,
}

impl FixedClock {
    /// Freezes the clock at `now`.
    #[must_use]
    pub const fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: RwLock::new(now),
        }
    }

    /// Moves the clock to `now`.
    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.write().unwrap_or_else(PoisonError::into_inner) = now;
    }

    /// Moves the clock forward by `delta`.
    pub fn advance(&self, delta: Duration) {
        let mut now = self.now.write().unwrap_or_else(PoisonError::into_inner);
        *now = now.checked_add_signed(delta).unwrap_or(*now);
    }
}

impl Clock for FixedClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.now.read().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::FixedClock;
    use chrono::{Duration, TimeZone, Utc};
    use mockable::Clock;
    use rstest::rstest;

    #[rstest]
    fn clock_moves_only_when_told() {
        let start = Utc.with_ymd_and_hms(2025, 6, 1, 8, 0, 0).single().expect("valid instant");
        let clock = FixedClock::new(start);
        assert_eq!(clock.utc(), start);

        clock.advance(Duration::hours(2));
        assert_eq!(clock.utc(), start + Duration::hours(2));

        clock.set(start);
        assert_eq!(clock.utc(), start);
    }
}
