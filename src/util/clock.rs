use chrono::{DateTime, TimeDelta, Utc};

/// Injectable time source.
///
/// The statement fetch window is derived from "now", which also makes it part of the memoization
/// key. Substituting a fixed clock gives tests deterministic windows and cache keys.
pub trait Clock: Send + Sync {
    /// The current instant.
    fn now(&self) -> DateTime<Utc>;

    /// Epoch second where a `days`-long lookback window begins.
    ///
    /// Exactly `days` whole days before [`Clock::now`], floored to a whole second. A lookback
    /// reaching past the representable time range clamps to the earliest instant.
    fn window_start(&self, days: u32) -> i64 {
        self.now()
            .checked_sub_signed(TimeDelta::days(i64::from(days)))
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
            .timestamp()
    }
}

/// Wall clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock frozen at a fixed instant.
#[derive(Clone, Copy, Debug)]
pub struct FixedClock(pub DateTime<Utc>);

impl FixedClock {
    /// Clock frozen at `secs` seconds after the Unix epoch.
    ///
    /// # Panics
    ///
    /// Panics when `secs` is outside the representable range.
    pub fn at(secs: i64) -> Self {
        Self(DateTime::from_timestamp(secs, 0).expect("timestamp out of range"))
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
