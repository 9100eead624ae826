//! ISO 8601 durations as used by the DURATION property.

use chrono::{DateTime, Days, Months, TimeDelta};
use chrono_tz::Tz;

use crate::rfc::ical::expand::localize;

/// A signed ISO 8601 duration.
///
/// Calendar units (years, months, weeks, days) are kept apart from exact
/// units so that adding `P1D` across a DST change keeps the wall-clock time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IsoDuration {
    pub negative: bool,
    pub years: u32,
    pub months: u32,
    pub weeks: u32,
    pub days: u32,
    pub hours: u32,
    pub minutes: u32,
    pub seconds: u32,
    pub nanos: u32,
}

impl IsoDuration {
    /// Creates a zero duration.
    #[must_use]
    pub const fn zero() -> Self {
        Self {
            negative: false,
            years: 0,
            months: 0,
            weeks: 0,
            days: 0,
            hours: 0,
            minutes: 0,
            seconds: 0,
            nanos: 0,
        }
    }

    /// A positive duration of whole days.
    #[must_use]
    pub const fn days(days: u32) -> Self {
        Self {
            days,
            ..Self::zero()
        }
    }

    fn total_months(&self) -> u32 {
        self.years.saturating_mul(12).saturating_add(self.months)
    }

    fn total_days(&self) -> u64 {
        u64::from(self.weeks) * 7 + u64::from(self.days)
    }

    fn exact_delta(&self) -> Option<TimeDelta> {
        let secs = i64::from(self.hours) * 3600
            + i64::from(self.minutes) * 60
            + i64::from(self.seconds);
        TimeDelta::try_seconds(secs)?.checked_add(&TimeDelta::nanoseconds(i64::from(self.nanos)))
    }

    /// ## Summary
    /// Adds this duration to an instant.
    ///
    /// The calendar part is applied to the local date in the instant's
    /// timezone, the exact part is applied as elapsed time. Returns `None` on
    /// overflow or when the shifted wall-clock time cannot be placed.
    #[must_use]
    pub fn add_to(&self, instant: DateTime<Tz>) -> Option<DateTime<Tz>> {
        let months = self.total_months();
        let days = self.total_days();

        let shifted = if months == 0 && days == 0 {
            instant
        } else {
            let naive = instant.naive_local();
            let naive = if self.negative {
                naive
                    .checked_sub_months(Months::new(months))?
                    .checked_sub_days(Days::new(days))?
            } else {
                naive
                    .checked_add_months(Months::new(months))?
                    .checked_add_days(Days::new(days))?
            };
            localize(naive, instant.timezone())?
        };

        let delta = self.exact_delta()?;
        if self.negative {
            shifted.checked_sub_signed(delta)
        } else {
            shifted.checked_add_signed(delta)
        }
    }
}
