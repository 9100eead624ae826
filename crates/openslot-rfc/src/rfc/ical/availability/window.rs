//! Work-window overlap filter.

use chrono::{DateTime, Timelike};
use chrono_tz::Tz;

use super::event::AvailabilityEvent;
use crate::rfc::ical::core::format_instant;

pub const MINUTES_PER_DAY: u32 = 24 * 60;

/// Daily bounds an event must overlap to count as busy time.
///
/// Only the time-of-day of the start and end is compared; the date is
/// ignored, so an event spanning midnight is judged by its clock times alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowPolicy {
    /// Minutes since local midnight, `[start, end)`.
    Minutes { start: u32, end: u32 },
    /// Whole hours, the legacy form.
    Hours { start_hour: u32, end_hour: u32 },
}

impl WindowPolicy {
    /// Minute-granular window. Both bounds are taken modulo one day.
    #[must_use]
    pub const fn minutes(start: u32, end: u32) -> Self {
        Self::Minutes {
            start: start % MINUTES_PER_DAY,
            end: end % MINUTES_PER_DAY,
        }
    }

    /// Hour-granular window.
    #[must_use]
    pub const fn hours(start_hour: u32, end_hour: u32) -> Self {
        Self::Hours {
            start_hour,
            end_hour,
        }
    }

    /// Whether an event with these bounds overlaps the window.
    #[must_use]
    pub fn overlaps(&self, start: &DateTime<Tz>, end: &DateTime<Tz>) -> bool {
        match *self {
            Self::Minutes {
                start: window_start,
                end: window_end,
            } => minutes_of_day(end) > window_start && minutes_of_day(start) < window_end,
            Self::Hours {
                start_hour,
                end_hour,
            } => !(end.hour() < start_hour || start.hour() >= end_hour),
        }
    }
}

fn minutes_of_day(instant: &DateTime<Tz>) -> u32 {
    instant.hour() * 60 + instant.minute()
}

/// A window policy plus the title stamped on every emitted event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkWindow {
    pub policy: WindowPolicy,
    pub booked_title: String,
}

impl WorkWindow {
    #[must_use]
    pub fn new(policy: WindowPolicy, booked_title: impl Into<String>) -> Self {
        Self {
            policy,
            booked_title: booked_title.into(),
        }
    }

    /// ## Summary
    /// Emits the event if it overlaps the window.
    ///
    /// The emitted title is always the booked title; the id passes through.
    #[must_use]
    pub fn admit(
        &self,
        start: &DateTime<Tz>,
        end: &DateTime<Tz>,
        id: Option<String>,
    ) -> Option<AvailabilityEvent> {
        if !self.policy.overlaps(start, end) {
            tracing::trace!(start = %start, end = %end, "Event outside work window");
            return None;
        }

        Some(AvailabilityEvent {
            start: format_instant(start),
            end: format_instant(end),
            title: Some(self.booked_title.clone()),
            id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32) -> DateTime<Tz> {
        Tz::UTC.with_ymd_and_hms(2024, 1, 1, h, m, 0).unwrap()
    }

    #[test]
    fn minutes_overlap_at_window_start() {
        let policy = WindowPolicy::minutes(360, 900);
        assert!(policy.overlaps(&at(5, 0), &at(7, 0)));
        assert!(policy.overlaps(&at(5, 0), &at(6, 1)));
    }

    #[test]
    fn minutes_touching_bounds_do_not_overlap() {
        let policy = WindowPolicy::minutes(360, 900);
        assert!(!policy.overlaps(&at(5, 0), &at(6, 0)));
        assert!(!policy.overlaps(&at(15, 0), &at(16, 0)));
        assert!(policy.overlaps(&at(14, 59), &at(16, 0)));
    }

    #[test]
    fn minutes_entirely_before_window() {
        let policy = WindowPolicy::minutes(360, 900);
        assert!(!policy.overlaps(&at(1, 0), &at(2, 0)));
    }

    #[test]
    fn minutes_wrap_modulo_one_day() {
        assert_eq!(
            WindowPolicy::minutes(1440 + 360, 900),
            WindowPolicy::Minutes {
                start: 360,
                end: 900
            }
        );
    }

    #[test]
    fn hours_policy_bounds() {
        let policy = WindowPolicy::hours(6, 15);
        assert!(policy.overlaps(&at(5, 0), &at(6, 0)));
        assert!(policy.overlaps(&at(14, 30), &at(16, 0)));
        assert!(!policy.overlaps(&at(4, 0), &at(5, 59)));
        assert!(!policy.overlaps(&at(15, 0), &at(16, 0)));
    }

    #[test]
    fn admit_replaces_title() {
        let window = WorkWindow::new(WindowPolicy::minutes(360, 900), "Busy");
        let event = window
            .admit(&at(9, 0), &at(10, 0), Some("uid-1".to_string()))
            .expect("inside window");
        assert_eq!(event.title.as_deref(), Some("Busy"));
        assert_eq!(event.id.as_deref(), Some("uid-1"));
        assert_eq!(event.start, "2024-01-01T09:00:00+00:00");
        assert_eq!(event.end, "2024-01-01T10:00:00+00:00");
    }
}
