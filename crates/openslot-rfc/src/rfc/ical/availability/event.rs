//! Event types produced and consumed by the assembler.

use chrono::DateTime;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::rfc::ical::core::IsoDuration;

/// A busy interval as served to clients.
///
/// `start` and `end` are offset-qualified timestamps in the reference
/// timezone, e.g. `2024-01-01T05:00:00+00:00`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityEvent {
    pub start: String,
    pub end: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

/// Accumulator for the properties of one `BEGIN:VEVENT` … `END:VEVENT` block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingEvent {
    pub start: Option<DateTime<Tz>>,
    pub end: Option<DateTime<Tz>>,
    pub duration: Option<IsoDuration>,
    pub title: Option<String>,
    pub id: Option<String>,
    pub start_is_date: bool,
    pub end_is_date: bool,
}

impl PendingEvent {
    /// Whether either bound was given as a DATE value.
    #[must_use]
    pub fn is_all_day(&self) -> bool {
        self.start_is_date || self.end_is_date
    }

    /// ## Summary
    /// Determines the end of the event.
    ///
    /// Uses the explicit end if present, then `start + duration`, then one
    /// day after a date-only start. Returns `None` when no end can be
    /// determined.
    #[must_use]
    pub fn resolve_end(&self) -> Option<DateTime<Tz>> {
        if let Some(end) = self.end {
            return Some(end);
        }
        let start = self.start?;
        if let Some(duration) = self.duration {
            return duration.add_to(start);
        }
        if self.start_is_date {
            return IsoDuration::days(1).add_to(start);
        }
        None
    }
}
