//! Resolved date-time values.

use chrono::DateTime;
use chrono_tz::Tz;

/// A DATE or DATE-TIME value projected into the reference timezone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedDateTime {
    /// The instant, expressed in the reference timezone.
    pub instant: DateTime<Tz>,
    /// Whether the source value was date-only (`VALUE=DATE` or `YYYYMMDD`).
    pub is_date: bool,
}

/// Formats an instant as an offset-qualified timestamp without a zone name,
/// e.g. `2024-01-01T05:00:00+00:00`.
#[must_use]
pub fn format_instant(instant: &DateTime<Tz>) -> String {
    instant.format("%Y-%m-%dT%H:%M:%S%:z").to_string()
}
