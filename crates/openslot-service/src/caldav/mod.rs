//! Remote calendar access over `CalDAV`.

mod client;

use std::future::Future;
use std::pin::Pin;

use chrono::{DateTime, Duration, Utc};

use crate::error::ServiceResult;
use openslot_rfc::rfc::dav::core::{CalendarObject, RemoteCalendar};

pub use client::CaldavClient;

pub type SourceFuture<'a, T> = Pin<Box<dyn Future<Output = ServiceResult<T>> + Send + 'a>>;

/// A half-open UTC interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeRange {
    /// The range from `start` spanning `length`.
    #[must_use]
    pub fn starting_at(start: DateTime<Utc>, length: Duration) -> Self {
        Self {
            start,
            end: start + length,
        }
    }
}

/// Source of calendars and their objects.
pub trait CalendarSource: Send + Sync {
    /// Lists the calendar collections of the account.
    fn list_calendars(&self) -> SourceFuture<'_, Vec<RemoteCalendar>>;

    /// Fetches the objects of a calendar with events in `range`.
    ///
    /// With `expand`, recurring events come back as individual instances.
    fn fetch_objects<'a>(
        &'a self,
        calendar: &'a RemoteCalendar,
        range: TimeRange,
        expand: bool,
    ) -> SourceFuture<'a, Vec<CalendarObject>>;
}
