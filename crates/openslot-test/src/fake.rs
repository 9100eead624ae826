//! In-memory calendar source.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};

use openslot_rfc::rfc::dav::core::{CalendarObject, RemoteCalendar};
use openslot_service::caldav::{CalendarSource, SourceFuture, TimeRange};
use openslot_service::error::ServiceError;

/// A calendar source backed by fixed data.
///
/// Calendars are listed in insertion order; each object body is returned
/// for any time range.
#[derive(Debug, Default)]
pub struct FakeCalendarSource {
    calendars: Vec<RemoteCalendar>,
    objects: HashMap<String, Vec<CalendarObject>>,
    failing: HashSet<String>,
    fail_listing: bool,
    list_calls: AtomicUsize,
    fetch_calls: AtomicUsize,
}

impl FakeCalendarSource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a calendar with one object per ICS document.
    #[must_use]
    pub fn with_calendar(
        mut self,
        url: &str,
        display_name: Option<&str>,
        documents: &[String],
    ) -> Self {
        self.calendars.push(RemoteCalendar {
            url: url.to_string(),
            display_name: display_name.map(str::to_string),
            description: None,
            color: None,
            timezone: None,
        });
        let objects = documents
            .iter()
            .enumerate()
            .map(|(i, data)| CalendarObject {
                href: format!("{url}event-{i}.ics"),
                etag: Some(format!("\"{i}\"")),
                data: data.clone(),
            })
            .collect();
        self.objects.insert(url.to_string(), objects);
        self
    }

    /// Makes object fetches for `url` fail with an upstream error.
    #[must_use]
    pub fn with_failing_calendar(mut self, url: &str) -> Self {
        self.failing.insert(url.to_string());
        self
    }

    /// Makes calendar listing fail with an upstream error.
    #[must_use]
    pub fn with_failing_listing(mut self) -> Self {
        self.fail_listing = true;
        self
    }

    #[must_use]
    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }
}

impl CalendarSource for FakeCalendarSource {
    fn list_calendars(&self) -> SourceFuture<'_, Vec<RemoteCalendar>> {
        Box::pin(async move {
            self.list_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_listing {
                return Err(ServiceError::UpstreamStatus {
                    status: 401,
                    url: "https://caldav.example.com/".to_string(),
                });
            }
            Ok(self.calendars.clone())
        })
    }

    fn fetch_objects<'a>(
        &'a self,
        calendar: &'a RemoteCalendar,
        _range: TimeRange,
        _expand: bool,
    ) -> SourceFuture<'a, Vec<CalendarObject>> {
        Box::pin(async move {
            self.fetch_calls.fetch_add(1, Ordering::SeqCst);
            if self.failing.contains(&calendar.url) {
                return Err(ServiceError::UpstreamStatus {
                    status: 503,
                    url: calendar.url.clone(),
                });
            }
            Ok(self.objects.get(&calendar.url).cloned().unwrap_or_default())
        })
    }
}
