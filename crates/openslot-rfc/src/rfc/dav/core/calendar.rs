//! Calendar collections and objects as seen by a `CalDAV` client.

use super::multistatus::DavResponse;

/// A calendar collection discovered under the calendar home.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteCalendar {
    /// Collection URL; the raw href until the client resolves it.
    pub url: String,
    pub display_name: Option<String>,
    pub description: Option<String>,
    pub color: Option<String>,
    /// The `calendar-timezone` property, a VTIMEZONE document.
    pub timezone: Option<String>,
}

impl RemoteCalendar {
    /// ## Summary
    /// Builds a calendar from a PROPFIND response entry.
    ///
    /// Returns `None` unless the resource type includes `calendar`.
    #[must_use]
    pub fn from_response(response: &DavResponse) -> Option<Self> {
        if !response.has_resource_type("calendar") {
            return None;
        }
        Some(Self {
            url: response.href.clone(),
            display_name: response.text("displayname").map(str::to_string),
            description: response.text("calendar-description").map(str::to_string),
            color: response.text("calendar-color").map(str::to_string),
            timezone: response.text("calendar-timezone").map(str::to_string),
        })
    }
}

/// A calendar object resource returned by a calendar-query REPORT.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarObject {
    pub href: String,
    pub etag: Option<String>,
    /// Raw iCalendar text.
    pub data: String,
}

impl CalendarObject {
    /// Builds an object from a REPORT response entry. Entries without
    /// calendar data are skipped.
    #[must_use]
    pub fn from_response(response: &DavResponse) -> Option<Self> {
        let data = response.property("calendar-data")?;
        if data.text.trim().is_empty() {
            return None;
        }
        Some(Self {
            href: response.href.clone(),
            etag: response.text("getetag").map(str::to_string),
            data: data.text.clone(),
        })
    }
}
