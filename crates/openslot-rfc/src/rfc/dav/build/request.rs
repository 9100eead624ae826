//! Request body serialization.

use chrono::{DateTime, Utc};
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};

use crate::rfc::dav::core::{APPLE_ICAL_NS, CALDAV_NS, CS_NS, DAV_NS};

/// Formats an instant for a `CalDAV` time-range: `YYYYMMDDTHHMMSSZ`.
#[must_use]
pub fn format_caldav_datetime(instant: &DateTime<Utc>) -> String {
    instant.format("%Y%m%dT%H%M%SZ").to_string()
}

/// PROPFIND body asking for `DAV:current-user-principal` (RFC 5397).
///
/// ## Errors
/// Returns an error if XML writing fails.
pub fn current_user_principal_propfind() -> Result<String, quick_xml::Error> {
    propfind(&["D:current-user-principal"])
}

/// PROPFIND body asking for `CALDAV:calendar-home-set`.
///
/// ## Errors
/// Returns an error if XML writing fails.
pub fn calendar_home_set_propfind() -> Result<String, quick_xml::Error> {
    propfind(&["C:calendar-home-set"])
}

/// PROPFIND body for listing the collections under a calendar home.
///
/// ## Errors
/// Returns an error if XML writing fails.
pub fn calendar_listing_propfind() -> Result<String, quick_xml::Error> {
    propfind(&[
        "D:resourcetype",
        "D:displayname",
        "C:calendar-description",
        "C:calendar-timezone",
        "C:supported-calendar-component-set",
        "I:calendar-color",
        "CS:getctag",
    ])
}

/// ## Summary
/// `CALDAV:calendar-query` REPORT body selecting VEVENTs in `[start, end)`.
///
/// With `expand`, the server is asked to return recurring events as
/// individual instances within the same range (RFC 4791 §9.6.5).
///
/// ## Errors
/// Returns an error if XML writing fails.
pub fn calendar_query(
    start: &DateTime<Utc>,
    end: &DateTime<Utc>,
    expand: bool,
) -> Result<String, quick_xml::Error> {
    let start = format_caldav_datetime(start);
    let end = format_caldav_datetime(end);

    let mut writer = Writer::new(Vec::new());
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;

    let mut root = BytesStart::new("C:calendar-query");
    root.push_attribute(("xmlns:D", DAV_NS));
    root.push_attribute(("xmlns:C", CALDAV_NS));
    writer.write_event(Event::Start(root))?;

    writer.write_event(Event::Start(BytesStart::new("D:prop")))?;
    writer.write_event(Event::Empty(BytesStart::new("D:getetag")))?;
    if expand {
        writer.write_event(Event::Start(BytesStart::new("C:calendar-data")))?;
        let mut expand_elem = BytesStart::new("C:expand");
        expand_elem.push_attribute(("start", start.as_str()));
        expand_elem.push_attribute(("end", end.as_str()));
        writer.write_event(Event::Empty(expand_elem))?;
        writer.write_event(Event::End(BytesEnd::new("C:calendar-data")))?;
    } else {
        writer.write_event(Event::Empty(BytesStart::new("C:calendar-data")))?;
    }
    writer.write_event(Event::End(BytesEnd::new("D:prop")))?;

    writer.write_event(Event::Start(BytesStart::new("C:filter")))?;
    let mut calendar_filter = BytesStart::new("C:comp-filter");
    calendar_filter.push_attribute(("name", "VCALENDAR"));
    writer.write_event(Event::Start(calendar_filter))?;
    let mut event_filter = BytesStart::new("C:comp-filter");
    event_filter.push_attribute(("name", "VEVENT"));
    writer.write_event(Event::Start(event_filter))?;
    let mut time_range = BytesStart::new("C:time-range");
    time_range.push_attribute(("start", start.as_str()));
    time_range.push_attribute(("end", end.as_str()));
    writer.write_event(Event::Empty(time_range))?;
    writer.write_event(Event::End(BytesEnd::new("C:comp-filter")))?;
    writer.write_event(Event::End(BytesEnd::new("C:comp-filter")))?;
    writer.write_event(Event::End(BytesEnd::new("C:filter")))?;

    writer.write_event(Event::End(BytesEnd::new("C:calendar-query")))?;

    into_string(writer)
}

/// Writes a `DAV:propfind` with the given prefixed property names.
fn propfind(props: &[&str]) -> Result<String, quick_xml::Error> {
    let mut writer = Writer::new(Vec::new());
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;

    let mut root = BytesStart::new("D:propfind");
    root.push_attribute(("xmlns:D", DAV_NS));
    root.push_attribute(("xmlns:C", CALDAV_NS));
    root.push_attribute(("xmlns:CS", CS_NS));
    root.push_attribute(("xmlns:I", APPLE_ICAL_NS));
    writer.write_event(Event::Start(root))?;

    writer.write_event(Event::Start(BytesStart::new("D:prop")))?;
    for prop in props {
        writer.write_event(Event::Empty(BytesStart::new(*prop)))?;
    }
    writer.write_event(Event::End(BytesEnd::new("D:prop")))?;

    writer.write_event(Event::End(BytesEnd::new("D:propfind")))?;

    into_string(writer)
}

fn into_string(writer: Writer<Vec<u8>>) -> Result<String, quick_xml::Error> {
    String::from_utf8(writer.into_inner()).map_err(|e| {
        tracing::error!("Generated invalid UTF-8 in request XML: {}", e);
        quick_xml::Error::Io(std::sync::Arc::new(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            "Invalid UTF-8 in XML output",
        )))
    })
}
