//! XML namespace URIs.

/// `DAV:` namespace URI.
pub const DAV_NS: &str = "DAV:";

/// `CalDAV` namespace URI.
pub const CALDAV_NS: &str = "urn:ietf:params:xml:ns:caldav";

/// `CalendarServer` namespace URI.
pub const CS_NS: &str = "http://calendarserver.org/ns/";

/// Apple iCal namespace URI (calendar-color, calendar-order).
pub const APPLE_ICAL_NS: &str = "http://apple.com/ns/ical/";
