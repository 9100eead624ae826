//! Protocol-level parsing: iCalendar content and `WebDAV`/CalDAV XML.

pub mod dav;
pub mod ical;
