//! `WebDAV` core types.

mod calendar;
mod depth;
mod multistatus;
mod namespace;

pub use calendar::{CalendarObject, RemoteCalendar};
pub use depth::Depth;
pub use multistatus::{DavProperty, DavResponse, Multistatus};
pub use namespace::{APPLE_ICAL_NS, CALDAV_NS, CS_NS, DAV_NS};
