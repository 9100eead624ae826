//! `WebDAV` / `CalDAV` request bodies.

pub mod request;

pub use request::{
    calendar_home_set_propfind, calendar_listing_propfind, calendar_query,
    current_user_principal_propfind, format_caldav_datetime,
};
