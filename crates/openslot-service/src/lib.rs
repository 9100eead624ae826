pub mod availability;
pub mod caldav;
pub mod calendars;
pub mod error;
pub mod selection;
pub mod store;
