//! iCalendar (RFC 5545) support.
//!
//! Only the subset needed to turn calendar objects into busy intervals:
//! content-line lexing, DATE / DATE-TIME / DURATION values, TZID resolution,
//! and VEVENT assembly. Recurrence rules and VTIMEZONE blocks are not
//! interpreted; the server is expected to expand recurrences.

pub mod availability;
pub mod core;
pub mod expand;
pub mod parse;
