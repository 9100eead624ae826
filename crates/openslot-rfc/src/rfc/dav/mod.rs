//! `WebDAV` / `CalDAV` client-side protocol support (RFC 4918, RFC 4791).
//!
//! - `build`: request bodies for PROPFIND and calendar-query REPORT
//! - `parse`: multistatus response parsing
//! - `core`: the parsed response model

pub mod build;
pub mod core;
pub mod parse;
