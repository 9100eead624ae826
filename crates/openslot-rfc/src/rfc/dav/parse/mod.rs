//! `WebDAV` XML parsing.
//!
//! Parses the multistatus bodies a `CalDAV` server returns for PROPFIND and
//! REPORT, using the `quick-xml` crate.

mod error;
mod multistatus;

pub use error::{ParseError, ParseErrorKind, ParseResult};
pub use multistatus::parse_multistatus;
