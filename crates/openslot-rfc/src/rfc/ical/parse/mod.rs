//! iCalendar parsing primitives (RFC 5545).
//!
//! - Lexer: line unfolding and content line splitting
//! - Values: DATE / DATE-TIME resolution and DURATION parsing

mod error;
mod lexer;
mod values;

pub use error::{ParseError, ParseErrorKind, ParseResult};
pub use lexer::{parse_content_line, unfold_lines};
pub use values::{is_date_value, parse_duration, parse_local_datetime, resolve_datetime};
