//! iCalendar core models (RFC 5545).

mod datetime;
mod duration;
mod property;

pub use datetime::{ResolvedDateTime, format_instant};
pub use duration::IsoDuration;
pub use property::ContentLine;
