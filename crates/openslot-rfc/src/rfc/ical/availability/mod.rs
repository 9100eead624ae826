//! Busy-interval extraction from iCalendar documents.
//!
//! Turns raw VEVENT data into [`AvailabilityEvent`]s that overlap a daily
//! work window. Everything here is synchronous and pure.

mod assembler;
mod event;
mod window;

pub use assembler::{AssemblerState, AvailabilityParser, parse_availability};
pub use event::{AvailabilityEvent, PendingEvent};
pub use window::{MINUTES_PER_DAY, WindowPolicy, WorkWindow};
