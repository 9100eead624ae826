//! Timezone handling for resolved date-time values.

mod timezone;

pub use timezone::{ConversionError, TimeZoneResolver, convert_to_reference, localize};
