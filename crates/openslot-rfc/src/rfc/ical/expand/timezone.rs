//! Timezone resolution for iCalendar date-times.
//!
//! Uses ICU4X for Windows timezone ID to IANA mapping and timezone canonicalization.

use chrono::{DateTime, LocalResult, NaiveDateTime, TimeZone};
use chrono_tz::Tz;
use icu::time::zone::WindowsParser;
use icu::time::zone::iana::IanaParserExtended;
use std::collections::HashMap;
use std::str::FromStr;

/// Error during timezone conversion.
#[derive(Debug, thiserror::Error)]
pub enum ConversionError {
    /// Unknown or invalid timezone identifier.
    #[error("Unknown timezone: {0}")]
    UnknownTimezone(String),

    /// Local time that cannot be placed on the timeline.
    #[error("Non-existent time: {0}")]
    NonExistentTime(String),
}

/// Resolver for timezone identifiers.
///
/// Lives for one parse pass and caches resolved TZIDs, so repeated
/// `DTSTART;TZID=...` lines do not repeat the ICU lookups.
#[derive(Debug, Default)]
pub struct TimeZoneResolver {
    /// Cache of resolved IANA timezones by TZID.
    cache: HashMap<String, Tz>,
}

impl TimeZoneResolver {
    /// Creates a new timezone resolver.
    #[must_use]
    pub fn new() -> Self {
        Self {
            cache: HashMap::new(),
        }
    }

    /// ## Summary
    /// Resolves a timezone identifier to a `chrono_tz::Tz`.
    ///
    /// The TZID is normalized first (vendor prefixes, Windows names, IANA
    /// aliases) and then parsed as an IANA name.
    ///
    /// ## Errors
    ///
    /// Returns `ConversionError::UnknownTimezone` if the TZID cannot be resolved.
    ///
    /// ## Side Effects
    ///
    /// Caches successful resolutions to avoid repeated parsing.
    pub fn resolve(&mut self, tzid: &str) -> Result<Tz, ConversionError> {
        if let Some(tz) = self.cache.get(tzid) {
            return Ok(*tz);
        }

        let tz = Tz::from_str(tzid)
            .or_else(|_e| Tz::from_str(&normalize_tzid(tzid)))
            .map_err(|_e| ConversionError::UnknownTimezone(tzid.to_string()))?;

        self.cache.insert(tzid.to_string(), tz);

        Ok(tz)
    }
}

/// Normalizes common CalDAV/iCalendar timezone identifiers to IANA names.
///
/// Many calendar clients use non-standard TZID values (Outlook sends Windows
/// names, older Mozilla clients prefix the IANA id).
fn normalize_tzid(tzid: &str) -> String {
    let stripped = tzid
        .strip_prefix("/mozilla.org/20070129_1/")
        .or_else(|| tzid.strip_prefix("/mozilla.org/"))
        .or_else(|| tzid.strip_prefix("/softwarestudio.org/"))
        .or_else(|| tzid.strip_prefix("/citadel.org/"))
        .unwrap_or(tzid)
        .trim_matches('"');

    // Windows names map to a BCP-47 zone first
    let windows_parser = WindowsParser::new();
    if let Some(tz) = windows_parser.parse(stripped, None) {
        let iana_parser = IanaParserExtended::new();
        for entry in iana_parser.iter() {
            if entry.time_zone == tz {
                return entry.canonical.to_string();
            }
        }
    }

    // Canonicalize aliases such as Europe/Kiev -> Europe/Kyiv
    let iana_parser = IanaParserExtended::new();
    let parsed = iana_parser.parse(stripped);
    if parsed.time_zone != icu::time::TimeZone::UNKNOWN {
        return parsed.canonical.to_string();
    }

    stripped.to_string()
}

/// ## Summary
/// Places a wall-clock time in a timezone.
///
/// Ambiguous times (DST fold) take the earlier instant. Times inside a DST
/// gap are shifted forward by one hour.
#[must_use]
pub fn localize(local_time: NaiveDateTime, tz: Tz) -> Option<DateTime<Tz>> {
    match tz.from_local_datetime(&local_time) {
        LocalResult::Single(dt) => Some(dt),
        LocalResult::Ambiguous(earliest, _latest) => Some(earliest),
        LocalResult::None => {
            let shifted = local_time.checked_add_signed(chrono::TimeDelta::hours(1))?;
            tz.from_local_datetime(&shifted).earliest()
        }
    }
}

/// ## Summary
/// Interprets a wall-clock time in `tzid` and re-expresses it in `reference`.
///
/// ## Errors
///
/// Returns an error if the TZID is unknown or the wall-clock time cannot be
/// placed in that zone.
///
/// ## Side Effects
///
/// Updates the resolver's cache if a new timezone is resolved.
pub fn convert_to_reference(
    local_time: NaiveDateTime,
    tzid: Option<&str>,
    reference: Tz,
    resolver: &mut TimeZoneResolver,
) -> Result<DateTime<Tz>, ConversionError> {
    let source = match tzid {
        Some(tzid) => resolver.resolve(tzid)?,
        None => reference,
    };

    localize(local_time, source)
        .map(|dt| dt.with_timezone(&reference))
        .ok_or_else(|| ConversionError::NonExistentTime(format!("{local_time} in {source}")))
}
