//! Value type parsers for iCalendar (RFC 5545 §3.3).
//!
//! DATE and DATE-TIME values are resolved straight into the reference
//! timezone; nothing downstream needs the floating/zoned distinction.

use chrono::{FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeZone, Utc};
use chrono_tz::Tz;

use super::error::{ParseError, ParseErrorKind, ParseResult};
use crate::rfc::ical::core::{IsoDuration, ResolvedDateTime};
use crate::rfc::ical::expand::{TimeZoneResolver, convert_to_reference};

/// Returns whether a DTSTART/DTEND value is date-only.
///
/// True for `VALUE=DATE` or a value of exactly eight digits (`YYYYMMDD`).
#[must_use]
pub fn is_date_value(raw: &str, value_type: Option<&str>) -> bool {
    value_type.is_some_and(|v| v.eq_ignore_ascii_case("DATE"))
        || (raw.len() == 8 && raw.bytes().all(|b| b.is_ascii_digit()))
}

/// Parses a fixed-width run of ASCII digits.
fn digits(s: &str, range: std::ops::Range<usize>) -> Option<u32> {
    let part = s.get(range)?;
    if !part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    part.parse().ok()
}

/// Parses a DATE value (`YYYYMMDD`) from the first eight characters.
fn parse_date(s: &str, line: usize) -> ParseResult<NaiveDate> {
    let err = || ParseError::new(ParseErrorKind::InvalidDate, line).with_context(s.to_string());

    let year = digits(s, 0..4).ok_or_else(err)?;
    let month = digits(s, 4..6).ok_or_else(err)?;
    let day = digits(s, 6..8).ok_or_else(err)?;

    NaiveDate::from_ymd_opt(i32::try_from(year).map_err(|_e| err())?, month, day).ok_or_else(err)
}

/// Parses a DATE-TIME value of the form `YYYYMMDD"T"HHMM[SS][Z|±HHMM]`.
///
/// Seconds default to `00` when omitted. A leap second (`60`) is clamped to
/// `59`.
///
/// ## Errors
/// Returns `InvalidDateTime` if the value does not match the pattern or a
/// field is out of range.
pub fn parse_local_datetime(
    s: &str,
    line: usize,
) -> ParseResult<(NaiveDateTime, Option<FixedOffset>)> {
    let err = || ParseError::new(ParseErrorKind::InvalidDateTime, line).with_context(s.to_string());

    if !s.is_ascii() || s.as_bytes().get(8) != Some(&b'T') {
        return Err(err());
    }

    let date = parse_date(&s[..8], line).map_err(|_e| err())?;
    let hour = digits(s, 9..11).ok_or_else(err)?;
    let minute = digits(s, 11..13).ok_or_else(err)?;

    let mut rest = &s[13..];
    let mut second = 0;
    if let Some(parsed) = digits(rest, 0..2) {
        second = parsed.min(59);
        rest = &rest[2..];
    }

    let offset = match rest {
        "" => None,
        "Z" => Some(Utc.fix()),
        _ => Some(parse_offset(rest).ok_or_else(err)?),
    };

    let time = NaiveTime::from_hms_opt(hour, minute, second).ok_or_else(err)?;

    Ok((NaiveDateTime::new(date, time), offset))
}

/// Parses a `±HHMM` offset.
fn parse_offset(s: &str) -> Option<FixedOffset> {
    if s.len() != 5 {
        return None;
    }
    let sign = match s.as_bytes()[0] {
        b'+' => 1,
        b'-' => -1,
        _ => return None,
    };
    let hours = digits(s, 1..3)?;
    let minutes = digits(s, 3..5)?;
    if hours > 23 || minutes > 59 {
        return None;
    }
    let total = i32::try_from(hours * 3600 + minutes * 60).ok()?;
    FixedOffset::east_opt(sign * total)
}

/// ## Summary
/// Resolves a DTSTART/DTEND value into the reference timezone.
///
/// 1. Date-only values become local midnight in `tzid` (default: reference).
/// 2. Values with `Z` or `±HHMM` are absolute instants; `tzid` is ignored.
/// 3. Other values are wall-clock times in `tzid` (default: reference).
///
/// ## Errors
/// Returns an error if the value is malformed, the TZID is unknown, or the
/// wall-clock time cannot be placed.
pub fn resolve_datetime(
    raw: &str,
    tzid: Option<&str>,
    value_type: Option<&str>,
    reference: Tz,
    resolver: &mut TimeZoneResolver,
    line: usize,
) -> ParseResult<ResolvedDateTime> {
    let tz_err = |e: crate::rfc::ical::expand::ConversionError| {
        ParseError::new(ParseErrorKind::UnknownTimezone, line).with_context(e.to_string())
    };

    if is_date_value(raw, value_type) {
        let date = parse_date(raw, line)?;
        let midnight = date.and_time(NaiveTime::MIN);
        let instant = convert_to_reference(midnight, tzid, reference, resolver).map_err(tz_err)?;
        return Ok(ResolvedDateTime {
            instant,
            is_date: true,
        });
    }

    let (local, offset) = parse_local_datetime(raw, line)?;

    let instant = match offset {
        Some(offset) => offset
            .from_local_datetime(&local)
            .single()
            .map(|dt| dt.with_timezone(&reference))
            .ok_or_else(|| ParseError::new(ParseErrorKind::InvalidDateTime, line))?,
        None => convert_to_reference(local, tzid, reference, resolver).map_err(tz_err)?,
    };

    Ok(ResolvedDateTime {
        instant,
        is_date: false,
    })
}

/// Parses a DURATION value (ISO 8601).
///
/// Format: `[+|-]P[nY][nM][nW][nD][T[nH][nM][n[.f]S]]`, designators in
/// that order, case-insensitive, at least one component present.
///
/// ## Errors
/// Returns an error if the string is not a valid duration.
pub fn parse_duration(s: &str, line: usize) -> ParseResult<IsoDuration> {
    let err = || ParseError::new(ParseErrorKind::InvalidDuration, line).with_context(s.to_string());

    let upper = s.trim().to_ascii_uppercase();
    let mut dur = IsoDuration::zero();

    let body = if let Some(rest) = upper.strip_prefix('-') {
        dur.negative = true;
        rest
    } else {
        upper.strip_prefix('+').unwrap_or(upper.as_str())
    };
    let body = body.strip_prefix('P').ok_or_else(err)?;

    let (date_part, time_part) = match body.split_once('T') {
        Some((date, time)) => {
            if time.is_empty() {
                return Err(err());
            }
            (date, Some(time))
        }
        None => (body, None),
    };

    let mut seen_any = false;

    // Date designators must appear in this order
    let mut date_order = ['Y', 'M', 'W', 'D'].iter().peekable();
    for (number, designator) in duration_components(date_part).ok_or_else(err)? {
        if number.contains('.') {
            return Err(err());
        }
        while date_order.next_if(|d| **d != designator).is_some() {}
        if date_order.next().is_none() {
            return Err(err());
        }
        let value = number.parse::<u32>().map_err(|_e| err())?;
        match designator {
            'Y' => dur.years = value,
            'M' => dur.months = value,
            'W' => dur.weeks = value,
            _ => dur.days = value,
        }
        seen_any = true;
    }

    if let Some(time_part) = time_part {
        let mut time_order = ['H', 'M', 'S'].iter().peekable();
        for (number, designator) in duration_components(time_part).ok_or_else(err)? {
            while time_order.next_if(|d| **d != designator).is_some() {}
            if time_order.next().is_none() {
                return Err(err());
            }
            if designator == 'S' {
                let (whole, nanos) = parse_seconds(number).ok_or_else(err)?;
                dur.seconds = whole;
                dur.nanos = nanos;
            } else {
                if number.contains('.') {
                    return Err(err());
                }
                let value = number.parse::<u32>().map_err(|_e| err())?;
                if designator == 'H' {
                    dur.hours = value;
                } else {
                    dur.minutes = value;
                }
            }
            seen_any = true;
        }
    }

    if !seen_any {
        return Err(err());
    }

    Ok(dur)
}

/// Splits `1Y2M` into `[("1", 'Y'), ("2", 'M')]`. Returns `None` for a
/// designator without a number or trailing digits without a designator.
fn duration_components(s: &str) -> Option<Vec<(&str, char)>> {
    let mut components = Vec::new();
    let mut start = 0;
    for (i, c) in s.char_indices() {
        if c.is_ascii_digit() || c == '.' || c == ',' {
            continue;
        }
        if i == start {
            return None;
        }
        components.push((&s[start..i], c));
        start = i + c.len_utf8();
    }
    if start != s.len() {
        return None;
    }
    Some(components)
}

/// Parses `12` or `12.5` seconds into whole seconds and nanoseconds.
fn parse_seconds(s: &str) -> Option<(u32, u32)> {
    let normalized = s.replace(',', ".");
    let (whole, frac) = normalized
        .split_once('.')
        .unwrap_or((normalized.as_str(), ""));
    if whole.is_empty() || frac.len() > 9 || !frac.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let whole = whole.parse::<u32>().ok()?;
    let nanos = if frac.is_empty() {
        0
    } else {
        format!("{frac:0<9}").parse::<u32>().ok()?
    };
    Some((whole, nanos))
}
