//! Content line lexer for iCalendar (RFC 5545 §3.1).
//!
//! Handles line unfolding and splitting of content lines into name,
//! parameters and value. Both steps are lenient: nothing here fails a whole
//! document.

use super::error::{ParseError, ParseErrorKind, ParseResult};
use crate::rfc::ical::core::ContentLine;

/// Splits input into logical lines, merging folded continuations.
///
/// Handles both CRLF and bare LF line endings. A line starting with a single
/// SP or HTAB continues the previous logical line; unfolding removes that one
/// whitespace character and inserts nothing. A continuation with no previous
/// line is kept as-is. Empty lines are preserved so that the output never
/// has more entries than the input has physical lines.
#[must_use]
pub fn unfold_lines(input: &str) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();

    for raw_line in input.split('\n') {
        let line = raw_line.strip_suffix('\r').unwrap_or(raw_line);

        if line.starts_with([' ', '\t'])
            && let Some(prev) = lines.last_mut()
        {
            // Both SP and HTAB are one byte wide
            prev.push_str(&line[1..]);
        } else {
            lines.push(line.to_string());
        }
    }

    lines
}

/// Parses a single logical content line.
///
/// Format: `name *(";" param) ":" value`. Only the first colon separates
/// the property part from the value; the value may contain further colons.
/// Parameter segments without `=` (or with an empty key or value) are
/// dropped. Parameter keys are upper-cased; the last occurrence wins.
///
/// ## Errors
/// Returns `MissingColon` if the line has no `:` and `MissingPropertyName`
/// if the name before the first `;`/`:` is empty.
pub fn parse_content_line(line: &str, line_num: usize) -> ParseResult<ContentLine> {
    let Some((prop_part, value)) = line.split_once(':') else {
        return Err(ParseError::new(ParseErrorKind::MissingColon, line_num));
    };

    let mut segments = prop_part.split(';');
    let name = segments.next().unwrap_or_default();
    if name.is_empty() {
        return Err(ParseError::new(ParseErrorKind::MissingPropertyName, line_num));
    }

    let mut content_line = ContentLine::new(name, value);
    for segment in segments {
        match segment.split_once('=') {
            Some((key, param_value)) if !key.is_empty() && !param_value.is_empty() => {
                content_line = content_line.with_param(key, param_value);
            }
            _ => {
                tracing::trace!(line = line_num, segment, "Dropping malformed parameter");
            }
        }
    }

    Ok(content_line)
}
