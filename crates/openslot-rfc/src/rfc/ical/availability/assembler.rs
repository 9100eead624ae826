//! VEVENT assembler.
//!
//! Walks unfolded content lines, accumulates the properties of each VEVENT
//! block and hands finished events to the work window. Malformed lines,
//! properties and events are dropped one at a time; a document never fails
//! as a whole.

use chrono_tz::Tz;

use super::event::{AvailabilityEvent, PendingEvent};
use super::window::WorkWindow;
use crate::rfc::ical::core::ContentLine;
use crate::rfc::ical::expand::TimeZoneResolver;
use crate::rfc::ical::parse::{
    is_date_value, parse_content_line, parse_duration, resolve_datetime, unfold_lines,
};

const VEVENT: &str = "VEVENT";

/// Position of the assembler relative to VEVENT blocks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssemblerState {
    /// Outside any VEVENT.
    Idle,
    /// Inside a VEVENT. `nested` counts open sub-components (e.g. VALARM)
    /// whose properties are skipped.
    Accumulating { event: PendingEvent, nested: usize },
}

/// Extracts busy intervals from iCalendar text.
#[derive(Debug, Clone)]
pub struct AvailabilityParser {
    reference: Tz,
    window: WorkWindow,
}

impl AvailabilityParser {
    #[must_use]
    pub fn new(reference: Tz, window: WorkWindow) -> Self {
        Self { reference, window }
    }

    #[must_use]
    pub fn window(&self) -> &WorkWindow {
        &self.window
    }

    #[must_use]
    pub fn reference(&self) -> Tz {
        self.reference
    }

    /// ## Summary
    /// Parses one iCalendar document into the events overlapping the window.
    ///
    /// Output is in document order. Empty or malformed input yields an
    /// empty list.
    #[must_use]
    #[tracing::instrument(skip(self, ics), fields(input_len = ics.len()))]
    pub fn parse(&self, ics: &str) -> Vec<AvailabilityEvent> {
        let mut resolver = TimeZoneResolver::new();
        let mut events = Vec::new();
        let mut state = AssemblerState::Idle;

        for (idx, line) in unfold_lines(ics).iter().enumerate() {
            if line.is_empty() {
                continue;
            }
            state = self.step(state, line, idx + 1, &mut resolver, &mut events);
        }

        if matches!(state, AssemblerState::Accumulating { .. }) {
            tracing::debug!("Dropping VEVENT without END:VEVENT");
        }

        tracing::debug!(count = events.len(), "Parsed availability events");
        events
    }

    fn step(
        &self,
        state: AssemblerState,
        line: &str,
        line_num: usize,
        resolver: &mut TimeZoneResolver,
        events: &mut Vec<AvailabilityEvent>,
    ) -> AssemblerState {
        let content_line = match parse_content_line(line, line_num) {
            Ok(content_line) => content_line,
            Err(e) => {
                tracing::trace!(error = %e, "Ignoring line");
                return state;
            }
        };

        let is_begin = content_line.name == "BEGIN";
        let is_end = content_line.name == "END";

        if is_begin && is_vevent(&content_line) {
            if matches!(state, AssemblerState::Accumulating { .. }) {
                tracing::debug!(line = line_num, "Restarting VEVENT before END:VEVENT");
            }
            return AssemblerState::Accumulating {
                event: PendingEvent::default(),
                nested: 0,
            };
        }

        let AssemblerState::Accumulating { mut event, nested } = state else {
            return AssemblerState::Idle;
        };

        if is_end && is_vevent(&content_line) {
            if let Some(emitted) = self.finish(event) {
                events.push(emitted);
            }
            return AssemblerState::Idle;
        }

        if is_begin {
            return AssemblerState::Accumulating {
                event,
                nested: nested + 1,
            };
        }

        if is_end {
            return AssemblerState::Accumulating {
                event,
                nested: nested.saturating_sub(1),
            };
        }

        if nested == 0 {
            self.merge(&mut event, &content_line, line_num, resolver);
        }

        AssemblerState::Accumulating { event, nested }
    }

    /// Merges a recognized property into the event. Last occurrence wins.
    fn merge(
        &self,
        event: &mut PendingEvent,
        line: &ContentLine,
        line_num: usize,
        resolver: &mut TimeZoneResolver,
    ) {
        match line.name.as_str() {
            "DTSTART" => {
                event.start = self.resolve(line, line_num, resolver);
                event.start_is_date = is_date_value(&line.raw_value, line.value_type());
            }
            "DTEND" => {
                event.end = self.resolve(line, line_num, resolver);
                event.end_is_date = is_date_value(&line.raw_value, line.value_type());
            }
            "DURATION" => {
                event.duration = parse_duration(&line.raw_value, line_num)
                    .inspect_err(|e| tracing::debug!(error = %e, "Dropping DURATION"))
                    .ok();
            }
            "SUMMARY" => event.title = Some(line.raw_value.trim().to_string()),
            "UID" => event.id = Some(line.raw_value.trim().to_string()),
            _ => {}
        }
    }

    fn resolve(
        &self,
        line: &ContentLine,
        line_num: usize,
        resolver: &mut TimeZoneResolver,
    ) -> Option<chrono::DateTime<Tz>> {
        resolve_datetime(
            &line.raw_value,
            line.tzid(),
            line.value_type(),
            self.reference,
            resolver,
            line_num,
        )
        .inspect_err(|e| tracing::debug!(property = %line.name, error = %e, "Dropping value"))
        .ok()
        .map(|resolved| resolved.instant)
    }

    fn finish(&self, event: PendingEvent) -> Option<AvailabilityEvent> {
        let Some(start) = event.start else {
            tracing::trace!("Dropping VEVENT without DTSTART");
            return None;
        };
        let Some(end) = event.resolve_end() else {
            tracing::trace!(id = ?event.id, "Dropping VEVENT without determinable end");
            return None;
        };
        if event.is_all_day() {
            tracing::trace!(id = ?event.id, "Dropping all-day VEVENT");
            return None;
        }

        self.window.admit(&start, &end, event.id)
    }
}

fn is_vevent(line: &ContentLine) -> bool {
    line.raw_value.trim().eq_ignore_ascii_case(VEVENT)
}

/// Parses one iCalendar document with a one-off [`AvailabilityParser`].
#[must_use]
pub fn parse_availability(ics: &str, window: &WorkWindow, reference: Tz) -> Vec<AvailabilityEvent> {
    AvailabilityParser::new(reference, window.clone()).parse(ics)
}

#[cfg(test)]
#[path = "assembler_tests.rs"]
mod tests;
