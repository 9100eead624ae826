//! Calendar listing for the selection screen.

use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::{Deserialize, Serialize};

use crate::caldav::{CalendarSource, TimeRange};
use crate::error::ServiceResult;
use openslot_core::constants::CALENDAR_PROBE_DAYS;
use openslot_rfc::rfc::dav::core::RemoteCalendar;

const UNTITLED_CALENDAR: &str = "Untitled calendar";

/// A calendar as offered for selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarSummary {
    pub display_name: String,
    /// Identifier stored in the selection.
    pub url: String,
    pub description: Option<String>,
    pub color: Option<String>,
    pub timezone: Option<String>,
}

impl From<RemoteCalendar> for CalendarSummary {
    fn from(calendar: RemoteCalendar) -> Self {
        let display_name = calendar
            .display_name
            .filter(|name| !name.trim().is_empty())
            .or_else(|| (!calendar.url.is_empty()).then(|| calendar.url.clone()))
            .unwrap_or_else(|| UNTITLED_CALENDAR.to_string());

        Self {
            display_name,
            url: calendar.url,
            description: calendar.description,
            color: calendar.color,
            timezone: calendar.timezone,
        }
    }
}

/// ## Summary
/// Lists the calendars that have events in the next four weeks.
///
/// Each calendar is probed concurrently. A calendar whose probe fails is
/// kept, so that a transient error does not hide it from selection.
///
/// ## Errors
/// Returns an error if the calendars cannot be listed.
#[tracing::instrument(skip(source))]
pub async fn list_active_calendars(
    source: &dyn CalendarSource,
    now: DateTime<Utc>,
) -> ServiceResult<Vec<CalendarSummary>> {
    let calendars = source.list_calendars().await?;
    let range = TimeRange::starting_at(now, chrono::Duration::days(CALENDAR_PROBE_DAYS));

    let probes = join_all(
        calendars
            .iter()
            .map(|calendar| source.fetch_objects(calendar, range, false)),
    )
    .await;

    let active: Vec<CalendarSummary> = calendars
        .iter()
        .zip(probes)
        .filter(|(calendar, probe)| match probe {
            Ok(objects) => !objects.is_empty(),
            Err(e) => {
                tracing::warn!(
                    calendar = %calendar.url,
                    error = %e,
                    "Calendar probe failed, keeping calendar"
                );
                true
            }
        })
        .map(|(calendar, _)| CalendarSummary::from(calendar.clone()))
        .collect();

    tracing::debug!(
        total = calendars.len(),
        active = active.len(),
        "Listed active calendars"
    );

    Ok(active)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use chrono::TimeZone;

    use super::*;
    use crate::caldav::SourceFuture;
    use crate::error::ServiceError;
    use openslot_rfc::rfc::dav::core::CalendarObject;

    struct ProbeSource {
        calendars: Vec<RemoteCalendar>,
        /// Object count per calendar URL; `None` fails the probe.
        counts: HashMap<String, Option<usize>>,
    }

    impl CalendarSource for ProbeSource {
        fn list_calendars(&self) -> SourceFuture<'_, Vec<RemoteCalendar>> {
            Box::pin(async move { Ok(self.calendars.clone()) })
        }

        fn fetch_objects<'a>(
            &'a self,
            calendar: &'a RemoteCalendar,
            range: TimeRange,
            expand: bool,
        ) -> SourceFuture<'a, Vec<CalendarObject>> {
            Box::pin(async move {
                assert!(!expand);
                assert_eq!(range.end - range.start, chrono::Duration::days(28));
                match self.counts.get(&calendar.url).copied().flatten() {
                    Some(count) => Ok((0..count)
                        .map(|i| CalendarObject {
                            href: format!("{}{i}.ics", calendar.url),
                            etag: None,
                            data: "BEGIN:VCALENDAR\r\nEND:VCALENDAR\r\n".to_string(),
                        })
                        .collect()),
                    None => Err(ServiceError::UpstreamStatus {
                        status: 500,
                        url: calendar.url.clone(),
                    }),
                }
            })
        }
    }

    fn calendar(url: &str, name: Option<&str>) -> RemoteCalendar {
        RemoteCalendar {
            url: url.to_string(),
            display_name: name.map(str::to_string),
            description: None,
            color: Some("#FF2968FF".to_string()),
            timezone: None,
        }
    }

    #[test_log::test(tokio::test)]
    async fn keeps_busy_and_failed_calendars() {
        let source = ProbeSource {
            calendars: vec![
                calendar("https://cal/work/", Some("Work")),
                calendar("https://cal/empty/", Some("Empty")),
                calendar("https://cal/flaky/", Some("Flaky")),
            ],
            counts: HashMap::from([
                ("https://cal/work/".to_string(), Some(2)),
                ("https://cal/empty/".to_string(), Some(0)),
                ("https://cal/flaky/".to_string(), None),
            ]),
        };
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();

        let active = list_active_calendars(&source, now).await.unwrap();

        let names: Vec<_> = active.iter().map(|c| c.display_name.as_str()).collect();
        assert_eq!(names, ["Work", "Flaky"]);
    }

    #[test]
    fn display_name_falls_back_to_url() {
        let summary = CalendarSummary::from(calendar("https://cal/x/", Some("  ")));
        assert_eq!(summary.display_name, "https://cal/x/");

        let summary = CalendarSummary::from(calendar("", None));
        assert_eq!(summary.display_name, "Untitled calendar");
    }

    #[test]
    fn serializes_absent_fields_as_null() {
        let summary = CalendarSummary::from(calendar("https://cal/x/", Some("Home")));
        assert_eq!(
            serde_json::to_value(&summary).unwrap(),
            serde_json::json!({
                "displayName": "Home",
                "url": "https://cal/x/",
                "description": null,
                "color": "#FF2968FF",
                "timezone": null
            })
        );
    }
}
