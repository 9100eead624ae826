//! Availability feed: selected calendars, filtered to the work window, cached.

use std::collections::HashSet;
use std::time::Duration;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use futures::future::try_join_all;
use serde::{Deserialize, Serialize};

use crate::caldav::{CalendarSource, TimeRange};
use crate::error::{ServiceError, ServiceResult};
use crate::selection::{SelectionDefaults, load_selection};
use crate::store::{KvStore, get_json, set_json};
use openslot_core::config::{AvailabilityConfig, WindowGranularity};
use openslot_rfc::rfc::dav::core::RemoteCalendar;
use openslot_rfc::rfc::ical::availability::{AvailabilityEvent, AvailabilityParser};

/// Resolved availability settings.
#[derive(Debug, Clone)]
pub struct AvailabilitySettings {
    /// Zone events are converted to before filtering and formatting.
    pub reference: Tz,
    pub lookahead: chrono::Duration,
    pub cache_ttl: Duration,
    pub granularity: WindowGranularity,
    pub defaults: SelectionDefaults,
}

impl AvailabilitySettings {
    /// ## Summary
    /// Resolves settings from configuration.
    ///
    /// ## Errors
    /// Returns `ServiceError::InvalidConfiguration` if the timezone is unknown.
    pub fn from_config(config: &AvailabilityConfig) -> ServiceResult<Self> {
        let reference = config.timezone.trim().parse::<Tz>().map_err(|e| {
            ServiceError::InvalidConfiguration(format!(
                "unknown availability timezone {}: {e}",
                config.timezone
            ))
        })?;

        Ok(Self {
            reference,
            lookahead: chrono::Duration::weeks(i64::from(config.lookahead_weeks)),
            cache_ttl: Duration::from_secs(config.cache_ttl_seconds),
            granularity: config.granularity,
            defaults: SelectionDefaults::from(config),
        })
    }
}

impl Default for AvailabilitySettings {
    fn default() -> Self {
        Self {
            reference: Tz::UTC,
            lookahead: chrono::Duration::weeks(i64::from(
                openslot_core::constants::DEFAULT_LOOKAHEAD_WEEKS,
            )),
            cache_ttl: Duration::from_secs(u64::from(
                openslot_core::constants::DEFAULT_CACHE_TTL_SECONDS,
            )),
            granularity: WindowGranularity::Minute,
            defaults: SelectionDefaults::default(),
        }
    }
}

/// Body of the availability endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityResponse {
    pub events: Vec<AvailabilityEvent>,
    /// `Some(true)` when served from the cache.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cached: Option<bool>,
}

impl AvailabilityResponse {
    fn fresh(events: Vec<AvailabilityEvent>) -> Self {
        Self {
            events,
            cached: None,
        }
    }
}

/// Picks the selected calendars, in selection order, skipping unknown and
/// repeated ids.
fn selected_calendars<'a>(
    calendars: &'a [RemoteCalendar],
    selection: &[String],
) -> Vec<&'a RemoteCalendar> {
    let mut seen = HashSet::new();
    selection
        .iter()
        .filter(|id| seen.insert(id.as_str()))
        .filter_map(|id| calendars.iter().find(|calendar| calendar.url == *id))
        .collect()
}

/// ## Summary
/// Computes the busy intervals of the selected calendars.
///
/// Reads the stored selection; an empty selection yields no events. A cached
/// result for the same selection and window is returned as is. Otherwise
/// the selected calendars are fetched concurrently over
/// `[now, now + lookahead)`, parsed, concatenated in selection order, and
/// cached for `cache_ttl`.
///
/// ## Errors
/// Returns `ServiceError::MissingCredentials` without a calendar source,
/// and propagates store and upstream failures. A single failing calendar
/// fails the whole request.
#[tracing::instrument(skip(store, source, settings))]
pub async fn availability_events(
    store: &dyn KvStore,
    source: Option<&dyn CalendarSource>,
    settings: &AvailabilitySettings,
    now: DateTime<Utc>,
) -> ServiceResult<AvailabilityResponse> {
    let source = source.ok_or(ServiceError::MissingCredentials)?;

    let selection = load_selection(store, &settings.defaults).await?;
    if selection.selection.is_empty() {
        tracing::debug!("No calendars selected");
        return Ok(AvailabilityResponse::fresh(Vec::new()));
    }

    let cache_key = selection.cache_key();
    match get_json::<Vec<AvailabilityEvent>>(store, &cache_key).await {
        Ok(Some(events)) => {
            tracing::debug!(count = events.len(), "Serving cached availability");
            return Ok(AvailabilityResponse {
                events,
                cached: Some(true),
            });
        }
        Ok(None) => {}
        Err(ServiceError::SerializationError(e)) => {
            tracing::warn!(error = %e, key = %cache_key, "Ignoring corrupt cache entry");
        }
        Err(e) => return Err(e),
    }

    let calendars = source.list_calendars().await?;
    let selected = selected_calendars(&calendars, &selection.selection);
    if selected.is_empty() {
        tracing::info!(
            selected = selection.selection.len(),
            available = calendars.len(),
            "None of the selected calendars exist"
        );
        return Ok(AvailabilityResponse::fresh(Vec::new()));
    }

    let range = TimeRange::starting_at(now, settings.lookahead);
    let per_calendar = try_join_all(
        selected
            .iter()
            .map(|calendar| source.fetch_objects(calendar, range, true)),
    )
    .await?;

    let parser = AvailabilityParser::new(
        settings.reference,
        selection.work_window(settings.granularity, &settings.defaults),
    );
    let events: Vec<AvailabilityEvent> = per_calendar
        .iter()
        .flatten()
        .flat_map(|object| parser.parse(&object.data))
        .collect();

    set_json(store, &cache_key, &events, Some(settings.cache_ttl)).await?;
    tracing::info!(
        calendars = selected.len(),
        count = events.len(),
        "Computed availability"
    );

    Ok(AvailabilityResponse::fresh(events))
}

#[cfg(test)]
#[path = "availability_tests.rs"]
mod tests;
