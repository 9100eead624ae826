//! Stored calendar selection and work-window settings.
//!
//! The selection lives under a single key as JSON:
//! `{"selection": [...], "workStart": "HH:MM", "workEnd": "HH:MM", "bookedTitle": "..."}`.
//! A bare JSON array of calendar ids, written by older versions, is still
//! accepted and filled in with defaults.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ServiceResult;
use crate::store::{KvStore, get_json, set_json};
use openslot_core::config::{AvailabilityConfig, WindowGranularity};
use openslot_core::constants::{
    AVAILABILITY_CACHE_PREFIX, DEFAULT_BOOKED_TITLE, DEFAULT_WORK_END, DEFAULT_WORK_START,
    SELECTION_STORAGE_KEY,
};
use openslot_rfc::rfc::ical::availability::{WindowPolicy, WorkWindow};

/// Values used when the stored selection omits a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionDefaults {
    pub work_start: String,
    pub work_end: String,
    pub booked_title: String,
}

impl Default for SelectionDefaults {
    fn default() -> Self {
        Self {
            work_start: DEFAULT_WORK_START.to_string(),
            work_end: DEFAULT_WORK_END.to_string(),
            booked_title: DEFAULT_BOOKED_TITLE.to_string(),
        }
    }
}

impl From<&AvailabilityConfig> for SelectionDefaults {
    fn from(config: &AvailabilityConfig) -> Self {
        let defaults = Self::default();
        Self {
            work_start: non_blank(&config.default_work_start).unwrap_or(defaults.work_start),
            work_end: non_blank(&config.default_work_end).unwrap_or(defaults.work_end),
            booked_title: non_blank(&config.default_booked_title)
                .unwrap_or(defaults.booked_title),
        }
    }
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// The selected calendars and the work window applied to them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionConfig {
    /// Calendar URLs, in the order events are merged.
    pub selection: Vec<String>,
    pub work_start: String,
    pub work_end: String,
    pub booked_title: String,
}

impl SelectionConfig {
    /// An empty selection with default settings.
    #[must_use]
    pub fn empty(defaults: &SelectionDefaults) -> Self {
        Self {
            selection: Vec::new(),
            work_start: defaults.work_start.clone(),
            work_end: defaults.work_end.clone(),
            booked_title: defaults.booked_title.clone(),
        }
    }

    /// ## Summary
    /// Normalizes a stored value.
    ///
    /// - An array is the legacy form: its string items are the selection.
    /// - An object supplies each field that has the right type; others fall
    ///   back to defaults. A blank booked title also falls back.
    /// - Anything else yields an empty selection.
    #[must_use]
    pub fn from_stored(value: &Value, defaults: &SelectionDefaults) -> Self {
        let mut config = Self::empty(defaults);

        match value {
            Value::Array(items) => config.selection = string_items(items),
            Value::Object(map) => {
                if let Some(Value::Array(items)) = map.get("selection") {
                    config.selection = string_items(items);
                }
                if let Some(Value::String(start)) = map.get("workStart") {
                    config.work_start.clone_from(start);
                }
                if let Some(Value::String(end)) = map.get("workEnd") {
                    config.work_end.clone_from(end);
                }
                if let Some(title) = map
                    .get("bookedTitle")
                    .and_then(Value::as_str)
                    .and_then(non_blank)
                {
                    config.booked_title = title;
                }
            }
            _ => {}
        }

        config
    }

    /// ## Summary
    /// Applies a submitted update on top of this selection.
    ///
    /// The update must be an object; its `selection` replaces the current one
    /// (missing or malformed means empty). `workStart`, `workEnd` and
    /// `bookedTitle` replace the current values when present.
    #[must_use]
    pub fn apply_update(&self, update: &Value, defaults: &SelectionDefaults) -> Self {
        let mut next = self.clone();
        next.selection = match update.get("selection") {
            Some(Value::Array(items)) => string_items(items),
            _ => Vec::new(),
        };
        if let Some(start) = update.get("workStart").and_then(Value::as_str) {
            next.work_start = start.trim().to_string();
        }
        if let Some(end) = update.get("workEnd").and_then(Value::as_str) {
            next.work_end = end.trim().to_string();
        }
        if let Some(title) = update.get("bookedTitle").and_then(Value::as_str) {
            next.booked_title = non_blank(title).unwrap_or_else(|| defaults.booked_title.clone());
        }
        next
    }

    /// Builds the work window, parsing the bounds with default fallbacks.
    #[must_use]
    pub fn work_window(
        &self,
        granularity: WindowGranularity,
        defaults: &SelectionDefaults,
    ) -> WorkWindow {
        let start = parse_time_to_minutes(&self.work_start, &defaults.work_start);
        let end = parse_time_to_minutes(&self.work_end, &defaults.work_end);

        let policy = match granularity {
            WindowGranularity::Minute => WindowPolicy::minutes(start, end),
            WindowGranularity::Hour => WindowPolicy::hours(start / 60, end / 60),
        };

        WorkWindow::new(policy, self.booked_title.clone())
    }

    /// Cache key for the events of this selection:
    /// `availability:events:{ids joined by '|'}|{workStart}|{workEnd}|{bookedTitle}`.
    #[must_use]
    pub fn cache_key(&self) -> String {
        format!(
            "{AVAILABILITY_CACHE_PREFIX}{}|{}|{}|{}",
            self.selection.join("|"),
            self.work_start,
            self.work_end,
            self.booked_title
        )
    }
}

fn string_items(items: &[Value]) -> Vec<String> {
    items
        .iter()
        .filter_map(Value::as_str)
        .map(str::to_string)
        .collect()
}

/// Parses `HH:MM` (exactly two digits each) into minutes since midnight.
fn parse_hh_mm(value: &str) -> Option<u32> {
    let (hours, minutes) = value.split_once(':')?;
    if hours.len() != 2
        || minutes.len() != 2
        || !hours.bytes().chain(minutes.bytes()).all(|b| b.is_ascii_digit())
    {
        return None;
    }
    Some(hours.parse::<u32>().ok()? * 60 + minutes.parse::<u32>().ok()?)
}

/// ## Summary
/// Parses `HH:MM` into minutes since midnight, falling back to `fallback`
/// and then to midnight when neither parses.
///
/// Values are not range-checked here; the work window takes them modulo one
/// day.
#[must_use]
pub fn parse_time_to_minutes(value: &str, fallback: &str) -> u32 {
    parse_hh_mm(value)
        .or_else(|| {
            tracing::debug!(value, fallback, "Invalid work time, using fallback");
            parse_hh_mm(fallback)
        })
        .unwrap_or(0)
}

/// ## Summary
/// Loads the stored selection, normalizing legacy and partial values.
///
/// A value that is not JSON is treated as absent.
///
/// ## Errors
/// Returns an error if the store fails.
#[tracing::instrument(skip(store, defaults))]
pub async fn load_selection(
    store: &dyn KvStore,
    defaults: &SelectionDefaults,
) -> ServiceResult<SelectionConfig> {
    let stored = match get_json::<Value>(store, SELECTION_STORAGE_KEY).await {
        Ok(stored) => stored,
        Err(crate::error::ServiceError::SerializationError(e)) => {
            tracing::warn!(error = %e, "Stored selection is not valid JSON");
            None
        }
        Err(e) => return Err(e),
    };

    Ok(stored.map_or_else(
        || SelectionConfig::empty(defaults),
        |value| SelectionConfig::from_stored(&value, defaults),
    ))
}

/// ## Summary
/// Applies an update to the stored selection and saves it.
///
/// ## Errors
/// Returns an error if the store fails.
#[tracing::instrument(skip(store, update, defaults))]
pub async fn save_selection(
    store: &dyn KvStore,
    update: &Value,
    defaults: &SelectionDefaults,
) -> ServiceResult<SelectionConfig> {
    let current = load_selection(store, defaults).await?;
    let next = current.apply_update(update, defaults);

    set_json(store, SELECTION_STORAGE_KEY, &next, None).await?;
    tracing::info!(count = next.selection.len(), "Saved calendar selection");

    Ok(next)
}

#[cfg(test)]
#[path = "selection_tests.rs"]
mod tests;
