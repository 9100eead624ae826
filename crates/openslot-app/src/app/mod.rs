pub mod api;

use std::sync::Arc;
use std::time::Duration;

use salvo::Router;

use crate::config::{ConfigHandler, Settings};
use crate::error::AppResult;
use crate::service_handler::{AvailabilitySettingsHandler, CalendarSourceHandler, StoreHandler};
use openslot_service::availability::AvailabilitySettings;
use openslot_service::caldav::{CaldavClient, CalendarSource};
use openslot_service::store::{KvStore, store_from_config};

/// Service handles shared by all requests.
#[derive(Clone)]
pub struct ServiceHandles {
    pub store: Arc<dyn KvStore>,
    /// `None` when no calendar credentials are configured.
    pub source: Option<Arc<dyn CalendarSource>>,
    pub availability: Arc<AvailabilitySettings>,
}

impl ServiceHandles {
    /// ## Summary
    /// Builds the store, the calendar client and the availability settings.
    ///
    /// ## Errors
    /// Returns an error if a backend cannot be constructed or the settings
    /// are invalid.
    pub fn from_settings(settings: &Settings) -> AppResult<Self> {
        let timeout = Duration::from_secs(settings.calendar.request_timeout_seconds);
        let store = store_from_config(&settings.store, timeout)?;

        let source = CaldavClient::from_config(&settings.calendar)?
            .map(|client| Arc::new(client) as Arc<dyn CalendarSource>);

        let availability = Arc::new(AvailabilitySettings::from_config(&settings.availability)?);

        Ok(Self {
            store,
            source,
            availability,
        })
    }
}

/// ## Summary
/// Builds the application router with the settings and service handles
/// injected ahead of the API routes.
#[must_use]
pub fn router(settings: Settings, handles: ServiceHandles) -> Router {
    Router::new()
        .hoop(ConfigHandler { settings })
        .hoop(StoreHandler {
            store: handles.store,
        })
        .hoop(CalendarSourceHandler {
            source: handles.source,
        })
        .hoop(AvailabilitySettingsHandler {
            settings: handles.availability,
        })
        .push(api::routes())
}
