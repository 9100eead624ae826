//! Hoops that place the service handles in the depot.

use std::sync::Arc;

use salvo::async_trait;

use crate::error::AppResult;
use openslot_core::error::CoreError;
use openslot_service::availability::AvailabilitySettings;
use openslot_service::caldav::CalendarSource;
use openslot_service::store::KvStore;

pub struct StoreHandler {
    pub store: Arc<dyn KvStore>,
}

#[async_trait]
impl salvo::Handler for StoreHandler {
    #[tracing::instrument(skip(self, _req, depot, _res, _ctrl))]
    async fn handle(
        &self,
        _req: &mut salvo::Request,
        depot: &mut salvo::Depot,
        _res: &mut salvo::Response,
        _ctrl: &mut salvo::FlowCtrl,
    ) {
        depot.inject(Arc::clone(&self.store));
    }
}

/// ## Summary
/// Retrieves the key-value store from the depot.
///
/// ## Errors
/// Returns an error if the store is not found in the depot.
pub fn get_store_from_depot(depot: &salvo::Depot) -> AppResult<Arc<dyn KvStore>> {
    depot
        .obtain::<Arc<dyn KvStore>>()
        .cloned()
        .map_err(|_err| CoreError::InvariantViolation("Store not found in depot").into())
}

/// Injects the calendar source. `source` is `None` when no calendar
/// credentials are configured; handlers report that per request.
pub struct CalendarSourceHandler {
    pub source: Option<Arc<dyn CalendarSource>>,
}

#[async_trait]
impl salvo::Handler for CalendarSourceHandler {
    #[tracing::instrument(skip(self, _req, depot, _res, _ctrl))]
    async fn handle(
        &self,
        _req: &mut salvo::Request,
        depot: &mut salvo::Depot,
        _res: &mut salvo::Response,
        _ctrl: &mut salvo::FlowCtrl,
    ) {
        depot.inject(self.source.clone());
    }
}

/// ## Summary
/// Retrieves the calendar source from the depot.
///
/// Returns `Ok(None)` when the source was injected but is not configured.
///
/// ## Errors
/// Returns an error if no source entry is found in the depot.
pub fn get_calendar_source_from_depot(
    depot: &salvo::Depot,
) -> AppResult<Option<Arc<dyn CalendarSource>>> {
    depot
        .obtain::<Option<Arc<dyn CalendarSource>>>()
        .cloned()
        .map_err(|_err| CoreError::InvariantViolation("Calendar source not found in depot").into())
}

pub struct AvailabilitySettingsHandler {
    pub settings: Arc<AvailabilitySettings>,
}

#[async_trait]
impl salvo::Handler for AvailabilitySettingsHandler {
    #[tracing::instrument(skip(self, _req, depot, _res, _ctrl))]
    async fn handle(
        &self,
        _req: &mut salvo::Request,
        depot: &mut salvo::Depot,
        _res: &mut salvo::Response,
        _ctrl: &mut salvo::FlowCtrl,
    ) {
        depot.inject(Arc::clone(&self.settings));
    }
}

/// ## Summary
/// Retrieves the resolved availability settings from the depot.
///
/// ## Errors
/// Returns an error if the settings are not found in the depot.
pub fn get_availability_settings_from_depot(
    depot: &salvo::Depot,
) -> AppResult<Arc<AvailabilitySettings>> {
    depot
        .obtain::<Arc<AvailabilitySettings>>()
        .cloned()
        .map_err(|_err| {
            CoreError::InvariantViolation("Availability settings not found in depot").into()
        })
}
