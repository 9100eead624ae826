use salvo::writing::Json;
use salvo::{Depot, Response, Router, handler};

use crate::error::{AppError, AppResult};
use crate::service_handler::{
    get_availability_settings_from_depot, get_calendar_source_from_depot, get_store_from_depot,
};
use openslot_core::constants::AVAILABILITY_ROUTE_COMPONENT;
use openslot_service::availability::{AvailabilityResponse, availability_events};

async fn load_events(depot: &Depot) -> AppResult<AvailabilityResponse> {
    let store = get_store_from_depot(depot)?;
    let source = get_calendar_source_from_depot(depot)?;
    let settings = get_availability_settings_from_depot(depot)?;

    availability_events(
        store.as_ref(),
        source.as_deref(),
        &settings,
        chrono::Utc::now(),
    )
    .await
    .map_err(AppError::from)
}

/// ## Summary
/// GET /api/availability-events - busy intervals of the selected calendars.
///
/// ## Errors
/// Returns HTTP 500 if calendar credentials are missing, HTTP 502 if the
/// calendar server fails.
#[handler]
async fn get_availability(depot: &mut Depot, res: &mut Response) {
    match load_events(depot).await {
        Ok(response) => res.render(Json(response)),
        Err(e) => e.render(res),
    }
}

#[must_use]
pub fn routes() -> Router {
    Router::with_path(AVAILABILITY_ROUTE_COMPONENT).get(get_availability)
}
