use salvo::http::StatusCode;
use salvo::writing::Json;
use salvo::{Depot, Response, Router, handler};
use serde::Serialize;

use crate::config::get_config_from_depot;
use crate::error::{AppError, AppResult};
use crate::service_handler::get_calendar_source_from_depot;
use openslot_core::constants::CALENDARS_ROUTE_COMPONENT;
use openslot_service::calendars::{CalendarSummary, list_active_calendars};
use openslot_service::error::ServiceError;

const FETCH_FAILED_MESSAGE: &str =
    "Unable to fetch calendars. Double-check your Apple ID and app password.";

/// ## Summary
/// Calendar listing response payload
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarsResponse {
    pub calendars: Vec<CalendarSummary>,
    pub server_url: String,
}

/// ## Summary
/// Calendar listing failure payload
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarsErrorResponse {
    pub error: String,
    pub details: String,
    pub server_url: String,
}

async fn active_calendars(depot: &Depot) -> AppResult<Vec<CalendarSummary>> {
    let source = get_calendar_source_from_depot(depot)?.ok_or(ServiceError::MissingCredentials)?;
    list_active_calendars(source.as_ref(), chrono::Utc::now())
        .await
        .map_err(AppError::from)
}

/// ## Summary
/// GET /api/icloud/calendars - calendars with events in the next four weeks.
///
/// ## Errors
/// Returns HTTP 500 if credentials are missing, HTTP 502 with details if the
/// calendar server cannot be queried.
#[handler]
async fn list_calendars(depot: &mut Depot, res: &mut Response) {
    let server_url = match get_config_from_depot(depot) {
        Ok(config) => config.calendar.server_url().to_string(),
        Err(e) => {
            e.render(res);
            return;
        }
    };

    match active_calendars(depot).await {
        Ok(calendars) => res.render(Json(CalendarsResponse {
            calendars,
            server_url,
        })),
        Err(AppError::ServiceError(e)) if e.is_upstream() => {
            tracing::error!(error = %e, server_url = %server_url, "Failed to fetch calendars");
            res.status_code(StatusCode::BAD_GATEWAY);
            res.render(Json(CalendarsErrorResponse {
                error: FETCH_FAILED_MESSAGE.to_string(),
                details: e.to_string(),
                server_url,
            }));
        }
        Err(e) => e.render(res),
    }
}

#[must_use]
pub fn routes() -> Router {
    Router::with_path(CALENDARS_ROUTE_COMPONENT)
        .push(Router::with_path("calendars").get(list_calendars))
}
