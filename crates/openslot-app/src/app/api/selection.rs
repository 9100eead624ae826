use salvo::http::StatusCode;
use salvo::writing::Json;
use salvo::{Depot, Request, Response, Router, handler};
use serde::Serialize;
use serde_json::Value;
use tracing::error;

use crate::error::{AppError, AppResult, ErrorResponse};
use crate::service_handler::{get_availability_settings_from_depot, get_store_from_depot};
use openslot_core::constants::SELECTION_ROUTE_COMPONENT;
use openslot_service::selection::{SelectionConfig, load_selection, save_selection};

/// ## Summary
/// Selection response payload
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionResponse {
    pub result: Vec<String>,
    pub work_start: String,
    pub work_end: String,
    pub booked_title: String,
}

impl From<SelectionConfig> for SelectionResponse {
    fn from(config: SelectionConfig) -> Self {
        Self {
            result: config.selection,
            work_start: config.work_start,
            work_end: config.work_end,
            booked_title: config.booked_title,
        }
    }
}

async fn current_selection(depot: &Depot) -> AppResult<SelectionConfig> {
    let store = get_store_from_depot(depot)?;
    let settings = get_availability_settings_from_depot(depot)?;
    load_selection(store.as_ref(), &settings.defaults)
        .await
        .map_err(AppError::from)
}

async fn store_selection(depot: &Depot, update: &Value) -> AppResult<SelectionConfig> {
    let store = get_store_from_depot(depot)?;
    let settings = get_availability_settings_from_depot(depot)?;
    save_selection(store.as_ref(), update, &settings.defaults)
        .await
        .map_err(AppError::from)
}

/// ## Summary
/// GET /api/icloud-selection - the stored selection and work hours.
#[handler]
async fn get_selection(depot: &mut Depot, res: &mut Response) {
    match current_selection(depot).await {
        Ok(config) => res.render(Json(SelectionResponse::from(config))),
        Err(e) => e.render(res),
    }
}

/// ## Summary
/// POST /api/icloud-selection - replaces the selection.
///
/// The body is `{selection, workStart?, workEnd?, bookedTitle?}`; omitted
/// work hours and title keep their stored values.
///
/// ## Errors
/// Returns HTTP 400 if the body is not JSON.
#[handler]
async fn post_selection(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    let update = match req.payload().await {
        Ok(bytes) => serde_json::from_slice::<Value>(bytes),
        Err(e) => {
            error!(error = ?e, "Failed to read selection body");
            res.status_code(StatusCode::BAD_REQUEST);
            res.render(Json(ErrorResponse::new("Invalid JSON payload.")));
            return;
        }
    };

    let update = match update {
        Ok(update) => update,
        Err(e) => {
            tracing::debug!(error = %e, "Rejected selection body");
            res.status_code(StatusCode::BAD_REQUEST);
            res.render(Json(ErrorResponse::new("Invalid JSON payload.")));
            return;
        }
    };

    match store_selection(depot, &update).await {
        Ok(config) => res.render(Json(SelectionResponse::from(config))),
        Err(e) => e.render(res),
    }
}

#[must_use]
pub fn routes() -> Router {
    Router::with_path(SELECTION_ROUTE_COMPONENT)
        .get(get_selection)
        .post(post_selection)
}
