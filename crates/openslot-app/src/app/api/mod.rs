mod app_specific;
mod availability;
mod calendars;
mod selection;

use salvo::Router;

use crate::middleware::auth::{AuthConfiguredGuard, admin_basic_auth};

// Re-export route constants from core
pub use openslot_core::constants::{
    API_ROUTE_COMPONENT, API_ROUTE_PREFIX, AVAILABILITY_ROUTE_PREFIX, CALENDARS_ROUTE_PREFIX,
    SELECTION_ROUTE_PREFIX,
};

/// ## Summary
/// Constructs the API router.
///
/// The availability feed and healthcheck are public; selection and calendar
/// listing require the admin credentials.
#[must_use]
pub fn routes() -> Router {
    Router::with_path(API_ROUTE_COMPONENT)
        .push(app_specific::routes())
        .push(availability::routes())
        .push(
            Router::new()
                .hoop(AuthConfiguredGuard)
                .hoop(admin_basic_auth())
                .push(selection::routes())
                .push(calendars::routes()),
        )
}
