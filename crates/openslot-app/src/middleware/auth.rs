use salvo::basic_auth::{BasicAuth, BasicAuthValidator};
use salvo::http::StatusCode;
use salvo::{Depot, FlowCtrl, Request, Response};
use tracing::error;

use crate::config::get_config_from_depot;

/// ## Summary
/// Rejects requests to protected routes with 500 when no admin credentials
/// are configured.
///
/// Must run before [`admin_basic_auth`] so that a missing configuration is
/// reported as such rather than as bad credentials.
pub struct AuthConfiguredGuard;

#[salvo::async_trait]
impl salvo::Handler for AuthConfiguredGuard {
    #[tracing::instrument(skip(self, req, depot, res, ctrl), fields(
        method = %req.method(),
        path = %req.uri().path()
    ))]
    async fn handle(
        &self,
        req: &mut Request,
        depot: &mut Depot,
        res: &mut Response,
        ctrl: &mut FlowCtrl,
    ) {
        let config = match get_config_from_depot(depot) {
            Ok(cfg) => cfg,
            Err(e) => {
                error!(error = ?e, "Failed to get config from depot");
                res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
                ctrl.skip_rest();
                return;
            }
        };

        if config.auth.credentials().is_none() {
            error!("Admin credentials are not configured");
            res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
            res.render("Auth not configured");
            ctrl.skip_rest();
        }
    }
}

/// Checks basic-auth credentials against `auth.username` / `auth.password`.
pub struct ConfiguredCredentials;

impl BasicAuthValidator for ConfiguredCredentials {
    async fn validate(&self, username: &str, password: &str, depot: &mut Depot) -> bool {
        let Ok(config) = get_config_from_depot(depot) else {
            error!("Failed to get config from depot");
            return false;
        };

        let valid = config
            .auth
            .credentials()
            .is_some_and(|(user, pass)| user == username && pass == password);

        if valid {
            tracing::debug!("Admin authenticated");
        } else {
            tracing::warn!(username, "Rejected admin credentials");
        }
        valid
    }
}

/// ## Summary
/// Basic-auth hoop for the administrative routes.
///
/// Missing or wrong credentials get 401 with a `WWW-Authenticate: Basic`
/// challenge.
#[must_use]
pub fn admin_basic_auth() -> BasicAuth<ConfiguredCredentials> {
    BasicAuth::new(ConfiguredCredentials)
}
