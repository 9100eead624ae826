use salvo::http::StatusCode;
use serde::Serialize;
use thiserror::Error;

use openslot_service::error::ServiceError;

/// Application-level errors (HTTP layer)
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    ServiceError(#[from] ServiceError),

    #[error(transparent)]
    RfcError(#[from] openslot_rfc::error::RfcError),

    #[error(transparent)]
    CoreError(#[from] openslot_core::error::CoreError),
}

pub type AppResult<T> = std::result::Result<T, AppError>;

/// ## Summary
/// Error response payload
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    #[must_use]
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

impl AppError {
    /// ## Summary
    /// The HTTP status this error is reported with.
    ///
    /// Failures of the calendar server or its transport map to 502; anything
    /// local maps to 500.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::ServiceError(e) if e.is_upstream() => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// ## Summary
    /// The message shown to clients.
    #[must_use]
    pub fn public_message(&self) -> String {
        match self {
            Self::ServiceError(ServiceError::MissingCredentials) => {
                "Missing OPENSLOT_CALENDAR__USERNAME or OPENSLOT_CALENDAR__PASSWORD in environment variables."
                    .to_string()
            }
            Self::ServiceError(e) if e.is_upstream() => e.to_string(),
            _ => "Internal server error".to_string(),
        }
    }

    /// ## Summary
    /// Renders the error as a JSON `{error}` body with its status code.
    pub fn render(&self, res: &mut salvo::Response) {
        tracing::error!(error = %self, "Request failed");
        res.status_code(self.status_code());
        res.render(salvo::writing::Json(ErrorResponse::new(self.public_message())));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_errors_are_bad_gateway() {
        let err = AppError::from(ServiceError::UpstreamStatus {
            status: 401,
            url: "https://caldav.icloud.com/".to_string(),
        });
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
        assert!(err.public_message().contains("401"));
    }

    #[test]
    fn local_errors_hide_details() {
        let err = AppError::from(ServiceError::StoreError("redis exploded".to_string()));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.public_message(), "Internal server error");
    }

    #[test]
    fn missing_credentials_names_the_settings() {
        let err = AppError::from(ServiceError::MissingCredentials);
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.public_message().contains("OPENSLOT_CALENDAR__USERNAME"));
    }
}
