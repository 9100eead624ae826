use thiserror::Error;

/// Service layer errors - combines all error types
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error(transparent)]
    RfcError(#[from] openslot_rfc::error::RfcError),

    #[error(transparent)]
    CoreError(#[from] openslot_core::error::CoreError),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Upstream returned {status} for {url}")]
    UpstreamStatus { status: u16, url: String },

    #[error("Calendar discovery failed: {0}")]
    DiscoveryError(String),

    #[error("Store error: {0}")]
    StoreError(String),

    #[error("Missing calendar credentials")]
    MissingCredentials,

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Invariant violation: {0}")]
    InvariantViolation(&'static str),
}

impl ServiceError {
    /// Whether the error came from a remote service rather than local state.
    #[must_use]
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            Self::HttpError(_)
                | Self::UpstreamStatus { .. }
                | Self::DiscoveryError(_)
                | Self::RfcError(_)
        )
    }
}

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;
