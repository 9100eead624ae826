use anyhow::Result;
use config::Config;
use serde::Deserialize;

use crate::constants::{
    DEFAULT_BOOKED_TITLE, DEFAULT_CACHE_TTL_SECONDS, DEFAULT_CALDAV_URL, DEFAULT_LOOKAHEAD_WEEKS,
    DEFAULT_WORK_END, DEFAULT_WORK_START,
};
use crate::error::{CoreError, CoreResult};

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub calendar: CalendarConfig,
    pub store: StoreConfig,
    pub auth: AuthConfig,
    pub availability: AvailabilityConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    /// ## Summary
    /// Returns the bind address in the format "host:port".
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

/// Remote CalDAV account the availability feed is read from.
#[derive(Clone, Deserialize)]
pub struct CalendarConfig {
    pub server_url: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub request_timeout_seconds: u64,
}

impl CalendarConfig {
    /// ## Summary
    /// Returns the trimmed username and password if both are configured.
    #[must_use]
    pub fn credentials(&self) -> Option<(&str, &str)> {
        let username = self.username.as_deref().map(str::trim)?;
        let password = self.password.as_deref()?;
        if username.is_empty() || password.is_empty() {
            return None;
        }
        Some((username, password))
    }

    /// ## Summary
    /// Returns the server URL, falling back to the iCloud endpoint when blank.
    #[must_use]
    pub fn server_url(&self) -> &str {
        let trimmed = self.server_url.trim();
        if trimmed.is_empty() {
            DEFAULT_CALDAV_URL
        } else {
            trimmed
        }
    }
}

impl std::fmt::Debug for CalendarConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CalendarConfig")
            .field("server_url", &self.server_url)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("request_timeout_seconds", &self.request_timeout_seconds)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    Memory,
    Rest,
}

#[derive(Clone, Deserialize)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub url: Option<String>,
    pub token: Option<String>,
    pub max_entries: u64,
}

impl std::fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreConfig")
            .field("backend", &self.backend)
            .field("url", &self.url)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("max_entries", &self.max_entries)
            .finish()
    }
}

/// Credentials guarding the administrative routes.
#[derive(Clone, Deserialize)]
pub struct AuthConfig {
    pub username: Option<String>,
    pub password: Option<String>,
}

impl AuthConfig {
    /// ## Summary
    /// Returns the configured basic-auth pair, if both parts are non-empty.
    #[must_use]
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (self.username.as_deref(), self.password.as_deref()) {
            (Some(user), Some(pass)) if !user.is_empty() && !pass.is_empty() => Some((user, pass)),
            _ => None,
        }
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowGranularity {
    Minute,
    Hour,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AvailabilityConfig {
    pub timezone: String,
    pub lookahead_weeks: u32,
    pub cache_ttl_seconds: u64,
    pub granularity: WindowGranularity,
    pub default_work_start: String,
    pub default_work_end: String,
    pub default_booked_title: String,
}

impl Settings {
    /// ## Summary
    /// Loads configuration from environment variables and an optional `config.toml`.
    /// Environment variables use the `OPENSLOT_` prefix and `__` between sections,
    /// e.g. `OPENSLOT_CALENDAR__USERNAME`.
    ///
    /// ## Errors
    /// Returns an error if building the configuration, deserializing it, or validating it fails.
    pub fn load() -> Result<Self> {
        let settings = Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8698)?
            .set_default("logging.level", "debug")?
            .set_default("calendar.server_url", DEFAULT_CALDAV_URL)?
            .set_default("calendar.request_timeout_seconds", 30)?
            .set_default("store.backend", "memory")?
            .set_default("store.max_entries", 1024)?
            .set_default("availability.timezone", "UTC")?
            .set_default(
                "availability.lookahead_weeks",
                i64::from(DEFAULT_LOOKAHEAD_WEEKS),
            )?
            .set_default(
                "availability.cache_ttl_seconds",
                i64::from(DEFAULT_CACHE_TTL_SECONDS),
            )?
            .set_default("availability.granularity", "minute")?
            .set_default("availability.default_work_start", DEFAULT_WORK_START)?
            .set_default("availability.default_work_end", DEFAULT_WORK_END)?
            .set_default("availability.default_booked_title", DEFAULT_BOOKED_TITLE)?
            // TOML file
            .add_source(config::File::with_name("config.toml").required(false))
            // Env
            .add_source(
                config::Environment::with_prefix("OPENSLOT")
                    .prefix_separator("_")
                    .separator("__")
                    .ignore_empty(true)
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize::<Settings>()?;

        settings.validate()?;
        Ok(settings)
    }

    /// ## Summary
    /// Checks cross-field constraints that serde cannot express.
    ///
    /// ## Errors
    /// Returns `CoreError::ConfigError` if the REST store is selected without a URL and token.
    pub fn validate(&self) -> CoreResult<()> {
        if self.store.backend == StoreBackend::Rest {
            let has_url = self.store.url.as_deref().is_some_and(|u| !u.is_empty());
            let has_token = self.store.token.as_deref().is_some_and(|t| !t.is_empty());
            if !has_url || !has_token {
                return Err(CoreError::ConfigError(
                    "store.backend = rest requires store.url and store.token".to_string(),
                ));
            }
        }
        if self.availability.lookahead_weeks == 0 {
            return Err(CoreError::ConfigError(
                "availability.lookahead_weeks must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// ## Summary
/// Loads configuration from environment variables and `.env` file.
///
/// ## Errors
/// Returns an error if loading or deserializing the configuration fails.
pub fn load_config() -> Result<Settings> {
    if let Err(e) = dotenvy::dotenv() {
        tracing::debug!(error = %e, "No .env file loaded");
    }

    Settings::load()
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
