//! ICS documents, settings and a wired test service.

use std::sync::Arc;

use base64::{Engine, engine::general_purpose::STANDARD};
use salvo::Service;

use openslot_app::app::{ServiceHandles, router};
use openslot_core::config::{
    AuthConfig, AvailabilityConfig, CalendarConfig, LoggingConfig, ServerConfig, Settings,
    StoreBackend, StoreConfig, WindowGranularity,
};
use openslot_service::availability::AvailabilitySettings;
use openslot_service::caldav::CalendarSource;
use openslot_service::store::MemoryStore;

pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_PASSWORD: &str = "correct horse";
pub const TEST_SERVER_URL: &str = "https://caldav.example.com";

/// Wraps VEVENT bodies in a VCALENDAR document.
#[must_use]
pub fn vcalendar(events: &[String]) -> String {
    let mut out = String::from("BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:-//openslot//test//EN\r\n");
    for event in events {
        out.push_str("BEGIN:VEVENT\r\n");
        out.push_str(event);
        out.push_str("END:VEVENT\r\n");
    }
    out.push_str("END:VCALENDAR\r\n");
    out
}

/// A VEVENT body with UTC start and end, e.g. `timed_event("a", "20240102T090000Z", ...)`.
#[must_use]
pub fn timed_event(uid: &str, start: &str, end: &str) -> String {
    format!("UID:{uid}\r\nSUMMARY:Private {uid}\r\nDTSTART:{start}\r\nDTEND:{end}\r\n")
}

/// An all-day VEVENT body.
#[must_use]
pub fn all_day_event(uid: &str, date: &str) -> String {
    format!("UID:{uid}\r\nDTSTART;VALUE=DATE:{date}\r\n")
}

/// Settings with admin credentials, calendar credentials and the memory store.
#[must_use]
pub fn test_settings() -> Settings {
    Settings {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 5800,
        },
        logging: LoggingConfig {
            level: "debug".to_string(),
        },
        calendar: CalendarConfig {
            server_url: TEST_SERVER_URL.to_string(),
            username: Some("user@example.com".to_string()),
            password: Some("app-specific".to_string()),
            request_timeout_seconds: 5,
        },
        store: StoreConfig {
            backend: StoreBackend::Memory,
            url: None,
            token: None,
            max_entries: 128,
        },
        auth: AuthConfig {
            username: Some(ADMIN_USERNAME.to_string()),
            password: Some(ADMIN_PASSWORD.to_string()),
        },
        availability: AvailabilityConfig {
            timezone: "UTC".to_string(),
            lookahead_weeks: 4,
            cache_ttl_seconds: 600,
            granularity: WindowGranularity::Minute,
            default_work_start: "06:00".to_string(),
            default_work_end: "15:00".to_string(),
            default_booked_title: "Booked".to_string(),
        },
    }
}

/// `Authorization` header value for basic auth.
#[must_use]
pub fn basic_auth(username: &str, password: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{username}:{password}")))
}

/// A service wired like the binary, with handles the test can inspect.
pub struct TestApp {
    pub service: Service,
    pub store: MemoryStore,
}

impl TestApp {
    /// ## Summary
    /// Builds the router from `settings` with an in-memory store and the
    /// given calendar source.
    ///
    /// ## Panics
    /// Panics if the availability settings are invalid.
    #[expect(clippy::expect_used, reason = "Invalid test settings are fatal")]
    #[must_use]
    pub fn new(settings: Settings, source: Option<Arc<dyn CalendarSource>>) -> Self {
        let store = MemoryStore::new(settings.store.max_entries);
        let availability = AvailabilitySettings::from_config(&settings.availability)
            .expect("test availability settings should be valid");

        let handles = ServiceHandles {
            store: Arc::new(store.clone()),
            source,
            availability: Arc::new(availability),
        };

        Self {
            service: Service::new(router(settings, handles)),
            store,
        }
    }

    /// A service with default test settings.
    #[must_use]
    pub fn with_source(source: Option<Arc<dyn CalendarSource>>) -> Self {
        Self::new(test_settings(), source)
    }
}
