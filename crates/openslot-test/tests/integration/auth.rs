//! Tests for basic-auth protection of the admin routes.

use salvo::http::StatusCode;
use salvo::http::header::AUTHORIZATION;
use salvo::test::{ResponseExt, TestClient};

use super::helpers::*;
use openslot_test::core::config::AuthConfig;

#[test_log::test(tokio::test)]
async fn missing_credentials_are_challenged() {
    let (app, _source) = app_with(FakeCalendarSource::new());

    let response = TestClient::get(url("/api/icloud-selection"))
        .send(&app.service)
        .await;

    assert_eq!(response.status_code, Some(StatusCode::UNAUTHORIZED));
    let challenge = response
        .headers()
        .get("www-authenticate")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    assert!(challenge.starts_with("Basic"), "unexpected challenge {challenge:?}");
}

#[test_log::test(tokio::test)]
async fn wrong_password_is_unauthorized() {
    let (app, _source) = app_with(FakeCalendarSource::new());

    for path in ["/api/icloud-selection", "/api/icloud/calendars"] {
        let response = TestClient::get(url(path))
            .add_header(AUTHORIZATION, basic_auth(ADMIN_USERNAME, "wrong"), true)
            .send(&app.service)
            .await;
        assert_eq!(response.status_code, Some(StatusCode::UNAUTHORIZED), "{path}");
    }
}

#[test_log::test(tokio::test)]
async fn unconfigured_auth_is_server_error() {
    let mut settings = test_settings();
    settings.auth = AuthConfig {
        username: None,
        password: Some(ADMIN_PASSWORD.to_string()),
    };
    let app = TestApp::new(settings, None);

    let mut response = as_admin(TestClient::get(url("/api/icloud-selection")))
        .send(&app.service)
        .await;

    assert_eq!(
        response.status_code,
        Some(StatusCode::INTERNAL_SERVER_ERROR)
    );
    assert_eq!(
        response.take_string().await.unwrap_or_default(),
        "Auth not configured"
    );
}

#[test_log::test(tokio::test)]
async fn healthcheck_is_public() {
    let app = TestApp::with_source(None);

    let mut response = TestClient::get(url("/api/app/healthcheck"))
        .send(&app.service)
        .await;

    assert_eq!(response.status_code, Some(StatusCode::OK));
    assert_eq!(response.take_string().await.unwrap_or_default(), "OK");
}
