#![allow(clippy::expect_used, dead_code)]
//! Request helpers shared by the integration tests.

use std::sync::Arc;

use salvo::Service;
use salvo::http::StatusCode;
use salvo::http::header::AUTHORIZATION;
use salvo::test::{RequestBuilder, ResponseExt, TestClient};
use serde_json::Value;

use openslot_test::service::caldav::CalendarSource;

pub use openslot_test::fake::FakeCalendarSource;
pub use openslot_test::fixtures::*;

pub const BASE_URL: &str = "http://127.0.0.1:5800";

/// Builds a test app around a fake source.
#[must_use]
pub fn app_with(source: FakeCalendarSource) -> (TestApp, Arc<FakeCalendarSource>) {
    let source = Arc::new(source);
    let app = TestApp::with_source(Some(Arc::clone(&source) as Arc<dyn CalendarSource>));
    (app, source)
}

#[must_use]
pub fn url(path: &str) -> String {
    format!("{BASE_URL}{path}")
}

/// Adds valid admin credentials.
#[must_use]
pub fn as_admin(builder: RequestBuilder) -> RequestBuilder {
    builder.add_header(AUTHORIZATION, basic_auth(ADMIN_USERNAME, ADMIN_PASSWORD), true)
}

/// Sends a request and returns the status and the JSON body.
pub async fn send_json(builder: RequestBuilder, service: &Service) -> (StatusCode, Value) {
    let mut response = builder.send(service).await;
    let status = response
        .status_code
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let body = response
        .take_json::<Value>()
        .await
        .expect("Response body should be JSON");
    (status, body)
}

/// GET as admin, returning status and JSON.
pub async fn admin_get(path: &str, service: &Service) -> (StatusCode, Value) {
    send_json(as_admin(TestClient::get(url(path))), service).await
}

/// POST a raw body as admin, returning status and JSON.
pub async fn admin_post(path: &str, body: &str, service: &Service) -> (StatusCode, Value) {
    send_json(
        as_admin(TestClient::post(url(path))).raw_json(body.to_string()),
        service,
    )
    .await
}
