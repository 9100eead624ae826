//! Tests for the calendar listing used by the selection screen.

use salvo::http::StatusCode;
use serde_json::json;

use super::helpers::*;

#[test_log::test(tokio::test)]
async fn lists_calendars_with_upcoming_events() {
    let source = FakeCalendarSource::new()
        .with_calendar(
            "https://caldav.example.com/1/calendars/work/",
            Some("Work"),
            &[vcalendar(&[timed_event("a", "20240102T090000Z", "20240102T100000Z")])],
        )
        .with_calendar("https://caldav.example.com/1/calendars/empty/", Some("Empty"), &[])
        .with_calendar(
            "https://caldav.example.com/1/calendars/flaky/",
            None,
            &[],
        )
        .with_failing_calendar("https://caldav.example.com/1/calendars/flaky/");
    let (app, _source) = app_with(source);

    let (status, body) = admin_get("/api/icloud/calendars", &app.service).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "calendars": [
                {
                    "displayName": "Work",
                    "url": "https://caldav.example.com/1/calendars/work/",
                    "description": null,
                    "color": null,
                    "timezone": null
                },
                {
                    "displayName": "https://caldav.example.com/1/calendars/flaky/",
                    "url": "https://caldav.example.com/1/calendars/flaky/",
                    "description": null,
                    "color": null,
                    "timezone": null
                }
            ],
            "serverUrl": TEST_SERVER_URL
        })
    );
}

#[test_log::test(tokio::test)]
async fn listing_failure_is_bad_gateway_with_details() {
    let (app, _source) = app_with(FakeCalendarSource::new().with_failing_listing());

    let (status, body) = admin_get("/api/icloud/calendars", &app.service).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(
        body["error"],
        json!("Unable to fetch calendars. Double-check your Apple ID and app password.")
    );
    assert!(body["details"].as_str().is_some_and(|d| d.contains("401")));
    assert_eq!(body["serverUrl"], json!(TEST_SERVER_URL));
}

#[test_log::test(tokio::test)]
async fn missing_calendar_credentials_is_server_error() {
    let app = TestApp::with_source(None);

    let (status, body) = admin_get("/api/icloud/calendars", &app.service).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].is_string());
}
