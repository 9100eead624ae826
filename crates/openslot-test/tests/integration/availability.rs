//! Tests for the public availability feed.

use salvo::http::StatusCode;
use salvo::test::TestClient;
use serde_json::json;

use super::helpers::*;

const WORK: &str = "https://caldav.example.com/123/calendars/work/";
const HOME: &str = "https://caldav.example.com/123/calendars/home/";

fn two_calendars() -> FakeCalendarSource {
    FakeCalendarSource::new()
        .with_calendar(
            WORK,
            Some("Work"),
            &[
                vcalendar(&[timed_event("standup", "20240102T090000Z", "20240102T093000Z")]),
                vcalendar(&[
                    timed_event("late", "20240102T200000Z", "20240102T210000Z"),
                    all_day_event("holiday", "20240103"),
                ]),
            ],
        )
        .with_calendar(
            HOME,
            Some("Home"),
            &[vcalendar(&[timed_event("dentist", "20240104T140000Z", "20240104T160000Z")])],
        )
}

async fn select(app: &TestApp, body: &str) {
    let (status, _) = admin_post("/api/icloud-selection", body, &app.service).await;
    assert_eq!(status, StatusCode::OK);
}

#[test_log::test(tokio::test)]
async fn empty_selection_returns_no_events() {
    let (app, source) = app_with(two_calendars());

    let (status, body) =
        send_json(TestClient::get(url("/api/availability-events")), &app.service).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"events": []}));
    assert_eq!(source.list_calls(), 0);
}

#[test_log::test(tokio::test)]
async fn returns_booked_events_in_selection_order() {
    let (app, _source) = app_with(two_calendars());
    select(&app, &format!(r#"{{"selection": ["{HOME}", "{WORK}"]}}"#)).await;

    let (status, body) =
        send_json(TestClient::get(url("/api/availability-events")), &app.service).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"events": [
            {
                "start": "2024-01-04T14:00:00+00:00",
                "end": "2024-01-04T16:00:00+00:00",
                "title": "Booked",
                "id": "dentist"
            },
            {
                "start": "2024-01-02T09:00:00+00:00",
                "end": "2024-01-02T09:30:00+00:00",
                "title": "Booked",
                "id": "standup"
            }
        ]})
    );
}

#[test_log::test(tokio::test)]
async fn repeated_request_is_cached() {
    let (app, source) = app_with(two_calendars());
    select(&app, &format!(r#"{{"selection": ["{WORK}"]}}"#)).await;

    let (_, first) =
        send_json(TestClient::get(url("/api/availability-events")), &app.service).await;
    let (status, second) =
        send_json(TestClient::get(url("/api/availability-events")), &app.service).await;

    assert_eq!(status, StatusCode::OK);
    assert!(first.get("cached").is_none());
    assert_eq!(second["cached"], json!(true));
    assert_eq!(first["events"], second["events"]);
    assert_eq!(source.list_calls(), 1);
    assert_eq!(source.fetch_calls(), 1);
}

#[test_log::test(tokio::test)]
async fn custom_work_hours_and_title_apply() {
    let (app, _source) = app_with(two_calendars());
    select(
        &app,
        &format!(
            r#"{{"selection": ["{WORK}"], "workStart": "18:00", "workEnd": "22:00", "bookedTitle": "Away"}}"#
        ),
    )
    .await;

    let (_, body) =
        send_json(TestClient::get(url("/api/availability-events")), &app.service).await;

    assert_eq!(body["events"].as_array().map(Vec::len), Some(1));
    assert_eq!(body["events"][0]["id"], json!("late"));
    assert_eq!(body["events"][0]["title"], json!("Away"));
}

#[test_log::test(tokio::test)]
async fn missing_calendar_credentials_is_server_error() {
    let app = TestApp::with_source(None);

    let (status, body) =
        send_json(TestClient::get(url("/api/availability-events")), &app.service).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(
        body["error"]
            .as_str()
            .is_some_and(|e| e.contains("OPENSLOT_CALENDAR__USERNAME"))
    );
}

#[test_log::test(tokio::test)]
async fn upstream_failure_is_bad_gateway() {
    let (app, _source) = app_with(two_calendars().with_failing_calendar(HOME));
    select(&app, &format!(r#"{{"selection": ["{WORK}", "{HOME}"]}}"#)).await;

    let (status, body) =
        send_json(TestClient::get(url("/api/availability-events")), &app.service).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body["error"].is_string());
}

#[test_log::test(tokio::test)]
async fn availability_does_not_require_auth() {
    let (app, _source) = app_with(two_calendars());

    let response = TestClient::get(url("/api/availability-events"))
        .send(&app.service)
        .await;

    assert_eq!(response.status_code, Some(StatusCode::OK));
}
