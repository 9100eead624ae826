//! Tests for reading and writing the calendar selection.

use salvo::http::StatusCode;
use serde_json::json;

use super::helpers::*;
use openslot_test::core::constants::SELECTION_STORAGE_KEY;
use openslot_test::service::store::KvStore;

#[test_log::test(tokio::test)]
async fn defaults_when_nothing_stored() {
    let (app, _source) = app_with(FakeCalendarSource::new());

    let (status, body) = admin_get("/api/icloud-selection", &app.service).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "result": [],
            "workStart": "06:00",
            "workEnd": "15:00",
            "bookedTitle": "Booked"
        })
    );
}

#[test_log::test(tokio::test)]
async fn post_stores_and_echoes_selection() {
    let (app, _source) = app_with(FakeCalendarSource::new());

    let (status, posted) = admin_post(
        "/api/icloud-selection",
        r#"{"selection": ["a", 3, "b"], "workStart": "08:00", "bookedTitle": "  Busy "}"#,
        &app.service,
    )
    .await;
    let (_, fetched) = admin_get("/api/icloud-selection", &app.service).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        posted,
        json!({
            "result": ["a", "b"],
            "workStart": "08:00",
            "workEnd": "15:00",
            "bookedTitle": "Busy"
        })
    );
    assert_eq!(posted, fetched);
}

#[test_log::test(tokio::test)]
async fn post_without_hours_keeps_stored_hours() {
    let (app, _source) = app_with(FakeCalendarSource::new());

    admin_post(
        "/api/icloud-selection",
        r#"{"selection": ["a"], "workStart": "07:30", "workEnd": "12:00"}"#,
        &app.service,
    )
    .await;
    let (_, body) = admin_post(
        "/api/icloud-selection",
        r#"{"selection": ["b"]}"#,
        &app.service,
    )
    .await;

    assert_eq!(body["result"], json!(["b"]));
    assert_eq!(body["workStart"], json!("07:30"));
    assert_eq!(body["workEnd"], json!("12:00"));
}

#[test_log::test(tokio::test)]
async fn invalid_json_is_rejected() {
    let (app, _source) = app_with(FakeCalendarSource::new());

    let (status, body) = admin_post("/api/icloud-selection", "{not json", &app.service).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "Invalid JSON payload."}));
}

#[test_log::test(tokio::test)]
async fn legacy_array_is_read_with_defaults() {
    let (app, _source) = app_with(FakeCalendarSource::new());
    app.store
        .set(SELECTION_STORAGE_KEY, r#"["cal-1", "cal-2"]"#.to_string(), None)
        .await
        .expect("store write should succeed");

    let (_, body) = admin_get("/api/icloud-selection", &app.service).await;

    assert_eq!(body["result"], json!(["cal-1", "cal-2"]));
    assert_eq!(body["bookedTitle"], json!("Booked"));
}
