//! Tests for the `CalDAV` client against a scripted server.

use std::time::Duration;

use chrono::{TimeZone, Utc};

use openslot_test::mock_caldav::{MockCaldavServer, MockRoute};
use openslot_test::rfc::rfc::ical::availability::{WindowPolicy, WorkWindow, parse_availability};
use openslot_test::service::caldav::{CaldavClient, CalendarSource, TimeRange};
use openslot_test::service::error::ServiceError;

const PRINCIPAL: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<d:multistatus xmlns:d="DAV:">
  <d:response>
    <d:href>/</d:href>
    <d:propstat>
      <d:prop><d:current-user-principal><d:href>/123/principal/</d:href></d:current-user-principal></d:prop>
      <d:status>HTTP/1.1 200 OK</d:status>
    </d:propstat>
  </d:response>
</d:multistatus>"#;

const HOME_SET: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<d:multistatus xmlns:d="DAV:" xmlns:c="urn:ietf:params:xml:ns:caldav">
  <d:response>
    <d:href>/123/principal/</d:href>
    <d:propstat>
      <d:prop><c:calendar-home-set><d:href>/123/calendars/</d:href></c:calendar-home-set></d:prop>
      <d:status>HTTP/1.1 200 OK</d:status>
    </d:propstat>
  </d:response>
</d:multistatus>"#;

const LISTING: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<d:multistatus xmlns:d="DAV:" xmlns:c="urn:ietf:params:xml:ns:caldav" xmlns:i="http://apple.com/ns/ical/">
  <d:response>
    <d:href>/123/calendars/</d:href>
    <d:propstat>
      <d:prop><d:resourcetype><d:collection/></d:resourcetype></d:prop>
      <d:status>HTTP/1.1 200 OK</d:status>
    </d:propstat>
  </d:response>
  <d:response>
    <d:href>/123/calendars/work/</d:href>
    <d:propstat>
      <d:prop>
        <d:resourcetype><d:collection/><c:calendar/></d:resourcetype>
        <d:displayname>Work</d:displayname>
        <i:calendar-color>#1BADF8FF</i:calendar-color>
      </d:prop>
      <d:status>HTTP/1.1 200 OK</d:status>
    </d:propstat>
  </d:response>
</d:multistatus>"#;

const REPORT: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>
<d:multistatus xmlns:d=\"DAV:\" xmlns:c=\"urn:ietf:params:xml:ns:caldav\">
  <d:response>
    <d:href>/123/calendars/work/standup.ics</d:href>
    <d:propstat>
      <d:prop>
        <d:getetag>\"e1\"</d:getetag>
        <c:calendar-data>BEGIN:VCALENDAR&#13;
VERSION:2.0&#13;
BEGIN:VEVENT&#13;
UID:standup&#13;
DTSTART:20240102T090000Z&#13;
DTEND:20240102T093000Z&#13;
END:VEVENT&#13;
END:VCALENDAR&#13;
</c:calendar-data>
      </d:prop>
      <d:status>HTTP/1.1 200 OK</d:status>
    </d:propstat>
  </d:response>
</d:multistatus>";

fn routes() -> Vec<MockRoute> {
    vec![
        MockRoute::multistatus("PROPFIND", "/", PRINCIPAL),
        MockRoute::multistatus("PROPFIND", "/123/principal/", HOME_SET),
        MockRoute::multistatus("PROPFIND", "/123/calendars/", LISTING),
        MockRoute::multistatus("REPORT", "/123/calendars/work/", REPORT),
    ]
}

async fn start() -> (MockCaldavServer, CaldavClient) {
    let server = MockCaldavServer::start(routes())
        .await
        .expect("mock server should bind");
    let client = CaldavClient::new(
        &server.url(),
        "user@example.com",
        "app-password",
        Duration::from_secs(5),
    )
    .expect("client should build");
    (server, client)
}

#[test_log::test(tokio::test)]
async fn discovers_and_lists_calendars() {
    let (server, client) = start().await;

    let calendars = client.list_calendars().await.expect("listing should succeed");

    assert_eq!(calendars.len(), 1);
    assert_eq!(calendars[0].url, format!("{}123/calendars/work/", server.url()));
    assert_eq!(calendars[0].display_name.as_deref(), Some("Work"));
    assert_eq!(calendars[0].color.as_deref(), Some("#1BADF8FF"));

    let requests = server.requests();
    let trail: Vec<_> = requests
        .iter()
        .map(|r| (r.method.as_str(), r.path.as_str(), r.depth.as_deref()))
        .collect();
    assert_eq!(
        trail,
        [
            ("PROPFIND", "/", Some("0")),
            ("PROPFIND", "/123/principal/", Some("0")),
            ("PROPFIND", "/123/calendars/", Some("1")),
        ]
    );
    assert!(
        requests
            .iter()
            .all(|r| r.authorization.as_deref().is_some_and(|a| a.starts_with("Basic ")))
    );
}

#[test_log::test(tokio::test)]
async fn calendar_home_is_discovered_once() {
    let (server, client) = start().await;

    client.list_calendars().await.expect("first listing");
    client.list_calendars().await.expect("second listing");

    let propfinds_on_root = server
        .requests()
        .iter()
        .filter(|r| r.path == "/")
        .count();
    assert_eq!(propfinds_on_root, 1);
}

#[test_log::test(tokio::test)]
async fn fetches_objects_with_expanded_time_range() {
    let (server, client) = start().await;
    let calendars = client.list_calendars().await.expect("listing should succeed");
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let range = TimeRange::starting_at(start, chrono::Duration::weeks(4));

    let objects = client
        .fetch_objects(&calendars[0], range, true)
        .await
        .expect("report should succeed");

    assert_eq!(objects.len(), 1);
    assert_eq!(objects[0].etag.as_deref(), Some("\"e1\""));

    let report = server
        .requests()
        .into_iter()
        .find(|r| r.method == "REPORT")
        .expect("a REPORT was sent");
    assert_eq!(report.depth.as_deref(), Some("1"));
    assert!(report.body.contains(r#"start="20240101T000000Z" end="20240129T000000Z""#));
    assert!(report.body.contains("C:expand"));

    let window = WorkWindow::new(WindowPolicy::minutes(6 * 60, 15 * 60), "Booked");
    let events = parse_availability(&objects[0].data, &window, chrono_tz::Tz::UTC);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].id.as_deref(), Some("standup"));
}

#[test_log::test(tokio::test)]
async fn error_status_is_reported_as_upstream() {
    let server = MockCaldavServer::start(Vec::new())
        .await
        .expect("mock server should bind");
    let client = CaldavClient::new(&server.url(), "u", "p", Duration::from_secs(5))
        .expect("client should build");

    let err = client.list_calendars().await.unwrap_err();

    assert!(matches!(err, ServiceError::UpstreamStatus { status: 404, .. }));
    assert!(err.is_upstream());
}
