//! `CalDAV` HTTP client.
//!
//! Discovery follows RFC 6764 §6 without the well-known step:
//! `current-user-principal` on the server URL, then `calendar-home-set` on
//! the principal, then a Depth 1 listing of the home.

use std::time::Duration;

use reqwest::{Method, Url};
use tokio::sync::OnceCell;

use super::{CalendarSource, SourceFuture, TimeRange};
use crate::error::{ServiceError, ServiceResult};
use openslot_core::config::CalendarConfig;
use openslot_rfc::error::RfcError;
use openslot_rfc::rfc::dav::build::{
    calendar_home_set_propfind, calendar_listing_propfind, calendar_query,
    current_user_principal_propfind,
};
use openslot_rfc::rfc::dav::core::{CalendarObject, Depth, Multistatus, RemoteCalendar};
use openslot_rfc::rfc::dav::parse::parse_multistatus;

const XML_CONTENT_TYPE: &str = "application/xml; charset=utf-8";

/// Authenticated client for one `CalDAV` account.
pub struct CaldavClient {
    http: reqwest::Client,
    server_url: Url,
    username: String,
    password: String,
    /// Calendar home, discovered on first use.
    home: OnceCell<Url>,
}

impl std::fmt::Debug for CaldavClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaldavClient")
            .field("server_url", &self.server_url.as_str())
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

impl CaldavClient {
    /// ## Summary
    /// Creates a client for the given server and credentials.
    ///
    /// ## Errors
    /// Returns an error if the server URL is invalid or the HTTP client cannot
    /// be built.
    pub fn new(
        server_url: &str,
        username: &str,
        password: &str,
        timeout: Duration,
    ) -> ServiceResult<Self> {
        let server_url = Url::parse(server_url).map_err(|e| {
            ServiceError::InvalidConfiguration(format!("invalid calendar server URL: {e}"))
        })?;

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()?;

        Ok(Self {
            http,
            server_url,
            username: username.to_string(),
            password: password.to_string(),
            home: OnceCell::new(),
        })
    }

    /// ## Summary
    /// Creates a client from settings.
    ///
    /// Returns `Ok(None)` when no credentials are configured.
    ///
    /// ## Errors
    /// Returns an error if the configured URL is invalid.
    pub fn from_config(config: &CalendarConfig) -> ServiceResult<Option<Self>> {
        let Some((username, password)) = config.credentials() else {
            tracing::warn!("Calendar credentials not configured");
            return Ok(None);
        };

        Self::new(
            config.server_url(),
            username,
            password,
            Duration::from_secs(config.request_timeout_seconds),
        )
        .map(Some)
    }

    #[must_use]
    pub fn server_url(&self) -> &Url {
        &self.server_url
    }

    /// Sends a DAV request and parses the multistatus reply. Returns the
    /// final URL after redirects along with the parsed body.
    #[tracing::instrument(skip(self, body), fields(url = %url))]
    async fn send(
        &self,
        method: &'static [u8],
        url: Url,
        depth: Depth,
        body: String,
    ) -> ServiceResult<(Url, Multistatus)> {
        let method = Method::from_bytes(method)
            .map_err(|_e| ServiceError::InvariantViolation("invalid DAV method"))?;

        let response = self
            .http
            .request(method, url)
            .basic_auth(&self.username, Some(&self.password))
            .header(reqwest::header::CONTENT_TYPE, XML_CONTENT_TYPE)
            .header("Depth", depth.as_str())
            .body(body)
            .send()
            .await?;

        let status = response.status();
        let final_url = response.url().clone();

        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), url = %final_url, "DAV request failed");
            return Err(ServiceError::UpstreamStatus {
                status: status.as_u16(),
                url: final_url.to_string(),
            });
        }

        let bytes = response.bytes().await?;
        let multistatus = parse_multistatus(&bytes).map_err(RfcError::from)?;

        tracing::trace!(responses = multistatus.responses.len(), "DAV request succeeded");

        Ok((final_url, multistatus))
    }

    async fn propfind(
        &self,
        url: Url,
        depth: Depth,
        body: String,
    ) -> ServiceResult<(Url, Multistatus)> {
        self.send(b"PROPFIND", url, depth, body).await
    }

    /// Finds the `href` of a property on any response and resolves it.
    fn find_href(base: &Url, multistatus: &Multistatus, property: &str) -> ServiceResult<Url> {
        let href = multistatus
            .responses
            .iter()
            .find_map(|response| response.href_of(property))
            .ok_or_else(|| ServiceError::DiscoveryError(format!("no {property} in response")))?;
        resolve_href(base, href)
    }

    #[tracing::instrument(skip(self))]
    async fn discover_calendar_home(&self) -> ServiceResult<Url> {
        let body = current_user_principal_propfind().map_err(RfcError::from)?;
        let (base, multistatus) = self
            .propfind(self.server_url.clone(), Depth::Zero, body)
            .await?;
        let principal = Self::find_href(&base, &multistatus, "current-user-principal")?;
        tracing::debug!(principal = %principal, "Discovered principal");

        let body = calendar_home_set_propfind().map_err(RfcError::from)?;
        let (base, multistatus) = self.propfind(principal, Depth::Zero, body).await?;
        let home = Self::find_href(&base, &multistatus, "calendar-home-set")?;
        tracing::debug!(home = %home, "Discovered calendar home");

        Ok(home)
    }

    async fn calendar_home(&self) -> ServiceResult<&Url> {
        self.home
            .get_or_try_init(|| self.discover_calendar_home())
            .await
    }

    /// ## Summary
    /// Lists the calendar collections under the calendar home.
    ///
    /// Calendar URLs are absolute.
    ///
    /// ## Errors
    /// Returns an error if discovery or the listing request fails.
    #[tracing::instrument(skip(self))]
    pub async fn calendars(&self) -> ServiceResult<Vec<RemoteCalendar>> {
        let home = self.calendar_home().await?.clone();

        let body = calendar_listing_propfind().map_err(RfcError::from)?;
        let (base, multistatus) = self.propfind(home, Depth::One, body).await?;

        let mut calendars = Vec::new();
        for response in &multistatus.responses {
            if let Some(mut calendar) = RemoteCalendar::from_response(response) {
                calendar.url = resolve_href(&base, &calendar.url)?.to_string();
                calendars.push(calendar);
            }
        }

        tracing::debug!(count = calendars.len(), "Listed calendars");
        Ok(calendars)
    }

    /// ## Summary
    /// Runs a calendar-query REPORT for VEVENTs in `range`.
    ///
    /// ## Errors
    /// Returns an error if the calendar URL is invalid or the request fails.
    #[tracing::instrument(skip(self, calendar), fields(calendar = %calendar.url))]
    pub async fn calendar_objects(
        &self,
        calendar: &RemoteCalendar,
        range: TimeRange,
        expand: bool,
    ) -> ServiceResult<Vec<CalendarObject>> {
        let url = Url::parse(&calendar.url).map_err(|e| {
            ServiceError::DiscoveryError(format!("invalid calendar URL {}: {e}", calendar.url))
        })?;

        let body = calendar_query(&range.start, &range.end, expand).map_err(RfcError::from)?;
        let (_, multistatus) = self.send(b"REPORT", url, Depth::One, body).await?;

        let objects: Vec<_> = multistatus
            .responses
            .iter()
            .filter_map(CalendarObject::from_response)
            .collect();

        tracing::debug!(count = objects.len(), "Fetched calendar objects");
        Ok(objects)
    }
}

impl CalendarSource for CaldavClient {
    fn list_calendars(&self) -> SourceFuture<'_, Vec<RemoteCalendar>> {
        Box::pin(self.calendars())
    }

    fn fetch_objects<'a>(
        &'a self,
        calendar: &'a RemoteCalendar,
        range: TimeRange,
        expand: bool,
    ) -> SourceFuture<'a, Vec<CalendarObject>> {
        Box::pin(self.calendar_objects(calendar, range, expand))
    }
}

/// Resolves an href (absolute URL or path) against the URL it came from.
fn resolve_href(base: &Url, href: &str) -> ServiceResult<Url> {
    base.join(href.trim())
        .map_err(|e| ServiceError::DiscoveryError(format!("invalid href {href}: {e}")))
}
