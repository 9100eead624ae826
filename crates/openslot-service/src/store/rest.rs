//! Redis-over-REST store (Upstash-compatible command API).
//!
//! Each command is POSTed as a JSON array, e.g. `["GET", "key"]`, with a
//! bearer token. Replies are `{"result": ...}` or `{"error": "..."}`.

use std::time::Duration;

use serde::Deserialize;

use super::{KvStore, StoreFuture};
use crate::error::{ServiceError, ServiceResult};

#[derive(Debug, Deserialize)]
struct CommandReply {
    #[serde(default)]
    result: serde_json::Value,
    #[serde(default)]
    error: Option<String>,
}

/// Store client for a Redis REST endpoint.
#[derive(Clone)]
pub struct RestStore {
    client: reqwest::Client,
    url: String,
    token: String,
}

impl std::fmt::Debug for RestStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestStore")
            .field("url", &self.url)
            .finish_non_exhaustive()
    }
}

impl RestStore {
    /// ## Summary
    /// Creates a client for the given endpoint.
    ///
    /// ## Errors
    /// Returns an error if the URL or token is empty or the HTTP client cannot
    /// be built.
    pub fn new(url: &str, token: &str, timeout: Duration) -> ServiceResult<Self> {
        if url.trim().is_empty() || token.is_empty() {
            return Err(ServiceError::InvalidConfiguration(
                "REST store requires a URL and token".to_string(),
            ));
        }

        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            url: url.trim().trim_end_matches('/').to_string(),
            token: token.to_string(),
        })
    }

    #[tracing::instrument(skip(self, args), fields(command = %args.first().map_or("", String::as_str)))]
    async fn command(&self, args: Vec<String>) -> ServiceResult<serde_json::Value> {
        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.token)
            .json(&args)
            .send()
            .await?;

        let status = response.status();
        let reply: CommandReply = response.json().await.map_err(|e| {
            tracing::warn!(status = status.as_u16(), error = %e, "Unreadable store reply");
            ServiceError::StoreError(format!("unreadable reply (status {status})"))
        })?;

        if let Some(error) = reply.error {
            return Err(ServiceError::StoreError(error));
        }
        if !status.is_success() {
            return Err(ServiceError::UpstreamStatus {
                status: status.as_u16(),
                url: self.url.clone(),
            });
        }

        Ok(reply.result)
    }
}

/// Builds the argument list for a SET with optional expiry.
fn set_command(key: &str, value: String, ttl: Option<Duration>) -> Vec<String> {
    let mut args = vec!["SET".to_string(), key.to_string(), value];
    if let Some(ttl) = ttl {
        args.push("EX".to_string());
        args.push(ttl.as_secs().max(1).to_string());
    }
    args
}

/// Maps a GET result to the stored text.
fn reply_to_value(result: serde_json::Value) -> Option<String> {
    match result {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

impl KvStore for RestStore {
    fn get<'a>(&'a self, key: &'a str) -> StoreFuture<'a, Option<String>> {
        Box::pin(async move {
            let result = self
                .command(vec!["GET".to_string(), key.to_string()])
                .await?;
            Ok(reply_to_value(result))
        })
    }

    fn set<'a>(
        &'a self,
        key: &'a str,
        value: String,
        ttl: Option<Duration>,
    ) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            self.command(set_command(key, value, ttl)).await?;
            Ok(())
        })
    }
}
