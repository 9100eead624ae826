//! Key-value storage for the calendar selection and the availability cache.
//!
//! Values are JSON text. Two backends exist: an in-process cache for single
//! instances and tests, and a Redis-over-REST client for shared deployments.

mod memory;
mod rest;

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::ServiceResult;
use openslot_core::config::{StoreBackend, StoreConfig};

pub use memory::MemoryStore;
pub use rest::RestStore;

pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = ServiceResult<T>> + Send + 'a>>;

/// A string key-value store with optional per-entry expiry.
pub trait KvStore: Send + Sync {
    /// Returns the stored value, or `None` if absent or expired.
    fn get<'a>(&'a self, key: &'a str) -> StoreFuture<'a, Option<String>>;

    /// Stores a value, replacing any previous one. `ttl = None` never expires.
    fn set<'a>(
        &'a self,
        key: &'a str,
        value: String,
        ttl: Option<Duration>,
    ) -> StoreFuture<'a, ()>;
}

/// ## Summary
/// Builds the configured store backend.
///
/// ## Errors
/// Returns an error if the REST backend is selected without a URL or token,
/// or its HTTP client cannot be built.
pub fn store_from_config(
    config: &StoreConfig,
    request_timeout: Duration,
) -> ServiceResult<Arc<dyn KvStore>> {
    match config.backend {
        StoreBackend::Memory => {
            tracing::info!(max_entries = config.max_entries, "Using in-memory store");
            Ok(Arc::new(MemoryStore::new(config.max_entries)))
        }
        StoreBackend::Rest => {
            let url = config.url.as_deref().unwrap_or_default();
            let token = config.token.as_deref().unwrap_or_default();
            tracing::info!(url, "Using REST store");
            Ok(Arc::new(RestStore::new(url, token, request_timeout)?))
        }
    }
}

/// ## Summary
/// Reads and deserializes a JSON value.
///
/// ## Errors
/// Returns an error if the store fails or the stored text is not valid JSON
/// for `T`.
pub async fn get_json<T: DeserializeOwned>(
    store: &dyn KvStore,
    key: &str,
) -> ServiceResult<Option<T>> {
    match store.get(key).await? {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

/// ## Summary
/// Serializes and stores a JSON value.
///
/// ## Errors
/// Returns an error if serialization or the store fails.
pub async fn set_json<T: Serialize + ?Sized>(
    store: &dyn KvStore,
    key: &str,
    value: &T,
    ttl: Option<Duration>,
) -> ServiceResult<()> {
    let raw = serde_json::to_string(value)?;
    store.set(key, raw, ttl).await
}
