//! Read-through fetching backed by the session cache.
//!
//! `CachedFetcher::fetch` checks the cache first and only goes to the
//! network on a miss. Successful responses are written to the cache before
//! the handle is returned. An empty body is an error and is never cached.

use std::collections::HashMap;
use std::ops::Deref;
use std::sync::{Arc, Mutex};

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use super::key::{CacheKey, KeyBuilder};
use super::manager::SessionCache;
use super::storage::StorageError;
use crate::api::{ApiError, RequestContext, Transport};

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Could not fetch data from {key}: {source}")]
    Transport {
        key: CacheKey,
        #[source]
        source: ApiError,
    },

    #[error("Could not fetch data from {key}: response body was empty")]
    EmptyBody { key: CacheKey },

    #[error("Could not decode data from {key}: {source}")]
    Decode {
        key: CacheKey,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl FetchError {
    /// HTTP status of the underlying transport failure, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Transport { source, .. } => source.status(),
            _ => None,
        }
    }

    pub fn key(&self) -> Option<&CacheKey> {
        match self {
            FetchError::Transport { key, .. }
            | FetchError::EmptyBody { key }
            | FetchError::Decode { key, .. } => Some(key),
            FetchError::Storage(_) => None,
        }
    }
}

/// A fetched value together with the cache entry it came from.
///
/// `value()` is the snapshot taken when the handle was produced. `get()`
/// reads the shared entry again, so a `set()` made through any handle for
/// the same key is visible to every other holder.
#[derive(Clone)]
pub struct CacheHandle<T> {
    key: CacheKey,
    value: T,
    cache: SessionCache,
}

impl<T> CacheHandle<T> {
    pub fn key(&self) -> &CacheKey {
        &self.key
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn into_value(self) -> T {
        self.value
    }
}

impl<T: Serialize + DeserializeOwned> CacheHandle<T> {
    /// Current value of the shared entry, absent once invalidated.
    pub fn get(&self) -> Result<Option<T>, StorageError> {
        self.cache.get(&self.key)
    }

    /// Write through to the shared entry and update the snapshot.
    pub fn set(&mut self, value: T) -> Result<(), StorageError> {
        self.cache.set(&self.key, &value)?;
        self.value = value;
        Ok(())
    }

    /// Reload the snapshot from the shared entry. Returns false, keeping
    /// the old snapshot, when the entry has been invalidated.
    pub fn refresh(&mut self) -> Result<bool, StorageError> {
        match self.cache.get(&self.key)? {
            Some(value) => {
                self.value = value;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn invalidate(&self) -> Result<(), StorageError> {
        self.cache.invalidate(&self.key)
    }
}

impl<T> Deref for CacheHandle<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.value
    }
}

type InFlight = Arc<tokio::sync::Mutex<()>>;

pub struct CachedFetcher {
    keys: KeyBuilder,
    cache: SessionCache,
    transport: Arc<dyn Transport>,
    /// Per-key locks for requests currently on the wire. `None` disables
    /// coalescing, so concurrent misses each hit the network.
    in_flight: Option<Mutex<HashMap<CacheKey, InFlight>>>,
}

impl CachedFetcher {
    pub fn new(keys: KeyBuilder, cache: SessionCache, transport: Arc<dyn Transport>) -> Self {
        Self {
            keys,
            cache,
            transport,
            in_flight: Some(Mutex::new(HashMap::new())),
        }
    }

    pub fn coalesce_in_flight(mut self, enabled: bool) -> Self {
        self.in_flight = enabled.then(|| Mutex::new(HashMap::new()));
        self
    }

    pub fn keys(&self) -> &KeyBuilder {
        &self.keys
    }

    pub fn cache(&self) -> &SessionCache {
        &self.cache
    }

    /// Load `path` from the cache, fetching and caching it on a miss.
    pub async fn fetch<T>(&self, path: &str, ctx: &RequestContext) -> Result<CacheHandle<T>, FetchError>
    where
        T: Serialize + DeserializeOwned,
    {
        let key = self.keys.build(path);

        if let Some(value) = self.cache.get::<T>(&key)? {
            debug!(key = %key, "Getting value from cache");
            return Ok(self.handle(key, value));
        }

        let Some(slot) = self.acquire_slot(&key) else {
            return self.fetch_from_network(key, ctx).await;
        };

        let result = {
            let _guard = slot.lock().await;
            // The request we waited on may have filled the entry
            match self.cache.get::<T>(&key) {
                Ok(Some(value)) => {
                    debug!(key = %key, "Getting value from cache after in-flight request");
                    Ok(self.handle(key.clone(), value))
                }
                Ok(None) => self.fetch_from_network(key.clone(), ctx).await,
                Err(e) => Err(e.into()),
            }
        };

        self.release_slot(&key, slot);
        result
    }

    /// Invalidate the entry `fetch(path)` would read.
    pub fn invalidate(&self, path: &str) -> Result<(), StorageError> {
        self.cache.invalidate(&self.keys.build(path))
    }

    /// Invalidate by a key obtained from a handle or an error.
    pub fn invalidate_key(&self, key: &CacheKey) -> Result<(), StorageError> {
        self.cache.invalidate(key)
    }

    async fn fetch_from_network<T>(
        &self,
        key: CacheKey,
        ctx: &RequestContext,
    ) -> Result<CacheHandle<T>, FetchError>
    where
        T: Serialize + DeserializeOwned,
    {
        debug!(key = %key, "Cache miss, fetching from network");
        let body = match self.transport.get(key.as_str(), ctx).await {
            Ok(body) => body,
            Err(source) => return Err(FetchError::Transport { key, source }),
        };

        let value = decode_body::<T>(&key, &body)?;
        self.cache.set(&key, &value)?;
        Ok(self.handle(key, value))
    }

    fn handle<T>(&self, key: CacheKey, value: T) -> CacheHandle<T> {
        CacheHandle {
            key,
            value,
            cache: self.cache.clone(),
        }
    }

    fn acquire_slot(&self, key: &CacheKey) -> Option<InFlight> {
        let table = self.in_flight.as_ref()?;
        let mut table = table.lock().unwrap_or_else(|e| e.into_inner());
        Some(table.entry(key.clone()).or_default().clone())
    }

    fn release_slot(&self, key: &CacheKey, slot: InFlight) {
        let Some(ref table) = self.in_flight else {
            return;
        };
        let mut table = table.lock().unwrap_or_else(|e| e.into_inner());
        // Only the table and this caller hold it: nobody else is waiting
        if Arc::strong_count(&slot) == 2 {
            table.remove(key);
        }
    }
}

/// Decode a response body. Blank bodies and a bare `null` count as empty;
/// `false`, `0` and `""` are real values and get cached.
fn decode_body<T: DeserializeOwned>(key: &CacheKey, body: &str) -> Result<T, FetchError> {
    if body.trim().is_empty() {
        return Err(FetchError::EmptyBody { key: key.clone() });
    }
    let value: Value = serde_json::from_str(body).map_err(|source| FetchError::Decode {
        key: key.clone(),
        source,
    })?;
    if value.is_null() {
        return Err(FetchError::EmptyBody { key: key.clone() });
    }
    serde_json::from_value(value).map_err(|source| FetchError::Decode {
        key: key.clone(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::FakeTransport;
    use crate::config::BaseUrl;
    use serde_json::json;
    use std::time::Duration;

    const BASE: &str = "http://api.test";

    fn fetcher_with(transport: Arc<FakeTransport>) -> CachedFetcher {
        let keys = KeyBuilder::new(BaseUrl::new(BASE).unwrap());
        CachedFetcher::new(keys, SessionCache::in_memory(), transport)
    }

    fn url(path: &str) -> String {
        format!("{}{}", BASE, path)
    }

    #[tokio::test]
    async fn test_first_fetch_hits_network_once() {
        let transport = Arc::new(FakeTransport::new());
        transport.reply(&url("/orders"), r#"{"data":[{"order_id":"1"}]}"#);
        let fetcher = fetcher_with(transport.clone());

        let key = fetcher.keys().build("/orders");
        assert!(!fetcher.cache().contains(&key).unwrap());

        let handle: CacheHandle<Value> = fetcher.fetch("/orders", &RequestContext::new()).await.unwrap();
        assert_eq!(transport.calls(), 1);
        assert_eq!(handle.value()["data"][0]["order_id"], "1");
        assert!(fetcher.cache().contains(&key).unwrap());
    }

    #[tokio::test]
    async fn test_second_fetch_is_served_from_cache() {
        let transport = Arc::new(FakeTransport::new());
        transport.reply(&url("/customers"), r#"{"data":["a","b"]}"#);
        let fetcher = fetcher_with(transport.clone());
        let ctx = RequestContext::new();

        let first: CacheHandle<Value> = fetcher.fetch("/customers", &ctx).await.unwrap();
        // Server changes, but the cached value must win
        transport.reply(&url("/customers"), r#"{"data":["changed"]}"#);
        let second: CacheHandle<Value> = fetcher.fetch("/customers", &ctx).await.unwrap();

        assert_eq!(transport.calls(), 1);
        assert_eq!(first.value(), second.value());
    }

    #[tokio::test]
    async fn test_invalidate_forces_refetch() {
        let transport = Arc::new(FakeTransport::new());
        transport.reply(&url("/users"), r#"[1]"#);
        let fetcher = fetcher_with(transport.clone());
        let ctx = RequestContext::new();

        let _: CacheHandle<Value> = fetcher.fetch("/users", &ctx).await.unwrap();
        fetcher.invalidate("/users").unwrap();
        transport.reply(&url("/users"), r#"[1, 2]"#);
        let handle: CacheHandle<Value> = fetcher.fetch("/users", &ctx).await.unwrap();

        assert_eq!(transport.calls(), 2);
        assert_eq!(*handle, json!([1, 2]));
    }

    #[tokio::test]
    async fn test_invalidate_key_matches_fetch_key() {
        let transport = Arc::new(FakeTransport::new());
        transport.reply(&url("/orders/9"), r#"{"order_id":"9"}"#);
        let fetcher = fetcher_with(transport.clone());
        let ctx = RequestContext::new();

        let handle: CacheHandle<Value> = fetcher.fetch("/orders/9", &ctx).await.unwrap();
        fetcher.invalidate_key(handle.key()).unwrap();
        let _: CacheHandle<Value> = fetcher.fetch("/orders/9", &ctx).await.unwrap();
        assert_eq!(transport.calls(), 2);
    }

    #[tokio::test]
    async fn test_empty_body_is_error_and_not_cached() {
        let transport = Arc::new(FakeTransport::new());
        transport.reply(&url("/stats"), "");
        transport.reply(&url("/null"), "null");
        let fetcher = fetcher_with(transport.clone());
        let ctx = RequestContext::new();

        let err = fetcher.fetch::<Value>("/stats", &ctx).await.err().unwrap();
        assert!(matches!(err, FetchError::EmptyBody { .. }));
        assert!(err.to_string().starts_with("Could not fetch data from http://api.test/stats"));
        assert!(!fetcher.cache().contains(&fetcher.keys().build("/stats")).unwrap());

        let err = fetcher.fetch::<Value>("/null", &ctx).await.err().unwrap();
        assert!(matches!(err, FetchError::EmptyBody { .. }));
    }

    #[tokio::test]
    async fn test_transport_error_carries_status() {
        let transport = Arc::new(FakeTransport::new());
        transport.fail(&url("/orders"), 503);
        let fetcher = fetcher_with(transport.clone());

        let err = fetcher
            .fetch::<Value>("/orders", &RequestContext::new())
            .await
            .err()
            .unwrap();
        assert_eq!(err.status(), Some(503));
        assert_eq!(err.key().map(|k| k.as_str()), Some("http://api.test/orders"));
        assert!(err.to_string().contains("Could not fetch data from http://api.test/orders"));
        assert!(!fetcher.cache().contains(&fetcher.keys().build("/orders")).unwrap());
    }

    #[tokio::test]
    async fn test_undecodable_body_is_not_cached() {
        let transport = Arc::new(FakeTransport::new());
        transport.reply(&url("/orders"), "<html>oops</html>");
        let fetcher = fetcher_with(transport.clone());

        let err = fetcher
            .fetch::<Value>("/orders", &RequestContext::new())
            .await
            .err()
            .unwrap();
        assert!(matches!(err, FetchError::Decode { .. }));
        assert!(!fetcher.cache().contains(&fetcher.keys().build("/orders")).unwrap());
    }

    #[tokio::test]
    async fn test_cookie_is_forwarded() {
        let transport = Arc::new(FakeTransport::new());
        transport.reply(&url("/orders"), "[]");
        let fetcher = fetcher_with(transport.clone());

        let _: CacheHandle<Value> = fetcher
            .fetch("/orders", &RequestContext::with_cookie("sid=abc"))
            .await
            .unwrap();
        let requests = transport.requests();
        assert_eq!(requests[0].0, url("/orders"));
        assert_eq!(requests[0].1.cookie.as_deref(), Some("sid=abc"));
    }

    #[tokio::test]
    async fn test_handle_writes_are_visible_to_other_holders() {
        let transport = Arc::new(FakeTransport::new());
        transport.reply(&url("/customers/1"), r#"{"first_name":"Ada"}"#);
        let fetcher = fetcher_with(transport.clone());
        let ctx = RequestContext::new();

        let mut writer: CacheHandle<Value> = fetcher.fetch("/customers/1", &ctx).await.unwrap();
        let mut reader: CacheHandle<Value> = fetcher.fetch("/customers/1", &ctx).await.unwrap();

        writer.set(json!({"first_name": "Grace"})).unwrap();
        assert_eq!(writer.value()["first_name"], "Grace");
        assert_eq!(reader.get().unwrap().unwrap()["first_name"], "Grace");
        assert!(reader.refresh().unwrap());
        assert_eq!(reader["first_name"], "Grace");

        reader.invalidate().unwrap();
        assert_eq!(writer.get().unwrap(), None);
        assert!(!writer.refresh().unwrap());
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_fetches_are_coalesced() {
        let transport = Arc::new(FakeTransport::with_delay(Duration::from_millis(20)));
        transport.reply(&url("/stats"), r#"{"revenue": 10}"#);
        let fetcher = fetcher_with(transport.clone());
        let ctx = RequestContext::new();

        let (a, b) = futures::future::join(
            fetcher.fetch::<Value>("/stats", &ctx),
            fetcher.fetch::<Value>("/stats", &ctx),
        )
        .await;

        assert_eq!(a.unwrap().value(), b.unwrap().value());
        assert_eq!(transport.calls(), 1);
        assert!(fetcher.in_flight.as_ref().unwrap().lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_without_coalescing_both_fetches_hit_network() {
        let transport = Arc::new(FakeTransport::with_delay(Duration::from_millis(20)));
        transport.reply(&url("/stats"), r#"{"revenue": 10}"#);
        let fetcher = fetcher_with(transport.clone()).coalesce_in_flight(false);
        let ctx = RequestContext::new();

        let (a, b) = futures::future::join(
            fetcher.fetch::<Value>("/stats", &ctx),
            fetcher.fetch::<Value>("/stats", &ctx),
        )
        .await;

        assert!(a.is_ok() && b.is_ok());
        assert_eq!(transport.calls(), 2);
    }

    #[tokio::test]
    async fn test_waiter_retries_after_failed_leader() {
        let transport = Arc::new(FakeTransport::with_delay(Duration::from_millis(20)));
        transport.fail(&url("/orders"), 500);
        let fetcher = fetcher_with(transport.clone());
        let ctx = RequestContext::new();

        let (a, b) = futures::future::join(
            fetcher.fetch::<Value>("/orders", &ctx),
            fetcher.fetch::<Value>("/orders", &ctx),
        )
        .await;

        assert!(a.is_err() && b.is_err());
        assert_eq!(transport.calls(), 2);
    }

    #[tokio::test]
    async fn test_falsy_values_are_cached() {
        let transport = Arc::new(FakeTransport::new());
        transport.reply(&format!("{}/flags/beta", BASE), "false");
        transport.reply(&format!("{}/counts/open", BASE), "0");
        let fetcher = fetcher_with(transport.clone());
        let ctx = RequestContext::new();

        let flag = fetcher.fetch::<Value>("/flags/beta", &ctx).await.unwrap();
        assert_eq!(flag.value(), &json!(false));
        let count = fetcher.fetch::<Value>("/counts/open", &ctx).await.unwrap();
        assert_eq!(count.value(), &json!(0));

        fetcher.fetch::<Value>("/flags/beta", &ctx).await.unwrap();
        fetcher.fetch::<Value>("/counts/open", &ctx).await.unwrap();
        assert_eq!(transport.calls(), 2);
    }
}
