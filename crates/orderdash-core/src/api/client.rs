//! HTTP transport for the dashboard API.
//!
//! `Transport` is the capability the cache and the auth guard depend on:
//! perform a GET and hand back the raw body, or fail with an `ApiError`.
//! `ApiClient` is the reqwest-backed implementation used in production.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client};
use tracing::debug;

use super::ApiError;

/// Per-request identity forwarded to the API.
///
/// Carries the inbound `Cookie` header so that every caller presents the
/// same session to the server.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    pub cookie: Option<String>,
}

impl RequestContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cookie(cookie: impl Into<String>) -> Self {
        Self {
            cookie: Some(cookie.into()),
        }
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    /// Perform a GET against a fully built URL and return the response body.
    async fn get(&self, url: &str, ctx: &RequestContext) -> Result<String, ApiError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn get(&self, url: &str, ctx: &RequestContext) -> Result<String, ApiError> {
        (**self).get(url, ctx).await
    }
}

/// API client for the dashboard backend.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
}

impl ApiClient {
    /// Create a new API client with a cookie store, so credentials set by
    /// the server are sent back on later requests.
    pub fn new(timeout: Duration) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(timeout)
            .cookie_store(true)
            .build()?;

        Ok(Self { client })
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status.as_u16(), &body))
        }
    }
}

#[async_trait]
impl Transport for ApiClient {
    async fn get(&self, url: &str, ctx: &RequestContext) -> Result<String, ApiError> {
        let mut request = self
            .client
            .get(url)
            .header(header::ACCEPT, "application/json");
        if let Some(ref cookie) = ctx.cookie {
            request = request.header(header::COOKIE, cookie.as_str());
        }

        let response = request.send().await?;
        let response = Self::check_response(response).await?;
        let status = response.status();
        let body = response.text().await?;
        debug!(url = url, status = %status, bytes = body.len(), "GET response received");
        Ok(body)
    }
}
