//! Cache key construction.
//!
//! A key is the configured base URL with the request path appended,
//! verbatim. Nothing is normalized: `/orders/` and `/orders`, or two
//! orderings of the same query string, are distinct entries.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::BaseUrl;

/// Storage identifier for one cached response.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Single entry point for key construction. Fetching and invalidating both
/// go through it, so they always agree on the key for a path.
#[derive(Debug, Clone)]
pub struct KeyBuilder {
    base_url: BaseUrl,
}

impl KeyBuilder {
    pub fn new(base_url: BaseUrl) -> Self {
        Self { base_url }
    }

    pub fn base_url(&self) -> &BaseUrl {
        &self.base_url
    }

    pub fn build(&self, path: &str) -> CacheKey {
        CacheKey(format!("{}{}", self.base_url.as_str(), path))
    }
}
