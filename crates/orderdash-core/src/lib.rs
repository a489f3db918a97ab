//! Core library for orderdash, the order and customer management dashboard.
//!
//! The crate holds everything the front ends share:
//! - `cache`: session-scoped response cache and read-through fetching
//! - `auth`: the per-navigation auth guard, user session and route checks
//! - `navigation`: route table and navigator running the guards
//! - `api`: the HTTP transport and typed dashboard loaders
//! - `models`, `utils`, `config`

pub mod api;
pub mod auth;
pub mod cache;
pub mod config;
pub mod models;
pub mod navigation;
pub mod utils;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::api::{ApiClient, DashboardApi, Transport};
use crate::auth::{AuthGuard, UserSessionStore};
use crate::cache::{CachedFetcher, FileStorage, KeyBuilder, SessionCache, SessionStorage};
use crate::config::Config;
use crate::navigation::{Navigator, Router};

/// Everything a front end needs, wired from one `Config`.
pub struct Dashboard {
    pub api: DashboardApi,
    pub navigator: Navigator,
    pub cache: SessionCache,
}

impl Dashboard {
    /// Build with the reqwest transport and on-disk session storage.
    pub fn from_config(config: &Config) -> Result<Self> {
        let transport = ApiClient::new(Duration::from_secs(config.request_timeout_secs))
            .context("Failed to build HTTP client")?;
        let storage = FileStorage::new(config.cache_dir()?)
            .context("Failed to open session storage")?;
        let session = UserSessionStore::load(config.user_session_path()?)?;
        Self::assemble(config, Arc::new(transport), Arc::new(storage), Arc::new(session))
    }

    /// Build from explicit parts.
    pub fn assemble(
        config: &Config,
        transport: Arc<dyn Transport>,
        storage: Arc<dyn SessionStorage>,
        session: Arc<UserSessionStore>,
    ) -> Result<Self> {
        let keys = KeyBuilder::new(config.base_url()?);
        let cache = SessionCache::new(storage);
        let fetcher = CachedFetcher::new(keys.clone(), cache.clone(), transport.clone())
            .coalesce_in_flight(config.coalesce_in_flight);
        let guard = AuthGuard::new(keys, transport, session);

        Ok(Self {
            api: DashboardApi::new(Arc::new(fetcher)),
            navigator: Navigator::new(guard, Router::dashboard()),
            cache,
        })
    }
}
