use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::key::CacheKey;
use super::storage::{MemoryStorage, SessionStorage, StorageError};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedData<T> {
    pub data: T,
    pub cached_at: DateTime<Utc>,
}

impl<T> CachedData<T> {
    pub fn new(data: T) -> Self {
        Self {
            data,
            cached_at: Utc::now(),
        }
    }

    pub fn age_minutes(&self) -> i64 {
        let now = Utc::now();
        (now - self.cached_at).num_minutes()
    }

    pub fn age_display(&self) -> String {
        let minutes = self.age_minutes();
        if minutes < 1 {
            // Also covers clock skew
            "just now".to_string()
        } else if minutes < 60 {
            format!("{}m ago", minutes)
        } else if minutes < 1440 {
            let hours = minutes / 60;
            let remaining_mins = minutes % 60;
            if remaining_mins >= 30 {
                // Round up: 1h 30m+ becomes 2h
                format!("{}h ago", hours + 1)
            } else {
                format!("{}h ago", hours)
            }
        } else {
            let days = minutes / 1440;
            let remaining_hours = (minutes % 1440) / 60;
            if remaining_hours >= 12 {
                format!("{}d ago", days + 1)
            } else {
                format!("{}d ago", days)
            }
        }
    }
}

/// Response cache living for one browsing session.
///
/// Entries are `CachedData` envelopes serialized as JSON, so nested
/// payloads come back structurally identical. An entry whose `data` is
/// `null` reads as absent. Storage errors are returned as-is; this layer
/// does not try to recover from them.
#[derive(Clone)]
pub struct SessionCache {
    storage: Arc<dyn SessionStorage>,
}

impl SessionCache {
    pub fn new(storage: Arc<dyn SessionStorage>) -> Self {
        Self { storage }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStorage::new()))
    }

    pub fn get_entry<T: DeserializeOwned>(
        &self,
        key: &CacheKey,
    ) -> Result<Option<CachedData<T>>, StorageError> {
        let Some(contents) = self.storage.get_item(key.as_str())? else {
            return Ok(None);
        };

        let serialization = |source| StorageError::Serialization {
            key: key.to_string(),
            source,
        };
        let cached: CachedData<Value> = serde_json::from_str(&contents).map_err(serialization)?;
        if cached.data.is_null() {
            return Ok(None);
        }

        let data = serde_json::from_value(cached.data).map_err(serialization)?;
        Ok(Some(CachedData {
            data,
            cached_at: cached.cached_at,
        }))
    }

    pub fn get<T: DeserializeOwned>(&self, key: &CacheKey) -> Result<Option<T>, StorageError> {
        Ok(self.get_entry(key)?.map(|cached| cached.data))
    }

    pub fn contains(&self, key: &CacheKey) -> Result<bool, StorageError> {
        Ok(self.get_entry::<Value>(key)?.is_some())
    }

    pub fn set<T: Serialize>(&self, key: &CacheKey, value: &T) -> Result<(), StorageError> {
        let cached = CachedData::new(value);
        let contents =
            serde_json::to_string(&cached).map_err(|source| StorageError::Serialization {
                key: key.to_string(),
                source,
            })?;
        self.storage.set_item(key.as_str(), &contents)
    }

    pub fn invalidate(&self, key: &CacheKey) -> Result<(), StorageError> {
        debug!(key = %key, "Invalidating cache entry");
        self.storage.remove_item(key.as_str())
    }

    /// Forget every entry, as when the browsing session ends.
    pub fn clear(&self) -> Result<(), StorageError> {
        self.storage.clear()
    }

    /// Age of an entry for display. Read errors are logged, not returned.
    pub fn age(&self, key: &CacheKey) -> Option<String> {
        match self.get_entry::<Value>(key) {
            Ok(Some(cached)) => Some(cached.age_display()),
            Ok(None) => None,
            Err(e) => {
                debug!(key = %key, error = %e, "Failed to load cache for age display");
                None
            }
        }
    }
}
