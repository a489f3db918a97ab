//! Request caching for one browsing session.
//!
//! This module provides:
//! - `KeyBuilder`: base URL + path cache keys
//! - `SessionStorage`: the session-scoped key-value capability, with
//!   in-memory and on-disk implementations
//! - `SessionCache`: typed get/set/invalidate over that storage
//! - `CachedFetcher`: read-through fetching that fills the cache on a miss
//!
//! Entries live until they are invalidated or the session ends; there is
//! no staleness check.

pub mod fetch;
pub mod key;
pub mod manager;
pub mod storage;

pub use fetch::{CacheHandle, CachedFetcher, FetchError};
pub use key::{CacheKey, KeyBuilder};
pub use manager::{CachedData, SessionCache};
pub use storage::{FileStorage, MemoryStorage, SessionStorage, StorageError};
