//! Shared application state for Axum routers.

use std::sync::Arc;

use paddock_storage::{InMemoryChangeJournal, LmdbCacheBackend, ReadThroughCache};

use crate::cached_db::CachedDbClient;
use crate::db::DbClient;

/// Type alias for the ReadThroughCache implementation used in the API.
///
/// LMDB backend (fast, memory-mapped, survives restarts) with an
/// InMemoryChangeJournal for invalidation. A multi-instance deployment
/// would swap the journal for a shared one.
pub type ApiCache = ReadThroughCache<LmdbCacheBackend, InMemoryChangeJournal>;

/// Application-wide state shared across all routes.
#[derive(Clone)]
pub struct AppState {
    /// Raw database client (health checks, uncached operations).
    pub db: DbClient,
    /// Cached database client. Routes use this for every resource
    /// operation; the cache is transparent.
    pub cached_db: CachedDbClient,
    /// Read-through cache for hot data.
    pub cache: Arc<ApiCache>,
    pub start_time: std::time::Instant,
}

impl AppState {
    /// Build application state from its parts.
    pub fn new(db: DbClient, cache: Arc<ApiCache>) -> Self {
        let cached_db = CachedDbClient::new(db.clone(), Arc::clone(&cache));
        Self {
            db,
            cached_db,
            cache,
            start_time: std::time::Instant::now(),
        }
    }
}

// FromRef implementations for handler extractors.
crate::impl_from_ref!(DbClient, db);
crate::impl_from_ref!(CachedDbClient, cached_db);
crate::impl_from_ref!(Arc<ApiCache>, cache);
crate::impl_from_ref!(std::time::Instant, start_time);
