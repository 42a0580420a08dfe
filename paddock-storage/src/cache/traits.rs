//! Cache backend traits and cacheable entity marker.
//!
//! This module defines the traits that must be implemented by cache backends
//! and entities that can be cached.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use paddock_core::{CoreResult, ResourceKind};
use serde::{de::DeserializeOwned, Serialize};
use uuid::Uuid;

use super::query_key::QueryKey;

/// Marker trait for types that can be cached by their own identity.
///
/// Types implementing this trait can derive their own `by_id` query key,
/// which the cache uses to warm entries after writes.
///
/// # Implementation Requirements
///
/// - `resource_kind()` must return a consistent value for all instances
/// - `entity_id()` must return the unique identifier for this instance
/// - `farm_id()` must return the farm that owns this entity
/// - Implementations must be `Clone`, `Serialize`, and `DeserializeOwned`
///   for cache storage, and `Send + Sync + 'static` for async compatibility
pub trait CacheableEntity: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Get the resource kind (query-key scope) for this cacheable.
    fn resource_kind() -> ResourceKind;

    /// Get the unique identifier for this entity.
    fn entity_id(&self) -> Uuid;

    /// Get the farm that owns this entity.
    fn farm_id(&self) -> Uuid;

    /// The `by_id` query key for this entity instance.
    fn self_key(&self) -> QueryKey {
        QueryKey::by_id(self.farm_id(), Self::resource_kind(), self.entity_id())
    }
}

/// Cache backend trait for pluggable cache implementations.
///
/// Backends are byte-oriented: values are opaque serialized blobs indexed by
/// encoded [`QueryKey`]s. This lets the same backend cache single entities
/// (`by_id` keys) and whole list responses (`list` keys), and makes
/// scope-prefix invalidation a plain prefix scan.
///
/// Implementations must be thread-safe and support concurrent access.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Get a raw value and the time it was cached, or None if not present.
    async fn get_bytes(&self, key: &QueryKey) -> CoreResult<Option<(Vec<u8>, DateTime<Utc>)>>;

    /// Put a raw value into the cache.
    ///
    /// The `cached_at` timestamp is stored alongside the value to support
    /// staleness calculations.
    async fn put_bytes(
        &self,
        key: &QueryKey,
        value: &[u8],
        cached_at: DateTime<Utc>,
    ) -> CoreResult<()>;

    /// Delete one entry. Returns true if an entry existed.
    async fn delete(&self, key: &QueryKey) -> CoreResult<bool>;

    /// Invalidate every cached entry for one resource scope within a farm.
    ///
    /// This removes the scope's `all` key, every `by_id` key, and every
    /// `list` key, relying on the prefix-extension property of [`QueryKey`].
    /// Returns the number of entries removed.
    async fn invalidate_scope(&self, farm_id: Uuid, scope: ResourceKind) -> CoreResult<u64>;

    /// Invalidate every cached entry for a farm.
    ///
    /// Bulk operation, typically used when a farm's data is being reset or
    /// cache corruption is suspected. Returns the number of entries removed.
    async fn invalidate_farm(&self, farm_id: Uuid) -> CoreResult<u64>;
}

/// Aggregate cache statistics for observability.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Reads served from the cache.
    pub hits: u64,
    /// Reads that fell through to storage.
    pub misses: u64,
    /// Entries currently stored.
    pub entry_count: u64,
    /// Entries removed by invalidation.
    pub invalidations: u64,
}

impl CacheStats {
    /// Hit ratio in [0, 1]; zero when no reads have happened.
    pub fn hit_ratio(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}
