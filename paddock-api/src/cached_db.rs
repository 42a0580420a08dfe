//! Cached Database Client
//!
//! `CachedDbClient` binds query keys to the generic database operations.
//! Reads go through the read-through cache keyed by `by_id`/`list` query
//! keys with `Freshness::Consistent`; writes pass through to storage,
//! record the change in the journal, invalidate the resource's scope
//! prefix, and warm the entity's own `by_id` entry with the fresh row.
//!
//! Scope-prefix invalidation removes every `list` key of the resource
//! along with the stale `by_id` entry. Over-invalidation is safe and costs
//! a refetch; under-invalidation would serve stale listings.

use std::sync::Arc;

use paddock_core::{CoreError, EntityId, FarmId, StorageError};
use paddock_storage::{
    CacheableEntity, ChangeJournal, Freshness, InMemoryChangeJournal, LmdbCacheBackend, QueryKey,
    ReadThroughCache,
};

use crate::db::DbClient;
use crate::error::{ApiError, ApiResult};
use crate::resource::{ListFilter, Resource};

/// The cache implementation used by `CachedDbClient`.
///
/// Matches the `ApiCache` alias in state.rs; both must be kept in sync.
pub type CacheImpl = ReadThroughCache<LmdbCacheBackend, InMemoryChangeJournal>;

/// Database client with transparent read-through caching.
#[derive(Clone)]
pub struct CachedDbClient {
    /// The underlying database client.
    db: DbClient,
    /// The read-through cache.
    cache: Arc<CacheImpl>,
}

impl CachedDbClient {
    /// Create a new cached database client.
    pub fn new(db: DbClient, cache: Arc<CacheImpl>) -> Self {
        Self { db, cache }
    }

    /// Get a reference to the underlying database client.
    pub fn db(&self) -> &DbClient {
        &self.db
    }

    /// Get a reference to the cache.
    pub fn cache(&self) -> &CacheImpl {
        &self.cache
    }

    // ========================================================================
    // READS
    // ========================================================================

    /// Get an entity by id, checking the cache first.
    ///
    /// Uses `Freshness::Consistent` so a read after any mutation to the
    /// resource's scope refetches from storage.
    pub async fn get<R>(&self, id: EntityId, farm_id: FarmId) -> ApiResult<Option<R>>
    where
        R: Resource + CacheableEntity,
    {
        let key = QueryKey::by_id(farm_id, R::KIND, id);
        let db = self.db.clone();
        let fetcher = move || {
            let db = db.clone();
            async move { db.get::<R>(id, farm_id).await.map_err(into_core_error) }
        };

        let read = self
            .cache
            .get::<R, _>(&key, Freshness::Consistent, &fetcher)
            .await
            .map_err(ApiError::from)?;

        Ok(read.map(|r| r.into_value()))
    }

    /// Get an entity by id, converting absence into a not-found error.
    ///
    /// Used for resources where a missing row is a caller mistake rather
    /// than a valid "no content yet" state.
    pub async fn get_required<R>(&self, id: EntityId, farm_id: FarmId) -> ApiResult<R>
    where
        R: Resource + CacheableEntity,
    {
        self.get::<R>(id, farm_id)
            .await?
            .ok_or_else(|| ApiError::entity_not_found(R::KIND.display_name(), id))
    }

    /// Get an entity by id, applying the resource's declared read policy.
    ///
    /// A missing row is a not-found error unless the resource declares
    /// `NULLABLE_READ`, in which case `None` passes through as a valid
    /// "no content" result.
    pub async fn get_for_read<R>(&self, id: EntityId, farm_id: FarmId) -> ApiResult<Option<R>>
    where
        R: Resource + CacheableEntity,
    {
        apply_read_policy::<R>(id, self.get::<R>(id, farm_id).await?)
    }

    /// List entities matching a filter, checking the cache first.
    ///
    /// The whole page is cached under the `list` query key derived from the
    /// filter's key fields; structurally equal filters hit the same entry.
    pub async fn list<R>(&self, filter: R::ListFilter, farm_id: FarmId) -> ApiResult<Vec<R>>
    where
        R: Resource + CacheableEntity,
        R::ListFilter: Clone + 'static,
    {
        let key = QueryKey::list(farm_id, R::KIND, filter.key_fields());
        let db = self.db.clone();
        let fetcher = move || {
            let db = db.clone();
            let filter = filter.clone();
            async move {
                db.list::<R>(&filter, farm_id)
                    .await
                    .map(Some)
                    .map_err(into_core_error)
            }
        };

        let read = self
            .cache
            .get::<Vec<R>, _>(&key, Freshness::Consistent, &fetcher)
            .await
            .map_err(ApiError::from)?;

        // The fetcher always returns Some, so a missing read means an empty
        // page anyway.
        Ok(read.map(|r| r.into_value()).unwrap_or_default())
    }

    /// Get the most recently created entity of a resource, if any.
    ///
    /// Cached under a `list` key with a distinguished `view` field so that
    /// scope-prefix invalidation drops it whenever the resource mutates.
    pub async fn latest<R>(&self, farm_id: FarmId) -> ApiResult<Option<R>>
    where
        R: Resource + CacheableEntity,
    {
        let key = QueryKey::list(
            farm_id,
            R::KIND,
            vec![("view".to_string(), "latest".to_string())],
        );
        let db = self.db.clone();
        let fetcher = move || {
            let db = db.clone();
            async move { db.latest::<R>(farm_id).await.map_err(into_core_error) }
        };

        let read = self
            .cache
            .get::<R, _>(&key, Freshness::Consistent, &fetcher)
            .await
            .map_err(ApiError::from)?;

        Ok(read.map(|r| r.into_value()))
    }

    // ========================================================================
    // WRITES
    // ========================================================================

    /// Create an entity, then invalidate the scope and warm its own entry.
    pub async fn create<R>(&self, req: &R::Create, farm_id: FarmId) -> ApiResult<R>
    where
        R: Resource + CacheableEntity,
    {
        let response = self.db.create::<R>(req, farm_id).await?;
        self.record_write::<R>(farm_id, Resource::entity_id(&response))
            .await?;

        self.cache
            .put(&response.self_key(), &response)
            .await
            .map_err(ApiError::from)?;

        Ok(response)
    }

    /// Update an entity, then invalidate the scope and warm its own entry.
    pub async fn update<R>(
        &self,
        id: EntityId,
        req: &R::Update,
        farm_id: FarmId,
    ) -> ApiResult<R>
    where
        R: Resource + CacheableEntity,
    {
        let response = self.db.update::<R>(id, req, farm_id).await?;
        self.record_write::<R>(farm_id, id).await?;

        self.cache
            .put(&response.self_key(), &response)
            .await
            .map_err(ApiError::from)?;

        Ok(response)
    }

    /// Delete an entity, then invalidate the scope.
    pub async fn delete<R>(&self, id: EntityId, farm_id: FarmId) -> ApiResult<()>
    where
        R: Resource + CacheableEntity,
    {
        self.db.delete::<R>(id, farm_id).await?;
        self.record_write::<R>(farm_id, id).await?;
        Ok(())
    }

    /// Record a mutation in the journal and drop the scope's cached entries.
    async fn record_write<R>(&self, farm_id: FarmId, id: EntityId) -> ApiResult<()>
    where
        R: Resource + CacheableEntity,
    {
        self.cache
            .journal()
            .record_change(farm_id, R::KIND, id)
            .await
            .map_err(ApiError::from)?;

        self.cache
            .invalidate_scope(farm_id, R::KIND)
            .await
            .map_err(ApiError::from)?;

        Ok(())
    }
}

fn into_core_error(e: ApiError) -> CoreError {
    CoreError::Storage(StorageError::TransactionFailed { reason: e.message })
}

/// Apply a resource's read policy to a fetched row.
pub(crate) fn apply_read_policy<R: Resource>(
    id: EntityId,
    row: Option<R>,
) -> ApiResult<Option<R>> {
    match row {
        None if !R::NULLABLE_READ => {
            Err(ApiError::entity_not_found(R::KIND.display_name(), id))
        }
        other => Ok(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::types::boarder::BoarderResponse;
    use crate::types::message::MessageResponse;

    #[test]
    fn missing_row_is_not_found_for_required_resources() {
        let id = uuid::Uuid::now_v7();
        let err = apply_read_policy::<BoarderResponse>(id, None)
            .expect_err("missing boarder is an error");
        assert_eq!(err.code, ErrorCode::EntityNotFound);
        assert!(err.message.contains(&id.to_string()));
    }

    #[test]
    fn missing_row_passes_through_for_nullable_resources() {
        let id = uuid::Uuid::now_v7();
        let row = apply_read_policy::<MessageResponse>(id, None)
            .expect("absent messages are a valid result");
        assert!(row.is_none());
    }
}
