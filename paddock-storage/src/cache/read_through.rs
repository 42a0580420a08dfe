//! Read-through cache with correctness contracts.
//!
//! This module implements the core caching logic, routing reads based on
//! freshness requirements and using the change journal for invalidation.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use paddock_core::{CoreError, CoreResult, StorageError};
use serde::{de::DeserializeOwned, Serialize};

use super::freshness::{CacheRead, Freshness};
use super::journal::{ChangeJournal, Watermark};
use super::query_key::QueryKey;
use super::traits::CacheBackend;

/// Configuration for the read-through cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum staleness for best-effort reads when not specified.
    pub default_max_staleness: Duration,
    /// TTL for cached entries (even if not stale by watermark).
    pub entry_ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            default_max_staleness: Duration::from_secs(60),
            entry_ttl: Duration::from_secs(3600), // 1 hour
        }
    }
}

impl CacheConfig {
    /// Create a new cache config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the default max staleness.
    pub fn with_max_staleness(mut self, duration: Duration) -> Self {
        self.default_max_staleness = duration;
        self
    }

    /// Set the entry TTL.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.entry_ttl = ttl;
        self
    }

    /// A best-effort freshness using this config's default staleness.
    pub fn default_best_effort(&self) -> Freshness {
        Freshness::best_effort(self.default_max_staleness)
    }
}

/// Source of truth for a single cached query.
///
/// The cache knows nothing about SQL or tables; on a miss it delegates to a
/// `Fetch` implementation, which is usually a closure over a database client
/// and the query parameters.
#[async_trait]
pub trait Fetch<T>: Send + Sync {
    /// Fetch the value from the underlying storage.
    ///
    /// Returns `Ok(None)` when the query has no result, which the cache
    /// passes through without storing anything.
    async fn fetch(&self) -> CoreResult<Option<T>>;
}

/// Any async closure returning the fetched value works as a `Fetch`.
#[async_trait]
impl<T, F, Fut> Fetch<T> for F
where
    F: Fn() -> Fut + Send + Sync,
    Fut: std::future::Future<Output = CoreResult<Option<T>>> + Send,
    T: 'static,
{
    async fn fetch(&self) -> CoreResult<Option<T>> {
        self().await
    }
}

/// Read-through cache with correctness contracts.
///
/// This cache ensures callers explicitly specify their freshness requirements
/// and provides staleness metadata with all reads.
///
/// # Type Parameters
///
/// - `C`: The cache backend for storing serialized values
/// - `J`: The change journal for invalidation
///
/// # Example
///
/// ```ignore
/// let cache = ReadThroughCache::new(backend, journal, config);
/// let key = QueryKey::by_id(farm_id, ResourceKind::Horse, horse_id);
///
/// // Best-effort read (may be stale)
/// let read = cache.get::<HorseRecord, _>(
///     &key,
///     Freshness::BestEffort { max_staleness: Duration::from_secs(60) },
///     &fetcher,
/// ).await?;
///
/// // Consistent read (checks journal)
/// let read = cache.get::<HorseRecord, _>(&key, Freshness::Consistent, &fetcher).await?;
/// ```
pub struct ReadThroughCache<C, J>
where
    C: CacheBackend,
    J: ChangeJournal,
{
    /// The cache backend.
    cache: Arc<C>,
    /// The change journal for invalidation.
    journal: Arc<J>,
    /// Cache configuration.
    config: CacheConfig,
}

impl<C, J> ReadThroughCache<C, J>
where
    C: CacheBackend,
    J: ChangeJournal,
{
    /// Create a new read-through cache.
    pub fn new(cache: Arc<C>, journal: Arc<J>, config: CacheConfig) -> Self {
        Self {
            cache,
            journal,
            config,
        }
    }

    /// Create a new read-through cache with default configuration.
    pub fn with_defaults(cache: Arc<C>, journal: Arc<J>) -> Self {
        Self::new(cache, journal, CacheConfig::default())
    }

    /// Get the cache configuration.
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Get a reference to the cache backend.
    pub fn backend(&self) -> &C {
        &self.cache
    }

    /// Get a reference to the change journal.
    pub fn journal(&self) -> &J {
        &self.journal
    }

    /// Get a value from the cache, falling back to storage on miss.
    ///
    /// The freshness parameter determines how the cache handles potentially
    /// stale data:
    ///
    /// - `BestEffort`: Returns cached data if not older than max_staleness,
    ///   otherwise fetches from storage.
    /// - `Consistent`: Checks the change journal to see if any mutations to
    ///   the key's scope have occurred since caching, fetching from storage
    ///   if so.
    ///
    /// Entries older than the configured `entry_ttl` are refreshed regardless
    /// of the freshness mode.
    ///
    /// # Returns
    ///
    /// Returns a `CacheRead<T>` wrapper that carries staleness metadata,
    /// or `Ok(None)` if the fetcher found nothing in storage.
    pub async fn get<T, F>(
        &self,
        key: &QueryKey,
        freshness: Freshness,
        fetcher: &F,
    ) -> CoreResult<Option<CacheRead<T>>>
    where
        T: Serialize + DeserializeOwned + Send + Sync + 'static,
        F: Fetch<T>,
    {
        match freshness {
            Freshness::BestEffort { max_staleness } => {
                let max_staleness = max_staleness.min(self.config.entry_ttl);
                self.get_best_effort(key, max_staleness, fetcher).await
            }
            Freshness::Consistent => self.get_consistent(key, fetcher).await,
        }
    }

    /// Best-effort read: cache first, refresh if too stale.
    async fn get_best_effort<T, F>(
        &self,
        key: &QueryKey,
        max_staleness: Duration,
        fetcher: &F,
    ) -> CoreResult<Option<CacheRead<T>>>
    where
        T: Serialize + DeserializeOwned + Send + Sync + 'static,
        F: Fetch<T>,
    {
        if let Some((bytes, cached_at)) = self.cache.get_bytes(key).await? {
            let staleness = Utc::now()
                .signed_duration_since(cached_at)
                .to_std()
                .unwrap_or(Duration::ZERO);

            if staleness <= max_staleness {
                let value = deserialize_value(&bytes)?;
                return Ok(Some(CacheRead::from_cache(value, cached_at, None)));
            }
            // Cache hit but too stale, fall through to storage
        }

        self.fetch_and_cache(key, fetcher).await
    }

    /// Consistent read: check watermark, fallback to storage if stale.
    async fn get_consistent<T, F>(
        &self,
        key: &QueryKey,
        fetcher: &F,
    ) -> CoreResult<Option<CacheRead<T>>>
    where
        T: Serialize + DeserializeOwned + Send + Sync + 'static,
        F: Fetch<T>,
    {
        let current_watermark = self.journal.current_watermark(key.farm_id()).await?;

        if let Some((bytes, cached_at)) = self.cache.get_bytes(key).await? {
            let ttl_expired = Utc::now()
                .signed_duration_since(cached_at)
                .to_std()
                .map(|age| age > self.config.entry_ttl)
                .unwrap_or(false);

            if !ttl_expired {
                if let Some(cache_watermark) =
                    self.journal.watermark_at(key.farm_id(), cached_at).await?
                {
                    let has_changes = self
                        .journal
                        .changes_since(key.farm_id(), &cache_watermark, &[key.scope()])
                        .await?;

                    if !has_changes {
                        let value = deserialize_value(&bytes)?;
                        return Ok(Some(CacheRead::from_cache(
                            value,
                            cached_at,
                            Some(cache_watermark),
                        )));
                    }
                }
            }
            // Changes detected, TTL expired, or watermark unavailable.
        }

        self.fetch_and_cache_with_watermark(key, fetcher, current_watermark)
            .await
    }

    /// Fetch from storage and update cache.
    async fn fetch_and_cache<T, F>(
        &self,
        key: &QueryKey,
        fetcher: &F,
    ) -> CoreResult<Option<CacheRead<T>>>
    where
        T: Serialize + DeserializeOwned + Send + Sync + 'static,
        F: Fetch<T>,
    {
        let watermark = self.journal.current_watermark(key.farm_id()).await?;
        self.fetch_and_cache_with_watermark(key, fetcher, watermark)
            .await
    }

    /// Fetch from storage and update cache with known watermark.
    async fn fetch_and_cache_with_watermark<T, F>(
        &self,
        key: &QueryKey,
        fetcher: &F,
        watermark: Watermark,
    ) -> CoreResult<Option<CacheRead<T>>>
    where
        T: Serialize + DeserializeOwned + Send + Sync + 'static,
        F: Fetch<T>,
    {
        if let Some(value) = fetcher.fetch().await? {
            self.put(key, &value).await?;
            Ok(Some(CacheRead::from_storage(value, Some(watermark))))
        } else {
            Ok(None)
        }
    }

    /// Put a value into the cache.
    ///
    /// This is typically called after a write operation to keep the cache
    /// warm with the latest data.
    pub async fn put<T: Serialize + Send + Sync>(
        &self,
        key: &QueryKey,
        value: &T,
    ) -> CoreResult<()> {
        let bytes = serde_json::to_vec(value).map_err(|e| {
            CoreError::Storage(StorageError::SerializationFailed {
                reason: e.to_string(),
            })
        })?;
        self.cache.put_bytes(key, &bytes, Utc::now()).await
    }

    /// Invalidate a single entry.
    pub async fn invalidate(&self, key: &QueryKey) -> CoreResult<bool> {
        self.cache.delete(key).await
    }

    /// Invalidate every cached entry for one resource scope within a farm.
    ///
    /// Removes the scope's `all` key, every `by_id` key, and every `list`
    /// key, so stale filtered listings can never survive a mutation.
    pub async fn invalidate_scope(
        &self,
        farm_id: paddock_core::FarmId,
        scope: paddock_core::ResourceKind,
    ) -> CoreResult<u64> {
        self.cache.invalidate_scope(farm_id, scope).await
    }

    /// Invalidate all cached entries for a farm.
    pub async fn invalidate_farm(&self, farm_id: paddock_core::FarmId) -> CoreResult<u64> {
        self.cache.invalidate_farm(farm_id).await
    }
}

fn deserialize_value<T: DeserializeOwned>(bytes: &[u8]) -> CoreResult<T> {
    serde_json::from_slice(bytes).map_err(|e| {
        CoreError::Storage(StorageError::DeserializationFailed {
            reason: e.to_string(),
        })
    })
}

impl<C, J> Clone for ReadThroughCache<C, J>
where
    C: CacheBackend,
    J: ChangeJournal,
{
    fn clone(&self) -> Self {
        Self {
            cache: Arc::clone(&self.cache),
            journal: Arc::clone(&self.journal),
            config: self.config.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::journal::InMemoryChangeJournal;
    use crate::cache::traits::CacheStats;
    use chrono::{DateTime, Utc};
    use paddock_core::ResourceKind;
    use serde::Deserialize;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::RwLock;
    use uuid::Uuid;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct HorseRecord {
        id: Uuid,
        name: String,
    }

    // In-memory byte backend, enough to exercise the read-through logic.
    #[derive(Default)]
    struct MapBackend {
        entries: RwLock<HashMap<Vec<u8>, (Vec<u8>, DateTime<Utc>)>>,
    }

    #[async_trait]
    impl CacheBackend for MapBackend {
        async fn get_bytes(
            &self,
            key: &QueryKey,
        ) -> CoreResult<Option<(Vec<u8>, DateTime<Utc>)>> {
            Ok(self.entries.read().unwrap().get(&key.encode()).cloned())
        }

        async fn put_bytes(
            &self,
            key: &QueryKey,
            value: &[u8],
            cached_at: DateTime<Utc>,
        ) -> CoreResult<()> {
            self.entries
                .write()
                .unwrap()
                .insert(key.encode(), (value.to_vec(), cached_at));
            Ok(())
        }

        async fn delete(&self, key: &QueryKey) -> CoreResult<bool> {
            Ok(self.entries.write().unwrap().remove(&key.encode()).is_some())
        }

        async fn invalidate_scope(
            &self,
            farm_id: paddock_core::FarmId,
            scope: ResourceKind,
        ) -> CoreResult<u64> {
            let prefix = QueryKey::scope_prefix(farm_id, scope);
            let mut entries = self.entries.write().unwrap();
            let before = entries.len();
            entries.retain(|k, _| !k.starts_with(&prefix));
            Ok((before - entries.len()) as u64)
        }

        async fn invalidate_farm(&self, farm_id: paddock_core::FarmId) -> CoreResult<u64> {
            let prefix = QueryKey::farm_prefix(farm_id);
            let mut entries = self.entries.write().unwrap();
            let before = entries.len();
            entries.retain(|k, _| !k.starts_with(&prefix));
            Ok((before - entries.len()) as u64)
        }
    }

    struct CountingFetcher {
        record: Option<HorseRecord>,
        calls: AtomicUsize,
    }

    impl CountingFetcher {
        fn new(record: Option<HorseRecord>) -> Self {
            Self {
                record,
                calls: AtomicUsize::new(0),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Fetch<HorseRecord> for CountingFetcher {
        async fn fetch(&self) -> CoreResult<Option<HorseRecord>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.record.clone())
        }
    }

    fn make_cache() -> ReadThroughCache<MapBackend, InMemoryChangeJournal> {
        ReadThroughCache::with_defaults(
            Arc::new(MapBackend::default()),
            Arc::new(InMemoryChangeJournal::new()),
        )
    }

    fn horse() -> HorseRecord {
        HorseRecord {
            id: Uuid::now_v7(),
            name: "Juniper".to_string(),
        }
    }

    #[tokio::test]
    async fn miss_fetches_from_storage_then_hits() {
        let cache = make_cache();
        let farm_id = Uuid::now_v7();
        let record = horse();
        let key = QueryKey::by_id(farm_id, ResourceKind::Horse, record.id);
        let fetcher = CountingFetcher::new(Some(record.clone()));

        let first = cache
            .get::<HorseRecord, _>(&key, Freshness::Consistent, &fetcher)
            .await
            .expect("get should succeed")
            .expect("record should exist");
        assert!(first.was_cache_miss());
        assert_eq!(first.value(), &record);

        let second = cache
            .get::<HorseRecord, _>(&key, Freshness::Consistent, &fetcher)
            .await
            .expect("get should succeed")
            .expect("record should exist");
        assert!(second.was_cache_hit());
        assert_eq!(fetcher.call_count(), 1);
    }

    #[tokio::test]
    async fn not_found_returns_none_and_caches_nothing() {
        let cache = make_cache();
        let farm_id = Uuid::now_v7();
        let key = QueryKey::by_id(farm_id, ResourceKind::Horse, Uuid::now_v7());
        let fetcher = CountingFetcher::new(None);

        for _ in 0..2 {
            let result = cache
                .get::<HorseRecord, _>(&key, Freshness::Consistent, &fetcher)
                .await
                .expect("get should succeed");
            assert!(result.is_none());
        }
        // No negative caching: every miss goes to storage.
        assert_eq!(fetcher.call_count(), 2);
    }

    #[tokio::test]
    async fn consistent_read_refetches_after_scope_change() {
        let cache = make_cache();
        let farm_id = Uuid::now_v7();
        let record = horse();
        let key = QueryKey::by_id(farm_id, ResourceKind::Horse, record.id);
        let fetcher = CountingFetcher::new(Some(record.clone()));

        cache
            .get::<HorseRecord, _>(&key, Freshness::Consistent, &fetcher)
            .await
            .expect("get should succeed");

        cache
            .journal()
            .record_change(farm_id, ResourceKind::Horse, record.id)
            .await
            .expect("record_change should succeed");

        let read = cache
            .get::<HorseRecord, _>(&key, Freshness::Consistent, &fetcher)
            .await
            .expect("get should succeed")
            .expect("record should exist");
        assert!(read.was_cache_miss());
        assert_eq!(fetcher.call_count(), 2);
    }

    #[tokio::test]
    async fn consistent_read_survives_unrelated_scope_change() {
        let cache = make_cache();
        let farm_id = Uuid::now_v7();
        let record = horse();
        let key = QueryKey::by_id(farm_id, ResourceKind::Horse, record.id);
        let fetcher = CountingFetcher::new(Some(record.clone()));

        cache
            .get::<HorseRecord, _>(&key, Freshness::Consistent, &fetcher)
            .await
            .expect("get should succeed");

        cache
            .journal()
            .record_change(farm_id, ResourceKind::Invoice, Uuid::now_v7())
            .await
            .expect("record_change should succeed");

        let read = cache
            .get::<HorseRecord, _>(&key, Freshness::Consistent, &fetcher)
            .await
            .expect("get should succeed")
            .expect("record should exist");
        assert!(read.was_cache_hit());
        assert_eq!(fetcher.call_count(), 1);
    }

    #[tokio::test]
    async fn best_effort_serves_stale_data_within_tolerance() {
        let cache = make_cache();
        let farm_id = Uuid::now_v7();
        let record = horse();
        let key = QueryKey::by_id(farm_id, ResourceKind::Horse, record.id);
        let fetcher = CountingFetcher::new(Some(record.clone()));

        cache
            .get::<HorseRecord, _>(&key, Freshness::Consistent, &fetcher)
            .await
            .expect("get should succeed");

        // A mutation makes the entry stale by watermark, but best-effort
        // does not consult the journal.
        cache
            .journal()
            .record_change(farm_id, ResourceKind::Horse, record.id)
            .await
            .expect("record_change should succeed");

        let read = cache
            .get::<HorseRecord, _>(
                &key,
                Freshness::best_effort(Duration::from_secs(60)),
                &fetcher,
            )
            .await
            .expect("get should succeed")
            .expect("record should exist");
        assert!(read.was_cache_hit());
        assert_eq!(fetcher.call_count(), 1);
    }

    #[tokio::test]
    async fn invalidate_scope_forces_refetch() {
        let cache = make_cache();
        let farm_id = Uuid::now_v7();
        let record = horse();
        let key = QueryKey::by_id(farm_id, ResourceKind::Horse, record.id);
        let fetcher = CountingFetcher::new(Some(record.clone()));

        cache
            .get::<HorseRecord, _>(&key, Freshness::Consistent, &fetcher)
            .await
            .expect("get should succeed");

        let removed = cache
            .invalidate_scope(farm_id, ResourceKind::Horse)
            .await
            .expect("invalidate_scope should succeed");
        assert_eq!(removed, 1);

        let read = cache
            .get::<HorseRecord, _>(
                &key,
                Freshness::best_effort(Duration::from_secs(60)),
                &fetcher,
            )
            .await
            .expect("get should succeed")
            .expect("record should exist");
        assert!(read.was_cache_miss());
        assert_eq!(fetcher.call_count(), 2);
    }

    #[tokio::test]
    async fn closure_fetchers_work() {
        let cache = make_cache();
        let farm_id = Uuid::now_v7();
        let record = horse();
        let key = QueryKey::by_id(farm_id, ResourceKind::Horse, record.id);

        let fetch_record = record.clone();
        let fetcher = move || {
            let r = fetch_record.clone();
            async move { Ok(Some(r)) }
        };

        let read = cache
            .get::<HorseRecord, _>(&key, Freshness::Consistent, &fetcher)
            .await
            .expect("get should succeed")
            .expect("record should exist");
        assert_eq!(read.into_value(), record);
    }

    #[test]
    fn cache_config_builder() {
        let config = CacheConfig::new()
            .with_max_staleness(Duration::from_secs(120))
            .with_ttl(Duration::from_secs(1800));

        assert_eq!(config.default_max_staleness, Duration::from_secs(120));
        assert_eq!(config.entry_ttl, Duration::from_secs(1800));
        assert_eq!(
            config.default_best_effort(),
            Freshness::best_effort(Duration::from_secs(120))
        );
    }

    #[test]
    fn stats_struct_is_reexported() {
        let stats = CacheStats::default();
        assert_eq!(stats.hits, 0);
    }
}
