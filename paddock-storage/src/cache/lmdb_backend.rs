//! LMDB-backed cache implementation with farm isolation.
//!
//! Uses the heed crate (Rust bindings for LMDB) to provide a memory-mapped
//! key-value store for caching query results.
//!
//! # Farm Isolation
//!
//! All cache operations are keyed by [`QueryKey`], whose encoded form starts
//! with the farm id. Farm invalidation is a prefix scan, and cross-farm
//! access is prevented at key-construction time.
//!
//! # Thread Safety
//!
//! LMDB provides ACID transactions. The backend uses read transactions for
//! `get_bytes` and write transactions for `put_bytes`, `delete`, and the
//! invalidation scans. Statistics are tracked under an RwLock.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use heed::types::Bytes;
use heed::{Database, Env, EnvOpenOptions};
use paddock_core::{CoreResult, FarmId, ResourceKind};
use uuid::Uuid;

use super::query_key::QueryKey;
use super::traits::{CacheBackend, CacheStats};

/// Error type for LMDB cache operations.
#[derive(Debug, thiserror::Error)]
pub enum LmdbCacheError {
    /// Failed to open or create the LMDB environment.
    #[error("Failed to open LMDB environment: {0}")]
    EnvOpen(String),

    /// Failed to open the database within the environment.
    #[error("Failed to open database: {0}")]
    DbOpen(String),

    /// Transaction error.
    #[error("Transaction error: {0}")]
    Transaction(String),

    /// Stored entry is malformed (truncated timestamp header).
    #[error("Corrupt cache entry: {0}")]
    CorruptEntry(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<LmdbCacheError> for paddock_core::CoreError {
    fn from(e: LmdbCacheError) -> Self {
        paddock_core::CoreError::Storage(paddock_core::StorageError::TransactionFailed {
            reason: e.to_string(),
        })
    }
}

/// Per-farm statistics tracking.
#[derive(Debug, Default)]
struct FarmStatsInner {
    hits: u64,
    misses: u64,
    entries: u64,
    invalidations: u64,
}

/// LMDB-backed cache keyed by encoded [`QueryKey`]s.
///
/// Values are opaque byte blobs prefixed with the caching timestamp, so the
/// same backend stores single entities (`by_id` keys) and whole list
/// responses (`list` keys).
pub struct LmdbCacheBackend {
    /// The LMDB environment.
    env: Env,
    /// The main database (single unnamed database).
    db: Database<Bytes, Bytes>,
    /// Per-farm statistics.
    farm_stats: Arc<RwLock<HashMap<Uuid, FarmStatsInner>>>,
    /// Global statistics.
    global_stats: Arc<RwLock<CacheStats>>,
}

impl LmdbCacheBackend {
    /// Create a new LMDB cache backend.
    ///
    /// # Arguments
    ///
    /// * `path` - Directory where LMDB files will be stored
    /// * `max_size_mb` - Maximum size of the database in megabytes
    pub fn new<P: AsRef<Path>>(path: P, max_size_mb: usize) -> Result<Self, LmdbCacheError> {
        std::fs::create_dir_all(&path)?;

        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(max_size_mb * 1024 * 1024)
                .max_dbs(1)
                .open(path.as_ref())
        }
        .map_err(|e| LmdbCacheError::EnvOpen(e.to_string()))?;

        let mut wtxn = env
            .write_txn()
            .map_err(|e| LmdbCacheError::Transaction(e.to_string()))?;

        let db: Database<Bytes, Bytes> = env
            .create_database(&mut wtxn, None)
            .map_err(|e| LmdbCacheError::DbOpen(e.to_string()))?;

        wtxn.commit()
            .map_err(|e| LmdbCacheError::Transaction(e.to_string()))?;

        Ok(Self {
            env,
            db,
            farm_stats: Arc::new(RwLock::new(HashMap::new())),
            global_stats: Arc::new(RwLock::new(CacheStats::default())),
        })
    }

    /// Get statistics for a specific farm.
    pub fn farm_stats(&self, farm_id: FarmId) -> CacheStats {
        if let Ok(stats) = self.farm_stats.read() {
            if let Some(farm) = stats.get(&farm_id) {
                return CacheStats {
                    hits: farm.hits,
                    misses: farm.misses,
                    entry_count: farm.entries,
                    invalidations: farm.invalidations,
                };
            }
        }
        CacheStats::default()
    }

    /// Get aggregate statistics across all farms.
    pub fn stats(&self) -> CacheStats {
        self.global_stats
            .read()
            .map(|s| *s)
            .unwrap_or_default()
    }

    fn record_hit(&self, farm_id: Uuid) {
        if let Ok(mut stats) = self.farm_stats.write() {
            stats.entry(farm_id).or_default().hits += 1;
        }
        if let Ok(mut stats) = self.global_stats.write() {
            stats.hits += 1;
        }
    }

    fn record_miss(&self, farm_id: Uuid) {
        if let Ok(mut stats) = self.farm_stats.write() {
            stats.entry(farm_id).or_default().misses += 1;
        }
        if let Ok(mut stats) = self.global_stats.write() {
            stats.misses += 1;
        }
    }

    fn record_put(&self, farm_id: Uuid, is_new: bool) {
        if !is_new {
            return;
        }
        if let Ok(mut stats) = self.farm_stats.write() {
            stats.entry(farm_id).or_default().entries += 1;
        }
        if let Ok(mut stats) = self.global_stats.write() {
            stats.entry_count += 1;
        }
    }

    fn record_removed(&self, farm_id: Uuid, count: u64) {
        if count == 0 {
            return;
        }
        if let Ok(mut stats) = self.farm_stats.write() {
            let farm = stats.entry(farm_id).or_default();
            farm.entries = farm.entries.saturating_sub(count);
            farm.invalidations += count;
        }
        if let Ok(mut stats) = self.global_stats.write() {
            stats.entry_count = stats.entry_count.saturating_sub(count);
            stats.invalidations += count;
        }
    }

    /// Iterate over keys matching a prefix and collect them.
    fn collect_keys_with_prefix(&self, prefix: &[u8]) -> Result<Vec<Vec<u8>>, LmdbCacheError> {
        let rtxn = self
            .env
            .read_txn()
            .map_err(|e| LmdbCacheError::Transaction(e.to_string()))?;

        let mut keys = Vec::new();
        let iter = self
            .db
            .iter(&rtxn)
            .map_err(|e| LmdbCacheError::Transaction(e.to_string()))?;

        for result in iter {
            match result {
                Ok((key, _)) => {
                    if key.len() >= prefix.len() && &key[0..prefix.len()] == prefix {
                        keys.push(key.to_vec());
                    }
                }
                Err(_) => continue,
            }
        }

        Ok(keys)
    }

    /// Delete every key in the list, returning how many existed.
    fn delete_keys(&self, keys: &[Vec<u8>]) -> Result<u64, LmdbCacheError> {
        let mut wtxn = self
            .env
            .write_txn()
            .map_err(|e| LmdbCacheError::Transaction(e.to_string()))?;

        let mut deleted = 0u64;
        for key in keys {
            if self.db.delete(&mut wtxn, key).unwrap_or(false) {
                deleted += 1;
            }
        }

        wtxn.commit()
            .map_err(|e| LmdbCacheError::Transaction(e.to_string()))?;

        Ok(deleted)
    }
}

#[async_trait]
impl CacheBackend for LmdbCacheBackend {
    async fn get_bytes(&self, key: &QueryKey) -> CoreResult<Option<(Vec<u8>, DateTime<Utc>)>> {
        let encoded = key.encode();

        let rtxn = self
            .env
            .read_txn()
            .map_err(|e| LmdbCacheError::Transaction(e.to_string()))?;

        match self.db.get(&rtxn, &encoded) {
            Ok(Some(bytes)) => {
                // Format: [timestamp millis: 8 bytes LE][payload]
                if bytes.len() < 8 {
                    return Err(LmdbCacheError::CorruptEntry(format!(
                        "entry for {} scope is {} bytes",
                        key.scope(),
                        bytes.len()
                    ))
                    .into());
                }

                self.record_hit(key.farm_id());

                let timestamp_bytes: [u8; 8] = bytes[0..8]
                    .try_into()
                    .map_err(|_| LmdbCacheError::CorruptEntry("invalid timestamp".into()))?;
                let cached_at = DateTime::from_timestamp_millis(i64::from_le_bytes(timestamp_bytes))
                    .unwrap_or_else(Utc::now);

                Ok(Some((bytes[8..].to_vec(), cached_at)))
            }
            Ok(None) => {
                self.record_miss(key.farm_id());
                Ok(None)
            }
            Err(e) => {
                self.record_miss(key.farm_id());
                Err(LmdbCacheError::Transaction(e.to_string()).into())
            }
        }
    }

    async fn put_bytes(
        &self,
        key: &QueryKey,
        value: &[u8],
        cached_at: DateTime<Utc>,
    ) -> CoreResult<()> {
        let encoded = key.encode();

        let mut full_bytes = Vec::with_capacity(8 + value.len());
        full_bytes.extend_from_slice(&cached_at.timestamp_millis().to_le_bytes());
        full_bytes.extend_from_slice(value);

        // Existence check only feeds statistics.
        let is_new = {
            let rtxn = self
                .env
                .read_txn()
                .map_err(|e| LmdbCacheError::Transaction(e.to_string()))?;
            self.db.get(&rtxn, &encoded).ok().flatten().is_none()
        };

        let mut wtxn = self
            .env
            .write_txn()
            .map_err(|e| LmdbCacheError::Transaction(e.to_string()))?;

        self.db
            .put(&mut wtxn, &encoded, &full_bytes)
            .map_err(|e| LmdbCacheError::Transaction(e.to_string()))?;

        wtxn.commit()
            .map_err(|e| LmdbCacheError::Transaction(e.to_string()))?;

        self.record_put(key.farm_id(), is_new);

        Ok(())
    }

    async fn delete(&self, key: &QueryKey) -> CoreResult<bool> {
        let encoded = key.encode();

        let mut wtxn = self
            .env
            .write_txn()
            .map_err(|e| LmdbCacheError::Transaction(e.to_string()))?;

        let deleted = self
            .db
            .delete(&mut wtxn, &encoded)
            .map_err(|e| LmdbCacheError::Transaction(e.to_string()))?;

        wtxn.commit()
            .map_err(|e| LmdbCacheError::Transaction(e.to_string()))?;

        if deleted {
            self.record_removed(key.farm_id(), 1);
        }

        Ok(deleted)
    }

    async fn invalidate_scope(&self, farm_id: FarmId, scope: ResourceKind) -> CoreResult<u64> {
        let prefix = QueryKey::scope_prefix(farm_id, scope);
        let keys = self.collect_keys_with_prefix(&prefix)?;
        let deleted = self.delete_keys(&keys)?;
        self.record_removed(farm_id, deleted);
        Ok(deleted)
    }

    async fn invalidate_farm(&self, farm_id: FarmId) -> CoreResult<u64> {
        let prefix = QueryKey::farm_prefix(farm_id);
        let keys = self.collect_keys_with_prefix(&prefix)?;
        let deleted = self.delete_keys(&keys)?;
        self.record_removed(farm_id, deleted);
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_backend() -> (LmdbCacheBackend, TempDir) {
        let temp_dir = TempDir::new().expect("TempDir creation should succeed");
        let backend =
            LmdbCacheBackend::new(temp_dir.path(), 10).expect("backend creation should succeed");
        (backend, temp_dir)
    }

    #[tokio::test]
    async fn put_and_get_round_trip() {
        let (backend, _temp_dir) = create_test_backend();
        let farm_id = Uuid::now_v7();
        let key = QueryKey::by_id(farm_id, ResourceKind::Horse, Uuid::now_v7());
        let cached_at = Utc::now();

        backend
            .put_bytes(&key, b"payload", cached_at)
            .await
            .expect("put should succeed");

        let (bytes, retrieved_at) = backend
            .get_bytes(&key)
            .await
            .expect("get should succeed")
            .expect("entry should exist");
        assert_eq!(bytes, b"payload");
        // Millisecond precision on the stored timestamp.
        assert!((cached_at - retrieved_at).num_seconds().abs() < 1);
    }

    #[tokio::test]
    async fn get_nonexistent_is_a_miss() {
        let (backend, _temp_dir) = create_test_backend();
        let farm_id = Uuid::now_v7();
        let key = QueryKey::by_id(farm_id, ResourceKind::Horse, Uuid::now_v7());

        assert!(backend
            .get_bytes(&key)
            .await
            .expect("get should succeed")
            .is_none());
        assert_eq!(backend.farm_stats(farm_id).misses, 1);
    }

    #[tokio::test]
    async fn delete_removes_entry() {
        let (backend, _temp_dir) = create_test_backend();
        let farm_id = Uuid::now_v7();
        let key = QueryKey::by_id(farm_id, ResourceKind::Stall, Uuid::now_v7());

        backend
            .put_bytes(&key, b"x", Utc::now())
            .await
            .expect("put should succeed");
        assert!(backend.delete(&key).await.expect("delete should succeed"));
        assert!(!backend.delete(&key).await.expect("delete should succeed"));
        assert!(backend
            .get_bytes(&key)
            .await
            .expect("get should succeed")
            .is_none());
    }

    #[tokio::test]
    async fn scope_invalidation_catches_all_derived_keys() {
        let (backend, _temp_dir) = create_test_backend();
        let farm_id = Uuid::now_v7();

        let keys = [
            QueryKey::all(farm_id, ResourceKind::Invoice),
            QueryKey::by_id(farm_id, ResourceKind::Invoice, Uuid::now_v7()),
            QueryKey::list(farm_id, ResourceKind::Invoice, vec![("status", "paid")]),
        ];
        for key in &keys {
            backend
                .put_bytes(key, b"v", Utc::now())
                .await
                .expect("put should succeed");
        }
        // A different scope in the same farm survives.
        let other = QueryKey::all(farm_id, ResourceKind::Expense);
        backend
            .put_bytes(&other, b"v", Utc::now())
            .await
            .expect("put should succeed");

        let deleted = backend
            .invalidate_scope(farm_id, ResourceKind::Invoice)
            .await
            .expect("invalidate_scope should succeed");
        assert_eq!(deleted, 3);

        for key in &keys {
            assert!(backend
                .get_bytes(key)
                .await
                .expect("get should succeed")
                .is_none());
        }
        assert!(backend
            .get_bytes(&other)
            .await
            .expect("get should succeed")
            .is_some());
    }

    #[tokio::test]
    async fn farm_invalidation_leaves_other_farms_alone() {
        let (backend, _temp_dir) = create_test_backend();
        let farm_a = Uuid::now_v7();
        let farm_b = Uuid::now_v7();

        for _ in 0..3 {
            let key = QueryKey::by_id(farm_a, ResourceKind::Boarder, Uuid::now_v7());
            backend
                .put_bytes(&key, b"a", Utc::now())
                .await
                .expect("put should succeed");
        }
        let b_key = QueryKey::by_id(farm_b, ResourceKind::Boarder, Uuid::now_v7());
        backend
            .put_bytes(&b_key, b"b", Utc::now())
            .await
            .expect("put should succeed");

        let deleted = backend
            .invalidate_farm(farm_a)
            .await
            .expect("invalidate_farm should succeed");
        assert_eq!(deleted, 3);

        assert!(backend
            .get_bytes(&b_key)
            .await
            .expect("get should succeed")
            .is_some());
    }

    #[tokio::test]
    async fn stats_track_hits_misses_and_entries() {
        let (backend, _temp_dir) = create_test_backend();
        let farm_id = Uuid::now_v7();
        let key = QueryKey::by_id(farm_id, ResourceKind::Pasture, Uuid::now_v7());

        let _ = backend.get_bytes(&key).await; // miss
        backend
            .put_bytes(&key, b"v", Utc::now())
            .await
            .expect("put should succeed");
        let _ = backend.get_bytes(&key).await; // hit
        let _ = backend.get_bytes(&key).await; // hit

        let stats = backend.stats();
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits, 2);
        assert_eq!(stats.entry_count, 1);
    }

    #[tokio::test]
    async fn overwrite_keeps_entry_count() {
        let (backend, _temp_dir) = create_test_backend();
        let farm_id = Uuid::now_v7();
        let key = QueryKey::all(farm_id, ResourceKind::Message);

        backend
            .put_bytes(&key, b"first", Utc::now())
            .await
            .expect("put should succeed");
        backend
            .put_bytes(&key, b"second", Utc::now())
            .await
            .expect("put should succeed");

        let (bytes, _) = backend
            .get_bytes(&key)
            .await
            .expect("get should succeed")
            .expect("entry should exist");
        assert_eq!(bytes, b"second");
        assert_eq!(backend.farm_stats(farm_id).entry_count, 1);
    }
}
