//! Paddock Storage - Query-Key Cache Layer
//!
//! Read-through caching for paddock resources. Durable state lives in
//! PostgreSQL (owned by the API crate's data-access layer); this crate owns
//! the client-cache contract: deterministic query keys, a pluggable cache
//! backend, and change-journal-based invalidation.

pub mod cache;

pub use cache::{
    CacheBackend, CacheConfig, CacheRead, CacheStats, CacheableEntity, ChangeJournal, Fetch,
    Freshness, InMemoryChangeJournal, LmdbCacheBackend, LmdbCacheError, QueryKey,
    ReadThroughCache, Watermark,
};
