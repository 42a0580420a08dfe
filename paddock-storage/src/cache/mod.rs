//! Cache layer with correctness contracts and multi-farm LMDB isolation.
//!
//! This module provides a read-through cache with explicit freshness
//! guarantees and strict farm isolation.
//!
//! # Design Philosophy
//!
//! Traditional caches hide their staleness, leading to subtle bugs. This
//! module makes staleness explicit: callers must specify their tolerance via
//! [`Freshness`], and reads return [`CacheRead<T>`] which carries staleness
//! metadata.
//!
//! # Query Keys
//!
//! Every cached read is keyed by a [`QueryKey`]: a farm-scoped descriptor of
//! the logical query (`all`, `by_id`, or `list` with a filter set). Keys for
//! the same resource share a scope prefix in their encoded form, so
//! invalidation by scope prefix catches every derived key - the one property
//! mutation bindings rely on for correctness.
//!
//! # Farm Isolation
//!
//! A [`QueryKey`] cannot be constructed without providing a `farm_id`. This
//! makes cross-farm cache access impossible at compile time - not just a
//! runtime check, but structurally enforced by the type system.

pub mod freshness;
pub mod journal;
pub mod lmdb_backend;
pub mod query_key;
pub mod read_through;
pub mod traits;

pub use freshness::{CacheRead, Freshness};
pub use journal::{ChangeJournal, InMemoryChangeJournal, Watermark};
pub use lmdb_backend::{LmdbCacheBackend, LmdbCacheError};
pub use query_key::QueryKey;
pub use read_through::{CacheConfig, Fetch, ReadThroughCache};
pub use traits::{CacheBackend, CacheStats, CacheableEntity};
