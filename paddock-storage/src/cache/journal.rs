//! Watermark and change journal for cache invalidation.
//!
//! The change journal tracks mutations against storage, allowing the cache
//! to determine if cached data might be stale. Watermarks represent a point
//! in the per-farm mutation history.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use paddock_core::{CoreResult, EntityId, FarmId, ResourceKind};

/// A watermark representing a point in the change journal.
///
/// Watermarks are monotonically increasing and can be compared to determine
/// if mutations have occurred between two points in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Watermark {
    /// Monotonically increasing sequence number.
    /// Each mutation increments this value.
    pub sequence: i64,
    /// When this watermark was observed.
    pub observed_at: DateTime<Utc>,
}

impl Watermark {
    /// Create a new watermark with the given sequence number.
    pub fn new(sequence: i64) -> Self {
        Self {
            sequence,
            observed_at: Utc::now(),
        }
    }

    /// Create a new watermark with explicit observed_at timestamp.
    pub fn with_timestamp(sequence: i64, observed_at: DateTime<Utc>) -> Self {
        Self {
            sequence,
            observed_at,
        }
    }

    /// Create a zero watermark (beginning of time).
    pub fn zero() -> Self {
        Self {
            sequence: 0,
            observed_at: DateTime::UNIX_EPOCH,
        }
    }

    /// Check if this watermark is newer than another.
    pub fn is_newer_than(&self, other: &Watermark) -> bool {
        self.sequence > other.sequence
    }

    /// Check if this watermark is at least as fresh as another.
    pub fn is_at_least(&self, other: &Watermark) -> bool {
        self.sequence >= other.sequence
    }
}

impl Default for Watermark {
    fn default() -> Self {
        Self::zero()
    }
}

/// Change journal for tracking mutations and cache invalidation.
///
/// The journal maintains a per-farm log of mutations, allowing the cache to
/// determine if data of a given scope has changed since it was cached.
/// Implementations should be efficient for the common case where no changes
/// have occurred, since `changes_since` runs on every consistent read.
#[async_trait]
pub trait ChangeJournal: Send + Sync {
    /// Get the current watermark for a farm.
    async fn current_watermark(&self, farm_id: FarmId) -> CoreResult<Watermark>;

    /// Get the watermark at a specific point in time.
    ///
    /// Used to determine what the watermark was when data was cached.
    /// Returns None if the timestamp is older than the journal's retained
    /// history.
    async fn watermark_at(
        &self,
        farm_id: FarmId,
        at: DateTime<Utc>,
    ) -> CoreResult<Option<Watermark>>;

    /// Check if any changes have occurred since the given watermark.
    ///
    /// Returns true if any mutation to one of the given resource scopes has
    /// been recorded after the watermark. An empty `scopes` slice matches
    /// every scope.
    async fn changes_since(
        &self,
        farm_id: FarmId,
        watermark: &Watermark,
        scopes: &[ResourceKind],
    ) -> CoreResult<bool>;

    /// Record a mutation in the journal.
    ///
    /// Called by mutation bindings whenever an entity is created, updated,
    /// or deleted. Increments the farm's watermark and records the affected
    /// scope.
    async fn record_change(
        &self,
        farm_id: FarmId,
        scope: ResourceKind,
        entity_id: EntityId,
    ) -> CoreResult<Watermark>;

    /// Prune journal entries older than `before`.
    ///
    /// Returns the number of entries removed.
    async fn prune(&self, farm_id: FarmId, before: DateTime<Utc>) -> CoreResult<u64>;
}

/// In-memory change journal.
///
/// Uses tokio::sync::RwLock for safe async access. Suitable for a single
/// API process; a multi-instance deployment would need a shared journal.
#[derive(Debug, Default)]
pub struct InMemoryChangeJournal {
    /// Changes indexed by farm_id.
    changes: tokio::sync::RwLock<std::collections::HashMap<FarmId, FarmChanges>>,
}

#[derive(Debug, Default)]
struct FarmChanges {
    /// Current sequence number.
    sequence: i64,
    /// Log of changes in sequence order.
    log: Vec<ChangeEntry>,
}

#[derive(Debug, Clone)]
struct ChangeEntry {
    sequence: i64,
    timestamp: DateTime<Utc>,
    scope: ResourceKind,
    #[allow(dead_code)]
    // Retained for future per-entity invalidation queries.
    entity_id: EntityId,
}

impl InMemoryChangeJournal {
    /// Create a new in-memory change journal.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ChangeJournal for InMemoryChangeJournal {
    async fn current_watermark(&self, farm_id: FarmId) -> CoreResult<Watermark> {
        let changes = self.changes.read().await;
        let sequence = changes.get(&farm_id).map(|fc| fc.sequence).unwrap_or(0);
        Ok(Watermark::new(sequence))
    }

    async fn watermark_at(
        &self,
        farm_id: FarmId,
        at: DateTime<Utc>,
    ) -> CoreResult<Option<Watermark>> {
        let changes = self.changes.read().await;
        if let Some(farm_changes) = changes.get(&farm_id) {
            // Latest entry at or before the given timestamp.
            let sequence = farm_changes
                .log
                .iter()
                .rev()
                .find(|e| e.timestamp <= at)
                .map(|e| e.sequence)
                .unwrap_or(0);
            Ok(Some(Watermark::with_timestamp(sequence, at)))
        } else {
            Ok(Some(Watermark::zero()))
        }
    }

    async fn changes_since(
        &self,
        farm_id: FarmId,
        watermark: &Watermark,
        scopes: &[ResourceKind],
    ) -> CoreResult<bool> {
        let changes = self.changes.read().await;
        if let Some(farm_changes) = changes.get(&farm_id) {
            let has_changes = farm_changes.log.iter().any(|e| {
                e.sequence > watermark.sequence
                    && (scopes.is_empty() || scopes.contains(&e.scope))
            });
            Ok(has_changes)
        } else {
            Ok(false)
        }
    }

    async fn record_change(
        &self,
        farm_id: FarmId,
        scope: ResourceKind,
        entity_id: EntityId,
    ) -> CoreResult<Watermark> {
        let mut changes = self.changes.write().await;
        let farm_changes = changes.entry(farm_id).or_default();

        farm_changes.sequence += 1;
        farm_changes.log.push(ChangeEntry {
            sequence: farm_changes.sequence,
            timestamp: Utc::now(),
            scope,
            entity_id,
        });

        Ok(Watermark::new(farm_changes.sequence))
    }

    async fn prune(&self, farm_id: FarmId, before: DateTime<Utc>) -> CoreResult<u64> {
        let mut changes = self.changes.write().await;
        if let Some(farm_changes) = changes.get_mut(&farm_id) {
            let before_len = farm_changes.log.len();
            farm_changes.log.retain(|e| e.timestamp >= before);
            Ok((before_len - farm_changes.log.len()) as u64)
        } else {
            Ok(0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use paddock_core::new_entity_id;
    use uuid::Uuid;

    #[test]
    fn watermark_ordering() {
        let w1 = Watermark::new(1);
        let w2 = Watermark::new(2);
        let w3 = Watermark::new(2);

        assert!(w2.is_newer_than(&w1));
        assert!(!w1.is_newer_than(&w2));
        assert!(!w2.is_newer_than(&w3));

        assert!(w2.is_at_least(&w1));
        assert!(w2.is_at_least(&w3));
        assert!(!w1.is_at_least(&w2));
    }

    #[tokio::test]
    async fn record_then_check() {
        let journal = InMemoryChangeJournal::new();
        let farm_id = Uuid::now_v7();

        let w0 = journal
            .current_watermark(farm_id)
            .await
            .expect("current_watermark should succeed");
        assert_eq!(w0.sequence, 0);

        let w1 = journal
            .record_change(farm_id, ResourceKind::Boarder, new_entity_id())
            .await
            .expect("record_change should succeed");
        assert_eq!(w1.sequence, 1);

        assert!(journal
            .changes_since(farm_id, &w0, &[])
            .await
            .expect("changes_since should succeed"));
        assert!(!journal
            .changes_since(farm_id, &w1, &[])
            .await
            .expect("changes_since should succeed"));
    }

    #[tokio::test]
    async fn scope_filter_only_matches_recorded_scope() {
        let journal = InMemoryChangeJournal::new();
        let farm_id = Uuid::now_v7();

        let w0 = journal
            .current_watermark(farm_id)
            .await
            .expect("current_watermark should succeed");

        journal
            .record_change(farm_id, ResourceKind::Invoice, new_entity_id())
            .await
            .expect("record_change should succeed");

        assert!(journal
            .changes_since(farm_id, &w0, &[ResourceKind::Invoice])
            .await
            .expect("changes_since should succeed"));
        assert!(!journal
            .changes_since(farm_id, &w0, &[ResourceKind::Horse])
            .await
            .expect("changes_since should succeed"));
    }

    #[tokio::test]
    async fn farms_have_independent_watermarks() {
        let journal = InMemoryChangeJournal::new();
        let farm_a = Uuid::now_v7();
        let farm_b = Uuid::now_v7();

        let w0_b = journal
            .current_watermark(farm_b)
            .await
            .expect("current_watermark should succeed");

        journal
            .record_change(farm_a, ResourceKind::Stall, new_entity_id())
            .await
            .expect("record_change should succeed");

        assert!(!journal
            .changes_since(farm_b, &w0_b, &[])
            .await
            .expect("changes_since should succeed"));
    }

    #[tokio::test]
    async fn prune_drops_old_entries() {
        let journal = InMemoryChangeJournal::new();
        let farm_id = Uuid::now_v7();

        journal
            .record_change(farm_id, ResourceKind::Pasture, new_entity_id())
            .await
            .expect("record_change should succeed");

        let pruned = journal
            .prune(farm_id, Utc::now() + chrono::Duration::seconds(1))
            .await
            .expect("prune should succeed");
        assert_eq!(pruned, 1);

        // Watermark survives pruning; only the log shrinks.
        let w = journal
            .current_watermark(farm_id)
            .await
            .expect("current_watermark should succeed");
        assert_eq!(w.sequence, 1);
    }
}
