//! Farm-scoped query keys for cache storage and invalidation.
//!
//! The key insight is that `QueryKey`'s constructors all require a farm ID,
//! making cross-farm access UNCOMPILABLE. On top of that, every key derived
//! for a resource (`by_id`, `list`) structurally extends the key produced by
//! `all()` for that resource: the encoded form shares the
//! `farm_id | scope` prefix byte-for-byte, so prefix invalidation catches
//! all derived keys.

use paddock_core::ResourceKind;
use uuid::Uuid;

/// Separator byte between the farm_id and the rest of the key.
const SEPARATOR: u8 = 0xFF;

/// Key variant tags.
const TAG_ALL: u8 = 0;
const TAG_BY_ID: u8 = 1;
const TAG_LIST: u8 = 2;

/// Unit separator between filter name and value in encoded list keys.
const FIELD_SEP: u8 = 0x1F;
/// Record separator between filter pairs in encoded list keys.
const PAIR_SEP: u8 = 0x1E;

/// A cache key describing one logical query against one resource.
///
/// # Binary Format
///
/// Keys encode to a variable-length byte string:
/// - Bytes 0-15: farm_id (UUID as bytes)
/// - Byte 16: separator (0xFF)
/// - Byte 17: scope (single-byte resource discriminant)
/// - Byte 18: variant tag (0 = all, 1 = by_id, 2 = list)
/// - Remainder: entity_id bytes (by_id) or sorted `name\x1Fvalue\x1E`
///   filter pairs (list)
///
/// This format ensures:
/// - Keys are naturally grouped by farm, then by scope
/// - Scope-prefix scans can invalidate every key of one resource
/// - Structurally equal filters encode to byte-equal keys (pairs are
///   sorted by name on construction)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    farm_id: Uuid,
    scope: ResourceKind,
    variant: KeyVariant,
}

/// The query shape a key describes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum KeyVariant {
    /// The whole collection, unfiltered.
    All,
    /// A single entity by primary id.
    ById(Uuid),
    /// A filtered/paginated listing. Pairs are sorted by field name.
    List(Vec<(String, String)>),
}

impl QueryKey {
    /// Key for the whole collection of a resource.
    pub fn all(farm_id: Uuid, scope: ResourceKind) -> Self {
        Self {
            farm_id,
            scope,
            variant: KeyVariant::All,
        }
    }

    /// Key for a single entity.
    ///
    /// Structurally extends [`QueryKey::all`] for the same resource: the
    /// farm and scope are identical, only the variant payload is added.
    pub fn by_id(farm_id: Uuid, scope: ResourceKind, id: Uuid) -> Self {
        Self {
            farm_id,
            scope,
            variant: KeyVariant::ById(id),
        }
    }

    /// Key for a filtered listing.
    ///
    /// Filter pairs are sorted by field name so that structurally equal
    /// filter sets always produce equal keys, regardless of insertion order.
    /// Absent filters must simply be omitted by the caller.
    pub fn list<I, K, V>(farm_id: Uuid, scope: ResourceKind, filters: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut pairs: Vec<(String, String)> = filters
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        pairs.sort();
        Self {
            farm_id,
            scope,
            variant: KeyVariant::List(pairs),
        }
    }

    /// Get the farm this key is scoped to.
    pub fn farm_id(&self) -> Uuid {
        self.farm_id
    }

    /// Get the resource scope of this key.
    pub fn scope(&self) -> ResourceKind {
        self.scope
    }

    /// The entity id, if this is a `by_id` key.
    pub fn entity_id(&self) -> Option<Uuid> {
        match &self.variant {
            KeyVariant::ById(id) => Some(*id),
            _ => None,
        }
    }

    /// Whether this key names a single entity.
    pub fn is_by_id(&self) -> bool {
        matches!(self.variant, KeyVariant::ById(_))
    }

    /// Encode this key to bytes for cache storage.
    pub fn encode(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(34);
        bytes.extend_from_slice(self.farm_id.as_bytes());
        bytes.push(SEPARATOR);
        bytes.push(scope_to_byte(self.scope));
        match &self.variant {
            KeyVariant::All => bytes.push(TAG_ALL),
            KeyVariant::ById(id) => {
                bytes.push(TAG_BY_ID);
                bytes.extend_from_slice(id.as_bytes());
            }
            KeyVariant::List(pairs) => {
                bytes.push(TAG_LIST);
                for (name, value) in pairs {
                    bytes.extend_from_slice(name.as_bytes());
                    bytes.push(FIELD_SEP);
                    bytes.extend_from_slice(value.as_bytes());
                    bytes.push(PAIR_SEP);
                }
            }
        }
        bytes
    }

    /// Prefix matching every key of one resource within one farm.
    ///
    /// Used by scope invalidation: deleting everything under this prefix
    /// removes the `all` key, every `by_id` key, and every `list` key of
    /// the resource, because all of them extend this prefix.
    pub fn scope_prefix(farm_id: Uuid, scope: ResourceKind) -> [u8; 18] {
        let mut prefix = [0u8; 18];
        prefix[0..16].copy_from_slice(farm_id.as_bytes());
        prefix[16] = SEPARATOR;
        prefix[17] = scope_to_byte(scope);
        prefix
    }

    /// Prefix matching every key belonging to one farm.
    pub fn farm_prefix(farm_id: Uuid) -> [u8; 17] {
        let mut prefix = [0u8; 17];
        prefix[0..16].copy_from_slice(farm_id.as_bytes());
        prefix[16] = SEPARATOR;
        prefix
    }
}

/// Convert a ResourceKind to a single-byte discriminant.
fn scope_to_byte(scope: ResourceKind) -> u8 {
    match scope {
        ResourceKind::Boarder => 0,
        ResourceKind::Horse => 1,
        ResourceKind::Stall => 2,
        ResourceKind::Booking => 3,
        ResourceKind::Invoice => 4,
        ResourceKind::Expense => 5,
        ResourceKind::Shift => 6,
        ResourceKind::MaintenanceTask => 7,
        ResourceKind::Pasture => 8,
        ResourceKind::Message => 9,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn farm() -> Uuid {
        Uuid::now_v7()
    }

    #[test]
    fn by_id_extends_the_all_prefix() {
        let farm_id = farm();
        let all = QueryKey::all(farm_id, ResourceKind::Horse).encode();
        let by_id = QueryKey::by_id(farm_id, ResourceKind::Horse, Uuid::now_v7()).encode();
        assert_eq!(&by_id[..18], &all[..18]);
    }

    #[test]
    fn list_keys_are_order_insensitive() {
        let farm_id = farm();
        let a = QueryKey::list(
            farm_id,
            ResourceKind::Invoice,
            vec![("status", "paid"), ("page", "1")],
        );
        let b = QueryKey::list(
            farm_id,
            ResourceKind::Invoice,
            vec![("page", "1"), ("status", "paid")],
        );
        assert_eq!(a, b);
        assert_eq!(a.encode(), b.encode());
    }

    #[test]
    fn different_filter_values_are_distinct_entries() {
        let farm_id = farm();
        let a = QueryKey::list(farm_id, ResourceKind::Invoice, vec![("status", "paid")]);
        let b = QueryKey::list(farm_id, ResourceKind::Invoice, vec![("status", "draft")]);
        assert_ne!(a.encode(), b.encode());
    }

    #[test]
    fn scope_prefix_matches_all_variants() {
        let farm_id = farm();
        let prefix = QueryKey::scope_prefix(farm_id, ResourceKind::Stall);
        for key in [
            QueryKey::all(farm_id, ResourceKind::Stall),
            QueryKey::by_id(farm_id, ResourceKind::Stall, Uuid::now_v7()),
            QueryKey::list(farm_id, ResourceKind::Stall, vec![("barn", "north")]),
        ] {
            assert!(key.encode().starts_with(&prefix));
        }
        // And never a different scope.
        let other = QueryKey::all(farm_id, ResourceKind::Pasture);
        assert!(!other.encode().starts_with(&prefix));
    }

    #[test]
    fn farms_never_share_prefixes() {
        let a = QueryKey::all(farm(), ResourceKind::Boarder);
        let b = QueryKey::all(farm(), ResourceKind::Boarder);
        assert_ne!(a.encode()[..16], b.encode()[..16]);
    }
}
