//! Property-based tests for query key encoding and invalidation laws.

use paddock_core::ResourceKind;
use paddock_storage::QueryKey;
use proptest::prelude::*;
use uuid::Uuid;

fn arb_uuid() -> impl Strategy<Value = Uuid> {
    (any::<u64>(), any::<u64>()).prop_map(|(hi, lo)| Uuid::from_u64_pair(hi, lo))
}

fn arb_scope() -> impl Strategy<Value = ResourceKind> {
    prop::sample::select(ResourceKind::ALL.to_vec())
}

fn arb_filters() -> impl Strategy<Value = Vec<(String, String)>> {
    prop::collection::vec(("[a-z_]{1,12}", "[a-z0-9-]{0,16}"), 0..5)
}

proptest! {
    /// Structurally equal keys encode to byte-equal keys.
    #[test]
    fn encoding_is_deterministic(
        farm_id in arb_uuid(),
        scope in arb_scope(),
        filters in arb_filters(),
    ) {
        let a = QueryKey::list(farm_id, scope, filters.clone());
        let b = QueryKey::list(farm_id, scope, filters);
        prop_assert_eq!(a.encode(), b.encode());
    }

    /// Filter insertion order never affects the encoded key.
    #[test]
    fn list_keys_ignore_insertion_order(
        farm_id in arb_uuid(),
        scope in arb_scope(),
        mut filters in arb_filters(),
    ) {
        let forward = QueryKey::list(farm_id, scope, filters.clone());
        filters.reverse();
        let backward = QueryKey::list(farm_id, scope, filters);
        prop_assert_eq!(forward.encode(), backward.encode());
    }

    /// Every key variant extends the scope prefix of its resource.
    #[test]
    fn all_variants_extend_the_scope_prefix(
        farm_id in arb_uuid(),
        scope in arb_scope(),
        entity_id in arb_uuid(),
        filters in arb_filters(),
    ) {
        let prefix = QueryKey::scope_prefix(farm_id, scope);
        for key in [
            QueryKey::all(farm_id, scope),
            QueryKey::by_id(farm_id, scope, entity_id),
            QueryKey::list(farm_id, scope, filters),
        ] {
            prop_assert!(key.encode().starts_with(&prefix));
        }
    }

    /// The scope prefix itself extends the farm prefix.
    #[test]
    fn scope_prefix_extends_farm_prefix(
        farm_id in arb_uuid(),
        scope in arb_scope(),
    ) {
        let farm = QueryKey::farm_prefix(farm_id);
        let scoped = QueryKey::scope_prefix(farm_id, scope);
        prop_assert!(scoped.starts_with(&farm));
    }

    /// Keys of one scope never match another scope's prefix.
    #[test]
    fn scopes_never_collide(
        farm_id in arb_uuid(),
        scope in arb_scope(),
        other in arb_scope(),
        entity_id in arb_uuid(),
    ) {
        prop_assume!(scope != other);
        let key = QueryKey::by_id(farm_id, scope, entity_id);
        let other_prefix = QueryKey::scope_prefix(farm_id, other);
        prop_assert!(!key.encode().starts_with(&other_prefix));
    }

    /// Keys of one farm never match another farm's prefix.
    #[test]
    fn farms_never_collide(
        farm_a in arb_uuid(),
        farm_b in arb_uuid(),
        scope in arb_scope(),
    ) {
        prop_assume!(farm_a != farm_b);
        let key = QueryKey::all(farm_a, scope);
        let other_prefix = QueryKey::farm_prefix(farm_b);
        prop_assert!(!key.encode().starts_with(&other_prefix));
    }

    /// Distinct entity ids produce distinct keys.
    #[test]
    fn distinct_entities_have_distinct_keys(
        farm_id in arb_uuid(),
        scope in arb_scope(),
        id_a in arb_uuid(),
        id_b in arb_uuid(),
    ) {
        prop_assume!(id_a != id_b);
        let a = QueryKey::by_id(farm_id, scope, id_a);
        let b = QueryKey::by_id(farm_id, scope, id_b);
        prop_assert_ne!(a.encode(), b.encode());
    }

    /// by_id accessors round-trip the identity used to build the key.
    #[test]
    fn by_id_keys_expose_their_identity(
        farm_id in arb_uuid(),
        scope in arb_scope(),
        entity_id in arb_uuid(),
    ) {
        let key = QueryKey::by_id(farm_id, scope, entity_id);
        prop_assert!(key.is_by_id());
        prop_assert_eq!(key.farm_id(), farm_id);
        prop_assert_eq!(key.scope(), scope);
        prop_assert_eq!(key.entity_id(), Some(entity_id));
    }
}
