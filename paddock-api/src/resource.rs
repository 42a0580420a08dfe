//! Resource trait for generic CRUD operations.
//!
//! Every domain entity (boarder, horse, stall, ...) implements the
//! `Resource` trait, so the five generic operations in `DbClient`
//! (create, get, update, delete, list) and the generic route factory can
//! serve all ten resources instead of ten copy-paste module sets.
//!
//! # Pattern
//!
//! A resource implementation provides:
//! - The `ResourceKind` discriminant (table name, pk column, query-key scope)
//! - Create/Update/ListFilter request types
//! - Input schemas for the three validated operations
//! - SQL parameter extraction for inserts and updates
//!
//! The `impl_resource!` macro generates both the `Resource` impl and the
//! `CacheableEntity` impl from one declarative block.

use paddock_core::{EntityId, FarmId, ResourceKind};
use serde::{de::DeserializeOwned, Serialize};

use crate::schema::Schema;
use crate::validation::HasUpdates;

// ============================================================================
// RESOURCE TRAIT
// ============================================================================

/// Trait for entities persisted via the generic CRUD operations.
///
/// Implemented on the *response* type, which mirrors one storage row.
///
/// # Type Parameters
///
/// The associated types define the request shapes:
/// - `Create`: body of the create operation
/// - `Update`: body of the update operation (all fields optional)
/// - `ListFilter`: query parameters of the list operation
pub trait Resource: Sized + Send + Sync + Clone + DeserializeOwned + Serialize {
    /// Request type for creating new entities.
    type Create: DeserializeOwned + Send + Sync;

    /// Request type for updating entities.
    type Update: DeserializeOwned + HasUpdates + Send + Sync;

    /// Filter type for list queries.
    type ListFilter: ListFilter + DeserializeOwned + Send + Sync;

    /// Resource discriminant: table name, pk column, and query-key scope.
    const KIND: ResourceKind;

    /// Columns populated by create, in `create_params` order.
    ///
    /// The pk and `farm_id` columns are supplied by `DbClient` and must not
    /// appear here.
    const CREATE_COLUMNS: &'static [&'static str];

    /// Whether an absent row is a valid result for single-entity reads.
    ///
    /// When false (the default), the binding layer converts `data: null`
    /// into a not-found error.
    const NULLABLE_READ: bool = false;

    /// Get the entity ID from this instance.
    fn entity_id(&self) -> EntityId;

    /// Get the owning farm from this instance.
    fn farm_id(&self) -> FarmId;

    /// Input schema for the create operation.
    fn create_schema() -> Schema;

    /// Input schema for the update operation.
    fn update_schema() -> Schema;

    /// Input schema for the list operation (paginated).
    fn list_schema() -> Schema;

    /// Build insert parameters, one per entry of `CREATE_COLUMNS`.
    fn create_params(req: &Self::Create) -> Vec<SqlParam>;

    /// Build `(column, value)` pairs for the fields an update request sets.
    ///
    /// Absent optional fields are omitted entirely.
    fn update_params(req: &Self::Update) -> Vec<(&'static str, SqlParam)>;
}

// ============================================================================
// SQL PARAMETER TYPE
// ============================================================================

/// Type-erased SQL parameter for generic CRUD operations.
///
/// This allows building parameter lists without knowing the concrete types
/// at compile time.
#[derive(Debug, Clone)]
pub enum SqlParam {
    /// UUID value
    Uuid(uuid::Uuid),
    /// Optional UUID
    OptUuid(Option<uuid::Uuid>),
    /// String value
    String(String),
    /// Optional string value
    OptString(Option<String>),
    /// Integer value
    Int(i32),
    /// Optional integer value
    OptInt(Option<i32>),
    /// Long integer value
    Long(i64),
    /// Optional long value
    OptLong(Option<i64>),
    /// Boolean value
    Bool(bool),
    /// Optional boolean value
    OptBool(Option<bool>),
    /// Double-precision value (money amounts, acreage)
    Double(f64),
    /// Optional double value
    OptDouble(Option<f64>),
    /// Timestamp value
    Timestamp(chrono::DateTime<chrono::Utc>),
    /// Optional timestamp
    OptTimestamp(Option<chrono::DateTime<chrono::Utc>>),
}

impl SqlParam {
    /// Convert this SqlParam to a reference usable with tokio_postgres.
    pub fn as_to_sql(&self) -> &(dyn tokio_postgres::types::ToSql + Sync) {
        match self {
            SqlParam::Uuid(v) => v,
            SqlParam::OptUuid(v) => v,
            SqlParam::String(v) => v,
            SqlParam::OptString(v) => v,
            SqlParam::Int(v) => v,
            SqlParam::OptInt(v) => v,
            SqlParam::Long(v) => v,
            SqlParam::OptLong(v) => v,
            SqlParam::Bool(v) => v,
            SqlParam::OptBool(v) => v,
            SqlParam::Double(v) => v,
            SqlParam::OptDouble(v) => v,
            SqlParam::Timestamp(v) => v,
            SqlParam::OptTimestamp(v) => v,
        }
    }
}

// ============================================================================
// LIST FILTER TRAIT
// ============================================================================

/// Trait for list query filters.
///
/// Implementations carry the validated pagination fields plus the
/// resource's optional filter fields, and know how to express themselves
/// both as SQL predicates and as query-key filter pairs.
pub trait ListFilter {
    /// The requested page, 1-based. The schema layer guarantees `>= 1`.
    fn page(&self) -> i64;

    /// Rows per page. The schema layer applies the resource default.
    fn page_size(&self) -> i64;

    /// Row offset for this page. Saturates instead of overflowing.
    fn offset(&self) -> i64 {
        self.page().saturating_sub(1).saturating_mul(self.page_size())
    }

    /// SQL predicates for the set filter fields.
    ///
    /// Each entry is a column-and-operator fragment without the placeholder
    /// index (e.g. `"status ="`); `DbClient` appends `$n`. Absent filters
    /// must be omitted entirely, never compared against NULL.
    fn predicates(&self) -> Vec<(&'static str, SqlParam)>;

    /// Filter pairs for the list query key.
    ///
    /// Must include every field that changes the result set, pagination
    /// included, so distinct queries get distinct cache entries. Absent
    /// filters are omitted.
    fn key_fields(&self) -> Vec<(String, String)>;
}

/// Pagination fields shared by every list filter.
///
/// Flattened into each resource's `ListFilter` type; the schema layer has
/// already applied defaults and bounds by the time this deserializes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, serde::Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Pagination {
    /// 1-based page number.
    pub page: i64,
    /// Rows per page.
    pub page_size: i64,
}

impl Pagination {
    /// Row offset for this page. Saturates instead of overflowing.
    pub fn offset(&self) -> i64 {
        self.page.saturating_sub(1).saturating_mul(self.page_size)
    }

    /// Key-field pairs for the query key.
    pub fn key_fields(&self) -> Vec<(String, String)> {
        vec![
            ("page".to_string(), self.page.to_string()),
            ("page_size".to_string(), self.page_size.to_string()),
        ]
    }
}

// ============================================================================
// HELPER MACRO
// ============================================================================

/// Implement `Resource` and `paddock_storage::CacheableEntity` for a
/// response type from one declarative block.
///
/// # Example
///
/// ```ignore
/// impl_resource! {
///     BoarderResponse {
///         kind: ResourceKind::Boarder,
///         id_field: boarder_id,
///         create_type: CreateBoarderRequest,
///         update_type: UpdateBoarderRequest,
///         filter_type: BoarderListFilter,
///         create_columns: ["name", "email", "phone"],
///         create_params: |req| vec![
///             SqlParam::String(req.name.clone()),
///             SqlParam::OptString(req.email.clone()),
///             SqlParam::OptString(req.phone.clone()),
///         ],
///         update_params: |req| {
///             let mut updates = Vec::new();
///             if let Some(name) = &req.name {
///                 updates.push(("name", SqlParam::String(name.clone())));
///             }
///             updates
///         },
///     }
/// }
/// ```
///
/// Add `nullable_read: true,` after `filter_type` for resources where an
/// absent row is a valid read result.
#[macro_export]
macro_rules! impl_resource {
    (
        $response_type:ty {
            kind: $kind:expr,
            id_field: $id_field:ident,
            create_type: $create_type:ty,
            update_type: $update_type:ty,
            filter_type: $filter_type:ty,
            $(nullable_read: $nullable_read:expr,)?
            create_columns: [$($column:literal),* $(,)?],
            create_params: |$req:ident| $create_params_expr:expr,
            update_params: |$update_req:ident| $update_params_expr:expr,
        }
    ) => {
        impl $crate::resource::Resource for $response_type {
            type Create = $create_type;
            type Update = $update_type;
            type ListFilter = $filter_type;

            const KIND: paddock_core::ResourceKind = $kind;
            const CREATE_COLUMNS: &'static [&'static str] = &[$($column),*];
            $(const NULLABLE_READ: bool = $nullable_read;)?

            fn entity_id(&self) -> paddock_core::EntityId {
                self.$id_field
            }

            fn farm_id(&self) -> paddock_core::FarmId {
                self.farm_id
            }

            fn create_schema() -> $crate::schema::Schema {
                create_schema()
            }

            fn update_schema() -> $crate::schema::Schema {
                update_schema()
            }

            fn list_schema() -> $crate::schema::Schema {
                list_schema()
            }

            fn create_params($req: &Self::Create) -> Vec<$crate::resource::SqlParam> {
                $create_params_expr
            }

            fn update_params(
                $update_req: &Self::Update,
            ) -> Vec<(&'static str, $crate::resource::SqlParam)> {
                $update_params_expr
            }
        }

        impl paddock_storage::CacheableEntity for $response_type {
            fn resource_kind() -> paddock_core::ResourceKind {
                $kind
            }

            fn entity_id(&self) -> uuid::Uuid {
                self.$id_field
            }

            fn farm_id(&self) -> uuid::Uuid {
                self.farm_id
            }
        }
    };
}

pub use impl_resource;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_offset_law() {
        let p = Pagination {
            page: 1,
            page_size: 10,
        };
        assert_eq!(p.offset(), 0);

        let p = Pagination {
            page: 3,
            page_size: 25,
        };
        assert_eq!(p.offset(), 50);
    }

    #[test]
    fn pagination_offset_saturates_instead_of_overflowing() {
        let p = Pagination {
            page: i64::MAX,
            page_size: 10,
        };
        assert_eq!(p.offset(), i64::MAX);
    }

    #[test]
    fn pagination_key_fields_include_both_values() {
        let p = Pagination {
            page: 2,
            page_size: 50,
        };
        let fields = p.key_fields();
        assert!(fields.contains(&("page".to_string(), "2".to_string())));
        assert!(fields.contains(&("page_size".to_string(), "50".to_string())));
    }

    #[test]
    fn sql_param_debug_shows_value() {
        let param = SqlParam::String("test".to_string());
        assert!(format!("{:?}", param).contains("test"));
    }
}
