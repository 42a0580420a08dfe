//! Pasture API types

use paddock_core::{EntityId, FarmId, ResourceKind, Timestamp};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::impl_resource;
use crate::resource::{ListFilter, Pagination, SqlParam};
use crate::schema::{Field, Schema};
use crate::validation::HasUpdates;

use super::DEFAULT_PAGE_SIZE;

/// Request to create a new pasture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CreatePastureRequest {
    pub name: String,
    /// Pasture size in acres
    pub acres: Option<f64>,
    /// Maximum number of horses the pasture can hold
    pub capacity: Option<i32>,
    /// Whether the pasture is resting from grazing, defaults to false
    pub resting: bool,
}

/// Request to update an existing pasture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UpdatePastureRequest {
    pub name: Option<String>,
    pub acres: Option<f64>,
    pub capacity: Option<i32>,
    pub resting: Option<bool>,
}

impl HasUpdates for UpdatePastureRequest {
    fn has_any_updates(&self) -> bool {
        self.name.is_some()
            || self.acres.is_some()
            || self.capacity.is_some()
            || self.resting.is_some()
    }
}

/// Filter for listing pastures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct PastureListFilter {
    #[serde(flatten)]
    pub pagination: Pagination,
    pub resting: Option<bool>,
}

impl ListFilter for PastureListFilter {
    fn page(&self) -> i64 {
        self.pagination.page
    }

    fn page_size(&self) -> i64 {
        self.pagination.page_size
    }

    fn predicates(&self) -> Vec<(&'static str, SqlParam)> {
        let mut predicates = Vec::new();
        if let Some(resting) = self.resting {
            predicates.push(("resting =", SqlParam::Bool(resting)));
        }
        predicates
    }

    fn key_fields(&self) -> Vec<(String, String)> {
        let mut fields = self.pagination.key_fields();
        if let Some(resting) = self.resting {
            fields.push(("resting".to_string(), resting.to_string()));
        }
        fields
    }
}

/// Pasture response mirroring one storage row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct PastureResponse {
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub pasture_id: EntityId,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub farm_id: FarmId,
    pub name: String,
    pub acres: Option<f64>,
    pub capacity: Option<i32>,
    pub resting: bool,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub created_at: Timestamp,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub updated_at: Timestamp,
}

pub fn create_schema() -> Schema {
    Schema::new()
        .field(Field::non_empty_text("name").required())
        .field(Field::number("acres").min(0.0))
        .field(Field::integer("capacity").min(0.0))
        .field(Field::boolean("resting").default_value(json!(false)))
}

pub fn update_schema() -> Schema {
    Schema::new()
        .field(Field::non_empty_text("name"))
        .field(Field::number("acres").min(0.0))
        .field(Field::integer("capacity").min(0.0))
        .field(Field::boolean("resting"))
}

pub fn list_schema() -> Schema {
    Schema::new()
        .paginated(DEFAULT_PAGE_SIZE)
        .field(Field::boolean("resting"))
}

impl_resource! {
    PastureResponse {
        kind: ResourceKind::Pasture,
        id_field: pasture_id,
        create_type: CreatePastureRequest,
        update_type: UpdatePastureRequest,
        filter_type: PastureListFilter,
        create_columns: ["name", "acres", "capacity", "resting"],
        create_params: |req| vec![
            SqlParam::String(req.name.clone()),
            SqlParam::OptDouble(req.acres),
            SqlParam::OptInt(req.capacity),
            SqlParam::Bool(req.resting),
        ],
        update_params: |req| {
            let mut updates = Vec::new();
            if let Some(name) = &req.name {
                updates.push(("name", SqlParam::String(name.clone())));
            }
            if let Some(acres) = req.acres {
                updates.push(("acres", SqlParam::Double(acres)));
            }
            if let Some(capacity) = req.capacity {
                updates.push(("capacity", SqlParam::Int(capacity)));
            }
            if let Some(resting) = req.resting {
                updates.push(("resting", SqlParam::Bool(resting)));
            }
            updates
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resting_defaults_to_false() {
        let normalized = create_schema()
            .validate(&json!({"name": "North field"}))
            .expect("valid");
        assert_eq!(normalized["resting"], json!(false));
    }

    #[test]
    fn capacity_must_not_be_negative() {
        let errors = create_schema()
            .validate(&json!({"name": "North field", "capacity": -3}))
            .expect_err("negative capacity");
        assert!(errors.names_field("capacity"));
    }

    #[test]
    fn resting_filter_produces_a_boolean_predicate() {
        let filter = PastureListFilter {
            pagination: Pagination {
                page: 1,
                page_size: DEFAULT_PAGE_SIZE,
            },
            resting: Some(true),
        };
        let predicates = filter.predicates();
        assert_eq!(predicates.len(), 1);
        assert_eq!(predicates[0].0, "resting =");
    }
}
