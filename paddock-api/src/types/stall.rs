//! Stall-related API types

use paddock_core::{EntityId, FarmId, ResourceKind, StallStatus, Timestamp};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::impl_resource;
use crate::resource::{ListFilter, Pagination, SqlParam};
use crate::schema::{Field, Schema};
use crate::validation::HasUpdates;

use super::DEFAULT_PAGE_SIZE;

/// Request to create a new stall.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CreateStallRequest {
    /// Stall label, e.g. "A-3"
    pub name: String,
    /// Barn the stall is in
    pub barn: Option<String>,
    /// Occupancy status, defaults to available
    pub status: StallStatus,
    /// Boarding rate per day
    pub daily_rate: Option<f64>,
}

/// Request to update an existing stall.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UpdateStallRequest {
    pub name: Option<String>,
    pub barn: Option<String>,
    pub status: Option<StallStatus>,
    pub daily_rate: Option<f64>,
}

impl HasUpdates for UpdateStallRequest {
    fn has_any_updates(&self) -> bool {
        self.name.is_some()
            || self.barn.is_some()
            || self.status.is_some()
            || self.daily_rate.is_some()
    }
}

/// Filter for listing stalls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct StallListFilter {
    #[serde(flatten)]
    pub pagination: Pagination,
    pub status: Option<StallStatus>,
    pub barn: Option<String>,
}

impl ListFilter for StallListFilter {
    fn page(&self) -> i64 {
        self.pagination.page
    }

    fn page_size(&self) -> i64 {
        self.pagination.page_size
    }

    fn predicates(&self) -> Vec<(&'static str, SqlParam)> {
        let mut predicates = Vec::new();
        if let Some(status) = self.status {
            predicates.push(("status =", SqlParam::String(status.as_db_str().to_string())));
        }
        if let Some(barn) = &self.barn {
            predicates.push(("barn =", SqlParam::String(barn.clone())));
        }
        predicates
    }

    fn key_fields(&self) -> Vec<(String, String)> {
        let mut fields = self.pagination.key_fields();
        if let Some(status) = self.status {
            fields.push(("status".to_string(), status.as_db_str().to_string()));
        }
        if let Some(barn) = &self.barn {
            fields.push(("barn".to_string(), barn.clone()));
        }
        fields
    }
}

/// Stall response mirroring one storage row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct StallResponse {
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub stall_id: EntityId,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub farm_id: FarmId,
    pub name: String,
    pub barn: Option<String>,
    pub status: StallStatus,
    pub daily_rate: Option<f64>,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub created_at: Timestamp,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub updated_at: Timestamp,
}

pub fn create_schema() -> Schema {
    Schema::new()
        .field(Field::non_empty_text("name").required())
        .field(Field::text("barn"))
        .field(Field::select("status", StallStatus::OPTIONS).default_value(json!("available")))
        .field(Field::number("daily_rate").min(0.0))
}

pub fn update_schema() -> Schema {
    Schema::new()
        .field(Field::non_empty_text("name"))
        .field(Field::text("barn"))
        .field(Field::select("status", StallStatus::OPTIONS))
        .field(Field::number("daily_rate").min(0.0))
}

pub fn list_schema() -> Schema {
    Schema::new()
        .paginated(DEFAULT_PAGE_SIZE)
        .field(Field::select("status", StallStatus::OPTIONS))
        .field(Field::text("barn"))
}

impl_resource! {
    StallResponse {
        kind: ResourceKind::Stall,
        id_field: stall_id,
        create_type: CreateStallRequest,
        update_type: UpdateStallRequest,
        filter_type: StallListFilter,
        create_columns: ["name", "barn", "status", "daily_rate"],
        create_params: |req| vec![
            SqlParam::String(req.name.clone()),
            SqlParam::OptString(req.barn.clone()),
            SqlParam::String(req.status.as_db_str().to_string()),
            SqlParam::OptDouble(req.daily_rate),
        ],
        update_params: |req| {
            let mut updates = Vec::new();
            if let Some(name) = &req.name {
                updates.push(("name", SqlParam::String(name.clone())));
            }
            if let Some(barn) = &req.barn {
                updates.push(("barn", SqlParam::String(barn.clone())));
            }
            if let Some(status) = req.status {
                updates.push(("status", SqlParam::String(status.as_db_str().to_string())));
            }
            if let Some(daily_rate) = req.daily_rate {
                updates.push(("daily_rate", SqlParam::Double(daily_rate)));
            }
            updates
        },
    }
}
