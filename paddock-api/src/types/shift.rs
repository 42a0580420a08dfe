//! Payroll shift API types

use paddock_core::{EntityId, FarmId, ResourceKind, ShiftRole, Timestamp};
use serde::{Deserialize, Serialize};

use crate::impl_resource;
use crate::resource::{ListFilter, Pagination, SqlParam};
use crate::schema::{Field, Schema};
use crate::validation::HasUpdates;

use super::DEFAULT_PAGE_SIZE;

/// Request to schedule a new shift.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CreateShiftRequest {
    /// Who works the shift
    pub worker_name: String,
    pub role: ShiftRole,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub starts_at: Timestamp,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub ends_at: Timestamp,
    /// Pay rate per hour
    pub hourly_rate: Option<f64>,
}

/// Request to update an existing shift.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UpdateShiftRequest {
    pub worker_name: Option<String>,
    pub role: Option<ShiftRole>,
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>, format = "date-time"))]
    pub starts_at: Option<Timestamp>,
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>, format = "date-time"))]
    pub ends_at: Option<Timestamp>,
    pub hourly_rate: Option<f64>,
}

impl HasUpdates for UpdateShiftRequest {
    fn has_any_updates(&self) -> bool {
        self.worker_name.is_some()
            || self.role.is_some()
            || self.starts_at.is_some()
            || self.ends_at.is_some()
            || self.hourly_rate.is_some()
    }
}

/// Filter for listing shifts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ShiftListFilter {
    #[serde(flatten)]
    pub pagination: Pagination,
    pub role: Option<ShiftRole>,
}

impl ListFilter for ShiftListFilter {
    fn page(&self) -> i64 {
        self.pagination.page
    }

    fn page_size(&self) -> i64 {
        self.pagination.page_size
    }

    fn predicates(&self) -> Vec<(&'static str, SqlParam)> {
        let mut predicates = Vec::new();
        if let Some(role) = self.role {
            predicates.push(("role =", SqlParam::String(role.as_db_str().to_string())));
        }
        predicates
    }

    fn key_fields(&self) -> Vec<(String, String)> {
        let mut fields = self.pagination.key_fields();
        if let Some(role) = self.role {
            fields.push(("role".to_string(), role.as_db_str().to_string()));
        }
        fields
    }
}

/// Shift response mirroring one storage row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ShiftResponse {
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub shift_id: EntityId,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub farm_id: FarmId,
    pub worker_name: String,
    pub role: ShiftRole,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub starts_at: Timestamp,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub ends_at: Timestamp,
    pub hourly_rate: Option<f64>,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub created_at: Timestamp,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub updated_at: Timestamp,
}

pub fn create_schema() -> Schema {
    Schema::new()
        .field(Field::non_empty_text("worker_name").required())
        .field(Field::select("role", ShiftRole::OPTIONS).required())
        .field(Field::timestamp("starts_at").required())
        .field(Field::timestamp("ends_at").required())
        .field(Field::number("hourly_rate").min(0.0))
}

pub fn update_schema() -> Schema {
    Schema::new()
        .field(Field::non_empty_text("worker_name"))
        .field(Field::select("role", ShiftRole::OPTIONS))
        .field(Field::timestamp("starts_at"))
        .field(Field::timestamp("ends_at"))
        .field(Field::number("hourly_rate").min(0.0))
}

pub fn list_schema() -> Schema {
    Schema::new()
        .paginated(DEFAULT_PAGE_SIZE)
        .field(Field::select("role", ShiftRole::OPTIONS))
}

impl_resource! {
    ShiftResponse {
        kind: ResourceKind::Shift,
        id_field: shift_id,
        create_type: CreateShiftRequest,
        update_type: UpdateShiftRequest,
        filter_type: ShiftListFilter,
        create_columns: ["worker_name", "role", "starts_at", "ends_at", "hourly_rate"],
        create_params: |req| vec![
            SqlParam::String(req.worker_name.clone()),
            SqlParam::String(req.role.as_db_str().to_string()),
            SqlParam::Timestamp(req.starts_at),
            SqlParam::Timestamp(req.ends_at),
            SqlParam::OptDouble(req.hourly_rate),
        ],
        update_params: |req| {
            let mut updates = Vec::new();
            if let Some(worker_name) = &req.worker_name {
                updates.push(("worker_name", SqlParam::String(worker_name.clone())));
            }
            if let Some(role) = req.role {
                updates.push(("role", SqlParam::String(role.as_db_str().to_string())));
            }
            if let Some(starts_at) = req.starts_at {
                updates.push(("starts_at", SqlParam::Timestamp(starts_at)));
            }
            if let Some(ends_at) = req.ends_at {
                updates.push(("ends_at", SqlParam::Timestamp(ends_at)));
            }
            if let Some(hourly_rate) = req.hourly_rate {
                updates.push(("hourly_rate", SqlParam::Double(hourly_rate)));
            }
            updates
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn role_is_required() {
        let errors = create_schema()
            .validate(&json!({
                "worker_name": "Sam",
                "starts_at": "2026-09-01T06:00:00Z",
                "ends_at": "2026-09-01T14:00:00Z",
            }))
            .expect_err("role missing");
        assert!(errors.names_field("role"));
    }

    #[test]
    fn farm_hand_round_trips_through_the_schema() {
        let normalized = create_schema()
            .validate(&json!({
                "worker_name": "Sam",
                "role": "farm_hand",
                "starts_at": "2026-09-01T06:00:00Z",
                "ends_at": "2026-09-01T14:00:00Z",
            }))
            .expect("valid");
        let req: CreateShiftRequest =
            serde_json::from_value(serde_json::Value::Object(normalized)).expect("deserializes");
        assert_eq!(req.role, ShiftRole::FarmHand);
    }
}
