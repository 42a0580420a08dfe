//! Maintenance task API types

use paddock_core::{
    EntityId, FarmId, MaintenancePriority, MaintenanceStatus, ResourceKind, Timestamp,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::impl_resource;
use crate::resource::{ListFilter, Pagination, SqlParam};
use crate::schema::{Field, Schema};
use crate::validation::HasUpdates;

use super::DEFAULT_PAGE_SIZE;

/// Request to create a new maintenance task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CreateMaintenanceTaskRequest {
    pub title: String,
    pub description: Option<String>,
    /// Progress, defaults to open
    pub status: MaintenanceStatus,
    /// Urgency, defaults to medium
    pub priority: MaintenancePriority,
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>, format = "date-time"))]
    pub due_at: Option<Timestamp>,
}

/// Request to update an existing maintenance task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UpdateMaintenanceTaskRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<MaintenanceStatus>,
    pub priority: Option<MaintenancePriority>,
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>, format = "date-time"))]
    pub due_at: Option<Timestamp>,
}

impl HasUpdates for UpdateMaintenanceTaskRequest {
    fn has_any_updates(&self) -> bool {
        self.title.is_some()
            || self.description.is_some()
            || self.status.is_some()
            || self.priority.is_some()
            || self.due_at.is_some()
    }
}

/// Filter for listing maintenance tasks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct MaintenanceTaskListFilter {
    #[serde(flatten)]
    pub pagination: Pagination,
    pub status: Option<MaintenanceStatus>,
    pub priority: Option<MaintenancePriority>,
}

impl ListFilter for MaintenanceTaskListFilter {
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
        if let Some(priority) = self.priority {
            predicates.push((
                "priority =",
                SqlParam::String(priority.as_db_str().to_string()),
            ));
        }
        predicates
    }

    fn key_fields(&self) -> Vec<(String, String)> {
        let mut fields = self.pagination.key_fields();
        if let Some(status) = self.status {
            fields.push(("status".to_string(), status.as_db_str().to_string()));
        }
        if let Some(priority) = self.priority {
            fields.push(("priority".to_string(), priority.as_db_str().to_string()));
        }
        fields
    }
}

/// Maintenance task response mirroring one storage row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct MaintenanceTaskResponse {
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub maintenance_task_id: EntityId,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub farm_id: FarmId,
    pub title: String,
    pub description: Option<String>,
    pub status: MaintenanceStatus,
    pub priority: MaintenancePriority,
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>, format = "date-time"))]
    pub due_at: Option<Timestamp>,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub created_at: Timestamp,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub updated_at: Timestamp,
}

pub fn create_schema() -> Schema {
    Schema::new()
        .field(Field::non_empty_text("title").required())
        .field(Field::text("description"))
        .field(Field::select("status", MaintenanceStatus::OPTIONS).default_value(json!("open")))
        .field(
            Field::select("priority", MaintenancePriority::OPTIONS).default_value(json!("medium")),
        )
        .field(Field::timestamp("due_at"))
}

pub fn update_schema() -> Schema {
    Schema::new()
        .field(Field::non_empty_text("title"))
        .field(Field::text("description"))
        .field(Field::select("status", MaintenanceStatus::OPTIONS))
        .field(Field::select("priority", MaintenancePriority::OPTIONS))
        .field(Field::timestamp("due_at"))
}

pub fn list_schema() -> Schema {
    Schema::new()
        .paginated(DEFAULT_PAGE_SIZE)
        .field(Field::select("status", MaintenanceStatus::OPTIONS))
        .field(Field::select("priority", MaintenancePriority::OPTIONS))
}

impl_resource! {
    MaintenanceTaskResponse {
        kind: ResourceKind::MaintenanceTask,
        id_field: maintenance_task_id,
        create_type: CreateMaintenanceTaskRequest,
        update_type: UpdateMaintenanceTaskRequest,
        filter_type: MaintenanceTaskListFilter,
        create_columns: ["title", "description", "status", "priority", "due_at"],
        create_params: |req| vec![
            SqlParam::String(req.title.clone()),
            SqlParam::OptString(req.description.clone()),
            SqlParam::String(req.status.as_db_str().to_string()),
            SqlParam::String(req.priority.as_db_str().to_string()),
            SqlParam::OptTimestamp(req.due_at),
        ],
        update_params: |req| {
            let mut updates = Vec::new();
            if let Some(title) = &req.title {
                updates.push(("title", SqlParam::String(title.clone())));
            }
            if let Some(description) = &req.description {
                updates.push(("description", SqlParam::String(description.clone())));
            }
            if let Some(status) = req.status {
                updates.push(("status", SqlParam::String(status.as_db_str().to_string())));
            }
            if let Some(priority) = req.priority {
                updates.push((
                    "priority",
                    SqlParam::String(priority.as_db_str().to_string()),
                ));
            }
            if let Some(due_at) = req.due_at {
                updates.push(("due_at", SqlParam::Timestamp(due_at)));
            }
            updates
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_to_status_and_priority() {
        let normalized = create_schema()
            .validate(&json!({"title": "Fix gate latch"}))
            .expect("valid");
        assert_eq!(normalized["status"], json!("open"));
        assert_eq!(normalized["priority"], json!("medium"));
    }
}
