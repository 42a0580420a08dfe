//! Farm message board API types
//!
//! Messages page larger than other resources and expose a "latest"
//! read that returns null rather than 404 when the board is empty.

use paddock_core::{EntityId, FarmId, MessagePriority, ResourceKind, Timestamp};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::impl_resource;
use crate::resource::{ListFilter, Pagination, SqlParam};
use crate::schema::{Field, Schema};
use crate::validation::HasUpdates;

use super::MESSAGE_PAGE_SIZE;

/// Request to post a new message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CreateMessageRequest {
    /// Display name of the poster
    pub sender: String,
    pub body: String,
    /// Defaults to normal
    pub priority: MessagePriority,
}

/// Request to edit an existing message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UpdateMessageRequest {
    pub body: Option<String>,
    pub priority: Option<MessagePriority>,
}

impl HasUpdates for UpdateMessageRequest {
    fn has_any_updates(&self) -> bool {
        self.body.is_some() || self.priority.is_some()
    }
}

/// Filter for listing messages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct MessageListFilter {
    #[serde(flatten)]
    pub pagination: Pagination,
    pub priority: Option<MessagePriority>,
}

impl ListFilter for MessageListFilter {
    fn page(&self) -> i64 {
        self.pagination.page
    }

    fn page_size(&self) -> i64 {
        self.pagination.page_size
    }

    fn predicates(&self) -> Vec<(&'static str, SqlParam)> {
        let mut predicates = Vec::new();
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
        if let Some(priority) = self.priority {
            fields.push(("priority".to_string(), priority.as_db_str().to_string()));
        }
        fields
    }
}

/// Message response mirroring one storage row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct MessageResponse {
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub message_id: EntityId,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub farm_id: FarmId,
    pub sender: String,
    pub body: String,
    pub priority: MessagePriority,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub created_at: Timestamp,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub updated_at: Timestamp,
}

pub fn create_schema() -> Schema {
    Schema::new()
        .field(Field::non_empty_text("sender").required())
        .field(Field::non_empty_text("body").required())
        .field(Field::select("priority", MessagePriority::OPTIONS).default_value(json!("normal")))
}

pub fn update_schema() -> Schema {
    Schema::new()
        .field(Field::non_empty_text("body"))
        .field(Field::select("priority", MessagePriority::OPTIONS))
}

pub fn list_schema() -> Schema {
    Schema::new()
        .paginated(MESSAGE_PAGE_SIZE)
        .field(Field::select("priority", MessagePriority::OPTIONS))
}

impl_resource! {
    MessageResponse {
        kind: ResourceKind::Message,
        id_field: message_id,
        create_type: CreateMessageRequest,
        update_type: UpdateMessageRequest,
        filter_type: MessageListFilter,
        nullable_read: true,
        create_columns: ["sender", "body", "priority"],
        create_params: |req| vec![
            SqlParam::String(req.sender.clone()),
            SqlParam::String(req.body.clone()),
            SqlParam::String(req.priority.as_db_str().to_string()),
        ],
        update_params: |req| {
            let mut updates = Vec::new();
            if let Some(body) = &req.body {
                updates.push(("body", SqlParam::String(body.clone())));
            }
            if let Some(priority) = req.priority {
                updates.push((
                    "priority",
                    SqlParam::String(priority.as_db_str().to_string()),
                ));
            }
            updates
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_body_is_rejected() {
        let errors = create_schema()
            .validate(&json!({"sender": "Dana", "body": "   "}))
            .expect_err("blank body");
        assert!(errors.names_field("body"));
    }

    #[test]
    fn priority_defaults_to_normal() {
        let normalized = create_schema()
            .validate(&json!({"sender": "Dana", "body": "Farrier here Tuesday"}))
            .expect("valid");
        assert_eq!(normalized["priority"], json!("normal"));
    }

    #[test]
    fn list_schema_defaults_to_large_pages() {
        let normalized = list_schema().validate(&json!({})).expect("valid");
        assert_eq!(normalized["page_size"], json!(MESSAGE_PAGE_SIZE));
    }
}
