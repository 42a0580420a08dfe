//! Boarder-related API types

use paddock_core::{EntityId, FarmId, ResourceKind, Timestamp};
use serde::{Deserialize, Serialize};

use crate::impl_resource;
use crate::resource::{ListFilter, Pagination, SqlParam};
use crate::schema::{Field, Schema};
use crate::validation::HasUpdates;

use super::DEFAULT_PAGE_SIZE;

/// Request to create a new boarder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CreateBoarderRequest {
    /// Full name of the boarder
    pub name: String,
    /// Contact email
    pub email: Option<String>,
    /// Contact phone number
    pub phone: Option<String>,
    /// Emergency contact details
    pub emergency_contact: Option<String>,
    /// Free-form notes
    pub notes: Option<String>,
}

/// Request to update an existing boarder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UpdateBoarderRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub emergency_contact: Option<String>,
    pub notes: Option<String>,
}

impl HasUpdates for UpdateBoarderRequest {
    fn has_any_updates(&self) -> bool {
        self.name.is_some()
            || self.email.is_some()
            || self.phone.is_some()
            || self.emergency_contact.is_some()
            || self.notes.is_some()
    }
}

/// Filter for listing boarders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct BoarderListFilter {
    #[serde(flatten)]
    pub pagination: Pagination,
}

impl ListFilter for BoarderListFilter {
    fn page(&self) -> i64 {
        self.pagination.page
    }

    fn page_size(&self) -> i64 {
        self.pagination.page_size
    }

    fn predicates(&self) -> Vec<(&'static str, SqlParam)> {
        Vec::new()
    }

    fn key_fields(&self) -> Vec<(String, String)> {
        self.pagination.key_fields()
    }
}

/// Boarder response mirroring one storage row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct BoarderResponse {
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub boarder_id: EntityId,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub farm_id: FarmId,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub emergency_contact: Option<String>,
    pub notes: Option<String>,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub created_at: Timestamp,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub updated_at: Timestamp,
}

pub fn create_schema() -> Schema {
    Schema::new()
        .field(Field::non_empty_text("name").required())
        .field(Field::text("email"))
        .field(Field::text("phone"))
        .field(Field::text("emergency_contact"))
        .field(Field::text("notes"))
}

pub fn update_schema() -> Schema {
    Schema::new()
        .field(Field::non_empty_text("name"))
        .field(Field::text("email"))
        .field(Field::text("phone"))
        .field(Field::text("emergency_contact"))
        .field(Field::text("notes"))
}

pub fn list_schema() -> Schema {
    Schema::new().paginated(DEFAULT_PAGE_SIZE)
}

impl_resource! {
    BoarderResponse {
        kind: ResourceKind::Boarder,
        id_field: boarder_id,
        create_type: CreateBoarderRequest,
        update_type: UpdateBoarderRequest,
        filter_type: BoarderListFilter,
        create_columns: ["name", "email", "phone", "emergency_contact", "notes"],
        create_params: |req| vec![
            SqlParam::String(req.name.clone()),
            SqlParam::OptString(req.email.clone()),
            SqlParam::OptString(req.phone.clone()),
            SqlParam::OptString(req.emergency_contact.clone()),
            SqlParam::OptString(req.notes.clone()),
        ],
        update_params: |req| {
            let mut updates = Vec::new();
            if let Some(name) = &req.name {
                updates.push(("name", SqlParam::String(name.clone())));
            }
            if let Some(email) = &req.email {
                updates.push(("email", SqlParam::String(email.clone())));
            }
            if let Some(phone) = &req.phone {
                updates.push(("phone", SqlParam::String(phone.clone())));
            }
            if let Some(contact) = &req.emergency_contact {
                updates.push(("emergency_contact", SqlParam::String(contact.clone())));
            }
            if let Some(notes) = &req.notes {
                updates.push(("notes", SqlParam::String(notes.clone())));
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
    fn create_schema_requires_name() {
        let errors = create_schema()
            .validate(&json!({"email": "a@b.farm"}))
            .expect_err("name is required");
        assert!(errors.names_field("name"));
    }

    #[test]
    fn list_schema_applies_pagination_defaults() {
        let normalized = list_schema().validate(&json!({})).expect("valid");
        assert_eq!(normalized["page"], json!(1));
        assert_eq!(normalized["page_size"], json!(DEFAULT_PAGE_SIZE));
    }

    #[test]
    fn update_with_no_fields_has_no_updates() {
        let req = UpdateBoarderRequest {
            name: None,
            email: None,
            phone: None,
            emergency_contact: None,
            notes: None,
        };
        assert!(!req.has_any_updates());
    }
}
