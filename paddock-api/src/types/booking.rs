//! Facility booking API types (arena, wash rack, trailer parking).

use paddock_core::{BookingStatus, EntityId, FarmId, ResourceKind, Timestamp};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::impl_resource;
use crate::resource::{ListFilter, Pagination, SqlParam};
use crate::schema::{Field, Schema};
use crate::validation::HasUpdates;

use super::DEFAULT_PAGE_SIZE;

/// Request to create a new booking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CreateBookingRequest {
    /// Facility being booked, e.g. "indoor arena"
    pub facility: String,
    /// Horse the booking is for
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub horse_id: EntityId,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub starts_at: Timestamp,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub ends_at: Timestamp,
    /// Lifecycle status, defaults to pending
    pub status: BookingStatus,
    pub notes: Option<String>,
}

/// Request to update an existing booking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UpdateBookingRequest {
    pub facility: Option<String>,
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>, format = "date-time"))]
    pub starts_at: Option<Timestamp>,
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>, format = "date-time"))]
    pub ends_at: Option<Timestamp>,
    pub status: Option<BookingStatus>,
    pub notes: Option<String>,
}

impl HasUpdates for UpdateBookingRequest {
    fn has_any_updates(&self) -> bool {
        self.facility.is_some()
            || self.starts_at.is_some()
            || self.ends_at.is_some()
            || self.status.is_some()
            || self.notes.is_some()
    }
}

/// Filter for listing bookings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct BookingListFilter {
    #[serde(flatten)]
    pub pagination: Pagination,
    pub status: Option<BookingStatus>,
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>, format = "uuid"))]
    pub horse_id: Option<EntityId>,
}

impl ListFilter for BookingListFilter {
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
        if let Some(horse_id) = self.horse_id {
            predicates.push(("horse_id =", SqlParam::Uuid(horse_id)));
        }
        predicates
    }

    fn key_fields(&self) -> Vec<(String, String)> {
        let mut fields = self.pagination.key_fields();
        if let Some(status) = self.status {
            fields.push(("status".to_string(), status.as_db_str().to_string()));
        }
        if let Some(horse_id) = self.horse_id {
            fields.push(("horse_id".to_string(), horse_id.to_string()));
        }
        fields
    }
}

/// Booking response mirroring one storage row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct BookingResponse {
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub booking_id: EntityId,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub farm_id: FarmId,
    pub facility: String,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub horse_id: EntityId,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub starts_at: Timestamp,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub ends_at: Timestamp,
    pub status: BookingStatus,
    pub notes: Option<String>,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub created_at: Timestamp,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub updated_at: Timestamp,
}

pub fn create_schema() -> Schema {
    Schema::new()
        .field(Field::non_empty_text("facility").required())
        .field(Field::id("horse_id").required())
        .field(Field::timestamp("starts_at").required())
        .field(Field::timestamp("ends_at").required())
        .field(Field::select("status", BookingStatus::OPTIONS).default_value(json!("pending")))
        .field(Field::text("notes"))
}

pub fn update_schema() -> Schema {
    Schema::new()
        .field(Field::non_empty_text("facility"))
        .field(Field::timestamp("starts_at"))
        .field(Field::timestamp("ends_at"))
        .field(Field::select("status", BookingStatus::OPTIONS))
        .field(Field::text("notes"))
}

pub fn list_schema() -> Schema {
    Schema::new()
        .paginated(DEFAULT_PAGE_SIZE)
        .field(Field::select("status", BookingStatus::OPTIONS))
        .field(Field::id("horse_id"))
}

impl_resource! {
    BookingResponse {
        kind: ResourceKind::Booking,
        id_field: booking_id,
        create_type: CreateBookingRequest,
        update_type: UpdateBookingRequest,
        filter_type: BookingListFilter,
        create_columns: ["facility", "horse_id", "starts_at", "ends_at", "status", "notes"],
        create_params: |req| vec![
            SqlParam::String(req.facility.clone()),
            SqlParam::Uuid(req.horse_id),
            SqlParam::Timestamp(req.starts_at),
            SqlParam::Timestamp(req.ends_at),
            SqlParam::String(req.status.as_db_str().to_string()),
            SqlParam::OptString(req.notes.clone()),
        ],
        update_params: |req| {
            let mut updates = Vec::new();
            if let Some(facility) = &req.facility {
                updates.push(("facility", SqlParam::String(facility.clone())));
            }
            if let Some(starts_at) = req.starts_at {
                updates.push(("starts_at", SqlParam::Timestamp(starts_at)));
            }
            if let Some(ends_at) = req.ends_at {
                updates.push(("ends_at", SqlParam::Timestamp(ends_at)));
            }
            if let Some(status) = req.status {
                updates.push(("status", SqlParam::String(status.as_db_str().to_string())));
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

    #[test]
    fn create_schema_requires_time_range() {
        let errors = create_schema()
            .validate(&json!({
                "facility": "indoor arena",
                "horse_id": "018f4e7a-0000-7000-8000-000000000001",
            }))
            .expect_err("missing timestamps");
        assert!(errors.names_field("starts_at"));
        assert!(errors.names_field("ends_at"));
    }

    #[test]
    fn status_defaults_to_pending() {
        let normalized = create_schema()
            .validate(&json!({
                "facility": "wash rack",
                "horse_id": "018f4e7a-0000-7000-8000-000000000001",
                "starts_at": "2026-09-01T09:00:00Z",
                "ends_at": "2026-09-01T10:00:00Z",
            }))
            .expect("valid");
        assert_eq!(normalized["status"], json!("pending"));
    }
}
