//! Invoice-related API types

use paddock_core::{EntityId, FarmId, InvoiceStatus, ResourceKind, Timestamp};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::impl_resource;
use crate::resource::{ListFilter, Pagination, SqlParam};
use crate::schema::{Field, Schema};
use crate::validation::HasUpdates;

use super::DEFAULT_PAGE_SIZE;

/// Request to create a new invoice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CreateInvoiceRequest {
    /// Boarder being billed
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub boarder_id: EntityId,
    /// Amount in the farm's currency
    pub amount: f64,
    /// Billing state, defaults to draft
    pub status: InvoiceStatus,
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>, format = "date-time"))]
    pub due_date: Option<Timestamp>,
    pub memo: Option<String>,
}

/// Request to update an existing invoice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UpdateInvoiceRequest {
    pub amount: Option<f64>,
    pub status: Option<InvoiceStatus>,
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>, format = "date-time"))]
    pub due_date: Option<Timestamp>,
    pub memo: Option<String>,
}

impl HasUpdates for UpdateInvoiceRequest {
    fn has_any_updates(&self) -> bool {
        self.amount.is_some()
            || self.status.is_some()
            || self.due_date.is_some()
            || self.memo.is_some()
    }
}

/// Filter for listing invoices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct InvoiceListFilter {
    #[serde(flatten)]
    pub pagination: Pagination,
    pub status: Option<InvoiceStatus>,
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>, format = "uuid"))]
    pub boarder_id: Option<EntityId>,
    /// Only invoices due at or after this instant
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>, format = "date-time"))]
    pub due_after: Option<Timestamp>,
    /// Only invoices due at or before this instant
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>, format = "date-time"))]
    pub due_before: Option<Timestamp>,
}

impl ListFilter for InvoiceListFilter {
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
        if let Some(boarder_id) = self.boarder_id {
            predicates.push(("boarder_id =", SqlParam::Uuid(boarder_id)));
        }
        if let Some(due_after) = self.due_after {
            predicates.push(("due_date >=", SqlParam::Timestamp(due_after)));
        }
        if let Some(due_before) = self.due_before {
            predicates.push(("due_date <=", SqlParam::Timestamp(due_before)));
        }
        predicates
    }

    fn key_fields(&self) -> Vec<(String, String)> {
        let mut fields = self.pagination.key_fields();
        if let Some(status) = self.status {
            fields.push(("status".to_string(), status.as_db_str().to_string()));
        }
        if let Some(boarder_id) = self.boarder_id {
            fields.push(("boarder_id".to_string(), boarder_id.to_string()));
        }
        if let Some(due_after) = self.due_after {
            fields.push(("due_after".to_string(), due_after.to_rfc3339()));
        }
        if let Some(due_before) = self.due_before {
            fields.push(("due_before".to_string(), due_before.to_rfc3339()));
        }
        fields
    }
}

/// Invoice response mirroring one storage row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct InvoiceResponse {
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub invoice_id: EntityId,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub farm_id: FarmId,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub boarder_id: EntityId,
    pub amount: f64,
    pub status: InvoiceStatus,
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>, format = "date-time"))]
    pub due_date: Option<Timestamp>,
    pub memo: Option<String>,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub created_at: Timestamp,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub updated_at: Timestamp,
}

pub fn create_schema() -> Schema {
    Schema::new()
        .field(Field::id("boarder_id").required())
        .field(Field::number("amount").required().min(0.0))
        .field(Field::select("status", InvoiceStatus::OPTIONS).default_value(json!("draft")))
        .field(Field::timestamp("due_date"))
        .field(Field::text("memo"))
}

pub fn update_schema() -> Schema {
    Schema::new()
        .field(Field::number("amount").min(0.0))
        .field(Field::select("status", InvoiceStatus::OPTIONS))
        .field(Field::timestamp("due_date"))
        .field(Field::text("memo"))
}

pub fn list_schema() -> Schema {
    Schema::new()
        .paginated(DEFAULT_PAGE_SIZE)
        .field(Field::select("status", InvoiceStatus::OPTIONS))
        .field(Field::id("boarder_id"))
        .field(Field::timestamp("due_after"))
        .field(Field::timestamp("due_before"))
}

impl_resource! {
    InvoiceResponse {
        kind: ResourceKind::Invoice,
        id_field: invoice_id,
        create_type: CreateInvoiceRequest,
        update_type: UpdateInvoiceRequest,
        filter_type: InvoiceListFilter,
        create_columns: ["boarder_id", "amount", "status", "due_date", "memo"],
        create_params: |req| vec![
            SqlParam::Uuid(req.boarder_id),
            SqlParam::Double(req.amount),
            SqlParam::String(req.status.as_db_str().to_string()),
            SqlParam::OptTimestamp(req.due_date),
            SqlParam::OptString(req.memo.clone()),
        ],
        update_params: |req| {
            let mut updates = Vec::new();
            if let Some(amount) = req.amount {
                updates.push(("amount", SqlParam::Double(amount)));
            }
            if let Some(status) = req.status {
                updates.push(("status", SqlParam::String(status.as_db_str().to_string())));
            }
            if let Some(due_date) = req.due_date {
                updates.push(("due_date", SqlParam::Timestamp(due_date)));
            }
            if let Some(memo) = &req.memo {
                updates.push(("memo", SqlParam::String(memo.clone())));
            }
            updates
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amount_is_required() {
        let errors = create_schema()
            .validate(&json!({"boarder_id": "018f4e7a-0000-7000-8000-000000000001"}))
            .expect_err("amount missing");
        assert!(errors.names_field("amount"));
    }

    #[test]
    fn numeric_string_amount_is_coerced() {
        let normalized = create_schema()
            .validate(&json!({
                "boarder_id": "018f4e7a-0000-7000-8000-000000000001",
                "amount": "450.00",
            }))
            .expect("valid");
        assert_eq!(normalized["amount"], json!(450.0));
    }
}
