//! Expense-related API types
//!
//! Date filtering uses ordinary timestamp range predicates
//! (`incurred_after`/`incurred_before`).

use paddock_core::{EntityId, ExpenseCategory, FarmId, ResourceKind, Timestamp};
use serde::{Deserialize, Serialize};

use crate::impl_resource;
use crate::resource::{ListFilter, Pagination, SqlParam};
use crate::schema::{Field, Schema};
use crate::validation::HasUpdates;

use super::DEFAULT_PAGE_SIZE;

/// Request to create a new expense.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CreateExpenseRequest {
    /// What the money was spent on
    pub description: String,
    /// Amount in the farm's currency
    pub amount: f64,
    pub category: ExpenseCategory,
    /// When the expense was incurred; defaults to now in storage
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>, format = "date-time"))]
    pub incurred_at: Option<Timestamp>,
}

/// Request to update an existing expense.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UpdateExpenseRequest {
    pub description: Option<String>,
    pub amount: Option<f64>,
    pub category: Option<ExpenseCategory>,
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>, format = "date-time"))]
    pub incurred_at: Option<Timestamp>,
}

impl HasUpdates for UpdateExpenseRequest {
    fn has_any_updates(&self) -> bool {
        self.description.is_some()
            || self.amount.is_some()
            || self.category.is_some()
            || self.incurred_at.is_some()
    }
}

/// Filter for listing expenses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ExpenseListFilter {
    #[serde(flatten)]
    pub pagination: Pagination,
    pub category: Option<ExpenseCategory>,
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>, format = "date-time"))]
    pub incurred_after: Option<Timestamp>,
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>, format = "date-time"))]
    pub incurred_before: Option<Timestamp>,
}

impl ListFilter for ExpenseListFilter {
    fn page(&self) -> i64 {
        self.pagination.page
    }

    fn page_size(&self) -> i64 {
        self.pagination.page_size
    }

    fn predicates(&self) -> Vec<(&'static str, SqlParam)> {
        let mut predicates = Vec::new();
        if let Some(category) = self.category {
            predicates.push((
                "category =",
                SqlParam::String(category.as_db_str().to_string()),
            ));
        }
        if let Some(incurred_after) = self.incurred_after {
            predicates.push(("incurred_at >=", SqlParam::Timestamp(incurred_after)));
        }
        if let Some(incurred_before) = self.incurred_before {
            predicates.push(("incurred_at <=", SqlParam::Timestamp(incurred_before)));
        }
        predicates
    }

    fn key_fields(&self) -> Vec<(String, String)> {
        let mut fields = self.pagination.key_fields();
        if let Some(category) = self.category {
            fields.push(("category".to_string(), category.as_db_str().to_string()));
        }
        if let Some(incurred_after) = self.incurred_after {
            fields.push(("incurred_after".to_string(), incurred_after.to_rfc3339()));
        }
        if let Some(incurred_before) = self.incurred_before {
            fields.push(("incurred_before".to_string(), incurred_before.to_rfc3339()));
        }
        fields
    }
}

/// Expense response mirroring one storage row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ExpenseResponse {
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub expense_id: EntityId,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub farm_id: FarmId,
    pub description: String,
    pub amount: f64,
    pub category: ExpenseCategory,
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>, format = "date-time"))]
    pub incurred_at: Option<Timestamp>,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub created_at: Timestamp,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub updated_at: Timestamp,
}

pub fn create_schema() -> Schema {
    Schema::new()
        .field(Field::non_empty_text("description").required())
        .field(Field::number("amount").required().min(0.0))
        .field(Field::select("category", ExpenseCategory::OPTIONS).required())
        .field(Field::timestamp("incurred_at"))
}

pub fn update_schema() -> Schema {
    Schema::new()
        .field(Field::non_empty_text("description"))
        .field(Field::number("amount").min(0.0))
        .field(Field::select("category", ExpenseCategory::OPTIONS))
        .field(Field::timestamp("incurred_at"))
}

pub fn list_schema() -> Schema {
    Schema::new()
        .paginated(DEFAULT_PAGE_SIZE)
        .field(Field::select("category", ExpenseCategory::OPTIONS))
        .field(Field::timestamp("incurred_after"))
        .field(Field::timestamp("incurred_before"))
}

impl_resource! {
    ExpenseResponse {
        kind: ResourceKind::Expense,
        id_field: expense_id,
        create_type: CreateExpenseRequest,
        update_type: UpdateExpenseRequest,
        filter_type: ExpenseListFilter,
        create_columns: ["description", "amount", "category", "incurred_at"],
        create_params: |req| vec![
            SqlParam::String(req.description.clone()),
            SqlParam::Double(req.amount),
            SqlParam::String(req.category.as_db_str().to_string()),
            SqlParam::OptTimestamp(req.incurred_at),
        ],
        update_params: |req| {
            let mut updates = Vec::new();
            if let Some(description) = &req.description {
                updates.push(("description", SqlParam::String(description.clone())));
            }
            if let Some(amount) = req.amount {
                updates.push(("amount", SqlParam::Double(amount)));
            }
            if let Some(category) = req.category {
                updates.push((
                    "category",
                    SqlParam::String(category.as_db_str().to_string()),
                ));
            }
            if let Some(incurred_at) = req.incurred_at {
                updates.push(("incurred_at", SqlParam::Timestamp(incurred_at)));
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
    fn missing_amount_is_named_in_the_error() {
        let errors = create_schema()
            .validate(&json!({"description": "hay delivery", "category": "feed"}))
            .expect_err("amount missing");
        assert!(errors.names_field("amount"));
    }

    #[test]
    fn category_must_be_a_known_option() {
        let errors = create_schema()
            .validate(&json!({
                "description": "hay delivery",
                "amount": 120.5,
                "category": "entertainment",
            }))
            .expect_err("unknown category");
        assert!(errors.names_field("category"));
    }

    #[test]
    fn valid_expense_normalizes() {
        let normalized = create_schema()
            .validate(&json!({
                "description": "hay delivery",
                "amount": 120.5,
                "category": "feed",
            }))
            .expect("valid");
        let req: CreateExpenseRequest =
            serde_json::from_value(serde_json::Value::Object(normalized)).expect("deserializes");
        assert_eq!(req.category, ExpenseCategory::Feed);
        assert!(req.incurred_at.is_none());
    }
}
