//! Declarative input schemas for resource operations.
//!
//! Every operation declares the fields it accepts; raw JSON input is checked
//! against the declaration before any typed deserialization or storage work.
//! Validation never panics and never touches storage: it collects every
//! field-level problem and hands back either a normalized object or the full
//! error list.
//!
//! # Normalization rules
//!
//! - defaults are applied before bounds checks;
//! - numeric strings coerce to numbers (query parameters arrive as strings);
//! - absent optional fields stay absent in the output, never null;
//! - fields not declared in the schema are dropped.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use uuid::Uuid;

/// One field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct FieldError {
    /// The field the failure applies to.
    pub field: String,
    /// Machine-readable failure code ("required", "out_of_range", ...).
    pub code: String,
    /// Human-readable message.
    pub message: String,
}

/// The full set of validation failures for one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ValidationErrors {
    /// Summary message.
    pub message: String,
    /// Every field-level failure found.
    #[serde(rename = "fieldErrors")]
    pub field_errors: Vec<FieldError>,
}

impl ValidationErrors {
    /// An empty error collection with the standard summary message.
    pub fn new() -> Self {
        Self {
            message: "Input validation failed".to_string(),
            field_errors: Vec::new(),
        }
    }

    /// Record a failure for one field.
    pub fn push(&mut self, field: &str, code: &str, message: impl Into<String>) {
        self.field_errors.push(FieldError {
            field: field.to_string(),
            code: code.to_string(),
            message: message.into(),
        });
    }

    /// Whether any failures were recorded.
    pub fn is_empty(&self) -> bool {
        self.field_errors.is_empty()
    }

    /// Whether a failure for the named field was recorded.
    pub fn names_field(&self, field: &str) -> bool {
        self.field_errors.iter().any(|e| e.field == field)
    }
}

impl Default for ValidationErrors {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)?;
        for error in &self.field_errors {
            write!(f, "; {}: {}", error.field, error.message)?;
        }
        Ok(())
    }
}

/// The value shape a field accepts.
///
/// A closed union matched exhaustively; adding a kind is a compile-time
/// ripple through every match, not a silently ignored string tag.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    /// A string. `non_empty` rejects whitespace-only values.
    Text { non_empty: bool },
    /// A number, optionally bounded. `integer` rejects fractional values.
    Number {
        min: Option<f64>,
        max: Option<f64>,
        integer: bool,
    },
    /// A boolean. String `"true"`/`"false"` coerce (query parameters).
    Boolean,
    /// A string restricted to a fixed option set.
    Select { options: &'static [&'static str] },
    /// A UUID in string form.
    Id,
    /// An RFC 3339 timestamp in string form.
    Timestamp,
}

/// One declared field of a schema.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    name: &'static str,
    kind: FieldKind,
    required: bool,
    default: Option<JsonValue>,
}

impl Field {
    fn new(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            required: false,
            default: None,
        }
    }

    /// A plain text field.
    pub fn text(name: &'static str) -> Self {
        Self::new(name, FieldKind::Text { non_empty: false })
    }

    /// A text field rejecting empty and whitespace-only values.
    pub fn non_empty_text(name: &'static str) -> Self {
        Self::new(name, FieldKind::Text { non_empty: true })
    }

    /// An unbounded number field.
    pub fn number(name: &'static str) -> Self {
        Self::new(
            name,
            FieldKind::Number {
                min: None,
                max: None,
                integer: false,
            },
        )
    }

    /// An integer field.
    pub fn integer(name: &'static str) -> Self {
        Self::new(
            name,
            FieldKind::Number {
                min: None,
                max: None,
                integer: true,
            },
        )
    }

    /// A boolean field.
    pub fn boolean(name: &'static str) -> Self {
        Self::new(name, FieldKind::Boolean)
    }

    /// A field restricted to the given options.
    pub fn select(name: &'static str, options: &'static [&'static str]) -> Self {
        Self::new(name, FieldKind::Select { options })
    }

    /// A UUID field.
    pub fn id(name: &'static str) -> Self {
        Self::new(name, FieldKind::Id)
    }

    /// An RFC 3339 timestamp field.
    pub fn timestamp(name: &'static str) -> Self {
        Self::new(name, FieldKind::Timestamp)
    }

    /// Mark this field required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Lower bound (numbers only).
    pub fn min(mut self, bound: f64) -> Self {
        if let FieldKind::Number { ref mut min, .. } = self.kind {
            *min = Some(bound);
        }
        self
    }

    /// Upper bound (numbers only).
    pub fn max(mut self, bound: f64) -> Self {
        if let FieldKind::Number { ref mut max, .. } = self.kind {
            *max = Some(bound);
        }
        self
    }

    /// Default applied when the field is absent or null.
    pub fn default_value(mut self, value: JsonValue) -> Self {
        self.default = Some(value);
        self
    }
}

/// Largest accepted `page` value. Keeps `(page - 1) * page_size` far below
/// the i64 ceiling and well past any realistic listing depth.
pub const MAX_PAGE: i64 = 1_000_000;

/// Largest accepted `page_size` value.
pub const MAX_PAGE_SIZE: i64 = 500;

/// A declarative input schema for one operation.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Schema {
    fields: Vec<Field>,
    page_size_default: Option<i64>,
}

impl Schema {
    /// An empty schema (accepts anything, normalizes to an empty object).
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a field.
    pub fn field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    /// Declare the standard pagination fields.
    ///
    /// `page` defaults to 1; `page_size` defaults to the given value. Both
    /// must be integers in `1..=MAX_PAGE` / `1..=MAX_PAGE_SIZE`, so every
    /// accepted pair produces an in-range row offset.
    pub fn paginated(mut self, default_page_size: i64) -> Self {
        self.page_size_default = Some(default_page_size);
        self.fields.push(
            Field::integer("page")
                .min(1.0)
                .max(MAX_PAGE as f64)
                .default_value(JsonValue::from(1)),
        );
        self.fields.push(
            Field::integer("page_size")
                .min(1.0)
                .max(MAX_PAGE_SIZE as f64)
                .default_value(JsonValue::from(default_page_size)),
        );
        self
    }

    /// The declared default page size, if this schema is paginated.
    pub fn page_size_default(&self) -> Option<i64> {
        self.page_size_default
    }

    /// Validate raw JSON input against this schema.
    ///
    /// Returns the normalized object on success, or every field-level
    /// failure found. Never panics, never short-circuits on the first
    /// problem.
    pub fn validate(&self, raw: &JsonValue) -> Result<Map<String, JsonValue>, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let empty = Map::new();
        let input = match raw {
            JsonValue::Object(map) => map,
            JsonValue::Null => &empty,
            _ => {
                errors.push("", "invalid_body", "Request body must be a JSON object");
                return Err(errors);
            }
        };

        let mut normalized = Map::new();

        for field in &self.fields {
            let present = input.get(field.name).filter(|v| !v.is_null());

            // Defaults are applied before any bounds check.
            let value = match (present, &field.default) {
                (Some(v), _) => v.clone(),
                (None, Some(default)) => default.clone(),
                (None, None) => {
                    if field.required {
                        errors.push(
                            field.name,
                            "required",
                            format!("{} is required", field.name),
                        );
                    }
                    // Absent optional fields stay absent.
                    continue;
                }
            };

            match check_field(field, &value) {
                Ok(checked) => {
                    normalized.insert(field.name.to_string(), checked);
                }
                Err((code, message)) => errors.push(field.name, code, message),
            }
        }

        if errors.is_empty() {
            Ok(normalized)
        } else {
            Err(errors)
        }
    }
}

/// Check one value against a field declaration, coercing where allowed.
fn check_field(field: &Field, value: &JsonValue) -> Result<JsonValue, (&'static str, String)> {
    match &field.kind {
        FieldKind::Text { non_empty } => {
            let s = value
                .as_str()
                .ok_or_else(|| ("invalid_type", format!("{} must be a string", field.name)))?;
            if *non_empty && s.trim().is_empty() {
                return Err(("empty", format!("{} must not be empty", field.name)));
            }
            Ok(JsonValue::String(s.to_string()))
        }

        FieldKind::Number { min, max, integer } => {
            let number = coerce_number(value).ok_or_else(|| {
                ("invalid_type", format!("{} must be a number", field.name))
            })?;
            if *integer && number.fract() != 0.0 {
                return Err((
                    "not_an_integer",
                    format!("{} must be an integer", field.name),
                ));
            }
            if let Some(min) = min {
                if number < *min {
                    return Err((
                        "out_of_range",
                        format!("{} must be at least {}", field.name, min),
                    ));
                }
            }
            if let Some(max) = max {
                if number > *max {
                    return Err((
                        "out_of_range",
                        format!("{} must be at most {}", field.name, max),
                    ));
                }
            }
            if *integer {
                Ok(JsonValue::from(number as i64))
            } else {
                serde_json::Number::from_f64(number)
                    .map(JsonValue::Number)
                    .ok_or_else(|| ("invalid_type", format!("{} must be finite", field.name)))
            }
        }

        FieldKind::Boolean => match value {
            JsonValue::Bool(b) => Ok(JsonValue::Bool(*b)),
            JsonValue::String(s) if s == "true" => Ok(JsonValue::Bool(true)),
            JsonValue::String(s) if s == "false" => Ok(JsonValue::Bool(false)),
            _ => Err(("invalid_type", format!("{} must be a boolean", field.name))),
        },

        FieldKind::Select { options } => {
            let s = value
                .as_str()
                .ok_or_else(|| ("invalid_type", format!("{} must be a string", field.name)))?;
            if options.contains(&s) {
                Ok(JsonValue::String(s.to_string()))
            } else {
                Err((
                    "invalid_option",
                    format!("{} must be one of: {}", field.name, options.join(", ")),
                ))
            }
        }

        FieldKind::Id => {
            let s = value
                .as_str()
                .ok_or_else(|| ("invalid_type", format!("{} must be a string", field.name)))?;
            Uuid::parse_str(s)
                .map(|_| JsonValue::String(s.to_string()))
                .map_err(|_| ("invalid_id", format!("{} must be a UUID", field.name)))
        }

        FieldKind::Timestamp => {
            let s = value
                .as_str()
                .ok_or_else(|| ("invalid_type", format!("{} must be a string", field.name)))?;
            chrono::DateTime::parse_from_rfc3339(s)
                .map(|_| JsonValue::String(s.to_string()))
                .map_err(|_| {
                    (
                        "invalid_timestamp",
                        format!("{} must be an RFC 3339 timestamp", field.name),
                    )
                })
        }
    }
}

/// Numbers pass through; numeric strings coerce.
fn coerce_number(value: &JsonValue) -> Option<f64> {
    match value {
        JsonValue::Number(n) => n.as_f64(),
        JsonValue::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn expense_schema() -> Schema {
        Schema::new()
            .field(Field::non_empty_text("description").required())
            .field(Field::number("amount").min(0.0).required())
            .field(Field::select("category", &["feed", "bedding", "veterinary"]))
            .field(Field::timestamp("incurred_at"))
    }

    #[test]
    fn valid_input_normalizes() {
        let schema = expense_schema();
        let normalized = schema
            .validate(&json!({"description": "Hay delivery", "amount": 180.5}))
            .expect("validation should pass");
        assert_eq!(normalized["description"], "Hay delivery");
        assert_eq!(normalized["amount"], json!(180.5));
        assert!(!normalized.contains_key("category"));
    }

    #[test]
    fn missing_required_field_is_named() {
        let schema = expense_schema();
        let errors = schema
            .validate(&json!({"description": "Hay delivery"}))
            .expect_err("validation should fail");
        assert!(errors.names_field("amount"));
        assert_eq!(errors.field_errors.len(), 1);
        assert_eq!(errors.field_errors[0].code, "required");
    }

    #[test]
    fn all_failures_are_collected() {
        let schema = expense_schema();
        let errors = schema
            .validate(&json!({"description": "  ", "amount": -5, "category": "tack"}))
            .expect_err("validation should fail");
        assert!(errors.names_field("description"));
        assert!(errors.names_field("amount"));
        assert!(errors.names_field("category"));
    }

    #[test]
    fn numeric_strings_coerce() {
        let schema = expense_schema();
        let normalized = schema
            .validate(&json!({"description": "Hay", "amount": "42.5"}))
            .expect("validation should pass");
        assert_eq!(normalized["amount"], json!(42.5));
    }

    #[test]
    fn unknown_fields_are_dropped() {
        let schema = expense_schema();
        let normalized = schema
            .validate(&json!({"description": "Hay", "amount": 1, "color": "green"}))
            .expect("validation should pass");
        assert!(!normalized.contains_key("color"));
    }

    #[test]
    fn absent_optional_stays_absent_not_null() {
        let schema = Schema::new().field(Field::text("notes"));
        let normalized = schema.validate(&json!({})).expect("validation should pass");
        assert!(!normalized.contains_key("notes"));
    }

    #[test]
    fn null_counts_as_absent() {
        let schema = Schema::new().field(Field::text("notes"));
        let normalized = schema
            .validate(&json!({"notes": null}))
            .expect("validation should pass");
        assert!(!normalized.contains_key("notes"));
    }

    #[test]
    fn pagination_defaults_apply_before_bounds() {
        let schema = Schema::new().paginated(10);
        let normalized = schema.validate(&json!({})).expect("validation should pass");
        assert_eq!(normalized["page"], json!(1));
        assert_eq!(normalized["page_size"], json!(10));
    }

    #[test]
    fn page_zero_is_rejected() {
        let schema = Schema::new().paginated(10);
        let errors = schema
            .validate(&json!({"page": 0}))
            .expect_err("validation should fail");
        assert!(errors.names_field("page"));
        assert_eq!(errors.field_errors[0].code, "out_of_range");
    }

    #[test]
    fn astronomical_page_is_rejected() {
        let schema = Schema::new().paginated(10);
        let errors = schema
            .validate(&json!({"page": 9.3e18, "page_size": 10}))
            .expect_err("validation should fail");
        assert!(errors.names_field("page"));
        assert_eq!(errors.field_errors[0].code, "out_of_range");
    }

    #[test]
    fn page_size_above_the_ceiling_is_rejected() {
        let schema = Schema::new().paginated(10);
        let errors = schema
            .validate(&json!({"page_size": MAX_PAGE_SIZE + 1}))
            .expect_err("validation should fail");
        assert!(errors.names_field("page_size"));
    }

    #[test]
    fn page_as_query_string_coerces() {
        let schema = Schema::new().paginated(10);
        let normalized = schema
            .validate(&json!({"page": "3", "page_size": "25"}))
            .expect("validation should pass");
        assert_eq!(normalized["page"], json!(3));
        assert_eq!(normalized["page_size"], json!(25));
    }

    #[test]
    fn fractional_integer_is_rejected() {
        let schema = Schema::new().paginated(10);
        let errors = schema
            .validate(&json!({"page": 1.5}))
            .expect_err("validation should fail");
        assert_eq!(errors.field_errors[0].code, "not_an_integer");
    }

    #[test]
    fn invalid_uuid_is_rejected() {
        let schema = Schema::new().field(Field::id("horse_id"));
        let errors = schema
            .validate(&json!({"horse_id": "not-a-uuid"}))
            .expect_err("validation should fail");
        assert_eq!(errors.field_errors[0].code, "invalid_id");
    }

    #[test]
    fn invalid_timestamp_is_rejected() {
        let schema = Schema::new().field(Field::timestamp("due_at"));
        let errors = schema
            .validate(&json!({"due_at": "tomorrow"}))
            .expect_err("validation should fail");
        assert_eq!(errors.field_errors[0].code, "invalid_timestamp");
    }

    #[test]
    fn non_object_body_is_rejected() {
        let schema = expense_schema();
        let errors = schema
            .validate(&json!([1, 2, 3]))
            .expect_err("validation should fail");
        assert_eq!(errors.field_errors[0].code, "invalid_body");
    }
}
