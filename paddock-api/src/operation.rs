//! Operation wrapper: validate, deserialize, run data access, wrap the result.
//!
//! Every network-callable operation follows the same four steps:
//!
//! 1. Validate the raw input against the operation's schema. On failure
//!    return `Envelope::InvalidInput` immediately; data access is never
//!    invoked.
//! 2. Deserialize the normalized input into the typed request.
//! 3. Await the data-access future.
//! 4. Success wraps the value in `Envelope::Data`; an `Err` is converted to
//!    `Envelope::Error` with the error's message. Errors never propagate
//!    past this boundary.
//!
//! The data access is supplied as a closure over the request, so the
//! wrapper is testable without a database.

use std::future::Future;

use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;

use crate::envelope::Envelope;
use crate::error::ApiResult;
use crate::schema::{Schema, ValidationErrors};
use crate::validation::HasUpdates;

/// Run a validated operation end to end.
///
/// `T` is the success payload: `Option<R>` for single-entity reads (absent
/// rows become `data: null`), `Vec<R>` for list reads (empty results become
/// `data: []`), `R` for writes.
pub async fn execute<Req, T, F, Fut>(schema: &Schema, raw: &JsonValue, data_access: F) -> Envelope<T>
where
    Req: DeserializeOwned,
    F: FnOnce(Req) -> Fut,
    Fut: Future<Output = ApiResult<T>>,
{
    let normalized = match schema.validate(raw) {
        Ok(map) => map,
        Err(errors) => return Envelope::invalid_input(errors),
    };

    let req: Req = match serde_json::from_value(JsonValue::Object(normalized)) {
        Ok(req) => req,
        Err(e) => {
            // Schema and request type disagree; a bug, not caller input.
            tracing::error!(error = %e, "normalized input failed to deserialize");
            return Envelope::error(format!("Invalid request shape: {}", e));
        }
    };

    run(data_access(req)).await
}

/// Run a validated update operation.
///
/// Identical to [`execute`], with one extra check after deserialization: an
/// update that sets no fields is rejected as invalid input rather than
/// issuing a no-op UPDATE.
pub async fn execute_update<Req, T, F, Fut>(
    schema: &Schema,
    raw: &JsonValue,
    data_access: F,
) -> Envelope<T>
where
    Req: DeserializeOwned + HasUpdates,
    F: FnOnce(Req) -> Fut,
    Fut: Future<Output = ApiResult<T>>,
{
    let normalized = match schema.validate(raw) {
        Ok(map) => map,
        Err(errors) => return Envelope::invalid_input(errors),
    };

    let req: Req = match serde_json::from_value(JsonValue::Object(normalized)) {
        Ok(req) => req,
        Err(e) => {
            tracing::error!(error = %e, "normalized input failed to deserialize");
            return Envelope::error(format!("Invalid request shape: {}", e));
        }
    };

    if !req.has_any_updates() {
        let mut errors = ValidationErrors::new();
        errors.message = "At least one field must be provided for update".to_string();
        return Envelope::invalid_input(errors);
    }

    run(data_access(req)).await
}

/// Wrap an already-validated data-access future into an envelope.
///
/// Used directly by operations whose only input is a path id, which the
/// transport extractor has already validated.
pub async fn run<T, Fut>(data_access: Fut) -> Envelope<T>
where
    Fut: Future<Output = ApiResult<T>>,
{
    match data_access.await {
        Ok(value) => Envelope::data(value),
        Err(e) => {
            tracing::error!(code = %e.code, message = %e.message, "operation failed");
            Envelope::error(e.message)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;
    use crate::schema::Field;
    use serde::Deserialize;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Deserialize)]
    struct RenameRequest {
        name: String,
    }

    #[derive(Debug, Deserialize)]
    struct PatchRequest {
        name: Option<String>,
        head_count: Option<i64>,
    }

    impl HasUpdates for PatchRequest {
        fn has_any_updates(&self) -> bool {
            self.name.is_some() || self.head_count.is_some()
        }
    }

    fn rename_schema() -> Schema {
        Schema::new().field(Field::non_empty_text("name").required())
    }

    fn patch_schema() -> Schema {
        Schema::new()
            .field(Field::non_empty_text("name"))
            .field(Field::integer("head_count").min(0.0))
    }

    #[tokio::test]
    async fn valid_input_reaches_data_access() {
        let calls = AtomicUsize::new(0);
        let envelope: Envelope<String> = execute(
            &rename_schema(),
            &json!({"name": "Willow"}),
            |req: RenameRequest| {
                calls.fetch_add(1, Ordering::SeqCst);
                async move { Ok(req.name.to_uppercase()) }
            },
        )
        .await;

        assert_eq!(envelope, Envelope::data("WILLOW".to_string()));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn invalid_input_short_circuits() {
        let calls = AtomicUsize::new(0);
        let envelope: Envelope<String> = execute(
            &rename_schema(),
            &json!({}),
            |req: RenameRequest| {
                calls.fetch_add(1, Ordering::SeqCst);
                async move { Ok(req.name) }
            },
        )
        .await;

        assert!(envelope.is_invalid_input());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn data_access_error_becomes_error_variant() {
        let envelope: Envelope<String> = execute(
            &rename_schema(),
            &json!({"name": "Willow"}),
            |_req: RenameRequest| async move {
                Err(ApiError::database_error("constraint violation"))
            },
        )
        .await;

        assert_eq!(envelope, Envelope::error("constraint violation"));
    }

    #[tokio::test]
    async fn absent_single_entity_wraps_as_none() {
        let envelope: Envelope<Option<String>> = run(async { Ok(None) }).await;
        let json = serde_json::to_value(&envelope).expect("serialize");
        assert_eq!(json, json!({ "data": null }));
    }

    #[tokio::test]
    async fn empty_list_wraps_as_empty_vec() {
        let envelope: Envelope<Vec<String>> = run(async { Ok(Vec::new()) }).await;
        let json = serde_json::to_value(&envelope).expect("serialize");
        assert_eq!(json, json!({ "data": [] }));
    }

    #[tokio::test]
    async fn empty_update_is_invalid_input() {
        let calls = AtomicUsize::new(0);
        let envelope: Envelope<String> = execute_update(
            &patch_schema(),
            &json!({}),
            |_req: PatchRequest| {
                calls.fetch_add(1, Ordering::SeqCst);
                async move { Ok("unreachable".to_string()) }
            },
        )
        .await;

        assert!(envelope.is_invalid_input());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn update_with_one_field_runs() {
        let envelope: Envelope<String> = execute_update(
            &patch_schema(),
            &json!({"name": "Maple"}),
            |req: PatchRequest| async move { Ok(req.name.unwrap_or_default()) },
        )
        .await;

        assert_eq!(envelope, Envelope::data("Maple".to_string()));
    }
}
