//! Result envelope for all resource operations.
//!
//! Every operation resolves to exactly one of three outcomes: the input was
//! rejected before any storage work, the storage call failed, or the
//! operation produced data. The envelope is a closed enum, so a response
//! carrying two outcomes at once is unrepresentable.
//!
//! # Wire Format
//!
//! Serialization is untagged; the JSON body is exactly one of:
//!
//! ```json
//! {"inputValidationError": {"message": "...", "fieldErrors": [...]}}
//! {"error": "..."}
//! {"data": ...}
//! ```
//!
//! Variant order matters: untagged deserialization tries `InvalidInput`,
//! then `Error`, then `Data`, which mirrors the order consumers must check
//! the outcomes in.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::schema::ValidationErrors;

/// The outcome of one resource operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(untagged)]
pub enum Envelope<T> {
    /// Input failed schema validation; storage was never touched.
    InvalidInput {
        #[serde(rename = "inputValidationError")]
        input_validation_error: ValidationErrors,
    },

    /// The storage call (or deserialization of its result) failed.
    Error { error: String },

    /// The operation succeeded. For single-entity reads `T` is an `Option`,
    /// so a missing row serializes as `{"data": null}`. List operations
    /// carry a `Vec`, which is `[]` when nothing matched, never null.
    Data { data: T },
}

impl<T> Envelope<T> {
    /// Wrap a successful result.
    pub fn data(data: T) -> Self {
        Self::Data { data }
    }

    /// Wrap a storage or runtime failure.
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            error: message.into(),
        }
    }

    /// Wrap a validation failure.
    pub fn invalid_input(errors: ValidationErrors) -> Self {
        Self::InvalidInput {
            input_validation_error: errors,
        }
    }

    /// Whether this envelope carries data.
    pub fn is_data(&self) -> bool {
        matches!(self, Self::Data { .. })
    }

    /// Whether this envelope carries a runtime error.
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }

    /// Whether this envelope carries a validation failure.
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidInput { .. })
    }

    /// Extract the data, if present.
    pub fn into_data(self) -> Option<T> {
        match self {
            Self::Data { data } => Some(data),
            _ => None,
        }
    }

    /// Map the data variant, leaving failures untouched.
    pub fn map<U, F>(self, f: F) -> Envelope<U>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            Self::Data { data } => Envelope::Data { data: f(data) },
            Self::Error { error } => Envelope::Error { error },
            Self::InvalidInput {
                input_validation_error,
            } => Envelope::InvalidInput {
                input_validation_error,
            },
        }
    }

    /// HTTP status for this outcome.
    ///
    /// Validation failures are the client's fault (400); storage failures
    /// are ours (500); data is 200. Create handlers upgrade 200 to 201
    /// themselves.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidInput { .. } => StatusCode::BAD_REQUEST,
            Self::Error { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Data { .. } => StatusCode::OK,
        }
    }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (status, Json(self)).into_response()
    }
}
