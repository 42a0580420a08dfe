//! Farm scoping for multi-tenant isolation.
//!
//! Every resource row carries a `farm_id`, and every query key is prefixed
//! by it, so one farm can never read another's cache entries or rows. The
//! `X-Farm-Id` header selects the farm; the extractor rejects requests
//! where it is missing or malformed before any handler runs.

use axum::{extract::FromRequestParts, http::request::Parts};
use paddock_core::FarmId;
use uuid::Uuid;

use crate::error::ApiError;

/// Header carrying the farm id.
pub const FARM_ID_HEADER: &str = "x-farm-id";

/// The farm a request is scoped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FarmContext {
    pub farm_id: FarmId,
}

impl FarmContext {
    /// Parse a farm context from a raw header value.
    pub fn from_header_value(value: &str) -> Result<Self, ApiError> {
        let farm_id = value
            .trim()
            .parse::<Uuid>()
            .map_err(|_| ApiError::missing_farm_id())?;
        Ok(Self { farm_id })
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for FarmContext
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get(FARM_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(ApiError::missing_farm_id)?;
        Self::from_header_value(value)
    }
}
