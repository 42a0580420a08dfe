//! Generic CRUD route handlers over the [`Resource`] trait.
//!
//! Every resource gets the same five routes; the handlers validate raw
//! input against the resource's schemas and wrap every outcome in the
//! result envelope. Handlers never return transport errors for storage
//! failures; only the farm extractor rejects a request outright.
//!
//! # Usage
//!
//! ```ignore
//! use super::generic::crud_routes;
//!
//! pub fn create_router() -> Router<AppState> {
//!     crud_routes::<HorseResponse>()
//! }
//! ```
//!
//! Resources with extra routes chain them onto the factory's router.

use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use paddock_core::EntityId;
use paddock_storage::CacheableEntity;
use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::{
    cached_db::CachedDbClient,
    envelope::Envelope,
    farm::FarmContext,
    operation,
    resource::Resource,
    state::AppState,
};

// ============================================================================
// GENERIC ROUTE FACTORY
// ============================================================================

/// Create a router with the standard CRUD routes for a resource.
///
/// # Routes Created
///
/// - `POST /` - Create entity (201 on success)
/// - `GET /` - List entities matching query-string filters
/// - `GET /:id` - Get entity by id (missing rows follow the resource's
///   read policy: not-found error, or `data: null` for nullable reads)
/// - `PATCH /:id` - Update entity
/// - `DELETE /:id` - Delete entity
pub fn crud_routes<R>() -> Router<AppState>
where
    R: Resource + CacheableEntity + 'static,
    R::ListFilter: Clone + 'static,
{
    Router::new()
        .route("/", post(create_route::<R>).get(list_route::<R>))
        .route(
            "/:id",
            get(get_route::<R>)
                .patch(update_route::<R>)
                .delete(delete_route::<R>),
        )
}

// ============================================================================
// GENERIC HANDLERS
// ============================================================================

/// Create an entity from a raw JSON body.
pub async fn create_route<R>(
    State(db): State<CachedDbClient>,
    farm: FarmContext,
    Json(raw): Json<JsonValue>,
) -> Response
where
    R: Resource + CacheableEntity + 'static,
{
    let schema = R::create_schema();
    let envelope = operation::execute(&schema, &raw, |req: R::Create| async move {
        db.create::<R>(&req, farm.farm_id).await
    })
    .await;
    created(envelope)
}

/// Get an entity by id, applying the resource's read policy to absence.
pub async fn get_route<R>(
    State(db): State<CachedDbClient>,
    farm: FarmContext,
    Path(id): Path<EntityId>,
) -> Envelope<Option<R>>
where
    R: Resource + CacheableEntity + 'static,
{
    operation::run(async move { db.get_for_read::<R>(id, farm.farm_id).await }).await
}

/// List entities matching the query-string filter.
pub async fn list_route<R>(
    State(db): State<CachedDbClient>,
    farm: FarmContext,
    Query(params): Query<HashMap<String, String>>,
) -> Envelope<Vec<R>>
where
    R: Resource + CacheableEntity + 'static,
    R::ListFilter: Clone + 'static,
{
    let raw = query_to_json(params);
    let schema = R::list_schema();
    operation::execute(&schema, &raw, |filter: R::ListFilter| async move {
        db.list::<R>(filter, farm.farm_id).await
    })
    .await
}

/// Update the set fields of an entity.
pub async fn update_route<R>(
    State(db): State<CachedDbClient>,
    farm: FarmContext,
    Path(id): Path<EntityId>,
    Json(raw): Json<JsonValue>,
) -> Envelope<R>
where
    R: Resource + CacheableEntity + 'static,
{
    let schema = R::update_schema();
    operation::execute_update(&schema, &raw, |req: R::Update| async move {
        db.update::<R>(id, &req, farm.farm_id).await
    })
    .await
}

/// Delete an entity by id.
pub async fn delete_route<R>(
    State(db): State<CachedDbClient>,
    farm: FarmContext,
    Path(id): Path<EntityId>,
) -> Envelope<()>
where
    R: Resource + CacheableEntity + 'static,
{
    operation::run(async move { db.delete::<R>(id, farm.farm_id).await }).await
}

// ============================================================================
// HELPERS
// ============================================================================

/// Upgrade a successful envelope to 201; failures keep their own status.
pub fn created<T: Serialize>(envelope: Envelope<T>) -> Response {
    if envelope.is_data() {
        (StatusCode::CREATED, Json(envelope)).into_response()
    } else {
        envelope.into_response()
    }
}

/// Convert query-string parameters into a JSON object of strings.
///
/// The schema validator coerces numeric and boolean strings, so list
/// filters validate the same whether they arrive as JSON or a query
/// string.
pub fn query_to_json(params: HashMap<String, String>) -> JsonValue {
    JsonValue::Object(
        params
            .into_iter()
            .map(|(k, v)| (k, JsonValue::String(v)))
            .collect(),
    )
}
