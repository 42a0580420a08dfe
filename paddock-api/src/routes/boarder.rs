//! Boarder REST API Routes
//!
//! Boarders get explicit handlers with OpenAPI documentation; the other
//! resources use the generic factory. The handlers themselves delegate to
//! the generic ones, so documented and undocumented resources behave
//! identically on the wire.

use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    response::Response,
    routing::get,
    Json, Router,
};
use paddock_core::EntityId;
use serde_json::Value as JsonValue;

use crate::{
    cached_db::CachedDbClient,
    envelope::Envelope,
    farm::FarmContext,
    operation,
    routes::generic,
    state::AppState,
    types::boarder::BoarderResponse,
    types::invoice::{self, InvoiceListFilter, InvoiceResponse},
};

// ============================================================================
// ROUTE HANDLERS
// ============================================================================

/// POST /api/v1/boarders - Create a new boarder
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/api/v1/boarders",
    tag = "Boarders",
    request_body = crate::types::boarder::CreateBoarderRequest,
    responses(
        (status = 201, description = "Boarder created", body = BoarderResponse),
        (status = 400, description = "Input validation failed"),
    ),
))]
pub async fn create_boarder(
    db: State<CachedDbClient>,
    farm: FarmContext,
    raw: Json<JsonValue>,
) -> Response {
    generic::create_route::<BoarderResponse>(db, farm, raw).await
}

/// GET /api/v1/boarders - List boarders
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/api/v1/boarders",
    tag = "Boarders",
    params(
        ("page" = Option<i64>, Query, description = "Page number, 1-based"),
        ("page_size" = Option<i64>, Query, description = "Rows per page"),
    ),
    responses(
        (status = 200, description = "Page of boarders", body = Vec<BoarderResponse>),
        (status = 400, description = "Input validation failed"),
    ),
))]
pub async fn list_boarders(
    db: State<CachedDbClient>,
    farm: FarmContext,
    params: Query<HashMap<String, String>>,
) -> Envelope<Vec<BoarderResponse>> {
    generic::list_route::<BoarderResponse>(db, farm, params).await
}

/// GET /api/v1/boarders/{id} - Get boarder by id
///
/// A missing boarder is an error envelope naming the id.
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/api/v1/boarders/{id}",
    tag = "Boarders",
    params(
        ("id" = String, Path, description = "Boarder id"),
    ),
    responses(
        (status = 200, description = "The requested boarder", body = BoarderResponse),
    ),
))]
pub async fn get_boarder(
    db: State<CachedDbClient>,
    farm: FarmContext,
    id: Path<EntityId>,
) -> Envelope<Option<BoarderResponse>> {
    generic::get_route::<BoarderResponse>(db, farm, id).await
}

/// PATCH /api/v1/boarders/{id} - Update boarder
#[cfg_attr(feature = "openapi", utoipa::path(
    patch,
    path = "/api/v1/boarders/{id}",
    tag = "Boarders",
    params(
        ("id" = String, Path, description = "Boarder id"),
    ),
    request_body = crate::types::boarder::UpdateBoarderRequest,
    responses(
        (status = 200, description = "Boarder updated", body = BoarderResponse),
        (status = 400, description = "Input validation failed"),
    ),
))]
pub async fn update_boarder(
    db: State<CachedDbClient>,
    farm: FarmContext,
    id: Path<EntityId>,
    raw: Json<JsonValue>,
) -> Envelope<BoarderResponse> {
    generic::update_route::<BoarderResponse>(db, farm, id, raw).await
}

/// DELETE /api/v1/boarders/{id} - Delete boarder
#[cfg_attr(feature = "openapi", utoipa::path(
    delete,
    path = "/api/v1/boarders/{id}",
    tag = "Boarders",
    params(
        ("id" = String, Path, description = "Boarder id"),
    ),
    responses(
        (status = 200, description = "Boarder deleted"),
    ),
))]
pub async fn delete_boarder(
    db: State<CachedDbClient>,
    farm: FarmContext,
    id: Path<EntityId>,
) -> Envelope<()> {
    generic::delete_route::<BoarderResponse>(db, farm, id).await
}

/// GET /api/v1/boarders/{id}/invoices - List a boarder's invoices
///
/// Requires the boarder to exist; a subresource listing for a nonexistent
/// parent is a caller mistake, unlike a direct get.
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/api/v1/boarders/{id}/invoices",
    tag = "Boarders",
    params(
        ("id" = String, Path, description = "Boarder id"),
        ("status" = Option<String>, Query, description = "Filter by invoice status"),
        ("page" = Option<i64>, Query, description = "Page number, 1-based"),
        ("page_size" = Option<i64>, Query, description = "Rows per page"),
    ),
    responses(
        (status = 200, description = "Page of the boarder's invoices", body = Vec<InvoiceResponse>),
        (status = 400, description = "Input validation failed"),
    ),
))]
pub async fn list_boarder_invoices(
    State(db): State<CachedDbClient>,
    farm: FarmContext,
    Path(id): Path<EntityId>,
    Query(params): Query<HashMap<String, String>>,
) -> Envelope<Vec<InvoiceResponse>> {
    let raw = generic::query_to_json(params);
    let schema = invoice::list_schema();
    operation::execute(&schema, &raw, |mut filter: InvoiceListFilter| async move {
        db.get_required::<BoarderResponse>(id, farm.farm_id).await?;
        filter.boarder_id = Some(id);
        db.list::<InvoiceResponse>(filter, farm.farm_id).await
    })
    .await
}

// ============================================================================
// ROUTER SETUP
// ============================================================================

/// Create the boarder routes router.
pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/", axum::routing::post(create_boarder).get(list_boarders))
        .route(
            "/:id",
            get(get_boarder).patch(update_boarder).delete(delete_boarder),
        )
        .route("/:id/invoices", get(list_boarder_invoices))
}
