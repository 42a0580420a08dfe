//! REST API Routes Module
//!
//! Routes are organized by resource, all mounted under /api/v1. Most
//! resources use the generic CRUD factory; boarders have documented
//! handlers and messages add a `/latest` route. Health checks live at
//! /health outside the versioned prefix.

pub mod boarder;
pub mod generic;
pub mod health;
pub mod message;

use std::time::Duration;

use axum::{
    http::{header, header::HeaderName, HeaderValue, Method},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::ApiConfig;
use crate::state::AppState;
use crate::types::{
    booking::BookingResponse, expense::ExpenseResponse, horse::HorseResponse,
    invoice::InvoiceResponse, maintenance_task::MaintenanceTaskResponse, pasture::PastureResponse,
    shift::ShiftResponse, stall::StallResponse,
};
use generic::crud_routes;

pub use health::create_router as health_router;

// ============================================================================
// OPENAPI ENDPOINTS
// ============================================================================

/// Handler for /openapi.json endpoint.
#[cfg(feature = "openapi")]
async fn openapi_json() -> axum::Json<utoipa::openapi::OpenApi> {
    use utoipa::OpenApi;
    axum::Json(crate::openapi::ApiDoc::openapi())
}

// ============================================================================
// ROUTER ASSEMBLY
// ============================================================================

/// Create the complete API router.
///
/// - Resource CRUD under /api/v1/* (farm header required per request)
/// - Health checks at /health/* (public)
/// - OpenAPI spec at /openapi.json and Swagger UI at /swagger-ui when the
///   corresponding features are enabled
pub fn create_api_router(state: AppState, api_config: &ApiConfig) -> Router {
    let api_routes = Router::new()
        .nest("/boarders", boarder::create_router())
        .nest("/horses", crud_routes::<HorseResponse>())
        .nest("/stalls", crud_routes::<StallResponse>())
        .nest("/bookings", crud_routes::<BookingResponse>())
        .nest("/invoices", crud_routes::<InvoiceResponse>())
        .nest("/expenses", crud_routes::<ExpenseResponse>())
        .nest("/shifts", crud_routes::<ShiftResponse>())
        .nest("/maintenance-tasks", crud_routes::<MaintenanceTaskResponse>())
        .nest("/pastures", crud_routes::<PastureResponse>())
        .nest("/messages", message::create_router());

    #[allow(unused_mut)]
    let mut router = Router::new()
        .nest("/api/v1", api_routes)
        .nest("/health", health::create_router());

    #[cfg(feature = "openapi")]
    {
        router = router.route("/openapi.json", axum::routing::get(openapi_json));
    }

    #[cfg(feature = "swagger-ui")]
    {
        use utoipa::OpenApi;
        use utoipa_swagger_ui::SwaggerUi;
        router = router.merge(
            SwaggerUi::new("/swagger-ui").url("/openapi.json", crate::openapi::ApiDoc::openapi()),
        );
    }

    let cors = build_cors_layer(api_config);

    router
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

// ============================================================================
// CORS LAYER
// ============================================================================

/// Build the CORS layer from ApiConfig.
///
/// With no configured origins, all origins are allowed (dev mode).
/// Otherwise only the configured origins are allowed.
fn build_cors_layer(config: &ApiConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .max_age(Duration::from_secs(config.cors_max_age_secs));

    if config.cors_origins.is_empty() {
        tracing::info!("CORS: development mode, allowing all origins");
        cors.allow_origin(Any).allow_headers(Any)
    } else {
        tracing::info!(origins = ?config.cors_origins, "CORS: restricting origins");
        let origins: Vec<HeaderValue> = config
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        cors.allow_origin(origins).allow_headers([
            header::CONTENT_TYPE,
            header::ACCEPT,
            HeaderName::from_static("x-farm-id"),
        ])
    }
}
