//! Paddock API - REST layer for the farm management backend
//!
//! Every resource operation flows through one pipeline: schema
//! validation, the generic database CRUD over the [`resource::Resource`]
//! trait, the read-through cache, and finally the result envelope. The
//! routes module wires the pipeline to Axum; everything below it is
//! transport-agnostic and testable without a server.

pub mod cached_db;
pub mod config;
pub mod db;
pub mod envelope;
pub mod error;
pub mod farm;
pub mod macros;
#[cfg(feature = "openapi")]
pub mod openapi;
pub mod operation;
pub mod resource;
pub mod routes;
pub mod schema;
pub mod state;
pub mod types;
pub mod validation;

// Re-export commonly used types
pub use cached_db::CachedDbClient;
pub use config::ApiConfig;
pub use db::{DbClient, DbConfig};
pub use envelope::Envelope;
pub use error::{ApiError, ApiResult, ErrorCode};
pub use farm::{FarmContext, FARM_ID_HEADER};
#[cfg(feature = "openapi")]
pub use openapi::ApiDoc;
pub use resource::{ListFilter, Pagination, Resource, SqlParam};
pub use routes::create_api_router;
pub use schema::{Field, FieldError, Schema, ValidationErrors};
pub use state::{ApiCache, AppState};
pub use validation::HasUpdates;
