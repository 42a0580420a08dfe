//! Paddock API Server Entry Point
//!
//! Bootstraps tracing, the database pool, the LMDB cache, and the Axum
//! HTTP server.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use paddock_api::{
    create_api_router, ApiConfig, ApiError, ApiResult, AppState, DbClient, DbConfig,
};
use paddock_storage::{CacheConfig, InMemoryChangeJournal, LmdbCacheBackend, ReadThroughCache};

#[tokio::main]
async fn main() -> ApiResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "paddock_api=info,tower_http=info".into()),
        )
        .init();

    let db_config = DbConfig::from_env();
    let db = DbClient::from_config(&db_config)?;

    let api_config = ApiConfig::from_env();

    let backend = LmdbCacheBackend::new(&api_config.cache_dir, api_config.cache_max_size_mb)
        .map_err(|e| ApiError::internal_error(format!("Failed to open cache: {}", e)))?;
    let journal = InMemoryChangeJournal::new();
    let cache = Arc::new(ReadThroughCache::new(
        Arc::new(backend),
        Arc::new(journal),
        CacheConfig::default(),
    ));

    let state = AppState::new(db, cache);
    let app: Router = create_api_router(state, &api_config);

    let addr = resolve_bind_addr()?;
    tracing::info!(%addr, "Starting paddock API server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ApiError::internal_error(format!("Failed to bind {}: {}", addr, e)))?;

    let server = axum::serve(listener, app);
    tokio::select! {
        result = server => {
            result.map_err(|e| ApiError::internal_error(format!("Server error: {}", e)))?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    Ok(())
}

fn resolve_bind_addr() -> ApiResult<SocketAddr> {
    let host = std::env::var("PADDOCK_API_BIND").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port_str = std::env::var("PORT")
        .ok()
        .or_else(|| std::env::var("PADDOCK_API_PORT").ok())
        .unwrap_or_else(|| "3000".to_string());
    let port = port_str
        .parse::<u16>()
        .map_err(|_| ApiError::invalid_input(format!("Invalid port value: {}", port_str)))?;

    let addr = format!("{}:{}", host, port);
    addr.parse::<SocketAddr>()
        .map_err(|e| ApiError::invalid_input(format!("Invalid bind address {}: {}", addr, e)))
}
