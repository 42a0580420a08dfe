//! API Configuration Module
//!
//! Configuration for CORS, the bind address, and the cache directory.
//! Loaded from environment variables with sensible defaults for
//! development.

// ============================================================================
// API CONFIGURATION
// ============================================================================

/// API configuration for CORS and cache placement.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Allowed CORS origins (comma-separated in env var).
    /// Empty means allow all origins (dev mode).
    /// Example: "https://paddock.farm,https://app.paddock.farm"
    pub cors_origins: Vec<String>,

    /// Max age for CORS preflight cache in seconds.
    pub cors_max_age_secs: u64,

    /// Directory for the LMDB cache environment.
    pub cache_dir: String,

    /// Maximum size of the LMDB cache in megabytes.
    pub cache_max_size_mb: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            cors_origins: Vec::new(), // Empty = allow all
            cors_max_age_secs: 86400, // 24 hours
            cache_dir: "./paddock-cache".to_string(),
            cache_max_size_mb: 256,
        }
    }
}

impl ApiConfig {
    /// Create ApiConfig from environment variables.
    ///
    /// Environment variables:
    /// - `PADDOCK_CORS_ORIGINS`: Comma-separated allowed origins (empty = allow all)
    /// - `PADDOCK_CORS_MAX_AGE_SECS`: Preflight cache duration (default: 86400)
    /// - `PADDOCK_CACHE_DIR`: LMDB cache directory (default: "./paddock-cache")
    /// - `PADDOCK_CACHE_MAX_SIZE_MB`: LMDB map size in MB (default: 256)
    pub fn from_env() -> Self {
        let cors_origins = std::env::var("PADDOCK_CORS_ORIGINS")
            .ok()
            .map(|s| {
                s.split(',')
                    .map(|o| o.trim().to_string())
                    .filter(|o| !o.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let cors_max_age_secs = std::env::var("PADDOCK_CORS_MAX_AGE_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(86400);

        let cache_dir = std::env::var("PADDOCK_CACHE_DIR")
            .unwrap_or_else(|_| "./paddock-cache".to_string());

        let cache_max_size_mb = std::env::var("PADDOCK_CACHE_MAX_SIZE_MB")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(256);

        Self {
            cors_origins,
            cors_max_age_secs,
            cache_dir,
            cache_max_size_mb,
        }
    }

    /// Check if running in production mode (strict CORS).
    pub fn is_production(&self) -> bool {
        !self.cors_origins.is_empty()
    }

    /// Check if a given origin is allowed.
    pub fn is_origin_allowed(&self, origin: &str) -> bool {
        if self.cors_origins.is_empty() {
            // Dev mode: allow all
            return true;
        }

        self.cors_origins.iter().any(|allowed| {
            if allowed == origin {
                return true;
            }
            // Support wildcard subdomains: *.paddock.farm
            if let Some(pattern) = allowed.strip_prefix("*.") {
                if let Some(origin_domain) = origin.strip_prefix("https://") {
                    return origin_domain.ends_with(pattern)
                        || origin_domain == pattern.strip_prefix('.').unwrap_or(pattern);
                }
            }
            false
        })
    }
}
