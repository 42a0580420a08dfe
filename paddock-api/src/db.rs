//! Database Connection Pool Module
//!
//! PostgreSQL connection pooling via deadpool-postgres, plus the five
//! generic CRUD operations over the [`Resource`] trait. Rows travel as
//! `to_jsonb(row)` and deserialize via serde into the response types, so
//! one query shape serves every resource.
//!
//! No validation happens here; inputs arrive already normalized. Storage
//! errors bubble as `ApiError` and are converted into the result envelope
//! exactly once, at the operation boundary.

use std::time::Duration;

use deadpool_postgres::{Config, ManagerConfig, Pool, RecyclingMethod, Runtime};
use paddock_core::{new_entity_id, EntityId, FarmId};
use serde_json::Value as JsonValue;
use tokio_postgres::types::ToSql;
use tokio_postgres::NoTls;

use crate::error::{ApiError, ApiResult};
use crate::resource::{ListFilter, Resource};

// ============================================================================
// CONNECTION POOL CONFIGURATION
// ============================================================================

/// Database connection pool configuration.
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// PostgreSQL host
    pub host: String,
    /// PostgreSQL port
    pub port: u16,
    /// Database name
    pub dbname: String,
    /// Database user
    pub user: String,
    /// Database password
    pub password: String,
    /// Maximum pool size
    pub max_size: usize,
    /// Connection timeout
    pub timeout: Duration,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            dbname: "paddock".to_string(),
            user: "postgres".to_string(),
            password: "".to_string(),
            max_size: 16,
            timeout: Duration::from_secs(30),
        }
    }
}

impl DbConfig {
    /// Create a new database configuration from environment variables.
    ///
    /// Environment variables:
    /// - `PADDOCK_DB_HOST` (default: "localhost")
    /// - `PADDOCK_DB_PORT` (default: 5432)
    /// - `PADDOCK_DB_NAME` (default: "paddock")
    /// - `PADDOCK_DB_USER` (default: "postgres")
    /// - `PADDOCK_DB_PASSWORD` (default: empty)
    /// - `PADDOCK_DB_POOL_SIZE` (default: 16)
    /// - `PADDOCK_DB_TIMEOUT` seconds (default: 30)
    pub fn from_env() -> Self {
        Self {
            host: std::env::var("PADDOCK_DB_HOST").unwrap_or_else(|_| "localhost".to_string()),
            port: std::env::var("PADDOCK_DB_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(5432),
            dbname: std::env::var("PADDOCK_DB_NAME").unwrap_or_else(|_| "paddock".to_string()),
            user: std::env::var("PADDOCK_DB_USER").unwrap_or_else(|_| "postgres".to_string()),
            password: std::env::var("PADDOCK_DB_PASSWORD").unwrap_or_default(),
            max_size: std::env::var("PADDOCK_DB_POOL_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(16),
            timeout: Duration::from_secs(
                std::env::var("PADDOCK_DB_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(30),
            ),
        }
    }

    /// Create a connection pool from this configuration.
    pub fn create_pool(&self) -> ApiResult<Pool> {
        let mut cfg = Config::new();
        cfg.host = Some(self.host.clone());
        cfg.port = Some(self.port);
        cfg.dbname = Some(self.dbname.clone());
        cfg.user = Some(self.user.clone());
        cfg.password = Some(self.password.clone());

        cfg.manager = Some(ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        });

        let pool = cfg
            .create_pool(Some(Runtime::Tokio1), NoTls)
            .map_err(|e| ApiError::database_error(format!("Failed to create pool: {}", e)))?;

        Ok(pool)
    }
}

// ============================================================================
// DATABASE CLIENT
// ============================================================================

/// Database client wrapping a connection pool with generic CRUD operations.
#[derive(Clone)]
pub struct DbClient {
    pool: Pool,
}

impl DbClient {
    /// Create a new database client with the given pool.
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    /// Create a new database client from configuration.
    pub fn from_config(config: &DbConfig) -> ApiResult<Self> {
        let pool = config.create_pool()?;
        Ok(Self::new(pool))
    }

    /// Get the current pool size for observability.
    pub fn pool_size(&self) -> usize {
        self.pool.status().size
    }

    /// Get a connection from the pool.
    async fn get_conn(&self) -> ApiResult<deadpool_postgres::Object> {
        self.pool.get().await.map_err(ApiError::from)
    }

    /// Verify database connectivity with a trivial query.
    pub async fn health_check(&self) -> ApiResult<()> {
        let conn = self.get_conn().await?;
        conn.query_one("SELECT 1", &[]).await?;
        Ok(())
    }

    // ========================================================================
    // GENERIC CRUD OPERATIONS
    // ========================================================================

    /// Insert a new entity and return the stored row.
    pub async fn create<R: Resource>(&self, req: &R::Create, farm_id: FarmId) -> ApiResult<R> {
        let conn = self.get_conn().await?;
        let id = new_entity_id();
        let create_params = R::create_params(req);

        let table = R::KIND.table();
        let mut sql = format!("INSERT INTO {} ({}, farm_id", table, R::KIND.pk_column());
        for column in R::CREATE_COLUMNS {
            sql.push_str(", ");
            sql.push_str(column);
        }
        sql.push_str(") VALUES ($1, $2");
        for i in 0..create_params.len() {
            sql.push_str(&format!(", ${}", i + 3));
        }
        sql.push_str(&format!(") RETURNING to_jsonb({}.*)", table));

        let mut params: Vec<&(dyn ToSql + Sync)> = vec![&id, &farm_id];
        params.extend(create_params.iter().map(|p| p.as_to_sql()));

        let row = conn.query_one(&sql, &params).await?;
        let json: JsonValue = row.get(0);
        parse_row::<R>(json)
    }

    /// Get an entity by id, scoped to one farm.
    ///
    /// Returns `Ok(None)` when no row matches; absence is not an error at
    /// this layer.
    pub async fn get<R: Resource>(&self, id: EntityId, farm_id: FarmId) -> ApiResult<Option<R>> {
        let conn = self.get_conn().await?;
        let sql = format!(
            "SELECT to_jsonb(t.*) FROM {} t WHERE {} = $1 AND farm_id = $2",
            R::KIND.table(),
            R::KIND.pk_column(),
        );

        let row = conn.query_opt(&sql, &[&id, &farm_id]).await?;
        match row {
            Some(row) => {
                let json: JsonValue = row.get(0);
                Ok(Some(parse_row::<R>(json)?))
            }
            None => Ok(None),
        }
    }

    /// Update the set fields of an entity and return the stored row.
    pub async fn update<R: Resource>(
        &self,
        id: EntityId,
        req: &R::Update,
        farm_id: FarmId,
    ) -> ApiResult<R> {
        let conn = self.get_conn().await?;
        let update_params = R::update_params(req);
        if update_params.is_empty() {
            return Err(ApiError::invalid_input(
                "At least one field must be provided for update",
            ));
        }

        let table = R::KIND.table();
        let mut sql = format!("UPDATE {} SET ", table);
        for (i, (column, _)) in update_params.iter().enumerate() {
            if i > 0 {
                sql.push_str(", ");
            }
            sql.push_str(&format!("{} = ${}", column, i + 3));
        }
        sql.push_str(&format!(
            ", updated_at = now() WHERE {} = $1 AND farm_id = $2 RETURNING to_jsonb({}.*)",
            R::KIND.pk_column(),
            table,
        ));

        let mut params: Vec<&(dyn ToSql + Sync)> = vec![&id, &farm_id];
        params.extend(update_params.iter().map(|(_, p)| p.as_to_sql()));

        let row = conn.query_opt(&sql, &params).await?;
        match row {
            Some(row) => {
                let json: JsonValue = row.get(0);
                parse_row::<R>(json)
            }
            None => Err(ApiError::entity_not_found(R::KIND.display_name(), id)),
        }
    }

    /// Delete an entity by id.
    pub async fn delete<R: Resource>(&self, id: EntityId, farm_id: FarmId) -> ApiResult<()> {
        let conn = self.get_conn().await?;
        let sql = format!(
            "DELETE FROM {} WHERE {} = $1 AND farm_id = $2",
            R::KIND.table(),
            R::KIND.pk_column(),
        );

        let deleted = conn.execute(&sql, &[&id, &farm_id]).await?;
        if deleted == 0 {
            return Err(ApiError::entity_not_found(R::KIND.display_name(), id));
        }
        Ok(())
    }

    /// List entities matching a filter, paginated.
    ///
    /// Absent filter fields are omitted from the predicate entirely.
    /// `offset = (page - 1) * page_size`.
    pub async fn list<R: Resource>(
        &self,
        filter: &R::ListFilter,
        farm_id: FarmId,
    ) -> ApiResult<Vec<R>> {
        let conn = self.get_conn().await?;
        let predicates = filter.predicates();
        let limit = filter.page_size();
        let offset = filter.offset();

        let mut sql = format!(
            "SELECT to_jsonb(t.*) FROM {} t WHERE farm_id = $1",
            R::KIND.table(),
        );
        for (i, (fragment, _)) in predicates.iter().enumerate() {
            sql.push_str(&format!(" AND {} ${}", fragment, i + 2));
        }
        let next = predicates.len() + 2;
        sql.push_str(&format!(
            " ORDER BY {} LIMIT ${} OFFSET ${}",
            R::KIND.pk_column(),
            next,
            next + 1,
        ));

        let mut params: Vec<&(dyn ToSql + Sync)> = vec![&farm_id];
        params.extend(predicates.iter().map(|(_, p)| p.as_to_sql()));
        params.push(&limit);
        params.push(&offset);

        let rows = conn.query(&sql, &params).await?;
        rows.into_iter()
            .map(|row| {
                let json: JsonValue = row.get(0);
                parse_row::<R>(json)
            })
            .collect()
    }

    /// Get the most recently created entity of a resource, if any.
    ///
    /// Primary keys are UUIDv7, so ordering by the key descending orders by
    /// creation time. Returns `Ok(None)` when the farm has no rows.
    pub async fn latest<R: Resource>(&self, farm_id: FarmId) -> ApiResult<Option<R>> {
        let conn = self.get_conn().await?;
        let sql = format!(
            "SELECT to_jsonb(t.*) FROM {} t WHERE farm_id = $1 ORDER BY {} DESC LIMIT 1",
            R::KIND.table(),
            R::KIND.pk_column(),
        );

        let row = conn.query_opt(&sql, &[&farm_id]).await?;
        match row {
            Some(row) => {
                let json: JsonValue = row.get(0);
                Ok(Some(parse_row::<R>(json)?))
            }
            None => Ok(None),
        }
    }
}

/// Deserialize a `to_jsonb(row)` value into the response type.
fn parse_row<R: Resource>(json: JsonValue) -> ApiResult<R> {
    serde_json::from_value(json).map_err(|e| {
        ApiError::internal_error(format!("Failed to parse {} row: {}", R::KIND.scope(), e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults_are_local_dev() {
        let config = DbConfig::default();
        assert_eq!(config.host, "localhost");
        assert_eq!(config.port, 5432);
        assert_eq!(config.dbname, "paddock");
        assert_eq!(config.max_size, 16);
    }
}
