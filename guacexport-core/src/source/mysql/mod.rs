//! MySQL export source for a Guacamole database.
//!
//! # Module Structure
//! - `connection`: Connection pool management and error classification
//! - `queries`: The fixed metadata and connection queries, row decoding
//!
//! # Security Guarantees
//! - All operations are read-only (SELECT only, read-only sessions)
//! - Connection strings are sanitized in error messages
//! - Query timeouts prevent runaway statements

pub mod connection;
pub mod queries;


use super::ExportSource;
use crate::Result;
use crate::config::ConnectionConfig;
use crate::error::GuacExportError;
use crate::models::{ConnectionRow, EnumColumn};
use async_trait::async_trait;
use connection::map_sqlx_error;
use futures::StreamExt;
use futures::stream::BoxStream;
use sqlx::MySqlPool;

/// Export source reading a Guacamole MySQL database.
pub struct GuacamoleMySqlSource {
    /// Connection pool for database operations
    pub pool: MySqlPool,
    config: ConnectionConfig,
}

impl std::fmt::Debug for GuacamoleMySqlSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GuacamoleMySqlSource")
            .field("config", &self.config)
            .field("pool_size", &self.pool.size())
            .field("pool_idle", &self.pool.num_idle())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl ExportSource for GuacamoleMySqlSource {
    async fn test_connection(&self) -> Result<()> {
        let connectivity_result: i64 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map_err(GuacExportError::connection_failed)?;

        if connectivity_result != 1 {
            return Err(GuacExportError::configuration(
                "Basic connectivity test failed: unexpected result",
            ));
        }

        let schema_tables: i64 = sqlx::query_scalar(queries::SCHEMA_PRESENCE_QUERY)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("Failed to inspect database tables", e))?;

        if schema_tables == 0 {
            return Err(GuacExportError::configuration(
                "Table guacamole_connection not found; is this a Guacamole database?",
            ));
        }

        Ok(())
    }

    async fn fetch_enum_columns(&self) -> Result<Vec<EnumColumn>> {
        queries::fetch_enum_columns(&self.pool).await
    }

    fn connection_rows(&self) -> BoxStream<'_, Result<ConnectionRow>> {
        sqlx::query(queries::CONNECTION_QUERY)
            .fetch(&self.pool)
            .map(|row| {
                row.map_err(|e| map_sqlx_error("Failed to query connections", e))
                    .and_then(|row| queries::decode_connection_row(&row))
            })
            .boxed()
    }

    fn source_name(&self) -> &'static str {
        "MySQL"
    }
}
