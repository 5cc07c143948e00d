//! MySQL connection pool setup.
//!
//! # Security Features
//! - Sessions are switched to read-only before any query runs
//! - Statement execution time is capped by the configured query timeout
//!   (`max_execution_time` on MySQL, `max_statement_time` on MariaDB)
//! - Connection strings are redacted in every error message

use super::GuacamoleMySqlSource;
use crate::Result;
use crate::config::{ConnectionConfig, parse_mysql_url};
use crate::error::{GuacExportError, redact_database_url};
use sqlx::MySqlPool;
use std::time::Duration;

impl GuacamoleMySqlSource {
    /// Creates a source from a MySQL connection URL.
    ///
    /// The pool connects lazily, so an unreachable server is only reported
    /// by the first query (or by [`crate::source::ExportSource::test_connection`]).
    ///
    /// # Errors
    /// Returns a configuration error if the URL is not a valid `mysql://` URL.
    pub fn new(connection_string: &str) -> Result<Self> {
        let config = ConnectionConfig::from_url(connection_string)?;
        Self::with_config(connection_string, config)
    }

    /// Creates a source with an explicit connection configuration.
    pub fn with_config(connection_string: &str, config: ConnectionConfig) -> Result<Self> {
        config.validate()?;
        parse_mysql_url(connection_string)?;

        let pool = create_connection_pool(connection_string, &config)?;
        tracing::debug!("Created MySQL pool for {}", config);

        Ok(Self { pool, config })
    }

    /// Connection configuration of this source.
    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    /// Closes the connection pool gracefully.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

/// Creates a lazily connecting MySQL pool with session safety settings.
fn create_connection_pool(connection_string: &str, config: &ConnectionConfig) -> Result<MySqlPool> {
    use sqlx::Executor;

    let query_timeout = config.query_timeout;
    let read_only = config.read_only;

    sqlx::mysql::MySqlPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(0)
        .acquire_timeout(config.connect_timeout)
        .test_before_acquire(true)
        .after_connect(move |conn, _meta| {
            Box::pin(async move {
                let server_version: String = sqlx::query_scalar("SELECT VERSION()")
                    .fetch_one(&mut *conn)
                    .await?;
                conn.execute(execution_time_statement(&server_version, query_timeout).as_str())
                    .await?;

                if read_only {
                    conn.execute("SET SESSION TRANSACTION READ ONLY").await?;
                }

                conn.execute("SET time_zone = '+00:00'").await?;

                Ok(())
            })
        })
        .connect_lazy(connection_string)
        .map_err(|e| {
            GuacExportError::query_failed(
                format!(
                    "Failed to create MySQL connection pool to {}",
                    redact_database_url(connection_string)
                ),
                e,
            )
        })
}

/// Builds the statement capping execution time for a server version.
///
/// MariaDB has no `max_execution_time`; it uses `max_statement_time`
/// in seconds instead.
pub(crate) fn execution_time_statement(server_version: &str, timeout: Duration) -> String {
    if server_version.to_ascii_lowercase().contains("mariadb") {
        format!(
            "SET SESSION max_statement_time = {:.3}",
            timeout.as_secs_f64()
        )
    } else {
        format!("SET SESSION max_execution_time = {}", timeout.as_millis())
    }
}

/// Maps a sqlx error to a connection or query error.
///
/// Errors that mean the server could not be reached or authenticated
/// against become `Connection`; everything else is a query failure.
pub(crate) fn map_sqlx_error(context: &str, error: sqlx::Error) -> GuacExportError {
    let is_connectivity = match &error {
        sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::Configuration(_) => true,
        // 1044/1045: access denied, 1049: unknown database
        sqlx::Error::Database(db_error) => db_error
            .try_downcast_ref::<sqlx::mysql::MySqlDatabaseError>()
            .is_some_and(|e| matches!(e.number(), 1044 | 1045 | 1049)),
        _ => false,
    };

    if is_connectivity {
        GuacExportError::Connection {
            context: context.to_string(),
            source: Box::new(error),
        }
    } else {
        GuacExportError::query_failed(context, error)
    }
}
