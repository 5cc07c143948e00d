//! Data sources the export reads from.
//!
//! The export needs exactly two things from the database: the enum column
//! declarations and the stream of joined connection rows. [`ExportSource`]
//! captures that boundary so the export pipeline can run against MySQL or an
//! in-memory fixture alike.
//!
//! # Module Structure
//! - `mysql`: sqlx-backed source for a Guacamole MySQL/MariaDB schema

use crate::Result;
use crate::models::{ConnectionRow, EnumColumn};
use async_trait::async_trait;
use futures::stream::BoxStream;

#[cfg(feature = "mysql")]
pub mod mysql;

/// Tables whose enum columns are exported as dropdown options.
pub const ENUM_SOURCE_TABLES: [&str; 3] = [
    "guacamole_connection",
    "guacamole_connection_parameter",
    "guacamole_connection_attribute",
];

/// Read-only access to a Guacamole database.
///
/// # Object Safety
/// This trait is object-safe, allowing for dynamic dispatch through
/// `Box<dyn ExportSource>`.
#[async_trait]
pub trait ExportSource: Send + Sync {
    /// Tests connectivity without reading any configuration.
    ///
    /// # Errors
    /// Returns a connection error if the database cannot be reached.
    async fn test_connection(&self) -> Result<()>;

    /// Fetches `(column, declaration)` pairs of the enum columns of
    /// [`ENUM_SOURCE_TABLES`].
    async fn fetch_enum_columns(&self) -> Result<Vec<EnumColumn>>;

    /// Streams the joined connection rows, ordered by connection identifier.
    ///
    /// Each item is decoded into a typed [`ConnectionRow`]; a decode failure
    /// surfaces as an `Err` item and ends the export.
    fn connection_rows(&self) -> BoxStream<'_, Result<ConnectionRow>>;

    /// Short human-readable name for logs.
    fn source_name(&self) -> &'static str;
}
