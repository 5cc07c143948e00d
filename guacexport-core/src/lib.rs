//! Core library for exporting Apache Guacamole connection configuration.
//!
//! This crate reads a Guacamole MySQL database, folds the fan-out of its
//! connection join query into a group/connection tree and extracts the enum
//! columns the import tooling offers as dropdowns. The collector binary
//! (`guacexport-collect`) drives it end to end.
//!
//! # Security Guarantees
//! - All database operations are read-only
//! - Passwords are held in zeroizing buffers and never logged
//! - Connection strings are redacted in every error message
//!
//! # Architecture
//! - [`source`]: the read boundary ([`ExportSource`]) and its MySQL implementation
//! - [`aggregation`] and [`enum_options`]: pure transformations of fetched data
//! - [`export`]: the pipeline tying both together
//! - [`validation`]: JSON Schema check of the produced document

pub mod aggregation;
pub mod config;
pub mod descriptor;
pub mod enum_options;
pub mod error;
pub mod export;
pub mod logging;
pub mod models;
pub mod source;
pub mod validation;

// Re-export commonly used types
pub use aggregation::{ConnectionAggregator, aggregate_rows};
pub use config::{ConnectionConfig, DatabaseCredentials};
pub use descriptor::DeploymentDescriptor;
pub use enum_options::{extract_dropdown_options, parse_enum_declaration};
pub use error::{GuacExportError, Result};
pub use export::{ExportReport, ExportWarning, collect_export};
pub use logging::init_logging;
pub use models::{
    ConnectionGroup, ConnectionRow, DropdownOptions, EntityType, EnumColumn, ExportDocument,
    ExportedConnection,
};
pub use source::ExportSource;

#[cfg(feature = "mysql")]
pub use source::mysql::GuacamoleMySqlSource;

pub use validation::{
    ValidationError, initialize_export_validator, validate_and_parse_export,
    validate_export_document, validate_export_output,
};
