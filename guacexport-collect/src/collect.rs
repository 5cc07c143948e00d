//! Export workflow and connection testing.

use guacexport_core::{
    ExportReport, ExportSource, GuacExportError, Result, collect_export,
    error::redact_database_url,
};
use std::path::Path;
use tracing::{error, info, warn};

use crate::output;

/// Options of a single export run.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExportOptions {
    /// Write Zstandard-compressed output
    pub compress: bool,
    /// Return `EmptyResult` instead of writing an export without connections
    pub fail_on_empty: bool,
    /// Skip the summary printed to stdout
    pub quiet: bool,
}

/// Opens the export source for a connection URL.
#[cfg(feature = "mysql")]
pub fn create_source(database_url: &str) -> Result<Box<dyn ExportSource>> {
    let source = guacexport_core::GuacamoleMySqlSource::new(database_url).map_err(|e| {
        error!("Failed to create database source: {}", e);
        e
    })?;
    Ok(Box::new(source))
}

/// Opens the export source for a connection URL.
#[cfg(not(feature = "mysql"))]
pub fn create_source(_database_url: &str) -> Result<Box<dyn ExportSource>> {
    Err(GuacExportError::configuration(
        "MySQL support not available. Compile with --features mysql",
    ))
}

/// Tests database connection without exporting anything.
pub async fn test_connection(database_url: &str, quiet: bool) -> Result<()> {
    info!("Testing database connection...");
    info!("Target: {}", redact_database_url(database_url));

    let source = create_source(database_url)?;

    source.test_connection().await.map_err(|e| {
        error!("Connection test failed: {}", e);
        e
    })?;

    info!("Connection test successful");
    if !quiet {
        println!("Connection to {} database successful", source.source_name());
    }

    Ok(())
}

/// Exports all connections of the database at `database_url` to `output_path`.
pub async fn run_export(
    database_url: &str,
    output_path: &Path,
    options: ExportOptions,
) -> Result<ExportReport> {
    info!("Starting export...");
    info!("Target: {}", redact_database_url(database_url));
    info!("Output: {}", output_path.display());

    let source = create_source(database_url)?;
    export_from_source(source.as_ref(), output_path, options).await
}

/// Runs the export against an already opened source and writes the result.
///
/// # Errors
/// Returns `EmptyResult` without writing when `fail_on_empty` is set and
/// the connection query returned no rows.
pub async fn export_from_source(
    source: &dyn ExportSource,
    output_path: &Path,
    options: ExportOptions,
) -> Result<ExportReport> {
    let report = collect_export(source).await.map_err(|e| {
        error!("Export failed: {}", e);
        e
    })?;

    if report.is_empty_result() {
        if options.fail_on_empty {
            error!("No data found in the database; nothing written");
            return Err(GuacExportError::EmptyResult);
        }
        warn!("No data found in the database; writing an export without connections");
    }

    output::save_export(&report.document, output_path, options.compress).await?;

    info!("Export saved to {}", output_path.display());
    if !options.quiet {
        print!("{}", export_summary(&report, output_path));
    }

    Ok(report)
}

/// Human-readable summary of a finished export.
pub fn export_summary(report: &ExportReport, output_path: &Path) -> String {
    format!(
        "Export completed successfully\n\
         Output: {}\n\
         Connection groups: {}\n\
         Connections: {}\n\
         Dropdown columns: {}\n",
        output_path.display(),
        report.document.connections.len(),
        report.document.connection_count(),
        report.document.dropdown_options.len()
    )
}
