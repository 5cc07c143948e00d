//! Export pipeline: metadata, rows, document.
//!
//! The two reads run strictly in sequence on the same source. Any read or
//! decode error aborts the export before a document exists, so a partial
//! document is never produced.

use crate::Result;
use crate::aggregation::ConnectionAggregator;
use crate::enum_options::extract_dropdown_options;
use crate::models::ExportDocument;
use crate::source::ExportSource;
use futures::TryStreamExt;
use std::fmt;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Non-fatal conditions noticed while building an export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportWarning {
    /// The connection query returned no rows at all
    EmptyResult,
}

impl fmt::Display for ExportWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyResult => write!(f, "connection query returned no rows"),
        }
    }
}

/// A finished export together with what was observed while building it.
#[derive(Debug, Clone)]
pub struct ExportReport {
    pub document: ExportDocument,
    /// Number of joined rows folded into the document
    pub row_count: u64,
    pub warnings: Vec<ExportWarning>,
}

impl ExportReport {
    /// True if the connection query returned no rows.
    pub fn is_empty_result(&self) -> bool {
        self.warnings.contains(&ExportWarning::EmptyResult)
    }
}

/// Reads enum metadata and connection rows from `source` and assembles the
/// export document.
///
/// # Errors
/// Propagates connection, query and decode errors from the source, and
/// `MalformedEnumDeclaration` from option extraction.
pub async fn collect_export(source: &dyn ExportSource) -> Result<ExportReport> {
    let started = Instant::now();

    let enum_columns = source.fetch_enum_columns().await?;
    info!(
        "Found {} enum columns in {} database",
        enum_columns.len(),
        source.source_name()
    );
    let dropdown_options = extract_dropdown_options(&enum_columns)?;

    let mut aggregator = ConnectionAggregator::new();
    let mut rows = source.connection_rows();
    while let Some(row) = rows.try_next().await? {
        aggregator.push(row);
    }

    let row_count = aggregator.row_count();
    debug!(
        "Folded {} rows into {} connections across {} groups",
        row_count,
        aggregator.connection_count(),
        aggregator.group_count()
    );

    let mut warnings = Vec::new();
    if row_count == 0 {
        warn!("Connection query returned no rows; the export will contain no connections");
        warnings.push(ExportWarning::EmptyResult);
    }

    let document = ExportDocument::new(aggregator.finish(), dropdown_options);
    info!(
        "Export assembled in {:.2}s: {} connections in {} groups, {} dropdown columns",
        started.elapsed().as_secs_f64(),
        document.connection_count(),
        document.connections.len(),
        document.dropdown_options.len()
    );

    Ok(ExportReport {
        document,
        row_count,
        warnings,
    })
}
