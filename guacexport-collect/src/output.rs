//! File output operations for export results.
//!
//! Handles writing the export document to files with optional compression.

use guacexport_core::{GuacExportError, Result, models::ExportDocument, validate_export_output};
use serde::Serialize;
use std::path::Path;

/// Indentation of the written JSON.
const JSON_INDENT: &[u8] = b"    ";

/// Renders the document as pretty JSON with four-space indentation.
pub fn render_export(document: &ExportDocument) -> Result<String> {
    let mut buffer = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(JSON_INDENT);
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);

    document
        .serialize(&mut serializer)
        .map_err(|e| GuacExportError::Serialization {
            context: "JSON serialization".to_string(),
            source: e,
        })?;

    String::from_utf8(buffer).map_err(|e| {
        GuacExportError::configuration(format!("Serialized export is not UTF-8: {}", e))
    })
}

/// Validates and saves the export with optional compression.
pub async fn save_export(document: &ExportDocument, output_path: &Path, compress: bool) -> Result<()> {
    let json_value = serde_json::to_value(document).map_err(|e| GuacExportError::Serialization {
        context: "JSON conversion for validation".to_string(),
        source: e,
    })?;

    // Validate output against JSON Schema before saving
    validate_export_output(&json_value)?;
    tracing::info!("Output validation passed");

    let json_data = render_export(document)?;

    if compress {
        #[cfg(feature = "compression")]
        {
            save_compressed(&json_data, output_path).await
        }
        #[cfg(not(feature = "compression"))]
        {
            Err(GuacExportError::configuration(
                "Compression not available. Compile with --features compression",
            ))
        }
    } else {
        save_json(&json_data, output_path).await
    }
}

/// Saves JSON data to file.
pub async fn save_json(json_data: &str, output_path: &Path) -> Result<()> {
    tokio::fs::write(output_path, json_data)
        .await
        .map_err(|e| GuacExportError::io(format!("Failed to write to {}", output_path.display()), e))
}

/// Saves compressed JSON data.
#[cfg(feature = "compression")]
async fn save_compressed(json_data: &str, output_path: &Path) -> Result<()> {
    let compressed_data = zstd::encode_all(json_data.as_bytes(), 3).map_err(|e| {
        GuacExportError::io("Compression failed", e)
    })?;

    tokio::fs::write(output_path, compressed_data)
        .await
        .map_err(|e| {
            GuacExportError::io(
                format!(
                    "Failed to write compressed file to {}",
                    output_path.display()
                ),
                e,
            )
        })
}
