//! JSON Schema validation of the export document.
//!
//! The export is consumed by import tooling that expects every key to be
//! present, `connection_id` to be an integer, and every other leaf to be a
//! string. The embedded schema encodes exactly that shape and is checked
//! before a document is written and after one is read back.
//!
//! # Example
//! ```rust
//! use guacexport_core::validation::validate_export_output;
//! use serde_json::json;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let export = json!({
//!     "connections": [],
//!     "dropdown_options": { "protocol": ["vnc", "rdp", "ssh"] }
//! });
//!
//! validate_export_output(&export)?;
//! # Ok(())
//! # }
//! ```

use crate::models::ExportDocument;
use jsonschema::Validator;
use serde_json::Value;
use std::sync::OnceLock;
use thiserror::Error;

/// JSON Schema validation errors with field-level reporting
#[derive(Debug, Error)]
pub enum ValidationError {
    /// Schema compilation failed during initialization
    #[error("JSON Schema compilation failed: {message}")]
    SchemaCompilation { message: String },

    /// Validation failed with specific field errors
    #[error("Export validation failed with {error_count} errors: {errors:?}")]
    ValidationFailed {
        error_count: usize,
        errors: Vec<String>,
    },

    /// JSON parsing error
    #[error("JSON parsing failed: {source}")]
    JsonParsing {
        #[from]
        source: serde_json::Error,
    },
}

/// Embedded JSON Schema of the export document
const EXPORT_SCHEMA: &str = r##"{
  "$schema": "https://json-schema.org/draft/2020-12/schema",
  "title": "Guacamole Connection Export",
  "type": "object",
  "required": ["connections", "dropdown_options"],
  "additionalProperties": false,
  "properties": {
    "connections": {
      "type": "array",
      "items": { "$ref": "#/$defs/group" }
    },
    "dropdown_options": {
      "type": "object",
      "additionalProperties": {
        "type": "array",
        "items": { "type": "string" }
      }
    }
  },
  "$defs": {
    "stringMap": {
      "type": "object",
      "additionalProperties": { "type": "string" }
    },
    "uniqueStrings": {
      "type": "array",
      "items": { "type": "string" },
      "uniqueItems": true
    },
    "group": {
      "type": "object",
      "required": ["group_name", "connections"],
      "properties": {
        "group_name": { "type": "string" },
        "connections": {
          "type": "array",
          "items": { "$ref": "#/$defs/connection" }
        }
      }
    },
    "connection": {
      "type": "object",
      "required": [
        "connection_id", "name", "protocol", "parameters",
        "attributes", "users", "groups"
      ],
      "properties": {
        "connection_id": { "type": "integer" },
        "name": { "type": "string" },
        "protocol": { "type": "string" },
        "parameters": { "$ref": "#/$defs/stringMap" },
        "attributes": { "$ref": "#/$defs/stringMap" },
        "users": { "$ref": "#/$defs/uniqueStrings" },
        "groups": { "$ref": "#/$defs/uniqueStrings" }
      }
    }
  }
}"##;

/// Compiled JSON Schema instance (initialized once)
static COMPILED_SCHEMA: OnceLock<Validator> = OnceLock::new();

fn compile_schema() -> Result<Validator, ValidationError> {
    let schema_json = get_schema_definition()?;

    jsonschema::validator_for(&schema_json).map_err(|e| ValidationError::SchemaCompilation {
        message: format!("Schema compilation error: {}", e),
    })
}

/// Returns the compiled validator, compiling it on first use.
fn validator() -> Result<&'static Validator, ValidationError> {
    if let Some(validator) = COMPILED_SCHEMA.get() {
        return Ok(validator);
    }

    let compiled = compile_schema()?;
    Ok(COMPILED_SCHEMA.get_or_init(|| compiled))
}

/// Compiles the embedded schema eagerly.
///
/// Validation compiles lazily on first use; calling this at startup only
/// moves a schema error to the beginning of the run.
pub fn initialize_export_validator() -> Result<(), ValidationError> {
    validator().map(|_| ())
}

/// Validates an export document in its JSON form.
///
/// # Errors
/// Returns `ValidationFailed` listing every schema violation.
pub fn validate_export_output(json_value: &Value) -> Result<(), ValidationError> {
    let validator = validator()?;

    let errors: Vec<String> = validator
        .iter_errors(json_value)
        .map(|error| error.to_string())
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::ValidationFailed {
            error_count: errors.len(),
            errors,
        })
    }
}

/// Validates an in-memory document.
pub fn validate_export_document(document: &ExportDocument) -> Result<(), ValidationError> {
    let json_value = serde_json::to_value(document)?;
    validate_export_output(&json_value)
}

/// Parses, validates and deserializes a previously written export.
///
/// # Example
/// ```rust
/// use guacexport_core::validation::validate_and_parse_export;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let json_str = r#"{
///     "connections": [
///         {
///             "group_name": "ROOT",
///             "connections": [
///                 {
///                     "connection_id": 1,
///                     "name": "web01",
///                     "protocol": "ssh",
///                     "parameters": { "hostname": "10.0.0.1" },
///                     "attributes": {},
///                     "users": ["alice"],
///                     "groups": []
///                 }
///             ]
///         }
///     ],
///     "dropdown_options": {}
/// }"#;
///
/// let export = validate_and_parse_export(json_str)?;
/// assert_eq!(export.connection_count(), 1);
/// # Ok(())
/// # }
/// ```
pub fn validate_and_parse_export(json_str: &str) -> Result<ExportDocument, ValidationError> {
    let json_value: Value = serde_json::from_str(json_str)?;

    validate_export_output(&json_value)?;

    let document: ExportDocument = serde_json::from_value(json_value)?;
    Ok(document)
}

/// Get the embedded JSON Schema as a parsed Value for external use
pub fn get_schema_definition() -> Result<Value, ValidationError> {
    serde_json::from_str(EXPORT_SCHEMA).map_err(|e| ValidationError::SchemaCompilation {
        message: format!("Failed to parse embedded schema: {}", e),
    })
}
