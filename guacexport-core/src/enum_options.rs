//! Dropdown option extraction from MySQL enum column declarations.
//!
//! `INFORMATION_SCHEMA.COLUMNS.COLUMN_TYPE` reports enum columns as
//! `enum('vnc','rdp','ssh')`. Literals are single-quoted, separated by
//! commas, and an embedded quote is doubled (`'it''s'`). Literals may
//! themselves contain commas, so the body is tokenized rather than split.
//!
//! A declaration that does not follow this shape fails the extraction with
//! [`GuacExportError::MalformedEnumDeclaration`]; no column is silently
//! dropped or emptied.

use crate::Result;
use crate::error::GuacExportError;
use crate::models::{DropdownOptions, EnumColumn};
use regex::Regex;
use std::sync::OnceLock;

/// Pre-compiled patterns for enum declarations.
struct EnumPatterns {
    /// `enum( ... )` wrapper, capturing the body
    wrapper: Regex,
    /// One quoted literal at the start of the remaining body
    literal: Regex,
}

impl EnumPatterns {
    fn instance() -> &'static Self {
        static PATTERNS: OnceLock<EnumPatterns> = OnceLock::new();
        PATTERNS.get_or_init(|| Self {
            wrapper: Regex::new(r"(?is)^\s*enum\s*\((.*)\)\s*$").expect("Invalid enum pattern"),
            literal: Regex::new(r"^\s*'((?:[^']|'')*)'\s*").expect("Invalid literal pattern"),
        })
    }
}

/// Parses an enum type declaration into its literal values.
///
/// Returns `None` when the declaration is not a well-formed enum.
///
/// # Example
/// ```rust
/// use guacexport_core::enum_options::parse_enum_declaration;
///
/// let values = parse_enum_declaration("enum('ssh','vnc','rdp')");
/// assert_eq!(values, Some(vec!["ssh".to_string(), "vnc".to_string(), "rdp".to_string()]));
///
/// assert_eq!(parse_enum_declaration("varchar(32)"), None);
/// ```
pub fn parse_enum_declaration(declaration: &str) -> Option<Vec<String>> {
    let patterns = EnumPatterns::instance();
    let body = patterns.wrapper.captures(declaration)?.get(1)?.as_str();

    if body.trim().is_empty() {
        return Some(Vec::new());
    }

    let mut values = Vec::new();
    let mut rest = body;
    loop {
        let captures = patterns.literal.captures(rest)?;
        values.push(captures.get(1)?.as_str().replace("''", "'"));
        rest = &rest[captures.get(0)?.end()..];

        if rest.is_empty() {
            return Some(values);
        }
        rest = rest.strip_prefix(',')?;
    }
}

/// Builds the dropdown option map for a set of enum columns.
///
/// Columns keep the order in which they are reported. A column name that is
/// reported twice keeps its first position and its last declaration.
///
/// # Errors
/// Returns `MalformedEnumDeclaration` for the first column whose type
/// declaration cannot be parsed.
pub fn extract_dropdown_options(columns: &[EnumColumn]) -> Result<DropdownOptions> {
    let mut options = DropdownOptions::new();

    for column in columns {
        let values = parse_enum_declaration(&column.column_type).ok_or_else(|| {
            GuacExportError::malformed_enum(&column.column_name, &column.column_type)
        })?;

        tracing::debug!(
            "Enum column '{}' allows {} values",
            column.column_name,
            values.len()
        );

        if options.insert(column.column_name.clone(), values).is_some() {
            tracing::debug!(
                "Enum column '{}' reported more than once; keeping the last declaration",
                column.column_name
            );
        }
    }

    Ok(options)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| (*v).to_string()).collect()
    }

    #[test]
    fn test_parse_simple_enum() {
        assert_eq!(
            parse_enum_declaration("enum('ssh','vnc','rdp')"),
            Some(strings(&["ssh", "vnc", "rdp"]))
        );
    }

    #[test]
    fn test_parse_preserves_declaration_order() {
        assert_eq!(
            parse_enum_declaration("enum('USER_GROUP','USER')"),
            Some(strings(&["USER_GROUP", "USER"]))
        );
    }

    #[test]
    fn test_parse_tolerates_case_and_whitespace() {
        assert_eq!(
            parse_enum_declaration("  ENUM ( 'NONE' , 'SSL' )  "),
            Some(strings(&["NONE", "SSL"]))
        );
    }

    #[test]
    fn test_parse_literal_with_comma_and_escaped_quote() {
        assert_eq!(
            parse_enum_declaration("enum('a,b','it''s','')"),
            Some(strings(&["a,b", "it's", ""]))
        );
    }

    #[test]
    fn test_parse_empty_enum() {
        assert_eq!(parse_enum_declaration("enum()"), Some(Vec::new()));
    }

    #[test]
    fn test_parse_rejects_malformed_declarations() {
        for declaration in [
            "varchar(255)",
            "enum('a','b'",
            "enum(a,b)",
            "enum('a',)",
            "enum('a' 'b')",
            "enum('unterminated)",
            "set('a','b')",
            "",
        ] {
            assert_eq!(
                parse_enum_declaration(declaration),
                None,
                "declaration {:?} should be rejected",
                declaration
            );
        }
    }

    #[test]
    fn test_extract_dropdown_options() {
        let columns = vec![
            EnumColumn::new("protocol", "enum('vnc','rdp','ssh')"),
            EnumColumn::new("proxy_encryption_method", "enum('NONE','SSL')"),
        ];

        let options = extract_dropdown_options(&columns).expect("valid columns");
        let keys: Vec<&String> = options.keys().collect();
        assert_eq!(keys, ["protocol", "proxy_encryption_method"]);
        assert_eq!(options["protocol"], strings(&["vnc", "rdp", "ssh"]));
        assert_eq!(options["proxy_encryption_method"], strings(&["NONE", "SSL"]));
    }

    #[test]
    fn test_extract_duplicate_column_keeps_last_declaration() {
        let columns = vec![
            EnumColumn::new("type", "enum('A')"),
            EnumColumn::new("mode", "enum('X')"),
            EnumColumn::new("type", "enum('B','C')"),
        ];

        let options = extract_dropdown_options(&columns).expect("valid columns");
        let keys: Vec<&String> = options.keys().collect();
        assert_eq!(keys, ["type", "mode"]);
        assert_eq!(options["type"], strings(&["B", "C"]));
    }

    #[test]
    fn test_extract_fails_on_malformed_declaration() {
        let columns = vec![
            EnumColumn::new("protocol", "enum('vnc','rdp')"),
            EnumColumn::new("broken", "enum(vnc)"),
        ];

        let error = extract_dropdown_options(&columns).expect_err("malformed column");
        assert!(matches!(
            error,
            GuacExportError::MalformedEnumDeclaration { ref column, .. } if column == "broken"
        ));
    }

    #[test]
    fn test_extract_no_columns() {
        let options = extract_dropdown_options(&[]).expect("empty input");
        assert!(options.is_empty());
    }
}
