//! Fixed read-only queries against the Guacamole schema and row decoding.

use super::connection::map_sqlx_error;
use crate::Result;
use crate::error::GuacExportError;
use crate::models::{ConnectionRow, EntityType, EnumColumn};
use crate::source::ENUM_SOURCE_TABLES;
use sqlx::mysql::MySqlRow;
use sqlx::{MySqlPool, Row};

/// Enum columns of the exported tables in the current database.
pub const ENUM_COLUMNS_QUERY: &str = r#"
    SELECT
        CAST(COLUMN_NAME AS CHAR) AS column_name,
        CAST(COLUMN_TYPE AS CHAR) AS column_type
    FROM INFORMATION_SCHEMA.COLUMNS
    WHERE TABLE_SCHEMA = DATABASE()
      AND TABLE_NAME IN (?, ?, ?)
      AND DATA_TYPE = 'enum'
    ORDER BY TABLE_NAME, ORDINAL_POSITION
"#;

/// One row per connection x parameter x attribute x permission entity.
pub const CONNECTION_QUERY: &str = r#"
    SELECT
        c.connection_id,
        c.connection_name AS name,
        c.protocol,
        cp.parameter_name,
        cp.parameter_value,
        ca.attribute_name,
        ca.attribute_value,
        g.connection_group_id,
        g.connection_group_name AS group_name,
        e.name AS entity_name,
        e.type AS entity_type
    FROM guacamole_connection c
    LEFT JOIN guacamole_connection_parameter cp ON c.connection_id = cp.connection_id
    LEFT JOIN guacamole_connection_attribute ca ON c.connection_id = ca.connection_id
    LEFT JOIN guacamole_connection_group g ON c.parent_id = g.connection_group_id
    LEFT JOIN guacamole_connection_permission p ON c.connection_id = p.connection_id
    LEFT JOIN guacamole_entity e ON p.entity_id = e.entity_id
    ORDER BY c.connection_id
"#;

/// Checks that the connected database carries the Guacamole schema.
pub const SCHEMA_PRESENCE_QUERY: &str = r#"
    SELECT COUNT(*)
    FROM INFORMATION_SCHEMA.TABLES
    WHERE TABLE_SCHEMA = DATABASE()
      AND TABLE_NAME = 'guacamole_connection'
"#;

/// Fetches the enum column declarations of [`ENUM_SOURCE_TABLES`].
pub(crate) async fn fetch_enum_columns(pool: &MySqlPool) -> Result<Vec<EnumColumn>> {
    let mut query = sqlx::query(ENUM_COLUMNS_QUERY);
    for table in ENUM_SOURCE_TABLES {
        query = query.bind(table);
    }

    let rows = query
        .fetch_all(pool)
        .await
        .map_err(|e| map_sqlx_error("Failed to query enum column metadata", e))?;

    rows.iter().map(decode_enum_column).collect()
}

fn decode_enum_column(row: &MySqlRow) -> Result<EnumColumn> {
    let column_name: String = row
        .try_get("column_name")
        .map_err(|e| GuacExportError::parse_field("column_name", "enum metadata", e))?;
    let column_type: String = row
        .try_get("column_type")
        .map_err(|e| GuacExportError::parse_field("column_type", "enum metadata", e))?;

    Ok(EnumColumn {
        column_name,
        column_type,
    })
}

/// Decodes one row of [`CONNECTION_QUERY`].
pub(crate) fn decode_connection_row(row: &MySqlRow) -> Result<ConnectionRow> {
    fn field<'r, T>(row: &'r MySqlRow, name: &str) -> Result<T>
    where
        T: sqlx::Decode<'r, sqlx::MySql> + sqlx::Type<sqlx::MySql>,
    {
        row.try_get(name)
            .map_err(|e| GuacExportError::parse_field(name, "connection", e))
    }

    let connection_id = field(row, "connection_id")?;
    let entity_type: Option<String> = field(row, "entity_type")?;

    Ok(ConnectionRow {
        connection_id,
        name: field(row, "name")?,
        protocol: field(row, "protocol")?,
        parameter_name: field(row, "parameter_name")?,
        parameter_value: field(row, "parameter_value")?,
        attribute_name: field(row, "attribute_name")?,
        attribute_value: field(row, "attribute_value")?,
        group_id: field(row, "connection_group_id")?,
        group_name: field(row, "group_name")?,
        entity_name: field(row, "entity_name")?,
        entity_type: entity_type.and_then(|value| {
            let parsed = EntityType::from_db(&value);
            if parsed.is_none() {
                tracing::warn!(
                    "Connection {}: ignoring permission entity of unknown type '{}'",
                    connection_id,
                    value
                );
            }
            parsed
        }),
    })
}
