//! Core data models for the Guacamole export document.
//!
//! [`ConnectionRow`] is the flat input record produced by the connection
//! query; [`ExportDocument`] is the nested output. Everything in between is
//! done by [`crate::aggregation`] and [`crate::enum_options`].

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

/// Display name of the group holding connections without a parent group.
pub const ROOT_GROUP_NAME: &str = "ROOT";

/// Protocol reported for connections whose protocol column is null.
pub const DEFAULT_PROTOCOL: &str = "ssh";

/// Prefix of the synthesized name for connections without a name.
pub const UNNAMED_CONNECTION_PREFIX: &str = "Unnamed Connection";

/// Identifier type of `guacamole_connection.connection_id`.
pub type ConnectionId = i32;

/// Identifier type of `guacamole_connection_group.connection_group_id`.
pub type GroupId = i32;

/// Column name -> permitted literal values, in declaration order.
pub type DropdownOptions = IndexMap<String, Vec<String>>;

/// Builds the placeholder name for a connection whose name is null.
///
/// ```rust
/// use guacexport_core::models::placeholder_connection_name;
///
/// assert_eq!(placeholder_connection_name(42), "Unnamed Connection 42");
/// ```
pub fn placeholder_connection_name(connection_id: ConnectionId) -> String {
    format!("{} {}", UNNAMED_CONNECTION_PREFIX, connection_id)
}

/// Kind of permission entity granted access to a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityType {
    /// A user account (`USER`)
    User,
    /// A user group (`USER_GROUP`)
    UserGroup,
}

impl EntityType {
    /// Parses the literal stored in `guacamole_entity.type`.
    pub fn from_db(value: &str) -> Option<Self> {
        match value {
            "USER" => Some(Self::User),
            "USER_GROUP" => Some(Self::UserGroup),
            _ => None,
        }
    }

    /// Literal stored in `guacamole_entity.type`.
    pub const fn as_db_str(self) -> &'static str {
        match self {
            Self::User => "USER",
            Self::UserGroup => "USER_GROUP",
        }
    }
}

impl std::fmt::Display for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User => write!(f, "user account"),
            Self::UserGroup => write!(f, "user group"),
        }
    }
}

/// One row of the connection join query.
///
/// A connection with several parameters, attributes and permission grants
/// shows up in many rows; every nullable field is `None` when the
/// corresponding LEFT JOIN found nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionRow {
    pub connection_id: ConnectionId,
    pub name: Option<String>,
    pub protocol: Option<String>,
    pub parameter_name: Option<String>,
    pub parameter_value: Option<String>,
    pub attribute_name: Option<String>,
    pub attribute_value: Option<String>,
    pub group_id: Option<GroupId>,
    pub group_name: Option<String>,
    pub entity_name: Option<String>,
    pub entity_type: Option<EntityType>,
}

impl ConnectionRow {
    /// Creates a row carrying only a connection identifier.
    pub fn new(connection_id: ConnectionId) -> Self {
        Self {
            connection_id,
            ..Default::default()
        }
    }

    /// Builder method to set the connection name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Builder method to set the protocol.
    pub fn with_protocol(mut self, protocol: impl Into<String>) -> Self {
        self.protocol = Some(protocol.into());
        self
    }

    /// Builder method to set the parameter pair.
    pub fn with_parameter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameter_name = Some(name.into());
        self.parameter_value = Some(value.into());
        self
    }

    /// Builder method to set the attribute pair.
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attribute_name = Some(name.into());
        self.attribute_value = Some(value.into());
        self
    }

    /// Builder method to set the parent group.
    pub fn with_group(mut self, group_id: GroupId, group_name: impl Into<String>) -> Self {
        self.group_id = Some(group_id);
        self.group_name = Some(group_name.into());
        self
    }

    /// Builder method to set the permission entity.
    pub fn with_entity(mut self, name: impl Into<String>, entity_type: EntityType) -> Self {
        self.entity_name = Some(name.into());
        self.entity_type = Some(entity_type);
        self
    }
}

/// Treats an empty string the same as a missing value.
pub(crate) fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// A connection with all of its facets folded in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportedConnection {
    pub connection_id: ConnectionId,
    pub name: String,
    pub protocol: String,
    pub parameters: IndexMap<String, String>,
    pub attributes: IndexMap<String, String>,
    /// User accounts granted access, first-seen order, no duplicates
    pub users: IndexSet<String>,
    /// User groups granted access, first-seen order, no duplicates
    pub groups: IndexSet<String>,
}

impl ExportedConnection {
    /// Creates an empty connection, applying the name and protocol fallbacks.
    ///
    /// An empty name or protocol falls back the same way as a missing one.
    pub fn new(
        connection_id: ConnectionId,
        name: Option<&str>,
        protocol: Option<&str>,
    ) -> Self {
        Self {
            connection_id,
            name: non_empty(name)
                .map_or_else(|| placeholder_connection_name(connection_id), str::to_string),
            protocol: non_empty(protocol).unwrap_or(DEFAULT_PROTOCOL).to_string(),
            parameters: IndexMap::new(),
            attributes: IndexMap::new(),
            users: IndexSet::new(),
            groups: IndexSet::new(),
        }
    }
}

/// A connection group and the connections it directly contains.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionGroup {
    pub group_name: String,
    pub connections: Vec<ExportedConnection>,
}

impl ConnectionGroup {
    /// Number of connections in this group.
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Looks up a connection of this group by identifier.
    pub fn connection(&self, connection_id: ConnectionId) -> Option<&ExportedConnection> {
        self.connections
            .iter()
            .find(|c| c.connection_id == connection_id)
    }
}

/// An enumeration-typed column as reported by `INFORMATION_SCHEMA.COLUMNS`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumColumn {
    pub column_name: String,
    /// Raw type declaration, e.g. `enum('vnc','rdp','ssh')`
    pub column_type: String,
}

impl EnumColumn {
    /// Creates a new enum column descriptor.
    pub fn new(column_name: impl Into<String>, column_type: impl Into<String>) -> Self {
        Self {
            column_name: column_name.into(),
            column_type: column_type.into(),
        }
    }
}

/// The complete export written to disk.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportDocument {
    pub connections: Vec<ConnectionGroup>,
    pub dropdown_options: DropdownOptions,
}

impl ExportDocument {
    /// Creates a document from aggregated groups and dropdown options.
    pub fn new(connections: Vec<ConnectionGroup>, dropdown_options: DropdownOptions) -> Self {
        Self {
            connections,
            dropdown_options,
        }
    }

    /// Total number of connections across all groups.
    pub fn connection_count(&self) -> usize {
        self.connections
            .iter()
            .map(ConnectionGroup::connection_count)
            .sum()
    }

    /// Looks up a group by display name.
    pub fn group(&self, group_name: &str) -> Option<&ConnectionGroup> {
        self.connections.iter().find(|g| g.group_name == group_name)
    }

    /// True when no connections were exported.
    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }
}

#[cfg(test)]
#[path = "models_tests.rs"]
mod tests;
