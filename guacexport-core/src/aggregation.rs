//! Folding of flat connection rows into the group/connection tree.
//!
//! The connection query LEFT JOINs parameters, attributes, groups and
//! permission entities onto each connection, so a single connection shows up
//! once per combination of those facets. The aggregator is idempotent over
//! that fan-out: it keys groups and connections by identifier and only ever
//! adds facets that are not already present.
//!
//! # Invariants
//! - Groups come out in the order their identifiers first appear
//! - Connections come out in first-seen order within their group
//! - A connection belongs to the group of the row that introduced it
//! - Users and user groups of a connection are unique
//!
//! # Example
//! ```rust
//! use guacexport_core::aggregation::aggregate_rows;
//! use guacexport_core::models::{ConnectionRow, EntityType};
//!
//! let rows = vec![
//!     ConnectionRow::new(1)
//!         .with_parameter("hostname", "10.0.0.1")
//!         .with_entity("alice", EntityType::User),
//!     ConnectionRow::new(1)
//!         .with_parameter("port", "22")
//!         .with_entity("alice", EntityType::User),
//! ];
//!
//! let groups = aggregate_rows(rows);
//! assert_eq!(groups.len(), 1);
//! assert_eq!(groups[0].group_name, "ROOT");
//! assert_eq!(groups[0].connections[0].users.len(), 1);
//! ```

use crate::models::{
    ConnectionGroup, ConnectionId, ConnectionRow, EntityType, ExportedConnection, GroupId,
    ROOT_GROUP_NAME, non_empty,
};
use indexmap::IndexMap;
use std::collections::HashMap;

/// A group while rows are still being folded into it.
#[derive(Debug)]
struct GroupBuilder {
    group_name: String,
    connections: IndexMap<ConnectionId, ExportedConnection>,
}

impl GroupBuilder {
    fn new(group_name: Option<&str>) -> Self {
        Self {
            group_name: non_empty(group_name).unwrap_or(ROOT_GROUP_NAME).to_string(),
            connections: IndexMap::new(),
        }
    }

    fn build(self) -> ConnectionGroup {
        ConnectionGroup {
            group_name: self.group_name,
            connections: self.connections.into_values().collect(),
        }
    }
}

/// Incremental row-to-tree folder.
///
/// Rows are pushed one at a time so a streaming query can be folded without
/// buffering the whole result set.
#[derive(Debug, Default)]
pub struct ConnectionAggregator {
    /// `None` is the root group
    groups: IndexMap<Option<GroupId>, GroupBuilder>,
    /// Owning group of every connection seen so far
    owners: HashMap<ConnectionId, Option<GroupId>>,
    rows: u64,
}

impl ConnectionAggregator {
    /// Creates an empty aggregator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one row into the tree.
    pub fn push(&mut self, row: ConnectionRow) {
        self.rows = self.rows.saturating_add(1);

        let group_key = match self.owners.get(&row.connection_id) {
            Some(owner) => {
                if *owner != row.group_id {
                    tracing::debug!(
                        "Connection {} seen under group {:?} after group {:?}; keeping the first",
                        row.connection_id,
                        row.group_id,
                        owner
                    );
                }
                *owner
            }
            None => {
                self.owners.insert(row.connection_id, row.group_id);
                row.group_id
            }
        };

        let group = self
            .groups
            .entry(group_key)
            .or_insert_with(|| GroupBuilder::new(row.group_name.as_deref()));

        let connection = group
            .connections
            .entry(row.connection_id)
            .or_insert_with(|| {
                ExportedConnection::new(
                    row.connection_id,
                    row.name.as_deref(),
                    row.protocol.as_deref(),
                )
            });

        if let Some(name) = row.parameter_name {
            connection
                .parameters
                .insert(name, row.parameter_value.unwrap_or_default());
        }

        if let Some(name) = row.attribute_name {
            connection
                .attributes
                .insert(name, row.attribute_value.unwrap_or_default());
        }

        if let Some(entity_name) = row.entity_name {
            match row.entity_type {
                Some(EntityType::User) => {
                    connection.users.insert(entity_name);
                }
                Some(EntityType::UserGroup) => {
                    connection.groups.insert(entity_name);
                }
                None => {}
            }
        }
    }

    /// Number of rows folded so far.
    pub fn row_count(&self) -> u64 {
        self.rows
    }

    /// Number of distinct groups seen so far.
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Number of distinct connections seen so far.
    pub fn connection_count(&self) -> usize {
        self.owners.len()
    }

    /// Consumes the aggregator and returns the groups in first-seen order.
    pub fn finish(self) -> Vec<ConnectionGroup> {
        self.groups.into_values().map(GroupBuilder::build).collect()
    }
}

impl Extend<ConnectionRow> for ConnectionAggregator {
    fn extend<I: IntoIterator<Item = ConnectionRow>>(&mut self, rows: I) {
        for row in rows {
            self.push(row);
        }
    }
}

/// Folds a complete row sequence into groups.
pub fn aggregate_rows<I>(rows: I) -> Vec<ConnectionGroup>
where
    I: IntoIterator<Item = ConnectionRow>,
{
    let mut aggregator = ConnectionAggregator::new();
    aggregator.extend(rows);
    aggregator.finish()
}
