//! Tests for the export document models.

use super::*;

#[test]
fn test_placeholder_connection_name() {
    assert_eq!(placeholder_connection_name(42), "Unnamed Connection 42");
    assert!(placeholder_connection_name(7).starts_with(UNNAMED_CONNECTION_PREFIX));
}

#[test]
fn test_exported_connection_fallbacks() {
    let connection = ExportedConnection::new(42, None, None);
    assert_eq!(connection.name, "Unnamed Connection 42");
    assert_eq!(connection.protocol, DEFAULT_PROTOCOL);
    assert!(connection.parameters.is_empty());
    assert!(connection.attributes.is_empty());
    assert!(connection.users.is_empty());
    assert!(connection.groups.is_empty());

    let connection = ExportedConnection::new(1, Some("jump host"), Some("rdp"));
    assert_eq!(connection.name, "jump host");
    assert_eq!(connection.protocol, "rdp");
}

#[test]
fn test_entity_type_from_db() {
    assert_eq!(EntityType::from_db("USER"), Some(EntityType::User));
    assert_eq!(EntityType::from_db("USER_GROUP"), Some(EntityType::UserGroup));
    assert_eq!(EntityType::from_db("user"), None);
    assert_eq!(EntityType::from_db(""), None);

    assert_eq!(EntityType::User.as_db_str(), "USER");
    assert_eq!(EntityType::UserGroup.to_string(), "user group");
}

#[test]
fn test_connection_row_builder() {
    let row = ConnectionRow::new(3)
        .with_name("db01")
        .with_protocol("vnc")
        .with_parameter("hostname", "10.0.0.3")
        .with_attribute("max-connections", "2")
        .with_group(9, "Servers")
        .with_entity("alice", EntityType::User);

    assert_eq!(row.connection_id, 3);
    assert_eq!(row.name.as_deref(), Some("db01"));
    assert_eq!(row.parameter_value.as_deref(), Some("10.0.0.3"));
    assert_eq!(row.attribute_name.as_deref(), Some("max-connections"));
    assert_eq!(row.group_id, Some(9));
    assert_eq!(row.entity_type, Some(EntityType::User));
}

#[test]
fn test_empty_document_serializes_every_key() {
    let document = ExportDocument::default();
    let value = serde_json::to_value(&document).expect("serialize");

    assert_eq!(value["connections"], serde_json::json!([]));
    assert_eq!(value["dropdown_options"], serde_json::json!({}));
}

#[test]
fn test_connection_serializes_sets_as_lists() {
    let mut connection = ExportedConnection::new(1, Some("web"), Some("ssh"));
    connection.users.insert("alice".to_string());
    connection.users.insert("bob".to_string());
    connection.groups.insert("admins".to_string());
    connection
        .parameters
        .insert("port".to_string(), "22".to_string());

    let value = serde_json::to_value(&connection).expect("serialize");
    assert_eq!(value["connection_id"], serde_json::json!(1));
    assert_eq!(value["users"], serde_json::json!(["alice", "bob"]));
    assert_eq!(value["groups"], serde_json::json!(["admins"]));
    assert_eq!(value["parameters"], serde_json::json!({"port": "22"}));
    assert_eq!(value["attributes"], serde_json::json!({}));
}

#[test]
fn test_document_lookups() {
    let mut servers = ConnectionGroup {
        group_name: "Servers".to_string(),
        connections: Vec::new(),
    };
    servers
        .connections
        .push(ExportedConnection::new(5, Some("db"), None));
    servers
        .connections
        .push(ExportedConnection::new(6, Some("web"), None));

    let root = ConnectionGroup {
        group_name: ROOT_GROUP_NAME.to_string(),
        connections: vec![ExportedConnection::new(1, None, None)],
    };

    let document = ExportDocument::new(vec![root, servers], DropdownOptions::new());
    assert_eq!(document.connection_count(), 3);
    assert!(!document.is_empty());

    let group = document.group("Servers").expect("group present");
    assert_eq!(group.connection_count(), 2);
    assert_eq!(group.connection(6).map(|c| c.name.as_str()), Some("web"));
    assert!(group.connection(1).is_none());
}

#[test]
fn test_document_serde_roundtrip_preserves_order() {
    let mut dropdown_options = DropdownOptions::new();
    dropdown_options.insert(
        "protocol".to_string(),
        vec!["vnc".to_string(), "rdp".to_string(), "ssh".to_string()],
    );
    dropdown_options.insert("proxy_encryption_method".to_string(), vec!["NONE".to_string(), "SSL".to_string()]);

    let document = ExportDocument::new(Vec::new(), dropdown_options);
    let json = serde_json::to_string(&document).expect("serialize");
    let restored: ExportDocument = serde_json::from_str(&json).expect("deserialize");

    assert_eq!(restored, document);
    let keys: Vec<&String> = restored.dropdown_options.keys().collect();
    assert_eq!(keys, ["protocol", "proxy_encryption_method"]);
}
