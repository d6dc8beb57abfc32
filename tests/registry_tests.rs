use graphschema::{
    ColumnDescriptor, GraphSchemaError, SchemaRegistry, SemanticType, TableKind, TypeDescriptor,
    to_property_map,
};
use serde_json::json;


use model::{Likes, Person, Post};

#[test]
fn test_registry_compiles_every_declaration() {
    let schema = model::full_schema();
    assert_eq!(schema.nodes.len(), 3);
    assert_eq!(schema.edges.len(), 2);
    let likes = schema.edge("Likes").unwrap();
    assert_eq!(likes.kind, TableKind::edge("Person", "Post"));
    assert_eq!(
        likes.ddl,
        "CREATE REL TABLE Likes(FROM Person TO Post, at TIMESTAMP NOT NULL)"
    );
}

#[test]
fn test_edge_with_unregistered_endpoint_is_rejected() {
    let mut registry = SchemaRegistry::new();
    registry.register_node::<Person>().register_edge::<Likes>();
    let err = registry.compile().unwrap_err();
    assert!(matches!(err, GraphSchemaError::DefinitionError(_)));
    assert!(err.to_string().contains("Post"));
}

#[test]
fn test_duplicate_table_names_are_rejected() {
    let mut registry = SchemaRegistry::new();
    registry.register_node::<Person>().register_node::<Person>();
    assert!(registry.compile().is_err());
}

#[test]
fn test_value_descriptors_register_without_traits() {
    let mut registry = SchemaRegistry::new();
    registry.register(TypeDescriptor {
        name: "Tag".into(),
        kind: TableKind::Node,
        columns: vec![ColumnDescriptor::new("label", SemanticType::String).identifier()],
    });
    registry.register_node::<Post>();
    let schema = registry.compile().unwrap();
    assert!(schema.contains("Tag"));
    assert!(schema.contains("Post"));
    assert_eq!(registry.descriptors().len(), 2);
}

#[test]
fn test_malformed_declaration_fails_at_compile_time() {
    let mut registry = SchemaRegistry::new();
    registry.register(TypeDescriptor {
        name: "Broken".into(),
        kind: TableKind::Node,
        columns: vec![ColumnDescriptor::new("name", SemanticType::String)],
    });
    assert!(matches!(
        registry.compile(),
        Err(GraphSchemaError::DefinitionError(_))
    ));
}

#[test]
fn test_to_property_map_keeps_nulls() {
    let person = Person {
        id: "6f1c".into(),
        name: "Alice".into(),
        age: None,
    };
    let map = to_property_map(&person).unwrap();
    assert_eq!(map.get("name"), Some(&json!("Alice")));
    assert_eq!(map.get("age"), Some(&json!(null)));
    assert_eq!(map.len(), 3);
}

#[test]
fn test_to_property_map_rejects_scalars() {
    let err = to_property_map(&42).unwrap_err();
    assert!(matches!(err, GraphSchemaError::InvalidInput(_)));
}
