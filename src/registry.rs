//! Declaration layer: how application types describe their tables.
//!
//! A type implements [`NodeType`] or [`EdgeType`] to expose its table name and
//! column descriptors; [`SchemaRegistry`] collects those declarations and
//! compiles them into the target [`GraphSchema`] at startup. Instance values
//! are turned into bindings through serde with [`to_property_map`].

use serde::Serialize;
use serde_json::{Map, Value};

use crate::{
    errors::GraphSchemaError,
    schema::{ColumnDescriptor, GraphSchema, TableKind, TableSchema},
};

pub type PropertyMap = Map<String, Value>;

pub trait GraphType {
    fn table_name() -> String;
    fn columns() -> Vec<ColumnDescriptor>;
}

pub trait NodeType: GraphType {}

pub trait EdgeType: GraphType {
    type From: NodeType;
    type To: NodeType;
}

/// Table declaration in value form, for hosts that register tables without
/// implementing the traits.
#[derive(Clone, Debug, PartialEq)]
pub struct TypeDescriptor {
    pub name: String,
    pub kind: TableKind,
    pub columns: Vec<ColumnDescriptor>,
}

impl TypeDescriptor {
    pub fn node_type<T: NodeType>() -> Self {
        Self {
            name: T::table_name(),
            kind: TableKind::Node,
            columns: T::columns(),
        }
    }

    pub fn edge_type<T: EdgeType>() -> Self {
        Self {
            name: T::table_name(),
            kind: TableKind::edge(T::From::table_name(), T::To::table_name()),
            columns: T::columns(),
        }
    }

    pub fn compile(&self) -> Result<TableSchema, GraphSchemaError> {
        match &self.kind {
            TableKind::Node => TableSchema::node(self.name.clone(), self.columns.clone()),
            TableKind::Edge { from, to } => TableSchema::edge(
                self.name.clone(),
                from.clone(),
                to.clone(),
                self.columns.clone(),
            ),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct SchemaRegistry {
    descriptors: Vec<TypeDescriptor>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, descriptor: TypeDescriptor) -> &mut Self {
        self.descriptors.push(descriptor);
        self
    }

    pub fn register_node<T: NodeType>(&mut self) -> &mut Self {
        self.register(TypeDescriptor::node_type::<T>())
    }

    pub fn register_edge<T: EdgeType>(&mut self) -> &mut Self {
        self.register(TypeDescriptor::edge_type::<T>())
    }

    pub fn descriptors(&self) -> &[TypeDescriptor] {
        &self.descriptors
    }

    /// Compiles every registered declaration into the target schema.
    ///
    /// Fails with a definition error on the first malformed declaration, on a
    /// duplicated table name, or on an edge whose endpoint was not registered.
    pub fn compile(&self) -> Result<GraphSchema, GraphSchemaError> {
        let mut schema = GraphSchema::new();
        for descriptor in &self.descriptors {
            schema.insert(descriptor.compile()?)?;
        }
        schema.validate_endpoints()?;
        Ok(schema)
    }
}

/// Serializes an instance into a property map keyed by column name.
///
/// `null` fields are kept so optional columns can be cleared explicitly.
pub fn to_property_map<T: Serialize + ?Sized>(value: &T) -> Result<PropertyMap, GraphSchemaError> {
    match serde_json::to_value(value)
        .map_err(|e| GraphSchemaError::invalid_input(e.to_string()))?
    {
        Value::Object(map) => Ok(map),
        other => Err(GraphSchemaError::invalid_input(format!(
            "expected a struct or map of properties, got {other}"
        ))),
    }
}
