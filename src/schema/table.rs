use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::column::ColumnDescriptor;
use crate::{ddl, errors::GraphSchemaError};

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TableKind {
    Node,
    Edge { from: String, to: String },
}

impl TableKind {
    pub fn edge(from: impl Into<String>, to: impl Into<String>) -> Self {
        TableKind::Edge {
            from: from.into(),
            to: to.into(),
        }
    }

    pub fn is_edge(&self) -> bool {
        matches!(self, TableKind::Edge { .. })
    }

    pub fn endpoints(&self) -> Option<(&str, &str)> {
        match self {
            TableKind::Node => None,
            TableKind::Edge { from, to } => Some((from.as_str(), to.as_str())),
        }
    }
}

/// A compiled node or edge table: its columns plus the statements that create it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TableSchema {
    pub name: String,
    pub kind: TableKind,
    pub columns: Vec<ColumnDescriptor>,
    /// Primary `CREATE ... TABLE` statement.
    pub ddl: String,
    /// Auxiliary index statements, in emission order.
    pub indexes: Vec<String>,
}

impl TableSchema {
    pub fn node(
        name: impl Into<String>,
        columns: Vec<ColumnDescriptor>,
    ) -> Result<Self, GraphSchemaError> {
        ddl::compile_table(&name.into(), columns, TableKind::Node).map(Self::from)
    }

    pub fn edge(
        name: impl Into<String>,
        from: impl Into<String>,
        to: impl Into<String>,
        columns: Vec<ColumnDescriptor>,
    ) -> Result<Self, GraphSchemaError> {
        ddl::compile_table(&name.into(), columns, TableKind::edge(from, to)).map(Self::from)
    }

    pub fn column(&self, name: &str) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|column| column.name == name)
    }

    pub fn identifier(&self) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|column| column.is_identifier)
    }

    pub fn is_edge(&self) -> bool {
        self.kind.is_edge()
    }

    /// Every statement needed to create this table, CREATE first.
    pub fn statements(&self) -> Vec<String> {
        let mut statements = Vec::with_capacity(1 + self.indexes.len());
        statements.push(self.ddl.clone());
        statements.extend(self.indexes.iter().cloned());
        statements
    }

    /// Structural equality: same name, kind, column count and per-position
    /// column structure.
    pub fn same_structure(&self, other: &TableSchema) -> bool {
        self.name == other.name
            && self.kind == other.kind
            && self.columns.len() == other.columns.len()
            && self
                .columns
                .iter()
                .zip(other.columns.iter())
                .all(|(a, b)| a.same_structure(b))
    }
}

impl From<ddl::CompiledTable> for TableSchema {
    fn from(compiled: ddl::CompiledTable) -> Self {
        let mut statements = compiled.statements.into_iter();
        let ddl = statements.next().unwrap_or_default();
        Self {
            name: compiled.name,
            kind: compiled.kind,
            columns: compiled.columns,
            ddl,
            indexes: statements.collect(),
        }
    }
}

/// Snapshot of every node and edge table in one database.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphSchema {
    pub nodes: BTreeMap<String, TableSchema>,
    pub edges: BTreeMap<String, TableSchema>,
}

impl GraphSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a table; node and edge names share one namespace.
    pub fn insert(&mut self, table: TableSchema) -> Result<(), GraphSchemaError> {
        if self.contains(&table.name) {
            return Err(GraphSchemaError::definition(format!(
                "table {} declared more than once",
                table.name
            )));
        }
        if table.is_edge() {
            self.edges.insert(table.name.clone(), table);
        } else {
            self.nodes.insert(table.name.clone(), table);
        }
        Ok(())
    }

    pub fn with_table(mut self, table: TableSchema) -> Result<Self, GraphSchemaError> {
        self.insert(table)?;
        Ok(self)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.nodes.contains_key(name) || self.edges.contains_key(name)
    }

    pub fn node(&self, name: &str) -> Option<&TableSchema> {
        self.nodes.get(name)
    }

    pub fn edge(&self, name: &str) -> Option<&TableSchema> {
        self.edges.get(name)
    }

    pub fn table(&self, name: &str) -> Option<&TableSchema> {
        self.node(name).or_else(|| self.edge(name))
    }

    /// Node tables first, then edge tables, each in name order.
    pub fn tables(&self) -> impl Iterator<Item = &TableSchema> {
        self.nodes.values().chain(self.edges.values())
    }

    pub fn len(&self) -> usize {
        self.nodes.len() + self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }

    /// Checks that every edge endpoint names a node table of this snapshot.
    pub fn validate_endpoints(&self) -> Result<(), GraphSchemaError> {
        for edge in self.edges.values() {
            if let Some((from, to)) = edge.kind.endpoints() {
                for endpoint in [from, to] {
                    if !self.nodes.contains_key(endpoint) {
                        return Err(GraphSchemaError::definition(format!(
                            "edge table {} references unknown node table {endpoint}",
                            edge.name
                        )));
                    }
                }
            }
        }
        Ok(())
    }
}
