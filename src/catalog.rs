//! Seams to the live graph engine.
//!
//! The engine's catalog is read through [`CatalogIntrospection`] and
//! statements are run through [`StatementExecutor`]. Both are implemented for
//! `&T`, so one catalog value can be handed to a migration manager in both
//! roles.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{
    ddl::{self, IndexKind},
    errors::GraphSchemaError,
    schema::{ColumnDescriptor, DefaultSpec, GraphSchema, SemanticType, TableKind, TableSchema},
};

/// One table as listed by the catalog.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableInfo {
    pub name: String,
    pub kind: TableKind,
}

impl TableInfo {
    pub fn node(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: TableKind::Node,
        }
    }

    pub fn edge(name: impl Into<String>, from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: TableKind::edge(from, to),
        }
    }
}

/// One column as described by the catalog, in declaration order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub column_name: String,
    pub storage_type: String,
    pub is_primary_key: bool,
    pub is_unique: bool,
    pub is_not_null: bool,
    /// Rendered `DEFAULT` literal, if any.
    pub default: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexInfo {
    pub index_name: String,
    pub column_name: String,
    pub kind: CatalogIndexKind,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogIndexKind {
    Plain,
    Vector,
    FullText,
}

impl From<IndexKind> for CatalogIndexKind {
    fn from(kind: IndexKind) -> Self {
        match kind {
            IndexKind::Plain => CatalogIndexKind::Plain,
            IndexKind::Vector => CatalogIndexKind::Vector,
            IndexKind::FullText => CatalogIndexKind::FullText,
        }
    }
}

pub trait CatalogIntrospection {
    fn list_tables(&self) -> Result<Vec<TableInfo>, GraphSchemaError>;

    fn describe_table(&self, name: &str) -> Result<Vec<ColumnInfo>, GraphSchemaError>;

    /// Secondary indexes of a table. Catalogs without index metadata report none.
    fn list_indexes(&self, _table: &str) -> Result<Vec<IndexInfo>, GraphSchemaError> {
        Ok(Vec::new())
    }
}

pub trait StatementExecutor {
    fn execute(&self, statement: &str) -> Result<(), GraphSchemaError>;

    /// Runs every statement or none of them.
    fn execute_batch(&self, statements: &[String]) -> Result<(), GraphSchemaError>;
}

impl<T: CatalogIntrospection + ?Sized> CatalogIntrospection for &T {
    fn list_tables(&self) -> Result<Vec<TableInfo>, GraphSchemaError> {
        (**self).list_tables()
    }

    fn describe_table(&self, name: &str) -> Result<Vec<ColumnInfo>, GraphSchemaError> {
        (**self).describe_table(name)
    }

    fn list_indexes(&self, table: &str) -> Result<Vec<IndexInfo>, GraphSchemaError> {
        (**self).list_indexes(table)
    }
}

impl<T: StatementExecutor + ?Sized> StatementExecutor for &T {
    fn execute(&self, statement: &str) -> Result<(), GraphSchemaError> {
        (**self).execute(statement)
    }

    fn execute_batch(&self, statements: &[String]) -> Result<(), GraphSchemaError> {
        (**self).execute_batch(statements)
    }
}

/// Rebuilds the live schema, failing on the first catalog error.
pub fn load_schema<C: CatalogIntrospection + ?Sized>(
    catalog: &C,
) -> Result<GraphSchema, GraphSchemaError> {
    let mut schema = GraphSchema::new();
    for table in catalog.list_tables()? {
        let columns = catalog.describe_table(&table.name)?;
        let indexes = catalog.list_indexes(&table.name)?;
        let rebuilt = rebuild_table(&table, &columns, &indexes)?;
        schema
            .insert(rebuilt)
            .map_err(|e| GraphSchemaError::introspection(e.to_string()))?;
    }
    Ok(schema)
}

/// Rebuilds the live schema; any catalog failure yields an empty schema.
///
/// Treating an unreadable catalog as empty makes the next diff propose
/// creating every declared table, which the engine then rejects for tables
/// that do exist.
pub fn introspect_schema<C: CatalogIntrospection + ?Sized>(catalog: &C) -> GraphSchema {
    match load_schema(catalog) {
        Ok(schema) => schema,
        Err(err) => {
            warn!(error = %err, "catalog introspection failed, assuming empty schema");
            GraphSchema::new()
        }
    }
}

fn rebuild_table(
    table: &TableInfo,
    columns: &[ColumnInfo],
    indexes: &[IndexInfo],
) -> Result<TableSchema, GraphSchemaError> {
    let descriptors = columns
        .iter()
        .map(|info| {
            let mut column = ColumnDescriptor::new(
                info.column_name.clone(),
                SemanticType::from_storage(&info.storage_type),
            );
            column.is_identifier = info.is_primary_key;
            column.is_nullable = !info.is_primary_key && !info.is_not_null;
            column.is_unique = !info.is_primary_key && info.is_unique;
            column.default = info.default.clone().map(DefaultSpec::Expression);
            for index in indexes.iter().filter(|i| i.column_name == info.column_name) {
                match index.kind {
                    CatalogIndexKind::Plain => column.is_indexed = true,
                    CatalogIndexKind::Vector => column.is_vector_indexed = true,
                    CatalogIndexKind::FullText => column.is_full_text_search = true,
                }
            }
            column
        })
        .collect();
    ddl::compile_table(&table.name, descriptors, table.kind.clone())
        .map(TableSchema::from)
        .map_err(|e| {
            GraphSchemaError::introspection(format!("catalog table {}: {e}", table.name))
        })
}
