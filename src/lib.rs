//! Typed schema compiler, query-fragment algebra and migration engine for
//! property-graph stores.
//!
//! Declare node and edge tables once through [`NodeType`] / [`EdgeType`] (or
//! [`TypeDescriptor`] values), compile them with [`SchemaRegistry`], then:
//!
//! - emit `CREATE NODE TABLE` / `CREATE REL TABLE` DDL and index statements,
//! - compose parameterized queries through a [`QueryContext`],
//! - reconcile a live catalog with the declared schema through a
//!   [`MigrationManager`] gated by a [`MigrationPolicy`].
//!
//! Run Criterion benchmarks with `cargo bench` to inspect reports under `target/criterion`.

pub mod allocator;
pub mod catalog;
pub mod config;
pub mod ddl;
pub mod diff;
pub mod errors;
pub mod fragment;
pub mod migration;
pub mod policy;
pub mod query;
pub mod registry;
pub mod schema;
#[cfg(feature = "sqlite-catalog")]
pub mod sqlite_catalog;

pub use crate::allocator::NameAllocator;
pub use crate::catalog::{
    CatalogIndexKind, CatalogIntrospection, ColumnInfo, IndexInfo, StatementExecutor, TableInfo,
    introspect_schema, load_schema,
};
#[cfg(feature = "sqlite-catalog")]
pub use crate::config::open_catalog;
pub use crate::config::{AllocatorConfig, SchemaConfig, SqliteCatalogConfig};
pub use crate::ddl::{CompiledTable, IndexKind, compile_table, drop_table_statement};
pub use crate::diff::{DestructiveChange, DestructiveReason, SchemaDiff, diff};
pub use crate::errors::GraphSchemaError;
pub use crate::fragment::{BindingCollision, Bindings, CypherFragment};
pub use crate::migration::{
    DiffSummary, MigrationManager, MigrationPlan, MigrationReport, MigrationState,
};
pub use crate::policy::MigrationPolicy;
pub use crate::query::{
    Aggregate, Aliased, CompareOp, EdgeRef, NodeRef, Operand, Pattern, Predicate, PropertyRef,
    QueryBuilder, QueryContext, ReturnItem, SortOrder,
};
pub use crate::registry::{
    EdgeType, GraphType, NodeType, PropertyMap, SchemaRegistry, TypeDescriptor, to_property_map,
};
pub use crate::schema::{
    ColumnConstraint, ColumnDescriptor, DefaultSpec, GraphSchema, SemanticType, TableKind,
    TableSchema,
};
#[cfg(feature = "sqlite-catalog")]
pub use crate::sqlite_catalog::SqliteCatalog;
