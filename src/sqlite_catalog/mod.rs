//! SQLite-backed reference catalog.
//!
//! Stands in for a graph engine's catalog: DDL statements from
//! [`crate::ddl`] are parsed and recorded as rows in three bookkeeping
//! tables, which [`CatalogIntrospection`] then reads back. Every batch runs in
//! one `BEGIN IMMEDIATE` transaction, so a failing statement leaves the
//! catalog exactly as it was.

mod statement;

use std::path::Path;

use rusqlite::{Connection, OptionalExtension, params};
use tracing::debug;

pub use statement::{ColumnDef, DdlStatement, parse_statement};

use crate::{
    catalog::{
        CatalogIndexKind, CatalogIntrospection, ColumnInfo, IndexInfo, StatementExecutor,
        TableInfo,
    },
    config::SqliteCatalogConfig,
    errors::GraphSchemaError,
    schema::TableKind,
};

const CATALOG_SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS graph_catalog_tables (
        name       TEXT PRIMARY KEY,
        kind       TEXT NOT NULL,
        from_table TEXT,
        to_table   TEXT
    );
    CREATE TABLE IF NOT EXISTS graph_catalog_columns (
        table_name     TEXT NOT NULL,
        ordinal        INTEGER NOT NULL,
        column_name    TEXT NOT NULL,
        storage_type   TEXT NOT NULL,
        is_primary_key INTEGER NOT NULL,
        is_unique      INTEGER NOT NULL,
        is_not_null    INTEGER NOT NULL,
        default_value  TEXT,
        PRIMARY KEY (table_name, column_name)
    );
    CREATE TABLE IF NOT EXISTS graph_catalog_indexes (
        index_name  TEXT PRIMARY KEY,
        table_name  TEXT NOT NULL,
        column_name TEXT NOT NULL,
        kind        TEXT NOT NULL
    );
    CREATE TABLE IF NOT EXISTS graph_catalog_history (
        id        INTEGER PRIMARY KEY AUTOINCREMENT,
        statement TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_catalog_columns_table ON graph_catalog_columns(table_name, ordinal);
    CREATE INDEX IF NOT EXISTS idx_catalog_indexes_table ON graph_catalog_indexes(table_name);
"#;

pub struct SqliteCatalog {
    conn: Connection,
}

impl SqliteCatalog {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, GraphSchemaError> {
        Self::open_with_config(path, &SqliteCatalogConfig::default())
    }

    pub fn open_with_config<P: AsRef<Path>>(
        path: P,
        config: &SqliteCatalogConfig,
    ) -> Result<Self, GraphSchemaError> {
        let conn =
            Connection::open(path).map_err(|e| GraphSchemaError::connection(e.to_string()))?;
        Self::from_connection(conn, config)
    }

    pub fn open_in_memory() -> Result<Self, GraphSchemaError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| GraphSchemaError::connection(e.to_string()))?;
        Self::from_connection(conn, &SqliteCatalogConfig::default())
    }

    pub fn from_connection(
        conn: Connection,
        config: &SqliteCatalogConfig,
    ) -> Result<Self, GraphSchemaError> {
        if let Some(capacity) = config.statement_cache_capacity {
            conn.set_prepared_statement_cache_capacity(capacity);
        }
        for (name, value) in &config.pragma_settings {
            conn.pragma_update(None, name, value)
                .map_err(|e| GraphSchemaError::config(format!("pragma {name}: {e}")))?;
        }
        conn.execute_batch(CATALOG_SCHEMA)
            .map_err(|e| GraphSchemaError::connection(e.to_string()))?;
        Ok(Self { conn })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Statements applied so far, oldest first.
    pub fn history(&self) -> Result<Vec<String>, GraphSchemaError> {
        let mut stmt = self
            .conn
            .prepare_cached("SELECT statement FROM graph_catalog_history ORDER BY id")
            .map_err(|e| GraphSchemaError::introspection(e.to_string()))?;
        let rows = stmt
            .query_map([], |row| row.get(0))
            .map_err(|e| GraphSchemaError::introspection(e.to_string()))?;
        let mut statements = Vec::new();
        for row in rows {
            statements.push(row.map_err(|e| GraphSchemaError::introspection(e.to_string()))?);
        }
        Ok(statements)
    }

    fn apply(&self, statement: &str) -> Result<(), GraphSchemaError> {
        let parsed = parse_statement(statement)
            .map_err(|e| GraphSchemaError::execution(statement, e.to_string()))?;
        self.apply_parsed(&parsed)
            .map_err(|e| GraphSchemaError::execution(statement, e))?;
        self.conn
            .execute(
                "INSERT INTO graph_catalog_history(statement) VALUES(?1)",
                params![statement],
            )
            .map_err(|e| GraphSchemaError::execution(statement, e.to_string()))?;
        Ok(())
    }

    fn apply_parsed(&self, statement: &DdlStatement) -> Result<(), String> {
        match statement {
            DdlStatement::CreateNodeTable { name, columns } => {
                self.ensure_absent(name)?;
                self.insert_table(name, &TableKind::Node, columns)
            }
            DdlStatement::CreateRelTable {
                name,
                from,
                to,
                columns,
            } => {
                self.ensure_absent(name)?;
                for endpoint in [from, to] {
                    if self.table_kind(endpoint)? != Some(TableKind::Node) {
                        return Err(format!("edge endpoint {endpoint} is not a node table"));
                    }
                }
                self.insert_table(name, &TableKind::edge(from.as_str(), to.as_str()), columns)
            }
            DdlStatement::DropTable { name } => self.drop_table(name),
            DdlStatement::CreateIndex {
                index,
                table,
                column,
                kind,
            } => self.create_index(index, table, column, *kind),
        }
    }

    fn ensure_absent(&self, name: &str) -> Result<(), String> {
        match self.table_kind(name)? {
            Some(_) => Err(format!("table {name} already exists")),
            None => Ok(()),
        }
    }

    fn table_kind(&self, name: &str) -> Result<Option<TableKind>, String> {
        let row: Option<(String, Option<String>, Option<String>)> = self
            .conn
            .query_row(
                "SELECT kind, from_table, to_table FROM graph_catalog_tables WHERE name=?1",
                params![name],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .optional()
            .map_err(|e| e.to_string())?;
        row.map(|(kind, from, to)| decode_kind(name, &kind, from, to))
            .transpose()
    }

    fn insert_table(&self, name: &str, kind: &TableKind, columns: &[ColumnDef]) -> Result<(), String> {
        let (kind_text, from, to) = match kind {
            TableKind::Node => ("node", None, None),
            TableKind::Edge { from, to } => ("rel", Some(from.as_str()), Some(to.as_str())),
        };
        self.conn
            .execute(
                "INSERT INTO graph_catalog_tables(name, kind, from_table, to_table) VALUES(?1,?2,?3,?4)",
                params![name, kind_text, from, to],
            )
            .map_err(|e| e.to_string())?;
        let mut stmt = self
            .conn
            .prepare_cached(
                "INSERT INTO graph_catalog_columns(table_name, ordinal, column_name, storage_type, \
                 is_primary_key, is_unique, is_not_null, default_value) VALUES(?1,?2,?3,?4,?5,?6,?7,?8)",
            )
            .map_err(|e| e.to_string())?;
        for (ordinal, column) in columns.iter().enumerate() {
            stmt.execute(params![
                name,
                ordinal as i64,
                column.name,
                column.storage_type,
                column.primary_key,
                column.unique,
                column.not_null,
                column.default,
            ])
            .map_err(|e| format!("column {}: {e}", column.name))?;
        }
        Ok(())
    }

    fn drop_table(&self, name: &str) -> Result<(), String> {
        if self.table_kind(name)?.is_none() {
            return Err(format!("table {name} does not exist"));
        }
        let dependent: Option<String> = self
            .conn
            .query_row(
                "SELECT name FROM graph_catalog_tables WHERE kind='rel' AND (from_table=?1 OR to_table=?1) ORDER BY name LIMIT 1",
                params![name],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| e.to_string())?;
        if let Some(edge) = dependent {
            return Err(format!("table {name} is still referenced by edge table {edge}"));
        }
        for sql in [
            "DELETE FROM graph_catalog_indexes WHERE table_name=?1",
            "DELETE FROM graph_catalog_columns WHERE table_name=?1",
            "DELETE FROM graph_catalog_tables WHERE name=?1",
        ] {
            self.conn
                .execute(sql, params![name])
                .map_err(|e| e.to_string())?;
        }
        Ok(())
    }

    fn create_index(
        &self,
        index: &str,
        table: &str,
        column: &str,
        kind: CatalogIndexKind,
    ) -> Result<(), String> {
        if self.table_kind(table)?.is_none() {
            return Err(format!("index {index} targets unknown table {table}"));
        }
        let storage: Option<String> = self
            .conn
            .query_row(
                "SELECT storage_type FROM graph_catalog_columns WHERE table_name=?1 AND column_name=?2",
                params![table, column],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| e.to_string())?;
        let Some(storage) = storage else {
            return Err(format!("index {index} targets unknown column {table}.{column}"));
        };
        if kind == CatalogIndexKind::Vector && !is_fixed_vector(&storage) {
            return Err(format!(
                "vector index {index} requires a fixed-size array column, {table}.{column} is {storage}"
            ));
        }
        if kind == CatalogIndexKind::FullText && storage != "STRING" {
            return Err(format!(
                "full-text index {index} requires a STRING column, {table}.{column} is {storage}"
            ));
        }
        self.conn
            .execute(
                "INSERT INTO graph_catalog_indexes(index_name, table_name, column_name, kind) VALUES(?1,?2,?3,?4)",
                params![index, table, column, encode_index_kind(kind)],
            )
            .map_err(|e| format!("index {index}: {e}"))?;
        Ok(())
    }
}

fn is_fixed_vector(storage: &str) -> bool {
    storage.ends_with(']') && !storage.ends_with("[]")
}

fn decode_kind(
    name: &str,
    kind: &str,
    from: Option<String>,
    to: Option<String>,
) -> Result<TableKind, String> {
    match (kind, from, to) {
        ("node", _, _) => Ok(TableKind::Node),
        ("rel", Some(from), Some(to)) => Ok(TableKind::Edge { from, to }),
        _ => Err(format!("catalog row for {name} has malformed kind {kind:?}")),
    }
}

fn encode_index_kind(kind: CatalogIndexKind) -> &'static str {
    match kind {
        CatalogIndexKind::Plain => "plain",
        CatalogIndexKind::Vector => "vector",
        CatalogIndexKind::FullText => "fts",
    }
}

fn decode_index_kind(kind: &str) -> Result<CatalogIndexKind, GraphSchemaError> {
    match kind {
        "plain" => Ok(CatalogIndexKind::Plain),
        "vector" => Ok(CatalogIndexKind::Vector),
        "fts" => Ok(CatalogIndexKind::FullText),
        other => Err(GraphSchemaError::introspection(format!(
            "unknown index kind {other:?}"
        ))),
    }
}

impl CatalogIntrospection for SqliteCatalog {
    fn list_tables(&self) -> Result<Vec<TableInfo>, GraphSchemaError> {
        let mut stmt = self
            .conn
            .prepare_cached("SELECT name, kind, from_table, to_table FROM graph_catalog_tables ORDER BY name")
            .map_err(|e| GraphSchemaError::introspection(e.to_string()))?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, Option<String>>(2)?,
                    row.get::<_, Option<String>>(3)?,
                ))
            })
            .map_err(|e| GraphSchemaError::introspection(e.to_string()))?;
        let mut tables = Vec::new();
        for row in rows {
            let (name, kind, from, to) =
                row.map_err(|e| GraphSchemaError::introspection(e.to_string()))?;
            let kind = decode_kind(&name, &kind, from, to).map_err(GraphSchemaError::introspection)?;
            tables.push(TableInfo { name, kind });
        }
        Ok(tables)
    }

    fn describe_table(&self, name: &str) -> Result<Vec<ColumnInfo>, GraphSchemaError> {
        let mut stmt = self
            .conn
            .prepare_cached(
                "SELECT column_name, storage_type, is_primary_key, is_unique, is_not_null, default_value \
                 FROM graph_catalog_columns WHERE table_name=?1 ORDER BY ordinal",
            )
            .map_err(|e| GraphSchemaError::introspection(e.to_string()))?;
        let rows = stmt
            .query_map(params![name], |row| {
                Ok(ColumnInfo {
                    column_name: row.get(0)?,
                    storage_type: row.get(1)?,
                    is_primary_key: row.get(2)?,
                    is_unique: row.get(3)?,
                    is_not_null: row.get(4)?,
                    default: row.get(5)?,
                })
            })
            .map_err(|e| GraphSchemaError::introspection(e.to_string()))?;
        let mut columns = Vec::new();
        for row in rows {
            columns.push(row.map_err(|e| GraphSchemaError::introspection(e.to_string()))?);
        }
        Ok(columns)
    }

    fn list_indexes(&self, table: &str) -> Result<Vec<IndexInfo>, GraphSchemaError> {
        let mut stmt = self
            .conn
            .prepare_cached(
                "SELECT index_name, column_name, kind FROM graph_catalog_indexes \
                 WHERE table_name=?1 ORDER BY index_name",
            )
            .map_err(|e| GraphSchemaError::introspection(e.to_string()))?;
        let rows = stmt
            .query_map(params![table], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            })
            .map_err(|e| GraphSchemaError::introspection(e.to_string()))?;
        let mut indexes = Vec::new();
        for row in rows {
            let (index_name, column_name, kind) =
                row.map_err(|e| GraphSchemaError::introspection(e.to_string()))?;
            indexes.push(IndexInfo {
                index_name,
                column_name,
                kind: decode_index_kind(&kind)?,
            });
        }
        Ok(indexes)
    }
}

impl StatementExecutor for SqliteCatalog {
    fn execute(&self, statement: &str) -> Result<(), GraphSchemaError> {
        self.execute_batch(&[statement.to_string()])
    }

    fn execute_batch(&self, statements: &[String]) -> Result<(), GraphSchemaError> {
        if statements.is_empty() {
            return Ok(());
        }
        debug!(count = statements.len(), "applying catalog batch");
        self.conn
            .execute("BEGIN IMMEDIATE", [])
            .map_err(|e| GraphSchemaError::transaction(e.to_string()))?;
        let result = statements.iter().try_for_each(|statement| {
            debug!(%statement, "executing");
            self.apply(statement)
        });
        match result {
            Ok(()) => {
                if let Err(e) = self.conn.execute("COMMIT", []) {
                    debug!(error = %e, "commit failed, rolling back");
                    let _ = self.conn.execute("ROLLBACK", []);
                    return Err(GraphSchemaError::transaction(e.to_string()));
                }
                Ok(())
            }
            Err(err) => {
                let _ = self.conn.execute("ROLLBACK", []);
                Err(err)
            }
        }
    }
}
