//! DDL compiler.
//!
//! Turns a table name plus its column descriptors into the `CREATE NODE TABLE` /
//! `CREATE REL TABLE` statement, the auxiliary index statements and the
//! normalized column list used by the diff engine and the query builder.
//! Compilation is a pure function of its input: the same descriptors always
//! produce byte-identical statements.

use ahash::AHashSet;

use crate::{
    errors::GraphSchemaError,
    schema::{ColumnDescriptor, TableKind},
};

const RESERVED_WORDS: &[&str] = &[
    "ADD", "ALL", "ALTER", "AND", "AS", "ASC", "ASCENDING", "BEGIN", "BY", "CALL", "CASE",
    "CAST", "COLUMN", "COMMIT", "CONTAINS", "COPY", "COUNT", "CREATE", "CYCLE", "DATABASE",
    "DEFAULT", "DELETE", "DESC", "DESCENDING", "DETACH", "DISTINCT", "DROP", "ELSE", "END",
    "ENDS", "EXISTS", "EXPLAIN", "FALSE", "FROM", "GLOB", "GROUP", "HEADERS", "IN", "INDEX",
    "INSTALL", "IS", "KEY", "LIMIT", "LOAD", "MACRO", "MATCH", "MERGE", "NODE", "NOT", "NULL",
    "ON", "ONLY", "OPTIONAL", "OR", "ORDER", "PRIMARY", "PROFILE", "REL", "RETURN", "ROLLBACK",
    "SET", "SKIP", "STARTS", "TABLE", "THEN", "TO", "TRANSACTION", "TRUE", "UNION", "UNIQUE",
    "UNWIND", "USE", "WHEN", "WHERE", "WITH", "XOR",
];

/// Kinds of auxiliary index, in emission order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IndexKind {
    Plain,
    Vector,
    FullText,
}

impl IndexKind {
    fn suffix(self) -> &'static str {
        match self {
            IndexKind::Plain => "index",
            IndexKind::Vector => "vector",
            IndexKind::FullText => "fts",
        }
    }
}

/// Output of [`compile_table`].
#[derive(Clone, Debug, PartialEq)]
pub struct CompiledTable {
    pub name: String,
    pub kind: TableKind,
    /// CREATE statement first, then index statements.
    pub statements: Vec<String>,
    pub columns: Vec<ColumnDescriptor>,
}

pub fn compile_table(
    name: &str,
    columns: Vec<ColumnDescriptor>,
    kind: TableKind,
) -> Result<CompiledTable, GraphSchemaError> {
    if name.trim().is_empty() {
        return Err(GraphSchemaError::definition("table name must be set"));
    }
    let columns = normalize_columns(name, columns, &kind)?;
    let mut statements = Vec::with_capacity(1 + columns.len());
    statements.push(create_statement(name, &columns, &kind));
    statements.extend(index_statements(name, &columns));
    Ok(CompiledTable {
        name: name.to_string(),
        kind,
        statements,
        columns,
    })
}

fn normalize_columns(
    table: &str,
    columns: Vec<ColumnDescriptor>,
    kind: &TableKind,
) -> Result<Vec<ColumnDescriptor>, GraphSchemaError> {
    let mut seen = AHashSet::new();
    for column in &columns {
        if column.name.trim().is_empty() {
            return Err(GraphSchemaError::definition(format!(
                "table {table} has a column without a name"
            )));
        }
        if !seen.insert(column.name.as_str()) {
            return Err(GraphSchemaError::definition(format!(
                "table {table} declares column {} more than once",
                column.name
            )));
        }
        if column.is_vector_indexed && !column.semantic_type.is_vector() {
            return Err(GraphSchemaError::definition(format!(
                "vector index on {table}.{} requires a fixed-size vector column",
                column.name
            )));
        }
        if column.is_full_text_search && column.storage_type() != "STRING" {
            return Err(GraphSchemaError::definition(format!(
                "full-text index on {table}.{} requires a STRING column, found {}",
                column.name,
                column.storage_type()
            )));
        }
    }
    let identifiers = columns.iter().filter(|c| c.is_identifier).count();
    match kind {
        TableKind::Node => {
            if columns.is_empty() {
                return Err(GraphSchemaError::definition(format!(
                    "node table {table} has no columns"
                )));
            }
            if identifiers == 0 {
                return Err(GraphSchemaError::definition(format!(
                    "node table {table} is missing an identifier column"
                )));
            }
            if identifiers > 1 {
                return Err(GraphSchemaError::definition(format!(
                    "node table {table} declares {identifiers} identifier columns"
                )));
            }
        }
        TableKind::Edge { from, to } => {
            if from.trim().is_empty() || to.trim().is_empty() {
                return Err(GraphSchemaError::definition(format!(
                    "edge table {table} needs both endpoints"
                )));
            }
            if identifiers > 0 {
                return Err(GraphSchemaError::definition(format!(
                    "edge table {table} cannot declare an identifier column"
                )));
            }
        }
    }
    Ok(columns
        .into_iter()
        .map(|mut column| {
            if column.is_identifier {
                column.is_nullable = false;
                column.is_unique = false;
            }
            column
        })
        .collect())
}

fn create_statement(name: &str, columns: &[ColumnDescriptor], kind: &TableKind) -> String {
    let clauses: Vec<String> = columns.iter().map(column_clause).collect();
    match kind {
        TableKind::Node => format!(
            "CREATE NODE TABLE {} ({})",
            escape_identifier(name),
            clauses.join(", ")
        ),
        TableKind::Edge { from, to } => {
            let mut body = format!(
                "FROM {} TO {}",
                escape_identifier(from),
                escape_identifier(to)
            );
            if !clauses.is_empty() {
                body.push_str(", ");
                body.push_str(&clauses.join(", "));
            }
            format!("CREATE REL TABLE {}({body})", escape_identifier(name))
        }
    }
}

/// `<name> <storage>[ PRIMARY KEY][ UNIQUE][ NOT NULL][ DEFAULT <value>]`
pub fn column_clause(column: &ColumnDescriptor) -> String {
    let mut clause = format!(
        "{} {}",
        escape_identifier(&column.name),
        column.storage_type()
    );
    if column.is_identifier {
        clause.push_str(" PRIMARY KEY");
    } else {
        if column.is_unique {
            clause.push_str(" UNIQUE");
        }
        if !column.is_nullable {
            clause.push_str(" NOT NULL");
        }
    }
    if let Some(default) = &column.default {
        clause.push_str(" DEFAULT ");
        clause.push_str(&default.render());
    }
    clause
}

fn index_statements(table: &str, columns: &[ColumnDescriptor]) -> Vec<String> {
    let mut statements = Vec::new();
    for column in columns {
        if column.is_indexed {
            statements.push(format!(
                "CREATE INDEX {} ON {}({})",
                escape_identifier(&index_name(table, &column.name, IndexKind::Plain)),
                escape_identifier(table),
                escape_identifier(&column.name)
            ));
        }
        if column.is_vector_indexed {
            statements.push(format!(
                "CALL CREATE_VECTOR_INDEX({}, {}, {})",
                quote_string(table),
                quote_string(&index_name(table, &column.name, IndexKind::Vector)),
                quote_string(&column.name)
            ));
        }
        if column.is_full_text_search {
            statements.push(format!(
                "CALL CREATE_FTS_INDEX({}, {}, [{}])",
                quote_string(table),
                quote_string(&index_name(table, &column.name, IndexKind::FullText)),
                quote_string(&column.name)
            ));
        }
    }
    statements
}

/// `<table>_<column>_<kind>_idx`, lower-cased, with every character outside
/// `[a-z0-9_]` replaced by `_`.
pub fn index_name(table: &str, column: &str, kind: IndexKind) -> String {
    format!("{table}_{column}_{}_idx", kind.suffix())
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect()
}

/// Single-quoted string literal with backslashes and quotes backslash-escaped.
pub fn quote_string(value: &str) -> String {
    format!("'{}'", value.replace('\\', "\\\\").replace('\'', "\\'"))
}

pub fn drop_table_statement(name: &str) -> String {
    format!("DROP TABLE {}", escape_identifier(name))
}

pub fn is_reserved_word(word: &str) -> bool {
    RESERVED_WORDS
        .iter()
        .any(|reserved| reserved.eq_ignore_ascii_case(word))
}

/// Quotes an identifier with backticks when it is a reserved word or not a
/// plain `[A-Za-z_][A-Za-z0-9_]*` name.
pub fn escape_identifier(name: &str) -> String {
    let plain = name
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if plain && !is_reserved_word(name) {
        name.to_string()
    } else {
        format!("`{}`", name.replace('`', "``"))
    }
}
