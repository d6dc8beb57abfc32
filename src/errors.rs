use thiserror::Error;

use crate::policy::MigrationPolicy;

/// Error type for schema compilation, migration and catalog operations.
#[derive(Debug, Error)]
pub enum GraphSchemaError {
    #[error("definition error: {0}")]
    DefinitionError(String),
    #[error(
        "migration rejected by policy {policy}: table {table}{} ({reason})",
        column_suffix(.column)
    )]
    MigrationRejected {
        policy: MigrationPolicy,
        table: String,
        column: Option<String>,
        reason: String,
    },
    #[error("execution failed for `{statement}`: {message}")]
    ExecutionFailed { statement: String, message: String },
    #[error("catalog introspection error: {0}")]
    IntrospectionError(String),
    #[error("parse error: {0}")]
    ParseError(String),
    #[error("connection error: {0}")]
    ConnectionError(String),
    #[error("transaction error: {0}")]
    TransactionError(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("config error: {0}")]
    ConfigError(String),
}

fn column_suffix(column: &Option<String>) -> String {
    match column {
        Some(column) => format!(" column {column}"),
        None => String::new(),
    }
}

impl GraphSchemaError {
    pub fn definition<T: Into<String>>(msg: T) -> Self {
        GraphSchemaError::DefinitionError(msg.into())
    }

    pub fn rejected<T: Into<String>, R: Into<String>>(
        policy: MigrationPolicy,
        table: T,
        column: Option<String>,
        reason: R,
    ) -> Self {
        GraphSchemaError::MigrationRejected {
            policy,
            table: table.into(),
            column,
            reason: reason.into(),
        }
    }

    pub fn execution<S: Into<String>, M: Into<String>>(statement: S, message: M) -> Self {
        GraphSchemaError::ExecutionFailed {
            statement: statement.into(),
            message: message.into(),
        }
    }

    pub fn introspection<T: Into<String>>(msg: T) -> Self {
        GraphSchemaError::IntrospectionError(msg.into())
    }

    pub fn parse<T: Into<String>>(msg: T) -> Self {
        GraphSchemaError::ParseError(msg.into())
    }

    pub fn connection<T: Into<String>>(msg: T) -> Self {
        GraphSchemaError::ConnectionError(msg.into())
    }

    pub fn transaction<T: Into<String>>(msg: T) -> Self {
        GraphSchemaError::TransactionError(msg.into())
    }

    pub fn invalid_input<T: Into<String>>(msg: T) -> Self {
        GraphSchemaError::InvalidInput(msg.into())
    }

    pub fn config<T: Into<String>>(msg: T) -> Self {
        GraphSchemaError::ConfigError(msg.into())
    }

    pub fn is_rejection(&self) -> bool {
        matches!(self, GraphSchemaError::MigrationRejected { .. })
    }
}
