use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::types::SemanticType;
use crate::ddl;

/// Default value attached to a column definition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum DefaultSpec {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    CurrentTimestamp,
    /// Raw expression emitted verbatim.
    Expression(String),
}

impl DefaultSpec {
    /// Literal form used after `DEFAULT` in a column clause.
    pub fn render(&self) -> String {
        match self {
            DefaultSpec::Null => "NULL".into(),
            DefaultSpec::Bool(value) => value.to_string(),
            DefaultSpec::Int(value) => value.to_string(),
            DefaultSpec::Float(value) => {
                let text = value.to_string();
                if text.contains('.') || text.contains('e') || !value.is_finite() {
                    text
                } else {
                    format!("{text}.0")
                }
            }
            DefaultSpec::String(value) => ddl::quote_string(value),
            DefaultSpec::CurrentTimestamp => "current_timestamp()".into(),
            DefaultSpec::Expression(expr) => expr.clone(),
        }
    }
}

/// Constraint flags as reported by a catalog. Compared as a set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ColumnConstraint {
    PrimaryKey,
    Unique,
    NotNull,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    pub name: String,
    pub semantic_type: SemanticType,
    pub is_identifier: bool,
    pub is_nullable: bool,
    pub is_indexed: bool,
    pub is_unique: bool,
    pub is_vector_indexed: bool,
    pub is_full_text_search: bool,
    pub default: Option<DefaultSpec>,
}

impl ColumnDescriptor {
    pub fn new(name: impl Into<String>, semantic_type: SemanticType) -> Self {
        Self {
            name: name.into(),
            semantic_type,
            is_identifier: false,
            is_nullable: false,
            is_indexed: false,
            is_unique: false,
            is_vector_indexed: false,
            is_full_text_search: false,
            default: None,
        }
    }

    pub fn identifier(mut self) -> Self {
        self.is_identifier = true;
        self.is_nullable = false;
        self
    }

    pub fn nullable(mut self) -> Self {
        self.is_nullable = true;
        self
    }

    pub fn indexed(mut self) -> Self {
        self.is_indexed = true;
        self
    }

    pub fn unique(mut self) -> Self {
        self.is_unique = true;
        self
    }

    pub fn vector_indexed(mut self) -> Self {
        self.is_vector_indexed = true;
        self
    }

    pub fn full_text(mut self) -> Self {
        self.is_full_text_search = true;
        self
    }

    pub fn with_default(mut self, default: DefaultSpec) -> Self {
        self.default = Some(default);
        self
    }

    pub fn storage_type(&self) -> String {
        self.semantic_type.storage_type()
    }

    pub fn is_timestamp(&self) -> bool {
        self.semantic_type.is_timestamp()
    }

    /// Constraint set implied by the descriptor flags.
    pub fn constraints(&self) -> BTreeSet<ColumnConstraint> {
        let mut set = BTreeSet::new();
        if self.is_identifier {
            set.insert(ColumnConstraint::PrimaryKey);
            return set;
        }
        if self.is_unique {
            set.insert(ColumnConstraint::Unique);
        }
        if !self.is_nullable {
            set.insert(ColumnConstraint::NotNull);
        }
        set
    }

    /// Structural comparison used by the diff engine: name, storage type and
    /// constraint set. Index flags and defaults are ignored.
    pub fn same_structure(&self, other: &ColumnDescriptor) -> bool {
        self.name == other.name
            && self.storage_type() == other.storage_type()
            && self.constraints() == other.constraints()
    }
}
