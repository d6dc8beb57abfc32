use std::sync::Arc;

use serde_json::Value;

use super::predicate::{CompareOp, Operand, Predicate};
use crate::{ddl::escape_identifier, schema::ColumnDescriptor};

/// A DSL node that other fragments refer to by alias.
///
/// The alias is fixed when the reference is created and never changes.
pub trait Aliased {
    fn alias(&self) -> &str;
    fn label(&self) -> &str;
    fn columns(&self) -> &[ColumnDescriptor];

    fn column(&self, name: &str) -> Option<&ColumnDescriptor> {
        self.columns().iter().find(|column| column.name == name)
    }

    /// Property reference rooted at this alias. Unknown properties are allowed
    /// and are bound as plain scalars.
    fn prop(&self, name: &str) -> PropertyRef {
        let timestamp = self.column(name).is_some_and(|c| c.is_timestamp());
        PropertyRef {
            alias: self.alias().to_string(),
            property: name.to_string(),
            timestamp,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct NodeRef {
    pub(crate) alias: String,
    pub(crate) label: String,
    pub(crate) columns: Arc<[ColumnDescriptor]>,
}

impl NodeRef {
    pub fn identifier(&self) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|column| column.is_identifier)
    }

    /// `(alias:Label)`
    pub fn pattern(&self) -> String {
        format!("({}:{})", self.alias, escape_identifier(&self.label))
    }
}

impl Aliased for NodeRef {
    fn alias(&self) -> &str {
        &self.alias
    }

    fn label(&self) -> &str {
        &self.label
    }

    fn columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct EdgeRef {
    pub(crate) alias: String,
    pub(crate) label: String,
    pub(crate) columns: Arc<[ColumnDescriptor]>,
    pub(crate) from: NodeRef,
    pub(crate) to: NodeRef,
}

impl EdgeRef {
    pub fn from_node(&self) -> &NodeRef {
        &self.from
    }

    pub fn to_node(&self) -> &NodeRef {
        &self.to
    }

    /// `(a:From)-[r:Rel]->(b:To)`
    pub fn pattern(&self) -> String {
        format!(
            "{}-[{}:{}]->{}",
            self.from.pattern(),
            self.alias,
            escape_identifier(&self.label),
            self.to.pattern()
        )
    }

    /// `(a)-[r:Rel]->(b)`, for endpoints already bound by an earlier clause.
    pub(crate) fn bound_pattern(&self, properties: &str) -> String {
        format!(
            "({})-[{}:{}{properties}]->({})",
            self.from.alias,
            self.alias,
            escape_identifier(&self.label),
            self.to.alias
        )
    }
}

impl Aliased for EdgeRef {
    fn alias(&self) -> &str {
        &self.alias
    }

    fn label(&self) -> &str {
        &self.label
    }

    fn columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }
}

/// `alias.property`, remembering whether the column stores timestamps.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PropertyRef {
    pub alias: String,
    pub property: String,
    pub timestamp: bool,
}

impl PropertyRef {
    pub fn new(alias: impl Into<String>, property: impl Into<String>) -> Self {
        Self {
            alias: alias.into(),
            property: property.into(),
            timestamp: false,
        }
    }

    pub fn expr(&self) -> String {
        format!("{}.{}", self.alias, escape_identifier(&self.property))
    }

    pub fn compare(&self, op: CompareOp, rhs: Operand) -> Predicate {
        Predicate::Comparison {
            lhs: self.clone(),
            op,
            rhs,
        }
    }

    pub fn equals(&self, value: impl Into<Value>) -> Predicate {
        self.compare(CompareOp::Eq, Operand::Value(value.into()))
    }

    pub fn not_equals(&self, value: impl Into<Value>) -> Predicate {
        self.compare(CompareOp::Ne, Operand::Value(value.into()))
    }

    pub fn lt(&self, value: impl Into<Value>) -> Predicate {
        self.compare(CompareOp::Lt, Operand::Value(value.into()))
    }

    pub fn le(&self, value: impl Into<Value>) -> Predicate {
        self.compare(CompareOp::Le, Operand::Value(value.into()))
    }

    pub fn gt(&self, value: impl Into<Value>) -> Predicate {
        self.compare(CompareOp::Gt, Operand::Value(value.into()))
    }

    pub fn ge(&self, value: impl Into<Value>) -> Predicate {
        self.compare(CompareOp::Ge, Operand::Value(value.into()))
    }

    /// Compares against another property instead of a bound value.
    pub fn compare_prop(&self, op: CompareOp, other: &PropertyRef) -> Predicate {
        self.compare(op, Operand::Property(other.clone()))
    }

    pub fn is_null(&self) -> Predicate {
        Predicate::IsNull(self.clone())
    }

    pub fn is_not_null(&self) -> Predicate {
        Predicate::IsNotNull(self.clone())
    }

    pub fn in_list<I, V>(&self, values: I) -> Predicate
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Predicate::In {
            lhs: self.clone(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }
}
