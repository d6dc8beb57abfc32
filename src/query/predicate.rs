use std::fmt;

use serde_json::Value;

use super::reference::{EdgeRef, PropertyRef};
use crate::{
    allocator::NameAllocator,
    fragment::{Bindings, CypherFragment},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CompareOp {
    pub fn symbol(self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::Ne => "<>",
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
            CompareOp::Gt => ">",
            CompareOp::Ge => ">=",
        }
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Operand {
    Value(Value),
    Property(PropertyRef),
}

/// Sub-pattern checked by `EXISTS { MATCH ... }`.
#[derive(Clone, Debug, PartialEq)]
pub struct Pattern {
    pub edge: EdgeRef,
    pub filter: Option<Box<Predicate>>,
}

impl Pattern {
    pub fn edge(edge: &EdgeRef) -> Self {
        Self {
            edge: edge.clone(),
            filter: None,
        }
    }

    pub fn filter(mut self, predicate: Predicate) -> Self {
        self.filter = Some(Box::new(match self.filter.take() {
            Some(existing) => existing.and(predicate),
            None => predicate,
        }));
        self
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Predicate {
    Comparison {
        lhs: PropertyRef,
        op: CompareOp,
        rhs: Operand,
    },
    IsNull(PropertyRef),
    IsNotNull(PropertyRef),
    In {
        lhs: PropertyRef,
        values: Vec<Value>,
    },
    And(Box<Predicate>, Box<Predicate>),
    Or(Box<Predicate>, Box<Predicate>),
    Not(Box<Predicate>),
    Exists(Pattern),
    /// Caller-supplied text and bindings, emitted as-is.
    Custom(CypherFragment),
}

impl Predicate {
    pub fn and(self, other: Predicate) -> Predicate {
        Predicate::And(Box::new(self), Box::new(other))
    }

    pub fn or(self, other: Predicate) -> Predicate {
        Predicate::Or(Box::new(self), Box::new(other))
    }

    pub fn negate(self) -> Predicate {
        Predicate::Not(Box::new(self))
    }

    pub fn exists(pattern: Pattern) -> Predicate {
        Predicate::Exists(pattern)
    }

    pub fn not_exists(pattern: Pattern) -> Predicate {
        Predicate::Exists(pattern).negate()
    }

    pub fn custom(text: impl Into<String>, bindings: Bindings) -> Predicate {
        Predicate::Custom(CypherFragment::with_bindings(text, bindings))
    }

    /// Left-folds with AND; `None` for an empty input.
    pub fn all<I: IntoIterator<Item = Predicate>>(predicates: I) -> Option<Predicate> {
        predicates.into_iter().reduce(Predicate::and)
    }

    /// Left-folds with OR; `None` for an empty input.
    pub fn any<I: IntoIterator<Item = Predicate>>(predicates: I) -> Option<Predicate> {
        predicates.into_iter().reduce(Predicate::or)
    }
}

impl std::ops::Not for Predicate {
    type Output = Predicate;

    fn not(self) -> Predicate {
        self.negate()
    }
}

/// Compiles a predicate tree into condition text plus bindings.
///
/// Each node yields one fragment; binary connectives are parenthesized so the
/// tree's shape survives regardless of operator precedence.
pub fn compile_predicate(allocator: &NameAllocator, predicate: &Predicate) -> CypherFragment {
    match predicate {
        Predicate::Comparison { lhs, op, rhs } => match rhs {
            Operand::Value(value) => {
                let (placeholder, bindings) = bind(allocator, lhs, value);
                CypherFragment::with_bindings(format!("{} {op} {placeholder}", lhs.expr()), bindings)
            }
            Operand::Property(other) => {
                CypherFragment::new(format!("{} {op} {}", lhs.expr(), other.expr()))
            }
        },
        Predicate::IsNull(property) => CypherFragment::new(format!("{} IS NULL", property.expr())),
        Predicate::IsNotNull(property) => {
            CypherFragment::new(format!("{} IS NOT NULL", property.expr()))
        }
        Predicate::In { lhs, values } => {
            let name = allocator.param(&lhs.alias, &lhs.property);
            let mut bindings = Bindings::new();
            bindings.insert(name.clone(), Value::Array(values.clone()));
            CypherFragment::with_bindings(format!("{} IN ${name}", lhs.expr()), bindings)
        }
        Predicate::And(left, right) => binary(allocator, left, right, "AND"),
        Predicate::Or(left, right) => binary(allocator, left, right, "OR"),
        Predicate::Not(inner) => compile_predicate(allocator, inner).wrap("NOT (", ")"),
        Predicate::Exists(pattern) => {
            let mut body = CypherFragment::new(format!("MATCH {}", pattern.edge.pattern()));
            if let Some(filter) = &pattern.filter {
                body = body.then(compile_predicate(allocator, filter).wrap("WHERE ", ""));
            }
            body.wrap("EXISTS { ", " }")
        }
        Predicate::Custom(fragment) => fragment.clone(),
    }
}

fn binary(
    allocator: &NameAllocator,
    left: &Predicate,
    right: &Predicate,
    connective: &str,
) -> CypherFragment {
    let left = compile_predicate(allocator, left);
    let right = compile_predicate(allocator, right);
    CypherFragment::join([left, right], &format!(" {connective} ")).wrap("(", ")")
}

/// Allocates a parameter for `value` and returns the placeholder expression.
///
/// Timestamp columns wrap the placeholder in `timestamp(...)`.
pub(crate) fn bind(
    allocator: &NameAllocator,
    property: &PropertyRef,
    value: &Value,
) -> (String, Bindings) {
    let name = allocator.param_for_value(&property.alias, &property.property, value);
    let placeholder = if property.timestamp && !value.is_null() {
        format!("timestamp(${name})")
    } else {
        format!("${name}")
    };
    let mut bindings = Bindings::new();
    bindings.insert(name, value.clone());
    (placeholder, bindings)
}
