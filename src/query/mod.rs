//! Query fragment algebra.
//!
//! References ([`NodeRef`], [`EdgeRef`]) get their aliases from the context's
//! allocator when created; clauses and predicates turn them into
//! [`CypherFragment`](crate::fragment::CypherFragment)s whose bindings use
//! freshly minted parameter names, so fragments compose without collisions.

mod builder;
mod context;
mod predicate;
mod projection;
mod reference;

pub use builder::QueryBuilder;
pub use context::QueryContext;
pub use predicate::{CompareOp, Operand, Pattern, Predicate, compile_predicate};
pub use projection::{Aggregate, AggregateFn, Projection, ReturnItem, SortOrder};
pub use reference::{Aliased, EdgeRef, NodeRef, PropertyRef};
