use serde::Serialize;

use super::context::QueryContext;
use super::predicate::Predicate;
use super::projection::{ReturnItem, SortOrder};
use super::reference::{Aliased, EdgeRef, NodeRef, PropertyRef};
use crate::{errors::GraphSchemaError, fragment::CypherFragment, registry::PropertyMap};

/// Chains clauses into one statement.
///
/// Consecutive `filter` calls are AND-ed into a single `WHERE` attached to the
/// preceding clause.
#[derive(Clone)]
pub struct QueryBuilder {
    ctx: QueryContext,
    parts: Vec<CypherFragment>,
    pending: Vec<Predicate>,
}

impl QueryBuilder {
    pub fn new(ctx: &QueryContext) -> Self {
        Self {
            ctx: ctx.clone(),
            parts: Vec::new(),
            pending: Vec::new(),
        }
    }

    pub fn context(&self) -> &QueryContext {
        &self.ctx
    }

    fn push(mut self, fragment: CypherFragment) -> Self {
        self.flush_where();
        if !fragment.is_empty() {
            self.parts.push(fragment);
        }
        self
    }

    fn flush_where(&mut self) {
        if let Some(predicate) = Predicate::all(self.pending.drain(..)) {
            let clause = self.ctx.where_(&predicate);
            self.parts.push(clause);
        }
    }

    pub fn match_node(self, node: &NodeRef) -> Self {
        let fragment = self.ctx.match_node(node);
        self.push(fragment)
    }

    pub fn match_edge(self, edge: &EdgeRef) -> Self {
        let fragment = self.ctx.match_edge(edge);
        self.push(fragment)
    }

    pub fn optional_match_node(self, node: &NodeRef) -> Self {
        let fragment = self.ctx.optional_match_node(node);
        self.push(fragment)
    }

    pub fn optional_match_edge(self, edge: &EdgeRef) -> Self {
        let fragment = self.ctx.optional_match_edge(edge);
        self.push(fragment)
    }

    pub fn filter(mut self, predicate: Predicate) -> Self {
        self.pending.push(predicate);
        self
    }

    pub fn create_node(self, node: &NodeRef, properties: &PropertyMap) -> Self {
        let fragment = self.ctx.create_node(node, properties);
        self.push(fragment)
    }

    pub fn create_instance<T: Serialize + ?Sized>(
        self,
        node: &NodeRef,
        instance: &T,
    ) -> Result<Self, GraphSchemaError> {
        let fragment = self.ctx.create_instance(node, instance)?;
        Ok(self.push(fragment))
    }

    pub fn create_edge(self, edge: &EdgeRef, properties: &PropertyMap) -> Self {
        let fragment = self.ctx.create_edge(edge, properties);
        self.push(fragment)
    }

    pub fn merge_node(
        self,
        node: &NodeRef,
        properties: &PropertyMap,
    ) -> Result<Self, GraphSchemaError> {
        let fragment = self.ctx.merge_node(node, properties)?;
        Ok(self.push(fragment))
    }

    pub fn merge_edge(self, edge: &EdgeRef, properties: &PropertyMap) -> Self {
        let fragment = self.ctx.merge_edge(edge, properties);
        self.push(fragment)
    }

    pub fn set<A: Aliased>(self, target: &A, properties: &PropertyMap) -> Self {
        let fragment = self.ctx.set(target, properties);
        self.push(fragment)
    }

    pub fn delete_node(self, node: &NodeRef, detach: bool) -> Self {
        let fragment = self.ctx.delete_node(node, detach);
        self.push(fragment)
    }

    pub fn delete_edge(self, edge: &EdgeRef) -> Self {
        let fragment = self.ctx.delete_edge(edge);
        self.push(fragment)
    }

    pub fn with<I: IntoIterator<Item = ReturnItem>>(self, items: I) -> Self {
        let fragment = self.ctx.with(items);
        self.push(fragment)
    }

    pub fn returning<I: IntoIterator<Item = ReturnItem>>(self, items: I) -> Self {
        let fragment = self.ctx.return_(items);
        self.push(fragment)
    }

    pub fn returning_distinct<I: IntoIterator<Item = ReturnItem>>(self, items: I) -> Self {
        let fragment = self.ctx.return_distinct(items);
        self.push(fragment)
    }

    pub fn order_by<I: IntoIterator<Item = (PropertyRef, SortOrder)>>(self, keys: I) -> Self {
        let fragment = self.ctx.order_by(keys);
        self.push(fragment)
    }

    pub fn skip(self, count: u64) -> Self {
        let fragment = self.ctx.skip(count);
        self.push(fragment)
    }

    pub fn limit(self, count: u64) -> Self {
        let fragment = self.ctx.limit(count);
        self.push(fragment)
    }

    /// Appends a prebuilt fragment verbatim.
    pub fn fragment(self, fragment: CypherFragment) -> Self {
        self.push(fragment)
    }

    pub fn build(mut self) -> CypherFragment {
        self.flush_where();
        CypherFragment::join(self.parts, " ")
    }
}

impl QueryContext {
    pub fn query(&self) -> QueryBuilder {
        QueryBuilder::new(self)
    }
}
