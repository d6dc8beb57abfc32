use std::sync::Arc;

use serde::Serialize;

use super::predicate::{Predicate, bind, compile_predicate};
use super::projection::{ReturnItem, SortOrder};
use super::reference::{Aliased, EdgeRef, NodeRef, PropertyRef};
use crate::{
    allocator::NameAllocator,
    ddl::escape_identifier,
    errors::GraphSchemaError,
    fragment::{Bindings, CypherFragment},
    registry::{EdgeType, GraphType, NodeType, PropertyMap, to_property_map},
    schema::{ColumnDescriptor, TableKind, TableSchema},
};

/// Entry point of the query DSL.
///
/// Every reference and clause built through one context draws its names from
/// the same [`NameAllocator`], so any fragments built here can be composed
/// into one query without alias or parameter collisions. Cloning a context
/// shares the allocator.
#[derive(Clone, Default)]
pub struct QueryContext {
    allocator: Arc<NameAllocator>,
}

impl QueryContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_allocator(allocator: Arc<NameAllocator>) -> Self {
        Self { allocator }
    }

    pub fn allocator(&self) -> &Arc<NameAllocator> {
        &self.allocator
    }

    pub fn node<T: NodeType>(&self) -> NodeRef {
        self.node_ref(&T::table_name(), T::columns())
    }

    pub fn node_for(&self, table: &TableSchema) -> Result<NodeRef, GraphSchemaError> {
        if table.is_edge() {
            return Err(GraphSchemaError::definition(format!(
                "{} is an edge table, not a node table",
                table.name
            )));
        }
        Ok(self.node_ref(&table.name, table.columns.clone()))
    }

    /// Edge reference between two existing node references.
    ///
    /// The endpoint labels must match the edge declaration.
    pub fn edge<T: EdgeType>(
        &self,
        from: &NodeRef,
        to: &NodeRef,
    ) -> Result<EdgeRef, GraphSchemaError> {
        let kind = TableKind::edge(T::From::table_name(), T::To::table_name());
        self.edge_ref(&T::table_name(), &kind, T::columns(), from, to)
    }

    pub fn edge_for(
        &self,
        table: &TableSchema,
        from: &NodeRef,
        to: &NodeRef,
    ) -> Result<EdgeRef, GraphSchemaError> {
        if !table.is_edge() {
            return Err(GraphSchemaError::definition(format!(
                "{} is a node table, not an edge table",
                table.name
            )));
        }
        self.edge_ref(&table.name, &table.kind, table.columns.clone(), from, to)
    }

    fn node_ref(&self, label: &str, columns: Vec<ColumnDescriptor>) -> NodeRef {
        NodeRef {
            alias: self.allocator.alias(label),
            label: label.to_string(),
            columns: columns.into(),
        }
    }

    fn edge_ref(
        &self,
        label: &str,
        kind: &TableKind,
        columns: Vec<ColumnDescriptor>,
        from: &NodeRef,
        to: &NodeRef,
    ) -> Result<EdgeRef, GraphSchemaError> {
        if let Some((expected_from, expected_to)) = kind.endpoints() {
            if from.label != expected_from || to.label != expected_to {
                return Err(GraphSchemaError::definition(format!(
                    "edge {label} connects {expected_from} to {expected_to}, got {} to {}",
                    from.label, to.label
                )));
            }
        }
        Ok(EdgeRef {
            alias: self.allocator.alias(label),
            label: label.to_string(),
            columns: columns.into(),
            from: from.clone(),
            to: to.clone(),
        })
    }

    /// `MATCH (a:Label)`
    pub fn match_node(&self, node: &NodeRef) -> CypherFragment {
        CypherFragment::new(format!("MATCH {}", node.pattern()))
    }

    /// `MATCH (a:From)-[r:Rel]->(b:To)`
    pub fn match_edge(&self, edge: &EdgeRef) -> CypherFragment {
        CypherFragment::new(format!("MATCH {}", edge.pattern()))
    }

    pub fn optional_match_node(&self, node: &NodeRef) -> CypherFragment {
        CypherFragment::new(format!("OPTIONAL MATCH {}", node.pattern()))
    }

    pub fn optional_match_edge(&self, edge: &EdgeRef) -> CypherFragment {
        CypherFragment::new(format!("OPTIONAL MATCH {}", edge.pattern()))
    }

    /// `WHERE <condition>`
    pub fn where_(&self, predicate: &Predicate) -> CypherFragment {
        self.condition(predicate).wrap("WHERE ", "")
    }

    /// Condition text only, for embedding in other clauses.
    pub fn condition(&self, predicate: &Predicate) -> CypherFragment {
        compile_predicate(&self.allocator, predicate)
    }

    /// `CREATE (a:Label {k: $p, ...})`
    pub fn create_node(&self, node: &NodeRef, properties: &PropertyMap) -> CypherFragment {
        let map = self.property_map(node, properties);
        CypherFragment::with_bindings(
            format!(
                "CREATE ({}:{}{})",
                node.alias,
                escape_identifier(&node.label),
                map.text
            ),
            map.bindings,
        )
    }

    pub fn create_instance<T: Serialize + ?Sized>(
        &self,
        node: &NodeRef,
        instance: &T,
    ) -> Result<CypherFragment, GraphSchemaError> {
        Ok(self.create_node(node, &to_property_map(instance)?))
    }

    /// `CREATE (a)-[r:Rel {k: $p}]->(b)`; both endpoints must already be bound.
    pub fn create_edge(&self, edge: &EdgeRef, properties: &PropertyMap) -> CypherFragment {
        let map = self.property_map(edge, properties);
        CypherFragment::with_bindings(
            format!("CREATE {}", edge.bound_pattern(&map.text)),
            map.bindings,
        )
    }

    /// `MERGE (a:Label {id: $p}) [ON CREATE SET ...] [ON MATCH SET ...]`
    ///
    /// The node is keyed on its identifier column, which must be present in
    /// `properties`. Remaining properties are applied on both create and match
    /// through the same parameters.
    pub fn merge_node(
        &self,
        node: &NodeRef,
        properties: &PropertyMap,
    ) -> Result<CypherFragment, GraphSchemaError> {
        let key = node.identifier().ok_or_else(|| {
            GraphSchemaError::definition(format!("{} has no identifier column", node.label))
        })?;
        let key_value = properties.get(&key.name).ok_or_else(|| {
            GraphSchemaError::definition(format!(
                "merge on {} requires a value for identifier {}",
                node.label, key.name
            ))
        })?;
        let (placeholder, bindings) = bind(&self.allocator, &node.prop(&key.name), key_value);
        let head = CypherFragment::with_bindings(
            format!(
                "MERGE ({}:{} {{{}: {placeholder}}})",
                node.alias,
                escape_identifier(&node.label),
                escape_identifier(&key.name)
            ),
            bindings,
        );
        let mut rest = properties.clone();
        rest.remove(&key.name);
        Ok(head.then(self.merge_updates(node, &rest)))
    }

    /// `MERGE (a)-[r:Rel]->(b) [ON CREATE SET ...] [ON MATCH SET ...]`
    pub fn merge_edge(&self, edge: &EdgeRef, properties: &PropertyMap) -> CypherFragment {
        CypherFragment::new(format!("MERGE {}", edge.bound_pattern("")))
            .then(self.merge_updates(edge, properties))
    }

    fn merge_updates<A: Aliased>(&self, target: &A, properties: &PropertyMap) -> CypherFragment {
        if properties.is_empty() {
            return CypherFragment::default();
        }
        let items = self.set_items(target, properties);
        let on_match = CypherFragment::new(format!("ON MATCH SET {}", items.text));
        items.wrap("ON CREATE SET ", "").then(on_match)
    }

    /// `SET a.k = $p, ...`; an empty map yields an empty fragment.
    pub fn set<A: Aliased>(&self, target: &A, properties: &PropertyMap) -> CypherFragment {
        if properties.is_empty() {
            return CypherFragment::default();
        }
        self.set_items(target, properties).wrap("SET ", "")
    }

    pub fn set_instance<A: Aliased, T: Serialize + ?Sized>(
        &self,
        target: &A,
        instance: &T,
    ) -> Result<CypherFragment, GraphSchemaError> {
        Ok(self.set(target, &to_property_map(instance)?))
    }

    /// `DELETE a`, or `DETACH DELETE a` to drop attached edges as well.
    pub fn delete_node(&self, node: &NodeRef, detach: bool) -> CypherFragment {
        if detach {
            CypherFragment::new(format!("DETACH DELETE {}", node.alias))
        } else {
            CypherFragment::new(format!("DELETE {}", node.alias))
        }
    }

    pub fn delete_edge(&self, edge: &EdgeRef) -> CypherFragment {
        CypherFragment::new(format!("DELETE {}", edge.alias))
    }

    /// `RETURN item, ...`
    pub fn return_<I>(&self, items: I) -> CypherFragment
    where
        I: IntoIterator<Item = ReturnItem>,
    {
        self.projection("RETURN", items, false)
    }

    pub fn return_distinct<I>(&self, items: I) -> CypherFragment
    where
        I: IntoIterator<Item = ReturnItem>,
    {
        self.projection("RETURN", items, true)
    }

    /// `WITH item, ...`
    pub fn with<I>(&self, items: I) -> CypherFragment
    where
        I: IntoIterator<Item = ReturnItem>,
    {
        self.projection("WITH", items, false)
    }

    fn projection<I>(&self, keyword: &str, items: I, distinct: bool) -> CypherFragment
    where
        I: IntoIterator<Item = ReturnItem>,
    {
        let rendered: Vec<String> = items.into_iter().map(|item| item.render()).collect();
        let distinct = if distinct { " DISTINCT" } else { "" };
        CypherFragment::new(format!("{keyword}{distinct} {}", rendered.join(", ")))
    }

    /// `ORDER BY a.k ASC, ...`
    pub fn order_by<I>(&self, keys: I) -> CypherFragment
    where
        I: IntoIterator<Item = (PropertyRef, SortOrder)>,
    {
        let rendered: Vec<String> = keys
            .into_iter()
            .map(|(property, order)| format!("{} {}", property.expr(), order.keyword()))
            .collect();
        if rendered.is_empty() {
            return CypherFragment::default();
        }
        CypherFragment::new(format!("ORDER BY {}", rendered.join(", ")))
    }

    pub fn skip(&self, count: u64) -> CypherFragment {
        CypherFragment::new(format!("SKIP {count}"))
    }

    pub fn limit(&self, count: u64) -> CypherFragment {
        CypherFragment::new(format!("LIMIT {count}"))
    }

    /// ` {k: $p, ...}` with a leading space, or empty for an empty map.
    fn property_map<A: Aliased>(&self, target: &A, properties: &PropertyMap) -> CypherFragment {
        if properties.is_empty() {
            return CypherFragment::default();
        }
        let mut bindings = Bindings::new();
        let mut entries = Vec::with_capacity(properties.len());
        for (key, value) in properties {
            let (placeholder, bound) = bind(&self.allocator, &target.prop(key), value);
            bindings.extend(bound);
            entries.push(format!("{}: {placeholder}", escape_identifier(key)));
        }
        CypherFragment::with_bindings(format!(" {{{}}}", entries.join(", ")), bindings)
    }

    fn set_items<A: Aliased>(&self, target: &A, properties: &PropertyMap) -> CypherFragment {
        let mut bindings = Bindings::new();
        let mut items = Vec::with_capacity(properties.len());
        for (key, value) in properties {
            let property = target.prop(key);
            let (placeholder, bound) = bind(&self.allocator, &property, value);
            bindings.extend(bound);
            items.push(format!("{} = {placeholder}", property.expr()));
        }
        CypherFragment::with_bindings(items.join(", "), bindings)
    }
}
