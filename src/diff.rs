//! Schema diff engine.
//!
//! Compares a current snapshot with a target snapshot by table name. Tables
//! present on both sides are compared structurally; any difference marks the
//! pair modified and the whole table is regenerated, there is no column-level
//! sub-diff.

use serde::Serialize;

use crate::schema::{GraphSchema, TableSchema};

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct SchemaDiff {
    pub added_nodes: Vec<TableSchema>,
    pub dropped_nodes: Vec<TableSchema>,
    pub modified_nodes: Vec<(TableSchema, TableSchema)>,
    pub added_edges: Vec<TableSchema>,
    pub dropped_edges: Vec<TableSchema>,
    pub modified_edges: Vec<(TableSchema, TableSchema)>,
}

/// Why a change can discard data.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum DestructiveReason {
    DroppedTable,
    TypeChanged { from: String, to: String },
    ColumnRemoved,
    EndpointsChanged,
}

impl DestructiveReason {
    pub fn describe(&self) -> String {
        match self {
            DestructiveReason::DroppedTable => "table would be dropped".into(),
            DestructiveReason::TypeChanged { from, to } => {
                format!("storage type changes from {from} to {to}")
            }
            DestructiveReason::ColumnRemoved => "column would be removed".into(),
            DestructiveReason::EndpointsChanged => "edge endpoints change".into(),
        }
    }
}

/// First destructive change found in a diff.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DestructiveChange {
    pub table: String,
    pub column: Option<String>,
    pub reason: DestructiveReason,
}

/// Tables are matched by name; a shared name with a different structure is a
/// modification. Output vectors follow name order.
pub fn diff(current: &GraphSchema, target: &GraphSchema) -> SchemaDiff {
    let (added_nodes, dropped_nodes, modified_nodes) = diff_space(
        current.nodes.values(),
        target.nodes.values(),
        |name| current.nodes.get(name),
        |name| target.nodes.get(name),
    );
    let (added_edges, dropped_edges, modified_edges) = diff_space(
        current.edges.values(),
        target.edges.values(),
        |name| current.edges.get(name),
        |name| target.edges.get(name),
    );
    SchemaDiff {
        added_nodes,
        dropped_nodes,
        modified_nodes,
        added_edges,
        dropped_edges,
        modified_edges,
    }
}

type SpaceDiff = (
    Vec<TableSchema>,
    Vec<TableSchema>,
    Vec<(TableSchema, TableSchema)>,
);

fn diff_space<'a, C, T, FC, FT>(current: C, target: T, in_current: FC, in_target: FT) -> SpaceDiff
where
    C: Iterator<Item = &'a TableSchema>,
    T: Iterator<Item = &'a TableSchema>,
    FC: Fn(&str) -> Option<&'a TableSchema>,
    FT: Fn(&str) -> Option<&'a TableSchema>,
{
    let mut added = Vec::new();
    let mut dropped = Vec::new();
    let mut modified = Vec::new();
    for table in current {
        match in_target(&table.name) {
            None => dropped.push(table.clone()),
            Some(next) if !table.same_structure(next) => {
                modified.push((table.clone(), next.clone()));
            }
            Some(_) => {}
        }
    }
    for table in target {
        if in_current(&table.name).is_none() {
            added.push(table.clone());
        }
    }
    (added, dropped, modified)
}

impl SchemaDiff {
    pub fn is_empty(&self) -> bool {
        self.added_nodes.is_empty()
            && self.dropped_nodes.is_empty()
            && self.modified_nodes.is_empty()
            && self.added_edges.is_empty()
            && self.dropped_edges.is_empty()
            && self.modified_edges.is_empty()
    }

    pub fn change_count(&self) -> usize {
        self.added_nodes.len()
            + self.dropped_nodes.len()
            + self.modified_nodes.len()
            + self.added_edges.len()
            + self.dropped_edges.len()
            + self.modified_edges.len()
    }

    /// Every table name touched by the diff, for reporting.
    pub fn touched_tables(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .added_nodes
            .iter()
            .chain(self.dropped_nodes.iter())
            .chain(self.added_edges.iter())
            .chain(self.dropped_edges.iter())
            .map(|t| t.name.as_str())
            .chain(
                self.modified_nodes
                    .iter()
                    .chain(self.modified_edges.iter())
                    .map(|(current, _)| current.name.as_str()),
            )
            .collect();
        names.sort_unstable();
        names.dedup();
        names
    }

    /// Destructive changes in check order: dropped edges, dropped nodes,
    /// modified nodes, modified edges.
    pub fn destructive_changes(&self) -> Vec<DestructiveChange> {
        let mut changes = Vec::new();
        for table in self.dropped_edges.iter().chain(self.dropped_nodes.iter()) {
            changes.push(DestructiveChange {
                table: table.name.clone(),
                column: None,
                reason: DestructiveReason::DroppedTable,
            });
        }
        for (current, target) in self.modified_nodes.iter().chain(self.modified_edges.iter()) {
            if let Some(change) = classify_modification(current, target) {
                changes.push(change);
            }
        }
        changes
    }

    pub fn first_destructive(&self) -> Option<DestructiveChange> {
        self.destructive_changes().into_iter().next()
    }

    pub fn is_destructive(&self) -> bool {
        self.first_destructive().is_some()
    }
}

/// Classifies one modified pair; `None` means pure column addition.
///
/// Columns are matched by name. Removing a column or changing its storage
/// type is destructive, and so is moving an edge endpoint. Constraint and
/// ordering changes still rebuild the table but are not data loss.
pub fn classify_modification(
    current: &TableSchema,
    target: &TableSchema,
) -> Option<DestructiveChange> {
    let at = |column: Option<&str>, reason| DestructiveChange {
        table: current.name.clone(),
        column: column.map(str::to_string),
        reason,
    };
    if current.kind != target.kind {
        return Some(at(None, DestructiveReason::EndpointsChanged));
    }
    for column in &current.columns {
        match target.column(&column.name) {
            None => return Some(at(Some(&column.name), DestructiveReason::ColumnRemoved)),
            Some(next) => {
                let (from, to) = (column.storage_type(), next.storage_type());
                if from != to {
                    return Some(at(
                        Some(&column.name),
                        DestructiveReason::TypeChanged { from, to },
                    ));
                }
            }
        }
    }
    None
}
