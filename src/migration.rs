//! Migration manager.
//!
//! A migration runs `Idle → FetchingCurrent → Diffing → Validating`, then
//! either `Applying → Applied`, or stops at `Rejected` when the policy refuses
//! the diff. An empty diff goes straight from `Validating` to `Applied` without
//! executing anything, which makes `migrate` idempotent.

use std::collections::BTreeSet;

use serde::Serialize;
use tracing::{debug, info};

use crate::{
    catalog::{CatalogIntrospection, StatementExecutor, introspect_schema},
    config::SchemaConfig,
    ddl::drop_table_statement,
    diff::{SchemaDiff, diff},
    errors::GraphSchemaError,
    policy::MigrationPolicy,
    schema::{GraphSchema, TableSchema},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum MigrationState {
    Idle,
    FetchingCurrent,
    Diffing,
    Validating,
    Applying,
    Applied,
    Rejected,
    /// The executor refused the batch; nothing was applied.
    Failed,
}

/// Ordered statements that carry the current schema to the target.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct MigrationPlan {
    pub statements: Vec<String>,
}

impl MigrationPlan {
    /// Orders the statements so that no table is created before the tables it
    /// references, and none is dropped while an edge table still points at it:
    ///
    /// 1. new node tables
    /// 2. new edge tables whose endpoints are not rebuilt
    /// 3. drops of dropped, modified and dependent edge tables
    /// 4. drops of dropped and modified node tables
    /// 5. rebuilt node tables
    /// 6. rebuilt, dependent and deferred edge tables
    ///
    /// An edge table is dependent when it is otherwise unchanged but one of
    /// its endpoint node tables is rebuilt. Index statements follow their
    /// table.
    pub fn build(current: &GraphSchema, target: &GraphSchema, diff: &SchemaDiff) -> Self {
        let rebuilt_nodes: BTreeSet<&str> = diff
            .modified_nodes
            .iter()
            .map(|(current, _)| current.name.as_str())
            .collect();
        let touches_rebuilt = |table: &TableSchema| {
            table
                .kind
                .endpoints()
                .is_some_and(|(from, to)| rebuilt_nodes.contains(from) || rebuilt_nodes.contains(to))
        };
        let changed_edges: BTreeSet<&str> = diff
            .dropped_edges
            .iter()
            .chain(diff.modified_edges.iter().map(|(current, _)| current))
            .map(|t| t.name.as_str())
            .collect();
        let dependent_edges: Vec<&TableSchema> = current
            .edges
            .values()
            .filter(|edge| !changed_edges.contains(edge.name.as_str()) && touches_rebuilt(*edge))
            .filter_map(|edge| target.edge(&edge.name))
            .collect();
        let (deferred_edges, immediate_edges): (Vec<&TableSchema>, Vec<&TableSchema>) =
            diff.added_edges.iter().partition(|edge| touches_rebuilt(*edge));

        let mut statements = Vec::new();
        for table in &diff.added_nodes {
            statements.extend(table.statements());
        }
        for table in &immediate_edges {
            statements.extend(table.statements());
        }
        let edge_drops = diff
            .dropped_edges
            .iter()
            .chain(diff.modified_edges.iter().map(|(current, _)| current))
            .chain(dependent_edges.iter().copied());
        let mut dropped = BTreeSet::new();
        for table in edge_drops {
            if dropped.insert(table.name.as_str()) {
                statements.push(drop_table_statement(&table.name));
            }
        }
        for table in diff
            .dropped_nodes
            .iter()
            .chain(diff.modified_nodes.iter().map(|(current, _)| current))
        {
            statements.push(drop_table_statement(&table.name));
        }
        for (_, table) in &diff.modified_nodes {
            statements.extend(table.statements());
        }
        for (_, table) in &diff.modified_edges {
            statements.extend(table.statements());
        }
        for table in dependent_edges.into_iter().chain(deferred_edges) {
            statements.extend(table.statements());
        }
        Self { statements }
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }
}

/// Table names per diff category.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct DiffSummary {
    pub added_nodes: Vec<String>,
    pub dropped_nodes: Vec<String>,
    pub modified_nodes: Vec<String>,
    pub added_edges: Vec<String>,
    pub dropped_edges: Vec<String>,
    pub modified_edges: Vec<String>,
}

impl From<&SchemaDiff> for DiffSummary {
    fn from(diff: &SchemaDiff) -> Self {
        let names = |tables: &[TableSchema]| tables.iter().map(|t| t.name.clone()).collect();
        let pairs = |pairs: &[(TableSchema, TableSchema)]| {
            pairs.iter().map(|(current, _)| current.name.clone()).collect()
        };
        Self {
            added_nodes: names(&diff.added_nodes),
            dropped_nodes: names(&diff.dropped_nodes),
            modified_nodes: pairs(&diff.modified_nodes),
            added_edges: names(&diff.added_edges),
            dropped_edges: names(&diff.dropped_edges),
            modified_edges: pairs(&diff.modified_edges),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MigrationReport {
    pub policy: MigrationPolicy,
    pub from_tables: Vec<String>,
    pub to_tables: Vec<String>,
    pub summary: DiffSummary,
    pub statements: Vec<String>,
    pub dry_run: bool,
    /// Whether the statements reached the executor.
    pub executed: bool,
}

impl MigrationReport {
    pub fn is_noop(&self) -> bool {
        self.statements.is_empty()
    }
}

/// Reconciles a live catalog with a declared target schema.
///
/// The introspection and execution seams are separate type parameters; pass
/// `&catalog` twice (see [`MigrationManager::for_catalog`]) when one value
/// plays both roles.
pub struct MigrationManager<I, E> {
    introspection: I,
    executor: E,
    policy: MigrationPolicy,
    dry_run: bool,
    state: MigrationState,
}

impl<'a, C> MigrationManager<&'a C, &'a C>
where
    C: CatalogIntrospection + StatementExecutor + ?Sized,
{
    pub fn for_catalog(catalog: &'a C, policy: MigrationPolicy) -> Self {
        Self::new(catalog, catalog, policy)
    }
}

impl<I, E> MigrationManager<I, E>
where
    I: CatalogIntrospection,
    E: StatementExecutor,
{
    pub fn new(introspection: I, executor: E, policy: MigrationPolicy) -> Self {
        Self {
            introspection,
            executor,
            policy,
            dry_run: false,
            state: MigrationState::Idle,
        }
    }

    pub fn with_config(introspection: I, executor: E, config: &SchemaConfig) -> Self {
        let mut manager = Self::new(introspection, executor, config.policy);
        manager.dry_run = config.dry_run;
        manager
    }

    pub fn policy(&self) -> MigrationPolicy {
        self.policy
    }

    pub fn set_policy(&mut self, policy: MigrationPolicy) {
        self.policy = policy;
    }

    pub fn set_dry_run(&mut self, dry_run: bool) {
        self.dry_run = dry_run;
    }

    pub fn state(&self) -> MigrationState {
        self.state
    }

    fn transition(&mut self, next: MigrationState) {
        debug!(from = ?self.state, to = ?next, "migration state");
        self.state = next;
    }

    /// Current schema as reported by the catalog; empty when the catalog
    /// cannot be read.
    pub fn fetch_current(&mut self) -> GraphSchema {
        self.transition(MigrationState::FetchingCurrent);
        introspect_schema(&self.introspection)
    }

    /// Diffs `current` against `target` after checking the target's edge
    /// endpoints. A target with dangling endpoints leaves the manager `Idle`.
    pub fn diff(
        &mut self,
        current: &GraphSchema,
        target: &GraphSchema,
    ) -> Result<SchemaDiff, GraphSchemaError> {
        self.transition(MigrationState::Diffing);
        if let Err(err) = target.validate_endpoints() {
            self.transition(MigrationState::Idle);
            return Err(err);
        }
        let diff = diff(current, target);
        debug!(changes = diff.change_count(), "schema diff computed");
        Ok(diff)
    }

    pub fn validate(&mut self, diff: &SchemaDiff) -> Result<(), GraphSchemaError> {
        self.transition(MigrationState::Validating);
        if let Err(err) = self.policy.validate(diff) {
            self.transition(MigrationState::Rejected);
            return Err(err);
        }
        Ok(())
    }

    /// Runs a plan as one transactional batch.
    pub fn apply(&mut self, plan: &MigrationPlan) -> Result<(), GraphSchemaError> {
        if plan.is_empty() {
            self.transition(MigrationState::Applied);
            return Ok(());
        }
        self.transition(MigrationState::Applying);
        match self.executor.execute_batch(&plan.statements) {
            Ok(()) => {
                self.transition(MigrationState::Applied);
                Ok(())
            }
            Err(err) => {
                self.transition(MigrationState::Failed);
                Err(err)
            }
        }
    }

    /// Fetches, diffs, validates and plans without executing anything.
    /// The manager is `Idle` again afterwards.
    pub fn plan(&mut self, target: &GraphSchema) -> Result<MigrationReport, GraphSchemaError> {
        let (report, _) = self.prepare(target, true)?;
        self.transition(MigrationState::Idle);
        Ok(report)
    }

    /// Brings the catalog to `target`, subject to the policy.
    ///
    /// With `dry_run` configured this behaves like [`MigrationManager::plan`].
    pub fn migrate(&mut self, target: &GraphSchema) -> Result<MigrationReport, GraphSchemaError> {
        if self.dry_run {
            return self.plan(target);
        }
        let (mut report, plan) = self.prepare(target, false)?;
        if plan.is_empty() {
            debug!("schema already up to date");
            self.transition(MigrationState::Applied);
            return Ok(report);
        }
        self.apply(&plan)?;
        report.executed = true;
        info!(
            statements = report.statements.len(),
            policy = %self.policy,
            "schema migration applied"
        );
        Ok(report)
    }

    fn prepare(
        &mut self,
        target: &GraphSchema,
        dry_run: bool,
    ) -> Result<(MigrationReport, MigrationPlan), GraphSchemaError> {
        let current = self.fetch_current();
        let diff = self.diff(&current, target)?;
        self.validate(&diff)?;
        let plan = if diff.is_empty() {
            MigrationPlan::default()
        } else {
            MigrationPlan::build(&current, target, &diff)
        };
        let report = MigrationReport {
            policy: self.policy,
            from_tables: current.tables().map(|t| t.name.clone()).collect(),
            to_tables: target.tables().map(|t| t.name.clone()).collect(),
            summary: DiffSummary::from(&diff),
            statements: plan.statements.clone(),
            dry_run,
            executed: false,
        };
        Ok((report, plan))
    }
}
