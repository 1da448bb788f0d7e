//! Engine facade tying the dependency graph to a task store.
//!
//! [`ConstraintEngine`] owns one project's edge set and date store
//! behind a single lock, so every operation sees a consistent pair.
//! Mutations gate on the temporal rules before anything is persisted:
//! a change that breaks a mandatory constraint is rejected unless the
//! caller forces it, while advisory breakage is allowed through and
//! surfaced as a warning.

use std::collections::HashMap;
use std::sync::Arc;

use ganttlink_core::{
    Dependency, DependencyId, DependencySpec, DependencyUpdate, ProjectId, TaskDates, TaskId,
    ViolationReport,
};
use ganttlink_graph::{DependencyGraph, GraphAudit, check_lag};
use parking_lot::{Mutex, RwLock};
use tracing::{info, warn};

use crate::api::TaskDatesPatch;
use crate::error::{Error, Result};
use crate::evaluate;
use crate::propagate::{self, PropagationOptions, PropagationOutcome};
use crate::report;
use crate::store::TaskStore;

struct EngineState<S> {
    graph: DependencyGraph,
    store: S,
}

/// Constraint engine for one project.
pub struct ConstraintEngine<S> {
    state: RwLock<EngineState<S>>,
}

impl<S: TaskStore> ConstraintEngine<S> {
    /// An engine with no dependencies over the given store.
    #[must_use]
    pub fn new(store: S) -> Self {
        Self {
            state: RwLock::new(EngineState {
                graph: DependencyGraph::new(),
                store,
            }),
        }
    }

    /// Rebuild an engine from previously persisted edges.
    ///
    /// # Errors
    ///
    /// Returns a graph error when the stored edges do not form a valid
    /// dependency graph.
    pub fn from_snapshot<I>(dependencies: I, store: S) -> Result<Self>
    where
        I: IntoIterator<Item = Dependency>,
    {
        let graph = DependencyGraph::from_dependencies(dependencies)?;
        Ok(Self {
            state: RwLock::new(EngineState { graph, store }),
        })
    }

    /// Record dates for a task without constraint checks. Initial load
    /// and task creation belong to the upstream task service; the
    /// engine only learns the outcome.
    ///
    /// # Errors
    ///
    /// Returns a store error when the write fails.
    pub fn register_task(&self, task: TaskId, dates: TaskDates) -> Result<()> {
        self.state.write().store.set_dates(task, dates)
    }

    /// Check whether an edge could be inserted, without inserting it.
    /// Catches self-dependencies, duplicate pairs and cycles; dates
    /// play no part here.
    ///
    /// # Errors
    ///
    /// Returns the graph error the insertion would have produced.
    pub fn validate_dependency(&self, spec: &DependencySpec) -> Result<()> {
        self.state.read().graph.check_insertion(spec)?;
        Ok(())
    }

    /// Insert a new dependency edge.
    ///
    /// The tentative edge is evaluated against current task dates
    /// before it is kept. A broken mandatory constraint rejects the
    /// insertion unless `force` is set; a broken advisory constraint
    /// (or a forced mandatory one) comes back as a warning report.
    ///
    /// # Errors
    ///
    /// Returns a graph error for structural problems,
    /// [`Error::MandatoryViolation`] when the edge is violated and not
    /// forced, or a store error.
    pub fn add_dependency(
        &self,
        spec: DependencySpec,
        force: bool,
    ) -> Result<(Dependency, Option<ViolationReport>)> {
        let state = &mut *self.state.write();
        let stored = state.graph.insert(spec)?;
        match gate_edge(&state.store, &stored, force) {
            Ok(warning) => {
                info!(
                    "Added {} dependency {} -> {}",
                    stored.kind, stored.predecessor, stored.successor
                );
                Ok((stored, warning))
            }
            Err(error) => {
                state.graph.remove(stored.id);
                Err(error)
            }
        }
    }

    /// Remove an edge. Removing an unknown id is a no-op.
    pub fn remove_dependency(&self, id: DependencyId) -> Option<Dependency> {
        let removed = self.state.write().graph.remove(id);
        if let Some(edge) = &removed {
            info!(
                "Removed {} dependency {} -> {}",
                edge.kind, edge.predecessor, edge.successor
            );
        }
        removed
    }

    /// Change an edge's kind, lag, mandatory flag or notes.
    ///
    /// The edge as it would look after the update passes through the
    /// same gate as insertion, so loosening or tightening a constraint
    /// cannot silently leave a mandatory violation behind.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownDependency`](ganttlink_graph::Error::UnknownDependency)
    /// for an id the graph does not hold,
    /// [`LagOutOfRange`](ganttlink_graph::Error::LagOutOfRange) for a
    /// lag past the storable range,
    /// [`Error::MandatoryViolation`] when the updated edge would be
    /// violated and not forced, or a store error.
    pub fn update_dependency(
        &self,
        id: DependencyId,
        update: &DependencyUpdate,
        force: bool,
    ) -> Result<(Dependency, Option<ViolationReport>)> {
        let state = &mut *self.state.write();
        let Some(current) = state.graph.get(id) else {
            return Err(ganttlink_graph::Error::unknown(id).into());
        };
        let mut tentative = current.clone();
        tentative.apply(update);

        // Structural validity first, as on insertion; the temporal gate
        // only sees edges the graph would accept.
        check_lag(tentative.lag_days)?;
        let warning = gate_edge(&state.store, &tentative, force)?;
        let updated = state.graph.update(id, update)?;
        info!(
            "Updated {} dependency {} -> {}",
            updated.kind, updated.predecessor, updated.successor
        );
        Ok((updated, warning))
    }

    /// One edge by id.
    #[must_use]
    pub fn dependency(&self, id: DependencyId) -> Option<Dependency> {
        self.state.read().graph.get(id).cloned()
    }

    /// Edges around a task: those it depends on, then those depending
    /// on it.
    #[must_use]
    pub fn list_dependencies(&self, task: TaskId) -> (Vec<Dependency>, Vec<Dependency>) {
        let state = self.state.read();
        let dependencies = state
            .graph
            .dependencies_of(task)
            .into_iter()
            .cloned()
            .collect();
        let dependents = state
            .graph
            .dependents_of(task)
            .into_iter()
            .cloned()
            .collect();
        (dependencies, dependents)
    }

    /// Evaluate every constraint on a task against its stored dates.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TaskNotFound`] when the store does not know the
    /// task, or a store error.
    pub fn check_task(&self, task: TaskId) -> Result<ViolationReport> {
        let state = &*self.state.read();
        report::check_task_in_store(&state.graph, &state.store, task)
    }

    /// Apply a partial date change to a task.
    ///
    /// The patched dates are evaluated against every incoming
    /// constraint first. Broken mandatory constraints reject the write
    /// unless the patch carries `force_update`; whatever was broken
    /// anyway comes back in the report alongside the stored dates.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TaskNotFound`] for an unknown task,
    /// [`Error::InvalidDates`] when the patch would put the start after
    /// the end, [`Error::MandatoryViolation`] when not forced, or a
    /// store error.
    pub fn update_task_dates(
        &self,
        task: TaskId,
        patch: &TaskDatesPatch,
    ) -> Result<(TaskDates, ViolationReport)> {
        let state = &mut *self.state.write();
        let current = state
            .store
            .dates(task)?
            .ok_or(Error::TaskNotFound { task })?;
        let candidate = patch.apply_to(current);
        if !candidate.is_well_formed() {
            return Err(Error::invalid_dates(task));
        }

        let report = report::check_candidate_in_store(&state.graph, &state.store, task, &candidate)?;
        if !report.can_force() && !patch.force_update {
            return Err(Error::mandatory_violation(report));
        }
        if !report.is_clean() {
            warn!(
                "Task {task} rescheduled against {} violated constraint(s)",
                report.violation_count()
            );
        }

        state.store.set_dates(task, candidate)?;
        Ok((candidate, report))
    }

    /// Cascade dates forward from `source` and persist the moves as one
    /// batch. See [`propagate::auto_adjust`] for the walk itself.
    ///
    /// # Errors
    ///
    /// Returns a store error from reading or writing dates, or a graph
    /// error when the stored edge set is corrupt.
    pub fn auto_adjust(
        &self,
        source: TaskId,
        options: &PropagationOptions,
    ) -> Result<PropagationOutcome> {
        let state = &mut *self.state.write();
        let outcome = propagate::auto_adjust(&state.graph, &state.store, source, options)?;
        if !outcome.moved.is_empty() {
            let changes: Vec<(TaskId, TaskDates)> = outcome
                .moved
                .iter()
                .map(|shift| (shift.task, shift.to))
                .collect();
            state.store.set_dates_batch(&changes)?;
            info!(
                "Auto-adjust from {source} rescheduled {} task(s)",
                changes.len()
            );
        }
        Ok(outcome)
    }

    /// Drop every edge touching a deleted task and return them.
    pub fn task_deleted(&self, task: TaskId) -> Vec<Dependency> {
        let removed = self.state.write().graph.remove_task(task);
        if !removed.is_empty() {
            info!(
                "Removed {} dependency edge(s) touching deleted task {task}",
                removed.len()
            );
        }
        removed
    }

    /// Consistency sweep over the graph's internal indexes.
    #[must_use]
    pub fn audit(&self) -> GraphAudit {
        self.state.read().graph.audit()
    }

    /// Every edge, in insertion order, for persistence.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Dependency> {
        self.state.read().graph.snapshot()
    }

    /// Number of edges currently held.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.state.read().graph.edge_count()
    }
}

/// Evaluate one edge against stored dates and decide whether the
/// mutation carrying it may proceed.
fn gate_edge<S: TaskStore>(
    store: &S,
    edge: &Dependency,
    force: bool,
) -> Result<Option<ViolationReport>> {
    let predecessor = store.dates(edge.predecessor)?.unwrap_or_default();
    let successor = store.dates(edge.successor)?.unwrap_or_default();
    let Some(violation) = evaluate::evaluate(edge, &predecessor, &successor).into_violation()
    else {
        return Ok(None);
    };

    let mut report = ViolationReport::new(edge.successor);
    report.record(violation);
    if !report.can_force() && !force {
        return Err(Error::mandatory_violation(report));
    }
    warn!(
        "Edge {} -> {} violates its {} constraint; kept at caller's request",
        edge.predecessor, edge.successor, edge.kind
    );
    Ok(Some(report))
}

/// Per-project engines behind one handle. Projects are isolated: each
/// gets its own graph and store, created on first use.
pub struct EngineRegistry<S> {
    engines: Mutex<HashMap<ProjectId, Arc<ConstraintEngine<S>>>>,
}

impl<S> EngineRegistry<S> {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            engines: Mutex::new(HashMap::new()),
        }
    }

    /// Register an engine built elsewhere, replacing any existing one
    /// for the project.
    pub fn insert(&self, project: ProjectId, engine: ConstraintEngine<S>) -> Arc<ConstraintEngine<S>> {
        let engine = Arc::new(engine);
        self.engines.lock().insert(project, Arc::clone(&engine));
        engine
    }

    /// Drop a project's engine. Existing handles keep working; the
    /// registry just stops sharing it.
    pub fn remove(&self, project: ProjectId) -> Option<Arc<ConstraintEngine<S>>> {
        self.engines.lock().remove(&project)
    }

    /// Projects with a live engine.
    #[must_use]
    pub fn projects(&self) -> Vec<ProjectId> {
        self.engines.lock().keys().copied().collect()
    }

    /// Number of live engines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.engines.lock().len()
    }

    /// Whether no project has an engine yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.engines.lock().is_empty()
    }
}

impl<S: TaskStore + Default> EngineRegistry<S> {
    /// The engine for a project, created empty on first use.
    #[must_use]
    pub fn engine(&self, project: ProjectId) -> Arc<ConstraintEngine<S>> {
        Arc::clone(
            self.engines
                .lock()
                .entry(project)
                .or_insert_with(|| Arc::new(ConstraintEngine::new(S::default()))),
        )
    }
}

impl<S> Default for EngineRegistry<S> {
    fn default() -> Self {
        Self::new()
    }
}
