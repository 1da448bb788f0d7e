//! Dependency graph maintenance.
//!
//! This module owns the authoritative edge store for one project: an
//! arena of dependency records indexed by edge id, plus per-task
//! outbound and inbound adjacency lists. Every mutation is validated
//! before any index is touched, so the structure is never observable
//! in a half-updated state and never contains a cycle.

use std::collections::{HashMap, HashSet};

use ganttlink_core::{Dependency, DependencyId, DependencySpec, DependencyUpdate, TaskId};
use tracing::debug;

use crate::cycle;
use crate::{Error, Result};

/// Largest lag magnitude storable on an edge: one century in calendar
/// days. Keeps stored lags well inside the range date arithmetic can
/// absorb.
pub const MAX_LAG_DAYS: i64 = 36_500;

/// Reject lags outside `[-MAX_LAG_DAYS, MAX_LAG_DAYS]`.
///
/// Runs as part of every insertion and update; exposed so callers can
/// validate a lag before building an edge around it.
///
/// # Errors
///
/// Returns [`Error::LagOutOfRange`] for a lag past either limit.
pub fn check_lag(lag_days: i64) -> Result<()> {
    if !(-MAX_LAG_DAYS..=MAX_LAG_DAYS).contains(&lag_days) {
        return Err(Error::lag_out_of_range(lag_days));
    }
    Ok(())
}

/// Cycle-free dependency graph for one project.
///
/// Edges run from predecessor to successor. A task is "in" the graph
/// exactly while at least one edge touches it; tasks with no
/// dependencies carry no state here.
///
/// Adjacency lists preserve insertion order, so [`dependencies_of`]
/// and [`dependents_of`] return edges in the order they were added.
///
/// [`dependencies_of`]: DependencyGraph::dependencies_of
/// [`dependents_of`]: DependencyGraph::dependents_of
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    /// Arena of edge records, keyed by edge id.
    pub(crate) edges: HashMap<DependencyId, Dependency>,
    /// Edges leaving each task (task is the predecessor), in insertion order.
    pub(crate) outbound: HashMap<TaskId, Vec<DependencyId>>,
    /// Edges arriving at each task (task is the successor), in insertion order.
    pub(crate) inbound: HashMap<TaskId, Vec<DependencyId>>,
    /// Global insertion log, kept so snapshots round-trip deterministically.
    pub(crate) order: Vec<DependencyId>,
}

impl DependencyGraph {
    /// Create a new empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a graph from previously stored edges, preserving their
    /// ids and relative order.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored edges repeat an id or violate a
    /// structural rule (oversized lag, self-dependency, duplicate pair,
    /// cycle); stored state that fails here was corrupted outside this
    /// crate.
    pub fn from_dependencies<I>(deps: I) -> Result<Self>
    where
        I: IntoIterator<Item = Dependency>,
    {
        let mut graph = Self::new();
        for dep in deps {
            if graph.edges.contains_key(&dep.id) {
                return Err(Error::corrupted(format!(
                    "dependency id {} appears twice",
                    dep.id
                )));
            }
            graph.check_link(dep.predecessor, dep.successor, dep.lag_days)?;
            graph.index_edge(dep);
        }
        Ok(graph)
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Insert a new dependency edge.
    ///
    /// Validation runs before any state changes: on error the graph is
    /// exactly as it was. On success the stored edge, with its freshly
    /// minted id, is returned.
    ///
    /// # Errors
    ///
    /// - [`Error::LagOutOfRange`] if the lag magnitude exceeds [`MAX_LAG_DAYS`]
    /// - [`Error::SelfDependency`] if predecessor and successor are the same task
    /// - [`Error::DuplicateDependency`] if the ordered pair is already linked
    /// - [`Error::CycleDetected`] if the edge would close a cycle
    pub fn insert(&mut self, spec: DependencySpec) -> Result<Dependency> {
        self.check_insertion(&spec)?;

        let dep = Dependency::from_spec(DependencyId::new(), spec);
        debug!(
            "Inserted dependency {} ({} -> {}, {})",
            dep.id, dep.predecessor, dep.successor, dep.kind
        );
        self.index_edge(dep.clone());

        Ok(dep)
    }

    /// Validate an insertion without performing it.
    ///
    /// Runs the same checks as [`insert`](DependencyGraph::insert), in
    /// the same order: lag range, then self-dependency, then duplicate,
    /// then cycle.
    ///
    /// # Errors
    ///
    /// Same as [`insert`](DependencyGraph::insert).
    pub fn check_insertion(&self, spec: &DependencySpec) -> Result<()> {
        self.check_link(spec.predecessor, spec.successor, spec.lag_days)
    }

    /// Remove an edge by id.
    ///
    /// Returns the removed edge, or `None` if no such edge exists;
    /// removing twice is harmless.
    pub fn remove(&mut self, id: DependencyId) -> Option<Dependency> {
        let dep = self.edges.remove(&id)?;
        Self::unindex(&mut self.outbound, dep.predecessor, id);
        Self::unindex(&mut self.inbound, dep.successor, id);
        self.order.retain(|other| *other != id);
        debug!(
            "Removed dependency {} ({} -> {})",
            id, dep.predecessor, dep.successor
        );
        Some(dep)
    }

    /// Remove every edge touching `task`, in either direction.
    ///
    /// Used when a task is deleted. Returns the removed edges in their
    /// original insertion order.
    pub fn remove_task(&mut self, task: TaskId) -> Vec<Dependency> {
        let ids: Vec<DependencyId> = self
            .order
            .iter()
            .copied()
            .filter(|id| self.edges.get(id).is_some_and(|dep| dep.touches(task)))
            .collect();

        let removed: Vec<Dependency> = ids.into_iter().filter_map(|id| self.remove(id)).collect();
        if !removed.is_empty() {
            debug!("Removed {} dependencies touching task {}", removed.len(), task);
        }
        removed
    }

    /// Apply a partial update to an existing edge.
    ///
    /// Endpoints are immutable, so only the lag needs re-validation.
    /// Returns the edge after the update; on error nothing changes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownDependency`] if no edge has this id, or
    /// [`Error::LagOutOfRange`] if the new lag exceeds [`MAX_LAG_DAYS`].
    pub fn update(&mut self, id: DependencyId, update: &DependencyUpdate) -> Result<Dependency> {
        let dep = self.edges.get_mut(&id).ok_or(Error::UnknownDependency { id })?;
        if let Some(lag_days) = update.lag_days {
            check_lag(lag_days)?;
        }
        dep.apply(update);
        debug!("Updated dependency {id}");
        Ok(dep.clone())
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Look up an edge by id.
    #[must_use]
    pub fn get(&self, id: DependencyId) -> Option<&Dependency> {
        self.edges.get(&id)
    }

    /// Edges arriving at `task`, i.e. the constraints on it, in
    /// insertion order. `task` is the successor of every returned edge.
    #[must_use]
    pub fn dependencies_of(&self, task: TaskId) -> Vec<&Dependency> {
        self.inbound
            .get(&task)
            .into_iter()
            .flatten()
            .filter_map(|id| self.edges.get(id))
            .collect()
    }

    /// Edges leaving `task`, i.e. the tasks it constrains, in insertion
    /// order. `task` is the predecessor of every returned edge.
    #[must_use]
    pub fn dependents_of(&self, task: TaskId) -> Vec<&Dependency> {
        self.outbound
            .get(&task)
            .into_iter()
            .flatten()
            .filter_map(|id| self.edges.get(id))
            .collect()
    }

    /// The edge linking the ordered pair, if one exists. At most one
    /// can: duplicates are rejected at insertion.
    #[must_use]
    pub fn link_between(&self, predecessor: TaskId, successor: TaskId) -> Option<&Dependency> {
        self.outbound
            .get(&predecessor)
            .into_iter()
            .flatten()
            .filter_map(|id| self.edges.get(id))
            .find(|dep| dep.successor == successor)
    }

    /// Whether any edge touches `task`.
    #[must_use]
    pub fn contains_task(&self, task: TaskId) -> bool {
        self.outbound.contains_key(&task) || self.inbound.contains_key(&task)
    }

    /// Every task touched by at least one edge, deduplicated.
    pub fn tasks(&self) -> impl Iterator<Item = TaskId> + '_ {
        let mut seen = HashSet::new();
        self.outbound
            .keys()
            .chain(self.inbound.keys())
            .copied()
            .filter(move |task| seen.insert(*task))
    }

    /// Number of tasks touched by at least one edge.
    #[must_use]
    pub fn task_count(&self) -> usize {
        self.tasks().count()
    }

    /// All edges, in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = &Dependency> {
        self.order.iter().filter_map(|id| self.edges.get(id))
    }

    /// Number of edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Whether the graph holds no edges.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Owned copy of all edges, in insertion order. Feeding the result
    /// to [`from_dependencies`](DependencyGraph::from_dependencies)
    /// reproduces the graph.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Dependency> {
        self.edges().cloned().collect()
    }

    // ========================================================================
    // Internals
    // ========================================================================

    /// Successor tasks reachable over one edge from `task`.
    pub(crate) fn successor_tasks(&self, task: TaskId) -> impl Iterator<Item = TaskId> + '_ {
        self.outbound
            .get(&task)
            .into_iter()
            .flatten()
            .filter_map(|id| self.edges.get(id))
            .map(|dep| dep.successor)
    }

    /// Structural checks shared by insertion and restore, cheapest first.
    fn check_link(&self, predecessor: TaskId, successor: TaskId, lag_days: i64) -> Result<()> {
        check_lag(lag_days)?;
        if predecessor == successor {
            return Err(Error::self_dependency(predecessor));
        }
        if let Some(existing) = self.link_between(predecessor, successor) {
            return Err(Error::duplicate(predecessor, successor, existing.id));
        }
        if let Some(path) = cycle::would_close_cycle(self, predecessor, successor) {
            return Err(Error::cycle(path));
        }
        Ok(())
    }

    /// Record an already validated edge in the arena and both indexes.
    fn index_edge(&mut self, dep: Dependency) {
        self.outbound.entry(dep.predecessor).or_default().push(dep.id);
        self.inbound.entry(dep.successor).or_default().push(dep.id);
        self.order.push(dep.id);
        self.edges.insert(dep.id, dep);
    }

    /// Drop `id` from one adjacency list, discarding the list once empty
    /// so the task no longer counts as present.
    fn unindex(index: &mut HashMap<TaskId, Vec<DependencyId>>, task: TaskId, id: DependencyId) {
        if let Some(ids) = index.get_mut(&task) {
            ids.retain(|other| *other != id);
            if ids.is_empty() {
                index.remove(&task);
            }
        }
    }
}
