//! Cascading date propagation.
//!
//! When a task's dates move, its downstream tasks may fall behind their
//! constraints. Propagation walks the reachable subgraph in dependency
//! order and shifts each violating task forward by the smallest amount
//! that satisfies its tightest broken constraint, always evaluating
//! against the already-updated dates of predecessors. The cascade is
//! best-effort: a task that cannot be fixed is reported and left alone,
//! and propagation continues past it.
//!
//! The function is pure with respect to the store: it reads dates but
//! returns the computed moves for the caller to persist as one batch.

use std::collections::HashMap;

use ganttlink_core::{DateShift, Dependency, TaskDates, TaskId, Violation, ViolationReport};
use ganttlink_graph::DependencyGraph;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::Result;
use crate::report;
use crate::store::TaskStore;

/// Options steering a propagation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropagationOptions {
    /// Move a task's start and end together, keeping its duration.
    /// When false, only the violated boundaries move, which can leave
    /// an interval impossible to form and the task unresolvable.
    pub preserve_duration: bool,
    /// Let advisory violations trigger shifts too. Off by default:
    /// advisory edges normally only warn.
    pub include_advisory: bool,
}

impl Default for PropagationOptions {
    fn default() -> Self {
        Self {
            preserve_duration: true,
            include_advisory: false,
        }
    }
}

/// A task the propagator could not fix without breaking another of its
/// constraints. Its dates were left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnresolvableConflict {
    /// The task that could not be moved into compliance.
    pub task: TaskId,
    /// The task's evaluation at the moment it was skipped, against its
    /// original dates.
    pub report: ViolationReport,
}

impl UnresolvableConflict {
    /// The mandatory edges whose requirements could not all be met.
    #[must_use]
    pub fn conflicting_edges(&self) -> Vec<&Dependency> {
        self.report
            .mandatory
            .iter()
            .map(|violation| &violation.dependency)
            .collect()
    }
}

/// Result of one propagation run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropagationOutcome {
    /// Every task that was moved, in the order the cascade visited
    /// them, with its dates before and after.
    pub moved: Vec<DateShift>,
    /// Tasks skipped because no move could satisfy their constraints.
    pub unresolvable: Vec<UnresolvableConflict>,
}

impl PropagationOutcome {
    /// Whether the run changed nothing and found nothing to report.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.moved.is_empty() && self.unresolvable.is_empty()
    }
}

/// Cascade the minimal fix forward from `source`.
///
/// The source itself is never moved: it is the origin of the change,
/// and only the tasks constrained by it (transitively) are revisited.
/// Tasks whose blocking constraints are already satisfied are left
/// untouched, so re-running immediately moves nothing.
///
/// # Errors
///
/// Returns a store error from reading any involved task, or
/// [`CorruptedGraph`](ganttlink_graph::Error::CorruptedGraph) if the
/// stored edge set is not acyclic.
pub fn auto_adjust<S>(
    graph: &DependencyGraph,
    store: &S,
    source: TaskId,
    options: &PropagationOptions,
) -> Result<PropagationOutcome>
where
    S: TaskStore + ?Sized,
{
    let order = graph.downstream_order(source)?;
    debug!(
        "Propagating from {} across {} downstream task(s)",
        source,
        order.len()
    );

    // Working overlay: store dates plus every shift applied so far.
    // Prefetched up front so the passes below cannot fail midway.
    let mut working: HashMap<TaskId, TaskDates> = HashMap::new();
    for task in &order {
        if !working.contains_key(task) {
            working.insert(*task, store.dates(*task)?.unwrap_or_default());
        }
        for dep in graph.dependencies_of(*task) {
            let pred = dep.predecessor;
            if !working.contains_key(&pred) {
                working.insert(pred, store.dates(pred)?.unwrap_or_default());
            }
        }
    }

    let mut moved: Vec<DateShift> = Vec::new();
    let mut unresolvable: Vec<UnresolvableConflict> = Vec::new();

    for task in order {
        let current = working.get(&task).copied().unwrap_or_default();
        let report = report::check_task(graph, task, &current, |t| {
            working.get(&t).copied().unwrap_or_default()
        });

        let shift = blocking(&report, options.include_advisory)
            .map(Violation::shortfall_days)
            .max()
            .unwrap_or(0);
        if shift <= 0 {
            continue;
        }

        let candidate = if options.preserve_duration {
            current.shifted_by(shift)
        } else {
            boundary_moves(&report, options.include_advisory, current)
        };

        let candidate_report = report::check_task(graph, task, &candidate, |t| {
            working.get(&t).copied().unwrap_or_default()
        });
        let still_blocked = !candidate_report.can_force()
            || (options.include_advisory && !candidate_report.is_clean());

        if still_blocked || !candidate.is_well_formed() {
            debug!("Task {task} cannot be auto-fixed; keeping its dates");
            unresolvable.push(UnresolvableConflict { task, report });
            continue;
        }

        working.insert(task, candidate);
        moved.push(DateShift::new(task, current, candidate));
    }

    if !moved.is_empty() || !unresolvable.is_empty() {
        info!(
            "Propagation from {} moved {} task(s), {} unresolvable",
            source,
            moved.len(),
            unresolvable.len()
        );
    }

    Ok(PropagationOutcome {
        moved,
        unresolvable,
    })
}

/// The violations allowed to trigger a shift under the given options.
fn blocking(
    report: &ViolationReport,
    include_advisory: bool,
) -> impl Iterator<Item = &Violation> {
    let advisory = include_advisory
        .then(|| report.advisory.iter())
        .into_iter()
        .flatten();
    report.mandatory.iter().chain(advisory)
}

/// Move each violated boundary to its latest required date, leaving the
/// other boundary where it is.
fn boundary_moves(
    report: &ViolationReport,
    include_advisory: bool,
    current: TaskDates,
) -> TaskDates {
    let mut candidate = current;
    for violation in blocking(report, include_advisory) {
        let behind = candidate
            .boundary(violation.boundary)
            .is_some_and(|held| held < violation.required);
        if behind {
            candidate = candidate.with_boundary(violation.boundary, violation.required);
        }
    }
    candidate
}
