//! Violation reporting for whole tasks.
//!
//! A task's report is the evaluation of every inbound edge, i.e. every
//! constraint the task must satisfy relative to its predecessors,
//! partitioned by severity. The report is the contract consumed by the
//! save gate: a change producing mandatory violations needs an explicit
//! force, advisory violations only warn.

use std::collections::HashMap;

use ganttlink_core::{TaskDates, TaskId, ViolationReport};
use ganttlink_graph::DependencyGraph;

use crate::evaluate;
use crate::store::TaskStore;
use crate::{Error, Result};

/// Evaluate every constraint on `task` against `candidate` dates.
///
/// `dates_of` supplies predecessor dates; the closure seam lets the
/// propagator substitute already-updated working dates mid-cascade, and
/// lets callers evaluate tentative edits without touching any store.
/// Violations appear in edge insertion order within each partition.
pub fn check_task<F>(
    graph: &DependencyGraph,
    task: TaskId,
    candidate: &TaskDates,
    mut dates_of: F,
) -> ViolationReport
where
    F: FnMut(TaskId) -> TaskDates,
{
    let mut report = ViolationReport::new(task);
    for dep in graph.dependencies_of(task) {
        let predecessor = dates_of(dep.predecessor);
        if let Some(violation) = evaluate::evaluate(dep, &predecessor, candidate).into_violation()
        {
            report.record(violation);
        }
    }
    report
}

/// Check the task's currently stored dates.
///
/// # Errors
///
/// Returns [`Error::TaskNotFound`] when the store does not know `task`,
/// or a store error from reading any involved task.
pub fn check_task_in_store<S>(
    graph: &DependencyGraph,
    store: &S,
    task: TaskId,
) -> Result<ViolationReport>
where
    S: TaskStore + ?Sized,
{
    let current = store.dates(task)?.ok_or(Error::TaskNotFound { task })?;
    check_candidate_in_store(graph, store, task, &current)
}

/// Check candidate dates for `task`, reading predecessor dates from the
/// store. Unknown predecessors evaluate as unscheduled.
///
/// # Errors
///
/// Returns a store error from reading any predecessor.
pub fn check_candidate_in_store<S>(
    graph: &DependencyGraph,
    store: &S,
    task: TaskId,
    candidate: &TaskDates,
) -> Result<ViolationReport>
where
    S: TaskStore + ?Sized,
{
    let mut cache: HashMap<TaskId, TaskDates> = HashMap::new();
    for dep in graph.dependencies_of(task) {
        if !cache.contains_key(&dep.predecessor) {
            let dates = store.dates(dep.predecessor)?.unwrap_or_default();
            cache.insert(dep.predecessor, dates);
        }
    }
    Ok(check_task(graph, task, candidate, |t| {
        cache.get(&t).copied().unwrap_or_default()
    }))
}
