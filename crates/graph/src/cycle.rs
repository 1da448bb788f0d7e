//! Cycle detection for tentative edges.
//!
//! The graph never stores a cycle, so detection happens at insertion
//! time: adding `predecessor -> successor` closes a cycle exactly when
//! the successor can already reach the predecessor. The search is a
//! depth-first walk over outbound edges, O(tasks + edges), and
//! reconstructs the offending walk for the error report.

use std::collections::{HashMap, HashSet};

use ganttlink_core::TaskId;

use crate::DependencyGraph;

/// If inserting `predecessor -> successor` would close a cycle, returns
/// the full cycle walk: it starts and ends at `predecessor`, and its
/// first hop is the tentative edge itself.
pub(crate) fn would_close_cycle(
    graph: &DependencyGraph,
    predecessor: TaskId,
    successor: TaskId,
) -> Option<Vec<TaskId>> {
    let mut walk = path_between(graph, successor, predecessor)?;
    let mut cycle = Vec::with_capacity(walk.len() + 1);
    cycle.push(predecessor);
    cycle.append(&mut walk);
    Some(cycle)
}

/// Depth-first search for a directed path `from -> ... -> to` over
/// existing edges. Returns the path including both endpoints, or `None`
/// when `to` is unreachable.
pub(crate) fn path_between(
    graph: &DependencyGraph,
    from: TaskId,
    to: TaskId,
) -> Option<Vec<TaskId>> {
    if from == to {
        return Some(vec![from]);
    }

    let mut parent: HashMap<TaskId, TaskId> = HashMap::new();
    let mut visited: HashSet<TaskId> = HashSet::from([from]);
    let mut stack = vec![from];

    while let Some(current) = stack.pop() {
        for next in graph.successor_tasks(current) {
            if !visited.insert(next) {
                continue;
            }
            parent.insert(next, current);
            if next == to {
                return Some(reconstruct(&parent, from, to));
            }
            stack.push(next);
        }
    }

    None
}

/// Walks the parent links back from `to` to `from`.
fn reconstruct(parent: &HashMap<TaskId, TaskId>, from: TaskId, to: TaskId) -> Vec<TaskId> {
    let mut path = vec![to];
    let mut current = to;
    while current != from {
        match parent.get(&current) {
            Some(&prev) => {
                path.push(prev);
                current = prev;
            }
            // Unreachable for paths produced by the search above; bail
            // rather than loop forever on a broken parent map.
            None => break,
        }
    }
    path.reverse();
    path
}
