//! Downstream traversal in dependency order.
//!
//! Date propagation needs every task reachable from a moved task,
//! visited so that all of a task's predecessors settle before the task
//! itself. That is a topological sort of the reachable subgraph, which
//! petgraph provides once the subgraph is materialized.

use std::collections::{HashMap, HashSet, VecDeque};

use ganttlink_core::TaskId;
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};

use crate::{DependencyGraph, Error, Result};

impl DependencyGraph {
    /// Tasks reachable from `source` over outbound edges, ordered so
    /// every task appears after all of its predecessors within the
    /// result. `source` itself is excluded.
    ///
    /// The order is deterministic: ties are broken by edge insertion
    /// order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CorruptedGraph`] if the reachable subgraph is
    /// not acyclic, which insertion-time validation rules out.
    pub fn downstream_order(&self, source: TaskId) -> Result<Vec<TaskId>> {
        // Breadth-first discovery keeps the node set in a stable order.
        let mut seen: HashSet<TaskId> = HashSet::from([source]);
        let mut discovered: Vec<TaskId> = Vec::new();
        let mut queue: VecDeque<TaskId> = VecDeque::from([source]);

        while let Some(current) = queue.pop_front() {
            for next in self.successor_tasks(current) {
                if seen.insert(next) {
                    discovered.push(next);
                    queue.push_back(next);
                }
            }
        }

        if discovered.is_empty() {
            return Ok(Vec::new());
        }

        let mut dag: DiGraph<TaskId, ()> = DiGraph::new();
        let mut indices: HashMap<TaskId, NodeIndex> = HashMap::new();
        for task in &discovered {
            indices.insert(*task, dag.add_node(*task));
        }
        for task in &discovered {
            let Some(&from) = indices.get(task) else {
                continue;
            };
            for next in self.successor_tasks(*task) {
                if let Some(&to) = indices.get(&next) {
                    dag.add_edge(from, to, ());
                }
            }
        }

        toposort(&dag, None)
            .map(|sorted| sorted.into_iter().map(|idx| dag[idx]).collect())
            .map_err(|cyclic| {
                Error::corrupted(format!(
                    "downstream subgraph of {} contains a cycle through {}",
                    source,
                    dag[cyclic.node_id()]
                ))
            })
    }

    /// Materializes the whole graph as a petgraph [`DiGraph`], for
    /// whole-graph algorithms such as the acyclicity audit.
    pub(crate) fn full_digraph(&self) -> DiGraph<TaskId, ()> {
        let mut dag: DiGraph<TaskId, ()> = DiGraph::new();
        let mut indices: HashMap<TaskId, NodeIndex> = HashMap::new();

        for task in self.tasks() {
            indices.insert(task, dag.add_node(task));
        }
        for dep in self.edges() {
            if let (Some(&from), Some(&to)) = (
                indices.get(&dep.predecessor),
                indices.get(&dep.successor),
            ) {
                dag.add_edge(from, to, ());
            }
        }

        dag
    }
}
