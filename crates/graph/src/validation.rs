//! Structural audit for dependency graphs.
//!
//! Insertion-time checks keep the graph sound, so a failing audit means
//! the state was corrupted outside normal mutation, e.g. by a bad
//! restore. The audit re-verifies the invariants the hot path assumes:
//! arena and adjacency indexes agree, no self-loops, no duplicate
//! pairs, and the whole graph is acyclic.

use std::collections::HashSet;

use petgraph::algo::is_cyclic_directed;
use tracing::warn;

use crate::DependencyGraph;
use crate::graph::check_lag;

/// Result of a structural audit.
#[derive(Debug, Clone)]
pub struct GraphAudit {
    /// Number of edges at audit time.
    pub edge_count: usize,
    /// Number of tasks touched by at least one edge.
    pub task_count: usize,
    /// Descriptions of every inconsistency found. Empty when healthy.
    pub issues: Vec<String>,
}

impl GraphAudit {
    /// Whether no inconsistency was found.
    #[must_use]
    pub fn is_healthy(&self) -> bool {
        self.issues.is_empty()
    }
}

impl DependencyGraph {
    /// Audit the graph structure.
    ///
    /// Checks, in order:
    /// - every indexed edge id resolves to an arena record with the
    ///   matching endpoint
    /// - every arena record is indexed under both of its endpoints and
    ///   logged in the insertion order
    /// - no edge links a task to itself
    /// - every edge's lag is within the storable range
    /// - no ordered pair of tasks is linked twice
    /// - the graph is acyclic
    #[must_use]
    pub fn audit(&self) -> GraphAudit {
        let mut issues = Vec::new();

        for (task, ids) in &self.outbound {
            for id in ids {
                match self.edges.get(id) {
                    None => issues.push(format!("outbound index of {task} holds unknown edge {id}")),
                    Some(dep) if dep.predecessor != *task => issues.push(format!(
                        "edge {id} is indexed outbound under {task} but starts at {}",
                        dep.predecessor
                    )),
                    Some(_) => {}
                }
            }
        }
        for (task, ids) in &self.inbound {
            for id in ids {
                match self.edges.get(id) {
                    None => issues.push(format!("inbound index of {task} holds unknown edge {id}")),
                    Some(dep) if dep.successor != *task => issues.push(format!(
                        "edge {id} is indexed inbound under {task} but ends at {}",
                        dep.successor
                    )),
                    Some(_) => {}
                }
            }
        }

        for dep in self.edges.values() {
            let out_ok = self
                .outbound
                .get(&dep.predecessor)
                .is_some_and(|ids| ids.contains(&dep.id));
            if !out_ok {
                issues.push(format!("edge {} missing from outbound index", dep.id));
            }
            let in_ok = self
                .inbound
                .get(&dep.successor)
                .is_some_and(|ids| ids.contains(&dep.id));
            if !in_ok {
                issues.push(format!("edge {} missing from inbound index", dep.id));
            }
            if !self.order.contains(&dep.id) {
                issues.push(format!("edge {} missing from insertion log", dep.id));
            }
            if dep.predecessor == dep.successor {
                issues.push(format!("edge {} links task {} to itself", dep.id, dep.predecessor));
            }
            if check_lag(dep.lag_days).is_err() {
                issues.push(format!(
                    "edge {} carries an out-of-range lag of {} days",
                    dep.id, dep.lag_days
                ));
            }
        }

        let mut pairs = HashSet::new();
        for dep in self.edges.values() {
            if !pairs.insert((dep.predecessor, dep.successor)) {
                issues.push(format!(
                    "tasks {} -> {} are linked more than once",
                    dep.predecessor, dep.successor
                ));
            }
        }

        if is_cyclic_directed(&self.full_digraph()) {
            issues.push("graph contains a dependency cycle".to_string());
        }

        if !issues.is_empty() {
            warn!("Graph audit found {} issue(s)", issues.len());
        }

        GraphAudit {
            edge_count: self.edge_count(),
            task_count: self.task_count(),
            issues,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ganttlink_core::{DependencyId, DependencyKind, DependencySpec, TaskId};

    fn fs(pred: TaskId, succ: TaskId) -> DependencySpec {
        DependencySpec::new(pred, succ, DependencyKind::FinishToStart)
    }

    #[test]
    fn test_audit_empty_graph() {
        let audit = DependencyGraph::new().audit();
        assert!(audit.is_healthy());
        assert_eq!(audit.edge_count, 0);
        assert_eq!(audit.task_count, 0);
    }

    #[test]
    fn test_audit_healthy_graph() {
        let mut graph = DependencyGraph::new();
        let a = TaskId::new();
        let b = TaskId::new();
        let c = TaskId::new();
        graph.insert(fs(a, b)).unwrap();
        graph.insert(fs(b, c)).unwrap();

        let audit = graph.audit();
        assert!(audit.is_healthy(), "issues: {:?}", audit.issues);
        assert_eq!(audit.edge_count, 2);
        assert_eq!(audit.task_count, 3);
    }

    #[test]
    fn test_audit_flags_forged_index_entry() {
        let mut graph = DependencyGraph::new();
        let a = TaskId::new();
        let b = TaskId::new();
        graph.insert(fs(a, b)).unwrap();

        // Corrupt the index directly, as no public mutation can.
        graph
            .outbound
            .entry(a)
            .or_default()
            .push(DependencyId::new());

        let audit = graph.audit();
        assert!(!audit.is_healthy());
        assert!(audit.issues[0].contains("unknown edge"));
    }

    #[test]
    fn test_audit_flags_forged_oversized_lag() {
        let mut graph = DependencyGraph::new();
        let a = TaskId::new();
        let b = TaskId::new();
        graph.insert(fs(a, b)).unwrap();

        // Overwrite the stored lag past the gate, as a bad restore might.
        let id = graph.order[0];
        if let Some(dep) = graph.edges.get_mut(&id) {
            dep.lag_days = i64::MAX;
        }

        let audit = graph.audit();
        assert!(!audit.is_healthy());
        assert!(audit.issues.iter().any(|issue| issue.contains("lag")));
    }

    #[test]
    fn test_audit_flags_cycle_in_forged_state() {
        let mut graph = DependencyGraph::new();
        let a = TaskId::new();
        let b = TaskId::new();
        graph.insert(fs(a, b)).unwrap();

        // Splice a back edge past validation.
        let forged = ganttlink_core::Dependency::from_spec(DependencyId::new(), fs(b, a));
        graph.outbound.entry(b).or_default().push(forged.id);
        graph.inbound.entry(a).or_default().push(forged.id);
        graph.order.push(forged.id);
        graph.edges.insert(forged.id, forged);

        let audit = graph.audit();
        assert!(!audit.is_healthy());
        assert!(
            audit
                .issues
                .iter()
                .any(|issue| issue.contains("cycle"))
        );
    }
}
