//! Error types for the ganttlink-graph crate

use ganttlink_core::{DependencyId, TaskId};
use miette::Diagnostic;
use thiserror::Error;

use crate::graph::MAX_LAG_DAYS;

/// Main error type for ganttlink-graph operations
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    /// A task may not depend on itself
    #[error("task {task} cannot depend on itself")]
    #[diagnostic(code(ganttlink_graph::self_dependency))]
    SelfDependency {
        /// The task named as both predecessor and successor
        task: TaskId,
    },

    /// The ordered pair of tasks is already linked
    #[error("tasks {predecessor} -> {successor} are already linked by dependency {existing}")]
    #[diagnostic(
        code(ganttlink_graph::duplicate_dependency),
        help("update or remove the existing dependency instead of adding another")
    )]
    DuplicateDependency {
        /// The predecessor of the existing edge
        predecessor: TaskId,
        /// The successor of the existing edge
        successor: TaskId,
        /// Identifier of the edge that already links the pair
        existing: DependencyId,
    },

    /// Inserting the edge would close a cycle
    #[error("dependency would create a cycle: {}", format_cycle(.path))]
    #[diagnostic(
        code(ganttlink_graph::cycle_detected),
        help("break the cycle by removing one of the dependencies along the path")
    )]
    CycleDetected {
        /// The offending walk: starts and ends at the same task, with the
        /// rejected edge as its first hop
        path: Vec<TaskId>,
    },

    /// The lag magnitude exceeds what an edge may store
    #[error("lag of {lag_days} days is outside the supported range of +/-{MAX_LAG_DAYS} days")]
    #[diagnostic(
        code(ganttlink_graph::lag_out_of_range),
        help("use a lag within one century of zero")
    )]
    LagOutOfRange {
        /// The rejected lag
        lag_days: i64,
    },

    /// No dependency with the given identifier exists
    #[error("dependency {id} does not exist")]
    #[diagnostic(code(ganttlink_graph::unknown_dependency))]
    UnknownDependency {
        /// The identifier that was not found
        id: DependencyId,
    },

    /// The stored graph state is internally inconsistent
    #[error("dependency graph is corrupted: {message}")]
    #[diagnostic(code(ganttlink_graph::corrupted))]
    CorruptedGraph {
        /// Description of the inconsistency
        message: String,
    },
}

impl Error {
    /// Create a self-dependency error
    #[must_use]
    pub const fn self_dependency(task: TaskId) -> Self {
        Self::SelfDependency { task }
    }

    /// Create a duplicate-dependency error
    #[must_use]
    pub const fn duplicate(predecessor: TaskId, successor: TaskId, existing: DependencyId) -> Self {
        Self::DuplicateDependency {
            predecessor,
            successor,
            existing,
        }
    }

    /// Create a cycle-detected error from the offending walk
    #[must_use]
    pub const fn cycle(path: Vec<TaskId>) -> Self {
        Self::CycleDetected { path }
    }

    /// Create a lag-out-of-range error
    #[must_use]
    pub const fn lag_out_of_range(lag_days: i64) -> Self {
        Self::LagOutOfRange { lag_days }
    }

    /// Create an unknown-dependency error
    #[must_use]
    pub const fn unknown(id: DependencyId) -> Self {
        Self::UnknownDependency { id }
    }

    /// Create a corrupted-graph error with a message
    pub fn corrupted(message: impl Into<String>) -> Self {
        Self::CorruptedGraph {
            message: message.into(),
        }
    }
}

/// Renders a cycle path as `a -> b -> a`.
fn format_cycle(path: &[TaskId]) -> String {
    path.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" -> ")
}

/// Result type for ganttlink-graph operations
pub type Result<T> = std::result::Result<T, Error>;
