//! Cycle-safe dependency graph maintenance for ganttlink.
//!
//! This crate owns the structural half of the constraint engine: which
//! task depends on which, over typed precedence edges. Every mutation
//! is validated up front, so the graph held here is a DAG at every
//! observable moment; temporal evaluation of the edges lives in
//! `ganttlink-engine`.
//!
//! # Key Types
//!
//! - [`DependencyGraph`]: arena of edges plus per-task adjacency, the authoritative store
//! - [`GraphAudit`]: structural self-check for restored state
//! - [`Error`]: structural rejections (oversized lag, self-dependency, duplicate, cycle)
//!
//! # Example
//!
//! ```
//! use ganttlink_core::{DependencyKind, DependencySpec, TaskId};
//! use ganttlink_graph::DependencyGraph;
//!
//! let design = TaskId::new();
//! let build = TaskId::new();
//! let ship = TaskId::new();
//!
//! let mut graph = DependencyGraph::new();
//! graph.insert(DependencySpec::new(design, build, DependencyKind::FinishToStart))?;
//! graph.insert(DependencySpec::new(build, ship, DependencyKind::FinishToStart))?;
//!
//! // Closing the loop is rejected, state unchanged.
//! assert!(graph
//!     .insert(DependencySpec::new(ship, design, DependencyKind::FinishToStart))
//!     .is_err());
//! assert_eq!(graph.edge_count(), 2);
//!
//! // Date changes to `design` must revisit `build`, then `ship`.
//! assert_eq!(graph.downstream_order(design)?, vec![build, ship]);
//! # Ok::<(), ganttlink_graph::Error>(())
//! ```

mod cycle;
mod error;
mod graph;
mod traversal;
mod validation;

pub use error::{Error, Result};
pub use graph::{DependencyGraph, MAX_LAG_DAYS, check_lag};
pub use validation::GraphAudit;
