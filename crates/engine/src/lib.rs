//! Temporal dependency constraints between scheduled tasks.
//!
//! Sits on top of [`ganttlink_graph`]'s cycle-free edge store and adds
//! the date side: evaluating typed precedence constraints (FS, SS, FF,
//! SF, each with signed lag), splitting violations into mandatory and
//! advisory, and cascading minimal fixes downstream when a schedule
//! slips.
//!
//! # Key Types
//!
//! - [`ConstraintEngine`]: one project's graph and dates behind a
//!   lock, with every mutation gated on the temporal rules
//! - [`TaskStore`]: where task dates live; [`MemoryTaskStore`] covers
//!   tests and single-process use
//! - [`Evaluation`]: one edge checked against two tasks' dates
//! - [`PropagationOutcome`]: what an auto-adjust run moved and what it
//!   could not fix
//! - [`api`]: request and response shapes for transport handlers
//!
//! # Example
//!
//! ```
//! use chrono::NaiveDate;
//! use ganttlink_core::{DependencyKind, DependencySpec, TaskDates, TaskId};
//! use ganttlink_engine::{ConstraintEngine, MemoryTaskStore};
//!
//! let engine = ConstraintEngine::new(MemoryTaskStore::new());
//! let design = TaskId::new();
//! let build = TaskId::new();
//!
//! let date = |y, m, d| NaiveDate::from_ymd_opt(y, m, d).unwrap();
//! engine.register_task(design, TaskDates::new(date(2024, 1, 1), date(2024, 1, 10)))?;
//! engine.register_task(build, TaskDates::new(date(2024, 1, 10), date(2024, 1, 20)))?;
//!
//! // Build may start once design ends.
//! let (edge, warning) = engine.add_dependency(
//!     DependencySpec::new(design, build, DependencyKind::FinishToStart),
//!     false,
//! )?;
//! assert!(warning.is_none());
//! assert_eq!(edge.successor, build);
//! assert!(engine.check_task(build)?.is_clean());
//! # Ok::<(), ganttlink_engine::Error>(())
//! ```

pub mod api;
mod error;
mod evaluate;
mod propagate;
mod report;
mod service;
mod store;

pub use error::{Error, Result};
pub use evaluate::{Evaluation, evaluate, required_date};
pub use propagate::{PropagationOptions, PropagationOutcome, UnresolvableConflict, auto_adjust};
pub use report::{check_candidate_in_store, check_task, check_task_in_store};
pub use service::{ConstraintEngine, EngineRegistry};
pub use store::{MemoryTaskStore, TaskStore};
