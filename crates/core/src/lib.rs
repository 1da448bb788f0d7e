//! Shared vocabulary for the ganttlink dependency constraint engine.
//!
//! This crate defines the domain types every other ganttlink crate
//! speaks in: typed identifiers, dependency edges with their four
//! precedence types, task boundary dates, and violation reports.
//! It contains no graph state and no evaluation logic.
//!
//! # Key Types
//!
//! - [`TaskId`], [`DependencyId`], [`ProjectId`]: UUID newtypes keeping the id spaces apart
//! - [`DependencyKind`]: the FS / SS / FF / SF precedence types
//! - [`Dependency`]: a stored edge; [`DependencySpec`] and [`DependencyUpdate`] are its
//!   insertion and patch payloads
//! - [`TaskDates`]: a task's optional start and end boundaries
//! - [`ViolationReport`]: mandatory/advisory partition of failed constraints
//!
//! # Example
//!
//! ```
//! use ganttlink_core::{DependencyKind, DependencySpec, TaskId};
//!
//! let design = TaskId::new();
//! let build = TaskId::new();
//!
//! // Build may start two days after design ends.
//! let spec = DependencySpec::new(design, build, DependencyKind::FinishToStart).with_lag(2);
//! assert_eq!(spec.kind.code(), "FS");
//! assert!(spec.mandatory);
//! ```

pub mod dependency;
pub mod ids;
pub mod schedule;
pub mod violation;

pub use dependency::{
    Boundary, Dependency, DependencyKind, DependencySpec, DependencyUpdate,
    ParseDependencyKindError,
};
pub use ids::{DependencyId, ProjectId, TaskId};
pub use schedule::{TaskDates, saturating_add_days};
pub use violation::{DateShift, Violation, ViolationReport};
