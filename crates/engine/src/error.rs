//! Error types for the ganttlink-engine crate

use ganttlink_core::{TaskId, ViolationReport};
use miette::Diagnostic;
use thiserror::Error;

/// Main error type for ganttlink-engine operations
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    /// Structural graph rejection; never force-overridable
    #[error(transparent)]
    #[diagnostic(transparent)]
    Graph(#[from] ganttlink_graph::Error),

    /// The task is unknown to the task store
    #[error("task {task} does not exist")]
    #[diagnostic(code(ganttlink_engine::task_not_found))]
    TaskNotFound {
        /// The identifier that was not found
        task: TaskId,
    },

    /// The requested dates are not an interval
    #[error("task {task} cannot start after it ends")]
    #[diagnostic(code(ganttlink_engine::invalid_dates))]
    InvalidDates {
        /// The task whose dates were rejected
        task: TaskId,
    },

    /// A mandatory constraint blocked the change; overridable with force
    #[error("change to task {} breaks {} mandatory constraint(s)", .report.task, .report.mandatory.len())]
    #[diagnostic(
        code(ganttlink_engine::mandatory_violation),
        help("pass the force flag to apply anyway, then run auto-adjust to restore consistency")
    )]
    MandatoryViolation {
        /// The full evaluation, with the violations the caller must
        /// acknowledge
        report: Box<ViolationReport>,
    },

    /// The task store failed to read or write
    #[error("task store error: {message}")]
    #[diagnostic(code(ganttlink_engine::store))]
    Store {
        /// Description of the store failure
        message: String,
    },
}

impl Error {
    /// Create a task-not-found error
    #[must_use]
    pub const fn task_not_found(task: TaskId) -> Self {
        Self::TaskNotFound { task }
    }

    /// Create an invalid-dates error
    #[must_use]
    pub const fn invalid_dates(task: TaskId) -> Self {
        Self::InvalidDates { task }
    }

    /// Create a mandatory-violation rejection from a report
    #[must_use]
    pub fn mandatory_violation(report: ViolationReport) -> Self {
        Self::MandatoryViolation {
            report: Box::new(report),
        }
    }

    /// Create a store error with a message
    pub fn store(message: impl Into<String>) -> Self {
        Self::Store {
            message: message.into(),
        }
    }

    /// The report carried by a mandatory-violation rejection, if that
    /// is what this error is.
    #[must_use]
    pub fn violation_report(&self) -> Option<&ViolationReport> {
        match self {
            Self::MandatoryViolation { report } => Some(report),
            _ => None,
        }
    }
}

/// Result type for ganttlink-engine operations
pub type Result<T> = std::result::Result<T, Error>;
