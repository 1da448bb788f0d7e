//! Constraint violations and their reporting.
//!
//! Evaluating a task's inbound dependencies yields zero or more
//! violations, partitioned into mandatory and advisory. Mandatory
//! violations block a save unless the caller forces it; advisory
//! violations never block.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::dependency::{Boundary, Dependency};
use crate::ids::TaskId;
use crate::schedule::TaskDates;

/// A single unsatisfied dependency constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// The edge whose constraint failed, snapshotted at evaluation time.
    pub dependency: Dependency,
    /// The successor boundary the constraint applies to.
    pub boundary: Boundary,
    /// Earliest date the boundary may hold.
    pub required: NaiveDate,
    /// The date the boundary actually holds.
    pub actual: NaiveDate,
    /// The successor move that would satisfy this constraint with
    /// equality: both set dates shift together, so duration is kept.
    pub suggested_fix: DateShift,
}

impl Violation {
    /// Whether the underlying edge is mandatory.
    #[must_use]
    pub const fn is_mandatory(&self) -> bool {
        self.dependency.mandatory
    }

    /// How many calendar days the actual date falls short of the
    /// required one. Always positive for a recorded violation.
    #[must_use]
    pub fn shortfall_days(&self) -> i64 {
        self.required.signed_duration_since(self.actual).num_days()
    }
}

/// A concrete date move applied to (or proposed for) one task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateShift {
    /// The task being moved.
    pub task: TaskId,
    /// Dates before the move.
    pub from: TaskDates,
    /// Dates after the move.
    pub to: TaskDates,
}

impl DateShift {
    /// Builds a shift record.
    #[must_use]
    pub const fn new(task: TaskId, from: TaskDates, to: TaskDates) -> Self {
        Self { task, from, to }
    }

    /// Calendar days the start boundary moved, when set on both sides.
    #[must_use]
    pub fn start_delta_days(&self) -> Option<i64> {
        match (self.from.start, self.to.start) {
            (Some(from), Some(to)) => Some(to.signed_duration_since(from).num_days()),
            _ => None,
        }
    }
}

/// Outcome of evaluating every inbound dependency of one task.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViolationReport {
    /// The successor task that was evaluated.
    pub task: TaskId,
    /// Violations on mandatory edges. Any entry here blocks a save
    /// unless the caller forces it.
    pub mandatory: Vec<Violation>,
    /// Violations on advisory edges. Reported, never blocking.
    pub advisory: Vec<Violation>,
}

impl ViolationReport {
    /// An empty report for `task`.
    #[must_use]
    pub fn new(task: TaskId) -> Self {
        Self {
            task,
            mandatory: Vec::new(),
            advisory: Vec::new(),
        }
    }

    /// Files a violation under the partition its edge dictates.
    pub fn record(&mut self, violation: Violation) {
        if violation.is_mandatory() {
            self.mandatory.push(violation);
        } else {
            self.advisory.push(violation);
        }
    }

    /// Whether the save may proceed under `force`: true exactly when
    /// no mandatory violation was recorded.
    #[must_use]
    pub fn can_force(&self) -> bool {
        self.mandatory.is_empty()
    }

    /// Whether no violation of either severity was recorded.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.mandatory.is_empty() && self.advisory.is_empty()
    }

    /// Total number of violations across both partitions.
    #[must_use]
    pub fn violation_count(&self) -> usize {
        self.mandatory.len() + self.advisory.len()
    }

    /// Iterates mandatory violations first, then advisory.
    pub fn iter(&self) -> impl Iterator<Item = &Violation> {
        self.mandatory.iter().chain(self.advisory.iter())
    }

    /// The latest required date among violations constraining the given
    /// boundary, i.e. the date that would satisfy all of them at once.
    #[must_use]
    pub fn latest_required(&self, boundary: Boundary) -> Option<NaiveDate> {
        self.iter()
            .filter(|v| v.boundary == boundary)
            .map(|v| v.required)
            .max()
    }
}

impl<'a> IntoIterator for &'a ViolationReport {
    type Item = &'a Violation;
    type IntoIter = std::iter::Chain<
        std::slice::Iter<'a, Violation>,
        std::slice::Iter<'a, Violation>,
    >;

    fn into_iter(self) -> Self::IntoIter {
        self.mandatory.iter().chain(self.advisory.iter())
    }
}
