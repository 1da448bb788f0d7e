//! Wire-facing request and response shapes.
//!
//! The engine itself speaks domain types. These DTOs pin down the JSON
//! field names and defaulting that transport handlers promise, and the
//! conversions map domain results onto them. All payloads use
//! snake_case fields; dependency endpoints are addressed from the
//! successor's side, so `depends_on_task_id` names the predecessor.

use chrono::NaiveDate;
use ganttlink_core::{
    Boundary, DateShift, Dependency, DependencyId, DependencyKind, DependencySpec,
    DependencyUpdate, TaskDates, TaskId, Violation, ViolationReport,
};
use serde::{Deserialize, Deserializer, Serialize};

use crate::propagate::{PropagationOptions, PropagationOutcome, UnresolvableConflict};

/// Deserializes a field that was present, keeping `null` distinct from
/// the field being absent.
fn deserialize_present<'de, D, T>(
    deserializer: D,
) -> std::result::Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

const fn default_mandatory() -> bool {
    true
}

const fn default_preserve_duration() -> bool {
    true
}

// ============================================================================
// Dependency requests
// ============================================================================

/// Body of a dry-run edge check for the task in the request path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidateDependencyRequest {
    /// The proposed predecessor.
    pub depends_on_task_id: TaskId,
    /// The proposed precedence type.
    pub dependency_type: DependencyKind,
}

impl ValidateDependencyRequest {
    /// The insertion this request is asking about, with `task` as the
    /// successor.
    #[must_use]
    pub fn spec(&self, task: TaskId) -> DependencySpec {
        DependencySpec::new(self.depends_on_task_id, task, self.dependency_type)
    }
}

/// Answer to a dry-run edge check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidateDependencyResponse {
    /// Whether the edge could be inserted.
    pub valid: bool,
    /// Why not, when it could not.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ValidateDependencyResponse {
    /// The edge would be accepted.
    #[must_use]
    pub const fn ok() -> Self {
        Self {
            valid: true,
            error: None,
        }
    }

    /// The edge would be rejected for the given reason.
    #[must_use]
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self {
            valid: false,
            error: Some(reason.into()),
        }
    }
}

/// Body of a dependency creation for the task in the request path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateDependencyRequest {
    /// The predecessor task.
    pub depends_on_task_id: TaskId,
    /// The precedence type.
    pub dependency_type: DependencyKind,
    /// Signed lag in calendar days, capped at one century either way.
    /// Defaults to zero.
    #[serde(default)]
    pub lag_days: i64,
    /// Defaults to mandatory.
    #[serde(default = "default_mandatory")]
    pub mandatory: bool,
    /// Optional annotation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Create even if the edge is violated by current dates.
    #[serde(default)]
    pub force: bool,
}

impl CreateDependencyRequest {
    /// The insertion this request describes, with `task` as the
    /// successor.
    #[must_use]
    pub fn into_spec(self, task: TaskId) -> DependencySpec {
        DependencySpec {
            predecessor: self.depends_on_task_id,
            successor: task,
            kind: self.dependency_type,
            lag_days: self.lag_days,
            mandatory: self.mandatory,
            notes: self.notes,
        }
    }
}

/// Body of a dependency update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateDependencyRequest {
    /// New precedence type, if changing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dependency_type: Option<DependencyKind>,
    /// New lag, if changing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lag_days: Option<i64>,
    /// New mandatory flag, if changing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mandatory: Option<bool>,
    /// New notes: absent leaves them, `null` clears, a string replaces.
    #[serde(
        default,
        deserialize_with = "deserialize_present",
        skip_serializing_if = "Option::is_none"
    )]
    pub notes: Option<Option<String>>,
    /// Apply even if the updated edge is violated by current dates.
    #[serde(default)]
    pub force: bool,
}

impl UpdateDependencyRequest {
    /// The partial update this request describes.
    #[must_use]
    pub fn to_update(&self) -> DependencyUpdate {
        DependencyUpdate {
            kind: self.dependency_type,
            lag_days: self.lag_days,
            mandatory: self.mandatory,
            notes: self.notes.clone(),
        }
    }
}

// ============================================================================
// Dependency responses
// ============================================================================

/// A dependency edge as clients see it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyPayload {
    /// Edge id.
    pub id: DependencyId,
    /// The constrained (successor) task.
    pub task_id: TaskId,
    /// The constraining (predecessor) task.
    pub depends_on_task_id: TaskId,
    /// Precedence type.
    pub dependency_type: DependencyKind,
    /// Signed lag in calendar days.
    pub lag_days: i64,
    /// Whether the edge blocks saves.
    pub mandatory: bool,
    /// Annotation, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl From<&Dependency> for DependencyPayload {
    fn from(edge: &Dependency) -> Self {
        Self {
            id: edge.id,
            task_id: edge.successor,
            depends_on_task_id: edge.predecessor,
            dependency_type: edge.kind,
            lag_days: edge.lag_days,
            mandatory: edge.mandatory,
            notes: edge.notes.clone(),
        }
    }
}

/// One broken constraint, flattened for clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViolationPayload {
    /// The predecessor whose schedule is not being respected.
    pub depends_on_task_id: TaskId,
    /// Precedence type of the broken edge.
    pub dependency_type: DependencyKind,
    /// Lag of the broken edge.
    pub lag_days: i64,
    /// Whether the edge is mandatory.
    pub mandatory: bool,
    /// The successor boundary that is too early.
    pub boundary: Boundary,
    /// Earliest date the boundary may sit on.
    pub required_date: NaiveDate,
    /// Where the boundary actually sits.
    pub actual_date: NaiveDate,
    /// How many days short the boundary is.
    pub shortfall_days: i64,
}

impl From<&Violation> for ViolationPayload {
    fn from(violation: &Violation) -> Self {
        Self {
            depends_on_task_id: violation.dependency.predecessor,
            dependency_type: violation.dependency.kind,
            lag_days: violation.dependency.lag_days,
            mandatory: violation.is_mandatory(),
            boundary: violation.boundary,
            required_date: violation.required,
            actual_date: violation.actual,
            shortfall_days: violation.shortfall_days(),
        }
    }
}

/// Success body for dependency creation and update. `warning` is set
/// when the edge was kept despite being violated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyEnvelope {
    /// The stored edge.
    pub dependency: DependencyPayload,
    /// The violation the caller chose to keep, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<ViolationPayload>,
}

impl DependencyEnvelope {
    /// Wraps a stored edge and the gate's warning report.
    #[must_use]
    pub fn new(dependency: &Dependency, warning: Option<&ViolationReport>) -> Self {
        Self {
            dependency: dependency.into(),
            warning: warning
                .and_then(|report| report.iter().next())
                .map(ViolationPayload::from),
        }
    }
}

/// Rejection body for a dependency creation that broke a mandatory
/// constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyRejection {
    /// The broken constraint.
    pub violation: ViolationPayload,
    /// The successor move that would satisfy it.
    pub suggestion: MovedTaskPayload,
    /// Whether applying the suggestion is possible.
    pub can_auto_fix: bool,
    /// Earliest allowed start, when the start boundary is constrained.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_start_date: Option<NaiveDate>,
}

impl DependencyRejection {
    /// Builds the rejection body from a gate's report. `None` when the
    /// report holds no mandatory violation.
    #[must_use]
    pub fn from_report(report: &ViolationReport) -> Option<Self> {
        let violation = report.mandatory.first()?;
        Some(Self {
            violation: violation.into(),
            suggestion: MovedTaskPayload::from(&violation.suggested_fix),
            can_auto_fix: violation.suggested_fix.to.is_well_formed(),
            required_start_date: (violation.boundary == Boundary::Start)
                .then_some(violation.required),
        })
    }
}

/// Edges around one task, split by direction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyListing {
    /// Edges the task depends on (it is the successor).
    pub dependencies: Vec<DependencyPayload>,
    /// Edges depending on the task (it is the predecessor).
    pub dependents: Vec<DependencyPayload>,
}

impl DependencyListing {
    /// Maps the engine's listing onto payloads.
    #[must_use]
    pub fn new(dependencies: &[Dependency], dependents: &[Dependency]) -> Self {
        Self {
            dependencies: dependencies.iter().map(DependencyPayload::from).collect(),
            dependents: dependents.iter().map(DependencyPayload::from).collect(),
        }
    }
}

// ============================================================================
// Task scheduling
// ============================================================================

/// Partial date change for one task. For each date the outer option
/// distinguishes "leave alone" (absent) from "set" (`null` clears, a
/// date replaces).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDatesPatch {
    /// New start date, if the field was present.
    #[serde(
        default,
        deserialize_with = "deserialize_present",
        skip_serializing_if = "Option::is_none"
    )]
    pub start_date: Option<Option<NaiveDate>>,
    /// New end date, if the field was present.
    #[serde(
        default,
        deserialize_with = "deserialize_present",
        skip_serializing_if = "Option::is_none"
    )]
    pub end_date: Option<Option<NaiveDate>>,
    /// Save even if mandatory constraints break.
    #[serde(default)]
    pub force_update: bool,
}

impl TaskDatesPatch {
    /// The dates the task would have after this patch.
    #[must_use]
    pub const fn apply_to(&self, current: TaskDates) -> TaskDates {
        TaskDates {
            start: match self.start_date {
                Some(start) => start,
                None => current.start,
            },
            end: match self.end_date {
                Some(end) => end,
                None => current.end,
            },
        }
    }

    /// Whether the patch changes neither date.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.start_date.is_none() && self.end_date.is_none()
    }
}

/// Success body for a task date change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskUpdated {
    /// The task that changed.
    pub task_id: TaskId,
    /// Stored start date.
    pub start_date: Option<NaiveDate>,
    /// Stored end date.
    pub end_date: Option<NaiveDate>,
    /// Constraints broken by the stored dates, kept at the caller's
    /// request.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<ViolationPayload>,
}

impl TaskUpdated {
    /// Wraps the stored dates and whatever the gate reported.
    #[must_use]
    pub fn new(task: TaskId, dates: TaskDates, report: &ViolationReport) -> Self {
        Self {
            task_id: task,
            start_date: dates.start,
            end_date: dates.end,
            warnings: report.iter().map(ViolationPayload::from).collect(),
        }
    }
}

/// Rejection body for a task date change that broke mandatory
/// constraints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskUpdateRejection {
    /// Every broken constraint, mandatory first.
    pub violations: Vec<ViolationPayload>,
    /// Whether retrying with `force_update` would succeed.
    pub can_force: bool,
}

impl TaskUpdateRejection {
    /// Builds the rejection body from the gate's report.
    #[must_use]
    pub fn from_report(report: &ViolationReport) -> Self {
        Self {
            violations: report.iter().map(ViolationPayload::from).collect(),
            can_force: !report.mandatory.is_empty(),
        }
    }
}

// ============================================================================
// Propagation
// ============================================================================

/// Body of an auto-adjust run rooted at the task in the request path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoAdjustRequest {
    /// Shift start and end together. Defaults to true.
    #[serde(default = "default_preserve_duration")]
    pub preserve_duration: bool,
    /// Let advisory violations trigger shifts too. Defaults to false.
    #[serde(default)]
    pub include_advisory: bool,
}

impl AutoAdjustRequest {
    /// The propagation options this request describes.
    #[must_use]
    pub const fn options(&self) -> PropagationOptions {
        PropagationOptions {
            preserve_duration: self.preserve_duration,
            include_advisory: self.include_advisory,
        }
    }
}

impl Default for AutoAdjustRequest {
    fn default() -> Self {
        Self {
            preserve_duration: true,
            include_advisory: false,
        }
    }
}

/// One rescheduled task, with its dates before and after.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovedTaskPayload {
    /// The task that moved.
    pub task_id: TaskId,
    /// Start before the move.
    pub old_start: Option<NaiveDate>,
    /// End before the move.
    pub old_end: Option<NaiveDate>,
    /// Start after the move.
    pub new_start: Option<NaiveDate>,
    /// End after the move.
    pub new_end: Option<NaiveDate>,
}

impl From<&DateShift> for MovedTaskPayload {
    fn from(shift: &DateShift) -> Self {
        Self {
            task_id: shift.task,
            old_start: shift.from.start,
            old_end: shift.from.end,
            new_start: shift.to.start,
            new_end: shift.to.end,
        }
    }
}

/// One task the propagator had to leave behind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnresolvablePayload {
    /// The task that could not be moved into compliance.
    pub task_id: TaskId,
    /// The constraints it still breaks.
    pub violations: Vec<ViolationPayload>,
}

impl From<&UnresolvableConflict> for UnresolvablePayload {
    fn from(conflict: &UnresolvableConflict) -> Self {
        Self {
            task_id: conflict.task,
            violations: conflict.report.iter().map(ViolationPayload::from).collect(),
        }
    }
}

/// Response body for an auto-adjust run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoAdjustOutcome {
    /// Tasks that were rescheduled, in cascade order.
    pub moved_tasks: Vec<MovedTaskPayload>,
    /// Tasks that could not be fixed.
    pub unresolvable: Vec<UnresolvablePayload>,
}

impl From<&PropagationOutcome> for AutoAdjustOutcome {
    fn from(outcome: &PropagationOutcome) -> Self {
        Self {
            moved_tasks: outcome.moved.iter().map(MovedTaskPayload::from).collect(),
            unresolvable: outcome
                .unresolvable
                .iter()
                .map(UnresolvablePayload::from)
                .collect(),
        }
    }
}
