//! Constraint evaluation for a single dependency edge.
//!
//! Every precedence type bounds one successor boundary from below:
//! the successor boundary must fall on or after the predecessor
//! boundary plus the edge's lag. Arithmetic is in plain calendar days;
//! business calendars are out of scope.

use chrono::NaiveDate;
use ganttlink_core::{DateShift, Dependency, TaskDates, Violation, saturating_add_days};

/// Outcome of evaluating one edge against concrete dates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Evaluation {
    /// The constraint holds, or cannot be judged because a relevant
    /// boundary is unset.
    Satisfied,
    /// The successor boundary falls before its required date.
    Violated(Violation),
}

impl Evaluation {
    /// Whether the constraint holds.
    #[must_use]
    pub const fn is_satisfied(&self) -> bool {
        matches!(self, Self::Satisfied)
    }

    /// The violation, if there is one.
    #[must_use]
    pub fn into_violation(self) -> Option<Violation> {
        match self {
            Self::Satisfied => None,
            Self::Violated(violation) => Some(violation),
        }
    }
}

/// The earliest date the successor boundary may hold: the predecessor
/// boundary plus lag. `None` when the predecessor boundary is unset,
/// in which case the edge constrains nothing. A sum past either end of
/// the representable calendar clamps to that end, so a lag no schedule
/// can absorb reads as a requirement no date can meet.
#[must_use]
pub fn required_date(dep: &Dependency, predecessor: &TaskDates) -> Option<NaiveDate> {
    predecessor
        .boundary(dep.kind.predecessor_boundary())
        .map(|date| saturating_add_days(date, dep.lag_days))
}

/// Evaluate one edge given both endpoint dates.
///
/// Unset boundaries satisfy vacuously: an unscheduled task can never
/// violate a constraint. On violation, the attached fix shifts the
/// successor forward until the constrained boundary lands exactly on
/// the required date, moving both set dates together.
#[must_use]
pub fn evaluate(dep: &Dependency, predecessor: &TaskDates, successor: &TaskDates) -> Evaluation {
    let Some(required) = required_date(dep, predecessor) else {
        return Evaluation::Satisfied;
    };
    let Some(actual) = successor.boundary(dep.kind.successor_boundary()) else {
        return Evaluation::Satisfied;
    };
    if actual >= required {
        return Evaluation::Satisfied;
    }

    let shift = required.signed_duration_since(actual).num_days();
    Evaluation::Violated(Violation {
        dependency: dep.clone(),
        boundary: dep.kind.successor_boundary(),
        required,
        actual,
        suggested_fix: DateShift::new(dep.successor, *successor, successor.shifted_by(shift)),
    })
}
