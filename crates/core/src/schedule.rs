//! Task boundary dates.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::dependency::Boundary;

/// The two boundary dates of a task. Either may be unset; constraints
/// against an unset boundary are vacuously satisfied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDates {
    /// Planned start date, inclusive.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<NaiveDate>,
    /// Planned end date, inclusive.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<NaiveDate>,
}

impl TaskDates {
    /// Both boundaries unset.
    #[must_use]
    pub const fn unset() -> Self {
        Self {
            start: None,
            end: None,
        }
    }

    /// Both boundaries set.
    #[must_use]
    pub const fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }

    /// Reads one boundary.
    #[must_use]
    pub const fn boundary(&self, boundary: Boundary) -> Option<NaiveDate> {
        match boundary {
            Boundary::Start => self.start,
            Boundary::End => self.end,
        }
    }

    /// Replaces one boundary, leaving the other untouched.
    #[must_use]
    pub const fn with_boundary(self, boundary: Boundary, date: NaiveDate) -> Self {
        match boundary {
            Boundary::Start => Self {
                start: Some(date),
                ..self
            },
            Boundary::End => Self {
                end: Some(date),
                ..self
            },
        }
    }

    /// Calendar days from start to end, when both are set.
    ///
    /// A task starting and ending on the same day has a duration of
    /// zero days; the value is negative when the interval is inverted.
    #[must_use]
    pub fn duration_days(&self) -> Option<i64> {
        match (self.start, self.end) {
            (Some(start), Some(end)) => Some(end.signed_duration_since(start).num_days()),
            _ => None,
        }
    }

    /// Moves every set boundary by the same number of calendar days,
    /// preserving the duration. Boundaries that would leave the
    /// representable calendar clamp at its edge instead.
    #[must_use]
    pub fn shifted_by(self, days: i64) -> Self {
        Self {
            start: self.start.map(|d| saturating_add_days(d, days)),
            end: self.end.map(|d| saturating_add_days(d, days)),
        }
    }

    /// Whether at least one boundary is set.
    #[must_use]
    pub const fn is_scheduled(&self) -> bool {
        self.start.is_some() || self.end.is_some()
    }

    /// Whether the interval is ordered: start on or before end, or at
    /// least one boundary unset.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        match (self.start, self.end) {
            (Some(start), Some(end)) => start <= end,
            _ => true,
        }
    }
}

/// Adds a signed number of calendar days to a date, clamping at
/// [`NaiveDate::MIN`] and [`NaiveDate::MAX`] instead of overflowing.
#[must_use]
pub fn saturating_add_days(date: NaiveDate, days: i64) -> NaiveDate {
    match Duration::try_days(days).and_then(|delta| date.checked_add_signed(delta)) {
        Some(shifted) => shifted,
        None if days < 0 => NaiveDate::MIN,
        None => NaiveDate::MAX,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_boundary_access() {
        let dates = TaskDates::new(date(2024, 1, 5), date(2024, 1, 10));
        assert_eq!(dates.boundary(Boundary::Start), Some(date(2024, 1, 5)));
        assert_eq!(dates.boundary(Boundary::End), Some(date(2024, 1, 10)));
    }

    #[test]
    fn test_with_boundary_keeps_other_side() {
        let dates = TaskDates::new(date(2024, 1, 5), date(2024, 1, 10))
            .with_boundary(Boundary::Start, date(2024, 1, 7));
        assert_eq!(dates.start, Some(date(2024, 1, 7)));
        assert_eq!(dates.end, Some(date(2024, 1, 10)));
    }

    #[test]
    fn test_duration() {
        let dates = TaskDates::new(date(2024, 1, 5), date(2024, 1, 10));
        assert_eq!(dates.duration_days(), Some(5));
        assert_eq!(TaskDates::unset().duration_days(), None);
    }

    #[test]
    fn test_shift_preserves_duration() {
        let dates = TaskDates::new(date(2024, 1, 5), date(2024, 1, 10)).shifted_by(9);
        assert_eq!(dates.start, Some(date(2024, 1, 14)));
        assert_eq!(dates.end, Some(date(2024, 1, 19)));
        assert_eq!(dates.duration_days(), Some(5));
    }

    #[test]
    fn test_shift_crosses_month_end() {
        let dates = TaskDates::new(date(2024, 1, 30), date(2024, 2, 2)).shifted_by(3);
        assert_eq!(dates.start, Some(date(2024, 2, 2)));
        assert_eq!(dates.end, Some(date(2024, 2, 5)));
    }

    #[test]
    fn test_negative_shift() {
        let dates = TaskDates {
            start: Some(date(2024, 3, 1)),
            end: None,
        }
        .shifted_by(-1);
        assert_eq!(dates.start, Some(date(2024, 2, 29)));
        assert_eq!(dates.end, None);
    }

    #[test]
    fn test_shift_clamps_at_calendar_bounds() {
        // A shift no date can absorb pins both boundaries to the edge
        // instead of overflowing.
        let dates = TaskDates::new(date(2024, 1, 5), date(2024, 1, 10)).shifted_by(i64::MAX);
        assert_eq!(dates.start, Some(NaiveDate::MAX));
        assert_eq!(dates.end, Some(NaiveDate::MAX));
        assert!(dates.is_well_formed());

        let dates = TaskDates::new(date(2024, 1, 5), date(2024, 1, 10)).shifted_by(i64::MIN);
        assert_eq!(dates.start, Some(NaiveDate::MIN));
        assert_eq!(dates.end, Some(NaiveDate::MIN));

        // A shift that fits the delta type but not the calendar clamps too.
        assert_eq!(
            saturating_add_days(date(2024, 1, 5), 200_000_000),
            NaiveDate::MAX
        );
        assert_eq!(saturating_add_days(date(2024, 1, 5), 3), date(2024, 1, 8));
    }

    #[test]
    fn test_well_formed() {
        assert!(TaskDates::new(date(2024, 1, 5), date(2024, 1, 5)).is_well_formed());
        assert!(!TaskDates::new(date(2024, 1, 6), date(2024, 1, 5)).is_well_formed());
        assert!(
            TaskDates {
                start: None,
                end: Some(date(2024, 1, 5)),
            }
            .is_well_formed()
        );
    }

    #[test]
    fn test_is_scheduled() {
        assert!(!TaskDates::unset().is_scheduled());
        assert!(
            TaskDates {
                start: Some(date(2024, 1, 1)),
                end: None,
            }
            .is_scheduled()
        );
    }
}
