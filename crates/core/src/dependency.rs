//! Dependency edges and their typing.
//!
//! A dependency links a predecessor task to a successor task and
//! constrains one boundary date of the successor relative to one
//! boundary date of the predecessor. The four classical precedence
//! types select which boundaries are compared; a signed lag shifts the
//! comparison by whole calendar days.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ids::{DependencyId, TaskId};

// ============================================================================
// Boundaries and precedence types
// ============================================================================

/// One of the two boundary dates of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Boundary {
    /// The task's start date.
    Start,
    /// The task's end date.
    End,
}

impl fmt::Display for Boundary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Start => write!(f, "start"),
            Self::End => write!(f, "end"),
        }
    }
}

/// Precedence type of a dependency edge.
///
/// Every type expresses a lower bound on one successor boundary in
/// terms of one predecessor boundary:
///
/// | Type | Constraint                              |
/// |------|-----------------------------------------|
/// | FS   | `successor.start >= predecessor.end + lag`   |
/// | SS   | `successor.start >= predecessor.start + lag` |
/// | FF   | `successor.end >= predecessor.end + lag`     |
/// | SF   | `successor.end >= predecessor.start + lag`   |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DependencyKind {
    /// Finish-to-start: the successor may start once the predecessor ends.
    #[serde(rename = "FS")]
    FinishToStart,
    /// Start-to-start: the successor may start once the predecessor starts.
    #[serde(rename = "SS")]
    StartToStart,
    /// Finish-to-finish: the successor may end once the predecessor ends.
    #[serde(rename = "FF")]
    FinishToFinish,
    /// Start-to-finish: the successor may end once the predecessor starts.
    #[serde(rename = "SF")]
    StartToFinish,
}

impl DependencyKind {
    /// All precedence types, in conventional order.
    pub const ALL: [Self; 4] = [
        Self::FinishToStart,
        Self::StartToStart,
        Self::FinishToFinish,
        Self::StartToFinish,
    ];

    /// The predecessor boundary this type reads.
    #[must_use]
    pub const fn predecessor_boundary(self) -> Boundary {
        match self {
            Self::FinishToStart | Self::FinishToFinish => Boundary::End,
            Self::StartToStart | Self::StartToFinish => Boundary::Start,
        }
    }

    /// The successor boundary this type constrains.
    #[must_use]
    pub const fn successor_boundary(self) -> Boundary {
        match self {
            Self::FinishToStart | Self::StartToStart => Boundary::Start,
            Self::FinishToFinish | Self::StartToFinish => Boundary::End,
        }
    }

    /// The two-letter wire code, e.g. `"FS"`.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::FinishToStart => "FS",
            Self::StartToStart => "SS",
            Self::FinishToFinish => "FF",
            Self::StartToFinish => "SF",
        }
    }
}

impl fmt::Display for DependencyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Error returned when a dependency type code cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown dependency type `{0}`, expected one of FS, SS, FF, SF")]
pub struct ParseDependencyKindError(pub String);

impl FromStr for DependencyKind {
    type Err = ParseDependencyKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "FS" => Ok(Self::FinishToStart),
            "SS" => Ok(Self::StartToStart),
            "FF" => Ok(Self::FinishToFinish),
            "SF" => Ok(Self::StartToFinish),
            _ => Err(ParseDependencyKindError(s.to_string())),
        }
    }
}

// ============================================================================
// Edges
// ============================================================================

/// A stored dependency edge between two tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    /// Unique identifier of this edge.
    pub id: DependencyId,
    /// The task that constrains.
    pub predecessor: TaskId,
    /// The task being constrained.
    pub successor: TaskId,
    /// Which boundaries are compared.
    pub kind: DependencyKind,
    /// Signed offset in calendar days added to the predecessor boundary.
    /// Negative values express a lead.
    pub lag_days: i64,
    /// Mandatory edges block saves; advisory edges only warn.
    pub mandatory: bool,
    /// Free-form annotation, e.g. why the link exists.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Dependency {
    /// Materializes a stored edge from an insertion request.
    #[must_use]
    pub fn from_spec(id: DependencyId, spec: DependencySpec) -> Self {
        Self {
            id,
            predecessor: spec.predecessor,
            successor: spec.successor,
            kind: spec.kind,
            lag_days: spec.lag_days,
            mandatory: spec.mandatory,
            notes: spec.notes,
        }
    }

    /// Applies a partial update in place. Absent fields keep their value.
    pub fn apply(&mut self, update: &DependencyUpdate) {
        if let Some(kind) = update.kind {
            self.kind = kind;
        }
        if let Some(lag_days) = update.lag_days {
            self.lag_days = lag_days;
        }
        if let Some(mandatory) = update.mandatory {
            self.mandatory = mandatory;
        }
        if let Some(notes) = &update.notes {
            self.notes.clone_from(notes);
        }
    }

    /// Returns `(predecessor, successor)`.
    #[must_use]
    pub const fn endpoints(&self) -> (TaskId, TaskId) {
        (self.predecessor, self.successor)
    }

    /// Whether the edge starts or ends at `task`.
    #[must_use]
    pub fn touches(&self, task: TaskId) -> bool {
        self.predecessor == task || self.successor == task
    }
}

/// Request to insert a new dependency edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencySpec {
    /// The task that constrains.
    pub predecessor: TaskId,
    /// The task being constrained.
    pub successor: TaskId,
    /// Which boundaries are compared.
    pub kind: DependencyKind,
    /// Signed lag in calendar days. Defaults to zero.
    #[serde(default)]
    pub lag_days: i64,
    /// Defaults to mandatory.
    #[serde(default = "default_mandatory")]
    pub mandatory: bool,
    /// Optional annotation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

const fn default_mandatory() -> bool {
    true
}

impl DependencySpec {
    /// A mandatory edge with zero lag and no notes.
    #[must_use]
    pub const fn new(predecessor: TaskId, successor: TaskId, kind: DependencyKind) -> Self {
        Self {
            predecessor,
            successor,
            kind,
            lag_days: 0,
            mandatory: true,
            notes: None,
        }
    }

    /// Sets the lag in calendar days.
    #[must_use]
    pub const fn with_lag(mut self, days: i64) -> Self {
        self.lag_days = days;
        self
    }

    /// Marks the edge advisory instead of mandatory.
    #[must_use]
    pub const fn advisory(mut self) -> Self {
        self.mandatory = false;
        self
    }

    /// Attaches an annotation.
    #[must_use]
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// Partial update of an existing edge. Endpoints are immutable; to
/// rewire a dependency, remove it and insert a new one.
///
/// For `notes`, the outer option distinguishes "leave unchanged"
/// (absent) from "set" (`null` clears, a string replaces).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyUpdate {
    /// New precedence type, if changing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<DependencyKind>,
    /// New lag, if changing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lag_days: Option<i64>,
    /// New mandatory flag, if changing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mandatory: Option<bool>,
    /// New annotation, if changing.
    #[serde(
        default,
        deserialize_with = "deserialize_present",
        skip_serializing_if = "Option::is_none"
    )]
    pub notes: Option<Option<String>>,
}

/// Deserializer for fields where presence matters: only invoked when the
/// field appears in the input, so `null` maps to `Some(None)` rather than
/// being conflated with an absent field.
fn deserialize_present<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

impl DependencyUpdate {
    /// Whether the update changes nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.kind.is_none()
            && self.lag_days.is_none()
            && self.mandatory.is_none()
            && self.notes.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_boundaries() {
        assert_eq!(
            DependencyKind::FinishToStart.predecessor_boundary(),
            Boundary::End
        );
        assert_eq!(
            DependencyKind::FinishToStart.successor_boundary(),
            Boundary::Start
        );
        assert_eq!(
            DependencyKind::StartToStart.predecessor_boundary(),
            Boundary::Start
        );
        assert_eq!(
            DependencyKind::StartToStart.successor_boundary(),
            Boundary::Start
        );
        assert_eq!(
            DependencyKind::FinishToFinish.predecessor_boundary(),
            Boundary::End
        );
        assert_eq!(
            DependencyKind::FinishToFinish.successor_boundary(),
            Boundary::End
        );
        assert_eq!(
            DependencyKind::StartToFinish.predecessor_boundary(),
            Boundary::Start
        );
        assert_eq!(
            DependencyKind::StartToFinish.successor_boundary(),
            Boundary::End
        );
    }

    #[test]
    fn test_kind_codes_round_trip() {
        for kind in DependencyKind::ALL {
            assert_eq!(kind.code().parse::<DependencyKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_kind_parse_is_case_insensitive() {
        assert_eq!(
            "fs".parse::<DependencyKind>().unwrap(),
            DependencyKind::FinishToStart
        );
    }

    #[test]
    fn test_kind_parse_rejects_unknown() {
        let err = "XX".parse::<DependencyKind>().unwrap_err();
        assert!(err.to_string().contains("XX"));
    }

    #[test]
    fn test_kind_serde_uses_codes() {
        let json = serde_json::to_string(&DependencyKind::StartToFinish).unwrap();
        assert_eq!(json, "\"SF\"");
        let back: DependencyKind = serde_json::from_str("\"FF\"").unwrap();
        assert_eq!(back, DependencyKind::FinishToFinish);
    }

    #[test]
    fn test_spec_defaults() {
        let json = format!(
            r#"{{"predecessor":"{}","successor":"{}","kind":"FS"}}"#,
            TaskId::new(),
            TaskId::new()
        );
        let spec: DependencySpec = serde_json::from_str(&json).unwrap();
        assert_eq!(spec.lag_days, 0);
        assert!(spec.mandatory);
        assert!(spec.notes.is_none());
    }

    #[test]
    fn test_spec_builder() {
        let spec = DependencySpec::new(TaskId::new(), TaskId::new(), DependencyKind::StartToStart)
            .with_lag(-2)
            .advisory()
            .with_notes("soft preference");
        assert_eq!(spec.lag_days, -2);
        assert!(!spec.mandatory);
        assert_eq!(spec.notes.as_deref(), Some("soft preference"));
    }

    #[test]
    fn test_update_applies_only_present_fields() {
        let mut dep = Dependency::from_spec(
            DependencyId::new(),
            DependencySpec::new(TaskId::new(), TaskId::new(), DependencyKind::FinishToStart)
                .with_notes("keep me"),
        );
        dep.apply(&DependencyUpdate {
            lag_days: Some(3),
            ..DependencyUpdate::default()
        });
        assert_eq!(dep.lag_days, 3);
        assert_eq!(dep.kind, DependencyKind::FinishToStart);
        assert!(dep.mandatory);
        assert_eq!(dep.notes.as_deref(), Some("keep me"));
    }

    #[test]
    fn test_update_can_clear_notes() {
        let mut dep = Dependency::from_spec(
            DependencyId::new(),
            DependencySpec::new(TaskId::new(), TaskId::new(), DependencyKind::FinishToStart)
                .with_notes("stale"),
        );
        let update: DependencyUpdate = serde_json::from_str(r#"{"notes":null}"#).unwrap();
        dep.apply(&update);
        assert!(dep.notes.is_none());
    }

    #[test]
    fn test_empty_update() {
        assert!(DependencyUpdate::default().is_empty());
        let update = DependencyUpdate {
            mandatory: Some(false),
            ..DependencyUpdate::default()
        };
        assert!(!update.is_empty());
    }
}
