//! Constraint violations reported by the feasibility engine.

use std::fmt;

/// Which constraint a schedule broke.
///
/// The declaration order matches the order in which checks run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum ViolationKind {
    /// An assignment names a task or platform absent from the instance.
    ReferenceIntegrity,
    /// An execution is not inside an admissible window of its task.
    WindowContainment,
    /// Two executions on one platform overlap, or leave less than the
    /// agility transition time between them.
    PlatformOverlap,
    /// Cumulative consumption of a resource exceeds the available budget.
    ResourceBudget,
    /// A non-repeatable task is assigned more than once.
    Duplicate,
}

impl ViolationKind {
    pub fn name(&self) -> &'static str {
        match self {
            ViolationKind::ReferenceIntegrity => "reference integrity",
            ViolationKind::WindowContainment => "window containment",
            ViolationKind::PlatformOverlap => "platform overlap",
            ViolationKind::ResourceBudget => "resource budget",
            ViolationKind::Duplicate => "duplicate assignment",
        }
    }
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The first violated constraint of a schedule.
///
/// Only the feasibility engine creates violations.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Violation {
    kind: ViolationKind,
    assignments: Vec<usize>,
    detail: String,
}

impl Violation {
    pub(crate) fn new(kind: ViolationKind, assignments: Vec<usize>, detail: impl Into<String>) -> Self {
        Self {
            kind,
            assignments,
            detail: detail.into(),
        }
    }

    pub fn kind(&self) -> ViolationKind {
        self.kind
    }

    /// Indices (into the schedule) of the offending assignments, ascending.
    pub fn assignments(&self) -> &[usize] {
        &self.assignments
    }

    /// First offending assignment.
    pub fn assignment_index(&self) -> Option<usize> {
        self.assignments.first().copied()
    }

    pub fn detail(&self) -> &str {
        &self.detail
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at assignment(s) {:?}: {}", self.kind, self.assignments, self.detail)
    }
}
