//! Error types.

use std::fmt;
use thiserror::Error;

/// Structural problems that prevent a solve from starting.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("grid parameter {field} must be positive (got {value})")]
    InvalidGrid { field: &'static str, value: u32 },
    #[error("break after period {after} is outside the {periods}-period day")]
    BreakOutOfRange { after: u32, periods: u32 },
    #[error("period table runs past midnight")]
    PastMidnight,
    #[error("no faculty responsible for {kind} sessions of offering '{offering_id}'")]
    MissingResponsibility { offering_id: String, kind: String },
    #[error("{count} faculty share responsibility for {kind} sessions of offering '{offering_id}'")]
    AmbiguousResponsibility {
        offering_id: String,
        kind: String,
        count: usize,
    },
    #[error("offering '{offering_id}' references unknown {entity} '{id}'")]
    UnknownReference {
        offering_id: String,
        entity: &'static str,
        id: String,
    },
}

/// Persistence failures from a catalog source or schedule store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("{0} lock poisoned")]
    Poisoned(&'static str),
    #[error("schedule rejected: {0}")]
    Rejected(String),
    #[error("backend error: {0}")]
    Backend(String),
}

/// Constraint family, used to name what made a search fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstraintClass {
    /// A requirement cannot receive exactly its session count.
    Coverage,
    /// A faculty member would teach two sessions in one slot.
    FacultyDoubleBooking,
    /// A section would attend two sessions in one slot.
    SectionDoubleBooking,
    /// A classroom would host two sessions in one slot.
    ClassroomDoubleBooking,
    /// A faculty member's weekly total leaves `[min, max]`.
    Workload,
}

impl fmt::Display for ConstraintClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConstraintClass::Coverage => "coverage",
            ConstraintClass::FacultyDoubleBooking => "faculty double-booking",
            ConstraintClass::SectionDoubleBooking => "section double-booking",
            ConstraintClass::ClassroomDoubleBooking => "classroom double-booking",
            ConstraintClass::Workload => "faculty workload",
        };
        f.write_str(name)
    }
}

/// Why no timetable was produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InfeasibleReason {
    /// Search exhausted every branch.
    Proven {
        /// Constraint family of the deepest conflict on the final path.
        class: ConstraintClass,
        detail: String,
    },
    /// Search budget ran out first. Retrying with a larger budget may succeed.
    Timeout { budget_ms: u64 },
}

impl InfeasibleReason {
    pub fn is_proven(&self) -> bool {
        matches!(self, InfeasibleReason::Proven { .. })
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, InfeasibleReason::Timeout { .. })
    }

    /// Failing constraint family, if proven.
    pub fn class(&self) -> Option<ConstraintClass> {
        match self {
            InfeasibleReason::Proven { class, .. } => Some(*class),
            InfeasibleReason::Timeout { .. } => None,
        }
    }
}

impl fmt::Display for InfeasibleReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InfeasibleReason::Proven { class, detail } => {
                write!(f, "proven infeasible ({class}): {detail}")
            }
            InfeasibleReason::Timeout { budget_ms } => {
                write!(f, "no solution found within {budget_ms} ms")
            }
        }
    }
}

/// Failure of the pure planning pipeline.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SolveError {
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigError),
    #[error("{0}")]
    Infeasible(InfeasibleReason),
}

/// Failure of an engine operation that reads both the catalog and the
/// store without solving.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchedulerError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Store(#[from] StoreError),
}
