use thiserror::Error;

use crate::data::{StudentId, SupervisorId};

/// Errors that stop a scheduling run.
///
/// Students that cannot be placed are not errors; they are reported as
/// unassigned records in the output.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScheduleError {
    #[error("configuration value `{field}` must be positive")]
    InvalidConfig { field: &'static str },
    #[error(
        "grid of {days} days x {periods_per_day} periods x {rooms} rooms exceeds {limit} instances"
    )]
    GridTooLarge {
        days: u32,
        periods_per_day: u32,
        rooms: u32,
        limit: u32,
    },
    #[error(
        "availability for supervisor {supervisor} has {actual} slots, expected {expected} (days x periods)"
    )]
    AvailabilityLength {
        supervisor: SupervisorId,
        expected: usize,
        actual: usize,
    },
    #[error(
        "student {student} references supervisor {supervisor}, but only {supervisors} supervisors have availability"
    )]
    UnknownSupervisor {
        student: StudentId,
        supervisor: SupervisorId,
        supervisors: usize,
    },
    #[error("no feasible assignment exists for every student")]
    Infeasible,
    #[error("solver error: {0}")]
    Solver(String),
}

impl ScheduleError {
    /// True for defects in the request itself rather than in solving it.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            ScheduleError::InvalidConfig { .. }
                | ScheduleError::GridTooLarge { .. }
                | ScheduleError::AvailabilityLength { .. }
                | ScheduleError::UnknownSupervisor { .. }
        )
    }
}
