use crate::data::{SchedulerConfig, SchedulingInput};
use crate::error::ScheduleError;

/// Rejects malformed input before any placement starts.
///
/// Checks that every configuration value is positive, that the grid fits
/// in `SchedulerConfig::MAX_INSTANCES`, that each availability row covers
/// days x periods slots, and that every student's supervisor has an
/// availability row.
pub fn validate(input: &SchedulingInput) -> Result<(), ScheduleError> {
    let config = &input.config;
    let fields = [
        ("capacityPerSlot", config.capacity_per_slot),
        ("minSupervisorsPerSession", config.min_supervisors_per_session),
        ("days", config.days),
        ("periodsPerDay", config.periods_per_day),
        ("rooms", config.rooms),
    ];
    if let Some(&(field, _)) = fields.iter().find(|(_, value)| *value == 0) {
        return Err(ScheduleError::InvalidConfig { field });
    }

    match config.checked_instance_count() {
        Some(count) if count <= SchedulerConfig::MAX_INSTANCES => {}
        _ => {
            return Err(ScheduleError::GridTooLarge {
                days: config.days,
                periods_per_day: config.periods_per_day,
                rooms: config.rooms,
                limit: SchedulerConfig::MAX_INSTANCES,
            });
        }
    }

    let expected = config.total_slots() as usize;
    for (supervisor, row) in input.availability.iter().enumerate() {
        if row.len() != expected {
            return Err(ScheduleError::AvailabilityLength {
                supervisor: supervisor as u32,
                expected,
                actual: row.len(),
            });
        }
    }

    let supervisors = input.availability.len();
    if let Some(student) = input
        .students
        .iter()
        .find(|s| s.supervisor_id as usize >= supervisors)
    {
        return Err(ScheduleError::UnknownSupervisor {
            student: student.id,
            supervisor: student.supervisor_id,
            supervisors,
        });
    }
    Ok(())
}
