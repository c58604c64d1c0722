use log::{debug, trace};
use std::collections::{BTreeSet, HashSet};

use crate::availability::AvailabilityIndex;
use crate::data::{
    Student, StudentId, SupervisorId, TimeslotInstance, UnassignedReason, UnassignedRecord,
};
use crate::schedule::Schedule;

/// First-fit placement of students in the given order.
///
/// Each student takes the first instance (in enumeration order) with room
/// left, where their supervisor is free and not booked in a parallel room.
/// Nothing placed is ever moved again. Students whose id was already placed
/// are skipped.
pub fn assign(
    ordered: &[&Student],
    instances: &[TimeslotInstance],
    availability: &AvailabilityIndex,
    capacity: u32,
) -> (Schedule, Vec<UnassignedRecord>) {
    let mut schedule = Schedule::new(instances.to_vec());
    let mut unassigned = Vec::new();
    let mut committed: HashSet<StudentId> = HashSet::new();
    let capacity = capacity as usize;

    for &student in ordered {
        if committed.contains(&student.id) {
            trace!("Student {} already placed, skipping duplicate.", student.id);
            continue;
        }
        let supervisor = student.supervisor_id;
        let mut reasons: BTreeSet<UnassignedReason> = BTreeSet::new();
        let mut placed = None;

        for index in 0..instances.len() {
            let blocked = blockers(&schedule, index, supervisor, availability, capacity);
            if blocked.is_empty() {
                placed = Some(index);
                break;
            }
            reasons.extend(blocked);
        }

        match placed {
            Some(index) => {
                trace!(
                    "Student {} placed at slot {} room {}.",
                    student.id, instances[index].slot, instances[index].room
                );
                schedule.push_student(index, student.clone());
                schedule.add_supervisor(index, supervisor);
                committed.insert(student.id);
            }
            None => {
                let reasons: Vec<UnassignedReason> = reasons.into_iter().collect();
                debug!(
                    "Student {} (supervisor {}) left unassigned: {:?}",
                    student.id, supervisor, reasons
                );
                unassigned.push(UnassignedRecord {
                    student: student.clone(),
                    reasons,
                    supervisor_availability: availability.snapshot(supervisor),
                });
            }
        }
    }

    (schedule, unassigned)
}

/// Hard rules that keep a student of `supervisor` out of instance `index`.
fn blockers(
    schedule: &Schedule,
    index: usize,
    supervisor: SupervisorId,
    availability: &AvailabilityIndex,
    capacity: usize,
) -> Vec<UnassignedReason> {
    let mut blocked = Vec::new();
    if schedule.entry(index).students.len() >= capacity {
        blocked.push(UnassignedReason::CapacityFull);
    }
    if !availability.is_available(supervisor, schedule.instances()[index].slot) {
        blocked.push(UnassignedReason::SupervisorUnavailable);
    }
    if !schedule.conflict_free(index, supervisor) {
        blocked.push(UnassignedReason::SupervisorConflict);
    }
    blocked
}

/// Every reason a student of `supervisor` cannot join `schedule` as it
/// stands, deduplicated and in reporting order. Empty if some instance
/// would take them.
pub fn blocking_reasons(
    schedule: &Schedule,
    supervisor: SupervisorId,
    availability: &AvailabilityIndex,
    capacity: u32,
) -> Vec<UnassignedReason> {
    let mut reasons: BTreeSet<UnassignedReason> = BTreeSet::new();
    for index in 0..schedule.instance_count() {
        let blocked = blockers(schedule, index, supervisor, availability, capacity as usize);
        if blocked.is_empty() {
            return Vec::new();
        }
        reasons.extend(blocked);
    }
    reasons.into_iter().collect()
}
