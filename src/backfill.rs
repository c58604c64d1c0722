use itertools::Itertools;
use log::debug;

use crate::availability::AvailabilityIndex;
use crate::data::{Student, SupervisorId};
use crate::schedule::Schedule;

/// Tops up every occupied session with extra supervisors until it has
/// `min_supervisors`, or until no further supervisor is eligible.
///
/// Candidates are the distinct supervisors of `roster`, in roster order. A
/// candidate is eligible if it is not yet in the session, is free at the
/// session's slot and is not booked in a parallel room.
pub fn backfill(
    schedule: &mut Schedule,
    roster: &[Student],
    availability: &AvailabilityIndex,
    min_supervisors: u32,
) {
    let candidates: Vec<SupervisorId> = roster.iter().map(|s| s.supervisor_id).unique().collect();
    let target = min_supervisors as usize;

    for index in 0..schedule.instance_count() {
        if schedule.entry(index).students.is_empty() {
            continue;
        }
        let slot = schedule.instances()[index].slot;

        while schedule.entry(index).supervisors.len() < target {
            let next = candidates.iter().copied().find(|&a| {
                !schedule.entry(index).supervisors.contains(&a)
                    && availability.is_available(a, slot)
                    && schedule.conflict_free(index, a)
            });
            match next {
                Some(a) => {
                    schedule.add_supervisor(index, a);
                }
                // a full sweep found nobody: stop short of the target
                None => {
                    debug!(
                        "Session {} (slot {}) has {} of {} supervisors.",
                        index,
                        slot,
                        schedule.entry(index).supervisors.len(),
                        target
                    );
                    break;
                }
            }
        }
    }
}
