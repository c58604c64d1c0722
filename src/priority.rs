use itertools::Itertools;
use log::trace;
use std::collections::HashMap;

use crate::availability::AvailabilityIndex;
use crate::data::{Student, SupervisorId};

/// Placement sequence produced by [`placement_order`].
#[derive(Debug, Clone)]
pub struct PlacementOrder<'a> {
    /// Supervisors that have students, hardest to place first.
    pub supervisors: Vec<SupervisorId>,
    pub students: Vec<&'a Student>,
}

/// Orders students so the hardest to place come first.
///
/// Supervisors sort ascending by (available slot count, student count, id);
/// each supervisor's students follow as a block sorted by (category, id).
pub fn placement_order<'a>(
    students: &'a [Student],
    availability: &AvailabilityIndex,
) -> PlacementOrder<'a> {
    let mut by_supervisor: HashMap<SupervisorId, Vec<&Student>> = students
        .iter()
        .map(|s| (s.supervisor_id, s))
        .into_group_map();

    let supervisor_count = availability.supervisor_count() as SupervisorId;
    let sorted_supervisors: Vec<SupervisorId> = (0..supervisor_count)
        .sorted_by_key(|&a| {
            let load = by_supervisor.get(&a).map_or(0, Vec::len);
            (availability.available_count(a), load, a)
        })
        .collect();

    let mut order = PlacementOrder {
        supervisors: Vec::new(),
        students: Vec::with_capacity(students.len()),
    };
    for supervisor in sorted_supervisors {
        let Some(mut group) = by_supervisor.remove(&supervisor) else {
            continue;
        };
        group.sort_by_key(|s| (s.category, s.id));
        trace!(
            "Supervisor {} queued with {} students ({} free slots).",
            supervisor,
            group.len(),
            availability.available_count(supervisor)
        );
        order.supervisors.push(supervisor);
        order.students.extend(group);
    }
    order
}
