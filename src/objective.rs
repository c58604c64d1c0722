use std::collections::BTreeSet;

use crate::data::{Category, GlobalSlot, Objectives};
use crate::schedule::Schedule;

/// Computes the quality metrics of a finished schedule.
///
/// `same_pair_count` sums, over every session, the unordered pairs of
/// students sharing a category. `unused_slot_count` is the number of global
/// slots (rooms collapsed) with no student in any room.
pub fn evaluate(schedule: &Schedule, total_slots: u32) -> Objectives {
    let mut same_pair_count = 0;
    let mut used: BTreeSet<GlobalSlot> = BTreeSet::new();

    for (instance, entry) in schedule.instances().iter().zip(schedule.entries()) {
        if entry.students.is_empty() {
            continue;
        }
        used.insert(instance.slot);

        let mut per_category = [0usize; Category::COUNT];
        for student in &entry.students {
            per_category[student.category.index()] += 1;
        }
        same_pair_count += per_category
            .iter()
            .map(|&n| n * n.saturating_sub(1) / 2)
            .sum::<usize>();
    }

    Objectives {
        same_pair_count,
        unused_slot_count: (total_slots as usize).saturating_sub(used.len()),
        used_slot_count: used.len(),
    }
}
