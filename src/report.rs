use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use crate::data::{StudentId, SupervisorId, UnassignedRecord};
use crate::schedule::Schedule;

/// Placement outcome for one supervisor's students.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SupervisorStats {
    pub supervisor_id: SupervisorId,
    pub assigned_count: usize,
    pub unassigned_count: usize,
    pub unassigned_students: Vec<StudentId>,
}

/// Summary counts of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub sessions_used: usize,
    pub days_used: usize,
    pub students_assigned: usize,
    pub students_unassigned: usize,
    /// Supervisors with every student placed.
    pub complete_supervisors: Vec<SupervisorStats>,
    /// Supervisors with at least one student left out.
    pub incomplete_supervisors: Vec<SupervisorStats>,
}

pub fn statistics(
    schedule: &Schedule,
    unassigned: &[UnassignedRecord],
    periods_per_day: u32,
) -> Statistics {
    let mut per_supervisor: BTreeMap<SupervisorId, SupervisorStats> = BTreeMap::new();
    let mut days: BTreeSet<u32> = BTreeSet::new();
    let mut stats = Statistics::default();

    for (instance, entry) in schedule.instances().iter().zip(schedule.entries()) {
        if entry.students.is_empty() {
            continue;
        }
        stats.sessions_used += 1;
        days.insert(instance.day(periods_per_day));
        for student in &entry.students {
            stats.students_assigned += 1;
            per_supervisor
                .entry(student.supervisor_id)
                .or_insert_with(|| SupervisorStats {
                    supervisor_id: student.supervisor_id,
                    ..SupervisorStats::default()
                })
                .assigned_count += 1;
        }
    }

    for record in unassigned {
        let supervisor = record.student.supervisor_id;
        let entry = per_supervisor
            .entry(supervisor)
            .or_insert_with(|| SupervisorStats {
                supervisor_id: supervisor,
                ..SupervisorStats::default()
            });
        entry.unassigned_count += 1;
        entry.unassigned_students.push(record.student.id);
    }

    stats.days_used = days.len();
    stats.students_unassigned = unassigned.len();
    for (_, supervisor) in per_supervisor {
        if supervisor.unassigned_count == 0 {
            stats.complete_supervisors.push(supervisor);
        } else {
            stats.incomplete_supervisors.push(supervisor);
        }
    }
    stats
}
