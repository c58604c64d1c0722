use std::collections::{BTreeSet, HashMap};

use crate::data::{
    GlobalSlot, RoomId, SchedulerConfig, SessionOutput, Student, SupervisorId, TimeslotInstance,
};

/// Enumerates every (slot, room) pair, slot-major and room-minor.
///
/// The order defines day and room preference for first-fit placement.
pub fn enumerate_instances(config: &SchedulerConfig) -> Vec<TimeslotInstance> {
    (0..config.total_slots())
        .flat_map(|slot| (0..config.rooms).map(move |room| TimeslotInstance { slot, room }))
        .collect()
}

/// Students and supervisors placed into one timeslot instance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScheduleEntry {
    pub students: Vec<Student>,
    pub supervisors: BTreeSet<SupervisorId>,
}

/// Mutable schedule shared by assignment, backfill and evaluation.
///
/// Besides the per-instance entries it keeps, for every (slot, supervisor),
/// the rooms that supervisor already sits in, so conflict checks do not scan
/// the grid.
#[derive(Debug, Clone)]
pub struct Schedule {
    instances: Vec<TimeslotInstance>,
    entries: Vec<ScheduleEntry>,
    booked: HashMap<(GlobalSlot, SupervisorId), BTreeSet<RoomId>>,
}

impl Schedule {
    pub fn new(instances: Vec<TimeslotInstance>) -> Self {
        let entries = vec![ScheduleEntry::default(); instances.len()];
        Self {
            instances,
            entries,
            booked: HashMap::new(),
        }
    }

    pub fn instances(&self) -> &[TimeslotInstance] {
        &self.instances
    }

    pub fn entries(&self) -> &[ScheduleEntry] {
        &self.entries
    }

    pub fn entry(&self, index: usize) -> &ScheduleEntry {
        &self.entries[index]
    }

    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }

    /// True when placing `supervisor` at instance `index` would not put them
    /// in a second room at the same global slot.
    pub fn conflict_free(&self, index: usize, supervisor: SupervisorId) -> bool {
        let candidate = self.instances[index];
        match self.booked.get(&(candidate.slot, supervisor)) {
            Some(rooms) => rooms.iter().all(|&room| room == candidate.room),
            None => true,
        }
    }

    pub fn push_student(&mut self, index: usize, student: Student) {
        self.entries[index].students.push(student);
    }

    /// Adds a supervisor to a session. Returns false if already present.
    pub fn add_supervisor(&mut self, index: usize, supervisor: SupervisorId) -> bool {
        let instance = self.instances[index];
        if !self.entries[index].supervisors.insert(supervisor) {
            return false;
        }
        self.booked
            .entry((instance.slot, supervisor))
            .or_default()
            .insert(instance.room);
        true
    }

    /// Every instance with its contents, in enumeration order.
    pub fn sessions(&self, periods_per_day: u32) -> Vec<SessionOutput> {
        self.instances
            .iter()
            .zip(&self.entries)
            .enumerate()
            .map(|(index, (instance, entry))| SessionOutput {
                index,
                slot: instance.slot,
                day: instance.day(periods_per_day),
                period: instance.period(periods_per_day),
                room: instance.room,
                students: entry.students.clone(),
                supervisors: entry.supervisors.iter().copied().collect(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(days: u32, periods: u32, rooms: u32) -> SchedulerConfig {
        SchedulerConfig {
            days,
            periods_per_day: periods,
            rooms,
            ..SchedulerConfig::default()
        }
    }

    /// Reference check: linear scan over every other instance.
    fn conflict_free_by_scan(schedule: &Schedule, index: usize, supervisor: SupervisorId) -> bool {
        let candidate = schedule.instances()[index];
        schedule
            .instances()
            .iter()
            .zip(schedule.entries())
            .enumerate()
            .filter(|(i, _)| *i != index)
            .all(|(_, (inst, entry))| {
                !(inst.slot == candidate.slot
                    && inst.room != candidate.room
                    && entry.supervisors.contains(&supervisor))
            })
    }

    #[test]
    fn test_instances_slot_major_room_minor() {
        let instances = enumerate_instances(&config(2, 2, 3));
        assert_eq!(instances.len(), 12);
        assert_eq!(instances[0], TimeslotInstance { slot: 0, room: 0 });
        assert_eq!(instances[2], TimeslotInstance { slot: 0, room: 2 });
        assert_eq!(instances[3], TimeslotInstance { slot: 1, room: 0 });
        assert_eq!(instances[11], TimeslotInstance { slot: 3, room: 2 });
    }

    #[test]
    fn test_conflict_in_parallel_room() {
        let mut schedule = Schedule::new(enumerate_instances(&config(1, 2, 2)));
        assert!(schedule.add_supervisor(0, 4));
        // same room is fine, parallel room is not, other slot is fine
        assert!(schedule.conflict_free(0, 4));
        assert!(!schedule.conflict_free(1, 4));
        assert!(schedule.conflict_free(2, 4));
        assert!(schedule.conflict_free(1, 5));
    }

    #[test]
    fn test_add_supervisor_twice() {
        let mut schedule = Schedule::new(enumerate_instances(&config(1, 1, 1)));
        assert!(schedule.add_supervisor(0, 1));
        assert!(!schedule.add_supervisor(0, 1));
        assert_eq!(schedule.entry(0).supervisors.len(), 1);
    }

    #[test]
    fn test_index_matches_scan() {
        let mut schedule = Schedule::new(enumerate_instances(&config(2, 3, 3)));
        let placements = [(0, 0), (1, 1), (4, 0), (5, 2), (9, 1), (10, 1), (17, 0)];
        for (index, supervisor) in placements {
            schedule.add_supervisor(index, supervisor);
        }
        for index in 0..schedule.instance_count() {
            for supervisor in 0..3 {
                assert_eq!(
                    schedule.conflict_free(index, supervisor),
                    conflict_free_by_scan(&schedule, index, supervisor),
                    "instance {index} supervisor {supervisor}"
                );
            }
        }
    }

    #[test]
    fn test_sessions_report_every_instance() {
        let mut schedule = Schedule::new(enumerate_instances(&config(2, 2, 1)));
        schedule.add_supervisor(3, 7);
        let sessions = schedule.sessions(2);
        assert_eq!(sessions.len(), 4);
        assert_eq!(sessions[3].day, 1);
        assert_eq!(sessions[3].period, 1);
        assert_eq!(sessions[3].supervisors, vec![7]);
        assert!(sessions[0].supervisors.is_empty());
    }
}
