use serde::{Deserialize, Serialize};
use std::fmt;

use crate::report::Statistics;

// Type aliases for clarity
pub type StudentId = u32;
pub type SupervisorId = u32;
pub type GlobalSlot = u32;
pub type RoomId = u32;

/// Fixed classification of a student's track, used by the pairing objective.
///
/// Declaration order is the sort order used by the priority sorter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Category {
    #[serde(alias = "Magang")]
    Internship,
    #[serde(alias = "Stupen")]
    StudentExchange,
    #[serde(alias = "Penelitian")]
    Research,
    #[serde(alias = "Mengajar")]
    Teaching,
    #[serde(alias = "KKN")]
    CommunityService,
    #[serde(alias = "Wirausaha")]
    Entrepreneurship,
}

impl Category {
    pub const COUNT: usize = 6;

    pub fn index(self) -> usize {
        match self {
            Category::Internship => 0,
            Category::StudentExchange => 1,
            Category::Research => 2,
            Category::Teaching => 3,
            Category::CommunityService => 4,
            Category::Entrepreneurship => 5,
        }
    }
}

/// A student to be placed into exactly one session, bound to one supervisor.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: StudentId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub category: Category,
    pub supervisor_id: SupervisorId,
}

fn default_capacity() -> u32 {
    5
}

fn default_min_supervisors() -> u32 {
    3
}

fn default_days() -> u32 {
    9
}

fn default_periods() -> u32 {
    7
}

fn default_rooms() -> u32 {
    3
}

/// Grid shape and per-session limits.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulerConfig {
    #[serde(default = "default_capacity")]
    pub capacity_per_slot: u32,
    #[serde(default = "default_min_supervisors")]
    pub min_supervisors_per_session: u32,
    #[serde(default = "default_days")]
    pub days: u32,
    #[serde(default = "default_periods")]
    pub periods_per_day: u32,
    #[serde(default = "default_rooms")]
    pub rooms: u32,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            capacity_per_slot: default_capacity(),
            min_supervisors_per_session: default_min_supervisors(),
            days: default_days(),
            periods_per_day: default_periods(),
            rooms: default_rooms(),
        }
    }
}

impl SchedulerConfig {
    /// Largest grid (days x periods x rooms) a single run will allocate.
    pub const MAX_INSTANCES: u32 = 1_000_000;

    /// Number of global slots (days x periods), ignoring rooms.
    ///
    /// Saturates instead of wrapping; validation rejects such grids first.
    pub fn total_slots(&self) -> u32 {
        self.days.saturating_mul(self.periods_per_day)
    }

    /// Number of (slot, room) instances, or `None` if the product overflows.
    pub fn checked_instance_count(&self) -> Option<u32> {
        self.days
            .checked_mul(self.periods_per_day)?
            .checked_mul(self.rooms)
    }
}

fn default_weight() -> f64 {
    1.0
}

/// Tuning for the exact backend. Ignored by the greedy backend.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExactOptions {
    #[serde(default = "default_weight")]
    pub same_category_weight: f64,
    #[serde(default = "default_weight")]
    pub unused_slot_weight: f64,
    #[serde(default)]
    pub time_limit_secs: Option<f64>,
}

impl Default for ExactOptions {
    fn default() -> Self {
        Self {
            same_category_weight: default_weight(),
            unused_slot_weight: default_weight(),
            time_limit_secs: None,
        }
    }
}

/// The complete input for one scheduling run.
///
/// `availability[a][s]` is true when supervisor `a` is free at global slot `s`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulingInput {
    #[serde(default)]
    pub config: SchedulerConfig,
    #[serde(default)]
    pub exact: ExactOptions,
    pub students: Vec<Student>,
    pub availability: Vec<Vec<bool>>,
}

/// Which engine produces the schedule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    Greedy,
    Exact,
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::Greedy => write!(f, "greedy"),
            Backend::Exact => write!(f, "exact"),
        }
    }
}

/// A bookable (global slot, room) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct TimeslotInstance {
    pub slot: GlobalSlot,
    pub room: RoomId,
}

impl TimeslotInstance {
    pub fn day(&self, periods_per_day: u32) -> u32 {
        self.slot / periods_per_day
    }

    pub fn period(&self, periods_per_day: u32) -> u32 {
        self.slot % periods_per_day
    }
}

/// Why a student could not be placed. Declaration order is reporting order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum UnassignedReason {
    CapacityFull,
    SupervisorUnavailable,
    SupervisorConflict,
}

impl fmt::Display for UnassignedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnassignedReason::CapacityFull => write!(f, "capacity-full"),
            UnassignedReason::SupervisorUnavailable => write!(f, "supervisor-unavailable"),
            UnassignedReason::SupervisorConflict => write!(f, "supervisor-conflict"),
        }
    }
}

/// A student left out of the schedule, with the reasons seen during the scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnassignedRecord {
    pub student: Student,
    /// Deduplicated, in reporting order. Empty means the cause is unknown
    /// (an exact solve stopped by its time limit).
    pub reasons: Vec<UnassignedReason>,
    pub supervisor_availability: Vec<bool>,
}

/// Post-hoc quality metrics of a schedule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Objectives {
    pub same_pair_count: usize,
    pub unused_slot_count: usize,
    pub used_slot_count: usize,
}

impl Objectives {
    pub fn score(&self) -> usize {
        self.same_pair_count + self.unused_slot_count
    }
}

/// One grid instance as reported to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionOutput {
    pub index: usize,
    pub slot: GlobalSlot,
    pub day: u32,
    pub period: u32,
    pub room: RoomId,
    pub students: Vec<Student>,
    pub supervisors: Vec<SupervisorId>,
}

/// The final output of a run, identical in shape for every backend.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulingOutput {
    pub backend: Backend,
    pub sessions: Vec<SessionOutput>,
    pub unassigned: Vec<UnassignedRecord>,
    pub objectives: Objectives,
    pub score: usize,
    pub supervisor_order: Vec<SupervisorId>,
    pub statistics: Statistics,
    pub elapsed_ms: u64,
}
