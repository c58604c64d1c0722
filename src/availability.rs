use crate::data::{GlobalSlot, SupervisorId};

/// Supervisor x global-slot availability matrix.
///
/// Lookups outside the matrix answer "unavailable" instead of failing, so the
/// placement loop always gets a definite answer.
#[derive(Debug, Clone)]
pub struct AvailabilityIndex {
    rows: Vec<Vec<bool>>,
}

impl AvailabilityIndex {
    pub fn new(rows: Vec<Vec<bool>>) -> Self {
        Self { rows }
    }

    pub fn supervisor_count(&self) -> usize {
        self.rows.len()
    }

    #[inline]
    pub fn is_available(&self, supervisor: SupervisorId, slot: GlobalSlot) -> bool {
        self.rows
            .get(supervisor as usize)
            .and_then(|row| row.get(slot as usize))
            .copied()
            .unwrap_or(false)
    }

    /// Number of slots at which the supervisor is free.
    pub fn available_count(&self, supervisor: SupervisorId) -> usize {
        self.rows
            .get(supervisor as usize)
            .map_or(0, |row| row.iter().filter(|&&free| free).count())
    }

    /// Copy of the supervisor's row, empty for unknown supervisors.
    pub fn snapshot(&self, supervisor: SupervisorId) -> Vec<bool> {
        self.rows.get(supervisor as usize).cloned().unwrap_or_default()
    }
}
