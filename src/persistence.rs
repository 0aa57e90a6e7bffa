//! Schedule and constraint storage.
//!
//! The core never depends on a storage layout; it talks to a
//! [`ScheduleRepository`]. The contract for a generation run is a single
//! replace: every stored schedule of each touched teacher is removed and
//! the new batch inserted, and no reader may observe a state in between.
//!
//! [`InMemoryScheduleRepository`] is the reference implementation, used by
//! tests and by callers without a database.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, RwLock};

use thiserror::Error;
use tracing::info;

use crate::models::{Schedule, TimeConstraint};
use crate::scheduler::GenerationOutcome;

/// Storage failure. A failed call leaves the store unchanged.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("Storage lock poisoned")]
    LockPoisoned,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Data validation error: {0}")]
    Validation(String),

    #[error("Backend error: {0}")]
    Backend(String),
}

pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// Storage of teacher schedules and availability constraints.
pub trait ScheduleRepository: Send + Sync {
    /// Deletes every stored schedule of `teacher_ids` and stores
    /// `schedules` in one atomic step.
    ///
    /// Every schedule in the batch must belong to a listed teacher.
    fn replace_schedules(
        &self,
        teacher_ids: &[String],
        schedules: &[Schedule],
    ) -> PersistenceResult<()>;

    /// All stored schedules in teacher id order.
    fn load_schedules(&self) -> PersistenceResult<Vec<Schedule>>;

    /// Stored schedule of one teacher.
    fn load_schedule(&self, teacher_id: &str) -> PersistenceResult<Schedule>;

    /// Inserts or replaces a constraint by id.
    fn upsert_constraint(&self, constraint: TimeConstraint) -> PersistenceResult<()>;

    /// Removes a constraint by id.
    fn delete_constraint(&self, id: &str) -> PersistenceResult<()>;

    /// All stored constraints in id order.
    fn load_constraints(&self) -> PersistenceResult<Vec<TimeConstraint>>;

    /// Stores the result of a generation run.
    fn save_outcome(&self, outcome: &GenerationOutcome) -> PersistenceResult<()> {
        self.replace_schedules(&outcome.touched_teacher_ids, &outcome.schedules)
    }
}

#[derive(Debug, Default)]
struct StoreData {
    schedules: BTreeMap<String, Schedule>,
    constraints: BTreeMap<String, TimeConstraint>,
}

/// In-memory repository behind a `RwLock`.
#[derive(Debug, Clone, Default)]
pub struct InMemoryScheduleRepository {
    data: Arc<RwLock<StoreData>>,
}

impl InMemoryScheduleRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored schedules.
    pub fn schedule_count(&self) -> PersistenceResult<usize> {
        let data = self.data.read().map_err(|_| PersistenceError::LockPoisoned)?;
        Ok(data.schedules.len())
    }
}

impl ScheduleRepository for InMemoryScheduleRepository {
    fn replace_schedules(
        &self,
        teacher_ids: &[String],
        schedules: &[Schedule],
    ) -> PersistenceResult<()> {
        let touched: BTreeSet<&str> = teacher_ids.iter().map(String::as_str).collect();
        let mut batch = BTreeMap::new();
        for schedule in schedules {
            if !touched.contains(schedule.teacher_id.as_str()) {
                return Err(PersistenceError::Validation(format!(
                    "schedule of teacher '{}' is not part of the batch",
                    schedule.teacher_id
                )));
            }
            if batch
                .insert(schedule.teacher_id.clone(), schedule.clone())
                .is_some()
            {
                return Err(PersistenceError::Validation(format!(
                    "teacher '{}' has two schedules in the batch",
                    schedule.teacher_id
                )));
            }
        }

        let mut data = self.data.write().map_err(|_| PersistenceError::LockPoisoned)?;
        let before = data.schedules.len();
        data.schedules.retain(|id, _| !touched.contains(id.as_str()));
        let deleted = before - data.schedules.len();
        let inserted = batch.len();
        data.schedules.extend(batch);

        info!(event = "schedules_replaced", deleted, inserted);
        Ok(())
    }

    fn load_schedules(&self) -> PersistenceResult<Vec<Schedule>> {
        let data = self.data.read().map_err(|_| PersistenceError::LockPoisoned)?;
        Ok(data.schedules.values().cloned().collect())
    }

    fn load_schedule(&self, teacher_id: &str) -> PersistenceResult<Schedule> {
        let data = self.data.read().map_err(|_| PersistenceError::LockPoisoned)?;
        data.schedules
            .get(teacher_id)
            .cloned()
            .ok_or_else(|| PersistenceError::NotFound(format!("schedule of teacher '{teacher_id}'")))
    }

    fn upsert_constraint(&self, constraint: TimeConstraint) -> PersistenceResult<()> {
        let mut data = self.data.write().map_err(|_| PersistenceError::LockPoisoned)?;
        data.constraints.insert(constraint.id.clone(), constraint);
        Ok(())
    }

    fn delete_constraint(&self, id: &str) -> PersistenceResult<()> {
        let mut data = self.data.write().map_err(|_| PersistenceError::LockPoisoned)?;
        data.constraints
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| PersistenceError::NotFound(format!("constraint '{id}'")))
    }

    fn load_constraints(&self) -> PersistenceResult<Vec<TimeConstraint>> {
        let data = self.data.read().map_err(|_| PersistenceError::LockPoisoned)?;
        Ok(data.constraints.values().cloned().collect())
    }
}
