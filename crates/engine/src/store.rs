//! Task store seam.
//!
//! Task dates are owned by the surrounding application; the engine
//! only reads and writes the two boundary fields through this trait.
//! All access is synchronous: the engine runs within the caller's
//! request, with no background work of its own.

use std::collections::HashMap;

use ganttlink_core::{TaskDates, TaskId};

use crate::Result;

/// Read and write access to task boundary dates.
pub trait TaskStore {
    /// Dates of `task`, or `None` when the store does not know the
    /// task. Unknown predecessors evaluate as unscheduled.
    fn dates(&self, task: TaskId) -> Result<Option<TaskDates>>;

    /// Persist new dates for one task.
    fn set_dates(&mut self, task: TaskId, dates: TaskDates) -> Result<()>;

    /// Persist several date changes as one logical transaction: either
    /// every change applies or none does. The default forwards to
    /// [`set_dates`](TaskStore::set_dates) one change at a time, which
    /// is only atomic when individual writes cannot fail; transactional
    /// backends should override.
    fn set_dates_batch(&mut self, changes: &[(TaskId, TaskDates)]) -> Result<()> {
        for (task, dates) in changes {
            self.set_dates(*task, *dates)?;
        }
        Ok(())
    }
}

/// Hash-map backed store for embedding and tests. Writes cannot fail,
/// so the default batch implementation is atomic here.
#[derive(Debug, Clone, Default)]
pub struct MemoryTaskStore {
    tasks: HashMap<TaskId, TaskDates>,
}

impl MemoryTaskStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a task or replace its dates.
    pub fn upsert(&mut self, task: TaskId, dates: TaskDates) {
        self.tasks.insert(task, dates);
    }

    /// Forget a task, returning its last dates.
    pub fn remove(&mut self, task: TaskId) -> Option<TaskDates> {
        self.tasks.remove(&task)
    }

    /// Number of known tasks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Whether no task is known.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

impl TaskStore for MemoryTaskStore {
    fn dates(&self, task: TaskId) -> Result<Option<TaskDates>> {
        Ok(self.tasks.get(&task).copied())
    }

    fn set_dates(&mut self, task: TaskId, dates: TaskDates) -> Result<()> {
        self.tasks.insert(task, dates);
        Ok(())
    }
}
