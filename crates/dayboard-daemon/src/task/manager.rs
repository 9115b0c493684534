use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

use crate::event_manager::EventManager;
use crate::events::TaskEvent;
use dayboard_core::{
    Clock, evaluate_resets,
    models::{Cadence, ShiftPattern, Task},
    storage::RecordStore,
};

#[derive(Debug, thiserror::Error)]
pub enum TaskManagerError {
    #[error("Task not found: {0}")]
    NotFound(String),

    #[error("Storage error: {0}")]
    Storage(dayboard_core::Error),

    #[error("Invalid task: {0}")]
    Invalid(String),
}

impl From<dayboard_core::Error> for TaskManagerError {
    fn from(err: dayboard_core::Error) -> Self {
        match err {
            dayboard_core::Error::NotFound { id, .. } => TaskManagerError::NotFound(id),
            dayboard_core::Error::Validation(msg) => TaskManagerError::Invalid(msg),
            other => TaskManagerError::Storage(other),
        }
    }
}

impl TaskManagerError {
    pub fn is_transient(&self) -> bool {
        matches!(self, TaskManagerError::Storage(e) if e.is_transient())
    }
}

pub type Result<T> = std::result::Result<T, TaskManagerError>;

pub struct TaskManager<S, C> {
    store: Arc<S>,
    clock: Arc<C>,
    event_manager: Arc<EventManager>,
}

impl<S: RecordStore + 'static, C: Clock + 'static> TaskManager<S, C> {
    pub fn new(store: Arc<S>, clock: Arc<C>, event_manager: Arc<EventManager>) -> Self {
        Self {
            store,
            clock,
            event_manager,
        }
    }

    pub async fn create(
        &self,
        text: String,
        cadence: Cadence,
        shift_pattern: ShiftPattern,
    ) -> Result<Task> {
        let now = self.clock.now().to_utc();
        let task = Task::new(text, cadence, now)?.with_shift_pattern(shift_pattern);
        let task = self.store.insert(task)?;

        tracing::info!("Created {} task {}", task.cadence, task.id);
        self.event_manager.emit_task(TaskEvent::created(task.clone()));

        Ok(task)
    }

    pub async fn get(&self, task_id: &str) -> Result<Task> {
        Ok(self.store.get(task_id)?)
    }

    pub async fn list(&self) -> Result<Vec<Task>> {
        Ok(self.store.list()?)
    }

    pub async fn list_for_shift(&self, shift_pattern: ShiftPattern) -> Result<Vec<Task>> {
        let tasks = self.list().await?;
        Ok(tasks
            .into_iter()
            .filter(|t| t.shift_pattern == shift_pattern)
            .collect())
    }

    /// Flip a task's completion flag.
    pub async fn toggle(&self, task_id: &str) -> Result<Task> {
        let task: Task = self.store.get(task_id)?;
        let task: Task = self.store.update(task_id, &task.toggle_patch())?;

        tracing::debug!("Task {} completed={}", task.id, task.completed);
        self.event_manager.emit_task(TaskEvent::updated(task.clone()));

        Ok(task)
    }

    pub async fn delete(&self, task_id: &str) -> Result<()> {
        self.store.delete::<Task>(task_id)?;

        tracing::info!("Deleted task {}", task_id);
        self.event_manager
            .emit_task(TaskEvent::deleted(task_id.to_string()));

        Ok(())
    }

    /// Run one cadence reset pass and commit every reset as a single batch.
    ///
    /// Returns the ids that were reset. A store failure aborts the whole
    /// batch; nothing is reported as reset in that case.
    pub async fn run_resets(&self) -> Result<Vec<String>> {
        let now = self.clock.now();
        let tasks: Vec<Task> = self.store.list()?;
        let updates = evaluate_resets(&tasks, &now);

        if updates.is_empty() {
            tracing::debug!("Reset pass: no tasks due ({} checked)", tasks.len());
            return Ok(Vec::new());
        }

        if let Err(e) = self.store.batch_update::<Task>(&updates) {
            tracing::warn!("Reset pass aborted, {} tasks left unchanged: {}", updates.len(), e);
            return Err(e.into());
        }

        let task_ids: Vec<String> = updates.into_iter().map(|(id, _)| id).collect();
        tracing::info!("Reset {} of {} tasks", task_ids.len(), tasks.len());
        self.event_manager.emit_task(TaskEvent::reset(task_ids.clone()));

        Ok(task_ids)
    }

    /// Re-run the reset pass on a fixed period. The first pass runs after
    /// one full period; the activation pass is the caller's.
    pub fn spawn_reset_loop(self: Arc<Self>, period: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
            loop {
                ticker.tick().await;
                match self.run_resets().await {
                    Ok(_) => {}
                    Err(e) if e.is_transient() => {
                        tracing::warn!("Scheduled reset pass skipped, retry next period: {}", e);
                    }
                    Err(e) => tracing::error!("Scheduled reset pass failed: {}", e),
                }
            }
        })
    }
}
