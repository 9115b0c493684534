//! Habit manager

use std::sync::Arc;
use tokio::sync::Mutex;

use crate::event_manager::EventManager;
use crate::events::HabitEvent;
use chrono::NaiveDate;
use dayboard_core::{
    Clock, Completion, habit_day, models::Habit, record_completion, storage::RecordStore,
};

#[derive(Debug, thiserror::Error)]
pub enum HabitManagerError {
    #[error("Habit not found: {0}")]
    NotFound(String),

    #[error("Storage error: {0}")]
    Storage(dayboard_core::Error),

    #[error("Invalid habit: {0}")]
    Invalid(String),
}

impl From<dayboard_core::Error> for HabitManagerError {
    fn from(err: dayboard_core::Error) -> Self {
        match err {
            dayboard_core::Error::NotFound { id, .. } => HabitManagerError::NotFound(id),
            dayboard_core::Error::Validation(msg) => HabitManagerError::Invalid(msg),
            other => HabitManagerError::Storage(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, HabitManagerError>;

pub struct HabitManager<S, C> {
    store: Arc<S>,
    clock: Arc<C>,
    event_manager: Arc<EventManager>,
    /// Completions are read-modify-write; one at a time.
    completion_lock: Mutex<()>,
}

impl<S: RecordStore, C: Clock> HabitManager<S, C> {
    pub fn new(store: Arc<S>, clock: Arc<C>, event_manager: Arc<EventManager>) -> Self {
        Self {
            store,
            clock,
            event_manager,
            completion_lock: Mutex::new(()),
        }
    }

    pub async fn create(&self, text: String) -> Result<Habit> {
        let habit = Habit::new(text, self.clock.now().to_utc())?;
        let habit = self.store.insert(habit)?;

        tracing::info!("Created habit {}", habit.id);
        self.event_manager
            .emit_habit(HabitEvent::created(habit.clone()));

        Ok(habit)
    }

    pub async fn get(&self, habit_id: &str) -> Result<Habit> {
        Ok(self.store.get(habit_id)?)
    }

    pub async fn list(&self) -> Result<Vec<Habit>> {
        Ok(self.store.list()?)
    }

    /// Mark a habit done for today and persist the new streak.
    ///
    /// Returns the habit unchanged when it was already done today.
    pub async fn complete(&self, habit_id: &str) -> Result<Habit> {
        let _guard = self.completion_lock.lock().await;

        let habit: Habit = self.store.get(habit_id)?;
        let now = self.clock.now();

        match record_completion(&habit, &now) {
            Completion::AlreadyCompleted => {
                tracing::debug!("Habit {} already completed today", habit.id);
                Ok(habit)
            }
            Completion::Recorded(patch) => {
                let habit: Habit = self.store.update(habit_id, &patch)?;
                tracing::info!("Habit {} streak is now {}", habit.id, habit.streak);
                self.event_manager
                    .emit_habit(HabitEvent::completed(habit.clone()));
                Ok(habit)
            }
        }
    }

    /// The habit day a completion made now would count for.
    pub fn today(&self) -> NaiveDate {
        habit_day(&self.clock.now())
    }

    /// Delete a habit. Its streak is gone with it.
    pub async fn delete(&self, habit_id: &str) -> Result<()> {
        self.store.delete::<Habit>(habit_id)?;

        tracing::info!("Deleted habit {}", habit_id);
        self.event_manager
            .emit_habit(HabitEvent::deleted(habit_id.to_string()));

        Ok(())
    }
}
