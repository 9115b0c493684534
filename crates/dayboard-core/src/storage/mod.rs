//! Record store abstraction and its local implementations.
//!
//! The engines never touch storage; the host lists records, runs an engine,
//! and writes the resulting partial fields back through a [`RecordStore`].

pub mod config;
pub mod file;
pub mod subscription;

pub use config::ConfigStorage;
pub use file::FileStore;
pub use subscription::{Subscribers, Subscription};

use serde::{Serialize, de::DeserializeOwned};
use std::path::PathBuf;

use crate::models::{Habit, HabitPatch, Task, TaskPatch};
use crate::{Error, Result};

/// Kind of record held by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Tasks,
    Habits,
}

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Tasks => "tasks",
            Collection::Habits => "habits",
        }
    }

    pub fn file_name(&self) -> String {
        format!("{}.json", self.as_str())
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A record type stored in its own collection and updated by partial fields.
pub trait Record: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    type Patch: Send + Sync;

    const COLLECTION: Collection;

    fn id(&self) -> &str;

    fn apply(&mut self, patch: &Self::Patch);
}

impl Record for Task {
    type Patch = TaskPatch;

    const COLLECTION: Collection = Collection::Tasks;

    fn id(&self) -> &str {
        &self.id
    }

    fn apply(&mut self, patch: &TaskPatch) {
        Task::apply(self, patch);
    }
}

impl Record for Habit {
    type Patch = HabitPatch;

    const COLLECTION: Collection = Collection::Habits;

    fn id(&self) -> &str {
        &self.id
    }

    fn apply(&mut self, patch: &HabitPatch) {
        Habit::apply(self, patch);
    }
}

pub trait RecordStore: Send + Sync {
    fn list<R: Record>(&self) -> Result<Vec<R>>;

    fn get<R: Record>(&self, id: &str) -> Result<R> {
        self.list::<R>()?
            .into_iter()
            .find(|r| r.id() == id)
            .ok_or_else(|| Error::not_found(R::COLLECTION, id))
    }

    fn insert<R: Record>(&self, record: R) -> Result<R>;

    fn update<R: Record>(&self, id: &str, patch: &R::Patch) -> Result<R>;

    /// Apply every update or none of them.
    fn batch_update<R: Record>(&self, updates: &[(String, R::Patch)]) -> Result<()>;

    fn delete<R: Record>(&self, id: &str) -> Result<()>;

    /// Register `callback` to receive the full collection now and after
    /// every change, until the returned handle is dropped.
    fn subscribe<R, F>(&self, callback: F) -> Result<Subscription>
    where
        R: Record,
        F: Fn(&[R]) + Send + Sync + 'static;
}

pub fn get_data_dir() -> Result<PathBuf> {
    dirs::data_dir()
        .map(|dir| dir.join("dayboard"))
        .ok_or_else(|| Error::InvalidData("Could not find data directory".to_string()))
}

pub fn get_config_dir() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|dir| dir.join("dayboard"))
        .ok_or_else(|| Error::InvalidData("Could not find config directory".to_string()))
}

pub fn init_data_dir() -> Result<PathBuf> {
    let data_dir = get_data_dir()?;
    std::fs::create_dir_all(&data_dir)?;
    Ok(data_dir)
}

pub fn init_config_dir() -> Result<PathBuf> {
    let config_dir = get_config_dir()?;
    std::fs::create_dir_all(&config_dir)?;
    Ok(config_dir)
}
