//! JSON file record store, one file per collection.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use super::{Record, RecordStore, Subscribers, Subscription};
use crate::{Error, Result};

#[derive(Deserialize)]
struct RecordsFile<R> {
    records: Vec<R>,
}

#[derive(Serialize)]
struct RecordsFileRef<'a, R> {
    records: &'a [R],
}

pub struct FileStore {
    data_dir: PathBuf,
    write_lock: Mutex<()>,
    subscribers: Arc<Subscribers>,
}

impl FileStore {
    pub fn new(data_dir: PathBuf) -> Self {
        Self {
            data_dir,
            write_lock: Mutex::new(()),
            subscribers: Subscribers::new(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn path<R: Record>(&self) -> PathBuf {
        self.data_dir.join(R::COLLECTION.file_name())
    }

    fn load<R: Record>(&self) -> Result<Vec<R>> {
        let path = self.path::<R>();

        if !path.exists() {
            return Ok(Vec::new());
        }

        let content = std::fs::read_to_string(path)?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        let file: RecordsFile<R> = serde_json::from_str(&content)?;
        Ok(file.records)
    }

    /// Write through a temporary file so readers see the old or the new
    /// collection, never a torn one.
    fn save<R: Record>(&self, records: &[R]) -> Result<()> {
        std::fs::create_dir_all(&self.data_dir)?;

        let path = self.path::<R>();
        let tmp_path = path.with_extension("json.tmp");
        let content = serde_json::to_string_pretty(&RecordsFileRef { records })?;
        std::fs::write(&tmp_path, content)?;
        std::fs::rename(&tmp_path, &path)?;

        Ok(())
    }

    /// Load, edit, save and notify for one collection, all under the write
    /// lock, so listeners see changes in commit order. Nothing is written when
    /// `edit` fails. Listeners must not write to the store.
    fn mutate<R, T>(&self, edit: impl FnOnce(&mut Vec<R>) -> Result<T>) -> Result<T>
    where
        R: Record,
    {
        let _guard = self.lock();
        let mut records = self.load::<R>()?;
        let out = edit(&mut records)?;
        self.save(&records)?;
        self.subscribers.notify(&records);
        Ok(out)
    }

    fn lock(&self) -> MutexGuard<'_, ()> {
        self.write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl RecordStore for FileStore {
    fn list<R: Record>(&self) -> Result<Vec<R>> {
        self.load()
    }

    fn insert<R: Record>(&self, record: R) -> Result<R> {
        self.mutate(|records: &mut Vec<R>| {
            if records.iter().any(|r| r.id() == record.id()) {
                return Err(Error::InvalidData(format!(
                    "Duplicate {} id: {}",
                    R::COLLECTION,
                    record.id()
                )));
            }
            records.push(record.clone());
            Ok(record)
        })
    }

    fn update<R: Record>(&self, id: &str, patch: &R::Patch) -> Result<R> {
        self.mutate(|records: &mut Vec<R>| {
            let record = records
                .iter_mut()
                .find(|r| r.id() == id)
                .ok_or_else(|| Error::not_found(R::COLLECTION, id))?;
            record.apply(patch);
            Ok(record.clone())
        })
    }

    fn batch_update<R: Record>(&self, updates: &[(String, R::Patch)]) -> Result<()> {
        if updates.is_empty() {
            return Ok(());
        }

        self.mutate(|records: &mut Vec<R>| {
            let known: HashSet<&str> = records.iter().map(|r| r.id()).collect();
            if let Some((missing, _)) = updates.iter().find(|(id, _)| !known.contains(id.as_str())) {
                return Err(Error::not_found(R::COLLECTION, missing.clone()));
            }

            for (id, patch) in updates {
                if let Some(record) = records.iter_mut().find(|r| r.id() == id) {
                    record.apply(patch);
                }
            }
            Ok(())
        })
    }

    fn delete<R: Record>(&self, id: &str) -> Result<()> {
        self.mutate(|records: &mut Vec<R>| {
            let pos = records
                .iter()
                .position(|r| r.id() == id)
                .ok_or_else(|| Error::not_found(R::COLLECTION, id))?;
            records.remove(pos);
            Ok(())
        })
    }

    fn subscribe<R, F>(&self, callback: F) -> Result<Subscription>
    where
        R: Record,
        F: Fn(&[R]) + Send + Sync + 'static,
    {
        // No commit may land between the snapshot and registration.
        let _guard = self.lock();
        let current = self.load::<R>()?;
        callback(current.as_slice());
        Ok(self.subscribers.add::<R, F>(callback))
    }
}
