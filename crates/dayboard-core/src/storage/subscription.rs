//! Change subscriptions

use std::any::Any;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};

use super::{Collection, Record};

type Callback = Arc<dyn Fn(&dyn Any) + Send + Sync>;

struct Entry {
    id: u64,
    collection: Collection,
    callback: Callback,
}

/// Registry of change listeners, shared by a store and its handles.
#[derive(Default)]
pub struct Subscribers {
    next_id: AtomicU64,
    entries: Mutex<Vec<Entry>>,
}

impl Subscribers {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn add<R, F>(self: &Arc<Self>, callback: F) -> Subscription
    where
        R: Record,
        F: Fn(&[R]) + Send + Sync + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let callback: Callback = Arc::new(move |records: &dyn Any| {
            if let Some(records) = records.downcast_ref::<Vec<R>>() {
                callback(records.as_slice());
            }
        });

        self.entries().push(Entry {
            id,
            collection: R::COLLECTION,
            callback,
        });

        Subscription {
            id,
            registry: Arc::downgrade(self),
        }
    }

    /// Deliver `records` to every listener of their collection.
    ///
    /// Listeners run without the registry lock held, so they may subscribe
    /// or unsubscribe from inside the callback.
    #[allow(clippy::ptr_arg)]
    pub fn notify<R: Record>(&self, records: &Vec<R>) {
        let callbacks: Vec<Callback> = self
            .entries()
            .iter()
            .filter(|e| e.collection == R::COLLECTION)
            .map(|e| e.callback.clone())
            .collect();

        for callback in callbacks {
            callback(records as &dyn Any);
        }
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn remove(&self, id: u64) {
        self.entries().retain(|e| e.id != id);
    }

    fn entries(&self) -> MutexGuard<'_, Vec<Entry>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Handle returned by `subscribe`. Dropping it stops delivery.
#[must_use = "dropping a subscription unsubscribes immediately"]
pub struct Subscription {
    id: u64,
    registry: Weak<Subscribers>,
}

impl Subscription {
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.remove(self.id);
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}
