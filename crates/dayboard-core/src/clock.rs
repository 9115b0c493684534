//! Clock sources
//!
//! Task calendar decisions (day boundaries, weekdays, day-of-month) are made
//! in the clock's time zone. The zone is a real `TimeZone`, not a snapshot of
//! today's offset, so an instant from before a DST change still lands on the
//! calendar day it had when it was recorded.

use chrono::{DateTime, FixedOffset, Local, TimeZone, Utc};
use std::sync::{Arc, RwLock};

pub trait Clock: Send + Sync {
    type Tz: TimeZone<Offset: Send + Sync> + Send + Sync;

    fn now(&self) -> DateTime<Self::Tz>;
}

/// Wall clock in the machine's local time zone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    type Tz = Local;

    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// A clock that only moves when told to. Clones share the same instant.
#[derive(Debug, Clone)]
pub struct FixedClock<Tz: TimeZone = FixedOffset> {
    now: Arc<RwLock<DateTime<Tz>>>,
}

impl<Tz: TimeZone> FixedClock<Tz> {
    pub fn new(now: DateTime<Tz>) -> Self {
        Self {
            now: Arc::new(RwLock::new(now)),
        }
    }

    pub fn set(&self, now: DateTime<Tz>) {
        match self.now.write() {
            Ok(mut guard) => *guard = now,
            Err(poisoned) => *poisoned.into_inner() = now,
        }
    }

    pub fn advance(&self, by: chrono::Duration) {
        let next = self.current() + by;
        self.set(next);
    }

    fn current(&self) -> DateTime<Tz> {
        match self.now.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl FixedClock<FixedOffset> {
    pub fn at_utc(now: DateTime<Utc>) -> Self {
        Self::new(now.fixed_offset())
    }
}

impl<Tz> Clock for FixedClock<Tz>
where
    Tz: TimeZone + Send + Sync,
    Tz::Offset: Send + Sync,
{
    type Tz = Tz;

    fn now(&self) -> DateTime<Tz> {
        self.current()
    }
}
