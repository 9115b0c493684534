//! Dayboard core library
//!
//! Record models, the cadence reset and habit streak engines, the countdown
//! timer reducer, and the record store they persist through.

pub mod cadence;
pub mod clock;
pub mod error;
pub mod models;
pub mod storage;
pub mod streak;
pub mod timer;

pub use cadence::evaluate_resets;
pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{Error, Result};
pub use streak::{Completion, habit_day, record_completion};
pub use timer::{TimerCommand, TimerEffect, reduce};
