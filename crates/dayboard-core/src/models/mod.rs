pub mod config;
pub mod habit;
pub mod task;
pub mod timer;

pub use config::{Config, DaemonConfig, TimerConfig};
pub use habit::{Habit, HabitPatch};
pub use task::{Cadence, ShiftPattern, Task, TaskPatch, group_by_cadence};
pub use timer::{Phase, TimerState, TimerStatus};
