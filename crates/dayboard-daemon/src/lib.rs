//! Dayboard Daemon Library
//!
//! Host-side wiring for the core engines, exposed as a library for testing.

pub mod config;
pub mod console;
pub mod event_manager;
pub mod events;
pub mod habit;
pub mod task;
pub mod timer;

pub use config::ConfigManager;
pub use console::{Command, Console};
pub use event_manager::EventManager;
pub use events::DaemonEvent;
pub use habit::HabitManager;
pub use task::TaskManager;
pub use timer::{TimerEngine, TimerEvent};
