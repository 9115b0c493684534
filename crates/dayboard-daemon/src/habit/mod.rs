pub mod manager;

pub use manager::{HabitManager, HabitManagerError};
