use chrono::{DateTime, Utc};
use dayboard_core::models::{Habit, Task};
use serde::{Deserialize, Serialize};

use crate::timer::TimerEvent;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "category", rename_all = "snake_case")]
pub enum DaemonEvent {
    Timer(TimerEvent),
    Task(TaskEvent),
    Habit(HabitEvent),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskEvent {
    pub event_type: TaskEventType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task: Option<Task>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TaskEventType {
    Created,
    Updated,
    Deleted { task_id: String },
    /// A cadence reset pass cleared these tasks.
    Reset { task_ids: Vec<String> },
}

impl TaskEvent {
    pub fn created(task: Task) -> Self {
        Self {
            event_type: TaskEventType::Created,
            task: Some(task),
            timestamp: Utc::now(),
        }
    }

    pub fn updated(task: Task) -> Self {
        Self {
            event_type: TaskEventType::Updated,
            task: Some(task),
            timestamp: Utc::now(),
        }
    }

    pub fn deleted(task_id: String) -> Self {
        Self {
            event_type: TaskEventType::Deleted { task_id },
            task: None,
            timestamp: Utc::now(),
        }
    }

    pub fn reset(task_ids: Vec<String>) -> Self {
        Self {
            event_type: TaskEventType::Reset { task_ids },
            task: None,
            timestamp: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HabitEvent {
    pub event_type: HabitEventType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub habit: Option<Habit>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HabitEventType {
    Created,
    Completed { streak: u32 },
    Deleted { habit_id: String },
}

impl HabitEvent {
    pub fn created(habit: Habit) -> Self {
        Self {
            event_type: HabitEventType::Created,
            habit: Some(habit),
            timestamp: Utc::now(),
        }
    }

    pub fn completed(habit: Habit) -> Self {
        Self {
            event_type: HabitEventType::Completed {
                streak: habit.streak,
            },
            habit: Some(habit),
            timestamp: Utc::now(),
        }
    }

    pub fn deleted(habit_id: String) -> Self {
        Self {
            event_type: HabitEventType::Deleted { habit_id },
            habit: None,
            timestamp: Utc::now(),
        }
    }
}
