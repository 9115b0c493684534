//! Recurring task data model

use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub text: String,
    pub cadence: Cadence,
    #[serde(default)]
    pub shift_pattern: ShiftPattern,
    #[serde(default)]
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default = "unix_epoch")]
    pub last_reset: DateTime<Utc>,
}

/// How often a task's completion flag clears on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cadence {
    Daily,
    Weekly,
    #[serde(rename = "Bi-Weekly")]
    BiWeekly,
    Monthly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ShiftPattern {
    #[default]
    NormalDay,
    LongDay,
    NightShift,
    WeekendShift,
    ZeroDay,
}

/// Fields of a task that may change after creation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_reset: Option<DateTime<Utc>>,
}

fn unix_epoch() -> DateTime<Utc> {
    DateTime::<Utc>::UNIX_EPOCH
}

impl Task {
    /// Create a new, not yet completed task. `last_reset` starts at creation.
    pub fn new(text: String, cadence: Cadence, created_at: DateTime<Utc>) -> Result<Self> {
        let task = Self {
            id: Uuid::new_v4().to_string(),
            text,
            cadence,
            shift_pattern: ShiftPattern::default(),
            completed: false,
            created_at,
            last_reset: created_at,
        };
        task.validate()?;
        Ok(task)
    }

    pub fn with_shift_pattern(mut self, shift_pattern: ShiftPattern) -> Self {
        self.shift_pattern = shift_pattern;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.text.trim().is_empty() {
            return Err(Error::Validation("Task text cannot be empty".to_string()));
        }

        if self.id.trim().is_empty() {
            return Err(Error::Validation("Task ID cannot be empty".to_string()));
        }

        Ok(())
    }

    /// Patch that flips the completion flag, as a user toggle does.
    pub fn toggle_patch(&self) -> TaskPatch {
        TaskPatch {
            completed: Some(!self.completed),
            last_reset: None,
        }
    }

    /// Apply a partial update. `last_reset` never moves backwards.
    pub fn apply(&mut self, patch: &TaskPatch) {
        if let Some(completed) = patch.completed {
            self.completed = completed;
        }
        if let Some(last_reset) = patch.last_reset {
            self.last_reset = self.last_reset.max(last_reset);
        }
    }
}

impl TaskPatch {
    /// The fields the reset engine writes: cleared flag, advanced marker.
    pub fn reset(at: DateTime<Utc>) -> Self {
        Self {
            completed: Some(false),
            last_reset: Some(at),
        }
    }
}

impl Cadence {
    pub const ALL: [Cadence; 4] = [
        Cadence::Daily,
        Cadence::Weekly,
        Cadence::BiWeekly,
        Cadence::Monthly,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Cadence::Daily => "Daily",
            Cadence::Weekly => "Weekly",
            Cadence::BiWeekly => "Bi-Weekly",
            Cadence::Monthly => "Monthly",
        }
    }
}

impl std::fmt::Display for Cadence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Cadence {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Cadence::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::InvalidData(format!("Unknown cadence '{}'", s)))
    }
}

impl ShiftPattern {
    pub const ALL: [ShiftPattern; 5] = [
        ShiftPattern::NormalDay,
        ShiftPattern::LongDay,
        ShiftPattern::NightShift,
        ShiftPattern::WeekendShift,
        ShiftPattern::ZeroDay,
    ];

    /// Stored identifier, as written in the record.
    pub fn id(&self) -> &'static str {
        match self {
            ShiftPattern::NormalDay => "normalDay",
            ShiftPattern::LongDay => "longDay",
            ShiftPattern::NightShift => "nightShift",
            ShiftPattern::WeekendShift => "weekendShift",
            ShiftPattern::ZeroDay => "zeroDay",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ShiftPattern::NormalDay => "Normal Day",
            ShiftPattern::LongDay => "Long Day",
            ShiftPattern::NightShift => "Night Shift",
            ShiftPattern::WeekendShift => "Weekend Shift",
            ShiftPattern::ZeroDay => "Zero Day",
        }
    }
}

/// Tasks of one shift pattern, grouped by cadence in display order.
pub fn group_by_cadence(tasks: &[Task], shift_pattern: ShiftPattern) -> Vec<(Cadence, Vec<&Task>)> {
    Cadence::ALL
        .into_iter()
        .filter_map(|cadence| {
            let group: Vec<&Task> = tasks
                .iter()
                .filter(|t| t.shift_pattern == shift_pattern && t.cadence == cadence)
                .collect();
            (!group.is_empty()).then_some((cadence, group))
        })
        .collect()
}
