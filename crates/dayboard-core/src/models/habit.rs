//! Habit data model

use crate::{Error, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Habit {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub streak: u32,
    #[serde(default)]
    pub last_completed: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

/// Fields written by the completion handler.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HabitPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub streak: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_completed: Option<NaiveDate>,
}

impl Habit {
    /// Create a habit that has never been completed.
    pub fn new(text: String, created_at: DateTime<Utc>) -> Result<Self> {
        let habit = Self {
            id: Uuid::new_v4().to_string(),
            text,
            streak: 0,
            last_completed: None,
            created_at,
        };
        habit.validate()?;
        Ok(habit)
    }

    pub fn validate(&self) -> Result<()> {
        if self.text.trim().is_empty() {
            return Err(Error::Validation("Habit text cannot be empty".to_string()));
        }

        if self.id.trim().is_empty() {
            return Err(Error::Validation("Habit ID cannot be empty".to_string()));
        }

        if self.streak > 0 && self.last_completed.is_none() {
            return Err(Error::InvalidData(format!(
                "Habit {} has a streak of {} but no completion date",
                self.id, self.streak
            )));
        }

        Ok(())
    }

    pub fn is_completed_on(&self, date: NaiveDate) -> bool {
        self.last_completed == Some(date)
    }

    pub fn apply(&mut self, patch: &HabitPatch) {
        if let Some(streak) = patch.streak {
            self.streak = streak;
        }
        if let Some(date) = patch.last_completed {
            self.last_completed = Some(date);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_new_habit() {
        let habit = Habit::new("Read 10 pages".to_string(), Utc::now()).unwrap();
        assert_eq!(habit.streak, 0);
        assert!(habit.last_completed.is_none());
    }

    #[test]
    fn test_new_habit_empty_text() {
        assert!(Habit::new("".to_string(), Utc::now()).is_err());
    }

    #[test]
    fn test_streak_without_date_is_invalid() {
        let mut habit = Habit::new("Run".to_string(), Utc::now()).unwrap();
        habit.streak = 2;
        assert!(habit.validate().is_err());

        habit.last_completed = Some(date(2024, 5, 1));
        assert!(habit.validate().is_ok());
    }

    #[test]
    fn test_last_completed_serializes_as_plain_date() {
        let mut habit = Habit::new("Run".to_string(), Utc::now()).unwrap();
        habit.apply(&HabitPatch {
            streak: Some(1),
            last_completed: Some(date(2024, 5, 1)),
        });

        let value = serde_json::to_value(&habit).unwrap();
        assert_eq!(value["lastCompleted"], "2024-05-01");
        assert_eq!(value["streak"], 1);
        assert!(habit.is_completed_on(date(2024, 5, 1)));
    }

    #[test]
    fn test_null_last_completed() {
        let json = r#"{
            "id": "h1",
            "text": "Meditate",
            "streak": 0,
            "lastCompleted": null,
            "createdAt": "2024-01-10T08:30:00Z"
        }"#;
        let habit: Habit = serde_json::from_str(json).unwrap();
        assert!(habit.last_completed.is_none());
    }
}
