//! Habit streak engine

use chrono::{DateTime, Days, NaiveDate, TimeZone};

use crate::models::{Habit, HabitPatch};

/// Outcome of marking a habit done.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    /// New streak and completion date to persist.
    Recorded(HabitPatch),
    /// The habit was already marked done today; nothing changes.
    AlreadyCompleted,
}

/// Compute the streak update for a completion at `now`.
///
/// Habit days are UTC calendar dates, whatever zone `now` carries. A
/// completion the day after the previous one extends the streak; any longer
/// gap, or a first completion, starts over at 1. A second completion on the
/// same day is ignored, which is also why a completion cannot be undone.
pub fn record_completion<Tz: TimeZone>(habit: &Habit, now: &DateTime<Tz>) -> Completion {
    let today = habit_day(now);

    if habit.is_completed_on(today) {
        return Completion::AlreadyCompleted;
    }

    let yesterday = today.checked_sub_days(Days::new(1));
    let streak = match habit.last_completed {
        Some(last) if Some(last) == yesterday => habit.streak.saturating_add(1),
        _ => 1,
    };

    Completion::Recorded(HabitPatch {
        streak: Some(streak),
        last_completed: Some(today),
    })
}

/// The calendar date a completion at `now` is recorded under.
pub fn habit_day<Tz: TimeZone>(now: &DateTime<Tz>) -> NaiveDate {
    now.to_utc().date_naive()
}
