//! Cadence reset engine
//!
//! Decides which completed tasks must be cleared because their cadence has
//! rolled over since their last reset. Calendar boundaries are taken in the
//! time zone of `now`. Pass a real zone (for example `Local`), not a fixed
//! offset, so an older `last_reset` is read with the offset it had then.
//!
//! | Cadence   | Rolls over when                                          |
//! |-----------|----------------------------------------------------------|
//! | Daily     | today is a later calendar day than the last reset        |
//! | Weekly    | today is Monday and a later calendar day                 |
//! | Bi-Weekly | today is Monday and at least 14 days elapsed, rounded up |
//! | Monthly   | today is the 1st and a later calendar day                |

use chrono::{DateTime, Datelike, TimeZone, Utc, Weekday};

use crate::models::{Cadence, Task, TaskPatch};

const MILLIS_PER_DAY: u64 = 24 * 60 * 60 * 1000;
const BI_WEEKLY_DAYS: u64 = 14;

/// Tasks that must be reset at `now`, each paired with the fields to write.
///
/// Tasks that are not completed are never returned, whatever their age.
pub fn evaluate_resets<Tz: TimeZone>(tasks: &[Task], now: &DateTime<Tz>) -> Vec<(String, TaskPatch)> {
    let reset_at = now.with_timezone(&Utc);

    tasks
        .iter()
        .filter(|task| task.completed && is_due(task.cadence, &task.last_reset, now))
        .map(|task| {
            tracing::debug!(
                task_id = %task.id,
                cadence = %task.cadence,
                last_reset = %task.last_reset,
                "task due for reset"
            );
            (task.id.clone(), TaskPatch::reset(reset_at))
        })
        .collect()
}

/// Whether a cadence has rolled over between `last_reset` and `now`.
pub fn is_due<Tz: TimeZone>(cadence: Cadence, last_reset: &DateTime<Utc>, now: &DateTime<Tz>) -> bool {
    let today = now.date_naive();
    let last_reset_day = last_reset.with_timezone(&now.timezone()).date_naive();
    let new_day = today > last_reset_day;

    match cadence {
        Cadence::Daily => new_day,
        Cadence::Weekly => now.weekday() == Weekday::Mon && new_day,
        Cadence::BiWeekly => {
            now.weekday() == Weekday::Mon && elapsed_days_ceil(last_reset, now) >= BI_WEEKLY_DAYS
        }
        Cadence::Monthly => now.day() == 1 && new_day,
    }
}

/// Absolute elapsed time in whole days, rounded up.
fn elapsed_days_ceil<Tz: TimeZone>(last_reset: &DateTime<Utc>, now: &DateTime<Tz>) -> u64 {
    let millis = now
        .clone()
        .signed_duration_since(*last_reset)
        .num_milliseconds()
        .unsigned_abs();
    millis.div_ceil(MILLIS_PER_DAY)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, FixedOffset, MappedLocalTime, NaiveDate, NaiveDateTime};

    /// Central European time for 2024: +01:00, +02:00 from 31 March to 27 October.
    #[derive(Debug, Clone, Copy)]
    struct Cet2024;

    impl Cet2024 {
        fn offset_at(utc: &NaiveDateTime) -> FixedOffset {
            let summer_start = at(2024, 3, 31, 1).naive_utc();
            let summer_end = at(2024, 10, 27, 1).naive_utc();
            let hours = if *utc >= summer_start && *utc < summer_end { 2 } else { 1 };
            FixedOffset::east_opt(hours * 3600).unwrap()
        }
    }

    impl TimeZone for Cet2024 {
        type Offset = FixedOffset;

        fn from_offset(_offset: &FixedOffset) -> Self {
            Cet2024
        }

        fn offset_from_local_date(&self, local: &NaiveDate) -> MappedLocalTime<FixedOffset> {
            self.offset_from_local_datetime(&local.and_hms_opt(12, 0, 0).unwrap())
        }

        // Good enough away from the transition hours themselves.
        fn offset_from_local_datetime(&self, local: &NaiveDateTime) -> MappedLocalTime<FixedOffset> {
            MappedLocalTime::Single(Self::offset_at(&(*local - Duration::hours(1))))
        }

        fn offset_from_utc_date(&self, utc: &NaiveDate) -> FixedOffset {
            Self::offset_at(&utc.and_hms_opt(0, 0, 0).unwrap())
        }

        fn offset_from_utc_datetime(&self, utc: &NaiveDateTime) -> FixedOffset {
            Self::offset_at(utc)
        }
    }

    // 2024-03-04 is a Monday, 2024-03-05 a Tuesday.
    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    fn task(cadence: Cadence, completed: bool, last_reset: DateTime<Utc>) -> Task {
        let mut task = Task::new("Chore".to_string(), cadence, last_reset).unwrap();
        task.completed = completed;
        task
    }

    fn due(task: &Task, now: DateTime<Utc>) -> bool {
        !evaluate_resets(std::slice::from_ref(task), &now).is_empty()
    }

    #[test]
    fn test_daily_resets_after_day_boundary() {
        let t = task(Cadence::Daily, true, at(2024, 3, 4, 23));
        assert!(due(&t, at(2024, 3, 5, 0)));

        let resets = evaluate_resets(&[t.clone()], &at(2024, 3, 5, 7));
        assert_eq!(resets.len(), 1);
        assert_eq!(resets[0].0, t.id);
        assert_eq!(resets[0].1.completed, Some(false));
        assert_eq!(resets[0].1.last_reset, Some(at(2024, 3, 5, 7)));
    }

    #[test]
    fn test_daily_same_day_is_excluded() {
        let t = task(Cadence::Daily, true, at(2024, 3, 5, 1));
        assert!(!due(&t, at(2024, 3, 5, 23)));
    }

    #[test]
    fn test_incomplete_tasks_never_reset() {
        let old = at(2023, 1, 2, 9);
        let monday_first = at(2024, 4, 1, 9);
        for cadence in Cadence::ALL {
            let t = task(cadence, false, old);
            assert!(!due(&t, monday_first), "{} reset while incomplete", cadence);
        }
    }

    #[test]
    fn test_weekly_only_on_monday() {
        let t = task(Cadence::Weekly, true, at(2024, 2, 20, 9));
        // Tuesday, 14 days later
        assert!(!due(&t, at(2024, 3, 5, 9)));
        assert!(due(&t, at(2024, 3, 4, 9)));
    }

    #[test]
    fn test_weekly_not_twice_on_same_monday() {
        let t = task(Cadence::Weekly, true, at(2024, 3, 4, 6));
        assert!(!due(&t, at(2024, 3, 4, 20)));
    }

    #[test]
    fn test_bi_weekly_needs_fourteen_days() {
        let monday = at(2024, 3, 4, 9);

        let thirteen = task(Cadence::BiWeekly, true, monday - Duration::days(13));
        assert!(!due(&thirteen, monday));

        let fourteen = task(Cadence::BiWeekly, true, monday - Duration::days(14));
        assert!(due(&fourteen, monday));
    }

    #[test]
    fn test_bi_weekly_rounds_partial_days_up() {
        let monday = at(2024, 3, 4, 9);
        // 13 days and one hour rounds up to 14
        let t = task(
            Cadence::BiWeekly,
            true,
            monday - Duration::days(13) - Duration::hours(1),
        );
        assert!(due(&t, monday));
    }

    #[test]
    fn test_bi_weekly_not_on_other_weekdays() {
        let tuesday = at(2024, 3, 5, 9);
        let t = task(Cadence::BiWeekly, true, tuesday - Duration::days(30));
        assert!(!due(&t, tuesday));
    }

    #[test]
    fn test_monthly_only_on_first() {
        let t = task(Cadence::Monthly, true, at(2024, 2, 10, 9));
        assert!(!due(&t, at(2024, 3, 2, 9)));
        assert!(due(&t, at(2024, 3, 1, 9)));

        let reset_today = task(Cadence::Monthly, true, at(2024, 3, 1, 1));
        assert!(!due(&reset_today, at(2024, 3, 1, 9)));
    }

    #[test]
    fn test_day_boundary_follows_clock_offset() {
        // 23:30 UTC on the 4th is already the 5th at UTC+2.
        let last_reset = at(2024, 3, 4, 12);
        let now_utc = Utc.with_ymd_and_hms(2024, 3, 4, 23, 30, 0).unwrap();
        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();

        assert!(!is_due(Cadence::Daily, &last_reset, &now_utc));
        assert!(is_due(
            Cadence::Daily,
            &last_reset,
            &now_utc.with_timezone(&plus_two)
        ));
    }

    #[test]
    fn test_daily_reset_across_dst_change() {
        // 23:30 CET on Saturday the 30th. Read with Sunday's +02:00 it would be
        // 00:30 on the 31st and the task would look already reset today.
        let last_reset = Utc.with_ymd_and_hms(2024, 3, 30, 22, 30, 0).unwrap();
        let now = Cet2024.with_ymd_and_hms(2024, 3, 31, 10, 0, 0).unwrap();
        assert_eq!(now.offset().local_minus_utc(), 2 * 3600);

        let t = task(Cadence::Daily, true, last_reset);
        let resets = evaluate_resets(&[t], &now);
        assert_eq!(resets.len(), 1);
        assert_eq!(resets[0].1.last_reset, Some(at(2024, 3, 31, 8)));

        let fixed_offset_view = now.fixed_offset();
        assert!(!is_due(Cadence::Daily, &last_reset, &fixed_offset_view));
    }

    #[test]
    fn test_only_qualifying_tasks_returned() {
        let now = at(2024, 3, 5, 9);
        let tasks = vec![
            task(Cadence::Daily, true, at(2024, 3, 4, 9)),
            task(Cadence::Daily, false, at(2024, 3, 4, 9)),
            task(Cadence::Weekly, true, at(2024, 2, 1, 9)),
            task(Cadence::Daily, true, at(2024, 3, 1, 9)),
        ];

        let ids: Vec<String> = evaluate_resets(&tasks, &now)
            .into_iter()
            .map(|(id, _)| id)
            .collect();
        assert_eq!(ids, vec![tasks[0].id.clone(), tasks[3].id.clone()]);
    }

    #[test]
    fn test_empty_input() {
        assert!(evaluate_resets(&[], &at(2024, 3, 4, 9)).is_empty());
    }
}
