//! Habit schedule evaluator.
//!
//! Decides whether a habit is due on a calendar day and buckets a day's
//! completion ratio. Every function here is pure and total: malformed input
//! fails open (the habit applies, counts are zero) so that rendering a row
//! can never fail.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::calendar::{parse_date_key, HabitCalendar};
use crate::habit::{DayOfWeek, Habit};

/// Completion bucket for one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DayStatus {
    /// Nothing was due.
    NoneScheduled,
    /// Something was due and nothing was done.
    Empty,
    /// Less than half done.
    Partial,
    /// At least half done.
    Majority,
    /// Everything done.
    Complete,
}

impl DayStatus {
    /// Bucket a day. The `Complete` check runs before the ratio threshold so
    /// that stale over-completion never reads as `Majority`.
    pub fn classify(completed: usize, scheduled: usize) -> Self {
        if scheduled == 0 {
            DayStatus::NoneScheduled
        } else if completed == 0 {
            DayStatus::Empty
        } else if completed >= scheduled {
            DayStatus::Complete
        } else if completed >= scheduled - completed {
            DayStatus::Majority
        } else {
            DayStatus::Partial
        }
    }

    /// Same as [`DayStatus::classify`] with negative counts clamped to zero.
    pub fn classify_signed(completed: i64, scheduled: i64) -> Self {
        let clamp = |n: i64| usize::try_from(n.max(0)).unwrap_or(usize::MAX);
        Self::classify(clamp(completed), clamp(scheduled))
    }
}

/// Free-function form of [`DayStatus::classify`].
pub fn classify_day(completed: usize, scheduled: usize) -> DayStatus {
    DayStatus::classify(completed, scheduled)
}

/// Evaluates habit recurrence against a fixed calendar.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScheduleEvaluator {
    calendar: HabitCalendar,
}

impl ScheduleEvaluator {
    pub fn new(calendar: HabitCalendar) -> Self {
        Self { calendar }
    }

    pub fn calendar(&self) -> &HabitCalendar {
        &self.calendar
    }

    /// Whether the habit's weekday recurrence includes `date`.
    ///
    /// Ignores the creation date; see [`ScheduleEvaluator::is_scheduled`].
    pub fn applies_on(&self, habit: &Habit, date: NaiveDate) -> bool {
        match habit.frequency.as_deref() {
            None | Some([]) => true,
            Some(days) => days.contains(&DayOfWeek::of(date)),
        }
    }

    /// [`ScheduleEvaluator::applies_on`] for a `YYYY-MM-DD` key. A malformed
    /// key counts as applicable.
    pub fn applies_on_key(&self, habit: &Habit, key: &str) -> bool {
        match parse_date_key(key) {
            Some(date) => self.applies_on(habit, date),
            None => {
                tracing::debug!(habit = %habit.id, key, "unparseable date, treating habit as applicable");
                true
            }
        }
    }

    /// Whether the habit existed on `date`. Habits with an unknown creation
    /// time have always existed.
    pub fn existed_on(&self, habit: &Habit, date: NaiveDate) -> bool {
        if habit.created_timestamp <= 0 {
            return true;
        }
        match self.calendar.day_of_timestamp_ms(habit.created_timestamp) {
            Some(created) => date >= created,
            None => true,
        }
    }

    /// [`ScheduleEvaluator::existed_on`] for a `YYYY-MM-DD` key.
    pub fn existed_on_key(&self, habit: &Habit, key: &str) -> bool {
        parse_date_key(key).map_or(true, |date| self.existed_on(habit, date))
    }

    /// The one predicate every consumer uses: existed and recurs on `date`.
    pub fn is_scheduled(&self, habit: &Habit, date: NaiveDate) -> bool {
        self.existed_on(habit, date) && self.applies_on(habit, date)
    }

    /// [`ScheduleEvaluator::is_scheduled`] for a `YYYY-MM-DD` key.
    pub fn is_scheduled_key(&self, habit: &Habit, key: &str) -> bool {
        self.existed_on_key(habit, key) && self.applies_on_key(habit, key)
    }

    /// Habits due on `date`, in input order.
    pub fn scheduled_habits<'h>(
        &self,
        habits: &'h [Habit],
        date: NaiveDate,
    ) -> impl Iterator<Item = &'h Habit> + 'h {
        let evaluator = *self;
        habits.iter().filter(move |h| evaluator.is_scheduled(h, date))
    }

    pub fn scheduled_count(&self, habits: &[Habit], date: NaiveDate) -> usize {
        self.scheduled_habits(habits, date).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn habit(frequency: Option<Vec<DayOfWeek>>, created_timestamp: i64) -> Habit {
        Habit {
            id: "h".into(),
            title: "Habit".into(),
            description: String::new(),
            created_timestamp,
            frequency,
        }
    }

    // 2026-10-15T12:00:00Z, a Thursday
    const CREATED_MS: i64 = 1_792_065_600_000;

    #[test]
    fn classify_day_buckets() {
        assert_eq!(classify_day(0, 0), DayStatus::NoneScheduled);
        assert_eq!(classify_day(0, 5), DayStatus::Empty);
        assert_eq!(classify_day(3, 5), DayStatus::Majority);
        assert_eq!(classify_day(2, 5), DayStatus::Partial);
        assert_eq!(classify_day(5, 5), DayStatus::Complete);
        assert_eq!(classify_day(6, 5), DayStatus::Complete);
        assert_eq!(classify_day(1, 2), DayStatus::Majority);
        assert_eq!(classify_day(3, 0), DayStatus::NoneScheduled);
    }

    #[test]
    fn classify_signed_clamps_negatives() {
        assert_eq!(DayStatus::classify_signed(-2, 4), DayStatus::Empty);
        assert_eq!(DayStatus::classify_signed(3, -1), DayStatus::NoneScheduled);
        assert_eq!(DayStatus::classify_signed(4, 4), DayStatus::Complete);
    }

    #[test]
    fn classify_day_handles_counts_near_usize_max() {
        assert_eq!(classify_day(usize::MAX / 2 + 1, usize::MAX), DayStatus::Majority);
        assert_eq!(classify_day(usize::MAX / 2, usize::MAX), DayStatus::Partial);
        assert_eq!(classify_day(usize::MAX, usize::MAX), DayStatus::Complete);
    }

    #[test]
    fn weekly_habit_applies_only_on_listed_days() {
        let eval = ScheduleEvaluator::default();
        let h = habit(Some(vec![DayOfWeek::Monday, DayOfWeek::Friday]), 0);
        assert!(eval.applies_on(&h, day(2026, 10, 19)));
        assert!(!eval.applies_on(&h, day(2026, 10, 20)));
        assert!(eval.applies_on(&h, day(2026, 10, 23)));
    }

    #[test]
    fn malformed_key_fails_open() {
        let eval = ScheduleEvaluator::default();
        let h = habit(Some(vec![DayOfWeek::Monday]), CREATED_MS);
        assert!(eval.applies_on_key(&h, "not-a-date"));
        assert!(eval.existed_on_key(&h, "2026/10/01"));
        assert!(eval.is_scheduled_key(&h, ""));
        assert!(!eval.applies_on_key(&h, "2026-10-20"));
    }

    #[test]
    fn existed_on_gates_on_creation_day() {
        let eval = ScheduleEvaluator::default();
        let h = habit(None, CREATED_MS);
        assert!(!eval.existed_on(&h, day(2026, 10, 14)));
        assert!(eval.existed_on(&h, day(2026, 10, 15)));
        assert!(eval.existed_on(&h, day(2026, 10, 16)));
    }

    #[test]
    fn existed_on_uses_calendar_offset() {
        // 2026-10-15T20:00:00Z is already 10-16 in UTC+9
        let h = habit(None, CREATED_MS + 8 * 3_600_000);
        let tokyo = ScheduleEvaluator::new(HabitCalendar::from_offset_minutes(540).unwrap());
        assert!(!tokyo.existed_on(&h, day(2026, 10, 15)));
        assert!(ScheduleEvaluator::default().existed_on(&h, day(2026, 10, 15)));
    }

    #[test]
    fn is_scheduled_combines_both_gates() {
        let eval = ScheduleEvaluator::default();
        let h = habit(Some(vec![DayOfWeek::Monday]), CREATED_MS);
        // Monday before creation
        assert!(!eval.is_scheduled(&h, day(2026, 10, 12)));
        // Monday after creation
        assert!(eval.is_scheduled(&h, day(2026, 10, 19)));
        // Tuesday after creation
        assert!(!eval.is_scheduled(&h, day(2026, 10, 20)));
    }

    #[test]
    fn scheduled_count_over_a_list() {
        let eval = ScheduleEvaluator::default();
        let habits = vec![
            habit(None, 0),
            habit(Some(vec![DayOfWeek::Monday]), 0),
            habit(Some(vec![DayOfWeek::Tuesday]), 0),
            habit(None, CREATED_MS + 30 * 86_400_000),
        ];
        assert_eq!(eval.scheduled_count(&habits, day(2026, 10, 19)), 2);
        assert_eq!(eval.scheduled_count(&[], day(2026, 10, 19)), 0);
    }

    fn any_day() -> impl Strategy<Value = NaiveDate> {
        (0i64..40_000).prop_map(|n| day(1970, 1, 1) + chrono::Duration::days(n))
    }

    fn any_frequency() -> impl Strategy<Value = Vec<DayOfWeek>> {
        prop::collection::vec(prop::sample::select(DayOfWeek::ALL.to_vec()), 1..10)
    }

    proptest! {
        #[test]
        fn daily_habit_applies_every_day(date in any_day(), empty in any::<bool>()) {
            let frequency = if empty { Some(vec![]) } else { None };
            let h = habit(frequency, 0);
            prop_assert!(ScheduleEvaluator::default().applies_on(&h, date));
        }

        #[test]
        fn weekly_habit_applies_iff_weekday_listed(date in any_day(), frequency in any_frequency()) {
            let listed = frequency.contains(&DayOfWeek::of(date));
            let h = habit(Some(frequency), 0);
            prop_assert_eq!(ScheduleEvaluator::default().applies_on(&h, date), listed);
        }

        #[test]
        fn existed_on_splits_at_creation_day(date in any_day(), created_ms in 1i64..3_000_000_000_000) {
            let eval = ScheduleEvaluator::default();
            let created_day = eval.calendar().day_of_timestamp_ms(created_ms).unwrap();
            let h = habit(None, created_ms);
            prop_assert_eq!(eval.existed_on(&h, date), date >= created_day);
        }

        #[test]
        fn unknown_creation_always_existed(date in any_day(), created_ms in i64::MIN..=0) {
            let h = habit(None, created_ms);
            prop_assert!(ScheduleEvaluator::default().existed_on(&h, date));
        }

        #[test]
        fn classify_is_idempotent_and_complete_dominates(completed in 0usize..50, scheduled in 0usize..50) {
            let first = classify_day(completed, scheduled);
            prop_assert_eq!(first, classify_day(completed, scheduled));
            if scheduled > 0 && completed >= scheduled {
                prop_assert_eq!(first, DayStatus::Complete);
            }
        }
    }
}
