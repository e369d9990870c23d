//! Habit and resolution snapshots.
//!
//! The evaluator runs over two independently fetched inputs. This module
//! fetches both, joins them, and hands back immutable data. A source that
//! fails is logged and treated as empty.

use std::path::PathBuf;

use chrono::{Months, NaiveDate};

use crate::calendar::YearMonth;
use crate::error::{CoreError, Result};
use crate::habit::{with_default_habits, Habit, ResolutionDay, ResolutionHistory};
use crate::storage::Database;

/// Provides the user's habits.
pub trait HabitSource {
    fn habits(&self) -> Result<Vec<Habit>>;
}

/// Provides resolution records.
pub trait ResolutionSource {
    /// Records on or after `start`.
    fn resolutions_since(&self, start: NaiveDate) -> Result<Vec<ResolutionDay>>;

    /// Record for exactly `date`, if one exists.
    fn resolution_for(&self, date: NaiveDate) -> Result<Option<ResolutionDay>>;
}

/// First day of the stats window ending at `today` (one year back).
pub fn stats_window_start(today: NaiveDate) -> NaiveDate {
    today.checked_sub_months(Months::new(12)).unwrap_or(today)
}

/// First day to fetch for a heatmap of `month`: the stats window, reaching
/// back further when the month starts before it.
pub fn heatmap_window_start(month: YearMonth, today: NaiveDate) -> NaiveDate {
    stats_window_start(today).min(month.first_day())
}

/// Joined habit list and resolution history.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub habits: Vec<Habit>,
    pub history: ResolutionHistory,
}

impl Snapshot {
    pub fn new(habits: Vec<Habit>, resolutions: Vec<ResolutionDay>) -> Self {
        Self {
            habits,
            history: ResolutionHistory::from_days(resolutions),
        }
    }

    /// Fetch both inputs from their sources, one after the other.
    pub fn load(
        habits: &impl HabitSource,
        resolutions: &impl ResolutionSource,
        since: NaiveDate,
    ) -> Self {
        Self::new(
            or_empty("habits", habits.habits()),
            or_empty("resolutions", resolutions.resolutions_since(since)),
        )
    }

    /// Fetch both inputs from the SQLite file at `path` concurrently and join
    /// them once both are in.
    pub async fn load_concurrently(path: PathBuf, since: NaiveDate) -> Self {
        let habits_path = path.clone();
        let habits = tokio::task::spawn_blocking(move || Database::open_at(&habits_path)?.list_habits());
        let resolutions =
            tokio::task::spawn_blocking(move || Database::open_at(&path)?.resolutions_since(since));

        let (habits, resolutions) = tokio::join!(habits, resolutions);
        Self::new(
            or_empty("habits", flatten_join(habits)),
            or_empty("resolutions", flatten_join(resolutions)),
        )
    }

    /// Append built-in habits that are missing.
    pub fn with_default_habits(mut self) -> Self {
        self.habits = with_default_habits(self.habits);
        self
    }
}

fn flatten_join<T>(joined: std::result::Result<Result<T>, tokio::task::JoinError>) -> Result<T> {
    joined.map_err(|e| CoreError::Custom(format!("snapshot task failed: {e}")))?
}

fn or_empty<T>(what: &str, fetched: Result<Vec<T>>) -> Vec<T> {
    fetched.unwrap_or_else(|e| {
        tracing::warn!(source = what, error = %e, "snapshot unavailable, treating as empty");
        Vec::new()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::habit::DEFAULT_CLEANING_HABIT_ID;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn habit(id: &str) -> Habit {
        Habit {
            id: id.into(),
            title: id.into(),
            description: String::new(),
            created_timestamp: 0,
            frequency: None,
        }
    }

    struct FailingSource;

    impl HabitSource for FailingSource {
        fn habits(&self) -> Result<Vec<Habit>> {
            Err(CoreError::Custom("offline".into()))
        }
    }

    impl ResolutionSource for FailingSource {
        fn resolutions_since(&self, _start: NaiveDate) -> Result<Vec<ResolutionDay>> {
            Err(CoreError::Custom("offline".into()))
        }

        fn resolution_for(&self, _date: NaiveDate) -> Result<Option<ResolutionDay>> {
            Err(CoreError::Custom("offline".into()))
        }
    }

    #[test]
    fn window_starts_a_year_back() {
        assert_eq!(stats_window_start(day(2026, 10, 19)), day(2025, 10, 19));
        assert_eq!(stats_window_start(day(2028, 2, 29)), day(2027, 2, 28));
    }

    #[test]
    fn heatmap_window_reaches_back_to_old_months() {
        let today = day(2026, 10, 19);
        let old = YearMonth::new(2024, 1).unwrap();
        assert_eq!(heatmap_window_start(old, today), day(2024, 1, 1));
        let recent = YearMonth::new(2026, 4).unwrap();
        assert_eq!(heatmap_window_start(recent, today), day(2025, 10, 19));
    }

    #[test]
    fn old_month_records_survive_the_heatmap_window() {
        let db = Database::open_memory().unwrap();
        db.upsert_habit(&habit("h")).unwrap();
        db.save_resolution(&ResolutionDay::new(day(2024, 1, 10), vec!["h".into()])).unwrap();

        let month = YearMonth::new(2024, 1).unwrap();
        let today = day(2026, 10, 19);
        let snapshot = Snapshot::load(&db, &db, heatmap_window_start(month, today));
        let cell = crate::heatmap::HeatmapAggregator::default()
            .build_month_grid(month, today, &snapshot.history, &snapshot.habits)
            .cell(day(2024, 1, 10));
        assert_eq!(cell.completed, 1);
        assert_eq!(cell.status, crate::evaluator::DayStatus::Complete);
    }

    #[test]
    fn failing_sources_yield_empty_snapshot() {
        let snapshot = Snapshot::load(&FailingSource, &FailingSource, day(2026, 1, 1));
        assert!(snapshot.habits.is_empty());
        assert!(snapshot.history.is_empty());
    }

    #[test]
    fn one_failing_source_keeps_the_other() {
        let db = Database::open_memory().unwrap();
        db.upsert_habit(&habit("a")).unwrap();
        let snapshot = Snapshot::load(&db, &FailingSource, day(2026, 1, 1));
        assert_eq!(snapshot.habits.len(), 1);
        assert!(snapshot.history.is_empty());
    }

    #[test]
    fn default_habits_are_appended() {
        let snapshot = Snapshot::new(vec![habit("a")], vec![]).with_default_habits();
        assert_eq!(snapshot.habits.len(), 2);
        assert_eq!(snapshot.habits[1].id, DEFAULT_CLEANING_HABIT_ID);
    }

    #[tokio::test]
    async fn concurrent_load_joins_both_sources() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("resolutions.db");
        {
            let db = Database::open_at(&path).unwrap();
            db.upsert_habit(&habit("a")).unwrap();
            db.save_resolution(&ResolutionDay::new(day(2026, 10, 18), vec!["a".into()])).unwrap();
            db.save_resolution(&ResolutionDay::new(day(2024, 1, 1), vec!["a".into()])).unwrap();
        }

        let snapshot = Snapshot::load_concurrently(path, day(2025, 10, 19)).await;
        assert_eq!(snapshot.habits.len(), 1);
        assert_eq!(snapshot.history.len(), 1);
        assert!(snapshot.history.contains(day(2026, 10, 18)));
    }

    #[tokio::test]
    async fn concurrent_load_of_unreadable_path_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("resolutions.db");
        let snapshot = Snapshot::load_concurrently(path, day(2025, 10, 19)).await;
        assert!(snapshot.habits.is_empty());
        assert!(snapshot.history.is_empty());
    }
}
