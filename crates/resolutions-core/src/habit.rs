//! Habit and resolution records.
//!
//! Both are immutable snapshots handed to the evaluator by whatever store
//! owns them. Field names serialize in camelCase to match the documents the
//! mobile client writes.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, NaiveDate, Utc, Weekday};
use serde::{Deserialize, Serialize};

use crate::calendar::{date_key, parse_date_key, weekday_name};
use crate::error::ValidationError;

/// Id of the built-in weekly cleaning habit.
pub const DEFAULT_CLEANING_HABIT_ID: &str = "default_weekly_cleaning";

/// Weekday name used in a habit's frequency list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DayOfWeek {
    Sunday,
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl DayOfWeek {
    pub const ALL: [DayOfWeek; 7] = [
        DayOfWeek::Sunday,
        DayOfWeek::Monday,
        DayOfWeek::Tuesday,
        DayOfWeek::Wednesday,
        DayOfWeek::Thursday,
        DayOfWeek::Friday,
        DayOfWeek::Saturday,
    ];

    /// Weekday of a calendar day.
    pub fn of(date: NaiveDate) -> Self {
        date.weekday().into()
    }

    pub fn name(&self) -> &'static str {
        weekday_name((*self).into())
    }
}

impl From<Weekday> for DayOfWeek {
    fn from(weekday: Weekday) -> Self {
        match weekday {
            Weekday::Sun => DayOfWeek::Sunday,
            Weekday::Mon => DayOfWeek::Monday,
            Weekday::Tue => DayOfWeek::Tuesday,
            Weekday::Wed => DayOfWeek::Wednesday,
            Weekday::Thu => DayOfWeek::Thursday,
            Weekday::Fri => DayOfWeek::Friday,
            Weekday::Sat => DayOfWeek::Saturday,
        }
    }
}

impl From<DayOfWeek> for Weekday {
    fn from(day: DayOfWeek) -> Self {
        match day {
            DayOfWeek::Sunday => Weekday::Sun,
            DayOfWeek::Monday => Weekday::Mon,
            DayOfWeek::Tuesday => Weekday::Tue,
            DayOfWeek::Wednesday => Weekday::Wed,
            DayOfWeek::Thursday => Weekday::Thu,
            DayOfWeek::Friday => Weekday::Fri,
            DayOfWeek::Saturday => Weekday::Sat,
        }
    }
}

impl fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DayOfWeek {
    type Err = ValidationError;

    /// Accepts full names or three-letter abbreviations, any case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        DayOfWeek::ALL
            .into_iter()
            .find(|day| day.name() == upper || day.name()[..3] == upper)
            .ok_or_else(|| ValidationError::InvalidWeekday(s.to_string()))
    }
}

/// A user-defined recurring habit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Habit {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Creation instant in epoch milliseconds. Zero or negative means unknown.
    #[serde(default)]
    pub created_timestamp: i64,
    /// Weekdays the habit recurs on. Empty or absent means every day.
    #[serde(default)]
    pub frequency: Option<Vec<DayOfWeek>>,
}

impl Habit {
    /// Create a habit with a fresh id.
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        frequency: Vec<DayOfWeek>,
        created_at: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        Ok(Self {
            id: uuid::Uuid::new_v4().to_string(),
            title,
            description: description.into(),
            created_timestamp: created_at.timestamp_millis(),
            frequency: if frequency.is_empty() { None } else { Some(frequency) },
        })
    }

    /// The built-in "Weekly Cleaning" habit, due every Sunday.
    pub fn weekly_cleaning() -> Self {
        Self {
            id: DEFAULT_CLEANING_HABIT_ID.to_string(),
            title: "Weekly Cleaning".to_string(),
            description: "Time to clean your space!".to_string(),
            created_timestamp: 0,
            frequency: Some(vec![DayOfWeek::Sunday]),
        }
    }

    /// True when the habit recurs every day.
    pub fn is_daily(&self) -> bool {
        self.frequency.as_ref().map_or(true, |days| days.is_empty())
    }

    /// Human readable recurrence, e.g. `daily` or `MONDAY, FRIDAY`.
    pub fn recurrence_label(&self) -> String {
        match &self.frequency {
            Some(days) if !days.is_empty() => days
                .iter()
                .map(DayOfWeek::name)
                .collect::<Vec<_>>()
                .join(", "),
            _ => "daily".to_string(),
        }
    }
}

/// Append the built-in habits that are not already present.
pub fn with_default_habits(mut habits: Vec<Habit>) -> Vec<Habit> {
    if !habits.iter().any(|h| h.id == DEFAULT_CLEANING_HABIT_ID) {
        habits.push(Habit::weekly_cleaning());
    }
    habits
}

/// Which habits were completed on one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionDay {
    /// `YYYY-MM-DD`
    pub date: String,
    #[serde(default)]
    pub completed_habit_ids: Vec<String>,
}

impl ResolutionDay {
    pub fn new(date: NaiveDate, completed_habit_ids: Vec<String>) -> Self {
        Self {
            date: date_key(date),
            completed_habit_ids,
        }
    }

    pub fn is_habit_completed(&self, habit_id: &str) -> bool {
        self.completed_habit_ids.iter().any(|id| id == habit_id)
    }

    pub fn completed_count(&self) -> usize {
        self.completed_habit_ids.len()
    }

    /// A day counts toward a streak when anything at all was completed.
    pub fn is_successful(&self) -> bool {
        !self.completed_habit_ids.is_empty()
    }

    pub fn day(&self) -> Option<NaiveDate> {
        parse_date_key(&self.date)
    }
}

/// Resolution records keyed by calendar day.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolutionHistory {
    days: BTreeMap<NaiveDate, ResolutionDay>,
}

impl ResolutionHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index records by date. Records whose date does not parse are dropped;
    /// a later record for the same date replaces an earlier one.
    pub fn from_days(days: impl IntoIterator<Item = ResolutionDay>) -> Self {
        let mut history = Self::new();
        for day in days {
            history.insert(day);
        }
        history
    }

    pub fn insert(&mut self, day: ResolutionDay) {
        match day.day() {
            Some(date) => {
                self.days.insert(date, day);
            }
            None => tracing::warn!(date = %day.date, "skipping resolution record with malformed date"),
        }
    }

    pub fn get(&self, date: NaiveDate) -> Option<&ResolutionDay> {
        self.days.get(&date)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.days.contains_key(&date)
    }

    /// Number of ids recorded as done on `date`, zero when there is no record.
    pub fn completed_count(&self, date: NaiveDate) -> usize {
        self.get(date).map_or(0, ResolutionDay::completed_count)
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}
