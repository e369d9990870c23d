//! Daily completion view.
//!
//! Lists the habits due on one day with their checkbox state. Only today can
//! be edited; past days are read-only and future days cannot be opened.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::calendar::{date_key, TemporalRole};
use crate::error::ValidationError;
use crate::evaluator::ScheduleEvaluator;
use crate::habit::{Habit, ResolutionDay};

/// One habit row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyEntry {
    pub habit_id: String,
    pub title: String,
    pub description: String,
    pub completed: bool,
}

/// Habits due on a day and whether each is done.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyView {
    pub date: NaiveDate,
    pub role: TemporalRole,
    pub editable: bool,
    pub entries: Vec<DailyEntry>,
}

impl DailyView {
    /// Build the view for `date` as seen on `today`.
    ///
    /// # Errors
    /// Returns [`ValidationError::FutureDate`] when `date` is after `today`.
    pub fn build(
        evaluator: &ScheduleEvaluator,
        date: NaiveDate,
        today: NaiveDate,
        habits: &[Habit],
        resolution: Option<&ResolutionDay>,
    ) -> Result<Self, ValidationError> {
        let role = TemporalRole::of(date, today);
        if role == TemporalRole::Future {
            return Err(ValidationError::FutureDate(date_key(date)));
        }

        let entries = evaluator
            .scheduled_habits(habits, date)
            .map(|habit| DailyEntry {
                habit_id: habit.id.clone(),
                title: habit.title.clone(),
                description: habit.description.clone(),
                completed: resolution.is_some_and(|r| r.is_habit_completed(&habit.id)),
            })
            .collect();

        Ok(Self {
            date,
            role,
            editable: role == TemporalRole::Today,
            entries,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `(completed, total)` over the presented habits.
    pub fn progress(&self) -> (usize, usize) {
        let done = self.entries.iter().filter(|e| e.completed).count();
        (done, self.entries.len())
    }

    /// Every presented habit is done.
    pub fn all_complete(&self) -> bool {
        let (done, total) = self.progress();
        total > 0 && done == total
    }

    /// Set one habit's checkbox and return the record to persist.
    ///
    /// The returned record holds the full completed set of the presented
    /// habits; it replaces whatever was stored for the day.
    ///
    /// # Errors
    /// Returns [`ValidationError::ReadOnlyDate`] unless the view is for today
    /// and [`ValidationError::UnknownHabit`] when the habit is not presented.
    pub fn toggle(&mut self, habit_id: &str, completed: bool) -> Result<ResolutionDay, ValidationError> {
        if !self.editable {
            return Err(ValidationError::ReadOnlyDate(date_key(self.date)));
        }
        let entry = self
            .entries
            .iter_mut()
            .find(|e| e.habit_id == habit_id)
            .ok_or_else(|| ValidationError::UnknownHabit(habit_id.to_string()))?;
        entry.completed = completed;
        Ok(self.to_resolution_day())
    }

    /// Current checkbox state as a resolution record.
    pub fn to_resolution_day(&self) -> ResolutionDay {
        ResolutionDay::new(
            self.date,
            self.entries
                .iter()
                .filter(|e| e.completed)
                .map(|e| e.habit_id.clone())
                .collect(),
        )
    }
}
