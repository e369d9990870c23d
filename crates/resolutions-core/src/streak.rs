//! Streak calculation.
//!
//! A streak is the run of consecutive successful days ending today (or
//! yesterday, while today has no record yet).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::evaluator::ScheduleEvaluator;
use crate::habit::{Habit, ResolutionDay, ResolutionHistory};

/// Longest scan, in days. No configuration can widen it.
pub const DEFAULT_MAX_STREAK_DAYS: u32 = 365;

/// What makes a day successful.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreakRule {
    /// At least one habit was completed.
    #[default]
    AnyCompletion,
    /// At least one habit was completed and every habit due that day is done.
    AllScheduled,
}

/// Walks resolution history backward from an as-of day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreakCalculator {
    evaluator: ScheduleEvaluator,
    rule: StreakRule,
    max_days: u32,
}

impl Default for StreakCalculator {
    fn default() -> Self {
        Self::new(ScheduleEvaluator::default())
    }
}

impl StreakCalculator {
    pub fn new(evaluator: ScheduleEvaluator) -> Self {
        Self {
            evaluator,
            rule: StreakRule::default(),
            max_days: DEFAULT_MAX_STREAK_DAYS,
        }
    }

    pub fn with_rule(mut self, rule: StreakRule) -> Self {
        self.rule = rule;
        self
    }

    /// Shorten the scan. Values outside `1..=365` are clamped.
    pub fn with_max_days(mut self, max_days: u32) -> Self {
        self.max_days = max_days.clamp(1, DEFAULT_MAX_STREAK_DAYS);
        self
    }

    pub fn rule(&self) -> StreakRule {
        self.rule
    }

    /// Count consecutive successful days ending at `today`.
    ///
    /// A missing record for `today` is skipped rather than ending the walk,
    /// since the day may not be finished. An empty record for `today`, or a
    /// missing or unsuccessful record for any earlier day, ends it.
    pub fn compute_streak(
        &self,
        today: NaiveDate,
        history: &ResolutionHistory,
        habits: &[Habit],
    ) -> u32 {
        let mut streak = 0;
        let mut day = today;

        for offset in 0..self.max_days {
            match history.get(day) {
                Some(record) if self.is_successful(day, record, habits) => streak += 1,
                None if offset == 0 => {}
                _ => break,
            }
            match day.pred_opt() {
                Some(previous) => day = previous,
                None => break,
            }
        }

        tracing::debug!(%today, streak, rule = ?self.rule, "computed streak");
        streak
    }

    /// Whether one recorded day counts toward the streak.
    pub fn is_successful(&self, date: NaiveDate, record: &ResolutionDay, habits: &[Habit]) -> bool {
        match self.rule {
            StreakRule::AnyCompletion => record.is_successful(),
            StreakRule::AllScheduled => {
                record.is_successful()
                    && self
                        .evaluator
                        .scheduled_habits(habits, date)
                        .all(|h| record.is_habit_completed(&h.id))
            }
        }
    }
}
