//! Daily reminder and accountability report.
//!
//! Composes the text a background job would send: a nudge when habits are
//! still open, and a per-habit checklist for an accountability partner.
//! Delivering either message is up to the caller.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::calendar::date_key;
use crate::evaluator::ScheduleEvaluator;
use crate::habit::{Habit, ResolutionDay};

/// Title of the reminder notification.
pub const REMINDER_TITLE: &str = "Keep going!";

/// One line of the accountability report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportLine {
    pub habit_id: String,
    pub title: String,
    pub completed: bool,
}

/// Completion summary for one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyReport {
    pub date: NaiveDate,
    pub scheduled: usize,
    pub completed: usize,
    pub remaining: usize,
    pub lines: Vec<ReportLine>,
}

impl DailyReport {
    /// Summarize `date`. `completed` counts every recorded id, matching the
    /// heatmap; `remaining` never goes below zero.
    pub fn build(
        evaluator: &ScheduleEvaluator,
        date: NaiveDate,
        habits: &[Habit],
        resolution: Option<&ResolutionDay>,
    ) -> Self {
        let lines: Vec<ReportLine> = evaluator
            .scheduled_habits(habits, date)
            .map(|habit| ReportLine {
                habit_id: habit.id.clone(),
                title: habit.title.clone(),
                completed: resolution.is_some_and(|r| r.is_habit_completed(&habit.id)),
            })
            .collect();

        let scheduled = lines.len();
        let completed = resolution.map_or(0, ResolutionDay::completed_count);
        let remaining = scheduled.saturating_sub(completed);
        tracing::debug!(%date, scheduled, completed, remaining, "built daily report");

        Self {
            date,
            scheduled,
            completed,
            remaining,
            lines,
        }
    }

    /// Reminder body, or `None` when nothing is left to do.
    pub fn reminder_message(&self) -> Option<String> {
        (self.remaining > 0).then(|| {
            format!(
                "You have {} resolutions remaining for today. Finish them now!",
                self.remaining
            )
        })
    }

    /// Checklist text for the accountability partner.
    pub fn accountability_body(&self) -> String {
        let mut body = format!("Daily Report ({}):\n", date_key(self.date));
        for line in &self.lines {
            body.push_str(if line.completed { "✓ " } else { "✗ " });
            body.push_str(&line.title);
            body.push('\n');
        }
        body
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::habit::DayOfWeek;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn habit(id: &str, title: &str, frequency: Option<Vec<DayOfWeek>>) -> Habit {
        Habit {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            created_timestamp: 0,
            frequency,
        }
    }

    fn habits() -> Vec<Habit> {
        vec![
            habit("read", "Read 20 pages", None),
            habit("run", "Morning run", Some(vec![DayOfWeek::Monday])),
            habit("swim", "Swim", Some(vec![DayOfWeek::Wednesday])),
        ]
    }

    #[test]
    fn reminder_counts_remaining_habits() {
        let eval = ScheduleEvaluator::default();
        let record = ResolutionDay::new(day(2026, 10, 19), vec!["read".into()]);
        let report = DailyReport::build(&eval, day(2026, 10, 19), &habits(), Some(&record));
        assert_eq!(report.scheduled, 2);
        assert_eq!(report.remaining, 1);
        assert_eq!(
            report.reminder_message().as_deref(),
            Some("You have 1 resolutions remaining for today. Finish them now!")
        );
    }

    #[test]
    fn no_reminder_when_done() {
        let eval = ScheduleEvaluator::default();
        let record = ResolutionDay::new(day(2026, 10, 19), vec!["read".into(), "run".into()]);
        let report = DailyReport::build(&eval, day(2026, 10, 19), &habits(), Some(&record));
        assert_eq!(report.remaining, 0);
        assert!(report.reminder_message().is_none());
    }

    #[test]
    fn stale_completions_do_not_go_negative() {
        let eval = ScheduleEvaluator::default();
        let record = ResolutionDay::new(
            day(2026, 10, 19),
            vec!["read".into(), "run".into(), "deleted".into()],
        );
        let report = DailyReport::build(&eval, day(2026, 10, 19), &habits(), Some(&record));
        assert_eq!(report.completed, 3);
        assert_eq!(report.remaining, 0);
    }

    #[test]
    fn accountability_body_lists_scheduled_habits() {
        let eval = ScheduleEvaluator::default();
        let record = ResolutionDay::new(day(2026, 10, 19), vec!["run".into()]);
        let report = DailyReport::build(&eval, day(2026, 10, 19), &habits(), Some(&record));
        assert_eq!(
            report.accountability_body(),
            "Daily Report (2026-10-19):\n✗ Read 20 pages\n✓ Morning run\n"
        );
    }

    #[test]
    fn missing_record_means_nothing_done() {
        let eval = ScheduleEvaluator::default();
        let report = DailyReport::build(&eval, day(2026, 10, 21), &habits(), None);
        assert_eq!(report.scheduled, 2);
        assert_eq!(report.completed, 0);
        assert_eq!(report.remaining, 2);
    }
}
