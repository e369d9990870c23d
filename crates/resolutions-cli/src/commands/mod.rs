pub mod config;
pub mod day;
pub mod habit;
pub mod report;
pub mod stats;

use chrono::{NaiveDate, Utc};
use resolutions_core::calendar::require_date_key;
use resolutions_core::habit::with_default_habits;
use resolutions_core::{Config, Database, Habit};

/// Today's date in the configured calendar.
pub fn today(config: &Config) -> NaiveDate {
    config.habit_calendar().day_of(Utc::now())
}

/// `--date` argument, defaulting to today.
pub fn date_or_today(date: Option<&str>, config: &Config) -> Result<NaiveDate, Box<dyn std::error::Error>> {
    match date {
        Some(raw) => Ok(require_date_key(raw)?),
        None => Ok(today(config)),
    }
}

/// Stored habits plus built-in ones when enabled.
pub fn habits_for_views(db: &Database, config: &Config) -> Result<Vec<Habit>, Box<dyn std::error::Error>> {
    let habits = db.list_habits()?;
    Ok(if config.daily.include_default_habits {
        with_default_habits(habits)
    } else {
        habits
    })
}
