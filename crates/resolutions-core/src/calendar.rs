//! Civil calendar helpers.
//!
//! All day arithmetic goes through a fixed Gregorian calendar with a fixed UTC
//! offset, so the same inputs always land on the same calendar day no matter
//! which machine evaluates them.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, Offset, Utc, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Storage and display format of a calendar day.
pub const DATE_KEY_FORMAT: &str = "%Y-%m-%d";

/// Parse a `YYYY-MM-DD` key. Returns `None` for anything else.
pub fn parse_date_key(key: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(key.trim(), DATE_KEY_FORMAT).ok()
}

/// Parse a `YYYY-MM-DD` key, reporting malformed input as a validation error.
pub fn require_date_key(key: &str) -> Result<NaiveDate, ValidationError> {
    parse_date_key(key).ok_or_else(|| ValidationError::InvalidDate(key.to_string()))
}

/// Format a day as its `YYYY-MM-DD` key.
pub fn date_key(date: NaiveDate) -> String {
    date.format(DATE_KEY_FORMAT).to_string()
}

/// Weekday position in a Sunday-first week (Sunday = 1 ... Saturday = 7).
pub fn sunday_first_index(date: NaiveDate) -> u32 {
    date.weekday().number_from_sunday()
}

/// Calendar used to turn instants into days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HabitCalendar {
    offset: FixedOffset,
}

impl Default for HabitCalendar {
    fn default() -> Self {
        Self::utc()
    }
}

impl HabitCalendar {
    pub fn utc() -> Self {
        Self { offset: Utc.fix() }
    }

    /// Calendar with the given offset from UTC in minutes (east positive).
    pub fn from_offset_minutes(minutes: i32) -> Result<Self, ValidationError> {
        minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .map(|offset| Self { offset })
            .ok_or_else(|| ValidationError::InvalidValue {
                field: "calendar.utc_offset_minutes".into(),
                message: format!("{minutes} is not a valid UTC offset"),
            })
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Calendar day of an instant given in milliseconds since the epoch.
    pub fn day_of_timestamp_ms(&self, millis: i64) -> Option<NaiveDate> {
        DateTime::<Utc>::from_timestamp_millis(millis)
            .map(|instant| instant.with_timezone(&self.offset).date_naive())
    }

    /// Calendar day of an instant.
    pub fn day_of(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.offset).date_naive()
    }
}

/// Where a day sits relative to the as-of day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TemporalRole {
    Past,
    Today,
    Future,
}

impl TemporalRole {
    pub fn of(date: NaiveDate, today: NaiveDate) -> Self {
        match date.cmp(&today) {
            std::cmp::Ordering::Less => TemporalRole::Past,
            std::cmp::Ordering::Equal => TemporalRole::Today,
            std::cmp::Ordering::Greater => TemporalRole::Future,
        }
    }
}

/// A calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct YearMonth {
    first_day: NaiveDate,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(|first_day| Self { first_day })
    }

    /// Month containing `date`.
    pub fn containing(date: NaiveDate) -> Self {
        Self {
            first_day: date.with_day(1).unwrap_or(date),
        }
    }

    pub fn year(&self) -> i32 {
        self.first_day.year()
    }

    pub fn month(&self) -> u32 {
        self.first_day.month()
    }

    pub fn first_day(&self) -> NaiveDate {
        self.first_day
    }

    pub fn days_in_month(&self) -> u32 {
        let (year, month) = if self.month() == 12 {
            (self.year() + 1, 1)
        } else {
            (self.year(), self.month() + 1)
        };
        NaiveDate::from_ymd_opt(year, month, 1)
            .map(|next| next.signed_duration_since(self.first_day).num_days() as u32)
            .unwrap_or(31)
    }

    /// Every day of the month in order.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + Clone {
        let first = self.first_day;
        (0..self.days_in_month()).filter_map(move |n| first.checked_add_days(chrono::Days::new(n as u64)))
    }

    /// Placeholders needed before day 1 in a Sunday-first grid.
    pub fn leading_blanks(&self) -> u32 {
        sunday_first_index(self.first_day) - 1
    }

    /// Display title such as `October 2026`.
    pub fn title(&self) -> String {
        self.first_day.format("%B %Y").to_string()
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), self.month())
    }
}

impl FromStr for YearMonth {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        NaiveDate::parse_from_str(&format!("{trimmed}-01"), DATE_KEY_FORMAT)
            .map(|first_day| Self { first_day })
            .map_err(|_| ValidationError::InvalidMonth(s.to_string()))
    }
}

/// Weekday name as stored in a habit's frequency list.
pub fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Sun => "SUNDAY",
        Weekday::Mon => "MONDAY",
        Weekday::Tue => "TUESDAY",
        Weekday::Wed => "WEDNESDAY",
        Weekday::Thu => "THURSDAY",
        Weekday::Fri => "FRIDAY",
        Weekday::Sat => "SATURDAY",
    }
}
