//! # Resolutions Core Library
//!
//! Business logic for the Resolutions habit tracker. Users define recurring
//! habits, tick them off per calendar day, and review a monthly heatmap and a
//! streak. The CLI and any other front end are thin layers over this crate.
//!
//! ## Architecture
//!
//! - **Evaluator**: decides whether a habit is due on a day and buckets a
//!   day's completion ratio. Pure, total, and fail-open.
//! - **Consumers**: the daily view, streak calculator, heatmap aggregator and
//!   daily report all build on the evaluator's single `is_scheduled` predicate.
//! - **Snapshot**: joins the habit list and the resolution history, fetched
//!   concurrently, before any consumer runs.
//! - **Storage**: SQLite persistence and TOML configuration.
//!
//! Nothing in the evaluator or its consumers reads the clock; callers pass the
//! as-of day explicitly.
//!
//! ## Key Components
//!
//! - [`ScheduleEvaluator`]: recurrence and creation-date checks
//! - [`StreakCalculator`]: consecutive successful days
//! - [`HeatmapAggregator`]: monthly completion grid
//! - [`DailyView`]: the per-day checklist
//! - [`Database`]: habit and resolution persistence
//! - [`Config`]: application configuration

pub mod calendar;
pub mod daily;
pub mod error;
pub mod evaluator;
pub mod habit;
pub mod heatmap;
pub mod report;
pub mod snapshot;
pub mod storage;
pub mod streak;

pub use calendar::{HabitCalendar, TemporalRole, YearMonth};
pub use daily::{DailyEntry, DailyView};
pub use error::{ConfigError, CoreError, DatabaseError, ValidationError};
pub use evaluator::{classify_day, DayStatus, ScheduleEvaluator};
pub use habit::{DayOfWeek, Habit, ResolutionDay, ResolutionHistory};
pub use heatmap::{CellShade, DayCell, GridSlot, HeatmapAggregator, MonthGrid};
pub use report::DailyReport;
pub use snapshot::{HabitSource, ResolutionSource, Snapshot};
pub use storage::{Config, Database};
pub use streak::{StreakCalculator, StreakRule};
