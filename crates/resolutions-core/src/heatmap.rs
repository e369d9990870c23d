//! Monthly completion heatmap.
//!
//! Produces one cell per day of a month, preceded by blank placeholders that
//! push day 1 under its weekday column in a Sunday-first grid. Cells are
//! computed lazily; iterating the grid again recomputes them.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::calendar::{TemporalRole, YearMonth};
use crate::evaluator::{DayStatus, ScheduleEvaluator};
use crate::habit::{Habit, ResolutionHistory};

/// Border color marking today's cell.
pub const TODAY_BORDER_COLOR: &str = "#FFA500";

/// Column headers of the Sunday-first grid.
pub const WEEKDAY_HEADERS: [&str; 7] = ["S", "M", "T", "W", "T", "F", "S"];

/// What a cell shows. Future cells never reveal a status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CellShade {
    NotYet,
    NoneScheduled,
    Empty,
    Partial,
    Majority,
    Complete,
}

impl From<DayStatus> for CellShade {
    fn from(status: DayStatus) -> Self {
        match status {
            DayStatus::NoneScheduled => CellShade::NoneScheduled,
            DayStatus::Empty => CellShade::Empty,
            DayStatus::Partial => CellShade::Partial,
            DayStatus::Majority => CellShade::Majority,
            DayStatus::Complete => CellShade::Complete,
        }
    }
}

impl CellShade {
    /// Background color, matching the mobile palette.
    pub fn color(&self) -> &'static str {
        match self {
            CellShade::NotYet => "#2C2C2C",
            CellShade::NoneScheduled => "#424242",
            CellShade::Empty => "#F44336",
            CellShade::Partial => "#9E9E9E",
            CellShade::Majority => "#FFC107",
            CellShade::Complete => "#4CAF50",
        }
    }

    /// Glyph for terminal rendering.
    pub fn glyph(&self) -> char {
        match self {
            CellShade::NotYet => ' ',
            CellShade::NoneScheduled => '·',
            CellShade::Empty => '○',
            CellShade::Partial => '░',
            CellShade::Majority => '▒',
            CellShade::Complete => '█',
        }
    }
}

/// One day of the grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayCell {
    pub date: NaiveDate,
    pub day_of_month: u32,
    pub scheduled: usize,
    pub completed: usize,
    pub status: DayStatus,
    pub role: TemporalRole,
}

impl DayCell {
    /// Display state honoring the future-cell rule.
    pub fn shade(&self) -> CellShade {
        match self.role {
            TemporalRole::Future => CellShade::NotYet,
            TemporalRole::Past | TemporalRole::Today => self.status.into(),
        }
    }

    pub fn is_today(&self) -> bool {
        self.role == TemporalRole::Today
    }
}

/// A grid position: a leading placeholder or a day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridSlot {
    Blank,
    Day(DayCell),
}

/// Builds month grids from a habit snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeatmapAggregator {
    evaluator: ScheduleEvaluator,
}

impl HeatmapAggregator {
    pub fn new(evaluator: ScheduleEvaluator) -> Self {
        Self { evaluator }
    }

    /// Grid for `month` as seen on `today`. Nothing is computed until the
    /// grid is iterated.
    pub fn build_month_grid<'a>(
        &self,
        month: YearMonth,
        today: NaiveDate,
        history: &'a ResolutionHistory,
        habits: &'a [Habit],
    ) -> MonthGrid<'a> {
        MonthGrid {
            evaluator: self.evaluator,
            month,
            today,
            history,
            habits,
        }
    }
}

/// Lazily evaluated month grid.
#[derive(Debug, Clone, Copy)]
pub struct MonthGrid<'a> {
    evaluator: ScheduleEvaluator,
    month: YearMonth,
    today: NaiveDate,
    history: &'a ResolutionHistory,
    habits: &'a [Habit],
}

impl<'a> MonthGrid<'a> {
    pub fn month(&self) -> YearMonth {
        self.month
    }

    pub fn title(&self) -> String {
        self.month.title()
    }

    pub fn leading_blanks(&self) -> usize {
        self.month.leading_blanks() as usize
    }

    /// Cell for a single day.
    pub fn cell(&self, date: NaiveDate) -> DayCell {
        let scheduled = self.evaluator.scheduled_count(self.habits, date);
        let completed = self.history.completed_count(date);
        DayCell {
            date,
            day_of_month: chrono::Datelike::day(&date),
            scheduled,
            completed,
            status: DayStatus::classify(completed, scheduled),
            role: TemporalRole::of(date, self.today),
        }
    }

    /// Day cells in calendar order, without placeholders.
    pub fn cells(&self) -> impl Iterator<Item = DayCell> + 'a {
        let grid = *self;
        self.month.days().map(move |date| grid.cell(date))
    }

    /// Placeholders followed by day cells.
    pub fn slots(&self) -> impl Iterator<Item = GridSlot> + 'a {
        std::iter::repeat(GridSlot::Blank)
            .take(self.leading_blanks())
            .chain(self.cells().map(GridSlot::Day))
    }

    /// Materialize the grid for serialization.
    pub fn report(&self) -> MonthGridReport {
        let cells: Vec<HeatmapCellReport> = self
            .cells()
            .map(|cell| HeatmapCellReport {
                shade: cell.shade(),
                color: cell.shade().color().to_string(),
                today: cell.is_today(),
                cell,
            })
            .collect();
        MonthGridReport {
            month: self.month.to_string(),
            title: self.title(),
            leading_blanks: self.leading_blanks(),
            cells,
        }
    }

    /// Render as a Sunday-first text calendar. Today is bracketed.
    pub fn render_ascii(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!("\n{}\n", self.title()));
        output.push_str(&"=".repeat(35));
        output.push('\n');

        for header in WEEKDAY_HEADERS {
            output.push_str(&format!("{:^5}", header));
        }
        output.push('\n');

        let mut column = 0;
        for slot in self.slots() {
            match slot {
                GridSlot::Blank => output.push_str("     "),
                GridSlot::Day(cell) => {
                    let label = format!("{:>2}{}", cell.day_of_month, cell.shade().glyph());
                    if cell.is_today() {
                        output.push_str(&format!("[{label}]"));
                    } else {
                        output.push_str(&format!(" {label} "));
                    }
                }
            }
            column += 1;
            if column % 7 == 0 {
                output.push('\n');
            }
        }
        if column % 7 != 0 {
            output.push('\n');
        }

        output.push_str(&"=".repeat(35));
        output.push('\n');
        output.push_str("Legend: █ all ▒ half+ ░ some ○ none · nothing due\n");
        output
    }
}

/// Serializable heatmap cell.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeatmapCellReport {
    #[serde(flatten)]
    pub cell: DayCell,
    pub shade: CellShade,
    pub color: String,
    pub today: bool,
}

/// Serializable month grid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthGridReport {
    pub month: String,
    pub title: String,
    pub leading_blanks: usize,
    pub cells: Vec<HeatmapCellReport>,
}
