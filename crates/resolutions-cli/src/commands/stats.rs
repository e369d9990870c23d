use chrono::NaiveDate;
use clap::Subcommand;
use resolutions_core::snapshot::{heatmap_window_start, stats_window_start};
use resolutions_core::{Config, Database, HeatmapAggregator, Snapshot, YearMonth};

use super::today;

#[derive(Subcommand)]
pub enum StatsAction {
    /// Current streak of successful days
    Streak {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Monthly completion heatmap
    Heatmap {
        /// Month to show (YYYY-MM), defaults to the current month
        #[arg(long)]
        month: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Fetch habits and resolutions on or after `since` concurrently.
fn load_snapshot(config: &Config, since: NaiveDate) -> Result<Snapshot, Box<dyn std::error::Error>> {
    let path = Database::default_path()?;
    // Create the file and schema before two connections race to migrate it.
    drop(Database::open_at(&path)?);
    let rt = tokio::runtime::Runtime::new()?;
    let snapshot = rt.block_on(Snapshot::load_concurrently(path, since));
    Ok(if config.daily.include_default_habits {
        snapshot.with_default_habits()
    } else {
        snapshot
    })
}

pub fn run(action: StatsAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let today = today(&config);

    match action {
        StatsAction::Streak { json } => {
            let snapshot = load_snapshot(&config, stats_window_start(today))?;
            let streak = config
                .streak_calculator()
                .compute_streak(today, &snapshot.history, &snapshot.habits);
            if json {
                let out = serde_json::json!({
                    "streak": streak,
                    "as_of": today,
                    "rule": config.streak.rule,
                });
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                println!("{streak} Days");
            }
        }
        StatsAction::Heatmap { month, json } => {
            let month = match month {
                Some(raw) => raw.parse::<YearMonth>()?,
                None => YearMonth::containing(today),
            };
            let snapshot = load_snapshot(&config, heatmap_window_start(month, today))?;
            let grid = HeatmapAggregator::new(config.evaluator()).build_month_grid(
                month,
                today,
                &snapshot.history,
                &snapshot.habits,
            );
            if json {
                println!("{}", serde_json::to_string_pretty(&grid.report())?);
            } else {
                print!("{}", grid.render_ascii());
            }
        }
    }
    Ok(())
}
