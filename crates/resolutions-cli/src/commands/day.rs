use chrono::NaiveDate;
use clap::Subcommand;
use resolutions_core::{Config, DailyView, Database, Habit, ScheduleEvaluator, TemporalRole};

use super::{date_or_today, habits_for_views, today};

#[derive(Subcommand)]
pub enum DayAction {
    /// Show the habits due on a day
    Show {
        /// Day to show (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Mark a habit done today
    Check {
        /// Habit ID
        id: String,
    },
    /// Mark a habit not done today
    Uncheck {
        /// Habit ID
        id: String,
    },
}

pub fn run(action: DayAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let db = Database::open()?;
    let evaluator = config.evaluator();
    let habits = habits_for_views(&db, &config)?;
    let today = today(&config);

    match action {
        DayAction::Show { date, json } => {
            let date = date_or_today(date.as_deref(), &config)?;
            let resolution = db.resolution_for(date)?;
            let view = DailyView::build(&evaluator, date, today, &habits, resolution.as_ref())?;
            if json {
                println!("{}", serde_json::to_string_pretty(&view)?);
            } else {
                print_view(&view);
            }
        }
        DayAction::Check { id } => toggle(&db, &evaluator, &habits, today, &id, true)?,
        DayAction::Uncheck { id } => toggle(&db, &evaluator, &habits, today, &id, false)?,
    }
    Ok(())
}

fn toggle(
    db: &Database,
    evaluator: &ScheduleEvaluator,
    habits: &[Habit],
    today: NaiveDate,
    habit_id: &str,
    completed: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let resolution = db.resolution_for(today)?;
    let mut view = DailyView::build(evaluator, today, today, habits, resolution.as_ref())?;
    let record = view.toggle(habit_id, completed)?;
    db.save_resolution(&record)?;

    let (done, total) = view.progress();
    println!("{done}/{total} done for {}", record.date);
    if view.all_complete() {
        println!("All resolutions complete. Well done!");
    }
    Ok(())
}

fn print_view(view: &DailyView) {
    println!("Resolutions for {}", view.date);
    if view.is_empty() {
        println!("No habits found. Please add using `habit add`.");
        return;
    }
    for entry in &view.entries {
        let mark = if entry.completed { "[x]" } else { "[ ]" };
        println!("{mark} {}  ({})", entry.title, entry.habit_id);
    }
    let (done, total) = view.progress();
    println!("{done}/{total} done");
    if view.role == TemporalRole::Past {
        println!("(read-only)");
    }
}
