use chrono::Utc;
use clap::Subcommand;
use resolutions_core::{Config, Database, DayOfWeek, Habit};

use super::habits_for_views;

#[derive(Subcommand)]
pub enum HabitAction {
    /// Create a habit
    Add {
        /// Habit title
        title: String,
        /// Longer description
        #[arg(long, default_value = "")]
        description: String,
        /// Weekdays the habit recurs on (e.g. MONDAY,FRIDAY); every day if omitted
        #[arg(long, value_delimiter = ',')]
        days: Vec<String>,
    },
    /// List habits
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete a habit
    Delete {
        /// Habit ID
        id: String,
    },
}

pub fn run(action: HabitAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;

    match action {
        HabitAction::Add {
            title,
            description,
            days,
        } => {
            let frequency = days
                .iter()
                .map(|d| d.parse::<DayOfWeek>())
                .collect::<Result<Vec<_>, _>>()?;
            let habit = Habit::new(title, description, frequency, Utc::now())?;
            db.upsert_habit(&habit)?;
            println!("Habit created: {}", habit.id);
            println!("Recurs: {}", habit.recurrence_label());
        }
        HabitAction::List { json } => {
            let config = Config::load()?;
            let habits = habits_for_views(&db, &config)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&habits)?);
            } else if habits.is_empty() {
                println!("No habits found. Add one with `habit add <title>`.");
            } else {
                for habit in &habits {
                    println!("{}  {}  ({})", habit.id, habit.title, habit.recurrence_label());
                }
            }
        }
        HabitAction::Delete { id } => {
            if db.delete_habit(&id)? {
                println!("Habit deleted: {id}");
            } else {
                return Err(format!("habit not found: {id}").into());
            }
        }
    }
    Ok(())
}
