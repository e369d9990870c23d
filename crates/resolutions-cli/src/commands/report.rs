use clap::Subcommand;
use resolutions_core::report::REMINDER_TITLE;
use resolutions_core::{Config, DailyReport, Database};

use super::{habits_for_views, today};

#[derive(Subcommand)]
pub enum ReportAction {
    /// Reminder and accountability report for today
    Today {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

pub fn run(action: ReportAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let db = Database::open()?;

    match action {
        ReportAction::Today { json } => {
            let today = today(&config);
            let habits = habits_for_views(&db, &config)?;
            let resolution = db.resolution_for(today)?;
            let report = DailyReport::build(&config.evaluator(), today, &habits, resolution.as_ref());

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
                return Ok(());
            }

            println!(
                "Scheduled: {}, Completed: {}, Remaining: {}",
                report.scheduled, report.completed, report.remaining
            );
            if config.reminders.enabled {
                if let Some(message) = report.reminder_message() {
                    println!("\n{REMINDER_TITLE}\n{message}");
                }
            }
            match config.reminders.recipient() {
                Some(recipient) => {
                    println!("\nTo {recipient}:");
                    print!("{}", report.accountability_body());
                }
                None => {
                    tracing::info!("recipient phone number not set, skipping accountability report");
                }
            }
        }
    }
    Ok(())
}
