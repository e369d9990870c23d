mod config;
pub mod database;
pub mod migrations;

pub use config::{CalendarConfig, Config, DailyConfig, RemindersConfig, StreakConfig};
pub use database::Database;

use std::path::PathBuf;

use crate::error::Result;

/// Returns the data directory, creating it if needed.
///
/// Resolution order: `RESOLUTIONS_DATA_DIR` if set, otherwise
/// `~/.config/resolutions[-dev]/` based on `RESOLUTIONS_ENV`
/// (set `RESOLUTIONS_ENV=dev` to use the development directory).
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf> {
    let dir = match std::env::var_os("RESOLUTIONS_DATA_DIR") {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");

            let env = std::env::var("RESOLUTIONS_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("resolutions-dev")
            } else {
                base_dir.join("resolutions")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
