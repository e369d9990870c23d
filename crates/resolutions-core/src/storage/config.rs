//! TOML-based application configuration.
//!
//! Stores user preferences including:
//! - The UTC offset used to map instants to calendar days
//! - Streak rule and scan window
//! - Whether built-in habits are injected
//! - Reminder and accountability report settings
//!
//! Configuration is stored at `~/.config/resolutions/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::calendar::HabitCalendar;
use crate::error::{ConfigError, Result};
use crate::evaluator::ScheduleEvaluator;
use crate::streak::{StreakCalculator, StreakRule, DEFAULT_MAX_STREAK_DAYS};

/// File name of the configuration inside the data directory.
pub const CONFIG_FILE: &str = "config.toml";

/// Calendar configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CalendarConfig {
    /// Minutes east of UTC used for day boundaries.
    #[serde(default)]
    pub utc_offset_minutes: i32,
}

/// Streak configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreakConfig {
    #[serde(default)]
    pub rule: StreakRule,
    #[serde(default = "default_max_days")]
    pub max_days: u32,
}

/// Daily view configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyConfig {
    /// Add the built-in "Weekly Cleaning" habit when it is missing.
    #[serde(default = "default_true")]
    pub include_default_habits: bool,
}

/// Reminder configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemindersConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Accountability partner's phone number. Empty disables the report.
    #[serde(default)]
    pub recipient_phone: String,
    /// Prefix for numbers entered without a leading `+`.
    #[serde(default = "default_country_code")]
    pub default_country_code: String,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/resolutions/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub calendar: CalendarConfig,
    #[serde(default)]
    pub streak: StreakConfig,
    #[serde(default)]
    pub daily: DailyConfig,
    #[serde(default)]
    pub reminders: RemindersConfig,
}

fn default_max_days() -> u32 {
    DEFAULT_MAX_STREAK_DAYS
}
fn default_true() -> bool {
    true
}
fn default_country_code() -> String {
    "+91".to_string()
}

impl Default for StreakConfig {
    fn default() -> Self {
        Self {
            rule: StreakRule::default(),
            max_days: default_max_days(),
        }
    }
}

impl Default for DailyConfig {
    fn default() -> Self {
        Self {
            include_default_habits: true,
        }
    }
}

impl Default for RemindersConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            recipient_phone: String::new(),
            default_country_code: default_country_code(),
        }
    }
}

impl RemindersConfig {
    /// Normalized recipient number, or `None` when none is set.
    pub fn recipient(&self) -> Option<String> {
        let phone = normalize_phone(&self.recipient_phone, &self.default_country_code);
        (!phone.is_empty()).then_some(phone)
    }
}

/// Keep digits and `+`, and prefix `country_code` when the number has no
/// leading `+`. Returns an empty string when no digits remain.
pub fn normalize_phone(raw: &str, country_code: &str) -> String {
    let sanitized: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '+')
        .collect();
    if !sanitized.chars().any(|c| c.is_ascii_digit()) {
        return String::new();
    }
    if sanitized.starts_with('+') {
        sanitized
    } else {
        format!("{country_code}{sanitized}")
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_none() {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value.parse::<bool>().map_err(|e| invalid(e.to_string()))?,
                    ),
                    serde_json::Value::Number(_) => {
                        let n = value
                            .parse::<i64>()
                            .map_err(|_| invalid(format!("cannot parse '{value}' as integer")))?;
                        serde_json::Value::Number(n.into())
                    }
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                    }
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    /// Default config path inside the data directory.
    pub fn path() -> Result<PathBuf> {
        Ok(data_dir()?.join(CONFIG_FILE))
    }

    /// Load from the data directory, writing defaults if the file is missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::path()?)
    }

    /// Load from an explicit path, writing defaults if the file is missing.
    pub fn load_from(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })?;
                cfg.validate()?;
                Ok(cfg)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Persist to the data directory.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path()?)
    }

    /// Persist to an explicit path.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))?;
        Ok(())
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by key without saving.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value does not fit the field.
    pub fn apply(&mut self, key: &str, value: &str) -> Result<()> {
        let mut json = serde_json::to_value(&*self)?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        updated.validate()?;
        *self = updated;
        if key == "reminders.recipient_phone" {
            self.reminders.recipient_phone =
                normalize_phone(&self.reminders.recipient_phone, &self.reminders.default_country_code);
        }
        Ok(())
    }

    /// Set a config value by key and save.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.apply(key, value)?;
        self.save()
    }

    fn validate(&self) -> Result<(), ConfigError> {
        HabitCalendar::from_offset_minutes(self.calendar.utc_offset_minutes).map_err(|e| {
            ConfigError::InvalidValue {
                key: "calendar.utc_offset_minutes".into(),
                message: e.to_string(),
            }
        })?;
        if !(1..=DEFAULT_MAX_STREAK_DAYS).contains(&self.streak.max_days) {
            return Err(ConfigError::InvalidValue {
                key: "streak.max_days".into(),
                message: format!("must be between 1 and {DEFAULT_MAX_STREAK_DAYS}"),
            });
        }
        Ok(())
    }

    /// Calendar for day boundaries. Falls back to UTC for an invalid offset.
    pub fn habit_calendar(&self) -> HabitCalendar {
        HabitCalendar::from_offset_minutes(self.calendar.utc_offset_minutes).unwrap_or_default()
    }

    pub fn evaluator(&self) -> ScheduleEvaluator {
        ScheduleEvaluator::new(self.habit_calendar())
    }

    pub fn streak_calculator(&self) -> StreakCalculator {
        StreakCalculator::new(self.evaluator())
            .with_rule(self.streak.rule)
            .with_max_days(self.streak.max_days)
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "falling back to default configuration");
            Self::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.streak.rule, StreakRule::AnyCompletion);
        assert_eq!(parsed.streak.max_days, 365);
        assert!(parsed.daily.include_default_habits);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let parsed: Config = toml::from_str("[streak]\nrule = \"all_scheduled\"\n").unwrap();
        assert_eq!(parsed.streak.rule, StreakRule::AllScheduled);
        assert_eq!(parsed.streak.max_days, 365);
        assert!(parsed.reminders.enabled);
        assert_eq!(parsed.calendar.utc_offset_minutes, 0);
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("daily.include_default_habits").as_deref(), Some("true"));
        assert_eq!(cfg.get("streak.max_days").as_deref(), Some("365"));
        assert_eq!(cfg.get("streak.rule").as_deref(), Some("any_completion"));
        assert!(cfg.get("streak.missing_key").is_none());
        assert!(cfg.get("").is_none());
    }

    #[test]
    fn apply_updates_typed_values() {
        let mut cfg = Config::default();
        cfg.apply("calendar.utc_offset_minutes", "-300").unwrap();
        cfg.apply("reminders.recipient_phone", "+15550100").unwrap();
        cfg.apply("streak.rule", "all_scheduled").unwrap();
        cfg.apply("reminders.enabled", "false").unwrap();
        assert_eq!(cfg.calendar.utc_offset_minutes, -300);
        assert_eq!(cfg.reminders.recipient_phone, "+15550100");
        assert_eq!(cfg.streak.rule, StreakRule::AllScheduled);
        assert!(!cfg.reminders.enabled);
    }

    #[test]
    fn apply_rejects_unknown_key_and_bad_values() {
        let mut cfg = Config::default();
        assert!(cfg.apply("streak.nonexistent", "1").is_err());
        assert!(cfg.apply("reminders.enabled", "maybe").is_err());
        assert!(cfg.apply("streak.rule", "most_days").is_err());
        assert!(cfg.apply("calendar.utc_offset_minutes", "5000").is_err());
        assert!(cfg.apply("streak.max_days", "0").is_err());
        assert!(cfg.apply("streak.max_days", "1000").is_err());
        // failed updates leave the config untouched
        assert_eq!(cfg.streak.max_days, 365);
        assert_eq!(cfg.calendar.utc_offset_minutes, 0);
    }

    #[test]
    fn max_days_is_capped_at_a_year() {
        let mut cfg = Config::default();
        cfg.apply("streak.max_days", "365").unwrap();
        assert!(cfg.apply("streak.max_days", "366").is_err());
        assert_eq!(cfg.streak.max_days, 365);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "[streak]\nmax_days = 1000\n").unwrap();
        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn recipient_phone_is_normalized() {
        let mut cfg = Config::default();
        cfg.apply("reminders.recipient_phone", " +1 (555) 010-0 ").unwrap();
        assert_eq!(cfg.reminders.recipient_phone, "+15550100");
        cfg.apply("reminders.recipient_phone", "98765 43210").unwrap();
        assert_eq!(cfg.reminders.recipient_phone, "+919876543210");
        cfg.apply("reminders.recipient_phone", "none").unwrap();
        assert_eq!(cfg.reminders.recipient_phone, "");
        assert_eq!(cfg.reminders.recipient(), None);
    }

    #[test]
    fn recipient_normalizes_hand_edited_numbers() {
        let mut cfg = Config::default();
        cfg.reminders.recipient_phone = "555-0100".into();
        cfg.reminders.default_country_code = "+1".into();
        assert_eq!(cfg.reminders.recipient().as_deref(), Some("+15550100"));
        assert_eq!(normalize_phone("+", "+1"), "");
    }

    #[test]
    fn load_from_writes_defaults_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        let cfg = Config::load_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(cfg.streak.max_days, 365);
    }

    #[test]
    fn save_and_reload_preserves_changes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        let mut cfg = Config::default();
        cfg.apply("streak.max_days", "90").unwrap();
        cfg.save_to(&path).unwrap();
        let reloaded = Config::load_from(&path).unwrap();
        assert_eq!(reloaded.streak.max_days, 90);
    }

    #[test]
    fn load_from_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "streak = [").unwrap();
        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn derived_components_follow_settings() {
        let mut cfg = Config::default();
        cfg.apply("streak.rule", "all_scheduled").unwrap();
        cfg.apply("calendar.utc_offset_minutes", "60").unwrap();
        assert_eq!(cfg.streak_calculator().rule(), StreakRule::AllScheduled);
        assert_eq!(cfg.habit_calendar().offset().local_minus_utc(), 3600);
    }
}
