//! SQLite-based habit and resolution storage.
//!
//! Provides persistent storage for:
//! - Habit definitions
//! - One resolution record per calendar day
//!
//! List-valued fields (a habit's frequency, a day's completed ids) are stored
//! as JSON text.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};

use super::data_dir;
use super::migrations;
use crate::calendar::date_key;
use crate::error::{DatabaseError, Result};
use crate::habit::{DayOfWeek, Habit, ResolutionDay};
use crate::snapshot::{HabitSource, ResolutionSource};

/// File name of the database inside the data directory.
pub const DATABASE_FILE: &str = "resolutions.db";

/// SQLite database for habits and resolutions.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Get a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Default database path inside the data directory.
    pub fn default_path() -> Result<PathBuf> {
        Ok(data_dir()?.join(DATABASE_FILE))
    }

    /// Open the database in the data directory.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        Self::open_at(&Self::default_path()?)
    }

    /// Open the database at an explicit path.
    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        conn.busy_timeout(Duration::from_secs(5))?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database (for tests).
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<()> {
        migrations::migrate(&self.conn)
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
        Ok(())
    }

    /// Insert or replace a habit.
    pub fn upsert_habit(&self, habit: &Habit) -> Result<()> {
        let frequency = habit
            .frequency
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;
        self.conn.execute(
            "INSERT INTO habits (id, title, description, created_timestamp, frequency)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(id) DO UPDATE SET
                title = excluded.title,
                description = excluded.description,
                created_timestamp = excluded.created_timestamp,
                frequency = excluded.frequency",
            params![
                habit.id,
                habit.title,
                habit.description,
                habit.created_timestamp,
                frequency,
            ],
        )?;
        tracing::info!(habit = %habit.id, "saved habit");
        Ok(())
    }

    /// Delete a habit. Returns whether a row was removed.
    ///
    /// Resolution records that mention the habit are left untouched.
    pub fn delete_habit(&self, habit_id: &str) -> Result<bool> {
        let removed = self
            .conn
            .execute("DELETE FROM habits WHERE id = ?1", params![habit_id])?;
        tracing::info!(habit = habit_id, removed, "deleted habit");
        Ok(removed > 0)
    }

    /// All habits, oldest first.
    pub fn list_habits(&self) -> Result<Vec<Habit>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, title, description, created_timestamp, frequency
             FROM habits
             ORDER BY created_timestamp ASC, id ASC",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, i64>(3)?,
                row.get::<_, Option<String>>(4)?,
            ))
        })?;

        let mut habits = Vec::new();
        for row in rows {
            let (id, title, description, created_timestamp, frequency) = row?;
            habits.push(Habit {
                frequency: parse_frequency(&id, frequency.as_deref()),
                id,
                title,
                description,
                created_timestamp,
            });
        }
        Ok(habits)
    }

    /// Overwrite the completed set for a day.
    pub fn save_resolution(&self, day: &ResolutionDay) -> Result<()> {
        let ids = serde_json::to_string(&day.completed_habit_ids)?;
        self.conn.execute(
            "INSERT INTO resolutions (date, completed_habit_ids) VALUES (?1, ?2)
             ON CONFLICT(date) DO UPDATE SET completed_habit_ids = excluded.completed_habit_ids",
            params![day.date, ids],
        )?;
        tracing::info!(date = %day.date, completed = day.completed_habit_ids.len(), "saved resolutions");
        Ok(())
    }

    /// Record for one day, if any.
    pub fn resolution_for(&self, date: NaiveDate) -> Result<Option<ResolutionDay>> {
        let key = date_key(date);
        let ids: Option<String> = self
            .conn
            .query_row(
                "SELECT completed_habit_ids FROM resolutions WHERE date = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(ids.map(|ids| ResolutionDay {
            completed_habit_ids: parse_ids(&key, &ids),
            date: key,
        }))
    }

    /// Records on or after `start`, oldest first.
    pub fn resolutions_since(&self, start: NaiveDate) -> Result<Vec<ResolutionDay>> {
        let mut stmt = self.conn.prepare(
            "SELECT date, completed_habit_ids FROM resolutions
             WHERE date >= ?1
             ORDER BY date ASC",
        )?;
        let rows = stmt.query_map(params![date_key(start)], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut days = Vec::new();
        for row in rows {
            let (date, ids) = row?;
            days.push(ResolutionDay {
                completed_habit_ids: parse_ids(&date, &ids),
                date,
            });
        }
        Ok(days)
    }
}

fn parse_frequency(habit_id: &str, raw: Option<&str>) -> Option<Vec<DayOfWeek>> {
    let raw = raw?;
    match serde_json::from_str(raw) {
        Ok(days) => Some(days),
        Err(e) => {
            // An unreadable recurrence degrades to a daily habit.
            tracing::warn!(habit = habit_id, error = %e, "ignoring malformed frequency");
            None
        }
    }
}

fn parse_ids(date: &str, raw: &str) -> Vec<String> {
    serde_json::from_str(raw).unwrap_or_else(|e| {
        tracing::warn!(date, error = %e, "ignoring malformed completed ids");
        Vec::new()
    })
}

impl HabitSource for Database {
    fn habits(&self) -> Result<Vec<Habit>> {
        self.list_habits()
    }
}

impl ResolutionSource for Database {
    fn resolutions_since(&self, start: NaiveDate) -> Result<Vec<ResolutionDay>> {
        Database::resolutions_since(self, start)
    }

    fn resolution_for(&self, date: NaiveDate) -> Result<Option<ResolutionDay>> {
        Database::resolution_for(self, date)
    }
}
