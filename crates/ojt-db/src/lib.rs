//! Storage layer for off-the-job training time.
//!
//! Provides persistence for time entries and training targets using `rusqlite`.
//!
//! # Thread Safety
//!
//! The [`Database`] type wraps a `rusqlite::Connection`, which is `Send` but not `Sync`.
//! A `Database` can be moved between threads but must be wrapped in a `Mutex`
//! to be shared.
//!
//! # Schema
//!
//! ## Dates and timestamps
//!
//! Entry dates are stored as TEXT in `YYYY-MM-DD` form, so lexicographic
//! ordering matches calendar ordering. `created_at` is an RFC 3339 UTC
//! timestamp with millisecond precision.
//!
//! ## Ordering
//!
//! [`Database::list_entries`] returns entries most recent first
//! (`date`, then `created_at`, then insertion order). Aggregation in
//! `ojt-core` relies on this order and does not re-sort.

use std::path::Path;

use chrono::{DateTime, NaiveDate, SecondsFormat, SubsecRound, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params};
use thiserror::Error;
use uuid::Uuid;

use ojt_core::{EntryId, EntryStore, NewTimeEntry, TargetSource, TimeEntry, ValidationError};

/// Name of the annual off-the-job training target row.
const ANNUAL_TARGET: &str = "annual";

const ENTRY_COLUMNS: &str =
    "id, date, duration, activity, notes, location, supervisor, is_automatic, created_at";

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// An error from the underlying database.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// A stored date or timestamp could not be parsed.
    #[error("invalid {field} for entry {entry_id}: {value}")]
    DateParse {
        entry_id: String,
        field: &'static str,
        value: String,
        #[source]
        source: chrono::ParseError,
    },
    /// A stored row or a new value failed domain validation.
    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

/// Database connection wrapper.
///
/// See the [module documentation](self) for thread safety considerations.
pub struct Database {
    conn: Connection,
}

/// Raw `time_entries` row before domain validation.
#[derive(Debug)]
struct EntryRow {
    id: String,
    date: String,
    duration: f64,
    activity: String,
    notes: Option<String>,
    location: Option<String>,
    supervisor: Option<String>,
    is_automatic: bool,
    created_at: String,
}

impl EntryRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            date: row.get(1)?,
            duration: row.get(2)?,
            activity: row.get(3)?,
            notes: row.get(4)?,
            location: row.get(5)?,
            supervisor: row.get(6)?,
            is_automatic: row.get(7)?,
            created_at: row.get(8)?,
        })
    }

    fn into_entry(self) -> Result<TimeEntry, DbError> {
        let date = NaiveDate::parse_from_str(&self.date, "%Y-%m-%d").map_err(|source| {
            DbError::DateParse {
                entry_id: self.id.clone(),
                field: "date",
                value: self.date.clone(),
                source,
            }
        })?;
        let created_at = DateTime::parse_from_rfc3339(&self.created_at)
            .map(|parsed| parsed.with_timezone(&Utc))
            .map_err(|source| DbError::DateParse {
                entry_id: self.id.clone(),
                field: "created_at",
                value: self.created_at.clone(),
                source,
            })?;
        Ok(TimeEntry {
            id: EntryId::new(self.id)?,
            date,
            duration: self.duration,
            activity: self.activity,
            notes: self.notes,
            location: self.location,
            supervisor: self.supervisor,
            is_automatic: self.is_automatic,
            created_at,
        })
    }
}

impl Database {
    /// Opens a database at the given path, creating it if necessary.
    ///
    /// The database schema is automatically initialized on first open.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Opens an in-memory database.
    ///
    /// Useful for testing. The database is destroyed when the connection closes.
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Initializes the database schema.
    ///
    /// This is idempotent - safe to call on an already-initialized database.
    fn init(&self) -> Result<(), DbError> {
        self.conn.execute_batch(
            "
            -- date: calendar date, 'YYYY-MM-DD'
            -- duration: minutes, always positive
            CREATE TABLE IF NOT EXISTS time_entries (
                id TEXT PRIMARY KEY,
                date TEXT NOT NULL,
                duration REAL NOT NULL CHECK (duration > 0),
                activity TEXT NOT NULL CHECK (length(activity) > 0),
                notes TEXT,
                location TEXT,
                supervisor TEXT,
                is_automatic INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_time_entries_date ON time_entries(date);

            CREATE TABLE IF NOT EXISTS training_targets (
                name TEXT PRIMARY KEY,
                target_hours REAL NOT NULL CHECK (target_hours > 0)
            );
            ",
        )?;
        Ok(())
    }

    /// Inserts a validated entry and returns it with its assigned ID.
    pub fn insert_entry(&mut self, entry: NewTimeEntry) -> Result<TimeEntry, DbError> {
        self.insert_entry_at(entry, Utc::now())
    }

    fn insert_entry_at(
        &mut self,
        entry: NewTimeEntry,
        created_at: DateTime<Utc>,
    ) -> Result<TimeEntry, DbError> {
        // Stored with millisecond precision; keep the returned entry identical to a re-read.
        let created_at = created_at.trunc_subsecs(3);
        let id = EntryId::new(Uuid::new_v4().to_string())?;
        self.conn.execute(
            "
            INSERT INTO time_entries
            (id, date, duration, activity, notes, location, supervisor, is_automatic, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            ",
            params![
                id.as_str(),
                entry.date().format("%Y-%m-%d").to_string(),
                entry.duration(),
                entry.activity(),
                entry.notes(),
                entry.location(),
                entry.supervisor(),
                entry.is_automatic(),
                format_timestamp(created_at),
            ],
        )?;
        tracing::debug!(%id, date = %entry.date(), minutes = entry.duration(), "entry inserted");
        Ok(entry.into_entry(id, created_at))
    }

    /// Lists all entries, most recent first.
    pub fn list_entries(&self) -> Result<Vec<TimeEntry>, DbError> {
        let mut stmt = self.conn.prepare(&format!(
            "
            SELECT {ENTRY_COLUMNS}
            FROM time_entries
            ORDER BY date DESC, created_at DESC, rowid DESC
            "
        ))?;
        let rows = stmt.query_map([], EntryRow::from_row)?;
        let mut entries = Vec::new();
        for row in rows {
            entries.push(row?.into_entry()?);
        }
        Ok(entries)
    }

    /// Returns the annual training target, if one has been set.
    pub fn annual_target(&self) -> Result<Option<f64>, DbError> {
        let target = self
            .conn
            .query_row(
                "SELECT target_hours FROM training_targets WHERE name = ?",
                [ANNUAL_TARGET],
                |row| row.get(0),
            )
            .optional()?;
        Ok(target)
    }

    /// Sets the annual training target in hours.
    pub fn set_annual_target(&mut self, hours: f64) -> Result<(), DbError> {
        if !hours.is_finite() || hours <= 0.0 {
            return Err(ValidationError::InvalidTarget { value: hours }.into());
        }
        self.conn.execute(
            "
            INSERT INTO training_targets (name, target_hours) VALUES (?, ?)
            ON CONFLICT(name) DO UPDATE SET target_hours = excluded.target_hours
            ",
            params![ANNUAL_TARGET, hours],
        )?;
        tracing::debug!(hours, "annual target updated");
        Ok(())
    }
}

impl EntryStore for Database {
    type Error = DbError;

    fn list(&self) -> Result<Vec<TimeEntry>, Self::Error> {
        self.list_entries()
    }

    fn append(&mut self, entry: NewTimeEntry) -> Result<TimeEntry, Self::Error> {
        self.insert_entry(entry)
    }
}

impl TargetSource for Database {
    type Error = DbError;

    fn annual_target_hours(&self) -> Result<Option<f64>, Self::Error> {
        self.annual_target()
    }
}

fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}
