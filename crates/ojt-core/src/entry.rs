//! Logged training sessions.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{EntryId, ValidationError, non_blank};

/// A logged, completed training session.
///
/// Entries are created by the entry store from a [`NewTimeEntry`] and are
/// never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeEntry {
    /// Store-assigned identifier.
    pub id: EntryId,
    /// Calendar date the session is attributed to.
    pub date: NaiveDate,
    /// Session length in minutes.
    pub duration: f64,
    /// What the apprentice was doing.
    pub activity: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supervisor: Option<String>,
    /// `true` when recorded by the session timer rather than typed in.
    pub is_automatic: bool,
    /// When the store accepted the entry.
    pub created_at: DateTime<Utc>,
}

impl TimeEntry {
    /// Duration in minutes, with malformed values counting as zero.
    pub(crate) fn countable_minutes(&self) -> f64 {
        if self.duration.is_finite() && self.duration > 0.0 {
            self.duration
        } else {
            0.0
        }
    }
}

/// A validated entry waiting to be appended to the entry store.
///
/// Construction is the single validation boundary for entry shape: anything
/// that reaches the store has a non-empty activity and a positive duration.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTimeEntry {
    date: NaiveDate,
    duration: f64,
    activity: String,
    notes: Option<String>,
    location: Option<String>,
    supervisor: Option<String>,
    is_automatic: bool,
}

impl NewTimeEntry {
    /// Creates a manually entered session.
    pub fn manual(
        date: NaiveDate,
        duration_minutes: f64,
        activity: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        Self::build(date, duration_minutes, activity.into(), false)
    }

    /// Creates a session recorded by the timer.
    pub fn automatic(
        date: NaiveDate,
        duration_minutes: f64,
        activity: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        Self::build(date, duration_minutes, activity.into(), true)
    }

    fn build(
        date: NaiveDate,
        duration: f64,
        activity: String,
        is_automatic: bool,
    ) -> Result<Self, ValidationError> {
        let activity = activity.trim().to_string();
        if activity.is_empty() {
            return Err(ValidationError::MissingActivity);
        }
        if !duration.is_finite() || duration <= 0.0 {
            return Err(ValidationError::InvalidDuration { value: duration });
        }
        Ok(Self {
            date,
            duration,
            activity,
            notes: None,
            location: None,
            supervisor: None,
            is_automatic,
        })
    }

    #[must_use]
    pub fn with_notes(mut self, notes: Option<String>) -> Self {
        self.notes = non_blank(notes);
        self
    }

    #[must_use]
    pub fn with_location(mut self, location: Option<String>) -> Self {
        self.location = non_blank(location);
        self
    }

    #[must_use]
    pub fn with_supervisor(mut self, supervisor: Option<String>) -> Self {
        self.supervisor = non_blank(supervisor);
        self
    }

    pub const fn date(&self) -> NaiveDate {
        self.date
    }

    /// Duration in minutes.
    pub const fn duration(&self) -> f64 {
        self.duration
    }

    pub fn activity(&self) -> &str {
        &self.activity
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    pub fn supervisor(&self) -> Option<&str> {
        self.supervisor.as_deref()
    }

    pub const fn is_automatic(&self) -> bool {
        self.is_automatic
    }

    /// Materializes the entry once the store has assigned identity.
    pub fn into_entry(self, id: EntryId, created_at: DateTime<Utc>) -> TimeEntry {
        TimeEntry {
            id,
            date: self.date,
            duration: self.duration,
            activity: self.activity,
            notes: self.notes,
            location: self.location,
            supervisor: self.supervisor,
            is_automatic: self.is_automatic,
            created_at,
        }
    }
}
