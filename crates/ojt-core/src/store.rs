//! Collaborator contracts for persisted entries and training targets.

use crate::entry::{NewTimeEntry, TimeEntry};

/// Durable storage for logged sessions.
pub trait EntryStore {
    /// Failure reported by the backing store. Callers propagate it untouched.
    type Error: std::error::Error + Send + Sync + 'static;

    /// All entries, most recent first.
    ///
    /// Aggregation relies on this order (see
    /// [`recent_sessions`](crate::aggregate::recent_sessions)) but does not
    /// check it.
    fn list(&self) -> Result<Vec<TimeEntry>, Self::Error>;

    /// Persists a new entry and returns it with store-assigned identity.
    fn append(&mut self, entry: NewTimeEntry) -> Result<TimeEntry, Self::Error>;
}

/// Read-only source of the annual training goal.
pub trait TargetSource {
    type Error: std::error::Error + Send + Sync + 'static;

    /// The configured annual target in hours, if one has been set.
    fn annual_target_hours(&self) -> Result<Option<f64>, Self::Error>;

    /// The configured target, or the 400-hour default.
    fn annual_target_or_default(&self) -> Result<f64, Self::Error> {
        Ok(self
            .annual_target_hours()?
            .unwrap_or(crate::aggregate::DEFAULT_ANNUAL_TARGET_HOURS))
    }
}
