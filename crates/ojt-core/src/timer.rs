//! Live training session timer.
//!
//! [`SessionTimer`] is a plain state machine with no notion of wall-clock
//! time: something else calls [`SessionTimer::tick`] once per second while
//! the timer is running (see [`crate::ticker`]).
//!
//! ```text
//!          start            toggle
//!   Idle ---------> Running <------> Suspended
//!    ^                 |                 |
//!    +---- stop / discard ---------------+
//! ```

use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;

use crate::entry::{NewTimeEntry, TimeEntry};
use crate::store::EntryStore;
use crate::types::ValidationError;

/// Shortest session that can be committed.
pub const MIN_SESSION_SECONDS: u64 = 60;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerStatus {
    #[default]
    Idle,
    Running,
    /// Ticking is stopped but the session is still open.
    Suspended,
}

/// Why a session could not be committed.
#[derive(Debug, Error)]
pub enum StopError<E> {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The entry store rejected the session. The timer keeps its state.
    #[error("failed to save session")]
    Store(#[source] E),
}

/// A single live, manually controlled session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionTimer {
    status: TimerStatus,
    elapsed_seconds: u64,
    activity: Option<String>,
}

impl SessionTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn status(&self) -> TimerStatus {
        self.status
    }

    pub const fn elapsed_seconds(&self) -> u64 {
        self.elapsed_seconds
    }

    pub fn activity(&self) -> Option<&str> {
        self.activity.as_deref()
    }

    pub const fn is_running(&self) -> bool {
        matches!(self.status, TimerStatus::Running)
    }

    /// Starts a fresh session, or resumes a suspended one.
    ///
    /// A blank activity is rejected and the timer is left as it was.
    pub fn start(&mut self, activity: &str) -> Result<(), ValidationError> {
        let activity = activity.trim();
        if activity.is_empty() {
            return Err(ValidationError::MissingActivity);
        }
        if self.status == TimerStatus::Idle {
            self.elapsed_seconds = 0;
        }
        self.status = TimerStatus::Running;
        self.activity = Some(activity.to_string());
        tracing::debug!(activity, elapsed = self.elapsed_seconds, "timer running");
        Ok(())
    }

    /// Advances the session by one second. Ignored unless running.
    pub fn tick(&mut self) -> u64 {
        if self.is_running() {
            self.elapsed_seconds += 1;
        }
        self.elapsed_seconds
    }

    /// Flips between running and suspended. An idle timer stays idle.
    pub fn toggle(&mut self) -> TimerStatus {
        self.status = match self.status {
            TimerStatus::Idle => TimerStatus::Idle,
            TimerStatus::Running => TimerStatus::Suspended,
            TimerStatus::Suspended => TimerStatus::Running,
        };
        tracing::debug!(status = ?self.status, elapsed = self.elapsed_seconds, "timer toggled");
        self.status
    }

    /// Builds the entry this session would commit as, without changing state.
    pub fn pending_entry(&self, today: NaiveDate) -> Result<NewTimeEntry, ValidationError> {
        if self.status == TimerStatus::Idle || self.elapsed_seconds < MIN_SESSION_SECONDS {
            return Err(ValidationError::TooShort {
                elapsed_seconds: self.elapsed_seconds,
            });
        }
        let activity = self
            .activity
            .as_deref()
            .ok_or(ValidationError::MissingActivity)?;
        NewTimeEntry::automatic(today, session_minutes(self.elapsed_seconds), activity)
    }

    /// Commits the session to `store` and returns to idle.
    ///
    /// Nothing changes unless the store accepts the entry, so a rejected or
    /// failed commit can simply be retried.
    pub fn stop<S: EntryStore>(
        &mut self,
        store: &mut S,
        today: NaiveDate,
    ) -> Result<TimeEntry, StopError<S::Error>> {
        let pending = self.pending_entry(today)?;
        let entry = store.append(pending).map_err(StopError::Store)?;
        tracing::info!(
            id = %entry.id,
            activity = %entry.activity,
            minutes = entry.duration,
            "session saved"
        );
        self.reset();
        Ok(entry)
    }

    /// Abandons the session without saving it.
    pub fn discard(&mut self) {
        tracing::debug!(elapsed = self.elapsed_seconds, "session discarded");
        self.reset();
    }

    fn reset(&mut self) {
        self.status = TimerStatus::Idle;
        self.elapsed_seconds = 0;
        self.activity = None;
    }
}

/// Whole minutes for a committed session, rounded to nearest.
#[allow(clippy::cast_precision_loss)]
fn session_minutes(elapsed_seconds: u64) -> f64 {
    (elapsed_seconds as f64 / 60.0).round()
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::store::testing::MemoryStore;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 17).unwrap()
    }

    fn running(activity: &str, seconds: u64) -> SessionTimer {
        let mut timer = SessionTimer::new();
        timer.start(activity).unwrap();
        for _ in 0..seconds {
            timer.tick();
        }
        timer
    }

    #[test]
    fn start_requires_activity() {
        let mut timer = SessionTimer::new();
        let err = timer.start("").unwrap_err();
        assert_eq!(err.code(), "missing-activity");
        assert_eq!(timer.status(), TimerStatus::Idle);
        assert_eq!(timer, SessionTimer::new());
    }

    #[test]
    fn tick_only_counts_while_running() {
        let mut timer = SessionTimer::new();
        timer.tick();
        assert_eq!(timer.elapsed_seconds(), 0);

        timer.start("Workshop Training").unwrap();
        timer.tick();
        timer.tick();
        timer.toggle();
        timer.tick();
        assert_eq!(timer.elapsed_seconds(), 2);

        timer.toggle();
        timer.tick();
        assert_eq!(timer.elapsed_seconds(), 3);
    }

    #[test]
    fn toggle_on_idle_stays_idle() {
        let mut timer = SessionTimer::new();
        assert_eq!(timer.toggle(), TimerStatus::Idle);
    }

    #[test]
    fn start_from_suspended_resumes_without_reset() {
        let mut timer = running("Workshop Training", 30);
        timer.toggle();
        timer.start("Site Visit").unwrap();
        assert_eq!(timer.status(), TimerStatus::Running);
        assert_eq!(timer.elapsed_seconds(), 30);
        assert_eq!(timer.activity(), Some("Site Visit"));
    }

    #[test]
    fn stop_before_one_minute_is_rejected_and_keeps_state() {
        let mut timer = running("Workshop Training", 45);
        let mut store = MemoryStore::default();

        let err = timer.stop(&mut store, today()).unwrap_err();
        assert!(matches!(
            err,
            StopError::Validation(ValidationError::TooShort {
                elapsed_seconds: 45
            })
        ));
        assert_eq!(timer.elapsed_seconds(), 45);
        assert_eq!(timer.status(), TimerStatus::Running);
        assert!(store.entries.is_empty());
    }

    #[test]
    fn stop_on_idle_timer_is_too_short() {
        let mut timer = SessionTimer::new();
        let mut store = MemoryStore::default();
        let err = timer.stop(&mut store, today()).unwrap_err();
        assert!(matches!(
            err,
            StopError::Validation(ValidationError::TooShort { .. })
        ));
    }

    #[test]
    fn stop_commits_rounded_minutes_and_resets() {
        let mut timer = running("Workshop Training", 125);
        let mut store = MemoryStore::default();

        let entry = timer.stop(&mut store, today()).unwrap();

        assert_eq!(store.entries.len(), 1);
        assert!((entry.duration - 2.0).abs() < f64::EPSILON);
        assert_eq!(entry.activity, "Workshop Training");
        assert!(entry.is_automatic);
        assert_eq!(entry.date, today());
        assert_eq!(timer.elapsed_seconds(), 0);
        assert_eq!(timer.status(), TimerStatus::Idle);
        assert_eq!(timer.activity(), None);
    }

    #[test]
    fn suspended_session_can_be_committed() {
        let mut timer = running("Online module", 90);
        timer.toggle();
        let mut store = MemoryStore::default();
        let entry = timer.stop(&mut store, today()).unwrap();
        // 1.5 minutes rounds up
        assert!((entry.duration - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn store_failure_preserves_session() {
        let mut timer = running("Workshop Training", 125);
        let before = timer.clone();
        let mut store = MemoryStore {
            fail_appends: true,
            ..MemoryStore::default()
        };

        let err = timer.stop(&mut store, today()).unwrap_err();
        assert!(matches!(err, StopError::Store(_)));
        assert_eq!(timer, before);

        // Retrying once the store recovers succeeds.
        store.fail_appends = false;
        timer.stop(&mut store, today()).unwrap();
        assert_eq!(store.entries.len(), 1);
    }

    #[test]
    fn discard_returns_to_idle_without_saving() {
        let mut timer = running("Workshop Training", 300);
        timer.discard();
        assert_eq!(timer, SessionTimer::new());
    }

    #[test]
    fn fresh_start_after_commit_resets_elapsed() {
        let mut timer = running("Workshop Training", 61);
        let mut store = MemoryStore::default();
        timer.stop(&mut store, today()).unwrap();

        timer.start("Reading").unwrap();
        assert_eq!(timer.elapsed_seconds(), 0);
    }
}
