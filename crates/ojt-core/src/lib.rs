//! Core domain logic for off-the-job training time tracking.
//!
//! This crate contains the fundamental types and logic for:
//! - Aggregation: weekly, yearly and all-time totals over logged sessions
//! - Session timing: the live timer state machine and its tick source
//! - Collaborator contracts: entry storage, training targets, and the clock

pub mod aggregate;
pub mod clock;
pub mod entry;
pub mod store;
pub mod ticker;
pub mod timer;
pub mod types;

pub use aggregate::{
    DEFAULT_ANNUAL_TARGET_HOURS, TargetProgress, TimeTotal, TrainingSummary,
    average_session_minutes, format_minutes, recent_sessions, target_progress, total_hours,
    week_start, weekly_hours, yearly_hours,
};
pub use clock::{Clock, FixedClock, SystemClock};
pub use entry::{NewTimeEntry, TimeEntry};
pub use store::{EntryStore, TargetSource};
pub use ticker::{LiveSession, TICK_PERIOD};
pub use timer::{MIN_SESSION_SECONDS, SessionTimer, StopError, TimerStatus};
pub use types::{EntryId, ValidationError};
