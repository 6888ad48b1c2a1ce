//! One-second tick source and the live session that owns it.
//!
//! The ticker is the only thing that advances a running [`SessionTimer`].
//! It is armed at most once at a time and is cancelled whenever the timer
//! leaves [`TimerStatus::Running`], including when the owning
//! [`LiveSession`] is dropped.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::NaiveDate;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{Instant, interval_at};

use crate::entry::TimeEntry;
use crate::store::EntryStore;
use crate::timer::{SessionTimer, StopError, TimerStatus};
use crate::types::ValidationError;

/// How often a running session advances.
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// A session timer and the generation of the tick source allowed to advance it.
///
/// Cancelling a ticker bumps `generation` under the same lock the tick task
/// takes, so a task that already woke up can no longer apply its tick.
#[derive(Debug, Default)]
pub(crate) struct TickState {
    pub(crate) timer: SessionTimer,
    generation: u64,
}

pub(crate) type SharedTimer = Arc<Mutex<TickState>>;

/// Locks the state, recovering it if a previous holder panicked.
pub(crate) fn lock(state: &Mutex<TickState>) -> MutexGuard<'_, TickState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

struct Armed {
    task: JoinHandle<()>,
    state: SharedTimer,
}

/// Recurring tick resource bound to a tokio runtime.
pub(crate) struct Ticker {
    runtime: Handle,
    period: Duration,
    armed: Option<Armed>,
}

impl Ticker {
    pub(crate) fn new(runtime: Handle, period: Duration) -> Self {
        Self {
            runtime,
            period,
            armed: None,
        }
    }

    pub(crate) fn is_armed(&self) -> bool {
        self.armed
            .as_ref()
            .is_some_and(|armed| !armed.task.is_finished())
    }

    /// Starts ticking `state` once per period. Returns `false` if already armed.
    pub(crate) fn arm(&mut self, state: &SharedTimer) -> bool {
        if self.is_armed() {
            return false;
        }
        let generation = lock(state).generation;
        let shared = Arc::clone(state);
        let period = self.period;
        let task = self.runtime.spawn(async move {
            let mut interval = interval_at(Instant::now() + period, period);
            loop {
                interval.tick().await;
                let mut guard = lock(&shared);
                if guard.generation != generation {
                    break;
                }
                guard.timer.tick();
            }
        });
        self.armed = Some(Armed {
            task,
            state: Arc::clone(state),
        });
        tracing::debug!(?period, generation, "ticker armed");
        true
    }

    /// Stops ticking. Returns `false` if nothing was armed.
    ///
    /// No tick lands after this returns, even if the task was already waiting
    /// for the lock.
    pub(crate) fn cancel(&mut self) -> bool {
        let Some(armed) = self.armed.take() else {
            return false;
        };
        {
            let mut guard = lock(&armed.state);
            guard.generation = guard.generation.wrapping_add(1);
        }
        armed.task.abort();
        tracing::debug!("ticker cancelled");
        true
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// A session timer wired to its tick source.
///
/// Every transition re-synchronizes the ticker with the timer status, so
/// exactly one tick source exists while running and none otherwise.
pub struct LiveSession {
    state: SharedTimer,
    ticker: Ticker,
}

impl LiveSession {
    /// Creates an idle session ticking once a second on `runtime`.
    pub fn new(runtime: Handle) -> Self {
        Self {
            state: SharedTimer::default(),
            ticker: Ticker::new(runtime, TICK_PERIOD),
        }
    }

    pub fn status(&self) -> TimerStatus {
        lock(&self.state).timer.status()
    }

    pub fn elapsed_seconds(&self) -> u64 {
        lock(&self.state).timer.elapsed_seconds()
    }

    pub fn start(&mut self, activity: &str) -> Result<(), ValidationError> {
        lock(&self.state).timer.start(activity)?;
        self.sync_ticker();
        Ok(())
    }

    pub fn toggle(&mut self) -> TimerStatus {
        let status = lock(&self.state).timer.toggle();
        self.sync_ticker();
        status
    }

    /// Commits the session.
    ///
    /// The ticker is cancelled before the elapsed time is read, and re-armed
    /// if the commit is rejected while the session is still running.
    pub fn stop<S: EntryStore>(
        &mut self,
        store: &mut S,
        today: NaiveDate,
    ) -> Result<TimeEntry, StopError<S::Error>> {
        self.ticker.cancel();
        let result = lock(&self.state).timer.stop(store, today);
        if let Err(err) = &result {
            tracing::warn!(error = %err, "session not saved");
        }
        self.sync_ticker();
        result
    }

    pub fn discard(&mut self) {
        lock(&self.state).timer.discard();
        self.sync_ticker();
    }

    fn sync_ticker(&mut self) {
        let running = lock(&self.state).timer.is_running();
        if running {
            self.ticker.arm(&self.state);
        } else {
            self.ticker.cancel();
        }
    }

    #[cfg(test)]
    fn snapshot(&self) -> SessionTimer {
        lock(&self.state).timer.clone()
    }

    #[cfg(test)]
    fn is_ticking(&self) -> bool {
        self.ticker.is_armed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::store::testing::MemoryStore;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 17).unwrap()
    }

    fn running_state() -> SharedTimer {
        let state = SharedTimer::default();
        lock(&state).timer.start("Workshop Training").unwrap();
        state
    }

    fn elapsed(state: &SharedTimer) -> u64 {
        lock(state).timer.elapsed_seconds()
    }

    /// Sleeps long enough for exactly `ticks` ticks after arming.
    async fn let_ticks_pass(ticks: u64) {
        tokio::time::sleep(Duration::from_millis(ticks * 1000 + 500)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn ticker_advances_running_timer_once_per_second() {
        let state = running_state();
        let mut ticker = Ticker::new(Handle::current(), TICK_PERIOD);

        assert!(ticker.arm(&state));
        let_ticks_pass(3).await;
        assert_eq!(elapsed(&state), 3);

        assert!(ticker.cancel());
        assert!(!ticker.cancel());
        let_ticks_pass(5).await;
        assert_eq!(elapsed(&state), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn arming_twice_keeps_a_single_tick_source() {
        let state = running_state();
        let mut ticker = Ticker::new(Handle::current(), TICK_PERIOD);

        assert!(ticker.arm(&state));
        assert!(!ticker.arm(&state));
        let_ticks_pass(10).await;
        assert_eq!(elapsed(&state), 10);
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_ticker_releases_tick_source() {
        let state = running_state();
        let mut ticker = Ticker::new(Handle::current(), TICK_PERIOD);
        ticker.arm(&state);
        let_ticks_pass(2).await;

        drop(ticker);
        let_ticks_pass(10).await;
        assert_eq!(elapsed(&state), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn tick_waiting_on_the_lock_is_dropped_by_cancel() {
        let period = Duration::from_millis(10);
        for _ in 0..20 {
            let state = running_state();
            let mut ticker = Ticker::new(Handle::current(), period);
            ticker.arm(&state);

            // Hold the lock across a due tick so the task wakes and blocks on it.
            let guard = lock(&state);
            std::thread::sleep(period * 3);
            drop(guard);

            ticker.cancel();
            let at_cancel = elapsed(&state);
            tokio::time::sleep(period * 5).await;
            assert_eq!(elapsed(&state), at_cancel);
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn rearming_does_not_revive_a_cancelled_tick() {
        let period = Duration::from_millis(10);
        let state = running_state();
        let mut ticker = Ticker::new(Handle::current(), Duration::from_secs(3600));
        let mut fast = Ticker::new(Handle::current(), period);
        fast.arm(&state);

        let guard = lock(&state);
        std::thread::sleep(period * 3);
        drop(guard);
        fast.cancel();
        let at_cancel = elapsed(&state);

        // A fresh source with a long period must be the only one left.
        ticker.arm(&state);
        tokio::time::sleep(period * 5).await;
        assert_eq!(elapsed(&state), at_cancel);
    }

    #[tokio::test(start_paused = true)]
    async fn live_session_round_trip() {
        let mut session = LiveSession::new(Handle::current());
        let mut store = MemoryStore::default();

        session.start("Workshop Training").unwrap();
        assert!(session.is_ticking());
        let_ticks_pass(125).await;

        let entry = session.stop(&mut store, today()).unwrap();
        assert!((entry.duration - 2.0).abs() < f64::EPSILON);
        assert_eq!(entry.activity, "Workshop Training");
        assert!(entry.is_automatic);
        assert_eq!(store.entries.len(), 1);
        assert_eq!(session.elapsed_seconds(), 0);
        assert_eq!(session.status(), TimerStatus::Idle);
        assert!(!session.is_ticking());
    }

    #[tokio::test(start_paused = true)]
    async fn repeated_start_does_not_double_count() {
        let mut session = LiveSession::new(Handle::current());
        session.start("Workshop Training").unwrap();
        session.start("Workshop Training").unwrap();
        let_ticks_pass(10).await;
        assert_eq!(session.elapsed_seconds(), 10);
    }

    #[tokio::test(start_paused = true)]
    async fn suspended_session_stops_accumulating() {
        let mut session = LiveSession::new(Handle::current());
        session.start("Online module").unwrap();
        let_ticks_pass(5).await;

        assert_eq!(session.toggle(), TimerStatus::Suspended);
        assert!(!session.is_ticking());
        let_ticks_pass(30).await;
        assert_eq!(session.elapsed_seconds(), 5);

        assert_eq!(session.toggle(), TimerStatus::Running);
        let_ticks_pass(2).await;
        assert_eq!(session.elapsed_seconds(), 7);
    }

    #[tokio::test(start_paused = true)]
    async fn quick_toggle_toggle_keeps_one_tick_per_second() {
        let mut session = LiveSession::new(Handle::current());
        session.start("Online module").unwrap();
        let_ticks_pass(4).await;

        for _ in 0..3 {
            session.toggle();
            session.toggle();
        }
        let_ticks_pass(6).await;
        assert_eq!(session.elapsed_seconds(), 10);
    }

    #[tokio::test(start_paused = true)]
    async fn rejected_stop_keeps_session_running() {
        let mut session = LiveSession::new(Handle::current());
        let mut store = MemoryStore::default();
        session.start("Workshop Training").unwrap();
        let_ticks_pass(45).await;

        let err = session.stop(&mut store, today()).unwrap_err();
        assert!(matches!(
            err,
            StopError::Validation(ValidationError::TooShort {
                elapsed_seconds: 45
            })
        ));
        assert_eq!(session.elapsed_seconds(), 45);
        assert!(session.is_ticking());

        let_ticks_pass(20).await;
        assert_eq!(session.elapsed_seconds(), 65);
        session.stop(&mut store, today()).unwrap();
        assert_eq!(store.entries.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn store_failure_preserves_live_session() {
        let mut session = LiveSession::new(Handle::current());
        let mut store = MemoryStore {
            fail_appends: true,
            ..MemoryStore::default()
        };
        session.start("Workshop Training").unwrap();
        let_ticks_pass(90).await;

        let err = session.stop(&mut store, today()).unwrap_err();
        assert!(matches!(err, StopError::Store(_)));
        let snapshot = session.snapshot();
        assert_eq!(snapshot.elapsed_seconds(), 90);
        assert_eq!(snapshot.activity(), Some("Workshop Training"));
        assert_eq!(snapshot.status(), TimerStatus::Running);
    }

    #[tokio::test(start_paused = true)]
    async fn missing_activity_does_not_arm() {
        let mut session = LiveSession::new(Handle::current());
        let err = session.start("  ").unwrap_err();
        assert_eq!(err, ValidationError::MissingActivity);
        assert_eq!(session.status(), TimerStatus::Idle);
        assert!(!session.is_ticking());
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_live_session_stops_accumulation() {
        let mut session = LiveSession::new(Handle::current());
        session.start("Workshop Training").unwrap();
        let state = Arc::clone(&session.state);
        let_ticks_pass(3).await;

        drop(session);
        let_ticks_pass(10).await;
        assert_eq!(elapsed(&state), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn discard_cancels_ticker() {
        let mut session = LiveSession::new(Handle::current());
        session.start("Workshop Training").unwrap();
        let_ticks_pass(70).await;
        session.discard();
        assert!(!session.is_ticking());
        assert_eq!(session.snapshot(), SessionTimer::new());
    }
}
