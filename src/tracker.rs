//! Elapsed-Time Tracker
//!
//! A start/pause/stop stopwatch behind the dashboard's "Time Tracker" widget.
//! Time accumulates in whole seconds on a background Tokio task. The task
//! handle lives next to the state and is cancelled whenever the tracker
//! leaves `Running`: on pause, on stop and on teardown.
//!
//! ```text
//!            toggle()                 stop()
//!   Idle  ────────────▶  Running  ────────────▶  Idle (elapsed = 0)
//!    ▲                      │
//!    └──────── toggle() ────┘   (elapsed retained)
//! ```
//!
//! The tick task is spawned with `tokio::spawn`, so `toggle()` must be called
//! from within a Tokio runtime.

use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Default tick period: one second per increment
pub const DEFAULT_TICK: Duration = Duration::from_secs(1);

/// Snapshot of the tracker's counter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TimerState {
    /// Accumulated whole seconds
    pub elapsed_seconds: u64,
    /// Whether the tracker is currently accumulating time
    pub running: bool,
}

impl TimerState {
    pub fn phase(&self) -> TrackerPhase {
        if self.running {
            TrackerPhase::Running
        } else {
            TrackerPhase::Idle
        }
    }

    /// `HH:MM:SS` rendering of the elapsed time
    pub fn display(&self) -> String {
        format_time(self.elapsed_seconds)
    }
}

impl fmt::Display for TimerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.display(), self.phase())
    }
}

/// Tracker state machine phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackerPhase {
    Idle,
    Running,
}

impl fmt::Display for TrackerPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackerPhase::Idle => write!(f, "idle"),
            TrackerPhase::Running => write!(f, "running"),
        }
    }
}

/// Render seconds as `HH:MM:SS`.
///
/// Every field is zero-padded to two digits. The hour field has no modulus,
/// so 100 hours and beyond render with three or more digits.
pub fn format_time(total_seconds: u64) -> String {
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}

/// Published state plus the run generation that owns it.
///
/// Every transition bumps `generation`; a tick only applies when it was
/// scheduled by the current generation.
#[derive(Debug, Clone, Copy, Default)]
struct Clock {
    state: TimerState,
    generation: u64,
}

/// Start/pause/stop stopwatch with a single active tick task
#[derive(Debug)]
pub struct TimeTracker {
    clock: Arc<watch::Sender<Clock>>,
    tick: Duration,
    task: Option<JoinHandle<()>>,
}

impl TimeTracker {
    /// Create an idle tracker at zero with a one-second tick
    pub fn new() -> Self {
        Self::with_tick(DEFAULT_TICK)
    }

    /// Create an idle tracker with a custom tick period
    pub fn with_tick(tick: Duration) -> Self {
        let (clock, _) = watch::channel(Clock::default());
        Self {
            clock: Arc::new(clock),
            // tokio intervals reject a zero period
            tick: tick.max(Duration::from_millis(1)),
            task: None,
        }
    }

    /// Current snapshot
    pub fn state(&self) -> TimerState {
        self.clock.borrow().state
    }

    pub fn elapsed_seconds(&self) -> u64 {
        self.state().elapsed_seconds
    }

    pub fn is_running(&self) -> bool {
        self.state().running
    }

    pub fn phase(&self) -> TrackerPhase {
        self.state().phase()
    }

    /// `HH:MM:SS` rendering of the current elapsed time
    pub fn display(&self) -> String {
        self.state().display()
    }

    /// Read-only handle that observes every tick.
    ///
    /// The handle outlives the tracker and keeps reporting the final value.
    pub fn subscribe(&self) -> TimerWatch {
        TimerWatch {
            rx: self.clock.subscribe(),
        }
    }

    /// Idle → Running, or Running → Idle with the elapsed time retained
    pub fn toggle(&mut self) -> TrackerPhase {
        if self.task.is_some() {
            self.halt();
            tracing::debug!(elapsed_seconds = self.elapsed_seconds(), "Time tracker paused");
        } else {
            self.start();
            tracing::debug!(elapsed_seconds = self.elapsed_seconds(), "Time tracker started");
        }
        self.phase()
    }

    /// Back to Idle at zero from either phase
    pub fn stop(&mut self) {
        self.cancel_task();
        self.clock.send_modify(|clock| {
            clock.generation += 1;
            clock.state = TimerState::default();
        });
        tracing::debug!("Time tracker stopped");
    }

    /// Explicit teardown; returns the final state.
    ///
    /// Dropping the tracker has the same effect.
    pub fn shutdown(mut self) -> TimerState {
        self.halt();
        self.state()
    }

    fn start(&mut self) {
        let mut generation = 0;
        self.clock.send_modify(|clock| {
            clock.generation += 1;
            clock.state.running = true;
            generation = clock.generation;
        });

        let clock = Arc::clone(&self.clock);
        let period = self.tick;
        let first_tick = Instant::now() + period;

        self.task = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(first_tick, period);
            loop {
                ticker.tick().await;
                let applied = clock.send_if_modified(|clock| {
                    if clock.generation != generation || !clock.state.running {
                        return false;
                    }
                    clock.state.elapsed_seconds = clock.state.elapsed_seconds.saturating_add(1);
                    true
                });
                if !applied {
                    break;
                }
            }
        }));
    }

    /// Cancel the tick and leave the counter where it is
    fn halt(&mut self) {
        self.cancel_task();
        self.clock.send_if_modified(|clock| {
            clock.generation += 1;
            let was_running = clock.state.running;
            clock.state.running = false;
            was_running
        });
    }

    fn cancel_task(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Default for TimeTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for TimeTracker {
    fn drop(&mut self) {
        if self.task.is_some() {
            tracing::debug!(elapsed_seconds = self.elapsed_seconds(), "Time tracker torn down while running");
        }
        self.halt();
    }
}

/// Observer side of a [`TimeTracker`]
#[derive(Debug, Clone)]
pub struct TimerWatch {
    rx: watch::Receiver<Clock>,
}

impl TimerWatch {
    pub fn current(&self) -> TimerState {
        self.rx.borrow().state
    }

    /// Wait for the next change.
    ///
    /// Returns `None` once the tracker is gone and no further change can happen.
    pub async fn changed(&mut self) -> Option<TimerState> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().state)
    }
}
