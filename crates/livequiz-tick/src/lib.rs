//! Fixed-interval question clock for LiveQuiz rooms.
//!
//! Each room actor owns one [`QuestionClock`]. While the room is Open the
//! clock is idle and [`QuestionClock::wait_for_tick`] pends forever; once
//! the quiz starts it fires at a fixed cadence (answer window + advance
//! buffer) until cancelled. Because the clock lives inside the actor, a
//! tick can never fire against a room that no longer exists — tearing the
//! actor down tears the clock down with it.
//!
//! # Integration
//!
//! The clock is designed to sit inside a room actor's `tokio::select!`
//! loop:
//!
//! ```ignore
//! loop {
//!     tokio::select! {
//!         Some(cmd) = commands.recv() => { /* handle commands */ }
//!         tick = clock.wait_for_tick() => { /* advance or finish */ }
//!     }
//! }
//! ```
//!
//! The first tick fires one full interval after [`QuestionClock::start`],
//! matching `setInterval` semantics: participants get the answer window
//! before the clock advances anything.

use std::time::Duration;

use tokio::time::{self, Instant};
use tracing::{debug, warn};

/// A cancellable fixed-interval clock.
///
/// Not a free-running timer: it only measures while started, and it keeps
/// a fixed cadence — the next deadline is computed from the previous
/// deadline, not from when the actor got around to polling.
pub struct QuestionClock {
    interval: Duration,
    /// Deadline of the next tick. `None` while idle.
    next_tick: Option<Instant>,
    ticks: u64,
}

impl QuestionClock {
    /// Creates an idle clock with the given tick interval.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_tick: None,
            ticks: 0,
        }
    }

    /// Starts ticking. The first tick fires one interval from now.
    ///
    /// Restarting a running clock resets the cadence and the tick count.
    pub fn start(&mut self) {
        self.next_tick = Some(Instant::now() + self.interval);
        self.ticks = 0;
        debug!(interval_ms = self.interval.as_millis() as u64, "question clock started");
    }

    /// Stops ticking. `wait_for_tick` pends forever until the next
    /// [`start`](Self::start). Idempotent.
    pub fn cancel(&mut self) {
        if self.next_tick.take().is_some() {
            debug!(ticks = self.ticks, "question clock cancelled");
        }
    }

    /// Whether the clock is currently ticking.
    pub fn is_running(&self) -> bool {
        self.next_tick.is_some()
    }

    /// Ticks fired since the last start.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// The configured tick interval.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Waits until the next tick is due and returns its number (1-based).
    ///
    /// While idle this future pends forever — it will never resolve on its
    /// own, but `tokio::select!` still services the other branches.
    pub async fn wait_for_tick(&mut self) -> u64 {
        let Some(deadline) = self.next_tick else {
            // Idle: pend forever, select! handles the mailbox.
            std::future::pending::<()>().await;
            unreachable!()
        };

        time::sleep_until(deadline).await;

        let now = Instant::now();
        self.ticks += 1;

        // A room tick does trivial work; waking late by a chunk of the
        // interval means the runtime is badly overloaded. Worth a warning,
        // but the cadence stays anchored to the original schedule.
        let late_by = now.saturating_duration_since(deadline);
        if late_by > self.interval / 10 {
            warn!(
                tick = self.ticks,
                late_ms = late_by.as_millis() as u64,
                "question clock tick fired late"
            );
        }

        self.next_tick = Some(deadline + self.interval);
        self.ticks
    }
}

impl std::fmt::Debug for QuestionClock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuestionClock")
            .field("interval", &self.interval)
            .field("running", &self.is_running())
            .field("ticks", &self.ticks)
            .finish()
    }
}
