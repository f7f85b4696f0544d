//! Per-question countdown for Quizhall.
//!
//! A session has at most one answer window open at a time, so it needs at
//! most one timer. [`Countdown`] is that timer: armed when a question opens,
//! disarmed when the question locks (by expiry, by the host, or by teardown).
//!
//! # Integration
//!
//! The countdown is designed to sit inside a session actor's `tokio::select!`
//! loop, next to the command receiver:
//!
//! ```ignore
//! loop {
//!     tokio::select! {
//!         cmd = commands.recv() => { /* handle command */ }
//!         expiry = countdown.expired() => { /* lock expiry.question_index */ }
//!     }
//! }
//! ```
//!
//! Because the timer is polled by the same task that handles commands, expiry
//! and host actions are naturally serialized: once a command has cancelled or
//! re-armed the countdown, the old deadline can never fire.
//!
//! # Cancel safety
//!
//! [`Countdown::expired`] only disarms after its sleep completes, with no
//! await point in between. Dropping the future (because another `select!`
//! branch won) leaves the countdown armed and untouched.

use std::time::Duration;

use tokio::time::{self, Instant};
use tracing::{debug, trace, warn};

/// Default threshold above which a late expiry is logged as a warning.
pub const DEFAULT_LATE_WARN: Duration = Duration::from_millis(250);

/// A fired countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Expiry {
    /// The question whose window ran out.
    pub question_index: u32,
    /// How long after the deadline the actor got around to noticing.
    pub late_by: Duration,
}

#[derive(Debug, Clone, Copy)]
struct Deadline {
    question_index: u32,
    at: Instant,
    duration: Duration,
}

/// One-shot countdown owned by a single session actor.
#[derive(Debug)]
pub struct Countdown {
    deadline: Option<Deadline>,
    late_warn: Duration,
    /// Total number of times the countdown was armed.
    armed_total: u64,
}

impl Default for Countdown {
    fn default() -> Self {
        Self::new(DEFAULT_LATE_WARN)
    }
}

impl Countdown {
    /// Creates a disarmed countdown.
    pub fn new(late_warn: Duration) -> Self {
        Self {
            deadline: None,
            late_warn,
            armed_total: 0,
        }
    }

    /// Starts counting down `duration` for `question_index`.
    ///
    /// Any deadline already armed is replaced; its index is returned so the
    /// caller can log the restart.
    pub fn arm(&mut self, question_index: u32, duration: Duration) -> Option<u32> {
        let previous = self.deadline.take().map(|d| d.question_index);
        self.deadline = Some(Deadline {
            question_index,
            at: Instant::now() + duration,
            duration,
        });
        self.armed_total += 1;
        debug!(
            question_index,
            duration_ms = duration.as_millis() as u64,
            replaced = ?previous,
            "countdown armed"
        );
        previous
    }

    /// Disarms the countdown. Returns the question index it was armed for,
    /// or `None` if nothing was pending. Safe to call repeatedly.
    pub fn cancel(&mut self) -> Option<u32> {
        let cancelled = self.deadline.take().map(|d| d.question_index);
        if let Some(question_index) = cancelled {
            trace!(question_index, "countdown cancelled");
        }
        cancelled
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// The question the countdown is armed for.
    pub fn armed_for(&self) -> Option<u32> {
        self.deadline.map(|d| d.question_index)
    }

    /// Time left before expiry, or `None` when disarmed.
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|d| d.at.saturating_duration_since(Instant::now()))
    }

    /// The full length the current deadline was armed with.
    pub fn armed_duration(&self) -> Option<Duration> {
        self.deadline.map(|d| d.duration)
    }

    pub fn armed_total(&self) -> u64 {
        self.armed_total
    }

    /// Disarms and reports the countdown if its deadline has already passed.
    ///
    /// An actor calls this before handling a command, so a deadline that
    /// ran out while the command sat in the queue still wins.
    pub fn take_due(&mut self) -> Option<Expiry> {
        let deadline = self.deadline.filter(|d| d.at <= Instant::now())?;
        Some(self.fire(deadline))
    }

    /// Waits until the armed deadline passes, then disarms and reports it.
    ///
    /// When disarmed this future pends forever, which lets `select!` keep
    /// serving its other branches.
    pub async fn expired(&mut self) -> Expiry {
        let Some(deadline) = self.deadline else {
            std::future::pending::<()>().await;
            unreachable!()
        };

        time::sleep_until(deadline.at).await;
        self.fire(deadline)
    }

    fn fire(&mut self, deadline: Deadline) -> Expiry {
        self.deadline = None;
        let late_by = Instant::now().saturating_duration_since(deadline.at);
        if late_by > self.late_warn {
            warn!(
                question_index = deadline.question_index,
                late_ms = late_by.as_millis() as u64,
                "countdown fired late"
            );
        } else {
            trace!(question_index = deadline.question_index, "countdown fired");
        }

        Expiry {
            question_index: deadline.question_index,
            late_by,
        }
    }
}
