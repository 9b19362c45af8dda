//! Focus countdown state machine.
//!
//! The countdown is wall-clock based. It does not use internal threads and
//! never decrements a counter: every `poll()` re-derives the remaining time
//! from the absolute end timestamp, so a throttled or suspended caller
//! self-corrects on its next poll.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running <-> Paused
//! Running -(poll, end reached)-> Completed -> Idle
//! any -(cancel)-> Cancelled -> Idle
//! ```
//!
//! Operations that are invalid for the current state return `None` and change
//! nothing.

use serde::{Deserialize, Serialize};

use super::snapshot::TimerSnapshot;
use crate::clock::Clock;
use crate::events::Event;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerState {
    Idle,
    Running,
    Paused,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Running { end_ms: i64 },
    Paused,
}

/// Countdown for one focus session.
#[derive(Debug, Clone)]
pub struct FocusTimer<C> {
    clock: C,
    phase: Phase,
    /// Length of the session in seconds.
    total_secs: u64,
    /// Last derived remaining time, in whole seconds rounded up.
    remaining_secs: u64,
}

impl<C: Clock> FocusTimer<C> {
    /// An idle countdown primed with `total_secs`.
    pub fn new(clock: C, total_secs: u64) -> Self {
        Self {
            clock,
            phase: Phase::Idle,
            total_secs,
            remaining_secs: total_secs,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> TimerState {
        match self.phase {
            Phase::Idle => TimerState::Idle,
            Phase::Running { .. } => TimerState::Running,
            Phase::Paused => TimerState::Paused,
        }
    }

    pub fn remaining_secs(&self) -> u64 {
        self.remaining_secs
    }

    pub fn total_secs(&self) -> u64 {
        self.total_secs
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// 0.0 .. 1.0 progress through the session.
    pub fn progress(&self) -> f64 {
        if self.total_secs == 0 {
            return 0.0;
        }
        (1.0 - self.remaining_secs as f64 / self.total_secs as f64).clamp(0.0, 1.0)
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        match self.phase {
            Phase::Idle => TimerSnapshot::Idle,
            Phase::Running { end_ms } => TimerSnapshot::Running {
                end_timestamp_ms: end_ms,
            },
            Phase::Paused => TimerSnapshot::Paused {
                remaining_secs: self.remaining_secs,
            },
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start a fresh countdown of `duration_secs`, or resume a paused one.
    ///
    /// When resuming, `duration_secs` is ignored and the countdown continues
    /// from the paused remaining time.
    pub fn start(&mut self, duration_secs: u64) -> Option<Event> {
        let resumed = match self.phase {
            Phase::Idle => {
                if duration_secs == 0 {
                    return None;
                }
                self.total_secs = duration_secs;
                self.remaining_secs = duration_secs;
                false
            }
            Phase::Paused => true,
            Phase::Running { .. } => return None,
        };

        let now = self.clock.now_ms();
        let end_ms = now.saturating_add(secs_to_ms(self.remaining_secs));
        self.phase = Phase::Running { end_ms };
        Some(Event::TimerStarted {
            duration_secs: self.total_secs,
            remaining_secs: self.remaining_secs,
            end_timestamp_ms: end_ms,
            resumed,
            at: self.clock.now(),
        })
    }

    pub fn pause(&mut self) -> Option<Event> {
        let Phase::Running { end_ms } = self.phase else {
            return None;
        };
        self.remaining_secs = remaining_until(end_ms, self.clock.now_ms());
        self.phase = Phase::Paused;
        Some(Event::TimerPaused {
            remaining_secs: self.remaining_secs,
            at: self.clock.now(),
        })
    }

    /// Re-derive the remaining time. Call periodically while running.
    ///
    /// Returns `TimerCompleted` once the end time is reached (the timer is
    /// then idle again), `TimerTick` when the displayed second changed, and
    /// `None` otherwise.
    pub fn poll(&mut self) -> Option<Event> {
        let Phase::Running { end_ms } = self.phase else {
            return None;
        };
        let remaining = remaining_until(end_ms, self.clock.now_ms());
        if remaining == 0 {
            self.phase = Phase::Idle;
            self.remaining_secs = self.total_secs;
            return Some(Event::TimerCompleted {
                duration_secs: self.total_secs,
                at: self.clock.now(),
            });
        }
        if remaining == self.remaining_secs {
            return None;
        }
        self.remaining_secs = remaining;
        Some(Event::TimerTick {
            remaining_secs: remaining,
            at: self.clock.now(),
        })
    }

    /// Override the session length. Not allowed while running.
    ///
    /// Non-positive or overflowing values are discarded and the previous
    /// duration is kept.
    pub fn set_duration(&mut self, minutes: i64) -> Option<Event> {
        if matches!(self.phase, Phase::Running { .. }) || minutes <= 0 {
            return None;
        }
        let secs = u64::try_from(minutes).ok()?.checked_mul(60)?;
        secs.checked_mul(1000).filter(|ms| *ms <= i64::MAX as u64)?;
        self.total_secs = secs;
        self.remaining_secs = secs;
        Some(Event::DurationChanged {
            total_secs: secs,
            at: self.clock.now(),
        })
    }

    /// Abandon the current session without reward. Valid from any state.
    pub fn cancel(&mut self) -> Option<Event> {
        let remaining_secs = match self.phase {
            Phase::Running { end_ms } => remaining_until(end_ms, self.clock.now_ms()),
            Phase::Idle | Phase::Paused => self.remaining_secs,
        };
        self.phase = Phase::Idle;
        self.remaining_secs = self.total_secs;
        Some(Event::TimerCancelled {
            remaining_secs,
            at: self.clock.now(),
        })
    }

    /// Set the session length of an idle timer without emitting an event.
    /// Returns `false` if the timer is not idle.
    pub fn prime(&mut self, total_secs: u64) -> bool {
        if self.phase != Phase::Idle {
            return false;
        }
        self.total_secs = total_secs;
        self.remaining_secs = total_secs;
        true
    }

    /// Adopt a persisted snapshot as-is. Staleness is the caller's call.
    pub fn restore(&mut self, snapshot: TimerSnapshot) {
        match snapshot {
            TimerSnapshot::Idle => {
                self.phase = Phase::Idle;
                self.remaining_secs = self.total_secs;
            }
            TimerSnapshot::Running { end_timestamp_ms } => {
                self.phase = Phase::Running {
                    end_ms: end_timestamp_ms,
                };
                self.remaining_secs = remaining_until(end_timestamp_ms, self.clock.now_ms());
                self.total_secs = self.total_secs.max(self.remaining_secs);
            }
            TimerSnapshot::Paused { remaining_secs } => {
                self.phase = Phase::Paused;
                self.remaining_secs = remaining_secs;
                self.total_secs = self.total_secs.max(remaining_secs);
            }
        }
    }
}

/// Parse a user-supplied minute count. Anything but a positive integer is
/// rejected.
pub fn parse_minutes(input: &str) -> Option<i64> {
    input.trim().parse::<i64>().ok().filter(|m| *m > 0)
}

/// Whole seconds left until `end_ms`, rounded up and never negative.
fn remaining_until(end_ms: i64, now_ms: i64) -> u64 {
    let diff = end_ms.saturating_sub(now_ms);
    if diff <= 0 {
        return 0;
    }
    (diff as u64).div_ceil(1000)
}

fn secs_to_ms(secs: u64) -> i64 {
    i64::try_from(secs.saturating_mul(1000)).unwrap_or(i64::MAX)
}
