use serde::{Deserialize, Serialize};

/// Minimal persisted form of the countdown.
///
/// A running countdown is stored as its absolute end time so that time spent
/// suspended, backgrounded or closed is accounted for on the next read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum TimerSnapshot {
    Idle,
    Running { end_timestamp_ms: i64 },
    Paused { remaining_secs: u64 },
}

impl TimerSnapshot {
    /// A running snapshot whose end time is not in the future.
    pub fn is_stale(&self, now_ms: i64) -> bool {
        matches!(self, TimerSnapshot::Running { end_timestamp_ms } if *end_timestamp_ms <= now_ms)
    }
}
