use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::navigation::{NoticeKind, Screen};
use crate::timer::TimerState;

/// Every state change in the system produces an Event.
/// The presentation layer renders from them; the CLI prints them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    TimerStarted {
        duration_secs: u64,
        remaining_secs: u64,
        end_timestamp_ms: i64,
        /// True when continuing a paused countdown.
        resumed: bool,
        at: DateTime<Utc>,
    },
    TimerPaused {
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    /// The displayed remaining second changed.
    TimerTick {
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerCompleted {
        duration_secs: u64,
        at: DateTime<Utc>,
    },
    TimerCancelled {
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    DurationChanged {
        total_secs: u64,
        at: DateTime<Utc>,
    },
    ScreenChanged {
        from: Screen,
        to: Screen,
        at: DateTime<Utc>,
    },
    ChapterSelected {
        index: usize,
        chapter_id: u32,
        at: DateTime<Utc>,
    },
    ChapterAdvanced {
        index: usize,
        chapter_id: u32,
        at: DateTime<Utc>,
    },
    /// A focus session ran to completion and was rewarded. Carries what the
    /// shell needs to record it in the session history.
    SessionCompleted {
        chapter_id: u32,
        chapter_title: String,
        duration_secs: u64,
        started_at: DateTime<Utc>,
        completed_at: DateTime<Utc>,
    },
    ProgressAdvanced {
        rank: u32,
        experience: f64,
        focus_sessions: u64,
        at: DateTime<Utc>,
    },
    RankUp {
        rank: u32,
        title: String,
        at: DateTime<Utc>,
    },
    /// A running or paused session survived a restart.
    SessionRestored {
        state: TimerState,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    /// A running session whose end passed while the app was closed.
    SessionAbandoned {
        end_timestamp_ms: i64,
        at: DateTime<Utc>,
    },
    /// The app was closed mid-session without leaving a snapshot.
    SessionInterrupted {
        at: DateTime<Utc>,
    },
    NoticeRaised {
        kind: NoticeKind,
        expires_at: DateTime<Utc>,
    },
    NoticeDismissed {
        kind: NoticeKind,
        at: DateTime<Utc>,
    },
}
