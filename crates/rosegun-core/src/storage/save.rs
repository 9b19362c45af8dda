//! Typed schema over the key/value store.
//!
//! Reads never fail: a missing, unreadable or malformed entry yields that
//! entity's default and a warning in the log. Writes that fail are logged and
//! dropped; the in-memory state stays authoritative for the session.

use std::fmt::Display;
use std::str::FromStr;

use super::keys;
use super::KvStore;
use crate::navigation::Screen;
use crate::progression::UserProgress;
use crate::timer::TimerSnapshot;

pub struct SaveFile<S> {
    store: S,
}

impl<S: KvStore> SaveFile<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_inner(self) -> S {
        self.store
    }

    // ── Progress ─────────────────────────────────────────────────────

    pub fn progress(&self) -> UserProgress {
        let Some(raw) = self.read(keys::PROGRESS) else {
            return UserProgress::default();
        };
        serde_json::from_str(&raw).unwrap_or_else(|e| {
            tracing::warn!(key = keys::PROGRESS, value = %raw, error = %e, "malformed entry, using default");
            UserProgress::default()
        })
    }

    pub fn set_progress(&mut self, progress: UserProgress) {
        match serde_json::to_string(&progress) {
            Ok(json) => self.write(keys::PROGRESS, &json),
            Err(e) => tracing::warn!(error = %e, "could not serialize progress"),
        }
    }

    // ── Navigation ───────────────────────────────────────────────────

    /// Raw persisted chapter index; the controller clamps it to the catalog.
    pub fn chapter_index(&self) -> usize {
        self.read_parsed(keys::CHAPTER_INDEX).unwrap_or(0)
    }

    pub fn set_chapter_index(&mut self, index: usize) {
        self.write(keys::CHAPTER_INDEX, &index.to_string());
    }

    pub fn screen(&self) -> Screen {
        self.read_parsed(keys::SCREEN_STATE).unwrap_or_default()
    }

    pub fn set_screen(&mut self, screen: Screen) {
        self.write(keys::SCREEN_STATE, screen.as_str());
    }

    pub fn chapter_completed(&self) -> bool {
        self.read_parsed(keys::CHAPTER_COMPLETED).unwrap_or(false)
    }

    pub fn set_chapter_completed(&mut self, completed: bool) {
        self.write(keys::CHAPTER_COMPLETED, if completed { "true" } else { "false" });
    }

    // ── Timer ────────────────────────────────────────────────────────

    /// The persisted countdown. Both snapshot keys present at once is
    /// treated as corruption and reads as `Idle`.
    pub fn timer_snapshot(&self) -> TimerSnapshot {
        let end = self.read_parsed::<i64>(keys::TIMER_END_TIMESTAMP);
        let paused = self.read_parsed::<u64>(keys::TIMER_PAUSED_SECONDS);
        match (end, paused) {
            (None, None) => TimerSnapshot::Idle,
            (Some(end_timestamp_ms), None) => TimerSnapshot::Running { end_timestamp_ms },
            (None, Some(remaining_secs)) => TimerSnapshot::Paused { remaining_secs },
            (Some(_), Some(_)) => {
                tracing::warn!("both running and paused snapshots present, discarding");
                TimerSnapshot::Idle
            }
        }
    }

    /// Persist a snapshot. The conflicting key is removed before the new
    /// one is written, so an interrupted write never leaves both behind.
    pub fn set_timer_snapshot(&mut self, snapshot: TimerSnapshot) {
        match snapshot {
            TimerSnapshot::Idle => {
                self.erase(keys::TIMER_END_TIMESTAMP);
                self.erase(keys::TIMER_PAUSED_SECONDS);
            }
            TimerSnapshot::Running { end_timestamp_ms } => {
                self.erase(keys::TIMER_PAUSED_SECONDS);
                self.write(keys::TIMER_END_TIMESTAMP, &end_timestamp_ms.to_string());
            }
            TimerSnapshot::Paused { remaining_secs } => {
                self.erase(keys::TIMER_END_TIMESTAMP);
                self.write(keys::TIMER_PAUSED_SECONDS, &remaining_secs.to_string());
            }
        }
    }

    /// User-chosen session length in seconds, if any.
    pub fn duration_override(&self) -> Option<u64> {
        self.read_parsed::<u64>(keys::TIMER_TOTAL_SECONDS)
            .filter(|secs| *secs > 0)
    }

    pub fn set_duration_override(&mut self, total_secs: Option<u64>) {
        match total_secs {
            Some(secs) => self.write(keys::TIMER_TOTAL_SECONDS, &secs.to_string()),
            None => self.erase(keys::TIMER_TOTAL_SECONDS),
        }
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn read(&self, key: &str) -> Option<String> {
        match self.store.get(key) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(key, error = %e, "store read failed, using default");
                None
            }
        }
    }

    fn read_parsed<T>(&self, key: &str) -> Option<T>
    where
        T: FromStr,
        T::Err: Display,
    {
        let raw = self.read(key)?;
        match raw.trim().parse::<T>() {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(key, value = %raw, error = %e, "malformed entry, using default");
                None
            }
        }
    }

    fn write(&mut self, key: &str, value: &str) {
        if let Err(e) = self.store.set(key, value) {
            tracing::warn!(key, error = %e, "store write failed");
        }
    }

    fn erase(&mut self, key: &str) {
        if let Err(e) = self.store.remove(key) {
            tracing::warn!(key, error = %e, "store delete failed");
        }
    }
}
