//! Navigation/screen controller.
//!
//! [`Theatre`] is the one writer of application state. It boots from the
//! persisted store, applies the interrupted-session recovery policy, drives
//! the [`FocusTimer`], feeds completed sessions into the progression ledger
//! and mirrors every transition back into the store.
//!
//! Time-driven work arrives as [`Input`] events (periodic tick, page became
//! visible) instead of callbacks, so all state changes flow through `&mut self`.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, Chapter, Memory};
use crate::clock::Clock;
use crate::events::Event;
use crate::progression::{self, UserProgress};
use crate::storage::{KvStore, NoticeConfig, SaveFile};
use crate::timer::{FocusTimer, TimerSnapshot, TimerState};
use crate::wake::{WakeGuard, WakeLock};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Screen {
    #[default]
    Intro,
    Story,
    Timer,
    #[serde(alias = "WORLDVIEW")]
    Archives,
    Contents,
}

impl Screen {
    pub const ALL: [Screen; 5] = [
        Screen::Intro,
        Screen::Story,
        Screen::Timer,
        Screen::Archives,
        Screen::Contents,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Screen::Intro => "INTRO",
            Screen::Story => "STORY",
            Screen::Timer => "TIMER",
            Screen::Archives => "ARCHIVES",
            Screen::Contents => "CONTENTS",
        }
    }
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Screen {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "INTRO" => Ok(Screen::Intro),
            "STORY" => Ok(Screen::Story),
            "TIMER" => Ok(Screen::Timer),
            "ARCHIVES" | "WORLDVIEW" => Ok(Screen::Archives),
            "CONTENTS" => Ok(Screen::Contents),
            other => Err(format!("unknown screen '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NoticeKind {
    /// The app closed mid-session and left no snapshot behind.
    Interrupted,
    /// A running session ended while the app was closed and was discarded.
    Abandoned,
    RankUp { rank: u32 },
}

/// An ephemeral, auto-dismissing message. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    #[serde(flatten)]
    pub kind: NoticeKind,
    pub raised_at_ms: i64,
    pub expires_at_ms: i64,
}

impl Notice {
    pub fn is_expired(&self, now_ms: i64) -> bool {
        now_ms >= self.expires_at_ms
    }
}

/// Inbound, time-driven events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    /// Periodic poll while the app is open.
    Tick,
    /// The host reports the app became visible again.
    VisibilityRestored,
    DismissNotice,
}

/// Read model for the presentation layer.
#[derive(Debug, Clone, Serialize)]
pub struct Status {
    pub screen: Screen,
    pub timer: TimerState,
    pub remaining_secs: u64,
    pub total_secs: u64,
    /// Fraction of the session already elapsed.
    pub timer_progress: f64,
    pub chapter_index: usize,
    pub chapter_id: u32,
    pub chapter_title: String,
    pub chapter_count: usize,
    pub chapter_completed: bool,
    pub rank: u32,
    pub experience: f64,
    pub focus_sessions: u64,
    pub rank_title: String,
    pub memories_unlocked: usize,
    pub memories_total: usize,
    pub notice: Option<Notice>,
}

/// Top-level controller. See the module docs.
pub struct Theatre<C: Clock, S: KvStore, W: WakeLock> {
    timer: FocusTimer<C>,
    save: SaveFile<S>,
    wake: WakeGuard<W>,
    catalog: Catalog,
    notices: NoticeConfig,
    screen: Screen,
    chapter_index: usize,
    chapter_completed: bool,
    progress: UserProgress,
    duration_override: Option<u64>,
    notice: Option<Notice>,
}

impl<C: Clock, S: KvStore, W: WakeLock> Theatre<C, S, W> {
    /// Restore the controller from the store, applying the recovery policy.
    ///
    /// Must run once before anything reads state. Returns the events raised
    /// while recovering.
    pub fn boot(
        clock: C,
        store: S,
        wake_lock: W,
        catalog: Catalog,
        notices: NoticeConfig,
    ) -> (Self, Vec<Event>) {
        let save = SaveFile::new(store);
        let progress = save.progress();
        let chapter_index = save.chapter_index().min(catalog.last_chapter_index());
        let persisted_screen = save.screen();
        let chapter_completed = save.chapter_completed();
        let duration_override = save.duration_override();
        let snapshot = save.timer_snapshot();

        let total_secs = duration_override.unwrap_or_else(|| catalog.chapter(chapter_index).focus_secs());
        let timer = FocusTimer::new(clock, total_secs);

        let mut theatre = Self {
            timer,
            save,
            wake: WakeGuard::new(wake_lock),
            catalog,
            notices,
            screen: persisted_screen,
            chapter_index,
            chapter_completed,
            progress,
            duration_override,
            notice: None,
        };

        let mut events = Vec::new();
        let now_ms = theatre.timer.clock().now_ms();
        let at = theatre.timer.clock().now();

        match snapshot {
            TimerSnapshot::Running { end_timestamp_ms } if snapshot.is_stale(now_ms) => {
                tracing::info!(end_timestamp_ms, "discarding session that ended while closed");
                theatre.screen = Screen::Intro;
                events.push(Event::SessionAbandoned {
                    end_timestamp_ms,
                    at,
                });
                let ttl = theatre.notices.interrupted_ttl_ms;
                events.push(theatre.raise_notice(NoticeKind::Abandoned, ttl));
            }
            TimerSnapshot::Running { .. } | TimerSnapshot::Paused { .. } => {
                theatre.timer.restore(snapshot);
                theatre.screen = Screen::Timer;
                if theatre.timer.state() == TimerState::Running {
                    theatre.wake.acquire();
                }
                tracing::info!(state = ?theatre.timer.state(), remaining = theatre.timer.remaining_secs(), "session restored");
                events.push(Event::SessionRestored {
                    state: theatre.timer.state(),
                    remaining_secs: theatre.timer.remaining_secs(),
                    at,
                });
            }
            TimerSnapshot::Idle if persisted_screen == Screen::Timer => {
                tracing::info!("timer screen without a snapshot, treating as interrupted");
                theatre.screen = Screen::Intro;
                events.push(Event::SessionInterrupted { at });
                let ttl = theatre.notices.interrupted_ttl_ms;
                events.push(theatre.raise_notice(NoticeKind::Interrupted, ttl));
            }
            TimerSnapshot::Idle => {}
        }

        theatre.persist_timer();
        theatre.persist_navigation();
        (theatre, events)
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn timer(&self) -> &FocusTimer<C> {
        &self.timer
    }

    pub fn progress(&self) -> UserProgress {
        self.progress
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn chapter_index(&self) -> usize {
        self.chapter_index
    }

    pub fn chapter(&self) -> &Chapter {
        self.catalog.chapter(self.chapter_index)
    }

    pub fn chapter_completed(&self) -> bool {
        self.chapter_completed
    }

    pub fn wake_held(&self) -> bool {
        self.wake.is_held()
    }

    pub fn wake_lock(&self) -> &W {
        self.wake.lock()
    }

    /// The active notice, unless it has already expired.
    pub fn notice(&self) -> Option<&Notice> {
        let now_ms = self.timer.clock().now_ms();
        self.notice.as_ref().filter(|n| !n.is_expired(now_ms))
    }

    /// Session length the next fresh start will use.
    pub fn effective_duration_secs(&self) -> u64 {
        self.duration_override
            .unwrap_or_else(|| self.chapter().focus_secs())
    }

    pub fn is_memory_unlocked(&self, memory: &Memory) -> bool {
        progression::is_memory_unlocked(memory, self.progress.focus_sessions())
    }

    pub fn rank_title(&self) -> &'static str {
        progression::rank_title(&self.catalog, self.progress.focus_sessions())
    }

    pub fn store(&self) -> &S {
        self.save.store()
    }

    /// Tear down, releasing the stay-awake hint, and hand back the store.
    pub fn into_store(mut self) -> S {
        self.wake.release();
        let Self { save, .. } = self;
        save.into_inner()
    }

    pub fn status(&self) -> Status {
        let focus_sessions = self.progress.focus_sessions();
        let chapter = self.chapter();
        Status {
            screen: self.screen,
            timer: self.timer.state(),
            remaining_secs: self.timer.remaining_secs(),
            total_secs: self.timer.total_secs(),
            timer_progress: self.timer.progress(),
            chapter_index: self.chapter_index,
            chapter_id: chapter.id,
            chapter_title: chapter.title.to_string(),
            chapter_count: self.catalog.chapter_count(),
            chapter_completed: self.chapter_completed,
            rank: self.progress.rank(),
            experience: self.progress.experience(),
            focus_sessions,
            rank_title: self.rank_title().to_string(),
            memories_unlocked: progression::unlocked_memories(&self.catalog, focus_sessions).count(),
            memories_total: self.catalog.memories().len(),
            notice: self.notice().copied(),
        }
    }

    // ── Inbound events ───────────────────────────────────────────────

    pub fn handle(&mut self, input: Input) -> Vec<Event> {
        let mut events = Vec::new();
        match input {
            Input::Tick => {
                events.extend(self.expire_notice());
                events.extend(self.poll());
            }
            Input::VisibilityRestored => {
                tracing::debug!("visibility restored, reconciling countdown");
                events.extend(self.poll());
                events.extend(self.expire_notice());
            }
            Input::DismissNotice => {
                if let Some(notice) = self.notice.take() {
                    events.push(Event::NoticeDismissed {
                        kind: notice.kind,
                        at: self.timer.clock().now(),
                    });
                }
            }
        }
        events
    }

    // ── Screen transitions ───────────────────────────────────────────

    /// Switch screens. Entering `Story` clears the chapter-completed flag.
    /// Leaving `Timer` does not touch the countdown.
    pub fn go_to(&mut self, screen: Screen) -> Option<Event> {
        if screen == Screen::Story && self.chapter_completed {
            self.chapter_completed = false;
            self.save.set_chapter_completed(false);
        }
        if screen == self.screen {
            return None;
        }
        let from = self.screen;
        self.screen = screen;
        self.save.set_screen(screen);
        Some(Event::ScreenChanged {
            from,
            to: screen,
            at: self.timer.clock().now(),
        })
    }

    /// Begin the current chapter's story.
    pub fn begin_chapter(&mut self) -> Option<Event> {
        self.go_to(Screen::Story)
    }

    /// The story has been read; move on to the focus timer.
    pub fn finish_story(&mut self) -> Option<Event> {
        self.go_to(Screen::Timer)
    }

    /// Jump to any chapter and enter its story. Out-of-range indices clamp.
    pub fn select_chapter(&mut self, index: usize) -> Vec<Event> {
        let index = index.min(self.catalog.last_chapter_index());
        let mut events = Vec::new();
        self.set_chapter(index);
        events.push(Event::ChapterSelected {
            index,
            chapter_id: self.chapter().id,
            at: self.timer.clock().now(),
        });
        // Selecting always lands in the story, even when already there.
        self.chapter_completed = false;
        self.save.set_chapter_completed(false);
        events.extend(self.go_to(Screen::Story));
        events
    }

    // ── Timer ────────────────────────────────────────────────────────

    /// Start a fresh session with the effective duration, or resume a
    /// paused one. Enters the timer screen.
    pub fn start(&mut self) -> Vec<Event> {
        let mut events = Vec::new();
        let Some(event) = self.timer.start(self.effective_duration_secs()) else {
            return events;
        };
        self.wake.acquire();
        self.persist_timer();
        events.extend(self.go_to(Screen::Timer));
        events.insert(0, event);
        events
    }

    pub fn pause(&mut self) -> Option<Event> {
        let event = self.timer.pause()?;
        self.persist_timer();
        self.wake.release();
        Some(event)
    }

    /// Surrender the session: no reward, back to the intro.
    pub fn cancel(&mut self) -> Vec<Event> {
        let mut events = Vec::new();
        events.extend(self.timer.cancel());
        self.persist_timer();
        self.wake.release();
        events.extend(self.go_to(Screen::Intro));
        events
    }

    /// Override the session length in minutes. Ignored while running or for
    /// non-positive values.
    pub fn set_duration(&mut self, minutes: i64) -> Option<Event> {
        let event = self.timer.set_duration(minutes)?;
        self.duration_override = Some(self.timer.total_secs());
        self.save.set_duration_override(self.duration_override);
        self.persist_timer();
        Some(event)
    }

    /// Poll the countdown, completing the session when it reaches zero.
    pub fn poll(&mut self) -> Vec<Event> {
        match self.timer.poll() {
            Some(event @ Event::TimerCompleted { .. }) => {
                let mut events = vec![event];
                events.extend(self.on_complete());
                events
            }
            Some(event) => vec![event],
            None => Vec::new(),
        }
    }

    // ── Internal ─────────────────────────────────────────────────────

    /// Reward one completed session. Runs exactly once per completion.
    fn on_complete(&mut self) -> Vec<Event> {
        let mut events = Vec::new();
        let at = self.timer.clock().now();

        self.persist_timer();
        self.wake.release();

        let duration_secs = self.timer.total_secs();
        let duration_ms = i64::try_from(duration_secs.saturating_mul(1000)).unwrap_or(i64::MAX);
        // Sessions longer than chrono's range start at the earliest instant it can hold.
        let started_at = DateTime::<Utc>::from_timestamp_millis(
            self.timer.clock().now_ms().saturating_sub(duration_ms),
        )
        .unwrap_or(DateTime::<Utc>::MIN_UTC);
        let chapter = self.chapter();
        events.push(Event::SessionCompleted {
            chapter_id: chapter.id,
            chapter_title: chapter.title.to_string(),
            duration_secs,
            started_at,
            completed_at: at,
        });

        let advance = self.progress.advance();
        self.save.set_progress(self.progress);
        tracing::info!(
            rank = self.progress.rank(),
            focus_sessions = self.progress.focus_sessions(),
            "focus session completed"
        );
        events.push(Event::ProgressAdvanced {
            rank: self.progress.rank(),
            experience: self.progress.experience(),
            focus_sessions: self.progress.focus_sessions(),
            at,
        });
        if advance.ranked_up() {
            let rank = self.progress.rank();
            events.push(Event::RankUp {
                rank,
                title: self.rank_title().to_string(),
                at,
            });
            let ttl = self.notices.rank_up_ttl_ms;
            events.push(self.raise_notice(NoticeKind::RankUp { rank }, ttl));
        }

        if self.chapter_index < self.catalog.last_chapter_index() {
            self.set_chapter(self.chapter_index + 1);
            events.push(Event::ChapterAdvanced {
                index: self.chapter_index,
                chapter_id: self.chapter().id,
                at,
            });
        }

        self.chapter_completed = true;
        self.save.set_chapter_completed(true);
        events.extend(self.go_to(Screen::Intro));
        events
    }

    /// Switch the active chapter. A custom duration belongs to the chapter
    /// it was set for, so it is dropped.
    fn set_chapter(&mut self, index: usize) {
        let changed = index != self.chapter_index;
        self.chapter_index = index;
        self.save.set_chapter_index(index);
        if changed && self.duration_override.take().is_some() {
            self.save.set_duration_override(None);
        }
        self.timer.prime(self.effective_duration_secs());
    }

    fn raise_notice(&mut self, kind: NoticeKind, ttl_ms: u64) -> Event {
        let now_ms = self.timer.clock().now_ms();
        let expires_at_ms = now_ms.saturating_add(i64::try_from(ttl_ms).unwrap_or(i64::MAX));
        self.notice = Some(Notice {
            kind,
            raised_at_ms: now_ms,
            expires_at_ms,
        });
        Event::NoticeRaised {
            kind,
            expires_at: DateTime::<Utc>::from_timestamp_millis(expires_at_ms).unwrap_or_default(),
        }
    }

    fn expire_notice(&mut self) -> Option<Event> {
        let now_ms = self.timer.clock().now_ms();
        let notice = self.notice.filter(|n| n.is_expired(now_ms))?;
        self.notice = None;
        Some(Event::NoticeDismissed {
            kind: notice.kind,
            at: self.timer.clock().now(),
        })
    }

    fn persist_timer(&mut self) {
        self.save.set_timer_snapshot(self.timer.snapshot());
    }

    fn persist_navigation(&mut self) {
        self.save.set_screen(self.screen);
        self.save.set_chapter_index(self.chapter_index);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::storage::{keys, MemoryStore};
    use crate::wake::NoWakeLock;

    const T0: i64 = 1_700_000_000_000;

    type TestTheatre = Theatre<ManualClock, MemoryStore, NoWakeLock>;

    fn boot(clock: &ManualClock, store: MemoryStore) -> (TestTheatre, Vec<Event>) {
        Theatre::boot(
            clock.clone(),
            store,
            NoWakeLock,
            Catalog::builtin(),
            NoticeConfig::default(),
        )
    }

    fn fresh() -> (ManualClock, TestTheatre) {
        let clock = ManualClock::new(T0);
        let (theatre, events) = boot(&clock, MemoryStore::new());
        assert!(events.is_empty());
        (clock, theatre)
    }

    #[test]
    fn screen_parses_case_insensitively() {
        assert_eq!("timer".parse::<Screen>().unwrap(), Screen::Timer);
        assert_eq!("WORLDVIEW".parse::<Screen>().unwrap(), Screen::Archives);
        assert!("lobby".parse::<Screen>().is_err());
        for screen in Screen::ALL {
            assert_eq!(screen.as_str().parse::<Screen>().unwrap(), screen);
        }
    }

    #[test]
    fn fresh_boot_uses_defaults() {
        let (_clock, theatre) = fresh();
        assert_eq!(theatre.screen(), Screen::Intro);
        assert_eq!(theatre.chapter_index(), 0);
        assert_eq!(theatre.timer().state(), TimerState::Idle);
        assert_eq!(theatre.effective_duration_secs(), theatre.chapter().focus_secs());
        assert_eq!(theatre.progress(), UserProgress::default());
    }

    #[test]
    fn story_flow_reaches_timer() {
        let (_clock, mut theatre) = fresh();
        assert!(theatre.begin_chapter().is_some());
        assert_eq!(theatre.screen(), Screen::Story);
        theatre.finish_story();
        assert_eq!(theatre.screen(), Screen::Timer);
        assert_eq!(theatre.store().get(keys::SCREEN_STATE).unwrap().as_deref(), Some("TIMER"));
    }

    #[test]
    fn completion_advances_progress_and_chapter_once() {
        let (clock, mut theatre) = fresh();
        theatre.finish_story();
        theatre.start();
        clock.advance_secs(theatre.timer().total_secs() as i64);

        let events = theatre.handle(Input::Tick);
        assert!(events.iter().any(|e| matches!(e, Event::TimerCompleted { .. })));
        assert_eq!(theatre.progress().focus_sessions(), 1);
        assert_eq!(theatre.chapter_index(), 1);
        assert!(theatre.chapter_completed());
        assert_eq!(theatre.screen(), Screen::Intro);
        assert!(theatre.store().get(keys::TIMER_END_TIMESTAMP).unwrap().is_none());

        // Further polls are no-ops.
        clock.advance_secs(10);
        assert!(theatre.handle(Input::Tick).is_empty());
        assert_eq!(theatre.progress().focus_sessions(), 1);
        assert_eq!(theatre.chapter_index(), 1);
    }

    #[test]
    fn second_completion_ranks_up_with_notice() {
        let (clock, mut theatre) = fresh();
        for _ in 0..2 {
            theatre.start();
            clock.advance_secs(theatre.timer().total_secs() as i64);
            theatre.handle(Input::VisibilityRestored);
        }
        assert_eq!(theatre.progress().rank(), 2);
        assert_eq!(theatre.progress().experience(), 0.0);
        assert!(matches!(
            theatre.notice().map(|n| n.kind),
            Some(NoticeKind::RankUp { rank: 2 })
        ));

        clock.advance_ms(NoticeConfig::default().rank_up_ttl_ms as i64);
        assert!(theatre.notice().is_none());
        let events = theatre.handle(Input::Tick);
        assert!(matches!(events.as_slice(), [Event::NoticeDismissed { .. }]));
    }

    #[test]
    fn chapter_index_clamps_at_last_chapter() {
        let (clock, mut theatre) = fresh();
        let last = theatre.catalog().last_chapter_index();
        theatre.select_chapter(last + 10);
        assert_eq!(theatre.chapter_index(), last);

        theatre.start();
        clock.advance_secs(theatre.timer().total_secs() as i64);
        theatre.poll();
        assert_eq!(theatre.chapter_index(), last);
        assert_eq!(theatre.progress().focus_sessions(), 1);
    }

    #[test]
    fn cancel_does_not_reward() {
        let (clock, mut theatre) = fresh();
        theatre.start();
        clock.advance_secs(30);
        let events = theatre.cancel();
        assert!(matches!(events[0], Event::TimerCancelled { .. }));
        assert_eq!(theatre.progress().focus_sessions(), 0);
        assert_eq!(theatre.chapter_index(), 0);
        assert_eq!(theatre.screen(), Screen::Intro);
        assert_eq!(theatre.timer().state(), TimerState::Idle);
        assert!(theatre.store().get(keys::TIMER_END_TIMESTAMP).unwrap().is_none());
    }

    #[test]
    fn entering_story_clears_completed_flag() {
        let (clock, mut theatre) = fresh();
        theatre.start();
        clock.advance_secs(theatre.timer().total_secs() as i64);
        theatre.poll();
        assert!(theatre.chapter_completed());
        theatre.go_to(Screen::Archives);
        assert!(theatre.chapter_completed());
        theatre.go_to(Screen::Story);
        assert!(!theatre.chapter_completed());
        assert_eq!(theatre.store().get(keys::CHAPTER_COMPLETED).unwrap().as_deref(), Some("false"));
    }

    #[test]
    fn duration_override_applies_and_resets_on_chapter_change() {
        let (_clock, mut theatre) = fresh();
        assert!(theatre.set_duration(0).is_none());
        assert!(theatre.set_duration(3).is_some());
        assert_eq!(theatre.effective_duration_secs(), 180);
        assert_eq!(theatre.store().get(keys::TIMER_TOTAL_SECONDS).unwrap().as_deref(), Some("180"));

        theatre.select_chapter(2);
        assert_eq!(theatre.effective_duration_secs(), theatre.chapter().focus_secs());
        assert!(theatre.store().get(keys::TIMER_TOTAL_SECONDS).unwrap().is_none());
        assert_eq!(theatre.timer().remaining_secs(), theatre.chapter().focus_secs());
    }

    #[test]
    fn set_duration_ignored_while_running() {
        let (_clock, mut theatre) = fresh();
        theatre.start();
        assert!(theatre.set_duration(5).is_none());
        assert!(theatre.store().get(keys::TIMER_TOTAL_SECONDS).unwrap().is_none());
    }

    #[test]
    fn reboot_restores_running_session() {
        let (clock, mut theatre) = fresh();
        theatre.start();
        clock.advance_secs(60);
        let store = theatre.into_store();

        clock.advance_secs(60);
        let (theatre, events) = boot(&clock, store);
        assert!(matches!(events.as_slice(), [Event::SessionRestored { state: TimerState::Running, .. }]));
        assert_eq!(theatre.screen(), Screen::Timer);
        assert_eq!(
            theatre.timer().remaining_secs(),
            theatre.chapter().focus_secs() - 120
        );
    }

    #[test]
    fn reboot_discards_stale_running_session() {
        let clock = ManualClock::new(T0);
        let mut store = MemoryStore::new();
        store.set(keys::SCREEN_STATE, "TIMER").unwrap();
        store.set(keys::TIMER_END_TIMESTAMP, &(T0 - 5_000).to_string()).unwrap();

        let (theatre, events) = boot(&clock, store);
        assert_eq!(theatre.timer().state(), TimerState::Idle);
        assert_eq!(theatre.screen(), Screen::Intro);
        assert_eq!(theatre.progress().focus_sessions(), 0);
        assert!(theatre.timer().remaining_secs() > 0);
        assert!(events.iter().any(|e| matches!(e, Event::SessionAbandoned { .. })));
        assert!(!events.iter().any(|e| matches!(e, Event::TimerCompleted { .. })));
        assert!(theatre.store().get(keys::TIMER_END_TIMESTAMP).unwrap().is_none());
    }

    #[test]
    fn reboot_restores_paused_session_on_timer_screen() {
        let clock = ManualClock::new(T0);
        let mut store = MemoryStore::new();
        store.set(keys::SCREEN_STATE, "ARCHIVES").unwrap();
        store.set(keys::TIMER_PAUSED_SECONDS, "125").unwrap();

        let (theatre, _) = boot(&clock, store);
        assert_eq!(theatre.screen(), Screen::Timer);
        assert_eq!(theatre.timer().state(), TimerState::Paused);
        assert_eq!(theatre.timer().remaining_secs(), 125);
        assert!(!theatre.wake_held());
    }

    #[test]
    fn timer_screen_without_snapshot_is_interrupted() {
        let clock = ManualClock::new(T0);
        let mut store = MemoryStore::new();
        store.set(keys::SCREEN_STATE, "TIMER").unwrap();

        let (theatre, events) = boot(&clock, store);
        assert_eq!(theatre.screen(), Screen::Intro);
        assert!(matches!(events[0], Event::SessionInterrupted { .. }));
        assert_eq!(theatre.notice().map(|n| n.kind), Some(NoticeKind::Interrupted));
        assert_eq!(theatre.store().get(keys::SCREEN_STATE).unwrap().as_deref(), Some("INTRO"));
    }

    #[test]
    fn dismiss_notice_clears_it() {
        let clock = ManualClock::new(T0);
        let mut store = MemoryStore::new();
        store.set(keys::SCREEN_STATE, "TIMER").unwrap();
        let (mut theatre, _) = boot(&clock, store);

        let events = theatre.handle(Input::DismissNotice);
        assert_eq!(events.len(), 1);
        assert!(theatre.notice().is_none());
        assert!(theatre.handle(Input::DismissNotice).is_empty());
    }

    #[test]
    fn persisted_chapter_index_is_clamped() {
        let clock = ManualClock::new(T0);
        let mut store = MemoryStore::new();
        store.set(keys::CHAPTER_INDEX, "999").unwrap();
        let (theatre, _) = boot(&clock, store);
        assert_eq!(theatre.chapter_index(), theatre.catalog().last_chapter_index());
    }

    #[test]
    fn status_reflects_state() {
        let (_clock, mut theatre) = fresh();
        theatre.select_chapter(1);
        let status = theatre.status();
        assert_eq!(status.screen, Screen::Story);
        assert_eq!(status.chapter_id, 2);
        assert_eq!(status.rank, 1);
        assert_eq!(status.memories_unlocked, 0);
        assert_eq!(status.memories_total, theatre.catalog().memories().len());
        assert_eq!(status.timer_progress, 0.0);
    }

    fn session_completed(events: &[Event]) -> Option<(u64, DateTime<Utc>)> {
        events.iter().find_map(|e| match e {
            Event::SessionCompleted {
                duration_secs,
                started_at,
                ..
            } => Some((*duration_secs, *started_at)),
            _ => None,
        })
    }

    #[test]
    fn huge_duration_override_completes_without_overflow() {
        let (clock, mut theatre) = fresh();
        assert!(theatre.set_duration(150_000_000_000).is_some());
        let total = theatre.timer().total_secs();
        theatre.start();
        clock.advance_secs(i64::try_from(total).unwrap());

        let events = theatre.handle(Input::Tick);
        let (duration_secs, started_at) = session_completed(&events).expect("session completed");
        assert_eq!(duration_secs, total);
        assert_eq!(started_at.timestamp_millis(), T0);
        assert_eq!(theatre.progress().focus_sessions(), 1);
    }

    #[test]
    fn huge_persisted_total_completes_without_overflow() {
        let clock = ManualClock::new(T0);
        let mut store = MemoryStore::new();
        store.set(keys::TIMER_TOTAL_SECONDS, "9000000000000").unwrap();
        store.set(keys::TIMER_PAUSED_SECONDS, "1").unwrap();
        let (mut theatre, _) = boot(&clock, store);

        theatre.start();
        clock.advance_secs(2);
        let events = theatre.handle(Input::Tick);
        let (duration_secs, started_at) = session_completed(&events).expect("session completed");
        assert_eq!(duration_secs, 9_000_000_000_000);
        assert_eq!(started_at, DateTime::<Utc>::MIN_UTC);
    }

    #[test]
    fn session_start_is_duration_before_completion() {
        let (clock, mut theatre) = fresh();
        theatre.set_duration(1);
        theatre.start();
        clock.advance_secs(60);
        let events = theatre.poll();
        let (_, started_at) = session_completed(&events).expect("session completed");
        assert_eq!(started_at.timestamp_millis(), T0);
    }
}
