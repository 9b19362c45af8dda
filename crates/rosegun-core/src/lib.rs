//! # Rosegun Core Library
//!
//! This library provides the core logic for Rosegun, a story-driven focus
//! timer. Short chapters of dialogue frame each focus session; completing a
//! session earns experience, advances the story and unlocks archive memories.
//! The `rosegun` CLI is a thin shell over the same library.
//!
//! ## Architecture
//!
//! - **Timer**: A wall-clock-based countdown that the caller polls; remaining
//!   time is always derived from an absolute end timestamp
//! - **Navigation**: The [`Theatre`] controller owning screens, chapters,
//!   notices and the interrupted-session recovery policy
//! - **Progression**: Rank/experience ledger plus memory and title lookups
//! - **Storage**: Key/value save state and session history in SQLite,
//!   TOML-based configuration
//!
//! ## Key Components
//!
//! - [`FocusTimer`]: Countdown state machine
//! - [`Theatre`]: Top-level controller
//! - [`Catalog`]: Built-in chapters, memories and rank titles
//! - [`Database`]: Save state and session statistics
//! - [`Config`]: Application configuration management

pub mod catalog;
pub mod clock;
pub mod error;
pub mod events;
pub mod navigation;
pub mod progression;
pub mod storage;
pub mod timer;
pub mod wake;

pub use catalog::{Catalog, Chapter, DialogueLine, Memory, Speaker};
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{ConfigError, CoreError, StoreError, ValidationError, WakeLockError};
pub use events::Event;
pub use navigation::{Input, Notice, NoticeKind, Screen, Status, Theatre};
pub use progression::UserProgress;
pub use storage::{Config, Database, KvStore, MemoryStore, SaveFile};
pub use timer::{FocusTimer, TimerSnapshot, TimerState};
pub use wake::{NoWakeLock, WakeGuard, WakeLock};
