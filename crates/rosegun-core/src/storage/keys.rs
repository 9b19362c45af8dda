//! Persisted key names. These are part of the save format; do not rename.

pub const PROGRESS: &str = "progress";
pub const CHAPTER_INDEX: &str = "chapterIndex";
pub const SCREEN_STATE: &str = "screenState";
pub const CHAPTER_COMPLETED: &str = "chapterCompleted";
pub const TIMER_END_TIMESTAMP: &str = "timerEndTimestamp";
pub const TIMER_PAUSED_SECONDS: &str = "timerPausedSeconds";
pub const TIMER_TOTAL_SECONDS: &str = "timerTotalSeconds";
