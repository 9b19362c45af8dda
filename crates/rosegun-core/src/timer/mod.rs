mod engine;
mod snapshot;

pub use engine::{parse_minutes, FocusTimer, TimerState};
pub use snapshot::TimerSnapshot;
