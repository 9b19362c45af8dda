pub mod config;
pub mod session;
pub mod stats;
pub mod story;
pub mod timer;
pub mod watch;
