//! Interactive countdown loop.
//!
//! A current-thread runtime drives one poll interval and one stdin reader.
//! Both feed the same controller, so there is a single writer.

use std::time::Duration;

use rosegun_core::{Input, TimerState};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::MissedTickBehavior;

use super::session::{self, CliTheatre};
use crate::wake_lock;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = rosegun_core::Config::load_or_default();
    let wake_lock = wake_lock::from_config(&config.wake_lock);
    let (theatre, config) = session::open_with(config, wake_lock)?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_io()
        .enable_time()
        .build()?;
    let result = runtime.block_on(watch(theatre, config.timer.poll_interval_ms));
    // A pending stdin read would otherwise hold up shutdown.
    runtime.shutdown_background();
    result
}

async fn watch(mut theatre: CliTheatre, poll_interval_ms: u64) -> Result<(), Box<dyn std::error::Error>> {
    let mut interval = tokio::time::interval(Duration::from_millis(poll_interval_ms.max(1)));
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    tracing::debug!(poll_interval_ms, "watch started");
    println!("{}", serde_json::to_string(&theatre.status())?);

    loop {
        tokio::select! {
            _ = interval.tick() => {
                let events = theatre.handle(Input::Tick);
                session::emit(&theatre, &events)?;
                // Without stdin there is nobody to resume or quit, so stop
                // once the countdown is over.
                if !stdin_open && theatre.timer().state() != TimerState::Running {
                    break;
                }
            }
            line = lines.next_line(), if stdin_open => {
                match line? {
                    Some(command) => {
                        if !apply_command(&mut theatre, command.trim())? {
                            break;
                        }
                    }
                    None => stdin_open = false,
                }
            }
            _ = &mut ctrl_c => {
                tracing::debug!("interrupted");
                break;
            }
        }
    }

    Ok(())
}

/// Apply one stdin command. Returns `false` to quit.
fn apply_command(theatre: &mut CliTheatre, command: &str) -> Result<bool, Box<dyn std::error::Error>> {
    let events = match command {
        "p" => match theatre.timer().state() {
            TimerState::Running => theatre.pause().into_iter().collect(),
            TimerState::Idle | TimerState::Paused => theatre.start(),
        },
        "c" => theatre.cancel(),
        "v" => theatre.handle(Input::VisibilityRestored),
        "q" => return Ok(false),
        "" => Vec::new(),
        other => {
            eprintln!("unknown command '{other}' (p: pause/resume, c: cancel, v: resync, q: quit)");
            Vec::new()
        }
    };
    session::emit(theatre, &events)?;
    Ok(true)
}
