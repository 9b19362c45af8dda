//! Opening the controller over the on-disk store, and reporting what it did.

use rosegun_core::{Catalog, Config, Database, Event, Input, SystemClock, Theatre, WakeLock};

use crate::wake_lock;

pub type CliTheatre = Theatre<SystemClock, Database, Box<dyn WakeLock>>;

/// Boot the controller for a one-shot command.
///
/// One-shot commands exit right away, so they never hold the stay-awake hint.
pub fn open() -> Result<(CliTheatre, Config), Box<dyn std::error::Error>> {
    open_with(Config::load_or_default(), wake_lock::disabled())
}

/// Boot the controller and reconcile the countdown with the wall clock.
pub fn open_with(
    config: Config,
    wake_lock: Box<dyn WakeLock>,
) -> Result<(CliTheatre, Config), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let (mut theatre, mut events) = Theatre::boot(
        SystemClock,
        db,
        wake_lock,
        Catalog::builtin(),
        config.notices.clone(),
    );
    events.extend(theatre.handle(Input::VisibilityRestored));
    for event in &events {
        tracing::info!(?event, "boot");
    }
    record_sessions(&theatre, &events);
    Ok((theatre, config))
}

/// Record completed sessions and print every event as one JSON line.
pub fn emit(theatre: &CliTheatre, events: &[Event]) -> Result<(), Box<dyn std::error::Error>> {
    record_sessions(theatre, events);
    for event in events {
        println!("{}", serde_json::to_string(event)?);
    }
    Ok(())
}

/// Append completed sessions to the history. The reward has already been
/// applied, so a failed insert only costs the statistics.
pub fn record_sessions(theatre: &CliTheatre, events: &[Event]) {
    for event in events {
        if let Event::SessionCompleted {
            chapter_id,
            chapter_title,
            duration_secs,
            started_at,
            completed_at,
        } = event
        {
            if let Err(e) = theatre.store().record_session(
                *chapter_id,
                chapter_title,
                *duration_secs,
                *started_at,
                *completed_at,
            ) {
                tracing::warn!(error = %e, "failed to record session");
            }
        }
    }
}
