use rosegun_core::timer::parse_minutes;

use super::session;

/// Print the status read model as JSON.
pub fn status() -> Result<(), Box<dyn std::error::Error>> {
    let (theatre, _config) = session::open()?;
    println!("{}", serde_json::to_string_pretty(&theatre.status())?);
    Ok(())
}

pub fn start() -> Result<(), Box<dyn std::error::Error>> {
    let (mut theatre, _config) = session::open()?;
    let events = theatre.start();
    if events.is_empty() {
        return Err("timer is already running".into());
    }
    session::emit(&theatre, &events)
}

pub fn pause() -> Result<(), Box<dyn std::error::Error>> {
    let (mut theatre, _config) = session::open()?;
    let Some(event) = theatre.pause() else {
        return Err("timer is not running".into());
    };
    session::emit(&theatre, &[event])
}

pub fn cancel() -> Result<(), Box<dyn std::error::Error>> {
    let (mut theatre, _config) = session::open()?;
    let events = theatre.cancel();
    session::emit(&theatre, &events)
}

pub fn duration(raw: &str) -> Result<(), Box<dyn std::error::Error>> {
    let Some(minutes) = parse_minutes(raw) else {
        return Err(format!("invalid duration '{raw}': expected a positive number of minutes").into());
    };
    let (mut theatre, _config) = session::open()?;
    let Some(event) = theatre.set_duration(minutes) else {
        return Err("cannot change the duration while the timer is running".into());
    };
    session::emit(&theatre, &[event])
}
