use chrono::Utc;
use rosegun_core::storage::Database;
use serde_json::json;

pub fn run(recent: Option<usize>) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let stats = db.stats(Utc::now())?;

    match recent {
        Some(limit) => {
            let sessions = db.recent_sessions(limit)?;
            let out = json!({ "stats": stats, "recent": sessions });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        None => println!("{}", serde_json::to_string_pretty(&stats)?),
    }
    Ok(())
}
