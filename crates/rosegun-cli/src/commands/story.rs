use rosegun_core::progression;
use rosegun_core::Screen;
use serde_json::json;

use super::session;

/// Read the current chapter, or finish reading it and start its session.
pub fn story(done: bool) -> Result<(), Box<dyn std::error::Error>> {
    let (mut theatre, _config) = session::open()?;

    if done {
        // A one-shot process cannot hold an idle timer screen open, and a
        // persisted TIMER screen with no countdown reads as an interruption
        // on the next launch. Start the session right away.
        let mut events: Vec<_> = theatre.finish_story().into_iter().collect();
        events.extend(theatre.start());
        return session::emit(&theatre, &events);
    }

    if let Some(event) = theatre.begin_chapter() {
        tracing::info!(?event, "story");
    }
    let chapter = theatre.chapter();
    println!("Chapter {}: {}", chapter.id, chapter.title);
    println!();
    for line in chapter.lines {
        println!("{}: {}", line.speaker.label(), line.text);
    }
    println!();
    println!("Focus: {} ({} min)", chapter.focus_title, chapter.focus_minutes);
    println!("{}", chapter.focus_description);
    Ok(())
}

pub fn contents(as_json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let (mut theatre, _config) = session::open()?;
    if let Some(event) = theatre.go_to(Screen::Contents) {
        tracing::info!(?event, "contents");
    }
    let current = theatre.chapter_index();
    let chapters = theatre.catalog().chapters();

    if as_json {
        let list: Vec<_> = chapters
            .iter()
            .enumerate()
            .map(|(i, c)| {
                json!({
                    "id": c.id,
                    "title": c.title,
                    "focus_minutes": c.focus_minutes,
                    "current": i == current,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&list)?);
        return Ok(());
    }

    for (i, chapter) in chapters.iter().enumerate() {
        let marker = if i == current { ">" } else { " " };
        println!(
            "{marker} {:>2}. {:<32} {:>3} min",
            chapter.id, chapter.title, chapter.focus_minutes
        );
    }
    Ok(())
}

/// Jump to a chapter by its 1-based number.
pub fn select(number: u32) -> Result<(), Box<dyn std::error::Error>> {
    let (mut theatre, _config) = session::open()?;
    let index = usize::try_from(number.saturating_sub(1))?;
    let events = theatre.select_chapter(index);
    session::emit(&theatre, &events)
}

pub fn archives(as_json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let (mut theatre, _config) = session::open()?;
    if let Some(event) = theatre.go_to(Screen::Archives) {
        tracing::info!(?event, "archives");
    }
    let focus_sessions = theatre.progress().focus_sessions();
    let catalog = theatre.catalog();
    let archive = catalog.archive();

    if as_json {
        let memories: Vec<_> = catalog
            .memories()
            .iter()
            .map(|m| {
                let unlocked = theatre.is_memory_unlocked(m);
                let content = unlocked.then_some(m.content);
                json!({
                    "id": m.id,
                    "title": m.title,
                    "unlocked": unlocked,
                    "content": content,
                    "unlock_threshold": m.unlock_threshold,
                })
            })
            .collect();
        let out = json!({
            "rank": theatre.progress().rank(),
            "rank_title": theatre.rank_title(),
            "focus_sessions": focus_sessions,
            "chronicle": archive.chronicle,
            "figures": archive.figures,
            "memories": memories,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!("{}", archive.chronicle);
    println!();
    for figure in &archive.figures {
        println!("{} ({})", figure.name, figure.role);
        println!("  {}", figure.description);
    }
    println!();
    println!(
        "Rank {} - {} ({} sessions)",
        theatre.progress().rank(),
        theatre.rank_title(),
        focus_sessions
    );
    for memory in catalog.memories() {
        if theatre.is_memory_unlocked(memory) {
            println!("[open] {}: {}", memory.title, memory.content);
        } else {
            println!(
                "[sealed] {} (needs {} sessions)",
                memory.title, memory.unlock_threshold
            );
        }
    }
    if let Some((memory, remaining)) = progression::next_memory(catalog, focus_sessions) {
        println!();
        println!("{remaining} more session(s) until \"{}\".", memory.title);
    }
    Ok(())
}

pub fn goto(raw: &str) -> Result<(), Box<dyn std::error::Error>> {
    let screen: Screen = raw.parse()?;
    let (mut theatre, _config) = session::open()?;
    let events: Vec<_> = theatre.go_to(screen).into_iter().collect();
    session::emit(&theatre, &events)
}
