use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod wake_lock;

#[derive(Parser)]
#[command(name = "rosegun", version, about = "Rose & Gun: a story told one focus session at a time")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the current state as JSON
    Status,
    /// Start a focus session, or resume a paused one
    Start,
    /// Pause the running session
    Pause,
    /// Give up the current session without reward
    Cancel,
    /// Override the session length for the current chapter
    Duration {
        /// Whole minutes, greater than zero
        minutes: String,
    },
    /// Read the current chapter
    Story {
        /// Finish reading and start the chapter's focus session
        #[arg(long)]
        done: bool,
    },
    /// List chapters
    Contents {
        #[arg(long)]
        json: bool,
    },
    /// Jump to a chapter and read it
    Select {
        /// Chapter number, starting at 1
        #[arg(value_parser = clap::value_parser!(u32).range(1..))]
        chapter: u32,
    },
    /// Show the chronicle, its figures and your memories
    Archives {
        #[arg(long)]
        json: bool,
    },
    /// Switch screens (intro, story, timer, archives, contents)
    Goto { screen: String },
    /// Run the countdown interactively (p: pause/resume, c: cancel, v: resync, q: quit)
    Watch,
    /// Completed session statistics
    Stats {
        /// Also list the most recent sessions
        #[arg(long)]
        recent: Option<usize>,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Generate shell completions
    Completions { shell: Shell },
}

fn init_logging() {
    let filter = EnvFilter::try_from_env("ROSEGUN_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging();

    let result = match cli.command {
        Commands::Status => commands::timer::status(),
        Commands::Start => commands::timer::start(),
        Commands::Pause => commands::timer::pause(),
        Commands::Cancel => commands::timer::cancel(),
        Commands::Duration { minutes } => commands::timer::duration(&minutes),
        Commands::Story { done } => commands::story::story(done),
        Commands::Contents { json } => commands::story::contents(json),
        Commands::Select { chapter } => commands::story::select(chapter),
        Commands::Archives { json } => commands::story::archives(json),
        Commands::Goto { screen } => commands::story::goto(&screen),
        Commands::Watch => commands::watch::run(),
        Commands::Stats { recent } => commands::stats::run(recent),
        Commands::Config { action } => commands::config::run(action),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "rosegun", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
