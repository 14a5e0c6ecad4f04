use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "tomato-cli", version, about = "Tomato Universe CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Tomato set management
    Set {
        #[command(subcommand)]
        action: commands::set::SetAction,
    },
    /// Harvest counter
    Harvest {
        #[command(subcommand)]
        action: commands::harvest::HarvestAction,
    },
    /// Daily focus streak
    Streak {
        #[command(subcommand)]
        action: commands::streak::StreakAction,
    },
    /// To-do feed
    Todo {
        #[command(subcommand)]
        action: commands::todo::TodoAction,
    },
    /// Focus/break countdown
    Timer {
        #[command(subcommand)]
        action: commands::timer::TimerAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

/// Logs go to stderr so stdout stays machine-readable. Level comes from
/// `TOMATO_LOG` (e.g. `TOMATO_LOG=debug`), defaulting to warnings only.
fn init_tracing() {
    let filter = EnvFilter::try_from_env("TOMATO_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_tracing();
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Set { action } => commands::set::run(action),
        Commands::Harvest { action } => commands::harvest::run(action),
        Commands::Streak { action } => commands::streak::run(action),
        Commands::Todo { action } => commands::todo::run(action),
        Commands::Timer { action } => commands::timer::run(action),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
