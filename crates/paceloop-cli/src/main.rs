use clap::{Parser, Subcommand};

mod commands;
mod term_cues;

#[derive(Parser)]
#[command(name = "paceloop", version, about = "Paceloop interval walking coach")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Walk session control
    Walk {
        #[command(subcommand)]
        action: commands::walk::WalkAction,
    },
    /// Session statistics
    Stats {
        #[command(subcommand)]
        action: commands::stats::StatsAction,
    },
    /// Recent walk history
    History {
        /// Maximum number of sessions to show
        #[arg(long, default_value = "10")]
        limit: u32,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Walk { action } => commands::walk::run(action),
        Commands::Stats { action } => commands::stats::run(action),
        Commands::History { limit } => commands::history::run(limit),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
