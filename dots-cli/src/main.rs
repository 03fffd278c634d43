//! Dots-and-Boxes CLI - Command-line interface
//!
//! Commands:
//! - play: Interactive game against the UCT engine (or another human)
//! - self-play: Engine vs engine games with aggregated results
//! - config: Write an engine configuration file

mod config_cmd;
mod engine_args;
mod input;
mod play_cmd;
mod render;
mod selfplay_cmd;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "dots")]
#[command(about = "Dots-and-Boxes with a UCT opponent")]
struct Cli {
    /// Random seed for the engines (overrides the config file)
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Log level used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play an interactive game
    Play(play_cmd::PlayArgs),
    /// Let the engine play against itself
    SelfPlay(selfplay_cmd::SelfPlayArgs),
    /// Write an engine configuration file
    Config(config_cmd::ConfigArgs),
}

fn init_tracing(level: &str) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    match cli.command {
        Commands::Play(args) => play_cmd::run(args, cli.seed),
        Commands::SelfPlay(args) => selfplay_cmd::run(args, cli.seed),
        Commands::Config(args) => config_cmd::run(args, cli.seed),
    }
}
