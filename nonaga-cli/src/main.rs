//! NONAGA CLI - Command-line interface
//!
//! Commands:
//! - play: Play a game on the terminal, against the AI or hot-seat
//! - selfplay: Run AI-vs-AI matches
//! - probe: Random playouts hunting for stuck or invalid positions
//! - layout: Print the starting position as JSON

use std::path::Path;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing_subscriber::EnvFilter;

use nonaga_core::Heuristics;

mod layout;
mod play;
mod probe;
mod selfplay;

#[derive(Parser)]
#[command(name = "nonaga")]
#[command(about = "NONAGA rules engine, AI and tools")]
struct Cli {
    /// Seed for reproducible runs
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Log filter, e.g. `debug` or `nonaga_core=trace` (overrides RUST_LOG)
    #[arg(long, global = true, value_name = "FILTER")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a game on the terminal
    Play(play::PlayArgs),
    /// Run AI-vs-AI games and report the results
    Selfplay(selfplay::SelfplayArgs),
    /// Random playouts that report stuck or invalid positions
    Probe(probe::ProbeArgs),
    /// Print the starting position as JSON
    Layout(layout::LayoutArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_level.as_deref())?;

    match cli.command {
        Commands::Play(args) => play::run(args, cli.seed),
        Commands::Selfplay(args) => selfplay::run(args, cli.seed),
        Commands::Probe(args) => probe::run(args, cli.seed),
        Commands::Layout(args) => layout::run(args, cli.seed),
    }
}

/// Logs go to stderr so JSON output on stdout stays clean
fn init_tracing(level: Option<&str>) -> Result<()> {
    let filter = match level {
        Some(directives) => EnvFilter::try_new(directives)
            .with_context(|| format!("Invalid log filter: {directives}"))?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

// ============================================================================
// SHARED UTILITIES (Level 4)
// ============================================================================

/// Create RNG from seed or random
pub(crate) fn create_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(s) => ChaCha8Rng::seed_from_u64(s),
        None => ChaCha8Rng::from_entropy(),
    }
}

/// AI weights from a JSON file, or the defaults
pub(crate) fn load_heuristics(path: Option<&Path>) -> Result<Heuristics> {
    match path {
        Some(path) => Heuristics::load(path)
            .with_context(|| format!("Failed to load weights: {}", path.display())),
        None => Ok(Heuristics::default()),
    }
}
