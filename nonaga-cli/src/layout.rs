//! Layout command - print a fresh game as clients receive it

use anyhow::{Context, Result};
use clap::Args;

use nonaga_core::GameState;

#[derive(Args)]
pub struct LayoutArgs {
    /// Player id for the host seat
    #[arg(long, default_value = "host")]
    pub host: String,

    /// Single-line JSON
    #[arg(long)]
    pub compact: bool,
}

/// Print the starting `GameState`. The seed only decides the host's color.
pub fn run(args: LayoutArgs, seed: Option<u64>) -> Result<()> {
    let mut rng = crate::create_rng(seed);
    let state = GameState::start(args.host, &mut rng);

    let json = if args.compact {
        serde_json::to_string(&state)
    } else {
        serde_json::to_string_pretty(&state)
    }
    .context("Failed to serialize the starting position")?;

    println!("{json}");
    Ok(())
}
