//! Probe command - random playouts looking for stuck or broken positions
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: report_text(), report_json()
//! - Level 3-4: formatting utilities

use anyhow::{bail, Result};
use clap::Args;
use rand::Rng;

use nonaga_arena::{probe_stalemates, ProbeReport};

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct ProbeArgs {
    /// Number of random playouts
    #[arg(long, default_value = "1000")]
    pub games: usize,

    /// Full turns per playout before giving up on it
    #[arg(long, default_value = "200")]
    pub max_turns: u32,

    /// Output the full report as JSON
    #[arg(long)]
    pub json: bool,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run probe command. Fails when any playout reached an invalid position.
pub fn run(args: ProbeArgs, seed: Option<u64>) -> Result<()> {
    let seed = seed.unwrap_or_else(|| crate::create_rng(None).gen());
    tracing::info!(
        "Probing {} random games from seed {} (max {} turns)",
        args.games,
        seed,
        args.max_turns
    );

    let report = probe_stalemates(args.games, seed, args.max_turns);

    if args.json {
        report_json(&report)?;
    } else {
        report_text(&report, seed);
    }

    if !report.violations.is_empty() {
        bail!(
            "{} playouts reached an invalid position",
            report.violations.len()
        );
    }
    Ok(())
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

fn report_json(report: &ProbeReport) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}

fn report_text(report: &ProbeReport, seed: u64) {
    println!("\n=== Probe Results ===");
    println!("Seed:        {seed}");
    println!("Games:       {}", report.games);
    println!("Half-moves:  {}", report.half_moves);
    println!("Won:         {}", report.wins);
    println!("Turn cap:    {}", report.capped);
    println!("Stalemates:  {}", report.stalemates.len());
    println!("Violations:  {}", report.violations.len());

    for stalemate in &report.stalemates {
        println!(
            "  stuck: seed {} half-move {} ({} in {:?})",
            stalemate.seed, stalemate.half_move, stalemate.color, stalemate.phase
        );
    }
    for violation in &report.violations {
        println!(
            "  invalid: seed {} half-move {}: {}",
            violation.seed, violation.half_move, violation.reason
        );
    }

    if report.is_clean() {
        println!("No stuck or invalid positions found.");
    }
}
