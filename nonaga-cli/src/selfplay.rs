//! Selfplay command - AI-vs-AI matches
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: build_config(), play_batches(), report_results()
//! - Level 3: progress bar setup
//! - Level 4: formatting utilities

use std::path::PathBuf;

use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use rand::Rng;
use serde::Serialize;

use nonaga_arena::{run_match, ArenaConfig, EndReason, MatchResult};
use nonaga_core::Color;

/// Games handed to the arena at a time, between progress updates
const BATCH: usize = 16;

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct SelfplayArgs {
    /// Number of games to play
    #[arg(long, default_value = "100")]
    pub games: usize,

    /// Run games on all cores
    #[arg(long)]
    pub parallel: bool,

    /// Full turns before a game is called unfinished
    #[arg(long, default_value = "200")]
    pub max_turns: u32,

    /// AI weights JSON file, for both sides
    #[arg(long, value_name = "FILE")]
    pub weights: Option<PathBuf>,

    /// Separate weights for blue, to pit two weight sets against each other
    #[arg(long, value_name = "FILE")]
    pub blue_weights: Option<PathBuf>,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run selfplay command
///
/// 1. Build the arena config (weights, seed, turn cap)
/// 2. Play the games in batches, ticking a progress bar
/// 3. Report results
pub fn run(args: SelfplayArgs, seed: Option<u64>) -> Result<()> {
    let config = build_config(&args, seed)?;

    tracing::info!(
        "Starting selfplay: {} games, seed {}, max {} turns{}",
        config.games,
        config.seed,
        config.max_turns,
        if config.parallel { ", parallel" } else { "" }
    );

    let started = Utc::now();
    let result = play_batches(&config, !args.json);
    report_results(&result, &config, started, args.json)
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

fn build_config(args: &SelfplayArgs, seed: Option<u64>) -> Result<ArenaConfig> {
    let seed = seed.unwrap_or_else(|| crate::create_rng(None).gen());
    let heuristics = crate::load_heuristics(args.weights.as_deref())?;

    let mut config = ArenaConfig::new(args.games)
        .with_seed(seed)
        .with_parallel(args.parallel)
        .with_max_turns(args.max_turns)
        .with_heuristics(heuristics);
    if let Some(path) = &args.blue_weights {
        config = config.with_side(Color::Blue, crate::load_heuristics(Some(path))?);
    }
    Ok(config)
}

/// Play the match a batch at a time. Batch `k` starts at seed
/// `seed + k * BATCH`, so the games are the same as one big match.
fn play_batches(config: &ArenaConfig, show_progress: bool) -> MatchResult {
    let progress = create_progress_bar(config.games as u64, show_progress);
    let mut result = MatchResult::empty();

    let mut offset = 0;
    while offset < config.games {
        let games = BATCH.min(config.games - offset);
        let batch = ArenaConfig {
            games,
            seed: config.seed.wrapping_add(offset as u64),
            ..config.clone()
        };
        result = result.combine(&run_match(&batch));
        offset += games;

        progress.inc(games as u64);
        progress.set_message(format!(
            "red {} / blue {}",
            result.red_wins, result.blue_wins
        ));
    }

    progress.finish_and_clear();
    result
}

fn report_results(
    result: &MatchResult,
    config: &ArenaConfig,
    started: DateTime<Utc>,
    json: bool,
) -> Result<()> {
    if json {
        print_json_results(result, config, started)
    } else {
        print_text_results(result, config, started);
        Ok(())
    }
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

fn create_progress_bar(len: u64, visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(len);
    if let Ok(style) =
        ProgressStyle::with_template("{bar:40} {pos}/{len} games [{elapsed_precise}] {msg}")
    {
        bar.set_style(style);
    }
    bar
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

/// Print results as JSON
fn print_json_results(
    result: &MatchResult,
    config: &ArenaConfig,
    started: DateTime<Utc>,
) -> Result<()> {
    #[derive(Serialize)]
    struct JsonGame {
        seed: u64,
        winner: Option<Color>,
        reason: EndReason,
        turns: u32,
    }

    #[derive(Serialize)]
    struct JsonOutput<'a> {
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
        config: &'a ArenaConfig,
        games_played: u32,
        red_wins: u32,
        blue_wins: u32,
        stalls: u32,
        unfinished: u32,
        avg_turns: f32,
        red_win_rate: f32,
        games: Vec<JsonGame>,
    }

    let output = JsonOutput {
        started_at: started,
        finished_at: Utc::now(),
        config,
        games_played: result.games_played,
        red_wins: result.red_wins,
        blue_wins: result.blue_wins,
        stalls: result.stalls,
        unfinished: result.unfinished,
        avg_turns: result.avg_turns,
        red_win_rate: result.red_win_rate(),
        games: result
            .game_outcomes
            .iter()
            .map(|g| JsonGame {
                seed: g.seed,
                winner: g.winner,
                reason: g.reason,
                turns: g.turns,
            })
            .collect(),
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

/// Print results as text
fn print_text_results(result: &MatchResult, config: &ArenaConfig, started: DateTime<Utc>) {
    let elapsed = Utc::now() - started;

    println!("\n=== Selfplay Results ===");
    println!("Seed:        {}", config.seed);
    println!("Total games: {}", result.games_played);
    println!(
        "Red wins:    {} ({:.1}%)",
        result.red_wins,
        result.red_win_rate() * 100.0
    );
    println!(
        "Blue wins:   {} ({:.1}%)",
        result.blue_wins,
        result.blue_win_rate() * 100.0
    );
    println!(
        "Undecided:   {} ({:.1}%), {} at the turn cap, {} stalled",
        result.stalls + result.unfinished,
        result.undecided_rate() * 100.0,
        result.unfinished,
        result.stalls
    );
    println!("Avg length:  {:.1} turns", result.avg_turns);
    println!("Time:        {:.1}s", elapsed.num_milliseconds() as f64 / 1000.0);

    if result.stalls > 0 {
        let seeds: Vec<String> = result
            .game_outcomes
            .iter()
            .filter(|g| g.is_stalled())
            .map(|g| g.seed.to_string())
            .collect();
        println!("Stalled seeds: {}", seeds.join(", "));
    }
}
