//! NONAGA Arena - AI self-play and engine probes
//!
//! This crate provides batch play on top of the rules engine:
//! - Seeded AI-vs-AI games through the real state machine
//! - Match aggregation, sequential or on the rayon pool
//! - A random-playout probe for stuck or invalid positions
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run_match, probe_stalemates (orchestration)
//! - Level 2: play_match, play_match_parallel (phases)
//! - Level 3: play_game, play_from, aggregate_results (steps)
//! - Level 4: utilities, configuration

mod config;
mod game_runner;
mod match_play;
mod probe;

pub use config::ArenaConfig;
pub use game_runner::{play_from, play_game, EndReason, GameOutcome, GUEST, HOST};
pub use match_play::{play_match, play_match_parallel, run_match, MatchResult};
pub use probe::{probe_stalemates, ProbeReport, Stalemate, Violation};
