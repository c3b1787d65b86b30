//! Integration tests for the NONAGA tools
//!
//! Tests the full stack: rules engine, AI, session store and arena

use nonaga_arena::{run_match, ArenaConfig, EndReason};
use nonaga_core::{
    initial_board, Color, GameState, HeuristicAI, Heuristics, MoveRequest, Phase, Status,
};
use nonaga_session::{Session, SessionStore, StoreError};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::time::Instant;

// ============================================================================
// TEST FIXTURES
// ============================================================================

/// A store holding one game with both seats filled
fn seated_game(seed: u64) -> (SessionStore, Session) {
    let store = SessionStore::new();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let created = store.create("alice", &mut rng);
    let joined = store.join(&created.id, created.version, "bob").unwrap();
    (store, joined)
}

/// Next AI request for whoever is to move
fn ai_request(ai: &mut HeuristicAI, state: &GameState) -> MoveRequest {
    let actor = state.player_for(state.turn()).unwrap().to_string();
    ai.next_move(state).unwrap().into_request(actor)
}

// ============================================================================
// SESSION + AI TESTS
// ============================================================================

#[test]
fn test_ai_game_through_store() {
    let (store, mut session) = seated_game(11);
    let mut ai = HeuristicAI::with_seed(Heuristics::default(), 11);

    for _ in 0..60 {
        if session.state.is_terminal() {
            break;
        }
        let request = ai_request(&mut ai, &session.state);
        let (next, motion) = store.submit(&session.id, session.version, &request).unwrap();

        assert_eq!(next.version, session.version + 1);
        assert_eq!(motion.to, request.destination());
        assert!(next.last_move_at.is_some());
        next.state.check_invariants().unwrap();
        session = next;
    }

    assert_eq!(session.state.board().len(), initial_board().len());
    if session.state.status() == Status::Finished {
        assert!(session.state.victory_line().is_some());
    } else {
        assert_eq!(session.state.status(), Status::Playing);
    }
}

#[test]
fn test_snapshot_resumes_game() {
    let (store, session) = seated_game(4);
    let mut ai = HeuristicAI::with_seed(Heuristics::default(), 4);

    let request = ai_request(&mut ai, &session.state);
    let (session, _) = store.submit(&session.id, session.version, &request).unwrap();
    assert_eq!(session.state.phase(), Phase::RelocateTile);

    // Reload into a fresh store and carry on from the snapshot
    let restored = Session::from_json(&session.to_json().unwrap()).unwrap();
    assert_eq!(restored, session);

    let fresh = SessionStore::new();
    fresh.restore(restored);
    let request = ai_request(&mut ai, &session.state);
    let (after, _) = fresh.submit(&session.id, session.version, &request).unwrap();
    assert_eq!(after.state.phase(), Phase::SlidePiece);
    assert_eq!(after.state.turn(), session.state.turn().opponent());
}

#[test]
fn test_stale_client_is_refused() {
    let (store, session) = seated_game(2);
    let mut ai = HeuristicAI::with_seed(Heuristics::default(), 2);
    let request = ai_request(&mut ai, &session.state);

    store.submit(&session.id, session.version, &request).unwrap();
    let err = store
        .submit(&session.id, session.version, &request)
        .unwrap_err();

    assert!(matches!(err, StoreError::VersionConflict { .. }));
    assert!(err.is_retryable());
}

#[test]
fn test_abandon_then_rematch() {
    let (store, session) = seated_game(6);
    let quitter_color = session.state.color_of("bob").unwrap();

    let session = store.abandon(&session.id, session.version, "bob").unwrap();
    assert_eq!(session.state.status(), Status::Abandoned);
    assert_eq!(session.state.winner(), Some(quitter_color.opponent()));

    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let session = store
        .rematch(&session.id, session.version, "alice", &mut rng)
        .unwrap();
    assert_eq!(session.state.status(), Status::Playing);
    assert_eq!(session.state.guest(), Some("bob"));
    assert!(session.state.winner().is_none());
}

// ============================================================================
// WEIGHTS FILE TESTS
// ============================================================================

#[test]
fn test_weights_file_round_trip() {
    let path = std::env::temp_dir().join(format!("nonaga-weights-{}.json", std::process::id()));
    let weights = Heuristics {
        pair_weight: 750.0,
        jitter: 0.0,
        ..Heuristics::default()
    };

    weights.save(&path).unwrap();
    let loaded = Heuristics::load(&path).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(loaded.pair_weight, 750.0);
    assert_eq!(loaded.jitter, 0.0);
    assert_eq!(loaded.win_score, Heuristics::default().win_score);
}

#[test]
fn test_partial_weights_use_defaults() {
    let loaded: Heuristics = serde_json::from_str(r#"{"spread_weight": 1.5}"#).unwrap();
    assert_eq!(loaded.spread_weight, 1.5);
    assert_eq!(loaded.kidnap_bonus, Heuristics::default().kidnap_bonus);
}

// ============================================================================
// ARENA TESTS
// ============================================================================

#[test]
fn test_batched_match_equals_single_match() {
    let whole = ArenaConfig::new(6).with_seed(30).with_max_turns(15);
    let single = run_match(&whole);

    let first = run_match(&ArenaConfig {
        games: 4,
        ..whole.clone()
    });
    let second = run_match(&ArenaConfig {
        games: 2,
        seed: 34,
        ..whole.clone()
    });
    let batched = first.combine(&second);

    assert_eq!(batched.games_played, single.games_played);
    assert_eq!(batched.red_wins, single.red_wins);
    assert_eq!(batched.blue_wins, single.blue_wins);
    let seeds: Vec<u64> = batched.game_outcomes.iter().map(|g| g.seed).collect();
    assert_eq!(seeds, vec![30, 31, 32, 33, 34, 35]);
}

#[test]
fn test_match_games_end_cleanly() {
    let result = run_match(&ArenaConfig::new(4).with_seed(1).with_max_turns(40));
    for outcome in &result.game_outcomes {
        outcome.final_state.check_invariants().unwrap();
        match outcome.reason {
            EndReason::Victory => assert!(matches!(
                outcome.winner,
                Some(Color::Red) | Some(Color::Blue)
            )),
            EndReason::TurnLimit => assert_eq!(outcome.turns, 40),
            EndReason::NoLegalMove => assert!(outcome.winner.is_none()),
        }
    }
}

// ============================================================================
// PERFORMANCE
// ============================================================================

#[test]
fn test_ai_move_performance() {
    let (_, session) = seated_game(8);
    let mut ai = HeuristicAI::with_seed(Heuristics::default(), 8);

    let start = Instant::now();
    let mut state = session.state;
    let mut half_moves = 0;
    while !state.is_terminal() && half_moves < 100 {
        let request = ai_request(&mut ai, &state);
        state = state.apply(&request).unwrap().state;
        half_moves += 1;
    }
    let elapsed = start.elapsed();

    println!(
        "{} AI half-moves in {:?} ({:?} each)",
        half_moves,
        elapsed,
        elapsed / half_moves.max(1)
    );
    assert!(half_moves > 0);
}
