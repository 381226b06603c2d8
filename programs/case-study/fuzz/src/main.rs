//! Fuzz test runner for the case study codec and validation model
//!
//! Run with: cargo run --release -p dbc-case-study-fuzz --bin fuzz_all
//! Or: cargo test -p dbc-case-study-fuzz (for property-based tests)

use dbc_case_study::{decode, encode, ConsensusRule};
use dbc_case_study_fuzz::*;
use proptest::prelude::*;
use proptest::strategy::ValueTree;
use proptest::test_runner::TestRunner;
use std::time::Instant;

fn main() {
    println!("=== Case Study Fuzz Testing ===\n");

    let start = Instant::now();
    let mut total_tests = 0;
    let mut passed = 0;
    let mut failed = 0;

    let targets: [(&str, fn(usize) -> (usize, usize)); 5] = [
        ("codec round trip", run_round_trip_fuzz),
        ("truncation", run_truncation_fuzz),
        ("byte corruption", run_corruption_fuzz),
        ("validator votes", run_vote_sequence_fuzz),
        ("attention token", run_create_token_fuzz),
    ];

    for (name, run) in targets {
        println!("Running {name} fuzz tests...");
        let (p, f) = run(200);
        passed += p;
        failed += f;
        total_tests += p + f;
    }

    let duration = start.elapsed();

    println!("\n=== Fuzz Testing Complete ===");
    println!("Total tests: {}", total_tests);
    println!("Passed: {}", passed);
    println!("Failed: {}", failed);
    println!("Duration: {:?}", duration);

    if failed > 0 {
        std::process::exit(1);
    }
}

/// Draw one value from a strategy
fn generate<S: Strategy>(strategy: &S, runner: &mut TestRunner, name: &str) -> S::Value {
    strategy
        .new_tree(runner)
        .unwrap_or_else(|reason| panic!("Failed to generate {name}: {reason}"))
        .current()
}

fn run_round_trip_fuzz(iterations: usize) -> (usize, usize) {
    let mut passed = 0;
    let mut failed = 0;
    let mut runner = TestRunner::default();
    let strategy = arb_record();

    for i in 0..iterations {
        let record = generate(&strategy, &mut runner, "CaseStudyRecord");
        match check_round_trip(&record) {
            CodecInvariantResult::Valid => passed += 1,
            violation => {
                println!("  [FAIL] Iteration {}: {:?}", i, violation);
                failed += 1;
            }
        }
    }

    println!("  round trip: {} passed, {} failed", passed, failed);
    (passed, failed)
}

fn run_truncation_fuzz(iterations: usize) -> (usize, usize) {
    let mut passed = 0;
    let mut failed = 0;
    let mut runner = TestRunner::default();
    let strategy = (arb_record(), any::<prop::sample::Index>());

    for i in 0..iterations {
        let (record, cut) = generate(&strategy, &mut runner, "truncation input");
        let Ok(encoded) = encode(&record) else {
            println!("  [FAIL] Iteration {}: encode rejected a generated record", i);
            failed += 1;
            continue;
        };
        match check_truncation(&encoded, cut.index(encoded.len())) {
            CodecInvariantResult::Valid => passed += 1,
            violation => {
                println!("  [FAIL] Iteration {}: {:?}", i, violation);
                failed += 1;
            }
        }
    }

    println!("  truncation: {} passed, {} failed", passed, failed);
    (passed, failed)
}

fn run_corruption_fuzz(iterations: usize) -> (usize, usize) {
    let mut passed = 0;
    let mut failed = 0;
    let mut runner = TestRunner::default();
    let strategy = (arb_record(), arb_byte_corruption());

    for i in 0..iterations {
        let (record, corruption) = generate(&strategy, &mut runner, "corruption input");
        let Ok(mut encoded) = encode(&record) else {
            failed += 1;
            continue;
        };
        let at = corruption.position.index(encoded.len());
        encoded[at] = corruption.value;

        // Either outcome is fine; an error must point inside the buffer
        match decode(&encoded) {
            Err(err) if err.offset() > encoded.len() => {
                println!("  [FAIL] Iteration {}: offset past buffer: {}", i, err);
                failed += 1;
            }
            _ => passed += 1,
        }
    }

    println!("  byte corruption: {} passed, {} failed", passed, failed);
    (passed, failed)
}

fn run_vote_sequence_fuzz(iterations: usize) -> (usize, usize) {
    let mut passed = 0;
    let mut failed = 0;
    let mut runner = TestRunner::default();
    let rule = ConsensusRule::default();

    for i in 0..iterations {
        let input = generate(&any::<VoteSequenceInput>(), &mut runner, "VoteSequenceInput");
        let mut record = input.record.clone();
        let mut violation = None;

        for (n, vote) in input.votes.iter().enumerate() {
            if input.pause_before == Some(n) {
                simulate_agent_pause(&mut record, input.risk_score);
            }
            let result = simulate_validator_vote(&mut record, vote.tier, vote.kind, &rule);
            if result.is_invariant_violation() {
                violation = Some(result);
                break;
            }
        }

        match violation {
            Some(result) => {
                println!("  [FAIL] Iteration {}: {:?}", i, result);
                failed += 1;
            }
            None => passed += 1,
        }
    }

    println!("  validator votes: {} passed, {} failed", passed, failed);
    (passed, failed)
}

fn run_create_token_fuzz(iterations: usize) -> (usize, usize) {
    let mut passed = 0;
    let mut failed = 0;
    let mut runner = TestRunner::default();

    for i in 0..iterations {
        let input = generate(&any::<CreateTokenInput>(), &mut runner, "CreateTokenInput");
        let mut record = input.record.clone();

        let result = simulate_create_attention_token(
            &mut record,
            &input.thresholds,
            input.mint,
            input.current_timestamp,
        );

        if result.is_invariant_violation() {
            println!("  [FAIL] Iteration {}: {:?}", i, result);
            failed += 1;
        } else {
            passed += 1;
        }
    }

    println!("  attention token: {} passed, {} failed", passed, failed);
    (passed, failed)
}
