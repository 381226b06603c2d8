//! Fuzz target for validator voting and the weighted consensus rule
//!
//! Tests invariants:
//! - every status change is an allowed transition
//! - reputation stays within 0-100 and matches the counters
//! - a verdict is only reached with at least five weighted votes
//! - a paused record takes no further votes
//!
//! Run with: cargo test --release -p dbc-case-study-fuzz validator_votes

use crate::*;
use dbc_case_study::{
    classify_status, decode, encode, expected_status, is_open_for_validation, CaseStudyRecord,
    ConsensusRule, DisplayStatus, Pubkey, TreatmentCategory, ValidationStatus,
};
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn fuzz_vote_sequence(input in any::<VoteSequenceInput>()) {
        let rule = ConsensusRule::default();
        let mut record = input.record.clone();

        for (i, vote) in input.votes.iter().enumerate() {
            if input.pause_before == Some(i) {
                let paused = simulate_agent_pause(&mut record, input.risk_score);
                prop_assert!(!paused.is_invariant_violation(), "{:?}", paused);
            }

            let before = record.clone();
            let result = simulate_validator_vote(&mut record, vote.tier, vote.kind, &rule);
            prop_assert!(!result.is_invariant_violation(),
                "Invariant violation at vote {}: {:?}\nInput: {:?}", i, result, input);

            if before.is_paused {
                prop_assert!(result.is_error());
            }
            prop_assert_eq!(
                check_paused_record_unchanged(&before, &record),
                StatusInvariantResult::Valid
            );

            if before.validation_status.is_decided() {
                prop_assert!(record.validation_status.is_decided(),
                    "decided record reopened: {:?} -> {:?}",
                    before.validation_status, record.validation_status);
            }
        }

        prop_assert!(record.reputation_in_range());
        prop_assert!(!record.is_paused || !is_open_for_validation(&record));

        // Every state the program can reach is representable on the wire
        prop_assert_eq!(check_round_trip(&record), CodecInvariantResult::Valid);
        prop_assert_eq!(decode(&encode(&record).unwrap()).unwrap(), record);
    }

    #[test]
    fn fuzz_consensus_requires_quorum(
        approvals in 0u32..5,
        rejections in 0u32..5,
    ) {
        prop_assume!(approvals + rejections < 5);
        let rule = ConsensusRule::default();
        let mut record = fresh_record();
        record.approval_count = approvals;
        record.rejection_count = rejections;
        prop_assert_eq!(expected_status(&record, &rule), None);
    }

    #[test]
    fn fuzz_unanimous_platinum_approval(count in 1usize..10) {
        let rule = ConsensusRule::default();
        let mut record = fresh_record();
        for _ in 0..count {
            let result = simulate_validator_vote(
                &mut record,
                ValidatorTier::Platinum,
                VoteKind::Approve,
                &rule,
            );
            prop_assert!(result.is_success());
        }
        prop_assert_eq!(record.reputation_score, 100);
        prop_assert_eq!(record.validation_status, ValidationStatus::Approved);
        prop_assert_eq!(classify_status(&record), DisplayStatus::Approved);
    }
}

fn fresh_record() -> CaseStudyRecord {
    CaseStudyRecord {
        ephemeral_id: Pubkey::new_from_array([5; 32]),
        submitter: Pubkey::new_from_array([6; 32]),
        ipfs_cid: SAMPLE_CIDV0.to_string(),
        metadata_hash: [0; 32],
        treatment_category: TreatmentCategory::Surgical,
        duration_days: 180,
        created_at: 1_750_000_000,
        validation_status: ValidationStatus::Pending,
        approval_count: 0,
        rejection_count: 0,
        reputation_score: 0,
        is_paused: false,
        threshold_shares_required: 3,
        light_proof_hash: [0; 32],
        compression_ratio: 12,
        attention_token: None,
        bump: 253,
    }
}
