//! Fuzz target for attention token eligibility
//!
//! Tests invariants:
//! - the verdict is the conjunction of its three reasons
//! - an existing token always blocks eligibility
//! - raising a threshold never turns an ineligible record eligible
//! - token creation happens at most once per record
//!
//! Run with: cargo test --release -p dbc-case-study-fuzz eligibility

use crate::*;
use dbc_case_study::{compute_eligibility, EligibilityThresholds, Requirement};
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(1000))]

    #[test]
    fn fuzz_eligibility_invariants(record in arb_record(), thresholds in arb_thresholds()) {
        let result = check_eligibility(&record, &thresholds);
        prop_assert_eq!(result, EligibilityInvariantResult::Valid, "record: {:?}", record);
    }

    /// Reputation 80 with 6 approvals clears the default thresholds whatever
    /// the rest of the record holds
    #[test]
    fn fuzz_eligible_scenario(mut record in arb_record()) {
        record.reputation_score = 80;
        record.approval_count = 6;
        record.attention_token = None;

        let result = compute_eligibility(&record, &EligibilityThresholds::default());
        prop_assert!(result.is_eligible);
        prop_assert_eq!(result.reasons.reputation_score, Requirement { current: 80, required: 75, met: true });
        prop_assert_eq!(result.reasons.validator_count, Requirement { current: 6, required: 5, met: true });
    }

    #[test]
    fn fuzz_low_reputation_scenario(mut record in arb_record()) {
        record.reputation_score = 50;
        record.approval_count = 6;

        let result = compute_eligibility(&record, &EligibilityThresholds::default());
        prop_assert!(!result.is_eligible);
        prop_assert!(!result.reasons.reputation_score.met);
        prop_assert!(result.reasons.validator_count.met);
    }

    #[test]
    fn fuzz_existing_token_blocks(
        mut record in arb_record(),
        thresholds in arb_thresholds(),
        token in arb_attention_token(),
    ) {
        prop_assume!(token.is_some());
        record.attention_token = token;
        let result = compute_eligibility(&record, &thresholds);
        prop_assert!(!result.is_eligible);
        prop_assert!(result.reasons.has_existing_token);
    }

    #[test]
    fn fuzz_thresholds_are_monotonic(
        record in arb_record(),
        thresholds in arb_thresholds(),
        raise_score in any::<u8>(),
        raise_count in any::<u32>(),
    ) {
        let stricter = EligibilityThresholds {
            min_reputation_score: thresholds.min_reputation_score.saturating_add(raise_score),
            min_validator_count: thresholds.min_validator_count.saturating_add(raise_count),
        };
        if compute_eligibility(&record, &stricter).is_eligible {
            prop_assert!(compute_eligibility(&record, &thresholds).is_eligible);
        }
    }

    #[test]
    fn fuzz_create_attention_token(input in any::<CreateTokenInput>()) {
        let mut record = input.record.clone();
        let was_eligible = compute_eligibility(&record, &input.thresholds).is_eligible;

        let result = simulate_create_attention_token(
            &mut record,
            &input.thresholds,
            input.mint,
            input.current_timestamp,
        );
        prop_assert!(!result.is_invariant_violation(), "{:?}\nInput: {:?}", result, input);
        prop_assert_eq!(result.is_success(), was_eligible);

        if result.is_success() {
            let again = simulate_create_attention_token(
                &mut record,
                &input.thresholds,
                input.mint,
                input.current_timestamp,
            );
            prop_assert!(again.is_error());
        } else {
            prop_assert_eq!(&record, &input.record);
        }
    }
}
