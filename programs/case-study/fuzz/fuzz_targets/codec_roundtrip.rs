//! Fuzz target for the record codec on well-formed records
//!
//! Tests invariants:
//! - encode then decode reproduces every field
//! - encoded length equals `account_size(cid_len, has_token)`
//! - unused account capacity after `bump` is ignored
//!
//! Run with: cargo test --release -p dbc-case-study-fuzz codec_roundtrip

use crate::*;
use dbc_case_study::{
    decode, decode_prefixed, decode_with, encode, encode_body, CaseStudyRecord, DecodeOptions,
};
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(1000))]

    #[test]
    fn fuzz_round_trip(record in arb_record()) {
        let result = check_round_trip(&record);
        prop_assert_eq!(result, CodecInvariantResult::Valid, "record: {:?}", record);
    }

    /// Accounts are allocated at full capacity; the zero tail is not part of
    /// the record
    #[test]
    fn fuzz_trailing_capacity_ignored(record in arb_record(), extra in 0usize..64) {
        let encoded = encode(&record).unwrap();
        let mut account = encoded.clone();
        account.resize(CaseStudyRecord::MAX_ACCOUNT_SIZE + extra, 0);

        let (decoded, consumed) = decode_prefixed(&account, &DecodeOptions::default()).unwrap();
        prop_assert_eq!(consumed, encoded.len());
        prop_assert_eq!(decoded, record);
    }

    /// The body decodes on its own when no prefix is expected
    #[test]
    fn fuzz_body_without_prefix(record in arb_record()) {
        let body = encode_body(&record).unwrap();
        prop_assert_eq!(body.len(), record.encoded_len());
        let decoded = decode_with(&body, &DecodeOptions::with_prefix_len(0)).unwrap();
        prop_assert_eq!(decoded, record);
    }

    /// Optional pair decodes to both present or both absent, never one
    #[test]
    fn fuzz_token_pair_co_occurs(record in arb_record()) {
        let decoded = decode(&encode(&record).unwrap()).unwrap();
        prop_assert_eq!(
            decoded.attention_token_mint().is_some(),
            decoded.attention_token_created_at().is_some()
        );
        prop_assert_eq!(decoded.has_attention_token(), record.has_attention_token());
    }

    /// Out-of-range reputation survives decode untouched
    #[test]
    fn fuzz_reputation_passthrough(mut record in arb_record(), score in any::<u8>()) {
        record.reputation_score = score;
        let decoded = decode(&encode(&record).unwrap()).unwrap();
        prop_assert_eq!(decoded.reputation_score, score);
        prop_assert_eq!(decoded.reputation_in_range(), score <= 100);
        prop_assert!(decoded.display_reputation() <= 100);
    }
}
