//! Arbitrary input generators for fuzz testing
//!
//! Generates well-formed case study records plus the raw material (votes,
//! thresholds, corruptions) the fuzz targets throw at them.

use dbc_case_study::{
    AttentionToken, CaseStudyRecord, EligibilityThresholds, Pubkey, TreatmentCategory,
    ValidationStatus, MAX_CID_LEN,
};
use proptest::prelude::*;

use crate::scenarios::{ValidatorTier, VoteKind};

/// A CIDv0 as produced by IPFS for the encrypted payloads
pub const SAMPLE_CIDV0: &str = "QmYwAPJzv5CZsnA625s3Xf2nemtYgPpHdWEz79ojWnPbdG";

/// Arbitrary 32-byte identifier (ephemeral id, submitter, mint)
pub fn arb_pubkey() -> impl Strategy<Value = Pubkey> {
    prop::array::uniform32(any::<u8>()).prop_map(Pubkey::new_from_array)
}

/// Arbitrary 32-byte hash (metadata, light proof)
pub fn arb_hash() -> impl Strategy<Value = [u8; 32]> {
    prop::array::uniform32(any::<u8>())
}

/// Arbitrary CID string that fits the 1-100 byte window
pub fn arb_cid() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(SAMPLE_CIDV0.to_string()),
        // Single byte and exactly at the limit
        Just("Q".to_string()),
        Just("b".repeat(MAX_CID_LEN)),
        "[a-zA-Z0-9]{1,100}",
        // Multi-byte UTF-8; 25 chars of at most 4 bytes stay within the limit
        "\\PC{1,25}",
    ]
}

pub fn arb_treatment_category() -> impl Strategy<Value = TreatmentCategory> {
    prop::sample::select(TreatmentCategory::ALL.to_vec())
}

pub fn arb_validation_status() -> impl Strategy<Value = ValidationStatus> {
    prop::sample::select(ValidationStatus::ALL.to_vec())
}

/// Arbitrary timestamp (seconds since Unix epoch)
pub fn arb_timestamp() -> impl Strategy<Value = i64> {
    prop_oneof![
        Just(0i64),
        Just(i64::MIN),
        Just(i64::MAX),
        1_700_000_000i64..1_800_000_000i64,
    ]
}

/// Arbitrary reputation byte, including the out-of-range values the codec
/// must still accept
pub fn arb_reputation() -> impl Strategy<Value = u8> {
    prop_oneof![
        Just(0u8),
        Just(75u8),
        Just(100u8),
        Just(101u8),
        Just(u8::MAX),
        0u8..=100u8,
    ]
}

/// Arbitrary weighted vote counter
pub fn arb_vote_count() -> impl Strategy<Value = u32> {
    prop_oneof![
        Just(0u32),
        Just(5u32),
        Just(u32::MAX),
        0u32..1_000u32,
    ]
}

pub fn arb_attention_token() -> impl Strategy<Value = Option<AttentionToken>> {
    proptest::option::of(
        (arb_pubkey(), arb_timestamp())
            .prop_map(|(mint, created_at)| AttentionToken { mint, created_at }),
    )
}

/// Arbitrary well-formed record. Every field is free within its type, so
/// records here are not necessarily consistent with the consensus rule.
pub fn arb_record() -> impl Strategy<Value = CaseStudyRecord> {
    let identity = (
        arb_pubkey(),
        arb_pubkey(),
        arb_cid(),
        arb_hash(),
        arb_treatment_category(),
        any::<u16>(),
        arb_timestamp(),
    );
    let validation = (
        arb_validation_status(),
        arb_vote_count(),
        arb_vote_count(),
        arb_reputation(),
        any::<bool>(),
        any::<u8>(),
        arb_hash(),
        any::<u16>(),
        arb_attention_token(),
        any::<u8>(),
    );

    (identity, validation).prop_map(
        |(
            (ephemeral_id, submitter, ipfs_cid, metadata_hash, treatment_category, duration_days, created_at),
            (
                validation_status,
                approval_count,
                rejection_count,
                reputation_score,
                is_paused,
                threshold_shares_required,
                light_proof_hash,
                compression_ratio,
                attention_token,
                bump,
            ),
        )| CaseStudyRecord {
            ephemeral_id,
            submitter,
            ipfs_cid,
            metadata_hash,
            treatment_category,
            duration_days,
            created_at,
            validation_status,
            approval_count,
            rejection_count,
            reputation_score,
            is_paused,
            threshold_shares_required,
            light_proof_hash,
            compression_ratio,
            attention_token,
            bump,
        },
    )
}

/// Freshly submitted record: Pending, no votes, not paused, no token
pub fn arb_fresh_record() -> impl Strategy<Value = CaseStudyRecord> {
    arb_record().prop_map(|mut record| {
        record.validation_status = ValidationStatus::Pending;
        record.approval_count = 0;
        record.rejection_count = 0;
        record.reputation_score = 0;
        record.is_paused = false;
        record.attention_token = None;
        record
    })
}

pub fn arb_thresholds() -> impl Strategy<Value = EligibilityThresholds> {
    prop_oneof![
        Just(EligibilityThresholds::default()),
        (any::<u8>(), arb_vote_count()).prop_map(|(min_reputation_score, min_validator_count)| {
            EligibilityThresholds {
                min_reputation_score,
                min_validator_count,
            }
        }),
    ]
}

pub fn arb_validator_tier() -> impl Strategy<Value = ValidatorTier> {
    prop::sample::select(ValidatorTier::ALL.to_vec())
}

pub fn arb_vote_kind() -> impl Strategy<Value = VoteKind> {
    prop_oneof![
        3 => Just(VoteKind::Approve),
        2 => Just(VoteKind::Reject),
        1 => Just(VoteKind::FurtherReview),
    ]
}

/// A single validator vote
#[derive(Debug, Clone, Copy)]
pub struct ValidatorVote {
    pub tier: ValidatorTier,
    pub kind: VoteKind,
}

/// Input for a sequence of validator votes on one record
#[derive(Debug, Clone)]
pub struct VoteSequenceInput {
    pub record: CaseStudyRecord,
    pub votes: Vec<ValidatorVote>,
    /// Index in `votes` before which the risk agent pauses the record
    pub pause_before: Option<usize>,
    pub risk_score: u8,
}

impl Arbitrary for VoteSequenceInput {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (
            arb_fresh_record(),
            prop::collection::vec(
                (arb_validator_tier(), arb_vote_kind())
                    .prop_map(|(tier, kind)| ValidatorVote { tier, kind }),
                0..40,
            ),
            proptest::option::of(0usize..40),
            any::<u8>(),
        )
            .prop_map(|(record, votes, pause_before, risk_score)| VoteSequenceInput {
                record,
                votes,
                pause_before,
                risk_score,
            })
            .boxed()
    }
}

/// Input for attention token creation
#[derive(Debug, Clone)]
pub struct CreateTokenInput {
    pub record: CaseStudyRecord,
    pub thresholds: EligibilityThresholds,
    pub mint: Pubkey,
    pub current_timestamp: i64,
}

impl Arbitrary for CreateTokenInput {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (arb_record(), arb_thresholds(), arb_pubkey(), arb_timestamp())
            .prop_map(|(record, thresholds, mint, current_timestamp)| CreateTokenInput {
                record,
                thresholds,
                mint,
                current_timestamp,
            })
            .boxed()
    }
}

/// A single-byte corruption applied to an encoded record
#[derive(Debug, Clone, Copy)]
pub struct ByteCorruption {
    /// Offset as a fraction of the buffer length, resolved by the caller
    pub position: prop::sample::Index,
    pub value: u8,
}

pub fn arb_byte_corruption() -> impl Strategy<Value = ByteCorruption> {
    (any::<prop::sample::Index>(), any::<u8>())
        .prop_map(|(position, value)| ByteCorruption { position, value })
}
