//! Invariant checking for fuzz testing
//!
//! Each checker returns `Valid` or a variant describing the violation, so
//! targets can assert on it and the runner can print it.

use dbc_case_study::{
    check_record_consistency, compute_eligibility, decode, decode_prefixed, encode,
    CaseStudyRecord, ConsensusRule, ConsistencyIssue, DecodeError, DecodeOptions,
    EligibilityThresholds, ValidationStatus,
};

/// Codec invariant results
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodecInvariantResult {
    Valid,
    EncodeFailed { reason: String },
    DecodeFailed { error: DecodeError },
    RoundTripMismatch,
    LengthMismatch { expected: usize, actual: usize },
    ConsumedMismatch { consumed: usize, encoded: usize },
    /// A strict prefix of a valid encoding decoded successfully
    TruncationAccepted { len: usize },
    /// A strict prefix failed with something other than a short buffer
    TruncationWrongError { len: usize, error: DecodeError },
}

/// Status and consensus invariant results
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusInvariantResult {
    Valid,
    InvalidStateTransition {
        from: ValidationStatus,
        to: ValidationStatus,
    },
    ReputationOutOfRange { score: u8 },
    Inconsistent { issues: Vec<ConsistencyIssue> },
    PausedRecordModified,
}

/// Eligibility invariant results
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EligibilityInvariantResult {
    Valid,
    EligibleWithExistingToken,
    EligibleBelowReputation { score: u8, required: u8 },
    EligibleBelowValidatorCount { count: u32, required: u32 },
    /// `is_eligible` disagrees with the conjunction of its reasons
    VerdictDisagreesWithReasons,
    NonDeterministic,
}

// ============================================================================
// Codec Invariants
// ============================================================================

/// encode → decode reproduces the record, with the exact account size
pub fn check_round_trip(record: &CaseStudyRecord) -> CodecInvariantResult {
    let bytes = match encode(record) {
        Ok(bytes) => bytes,
        Err(err) => {
            return CodecInvariantResult::EncodeFailed {
                reason: err.to_string(),
            }
        }
    };

    let expected_len =
        CaseStudyRecord::account_size(record.ipfs_cid.len(), record.has_attention_token());
    if bytes.len() != expected_len {
        return CodecInvariantResult::LengthMismatch {
            expected: expected_len,
            actual: bytes.len(),
        };
    }

    match decode_prefixed(&bytes, &DecodeOptions::strict()) {
        Ok((decoded, consumed)) => {
            if consumed != bytes.len() {
                CodecInvariantResult::ConsumedMismatch {
                    consumed,
                    encoded: bytes.len(),
                }
            } else if decoded != *record {
                CodecInvariantResult::RoundTripMismatch
            } else {
                CodecInvariantResult::Valid
            }
        }
        Err(error) => CodecInvariantResult::DecodeFailed { error },
    }
}

/// Every strict prefix of a valid encoding fails with `BufferTooShort`
pub fn check_truncation(encoded: &[u8], len: usize) -> CodecInvariantResult {
    if len >= encoded.len() {
        return CodecInvariantResult::Valid;
    }
    match decode(&encoded[..len]) {
        Ok(_) => CodecInvariantResult::TruncationAccepted { len },
        Err(DecodeError::BufferTooShort { .. }) => CodecInvariantResult::Valid,
        Err(error) => CodecInvariantResult::TruncationWrongError { len, error },
    }
}

// ============================================================================
// Status Invariants
// ============================================================================

pub fn check_status_transition(from: ValidationStatus, to: ValidationStatus) -> StatusInvariantResult {
    if from.can_transition_to(to) {
        StatusInvariantResult::Valid
    } else {
        StatusInvariantResult::InvalidStateTransition { from, to }
    }
}

pub fn check_reputation_bounds(record: &CaseStudyRecord) -> StatusInvariantResult {
    if record.reputation_in_range() {
        StatusInvariantResult::Valid
    } else {
        StatusInvariantResult::ReputationOutOfRange {
            score: record.reputation_score,
        }
    }
}

/// A paused record is frozen: a rejected vote must leave it byte for byte
pub fn check_paused_record_unchanged(
    before: &CaseStudyRecord,
    after: &CaseStudyRecord,
) -> StatusInvariantResult {
    if before.is_paused && before != after {
        StatusInvariantResult::PausedRecordModified
    } else {
        StatusInvariantResult::Valid
    }
}

/// Stored score and status agree with the vote counters
pub fn check_consensus(record: &CaseStudyRecord, rule: &ConsensusRule) -> StatusInvariantResult {
    let report = check_record_consistency(record, rule);
    if report.is_consistent() {
        StatusInvariantResult::Valid
    } else {
        StatusInvariantResult::Inconsistent {
            issues: report.issues,
        }
    }
}

// ============================================================================
// Eligibility Invariants
// ============================================================================

pub fn check_eligibility(
    record: &CaseStudyRecord,
    thresholds: &EligibilityThresholds,
) -> EligibilityInvariantResult {
    let result = compute_eligibility(record, thresholds);

    if compute_eligibility(record, thresholds) != result {
        return EligibilityInvariantResult::NonDeterministic;
    }

    let reasons = &result.reasons;
    let conjunction =
        reasons.reputation_score.met && reasons.validator_count.met && !reasons.has_existing_token;
    if conjunction != result.is_eligible {
        return EligibilityInvariantResult::VerdictDisagreesWithReasons;
    }

    if !result.is_eligible {
        return EligibilityInvariantResult::Valid;
    }
    if record.has_attention_token() {
        return EligibilityInvariantResult::EligibleWithExistingToken;
    }
    if record.reputation_score < thresholds.min_reputation_score {
        return EligibilityInvariantResult::EligibleBelowReputation {
            score: record.reputation_score,
            required: thresholds.min_reputation_score,
        };
    }
    if record.approval_count < thresholds.min_validator_count {
        return EligibilityInvariantResult::EligibleBelowValidatorCount {
            count: record.approval_count,
            required: thresholds.min_validator_count,
        };
    }
    EligibilityInvariantResult::Valid
}
