//! Scenarios that simulate the case-study program's instructions
//!
//! The program mutates a `CaseStudy` account through validator votes, risk
//! agent pauses and attention token creation. These simulations apply the same
//! rules to a [`CaseStudyRecord`] without a Solana runtime, so the state model
//! can be checked against every state the program can actually produce.

use dbc_case_study::{
    compute_eligibility, is_open_for_validation, tally_reputation, AttentionToken,
    CaseStudyRecord, ConsensusRule, EligibilityThresholds, Pubkey, ValidationStatus,
};

use crate::invariants::*;

/// Risk score at or above which the risk agent may pause validation
pub const CRITICAL_RISK_THRESHOLD: u8 = 75;

/// Validator tier, earned through completed validations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidatorTier {
    Bronze,
    Silver,
    Gold,
    Platinum,
}

impl ValidatorTier {
    pub const ALL: [ValidatorTier; 4] = [
        ValidatorTier::Bronze,
        ValidatorTier::Silver,
        ValidatorTier::Gold,
        ValidatorTier::Platinum,
    ];

    pub fn from_validations(total_validations: u32) -> Self {
        match total_validations {
            0..=24 => Self::Bronze,
            25..=99 => Self::Silver,
            100..=499 => Self::Gold,
            _ => Self::Platinum,
        }
    }

    /// Weight a vote from this tier adds to the approval or rejection counter
    pub fn weight(self) -> u32 {
        match self {
            Self::Bronze => 1,
            Self::Silver => 2,
            Self::Gold => 3,
            Self::Platinum => 5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteKind {
    Approve,
    Reject,
    /// Neutral; recorded without touching the counters
    FurtherReview,
}

/// Result of a simulated instruction execution
#[derive(Debug, Clone)]
pub enum SimulationResult {
    Success,
    Error(String),
    InvariantViolation(String),
}

impl SimulationResult {
    pub fn is_success(&self) -> bool {
        matches!(self, SimulationResult::Success)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, SimulationResult::Error(_))
    }

    pub fn is_invariant_violation(&self) -> bool {
        matches!(self, SimulationResult::InvariantViolation(_))
    }
}

// ============================================================================
// Validator Vote Simulation
// ============================================================================

/// Simulate a validator vote followed by the consensus update
pub fn simulate_validator_vote(
    record: &mut CaseStudyRecord,
    tier: ValidatorTier,
    vote: VoteKind,
    rule: &ConsensusRule,
) -> SimulationResult {
    if record.is_paused {
        return SimulationResult::Error("ValidationPaused".to_string());
    }

    let old_status = record.validation_status;
    let weight = tier.weight();

    let (mut approvals, mut rejections) = (record.approval_count, record.rejection_count);
    match vote {
        VoteKind::Approve => {
            approvals = match approvals.checked_add(weight) {
                Some(count) => count,
                None => return SimulationResult::Error("OverflowError: approval_count".to_string()),
            };
        }
        VoteKind::Reject => {
            rejections = match rejections.checked_add(weight) {
                Some(count) => count,
                None => return SimulationResult::Error("OverflowError: rejection_count".to_string()),
            };
        }
        VoteKind::FurtherReview => {}
    }

    // The program sums the counters in 32 bits
    let total_votes = match approvals.checked_add(rejections) {
        Some(total) => u64::from(total),
        None => return SimulationResult::Error("OverflowError: total_votes".to_string()),
    };

    record.approval_count = approvals;
    record.rejection_count = rejections;

    if let Some(score) = tally_reputation(record.approval_count, record.rejection_count) {
        record.reputation_score = score;
    }

    if total_votes >= rule.min_total_votes && record.reputation_score >= rule.approve_at_or_above {
        record.validation_status = ValidationStatus::Approved;
    } else if record.reputation_score < rule.reject_below && total_votes >= rule.min_total_votes {
        record.validation_status = ValidationStatus::Rejected;
    }

    // Post-condition invariant checks

    if let StatusInvariantResult::InvalidStateTransition { from, to } =
        check_status_transition(old_status, record.validation_status)
    {
        return SimulationResult::InvariantViolation(format!(
            "Invalid status transition from {from:?} to {to:?}"
        ));
    }

    if let StatusInvariantResult::ReputationOutOfRange { score } = check_reputation_bounds(record) {
        return SimulationResult::InvariantViolation(format!(
            "Reputation {score} exceeds 100 after tally"
        ));
    }

    if let StatusInvariantResult::Inconsistent { issues } = check_consensus(record, rule) {
        return SimulationResult::InvariantViolation(format!(
            "Record inconsistent after vote: {issues:?}"
        ));
    }

    SimulationResult::Success
}

// ============================================================================
// Risk Agent Pause Simulation
// ============================================================================

pub fn simulate_agent_pause(record: &mut CaseStudyRecord, risk_score: u8) -> SimulationResult {
    if risk_score < CRITICAL_RISK_THRESHOLD {
        return SimulationResult::Error("InsufficientRiskScore".to_string());
    }

    record.is_paused = true;

    if is_open_for_validation(record) {
        return SimulationResult::InvariantViolation(
            "Paused record still open for validation".to_string(),
        );
    }

    SimulationResult::Success
}

// ============================================================================
// Attention Token Creation Simulation
// ============================================================================

pub fn simulate_create_attention_token(
    record: &mut CaseStudyRecord,
    thresholds: &EligibilityThresholds,
    mint: Pubkey,
    current_time: i64,
) -> SimulationResult {
    let eligibility = compute_eligibility(record, thresholds);
    if eligibility.reasons.has_existing_token {
        return SimulationResult::Error("AttentionTokenAlreadyExists".to_string());
    }
    if !eligibility.is_eligible {
        return SimulationResult::Error("NotEligibleForAttentionToken".to_string());
    }

    record.attention_token = Some(AttentionToken {
        mint,
        created_at: current_time,
    });

    // Both halves of the token are set together and the record is no longer
    // eligible for a second one
    if record.attention_token_mint() != Some(&mint)
        || record.attention_token_created_at() != Some(current_time)
    {
        return SimulationResult::InvariantViolation(
            "Attention token fields not set as a pair".to_string(),
        );
    }
    if compute_eligibility(record, thresholds).is_eligible {
        return SimulationResult::InvariantViolation(
            "Record still eligible after token creation".to_string(),
        );
    }

    SimulationResult::Success
}
