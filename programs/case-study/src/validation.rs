//! Validation state model
//!
//! Turns a decoded [`CaseStudyRecord`] into the facts galleries, eligibility
//! checks and token creation need. Nothing here touches raw bytes; decode
//! failures happen upstream and are the caller's to handle.

use serde::{Deserialize, Serialize};

use crate::{
    pubkey::Pubkey,
    state::{CaseStudyRecord, ValidationStatus, MAX_REPUTATION_SCORE},
};

/// Three-way status shown to users. `UnderReview` is still awaiting a verdict,
/// so it shares the pending bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayStatus {
    Pending,
    Approved,
    Rejected,
}

impl DisplayStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

impl From<ValidationStatus> for DisplayStatus {
    fn from(status: ValidationStatus) -> Self {
        match status {
            ValidationStatus::Pending | ValidationStatus::UnderReview => Self::Pending,
            ValidationStatus::Approved => Self::Approved,
            ValidationStatus::Rejected => Self::Rejected,
        }
    }
}

pub fn classify_status(record: &CaseStudyRecord) -> DisplayStatus {
    DisplayStatus::from(record.validation_status)
}

/// Whether `identity` submitted this record
pub fn compute_ownership(record: &CaseStudyRecord, identity: &Pubkey) -> bool {
    record.submitter == *identity
}

/// Whether the record still takes validator votes
pub fn is_open_for_validation(record: &CaseStudyRecord) -> bool {
    !record.is_paused
        && matches!(
            record.validation_status,
            ValidationStatus::Pending | ValidationStatus::UnderReview
        )
}

// ============================================================================
// Attention token eligibility
// ============================================================================

/// Thresholds a record must meet before an attention token can be created
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EligibilityThresholds {
    pub min_reputation_score: u8,
    pub min_validator_count: u32,
}

impl EligibilityThresholds {
    pub const DEFAULT_MIN_REPUTATION_SCORE: u8 = 75;
    pub const DEFAULT_MIN_VALIDATOR_COUNT: u32 = 5;
}

impl Default for EligibilityThresholds {
    fn default() -> Self {
        Self {
            min_reputation_score: Self::DEFAULT_MIN_REPUTATION_SCORE,
            min_validator_count: Self::DEFAULT_MIN_VALIDATOR_COUNT,
        }
    }
}

/// Progress towards a single threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Requirement<T> {
    pub current: T,
    pub required: T,
    pub met: bool,
}

impl<T: PartialOrd + Copy> Requirement<T> {
    fn at_least(current: T, required: T) -> Self {
        Self {
            current,
            required,
            met: current >= required,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EligibilityReasons {
    pub reputation_score: Requirement<u8>,
    pub validator_count: Requirement<u32>,
    pub has_existing_token: bool,
}

/// Full eligibility report. Every sub-condition is evaluated even when an
/// earlier one already fails, so callers can render partial progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EligibilityResult {
    pub is_eligible: bool,
    pub reasons: EligibilityReasons,
}

/// `reputation >= min AND approvals >= min AND no token yet`.
///
/// The raw `reputation_score` byte is compared; values above 100 are not
/// clamped here (see [`CaseStudyRecord::reputation_in_range`]).
pub fn compute_eligibility(
    record: &CaseStudyRecord,
    thresholds: &EligibilityThresholds,
) -> EligibilityResult {
    let reputation_score =
        Requirement::at_least(record.reputation_score, thresholds.min_reputation_score);
    let validator_count =
        Requirement::at_least(record.approval_count, thresholds.min_validator_count);
    let has_existing_token = record.has_attention_token();

    EligibilityResult {
        is_eligible: reputation_score.met && validator_count.met && !has_existing_token,
        reasons: EligibilityReasons {
            reputation_score,
            validator_count,
            has_existing_token,
        },
    }
}

// ============================================================================
// Derived view
// ============================================================================

/// Read-only projection of a record for a particular viewer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationState {
    pub status: ValidationStatus,
    pub is_owner: bool,
    pub is_eligible_for_token: bool,
    pub display_category: &'static str,
}

/// `identity` is the connected viewer, if any; nobody owns a record when no
/// identity is supplied.
pub fn derive_validation_state(
    record: &CaseStudyRecord,
    identity: Option<&Pubkey>,
    thresholds: &EligibilityThresholds,
) -> ValidationState {
    ValidationState {
        status: record.validation_status,
        is_owner: identity.is_some_and(|id| compute_ownership(record, id)),
        is_eligible_for_token: compute_eligibility(record, thresholds).is_eligible,
        display_category: record.treatment_category.label(),
    }
}

// ============================================================================
// Consensus
// ============================================================================

/// Weighted consensus rule applied by the program after every validator vote
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConsensusRule {
    /// Weighted votes needed before any verdict
    pub min_total_votes: u64,
    /// Approve at or above this approval percentage
    pub approve_at_or_above: u8,
    /// Reject strictly below this approval percentage
    pub reject_below: u8,
}

impl Default for ConsensusRule {
    fn default() -> Self {
        Self {
            min_total_votes: 5,
            approve_at_or_above: 75,
            reject_below: 25,
        }
    }
}

/// Approval percentage (0-100) of the weighted votes, `None` without votes
pub fn tally_reputation(approvals: u32, rejections: u32) -> Option<u8> {
    let total = u128::from(approvals) + u128::from(rejections);
    if total == 0 {
        return None;
    }
    // approvals <= total, so the quotient is at most 100
    Some((u128::from(approvals) * 100 / total) as u8)
}

/// Status the consensus rule forces for the record's counters, or `None`
/// when the rule leaves the current status alone.
pub fn expected_status(record: &CaseStudyRecord, rule: &ConsensusRule) -> Option<ValidationStatus> {
    if record.total_votes() < rule.min_total_votes {
        return None;
    }
    let score = tally_reputation(record.approval_count, record.rejection_count)?;
    if score >= rule.approve_at_or_above {
        Some(ValidationStatus::Approved)
    } else if score < rule.reject_below {
        Some(ValidationStatus::Rejected)
    } else {
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum ConsistencyIssue {
    /// Stored score exceeds 100
    ReputationOutOfRange { score: u8 },
    /// Stored score disagrees with the approval/rejection counters
    ReputationMismatch { stored: u8, tallied: u8 },
    /// The consensus rule forces a different status than the stored one
    StatusContradictsConsensus {
        status: ValidationStatus,
        expected: ValidationStatus,
    },
    /// A verdict was recorded before enough weighted votes existed
    DecidedWithoutQuorum {
        status: ValidationStatus,
        total_votes: u64,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConsistencyReport {
    pub issues: Vec<ConsistencyIssue>,
}

impl ConsistencyReport {
    pub fn is_consistent(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Cross-check the stored score and status against the vote counters.
///
/// Diagnostic only: a record with issues still decodes and is still shown.
pub fn check_record_consistency(record: &CaseStudyRecord, rule: &ConsensusRule) -> ConsistencyReport {
    let mut issues = Vec::new();

    if record.reputation_score > MAX_REPUTATION_SCORE {
        issues.push(ConsistencyIssue::ReputationOutOfRange {
            score: record.reputation_score,
        });
    }

    // The program leaves the score at its initial 0 until the first vote
    let tallied = tally_reputation(record.approval_count, record.rejection_count).unwrap_or(0);
    if tallied != record.reputation_score {
        issues.push(ConsistencyIssue::ReputationMismatch {
            stored: record.reputation_score,
            tallied,
        });
    }

    let total_votes = record.total_votes();
    if record.validation_status.is_decided() && total_votes < rule.min_total_votes {
        issues.push(ConsistencyIssue::DecidedWithoutQuorum {
            status: record.validation_status,
            total_votes,
        });
    }

    if let Some(expected) = expected_status(record, rule) {
        if expected != record.validation_status {
            issues.push(ConsistencyIssue::StatusContradictsConsensus {
                status: record.validation_status,
                expected,
            });
        }
    }

    ConsistencyReport { issues }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{AttentionToken, TreatmentCategory};

    fn record(reputation_score: u8, approval_count: u32, has_token: bool) -> CaseStudyRecord {
        CaseStudyRecord {
            ephemeral_id: Pubkey::new_from_array([1; 32]),
            submitter: Pubkey::new_from_array([2; 32]),
            ipfs_cid: "QmYwAPJzv5CZsnA625s3Xf2nemtYgPpHdWEz79ojWnPbdG".to_string(),
            metadata_hash: [0; 32],
            treatment_category: TreatmentCategory::Lifestyle,
            duration_days: 60,
            created_at: 1_700_000_000,
            validation_status: ValidationStatus::Approved,
            approval_count,
            rejection_count: 0,
            reputation_score,
            is_paused: false,
            threshold_shares_required: 3,
            light_proof_hash: [0; 32],
            compression_ratio: 10,
            attention_token: has_token.then_some(AttentionToken {
                mint: Pubkey::new_from_array([9; 32]),
                created_at: 1_700_100_000,
            }),
            bump: 250,
        }
    }

    fn thresholds() -> EligibilityThresholds {
        EligibilityThresholds {
            min_reputation_score: 75,
            min_validator_count: 5,
        }
    }

    #[test]
    fn classify_status_buckets() {
        let mut r = record(0, 0, false);
        let expected = [
            (ValidationStatus::Pending, DisplayStatus::Pending),
            (ValidationStatus::Approved, DisplayStatus::Approved),
            (ValidationStatus::Rejected, DisplayStatus::Rejected),
            (ValidationStatus::UnderReview, DisplayStatus::Pending),
        ];
        for (status, bucket) in expected {
            r.validation_status = status;
            assert_eq!(classify_status(&r), bucket);
        }
        assert_eq!(DisplayStatus::Rejected.as_str(), "rejected");
    }

    #[test]
    fn eligible_when_all_thresholds_met() {
        let result = compute_eligibility(&record(80, 6, false), &thresholds());
        assert!(result.is_eligible);
        assert_eq!(
            result.reasons.reputation_score,
            Requirement {
                current: 80,
                required: 75,
                met: true
            }
        );
        assert_eq!(
            result.reasons.validator_count,
            Requirement {
                current: 6,
                required: 5,
                met: true
            }
        );
        assert!(!result.reasons.has_existing_token);
    }

    #[test]
    fn low_reputation_reports_partial_progress() {
        let result = compute_eligibility(&record(50, 6, false), &thresholds());
        assert!(!result.is_eligible);
        assert!(!result.reasons.reputation_score.met);
        assert!(result.reasons.validator_count.met);
    }

    #[test]
    fn existing_token_blocks_eligibility() {
        let result = compute_eligibility(&record(95, 20, true), &thresholds());
        assert!(!result.is_eligible);
        assert!(result.reasons.has_existing_token);
        assert!(result.reasons.reputation_score.met);
        assert!(result.reasons.validator_count.met);
    }

    #[test]
    fn thresholds_are_inclusive() {
        assert!(compute_eligibility(&record(75, 5, false), &thresholds()).is_eligible);
        assert!(!compute_eligibility(&record(75, 4, false), &thresholds()).is_eligible);
    }

    #[test]
    fn eligibility_serializes_with_camel_case_keys() {
        let json = serde_json::to_value(compute_eligibility(&record(80, 6, false), &thresholds()))
            .unwrap();
        assert_eq!(json["isEligible"], true);
        assert_eq!(json["reasons"]["reputationScore"]["current"], 80);
        assert_eq!(json["reasons"]["validatorCount"]["required"], 5);
        assert_eq!(json["reasons"]["hasExistingToken"], false);
    }

    #[test]
    fn thresholds_deserialize_with_defaults() {
        let parsed: EligibilityThresholds =
            serde_json::from_str(r#"{"minValidatorCount": 9}"#).unwrap();
        assert_eq!(parsed.min_validator_count, 9);
        assert_eq!(parsed.min_reputation_score, 75);
    }

    #[test]
    fn ownership_is_exact_match() {
        let r = record(0, 0, false);
        assert!(compute_ownership(&r, &Pubkey::new_from_array([2; 32])));
        assert!(!compute_ownership(&r, &Pubkey::new_from_array([3; 32])));
    }

    #[test]
    fn derived_state_for_owner_and_anonymous_viewer() {
        let r = record(80, 6, false);
        let owner = Pubkey::new_from_array([2; 32]);

        let state = derive_validation_state(&r, Some(&owner), &thresholds());
        assert_eq!(
            state,
            ValidationState {
                status: ValidationStatus::Approved,
                is_owner: true,
                is_eligible_for_token: true,
                display_category: "Lifestyle",
            }
        );

        let anonymous = derive_validation_state(&r, None, &thresholds());
        assert!(!anonymous.is_owner);
    }

    #[test]
    fn paused_or_decided_records_are_closed() {
        let mut r = record(0, 0, false);
        r.validation_status = ValidationStatus::Pending;
        assert!(is_open_for_validation(&r));
        r.validation_status = ValidationStatus::UnderReview;
        assert!(is_open_for_validation(&r));
        r.is_paused = true;
        assert!(!is_open_for_validation(&r));
        r.is_paused = false;
        r.validation_status = ValidationStatus::Approved;
        assert!(!is_open_for_validation(&r));
    }

    #[test]
    fn tally_uses_weighted_share() {
        assert_eq!(tally_reputation(0, 0), None);
        assert_eq!(tally_reputation(3, 1), Some(75));
        assert_eq!(tally_reputation(1, 2), Some(33));
        assert_eq!(tally_reputation(u32::MAX, 0), Some(100));
        assert_eq!(tally_reputation(u32::MAX, u32::MAX), Some(50));
    }

    #[test]
    fn expected_status_follows_consensus_rule() {
        let rule = ConsensusRule::default();
        let mut r = record(0, 0, false);

        r.approval_count = 3;
        r.rejection_count = 1;
        assert_eq!(expected_status(&r, &rule), None, "below quorum");

        r.approval_count = 6;
        r.rejection_count = 2;
        assert_eq!(expected_status(&r, &rule), Some(ValidationStatus::Approved));

        r.approval_count = 1;
        r.rejection_count = 9;
        assert_eq!(expected_status(&r, &rule), Some(ValidationStatus::Rejected));

        r.approval_count = 5;
        r.rejection_count = 5;
        assert_eq!(expected_status(&r, &rule), None, "undecided band");
    }

    #[test]
    fn consistent_record_has_no_issues() {
        let mut r = record(85, 6, false);
        r.rejection_count = 1;
        assert!(check_record_consistency(&r, &ConsensusRule::default()).is_consistent());

        let fresh = {
            let mut r = record(0, 0, false);
            r.validation_status = ValidationStatus::Pending;
            r
        };
        assert!(check_record_consistency(&fresh, &ConsensusRule::default()).is_consistent());
    }

    #[test]
    fn inconsistencies_are_reported() {
        let mut r = record(200, 2, false);
        r.rejection_count = 0;
        let report = check_record_consistency(&r, &ConsensusRule::default());
        assert_eq!(
            report.issues,
            vec![
                ConsistencyIssue::ReputationOutOfRange { score: 200 },
                ConsistencyIssue::ReputationMismatch {
                    stored: 200,
                    tallied: 100
                },
                ConsistencyIssue::DecidedWithoutQuorum {
                    status: ValidationStatus::Approved,
                    total_votes: 2
                },
            ]
        );

        let mut pending = record(90, 9, false);
        pending.rejection_count = 1;
        pending.validation_status = ValidationStatus::Pending;
        let report = check_record_consistency(&pending, &ConsensusRule::default());
        assert_eq!(
            report.issues,
            vec![ConsistencyIssue::StatusContradictsConsensus {
                status: ValidationStatus::Pending,
                expected: ValidationStatus::Approved,
            }]
        );
    }
}
