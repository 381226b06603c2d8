//! Attention token creation gate
//!
//! Turns an eligibility report into a single refusal reason a client can show
//! before building a token creation transaction.

use dbc_case_study::{
    compute_eligibility, compute_ownership, CaseStudyRecord, EligibilityThresholds, Pubkey,
};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenGateError {
    #[error("an attention token already exists for this case study (mint {mint})")]
    AlreadyMinted { mint: Pubkey },

    #[error("reputation score {current} is below the required {required}")]
    ReputationTooLow { current: u8, required: u8 },

    #[error("{current} weighted approvals, {required} required")]
    NotEnoughValidators { current: u32, required: u32 },

    #[error("only the submitter {submitter} may create the attention token")]
    NotSubmitter { submitter: Pubkey },
}

/// First unmet condition: existing token, then reputation, then approvals
pub fn ensure_token_creatable(
    record: &CaseStudyRecord,
    thresholds: &EligibilityThresholds,
) -> Result<(), TokenGateError> {
    if let Some(mint) = record.attention_token_mint() {
        return Err(TokenGateError::AlreadyMinted { mint: *mint });
    }

    let eligibility = compute_eligibility(record, thresholds);
    let reasons = eligibility.reasons;
    if !reasons.reputation_score.met {
        return Err(TokenGateError::ReputationTooLow {
            current: reasons.reputation_score.current,
            required: reasons.reputation_score.required,
        });
    }
    if !reasons.validator_count.met {
        return Err(TokenGateError::NotEnoughValidators {
            current: reasons.validator_count.current,
            required: reasons.validator_count.required,
        });
    }
    debug_assert!(eligibility.is_eligible);
    Ok(())
}

/// [`ensure_token_creatable`] for a specific signer
pub fn ensure_token_creatable_by(
    record: &CaseStudyRecord,
    signer: &Pubkey,
    thresholds: &EligibilityThresholds,
) -> Result<(), TokenGateError> {
    if !compute_ownership(record, signer) {
        return Err(TokenGateError::NotSubmitter {
            submitter: record.submitter,
        });
    }
    ensure_token_creatable(record, thresholds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dbc_case_study::{AttentionToken, TreatmentCategory, ValidationStatus};

    fn record(reputation_score: u8, approval_count: u32) -> CaseStudyRecord {
        CaseStudyRecord {
            ephemeral_id: Pubkey::new_from_array([1; 32]),
            submitter: Pubkey::new_from_array([2; 32]),
            ipfs_cid: "bafybeigdyrzt5sfp7udm7hu76uh7y26nf3efuylqabf3oclgtqy55fbzdi".to_string(),
            metadata_hash: [0; 32],
            treatment_category: TreatmentCategory::Pharmaceutical,
            duration_days: 120,
            created_at: 1_700_000_000,
            validation_status: ValidationStatus::Approved,
            approval_count,
            rejection_count: 0,
            reputation_score,
            is_paused: false,
            threshold_shares_required: 3,
            light_proof_hash: [0; 32],
            compression_ratio: 20,
            attention_token: None,
            bump: 254,
        }
    }

    #[test]
    fn eligible_record_passes() {
        let thresholds = EligibilityThresholds::default();
        assert_eq!(ensure_token_creatable(&record(80, 6), &thresholds), Ok(()));
        assert_eq!(
            ensure_token_creatable_by(&record(80, 6), &Pubkey::new_from_array([2; 32]), &thresholds),
            Ok(())
        );
    }

    #[test]
    fn reports_first_unmet_condition() {
        let thresholds = EligibilityThresholds::default();
        assert_eq!(
            ensure_token_creatable(&record(50, 1), &thresholds),
            Err(TokenGateError::ReputationTooLow {
                current: 50,
                required: 75
            })
        );
        assert_eq!(
            ensure_token_creatable(&record(90, 4), &thresholds),
            Err(TokenGateError::NotEnoughValidators {
                current: 4,
                required: 5
            })
        );
    }

    #[test]
    fn existing_token_wins_over_other_reasons() {
        let mut minted = record(10, 0);
        let mint = Pubkey::new_from_array([5; 32]);
        minted.attention_token = Some(AttentionToken {
            mint,
            created_at: 1_700_000_100,
        });
        assert_eq!(
            ensure_token_creatable(&minted, &EligibilityThresholds::default()),
            Err(TokenGateError::AlreadyMinted { mint })
        );
    }

    #[test]
    fn other_signer_is_refused() {
        let err = ensure_token_creatable_by(
            &record(80, 6),
            &Pubkey::new_from_array([3; 32]),
            &EligibilityThresholds::default(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            TokenGateError::NotSubmitter {
                submitter: Pubkey::new_from_array([2; 32])
            }
        );
        assert!(err.to_string().contains("only the submitter"));
    }
}
