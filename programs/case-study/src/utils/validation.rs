//! Submission-time input validation for case study records
//!
//! The case-study program checks these rules when a record is first written.
//! They are never applied by the decoder: an account that breaks them is still
//! decoded faithfully, and write-path tooling calls [`validate_submission`]
//! before encoding.

use cid::{Cid, Version};

use crate::{errors::SubmissionError, state::CaseStudyRecord};

/// Length of a base58btc CIDv0 ("Qm...")
pub const CIDV0_LEN: usize = 46;

/// Shortest accepted treatment duration
pub const MIN_DURATION_DAYS: u16 = 1;

/// Longest accepted treatment duration (one year)
pub const MAX_DURATION_DAYS: u16 = 365;

/// Smallest accepted compression ratio
pub const MIN_COMPRESSION_RATIO: u16 = 2;

/// Largest accepted compression ratio
pub const MAX_COMPRESSION_RATIO: u16 = 100;

/// Content identifier version
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CidKind {
    /// Base58btc sha2-256 multihash, always 46 characters starting with "Qm"
    V0,
    /// Multibase-prefixed self-describing identifier ("bafy...", "bafk...")
    V1,
}

/// Whether a string is made only of printable, non-space ASCII.
///
/// Every multibase alphabet used for CIDs falls in this range, so anything
/// else is rejected before attempting a parse.
pub fn is_ascii_graphic_str(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_graphic())
}

/// Classify `s` as a content identifier, or `None` when it is not one
pub fn cid_kind(s: &str) -> Option<CidKind> {
    if !is_ascii_graphic_str(s) {
        return None;
    }
    let cid = Cid::try_from(s).ok()?;
    match cid.version() {
        Version::V0 if s.len() == CIDV0_LEN => Some(CidKind::V0),
        Version::V0 => None,
        _ => Some(CidKind::V1),
    }
}

/// Check the rules the program enforces when a case study is submitted
pub fn validate_submission(record: &CaseStudyRecord) -> Result<(), SubmissionError> {
    if cid_kind(&record.ipfs_cid).is_none() {
        return Err(SubmissionError::UnrecognizedCid(record.ipfs_cid.clone()));
    }

    if !(MIN_DURATION_DAYS..=MAX_DURATION_DAYS).contains(&record.duration_days) {
        return Err(SubmissionError::DurationOutOfRange {
            days: record.duration_days,
            min: MIN_DURATION_DAYS,
            max: MAX_DURATION_DAYS,
        });
    }

    if !(MIN_COMPRESSION_RATIO..=MAX_COMPRESSION_RATIO).contains(&record.compression_ratio) {
        return Err(SubmissionError::CompressionRatioOutOfRange {
            ratio: record.compression_ratio,
            min: MIN_COMPRESSION_RATIO,
            max: MAX_COMPRESSION_RATIO,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        pubkey::Pubkey,
        state::{TreatmentCategory, ValidationStatus},
    };

    const CIDV0: &str = "QmYwAPJzv5CZsnA625s3Xf2nemtYgPpHdWEz79ojWnPbdG";
    const CIDV1: &str = "bafybeigdyrzt5sfp7udm7hu76uh7y26nf3efuylqabf3oclgtqy55fbzdi";

    fn submission() -> CaseStudyRecord {
        CaseStudyRecord {
            ephemeral_id: Pubkey::new_from_array([5; 32]),
            submitter: Pubkey::new_from_array([6; 32]),
            ipfs_cid: CIDV0.to_string(),
            metadata_hash: [7; 32],
            treatment_category: TreatmentCategory::Pharmaceutical,
            duration_days: 30,
            created_at: 1_700_000_000,
            validation_status: ValidationStatus::Pending,
            approval_count: 0,
            rejection_count: 0,
            reputation_score: 0,
            is_paused: false,
            threshold_shares_required: 3,
            light_proof_hash: [8; 32],
            compression_ratio: 10,
            attention_token: None,
            bump: 255,
        }
    }

    #[test]
    fn test_recognizes_cid_versions() {
        assert_eq!(cid_kind(CIDV0), Some(CidKind::V0));
        assert_eq!(cid_kind(CIDV1), Some(CidKind::V1));
    }

    #[test]
    fn test_rejects_non_cids() {
        assert_eq!(cid_kind(""), None);
        assert_eq!(cid_kind("Qm"), None);
        assert_eq!(cid_kind("hello world"), None);
        assert_eq!(cid_kind(&"Q".repeat(CIDV0_LEN)), None);
        assert_eq!(cid_kind("QmYwAPJzv5CZsnA625s3Xf2nemtYgPpHdWEz79ojWnPbd\n"), None);
    }

    #[test]
    fn test_ascii_graphic() {
        assert!(is_ascii_graphic_str("ipfs://QmHash123"));
        assert!(!is_ascii_graphic_str(""));
        assert!(!is_ascii_graphic_str("two words"));
        assert!(!is_ascii_graphic_str("hello\x00world"));
        assert!(!is_ascii_graphic_str("café"));
    }

    #[test]
    fn test_valid_submission() {
        assert_eq!(validate_submission(&submission()), Ok(()));

        let mut v1 = submission();
        v1.ipfs_cid = CIDV1.to_string();
        assert_eq!(validate_submission(&v1), Ok(()));
    }

    #[test]
    fn test_duration_bounds() {
        let mut record = submission();
        record.duration_days = 0;
        assert_eq!(
            validate_submission(&record),
            Err(SubmissionError::DurationOutOfRange {
                days: 0,
                min: 1,
                max: 365
            })
        );
        record.duration_days = 365;
        assert!(validate_submission(&record).is_ok());
        record.duration_days = 366;
        assert!(validate_submission(&record).is_err());
    }

    #[test]
    fn test_compression_bounds() {
        let mut record = submission();
        record.compression_ratio = 1;
        assert_eq!(
            validate_submission(&record),
            Err(SubmissionError::CompressionRatioOutOfRange {
                ratio: 1,
                min: 2,
                max: 100
            })
        );
        record.compression_ratio = 100;
        assert!(validate_submission(&record).is_ok());
        record.compression_ratio = 101;
        assert!(validate_submission(&record).is_err());
    }

    #[test]
    fn test_unrecognized_cid_is_reported() {
        let mut record = submission();
        record.ipfs_cid = "not-a-cid".to_string();
        assert_eq!(
            validate_submission(&record),
            Err(SubmissionError::UnrecognizedCid("not-a-cid".to_string()))
        );
    }
}
