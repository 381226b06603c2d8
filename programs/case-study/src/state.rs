//! Account state structures for case study records

use serde::Serialize;

use crate::pubkey::Pubkey;

// ============================================================================
// Size Constants
// ============================================================================

/// Size of hashes and identifiers (SHA256, Pubkey bytes)
pub const HASH_SIZE: usize = 32;

/// Size of the Anchor account discriminator that prefixes every account
pub const DISCRIMINATOR_SIZE: usize = 8;

/// Anchor discriminator of the `CaseStudy` account:
/// first 8 bytes of `sha256("account:CaseStudy")`.
pub const CASE_STUDY_DISCRIMINATOR: [u8; DISCRIMINATOR_SIZE] =
    [0xea, 0xe1, 0x0b, 0x69, 0x5f, 0x40, 0xb2, 0x9b];

/// Shortest accepted `ipfs_cid`, in UTF-8 bytes
pub const MIN_CID_LEN: usize = 1;

/// Longest accepted `ipfs_cid`, in UTF-8 bytes
pub const MAX_CID_LEN: usize = 100;

/// Upper bound of the meaningful reputation range
pub const MAX_REPUTATION_SCORE: u8 = 100;

/// Treatment category of a case study
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[repr(u8)]
pub enum TreatmentCategory {
    Pharmaceutical = 0,
    Lifestyle = 1,
    Alternative = 2,
    Surgical = 3,
    Other = 4,
}

impl TreatmentCategory {
    pub const ALL: [TreatmentCategory; 5] = [
        TreatmentCategory::Pharmaceutical,
        TreatmentCategory::Lifestyle,
        TreatmentCategory::Alternative,
        TreatmentCategory::Surgical,
        TreatmentCategory::Other,
    ];

    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Pharmaceutical),
            1 => Some(Self::Lifestyle),
            2 => Some(Self::Alternative),
            3 => Some(Self::Surgical),
            4 => Some(Self::Other),
            _ => None,
        }
    }

    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Human readable category name shown in galleries
    pub fn label(self) -> &'static str {
        match self {
            Self::Pharmaceutical => "Pharmaceutical",
            Self::Lifestyle => "Lifestyle",
            Self::Alternative => "Alternative",
            Self::Surgical => "Surgical",
            Self::Other => "Other",
        }
    }
}

/// On-chain validation status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[repr(u8)]
pub enum ValidationStatus {
    Pending = 0,
    Approved = 1,
    Rejected = 2,
    UnderReview = 3,
}

impl ValidationStatus {
    pub const ALL: [ValidationStatus; 4] = [
        ValidationStatus::Pending,
        ValidationStatus::Approved,
        ValidationStatus::Rejected,
        ValidationStatus::UnderReview,
    ];

    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Pending),
            1 => Some(Self::Approved),
            2 => Some(Self::Rejected),
            3 => Some(Self::UnderReview),
            _ => None,
        }
    }

    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Whether weighted consensus has produced a verdict
    pub fn is_decided(self) -> bool {
        matches!(self, Self::Approved | Self::Rejected)
    }

    /// Validates whether a status transition is allowed.
    ///
    /// Valid transitions:
    /// - Pending → Approved / Rejected (consensus reached)
    /// - Pending → UnderReview (escalated for further review)
    /// - UnderReview → Approved / Rejected (consensus reached)
    /// - Approved ↔ Rejected (later weighted votes flip the consensus)
    /// - any status → itself (a vote recorded without changing the verdict)
    ///
    /// A decided record never returns to Pending or UnderReview.
    pub fn can_transition_to(&self, new_status: ValidationStatus) -> bool {
        use ValidationStatus::*;
        *self == new_status
            || matches!(
                (self, new_status),
                (Pending, Approved)
                    | (Pending, Rejected)
                    | (Pending, UnderReview)
                    | (UnderReview, Approved)
                    | (UnderReview, Rejected)
                    | (Approved, Rejected)
                    | (Rejected, Approved)
            )
    }
}

/// Tradeable attention token spun off a validated case study.
///
/// The account stores mint and creation time as two separately flagged
/// optional fields; they are only meaningful together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AttentionToken {
    pub mint: Pubkey,
    pub created_at: i64,
}

/// Case study account
/// PDA seeds: ["case_study", submitter, created_at]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseStudyRecord {
    /// Anonymous submission identifier, not linked to the submitter by itself
    pub ephemeral_id: Pubkey,
    /// Owning account, receives rewards
    pub submitter: Pubkey,
    /// Pointer to the encrypted payload stored off-chain
    pub ipfs_cid: String,
    /// Hash of the encrypted metadata
    pub metadata_hash: [u8; HASH_SIZE],
    pub treatment_category: TreatmentCategory,
    /// Treatment duration in days
    pub duration_days: u16,
    /// Submission timestamp (unix seconds)
    pub created_at: i64,
    pub validation_status: ValidationStatus,
    /// Validator approvals, weighted by validator tier
    pub approval_count: u32,
    /// Validator rejections, weighted by validator tier
    pub rejection_count: u32,
    /// Aggregate quality score. Meaningful in 0-100 but stored as a raw byte;
    /// see [`CaseStudyRecord::reputation_in_range`].
    pub reputation_score: u8,
    /// Set by the risk agent; paused records take no further validation
    pub is_paused: bool,
    /// K-of-N committee shares required for threshold disclosure
    pub threshold_shares_required: u8,
    /// Hash of the compression proof artifact
    pub light_proof_hash: [u8; HASH_SIZE],
    pub compression_ratio: u16,
    pub attention_token: Option<AttentionToken>,
    /// Bump seed for PDA
    pub bump: u8,
}

impl CaseStudyRecord {
    /// Bytes of the record body when `ipfs_cid` is empty and no attention
    /// token is present. Excludes the discriminator prefix.
    pub const FIXED_SIZE: usize = 32 + // ephemeral_id
        32 + // submitter
        4 +  // ipfs_cid length prefix
        32 + // metadata_hash
        1 +  // treatment_category
        2 +  // duration_days
        8 +  // created_at
        1 +  // validation_status
        4 +  // approval_count
        4 +  // rejection_count
        1 +  // reputation_score
        1 +  // is_paused
        1 +  // threshold_shares_required
        32 + // light_proof_hash
        2 +  // compression_ratio
        1 +  // attention_token_mint presence flag
        1 +  // attention_token_created_at presence flag
        1;   // bump

    /// Payload bytes that follow the two presence flags when a token exists
    pub const ATTENTION_TOKEN_PAYLOAD: usize = 32 + // attention_token_mint
        8; // attention_token_created_at

    /// Largest possible record body
    pub const MAX_SIZE: usize = Self::FIXED_SIZE + MAX_CID_LEN + Self::ATTENTION_TOKEN_PAYLOAD;

    /// Largest possible account, discriminator included
    pub const MAX_ACCOUNT_SIZE: usize = DISCRIMINATOR_SIZE + Self::MAX_SIZE;

    /// Exact account size for a record with the given CID length
    pub const fn account_size(cid_len: usize, with_attention_token: bool) -> usize {
        let token = if with_attention_token {
            Self::ATTENTION_TOKEN_PAYLOAD
        } else {
            0
        };
        DISCRIMINATOR_SIZE + Self::FIXED_SIZE + cid_len + token
    }

    /// Length of this record's encoded body, discriminator excluded
    pub fn encoded_len(&self) -> usize {
        Self::account_size(self.ipfs_cid.len(), self.has_attention_token()) - DISCRIMINATOR_SIZE
    }

    pub fn has_attention_token(&self) -> bool {
        self.attention_token.is_some()
    }

    pub fn attention_token_mint(&self) -> Option<&Pubkey> {
        self.attention_token.as_ref().map(|token| &token.mint)
    }

    pub fn attention_token_created_at(&self) -> Option<i64> {
        self.attention_token.map(|token| token.created_at)
    }

    /// Sum of weighted approvals and rejections
    pub fn total_votes(&self) -> u64 {
        u64::from(self.approval_count) + u64::from(self.rejection_count)
    }

    /// The codec accepts any byte for `reputation_score`; callers must check
    /// this before treating the score as a percentage.
    pub fn reputation_in_range(&self) -> bool {
        self.reputation_score <= MAX_REPUTATION_SCORE
    }

    /// Reputation clamped into 0-100 for display
    pub fn display_reputation(&self) -> u8 {
        self.reputation_score.min(MAX_REPUTATION_SCORE)
    }
}
