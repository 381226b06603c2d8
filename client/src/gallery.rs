//! Batch decoding of case study accounts into a browsable gallery
//!
//! Each account is decoded on its own. A corrupt or foreign account is logged
//! and recorded as skipped; it never hides the rest of the batch.

use dbc_case_study::{
    classify_status, compute_eligibility, compute_ownership, decode_with, is_open_for_validation,
    CaseStudyRecord, DecodeError, DecodeOptions, DisplayStatus, EligibilityThresholds, Pubkey,
};
use tracing::{debug, warn};

use crate::source::{AccountSource, RawAccount, SizeFilter, SourceError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalleryEntry {
    pub address: Pubkey,
    pub record: CaseStudyRecord,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedAccount {
    pub address: Pubkey,
    pub error: DecodeError,
}

/// Filters combined with AND; `None` / `false` means no constraint
#[derive(Debug, Clone, Default)]
pub struct GalleryQuery {
    pub owner: Option<Pubkey>,
    pub status: Option<DisplayStatus>,
    pub eligible_for_token: Option<EligibilityThresholds>,
    pub active_only: bool,
}

impl GalleryQuery {
    pub fn matches(&self, entry: &GalleryEntry) -> bool {
        let record = &entry.record;
        self.owner
            .as_ref()
            .map_or(true, |owner| compute_ownership(record, owner))
            && self
                .status
                .map_or(true, |status| classify_status(record) == status)
            && self
                .eligible_for_token
                .as_ref()
                .map_or(true, |thresholds| compute_eligibility(record, thresholds).is_eligible)
            && (!self.active_only || is_open_for_validation(record))
    }
}

/// Decoded case studies, newest first
#[derive(Debug, Clone, Default)]
pub struct Gallery {
    entries: Vec<GalleryEntry>,
    skipped: Vec<SkippedAccount>,
}

impl Gallery {
    pub fn from_accounts(
        accounts: impl IntoIterator<Item = RawAccount>,
        options: &DecodeOptions,
    ) -> Self {
        let mut gallery = Self::default();

        for account in accounts {
            match decode_with(&account.data, options) {
                Ok(record) => gallery.entries.push(GalleryEntry {
                    address: account.address,
                    record,
                }),
                Err(error) => {
                    warn!(
                        address = %account.address,
                        field = error.field(),
                        offset = error.offset(),
                        data_len = account.data.len(),
                        %error,
                        "skipping undecodable case study account"
                    );
                    gallery.skipped.push(SkippedAccount {
                        address: account.address,
                        error,
                    });
                }
            }
        }

        gallery.entries.sort_by(|a, b| {
            b.record
                .created_at
                .cmp(&a.record.created_at)
                .then_with(|| a.address.cmp(&b.address))
        });

        debug!(
            decoded = gallery.entries.len(),
            skipped = gallery.skipped.len(),
            "gallery built"
        );
        gallery
    }

    pub fn fetch(
        source: &impl AccountSource,
        program_id: &Pubkey,
        filter: SizeFilter,
        options: &DecodeOptions,
    ) -> Result<Self, SourceError> {
        let accounts = source.fetch_accounts(program_id, filter)?;
        debug!(program_id = %program_id, fetched = accounts.len(), "fetched program accounts");
        Ok(Self::from_accounts(accounts, options))
    }

    pub fn entries(&self) -> &[GalleryEntry] {
        &self.entries
    }

    pub fn skipped(&self) -> &[SkippedAccount] {
        &self.skipped
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn find(&self, address: &Pubkey) -> Option<&GalleryEntry> {
        self.entries.iter().find(|entry| entry.address == *address)
    }

    /// Records submitted by `identity`
    pub fn mine<'a>(&'a self, identity: &'a Pubkey) -> impl Iterator<Item = &'a GalleryEntry> {
        self.entries
            .iter()
            .filter(move |entry| compute_ownership(&entry.record, identity))
    }

    pub fn with_status(&self, status: DisplayStatus) -> impl Iterator<Item = &GalleryEntry> {
        self.entries
            .iter()
            .filter(move |entry| classify_status(&entry.record) == status)
    }

    pub fn eligible_for_token<'a>(
        &'a self,
        thresholds: &'a EligibilityThresholds,
    ) -> impl Iterator<Item = &'a GalleryEntry> {
        self.entries
            .iter()
            .filter(move |entry| compute_eligibility(&entry.record, thresholds).is_eligible)
    }

    /// Records still taking validator votes
    pub fn active(&self) -> impl Iterator<Item = &GalleryEntry> {
        self.entries
            .iter()
            .filter(|entry| is_open_for_validation(&entry.record))
    }

    pub fn select<'a>(&'a self, query: &'a GalleryQuery) -> impl Iterator<Item = &'a GalleryEntry> {
        self.entries.iter().filter(move |entry| query.matches(entry))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::StaticAccountSource;
    use dbc_case_study::{encode, AttentionToken, TreatmentCategory, ValidationStatus};

    fn record(seed: u8, created_at: i64, status: ValidationStatus) -> CaseStudyRecord {
        CaseStudyRecord {
            ephemeral_id: Pubkey::new_from_array([seed; 32]),
            submitter: Pubkey::new_from_array([seed % 2; 32]),
            ipfs_cid: "QmYwAPJzv5CZsnA625s3Xf2nemtYgPpHdWEz79ojWnPbdG".to_string(),
            metadata_hash: [seed; 32],
            treatment_category: TreatmentCategory::Other,
            duration_days: 10,
            created_at,
            validation_status: status,
            approval_count: 0,
            rejection_count: 0,
            reputation_score: 0,
            is_paused: false,
            threshold_shares_required: 3,
            light_proof_hash: [0; 32],
            compression_ratio: 5,
            attention_token: None,
            bump: 255,
        }
    }

    fn account(seed: u8, record: &CaseStudyRecord) -> RawAccount {
        RawAccount {
            address: Pubkey::new_from_array([100 + seed; 32]),
            data: encode(record).unwrap(),
        }
    }

    #[test]
    fn corrupt_account_is_skipped_not_fatal() {
        let good = record(1, 100, ValidationStatus::Pending);
        let mut corrupt = account(2, &record(2, 200, ValidationStatus::Pending));
        // validation_status ordinal for a 46-byte CID
        corrupt.data[119 + 46] = 9;
        let short = RawAccount {
            address: Pubkey::new_from_array([7; 32]),
            data: vec![0; 40],
        };

        let gallery = Gallery::from_accounts(
            vec![account(1, &good), corrupt.clone(), short],
            &DecodeOptions::default(),
        );

        assert_eq!(gallery.len(), 1);
        assert_eq!(gallery.entries()[0].record, good);
        assert_eq!(gallery.skipped().len(), 2);
        assert_eq!(gallery.skipped()[0].address, corrupt.address);
        assert_eq!(
            gallery.skipped()[0].error,
            DecodeError::UnknownEnumOrdinal {
                field: "validation_status",
                offset: 165,
                value: 9
            }
        );
        assert!(matches!(
            gallery.skipped()[1].error,
            DecodeError::BufferTooShort { field: "account", .. }
        ));
    }

    #[test]
    fn entries_sorted_newest_first() {
        let accounts = vec![
            account(1, &record(1, 100, ValidationStatus::Pending)),
            account(2, &record(2, 300, ValidationStatus::Pending)),
            account(3, &record(3, 200, ValidationStatus::Pending)),
            account(4, &record(4, 300, ValidationStatus::Pending)),
        ];
        let gallery = Gallery::from_accounts(accounts, &DecodeOptions::default());
        let order: Vec<i64> = gallery.entries().iter().map(|e| e.record.created_at).collect();
        assert_eq!(order, vec![300, 300, 200, 100]);
        // Ties broken by address
        assert!(gallery.entries()[0].address < gallery.entries()[1].address);
    }

    #[test]
    fn queries_filter_entries() {
        let mut eligible = record(2, 400, ValidationStatus::Approved);
        eligible.approval_count = 6;
        eligible.reputation_score = 100;
        let mut minted = eligible.clone();
        minted.ephemeral_id = Pubkey::new_from_array([42; 32]);
        minted.created_at = 50;
        minted.attention_token = Some(AttentionToken {
            mint: Pubkey::new_from_array([8; 32]),
            created_at: 60,
        });
        let mut paused = record(3, 300, ValidationStatus::UnderReview);
        paused.is_paused = true;

        let accounts = vec![
            account(1, &record(1, 100, ValidationStatus::Pending)),
            account(2, &eligible),
            account(3, &paused),
            account(4, &record(4, 200, ValidationStatus::Rejected)),
            account(5, &minted),
        ];
        let gallery = Gallery::from_accounts(accounts, &DecodeOptions::default());
        let thresholds = EligibilityThresholds::default();

        let owner = Pubkey::new_from_array([1; 32]);
        assert_eq!(gallery.mine(&owner).count(), 2);
        assert_eq!(gallery.with_status(DisplayStatus::Pending).count(), 2);
        assert_eq!(gallery.with_status(DisplayStatus::Approved).count(), 2);
        assert_eq!(gallery.with_status(DisplayStatus::Rejected).count(), 1);

        let eligible_addresses: Vec<Pubkey> =
            gallery.eligible_for_token(&thresholds).map(|e| e.address).collect();
        assert_eq!(eligible_addresses, vec![Pubkey::new_from_array([102; 32])]);

        let active: Vec<i64> = gallery.active().map(|e| e.record.created_at).collect();
        assert_eq!(active, vec![100]);

        assert!(gallery.find(&Pubkey::new_from_array([104; 32])).is_some());
        assert!(gallery.find(&Pubkey::new_from_array([9; 32])).is_none());

        let query = GalleryQuery {
            owner: Some(Pubkey::new_from_array([0; 32])),
            status: Some(DisplayStatus::Approved),
            ..Default::default()
        };
        let selected: Vec<i64> = gallery.select(&query).map(|e| e.record.created_at).collect();
        assert_eq!(selected, vec![400, 50]);
    }

    #[test]
    fn strict_options_skip_foreign_accounts() {
        let mut foreign = account(1, &record(1, 100, ValidationStatus::Pending));
        foreign.data[0] ^= 0xff;
        let gallery = Gallery::from_accounts(vec![foreign.clone()], &DecodeOptions::strict());
        assert!(gallery.is_empty());
        assert!(matches!(
            gallery.skipped()[0].error,
            DecodeError::DiscriminatorMismatch { .. }
        ));

        let lenient = Gallery::from_accounts(vec![foreign], &DecodeOptions::default());
        assert_eq!(lenient.len(), 1);
    }

    #[test]
    fn fetch_goes_through_source() {
        let program_id = Pubkey::new_from_array([9; 32]);
        let source = StaticAccountSource::new(
            program_id,
            vec![account(1, &record(1, 100, ValidationStatus::Pending))],
        );
        let gallery =
            Gallery::fetch(&source, &program_id, SizeFilter::Any, &DecodeOptions::default())
                .unwrap();
        assert_eq!(gallery.len(), 1);

        let filtered = Gallery::fetch(
            &source,
            &program_id,
            SizeFilter::DataSize(CaseStudyRecord::account_size(46, true)),
            &DecodeOptions::default(),
        )
        .unwrap();
        assert!(filtered.is_empty());
    }
}
