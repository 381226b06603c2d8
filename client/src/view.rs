//! JSON views printed by the CLI

use dbc_case_study::{
    check_record_consistency, cid_kind, classify_status, compute_eligibility,
    derive_validation_state, CaseStudyRecord, CidKind, ConsistencyReport, DisplayStatus,
    EligibilityResult, Pubkey, ValidationState, ValidationStatus, CASE_STUDY_DISCRIMINATOR,
    DISCRIMINATOR_SIZE, MAX_CID_LEN,
};
use serde::Serialize;

use crate::{
    config::ClientConfig,
    gallery::{Gallery, GalleryEntry},
};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseStudyView<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<Pubkey>,
    pub ephemeral_id: Pubkey,
    pub submitter: Pubkey,
    pub ipfs_cid: &'a str,
    pub cid_kind: Option<&'static str>,
    pub metadata_hash: String,
    pub treatment_category: &'static str,
    pub duration_days: u16,
    pub created_at: i64,
    pub validation_status: ValidationStatus,
    pub display_status: DisplayStatus,
    pub approval_count: u32,
    pub rejection_count: u32,
    pub reputation_score: u8,
    pub reputation_in_range: bool,
    pub is_paused: bool,
    pub threshold_shares_required: u8,
    pub light_proof_hash: String,
    pub compression_ratio: u16,
    pub attention_token_mint: Option<Pubkey>,
    pub attention_token_created_at: Option<i64>,
    pub bump: u8,
    pub state: ValidationState,
    pub eligibility: EligibilityResult,
    pub consistency: ConsistencyReport,
}

impl<'a> CaseStudyView<'a> {
    pub fn new(
        address: Option<&Pubkey>,
        record: &'a CaseStudyRecord,
        viewer: Option<&Pubkey>,
        config: &ClientConfig,
    ) -> Self {
        Self {
            address: address.copied(),
            ephemeral_id: record.ephemeral_id,
            submitter: record.submitter,
            ipfs_cid: &record.ipfs_cid,
            cid_kind: cid_kind(&record.ipfs_cid).map(|kind| match kind {
                CidKind::V0 => "v0",
                CidKind::V1 => "v1",
            }),
            metadata_hash: hex::encode(record.metadata_hash),
            treatment_category: record.treatment_category.label(),
            duration_days: record.duration_days,
            created_at: record.created_at,
            validation_status: record.validation_status,
            display_status: classify_status(record),
            approval_count: record.approval_count,
            rejection_count: record.rejection_count,
            reputation_score: record.reputation_score,
            reputation_in_range: record.reputation_in_range(),
            is_paused: record.is_paused,
            threshold_shares_required: record.threshold_shares_required,
            light_proof_hash: hex::encode(record.light_proof_hash),
            compression_ratio: record.compression_ratio,
            attention_token_mint: record.attention_token_mint().copied(),
            attention_token_created_at: record.attention_token_created_at(),
            bump: record.bump,
            state: derive_validation_state(record, viewer, &config.thresholds),
            eligibility: compute_eligibility(record, &config.thresholds),
            consistency: check_record_consistency(record, &config.consensus),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedView {
    pub address: Pubkey,
    pub field: &'static str,
    pub offset: usize,
    pub error: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryView<'a> {
    pub cluster: &'a str,
    pub total: usize,
    pub entries: Vec<CaseStudyView<'a>>,
    pub skipped: Vec<SkippedView>,
}

/// One field of the account layout
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldSpan {
    pub name: &'static str,
    pub offset: usize,
    pub size: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutView {
    pub discriminator: String,
    pub cid_len: usize,
    pub with_attention_token: bool,
    pub account_size: usize,
    pub fixed_size: usize,
    pub max_account_size: usize,
    pub fields: Vec<FieldSpan>,
}

/// Field offsets of an account with a `cid_len`-byte CID
pub fn layout_fields(cid_len: usize, with_attention_token: bool) -> Vec<FieldSpan> {
    let mut sizes: Vec<(&'static str, usize)> = vec![
        ("discriminator", DISCRIMINATOR_SIZE),
        ("ephemeral_id", 32),
        ("submitter", 32),
        ("ipfs_cid_len", 4),
        ("ipfs_cid", cid_len),
        ("metadata_hash", 32),
        ("treatment_category", 1),
        ("duration_days", 2),
        ("created_at", 8),
        ("validation_status", 1),
        ("approval_count", 4),
        ("rejection_count", 4),
        ("reputation_score", 1),
        ("is_paused", 1),
        ("threshold_shares_required", 1),
        ("light_proof_hash", 32),
        ("compression_ratio", 2),
        ("attention_token_mint_flag", 1),
    ];
    if with_attention_token {
        sizes.push(("attention_token_mint", 32));
    }
    sizes.push(("attention_token_created_at_flag", 1));
    if with_attention_token {
        sizes.push(("attention_token_created_at", 8));
    }
    sizes.push(("bump", 1));

    let mut offset = 0;
    sizes
        .into_iter()
        .map(|(name, size)| {
            let span = FieldSpan { name, offset, size };
            offset += size;
            span
        })
        .collect()
}

pub fn render_record(
    address: Option<&Pubkey>,
    record: &CaseStudyRecord,
    viewer: Option<&Pubkey>,
    config: &ClientConfig,
) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&CaseStudyView::new(address, record, viewer, config))
}

pub fn render_gallery<'a>(
    gallery: &'a Gallery,
    entries: impl IntoIterator<Item = &'a GalleryEntry>,
    viewer: Option<&Pubkey>,
    config: &'a ClientConfig,
) -> serde_json::Result<String> {
    let entries: Vec<CaseStudyView<'a>> = entries
        .into_iter()
        .map(|entry| CaseStudyView::new(Some(&entry.address), &entry.record, viewer, config))
        .collect();
    let skipped = gallery
        .skipped()
        .iter()
        .map(|skipped| SkippedView {
            address: skipped.address,
            field: skipped.error.field(),
            offset: skipped.error.offset(),
            error: skipped.error.to_string(),
        })
        .collect();
    serde_json::to_string_pretty(&GalleryView {
        cluster: &config.cluster,
        total: gallery.len(),
        entries,
        skipped,
    })
}

pub fn render_eligibility(result: &EligibilityResult) -> serde_json::Result<String> {
    serde_json::to_string_pretty(result)
}

pub fn render_layout(cid_len: usize, with_attention_token: bool) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&LayoutView {
        discriminator: hex::encode(CASE_STUDY_DISCRIMINATOR),
        cid_len,
        with_attention_token,
        account_size: CaseStudyRecord::account_size(cid_len, with_attention_token),
        fixed_size: CaseStudyRecord::FIXED_SIZE,
        max_account_size: CaseStudyRecord::account_size(MAX_CID_LEN, true),
        fields: layout_fields(cid_len, with_attention_token),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use dbc_case_study::{encode, AttentionToken, TreatmentCategory};
    use serde_json::Value;

    fn record() -> CaseStudyRecord {
        CaseStudyRecord {
            ephemeral_id: Pubkey::new_from_array([1; 32]),
            submitter: Pubkey::new_from_array([2; 32]),
            ipfs_cid: "QmYwAPJzv5CZsnA625s3Xf2nemtYgPpHdWEz79ojWnPbdG".to_string(),
            metadata_hash: [0xab; 32],
            treatment_category: TreatmentCategory::Lifestyle,
            duration_days: 90,
            created_at: 1_700_000_000,
            validation_status: ValidationStatus::UnderReview,
            approval_count: 6,
            rejection_count: 2,
            reputation_score: 75,
            is_paused: false,
            threshold_shares_required: 3,
            light_proof_hash: [0; 32],
            compression_ratio: 10,
            attention_token: None,
            bump: 254,
        }
    }

    #[test]
    fn layout_matches_encoder() {
        for with_token in [false, true] {
            let mut r = record();
            if with_token {
                r.attention_token = Some(AttentionToken {
                    mint: Pubkey::new_from_array([3; 32]),
                    created_at: 5,
                });
            }
            let encoded = encode(&r).unwrap();
            let fields = layout_fields(46, with_token);
            let last = fields.last().unwrap();
            assert_eq!(last.name, "bump");
            assert_eq!(last.offset + last.size, encoded.len());
            assert_eq!(encoded[last.offset], 254);

            let status = fields.iter().find(|f| f.name == "validation_status").unwrap();
            assert_eq!(status.offset, 165);
            assert_eq!(encoded[status.offset], ValidationStatus::UnderReview.as_u8());
        }
    }

    #[test]
    fn record_view_has_derived_fields() {
        let config = ClientConfig::default();
        let json = render_record(
            Some(&Pubkey::new_from_array([9; 32])),
            &record(),
            Some(&Pubkey::new_from_array([2; 32])),
            &config,
        )
        .unwrap();
        let value: Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["displayStatus"], "pending");
        assert_eq!(value["treatmentCategory"], "Lifestyle");
        assert_eq!(value["cidKind"], "v0");
        assert_eq!(value["metadataHash"], "ab".repeat(32));
        assert_eq!(value["state"]["isOwner"], true);
        assert_eq!(value["state"]["displayCategory"], "Lifestyle");
        assert_eq!(value["eligibility"]["isEligible"], true);
        assert_eq!(value["attentionTokenMint"], Value::Null);
        // UnderReview while the tally says Approved
        assert_eq!(value["consistency"]["issues"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn gallery_view_lists_skipped_accounts() {
        use crate::source::RawAccount;
        use dbc_case_study::DecodeOptions;

        let good = RawAccount {
            address: Pubkey::new_from_array([10; 32]),
            data: encode(&record()).unwrap(),
        };
        let bad = RawAccount {
            address: Pubkey::new_from_array([11; 32]),
            data: vec![0; 12],
        };
        let gallery = Gallery::from_accounts(vec![good, bad], &DecodeOptions::default());
        let config = ClientConfig::default();

        let json = render_gallery(&gallery, gallery.entries(), None, &config).unwrap();
        let value: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["cluster"], "localnet");
        assert_eq!(value["total"], 1);
        assert_eq!(value["entries"][0]["state"]["isOwner"], false);
        assert_eq!(value["skipped"][0]["field"], "account");
        assert_eq!(value["skipped"][0]["offset"], 0);
    }

    #[test]
    fn layout_view_reports_sizes() {
        let value: Value = serde_json::from_str(&render_layout(46, false).unwrap()).unwrap();
        assert_eq!(value["accountSize"], 214);
        assert_eq!(value["fixedSize"], 160);
        assert_eq!(value["maxAccountSize"], 308);
        assert_eq!(value["discriminator"], "eae10b695f40b29b");
    }
}
