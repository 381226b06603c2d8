#![forbid(unsafe_code)]
//! Dallas Buyers Club case study records
//!
//! Byte-exact layout, codec and validation state model for the `CaseStudy`
//! account owned by the case-study program. Everything in this crate is pure:
//! callers hand in account bytes they fetched themselves and get back typed
//! records and derived facts. Nothing here performs I/O or logs.
//!
//! ```
//! use dbc_case_study::{classify_status, decode, encode, DisplayStatus};
//! # use dbc_case_study::{CaseStudyRecord, Pubkey, TreatmentCategory, ValidationStatus};
//! # let record = CaseStudyRecord {
//! #     ephemeral_id: Pubkey::new_from_array([1; 32]),
//! #     submitter: Pubkey::new_from_array([2; 32]),
//! #     ipfs_cid: "QmYwAPJzv5CZsnA625s3Xf2nemtYgPpHdWEz79ojWnPbdG".to_string(),
//! #     metadata_hash: [3; 32],
//! #     treatment_category: TreatmentCategory::Lifestyle,
//! #     duration_days: 90,
//! #     created_at: 1_700_000_000,
//! #     validation_status: ValidationStatus::Approved,
//! #     approval_count: 6,
//! #     rejection_count: 1,
//! #     reputation_score: 85,
//! #     is_paused: false,
//! #     threshold_shares_required: 3,
//! #     light_proof_hash: [4; 32],
//! #     compression_ratio: 10,
//! #     attention_token: None,
//! #     bump: 254,
//! # };
//! let bytes = encode(&record).unwrap();
//! let decoded = decode(&bytes).unwrap();
//! assert_eq!(decoded, record);
//! assert_eq!(classify_status(&decoded), DisplayStatus::Approved);
//! ```

pub mod codec;
pub mod errors;
pub mod pubkey;
pub mod state;
pub mod utils;
pub mod validation;

pub use codec::{
    decode, decode_prefixed, decode_with, encode, encode_body, DecodeOptions, RecordReader,
    RecordWriter,
};
pub use errors::{DecodeError, EncodeError, PubkeyError, SubmissionError};
pub use pubkey::Pubkey;
pub use state::*;
pub use utils::validation::{cid_kind, validate_submission, CidKind};
pub use validation::*;
