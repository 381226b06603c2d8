//! Fuzz target for decoding hostile or damaged account data
//!
//! Tests invariants:
//! - decode never panics on arbitrary bytes
//! - every strict prefix of a valid encoding fails with `BufferTooShort`
//! - out-of-range enum ordinals, booleans and presence flags are rejected
//!   with the field name and absolute offset
//! - whatever decodes re-encodes to exactly the bytes it was read from
//!
//! Run with: cargo test --release -p dbc-case-study-fuzz malformed_input

use crate::*;
use dbc_case_study::{
    decode, decode_prefixed, decode_with, encode, DecodeError, DecodeOptions,
    CASE_STUDY_DISCRIMINATOR, DISCRIMINATOR_SIZE,
};
use proptest::prelude::*;

// Offsets of single-byte fields relative to the end of the CID payload
const CATEGORY_AFTER_CID: usize = 32;
const STATUS_AFTER_CID: usize = 43;
const PAUSED_AFTER_CID: usize = 53;
const MINT_FLAG_AFTER_CID: usize = 89;

/// First byte after the CID payload, prefix included
fn cid_end(cid_len: usize) -> usize {
    DISCRIMINATOR_SIZE + 32 + 32 + 4 + cid_len
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(1000))]

    #[test]
    fn fuzz_arbitrary_bytes_never_panic(data in prop::collection::vec(any::<u8>(), 0..400)) {
        if let Ok((record, consumed)) = decode_prefixed(&data, &DecodeOptions::default()) {
            // Strict decoding means the consumed bytes are the canonical encoding
            let reencoded = encode(&record).unwrap();
            prop_assert_eq!(&reencoded[DISCRIMINATOR_SIZE..], &data[DISCRIMINATOR_SIZE..consumed]);
        }
    }

    #[test]
    fn fuzz_truncation(record in arb_record(), cut in any::<prop::sample::Index>()) {
        let encoded = encode(&record).unwrap();
        let len = cut.index(encoded.len());
        prop_assert_eq!(check_truncation(&encoded, len), CodecInvariantResult::Valid);
    }

    #[test]
    fn fuzz_single_byte_corruption(record in arb_record(), corruption in arb_byte_corruption()) {
        let mut encoded = encode(&record).unwrap();
        let at = corruption.position.index(encoded.len());
        encoded[at] = corruption.value;

        match decode(&encoded) {
            Ok(decoded) => {
                let reencoded = encode(&decoded).unwrap();
                prop_assert_eq!(
                    &reencoded[DISCRIMINATOR_SIZE..],
                    &encoded[DISCRIMINATOR_SIZE..reencoded.len()]
                );
            }
            Err(err) => prop_assert!(err.offset() <= encoded.len(), "offset past buffer: {}", err),
        }
    }

    #[test]
    fn fuzz_unknown_status_ordinal(record in arb_record(), value in 4u8..=u8::MAX) {
        let mut encoded = encode(&record).unwrap();
        let offset = cid_end(record.ipfs_cid.len()) + STATUS_AFTER_CID;
        encoded[offset] = value;
        prop_assert_eq!(
            decode(&encoded),
            Err(DecodeError::UnknownEnumOrdinal { field: "validation_status", offset, value })
        );
    }

    #[test]
    fn fuzz_unknown_category_ordinal(record in arb_record(), value in 5u8..=u8::MAX) {
        let mut encoded = encode(&record).unwrap();
        let offset = cid_end(record.ipfs_cid.len()) + CATEGORY_AFTER_CID;
        encoded[offset] = value;
        prop_assert_eq!(
            decode(&encoded),
            Err(DecodeError::UnknownEnumOrdinal { field: "treatment_category", offset, value })
        );
    }

    #[test]
    fn fuzz_non_boolean_pause_flag(record in arb_record(), value in 2u8..=u8::MAX) {
        let mut encoded = encode(&record).unwrap();
        let offset = cid_end(record.ipfs_cid.len()) + PAUSED_AFTER_CID;
        encoded[offset] = value;
        prop_assert_eq!(
            decode(&encoded),
            Err(DecodeError::InvalidBool { field: "is_paused", offset, value })
        );
    }

    #[test]
    fn fuzz_bad_presence_flag(record in arb_record(), value in 2u8..=u8::MAX) {
        let mut encoded = encode(&record).unwrap();
        let offset = cid_end(record.ipfs_cid.len()) + MINT_FLAG_AFTER_CID;
        encoded[offset] = value;
        prop_assert_eq!(
            decode(&encoded),
            Err(DecodeError::OptionDiscriminator { field: "attention_token_mint", offset, value })
        );
    }

    #[test]
    fn fuzz_oversized_cid_length(record in arb_record(), declared in 101u32..=u32::MAX) {
        let mut encoded = encode(&record).unwrap();
        let offset = DISCRIMINATOR_SIZE + 64;
        encoded[offset..offset + 4].copy_from_slice(&declared.to_le_bytes());
        prop_assert_eq!(
            decode(&encoded),
            Err(DecodeError::InvalidLength { field: "ipfs_cid", offset, declared, min: 1, max: 100 })
        );
    }

    #[test]
    fn fuzz_strict_mode_rejects_foreign_discriminator(
        record in arb_record(),
        prefix in prop::array::uniform8(any::<u8>()),
    ) {
        prop_assume!(prefix != CASE_STUDY_DISCRIMINATOR);
        let mut encoded = encode(&record).unwrap();
        encoded[..DISCRIMINATOR_SIZE].copy_from_slice(&prefix);

        prop_assert_eq!(
            decode_with(&encoded, &DecodeOptions::strict()),
            Err(DecodeError::DiscriminatorMismatch {
                expected: CASE_STUDY_DISCRIMINATOR,
                actual: prefix,
            })
        );
        // The default mode never looks at the prefix
        prop_assert_eq!(decode(&encoded).unwrap(), record);
    }
}
