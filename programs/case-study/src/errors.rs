//! Error types for the case study codec and validation model

use thiserror::Error;

/// Why a buffer could not be decoded into a `CaseStudyRecord`.
///
/// Every variant names the field being read and the absolute byte offset
/// (prefix included) where decoding stopped, so a caller skipping a corrupt
/// account can log something actionable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error(
        "account data too short reading `{field}` at offset {offset}: \
         need at least {expected_min} bytes, got {actual}"
    )]
    BufferTooShort {
        field: &'static str,
        offset: usize,
        expected_min: usize,
        actual: usize,
    },

    #[error("`{field}` at offset {offset} declares length {declared}, outside {min}..={max}")]
    InvalidLength {
        field: &'static str,
        offset: usize,
        declared: u32,
        min: u32,
        max: u32,
    },

    #[error("`{field}` at offset {offset} holds unknown ordinal {value}")]
    UnknownEnumOrdinal {
        field: &'static str,
        offset: usize,
        value: u8,
    },

    #[error("presence flag for `{field}` at offset {offset} is {value}, expected 0 or 1")]
    OptionDiscriminator {
        field: &'static str,
        offset: usize,
        value: u8,
    },

    #[error("`{field}` at offset {offset} is {value}, expected a boolean 0 or 1")]
    InvalidBool {
        field: &'static str,
        offset: usize,
        value: u8,
    },

    #[error("`{field}` at offset {offset} is not valid UTF-8")]
    InvalidUtf8 { field: &'static str, offset: usize },

    #[error(
        "attention token fields at offset {offset} are unpaired \
         (mint present: {mint_present}, created_at present: {created_at_present})"
    )]
    UnpairedAttentionToken {
        offset: usize,
        mint_present: bool,
        created_at_present: bool,
    },

    #[error("account discriminator {actual:02x?} does not match expected {expected:02x?}")]
    DiscriminatorMismatch { expected: [u8; 8], actual: [u8; 8] },
}

impl DecodeError {
    /// Name of the field being read when decoding failed
    pub fn field(&self) -> &'static str {
        match self {
            Self::BufferTooShort { field, .. }
            | Self::InvalidLength { field, .. }
            | Self::UnknownEnumOrdinal { field, .. }
            | Self::OptionDiscriminator { field, .. }
            | Self::InvalidBool { field, .. }
            | Self::InvalidUtf8 { field, .. } => field,
            Self::UnpairedAttentionToken { .. } => "attention_token",
            Self::DiscriminatorMismatch { .. } => "discriminator",
        }
    }

    /// Absolute byte offset where decoding failed
    pub fn offset(&self) -> usize {
        match self {
            Self::BufferTooShort { offset, .. }
            | Self::InvalidLength { offset, .. }
            | Self::UnknownEnumOrdinal { offset, .. }
            | Self::OptionDiscriminator { offset, .. }
            | Self::InvalidBool { offset, .. }
            | Self::InvalidUtf8 { offset, .. }
            | Self::UnpairedAttentionToken { offset, .. } => *offset,
            Self::DiscriminatorMismatch { .. } => 0,
        }
    }
}

/// Why a record could not be encoded
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    #[error("ipfs_cid is {len} bytes, must be within {min}..={max}")]
    CidLength { len: usize, min: usize, max: usize },
}

/// Submission-time rules enforced by the case-study program
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmissionError {
    #[error("ipfs_cid `{0}` is not a recognized content identifier")]
    UnrecognizedCid(String),

    #[error("duration of {days} days is outside {min}..={max}")]
    DurationOutOfRange { days: u16, min: u16, max: u16 },

    #[error("compression ratio {ratio} is outside {min}..={max}")]
    CompressionRatioOutOfRange { ratio: u16, min: u16, max: u16 },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PubkeyError {
    #[error("public key must be 32 bytes, got {actual}")]
    WrongSize { actual: usize },

    #[error("invalid base58 public key `{input}`: {reason}")]
    Base58 { input: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_error_display_names_field_and_offset() {
        let err = DecodeError::UnknownEnumOrdinal {
            field: "validation_status",
            offset: 165,
            value: 4,
        };
        assert_eq!(
            err.to_string(),
            "`validation_status` at offset 165 holds unknown ordinal 4"
        );
        assert_eq!(err.field(), "validation_status");
        assert_eq!(err.offset(), 165);
    }

    #[test]
    fn buffer_too_short_display() {
        let err = DecodeError::BufferTooShort {
            field: "bump",
            offset: 213,
            expected_min: 214,
            actual: 213,
        };
        assert_eq!(
            err.to_string(),
            "account data too short reading `bump` at offset 213: need at least 214 bytes, got 213"
        );
    }

    #[test]
    fn unpaired_token_reports_synthetic_field() {
        let err = DecodeError::UnpairedAttentionToken {
            offset: 211,
            mint_present: true,
            created_at_present: false,
        };
        assert_eq!(err.field(), "attention_token");
        assert_eq!(err.offset(), 211);
    }

    #[test]
    fn discriminator_mismatch_renders_hex() {
        let err = DecodeError::DiscriminatorMismatch {
            expected: [0xea, 0xe1, 0x0b, 0x69, 0x5f, 0x40, 0xb2, 0x9b],
            actual: [0; 8],
        };
        assert_eq!(err.field(), "discriminator");
        assert!(err.to_string().contains("ea, e1, 0b"));
    }
}
