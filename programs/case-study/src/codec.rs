//! Byte-exact codec for the `CaseStudy` account
//!
//! Layout (little-endian throughout):
//!
//! | Field                         | Encoding                         |
//! |-------------------------------|----------------------------------|
//! | discriminator                 | 8 opaque bytes                   |
//! | ephemeral_id, submitter       | 32 bytes each                    |
//! | ipfs_cid                      | u32 length + UTF-8 bytes (1-100) |
//! | metadata_hash                 | 32 bytes                         |
//! | treatment_category            | u8 ordinal (0-4)                 |
//! | duration_days                 | u16                              |
//! | created_at                    | i64                              |
//! | validation_status             | u8 ordinal (0-3)                 |
//! | approval_count, rejection_count | u32 each                       |
//! | reputation_score              | u8                               |
//! | is_paused                     | u8 boolean (0/1)                 |
//! | threshold_shares_required     | u8                               |
//! | light_proof_hash              | 32 bytes                         |
//! | compression_ratio             | u16                              |
//! | attention_token_mint          | u8 flag + 32 bytes if flag is 1  |
//! | attention_token_created_at    | u8 flag + i64 if flag is 1       |
//! | bump                          | u8                               |
//!
//! This is the Borsh encoding Anchor uses for the account. Decoding is strict:
//! the whole record is read through one bounds-checked [`RecordReader`], and any
//! structural anomaly fails the decode instead of producing a partial record.

use crate::{
    errors::{DecodeError, EncodeError},
    pubkey::Pubkey,
    state::{
        AttentionToken, CaseStudyRecord, TreatmentCategory, ValidationStatus,
        CASE_STUDY_DISCRIMINATOR, DISCRIMINATOR_SIZE, HASH_SIZE, MAX_CID_LEN, MIN_CID_LEN,
    },
};

/// How to treat the bytes in front of the record body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOptions {
    prefix_len: usize,
    expected_discriminator: Option<[u8; DISCRIMINATOR_SIZE]>,
}

impl Default for DecodeOptions {
    /// Skip the 8-byte discriminator without inspecting it
    fn default() -> Self {
        Self {
            prefix_len: DISCRIMINATOR_SIZE,
            expected_discriminator: None,
        }
    }
}

impl DecodeOptions {
    /// Require the prefix to carry the `CaseStudy` account discriminator
    pub fn strict() -> Self {
        Self::default().verify_discriminator(CASE_STUDY_DISCRIMINATOR)
    }

    /// Skip `prefix_len` opaque bytes before the body
    pub fn with_prefix_len(prefix_len: usize) -> Self {
        Self {
            prefix_len,
            expected_discriminator: None,
        }
    }

    /// Compare the first 8 prefix bytes against `discriminator`.
    /// Widens the prefix to at least 8 bytes.
    pub fn verify_discriminator(mut self, discriminator: [u8; DISCRIMINATOR_SIZE]) -> Self {
        self.prefix_len = self.prefix_len.max(DISCRIMINATOR_SIZE);
        self.expected_discriminator = Some(discriminator);
        self
    }

    pub fn prefix_len(&self) -> usize {
        self.prefix_len
    }

    pub fn expected_discriminator(&self) -> Option<[u8; DISCRIMINATOR_SIZE]> {
        self.expected_discriminator
    }
}

// ============================================================================
// Reader
// ============================================================================

/// Bounds-checked cursor over account bytes.
///
/// Every fixed-width read either consumes exactly its width or fails without
/// moving, so the position can never drift out of step with the layout.
#[derive(Debug, Clone)]
pub struct RecordReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> RecordReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub fn take(&mut self, field: &'static str, len: usize) -> Result<&'a [u8], DecodeError> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|end| *end <= self.data.len())
            .ok_or(DecodeError::BufferTooShort {
                field,
                offset: self.pos,
                expected_min: self.pos.saturating_add(len),
                actual: self.data.len(),
            })?;
        let bytes = &self.data[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }

    pub fn take_array<const N: usize>(
        &mut self,
        field: &'static str,
    ) -> Result<[u8; N], DecodeError> {
        let bytes = self.take(field, N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        Ok(out)
    }

    pub fn read_u8(&mut self, field: &'static str) -> Result<u8, DecodeError> {
        Ok(self.take_array::<1>(field)?[0])
    }

    pub fn read_u16(&mut self, field: &'static str) -> Result<u16, DecodeError> {
        Ok(u16::from_le_bytes(self.take_array(field)?))
    }

    pub fn read_u32(&mut self, field: &'static str) -> Result<u32, DecodeError> {
        Ok(u32::from_le_bytes(self.take_array(field)?))
    }

    pub fn read_i64(&mut self, field: &'static str) -> Result<i64, DecodeError> {
        Ok(i64::from_le_bytes(self.take_array(field)?))
    }

    pub fn read_bool(&mut self, field: &'static str) -> Result<bool, DecodeError> {
        let offset = self.pos;
        match self.read_u8(field)? {
            0 => Ok(false),
            1 => Ok(true),
            value => Err(DecodeError::InvalidBool {
                field,
                offset,
                value,
            }),
        }
    }

    pub fn read_pubkey(&mut self, field: &'static str) -> Result<Pubkey, DecodeError> {
        self.take_array(field).map(Pubkey::new_from_array)
    }

    pub fn read_hash(&mut self, field: &'static str) -> Result<[u8; HASH_SIZE], DecodeError> {
        self.take_array(field)
    }

    /// u32 length prefix followed by that many UTF-8 bytes. The declared length
    /// is checked against `min..=max` before any payload byte is touched.
    pub fn read_string(
        &mut self,
        field: &'static str,
        min: usize,
        max: usize,
    ) -> Result<String, DecodeError> {
        let offset = self.pos;
        let declared = self.read_u32(field)?;
        let len = declared as usize;
        if len < min || len > max {
            return Err(DecodeError::InvalidLength {
                field,
                offset,
                declared,
                min: min as u32,
                max: max as u32,
            });
        }
        let payload_offset = self.pos;
        let bytes = self.take(field, len)?;
        let text = std::str::from_utf8(bytes).map_err(|_| DecodeError::InvalidUtf8 {
            field,
            offset: payload_offset,
        })?;
        Ok(text.to_owned())
    }

    /// One presence byte, then the payload only when the flag is 1
    pub fn read_option<T>(
        &mut self,
        field: &'static str,
        read: impl FnOnce(&mut Self) -> Result<T, DecodeError>,
    ) -> Result<Option<T>, DecodeError> {
        let offset = self.pos;
        match self.read_u8(field)? {
            0 => Ok(None),
            1 => read(self).map(Some),
            value => Err(DecodeError::OptionDiscriminator {
                field,
                offset,
                value,
            }),
        }
    }

    fn read_treatment_category(&mut self) -> Result<TreatmentCategory, DecodeError> {
        const FIELD: &str = "treatment_category";
        let offset = self.pos;
        let value = self.read_u8(FIELD)?;
        TreatmentCategory::from_u8(value).ok_or(DecodeError::UnknownEnumOrdinal {
            field: FIELD,
            offset,
            value,
        })
    }

    fn read_validation_status(&mut self) -> Result<ValidationStatus, DecodeError> {
        const FIELD: &str = "validation_status";
        let offset = self.pos;
        let value = self.read_u8(FIELD)?;
        ValidationStatus::from_u8(value).ok_or(DecodeError::UnknownEnumOrdinal {
            field: FIELD,
            offset,
            value,
        })
    }
}

// ============================================================================
// Decode
// ============================================================================

/// Decode an account, skipping the 8-byte discriminator unchecked
pub fn decode(data: &[u8]) -> Result<CaseStudyRecord, DecodeError> {
    decode_with(data, &DecodeOptions::default())
}

pub fn decode_with(data: &[u8], options: &DecodeOptions) -> Result<CaseStudyRecord, DecodeError> {
    decode_prefixed(data, options).map(|(record, _)| record)
}

/// Decode a record and report how many bytes it occupied, prefix included.
/// Bytes past the record (unused account capacity) are ignored.
pub fn decode_prefixed(
    data: &[u8],
    options: &DecodeOptions,
) -> Result<(CaseStudyRecord, usize), DecodeError> {
    let expected_min = options.prefix_len.saturating_add(CaseStudyRecord::FIXED_SIZE);
    if data.len() < expected_min {
        return Err(DecodeError::BufferTooShort {
            field: "account",
            offset: 0,
            expected_min,
            actual: data.len(),
        });
    }

    let mut reader = RecordReader::new(data);
    let prefix = reader.take("discriminator", options.prefix_len)?;
    if let Some(expected) = options.expected_discriminator {
        let mut actual = [0u8; DISCRIMINATOR_SIZE];
        actual.copy_from_slice(&prefix[..DISCRIMINATOR_SIZE]);
        if actual != expected {
            return Err(DecodeError::DiscriminatorMismatch { expected, actual });
        }
    }

    let ephemeral_id = reader.read_pubkey("ephemeral_id")?;
    let submitter = reader.read_pubkey("submitter")?;
    let ipfs_cid = reader.read_string("ipfs_cid", MIN_CID_LEN, MAX_CID_LEN)?;
    let metadata_hash = reader.read_hash("metadata_hash")?;
    let treatment_category = reader.read_treatment_category()?;
    let duration_days = reader.read_u16("duration_days")?;
    let created_at = reader.read_i64("created_at")?;
    let validation_status = reader.read_validation_status()?;
    let approval_count = reader.read_u32("approval_count")?;
    let rejection_count = reader.read_u32("rejection_count")?;
    let reputation_score = reader.read_u8("reputation_score")?;
    let is_paused = reader.read_bool("is_paused")?;
    let threshold_shares_required = reader.read_u8("threshold_shares_required")?;
    let light_proof_hash = reader.read_hash("light_proof_hash")?;
    let compression_ratio = reader.read_u16("compression_ratio")?;

    let token_offset = reader.position();
    let mint = reader.read_option("attention_token_mint", |r| {
        r.read_pubkey("attention_token_mint")
    })?;
    let token_created_at = reader.read_option("attention_token_created_at", |r| {
        r.read_i64("attention_token_created_at")
    })?;
    let attention_token = match (mint, token_created_at) {
        (Some(mint), Some(created_at)) => Some(AttentionToken { mint, created_at }),
        (None, None) => None,
        (mint, created_at) => {
            return Err(DecodeError::UnpairedAttentionToken {
                offset: token_offset,
                mint_present: mint.is_some(),
                created_at_present: created_at.is_some(),
            })
        }
    };

    let bump = reader.read_u8("bump")?;

    let record = CaseStudyRecord {
        ephemeral_id,
        submitter,
        ipfs_cid,
        metadata_hash,
        treatment_category,
        duration_days,
        created_at,
        validation_status,
        approval_count,
        rejection_count,
        reputation_score,
        is_paused,
        threshold_shares_required,
        light_proof_hash,
        compression_ratio,
        attention_token,
        bump,
    };
    Ok((record, reader.position()))
}

// ============================================================================
// Encode
// ============================================================================

/// Append-only little-endian writer mirroring [`RecordReader`]
#[derive(Debug, Default, Clone)]
pub struct RecordWriter {
    buf: Vec<u8>,
}

impl RecordWriter {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    pub fn write_u8(&mut self, value: u8) {
        self.buf.push(value);
    }

    pub fn write_u16(&mut self, value: u16) {
        self.write_bytes(&value.to_le_bytes());
    }

    pub fn write_u32(&mut self, value: u32) {
        self.write_bytes(&value.to_le_bytes());
    }

    pub fn write_i64(&mut self, value: i64) {
        self.write_bytes(&value.to_le_bytes());
    }

    pub fn write_bool(&mut self, value: bool) {
        self.write_u8(u8::from(value));
    }

    /// u32 prefix holds the UTF-8 byte length, not the character count
    pub fn write_string(&mut self, value: &str) {
        self.write_u32(value.len() as u32);
        self.write_bytes(value.as_bytes());
    }

    pub fn write_option<T>(&mut self, value: Option<T>, write: impl FnOnce(&mut Self, T)) {
        match value {
            Some(inner) => {
                self.write_u8(1);
                write(self, inner);
            }
            None => self.write_u8(0),
        }
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

/// Encode a full account: `CaseStudy` discriminator followed by the body
pub fn encode(record: &CaseStudyRecord) -> Result<Vec<u8>, EncodeError> {
    let mut writer = RecordWriter::with_capacity(DISCRIMINATOR_SIZE + record.encoded_len());
    writer.write_bytes(&CASE_STUDY_DISCRIMINATOR);
    write_body(&mut writer, record)?;
    Ok(writer.into_bytes())
}

/// Encode only the record body, without a discriminator
pub fn encode_body(record: &CaseStudyRecord) -> Result<Vec<u8>, EncodeError> {
    let mut writer = RecordWriter::with_capacity(record.encoded_len());
    write_body(&mut writer, record)?;
    Ok(writer.into_bytes())
}

fn write_body(writer: &mut RecordWriter, record: &CaseStudyRecord) -> Result<(), EncodeError> {
    let cid_len = record.ipfs_cid.len();
    if !(MIN_CID_LEN..=MAX_CID_LEN).contains(&cid_len) {
        return Err(EncodeError::CidLength {
            len: cid_len,
            min: MIN_CID_LEN,
            max: MAX_CID_LEN,
        });
    }

    writer.write_bytes(record.ephemeral_id.as_ref());
    writer.write_bytes(record.submitter.as_ref());
    writer.write_string(&record.ipfs_cid);
    writer.write_bytes(&record.metadata_hash);
    writer.write_u8(record.treatment_category.as_u8());
    writer.write_u16(record.duration_days);
    writer.write_i64(record.created_at);
    writer.write_u8(record.validation_status.as_u8());
    writer.write_u32(record.approval_count);
    writer.write_u32(record.rejection_count);
    writer.write_u8(record.reputation_score);
    writer.write_bool(record.is_paused);
    writer.write_u8(record.threshold_shares_required);
    writer.write_bytes(&record.light_proof_hash);
    writer.write_u16(record.compression_ratio);
    writer.write_option(record.attention_token_mint(), |w, mint| {
        w.write_bytes(mint.as_ref())
    });
    writer.write_option(record.attention_token_created_at(), |w, created_at| {
        w.write_i64(created_at)
    });
    writer.write_u8(record.bump);
    Ok(())
}
