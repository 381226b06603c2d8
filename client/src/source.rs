//! Where account bytes come from
//!
//! The gallery never talks to a cluster itself. It asks an [`AccountSource`]
//! for the raw accounts owned by the program and decodes them locally.

use std::{
    fs,
    path::{Path, PathBuf},
};

use base64::{engine::general_purpose::STANDARD, Engine as _};
use dbc_case_study::Pubkey;
use serde::Deserialize;
use thiserror::Error;

/// Account address plus its full data buffer, discriminator included
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawAccount {
    pub address: Pubkey,
    pub data: Vec<u8>,
}

/// Server-side size filter, as in `getProgramAccounts`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SizeFilter {
    #[default]
    Any,
    DataSize(usize),
}

impl SizeFilter {
    pub fn matches(&self, data_len: usize) -> bool {
        match self {
            Self::Any => true,
            Self::DataSize(size) => *size == data_len,
        }
    }
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to read account snapshot {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("account snapshot is not valid JSON")]
    Parse(#[source] serde_json::Error),

    #[error("account {address} data is not valid base64")]
    InvalidData {
        address: Pubkey,
        #[source]
        source: base64::DecodeError,
    },
}

pub trait AccountSource {
    /// All accounts owned by `program_id` that pass `filter`
    fn fetch_accounts(
        &self,
        program_id: &Pubkey,
        filter: SizeFilter,
    ) -> Result<Vec<RawAccount>, SourceError>;
}

/// In-memory accounts of a single program, typically loaded from a snapshot
/// file of `[{ "address": "<base58>", "data": "<base64>" }]`.
#[derive(Debug, Clone, Default)]
pub struct StaticAccountSource {
    owner: Pubkey,
    accounts: Vec<RawAccount>,
}

#[derive(Deserialize)]
struct SnapshotEntry {
    address: Pubkey,
    data: String,
}

impl StaticAccountSource {
    pub fn new(owner: Pubkey, accounts: Vec<RawAccount>) -> Self {
        Self { owner, accounts }
    }

    pub fn from_json_str(owner: Pubkey, json: &str) -> Result<Self, SourceError> {
        let entries: Vec<SnapshotEntry> = serde_json::from_str(json).map_err(SourceError::Parse)?;
        let accounts = entries
            .into_iter()
            .map(|entry| {
                let data = STANDARD
                    .decode(entry.data.as_bytes())
                    .map_err(|source| SourceError::InvalidData {
                        address: entry.address,
                        source,
                    })?;
                Ok(RawAccount {
                    address: entry.address,
                    data,
                })
            })
            .collect::<Result<Vec<_>, SourceError>>()?;
        Ok(Self::new(owner, accounts))
    }

    pub fn load(owner: Pubkey, path: &Path) -> Result<Self, SourceError> {
        let json = fs::read_to_string(path).map_err(|source| SourceError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(owner, &json)
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

impl AccountSource for StaticAccountSource {
    fn fetch_accounts(
        &self,
        program_id: &Pubkey,
        filter: SizeFilter,
    ) -> Result<Vec<RawAccount>, SourceError> {
        if *program_id != self.owner {
            return Ok(Vec::new());
        }
        Ok(self
            .accounts
            .iter()
            .filter(|account| filter.matches(account.data.len()))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owner() -> Pubkey {
        Pubkey::new_from_array([9; 32])
    }

    #[test]
    fn loads_snapshot_entries() {
        let address = Pubkey::new_from_array([1; 32]);
        let json = format!(
            r#"[{{"address": "{address}", "data": "{}"}}]"#,
            STANDARD.encode([1u8, 2, 3])
        );
        let source = StaticAccountSource::from_json_str(owner(), &json).unwrap();
        assert_eq!(source.len(), 1);

        let accounts = source.fetch_accounts(&owner(), SizeFilter::Any).unwrap();
        assert_eq!(
            accounts,
            vec![RawAccount {
                address,
                data: vec![1, 2, 3]
            }]
        );
    }

    #[test]
    fn invalid_base64_names_the_account() {
        let address = Pubkey::new_from_array([1; 32]);
        let json = format!(r#"[{{"address": "{address}", "data": "not base64!"}}]"#);
        let err = StaticAccountSource::from_json_str(owner(), &json).unwrap_err();
        assert!(matches!(err, SourceError::InvalidData { address: a, .. } if a == address));
    }

    #[test]
    fn invalid_address_is_a_parse_error() {
        let err = StaticAccountSource::from_json_str(owner(), r#"[{"address": "0OIl", "data": ""}]"#)
            .unwrap_err();
        assert!(matches!(err, SourceError::Parse(_)));
    }

    #[test]
    fn size_filter_and_owner_are_applied() {
        let accounts = vec![
            RawAccount {
                address: Pubkey::new_from_array([1; 32]),
                data: vec![0; 214],
            },
            RawAccount {
                address: Pubkey::new_from_array([2; 32]),
                data: vec![0; 254],
            },
        ];
        let source = StaticAccountSource::new(owner(), accounts);

        let sized = source
            .fetch_accounts(&owner(), SizeFilter::DataSize(254))
            .unwrap();
        assert_eq!(sized.len(), 1);
        assert_eq!(sized[0].address, Pubkey::new_from_array([2; 32]));

        let other = source
            .fetch_accounts(&Pubkey::new_from_array([3; 32]), SizeFilter::Any)
            .unwrap();
        assert!(other.is_empty());
    }

    #[test]
    fn missing_snapshot_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = StaticAccountSource::load(owner(), &dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, SourceError::Read { .. }));
    }
}
