use std::{
    fs,
    path::{Path, PathBuf},
};

use dbc_case_study::{ConsensusRule, DecodeOptions, EligibilityThresholds, Pubkey, PubkeyError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_CLUSTER: &str = "localnet";

pub const CASE_STUDY_PROGRAM_ID: &str = "EqtUtzoDUq8fQSdQATey5wJgmZHm4bEpDsKb24vHmPd6";

pub const DEPLOYMENT_PROVENANCE: &str = "dallas-buyers-club programs/case_study";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrustedDeployment {
    pub cluster: &'static str,
    pub program_id: &'static str,
    pub provenance: &'static str,
}

impl TrustedDeployment {
    pub fn program_id(&self) -> Result<Pubkey, ConfigError> {
        self.program_id
            .parse()
            .map_err(|source| ConfigError::InvalidProgramId {
                cluster: self.cluster,
                source,
            })
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cluster `{cluster}` is not allowlisted for the case-study program")]
    ClusterNotAllowlisted { cluster: String },

    #[error("program id for cluster `{cluster}` is malformed")]
    InvalidProgramId {
        cluster: &'static str,
        #[source]
        source: PubkeyError,
    },

    #[error("failed to read config file {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

// The program is deployed under the same id on every cluster
pub const TRUSTED_DEPLOYMENTS: [TrustedDeployment; 3] = [
    TrustedDeployment {
        cluster: DEFAULT_CLUSTER,
        program_id: CASE_STUDY_PROGRAM_ID,
        provenance: DEPLOYMENT_PROVENANCE,
    },
    TrustedDeployment {
        cluster: "devnet",
        program_id: CASE_STUDY_PROGRAM_ID,
        provenance: DEPLOYMENT_PROVENANCE,
    },
    TrustedDeployment {
        cluster: "mainnet-beta",
        program_id: CASE_STUDY_PROGRAM_ID,
        provenance: DEPLOYMENT_PROVENANCE,
    },
];

pub fn require_allowlisted_deployment(
    cluster: &str,
) -> Result<&'static TrustedDeployment, ConfigError> {
    TRUSTED_DEPLOYMENTS
        .iter()
        .find(|deployment| deployment.cluster == cluster)
        .ok_or_else(|| ConfigError::ClusterNotAllowlisted {
            cluster: cluster.to_string(),
        })
}

/// Client settings, usually read from a JSON file. Every key is optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct ClientConfig {
    pub cluster: String,
    pub thresholds: EligibilityThresholds,
    pub consensus: ConsensusRule,
    /// Reject accounts whose first 8 bytes are not the `CaseStudy` discriminator
    pub strict_discriminator: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            cluster: DEFAULT_CLUSTER.to_string(),
            thresholds: EligibilityThresholds::default(),
            consensus: ConsensusRule::default(),
            strict_discriminator: false,
        }
    }
}

impl ClientConfig {
    pub fn from_json_str(path: &Path, json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(path, &json)
    }

    pub fn deployment(&self) -> Result<&'static TrustedDeployment, ConfigError> {
        require_allowlisted_deployment(&self.cluster)
    }

    pub fn decode_options(&self) -> DecodeOptions {
        if self.strict_discriminator {
            DecodeOptions::strict()
        } else {
            DecodeOptions::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn allowlist_accepts_known_clusters() {
        for cluster in ["localnet", "devnet", "mainnet-beta"] {
            let deployment = require_allowlisted_deployment(cluster).unwrap();
            assert_eq!(deployment.cluster, cluster);
            assert_eq!(
                deployment.program_id().unwrap().to_string(),
                CASE_STUDY_PROGRAM_ID
            );
        }
    }

    #[test]
    fn allowlist_is_fail_closed() {
        let err = require_allowlisted_deployment("testnet").unwrap_err();
        assert!(matches!(err, ConfigError::ClusterNotAllowlisted { ref cluster } if cluster == "testnet"));
        assert!(require_allowlisted_deployment("").is_err());
        assert!(require_allowlisted_deployment("Devnet").is_err());
    }

    #[test]
    fn empty_config_uses_defaults() {
        let config = ClientConfig::from_json_str(Path::new("inline"), "{}").unwrap();
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.thresholds.min_reputation_score, 75);
        assert_eq!(config.thresholds.min_validator_count, 5);
        assert_eq!(config.decode_options(), DecodeOptions::default());
    }

    #[test]
    fn partial_config_overrides() {
        let json = r#"{
            "cluster": "devnet",
            "thresholds": { "minReputationScore": 90 },
            "strictDiscriminator": true
        }"#;
        let config = ClientConfig::from_json_str(Path::new("inline"), json).unwrap();
        assert_eq!(config.cluster, "devnet");
        assert_eq!(config.thresholds.min_reputation_score, 90);
        assert_eq!(config.thresholds.min_validator_count, 5);
        assert_eq!(config.decode_options(), DecodeOptions::strict());
        assert!(config.deployment().is_ok());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = ClientConfig::from_json_str(Path::new("inline"), r#"{"clustr": "devnet"}"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn load_reads_file_and_reports_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"cluster": "mainnet-beta"}}"#).unwrap();
        let config = ClientConfig::load(file.path()).unwrap();
        assert_eq!(config.cluster, "mainnet-beta");

        let missing = file.path().with_extension("missing");
        let err = ClientConfig::load(&missing).unwrap_err();
        assert!(err.to_string().contains("missing"));
    }
}
