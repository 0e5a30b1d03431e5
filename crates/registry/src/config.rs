//! Registry configuration loaded from TOML.
//!
//! ```toml
//! owner = "0x00..01"
//! duplicate_policy = "reject"
//!
//! [policy]
//! batch_size = { min = 1, max = 1024 }
//! loss = { min = 0.000000001, max = 1000.0 }
//! format_versions = [1]
//!
//! [commitment_keys]
//! training = "0x.."
//! data_integrity = "0x.."
//! model_diff = "0x.."
//! ```

use std::{fs, path::Path, str::FromStr};

use serde::{Deserialize, Serialize};
use tip_types::{
    CommitmentKeys, Field, Identity, ParseIdError, Policy,
    constants::{
        CURRENT_FORMAT_VERSION, DEFAULT_BATCH_SIZE, DEFAULT_EPOCHS, DEFAULT_FEATURE_DIM,
        DEFAULT_MAX_LOSS, DEFAULT_NUM_CLASSES, DEFAULT_NUM_SAMPLES, DEFAULT_SIZE_BYTES,
    },
};

use crate::errors::ConfigError;

/// What to do when a submission's proof hash is already stored.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Refuse the submission and keep the stored proof.
    #[default]
    Reject,
    /// Replace the stored envelope with the new one.
    Overwrite,
}

/// An inclusive range as written in the config file.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RangeConfig<T> {
    /// Lower bound.
    pub min: T,
    /// Upper bound.
    pub max: T,
}

impl<T> From<(T, T)> for RangeConfig<T> {
    fn from((min, max): (T, T)) -> Self {
        Self { min, max }
    }
}

/// Policy thresholds. Missing entries keep their built-in defaults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PolicyConfig {
    /// Accepted batch sizes.
    #[serde(default = "default_batch_size")]
    pub batch_size: RangeConfig<u32>,
    /// Accepted epoch counts.
    #[serde(default = "default_epochs")]
    pub num_epochs: RangeConfig<u32>,
    /// Accepted final losses, as decimals.
    #[serde(default = "default_loss")]
    pub loss: RangeConfig<f64>,
    /// Accepted sample counts.
    #[serde(default = "default_num_samples")]
    pub num_samples: RangeConfig<u32>,
    /// Accepted dataset sizes in bytes.
    #[serde(default = "default_size_bytes")]
    pub size_bytes: RangeConfig<u32>,
    /// Accepted feature dimensions.
    #[serde(default = "default_feature_dim")]
    pub feature_dim: RangeConfig<u32>,
    /// Accepted class counts.
    #[serde(default = "default_num_classes")]
    pub num_classes: RangeConfig<u32>,
    /// Accepted dataset format versions.
    #[serde(default = "default_format_versions")]
    pub format_versions: Vec<u32>,
}

fn default_batch_size() -> RangeConfig<u32> {
    DEFAULT_BATCH_SIZE.into()
}
fn default_epochs() -> RangeConfig<u32> {
    DEFAULT_EPOCHS.into()
}
fn default_loss() -> RangeConfig<f64> {
    RangeConfig {
        min: Field::from_raw(1).to_decimal(),
        max: DEFAULT_MAX_LOSS as f64,
    }
}
fn default_num_samples() -> RangeConfig<u32> {
    DEFAULT_NUM_SAMPLES.into()
}
fn default_size_bytes() -> RangeConfig<u32> {
    DEFAULT_SIZE_BYTES.into()
}
fn default_feature_dim() -> RangeConfig<u32> {
    DEFAULT_FEATURE_DIM.into()
}
fn default_num_classes() -> RangeConfig<u32> {
    DEFAULT_NUM_CLASSES.into()
}
fn default_format_versions() -> Vec<u32> {
    vec![CURRENT_FORMAT_VERSION]
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            num_epochs: default_epochs(),
            loss: default_loss(),
            num_samples: default_num_samples(),
            size_bytes: default_size_bytes(),
            feature_dim: default_feature_dim(),
            num_classes: default_num_classes(),
            format_versions: default_format_versions(),
        }
    }
}

impl PolicyConfig {
    /// Validates the ranges and builds the policy.
    pub fn to_policy(&self) -> Result<Policy, ConfigError> {
        let policy = Policy::builder()
            .batch_size(self.batch_size.min, self.batch_size.max)
            .num_epochs(self.num_epochs.min, self.num_epochs.max)
            .loss(
                Field::from_decimal(self.loss.min),
                Field::from_decimal(self.loss.max),
            )
            .num_samples(self.num_samples.min, self.num_samples.max)
            .size_bytes(self.size_bytes.min, self.size_bytes.max)
            .feature_dim(self.feature_dim.min, self.feature_dim.max)
            .num_classes(self.num_classes.min, self.num_classes.max)
            .format_versions(self.format_versions.iter().copied())
            .build()?;
        Ok(policy)
    }
}

/// Hex-encoded verifier key commitments.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CommitmentKeysConfig {
    /// Training circuit key.
    pub training: String,
    /// Data integrity circuit key.
    pub data_integrity: String,
    /// Model diff circuit key.
    pub model_diff: String,
}

impl CommitmentKeysConfig {
    /// Parses and validates the three keys.
    pub fn to_keys(&self) -> Result<CommitmentKeys, ConfigError> {
        let keys = CommitmentKeys::new(
            parse_hex("commitment_keys.training", &self.training)?,
            parse_hex("commitment_keys.data_integrity", &self.data_integrity)?,
            parse_hex("commitment_keys.model_diff", &self.model_diff)?,
        )?;
        Ok(keys)
    }
}

/// Top-level registry configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegistryConfig {
    /// Hex identity allowed to change the policy and keys.
    pub owner: String,
    /// Handling of repeated proof hashes.
    #[serde(default)]
    pub duplicate_policy: DuplicatePolicy,
    /// Acceptance thresholds.
    #[serde(default)]
    pub policy: PolicyConfig,
    /// Verifier key commitments, if any are set at start-up.
    #[serde(default)]
    pub commitment_keys: Option<CommitmentKeysConfig>,
}

impl RegistryConfig {
    /// A configuration owned by `owner` with every other setting at its default.
    pub fn with_owner(owner: Identity) -> Self {
        Self {
            owner: owner.to_string(),
            duplicate_policy: DuplicatePolicy::default(),
            policy: PolicyConfig::default(),
            commitment_keys: None,
        }
    }

    /// Parses a configuration from TOML text.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Reads and parses a TOML configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// The owner identity.
    pub fn owner(&self) -> Result<Identity, ConfigError> {
        parse_hex("owner", &self.owner)
    }

    /// The validated policy.
    pub fn policy(&self) -> Result<Policy, ConfigError> {
        self.policy.to_policy()
    }

    /// The validated key commitments, if configured.
    pub fn commitment_keys(&self) -> Result<Option<CommitmentKeys>, ConfigError> {
        self.commitment_keys
            .as_ref()
            .map(CommitmentKeysConfig::to_keys)
            .transpose()
    }
}

fn parse_hex<T: FromStr<Err = ParseIdError>>(
    field: &'static str,
    value: &str,
) -> Result<T, ConfigError> {
    value
        .parse()
        .map_err(|source| ConfigError::InvalidHex { field, source })
}

#[cfg(test)]
mod tests {
    use tip_types::{PolicyError, ProofKind, VerifierKey};

    use super::*;

    const OWNER: &str = "0000000000000000000000000000000000000000000000000000000000000001";

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = RegistryConfig::from_toml_str(&format!("owner = \"{OWNER}\"")).unwrap();
        assert_eq!(config.owner().unwrap(), Identity::from_u64(1));
        assert_eq!(config.duplicate_policy, DuplicatePolicy::Reject);
        assert_eq!(config.policy().unwrap(), Policy::default());
        assert!(config.commitment_keys().unwrap().is_none());
    }

    #[test]
    fn test_with_owner_matches_parsed_defaults() {
        let config = RegistryConfig::with_owner(Identity::from_u64(1));
        let parsed = RegistryConfig::from_toml_str(&format!("owner = \"0x{OWNER}\"")).unwrap();
        assert_eq!(config.owner().unwrap(), parsed.owner().unwrap());
        assert_eq!(config.policy, parsed.policy);
    }

    #[test]
    fn test_full_config() {
        let text = format!(
            r#"
owner = "{OWNER}"
duplicate_policy = "overwrite"

[policy]
batch_size = {{ min = 8, max = 256 }}
loss = {{ min = 0.01, max = 10.0 }}
format_versions = [1, 2]

[commitment_keys]
training = "{k}"
data_integrity = "{k}"
model_diff = "{k}"
"#,
            k = "ab".repeat(32)
        );
        let config = RegistryConfig::from_toml_str(&text).unwrap();
        assert_eq!(config.duplicate_policy, DuplicatePolicy::Overwrite);

        let policy = config.policy().unwrap();
        assert_eq!(policy.batch_size().min(), 8);
        assert_eq!(policy.batch_size().max(), 256);
        assert_eq!(policy.loss().max(), Field::from_int(10));
        assert!(policy.format_versions().contains(&2));
        assert_eq!(policy.num_epochs(), Policy::default().num_epochs());

        let keys = config.commitment_keys().unwrap().unwrap();
        assert_eq!(keys.get(ProofKind::ModelDiff), &VerifierKey::new([0xab; 32]));
    }

    #[test]
    fn test_invalid_ranges_are_rejected() {
        let text = format!("owner = \"{OWNER}\"\n[policy]\nepochs = {{ min = 1, max = 2 }}\n");
        assert!(matches!(
            RegistryConfig::from_toml_str(&text),
            Err(ConfigError::Toml(_))
        ));

        let text = format!("owner = \"{OWNER}\"\n[policy]\nnum_classes = {{ min = 5, max = 5 }}\n");
        let config = RegistryConfig::from_toml_str(&text).unwrap();
        assert!(matches!(
            config.policy(),
            Err(ConfigError::InvalidPolicy(PolicyError::EmptyRange { name: "num_classes", .. }))
        ));
    }

    #[test]
    fn test_bad_hex_names_the_field() {
        let config = RegistryConfig::from_toml_str("owner = \"zz\"").unwrap();
        match config.owner() {
            Err(ConfigError::InvalidHex { field, .. }) => assert_eq!(field, "owner"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_zero_key_is_rejected() {
        let keys = CommitmentKeysConfig {
            training: "11".repeat(32),
            data_integrity: "00".repeat(32),
            model_diff: "11".repeat(32),
        };
        assert!(matches!(
            keys.to_keys(),
            Err(ConfigError::InvalidPolicy(PolicyError::ZeroVerifierKey(
                ProofKind::DataIntegrity
            )))
        ));
    }

    #[test]
    fn test_missing_file() {
        let err = RegistryConfig::load("/nonexistent/registry.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
