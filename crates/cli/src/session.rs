//! Training session files.
//!
//! ```toml
//! dataset_commitment = "0x..."
//! params_before = [0.1, 0.2, 0.3, 0.4]
//! params_after = [0.15, 0.25, 0.35, 0.45]
//! batch_size = 32
//! ```

use std::{fs, path::Path};

use anyhow::{Context, Result};
use serde::Deserialize;
use tip_circuits::TrainingSession;
use tip_types::{DatasetCommitment, Field, Identity};

/// A session as written on disk. Omitted settings take the prover defaults.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct SessionFile {
    dataset_commitment: String,
    params_before: [f64; 4],
    params_after: [f64; 4],
    submitter: Option<String>,
    batch_size: Option<u32>,
    num_epochs: Option<u32>,
    final_loss: Option<f64>,
    seed: Option<i64>,
    num_samples: Option<u32>,
    size_bytes: Option<u32>,
    feature_dim: Option<u32>,
    num_classes: Option<u32>,
    format_version: Option<u32>,
}

impl SessionFile {
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading session file {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("parsing session file {}", path.display()))
    }

    fn parse(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Identity the proofs are submitted under; zero if unset.
    pub(crate) fn submitter(&self) -> Result<Identity> {
        match &self.submitter {
            Some(hex) => hex.parse().context("invalid submitter"),
            None => Ok(Identity::ZERO),
        }
    }

    pub(crate) fn to_session(&self) -> Result<TrainingSession> {
        let commitment: DatasetCommitment = self
            .dataset_commitment
            .parse()
            .context("invalid dataset_commitment")?;
        let mut session = TrainingSession::new(
            commitment,
            self.params_before.map(Field::from_decimal),
            self.params_after.map(Field::from_decimal),
        );

        if let Some(v) = self.batch_size {
            session.batch_size = v;
        }
        if let Some(v) = self.num_epochs {
            session.num_epochs = v;
        }
        if let Some(v) = self.final_loss {
            session.final_loss = Field::from_decimal(v);
        }
        if let Some(v) = self.seed {
            session.seed = Field::from_raw(v.into());
        }
        if let Some(v) = self.num_samples {
            session.num_samples = v;
        }
        if let Some(v) = self.size_bytes {
            session.size_bytes = v;
        }
        if let Some(v) = self.feature_dim {
            session.feature_dim = v;
        }
        if let Some(v) = self.num_classes {
            session.num_classes = v;
        }
        if let Some(v) = self.format_version {
            session.format_version = v;
        }
        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
dataset_commitment = "0x00000000000000000000000000000000000000000000000000000000075bcd15"
params_before = [0.1, 0.2, 0.3, 0.4]
params_after = [0.15, 0.25, 0.35, 0.45]
"#;

    #[test]
    fn test_defaults_fill_in() {
        let file = SessionFile::parse(MINIMAL).unwrap();
        let session = file.to_session().unwrap();
        assert_eq!(session.dataset_commitment, DatasetCommitment::from_u64(123_456_789));
        assert_eq!(session.batch_size, 32);
        assert_eq!(session.num_samples, 1000);
        assert_eq!(file.submitter().unwrap(), Identity::ZERO);
    }

    #[test]
    fn test_overrides() {
        let text = format!("{MINIMAL}num_samples = 0\nfinal_loss = 0.25\nseed = 7\n");
        let session = SessionFile::parse(&text).unwrap().to_session().unwrap();
        assert_eq!(session.num_samples, 0);
        assert_eq!(session.final_loss, Field::from_decimal(0.25));
        assert_eq!(session.seed, Field::from_raw(7));
    }

    #[test]
    fn test_rejects_unknown_keys_and_bad_hex() {
        assert!(SessionFile::parse(&format!("{MINIMAL}learning_rate = 0.1\n")).is_err());
        let text = MINIMAL.replace("0x0000", "0xzz00");
        assert!(SessionFile::parse(&text).unwrap().to_session().is_err());
    }
}
