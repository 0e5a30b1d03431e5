//! Records submitted for proving.

use std::{fmt, str::FromStr};

use borsh::{BorshDeserialize, BorshSerialize};

use crate::{
    DatasetCommitment, DiffCommitment, Field, ProofHash, constants::NUM_PARAMS,
    errors::ParseKindError,
};

/// A sampled slice of model parameters.
pub type Params = [Field; NUM_PARAMS];

/// The three circuit types a proof can be produced by.
#[derive(
    Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, BorshDeserialize, BorshSerialize,
)]
#[borsh(use_discriminant = true)]
pub enum ProofKind {
    /// A training run.
    Training = 0,
    /// A dataset descriptor.
    DataIntegrity = 1,
    /// A model parameter diff.
    ModelDiff = 2,
}

impl ProofKind {
    /// All kinds in submission order.
    pub const ALL: [ProofKind; 3] = [Self::Training, Self::DataIntegrity, Self::ModelDiff];

    /// Canonical lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Training => "training",
            Self::DataIntegrity => "data_integrity",
            Self::ModelDiff => "model_diff",
        }
    }

    /// Single-byte tag mixed into hashes.
    pub fn tag(&self) -> u8 {
        *self as u8
    }
}

impl fmt::Display for ProofKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProofKind {
    type Err = ParseKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "training" | "training_proof" => Ok(Self::Training),
            "data_integrity" | "data_integrity_proof" => Ok(Self::DataIntegrity),
            "model_diff" | "model_diff_proof" => Ok(Self::ModelDiff),
            other => Err(ParseKindError(other.to_owned())),
        }
    }
}

/// Disclosed facts about a single training run.
#[derive(Clone, Debug, Eq, PartialEq, BorshDeserialize, BorshSerialize)]
pub struct TrainingRecord {
    /// Commitment to the dataset trained on.
    pub dataset_commitment: DatasetCommitment,
    /// Sampled parameters before training.
    pub params_before: Params,
    /// Sampled parameters after training.
    pub params_after: Params,
    /// Batch size used.
    pub batch_size: u32,
    /// Number of epochs run.
    pub num_epochs: u32,
    /// Loss after the final epoch.
    pub final_loss: Field,
    /// RNG seed, stored as a raw integer rather than a scaled decimal.
    pub seed: Field,
}

/// Disclosed metadata about a dataset.
#[derive(Clone, Debug, Eq, PartialEq, BorshDeserialize, BorshSerialize)]
pub struct DatasetDescriptor {
    /// Commitment to the dataset contents.
    pub dataset_commitment: DatasetCommitment,
    /// Number of samples.
    pub num_samples: u32,
    /// Size in bytes.
    pub size_bytes: u32,
    /// Feature vector dimension.
    pub feature_dim: u32,
    /// Number of label classes.
    pub num_classes: u32,
    /// Encoding format version.
    pub format_version: u32,
}

/// Disclosed parameter diff, bound to the training proof it came from.
#[derive(Clone, Debug, Eq, PartialEq, BorshDeserialize, BorshSerialize)]
pub struct ModelDiffRecord {
    /// Proof hash of the training run producing this diff.
    pub training_proof_hash: ProofHash,
    /// Sampled parameters before training.
    pub params_before: Params,
    /// Sampled parameters after training.
    pub params_after: Params,
    /// Declared commitment to `params_after - params_before`.
    pub diff_commitment: DiffCommitment,
    /// Batch size used.
    pub batch_size: u32,
    /// Number of epochs run.
    pub num_epochs: u32,
    /// Loss after the final epoch.
    pub final_loss: Field,
}

/// Any record accepted by the registry.
#[derive(Clone, Debug, Eq, PartialEq, BorshDeserialize, BorshSerialize)]
pub enum ProofRecord {
    /// See [`TrainingRecord`].
    Training(TrainingRecord),
    /// See [`DatasetDescriptor`].
    DataIntegrity(DatasetDescriptor),
    /// See [`ModelDiffRecord`].
    ModelDiff(ModelDiffRecord),
}

impl ProofRecord {
    /// The kind of circuit this record is proved by.
    pub fn kind(&self) -> ProofKind {
        match self {
            Self::Training(_) => ProofKind::Training,
            Self::DataIntegrity(_) => ProofKind::DataIntegrity,
            Self::ModelDiff(_) => ProofKind::ModelDiff,
        }
    }
}

impl From<TrainingRecord> for ProofRecord {
    fn from(record: TrainingRecord) -> Self {
        Self::Training(record)
    }
}

impl From<DatasetDescriptor> for ProofRecord {
    fn from(record: DatasetDescriptor) -> Self {
        Self::DataIntegrity(record)
    }
}

impl From<ModelDiffRecord> for ProofRecord {
    fn from(record: ModelDiffRecord) -> Self {
        Self::ModelDiff(record)
    }
}

/// Returns `true` if at least one parameter differs.
pub fn params_changed(before: &Params, after: &Params) -> bool {
    before.iter().zip(after).any(|(b, a)| b != a)
}
