//! Outcomes of the bounds validator.

use std::fmt;

use borsh::{BorshDeserialize, BorshSerialize};

/// A single named predicate evaluated by a circuit.
#[derive(
    Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, BorshDeserialize, BorshSerialize,
)]
pub enum Check {
    /// The dataset commitment is non-zero.
    DatasetCommitment,
    /// At least one sampled parameter changed.
    ParamsChanged,
    /// The final loss is non-zero.
    LossNonZero,
    /// The final loss lies within the policy range.
    LossInRange,
    /// The batch size lies within the policy range.
    BatchSize,
    /// The epoch count lies within the policy range.
    Epochs,
    /// The sample count lies within the policy range.
    Samples,
    /// The dataset size lies within the policy range.
    SizeBytes,
    /// The feature dimension lies within the policy range.
    FeatureDim,
    /// The class count lies within the policy range.
    Classes,
    /// The format version is accepted by the policy.
    FormatVersion,
    /// The referenced training proof hash is non-zero.
    TrainingProofHash,
    /// The declared diff commitment matches the recomputed one.
    DiffCommitment,
}

impl Check {
    /// Stable snake_case name, used in logs and reports.
    pub fn name(&self) -> &'static str {
        match self {
            Self::DatasetCommitment => "dataset_commitment_valid",
            Self::ParamsChanged => "params_changed",
            Self::LossNonZero => "loss_non_zero",
            Self::LossInRange => "loss_valid",
            Self::BatchSize => "batch_size_valid",
            Self::Epochs => "epochs_valid",
            Self::Samples => "samples_valid",
            Self::SizeBytes => "size_valid",
            Self::FeatureDim => "feature_dim_valid",
            Self::Classes => "classes_valid",
            Self::FormatVersion => "format_version_valid",
            Self::TrainingProofHash => "training_proof_hash_valid",
            Self::DiffCommitment => "diff_commitment_valid",
        }
    }
}

impl fmt::Display for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The full list of predicate outcomes for one record.
///
/// Every check is recorded even after one fails.
#[derive(Clone, Debug, Default, Eq, PartialEq, BorshDeserialize, BorshSerialize)]
pub struct Verdict {
    outcomes: Vec<(Check, bool)>,
}

impl Verdict {
    /// Creates an empty verdict.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one outcome.
    pub fn record(&mut self, check: Check, passed: bool) -> &mut Self {
        self.outcomes.push((check, passed));
        self
    }

    /// Conjunction of every outcome.
    pub fn is_valid(&self) -> bool {
        self.outcomes.iter().all(|(_, passed)| *passed)
    }

    /// Outcome of a single check, if it was evaluated.
    pub fn outcome(&self, check: Check) -> Option<bool> {
        self.outcomes
            .iter()
            .find(|(c, _)| *c == check)
            .map(|(_, passed)| *passed)
    }

    /// Checks that did not pass, in evaluation order.
    pub fn failures(&self) -> impl Iterator<Item = Check> + '_ {
        self.outcomes
            .iter()
            .filter(|(_, passed)| !passed)
            .map(|(c, _)| *c)
    }

    /// All outcomes in evaluation order.
    pub fn outcomes(&self) -> &[(Check, bool)] {
        &self.outcomes
    }
}
