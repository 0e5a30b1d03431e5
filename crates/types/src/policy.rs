//! Acceptance policy and verifier key configuration.

use std::{collections::BTreeSet, fmt};

use borsh::{BorshDeserialize, BorshSerialize};

use crate::{
    Field, ProofKind, VerifierKey,
    constants::{
        CURRENT_FORMAT_VERSION, DEFAULT_BATCH_SIZE, DEFAULT_EPOCHS, DEFAULT_FEATURE_DIM,
        DEFAULT_MAX_LOSS, DEFAULT_NUM_CLASSES, DEFAULT_NUM_SAMPLES, DEFAULT_SIZE_BYTES,
        FIELD_SCALE,
    },
    errors::PolicyError,
};

/// An inclusive `[min, max]` range with `min < max`.
#[derive(Copy, Clone, Debug, Eq, PartialEq, BorshDeserialize, BorshSerialize)]
pub struct Bounds<T> {
    min: T,
    max: T,
}

impl<T: PartialOrd + Copy + fmt::Display> Bounds<T> {
    /// Builds a range, rejecting `min >= max`.
    pub fn new(name: &'static str, min: T, max: T) -> Result<Self, PolicyError> {
        if min >= max {
            return Err(PolicyError::EmptyRange {
                name,
                min: min.to_string(),
                max: max.to_string(),
            });
        }
        Ok(Self { min, max })
    }

    /// Lower bound, inclusive.
    pub fn min(&self) -> T {
        self.min
    }

    /// Upper bound, inclusive.
    pub fn max(&self) -> T {
        self.max
    }

    /// Returns `true` if `value` lies within the range.
    pub fn contains(&self, value: T) -> bool {
        self.min <= value && value <= self.max
    }
}

impl<T> Bounds<T> {
    const fn new_unchecked(min: T, max: T) -> Self {
        Self { min, max }
    }
}

/// Thresholds applied by the bounds validator.
///
/// Every range has already been checked to be non-empty, so a `Policy` that
/// exists is always well formed. Use [`PolicyBuilder`] to change one.
#[derive(Clone, Debug, Eq, PartialEq, BorshDeserialize, BorshSerialize)]
pub struct Policy {
    batch_size: Bounds<u32>,
    num_epochs: Bounds<u32>,
    loss: Bounds<Field>,
    num_samples: Bounds<u32>,
    size_bytes: Bounds<u32>,
    feature_dim: Bounds<u32>,
    num_classes: Bounds<u32>,
    format_versions: BTreeSet<u32>,
}

impl Default for Policy {
    fn default() -> Self {
        let pair = |(min, max): (u32, u32)| Bounds::new_unchecked(min, max);
        Self {
            batch_size: pair(DEFAULT_BATCH_SIZE),
            num_epochs: pair(DEFAULT_EPOCHS),
            loss: Bounds::new_unchecked(
                Field::from_raw(1),
                Field::from_raw(DEFAULT_MAX_LOSS * FIELD_SCALE),
            ),
            num_samples: pair(DEFAULT_NUM_SAMPLES),
            size_bytes: pair(DEFAULT_SIZE_BYTES),
            feature_dim: pair(DEFAULT_FEATURE_DIM),
            num_classes: pair(DEFAULT_NUM_CLASSES),
            format_versions: BTreeSet::from([CURRENT_FORMAT_VERSION]),
        }
    }
}

impl Policy {
    /// Starts a builder from the defaults.
    pub fn builder() -> PolicyBuilder {
        PolicyBuilder::from(Self::default())
    }

    /// Starts a builder from this policy.
    pub fn to_builder(&self) -> PolicyBuilder {
        PolicyBuilder::from(self.clone())
    }

    /// Accepted batch sizes.
    pub fn batch_size(&self) -> &Bounds<u32> {
        &self.batch_size
    }

    /// Accepted epoch counts.
    pub fn num_epochs(&self) -> &Bounds<u32> {
        &self.num_epochs
    }

    /// Accepted final losses.
    pub fn loss(&self) -> &Bounds<Field> {
        &self.loss
    }

    /// Accepted sample counts.
    pub fn num_samples(&self) -> &Bounds<u32> {
        &self.num_samples
    }

    /// Accepted dataset sizes in bytes.
    pub fn size_bytes(&self) -> &Bounds<u32> {
        &self.size_bytes
    }

    /// Accepted feature dimensions.
    pub fn feature_dim(&self) -> &Bounds<u32> {
        &self.feature_dim
    }

    /// Accepted class counts.
    pub fn num_classes(&self) -> &Bounds<u32> {
        &self.num_classes
    }

    /// Accepted dataset format versions.
    pub fn format_versions(&self) -> &BTreeSet<u32> {
        &self.format_versions
    }
}

/// Staged policy edits, validated together in [`PolicyBuilder::build`].
#[derive(Clone, Debug)]
pub struct PolicyBuilder {
    batch_size: (u32, u32),
    num_epochs: (u32, u32),
    loss: (Field, Field),
    num_samples: (u32, u32),
    size_bytes: (u32, u32),
    feature_dim: (u32, u32),
    num_classes: (u32, u32),
    format_versions: BTreeSet<u32>,
}

impl From<Policy> for PolicyBuilder {
    fn from(p: Policy) -> Self {
        let pair = |b: Bounds<u32>| (b.min, b.max);
        Self {
            batch_size: pair(p.batch_size),
            num_epochs: pair(p.num_epochs),
            loss: (p.loss.min, p.loss.max),
            num_samples: pair(p.num_samples),
            size_bytes: pair(p.size_bytes),
            feature_dim: pair(p.feature_dim),
            num_classes: pair(p.num_classes),
            format_versions: p.format_versions,
        }
    }
}

impl PolicyBuilder {
    /// Sets the batch size range.
    pub fn batch_size(mut self, min: u32, max: u32) -> Self {
        self.batch_size = (min, max);
        self
    }

    /// Sets the epoch count range.
    pub fn num_epochs(mut self, min: u32, max: u32) -> Self {
        self.num_epochs = (min, max);
        self
    }

    /// Sets the final loss range.
    pub fn loss(mut self, min: Field, max: Field) -> Self {
        self.loss = (min, max);
        self
    }

    /// Sets the sample count range.
    pub fn num_samples(mut self, min: u32, max: u32) -> Self {
        self.num_samples = (min, max);
        self
    }

    /// Sets the dataset size range.
    pub fn size_bytes(mut self, min: u32, max: u32) -> Self {
        self.size_bytes = (min, max);
        self
    }

    /// Sets the feature dimension range.
    pub fn feature_dim(mut self, min: u32, max: u32) -> Self {
        self.feature_dim = (min, max);
        self
    }

    /// Sets the class count range.
    pub fn num_classes(mut self, min: u32, max: u32) -> Self {
        self.num_classes = (min, max);
        self
    }

    /// Replaces the accepted format versions.
    pub fn format_versions(mut self, versions: impl IntoIterator<Item = u32>) -> Self {
        self.format_versions = versions.into_iter().collect();
        self
    }

    /// Checks every range and produces the policy.
    pub fn build(self) -> Result<Policy, PolicyError> {
        if self.format_versions.is_empty() {
            return Err(PolicyError::NoFormatVersions);
        }
        let (min, max) = self.loss;
        Ok(Policy {
            batch_size: Bounds::new("batch_size", self.batch_size.0, self.batch_size.1)?,
            num_epochs: Bounds::new("num_epochs", self.num_epochs.0, self.num_epochs.1)?,
            loss: Bounds::new("loss", min, max)?,
            num_samples: Bounds::new("num_samples", self.num_samples.0, self.num_samples.1)?,
            size_bytes: Bounds::new("size_bytes", self.size_bytes.0, self.size_bytes.1)?,
            feature_dim: Bounds::new("feature_dim", self.feature_dim.0, self.feature_dim.1)?,
            num_classes: Bounds::new("num_classes", self.num_classes.0, self.num_classes.1)?,
            format_versions: self.format_versions,
        })
    }
}

/// Commitments to the verification key of each circuit.
///
/// Stored for reference only; bounds validation does not consult them.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, BorshDeserialize, BorshSerialize)]
pub struct CommitmentKeys {
    training: VerifierKey,
    data_integrity: VerifierKey,
    model_diff: VerifierKey,
}

impl CommitmentKeys {
    /// Builds a key set, rejecting zero keys.
    pub fn new(
        training: VerifierKey,
        data_integrity: VerifierKey,
        model_diff: VerifierKey,
    ) -> Result<Self, PolicyError> {
        for (kind, key) in [
            (ProofKind::Training, &training),
            (ProofKind::DataIntegrity, &data_integrity),
            (ProofKind::ModelDiff, &model_diff),
        ] {
            if key.is_zero() {
                return Err(PolicyError::ZeroVerifierKey(kind));
            }
        }
        Ok(Self {
            training,
            data_integrity,
            model_diff,
        })
    }

    /// Key for the given circuit.
    pub fn get(&self, kind: ProofKind) -> &VerifierKey {
        match kind {
            ProofKind::Training => &self.training,
            ProofKind::DataIntegrity => &self.data_integrity,
            ProofKind::ModelDiff => &self.model_diff,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let p = Policy::default();
        assert_eq!((p.batch_size().min(), p.batch_size().max()), (1, 1024));
        assert_eq!((p.num_epochs().min(), p.num_epochs().max()), (1, 100));
        assert!(p.loss().contains(Field::from_decimal(0.5)));
        assert!(!p.loss().contains(Field::ZERO));
        assert!(p.format_versions().contains(&1));
        assert_eq!(Policy::builder().build().unwrap(), p);
    }

    #[test]
    fn test_default_loss_range() {
        let loss = *Policy::default().loss();
        assert!(loss.contains(Field::from_raw(1)));
        assert!(loss.contains(Field::from_int(1_000)));
        assert!(!loss.contains(Field::from_raw(1_000 * FIELD_SCALE + 1)));
        assert!(!loss.contains(Field::from_decimal(-0.5)));

        let widened = Policy::builder()
            .loss(Field::from_int(-10), Field::from_int(10))
            .build()
            .unwrap();
        assert!(widened.loss().contains(Field::from_decimal(-0.5)));
    }

    #[test]
    fn test_rejects_degenerate_range() {
        let err = Policy::builder().batch_size(8, 8).build().unwrap_err();
        assert_eq!(
            err,
            PolicyError::EmptyRange {
                name: "batch_size",
                min: "8".into(),
                max: "8".into(),
            }
        );
        assert!(Policy::builder().num_classes(10, 2).build().is_err());
        assert!(
            Policy::builder()
                .loss(Field::from_int(1), Field::ZERO)
                .build()
                .is_err()
        );
    }

    #[test]
    fn test_rejects_empty_format_versions() {
        let err = Policy::builder().format_versions([]).build().unwrap_err();
        assert_eq!(err, PolicyError::NoFormatVersions);
    }

    #[test]
    fn test_to_builder_preserves_other_fields() {
        let p = Policy::builder().num_epochs(2, 5).build().unwrap();
        let q = p.to_builder().batch_size(16, 64).build().unwrap();
        assert_eq!(q.num_epochs(), p.num_epochs());
        assert_eq!(q.batch_size().max(), 64);
    }

    #[test]
    fn test_commitment_keys_reject_zero() {
        let key = VerifierKey::new([1; 32]);
        assert_eq!(
            CommitmentKeys::new(key, VerifierKey::ZERO, key),
            Err(PolicyError::ZeroVerifierKey(ProofKind::DataIntegrity))
        );
        let keys = CommitmentKeys::new(key, key, VerifierKey::new([2; 32])).unwrap();
        assert_eq!(keys.get(ProofKind::ModelDiff), &VerifierKey::new([2; 32]));
    }
}
