//! Dataset descriptor circuit.

use tip_circuit_interface::ProofCircuit;
use tip_types::{Check, DatasetDescriptor, Policy, ProofKind, ProofRecord, Verdict};

/// Checks that a dataset's disclosed metadata is within policy.
#[derive(Debug)]
pub struct DataIntegrityCircuit;

impl ProofCircuit for DataIntegrityCircuit {
    type Record = DatasetDescriptor;

    const KIND: ProofKind = ProofKind::DataIntegrity;

    fn evaluate(record: &DatasetDescriptor, policy: &Policy) -> Verdict {
        let mut verdict = Verdict::new();
        verdict
            .record(Check::DatasetCommitment, !record.dataset_commitment.is_zero())
            .record(Check::Samples, policy.num_samples().contains(record.num_samples))
            .record(Check::SizeBytes, policy.size_bytes().contains(record.size_bytes))
            .record(Check::FeatureDim, policy.feature_dim().contains(record.feature_dim))
            .record(Check::Classes, policy.num_classes().contains(record.num_classes))
            .record(
                Check::FormatVersion,
                policy.format_versions().contains(&record.format_version),
            );
        verdict
    }

    fn extract(record: &ProofRecord) -> Option<&DatasetDescriptor> {
        match record {
            ProofRecord::DataIntegrity(r) => Some(r),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::descriptor;

    #[test]
    fn test_defaults_are_valid() {
        let verdict = DataIntegrityCircuit::evaluate(&descriptor(), &Policy::default());
        assert!(verdict.is_valid());
        assert_eq!(verdict.outcomes().len(), 6);
    }

    #[test]
    fn test_zero_samples_fails_only_samples() {
        let mut record = descriptor();
        record.num_samples = 0;
        let verdict = DataIntegrityCircuit::evaluate(&record, &Policy::default());
        assert!(!verdict.is_valid());
        assert_eq!(verdict.failures().collect::<Vec<_>>(), vec![Check::Samples]);
    }

    #[test]
    fn test_every_failure_is_reported() {
        let record = DatasetDescriptor {
            num_samples: 0,
            num_classes: 0,
            format_version: 2,
            ..descriptor()
        };
        let verdict = DataIntegrityCircuit::evaluate(&record, &Policy::default());
        assert_eq!(
            verdict.failures().collect::<Vec<_>>(),
            vec![Check::Samples, Check::Classes, Check::FormatVersion]
        );
    }

    #[test]
    fn test_accepted_format_versions_are_configurable() {
        let record = DatasetDescriptor {
            format_version: 2,
            ..descriptor()
        };
        let policy = Policy::builder().format_versions([1, 2]).build().unwrap();
        assert!(DataIntegrityCircuit::evaluate(&record, &policy).is_valid());
    }

    #[test]
    fn test_feature_dim_upper_boundary() {
        let policy = Policy::builder().feature_dim(1, 768).build().unwrap();
        let mut record = descriptor();
        assert!(DataIntegrityCircuit::evaluate(&record, &policy).is_valid());
        record.feature_dim = 769;
        let verdict = DataIntegrityCircuit::evaluate(&record, &policy);
        assert_eq!(verdict.outcome(Check::FeatureDim), Some(false));
    }
}
