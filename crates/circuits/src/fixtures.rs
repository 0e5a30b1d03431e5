//! Records shared by the unit tests, mirroring the prover's defaults.

use tip_types::{
    DatasetCommitment, DatasetDescriptor, Field, ModelDiffRecord, ProofHash, TrainingRecord,
    commitment::diff_commitment,
};

pub(crate) fn training() -> TrainingRecord {
    TrainingRecord {
        dataset_commitment: DatasetCommitment::from_u64(123_456_789),
        params_before: [0.1, 0.2, 0.3, 0.4].map(Field::from_decimal),
        params_after: [0.15, 0.25, 0.35, 0.45].map(Field::from_decimal),
        batch_size: 32,
        num_epochs: 1,
        final_loss: Field::from_decimal(0.5),
        seed: Field::from_raw(42),
    }
}

pub(crate) fn descriptor() -> DatasetDescriptor {
    DatasetDescriptor {
        dataset_commitment: DatasetCommitment::from_u64(123_456_789),
        num_samples: 1000,
        size_bytes: 100_000,
        feature_dim: 768,
        num_classes: 2,
        format_version: 1,
    }
}

pub(crate) fn model_diff() -> ModelDiffRecord {
    let t = training();
    ModelDiffRecord {
        training_proof_hash: ProofHash::new([0x11; 32]),
        params_before: t.params_before,
        params_after: t.params_after,
        diff_commitment: diff_commitment(&t.params_before, &t.params_after),
        batch_size: t.batch_size,
        num_epochs: t.num_epochs,
        final_loss: t.final_loss,
    }
}
