//! Proving every circuit for one training session.
//!
//! A session is proved in a fixed order: training, data integrity, then the
//! model diff, which embeds the training proof hash and the commitment to
//! the parameter delta. The three proof hashes are committed to with a
//! Merkle root so the bundle can be referenced by a single value.

use tip_types::{
    BundleRoot, BundleTree, DatasetCommitment, DatasetDescriptor, Field, InclusionProof,
    ModelDiffRecord, Params, Policy, ProofHash, ProofKind, ProofRecord, TrainingRecord,
    commitment::diff_commitment, constants::CURRENT_FORMAT_VERSION,
};
use tracing::info;

use crate::{
    DataIntegrityCircuit, ModelDiffCircuit, TrainingCircuit,
    runtime::{Execution, execute, execute_as},
};

/// The facts disclosed about one training session.
#[derive(Clone, Debug, PartialEq)]
pub struct TrainingSession {
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
    /// Number of samples in the dataset.
    pub num_samples: u32,
    /// Dataset size in bytes.
    pub size_bytes: u32,
    /// Feature vector dimension.
    pub feature_dim: u32,
    /// Number of label classes.
    pub num_classes: u32,
    /// Dataset format version.
    pub format_version: u32,
}

impl TrainingSession {
    /// Starts a session with the prover's defaults for everything but the
    /// dataset commitment and parameters.
    pub fn new(
        dataset_commitment: DatasetCommitment,
        params_before: Params,
        params_after: Params,
    ) -> Self {
        Self {
            dataset_commitment,
            params_before,
            params_after,
            batch_size: 32,
            num_epochs: 1,
            final_loss: Field::from_decimal(0.5),
            seed: Field::from_raw(42),
            num_samples: 1000,
            size_bytes: 100_000,
            feature_dim: 768,
            num_classes: 2,
            format_version: CURRENT_FORMAT_VERSION,
        }
    }

    /// The training record of this session.
    pub fn training_record(&self) -> TrainingRecord {
        TrainingRecord {
            dataset_commitment: self.dataset_commitment,
            params_before: self.params_before,
            params_after: self.params_after,
            batch_size: self.batch_size,
            num_epochs: self.num_epochs,
            final_loss: self.final_loss,
            seed: self.seed,
        }
    }

    /// The dataset descriptor of this session.
    pub fn dataset_descriptor(&self) -> DatasetDescriptor {
        DatasetDescriptor {
            dataset_commitment: self.dataset_commitment,
            num_samples: self.num_samples,
            size_bytes: self.size_bytes,
            feature_dim: self.feature_dim,
            num_classes: self.num_classes,
            format_version: self.format_version,
        }
    }

    /// The model diff record, bound to the given training proof.
    pub fn model_diff_record(&self, training_proof_hash: ProofHash) -> ModelDiffRecord {
        ModelDiffRecord {
            training_proof_hash,
            params_before: self.params_before,
            params_after: self.params_after,
            diff_commitment: diff_commitment(&self.params_before, &self.params_after),
            batch_size: self.batch_size,
            num_epochs: self.num_epochs,
            final_loss: self.final_loss,
        }
    }

    /// Runs all three circuits in order and commits to their proof hashes.
    pub fn prove(&self, policy: &Policy) -> ProofBundle {
        let training_record = self.training_record();
        let training = execute::<TrainingCircuit>(&training_record, policy);

        let descriptor = self.dataset_descriptor();
        let data_integrity = execute::<DataIntegrityCircuit>(&descriptor, policy);

        let diff_record = self.model_diff_record(*training.output().proof_hash());
        let model_diff = execute::<ModelDiffCircuit>(&diff_record, policy);

        let leaves = [
            *training.output().proof_hash(),
            *data_integrity.output().proof_hash(),
            *model_diff.output().proof_hash(),
        ];
        let root = BundleTree::compute_root(&leaves);

        info!(
            %root,
            training_valid = training.output().is_valid(),
            data_integrity_valid = data_integrity.output().is_valid(),
            model_diff_valid = model_diff.output().is_valid(),
            "proved training session"
        );

        ProofBundle {
            records: [
                training_record.into(),
                descriptor.into(),
                diff_record.into(),
            ],
            executions: [training, data_integrity, model_diff],
            root,
        }
    }
}

/// The three proofs of a session and the root committing to them.
#[derive(Clone, Debug)]
pub struct ProofBundle {
    records: [ProofRecord; 3],
    executions: [Execution; 3],
    root: BundleRoot,
}

impl ProofBundle {
    fn index(kind: ProofKind) -> usize {
        match kind {
            ProofKind::Training => 0,
            ProofKind::DataIntegrity => 1,
            ProofKind::ModelDiff => 2,
        }
    }

    /// The run of the given circuit.
    pub fn execution(&self, kind: ProofKind) -> &Execution {
        &self.executions[Self::index(kind)]
    }

    /// The record proved by the given circuit.
    pub fn record(&self, kind: ProofKind) -> &ProofRecord {
        &self.records[Self::index(kind)]
    }

    /// Records in proving order, ready for submission.
    pub fn records(&self) -> &[ProofRecord] {
        &self.records
    }

    /// Merkle root over the three proof hashes.
    pub fn root(&self) -> &BundleRoot {
        &self.root
    }

    /// `true` only if every circuit accepted its record.
    pub fn all_valid(&self) -> bool {
        self.executions.iter().all(|e| e.output().is_valid())
    }

    /// Re-runs every circuit on its record under `policy` and checks the
    /// outputs, verdicts and root against the ones carried by the bundle.
    pub fn verify(&self, policy: &Policy) -> bool {
        let reruns = [
            execute_as::<TrainingCircuit>(self.record(ProofKind::Training), policy),
            execute_as::<DataIntegrityCircuit>(self.record(ProofKind::DataIntegrity), policy),
            execute_as::<ModelDiffCircuit>(self.record(ProofKind::ModelDiff), policy),
        ];
        let executions_match = reruns
            .iter()
            .zip(&self.executions)
            .all(|(rerun, stored)| rerun.as_ref() == Some(stored));

        let leaves = self.executions.each_ref().map(|e| *e.output().proof_hash());
        executions_match && BundleTree::compute_root(&leaves) == self.root
    }

    /// Proof that the given circuit's proof hash is under [`Self::root`].
    pub fn inclusion_proof(&self, kind: ProofKind) -> InclusionProof {
        let leaves = self.executions.each_ref().map(|e| *e.output().proof_hash());
        // the index is always within the three leaves
        BundleTree::generate_proof(&leaves, Self::index(kind)).unwrap_or(InclusionProof {
            path: Vec::new(),
            leaf_index: 0,
        })
    }
}
