//! Training run circuit.

use tip_circuit_interface::ProofCircuit;
use tip_types::{Check, Policy, ProofKind, ProofRecord, TrainingRecord, Verdict, params_changed};

use crate::checks::check_hyperparameters;

/// Checks that a training run moved the model under acceptable settings.
#[derive(Debug)]
pub struct TrainingCircuit;

impl ProofCircuit for TrainingCircuit {
    type Record = TrainingRecord;

    const KIND: ProofKind = ProofKind::Training;

    fn evaluate(record: &TrainingRecord, policy: &Policy) -> Verdict {
        let mut verdict = Verdict::new();
        verdict
            .record(Check::DatasetCommitment, !record.dataset_commitment.is_zero())
            .record(
                Check::ParamsChanged,
                params_changed(&record.params_before, &record.params_after),
            );
        check_hyperparameters(
            &mut verdict,
            policy,
            record.batch_size,
            record.num_epochs,
            record.final_loss,
        );
        verdict
    }

    fn extract(record: &ProofRecord) -> Option<&TrainingRecord> {
        match record {
            ProofRecord::Training(r) => Some(r),
            _ => None,
        }
    }
}
