//! Model diff circuit.

use tip_circuit_interface::ProofCircuit;
use tip_types::{
    Check, ModelDiffRecord, Policy, ProofKind, ProofRecord, Verdict, commitment::diff_commitment,
    params_changed,
};

use crate::checks::check_hyperparameters;

/// Checks that a declared parameter diff matches the parameters it claims to
/// summarise and is bound to a training proof.
#[derive(Debug)]
pub struct ModelDiffCircuit;

impl ProofCircuit for ModelDiffCircuit {
    type Record = ModelDiffRecord;

    const KIND: ProofKind = ProofKind::ModelDiff;

    fn evaluate(record: &ModelDiffRecord, policy: &Policy) -> Verdict {
        let recomputed = diff_commitment(&record.params_before, &record.params_after);
        let mut verdict = Verdict::new();
        verdict
            .record(Check::TrainingProofHash, !record.training_proof_hash.is_zero())
            .record(
                Check::ParamsChanged,
                params_changed(&record.params_before, &record.params_after),
            )
            .record(Check::DiffCommitment, recomputed == record.diff_commitment);
        check_hyperparameters(
            &mut verdict,
            policy,
            record.batch_size,
            record.num_epochs,
            record.final_loss,
        );
        verdict
    }

    fn extract(record: &ProofRecord) -> Option<&ModelDiffRecord> {
        match record {
            ProofRecord::ModelDiff(r) => Some(r),
            _ => None,
        }
    }
}
