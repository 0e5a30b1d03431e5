//! Circuit execution runtime.
//!
//! Runs a circuit end to end: fingerprint the record, evaluate its
//! predicates, then derive the proof hash from the record fields, the
//! validity bit and the fingerprint.

use tip_circuit_interface::ProofCircuit;
use tip_types::{
    CircuitOutput, Fingerprint, FixedWidth, Policy, ProofHash, ProofKind, ProofRecord, Verdict,
    Word, codec::bool_word,
    commitment::{DOMAIN_PROOF, hash_to_field_tagged},
};
use tracing::debug;

use crate::{DataIntegrityCircuit, ModelDiffCircuit, TrainingCircuit};

/// Everything a circuit run produces.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Execution {
    kind: ProofKind,
    output: CircuitOutput,
    verdict: Verdict,
}

impl Execution {
    /// The circuit that ran.
    pub fn kind(&self) -> ProofKind {
        self.kind
    }

    /// The public `(proof_hash, is_valid, fingerprint)` triple.
    pub fn output(&self) -> &CircuitOutput {
        &self.output
    }

    /// Per-check outcomes.
    pub fn verdict(&self) -> &Verdict {
        &self.verdict
    }

    /// Consumes the execution, returning the output and verdict.
    pub fn into_parts(self) -> (CircuitOutput, Verdict) {
        (self.output, self.verdict)
    }
}

/// Runs circuit `C` on `record` under `policy`.
pub fn execute<C: ProofCircuit>(record: &C::Record, policy: &Policy) -> Execution {
    let words = record.to_words();
    let fingerprint = C::compute_fingerprint(record);
    let verdict = C::evaluate(record, policy);
    let is_valid = verdict.is_valid();
    let proof_hash = compute_proof_hash(C::KIND, &words, is_valid, &fingerprint);

    debug!(
        kind = %C::KIND,
        %proof_hash,
        is_valid,
        failed = ?verdict.failures().collect::<Vec<_>>(),
        "executed circuit"
    );

    Execution {
        kind: C::KIND,
        output: CircuitOutput::new(proof_hash, is_valid, fingerprint),
        verdict,
    }
}

/// Runs circuit `C` if `record` is of its type.
pub fn execute_as<C: ProofCircuit>(record: &ProofRecord, policy: &Policy) -> Option<Execution> {
    C::extract(record).map(|r| execute::<C>(r, policy))
}

/// Runs whichever circuit matches the record's kind.
pub fn execute_record(record: &ProofRecord, policy: &Policy) -> Execution {
    match record {
        ProofRecord::Training(r) => execute::<TrainingCircuit>(r, policy),
        ProofRecord::DataIntegrity(r) => execute::<DataIntegrityCircuit>(r, policy),
        ProofRecord::ModelDiff(r) => execute::<ModelDiffCircuit>(r, policy),
    }
}

/// Hashes `record words || validity || fingerprint` under the proof domain.
pub fn compute_proof_hash(
    kind: ProofKind,
    record_words: &[Word],
    is_valid: bool,
    fingerprint: &Fingerprint,
) -> ProofHash {
    let mut words = Vec::with_capacity(record_words.len() + 2);
    words.extend_from_slice(record_words);
    words.push(bool_word(is_valid));
    words.push(fingerprint.into_inner());
    ProofHash::new(hash_to_field_tagged(DOMAIN_PROOF, kind.tag(), &words))
}
