//! Traits used to describe a single circuit.
//!
//! Records cross this boundary in their fixed-width encoding, and are kept
//! borsh-serializable so they can be stored next to the verdict for audit.

use borsh::{BorshDeserialize, BorshSerialize};
use tip_types::{
    Fingerprint, FixedWidth, Policy, ProofKind, ProofRecord, Verdict,
    commitment::record_fingerprint,
};

/// A circuit proving facts about one record type.
///
/// The public output of every circuit is the triple
/// `(proof_hash, is_valid, fingerprint)`; the runtime derives it from the
/// two functions below so that implementors only describe what is specific
/// to their record.
pub trait ProofCircuit {
    /// The record this circuit takes as input.
    type Record: FixedWidth + BorshSerialize + BorshDeserialize + Clone + Into<ProofRecord>;

    /// Which kind of proof this circuit produces.
    const KIND: ProofKind;

    /// Computes the fingerprint committing to the record's fields.
    fn compute_fingerprint(record: &Self::Record) -> Fingerprint {
        record_fingerprint(Self::KIND, &record.to_words())
    }

    /// Evaluates every predicate of the circuit against the policy.
    ///
    /// Implementations must record each check, including those following a
    /// failed one.
    fn evaluate(record: &Self::Record, policy: &Policy) -> Verdict;

    /// Extracts a record of this circuit's type, if `record` holds one.
    fn extract(record: &ProofRecord) -> Option<&Self::Record>;
}
