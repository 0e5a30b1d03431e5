//! Public outputs of a circuit and the envelopes stored for them.

use borsh::{BorshDeserialize, BorshSerialize};

use crate::{Fingerprint, Identity, ProofHash, ProofKind};

/// The three public values every circuit exposes.
#[derive(Copy, Clone, Debug, Eq, PartialEq, BorshDeserialize, BorshSerialize)]
pub struct CircuitOutput {
    proof_hash: ProofHash,
    is_valid: bool,
    fingerprint: Fingerprint,
}

impl CircuitOutput {
    /// Bundles the outputs.
    pub fn new(proof_hash: ProofHash, is_valid: bool, fingerprint: Fingerprint) -> Self {
        Self {
            proof_hash,
            is_valid,
            fingerprint,
        }
    }

    /// Hash over the record, verdict and fingerprint.
    pub fn proof_hash(&self) -> &ProofHash {
        &self.proof_hash
    }

    /// The validity bit.
    pub fn is_valid(&self) -> bool {
        self.is_valid
    }

    /// Fingerprint of the record fields.
    pub fn fingerprint(&self) -> &Fingerprint {
        &self.fingerprint
    }
}

/// A proof as recorded in the registry, keyed by its hash.
#[derive(Clone, Debug, Eq, PartialEq, BorshDeserialize, BorshSerialize)]
pub struct ProofEnvelope {
    proof_hash: ProofHash,
    kind: ProofKind,
    is_valid: bool,
    timestamp: u64,
    submitter: Identity,
}

impl ProofEnvelope {
    /// Wraps a circuit output with submission metadata.
    pub fn new(
        kind: ProofKind,
        output: &CircuitOutput,
        timestamp: u64,
        submitter: Identity,
    ) -> Self {
        Self {
            proof_hash: output.proof_hash,
            kind,
            is_valid: output.is_valid,
            timestamp,
            submitter,
        }
    }

    /// Primary key.
    pub fn proof_hash(&self) -> &ProofHash {
        &self.proof_hash
    }

    /// Circuit type.
    pub fn kind(&self) -> ProofKind {
        self.kind
    }

    /// Stored validity verdict.
    pub fn is_valid(&self) -> bool {
        self.is_valid
    }

    /// Submission time, unix seconds.
    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    /// Who submitted it.
    pub fn submitter(&self) -> &Identity {
        &self.submitter
    }
}
