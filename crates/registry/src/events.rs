//! Notifications emitted by registry mutations.

use tip_types::{Identity, ProofHash, ProofKind};

/// Something observable that happened to the registry.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RegistryEvent {
    /// A proof was stored for the first time.
    ProofSubmitted {
        /// Key of the stored proof.
        proof_hash: ProofHash,
        /// Circuit that produced it.
        kind: ProofKind,
        /// Who submitted it.
        submitter: Identity,
        /// Stored validity verdict.
        is_valid: bool,
    },

    /// An existing proof was replaced under [`crate::DuplicatePolicy::Overwrite`].
    ProofOverwritten {
        /// Key of the replaced proof.
        proof_hash: ProofHash,
        /// Submitter of the envelope that was replaced.
        previous_submitter: Identity,
        /// Submitter of the new envelope.
        submitter: Identity,
    },

    /// The acceptance policy changed.
    PolicyUpdated {
        /// Owner that made the change.
        by: Identity,
    },

    /// The verifier key commitments changed.
    CommitmentKeysUpdated {
        /// Owner that made the change.
        by: Identity,
    },

    /// The registry changed hands.
    OwnershipTransferred {
        /// Previous owner.
        from: Identity,
        /// New owner.
        to: Identity,
    },
}

/// The result of a successful mutation with the events it emitted.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Receipt<T> {
    value: T,
    events: Vec<RegistryEvent>,
}

impl<T> Receipt<T> {
    pub(crate) fn new(value: T, events: Vec<RegistryEvent>) -> Self {
        Self { value, events }
    }

    /// The operation's return value.
    pub fn value(&self) -> &T {
        &self.value
    }

    /// Events in emission order.
    pub fn events(&self) -> &[RegistryEvent] {
        &self.events
    }

    /// Consumes the receipt, discarding the events.
    pub fn into_value(self) -> T {
        self.value
    }

    /// Consumes the receipt, returning both parts.
    pub fn into_parts(self) -> (T, Vec<RegistryEvent>) {
        (self.value, self.events)
    }
}
