//! Core types for training-integrity proofs.
//!
//! Records, field elements, the fixed-width payload codec, the acceptance
//! policy and the hash-to-field commitments shared by every circuit.

pub mod codec;
pub mod commitment;
pub mod constants;
mod envelope;
mod errors;
mod field;
mod id;
mod merkle;
mod policy;
mod record;
mod verdict;

pub use codec::{FixedWidth, Word};
pub use envelope::{CircuitOutput, ProofEnvelope};
pub use errors::{ParseIdError, ParseKindError, PayloadError, PolicyError};
pub use field::Field;
pub use id::{
    BundleRoot, DatasetCommitment, DiffCommitment, Fingerprint, Identity, ProofHash, VerifierKey,
};
pub use merkle::{BundleTree, InclusionProof};
pub use policy::{Bounds, CommitmentKeys, Policy, PolicyBuilder};
pub use record::{
    DatasetDescriptor, ModelDiffRecord, Params, ProofKind, ProofRecord, TrainingRecord,
    params_changed,
};
pub use verdict::{Check, Verdict};
