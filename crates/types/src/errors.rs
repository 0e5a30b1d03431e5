//! Error types for decoding and policy construction.

use thiserror::Error;

use crate::ProofKind;

/// Errors raised while decoding a fixed-width payload.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PayloadError {
    /// The payload is shorter than its kind requires.
    #[error("payload truncated: expected {expected} bytes, got {actual}")]
    Truncated {
        /// Required length.
        expected: usize,
        /// Supplied length.
        actual: usize,
    },

    /// The payload carries bytes past the last slot.
    #[error("payload has {extra} trailing bytes")]
    TrailingBytes {
        /// Bytes beyond the expected length.
        extra: usize,
    },

    /// An integer slot is not zero-padded.
    #[error("slot {slot} does not hold a canonical u32")]
    NonCanonicalInteger {
        /// Index of the offending slot.
        slot: usize,
    },

    /// A field slot is not a sign-extended 128-bit value.
    #[error("slot {slot} does not hold a canonical field element")]
    NonCanonicalField {
        /// Index of the offending slot.
        slot: usize,
    },
}

/// Errors raised when a policy or key set violates its invariants.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PolicyError {
    /// A range whose minimum is not strictly below its maximum.
    #[error("range {name} is empty or degenerate: min {min} >= max {max}")]
    EmptyRange {
        /// Name of the range.
        name: &'static str,
        /// Rendered minimum.
        min: String,
        /// Rendered maximum.
        max: String,
    },

    /// The accepted format version set is empty.
    #[error("no accepted dataset format versions")]
    NoFormatVersions,

    /// A verifier key was left zero.
    #[error("verifier key for {0} is zero")]
    ZeroVerifierKey(ProofKind),
}

/// Error returned for an unrecognised proof kind name.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown proof kind {0:?}")]
pub struct ParseKindError(pub String);

/// Error returned when parsing a 32-byte hex value.
#[derive(Debug, Error, Clone, PartialEq)]
#[error("invalid 32-byte hex value: {0}")]
pub struct ParseIdError(#[from] hex::FromHexError);
