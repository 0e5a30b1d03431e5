use std::{io, path::PathBuf};

use thiserror::Error;
use tip_types::{
    Fingerprint, Identity, ParseIdError, ParseKindError, PayloadError, PolicyError, ProofHash,
};

/// Errors returned by registry operations.
///
/// Every variant is raised before the ledger is touched, so a failed call
/// never leaves a partial write behind.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// The submitted payload could not be decoded for its kind.
    #[error("malformed payload: {0}")]
    MalformedPayload(#[from] PayloadError),

    /// The submission named a circuit the registry does not know.
    #[error(transparent)]
    UnknownProofKind(#[from] ParseKindError),

    /// An administrative update would break a policy invariant.
    #[error("policy rejected: {0}")]
    PolicyRejected(#[from] PolicyError),

    /// The commitment sent alongside a payload is not the payload's fingerprint.
    #[error("claimed commitment {claimed} does not match computed fingerprint {computed}")]
    CommitmentMismatch {
        /// Commitment supplied by the submitter.
        claimed: Fingerprint,
        /// Fingerprint recomputed from the payload.
        computed: Fingerprint,
    },

    /// A proof with this hash is already stored.
    #[error("proof {0} already submitted")]
    DuplicateProof(ProofHash),

    /// The caller is not the registry owner.
    #[error("caller {caller} is not the registry owner")]
    Unauthorized {
        /// Identity that attempted the call.
        caller: Identity,
    },

    /// Ownership cannot be handed to the zero identity.
    #[error("new owner must not be the zero identity")]
    ZeroOwner,
}

/// Errors raised while loading a [`crate::RegistryConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config {path}: {source}")]
    Io {
        /// File that was being read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The file is not valid TOML for the expected shape.
    #[error("invalid config: {0}")]
    Toml(#[from] toml::de::Error),

    /// A 32-byte value such as the owner or a verifier key is not valid hex.
    #[error("invalid {field}: {source}")]
    InvalidHex {
        /// Name of the offending setting.
        field: &'static str,
        /// Parse failure.
        #[source]
        source: ParseIdError,
    },

    /// The configured ranges or keys violate a policy invariant.
    #[error("invalid policy: {0}")]
    InvalidPolicy(#[from] PolicyError),
}
