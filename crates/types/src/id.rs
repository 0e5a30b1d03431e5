//! 32-byte hash, commitment and identity types.

use std::{fmt, str::FromStr};

use borsh::{BorshDeserialize, BorshSerialize};

use crate::errors::ParseIdError;

macro_rules! inst_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Copy, Clone, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash, BorshDeserialize,
            BorshSerialize,
        )]
        pub struct $name([u8; 32]);

        impl $name {
            /// The all-zero value.
            pub const ZERO: Self = Self([0; 32]);

            /// Wraps raw bytes.
            pub const fn new(inner: [u8; 32]) -> Self {
                Self(inner)
            }

            /// Left-pads a big-endian `u64` into 32 bytes.
            pub fn from_u64(value: u64) -> Self {
                let mut buf = [0; 32];
                buf[24..].copy_from_slice(&value.to_be_bytes());
                Self(buf)
            }

            /// Returns the raw bytes.
            pub fn inner(&self) -> &[u8; 32] {
                &self.0
            }

            /// Consumes `self`, returning the raw bytes.
            pub fn into_inner(self) -> [u8; 32] {
                self.0
            }

            /// Returns `true` for the all-zero value.
            pub fn is_zero(&self) -> bool {
                self.0 == [0; 32]
            }
        }

        impl From<[u8; 32]> for $name {
            fn from(inner: [u8; 32]) -> Self {
                Self(inner)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&hex::encode(self.0))
            }
        }

        impl FromStr for $name {
            type Err = ParseIdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let s = s.strip_prefix("0x").unwrap_or(s);
                let mut buf = [0; 32];
                hex::decode_to_slice(s, &mut buf)?;
                Ok(Self(buf))
            }
        }
    };
}

inst_id!(
    /// Merkle root over the proof hashes of a training session.
    BundleRoot
);
inst_id!(
    /// Commitment to a dataset's contents.
    DatasetCommitment
);
inst_id!(
    /// Commitment to an element-wise parameter difference.
    DiffCommitment
);
inst_id!(
    /// Fingerprint of a record's fields.
    Fingerprint
);
inst_id!(
    /// Primary key of a stored proof envelope.
    ProofHash
);
inst_id!(
    /// Submitter or administrator identity.
    Identity
);
inst_id!(
    /// Commitment to a circuit's verification key.
    VerifierKey
);
