//! Hash-to-field fingerprints and commitments.
//!
//! Every digest is `SHA256(domain || len_be32 || word_0 || ... || word_n)`
//! with the top three bits cleared, so that the result is also a canonical
//! element of a ~253-bit prime field and can be fed back into a circuit as a
//! public input.

use sha2::{Digest, Sha256};

use crate::{
    DiffCommitment, Fingerprint, ProofKind,
    codec::{SlotWriter, Word},
    constants::NUM_PARAMS,
    record::Params,
};

/// Domain prefix for record fingerprints. The proof kind tag follows it.
pub const DOMAIN_RECORD: &[u8] = b"TIP_RECORD_FP_V1";

/// Domain prefix for model diff commitments.
pub const DOMAIN_MODEL_DIFF: &[u8] = b"TIP_MODEL_DIFF_V1";

/// Domain prefix for proof hashes. The proof kind tag follows it.
pub const DOMAIN_PROOF: &[u8] = b"TIP_PROOF_V1";

/// Domain prefix for proof bundle Merkle leaves.
pub const DOMAIN_BUNDLE_LEAF: &[u8] = b"TIP_BUNDLE_LEAF_V1";

/// Domain prefix for proof bundle Merkle nodes.
pub const DOMAIN_BUNDLE_NODE: &[u8] = b"TIP_BUNDLE_NODE_V1";

/// Mask applied to the first digest byte.
const FIELD_TOP_MASK: u8 = 0x1f;

/// Hashes `words` under `domain` into a field-sized 32-byte value.
pub fn hash_to_field(domain: &[u8], words: &[Word]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(domain);
    hasher.update((words.len() as u32).to_be_bytes());
    for w in words {
        hasher.update(w);
    }
    let mut out: [u8; 32] = hasher.finalize().into();
    out[0] &= FIELD_TOP_MASK;
    out
}

/// Same as [`hash_to_field`] with a one-byte sub-domain after the prefix.
pub fn hash_to_field_tagged(domain: &[u8], tag: u8, words: &[Word]) -> [u8; 32] {
    let mut prefixed = Vec::with_capacity(domain.len() + 1);
    prefixed.extend_from_slice(domain);
    prefixed.push(tag);
    hash_to_field(&prefixed, words)
}

/// Fingerprints the encoded fields of a record of the given kind.
pub fn record_fingerprint(kind: ProofKind, words: &[Word]) -> Fingerprint {
    Fingerprint::new(hash_to_field_tagged(DOMAIN_RECORD, kind.tag(), words))
}

/// Commits to `after - before`, element-wise.
pub fn diff_commitment(before: &Params, after: &Params) -> DiffCommitment {
    let mut w = SlotWriter::with_capacity(NUM_PARAMS);
    for (b, a) in before.iter().zip(after) {
        w.field(a.wrapping_sub(*b));
    }
    DiffCommitment::new(hash_to_field(DOMAIN_MODEL_DIFF, &w.into_words()))
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use proptest::prelude::*;

    use super::*;
    use crate::Field;

    #[test]
    fn test_output_is_field_sized() {
        let out = hash_to_field(DOMAIN_RECORD, &[[0xff; 32]; 3]);
        assert_eq!(out[0] & !FIELD_TOP_MASK, 0);
    }

    #[test]
    fn test_domains_separate() {
        let words = [[7u8; 32]];
        assert_ne!(
            record_fingerprint(ProofKind::Training, &words),
            record_fingerprint(ProofKind::ModelDiff, &words)
        );
        assert_ne!(
            hash_to_field(DOMAIN_RECORD, &words),
            hash_to_field(DOMAIN_PROOF, &words)
        );
    }

    #[test]
    fn test_length_is_bound() {
        // an empty sequence and a single zero word must not collide
        assert_ne!(
            hash_to_field(DOMAIN_RECORD, &[]),
            hash_to_field(DOMAIN_RECORD, &[[0; 32]])
        );
    }

    #[test]
    fn test_diff_commitment_depends_only_on_delta() {
        let before = [0.1, 0.2, 0.3, 0.4].map(Field::from_decimal);
        let after = [0.15, 0.25, 0.35, 0.45].map(Field::from_decimal);
        let shifted_before = [1.1, 1.2, 1.3, 1.4].map(Field::from_decimal);
        let shifted_after = [1.15, 1.25, 1.35, 1.45].map(Field::from_decimal);
        assert_eq!(
            diff_commitment(&before, &after),
            diff_commitment(&shifted_before, &shifted_after)
        );
        assert_ne!(
            diff_commitment(&before, &after),
            diff_commitment(&after, &before)
        );
    }

    proptest! {
        #[test]
        fn fingerprint_is_deterministic(words in prop::collection::vec(any::<[u8; 32]>(), 0..16)) {
            prop_assert_eq!(
                record_fingerprint(ProofKind::Training, &words),
                record_fingerprint(ProofKind::Training, &words)
            );
        }

        #[test]
        fn distinct_inputs_do_not_collide(
            inputs in prop::collection::hash_set(
                prop::collection::vec(any::<[u8; 32]>(), 1..4),
                64..256,
            )
        ) {
            let digests: HashSet<_> = inputs
                .iter()
                .map(|words| record_fingerprint(ProofKind::DataIntegrity, words))
                .collect();
            prop_assert_eq!(digests.len(), inputs.len());
        }
    }
}
