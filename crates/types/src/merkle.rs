//! Merkle tree over the proof hashes of a training session.
//!
//! Leaves are hashed under [`DOMAIN_BUNDLE_LEAF`], nodes under
//! [`DOMAIN_BUNDLE_NODE`]. The leaf level is padded with zero hashes up to
//! the next power of two.

use borsh::{BorshDeserialize, BorshSerialize};
use sha2::{Digest, Sha256};

use crate::{
    BundleRoot, ProofHash,
    commitment::{DOMAIN_BUNDLE_LEAF, DOMAIN_BUNDLE_NODE},
};

/// Inclusion proof of one proof hash under a [`BundleRoot`].
#[derive(Clone, Debug, Eq, PartialEq, BorshDeserialize, BorshSerialize)]
pub struct InclusionProof {
    /// Sibling hashes, leaf level first.
    pub path: Vec<[u8; 32]>,
    /// Position of the leaf.
    pub leaf_index: u32,
}

/// Stateless Merkle helpers over proof hashes.
#[derive(Debug)]
pub struct BundleTree;

impl BundleTree {
    /// Computes the root over `leaves`. An empty bundle has the zero root.
    pub fn compute_root(leaves: &[ProofHash]) -> BundleRoot {
        if leaves.is_empty() {
            return BundleRoot::ZERO;
        }
        let mut level = Self::leaf_level(leaves);
        while level.len() > 1 {
            level = Self::parent_level(&level);
        }
        BundleRoot::new(level[0])
    }

    /// Builds the inclusion proof for `leaves[leaf_index]`.
    ///
    /// Returns `None` if the index is out of bounds.
    pub fn generate_proof(leaves: &[ProofHash], leaf_index: usize) -> Option<InclusionProof> {
        if leaf_index >= leaves.len() {
            return None;
        }
        let mut path = Vec::new();
        let mut level = Self::leaf_level(leaves);
        let mut index = leaf_index;
        while level.len() > 1 {
            path.push(level[index ^ 1]);
            level = Self::parent_level(&level);
            index /= 2;
        }
        Some(InclusionProof {
            path,
            leaf_index: leaf_index as u32,
        })
    }

    /// Checks that `leaf` is included under `root`.
    pub fn verify_proof(root: &BundleRoot, proof: &InclusionProof, leaf: &ProofHash) -> bool {
        let mut current = Self::hash_leaf(leaf);
        let mut index = proof.leaf_index as usize;
        for sibling in &proof.path {
            current = if index % 2 == 0 {
                Self::hash_node(&current, sibling)
            } else {
                Self::hash_node(sibling, &current)
            };
            index /= 2;
        }
        index == 0 && current == *root.inner()
    }

    fn leaf_level(leaves: &[ProofHash]) -> Vec<[u8; 32]> {
        let mut level: Vec<_> = leaves.iter().map(Self::hash_leaf).collect();
        level.resize(leaves.len().next_power_of_two(), [0; 32]);
        level
    }

    fn parent_level(level: &[[u8; 32]]) -> Vec<[u8; 32]> {
        level
            .chunks_exact(2)
            .map(|pair| Self::hash_node(&pair[0], &pair[1]))
            .collect()
    }

    fn hash_leaf(leaf: &ProofHash) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(DOMAIN_BUNDLE_LEAF);
        hasher.update(leaf.inner());
        hasher.finalize().into()
    }

    fn hash_node(left: &[u8; 32], right: &[u8; 32]) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(DOMAIN_BUNDLE_NODE);
        hasher.update(left);
        hasher.update(right);
        hasher.finalize().into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaves(n: u8) -> Vec<ProofHash> {
        (1..=n).map(|i| ProofHash::new([i; 32])).collect()
    }

    #[test]
    fn test_single_leaf() {
        let leaves = leaves(1);
        let root = BundleTree::compute_root(&leaves);
        let proof = BundleTree::generate_proof(&leaves, 0).unwrap();
        assert!(proof.path.is_empty());
        assert!(BundleTree::verify_proof(&root, &proof, &leaves[0]));
    }

    #[test]
    fn test_three_leaves() {
        let leaves = leaves(3);
        let root = BundleTree::compute_root(&leaves);
        for (i, leaf) in leaves.iter().enumerate() {
            let proof = BundleTree::generate_proof(&leaves, i).unwrap();
            assert_eq!(proof.path.len(), 2);
            assert!(BundleTree::verify_proof(&root, &proof, leaf));
        }
    }

    #[test]
    fn test_rejects_wrong_leaf_or_index() {
        let leaves = leaves(4);
        let root = BundleTree::compute_root(&leaves);
        let mut proof = BundleTree::generate_proof(&leaves, 1).unwrap();
        assert!(!BundleTree::verify_proof(&root, &proof, &leaves[2]));
        proof.leaf_index = 2;
        assert!(!BundleTree::verify_proof(&root, &proof, &leaves[1]));
        assert!(BundleTree::generate_proof(&leaves, 4).is_none());
    }

    #[test]
    fn test_order_matters() {
        let mut leaves = leaves(3);
        let root = BundleTree::compute_root(&leaves);
        leaves.swap(0, 2);
        assert_ne!(BundleTree::compute_root(&leaves), root);
        assert_eq!(BundleTree::compute_root(&[]), BundleRoot::ZERO);
    }
}
