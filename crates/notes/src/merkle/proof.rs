//! Merkle authentication path.

use ark_bn254::Fr;

use crate::hasher::CompressionFunction;

/// Sibling values and direction bits from the leaf level up to the root.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MerkleProof {
    root: Fr,

    /// Sibling hashes from leaf level (0) to level height-1
    path_elements: Vec<Fr>,

    /// Direction at each level: true = current node is right child
    path_indices: Vec<bool>,
}

impl MerkleProof {
    pub(crate) fn new(root: Fr, path_elements: Vec<Fr>, path_indices: Vec<bool>) -> Self {
        debug_assert_eq!(path_elements.len(), path_indices.len());
        Self {
            root,
            path_elements,
            path_indices,
        }
    }

    pub fn root(&self) -> Fr {
        self.root
    }

    pub fn path_elements(&self) -> &[Fr] {
        &self.path_elements
    }

    pub fn path_indices(&self) -> &[bool] {
        &self.path_indices
    }

    /// Direction bits as `0` (left) / `1` (right).
    pub fn path_index_bits(&self) -> Vec<u8> {
        self.path_indices.iter().map(|&is_right| is_right as u8).collect()
    }

    /// Number of levels.
    pub fn height(&self) -> usize {
        self.path_elements.len()
    }

    /// Fold `leaf` up the path.
    pub fn compute_root<H: CompressionFunction>(&self, leaf: Fr, hasher: &H) -> Fr {
        self.path_elements
            .iter()
            .zip(&self.path_indices)
            .fold(leaf, |current, (sibling, &is_right)| {
                if is_right {
                    hasher.hash_pair(*sibling, current)
                } else {
                    hasher.hash_pair(current, *sibling)
                }
            })
    }

    /// Check that `leaf` folds to the recorded root.
    pub fn verify<H: CompressionFunction>(&self, leaf: Fr, hasher: &H) -> bool {
        self.compute_root(leaf, hasher) == self.root
    }
}
