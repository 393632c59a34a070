//! Dense Merkle tree rebuilt from the ledger's leaf sequence.
//!
//! Leaves fill positions `0..n` in the order given. Every position past `n`,
//! and every node whose subtree is entirely unpopulated, takes the
//! precomputed empty value for its level.

use ark_bn254::Fr;
use rayon::prelude::*;
use thiserror::Error;

use super::proof::MerkleProof;
use crate::hasher::{CompressionFunction, PoseidonCompression};

/// Largest supported height (4,294,967,296 leaves).
pub const MAX_HEIGHT: usize = 32;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MerkleError {
    #[error("{leaves} leaves exceed tree capacity {capacity}")]
    Capacity { leaves: usize, capacity: u64 },
    #[error("Tree height {height} exceeds maximum {max}")]
    UnsupportedHeight { height: usize, max: usize },
    #[error("Leaf index {index} out of range for capacity {capacity}")]
    IndexOutOfRange { index: usize, capacity: u64 },
}

#[derive(Clone, Debug)]
pub struct MerkleTree<H = PoseidonCompression> {
    height: usize,
    hasher: H,

    /// layers[0] = leaves, layers[height] = root (empty when no leaves)
    layers: Vec<Vec<Fr>>,

    /// zeros[0] = empty leaf
    /// zeros[i] = hash(zeros[i-1], zeros[i-1])
    zeros: Vec<Fr>,
}

impl<H: CompressionFunction> MerkleTree<H> {
    /// Build a tree of `height` from leaves already in ledger order.
    pub fn build(height: usize, leaves: Vec<Fr>, hasher: H) -> Result<Self, MerkleError> {
        if height > MAX_HEIGHT {
            return Err(MerkleError::UnsupportedHeight {
                height,
                max: MAX_HEIGHT,
            });
        }

        let capacity = 1u64 << height;
        if leaves.len() as u64 > capacity {
            return Err(MerkleError::Capacity {
                leaves: leaves.len(),
                capacity,
            });
        }

        let zeros = Self::compute_zeros(height, &hasher);

        let mut layers = Vec::with_capacity(height + 1);
        layers.push(leaves);
        for level in 0..height {
            let zero = zeros[level];
            let parents: Vec<Fr> = layers[level]
                .par_chunks(2)
                .map(|pair| {
                    let right = pair.get(1).copied().unwrap_or(zero);
                    hasher.hash_pair(pair[0], right)
                })
                .collect();
            layers.push(parents);
        }

        Ok(Self {
            height,
            hasher,
            layers,
            zeros,
        })
    }

    fn compute_zeros(height: usize, hasher: &H) -> Vec<Fr> {
        let mut zeros = Vec::with_capacity(height + 1);
        let mut current = hasher.empty_leaf();
        zeros.push(current);
        for _ in 0..height {
            current = hasher.hash_pair(current, current);
            zeros.push(current);
        }
        zeros
    }

    /// Node value at `(level, index)`, falling back to the level's empty value.
    fn node(&self, level: usize, index: u64) -> Fr {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.layers[level].get(i))
            .copied()
            .unwrap_or(self.zeros[level])
    }

    pub fn root(&self) -> Fr {
        self.node(self.height, 0)
    }

    /// Position of the first leaf equal to `commitment`.
    pub fn find_leaf_index(&self, commitment: &Fr) -> Option<usize> {
        self.layers[0].iter().position(|leaf| leaf == commitment)
    }

    /// Authentication path for the leaf at `index`.
    pub fn path(&self, index: usize) -> Result<MerkleProof, MerkleError> {
        let capacity = self.capacity();
        if index as u64 >= capacity {
            return Err(MerkleError::IndexOutOfRange { index, capacity });
        }

        let mut path_elements = Vec::with_capacity(self.height);
        let mut path_indices = Vec::with_capacity(self.height);

        let mut current = index as u64;
        for level in 0..self.height {
            path_elements.push(self.node(level, current ^ 1));
            path_indices.push(current & 1 == 1);
            current >>= 1;
        }

        Ok(MerkleProof::new(self.root(), path_elements, path_indices))
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Maximum number of leaves (`2^height`).
    pub fn capacity(&self) -> u64 {
        1u64 << self.height
    }

    pub fn leaves(&self) -> &[Fr] {
        &self.layers[0]
    }

    pub fn len(&self) -> usize {
        self.layers[0].len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers[0].is_empty()
    }

    /// Empty-subtree value at `level`.
    pub fn zero_at_level(&self, level: usize) -> Fr {
        self.zeros[level]
    }

    pub fn hasher(&self) -> &H {
        &self.hasher
    }
}
