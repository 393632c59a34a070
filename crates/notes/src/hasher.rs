//! The one-way compression function shared by commitments and the tree.

use ark_bn254::Fr;
use ark_ff::PrimeField;
use sha2::{Digest, Sha256};

use crate::poseidon::{poseidon_hash_many, poseidon_hash_two};

/// Bytes per field element when packing byte strings (31 bytes stay below the BN254 modulus).
pub const CHUNK_BYTES: usize = 31;

/// Domain tag hashed into the value of an unpopulated leaf.
const EMPTY_LEAF_DOMAIN: &[u8] = b"mixer-notes/empty-leaf/v1";

/// Compression primitive consumed by the commitment scheme and the Merkle tree.
///
/// Implementations must be deterministic. Collision resistance is entirely
/// the implementation's responsibility.
pub trait CompressionFunction: Send + Sync {
    /// Hash an arbitrary byte string to a field element.
    fn hash_bytes(&self, bytes: &[u8]) -> Fr;

    /// Hash two tree nodes: H(left, right).
    fn hash_pair(&self, left: Fr, right: Fr) -> Fr;

    /// Value of a leaf that has never been populated.
    fn empty_leaf(&self) -> Fr;
}

/// Poseidon sponge over BN254.
///
/// Byte strings are absorbed as their length followed by 31-byte
/// little-endian chunks.
#[derive(Clone, Copy, Debug, Default)]
pub struct PoseidonCompression;

impl CompressionFunction for PoseidonCompression {
    fn hash_bytes(&self, bytes: &[u8]) -> Fr {
        let mut inputs = Vec::with_capacity(1 + bytes.len().div_ceil(CHUNK_BYTES));
        inputs.push(Fr::from(bytes.len() as u64));
        inputs.extend(bytes.chunks(CHUNK_BYTES).map(Fr::from_le_bytes_mod_order));
        poseidon_hash_many(&inputs)
    }

    fn hash_pair(&self, left: Fr, right: Fr) -> Fr {
        poseidon_hash_two(left, right)
    }

    fn empty_leaf(&self) -> Fr {
        Fr::from_le_bytes_mod_order(Sha256::digest(EMPTY_LEAF_DOMAIN).as_slice())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_bytes_length_separated() {
        let hasher = PoseidonCompression;
        // Same chunk values, different byte lengths.
        assert_ne!(hasher.hash_bytes(&[0u8; 31]), hasher.hash_bytes(&[0u8; 30]));
    }

    #[test]
    fn test_empty_leaf_stable() {
        let hasher = PoseidonCompression;
        assert_eq!(hasher.empty_leaf(), hasher.empty_leaf());
        assert_ne!(hasher.empty_leaf(), Fr::from(0u64));
    }
}
