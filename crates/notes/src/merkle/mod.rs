//! Fixed-height Merkle tree over deposit commitments.
//!
//! This module provides:
//! - Dense tree reconstruction from an ordered leaf list
//! - Root and authentication path computation
//! - Proof folding for local verification

mod proof;
mod tree;


pub use proof::MerkleProof;
pub use tree::{MerkleError, MerkleTree, MAX_HEIGHT};
