//! Note protocol primitives for a shielded deposit pool.
//!
//! This crate provides:
//! - `CommitmentScheme`: derive commitments and nullifier hashes from secret material
//! - `NoteCodec`: serialize deposits into bearer note strings and back
//! - `EventCache`: merge cached deposit events with freshly fetched ones
//! - `MerkleTree`: rebuild the fixed-height deposit tree and produce authentication paths

pub mod deposit;
pub mod encoding;
pub mod events;
pub mod hasher;
pub mod merkle;
pub mod note;
pub mod poseidon;
pub mod units;

pub use deposit::{CommitmentScheme, Deposit, PREIMAGE_BYTES, SECRET_BYTES};
pub use encoding::{fr_from_hex, fr_to_decimal, fr_to_hex, Address, EncodingError};
pub use events::{
    ordered_commitments, CacheError, DepositEvent, EventCache, EventCacheSnapshot, EventError,
};
pub use hasher::{CompressionFunction, PoseidonCompression};
pub use merkle::{MerkleError, MerkleProof, MerkleTree, MAX_HEIGHT};
pub use note::{Note, NoteCodec, NoteError};
pub use units::{parse_units, UnitsError};

use ark_bn254::Fr;

/// Common type aliases
pub type ConstraintF = Fr;
