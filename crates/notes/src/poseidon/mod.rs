//! Poseidon hash over the BN254 scalar field.
//!
//! Native sponge evaluation only. The withdrawal circuit that mirrors these
//! hashes lives outside this workspace and is consumed through the prover.

mod config;
mod native;

pub use config::poseidon_config;
pub use native::{poseidon_hash_many, poseidon_hash_two};
