//! Poseidon configuration for BN254.
//!
//! Width-3 permutation (rate 2, capacity 1). The MDS matrix is a Cauchy
//! matrix and the round constants are expanded from SHA-256 under a fixed
//! domain tag, so every build derives the same parameters.

use std::sync::OnceLock;

use ark_bn254::Fr;
use ark_crypto_primitives::sponge::poseidon::PoseidonConfig;
use ark_ff::{Field, PrimeField};
use sha2::{Digest, Sha256};

/// Number of full rounds (beginning + end)
const FULL_ROUNDS: usize = 8;

/// Number of partial rounds
const PARTIAL_ROUNDS: usize = 57;

/// S-box exponent
const ALPHA: u64 = 5;

const RATE: usize = 2;
const CAPACITY: usize = 1;
const WIDTH: usize = RATE + CAPACITY;

/// Domain tag for round constant expansion.
const ARK_DOMAIN: &[u8] = b"mixer-notes/poseidon/ark/v1";

static CONFIG: OnceLock<PoseidonConfig<Fr>> = OnceLock::new();

/// Get the Poseidon configuration, building it on first use.
pub fn poseidon_config() -> &'static PoseidonConfig<Fr> {
    CONFIG.get_or_init(|| PoseidonConfig {
        full_rounds: FULL_ROUNDS,
        partial_rounds: PARTIAL_ROUNDS,
        alpha: ALPHA,
        ark: round_constants(),
        mds: cauchy_mds(),
        rate: RATE,
        capacity: CAPACITY,
    })
}

/// `mds[i][j] = 1 / (i + WIDTH + j)`. Every square submatrix of a Cauchy
/// matrix is non-singular.
fn cauchy_mds() -> Vec<Vec<Fr>> {
    (0..WIDTH)
        .map(|i| {
            (0..WIDTH)
                .map(|j| {
                    Fr::from((i + WIDTH + j) as u64)
                        .inverse()
                        .expect("Cauchy denominators are small non-zero integers")
                })
                .collect()
        })
        .collect()
}

fn round_constants() -> Vec<Vec<Fr>> {
    let num_rounds = FULL_ROUNDS + PARTIAL_ROUNDS;

    (0..num_rounds)
        .map(|round| {
            (0..WIDTH)
                .map(|i| {
                    let digest = Sha256::new()
                        .chain_update(ARK_DOMAIN)
                        .chain_update((round as u32).to_le_bytes())
                        .chain_update((i as u32).to_le_bytes())
                        .finalize();
                    Fr::from_le_bytes_mod_order(digest.as_slice())
                })
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_valid() {
        let config = poseidon_config();
        assert_eq!(config.full_rounds, FULL_ROUNDS);
        assert_eq!(config.partial_rounds, PARTIAL_ROUNDS);
        assert_eq!(config.rate, 2);
        assert_eq!(config.capacity, 1);
        assert_eq!(config.mds.len(), WIDTH);
        assert!(config.mds.iter().all(|row| row.len() == WIDTH));
        assert_eq!(config.ark.len(), FULL_ROUNDS + PARTIAL_ROUNDS);
    }

    #[test]
    fn test_round_constants_distinct() {
        let ark = round_constants();
        assert_ne!(ark[0][0], ark[0][1]);
        assert_ne!(ark[0][0], ark[1][0]);
    }
}
