//! Deposit secrets and the commitment scheme.
//!
//! A deposit is two independent 31-byte secrets, `nullifier` and `secret`.
//! `commitment = H(le31(nullifier) || le31(secret))` is published on deposit;
//! `nullifier_hash = H(le31(nullifier))` is revealed on withdrawal.

use ark_bn254::Fr;
use ark_ff::PrimeField;
use ark_std::rand::{CryptoRng, RngCore};

use crate::encoding::fr_to_hex;
use crate::hasher::{CompressionFunction, PoseidonCompression};

/// Size of each secret half, little-endian.
pub const SECRET_BYTES: usize = 31;

/// `nullifier || secret`
pub const PREIMAGE_BYTES: usize = 2 * SECRET_BYTES;

/// Secret material of one deposit plus its derived public values.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Deposit {
    nullifier: [u8; SECRET_BYTES],
    secret: [u8; SECRET_BYTES],
    preimage: [u8; PREIMAGE_BYTES],
    commitment: Fr,
    nullifier_hash: Fr,
}

impl Deposit {
    /// Little-endian nullifier bytes.
    pub fn nullifier_bytes(&self) -> &[u8; SECRET_BYTES] {
        &self.nullifier
    }

    /// Little-endian secret bytes.
    pub fn secret_bytes(&self) -> &[u8; SECRET_BYTES] {
        &self.secret
    }

    /// Nullifier as a field element (exact, 248 bits fit below the modulus).
    pub fn nullifier(&self) -> Fr {
        Fr::from_le_bytes_mod_order(&self.nullifier)
    }

    /// Secret as a field element.
    pub fn secret(&self) -> Fr {
        Fr::from_le_bytes_mod_order(&self.secret)
    }

    pub fn preimage(&self) -> &[u8; PREIMAGE_BYTES] {
        &self.preimage
    }

    pub fn commitment(&self) -> Fr {
        self.commitment
    }

    pub fn nullifier_hash(&self) -> Fr {
        self.nullifier_hash
    }

    pub fn commitment_hex(&self) -> String {
        fr_to_hex(&self.commitment)
    }

    pub fn nullifier_hash_hex(&self) -> String {
        fr_to_hex(&self.nullifier_hash)
    }
}

/// Derives deposits with an injected compression function.
#[derive(Clone, Debug, Default)]
pub struct CommitmentScheme<H = PoseidonCompression> {
    hasher: H,
}

impl<H: CompressionFunction> CommitmentScheme<H> {
    pub fn new(hasher: H) -> Self {
        Self { hasher }
    }

    pub fn hasher(&self) -> &H {
        &self.hasher
    }

    /// Derive the deposit for a `(nullifier, secret)` pair. Pure and deterministic.
    pub fn derive(&self, nullifier: [u8; SECRET_BYTES], secret: [u8; SECRET_BYTES]) -> Deposit {
        let mut preimage = [0u8; PREIMAGE_BYTES];
        preimage[..SECRET_BYTES].copy_from_slice(&nullifier);
        preimage[SECRET_BYTES..].copy_from_slice(&secret);

        let commitment = self.hasher.hash_bytes(&preimage);
        let nullifier_hash = self.hasher.hash_bytes(&nullifier);

        Deposit {
            nullifier,
            secret,
            preimage,
            commitment,
            nullifier_hash,
        }
    }

    /// Split a 62-byte preimage back into its halves and derive.
    pub fn derive_from_preimage(&self, preimage: &[u8; PREIMAGE_BYTES]) -> Deposit {
        let mut nullifier = [0u8; SECRET_BYTES];
        let mut secret = [0u8; SECRET_BYTES];
        nullifier.copy_from_slice(&preimage[..SECRET_BYTES]);
        secret.copy_from_slice(&preimage[SECRET_BYTES..]);
        self.derive(nullifier, secret)
    }

    /// Draw fresh secrets from a cryptographically secure RNG.
    pub fn generate<R: RngCore + CryptoRng>(&self, rng: &mut R) -> Deposit {
        let mut nullifier = [0u8; SECRET_BYTES];
        let mut secret = [0u8; SECRET_BYTES];
        rng.fill_bytes(&mut nullifier);
        rng.fill_bytes(&mut secret);
        self.derive(nullifier, secret)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ark_ff::Zero;
    use ark_std::rand::{rngs::StdRng, SeedableRng};
    use std::collections::HashSet;

    #[test]
    fn test_derive_deterministic() {
        let scheme = CommitmentScheme::new(PoseidonCompression);
        let d1 = scheme.derive([7u8; SECRET_BYTES], [9u8; SECRET_BYTES]);
        let d2 = scheme.derive([7u8; SECRET_BYTES], [9u8; SECRET_BYTES]);

        assert_eq!(d1, d2);
        assert_eq!(d1.commitment(), d2.commitment());
        assert_eq!(d1.nullifier_hash(), d2.nullifier_hash());
    }

    #[test]
    fn test_preimage_layout() {
        let scheme = CommitmentScheme::new(PoseidonCompression);
        let mut nullifier = [0u8; SECRET_BYTES];
        nullifier[0] = 1;
        let deposit = scheme.derive(nullifier, [0u8; SECRET_BYTES]);

        assert_eq!(deposit.preimage()[0], 1);
        assert!(deposit.preimage()[1..].iter().all(|b| *b == 0));
        assert_eq!(deposit.nullifier(), Fr::from(1u64));
        assert!(deposit.secret().is_zero());
    }

    #[test]
    fn test_nullifier_hash_ignores_secret() {
        let scheme = CommitmentScheme::new(PoseidonCompression);
        let d1 = scheme.derive([3u8; SECRET_BYTES], [4u8; SECRET_BYTES]);
        let d2 = scheme.derive([3u8; SECRET_BYTES], [5u8; SECRET_BYTES]);

        assert_eq!(d1.nullifier_hash(), d2.nullifier_hash());
        assert_ne!(d1.commitment(), d2.commitment());
    }

    #[test]
    fn test_preimage_roundtrip() {
        let scheme = CommitmentScheme::new(PoseidonCompression);
        let mut rng = StdRng::seed_from_u64(42);
        let deposit = scheme.generate(&mut rng);

        assert_eq!(scheme.derive_from_preimage(deposit.preimage()), deposit);
    }

    #[test]
    fn test_random_commitments_distinct() {
        let scheme = CommitmentScheme::new(PoseidonCompression);
        let mut rng = StdRng::seed_from_u64(7);

        let commitments: HashSet<String> = (0..200)
            .map(|_| scheme.generate(&mut rng).commitment_hex())
            .collect();
        assert_eq!(commitments.len(), 200);
    }

    #[test]
    fn test_large_secret_is_exact() {
        let scheme = CommitmentScheme::new(PoseidonCompression);
        let deposit = scheme.derive([0xff; SECRET_BYTES], [0xff; SECRET_BYTES]);
        // 2^248 - 1 survives the field conversion unreduced.
        let expected = Fr::from_le_bytes_mod_order(&[0xff; SECRET_BYTES]);
        assert_eq!(deposit.nullifier(), expected);
        assert_eq!(
            crate::encoding::fr_to_hex(&deposit.nullifier()),
            format!("0x00{}", "ff".repeat(SECRET_BYTES))
        );
    }
}
