//! Native sponge evaluation.

use ark_bn254::Fr;
use ark_crypto_primitives::sponge::poseidon::PoseidonSponge;
use ark_crypto_primitives::sponge::CryptographicSponge;

use super::config::poseidon_config;

fn squeeze_one(sponge: &mut PoseidonSponge<Fr>) -> Fr {
    sponge.squeeze_field_elements::<Fr>(1)[0]
}

/// Absorb `inputs` in order and squeeze one element.
pub fn poseidon_hash_many(inputs: &[Fr]) -> Fr {
    let mut sponge = PoseidonSponge::new(poseidon_config());
    for input in inputs {
        sponge.absorb(input);
    }
    squeeze_one(&mut sponge)
}

/// Two-to-one compression of tree nodes.
pub fn poseidon_hash_two(left: Fr, right: Fr) -> Fr {
    poseidon_hash_many(&[left, right])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_matters() {
        let (a, b) = (Fr::from(1u64), Fr::from(2u64));
        assert_ne!(poseidon_hash_two(a, b), poseidon_hash_two(b, a));
    }

    #[test]
    fn test_absorb_is_not_padded_away() {
        // A trailing zero is a distinct input, not padding.
        let one = Fr::from(1u64);
        assert_ne!(poseidon_hash_many(&[one]), poseidon_hash_many(&[one, Fr::from(0u64)]));
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(poseidon_hash_many(&[]), poseidon_hash_many(&[]));
    }
}
