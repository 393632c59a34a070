//! Local proof verification for testing withdrawal proofs.

use ark_bn254::Bn254;
use ark_groth16::{Groth16, Proof, VerifyingKey};
use ark_snark::SNARK;
use thiserror::Error;

use crate::inputs::PublicInputs;

/// Errors during verification
#[derive(Error, Debug)]
pub enum VerifyError {
    #[error("Verification failed: {0}")]
    Verification(String),
}

/// Verify a withdrawal proof against its six public inputs.
pub fn verify_withdrawal(
    vk: &VerifyingKey<Bn254>,
    proof: &Proof<Bn254>,
    public: &PublicInputs,
) -> Result<bool, VerifyError> {
    let public_inputs = public.to_field_elements();

    Groth16::<Bn254>::verify(vk, &public_inputs, proof)
        .map_err(|e| VerifyError::Verification(e.to_string()))
}
