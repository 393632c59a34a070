//! Circuit input assembly and proof formatting for the withdrawal verifier.

use ark_bn254::{Bn254, Fq, Fr};
use ark_ff::{BigInteger, PrimeField};
use ark_groth16::Proof;
use mixer_notes::encoding::{fixed_hex, fr_to_be_bytes, fr_to_decimal, ADDRESS_BYTES, FIELD_BYTES};
use mixer_notes::{Address, Deposit, MerkleProof};
use serde::Serialize;
use serde_json::{json, Value};

/// Recipient-side parameters of a withdrawal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WithdrawalRequest {
    pub recipient: Address,
    /// `Address::ZERO` when withdrawing without a relayer.
    pub relayer: Address,
    pub fee: u128,
    pub refund: u128,
}

impl WithdrawalRequest {
    /// Direct withdrawal: no relayer, no fee, no refund.
    pub fn direct(recipient: Address) -> Self {
        Self {
            recipient,
            relayer: Address::ZERO,
            fee: 0,
            refund: 0,
        }
    }
}

/// Values the on-chain verifier sees.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublicInputs {
    pub root: Fr,
    pub nullifier_hash: Fr,
    pub recipient: Address,
    pub relayer: Address,
    pub fee: u128,
    pub refund: u128,
}

impl PublicInputs {
    /// Field elements in verifier order.
    pub fn to_field_elements(&self) -> Vec<Fr> {
        vec![
            self.root,
            self.nullifier_hash,
            self.recipient.to_field(),
            self.relayer.to_field(),
            Fr::from(self.fee),
            Fr::from(self.refund),
        ]
    }

    /// Contract call arguments: `0x` big-endian hex, 32 or 20 bytes wide.
    pub fn verifier_args(&self) -> [String; 6] {
        [
            fixed_hex(&fr_to_be_bytes(&self.root), FIELD_BYTES),
            fixed_hex(&fr_to_be_bytes(&self.nullifier_hash), FIELD_BYTES),
            fixed_hex(self.recipient.as_bytes(), ADDRESS_BYTES),
            fixed_hex(self.relayer.as_bytes(), ADDRESS_BYTES),
            fixed_hex(&self.fee.to_be_bytes(), FIELD_BYTES),
            fixed_hex(&self.refund.to_be_bytes(), FIELD_BYTES),
        ]
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PrivateInputs {
    pub nullifier: Fr,
    pub secret: Fr,
    pub path_elements: Vec<Fr>,
    pub path_indices: Vec<u8>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CircuitInputs {
    pub public: PublicInputs,
    pub private: PrivateInputs,
}

impl CircuitInputs {
    /// Input file for an external witness generator: camelCase keys, every
    /// value a decimal string.
    pub fn to_json(&self) -> Value {
        let public = &self.public;
        let private = &self.private;
        json!({
            "root": fr_to_decimal(&public.root),
            "nullifierHash": fr_to_decimal(&public.nullifier_hash),
            "recipient": fr_to_decimal(&public.recipient.to_field()),
            "relayer": fr_to_decimal(&public.relayer.to_field()),
            "fee": public.fee.to_string(),
            "refund": public.refund.to_string(),
            "nullifier": fr_to_decimal(&private.nullifier),
            "secret": fr_to_decimal(&private.secret),
            "pathElements": private
                .path_elements
                .iter()
                .map(fr_to_decimal)
                .collect::<Vec<_>>(),
            "pathIndices": private
                .path_indices
                .iter()
                .map(|bit| bit.to_string())
                .collect::<Vec<_>>(),
        })
    }
}

pub fn build_inputs(
    deposit: &Deposit,
    path: &MerkleProof,
    request: &WithdrawalRequest,
) -> CircuitInputs {
    CircuitInputs {
        public: PublicInputs {
            root: path.root(),
            nullifier_hash: deposit.nullifier_hash(),
            recipient: request.recipient,
            relayer: request.relayer,
            fee: request.fee,
            refund: request.refund,
        },
        private: PrivateInputs {
            nullifier: deposit.nullifier(),
            secret: deposit.secret(),
            path_elements: path.path_elements().to_vec(),
            path_indices: path.path_index_bits(),
        },
    }
}

fn fq_to_be_bytes(value: &Fq) -> [u8; FIELD_BYTES] {
    let bytes = value.into_bigint().to_bytes_be();
    let mut out = [0u8; FIELD_BYTES];
    out[FIELD_BYTES - bytes.len()..].copy_from_slice(&bytes);
    out
}

/// Pack a proof as the verifier contract expects it.
///
/// G2 coordinates go imaginary part first.
pub fn format_proof(proof: &Proof<Bn254>) -> String {
    let words = [
        proof.a.x,
        proof.a.y,
        proof.b.x.c1,
        proof.b.x.c0,
        proof.b.y.c1,
        proof.b.y.c0,
        proof.c.x,
        proof.c.y,
    ];

    let mut out = String::with_capacity(2 + words.len() * FIELD_BYTES * 2);
    out.push_str("0x");
    for word in &words {
        out.push_str(&hex::encode(fq_to_be_bytes(word)));
    }
    out
}

/// What gets sent to the pool's `withdraw` entry point.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct WithdrawalProof {
    pub proof: String,
    pub args: [String; 6],
}
