//! Proof generation through an external withdrawal circuit.
//!
//! The circuit itself is opaque here: a [`Prover`] receives the circuit
//! definition, the proving key bytes and the assembled inputs, and hands
//! back a Groth16 proof over BN254.

use std::fs;
use std::path::Path;

use ark_bn254::Bn254;
use ark_groth16::{Proof, ProvingKey};
use ark_serialize::CanonicalDeserialize;
use serde_json::Value;
use thiserror::Error;

use crate::inputs::CircuitInputs;

/// Circuit definition file inside the artifacts directory.
pub const CIRCUIT_FILE: &str = "withdraw.json";
/// Proving key file inside the artifacts directory.
pub const PROVING_KEY_FILE: &str = "withdraw_proving_key.bin";

/// Errors during proof generation
#[derive(Error, Debug)]
pub enum ProveError {
    #[error("Proof generation failed: {0}")]
    ProofGeneration(String),
    #[error("Invalid circuit artifacts: {0}")]
    InvalidArtifacts(String),
    #[error("Serialization failed: {0}")]
    Serialization(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Circuit definition and proving key, loaded once and reused.
#[derive(Clone, Debug)]
pub struct CircuitArtifacts {
    pub circuit: Value,
    pub proving_key: Vec<u8>,
}

impl CircuitArtifacts {
    pub fn load_from_directory(dir: &Path) -> Result<Self, ProveError> {
        let circuit = serde_json::from_slice(&fs::read(dir.join(CIRCUIT_FILE))?)
            .map_err(|e| ProveError::InvalidArtifacts(format!("{}: {}", CIRCUIT_FILE, e)))?;
        let proving_key = fs::read(dir.join(PROVING_KEY_FILE))?;

        Ok(Self {
            circuit,
            proving_key,
        })
    }

    pub fn save_to_directory(&self, dir: &Path) -> Result<(), ProveError> {
        fs::create_dir_all(dir)?;

        let circuit = serde_json::to_vec(&self.circuit)
            .map_err(|e| ProveError::Serialization(e.to_string()))?;
        fs::write(dir.join(CIRCUIT_FILE), circuit)?;
        fs::write(dir.join(PROVING_KEY_FILE), &self.proving_key)?;

        Ok(())
    }

    /// Decode the proving key as an arkworks Groth16 key.
    pub fn groth16_proving_key(&self) -> Result<ProvingKey<Bn254>, ProveError> {
        ProvingKey::deserialize_compressed(self.proving_key.as_slice())
            .map_err(|e| ProveError::InvalidArtifacts(e.to_string()))
    }
}

/// Black-box withdrawal prover.
pub trait Prover {
    fn prove(
        &self,
        artifacts: &CircuitArtifacts,
        inputs: &CircuitInputs,
    ) -> Result<Proof<Bn254>, ProveError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_artifacts_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let artifacts = CircuitArtifacts {
            circuit: json!({ "name": "withdraw", "levels": 20 }),
            proving_key: vec![1, 2, 3, 4],
        };

        artifacts.save_to_directory(dir.path()).unwrap();
        assert!(dir.path().join(CIRCUIT_FILE).exists());
        assert!(dir.path().join(PROVING_KEY_FILE).exists());

        let loaded = CircuitArtifacts::load_from_directory(dir.path()).unwrap();
        assert_eq!(loaded.circuit, artifacts.circuit);
        assert_eq!(loaded.proving_key, artifacts.proving_key);
    }

    #[test]
    fn test_missing_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            CircuitArtifacts::load_from_directory(dir.path()),
            Err(ProveError::Io(_))
        ));
    }

    #[test]
    fn test_malformed_circuit() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(CIRCUIT_FILE), b"not json").unwrap();
        fs::write(dir.path().join(PROVING_KEY_FILE), b"").unwrap();

        assert!(matches!(
            CircuitArtifacts::load_from_directory(dir.path()),
            Err(ProveError::InvalidArtifacts(_))
        ));
    }

    #[test]
    fn test_garbage_proving_key() {
        let artifacts = CircuitArtifacts {
            circuit: json!({}),
            proving_key: vec![0xff; 16],
        };
        assert!(artifacts.groth16_proving_key().is_err());
    }
}
