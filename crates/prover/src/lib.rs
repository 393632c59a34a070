//! Withdrawal flow for the shielded deposit pool.
//!
//! This crate provides utilities for:
//! - Resolving deployments and flow context from configuration
//! - Rebuilding the deposit tree from ledger events and checking it against the ledger
//! - Assembling circuit inputs and formatting proofs for the on-chain verifier
//! - Local Groth16 verification (for testing)

pub mod config;
pub mod context;
pub mod deposit;
pub mod error;
pub mod gate;
pub mod inputs;
pub mod ledger;
pub mod prove;
pub mod verify;
pub mod withdraw;


pub use config::{ConfigError, InstanceDeployment, MixerConfig};
pub use context::FlowContext;
pub use deposit::{create_deposit, submit_deposit, DepositTicket};
pub use error::WithdrawError;
pub use gate::{check_withdrawal, GateError};
pub use inputs::{
    build_inputs, format_proof, CircuitInputs, PrivateInputs, PublicInputs, WithdrawalProof,
    WithdrawalRequest,
};
pub use ledger::{EventSource, LedgerError, LedgerOracle, TransactionSubmitter, TxStatus};
pub use prove::{CircuitArtifacts, ProveError, Prover};
pub use verify::{verify_withdrawal, VerifyError};
pub use withdraw::WithdrawFlow;

use ark_bn254::Fr;

/// Common field type for all operations
pub type ConstraintF = Fr;
