//! Interfaces to the ledger the pool lives on.
//!
//! Transport, signing and confirmation tracking live behind these traits;
//! the flows only ever call them synchronously and never retry.

use ark_bn254::Fr;
use mixer_notes::{Address, DepositEvent};
use num_bigint::BigUint;
use thiserror::Error;

use crate::inputs::WithdrawalProof;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Ledger request failed: {0}")]
    Request(String),
}

/// Outcome reported by a [`TransactionSubmitter`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TxStatus {
    Pending { tx_hash: String },
    Confirmed { tx_hash: String, block_number: u64 },
    Failed { reason: String },
}

/// Deposit event log of a pool instance.
pub trait EventSource {
    /// Events emitted from `from_block` (inclusive) up to the latest block, in any order.
    fn deposit_events(
        &self,
        instance: &Address,
        from_block: u64,
    ) -> Result<Vec<DepositEvent>, LedgerError>;
}

/// Read-only view of pool contract state.
pub trait LedgerOracle {
    /// Whether `root` is among the roots the pool still accepts.
    fn is_known_root(&self, instance: &Address, root: &Fr) -> Result<bool, LedgerError>;

    fn is_spent(&self, instance: &Address, nullifier_hash: &Fr) -> Result<bool, LedgerError>;
}

pub trait TransactionSubmitter {
    /// Send `value` base units with `commitment` through the proxy.
    fn submit_deposit(
        &self,
        proxy: &Address,
        instance: &Address,
        commitment: &Fr,
        value: &BigUint,
    ) -> Result<TxStatus, LedgerError>;

    fn submit_withdrawal(
        &self,
        proxy: &Address,
        instance: &Address,
        proof: &WithdrawalProof,
    ) -> Result<TxStatus, LedgerError>;
}
