//! Terminal errors of the deposit and withdrawal flows.

use mixer_notes::{CacheError, EventError, MerkleError, NoteError, UnitsError};
use thiserror::Error;

use crate::config::ConfigError;
use crate::gate::GateError;
use crate::ledger::LedgerError;
use crate::prove::ProveError;
use crate::verify::VerifyError;

/// Any failure that aborts a flow. Nothing is persisted once one is raised.
#[derive(Error, Debug)]
pub enum WithdrawError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Note(#[from] NoteError),
    #[error(transparent)]
    Units(#[from] UnitsError),
    #[error(transparent)]
    Cache(#[from] CacheError),
    #[error(transparent)]
    Events(#[from] EventError),
    #[error(transparent)]
    Merkle(#[from] MerkleError),
    #[error(transparent)]
    Gate(#[from] GateError),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error(transparent)]
    Prove(#[from] ProveError),
    #[error(transparent)]
    Verify(#[from] VerifyError),
    #[error("The note is for network {note}, but the active network is {active}")]
    NetworkMismatch { note: u64, active: u64 },
    #[error("A refund is not allowed for {currency} withdrawals")]
    RefundNotAllowed { currency: String },
}
