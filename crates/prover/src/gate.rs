//! Checks that must pass before any proof is generated.

use ark_bn254::Fr;
use mixer_notes::{encoding::fr_to_hex, Address, Deposit};
use thiserror::Error;
use tracing::debug;

use crate::ledger::{LedgerError, LedgerOracle};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GateError {
    #[error("Merkle tree is corrupted: root {root} is unknown to the pool")]
    TreeCorruption { root: String },
    #[error("The note is already spent")]
    DoubleSpend,
    #[error("The deposit is not found in the tree")]
    LeafNotFound,
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

/// Validate a rebuilt tree against the ledger.
///
/// Order is fixed: root, then nullifier, then leaf. Returns the leaf index.
pub fn check_withdrawal<O: LedgerOracle + ?Sized>(
    oracle: &O,
    instance: &Address,
    root: &Fr,
    deposit: &Deposit,
    leaf_index: Option<usize>,
) -> Result<usize, GateError> {
    if !oracle.is_known_root(instance, root)? {
        return Err(GateError::TreeCorruption {
            root: fr_to_hex(root),
        });
    }

    if oracle.is_spent(instance, &deposit.nullifier_hash())? {
        return Err(GateError::DoubleSpend);
    }

    let index = leaf_index.ok_or(GateError::LeafNotFound)?;
    debug!(leaf_index = index, "withdrawal checks passed");
    Ok(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mixer_notes::{CommitmentScheme, PoseidonCompression, SECRET_BYTES};

    struct FixedOracle {
        known_root: bool,
        spent: bool,
        fail: bool,
    }

    impl LedgerOracle for FixedOracle {
        fn is_known_root(&self, _: &Address, _: &Fr) -> Result<bool, LedgerError> {
            if self.fail {
                return Err(LedgerError::Request("connection reset".into()));
            }
            Ok(self.known_root)
        }

        fn is_spent(&self, _: &Address, _: &Fr) -> Result<bool, LedgerError> {
            Ok(self.spent)
        }
    }

    fn deposit() -> Deposit {
        CommitmentScheme::new(PoseidonCompression).derive([3u8; SECRET_BYTES], [4u8; SECRET_BYTES])
    }

    fn check(oracle: &FixedOracle, leaf_index: Option<usize>) -> Result<usize, GateError> {
        check_withdrawal(oracle, &Address::ZERO, &Fr::from(1u64), &deposit(), leaf_index)
    }

    fn oracle(known_root: bool, spent: bool) -> FixedOracle {
        FixedOracle {
            known_root,
            spent,
            fail: false,
        }
    }

    #[test]
    fn test_all_checks_pass() {
        let index = check(&oracle(true, false), Some(7));
        assert_eq!(index, Ok(7));
    }

    #[test]
    fn test_unknown_root_checked_first() {
        // Spent and missing too; the root failure must win.
        let result = check(&oracle(false, true), None);
        assert!(matches!(result, Err(GateError::TreeCorruption { .. })));
    }

    #[test]
    fn test_spent_before_missing_leaf() {
        let result = check(&oracle(true, true), None);
        assert_eq!(result, Err(GateError::DoubleSpend));
    }

    #[test]
    fn test_leaf_not_found() {
        let result = check(&oracle(true, false), None);
        assert_eq!(result, Err(GateError::LeafNotFound));
    }

    #[test]
    fn test_ledger_failure_surfaces() {
        let failing = FixedOracle {
            known_root: true,
            spent: false,
            fail: true,
        };
        let result = check(&failing, Some(0));
        assert!(matches!(result, Err(GateError::Ledger(_))));
    }
}
