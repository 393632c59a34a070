//! Withdrawal flow: rebuild the deposit tree, check it, prove, submit.

use std::time::Instant;

use mixer_notes::{
    fr_to_hex, ordered_commitments, CompressionFunction, Deposit, EventCache, MerkleProof,
    MerkleTree, PoseidonCompression,
};
use tracing::{debug, info};

use crate::context::FlowContext;
use crate::error::WithdrawError;
use crate::gate::check_withdrawal;
use crate::inputs::{build_inputs, format_proof, WithdrawalProof, WithdrawalRequest};
use crate::ledger::{EventSource, LedgerOracle, TransactionSubmitter, TxStatus};
use crate::prove::{CircuitArtifacts, Prover};

/// One withdrawal attempt against a single pool instance.
pub struct WithdrawFlow<'a, H = PoseidonCompression> {
    ctx: &'a FlowContext,
    cache: &'a EventCache,
    events: &'a dyn EventSource,
    oracle: &'a dyn LedgerOracle,
    hasher: H,
}

impl<'a> WithdrawFlow<'a, PoseidonCompression> {
    pub fn new(
        ctx: &'a FlowContext,
        cache: &'a EventCache,
        events: &'a dyn EventSource,
        oracle: &'a dyn LedgerOracle,
    ) -> Self {
        Self::with_hasher(ctx, cache, events, oracle, PoseidonCompression)
    }
}

impl<'a, H: CompressionFunction + Clone> WithdrawFlow<'a, H> {
    pub fn with_hasher(
        ctx: &'a FlowContext,
        cache: &'a EventCache,
        events: &'a dyn EventSource,
        oracle: &'a dyn LedgerOracle,
        hasher: H,
    ) -> Self {
        Self {
            ctx,
            cache,
            events,
            oracle,
            hasher,
        }
    }

    pub fn context(&self) -> &FlowContext {
        self.ctx
    }

    /// Rebuild the tree from cached and fresh events and return the path
    /// for `deposit`.
    ///
    /// The merged snapshot is written back only after every ledger check
    /// has passed.
    pub fn generate_merkle_proof(&self, deposit: &Deposit) -> Result<MerkleProof, WithdrawError> {
        let ctx = self.ctx;
        let instance = &ctx.deployment.instance;

        let snapshot = self.cache.load(ctx.network_id, &ctx.currency, &ctx.amount)?;
        let from_block = snapshot.last_block;
        let fresh = self.events.deposit_events(instance, from_block)?;
        debug!(
            cached = snapshot.len(),
            fresh = fresh.len(),
            from_block,
            "fetched deposit events"
        );

        let merged = EventCache::merge(snapshot, fresh);
        let leaves = ordered_commitments(&merged.events)?;
        let tree = MerkleTree::build(ctx.tree_height, leaves, self.hasher.clone())?;

        let leaf_index = tree.find_leaf_index(&deposit.commitment());
        let root = tree.root();
        let leaf_index = check_withdrawal(self.oracle, instance, &root, deposit, leaf_index)?;
        let path = tree.path(leaf_index)?;

        // The fetch re-reads the cached last block; keep the file free of those repeats.
        self.cache.persist(
            ctx.network_id,
            &ctx.currency,
            &ctx.amount,
            &merged.without_duplicates(),
        )?;

        info!(
            leaf_index,
            leaves = tree.len(),
            root = %fr_to_hex(&root),
            "rebuilt deposit tree"
        );
        Ok(path)
    }

    /// Merkle path, circuit inputs and a formatted proof for `deposit`.
    pub fn generate_proof(
        &self,
        deposit: &Deposit,
        request: &WithdrawalRequest,
        prover: &dyn Prover,
        artifacts: &CircuitArtifacts,
    ) -> Result<WithdrawalProof, WithdrawError> {
        if self.ctx.is_native() && request.refund != 0 {
            return Err(WithdrawError::RefundNotAllowed {
                currency: self.ctx.currency.clone(),
            });
        }

        let path = self.generate_merkle_proof(deposit)?;
        let inputs = build_inputs(deposit, &path, request);

        info!("Generating SNARK proof");
        let start = Instant::now();
        let proof = prover.prove(artifacts, &inputs)?;
        info!(elapsed_ms = start.elapsed().as_millis() as u64, "Generated SNARK proof");

        Ok(WithdrawalProof {
            proof: format_proof(&proof),
            args: inputs.public.verifier_args(),
        })
    }

    /// Prove and hand the withdrawal to `submitter`.
    pub fn withdraw(
        &self,
        deposit: &Deposit,
        request: &WithdrawalRequest,
        prover: &dyn Prover,
        artifacts: &CircuitArtifacts,
        submitter: &dyn TransactionSubmitter,
    ) -> Result<TxStatus, WithdrawError> {
        let proof = self.generate_proof(deposit, request, prover, artifacts)?;
        let deployment = &self.ctx.deployment;

        let status =
            submitter.submit_withdrawal(&deployment.proxy, &deployment.instance, &proof)?;
        info!(?status, recipient = %request.recipient, "submitted withdrawal");
        Ok(status)
    }
}
