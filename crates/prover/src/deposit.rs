//! Deposit flow: fresh secrets, a note, and the transaction that funds it.

use ark_std::rand::{CryptoRng, RngCore};
use mixer_notes::units::parse_units;
use mixer_notes::{CommitmentScheme, CompressionFunction, Deposit, NoteCodec};
use num_bigint::BigUint;
use tracing::info;

use crate::context::FlowContext;
use crate::error::WithdrawError;
use crate::ledger::{TransactionSubmitter, TxStatus};

/// A new deposit and the note that redeems it.
#[derive(Clone, Debug)]
pub struct DepositTicket {
    pub deposit: Deposit,
    pub note: String,
    pub commitment: String,
    /// Amount in base units
    pub value: BigUint,
}

pub fn create_deposit<H, R>(
    ctx: &FlowContext,
    codec: &NoteCodec<H>,
    rng: &mut R,
) -> Result<DepositTicket, WithdrawError>
where
    H: CompressionFunction,
    R: RngCore + CryptoRng,
{
    let value = parse_units(&ctx.amount, ctx.deployment.decimals)?;
    let scheme: &CommitmentScheme<H> = codec.scheme();
    let deposit = scheme.generate(rng);
    let note = codec.encode(&deposit, &ctx.currency, &ctx.amount, ctx.network_id)?;

    info!(
        currency = %ctx.currency,
        amount = %ctx.amount,
        network_id = ctx.network_id,
        "created deposit"
    );

    Ok(DepositTicket {
        commitment: deposit.commitment_hex(),
        deposit,
        note,
        value,
    })
}

/// Send the deposit transaction for `ticket`.
pub fn submit_deposit(
    ctx: &FlowContext,
    ticket: &DepositTicket,
    submitter: &dyn TransactionSubmitter,
) -> Result<TxStatus, WithdrawError> {
    let deployment = &ctx.deployment;
    let status = submitter.submit_deposit(
        &deployment.proxy,
        &deployment.instance,
        &ticket.deposit.commitment(),
        &ticket.value,
    )?;
    info!(?status, commitment = %ticket.commitment, "submitted deposit");
    Ok(status)
}
