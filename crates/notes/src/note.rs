//! Bearer note string codec.
//!
//! Grammar: `<tag>-<currency>-<amount>-<networkId>-0x<124 hex chars>`, where
//! the hex payload is the 62-byte deposit preimage.

use thiserror::Error;

use crate::deposit::{CommitmentScheme, Deposit, PREIMAGE_BYTES};
use crate::hasher::{CompressionFunction, PoseidonCompression};

/// Tag used when no brand is configured.
pub const DEFAULT_TAG: &str = "interstellar";

const PAYLOAD_HEX_CHARS: usize = PREIMAGE_BYTES * 2;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NoteError {
    #[error("The note has invalid format: {0}")]
    Format(String),
}

fn format_err(reason: impl Into<String>) -> NoteError {
    NoteError::Format(reason.into())
}

/// A decoded note.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Note {
    pub currency: String,
    pub amount: String,
    pub network_id: u64,
    pub deposit: Deposit,
}

/// Encodes and decodes notes for one scheme tag.
#[derive(Clone, Debug)]
pub struct NoteCodec<H = PoseidonCompression> {
    tag: String,
    scheme: CommitmentScheme<H>,
}

impl NoteCodec<PoseidonCompression> {
    /// Codec for `tag` using the Poseidon commitment scheme.
    pub fn new(tag: impl Into<String>) -> Self {
        Self::with_scheme(tag, CommitmentScheme::new(PoseidonCompression))
    }
}

impl<H: CompressionFunction> NoteCodec<H> {
    pub fn with_scheme(tag: impl Into<String>, scheme: CommitmentScheme<H>) -> Self {
        Self {
            tag: tag.into(),
            scheme,
        }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn scheme(&self) -> &CommitmentScheme<H> {
        &self.scheme
    }

    /// Render a note. Fails if `currency` or `amount` would not parse back.
    pub fn encode(
        &self,
        deposit: &Deposit,
        currency: &str,
        amount: &str,
        network_id: u64,
    ) -> Result<String, NoteError> {
        validate_currency(currency)?;
        validate_amount(amount)?;

        Ok(format!(
            "{}-{}-{}-{}-0x{}",
            self.tag,
            currency,
            amount,
            network_id,
            hex::encode(deposit.preimage())
        ))
    }

    /// Parse a note and re-derive its deposit. No partial recovery.
    pub fn decode(&self, note: &str) -> Result<Note, NoteError> {
        let rest = note
            .strip_prefix(self.tag.as_str())
            .and_then(|rest| rest.strip_prefix('-'))
            .ok_or_else(|| format_err(format!("expected tag `{}`", self.tag)))?;

        let fields: Vec<&str> = rest.split('-').collect();
        let [currency, amount, network_id, payload] = fields.as_slice() else {
            return Err(format_err(format!(
                "expected 4 fields after the tag, found {}",
                fields.len()
            )));
        };

        validate_currency(currency)?;
        validate_amount(amount)?;
        let network_id = parse_network_id(network_id)?;
        let preimage = parse_payload(payload)?;

        Ok(Note {
            currency: currency.to_string(),
            amount: amount.to_string(),
            network_id,
            deposit: self.scheme.derive_from_preimage(&preimage),
        })
    }
}

fn validate_currency(currency: &str) -> Result<(), NoteError> {
    if currency.is_empty() || !currency.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(format_err(format!("invalid currency `{}`", currency)));
    }
    Ok(())
}

/// Digits with at most one `.`; either side of the dot may be empty.
fn validate_amount(amount: &str) -> Result<(), NoteError> {
    let digits = amount.bytes().filter(u8::is_ascii_digit).count();
    let dots = amount.bytes().filter(|&b| b == b'.').count();
    if digits == 0 || dots > 1 || digits + dots != amount.len() {
        return Err(format_err(format!("invalid amount `{}`", amount)));
    }
    Ok(())
}

fn parse_network_id(network_id: &str) -> Result<u64, NoteError> {
    if network_id.is_empty() || !network_id.bytes().all(|b| b.is_ascii_digit()) {
        return Err(format_err(format!("invalid network id `{}`", network_id)));
    }
    network_id
        .parse()
        .map_err(|_| format_err(format!("network id `{}` out of range", network_id)))
}

fn parse_payload(payload: &str) -> Result<[u8; PREIMAGE_BYTES], NoteError> {
    let digits = payload
        .strip_prefix("0x")
        .ok_or_else(|| format_err("payload must start with 0x"))?;
    if digits.len() != PAYLOAD_HEX_CHARS {
        return Err(format_err(format!(
            "payload must be {} hex chars, found {}",
            PAYLOAD_HEX_CHARS,
            digits.len()
        )));
    }

    let mut preimage = [0u8; PREIMAGE_BYTES];
    hex::decode_to_slice(digits, &mut preimage)
        .map_err(|e| format_err(format!("payload is not hex: {}", e)))?;
    Ok(preimage)
}
