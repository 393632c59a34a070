//! Fixed-width hex encodings for field elements and addresses.
//!
//! Ledger-facing values are big-endian and `0x`-prefixed. Circuit inputs use
//! decimal strings.

use std::fmt;
use std::str::FromStr;

use ark_bn254::Fr;
use ark_ff::{BigInteger, PrimeField};
use num_bigint::BigUint;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Width of a hash / field value on the wire.
pub const FIELD_BYTES: usize = 32;

/// Width of an address-shaped value on the wire.
pub const ADDRESS_BYTES: usize = 20;

#[derive(Error, Debug, PartialEq)]
pub enum EncodingError {
    #[error("Invalid hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),
    #[error("Expected {expected} bytes, got {actual}")]
    Length { expected: usize, actual: usize },
    #[error("Value is not a canonical field element")]
    NonCanonical,
}

/// Left-pad `bytes` to `width` bytes and render as `0x`-prefixed hex.
///
/// `bytes` must not be longer than `width`.
pub fn fixed_hex(bytes: &[u8], width: usize) -> String {
    debug_assert!(bytes.len() <= width);
    format!("0x{:0>pad$}", hex::encode(bytes), pad = width * 2)
}

/// Big-endian 32-byte representation of a field element.
pub fn fr_to_be_bytes(value: &Fr) -> [u8; FIELD_BYTES] {
    let bytes = value.into_bigint().to_bytes_be();
    let mut out = [0u8; FIELD_BYTES];
    out[FIELD_BYTES - bytes.len()..].copy_from_slice(&bytes);
    out
}

/// `0x` + 64 hex chars.
pub fn fr_to_hex(value: &Fr) -> String {
    fixed_hex(&fr_to_be_bytes(value), FIELD_BYTES)
}

/// Parse a big-endian hex field element (at most 32 bytes, `0x` optional).
///
/// Values at or above the modulus are rejected rather than reduced.
pub fn fr_from_hex(s: &str) -> Result<Fr, EncodingError> {
    let digits = s.strip_prefix("0x").unwrap_or(s);
    let digits = if digits.len() % 2 == 1 {
        format!("0{}", digits)
    } else {
        digits.to_string()
    };
    let bytes = hex::decode(digits)?;
    if bytes.len() > FIELD_BYTES {
        return Err(EncodingError::Length {
            expected: FIELD_BYTES,
            actual: bytes.len(),
        });
    }

    let mut padded = [0u8; FIELD_BYTES];
    padded[FIELD_BYTES - bytes.len()..].copy_from_slice(&bytes);

    let value = Fr::from_be_bytes_mod_order(&padded);
    if fr_to_be_bytes(&value) != padded {
        return Err(EncodingError::NonCanonical);
    }
    Ok(value)
}

/// Decimal string of the canonical integer representative.
pub fn fr_to_decimal(value: &Fr) -> String {
    BigUint::from_bytes_be(&fr_to_be_bytes(value)).to_str_radix(10)
}

/// Serde adapter storing a field element as `0x` hex.
pub mod fr_hex {
    use super::*;

    pub fn serialize<S: Serializer>(value: &Fr, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&fr_to_hex(value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Fr, D::Error> {
        let s = String::deserialize(deserializer)?;
        fr_from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// A 20-byte account address.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Address([u8; ADDRESS_BYTES]);

impl Address {
    pub const ZERO: Address = Address([0u8; ADDRESS_BYTES]);

    pub fn from_bytes(bytes: [u8; ADDRESS_BYTES]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; ADDRESS_BYTES] {
        &self.0
    }

    /// The address as a circuit input (big-endian integer).
    pub fn to_field(&self) -> Fr {
        Fr::from_be_bytes_mod_order(&self.0)
    }
}

impl FromStr for Address {
    type Err = EncodingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s.strip_prefix("0x").unwrap_or(s))?;
        let array: [u8; ADDRESS_BYTES] =
            bytes
                .as_slice()
                .try_into()
                .map_err(|_| EncodingError::Length {
                    expected: ADDRESS_BYTES,
                    actual: bytes.len(),
                })?;
        Ok(Self(array))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&fixed_hex(&self.0, ADDRESS_BYTES))
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
