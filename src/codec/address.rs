//! TRON account addresses.
//!
//! An address is 21 bytes: the `0x41` network prefix followed by the same
//! 20-byte hash an EVM chain would use. It has two textual forms, Base58Check
//! (`T...`, 34 chars) and hex (42 chars, `0x` optional on input).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::codec::base58;
use crate::codec::{decode_hex, CodecError, CodecResult};

/// Mainnet address prefix byte.
pub const ADDRESS_PREFIX: u8 = 0x41;

/// Payload length: prefix + 20-byte hash.
pub const ADDRESS_LEN: usize = 21;

/// A validated 21-byte TRON address.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TronAddress([u8; ADDRESS_LEN]);

impl TronAddress {
    /// Build from exactly 21 raw bytes. The prefix byte is not checked.
    pub fn from_bytes(bytes: &[u8]) -> CodecResult<Self> {
        let raw: [u8; ADDRESS_LEN] = bytes
            .try_into()
            .map_err(|_| CodecError::InvalidAddressLength(bytes.len()))?;
        Ok(Self(raw))
    }

    /// Build from the 20-byte EVM hash, adding the mainnet prefix.
    pub fn from_evm(hash: [u8; 20]) -> Self {
        let mut raw = [0u8; ADDRESS_LEN];
        raw[0] = ADDRESS_PREFIX;
        raw[1..].copy_from_slice(&hash);
        Self(raw)
    }

    /// Decode a Base58Check address, verifying its checksum.
    pub fn from_base58(text: &str) -> CodecResult<Self> {
        let payload = base58::decode_check(text)?;
        Self::from_bytes(&payload)
    }

    /// Decode a 21-byte hex address (`41...`, optional `0x`).
    pub fn from_hex(text: &str) -> CodecResult<Self> {
        Self::from_bytes(&decode_hex(text)?)
    }

    /// Base58Check text form.
    pub fn to_base58(&self) -> String {
        base58::encode_check(&self.0)
    }

    /// 42-char lowercase hex form, without `0x`.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Raw 21-byte payload.
    pub fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }

    /// Network prefix byte.
    pub fn prefix(&self) -> u8 {
        self.0[0]
    }

    /// The 20-byte hash without the network prefix.
    pub fn evm_bytes(&self) -> [u8; 20] {
        let mut out = [0u8; 20];
        out.copy_from_slice(&self.0[1..]);
        out
    }

    /// The 20-byte hash as an alloy address.
    pub fn evm_address(&self) -> alloy::primitives::Address {
        alloy::primitives::Address::from(self.evm_bytes())
    }
}

impl From<alloy::primitives::Address> for TronAddress {
    fn from(address: alloy::primitives::Address) -> Self {
        Self::from_evm(address.into_array())
    }
}

impl FromStr for TronAddress {
    type Err = CodecError;

    /// A leading `T` selects Base58Check, anything else is parsed as hex.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(CodecError::EmptyInput);
        }
        if s.starts_with('T') {
            Self::from_base58(s)
        } else {
            Self::from_hex(s)
        }
    }
}

impl fmt::Display for TronAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_base58())
    }
}

impl fmt::Debug for TronAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TronAddress({})", self.to_base58())
    }
}

impl Serialize for TronAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_base58())
    }
}

impl<'de> Deserialize<'de> for TronAddress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

/// Strict validation of a user-supplied Base58Check address: 25 decoded
/// bytes, mainnet prefix, matching checksum.
pub fn validate_base58(text: &str) -> CodecResult<()> {
    let raw = base58::decode(text)?;
    if raw.len() != ADDRESS_LEN + base58::CHECKSUM_LEN {
        return Err(CodecError::InvalidAddressLength(
            raw.len().saturating_sub(base58::CHECKSUM_LEN),
        ));
    }
    if raw[0] != ADDRESS_PREFIX {
        return Err(CodecError::InvalidPrefix(raw[0]));
    }
    if raw[ADDRESS_LEN..] != base58::checksum(&raw[..ADDRESS_LEN]) {
        return Err(CodecError::InvalidChecksum);
    }
    Ok(())
}

/// Convert a Base58Check address to its 42-char hex form.
pub fn base58_to_hex(text: &str) -> CodecResult<String> {
    TronAddress::from_base58(text).map(|a| a.to_hex())
}

/// Convert a 21-byte hex address to its Base58Check form.
pub fn hex_to_base58(text: &str) -> CodecResult<String> {
    TronAddress::from_hex(text).map(|a| a.to_base58())
}
