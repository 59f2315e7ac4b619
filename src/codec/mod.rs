//! Pure encoding subsystem.
//!
//! # Data Flow
//! ```text
//! Address text (Base58Check or hex)
//!     → base58.rs (checksum-verified base conversion)
//!     → address.rs (21-byte TronAddress, prefix 0x41)
//!     → abi.rs (32-byte words, head/tail layout for dynamic params)
//!     → hex parameter string for a contract call
//! ```
//!
//! # Design Decisions
//! - Everything here is synchronous and allocation-bounded; no I/O
//! - Decoders fail fast and never return partial output
//! - A checksum mismatch is always a hard error

pub mod abi;
pub mod address;
pub mod base58;

use thiserror::Error;

pub use address::TronAddress;

/// Errors produced by the address and ABI codecs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// Nothing to decode.
    #[error("empty input")]
    EmptyInput,

    /// Character outside the base58 alphabet.
    #[error("invalid base58 character {character:?} at position {position}")]
    InvalidCharacter { character: char, position: usize },

    /// Decoded data cannot hold a payload plus checksum.
    #[error("decoded data too short: {0} bytes")]
    TooShort(usize),

    /// Base58Check checksum did not match the payload.
    #[error("invalid base58 checksum")]
    InvalidChecksum,

    /// Decoded address payload is not 21 bytes.
    #[error("invalid address length: expected 21 bytes, got {0}")]
    InvalidAddressLength(usize),

    /// Address does not carry the mainnet network prefix.
    #[error("invalid network prefix 0x{0:02x}")]
    InvalidPrefix(u8),

    /// Address could not be normalized for ABI encoding.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// Malformed hexadecimal input.
    #[error("invalid hex: {0}")]
    InvalidHex(String),

    /// Unsigned integer parameter was negative.
    #[error("uint256 must be non-negative")]
    NegativeValue,

    /// Value does not fit in 32 bytes.
    #[error("value exceeds 32 bytes")]
    Overflow,

    /// Hex fragment with an odd number of digits.
    #[error("param hex must have even length, got {0} digits")]
    OddLength(usize),

    /// Text is not a decimal integer.
    #[error("invalid number: {0}")]
    InvalidNumber(String),

    /// ABI data whose offsets or lengths fall outside the buffer.
    #[error("invalid ABI data: {0}")]
    InvalidAbiData(String),
}

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Decode a hex string, tolerating surrounding whitespace and a `0x`/`0X` prefix.
pub fn decode_hex(text: &str) -> CodecResult<Vec<u8>> {
    let text = text.trim();
    let text = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text);
    hex::decode(text).map_err(|e| CodecError::InvalidHex(e.to_string()))
}
