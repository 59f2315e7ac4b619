//! Solidity ABI parameter codec.
//!
//! # Responsibilities
//! - Encode static parameters (address, uint256) as single 32-byte words
//! - Encode dynamic parameters (string, bytes, `(address,bytes)[]`) with the
//!   head/tail layout: offset word in the head, length + padded data in the tail
//! - Decode dynamic return data (`bytes[]`, strings) with strict bounds checks
//!
//! Encoders return lowercase hex without `0x`, which is what the node's
//! `parameter` field expects.

use alloy::primitives::{keccak256, U256};

use crate::codec::address::TronAddress;
use crate::codec::{decode_hex, CodecError, CodecResult};

/// Size of one ABI word in bytes.
pub const WORD_LEN: usize = 32;

/// First four bytes of the Keccak-256 hash of a function signature.
pub fn function_selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    let mut out = [0u8; 4];
    out.copy_from_slice(&hash[..4]);
    out
}

/// Hex form of [`function_selector`].
pub fn function_selector_hex(signature: &str) -> String {
    hex::encode(function_selector(signature))
}

fn padded_len(len: usize) -> usize {
    len.div_ceil(WORD_LEN) * WORD_LEN
}

fn push_usize_word(out: &mut Vec<u8>, value: usize) {
    out.extend_from_slice(&U256::from(value).to_be_bytes::<WORD_LEN>());
}

fn push_padded(out: &mut Vec<u8>, data: &[u8]) {
    out.extend_from_slice(data);
    out.resize(out.len() + padded_len(data.len()) - data.len(), 0);
}

/// Encode an address given in either text form.
pub fn encode_address(text: &str) -> CodecResult<String> {
    let address: TronAddress = text.parse().map_err(|e| match e {
        CodecError::InvalidAddressLength(n) => {
            CodecError::InvalidAddress(format!("address must be 21 bytes (41 + 20), got {}", n))
        }
        other => other,
    })?;
    Ok(encode_address_word(&address))
}

/// Encode an already-parsed address: the 20-byte hash, left-padded.
pub fn encode_address_word(address: &TronAddress) -> String {
    let mut word = [0u8; WORD_LEN];
    word[12..].copy_from_slice(&address.evm_bytes());
    hex::encode(word)
}

/// Encode a uint256 as a big-endian, left-padded word.
pub fn encode_uint256(value: U256) -> String {
    hex::encode(value.to_be_bytes::<WORD_LEN>())
}

/// Encode big-endian magnitude bytes. Leading zeros do not count toward the limit.
pub fn encode_uint256_bytes(magnitude: &[u8]) -> CodecResult<String> {
    let lead = magnitude.iter().take_while(|&&b| b == 0).count();
    let significant = &magnitude[lead..];
    if significant.len() > WORD_LEN {
        return Err(CodecError::Overflow);
    }
    let mut word = [0u8; WORD_LEN];
    word[WORD_LEN - significant.len()..].copy_from_slice(significant);
    Ok(hex::encode(word))
}

/// Encode a decimal integer string. Negative values are rejected.
pub fn encode_uint256_decimal(text: &str) -> CodecResult<String> {
    let text = text.trim();
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CodecError::InvalidNumber(text.to_string()));
    }

    let value = U256::from_str_radix(digits, 10).map_err(|_| CodecError::Overflow)?;
    if negative && !value.is_zero() {
        return Err(CodecError::NegativeValue);
    }
    Ok(encode_uint256(value))
}

/// Encode a string as a lone dynamic parameter: offset `0x20`, length, padded UTF-8.
pub fn encode_string(value: &str) -> String {
    encode_bytes(value.as_bytes())
}

/// Encode bytes as a lone dynamic parameter.
pub fn encode_bytes(data: &[u8]) -> String {
    let mut out = Vec::with_capacity(2 * WORD_LEN + padded_len(data.len()));
    push_usize_word(&mut out, WORD_LEN);
    push_usize_word(&mut out, data.len());
    push_padded(&mut out, data);
    hex::encode(out)
}

/// Concatenate encoded fragments into one parameter string.
pub fn concat<I, S>(fragments: I) -> CodecResult<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out = String::new();
    for fragment in fragments {
        let fragment = fragment.as_ref();
        let fragment = fragment.strip_prefix("0x").unwrap_or(fragment);
        if fragment.len() % 2 != 0 {
            return Err(CodecError::OddLength(fragment.len()));
        }
        out.push_str(fragment);
    }
    Ok(out)
}

/// Encode the parameter block for a single `(address,bytes)[]` argument.
///
/// Layout: offset to the array, element count, one offset per element
/// (relative to the first element offset word), then each tuple as
/// `address, 0x40, length, padded data`.
pub fn encode_call_array(calls: &[([u8; 20], &[u8])]) -> Vec<u8> {
    let tuple_len = |data: &[u8]| 3 * WORD_LEN + padded_len(data.len());
    let body: usize = calls.iter().map(|(_, data)| tuple_len(data)).sum();
    let mut out = Vec::with_capacity(2 * WORD_LEN + calls.len() * WORD_LEN + body);

    push_usize_word(&mut out, WORD_LEN);
    push_usize_word(&mut out, calls.len());

    let mut offset = calls.len() * WORD_LEN;
    for (_, data) in calls {
        push_usize_word(&mut out, offset);
        offset += tuple_len(data);
    }

    for (target, data) in calls {
        out.extend_from_slice(&[0u8; 12]);
        out.extend_from_slice(target);
        push_usize_word(&mut out, 2 * WORD_LEN);
        push_usize_word(&mut out, data.len());
        push_padded(&mut out, data);
    }

    out
}

/// Borrow the word starting at `offset`.
pub fn read_word(data: &[u8], offset: usize) -> CodecResult<&[u8]> {
    offset
        .checked_add(WORD_LEN)
        .filter(|&end| end <= data.len())
        .map(|end| &data[offset..end])
        .ok_or_else(|| {
            CodecError::InvalidAbiData(format!(
                "word at {} out of bounds (len {})",
                offset,
                data.len()
            ))
        })
}

/// Read the word at `offset` as a uint256.
pub fn read_uint256(data: &[u8], offset: usize) -> CodecResult<U256> {
    Ok(U256::from_be_slice(read_word(data, offset)?))
}

fn word_as_usize(word: &[u8]) -> Option<usize> {
    let value = U256::from_be_slice(word);
    let limbs = value.as_limbs();
    if limbs[1..].iter().any(|&limb| limb != 0) {
        return None;
    }
    usize::try_from(limbs[0]).ok()
}

/// Read the word at `offset` as an offset or length.
pub fn read_usize(data: &[u8], offset: usize) -> CodecResult<usize> {
    let word = read_word(data, offset)?;
    word_as_usize(word)
        .ok_or_else(|| CodecError::InvalidAbiData(format!("word at {} is not a valid size", offset)))
}

/// Decode a length-prefixed `bytes` body located at `offset`.
pub fn decode_bytes_at(data: &[u8], offset: usize) -> CodecResult<Vec<u8>> {
    let len = read_usize(data, offset)?;
    let start = offset + WORD_LEN;
    let end = start
        .checked_add(len)
        .filter(|&end| end <= data.len())
        .ok_or_else(|| {
            CodecError::InvalidAbiData(format!(
                "bytes of length {} at {} exceed buffer (len {})",
                len,
                offset,
                data.len()
            ))
        })?;
    Ok(data[start..end].to_vec())
}

/// Decode a `bytes[]` body located at `offset`.
///
/// Element offsets are relative to the word that follows the count.
pub fn decode_bytes_array(data: &[u8], offset: usize) -> CodecResult<Vec<Vec<u8>>> {
    let count = read_usize(data, offset)?;
    let heads = offset + WORD_LEN;

    // Reject counts the buffer cannot possibly hold before allocating.
    count
        .checked_mul(WORD_LEN)
        .and_then(|n| n.checked_add(heads))
        .filter(|&end| end <= data.len())
        .ok_or_else(|| {
            CodecError::InvalidAbiData(format!("array of {} elements exceeds buffer", count))
        })?;

    let mut out = Vec::with_capacity(count);
    for i in 0..count {
        let relative = read_usize(data, heads + i * WORD_LEN)?;
        let element = heads.checked_add(relative).ok_or_else(|| {
            CodecError::InvalidAbiData(format!("element {} offset overflows", i))
        })?;
        out.push(decode_bytes_at(data, element)?);
    }
    Ok(out)
}

/// Which decoding path produced a string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringEncoding {
    /// Standard ABI `string`: offset, length, data.
    Abi,
    /// Fixed-size value (e.g. `bytes32`) with trailing zero bytes stripped.
    RawFixed,
}

/// Decode a string return value.
///
/// The ABI path is taken only when the buffer holds at least two words, the
/// first word is an offset with a full length word behind it, and the claimed
/// length fits in the buffer. Anything else is treated as a fixed-size value,
/// which is what tokens returning `bytes32` names produce.
pub fn decode_string_best_effort(data: &[u8]) -> CodecResult<(String, StringEncoding)> {
    if let Some(slice) = abi_string_slice(data) {
        let text = String::from_utf8(slice.to_vec())
            .map_err(|e| CodecError::InvalidAbiData(format!("string is not utf-8: {}", e)))?;
        return Ok((text, StringEncoding::Abi));
    }

    let end = data.len() - data.iter().rev().take_while(|&&b| b == 0).count();
    let text = String::from_utf8(data[..end].to_vec())
        .map_err(|e| CodecError::InvalidAbiData(format!("string is not utf-8: {}", e)))?;
    Ok((text, StringEncoding::RawFixed))
}

fn abi_string_slice(data: &[u8]) -> Option<&[u8]> {
    if data.len() < 2 * WORD_LEN {
        return None;
    }
    let offset = word_as_usize(&data[..WORD_LEN])?;
    let len_end = offset.checked_add(WORD_LEN).filter(|&e| e <= data.len())?;
    let len = word_as_usize(&data[offset..len_end])?;
    let end = len_end.checked_add(len).filter(|&e| e <= data.len())?;
    Some(&data[len_end..end])
}

/// Hex convenience wrapper over [`decode_string_best_effort`].
pub fn decode_string_hex(text: &str) -> CodecResult<String> {
    decode_string_best_effort(&decode_hex(text)?).map(|(s, _)| s)
}

/// Interpret hex return data as a big-endian unsigned integer.
///
/// Any width of hex is accepted, but the value must fit in 256 bits:
/// leading zero bytes are ignored and a larger magnitude is `Overflow`.
pub fn parse_uint256(text: &str) -> CodecResult<U256> {
    uint256_from_bytes(&decode_hex(text)?)
}

/// Big-endian unsigned integer of any length; leading zero bytes are ignored.
/// More than 32 significant bytes is `Overflow`, never a truncated value.
pub fn uint256_from_bytes(bytes: &[u8]) -> CodecResult<U256> {
    let lead = bytes.iter().take_while(|&&b| b == 0).count();
    U256::try_from_be_slice(&bytes[lead..]).ok_or(CodecError::Overflow)
}

/// A single `uint256` return value: a non-empty run of whole words, the
/// first one holding the value. Empty or partial output is `InvalidAbiData`.
pub fn decode_uint256_return(data: &[u8]) -> CodecResult<U256> {
    if data.is_empty() || data.len() % WORD_LEN != 0 {
        return Err(CodecError::InvalidAbiData(format!(
            "uint256 return value of {} bytes",
            data.len()
        )));
    }
    read_uint256(data, 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::{Address, Bytes};
    use alloy::sol_types::SolValue;

    const HEX: &str = "4156a35ceeb03d6866c3610f2e95f65d4c42c6c64f";
    const B58: &str = "THsJpDb3em1rLw9Fdkqp3Hu6GA6hrcAdhd";

    #[test]
    fn test_selectors() {
        assert_eq!(function_selector_hex("transfer(address,uint256)"), "a9059cbb");
        assert_eq!(function_selector_hex("balanceOf(address)"), "70a08231");
        assert_eq!(function_selector_hex("aggregate((address,bytes)[])"), "252dba42");
    }

    #[test]
    fn test_uint256_padding() {
        assert_eq!(encode_uint256(U256::ZERO), "0".repeat(64));
        assert_eq!(encode_uint256(U256::from(255u64)), format!("{}ff", "0".repeat(62)));
        assert_eq!(encode_uint256_decimal("255").unwrap(), format!("{}ff", "0".repeat(62)));
        assert_eq!(encode_uint256_decimal("-1"), Err(CodecError::NegativeValue));
        assert_eq!(encode_uint256_decimal("-0").unwrap(), "0".repeat(64));
        assert!(matches!(encode_uint256_decimal("12a"), Err(CodecError::InvalidNumber(_))));
    }

    #[test]
    fn test_uint256_overflow() {
        let max = U256::MAX.to_string();
        assert_eq!(encode_uint256_decimal(&max).unwrap(), "f".repeat(64));
        let too_big = "115792089237316195423570985008687907853269984665640564039457584007913129639936";
        assert_eq!(encode_uint256_decimal(too_big), Err(CodecError::Overflow));

        let mut wide = vec![0u8];
        wide.extend_from_slice(&[0xff; 32]);
        assert_eq!(encode_uint256_bytes(&wide).unwrap(), "f".repeat(64));
        assert_eq!(encode_uint256_bytes(&[0x01; 33]), Err(CodecError::Overflow));
    }

    #[test]
    fn test_encode_address_both_forms() {
        let expected = format!("{}{}", "0".repeat(24), &HEX[2..]);
        assert_eq!(encode_address(B58).unwrap(), expected);
        assert_eq!(encode_address(HEX).unwrap(), expected);
        assert_eq!(encode_address(&format!("0x{}", HEX)).unwrap(), expected);
        assert!(matches!(encode_address("56a35ceeb03d6866c3610f2e95f65d4c42c6c64f"), Err(CodecError::InvalidAddress(_))));
    }

    #[test]
    fn test_encode_string_layout() {
        let encoded = encode_string("hello");
        let expected = format!(
            "{}20{}05{}{}",
            "0".repeat(62),
            "0".repeat(62),
            "68656c6c6f",
            "0".repeat(54)
        );
        assert_eq!(encoded, expected);
    }

    #[test]
    fn test_string_round_trip_at_padding_boundaries() {
        for len in [0usize, 31, 32, 33] {
            let value = "x".repeat(len);
            let encoded = hex::decode(encode_string(&value)).unwrap();
            assert_eq!(encoded.len() % WORD_LEN, 0);
            let (decoded, path) = decode_string_best_effort(&encoded).unwrap();
            assert_eq!(decoded, value, "len {}", len);
            assert_eq!(path, StringEncoding::Abi);
        }
    }

    #[test]
    fn test_string_fallback_for_fixed_bytes() {
        let mut word = [0u8; 32];
        word[..4].copy_from_slice(b"USDT");
        let (decoded, path) = decode_string_best_effort(&word).unwrap();
        assert_eq!(decoded, "USDT");
        assert_eq!(path, StringEncoding::RawFixed);

        // Two words whose first word is not a plausible offset.
        let mut two = [0u8; 64];
        two[..3].copy_from_slice(b"WTR");
        two[31] = b'!';
        let (decoded, path) = decode_string_best_effort(&two).unwrap();
        assert_eq!(path, StringEncoding::RawFixed);
        assert!(decoded.starts_with("WTR"));
    }

    #[test]
    fn test_concat() {
        let a = encode_uint256(U256::from(1u64));
        let joined = concat([a.as_str(), "0xabcd"]).unwrap();
        assert_eq!(joined, format!("{}abcd", a));
        assert_eq!(concat(["abc"]), Err(CodecError::OddLength(3)));
    }

    #[test]
    fn test_call_array_matches_reference_encoder() {
        let target: TronAddress = HEX.parse().unwrap();
        let data_a = vec![0x70, 0xa0, 0x82, 0x31, 0x01];
        let data_b: Vec<u8> = (0u8..40).collect();

        let ours = encode_call_array(&[
            (target.evm_bytes(), data_a.as_slice()),
            (target.evm_bytes(), data_b.as_slice()),
        ]);

        let reference: Vec<(Address, Bytes)> = vec![
            (target.evm_address(), Bytes::from(data_a.clone())),
            (target.evm_address(), Bytes::from(data_b.clone())),
        ];
        assert_eq!(ours, (reference,).abi_encode_params());
    }

    #[test]
    fn test_decode_bytes_array_bounds() {
        let reference: Vec<Bytes> = vec![Bytes::from(vec![1u8, 2, 3]), Bytes::from(vec![0u8; 40])];
        let encoded = (reference,).abi_encode_params();
        let offset = read_usize(&encoded, 0).unwrap();
        let decoded = decode_bytes_array(&encoded, offset).unwrap();
        assert_eq!(decoded, vec![vec![1, 2, 3], vec![0; 40]]);

        let truncated = &encoded[..encoded.len() - 32];
        assert!(matches!(decode_bytes_array(truncated, offset), Err(CodecError::InvalidAbiData(_))));

        let mut huge_count = encoded.clone();
        huge_count[offset..offset + 32].copy_from_slice(&[0xff; 32]);
        assert!(matches!(decode_bytes_array(&huge_count, offset), Err(CodecError::InvalidAbiData(_))));
    }

    #[test]
    fn test_parse_uint256() {
        assert_eq!(parse_uint256(&encode_uint256(U256::from(1_000_000u64))).unwrap(), U256::from(1_000_000u64));
        assert_eq!(parse_uint256("0x00ff").unwrap(), U256::from(255u64));
        assert_eq!(parse_uint256("").unwrap(), U256::ZERO);
        assert!(matches!(parse_uint256("xyz"), Err(CodecError::InvalidHex(_))));
    }

    #[test]
    fn test_decode_uint256_return() {
        let word = U256::from(42u64).to_be_bytes::<32>();
        assert_eq!(decode_uint256_return(&word).unwrap(), U256::from(42u64));
        assert_eq!(decode_uint256_return(&[word, [0u8; 32]].concat()).unwrap(), U256::from(42u64));
        assert!(matches!(decode_uint256_return(&[]), Err(CodecError::InvalidAbiData(_))));
        assert!(matches!(decode_uint256_return(&[0x05]), Err(CodecError::InvalidAbiData(_))));
        assert!(matches!(decode_uint256_return(&word[..31]), Err(CodecError::InvalidAbiData(_))));
    }

    #[test]
    fn test_parse_uint256_width() {
        // Wider than a word is fine while the magnitude fits.
        let padded = format!("{}{}", "00".repeat(8), "ff".repeat(32));
        assert_eq!(parse_uint256(&padded).unwrap(), U256::MAX);
        assert_eq!(parse_uint256(&format!("01{}", "00".repeat(32))), Err(CodecError::Overflow));
    }
}
