//! Base58Check codec.
//!
//! # Responsibilities
//! - Convert between big-endian bytes and base-58 text
//! - Append and verify the 4-byte double-SHA-256 checksum
//!
//! # Design Decisions
//! - Base conversion works on a plain byte buffer (multiply-add to decode,
//!   repeated division to encode), so payload size is not limited to a
//!   machine integer
//! - Leading zero bytes map 1:1 to leading `'1'` symbols in both directions
//! - The alphabet index is a compile-time table

use sha2::{Digest, Sha256};

use crate::codec::{CodecError, CodecResult};

/// The Bitcoin base58 alphabet, shared by TRON addresses.
pub const ALPHABET: &[u8; 58] = b"123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

/// Length of the Base58Check checksum suffix.
pub const CHECKSUM_LEN: usize = 4;

const INDEXES: [i8; 128] = build_indexes();

const fn build_indexes() -> [i8; 128] {
    let mut table = [-1i8; 128];
    let mut i = 0;
    while i < ALPHABET.len() {
        table[ALPHABET[i] as usize] = i as i8;
        i += 1;
    }
    table
}

fn digit_value(c: char) -> Option<u8> {
    if !c.is_ascii() {
        return None;
    }
    match INDEXES[c as usize] {
        -1 => None,
        v => Some(v as u8),
    }
}

/// First four bytes of SHA-256(SHA-256(payload)).
pub fn checksum(payload: &[u8]) -> [u8; CHECKSUM_LEN] {
    let first = Sha256::digest(payload);
    let second = Sha256::digest(first);
    let mut out = [0u8; CHECKSUM_LEN];
    out.copy_from_slice(&second[..CHECKSUM_LEN]);
    out
}

/// Encode raw bytes as base58 text (no checksum).
pub fn encode(input: &[u8]) -> String {
    let zeros = input.iter().take_while(|&&b| b == 0).count();

    let mut number = input[zeros..].to_vec();
    let mut digits = Vec::with_capacity(input.len() * 138 / 100 + 1);

    while !number.is_empty() {
        let rem = divmod58(&mut number);
        digits.push(ALPHABET[rem as usize]);
        let lead = number.iter().take_while(|&&b| b == 0).count();
        number.drain(..lead);
    }

    digits.extend(std::iter::repeat(ALPHABET[0]).take(zeros));
    digits.reverse();

    // Every byte pushed comes from ALPHABET, which is ASCII.
    digits.into_iter().map(char::from).collect()
}

/// Decode base58 text into raw bytes (no checksum handling).
pub fn decode(text: &str) -> CodecResult<Vec<u8>> {
    let text = text.trim();
    if text.is_empty() {
        return Err(CodecError::EmptyInput);
    }

    let zeros = text.chars().take_while(|&c| c == '1').count();

    let mut number: Vec<u8> = Vec::with_capacity(text.len());
    for (position, character) in text.chars().enumerate() {
        let value = digit_value(character).ok_or(CodecError::InvalidCharacter {
            character,
            position,
        })?;
        mul_add(&mut number, 58, value);
    }

    let lead = number.iter().take_while(|&&b| b == 0).count();
    let mut out = vec![0u8; zeros];
    out.extend_from_slice(&number[lead..]);
    Ok(out)
}

/// Append the checksum to `payload` and encode.
pub fn encode_check(payload: &[u8]) -> String {
    let mut full = Vec::with_capacity(payload.len() + CHECKSUM_LEN);
    full.extend_from_slice(payload);
    full.extend_from_slice(&checksum(payload));
    encode(&full)
}

/// Decode Base58Check text, verify the trailing checksum and return the payload.
pub fn decode_check(text: &str) -> CodecResult<Vec<u8>> {
    let mut raw = decode(text)?;
    if raw.len() < CHECKSUM_LEN + 1 {
        return Err(CodecError::TooShort(raw.len()));
    }

    let split = raw.len() - CHECKSUM_LEN;
    if raw[split..] != checksum(&raw[..split]) {
        return Err(CodecError::InvalidChecksum);
    }

    raw.truncate(split);
    Ok(raw)
}

/// Multiply the big-endian number in `number` by `base` and add `add`.
fn mul_add(number: &mut Vec<u8>, base: u32, add: u8) {
    let mut carry = add as u32;
    for byte in number.iter_mut().rev() {
        let v = (*byte as u32) * base + carry;
        *byte = (v & 0xff) as u8;
        carry = v >> 8;
    }
    while carry > 0 {
        number.insert(0, (carry & 0xff) as u8);
        carry >>= 8;
    }
}

/// Divide the big-endian number in place by 58, returning the remainder.
fn divmod58(number: &mut [u8]) -> u8 {
    let mut rem = 0u32;
    for byte in number.iter_mut() {
        let n = rem * 256 + *byte as u32;
        *byte = (n / 58) as u8;
        rem = n % 58;
    }
    rem as u8
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_check_round_trip(payload in any::<[u8; 21]>()) {
            let text = encode_check(&payload);
            prop_assert_eq!(decode_check(&text).unwrap(), payload.to_vec());
        }

        #[test]
        fn prop_canonical_text_round_trip(payload in any::<[u8; 21]>()) {
            let text = encode_check(&payload);
            let decoded = decode_check(&text).unwrap();
            prop_assert_eq!(encode_check(&decoded), text);
        }

        #[test]
        fn prop_raw_text_round_trip(text in "[1-9A-HJ-NP-Za-km-z]{1,48}") {
            prop_assert_eq!(encode(&decode(&text).unwrap()), text);
        }

        #[test]
        fn prop_checksum_flip_rejected(
            payload in any::<[u8; 21]>(),
            position in 0usize..CHECKSUM_LEN,
            mask in 1u8..=u8::MAX,
        ) {
            let mut full = payload.to_vec();
            full.extend_from_slice(&checksum(&payload));
            full[payload.len() + position] ^= mask;
            prop_assert_eq!(decode_check(&encode(&full)), Err(CodecError::InvalidChecksum));
        }
    }
}
