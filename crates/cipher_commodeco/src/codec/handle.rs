//! # Ciphertext Handle Wire Format
//!
//! The contract takes every ciphertext handle as a `bytes32`. The SDK hands
//! them back in whatever shape its bindings produce, so everything goes
//! through one conversion:
//!
//! ```text
//! ┌──────────────────────┐      ┌──────────────────────────────────────┐
//! │ bytes / number array │ ───▶ │ 0x + 64 hex chars                    │
//! │ "0x…" / "…" string   │      │ short → right-padded with zeros      │
//! └──────────────────────┘      │ long  → truncated to the first 32 B  │
//!                               └──────────────────────────────────────┘
//! ```
//!
//! The padding and truncation are kept exactly as deployed contracts expect
//! them. A handle format of a different width would be silently mangled
//! here.

use alloy_primitives::{hex, Bytes, B256};
use thiserror::Error;

/// Hex characters in a wire handle (32 bytes)
pub const HANDLE_HEX_LEN: usize = 64;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum HandleCodecError {
    #[error("handle string contains non-hex characters: {0}")]
    InvalidHex(String),
}

/// A ciphertext handle as produced by an encryption backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawHandle {
    /// Raw byte sequence
    Bytes(Vec<u8>),
    /// Array of numbers, each rendered as (at least) two hex digits
    Numbers(Vec<u32>),
    /// Hex text, with or without a `0x` prefix
    Hex(String),
}

impl From<Vec<u8>> for RawHandle {
    fn from(bytes: Vec<u8>) -> Self {
        RawHandle::Bytes(bytes)
    }
}

impl From<&[u8]> for RawHandle {
    fn from(bytes: &[u8]) -> Self {
        RawHandle::Bytes(bytes.to_vec())
    }
}

impl<const N: usize> From<[u8; N]> for RawHandle {
    fn from(bytes: [u8; N]) -> Self {
        RawHandle::Bytes(bytes.to_vec())
    }
}

impl From<Vec<u32>> for RawHandle {
    fn from(numbers: Vec<u32>) -> Self {
        RawHandle::Numbers(numbers)
    }
}

impl From<&str> for RawHandle {
    fn from(text: &str) -> Self {
        RawHandle::Hex(text.to_string())
    }
}

impl From<String> for RawHandle {
    fn from(text: String) -> Self {
        RawHandle::Hex(text)
    }
}

impl From<B256> for RawHandle {
    fn from(word: B256) -> Self {
        RawHandle::Bytes(word.to_vec())
    }
}

/// Convert a raw handle into the fixed 32-byte wire value.
///
/// Byte input is right-padded with zero bytes or truncated to 32 bytes.
/// Text and number-array input is normalized at the hex-digit level: zero
/// digits are appended up to 64, extra digits are dropped.
pub fn to_wire_format(raw: impl Into<RawHandle>) -> Result<B256, HandleCodecError> {
    match raw.into() {
        RawHandle::Bytes(bytes) => {
            let mut word = [0u8; 32];
            let len = bytes.len().min(32);
            word[..len].copy_from_slice(&bytes[..len]);
            Ok(B256::from(word))
        }
        RawHandle::Numbers(numbers) => {
            let digits: String = numbers.iter().map(|n| format!("{n:02x}")).collect();
            hex_digits_to_word(&digits)
        }
        RawHandle::Hex(text) => {
            let digits = text.strip_prefix("0x").unwrap_or(&text);
            hex_digits_to_word(digits)
        }
    }
}

fn hex_digits_to_word(digits: &str) -> Result<B256, HandleCodecError> {
    if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(HandleCodecError::InvalidHex(digits.to_string()));
    }

    let mut fixed: String = digits.chars().take(HANDLE_HEX_LEN).collect();
    while fixed.len() < HANDLE_HEX_LEN {
        fixed.push('0');
    }

    let mut word = [0u8; 32];
    hex::decode_to_slice(&fixed, &mut word)
        .map_err(|_| HandleCodecError::InvalidHex(digits.to_string()))?;
    Ok(B256::from(word))
}

/// `0x`-prefixed lowercase hex of a proof blob
pub fn proof_to_hex(proof: &[u8]) -> String {
    hex::encode_prefixed(proof)
}

/// Wrap raw proof bytes for a contract call
pub fn proof_to_wire(proof: &[u8]) -> Bytes {
    Bytes::copy_from_slice(proof)
}

/// All-zero handle: the contract's marker for a field that was never set
pub fn is_unset(handle: &B256) -> bool {
    handle.is_zero()
}

// ============================================================================
// TESTS
// ============================================================================
