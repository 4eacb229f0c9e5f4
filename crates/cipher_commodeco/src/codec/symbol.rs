//! # Ticker Symbol Packing
//!
//! The encrypted channel only carries 32-bit integers, so a ticker is folded
//! into one number, two decimal digits per character:
//!
//! ```text
//!   "GOLD"  →  71 79 76 68  →  71_797_668
//!
//!   value = value * 100 + char_code     (first 6 characters only)
//!   value = min(value, 2_000_000_000)
//! ```
//!
//! Decoding reads the digit pairs back from the right and keeps the ones that
//! are printable ASCII. The encoding is lossy: characters with codes of 100 or
//! more, long symbols and anything clamped at the ceiling do not survive the
//! trip. The domain is short uppercase tickers, where it does.

/// Characters folded into a code
pub const MAX_SYMBOL_CHARS: usize = 6;

/// Ceiling applied to every code
pub const SYMBOL_CODE_CEILING: u32 = 2_000_000_000;

/// Shown when nothing printable can be recovered
pub const UNKNOWN_SYMBOL: &str = "Unknown";

const RADIX: u64 = 100;
const PRINTABLE: std::ops::RangeInclusive<u64> = 32..=126;

/// Fold a ticker into its numeric code
///
/// Character codes are UTF-16 code units, so non-ASCII input folds the same
/// way the browser client folds it.
pub fn encode_symbol(symbol: &str) -> u32 {
    let value = symbol
        .encode_utf16()
        .take(MAX_SYMBOL_CHARS)
        .fold(0u64, |acc, unit| {
            acc.saturating_mul(RADIX).saturating_add(u64::from(unit))
        });

    u32::try_from(value)
        .unwrap_or(u32::MAX)
        .min(SYMBOL_CODE_CEILING)
}

/// Printable characters recoverable from a code, without decoration
pub fn recover_symbol(value: u32) -> Option<String> {
    let mut chars = Vec::with_capacity(MAX_SYMBOL_CHARS);
    let mut rest = u64::from(value);

    while rest > 0 && chars.len() < MAX_SYMBOL_CHARS {
        let code = rest % RADIX;
        if PRINTABLE.contains(&code) {
            chars.push(code as u8 as char);
        }
        rest /= RADIX;
    }

    if chars.is_empty() {
        return None;
    }
    chars.reverse();
    Some(chars.into_iter().collect())
}

/// Display form of a code: `"<chars>..."` or `"Unknown"`
pub fn decode_symbol(value: u32) -> String {
    match recover_symbol(value) {
        Some(chars) => format!("{chars}..."),
        None => UNKNOWN_SYMBOL.to_string(),
    }
}

// ============================================================================
// TESTS
// ============================================================================
