//! Wire codec for big integers and deck items.
//!
//! Big integers never cross the wire as native numbers. They travel as
//! decimal digit strings, and deck items map to integers through their
//! UTF-8 bytes read big-endian.

use num_bigint::BigUint;
use num_traits::Num;

use crate::error::{CryptoError, excerpt};

/// Encodes an integer as a decimal digit string.
pub fn bigint_to_string(n: &BigUint) -> String {
    n.to_str_radix(10)
}

/// Parses a decimal digit string.
///
/// Empty input, signs, whitespace and non-digit characters are all
/// rejected.
pub fn string_to_bigint(s: &str) -> Result<BigUint, CryptoError> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CryptoError::MalformedInteger { input: excerpt(s) });
    }

    BigUint::from_str_radix(s, 10).map_err(|_| CryptoError::MalformedInteger { input: excerpt(s) })
}

/// Integer representation of a plaintext item.
///
/// Leading zero bytes vanish in the integer, so an item starting with NUL
/// would decode to a different item. Those are rejected.
pub fn encode_item(item: &str) -> Result<BigUint, CryptoError> {
    if item.as_bytes().first() == Some(&0) {
        return Err(CryptoError::LeadingNul);
    }
    Ok(BigUint::from_bytes_be(item.as_bytes()))
}

/// Recovers a plaintext item from its integer representation.
///
/// Fails if the bytes are not UTF-8, which is what a wrong or missing key
/// layer almost always produces.
pub fn decode_item(n: &BigUint) -> Result<String, CryptoError> {
    let bytes = if n.bits() == 0 { Vec::new() } else { n.to_bytes_be() };
    String::from_utf8(bytes).map_err(|_| CryptoError::MalformedPlaintext)
}
