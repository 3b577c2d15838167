//! Cryptographic error types.

use thiserror::Error;

/// Errors from number theory, SRA and signing operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CryptoError {
    /// Modular arithmetic was asked to reduce modulo zero.
    #[error("modulus must be non-zero")]
    ZeroModulus,

    /// `gcd(value, modulus) != 1`, so no modular inverse exists.
    #[error("no modular inverse exists")]
    NoInverse,

    /// Integer encoding of an item is not strictly below the shared prime.
    #[error("plaintext integer is not smaller than the {prime_bits}-bit modulus")]
    PlaintextTooLarge {
        /// Bit length of the modulus the item was checked against.
        prime_bits: u64,
    },

    /// A size parameter was zero or otherwise unusable.
    #[error("invalid length: {reason}")]
    InvalidLength {
        /// Description of the length error.
        reason: String,
    },

    /// Decimal big-integer encoding could not be parsed.
    #[error("malformed integer encoding: {input:?}")]
    MalformedInteger {
        /// Offending input (truncated for logging).
        input: String,
    },

    /// The item starts with a NUL byte, which its integer form cannot keep.
    #[error("item starts with a NUL byte")]
    LeadingNul,

    /// A fully decrypted item is not valid UTF-8.
    #[error("decrypted item is not valid UTF-8")]
    MalformedPlaintext,

    /// Public or private key bytes could not be decoded.
    #[error("malformed key: {reason}")]
    MalformedKey {
        /// Description of the decoding failure.
        reason: String,
    },

    /// Signature bytes could not be decoded.
    #[error("malformed signature: {reason}")]
    MalformedSignature {
        /// Description of the decoding failure.
        reason: String,
    },

    /// Signature did not verify against the claimed sender's key.
    #[error("signature verification failed")]
    SignatureMismatch,

    /// A retry loop drew `draws` values without finding a usable one.
    ///
    /// Honest randomness makes this practically impossible. It means the
    /// RNG is stuck, for example an entropy source that returns zeros.
    #[error("randomness source produced no usable value in {draws} draws")]
    RandomnessExhausted {
        /// Draws made before giving up.
        draws: usize,
    },
}

impl CryptoError {
    /// Returns true for arithmetic failures (no inverse, oversized plaintext,
    /// degenerate modulus).
    ///
    /// Everything else is an authentication or encoding failure.
    pub fn is_arithmetic(&self) -> bool {
        matches!(self, Self::ZeroModulus | Self::NoInverse | Self::PlaintextTooLarge { .. })
    }
}

/// Truncates untrusted input before it is embedded in an error.
pub(crate) fn excerpt(input: &str) -> String {
    const MAX: usize = 32;
    input.chars().take(MAX).collect()
}
