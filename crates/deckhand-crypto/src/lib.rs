//! Deckhand Cryptographic Primitives
//!
//! Building blocks for mental poker: number theory over big integers, the
//! SRA commutative cipher, the decimal wire codec, and Ed25519 signing.
//!
//! # Design
//!
//! All functions in this crate are pure. Randomness is drawn from an RNG the
//! caller passes in, enabling:
//!
//! - Deterministic testing with seeded RNG
//! - Reproducible protocol simulations
//! - No coupling to application-level abstractions
//!
//! # Security Properties
//!
//! - Commutativity: SRA layers under key pairs sharing a prime can be
//!   removed in any order
//! - Bounded inputs: items whose integer form is not below the prime are
//!   rejected, never wrapped
//! - Sender Authentication: every signed action verifies against the
//!   sender's Ed25519 key

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod codec;
pub mod error;
pub mod math;
pub mod signing;
pub mod sra;

pub use codec::{bigint_to_string, decode_item, encode_item, string_to_bigint};
pub use ed25519_dalek::VerifyingKey;
pub use error::CryptoError;
pub use math::{
    MAX_PRIME_CANDIDATES, MILLER_RABIN_ROUNDS, is_probably_prime, mod_exp, mod_inverse,
    random_bigint, random_prime,
};
pub use num_bigint::BigUint;
pub use signing::{PublicKey, SigningKeyPair, parse_public_key, verify};
pub use sra::{MAX_EXPONENT_DRAWS, SerializedSraKeyPair, SraKeyPair};
