//! SRA commutative cipher.
//!
//! Encryption is exponentiation modulo a prime shared by every participant.
//! Because `(m^a)^b = (m^b)^a mod p`, layers added under independently
//! generated key pairs can be removed in any order.
//!
//! # Security
//!
//! - `enc` and `dec` are the private halves. The `Debug` impl redacts them.
//! - Revealing `dec` for an item reveals that item to anyone holding the
//!   matching partial ciphertext. Reveal per-item keys only when the item is
//!   meant to become visible.

use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::One;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{
    codec::{bigint_to_string, string_to_bigint},
    error::CryptoError,
    math::{mod_exp, mod_inverse, random_bigint},
};

/// Exponents [`SraKeyPair::generate`] draws before giving up.
pub const MAX_EXPONENT_DRAWS: usize = 10_000;

/// SRA key pair over an agreed prime.
///
/// `enc * dec ≡ 1 (mod prime - 1)`.
#[derive(Clone, PartialEq, Eq)]
pub struct SraKeyPair {
    /// Shared prime modulus.
    pub prime: BigUint,
    /// Encryption exponent.
    pub enc: BigUint,
    /// Decryption exponent.
    pub dec: BigUint,
}

impl std::fmt::Debug for SraKeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SraKeyPair")
            .field("prime_bits", &self.prime.bits())
            .field("enc", &"<redacted>")
            .field("dec", &"<redacted>")
            .finish()
    }
}

impl SraKeyPair {
    /// Generates a key pair over `shared_prime`.
    ///
    /// Draws a random `byte_length`-byte exponent coprime to
    /// `shared_prime - 1` and derives its inverse. Gives up with
    /// [`CryptoError::RandomnessExhausted`] after [`MAX_EXPONENT_DRAWS`]
    /// unusable exponents.
    pub fn generate<R: Rng + ?Sized>(
        rng: &mut R,
        shared_prime: &BigUint,
        byte_length: usize,
    ) -> Result<Self, CryptoError> {
        if byte_length == 0 {
            return Err(CryptoError::InvalidLength { reason: "key must be at least 1 byte".into() });
        }
        if shared_prime < &BigUint::from(5u32) {
            return Err(CryptoError::InvalidLength { reason: "shared prime is too small".into() });
        }

        let phi = shared_prime - 1u32;

        for _ in 0..MAX_EXPONENT_DRAWS {
            let enc = random_bigint(rng, byte_length) % &phi;
            if enc <= BigUint::one() || !enc.gcd(&phi).is_one() {
                continue;
            }

            let dec = mod_inverse(&enc, &phi)?;
            return Ok(Self { prime: shared_prime.clone(), enc, dec });
        }

        Err(CryptoError::RandomnessExhausted { draws: MAX_EXPONENT_DRAWS })
    }

    /// Applies this key's encryption layer to an integer item.
    pub fn encrypt(&self, value: &BigUint) -> Result<BigUint, CryptoError> {
        self.check_bounds(value)?;
        mod_exp(value, &self.enc, &self.prime)
    }

    /// Removes this key's encryption layer from an integer item.
    pub fn decrypt(&self, value: &BigUint) -> Result<BigUint, CryptoError> {
        self.check_bounds(value)?;
        mod_exp(value, &self.dec, &self.prime)
    }

    /// [`encrypt`](Self::encrypt) over the decimal wire form of an item.
    pub fn encrypt_item(&self, item: &str) -> Result<String, CryptoError> {
        Ok(bigint_to_string(&self.encrypt(&string_to_bigint(item)?)?))
    }

    /// [`decrypt`](Self::decrypt) over the decimal wire form of an item.
    pub fn decrypt_item(&self, item: &str) -> Result<String, CryptoError> {
        Ok(bigint_to_string(&self.decrypt(&string_to_bigint(item)?)?))
    }

    fn check_bounds(&self, value: &BigUint) -> Result<(), CryptoError> {
        if value >= &self.prime {
            return Err(CryptoError::PlaintextTooLarge { prime_bits: self.prime.bits() });
        }
        Ok(())
    }
}

/// Wire form of an [`SraKeyPair`], every integer as a decimal string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializedSraKeyPair {
    /// Shared prime.
    pub prime: String,
    /// Encryption exponent.
    pub enc: String,
    /// Decryption exponent.
    pub dec: String,
}

impl From<&SraKeyPair> for SerializedSraKeyPair {
    fn from(kp: &SraKeyPair) -> Self {
        Self {
            prime: bigint_to_string(&kp.prime),
            enc: bigint_to_string(&kp.enc),
            dec: bigint_to_string(&kp.dec),
        }
    }
}

impl TryFrom<&SerializedSraKeyPair> for SraKeyPair {
    type Error = CryptoError;

    fn try_from(kp: &SerializedSraKeyPair) -> Result<Self, Self::Error> {
        Ok(Self {
            prime: string_to_bigint(&kp.prime)?,
            enc: string_to_bigint(&kp.enc)?,
            dec: string_to_bigint(&kp.dec)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::mock::StepRng;
    use rand_chacha::ChaCha20Rng;

    use super::*;
    use crate::math::random_prime;

    fn setup() -> (ChaCha20Rng, BigUint) {
        let mut rng = ChaCha20Rng::seed_from_u64(42);
        let prime = random_prime(&mut rng, 16).expect("prime");
        (rng, prime)
    }

    #[test]
    fn exponents_are_inverse_modulo_phi() {
        let (mut rng, prime) = setup();
        let kp = SraKeyPair::generate(&mut rng, &prime, 16).expect("key pair");

        let phi = &prime - 1u32;
        assert_eq!((&kp.enc * &kp.dec) % &phi, BigUint::one());
        assert_eq!(kp.prime, prime);
    }

    #[test]
    fn oversized_plaintext_is_rejected() {
        let (mut rng, prime) = setup();
        let kp = SraKeyPair::generate(&mut rng, &prime, 16).expect("key pair");

        assert!(matches!(kp.encrypt(&prime), Err(CryptoError::PlaintextTooLarge { .. })));
        assert!(matches!(kp.decrypt(&(&prime + 1u32)), Err(CryptoError::PlaintextTooLarge { .. })));
    }

    #[test]
    fn tiny_prime_is_rejected() {
        let mut rng = ChaCha20Rng::seed_from_u64(1);
        assert!(SraKeyPair::generate(&mut rng, &BigUint::from(3u32), 4).is_err());
    }

    #[test]
    fn zero_byte_key_is_rejected() {
        let (mut rng, prime) = setup();
        assert!(matches!(
            SraKeyPair::generate(&mut rng, &prime, 0),
            Err(CryptoError::InvalidLength { .. })
        ));
    }

    #[test]
    fn stuck_rng_ends_exponent_search() {
        // A zero exponent is never usable.
        let stuck = SraKeyPair::generate(&mut StepRng::new(0, 0), &BigUint::from(1019u32), 4);
        assert_eq!(stuck, Err(CryptoError::RandomnessExhausted { draws: MAX_EXPONENT_DRAWS }));
    }

    #[test]
    fn debug_redacts_exponents() {
        let (mut rng, prime) = setup();
        let kp = SraKeyPair::generate(&mut rng, &prime, 16).expect("key pair");

        let printed = format!("{kp:?}");
        assert!(printed.contains("<redacted>"));
        assert!(!printed.contains(&bigint_to_string(&kp.dec)));
    }

    #[test]
    fn serialized_form_round_trips() {
        let (mut rng, prime) = setup();
        let kp = SraKeyPair::generate(&mut rng, &prime, 16).expect("key pair");

        let wire = SerializedSraKeyPair::from(&kp);
        assert_eq!(SraKeyPair::try_from(&wire), Ok(kp));
    }

    #[test]
    fn malformed_serialized_key_is_rejected() {
        let wire = SerializedSraKeyPair { prime: "7".into(), enc: "x".into(), dec: "5".into() };
        assert!(matches!(SraKeyPair::try_from(&wire), Err(CryptoError::MalformedInteger { .. })));
    }
}
