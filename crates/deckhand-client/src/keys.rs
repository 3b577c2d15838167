//! SRA key supply for the shuffle.

use deckhand_crypto::{BigUint, CryptoError, SraKeyPair};
use rand::Rng;

/// Makes SRA key pairs over the session's shared prime.
#[derive(Debug, Clone)]
pub struct KeyProvider {
    shared_prime: BigUint,
    key_bytes: usize,
}

impl KeyProvider {
    /// Provider for keys of `key_bytes` bytes over `shared_prime`.
    pub fn new(shared_prime: BigUint, key_bytes: usize) -> Self {
        Self { shared_prime, key_bytes }
    }

    /// Draws a fresh key pair.
    pub fn make<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<SraKeyPair, CryptoError> {
        SraKeyPair::generate(rng, &self.shared_prime, self.key_bytes)
    }

    /// Draws `count` fresh key pairs.
    pub fn make_many<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        count: usize,
    ) -> Result<Vec<SraKeyPair>, CryptoError> {
        (0..count).map(|_| self.make(rng)).collect()
    }

    /// Prime every key shares.
    pub fn shared_prime(&self) -> &BigUint {
        &self.shared_prime
    }
}
