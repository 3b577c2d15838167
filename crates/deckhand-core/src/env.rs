//! Environment abstraction for deterministic testing.
//!
//! Every random draw a participant makes (prime search, SRA keys, signing
//! keys, deck permutations, client ids) goes through [`Environment`]. This
//! enables:
//!
//! - Deterministic Simulation: a seeded environment replays a whole table
//!   byte for byte, so a failing shuffle reproduces from its seed alone.
//!
//! - Production Runtime: [`SystemEnv`] draws from OS entropy without any
//!   change to the protocol code.
//!
//! # Invariants
//!
//! - Determinism: Given the same seed, `random_bytes()` produces the same
//!   sequence
//! - Isolation: Implementations must not share global state

use rand::{CryptoRng, RngCore};

/// Abstract source of randomness.
///
/// # Security
///
/// Production implementations MUST draw from a cryptographically secure
/// source. SRA keys and permutations are only as unpredictable as the bytes
/// this trait hands out.
pub trait Environment: Clone + Send + Sync + 'static {
    /// Fills the provided buffer with random bytes.
    ///
    /// # Invariants
    ///
    /// - Determinism during simulations: Given the same seed, this produces
    ///   the same sequence of bytes
    /// - Unpredictability in production: Uses OS entropy
    fn random_bytes(&self, buffer: &mut [u8]);

    /// Generates a random `u64`.
    fn random_u64(&self) -> u64 {
        let mut bytes = [0u8; 8];
        self.random_bytes(&mut bytes);
        u64::from_be_bytes(bytes)
    }

    /// Borrows this environment as a [`rand`] generator.
    ///
    /// The crypto crate takes `&mut R: Rng`; this adapter lets protocol code
    /// hand it the environment directly.
    fn rng(&self) -> EnvRng<'_, Self>
    where
        Self: Sized,
    {
        EnvRng { env: self }
    }
}

/// [`RngCore`] view of an [`Environment`].
#[derive(Debug)]
pub struct EnvRng<'a, E> {
    env: &'a E,
}

impl<E: Environment> RngCore for EnvRng<'_, E> {
    fn next_u32(&mut self) -> u32 {
        let mut bytes = [0u8; 4];
        self.env.random_bytes(&mut bytes);
        u32::from_be_bytes(bytes)
    }

    fn next_u64(&mut self) -> u64 {
        self.env.random_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.env.random_bytes(dest);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.env.random_bytes(dest);
        Ok(())
    }
}

// Environments are required to be cryptographically secure in production.
impl<E: Environment> CryptoRng for EnvRng<'_, E> {}

/// Production environment backed by OS entropy.
///
/// If the OS source fails, the failure is logged and the buffer is zeroed.
/// Every retry loop in key and prime generation is bounded, so a stuck
/// source surfaces as `CryptoError::RandomnessExhausted` instead of a hang.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemEnv;

impl SystemEnv {
    /// Create a new system environment.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Environment for SystemEnv {
    fn random_bytes(&self, buffer: &mut [u8]) {
        getrandom::fill(buffer).unwrap_or_else(|e| {
            // NOTE: Never observed on supported platforms. Zeros make the
            // next key or prime draw fail with RandomnessExhausted.
            tracing::error!("getrandom failed: {}", e);
            buffer.fill(0);
        });
    }
}
