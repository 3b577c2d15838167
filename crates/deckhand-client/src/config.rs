//! Session parameters.

/// Parameters every participant at a table must agree on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Number of participants.
    pub players: usize,

    /// Size of the proposed shared prime, in bytes.
    ///
    /// Bounds the largest item the deck can hold: an item's integer form
    /// must stay below the prime.
    pub prime_bytes: usize,

    /// Size of SRA exponents, in bytes.
    pub key_bytes: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { players: 2, prime_bytes: 128, key_bytes: 128 }
    }
}

impl SessionConfig {
    /// Default sizes with a different player count.
    pub fn with_players(players: usize) -> Self {
        Self { players, ..Self::default() }
    }
}
