//! Deckhand Client Protocols
//!
//! The card-table protocols a participant runs, each a state machine over
//! the shared action log:
//!
//! - [`key_exchange`]: publish signing keys
//! - [`upgrade_transport`]: key exchange, then a signed queue for
//!   everything after
//! - [`establish_turn_order`]: agree on the shared SRA prime and seats
//! - [`shuffle`]: two-party commutative shuffle with per-item keys
//!
//! # Design
//!
//! Each protocol is a plain [`Sequence`](deckhand_core::Sequence) built
//! from local and transition steps over a protocol-specific context. The
//! builders are public so that protocols can be composed with
//! [`Fork`](deckhand_core::Fork) and
//! [`Connection`](deckhand_core::Connection), or stepped by hand in tests.
//!
//! # Security Properties
//!
//! - Dealer Freedom: no participant alone can map a final ciphertext to its
//!   item; both per-item keys are required
//! - Permutation Secrecy: each seat permutes ciphertexts under its own
//!   common key, so neither learns the other's permutation

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod config;
pub mod id;
pub mod key_exchange;
pub mod keys;
pub mod shuffle;
pub mod turn_order;
pub mod upgrade;

pub use config::SessionConfig;
pub use id::generate_client_id;
pub use key_exchange::{CryptoContext, key_exchange, key_exchange_sequence};
pub use keys::KeyProvider;
pub use shuffle::{Seat, ShuffleContext, ShuffledDeck, shuffle, shuffle_sequence};
pub use turn_order::{TurnOrder, TurnOrderContext, establish_turn_order, turn_order_sequence};
pub use upgrade::{SignedQueue, Upgraded, upgrade_transport};
