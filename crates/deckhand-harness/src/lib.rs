//! Deterministic simulation harness for Deckhand.
//!
//! Seeded implementations of the environment plus an application-level
//! deck, so whole tables can be replayed from a seed.
//!
//! # Table Simulation
//!
//! [`play`] seats two participants on one [`MemoryTransport`] and drives
//! them through key exchange, turn order, shuffle and a deal. Tests compare
//! the two [`PlayerView`]s against each other and against the standard
//! deck: the hands must be disjoint, fully opened, and drawn from the
//! deck's 52 cards.
//!
//! [`MemoryTransport`]: deckhand_core::MemoryTransport

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod deck;
pub mod sim_env;
pub mod table;

pub use deck::{Deck, encode_deck, standard_deck};
pub use sim_env::SimEnv;
pub use table::{DealContext, PlayerView, SimConfig, TableOutcome, deal, deal_sequence, play};
