//! Deckhand Wire Protocol
//!
//! Message types for the ordered action log shared by every participant.
//!
//! # Wire Format
//!
//! Actions are flat JSON objects tagged by `type`:
//!
//! ```text
//! { "clientId": "brave-teal-bard", "type": "EstablishTurnOrder", "prime": "1299709" }
//! ```
//!
//! Signed actions add a sibling `signature` field (base64 Ed25519).

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod action;
pub mod codec;
pub mod error;
pub mod signed;

pub use action::{Action, ActionBody, ActionKind, Authored, ClientId};
pub use codec::{canonical_bytes, decode, encode};
pub use error::ProtoError;
pub use signed::Signed;
