//! Deckhand Protocol Engine
//!
//! Everything between the cryptographic primitives and a concrete card
//! protocol: randomness, the ordered action log, the consumer queue, the
//! signature layer, and the step machines protocols are written in.
//!
//! # Design
//!
//! Participants never talk to each other directly. Each one appends actions
//! to a shared ordered log and consumes the log in order, advancing a state
//! machine that validates every entry. This enables:
//!
//! - Identical views: every participant derives its state from the same
//!   sequence of entries
//! - Late joiners and phase hand-offs: a queue can resume from any log
//!   position
//! - Transport independence: the engine only sees the [`Transport`] trait
//!
//! # Security Properties
//!
//! - Fail Fast: the first rejected entry aborts the run with a typed error
//! - Sender Authentication: once keys are exchanged, [`SignedTransport`]
//!   drops nothing silently and delivers nothing unverified

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod env;
pub mod error;
pub mod machine;
pub mod queue;
pub mod signed;
pub mod transport;

pub use env::{EnvRng, Environment, SystemEnv};
pub use error::{ErrorKind, ProtocolError, TransportError};
pub use machine::{
    Connection, Fork, Outbox, Sequence, StateMachine, Step, local, repeat, run, sequence,
    transition,
};
pub use queue::Queue;
pub use signed::{KeyStore, SignedTransport, UnsignedTransport, verify_signed};
pub use transport::{Entry, MemoryTransport, Subscription, Transport};
