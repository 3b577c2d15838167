//! Error types for the protocol engine and transports.

use deckhand_crypto::CryptoError;
use deckhand_proto::{ActionKind, ClientId, ProtoError};
use thiserror::Error;

/// Broad classification of a failure.
///
/// Every error a protocol run can end with falls into exactly one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A peer (or the log) broke the protocol: wrong variant, wrong sender,
    /// duplicates, size mismatches.
    ProtocolViolation,
    /// A signature, key or encoding failed to verify or parse.
    CryptoFailure,
    /// Number theory refused the input: no inverse, zero modulus, plaintext
    /// not below the prime.
    ArithmeticFailure,
    /// The transport stopped delivering.
    TransportFailure,
}

/// Errors raised while moving actions through a transport.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The log stopped delivering actions.
    #[error("transport closed")]
    Closed,

    /// A signed log carried an entry with no signature.
    #[error("missing signature on action from {client_id}")]
    MissingSignature {
        /// Claimed sender of the entry.
        client_id: ClientId,
    },

    /// No public key is known for the claimed sender.
    #[error("no public key for {client_id}")]
    MissingPublicKey {
        /// Claimed sender of the entry.
        client_id: ClientId,
    },

    /// Signature parsing or verification failed.
    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),

    /// Canonical encoding failed.
    #[error("encoding error: {0}")]
    Proto(#[from] ProtoError),
}

impl TransportError {
    /// Classifies this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Closed => ErrorKind::TransportFailure,
            Self::MissingSignature { .. } | Self::MissingPublicKey { .. } => {
                ErrorKind::CryptoFailure
            },
            Self::Crypto(e) => crypto_kind(e),
            Self::Proto(_) => ErrorKind::ProtocolViolation,
        }
    }
}

/// Errors that end a protocol run.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The next action in the log has the wrong variant.
    #[error("unexpected action: expected {expected}, got {actual}")]
    UnexpectedAction {
        /// Variant the current step accepts.
        expected: ActionKind,
        /// Variant that arrived.
        actual: ActionKind,
    },

    /// A participant appeared twice where each may appear once.
    #[error("duplicate participant: {client_id}")]
    DuplicateParticipant {
        /// The repeated participant.
        client_id: ClientId,
    },

    /// An action carried an empty client id.
    #[error("action has no client id")]
    MissingClientId,

    /// The action came from a participant whose turn it is not.
    #[error("unexpected sender: expected {expected}, got {actual}")]
    UnexpectedSender {
        /// Participant whose turn it is.
        expected: ClientId,
        /// Participant who posted.
        actual: ClientId,
    },

    /// A deck arrived with a different number of items than the session uses.
    #[error("deck size mismatch: expected {expected}, got {actual}")]
    DeckSizeMismatch {
        /// Agreed deck size.
        expected: usize,
        /// Size that arrived.
        actual: usize,
    },

    /// A deck position outside the deck was referenced.
    #[error("index {index} out of range for deck of {len}")]
    IndexOutOfRange {
        /// Requested position.
        index: usize,
        /// Deck size.
        len: usize,
    },

    /// The protocol does not support this many participants.
    #[error("unsupported player count: {players}")]
    UnsupportedPlayerCount {
        /// Participant count found.
        players: usize,
    },

    /// An action arrived after the sequence consumed its last step.
    #[error("sequence already complete")]
    SequenceComplete,

    /// An action arrived while the sequence still owes a local step.
    #[error("sequence is waiting on a local step")]
    AwaitingLocalStep,

    /// Every branch of a fork rejected the action.
    #[error("no branch accepted the action ({branches} tried)")]
    NoBranchAccepted {
        /// Branches tried.
        branches: usize,
    },

    /// A step ran against context it cannot work with.
    #[error("invalid state: {reason}")]
    InvalidState {
        /// Description of the state error.
        reason: String,
    },

    /// A cryptographic or arithmetic primitive failed.
    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),

    /// Posting or receiving failed.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
}

impl ProtocolError {
    /// Classifies this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Crypto(e) => crypto_kind(e),
            Self::Transport(e) => e.kind(),
            Self::UnexpectedAction { .. }
            | Self::DuplicateParticipant { .. }
            | Self::MissingClientId
            | Self::UnexpectedSender { .. }
            | Self::DeckSizeMismatch { .. }
            | Self::IndexOutOfRange { .. }
            | Self::UnsupportedPlayerCount { .. }
            | Self::SequenceComplete
            | Self::AwaitingLocalStep
            | Self::NoBranchAccepted { .. }
            | Self::InvalidState { .. } => ErrorKind::ProtocolViolation,
        }
    }

    /// Shorthand for [`ProtocolError::InvalidState`].
    pub fn invalid_state(reason: impl Into<String>) -> Self {
        Self::InvalidState { reason: reason.into() }
    }
}

fn crypto_kind(e: &CryptoError) -> ErrorKind {
    if e.is_arithmetic() { ErrorKind::ArithmeticFailure } else { ErrorKind::CryptoFailure }
}
