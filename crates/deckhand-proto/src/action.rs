//! Protocol actions.
//!
//! One action is one entry in the ordered log. On the wire it is a flat JSON
//! object: `{ "clientId": ..., "type": ..., ...variant fields }`. Big
//! integers inside payloads are decimal strings.

use deckhand_crypto::{PublicKey, SerializedSraKeyPair};
use serde::{Deserialize, Serialize};

/// Participant identifier, unique for the lifetime of a session.
pub type ClientId = String;

/// Anything that names the participant who posted it.
pub trait Authored {
    /// Posting participant.
    fn client_id(&self) -> &str;
}

/// A single protocol message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Action {
    /// Posting participant.
    pub client_id: ClientId,
    /// Variant payload, discriminated by the `type` tag.
    #[serde(flatten)]
    pub body: ActionBody,
}

impl Action {
    /// Creates an action posted by `client_id`.
    pub fn new(client_id: impl Into<ClientId>, body: ActionBody) -> Self {
        Self { client_id: client_id.into(), body }
    }

    /// Variant tag of this action.
    pub fn kind(&self) -> ActionKind {
        self.body.kind()
    }
}

impl Authored for Action {
    fn client_id(&self) -> &str {
        &self.client_id
    }
}

/// Variant payloads.
///
/// Tags are PascalCase and field names camelCase across every variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ActionBody {
    /// Publishes the sender's signing key.
    #[serde(rename_all = "camelCase")]
    KeyExchange {
        /// Base64 Ed25519 public key.
        public_key: PublicKey,
    },

    /// Proposes a shared prime and claims a slot in the turn order.
    EstablishTurnOrder {
        /// Decimal encoded prime.
        prime: String,
    },

    /// Deck after a common-key encryption and permutation.
    ShuffleRound1 {
        /// Decimal encoded ciphertexts.
        deck: Vec<String>,
    },

    /// Deck after common-key removal and per-item re-encryption.
    ShuffleRound2 {
        /// Decimal encoded ciphertexts.
        deck: Vec<String>,
    },

    /// Discloses the sender's per-item key for one deck position.
    RevealKey {
        /// Deck position the key belongs to.
        index: usize,
        /// The sender's key pair for that position.
        key: SerializedSraKeyPair,
    },
}

impl ActionBody {
    /// Variant tag.
    pub fn kind(&self) -> ActionKind {
        match self {
            Self::KeyExchange { .. } => ActionKind::KeyExchange,
            Self::EstablishTurnOrder { .. } => ActionKind::EstablishTurnOrder,
            Self::ShuffleRound1 { .. } => ActionKind::ShuffleRound1,
            Self::ShuffleRound2 { .. } => ActionKind::ShuffleRound2,
            Self::RevealKey { .. } => ActionKind::RevealKey,
        }
    }
}

/// Fieldless mirror of [`ActionBody`] for matching and diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    /// [`ActionBody::KeyExchange`]
    KeyExchange,
    /// [`ActionBody::EstablishTurnOrder`]
    EstablishTurnOrder,
    /// [`ActionBody::ShuffleRound1`]
    ShuffleRound1,
    /// [`ActionBody::ShuffleRound2`]
    ShuffleRound2,
    /// [`ActionBody::RevealKey`]
    RevealKey,
}

impl ActionKind {
    /// Wire tag.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::KeyExchange => "KeyExchange",
            Self::EstablishTurnOrder => "EstablishTurnOrder",
            Self::ShuffleRound1 => "ShuffleRound1",
            Self::ShuffleRound2 => "ShuffleRound2",
            Self::RevealKey => "RevealKey",
        }
    }
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
