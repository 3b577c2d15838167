//! Signed action envelope.

use serde::{Deserialize, Serialize};

use crate::action::Authored;

/// An action plus the signature over its canonical encoding.
///
/// The signature sits beside the action's own fields on the wire. It is
/// optional so that unsigned entries (the key exchange that bootstraps
/// signing) share the same log; verification treats its absence as a hard
/// failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signed<A> {
    /// The signed action.
    #[serde(flatten)]
    pub action: A,

    /// Base64 signature over [`canonical_bytes`](crate::canonical_bytes) of
    /// `action`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
}

impl<A> Signed<A> {
    /// Wraps an action with its signature.
    pub fn new(action: A, signature: String) -> Self {
        Self { action, signature: Some(signature) }
    }

    /// Wraps an action without a signature.
    pub fn unsigned(action: A) -> Self {
        Self { action, signature: None }
    }
}

impl<A: Authored> Authored for Signed<A> {
    fn client_id(&self) -> &str {
        self.action.client_id()
    }
}
