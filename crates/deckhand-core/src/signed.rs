//! Signature layer over a transport.
//!
//! [`SignedTransport`] signs every outgoing action with the local Ed25519 key
//! and verifies every incoming one against the [`KeyStore`] built during key
//! exchange. [`UnsignedTransport`] shares the same wire shape with the
//! signature left off; it only carries the key exchange that bootstraps
//! signing.
//!
//! # Security Properties
//!
//! - Sender Authentication: an entry reaches the consumer only if its
//!   signature verifies under the key registered for its claimed sender
//! - Canonical Payload: signatures cover the action with the signature
//!   field removed, encoded by [`deckhand_proto::canonical_bytes`]
//! - Fail Closed: missing signatures and unknown senders are errors, never
//!   silently passed through

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use deckhand_crypto::{SigningKeyPair, VerifyingKey, parse_public_key};
use deckhand_proto::{Authored, ClientId, Signed, canonical_bytes};
use serde::Serialize;

use crate::error::{ProtocolError, TransportError};
use crate::transport::{Entry, Subscription, Transport};

/// Verification keys by participant.
#[derive(Debug, Clone, Default)]
pub struct KeyStore {
    keys: HashMap<ClientId, VerifyingKey>,
}

impl KeyStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `public_key` (base64) for `client_id`.
    ///
    /// # Errors
    ///
    /// - `ProtocolError::MissingClientId` for an empty id
    /// - `ProtocolError::DuplicateParticipant` if the id already has a key
    /// - `ProtocolError::Crypto` if the key does not decode
    pub fn insert(&mut self, client_id: &str, public_key: &str) -> Result<(), ProtocolError> {
        if client_id.is_empty() {
            return Err(ProtocolError::MissingClientId);
        }
        if self.keys.contains_key(client_id) {
            return Err(ProtocolError::DuplicateParticipant { client_id: client_id.to_owned() });
        }

        let key = parse_public_key(public_key)?;
        self.keys.insert(client_id.to_owned(), key);
        Ok(())
    }

    /// Key registered for `client_id`.
    pub fn get(&self, client_id: &str) -> Option<&VerifyingKey> {
        self.keys.get(client_id)
    }

    /// Whether `client_id` has a key.
    pub fn contains(&self, client_id: &str) -> bool {
        self.keys.contains_key(client_id)
    }

    /// Number of registered participants.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether nobody is registered.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// Checks `signed` against `key_store` and strips the signature.
pub fn verify_signed<A>(key_store: &KeyStore, signed: Signed<A>) -> Result<A, TransportError>
where
    A: Authored + Serialize,
{
    let Signed { action, signature } = signed;

    let signature = signature
        .ok_or_else(|| TransportError::MissingSignature {
            client_id: action.client_id().to_owned(),
        })?;
    let key = key_store
        .get(action.client_id())
        .ok_or_else(|| TransportError::MissingPublicKey {
            client_id: action.client_id().to_owned(),
        })?;

    let payload = canonical_bytes(&action)?;
    deckhand_crypto::verify(&payload, &signature, key).inspect_err(|e| {
        tracing::warn!(client_id = action.client_id(), error = %e, "signature rejected");
    })?;

    Ok(action)
}

/// Signs outgoing and verifies incoming actions.
pub struct SignedTransport<T> {
    inner: T,
    signer: SigningKeyPair,
    key_store: Arc<KeyStore>,
}

impl<T> std::fmt::Debug for SignedTransport<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignedTransport")
            .field("signer", &self.signer)
            .field("participants", &self.key_store.len())
            .finish_non_exhaustive()
    }
}

impl<T> SignedTransport<T> {
    /// Wraps `inner`, signing with `signer` and verifying against
    /// `key_store`.
    pub fn new(inner: T, signer: SigningKeyPair, key_store: KeyStore) -> Self {
        Self { inner, signer, key_store: Arc::new(key_store) }
    }

    /// Keys this transport verifies against.
    pub fn key_store(&self) -> &KeyStore {
        &self.key_store
    }

    /// Underlying raw transport.
    pub fn inner(&self) -> &T {
        &self.inner
    }
}

#[async_trait]
impl<T, A> Transport for SignedTransport<T>
where
    T: Transport<Action = Signed<A>>,
    A: Authored + Serialize + Clone + Send + Sync + 'static,
{
    type Action = A;
    type Subscription = VerifyingSubscription<T::Subscription>;

    async fn post_action(&self, action: A) -> Result<(), TransportError> {
        let signature = self.signer.sign(&canonical_bytes(&action)?);
        self.inner.post_action(Signed::new(action, signature)).await
    }

    fn replay(&self, from: usize) -> Result<Vec<Entry<A>>, TransportError> {
        Ok(verify_history(&self.key_store, self.inner.replay(from)?))
    }

    fn subscribe(&self) -> Self::Subscription {
        VerifyingSubscription {
            inner: self.inner.subscribe(),
            key_store: Arc::clone(&self.key_store),
        }
    }

    fn len(&self) -> usize {
        self.inner.len()
    }

    fn replay_and_subscribe(
        &self,
        from: usize,
    ) -> Result<(Vec<Entry<A>>, Self::Subscription), TransportError> {
        let (history, inner) = self.inner.replay_and_subscribe(from)?;
        let history = verify_history(&self.key_store, history);
        Ok((history, VerifyingSubscription { inner, key_store: Arc::clone(&self.key_store) }))
    }
}

/// Verifies each entry on its own, so one bad entry never hides the rest.
fn verify_history<A>(key_store: &KeyStore, history: Vec<Entry<Signed<A>>>) -> Vec<Entry<A>>
where
    A: Authored + Serialize,
{
    history
        .into_iter()
        .map(|entry| entry.and_then(|signed| verify_signed(key_store, signed)))
        .collect()
}

/// Feed that verifies each entry before handing it out.
pub struct VerifyingSubscription<S> {
    inner: S,
    key_store: Arc<KeyStore>,
}

#[async_trait]
impl<S, A> Subscription<A> for VerifyingSubscription<S>
where
    S: Subscription<Signed<A>>,
    A: Authored + Serialize + Send + 'static,
{
    async fn recv(&mut self) -> Option<Entry<A>> {
        let next = self.inner.recv().await?;
        Some(next.and_then(|signed| verify_signed(&self.key_store, signed)))
    }
}

/// Same wire shape as [`SignedTransport`], without signatures.
///
/// Outgoing actions carry no signature and any incoming signature is
/// dropped unchecked.
#[derive(Debug, Clone)]
pub struct UnsignedTransport<T> {
    inner: T,
}

impl<T> UnsignedTransport<T> {
    /// Wraps `inner`.
    pub fn new(inner: T) -> Self {
        Self { inner }
    }

    /// Gives back the raw transport.
    pub fn into_inner(self) -> T {
        self.inner
    }
}

#[async_trait]
impl<T, A> Transport for UnsignedTransport<T>
where
    T: Transport<Action = Signed<A>>,
    A: Clone + Send + Sync + 'static,
{
    type Action = A;
    type Subscription = StrippingSubscription<T::Subscription>;

    async fn post_action(&self, action: A) -> Result<(), TransportError> {
        self.inner.post_action(Signed::unsigned(action)).await
    }

    fn replay(&self, from: usize) -> Result<Vec<Entry<A>>, TransportError> {
        Ok(strip_history(self.inner.replay(from)?))
    }

    fn subscribe(&self) -> Self::Subscription {
        StrippingSubscription { inner: self.inner.subscribe() }
    }

    fn len(&self) -> usize {
        self.inner.len()
    }

    fn replay_and_subscribe(
        &self,
        from: usize,
    ) -> Result<(Vec<Entry<A>>, Self::Subscription), TransportError> {
        let (history, inner) = self.inner.replay_and_subscribe(from)?;
        Ok((strip_history(history), StrippingSubscription { inner }))
    }
}

fn strip_history<A>(history: Vec<Entry<Signed<A>>>) -> Vec<Entry<A>> {
    history.into_iter().map(|entry| entry.map(|signed| signed.action)).collect()
}

/// Feed that drops signatures.
#[derive(Debug)]
pub struct StrippingSubscription<S> {
    inner: S,
}

#[async_trait]
impl<S, A> Subscription<A> for StrippingSubscription<S>
where
    S: Subscription<Signed<A>>,
    A: Send + 'static,
{
    async fn recv(&mut self) -> Option<Entry<A>> {
        let next = self.inner.recv().await?;
        Some(next.map(|signed| signed.action))
    }
}
