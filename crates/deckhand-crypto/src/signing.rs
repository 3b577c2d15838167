//! Ed25519 signing for action authentication.
//!
//! Keys and signatures travel as standard base64 strings.

use base64::{Engine as _, engine::general_purpose::STANDARD};
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use rand::{CryptoRng, RngCore};

use crate::error::CryptoError;

/// Base64 encoded Ed25519 public key.
pub type PublicKey = String;

/// Local signing identity.
///
/// The `Debug` impl prints only the public half.
#[derive(Clone)]
pub struct SigningKeyPair {
    signing_key: SigningKey,
}

impl std::fmt::Debug for SigningKeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningKeyPair")
            .field("public_key", &self.public_key())
            .field("private_key", &"<redacted>")
            .finish()
    }
}

impl SigningKeyPair {
    /// Generates a fresh key pair from the caller's RNG.
    pub fn generate<R: RngCore + CryptoRng + ?Sized>(rng: &mut R) -> Self {
        let mut secret = [0u8; ed25519_dalek::SECRET_KEY_LENGTH];
        rng.fill_bytes(&mut secret);
        Self { signing_key: SigningKey::from_bytes(&secret) }
    }

    /// Public half, base64 encoded for the wire.
    pub fn public_key(&self) -> PublicKey {
        STANDARD.encode(self.signing_key.verifying_key().to_bytes())
    }

    /// Public half as a verification key.
    pub fn verifying_key(&self) -> VerifyingKey {
        self.signing_key.verifying_key()
    }

    /// Signs `payload`, returning the base64 encoded signature.
    pub fn sign(&self, payload: &[u8]) -> String {
        STANDARD.encode(self.signing_key.sign(payload).to_bytes())
    }
}

/// Decodes a base64 public key received from a peer.
pub fn parse_public_key(public_key: &str) -> Result<VerifyingKey, CryptoError> {
    let bytes = STANDARD
        .decode(public_key)
        .map_err(|e| CryptoError::MalformedKey { reason: e.to_string() })?;

    let bytes: [u8; ed25519_dalek::PUBLIC_KEY_LENGTH] = bytes
        .try_into()
        .map_err(|b: Vec<u8>| CryptoError::MalformedKey { reason: format!("{} bytes", b.len()) })?;

    VerifyingKey::from_bytes(&bytes)
        .map_err(|e| CryptoError::MalformedKey { reason: e.to_string() })
}

/// Verifies a base64 `signature` over `payload`.
pub fn verify(payload: &[u8], signature: &str, key: &VerifyingKey) -> Result<(), CryptoError> {
    let bytes = STANDARD
        .decode(signature)
        .map_err(|e| CryptoError::MalformedSignature { reason: e.to_string() })?;

    let signature = Signature::from_slice(&bytes)
        .map_err(|e| CryptoError::MalformedSignature { reason: e.to_string() })?;

    key.verify(payload, &signature).map_err(|_| CryptoError::SignatureMismatch)
}
