//! Public key exchange.
//!
//! Every participant posts its Ed25519 public key once. The protocol
//! consumes exactly `players` `KeyExchange` actions and fills the
//! [`KeyStore`] that [`SignedTransport`](deckhand_core::SignedTransport)
//! later verifies against.

use deckhand_core::{
    Environment, KeyStore, Outbox, ProtocolError, Queue, Sequence, Transport, local, repeat, run,
    sequence, transition,
};
use deckhand_crypto::SigningKeyPair;
use deckhand_proto::{Action, ActionBody, ActionKind, ClientId};

/// Local signing identity plus everything learned in key exchange.
#[derive(Debug, Clone)]
pub struct CryptoContext {
    /// Local participant.
    pub client_id: ClientId,
    /// Local signing key.
    pub me: SigningKeyPair,
    /// Peer keys, including our own once the exchange has run.
    pub key_store: KeyStore,
}

impl CryptoContext {
    /// Fresh identity for `client_id` with an empty key store.
    pub fn generate<E: Environment>(client_id: impl Into<ClientId>, env: &E) -> Self {
        Self {
            client_id: client_id.into(),
            me: SigningKeyPair::generate(&mut env.rng()),
            key_store: KeyStore::new(),
        }
    }
}

/// Builds the exchange machine for `players` participants.
pub fn key_exchange_sequence(players: usize) -> Sequence<Action, CryptoContext> {
    sequence([
        vec![local(|out: &mut Outbox<Action>, ctx: &mut CryptoContext| {
            out.post(Action::new(
                ctx.client_id.clone(),
                ActionBody::KeyExchange { public_key: ctx.me.public_key() },
            ));
            Ok(())
        })],
        repeat(transition(accept_key), players),
    ])
}

fn accept_key(action: &Action, ctx: &mut CryptoContext) -> Result<(), ProtocolError> {
    let ActionBody::KeyExchange { public_key } = &action.body else {
        return Err(ProtocolError::UnexpectedAction {
            expected: ActionKind::KeyExchange,
            actual: action.kind(),
        });
    };

    ctx.key_store.insert(&action.client_id, public_key)?;
    tracing::debug!(client_id = %action.client_id, "public key registered");
    Ok(())
}

/// Runs key exchange for `players` participants over `queue`.
///
/// On success `context.key_store` holds one key per participant.
pub async fn key_exchange<T>(
    players: usize,
    context: &mut CryptoContext,
    queue: &Queue<T>,
) -> Result<(), ProtocolError>
where
    T: Transport<Action = Action>,
{
    let mut machine = key_exchange_sequence(players);
    run(&mut machine, queue, context).await?;

    tracing::info!(client_id = %context.client_id, players, "key exchange complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use deckhand_core::{StateMachine, SystemEnv};

    use super::*;

    fn announce(client_id: &str) -> Action {
        let env = SystemEnv::new();
        let key = SigningKeyPair::generate(&mut env.rng()).public_key();
        Action::new(client_id, ActionBody::KeyExchange { public_key: key })
    }

    #[test]
    fn posts_own_key_first() {
        let mut ctx = CryptoContext::generate("alice", &SystemEnv::new());
        let mut machine = key_exchange_sequence(2);
        let mut outbox = Outbox::new();

        machine.advance(&mut outbox, &mut ctx).expect("advance");

        let posted: Vec<Action> = outbox.drain().collect();
        assert_eq!(posted.len(), 1);
        assert_eq!(
            posted[0].body,
            ActionBody::KeyExchange { public_key: ctx.me.public_key() }
        );
    }

    #[test]
    fn completes_after_each_participant_posts_once() {
        let mut ctx = CryptoContext::generate("alice", &SystemEnv::new());
        let mut machine = key_exchange_sequence(2);
        machine.advance(&mut Outbox::new(), &mut ctx).expect("advance");

        machine.accept(&announce("alice"), &mut ctx).expect("alice");
        assert!(!machine.done());
        machine.accept(&announce("bob"), &mut ctx).expect("bob");

        assert!(machine.done());
        assert_eq!(ctx.key_store.len(), 2);
    }

    #[test]
    fn repeated_participant_is_rejected() {
        let mut ctx = CryptoContext::generate("alice", &SystemEnv::new());
        let mut machine = key_exchange_sequence(3);
        machine.advance(&mut Outbox::new(), &mut ctx).expect("advance");

        machine.accept(&announce("alice"), &mut ctx).expect("alice");
        machine.accept(&announce("bob"), &mut ctx).expect("bob");
        let err = machine.accept(&announce("bob"), &mut ctx).expect_err("duplicate");

        assert!(matches!(
            err,
            ProtocolError::DuplicateParticipant { ref client_id } if client_id == "bob"
        ));
    }

    #[test]
    fn other_actions_are_rejected() {
        let mut ctx = CryptoContext::generate("alice", &SystemEnv::new());
        let mut machine = key_exchange_sequence(2);
        machine.advance(&mut Outbox::new(), &mut ctx).expect("advance");

        let stray = Action::new("bob", ActionBody::EstablishTurnOrder { prime: "7".into() });
        assert!(matches!(
            machine.accept(&stray, &mut ctx),
            Err(ProtocolError::UnexpectedAction { expected: ActionKind::KeyExchange, .. })
        ));
    }

    #[test]
    fn empty_client_id_is_rejected() {
        let mut ctx = CryptoContext::generate("alice", &SystemEnv::new());
        let mut machine = key_exchange_sequence(2);
        machine.advance(&mut Outbox::new(), &mut ctx).expect("advance");

        assert!(matches!(
            machine.accept(&announce(""), &mut ctx),
            Err(ProtocolError::MissingClientId)
        ));
    }
}
