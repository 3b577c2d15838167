//! Moving a raw log onto signed actions.

use deckhand_core::{
    Environment, ProtocolError, Queue, SignedTransport, Transport, UnsignedTransport,
};
use deckhand_proto::{Action, ClientId, Signed};

use crate::config::SessionConfig;
use crate::key_exchange::{CryptoContext, key_exchange};

/// Queue over a signed log.
pub type SignedQueue<T> = Queue<SignedTransport<T>>;

/// A participant's session after key exchange.
#[derive(Debug)]
pub struct Upgraded<T: Transport<Action = Signed<Action>>> {
    /// Local identity and every peer's key.
    pub context: CryptoContext,
    /// Queue positioned right after the key exchange entries.
    pub queue: SignedQueue<T>,
}

/// Runs key exchange over `raw`, then hands back a signed queue.
///
/// The exchange reads the log from its start, so a participant that joins
/// after its peers have posted still sees their keys. The returned queue
/// resumes at the first entry after the exchange; every entry from there on
/// must be signed by a participant in the key store.
pub async fn upgrade_transport<T, E>(
    config: &SessionConfig,
    client_id: impl Into<ClientId>,
    raw: T,
    env: &E,
) -> Result<Upgraded<T>, ProtocolError>
where
    T: Transport<Action = Signed<Action>> + Clone,
    E: Environment,
{
    let mut context = CryptoContext::generate(client_id, env);

    let bootstrap = Queue::with_history(UnsignedTransport::new(raw.clone()))?;
    key_exchange(config.players, &mut context, &bootstrap).await?;
    let position = bootstrap.position();

    let signed = SignedTransport::new(raw, context.me.clone(), context.key_store.clone());
    let queue = Queue::resume(signed, position)?;

    tracing::debug!(client_id = %context.client_id, position, "transport upgraded");
    Ok(Upgraded { context, queue })
}

#[cfg(test)]
mod tests {
    use deckhand_core::{MemoryTransport, SystemEnv};
    use deckhand_proto::ActionBody;

    use super::*;

    #[tokio::test]
    async fn both_participants_resume_after_the_exchange() {
        let raw: MemoryTransport<Signed<Action>> = MemoryTransport::new();
        let config = SessionConfig::default();
        let env = SystemEnv::new();

        let (alice, bob) = tokio::join!(
            upgrade_transport(&config, "alice", raw.clone(), &env),
            upgrade_transport(&config, "bob", raw.clone(), &env),
        );
        let (alice, bob) = (alice.expect("alice"), bob.expect("bob"));

        assert_eq!(alice.queue.position(), 2);
        assert_eq!(bob.queue.position(), 2);
        assert!(alice.context.key_store.contains("bob"));
        assert!(bob.context.key_store.contains("alice"));

        let prime = Action::new("alice", ActionBody::EstablishTurnOrder { prime: "1019".into() });
        alice.queue.enqueue(prime.clone()).await.expect("post");

        assert_eq!(bob.queue.dequeue().await.expect("verified"), prime);
        assert!(raw.entries()[..2].iter().all(|entry| entry.signature.is_none()));
        assert!(raw.entries()[2].signature.is_some());
    }

    #[tokio::test]
    async fn late_joiner_reads_earlier_keys() {
        let raw: MemoryTransport<Signed<Action>> = MemoryTransport::new();
        let config = SessionConfig::default();
        let env = SystemEnv::new();

        let early = CryptoContext::generate("alice", &env);
        raw.append(Signed::unsigned(Action::new(
            "alice",
            ActionBody::KeyExchange { public_key: early.me.public_key() },
        )));

        let bob = upgrade_transport(&config, "bob", raw.clone(), &env).await.expect("bob");

        assert_eq!(bob.queue.position(), 2);
        assert_eq!(bob.context.key_store.len(), 2);
    }
}
