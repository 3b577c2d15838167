//! Whole-table runs over the in-memory log.

use std::collections::HashSet;

use deckhand_client::{ShuffledDeck, TurnOrder};
use deckhand_core::{MemoryTransport, ProtocolError, Queue, Transport};
use deckhand_crypto::{BigUint, CryptoError};
use deckhand_harness::{Deck, SimConfig, deal, play, standard_deck};
use deckhand_proto::{Action, ActionKind};

fn small(seed: u64) -> SimConfig {
    SimConfig { seed, prime_bytes: 16, key_bytes: 16, hand_size: 3 }
}

#[tokio::test]
async fn both_players_receive_disjoint_readable_hands() {
    let outcome = play(&small(1)).await.expect("table");
    let [a, b] = &outcome.players;

    assert_eq!(a.turn_order, b.turn_order);
    assert_eq!(a.hand.len(), 3);
    assert_eq!(b.hand.len(), 3);

    let deck: HashSet<String> = standard_deck().into_iter().collect();
    let a_cards: HashSet<&String> = a.hand.iter().collect();
    let b_cards: HashSet<&String> = b.hand.iter().collect();

    assert!(a.hand.iter().chain(&b.hand).all(|card| deck.contains(card)));
    assert!(a_cards.is_disjoint(&b_cards));
    assert_eq!(a.others_hand.len(), 3);
}

#[tokio::test]
async fn log_follows_protocol_phases() {
    let outcome = play(&small(2)).await.expect("table");
    let kinds: Vec<ActionKind> = outcome.log.iter().map(|entry| entry.action.kind()).collect();

    assert_eq!(kinds[..2], [ActionKind::KeyExchange; 2]);
    assert_eq!(kinds[2..4], [ActionKind::EstablishTurnOrder; 2]);
    assert_eq!(kinds[4..6], [ActionKind::ShuffleRound1; 2]);
    assert_eq!(kinds[6..8], [ActionKind::ShuffleRound2; 2]);
    assert!(kinds[8..].iter().all(|k| *k == ActionKind::RevealKey));
    assert_eq!(kinds.len(), 8 + 6);

    // Key exchange is unsigned; everything after it is signed.
    assert!(outcome.log[..2].iter().all(|entry| entry.signature.is_none()));
    assert!(outcome.log[2..].iter().all(|entry| entry.signature.is_some()));
}

#[tokio::test]
async fn same_seed_replays_same_table() {
    let first = play(&small(3)).await.expect("table");
    let again = play(&small(3)).await.expect("table");

    assert_eq!(first.players, again.players);
    assert_eq!(first.log, again.log);
}

#[tokio::test]
async fn shuffle_alternates_seats() {
    let outcome = play(&small(4)).await.expect("table");
    let order = &outcome.players[0].turn_order.order;
    let posters: Vec<&str> =
        outcome.log[4..8].iter().map(|entry| entry.action.client_id.as_str()).collect();

    let (first, second) = (order[0].as_str(), order[1].as_str());
    assert_eq!(posters, [first, second, first, second]);
}

#[tokio::test]
async fn oversized_hand_is_rejected_before_dealing() {
    let config = SimConfig { hand_size: 27, ..small(5) };

    assert!(matches!(config.validate(), Err(ProtocolError::InvalidState { .. })));
    assert!(matches!(play(&config).await, Err(ProtocolError::InvalidState { .. })));
}

#[test]
fn narrow_prime_is_rejected() {
    let config = SimConfig { prime_bytes: 8, ..small(6) };
    assert!(matches!(config.validate(), Err(ProtocolError::InvalidState { .. })));
    assert!(SimConfig::default().validate().is_ok());
}

#[tokio::test]
async fn deal_refuses_more_cards_than_remain() {
    let transport = MemoryTransport::<Action>::new();
    let queue = Queue::new(transport.clone());
    let order =
        TurnOrder { prime: BigUint::from(1019u32), order: vec!["alice".into(), "bob".into()] };
    let empty =
        Deck::new(ShuffledDeck { deck: Vec::new(), private_keys: Vec::new() }).expect("deck");

    let dealt = deal("alice", &order, empty, 1, &queue).await;

    assert!(matches!(dealt, Err(ProtocolError::InvalidState { .. })));
    assert!(transport.is_empty());
}

#[tokio::test]
async fn failing_participant_ends_the_table() {
    // Key generation fails inside the shuffle; the peer must not be left
    // waiting for a round that never gets posted.
    let config = SimConfig { key_bytes: 0, ..small(7) };

    assert!(matches!(
        play(&config).await,
        Err(ProtocolError::Crypto(CryptoError::InvalidLength { .. }))
    ));
}
