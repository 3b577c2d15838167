//! Two-player table simulation.
//!
//! Runs the full lifecycle for two participants sharing one in-memory log:
//! key exchange, turn order, shuffle of a standard deck, then a deal where
//! each card is opened for its receiver by the other participant revealing
//! a per-item key.
//!
//! Both participants run on the current task through `tokio::try_join!`, so
//! a seed fixes the entire log, and the first participant to fail ends the
//! table instead of leaving the other waiting on a log that stopped.

use deckhand_client::{
    Seat, SessionConfig, TurnOrder, establish_turn_order, generate_client_id, shuffle,
    upgrade_transport,
};
use deckhand_core::{
    MemoryTransport, Outbox, ProtocolError, Queue, Sequence, Step, Transport, local, run, sequence,
    transition,
};
use deckhand_crypto::SraKeyPair;
use deckhand_proto::{Action, ActionBody, ActionKind, ClientId, Signed};

use crate::deck::{Deck, encode_deck, standard_deck};
use crate::sim_env::SimEnv;

/// Parameters of one simulated table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimConfig {
    /// Seed every random draw derives from.
    pub seed: u64,
    /// Shared prime size, in bytes.
    pub prime_bytes: usize,
    /// SRA exponent size, in bytes.
    pub key_bytes: usize,
    /// Cards dealt to each player.
    pub hand_size: usize,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self { seed: 0, prime_bytes: 32, key_bytes: 32, hand_size: 5 }
    }
}

impl SimConfig {
    /// Checks that a table with these parameters can finish.
    ///
    /// # Errors
    ///
    /// - `ProtocolError::InvalidState` if the deal needs more cards than
    ///   the deck holds, or if the prime is too narrow to encrypt every card
    pub fn validate(&self) -> Result<(), ProtocolError> {
        let deck = standard_deck();

        let dealt = self.hand_size.checked_mul(2).filter(|cards| *cards <= deck.len());
        if dealt.is_none() {
            return Err(ProtocolError::invalid_state(format!(
                "hand size {} needs more than the {} cards in the deck",
                self.hand_size,
                deck.len()
            )));
        }

        // Primes have their top bit set, so one spare byte keeps every card
        // below the prime.
        let widest = deck.iter().map(String::len).max().unwrap_or(0);
        if self.prime_bytes <= widest {
            return Err(ProtocolError::invalid_state(format!(
                "a {}-byte prime cannot encrypt {widest}-byte cards",
                self.prime_bytes
            )));
        }

        Ok(())
    }

    fn session(&self) -> SessionConfig {
        SessionConfig { players: 2, prime_bytes: self.prime_bytes, key_bytes: self.key_bytes }
    }
}

/// What one participant ends up seeing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerView {
    /// The participant.
    pub client_id: ClientId,
    /// Agreed seats and prime.
    pub turn_order: TurnOrder,
    /// Own cards, opened, in the order dealt.
    pub hand: Vec<String>,
    /// Deck positions the other participant holds.
    pub others_hand: Vec<usize>,
}

/// Result of a table run.
#[derive(Debug, Clone)]
pub struct TableOutcome {
    /// One view per participant, in the order they were created.
    pub players: [PlayerView; 2],
    /// Every entry on the shared log.
    pub log: Vec<Signed<Action>>,
}

/// Runs a whole table from `config.seed`.
pub async fn play(config: &SimConfig) -> Result<TableOutcome, ProtocolError> {
    config.validate()?;
    let raw = MemoryTransport::new();

    let envs = [SimEnv::with_seed(config.seed), SimEnv::with_seed(config.seed.wrapping_add(1))];
    let first = generate_client_id(&envs[0]);
    let mut second = generate_client_id(&envs[1]);
    if second == first {
        second.push_str("-2");
    }

    tracing::info!(seed = config.seed, %first, %second, "table opening");

    let (a, b) = tokio::try_join!(
        participant(config, first, raw.clone(), &envs[0]),
        participant(config, second, raw.clone(), &envs[1]),
    )?;

    Ok(TableOutcome { players: [a, b], log: raw.entries() })
}

async fn participant(
    config: &SimConfig,
    client_id: ClientId,
    raw: MemoryTransport<Signed<Action>>,
    env: &SimEnv,
) -> Result<PlayerView, ProtocolError> {
    let session = config.session();

    let upgraded = upgrade_transport(&session, client_id.clone(), raw, env).await?;
    let queue = &upgraded.queue;

    let turn_order = establish_turn_order(&session, &client_id, env, queue).await?;
    let items = encode_deck(&standard_deck())?;
    let shuffled = shuffle(&session, &client_id, &turn_order, items, env, queue).await?;

    let deck = Deck::new(shuffled)?;
    let mut deck = deal(&client_id, &turn_order, deck, config.hand_size, queue).await?;

    let mut hand = Vec::with_capacity(deck.my_hand().len());
    for index in deck.my_hand().to_vec() {
        let card = deck
            .card_at(index)?
            .ok_or_else(|| ProtocolError::invalid_state(format!("card {index} still locked")))?;
        hand.push(card.to_owned());
    }

    tracing::info!(%client_id, ?hand, "hand opened");
    Ok(PlayerView { client_id, turn_order, hand, others_hand: deck.others_hand().to_vec() })
}

/// Context for the deal machine.
#[derive(Debug)]
pub struct DealContext {
    client_id: ClientId,
    seat: Seat,
    seats: [ClientId; 2],
    deck: Deck,
}

fn seat_index(seat: Seat) -> usize {
    match seat {
        Seat::First => 0,
        Seat::Second => 1,
    }
}

fn other(seat: Seat) -> Seat {
    match seat {
        Seat::First => Seat::Second,
        Seat::Second => Seat::First,
    }
}

/// Deal of `cards` cards alternating from the first seat.
///
/// For each card the giver (the seat not receiving it) posts `RevealKey`
/// for the top of the draw pile; both sides then draw it, and the receiver
/// files it with the revealed key.
pub fn deal_sequence(cards: usize) -> Sequence<Action, DealContext> {
    sequence((0..cards).map(|k| {
        let receiver = if k % 2 == 0 { Seat::First } else { Seat::Second };
        vec![reveal_step(receiver), take_step(receiver)]
    }))
}

fn reveal_step(receiver: Seat) -> Step<Action, DealContext> {
    local(move |out: &mut Outbox<Action>, ctx: &mut DealContext| {
        if ctx.seat == receiver {
            return Ok(());
        }

        let index =
            ctx.deck.peek().ok_or_else(|| ProtocolError::invalid_state("no cards to deal"))?;
        let key = ctx.deck.key(index)?.into();
        out.post(Action::new(ctx.client_id.clone(), ActionBody::RevealKey { index, key }));
        Ok(())
    })
}

fn take_step(receiver: Seat) -> Step<Action, DealContext> {
    transition(move |action: &Action, ctx: &mut DealContext| {
        let ActionBody::RevealKey { index, key } = &action.body else {
            return Err(ProtocolError::UnexpectedAction {
                expected: ActionKind::RevealKey,
                actual: action.kind(),
            });
        };

        let giver = &ctx.seats[seat_index(other(receiver))];
        if action.client_id != *giver {
            return Err(ProtocolError::UnexpectedSender {
                expected: giver.clone(),
                actual: action.client_id.clone(),
            });
        }

        let drawn = ctx.deck.draw()?;
        if drawn != *index {
            return Err(ProtocolError::invalid_state(format!(
                "revealed key for card {index}, top of pile is {drawn}"
            )));
        }

        if ctx.seat == receiver {
            ctx.deck.put_in_my_hand(drawn, SraKeyPair::try_from(key)?)?;
        } else {
            ctx.deck.put_in_others_hand(drawn)?;
        }
        Ok(())
    })
}

/// Deals `hand_size` cards to each seat over `queue`, handing the deck
/// back with both hands filled.
///
/// # Errors
///
/// - `ProtocolError::InvalidState` if the draw pile cannot cover both
///   hands. Nothing is posted in that case, so the other participant fails
///   the same check instead of waiting for a key.
pub async fn deal<T>(
    client_id: &str,
    turn_order: &TurnOrder,
    deck: Deck,
    hand_size: usize,
    queue: &Queue<T>,
) -> Result<Deck, ProtocolError>
where
    T: Transport<Action = Action>,
{
    let [first, second] = turn_order.order.as_slice() else {
        return Err(ProtocolError::UnsupportedPlayerCount { players: turn_order.order.len() });
    };
    let seat = if turn_order.is_first(client_id) { Seat::First } else { Seat::Second };

    let remaining = deck.remaining();
    let cards = hand_size.checked_mul(2).filter(|cards| *cards <= remaining).ok_or_else(|| {
        ProtocolError::invalid_state(format!("cannot deal {hand_size} cards each from {remaining}"))
    })?;

    let mut context = DealContext {
        client_id: client_id.to_owned(),
        seat,
        seats: [first.clone(), second.clone()],
        deck,
    };
    let mut machine = deal_sequence(cards);
    run(&mut machine, queue, &mut context).await?;

    tracing::debug!(client_id, cards, "deal complete");
    Ok(context.deck)
}
