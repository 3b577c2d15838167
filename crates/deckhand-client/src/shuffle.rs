//! Two-party mental poker shuffle.
//!
//! Runs as four local/transition pairs, two per round. The seat holder named
//! in each pair moves; the other participant only ingests the posted deck.
//!
//! 1. First seat encrypts every item under its own common key, permutes,
//!    posts `ShuffleRound1`.
//! 2. Second seat does the same on top, posts `ShuffleRound1`.
//! 3. First seat removes its common layer and re-encrypts each position
//!    under a fresh per-item key, posts `ShuffleRound2`.
//! 4. Second seat does the same, posts `ShuffleRound2`.
//!
//! Afterwards the deck is a list of opaque ciphertexts. Position `i` opens
//! only with both participants' per-item keys for `i`.
//!
//! # Invariants
//!
//! - Both common layers are applied before either is removed
//! - Deck size never changes between rounds
//! - Only the seat whose turn it is may post a round

use deckhand_core::{
    Environment, Outbox, ProtocolError, Queue, Sequence, Step, Transport, local, run, sequence,
    transition,
};
use deckhand_crypto::SraKeyPair;
use deckhand_proto::{Action, ActionBody, ActionKind, ClientId};
use rand::seq::SliceRandom;

use crate::config::SessionConfig;
use crate::keys::KeyProvider;
use crate::turn_order::TurnOrder;

/// One of the two shuffle seats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Seat {
    /// Moves first in each round.
    First,
    /// Moves second in each round.
    Second,
}

impl Seat {
    fn index(self) -> usize {
        match self {
            Self::First => 0,
            Self::Second => 1,
        }
    }
}

/// Outcome of a shuffle.
#[derive(Debug, Clone)]
pub struct ShuffledDeck {
    /// Ciphertexts in final deck order, decimal encoded.
    pub deck: Vec<String>,
    /// Local per-item keys, aligned with `deck`.
    pub private_keys: Vec<SraKeyPair>,
}

/// Context threaded through the shuffle machine.
pub struct ShuffleContext<E> {
    client_id: ClientId,
    seats: [ClientId; 2],
    seat: Seat,
    deck: Vec<String>,
    keys: KeyProvider,
    env: E,
    common_key: Option<SraKeyPair>,
    private_keys: Vec<SraKeyPair>,
}

impl<E> std::fmt::Debug for ShuffleContext<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShuffleContext")
            .field("client_id", &self.client_id)
            .field("seat", &self.seat)
            .field("deck_len", &self.deck.len())
            .finish_non_exhaustive()
    }
}

impl<E: Environment> ShuffleContext<E> {
    /// Seats `client_id` according to `turn_order` with `deck` as input.
    ///
    /// # Errors
    ///
    /// - `ProtocolError::UnsupportedPlayerCount` unless exactly two are
    ///   seated
    /// - `ProtocolError::InvalidState` if `client_id` is not seated
    pub fn new(
        config: &SessionConfig,
        client_id: &str,
        turn_order: &TurnOrder,
        deck: Vec<String>,
        env: E,
    ) -> Result<Self, ProtocolError> {
        let [first, second] = turn_order.order.as_slice() else {
            return Err(ProtocolError::UnsupportedPlayerCount { players: turn_order.order.len() });
        };

        let seat = match turn_order.seat_of(client_id) {
            Some(0) => Seat::First,
            Some(_) => Seat::Second,
            None => {
                return Err(ProtocolError::invalid_state(format!("{client_id} is not seated")));
            },
        };

        Ok(Self {
            client_id: client_id.to_owned(),
            seats: [first.clone(), second.clone()],
            seat,
            deck,
            keys: KeyProvider::new(turn_order.prime.clone(), config.key_bytes),
            env,
            common_key: None,
            private_keys: Vec::new(),
        })
    }

    /// Seat this participant holds.
    pub fn seat(&self) -> Seat {
        self.seat
    }

    /// Shuffle outcome, once both rounds have run.
    pub fn outcome(&self) -> Result<ShuffledDeck, ProtocolError> {
        if self.private_keys.len() != self.deck.len() {
            return Err(ProtocolError::invalid_state("shuffle has not completed"));
        }
        Ok(ShuffledDeck { deck: self.deck.clone(), private_keys: self.private_keys.clone() })
    }

    fn encrypt_and_permute(&mut self) -> Result<(), ProtocolError> {
        let mut rng = self.env.rng();
        let common_key = self.keys.make(&mut rng)?;

        let mut deck = self
            .deck
            .iter()
            .map(|item| common_key.encrypt_item(item))
            .collect::<Result<Vec<_>, _>>()?;
        deck.shuffle(&mut rng);

        self.deck = deck;
        self.common_key = Some(common_key);
        Ok(())
    }

    fn lock_each_item(&mut self) -> Result<(), ProtocolError> {
        let common_key = self
            .common_key
            .take()
            .ok_or_else(|| ProtocolError::invalid_state("common key missing in round two"))?;
        let private_keys = self.keys.make_many(&mut self.env.rng(), self.deck.len())?;

        let deck = self
            .deck
            .iter()
            .zip(&private_keys)
            .map(|(item, key)| {
                let bare = common_key.decrypt_item(item)?;
                key.encrypt_item(&bare)
            })
            .collect::<Result<Vec<_>, _>>()?;

        self.deck = deck;
        self.private_keys = private_keys;
        Ok(())
    }
}

fn move_step<E, F>(mover: Seat, kind: ActionKind, apply: F) -> Step<Action, ShuffleContext<E>>
where
    E: Environment,
    F: Fn(&mut ShuffleContext<E>) -> Result<(), ProtocolError> + Send + Sync + 'static,
{
    local(move |out: &mut Outbox<Action>, ctx: &mut ShuffleContext<E>| {
        if ctx.seat != mover {
            return Ok(());
        }

        apply(ctx)?;
        let deck = ctx.deck.clone();
        let body = match kind {
            ActionKind::ShuffleRound1 => ActionBody::ShuffleRound1 { deck },
            _ => ActionBody::ShuffleRound2 { deck },
        };
        out.post(Action::new(ctx.client_id.clone(), body));
        Ok(())
    })
}

fn ingest_step<E: Environment>(mover: Seat, kind: ActionKind) -> Step<Action, ShuffleContext<E>> {
    transition(move |action: &Action, ctx: &mut ShuffleContext<E>| {
        let deck = match (&action.body, kind) {
            (ActionBody::ShuffleRound1 { deck }, ActionKind::ShuffleRound1)
            | (ActionBody::ShuffleRound2 { deck }, ActionKind::ShuffleRound2) => deck,
            _ => {
                return Err(ProtocolError::UnexpectedAction {
                    expected: kind,
                    actual: action.kind(),
                });
            },
        };

        let expected = &ctx.seats[mover.index()];
        if action.client_id != *expected {
            return Err(ProtocolError::UnexpectedSender {
                expected: expected.clone(),
                actual: action.client_id.clone(),
            });
        }

        if deck.len() != ctx.deck.len() {
            return Err(ProtocolError::DeckSizeMismatch {
                expected: ctx.deck.len(),
                actual: deck.len(),
            });
        }

        ctx.deck.clone_from(deck);
        tracing::debug!(round = %kind, from = %action.client_id, "deck ingested");
        Ok(())
    })
}

/// Builds the shuffle machine.
pub fn shuffle_sequence<E: Environment>() -> Sequence<Action, ShuffleContext<E>> {
    use ActionKind::{ShuffleRound1, ShuffleRound2};

    sequence([
        move_step(Seat::First, ShuffleRound1, ShuffleContext::encrypt_and_permute),
        ingest_step(Seat::First, ShuffleRound1),
        move_step(Seat::Second, ShuffleRound1, ShuffleContext::encrypt_and_permute),
        ingest_step(Seat::Second, ShuffleRound1),
        move_step(Seat::First, ShuffleRound2, ShuffleContext::lock_each_item),
        ingest_step(Seat::First, ShuffleRound2),
        move_step(Seat::Second, ShuffleRound2, ShuffleContext::lock_each_item),
        ingest_step(Seat::Second, ShuffleRound2),
    ])
}

/// Shuffles `deck` with the other seated participant.
///
/// `deck` holds decimal encoded items (see
/// [`encode_item`](deckhand_crypto::encode_item)); every item must be below
/// the shared prime. Both participants pass decks of the same size; only
/// the first seat's items are used.
pub async fn shuffle<T, E>(
    config: &SessionConfig,
    client_id: &str,
    turn_order: &TurnOrder,
    deck: Vec<String>,
    env: &E,
    queue: &Queue<T>,
) -> Result<ShuffledDeck, ProtocolError>
where
    T: Transport<Action = Action>,
    E: Environment,
{
    let mut context = ShuffleContext::new(config, client_id, turn_order, deck, env.clone())?;
    let mut machine = shuffle_sequence();
    run(&mut machine, queue, &mut context).await?;

    let outcome = context.outcome()?;
    tracing::info!(
        client_id,
        seat = ?context.seat(),
        cards = outcome.deck.len(),
        "shuffle complete"
    );
    Ok(outcome)
}
