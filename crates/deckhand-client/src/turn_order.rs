//! Turn order and shared prime agreement.
//!
//! Every participant proposes a fresh prime and claims a seat. The first
//! proposal in the log becomes the session prime; seats are assigned in
//! arrival order.

use deckhand_core::{
    Environment, Outbox, ProtocolError, Queue, Sequence, Transport, local, repeat, run, sequence,
    transition,
};
use deckhand_crypto::{BigUint, bigint_to_string, random_prime, string_to_bigint};
use deckhand_proto::{Action, ActionBody, ActionKind, ClientId};

use crate::config::SessionConfig;

/// Outcome of turn order establishment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnOrder {
    /// Shared SRA prime for the session.
    pub prime: BigUint,
    /// Participants in seat order.
    pub order: Vec<ClientId>,
}

impl TurnOrder {
    /// Seat of `client_id`, if seated.
    pub fn seat_of(&self, client_id: &str) -> Option<usize> {
        self.order.iter().position(|id| id == client_id)
    }

    /// Whether `client_id` moves first.
    pub fn is_first(&self, client_id: &str) -> bool {
        self.seat_of(client_id) == Some(0)
    }
}

/// Context threaded through the turn order machine.
#[derive(Debug, Clone)]
pub struct TurnOrderContext {
    client_id: ClientId,
    proposal: String,
    prime: Option<BigUint>,
    order: Vec<ClientId>,
}

impl TurnOrderContext {
    /// Context proposing `proposal` (decimal) on behalf of `client_id`.
    pub fn new(client_id: impl Into<ClientId>, proposal: String) -> Self {
        Self { client_id: client_id.into(), proposal, prime: None, order: Vec::new() }
    }

    /// Agreed result, once every participant has posted.
    pub fn outcome(&self) -> Result<TurnOrder, ProtocolError> {
        let prime = self
            .prime
            .clone()
            .ok_or_else(|| ProtocolError::invalid_state("no prime was proposed"))?;
        Ok(TurnOrder { prime, order: self.order.clone() })
    }
}

/// Builds the turn order machine for `players` participants.
pub fn turn_order_sequence(players: usize) -> Sequence<Action, TurnOrderContext> {
    sequence([
        vec![local(|out: &mut Outbox<Action>, ctx: &mut TurnOrderContext| {
            out.post(Action::new(
                ctx.client_id.clone(),
                ActionBody::EstablishTurnOrder { prime: ctx.proposal.clone() },
            ));
            Ok(())
        })],
        repeat(transition(accept_seat), players),
    ])
}

fn accept_seat(action: &Action, ctx: &mut TurnOrderContext) -> Result<(), ProtocolError> {
    let ActionBody::EstablishTurnOrder { prime } = &action.body else {
        return Err(ProtocolError::UnexpectedAction {
            expected: ActionKind::EstablishTurnOrder,
            actual: action.kind(),
        });
    };

    if action.client_id.is_empty() {
        return Err(ProtocolError::MissingClientId);
    }
    if ctx.order.contains(&action.client_id) {
        return Err(ProtocolError::DuplicateParticipant { client_id: action.client_id.clone() });
    }

    // Later proposals are still parsed so a malformed one is caught.
    let proposed = string_to_bigint(prime)?;
    if ctx.order.is_empty() {
        ctx.prime = Some(proposed);
    }

    ctx.order.push(action.client_id.clone());
    Ok(())
}

/// Agrees on a shared prime and a seat order with every participant.
pub async fn establish_turn_order<T, E>(
    config: &SessionConfig,
    client_id: &str,
    env: &E,
    queue: &Queue<T>,
) -> Result<TurnOrder, ProtocolError>
where
    T: Transport<Action = Action>,
    E: Environment,
{
    let proposal = random_prime(&mut env.rng(), config.prime_bytes)?;
    let mut context = TurnOrderContext::new(client_id, bigint_to_string(&proposal));

    let mut machine = turn_order_sequence(config.players);
    run(&mut machine, queue, &mut context).await?;

    let outcome = context.outcome()?;
    tracing::info!(client_id, order = ?outcome.order, "turn order established");
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use deckhand_core::StateMachine;

    use super::*;

    fn seat(client_id: &str, prime: &str) -> Action {
        Action::new(client_id, ActionBody::EstablishTurnOrder { prime: prime.into() })
    }

    fn running(players: usize) -> (Sequence<Action, TurnOrderContext>, TurnOrderContext) {
        let mut ctx = TurnOrderContext::new("alice", "1019".into());
        let mut machine = turn_order_sequence(players);
        machine.advance(&mut Outbox::new(), &mut ctx).expect("advance");
        (machine, ctx)
    }

    #[test]
    fn first_proposal_wins_and_seats_follow_arrival() {
        let (mut machine, mut ctx) = running(2);

        machine.accept(&seat("bob", "1031"), &mut ctx).expect("bob");
        machine.accept(&seat("alice", "1019"), &mut ctx).expect("alice");

        let outcome = ctx.outcome().expect("outcome");
        assert_eq!(outcome.prime, BigUint::from(1031u32));
        assert_eq!(outcome.order, ["bob", "alice"]);
        assert!(outcome.is_first("bob"));
        assert_eq!(outcome.seat_of("alice"), Some(1));
        assert_eq!(outcome.seat_of("carol"), None);
    }

    #[test]
    fn repeated_seat_is_rejected() {
        let (mut machine, mut ctx) = running(2);

        machine.accept(&seat("bob", "1031"), &mut ctx).expect("bob");
        assert!(matches!(
            machine.accept(&seat("bob", "1033"), &mut ctx),
            Err(ProtocolError::DuplicateParticipant { .. })
        ));
    }

    #[test]
    fn malformed_prime_is_crypto_failure() {
        let (mut machine, mut ctx) = running(2);

        let err = machine.accept(&seat("bob", "0x1f"), &mut ctx).expect_err("malformed");
        assert_eq!(err.kind(), deckhand_core::ErrorKind::CryptoFailure);
    }

    #[test]
    fn outcome_before_any_seat_is_invalid() {
        let (_, ctx) = running(2);
        assert!(matches!(ctx.outcome(), Err(ProtocolError::InvalidState { .. })));
    }
}
