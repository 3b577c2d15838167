//! Chaining two machines.

use super::{Outbox, StateMachine};
use crate::error::ProtocolError;

/// Runs `first` to completion, then `second`.
#[derive(Debug, Clone)]
pub struct Connection<M1, M2> {
    first: M1,
    second: M2,
}

impl<M1, M2> Connection<M1, M2> {
    /// Chains `second` after `first`.
    pub fn new(first: M1, second: M2) -> Self {
        Self { first, second }
    }
}

impl<A, C, M1, M2> StateMachine<A, C> for Connection<M1, M2>
where
    M1: StateMachine<A, C>,
    M2: StateMachine<A, C>,
{
    fn advance(&mut self, outbox: &mut Outbox<A>, context: &mut C) -> Result<(), ProtocolError> {
        self.first.advance(outbox, context)?;
        if self.first.done() {
            self.second.advance(outbox, context)?;
        }
        Ok(())
    }

    fn accept(&mut self, action: &A, context: &mut C) -> Result<(), ProtocolError> {
        if self.first.done() {
            self.second.accept(action, context)
        } else {
            self.first.accept(action, context)
        }
    }

    fn done(&self) -> bool {
        self.first.done() && self.second.done()
    }

    fn reset(&mut self) {
        self.first.reset();
        self.second.reset();
    }
}
