//! Composable protocol state machines.
//!
//! A protocol is written as a list of steps over a shared context `C`:
//!
//! - [`local`] steps run on this participant and may post actions to an
//!   [`Outbox`]
//! - [`transition`] steps consume the next action from the log
//!
//! Steps are grouped into a [`Sequence`], alternated with [`Fork`], and
//! chained with [`Connection`]. [`run`] drives any of these against a
//! [`Queue`](crate::Queue) until the machine is done.
//!
//! # Invariants
//!
//! - Locals never consume input; transitions never run without input
//! - A step that fails leaves the cursor where it was
//! - A fork binds to the first branch that accepts an action and never
//!   switches afterwards

mod connection;
mod fork;
mod run;
mod sequence;

use std::sync::Arc;

pub use connection::Connection;
pub use fork::Fork;
pub use run::run;
pub use sequence::Sequence;

use crate::error::ProtocolError;

/// Body of a local step.
pub type LocalFn<A, C> =
    Arc<dyn Fn(&mut Outbox<A>, &mut C) -> Result<(), ProtocolError> + Send + Sync>;

/// Body of a transition step.
pub type TransitionFn<A, C> = Arc<dyn Fn(&A, &mut C) -> Result<(), ProtocolError> + Send + Sync>;

/// One step of a [`Sequence`].
pub enum Step<A, C> {
    /// Runs without input, may post actions.
    Local(LocalFn<A, C>),
    /// Consumes exactly one action.
    Transition(TransitionFn<A, C>),
}

impl<A, C> Clone for Step<A, C> {
    fn clone(&self) -> Self {
        match self {
            Self::Local(f) => Self::Local(Arc::clone(f)),
            Self::Transition(f) => Self::Transition(Arc::clone(f)),
        }
    }
}

impl<A, C> std::fmt::Debug for Step<A, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Local(_) => f.write_str("Local"),
            Self::Transition(_) => f.write_str("Transition"),
        }
    }
}

impl<A, C> From<Step<A, C>> for Vec<Step<A, C>> {
    fn from(step: Step<A, C>) -> Self {
        vec![step]
    }
}

/// Builds a local step.
pub fn local<A, C, F>(f: F) -> Step<A, C>
where
    F: Fn(&mut Outbox<A>, &mut C) -> Result<(), ProtocolError> + Send + Sync + 'static,
{
    Step::Local(Arc::new(f))
}

/// Builds a transition step.
pub fn transition<A, C, F>(f: F) -> Step<A, C>
where
    F: Fn(&A, &mut C) -> Result<(), ProtocolError> + Send + Sync + 'static,
{
    Step::Transition(Arc::new(f))
}

/// Repeats `step` `times` times.
pub fn repeat<A, C>(step: Step<A, C>, times: usize) -> Vec<Step<A, C>> {
    std::iter::repeat_n(step, times).collect()
}

/// Flattens single steps and step lists into one [`Sequence`].
pub fn sequence<A, C, I, S>(parts: I) -> Sequence<A, C>
where
    I: IntoIterator<Item = S>,
    S: Into<Vec<Step<A, C>>>,
{
    Sequence::new(parts.into_iter().flat_map(Into::into).collect())
}

/// Actions a local step asked to post.
///
/// The runner drains the outbox into the queue after every advance, so a
/// step's output reaches the log before the machine waits for input.
#[derive(Debug)]
pub struct Outbox<A> {
    pending: Vec<A>,
}

impl<A> Outbox<A> {
    /// Creates an empty outbox.
    pub fn new() -> Self {
        Self { pending: Vec::new() }
    }

    /// Queues `action` for posting.
    pub fn post(&mut self, action: A) {
        self.pending.push(action);
    }

    /// Number of queued actions.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Whether nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Takes every queued action in posting order.
    pub fn drain(&mut self) -> std::vec::Drain<'_, A> {
        self.pending.drain(..)
    }
}

impl<A> Default for Outbox<A> {
    fn default() -> Self {
        Self::new()
    }
}

/// A protocol that consumes actions from an ordered log.
pub trait StateMachine<A, C> {
    /// Runs every local step at the cursor, stopping at the next transition
    /// or the end.
    fn advance(&mut self, outbox: &mut Outbox<A>, context: &mut C) -> Result<(), ProtocolError>;

    /// Feeds one action to the transition at the cursor.
    ///
    /// # Errors
    ///
    /// Whatever the transition rejects with, plus
    /// [`ProtocolError::SequenceComplete`] when nothing is left to consume and
    /// [`ProtocolError::AwaitingLocalStep`] when a local step must run first.
    fn accept(&mut self, action: &A, context: &mut C) -> Result<(), ProtocolError>;

    /// Whether every step has run.
    fn done(&self) -> bool;

    /// Rewinds to the first step.
    fn reset(&mut self);
}

impl<A, C, M: StateMachine<A, C> + ?Sized> StateMachine<A, C> for Box<M> {
    fn advance(&mut self, outbox: &mut Outbox<A>, context: &mut C) -> Result<(), ProtocolError> {
        (**self).advance(outbox, context)
    }

    fn accept(&mut self, action: &A, context: &mut C) -> Result<(), ProtocolError> {
        (**self).accept(action, context)
    }

    fn done(&self) -> bool {
        (**self).done()
    }

    fn reset(&mut self) {
        (**self).reset();
    }
}
