//! Alternation between machines.

use super::{Outbox, StateMachine};
use crate::error::ProtocolError;

/// Boxed branch of a [`Fork`].
pub type Branch<A, C> = Box<dyn StateMachine<A, C> + Send>;

/// Offers each action to its branches until one accepts, then follows that
/// branch alone.
///
/// Branches are tried in the order given. A branch that rejects is reset, so
/// it does not keep partial progress. Branches should open with a transition:
/// before a branch is chosen nothing is advanced.
pub struct Fork<A, C> {
    branches: Vec<Branch<A, C>>,
    selected: Option<usize>,
}

impl<A, C> Fork<A, C> {
    /// Creates a fork over `branches`.
    pub fn new(branches: Vec<Branch<A, C>>) -> Self {
        Self { branches, selected: None }
    }

    /// Index of the branch this fork has bound to.
    pub fn selected(&self) -> Option<usize> {
        self.selected
    }
}

impl<A, C> std::fmt::Debug for Fork<A, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fork")
            .field("branches", &self.branches.len())
            .field("selected", &self.selected)
            .finish()
    }
}

impl<A, C> StateMachine<A, C> for Fork<A, C> {
    fn advance(&mut self, outbox: &mut Outbox<A>, context: &mut C) -> Result<(), ProtocolError> {
        match self.selected {
            Some(i) => self.branches[i].advance(outbox, context),
            None => Ok(()),
        }
    }

    fn accept(&mut self, action: &A, context: &mut C) -> Result<(), ProtocolError> {
        if let Some(i) = self.selected {
            return self.branches[i].accept(action, context);
        }

        for (i, branch) in self.branches.iter_mut().enumerate() {
            match branch.accept(action, context) {
                Ok(()) => {
                    tracing::debug!(branch = i, "fork bound");
                    self.selected = Some(i);
                    return Ok(());
                },
                Err(e) => {
                    tracing::debug!(branch = i, error = %e, "fork branch rejected action");
                    branch.reset();
                },
            }
        }

        Err(ProtocolError::NoBranchAccepted { branches: self.branches.len() })
    }

    fn done(&self) -> bool {
        self.selected.is_some_and(|i| self.branches[i].done())
    }

    fn reset(&mut self) {
        for branch in &mut self.branches {
            branch.reset();
        }
        self.selected = None;
    }
}
