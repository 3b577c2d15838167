//! Driving a machine against a queue.

use super::{Outbox, StateMachine};
use crate::error::ProtocolError;
use crate::queue::Queue;
use crate::transport::Transport;

/// Runs `machine` until it is done.
///
/// Alternates between running local steps (posting whatever they emit) and
/// feeding the next dequeued action to the waiting transition. The first
/// error aborts the run and is returned as is. On success the machine is
/// reset so it can be run again.
///
/// There is no timeout: with no further actions in the log this waits
/// forever. Callers that need one wrap the returned future.
pub async fn run<T, C, M>(
    machine: &mut M,
    queue: &Queue<T>,
    context: &mut C,
) -> Result<(), ProtocolError>
where
    T: Transport,
    M: StateMachine<T::Action, C> + ?Sized,
{
    let mut outbox = Outbox::new();
    let mut consumed = 0usize;

    loop {
        machine.advance(&mut outbox, context)?;
        for action in outbox.drain() {
            queue.enqueue(action).await?;
        }

        if machine.done() {
            break;
        }

        let action = queue.dequeue().await?;
        machine.accept(&action, context).inspect_err(|e| {
            tracing::warn!(position = queue.position() - 1, error = %e, "action rejected");
        })?;
        consumed += 1;
    }

    tracing::debug!(consumed, "machine finished");
    machine.reset();
    Ok(())
}
