//! Consumer-side view of a transport.
//!
//! A [`Queue`] turns a push-style feed into pull-style `dequeue` calls. Each
//! entry is handed to exactly one `dequeue` call, in log order, and
//! concurrent callers are served in the order they started waiting.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::Mutex;

use crate::error::TransportError;
use crate::transport::{Entry, Subscription, Transport};

struct Inbox<A, S> {
    // Preseeded history. Bad entries keep their slot as an `Err`.
    buffered: VecDeque<Entry<A>>,
    subscription: S,
}

/// Pull interface over a [`Transport`].
pub struct Queue<T: Transport> {
    transport: T,
    // tokio's mutex is fair: waiters acquire it in FIFO order.
    inbox: Mutex<Inbox<T::Action, T::Subscription>>,
    position: AtomicUsize,
}

impl<T: Transport> std::fmt::Debug for Queue<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Queue").field("position", &self.position()).finish_non_exhaustive()
    }
}

impl<T: Transport> Queue<T> {
    /// Queue that sees only entries appended from now on.
    pub fn new(transport: T) -> Self {
        let position = transport.len();
        let subscription = transport.subscribe();
        Self::assemble(transport, VecDeque::new(), subscription, position)
    }

    /// Queue that first yields the whole existing log.
    pub fn with_history(transport: T) -> Result<Self, TransportError> {
        Self::resume(transport, 0)
    }

    /// Queue that first yields the log from `position` onwards.
    ///
    /// Used to hand a log over between protocol phases: the next phase
    /// resumes exactly where the previous one stopped consuming. A history
    /// entry that fails its checks does not fail the resume; `dequeue`
    /// reports it in its turn, as a live subscription would.
    pub fn resume(transport: T, position: usize) -> Result<Self, TransportError> {
        let (history, subscription) = transport.replay_and_subscribe(position)?;
        Ok(Self::assemble(transport, history.into(), subscription, position))
    }

    fn assemble(
        transport: T,
        buffered: VecDeque<Entry<T::Action>>,
        subscription: T::Subscription,
        position: usize,
    ) -> Self {
        Self {
            transport,
            inbox: Mutex::new(Inbox { buffered, subscription }),
            position: AtomicUsize::new(position),
        }
    }

    /// Posts `action` to the underlying transport.
    pub async fn enqueue(&self, action: T::Action) -> Result<(), TransportError> {
        self.transport.post_action(action).await
    }

    /// Waits for the next entry.
    ///
    /// # Errors
    ///
    /// - `TransportError::Closed` once the feed has ended
    /// - Whatever the subscription reports for a bad entry. That entry is
    ///   consumed, not retried.
    pub async fn dequeue(&self) -> Result<T::Action, TransportError> {
        let mut inbox = self.inbox.lock().await;

        let next = match inbox.buffered.pop_front() {
            Some(entry) => entry,
            None => inbox.subscription.recv().await.ok_or(TransportError::Closed)?,
        };

        self.position.fetch_add(1, Ordering::SeqCst);
        next
    }

    /// Log position of the next entry `dequeue` will return.
    pub fn position(&self) -> usize {
        self.position.load(Ordering::SeqCst)
    }

    /// Underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Gives back the transport, dropping undelivered entries.
    pub fn into_transport(self) -> T {
        self.transport
    }
}
