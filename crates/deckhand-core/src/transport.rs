//! Ordered, append-only action logs.
//!
//! A [`Transport`] is the only channel between participants. Every
//! participant observes the same entries in the same order, and entries are
//! addressed by their position in the log (starting at zero).

use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::TransportError;

/// One log entry as a consumer sees it.
///
/// A layer that checks entries (signature verification, decoding) turns a
/// bad entry into an `Err` in place, so the entries around it keep their
/// positions.
pub type Entry<A> = Result<A, TransportError>;

/// Live feed of newly appended entries.
#[async_trait]
pub trait Subscription<A>: Send {
    /// Waits for the next entry.
    ///
    /// Returns `None` once the log will deliver nothing further. An `Err`
    /// consumes its entry: the next call moves on to the following one.
    async fn recv(&mut self) -> Option<Entry<A>>;
}

#[async_trait]
impl<A: Send + 'static> Subscription<A> for mpsc::UnboundedReceiver<A> {
    async fn recv(&mut self) -> Option<Entry<A>> {
        mpsc::UnboundedReceiver::recv(self).await.map(Ok)
    }
}

/// Shared ordered log of actions.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Entry type.
    type Action: Clone + Send + Sync + 'static;

    /// Live feed handed out by [`Transport::subscribe`].
    type Subscription: Subscription<Self::Action>;

    /// Appends `action` to the log.
    async fn post_action(&self, action: Self::Action) -> Result<(), TransportError>;

    /// Entries from position `from` to the current end.
    ///
    /// The outer `Err` means the history could not be read at all. A single
    /// bad entry is reported in its own slot and does not affect the rest.
    fn replay(&self, from: usize) -> Result<Vec<Entry<Self::Action>>, TransportError>;

    /// Feed of every entry appended after this call.
    fn subscribe(&self) -> Self::Subscription;

    /// Number of entries appended so far.
    fn len(&self) -> usize;

    /// Whether the log is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// History from `from` plus a feed of everything after it, with no entry
    /// missed or seen twice.
    ///
    /// The default subscribes before replaying, which is only gap-free when
    /// nothing is posted concurrently. Logs shared between threads override
    /// it.
    fn replay_and_subscribe(
        &self,
        from: usize,
    ) -> Result<(Vec<Entry<Self::Action>>, Self::Subscription), TransportError> {
        let subscription = self.subscribe();
        let history = self.replay(from)?;
        Ok((history, subscription))
    }
}

struct Log<T> {
    entries: Vec<T>,
    subscribers: Vec<mpsc::UnboundedSender<T>>,
}

/// In-process log shared by cloning.
///
/// Every clone appends to and reads from the same entries, so one
/// `MemoryTransport` per participant models a table on a single machine.
pub struct MemoryTransport<T> {
    log: Arc<Mutex<Log<T>>>,
}

impl<T> Clone for MemoryTransport<T> {
    fn clone(&self) -> Self {
        Self { log: Arc::clone(&self.log) }
    }
}

impl<T> std::fmt::Debug for MemoryTransport<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let log = self.log.lock().unwrap_or_else(PoisonError::into_inner);
        f.debug_struct("MemoryTransport")
            .field("entries", &log.entries.len())
            .field("subscribers", &log.subscribers.len())
            .finish()
    }
}

impl<T> Default for MemoryTransport<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> MemoryTransport<T> {
    /// Creates an empty log.
    pub fn new() -> Self {
        Self { log: Arc::new(Mutex::new(Log { entries: Vec::new(), subscribers: Vec::new() })) }
    }
}

impl<T: Clone> MemoryTransport<T> {
    /// Appends without the async wrapper.
    ///
    /// Subscribers whose receivers were dropped are pruned.
    pub fn append(&self, entry: T) {
        let mut log = self.log.lock().unwrap_or_else(PoisonError::into_inner);
        log.subscribers.retain(|tx| tx.send(entry.clone()).is_ok());
        log.entries.push(entry);
    }

    /// Copy of every entry so far.
    pub fn entries(&self) -> Vec<T> {
        self.log.lock().unwrap_or_else(PoisonError::into_inner).entries.clone()
    }
}

#[async_trait]
impl<T> Transport for MemoryTransport<T>
where
    T: Clone + Send + Sync + 'static,
{
    type Action = T;
    type Subscription = mpsc::UnboundedReceiver<T>;

    async fn post_action(&self, action: T) -> Result<(), TransportError> {
        self.append(action);
        Ok(())
    }

    fn replay(&self, from: usize) -> Result<Vec<Entry<T>>, TransportError> {
        let log = self.log.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(history(&log.entries, from))
    }

    fn subscribe(&self) -> Self::Subscription {
        let (tx, rx) = mpsc::unbounded_channel();
        self.log.lock().unwrap_or_else(PoisonError::into_inner).subscribers.push(tx);
        rx
    }

    fn len(&self) -> usize {
        self.log.lock().unwrap_or_else(PoisonError::into_inner).entries.len()
    }

    fn replay_and_subscribe(
        &self,
        from: usize,
    ) -> Result<(Vec<Entry<T>>, Self::Subscription), TransportError> {
        // One lock covers both halves, so no append can fall between them.
        let mut log = self.log.lock().unwrap_or_else(PoisonError::into_inner);
        let history = history(&log.entries, from);
        let (tx, rx) = mpsc::unbounded_channel();
        log.subscribers.push(tx);
        Ok((history, rx))
    }
}

fn history<T: Clone>(entries: &[T], from: usize) -> Vec<Entry<T>> {
    entries.get(from..).unwrap_or_default().iter().cloned().map(Ok).collect()
}
