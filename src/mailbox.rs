//! Mailbox: single-slot, latest-wins handoff between a job and the render loop.
//!
//! Each mailbox is a crossbeam channel of capacity one. Publishing never
//! blocks: if an unread value is still in the slot, the publisher evicts it
//! and retries, so the slot only ever holds the newest value. Taking never
//! blocks either.
//!
//! ```text
//! ┌────────────┐  publish   ┌─────────┐  try_take  ┌─────────────┐
//! │ Weather job│ ─────────▶ │ [ slot ]│ ─────────▶ │             │
//! └────────────┘            └─────────┘            │             │
//! ┌────────────┐            ┌─────────┐            │ Render loop │
//! │ Market job │ ─────────▶ │ [ slot ]│ ─────────▶ │             │
//! └────────────┘            └─────────┘            │             │
//! ┌────────────┐            ┌─────────┐            │             │
//! │Headline job│ ─────────▶ │ [ slot ]│ ─────────▶ │             │
//! └────────────┘            └─────────┘            └─────────────┘
//! ```

use crate::topic::Topic;
use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};

/// A single-slot cell that keeps only the most recently published value.
///
/// Cloning a mailbox yields another handle to the same slot. The intended use
/// is one publisher and one consumer per instance.
#[derive(Debug)]
pub struct Mailbox<T> {
    tx: Sender<T>,
    /// Held by both sides; the publisher uses it to evict a stale value.
    rx: Receiver<T>,
}

impl<T> Mailbox<T> {
    /// Create an empty mailbox.
    pub fn new() -> Self {
        let (tx, rx) = bounded(1);
        Self { tx, rx }
    }

    /// Publish a value, replacing any value that has not been taken yet.
    ///
    /// Never blocks and always succeeds.
    pub fn publish(&self, value: T) {
        let mut value = value;
        loop {
            match self.tx.try_send(value) {
                Ok(()) => return,
                Err(TrySendError::Full(rejected)) => {
                    if self.rx.try_recv().is_ok() {
                        tracing::trace!("mailbox: replaced unread value");
                    }
                    value = rejected;
                }
                // We own a receiver, so the channel cannot disconnect.
                Err(TrySendError::Disconnected(_)) => return,
            }
        }
    }

    /// Take the pending value, if any, without blocking.
    #[inline]
    pub fn try_take(&self) -> Option<T> {
        self.rx.try_recv().ok()
    }

    /// Check whether a value is waiting.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}

impl<T> Clone for Mailbox<T> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
            rx: self.rx.clone(),
        }
    }
}

impl<T> Default for Mailbox<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// One mailbox per topic, constructed once and shared by the scheduler and
/// the render loop.
#[derive(Debug, Clone, Default)]
pub struct Mailboxes {
    slots: [Mailbox<String>; 3],
}

impl Mailboxes {
    /// Create three empty mailboxes.
    pub fn new() -> Self {
        Self::default()
    }

    /// The mailbox for `topic`.
    #[inline]
    pub fn get(&self, topic: Topic) -> &Mailbox<String> {
        &self.slots[topic.index()]
    }

    /// Take whatever is pending in every mailbox, in topic order.
    pub fn drain(&self) -> impl Iterator<Item = (Topic, String)> + '_ {
        Topic::ALL
            .into_iter()
            .filter_map(|topic| self.get(topic).try_take().map(|value| (topic, value)))
    }
}
