//! Live listener handles
//!
//! A `Subscription` is the disposable handle returned by
//! [`MessageStore::listen`](super::MessageStore::listen). Batches of changes
//! are pulled with [`Subscription::next_batch`]; cancelling (or dropping) the
//! handle unregisters the listener before returning.

use futures_util::stream::{self, Stream};
use tokio::sync::mpsc;

use super::types::Message;

/// Unique identifier for a registered listener
pub type ListenerId = String;

/// What happened to a document in the listened collection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Added,
    Modified,
    Removed,
}

/// A single document change
#[derive(Debug, Clone, PartialEq)]
pub struct Change {
    pub kind: ChangeKind,
    pub message: Message,
}

impl Change {
    pub fn added(message: Message) -> Self {
        Self {
            kind: ChangeKind::Added,
            message,
        }
    }

    pub fn modified(message: Message) -> Self {
        Self {
            kind: ChangeKind::Modified,
            message,
        }
    }
}

/// Changes delivered by one backend notification, in delivery order
pub type ChangeBatch = Vec<Change>;

/// Cancellable handle over a live, ordered listener
pub struct Subscription {
    id: ListenerId,
    receiver: mpsc::UnboundedReceiver<ChangeBatch>,
    on_cancel: Option<Box<dyn FnOnce() + Send>>,
    cancelled: bool,
}

impl Subscription {
    /// Wrap a batch receiver; `on_cancel` must unregister the listener
    pub fn new(
        id: ListenerId,
        receiver: mpsc::UnboundedReceiver<ChangeBatch>,
        on_cancel: impl FnOnce() + Send + 'static,
    ) -> Self {
        Self {
            id,
            receiver,
            on_cancel: Some(Box::new(on_cancel)),
            cancelled: false,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Whether the listener is still registered
    pub fn is_active(&self) -> bool {
        !self.cancelled
    }

    /// Wait for the next batch of changes.
    ///
    /// Returns `None` once cancelled or when the backend drops the listener.
    pub async fn next_batch(&mut self) -> Option<ChangeBatch> {
        if self.cancelled {
            return None;
        }
        self.receiver.recv().await
    }

    /// Take a batch that is already queued, without waiting
    pub fn try_next_batch(&mut self) -> Option<ChangeBatch> {
        if self.cancelled {
            return None;
        }
        self.receiver.try_recv().ok()
    }

    /// Unregister the listener. Safe to call more than once.
    ///
    /// Batches still queued are discarded.
    pub fn cancel(&mut self) {
        if self.cancelled {
            return;
        }
        self.cancelled = true;
        self.receiver.close();
        if let Some(unregister) = self.on_cancel.take() {
            unregister();
        }
        tracing::debug!(listener_id = %self.id, "Listener cancelled");
    }

    /// Consume the handle as a stream of batches
    pub fn into_stream(self) -> impl Stream<Item = ChangeBatch> {
        stream::unfold(self, |mut sub| async move {
            let batch = sub.next_batch().await?;
            Some((batch, sub))
        })
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("cancelled", &self.cancelled)
            .finish()
    }
}
