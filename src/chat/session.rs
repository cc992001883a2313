//! Chat Session
//!
//! One user's presence in one chat room: resolves the display identity,
//! publishes messages and turns the room's live listener into batches of
//! rendering-ready views.
//!
//! Lifecycle: `Unopened → Opening → Subscribed → Closed`. Sending is only
//! accepted while subscribed.

use chrono::Utc;
use std::sync::Arc;
use thiserror::Error;

use super::render::MessageList;
use super::view::MessageView;
use crate::identity::{resolve_identity, Identity};
use crate::store::{
    ChangeBatch, ChangeKind, MessageId, MessageStore, NewMessage, Principal, ProfileStore, RoomId,
    StoreError, Subscription,
};

/// Notice shown when a message could not be delivered
pub const SEND_FAILED_NOTICE: &str = "Failed to send message. Please try again.";

/// Where a session is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Unopened,
    Opening,
    Subscribed,
    Closed,
}

/// Result of a send attempt. Failures never end the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// Message appended to the room
    Sent(MessageId),
    /// Empty input, or the session is not subscribed
    Ignored,
    /// Backend rejected or could not be reached; show `notice`
    Failed { notice: String },
}

/// Errors that stop a session from opening or subscribing
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Failed to resolve identity: {0}")]
    Identity(StoreError),

    #[error("Failed to subscribe to room {room_id}: {source}")]
    Subscribe { room_id: RoomId, source: StoreError },

    #[error("Session has no resolved identity")]
    NotOpened,

    #[error("Session is closed")]
    Closed,
}

/// A user's session in one chat room
pub struct ChatSession {
    room_id: RoomId,
    profiles: Arc<dyn ProfileStore>,
    messages: Arc<dyn MessageStore>,
    identity: Option<Identity>,
    subscription: Option<Subscription>,
    state: SessionState,
    /// Input buffer of the compose box
    draft: String,
}

impl ChatSession {
    pub fn new(
        room_id: impl Into<RoomId>,
        profiles: Arc<dyn ProfileStore>,
        messages: Arc<dyn MessageStore>,
    ) -> Self {
        Self {
            room_id: room_id.into(),
            profiles,
            messages,
            identity: None,
            subscription: None,
            state: SessionState::Unopened,
            draft: String::new(),
        }
    }

    pub fn room_id(&self) -> &str {
        &self.room_id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.draft = text.into();
    }

    /// Resolve the identity for `principal` and start listening.
    ///
    /// Any listener from an earlier `open` is cancelled first. When this
    /// returns `Ok`, [`send`](Self::send) is accepted.
    pub async fn open(&mut self, principal: &Principal) -> Result<(), SessionError> {
        if self.state == SessionState::Closed {
            return Err(SessionError::Closed);
        }

        self.cancel_subscription();
        self.state = SessionState::Opening;

        let resolved = self.ensure_identity(principal).await.map(|_| ());
        if let Err(e) = resolved {
            self.state = SessionState::Unopened;
            return Err(e);
        }

        self.subscribe().await
    }

    /// Identity for `principal`, cached for the lifetime of the session.
    ///
    /// Only reached through `open`, which replaces the listener whenever the
    /// identity changes.
    async fn ensure_identity(
        &mut self,
        principal: &Principal,
    ) -> Result<&Identity, SessionError> {
        let cached = self
            .identity
            .as_ref()
            .is_some_and(|identity| identity.user_id == principal.uid);

        if !cached {
            let identity = resolve_identity(self.profiles.as_ref(), principal)
                .await
                .map_err(SessionError::Identity)?;
            tracing::debug!(
                room_id = %self.room_id,
                user_id = %identity.user_id,
                "Identity resolved"
            );
            self.identity = Some(identity);
        }

        self.identity.as_ref().ok_or(SessionError::NotOpened)
    }

    /// (Re)open the single live listener on the room
    pub async fn subscribe(&mut self) -> Result<(), SessionError> {
        match self.state {
            SessionState::Closed => return Err(SessionError::Closed),
            _ if self.identity.is_none() => return Err(SessionError::NotOpened),
            _ => {}
        }

        self.cancel_subscription();

        let subscription = match self.messages.listen(&self.room_id).await {
            Ok(subscription) => subscription,
            Err(source) => {
                tracing::error!(room_id = %self.room_id, error = %source, "Error subscribing to room");
                self.state = SessionState::Unopened;
                return Err(SessionError::Subscribe {
                    room_id: self.room_id.clone(),
                    source,
                });
            }
        };

        tracing::info!(
            room_id = %self.room_id,
            listener_id = %subscription.id(),
            "Subscribed to room"
        );

        self.subscription = Some(subscription);
        self.state = SessionState::Subscribed;
        Ok(())
    }

    /// Wait for the next delivered batch, projected for this session's user.
    ///
    /// Only additions are projected; a batch of modifications yields an empty
    /// vector. Returns `None` once the session is closed.
    pub async fn next_batch(&mut self) -> Option<Vec<MessageView>> {
        let batch = self.subscription.as_mut()?.next_batch().await?;
        Some(self.project(batch))
    }

    /// Projected batch that is already queued, without waiting
    pub fn try_next_batch(&mut self) -> Option<Vec<MessageView>> {
        let batch = self.subscription.as_mut()?.try_next_batch()?;
        Some(self.project(batch))
    }

    /// Apply every queued batch to `list`, returning the number of views added
    pub fn drain_into(&mut self, list: &mut MessageList) -> usize {
        let mut added = 0;
        while let Some(views) = self.try_next_batch() {
            added += list.apply_batch(views);
        }
        added
    }

    /// Publish `text` to the room.
    ///
    /// Blank input and sends outside the subscribed state are ignored. On
    /// success the draft is cleared and the user's last-activity marker is
    /// updated on a best-effort basis.
    pub async fn send(&mut self, text: &str) -> SendOutcome {
        let text = text.trim();
        if text.is_empty() || self.state != SessionState::Subscribed {
            return SendOutcome::Ignored;
        }
        let Some(identity) = self.identity.as_ref() else {
            return SendOutcome::Ignored;
        };

        let message = NewMessage {
            author_id: identity.user_id.clone(),
            display_name: identity.display_name.clone(),
            initials: identity.initials.clone(),
            text: text.to_string(),
            created_at: Utc::now(),
        };
        let user_id = identity.user_id.clone();

        match self.messages.append(&self.room_id, message).await {
            Ok(id) => {
                self.draft.clear();
                tracing::debug!(room_id = %self.room_id, message_id = %id, "Message sent");

                if let Err(e) = self.profiles.touch_last_activity(&user_id).await {
                    tracing::warn!(user_id = %user_id, error = %e, "Failed to update last activity");
                }
                SendOutcome::Sent(id)
            }
            Err(e) => {
                tracing::error!(room_id = %self.room_id, error = %e, "Error sending message");
                SendOutcome::Failed {
                    notice: SEND_FAILED_NOTICE.to_string(),
                }
            }
        }
    }

    /// Send the current draft
    pub async fn send_draft(&mut self) -> SendOutcome {
        let text = self.draft.clone();
        self.send(&text).await
    }

    /// Cancel the live listener. Safe to call more than once.
    pub fn close(&mut self) {
        if self.state == SessionState::Closed {
            return;
        }
        self.cancel_subscription();
        self.state = SessionState::Closed;
        tracing::info!(room_id = %self.room_id, "Chat session closed");
    }

    fn cancel_subscription(&mut self) {
        if let Some(mut subscription) = self.subscription.take() {
            subscription.cancel();
        }
    }

    fn project(&self, batch: ChangeBatch) -> Vec<MessageView> {
        let viewer = self
            .identity
            .as_ref()
            .map(|i| i.user_id.as_str())
            .unwrap_or_default();

        batch
            .into_iter()
            .filter(|change| change.kind == ChangeKind::Added)
            .map(|change| MessageView::project(&change.message, viewer))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::view::escape_html;
    use crate::store::{MemoryStore, MemoryStoreConfig, StoreResult};

    fn session(store: &Arc<MemoryStore>, room: &str) -> ChatSession {
        ChatSession::new(room, store.clone(), store.clone())
    }

    #[tokio::test]
    async fn test_open_transitions_to_subscribed() {
        let store = Arc::new(MemoryStore::default());
        let mut chat = session(&store, "support-1");
        assert_eq!(chat.state(), SessionState::Unopened);

        chat.open(&Principal::anonymous("anon")).await.unwrap();
        assert_eq!(chat.state(), SessionState::Subscribed);
        assert!(chat.identity().is_some());
        assert_eq!(store.listener_count("support-1"), 1);
    }

    #[tokio::test]
    async fn test_send_before_open_is_ignored() {
        let store = Arc::new(MemoryStore::default());
        let mut chat = session(&store, "room");
        assert_eq!(chat.send("hello").await, SendOutcome::Ignored);
        assert!(store.messages("room").await.is_empty());
    }

    #[tokio::test]
    async fn test_send_appends_one_tagged_message() {
        let store = Arc::new(MemoryStore::default());
        let mut chat = session(&store, "room");
        chat.open(&Principal::anonymous("anon")).await.unwrap();

        let outcome = chat.send("  Hello <world>  ").await;
        assert!(matches!(outcome, SendOutcome::Sent(_)));

        let stored = store.messages("room").await;
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].author_id, "anon");
        assert_eq!(stored[0].text, "Hello <world>");

        let views = chat.next_batch().await.unwrap();
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].text_html, escape_html("Hello <world>"));
        assert!(views[0].is_own);
    }

    #[tokio::test]
    async fn test_blank_input_produces_nothing() {
        let store = Arc::new(MemoryStore::default());
        let mut chat = session(&store, "room");
        chat.open(&Principal::anonymous("anon")).await.unwrap();

        for text in ["", "   ", "\n\t"] {
            assert_eq!(chat.send(text).await, SendOutcome::Ignored);
        }
        assert!(store.messages("room").await.is_empty());
    }

    #[tokio::test]
    async fn test_send_clears_draft_and_touches_activity() {
        let store = Arc::new(MemoryStore::default());
        let mut chat = session(&store, "room");
        chat.open(&Principal::anonymous("anon")).await.unwrap();

        chat.set_draft("draft text");
        assert!(matches!(chat.send_draft().await, SendOutcome::Sent(_)));
        assert_eq!(chat.draft(), "");

        let profile = store.get_profile("anon").await.unwrap().unwrap();
        assert!(profile.last_activity.is_some());
    }

    #[tokio::test]
    async fn test_failed_send_keeps_session_usable() {
        let store = Arc::new(MemoryStore::default());
        let mut chat = session(&store, "room");
        chat.open(&Principal::anonymous("anon")).await.unwrap();
        chat.set_draft("keep me");

        store.set_offline(true);
        let outcome = chat.send_draft().await;
        assert_eq!(
            outcome,
            SendOutcome::Failed {
                notice: SEND_FAILED_NOTICE.to_string()
            }
        );
        assert_eq!(chat.draft(), "keep me");
        assert_eq!(chat.state(), SessionState::Subscribed);

        store.set_offline(false);
        assert!(matches!(chat.send_draft().await, SendOutcome::Sent(_)));
    }

    #[tokio::test]
    async fn test_reopen_keeps_single_listener() {
        let store = Arc::new(MemoryStore::default());
        let principal = Principal::anonymous("anon");
        let mut chat = session(&store, "room");

        chat.open(&principal).await.unwrap();
        chat.open(&principal).await.unwrap();
        assert_eq!(store.listener_count("room"), 1);

        chat.send("once").await;
        let mut list = MessageList::new();
        chat.drain_into(&mut list);
        assert_eq!(list.len(), 1);
        assert!(chat.try_next_batch().is_none());
    }

    #[tokio::test]
    async fn test_identity_stable_within_session() {
        let store = Arc::new(MemoryStore::default());
        let principal = Principal::anonymous("anon");
        let mut chat = session(&store, "room");

        let first = chat.ensure_identity(&principal).await.unwrap().clone();
        let second = chat.ensure_identity(&principal).await.unwrap().clone();
        assert_eq!(first.display_name, second.display_name);
        assert_eq!(store.profile_writes(), 1);
    }

    #[tokio::test]
    async fn test_close_is_idempotent_and_stops_delivery() {
        let store = Arc::new(MemoryStore::default());
        let mut chat = session(&store, "room");
        chat.open(&Principal::anonymous("anon")).await.unwrap();

        chat.close();
        chat.close();
        assert_eq!(chat.state(), SessionState::Closed);
        assert_eq!(store.listener_count("room"), 0);

        assert_eq!(chat.send("after close").await, SendOutcome::Ignored);
        assert!(chat.next_batch().await.is_none());
        assert!(matches!(
            chat.open(&Principal::anonymous("anon")).await,
            Err(SessionError::Closed)
        ));
    }

    #[tokio::test]
    async fn test_own_flag_per_viewer() {
        let store = Arc::new(MemoryStore::default());
        let mut sender = session(&store, "room");
        let mut other = session(&store, "room");
        sender.open(&Principal::anonymous("alice")).await.unwrap();
        other.open(&Principal::anonymous("bob")).await.unwrap();

        sender.send("Hello").await;

        let mine = sender.next_batch().await.unwrap();
        let theirs = other.next_batch().await.unwrap();
        assert!(mine[0].is_own);
        assert!(!theirs[0].is_own);
        assert_eq!(theirs[0].author_label, sender.identity().unwrap().display_name);
    }

    #[tokio::test]
    async fn test_pending_timestamp_and_modifications() {
        let store = Arc::new(MemoryStore::new(MemoryStoreConfig {
            auto_acknowledge: false,
        }));
        let mut chat = session(&store, "room");
        chat.open(&Principal::anonymous("anon")).await.unwrap();

        chat.send("pending").await;
        let views = chat.next_batch().await.unwrap();
        assert_eq!(views[0].time_label, "Just now");

        store.acknowledge_pending("room").await;
        let modifications = chat.next_batch().await.unwrap();
        assert!(modifications.is_empty());
    }

    #[tokio::test]
    async fn test_open_fails_when_backend_offline() {
        let store = Arc::new(MemoryStore::default());
        store.set_offline(true);
        let mut chat = session(&store, "room");

        let err = chat.open(&Principal::anonymous("anon")).await.unwrap_err();
        assert!(matches!(err, SessionError::Identity(_)));
        assert_eq!(chat.state(), SessionState::Unopened);
    }

    /// Message store whose listener can be switched off
    struct FlakyListen {
        inner: Arc<MemoryStore>,
        refuse: std::sync::atomic::AtomicBool,
    }

    #[async_trait::async_trait]
    impl MessageStore for FlakyListen {
        async fn append(&self, room_id: &str, message: NewMessage) -> StoreResult<MessageId> {
            self.inner.append(room_id, message).await
        }

        async fn listen(&self, room_id: &str) -> StoreResult<Subscription> {
            if self.refuse.load(std::sync::atomic::Ordering::SeqCst) {
                return Err(StoreError::Unavailable("listen refused".to_string()));
            }
            self.inner.listen(room_id).await
        }
    }

    #[tokio::test]
    async fn test_subscribe_failure_resets_state() {
        let store = Arc::new(MemoryStore::default());
        let messages = Arc::new(FlakyListen {
            inner: store.clone(),
            refuse: std::sync::atomic::AtomicBool::new(true),
        });
        let mut chat = ChatSession::new("room", store.clone(), messages.clone());
        let principal = Principal::anonymous("anon");

        let err = chat.open(&principal).await.unwrap_err();
        assert!(matches!(err, SessionError::Subscribe { .. }));
        assert_eq!(chat.state(), SessionState::Unopened);
        assert_eq!(chat.send("lost").await, SendOutcome::Ignored);

        messages
            .refuse
            .store(false, std::sync::atomic::Ordering::SeqCst);
        chat.open(&principal).await.unwrap();
        assert_eq!(chat.state(), SessionState::Subscribed);
        assert!(matches!(chat.send("back").await, SendOutcome::Sent(_)));
    }

    #[tokio::test]
    async fn test_reopen_as_other_user_switches_identity() {
        let store = Arc::new(MemoryStore::default());
        let mut chat = session(&store, "room");

        chat.open(&Principal::anonymous("alice")).await.unwrap();
        chat.send("from alice").await;
        chat.open(&Principal::anonymous("bob")).await.unwrap();

        assert_eq!(chat.identity().unwrap().user_id, "bob");
        assert_eq!(store.listener_count("room"), 1);

        // The fresh listener replays history projected for bob
        let views = chat.next_batch().await.unwrap();
        assert_eq!(views.len(), 1);
        assert!(!views[0].is_own);
    }
}
