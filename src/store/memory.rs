//! In-memory backend
//!
//! Implements the store and auth traits in-process. Listener bookkeeping
//! mirrors a pub/sub hub: each listener owns an unbounded channel and is
//! registered per room; failed sends prune the registration.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{mpsc, RwLock};
use uuid::Uuid;

use super::subscription::{Change, ChangeBatch, ListenerId, Subscription};
use super::types::{Message, MessageId, NewMessage, Principal, RoomId, UserId, UserProfile};
use super::{AuthSource, MessageStore, ProfileStore, StoreError, StoreResult};

/// Configuration for the in-memory store
#[derive(Debug, Clone)]
pub struct MemoryStoreConfig {
    /// Resolve server timestamps on append. When off, messages stay pending
    /// until [`MemoryStore::acknowledge_pending`] is called.
    pub auto_acknowledge: bool,
}

impl Default for MemoryStoreConfig {
    fn default() -> Self {
        Self {
            auto_acknowledge: true,
        }
    }
}

struct Listener {
    room_id: RoomId,
    sender: mpsc::UnboundedSender<ChangeBatch>,
}

type ListenerMap = Arc<Mutex<HashMap<ListenerId, Listener>>>;

/// Document store kept in process memory
pub struct MemoryStore {
    profiles: RwLock<HashMap<UserId, UserProfile>>,
    /// Room → messages in arrival order
    rooms: RwLock<HashMap<RoomId, Vec<Message>>>,
    /// Listener registry; locked synchronously so cancellation never awaits
    listeners: ListenerMap,
    offline: AtomicBool,
    profile_writes: AtomicUsize,
    config: MemoryStoreConfig,
}

impl MemoryStore {
    pub fn new(config: MemoryStoreConfig) -> Self {
        Self {
            profiles: RwLock::new(HashMap::new()),
            rooms: RwLock::new(HashMap::new()),
            listeners: Arc::new(Mutex::new(HashMap::new())),
            offline: AtomicBool::new(false),
            profile_writes: AtomicUsize::new(0),
            config,
        }
    }

    /// Simulate losing (or regaining) the connection to the backend
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Number of profile documents created so far
    pub fn profile_writes(&self) -> usize {
        self.profile_writes.load(Ordering::SeqCst)
    }

    /// Number of live listeners on a room
    pub fn listener_count(&self, room_id: &str) -> usize {
        lock(&self.listeners)
            .values()
            .filter(|l| l.room_id == room_id)
            .count()
    }

    /// Messages of a room in arrival order
    pub async fn messages(&self, room_id: &str) -> Vec<Message> {
        self.rooms
            .read()
            .await
            .get(room_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Resolve all pending server timestamps in a room.
    ///
    /// Listeners receive the resolutions as modifications.
    pub async fn acknowledge_pending(&self, room_id: &str) -> usize {
        let mut rooms = self.rooms.write().await;
        let Some(messages) = rooms.get_mut(room_id) else {
            return 0;
        };

        let now = Utc::now();
        let batch: ChangeBatch = messages
            .iter_mut()
            .filter(|m| m.server_timestamp.is_none())
            .map(|m| {
                m.server_timestamp = Some(now);
                Change::modified(m.clone())
            })
            .collect();

        let count = batch.len();
        if count > 0 {
            self.broadcast(room_id, batch);
        }
        count
    }

    /// Insert fully formed messages and deliver them to listeners as one
    /// batch, in the order given
    pub async fn deliver(&self, room_id: &str, messages: Vec<Message>) {
        let mut rooms = self.rooms.write().await;
        let room = rooms.entry(room_id.to_string()).or_default();
        room.extend(messages.iter().cloned());

        let batch = messages.into_iter().map(Change::added).collect();
        self.broadcast(room_id, batch);
    }

    fn check_online(&self) -> StoreResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            Err(StoreError::Unavailable("backend offline".to_string()))
        } else {
            Ok(())
        }
    }

    /// Send a batch to every listener of a room, dropping closed ones
    fn broadcast(&self, room_id: &str, batch: ChangeBatch) {
        let mut listeners = lock(&self.listeners);
        let mut closed = Vec::new();
        let mut sent_count = 0;

        for (id, listener) in listeners.iter() {
            if listener.room_id != room_id {
                continue;
            }
            if listener.sender.send(batch.clone()).is_ok() {
                sent_count += 1;
            } else {
                closed.push(id.clone());
            }
        }

        for id in closed {
            listeners.remove(&id);
        }

        tracing::trace!(room_id = %room_id, listeners = sent_count, "Broadcast batch");
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(MemoryStoreConfig::default())
    }
}

#[async_trait]
impl ProfileStore for MemoryStore {
    async fn get_profile(&self, user_id: &str) -> StoreResult<Option<UserProfile>> {
        self.check_online()?;
        Ok(self.profiles.read().await.get(user_id).cloned())
    }

    async fn create_profile(&self, mut profile: UserProfile) -> StoreResult<()> {
        self.check_online()?;
        profile.created_at = Some(Utc::now());
        self.profiles
            .write()
            .await
            .insert(profile.user_id.clone(), profile);
        self.profile_writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn touch_last_activity(&self, user_id: &str) -> StoreResult<()> {
        self.check_online()?;
        let mut profiles = self.profiles.write().await;
        let profile = profiles
            .get_mut(user_id)
            .ok_or_else(|| StoreError::NotFound(format!("users/{}", user_id)))?;
        profile.last_activity = Some(Utc::now());
        Ok(())
    }
}

#[async_trait]
impl MessageStore for MemoryStore {
    async fn append(&self, room_id: &str, message: NewMessage) -> StoreResult<MessageId> {
        self.check_online()?;

        let id = Uuid::new_v4().to_string();
        let server_timestamp = self.config.auto_acknowledge.then(Utc::now);
        let stored = message.into_message(id.clone(), server_timestamp);

        let mut rooms = self.rooms.write().await;
        rooms
            .entry(room_id.to_string())
            .or_default()
            .push(stored.clone());
        self.broadcast(room_id, vec![Change::added(stored)]);

        tracing::debug!(room_id = %room_id, message_id = %id, "Message appended");
        Ok(id)
    }

    async fn listen(&self, room_id: &str) -> StoreResult<Subscription> {
        self.check_online()?;

        // Holding the room lock keeps appends from slipping between the
        // snapshot and the registration.
        let rooms = self.rooms.read().await;
        let mut snapshot = rooms.get(room_id).cloned().unwrap_or_default();
        snapshot.sort_by_key(Message::sort_key);

        let (sender, receiver) = mpsc::unbounded_channel();
        if !snapshot.is_empty() {
            let batch = snapshot.into_iter().map(Change::added).collect();
            // Receiver is alive; this cannot fail.
            let _ = sender.send(batch);
        }

        let id = Uuid::new_v4().to_string();
        lock(&self.listeners).insert(
            id.clone(),
            Listener {
                room_id: room_id.to_string(),
                sender,
            },
        );
        drop(rooms);

        tracing::debug!(room_id = %room_id, listener_id = %id, "Listener registered");

        let registry = Arc::clone(&self.listeners);
        let listener_id = id.clone();
        Ok(Subscription::new(id, receiver, move || {
            lock(&registry).remove(&listener_id);
        }))
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Auth provider kept in process memory
#[derive(Default)]
pub struct MemoryAuth {
    current: RwLock<Option<Principal>>,
}

impl MemoryAuth {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start signed in as `principal`
    pub fn signed_in(principal: Principal) -> Self {
        Self {
            current: RwLock::new(Some(principal)),
        }
    }

    pub async fn sign_in(&self, principal: Principal) {
        *self.current.write().await = Some(principal);
    }

    pub async fn sign_out(&self) {
        *self.current.write().await = None;
    }

    /// Mark the signed-in principal's email as verified
    pub async fn verify_email(&self) {
        if let Some(principal) = self.current.write().await.as_mut() {
            principal.email_verified = true;
        }
    }
}

#[async_trait]
impl AuthSource for MemoryAuth {
    async fn current_principal(&self) -> StoreResult<Option<Principal>> {
        Ok(self.current.read().await.clone())
    }
}
