//! Backend Abstractions
//!
//! The chat session talks to two managed collaborators: an auth provider that
//! resolves the signed-in principal, and a document store holding user
//! profiles and per-room ordered message collections with live listeners.
//!
//! ## Architecture
//!
//! - **AuthSource**: resolves the current principal
//! - **ProfileStore**: reads and writes user profile documents
//! - **MessageStore**: appends messages and opens live listeners
//! - **Subscription**: cancellable handle over a listener
//! - **MemoryStore / MemoryAuth**: in-process backend for tests and demos
//!
//! Sessions receive these as `Arc<dyn Trait>` so no process-wide backend
//! singleton exists.

mod error;
mod memory;
mod subscription;
mod types;

pub use error::{StoreError, StoreResult};
pub use memory::{MemoryAuth, MemoryStore, MemoryStoreConfig};
pub use subscription::{Change, ChangeBatch, ChangeKind, ListenerId, Subscription};
pub use types::{
    Message, MessageId, NewMessage, Principal, RoomId, SignInProvider, UserId, UserProfile,
};

use async_trait::async_trait;

/// Resolves the signed-in principal
#[async_trait]
pub trait AuthSource: Send + Sync {
    /// Current principal with freshly reloaded verification state,
    /// `None` when signed out
    async fn current_principal(&self) -> StoreResult<Option<Principal>>;
}

/// User profile documents
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Read a profile; `Ok(None)` when the user has none yet
    async fn get_profile(&self, user_id: &str) -> StoreResult<Option<UserProfile>>;

    /// Create the profile record; the store stamps `created_at`
    async fn create_profile(&self, profile: UserProfile) -> StoreResult<()>;

    /// Stamp the profile's last-activity marker with server time
    async fn touch_last_activity(&self, user_id: &str) -> StoreResult<()>;
}

/// Per-room ordered message collections
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Append a message; the server timestamp is resolved by the store,
    /// possibly after the call returns
    async fn append(&self, room_id: &str, message: NewMessage) -> StoreResult<MessageId>;

    /// Open a live listener ordered by timestamp ascending.
    ///
    /// The first batch carries the existing messages as additions.
    async fn listen(&self, room_id: &str) -> StoreResult<Subscription>;
}
