//! Real-Time Group Chat
//!
//! Session logic for community chat rooms, kept apart from rendering.
//!
//! ## Architecture
//!
//! - **ChatSession**: identity, sending, and the room's live listener
//! - **MessageView**: per-viewer projection of a stored message
//! - **MessageList**: rendering adapter that applies view batches in order
//!
//! ## Example
//!
//! ```rust,no_run
//! use aegis::chat::{ChatSession, MessageList};
//! use aegis::store::{MemoryStore, Principal};
//! use std::sync::Arc;
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(MemoryStore::default());
//! let mut session = ChatSession::new("support-1", store.clone(), store.clone());
//! session.open(&Principal::anonymous("uid-123")).await?;
//!
//! session.send("Hello everyone").await;
//!
//! let mut list = MessageList::new();
//! while let Some(views) = session.next_batch().await {
//!     list.apply_batch(views);
//! }
//! # Ok(())
//! # }
//! ```

mod render;
mod session;
mod view;

pub use render::MessageList;
pub use session::{ChatSession, SendOutcome, SessionError, SessionState, SEND_FAILED_NOTICE};
pub use view::{
    escape_html, time_label, MessageView, DEFAULT_AUTHOR, DEFAULT_INITIALS, OWN_AUTHOR,
    PENDING_TIME_LABEL,
};
