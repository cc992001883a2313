//! # Aegis
//!
//! Client core for the Aegis wellness platform: real-time community chat
//! rooms, the AI companion chat and page route guarding.
//!
//! ## Features
//!
//! - **Real-time rooms**: ordered, de-duplicated message streams with
//!   cancellable subscriptions
//! - **Pseudonymous identity**: anonymous members get a generated name and
//!   initials on first use
//! - **Companion chat**: REST client with crisis-resource surfacing
//! - **Route guarding**: one sign-in and verification policy for every page
//!
//! ## Modules
//!
//! - [`store`]: Backend traits and the in-memory store
//! - [`identity`]: Profile resolution and pseudonyms
//! - [`chat`]: Chat sessions and message rendering
//! - [`chatbot`]: Companion chat client and widget
//! - [`routes`]: Route guard and navigation highlighting
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use aegis::chat::{ChatSession, MessageList};
//! use aegis::store::{MemoryStore, Principal};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = Arc::new(MemoryStore::default());
//!     let mut session = ChatSession::new("support-1", store.clone(), store);
//!
//!     session.open(&Principal::anonymous("anon-42")).await?;
//!     session.send("Hello everyone").await;
//!
//!     let mut list = MessageList::new();
//!     session.drain_into(&mut list);
//!     println!("{}", list.render_html());
//!
//!     session.close();
//!     Ok(())
//! }
//! ```

pub mod chat;
pub mod chatbot;
pub mod config;
pub mod identity;
pub mod logging;
pub mod routes;
pub mod store;

// Re-export top-level types for convenience
pub use chat::{ChatSession, MessageList, MessageView, SendOutcome, SessionError, SessionState};

pub use chatbot::{ChatbotClient, ChatbotConfig, ChatbotError, ChatbotWidget, ReplyOutcome};

pub use config::{Config, ConfigError, LoggingConfig};

pub use identity::{resolve_identity, Identity};

pub use routes::{GuardDecision, RouteGuard, RoutePaths};

pub use store::{
    AuthSource, MemoryAuth, MemoryStore, Message, MessageStore, Principal, ProfileStore,
    StoreError, StoreResult, Subscription,
};
