//! AI Companion Chat
//!
//! Client side of the companion chatbot: a REST client for the chat
//! backend and the widget state that renders its replies.
//!
//! ## Architecture
//!
//! - **ChatbotClient**: REST client (`/chat/message`, `/chat/history`,
//!   `/chat/insights`, `/chat/wellness`, `/chat/clear`)
//! - **ChatbotWidget**: sends messages and builds the transcript
//! - **Transcript**: rendered entries (messages, suggestions, crisis panel)
//! - **safety**: crisis threshold and resources copy
//!
//! ## Data Flow
//!
//! 1. The widget appends the user's message and a typing indicator
//! 2. The client posts the message with the persisted user id
//! 3. The reply, suggestions and (at crisis level 7+) the crisis panel are
//!    appended to the transcript

mod client;
mod dto;
mod safety;
mod transcript;
mod user_id;
mod widget;

pub use client::{ChatbotClient, ChatbotConfig, ChatbotError};
pub use dto::{
    ChatRequest, ChatResponse, CommunitySuggestions, HistoryEntry, SafetyStatus, SupportGroup,
    WellnessSuggestion, STATUS_SUCCESS,
};
pub use safety::{
    crisis_panel_html, requires_crisis_panel, CRISIS_CLOSING, CRISIS_HEADER, CRISIS_HOTLINES,
    CRISIS_INTRO, CRISIS_THRESHOLD,
};
pub use transcript::{Speaker, Transcript, TranscriptEntry};
pub use user_id::{default_user_id_path, generate_user_id, load_or_create_user_id};
pub use widget::{
    ChatbotWidget, ReplyOutcome, CONNECTION_TROUBLE_REPLY, DEFAULT_HISTORY_LIMIT, FALLBACK_REPLY,
    GREETING, MAX_SUPPORT_GROUPS, MAX_WELLNESS_SUGGESTIONS,
};
