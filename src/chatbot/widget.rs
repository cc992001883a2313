//! AI companion widget
//!
//! Drives one user's conversation with the companion backend and keeps the
//! transcript that the view renders. Taking `&mut self` for every request
//! means at most one message is in flight.

use serde_json::{Map, Value};

use super::client::ChatbotClient;
use super::dto::ChatResponse;
use super::safety::requires_crisis_panel;
use super::transcript::{Speaker, Transcript, TranscriptEntry};

pub const GREETING: &str = "Hello! I'm your AI companion. How can I help you today?";

/// Reply used when the backend reports an error without its own fallback
pub const FALLBACK_REPLY: &str = "I'm here to listen. Could you tell me more?";

pub const CONNECTION_TROUBLE_REPLY: &str =
    "I'm having trouble connecting right now. Please try again in a moment.";

pub const MAX_WELLNESS_SUGGESTIONS: usize = 3;
pub const MAX_SUPPORT_GROUPS: usize = 2;
pub const DEFAULT_HISTORY_LIMIT: usize = 10;

/// What a send produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyOutcome {
    /// Blank input, nothing sent
    Ignored,
    /// Companion replied; `crisis` is set when the crisis panel was shown
    Replied { crisis: bool },
    /// Backend reported an error; a fallback reply was shown
    Fallback,
    /// Backend unreachable; a connection notice was shown
    ConnectionTrouble,
}

/// The companion chat view's state
pub struct ChatbotWidget {
    client: ChatbotClient,
    user_id: String,
    session_context: Map<String, Value>,
    transcript: Transcript,
    history_limit: usize,
}

impl ChatbotWidget {
    pub fn new(client: ChatbotClient, user_id: impl Into<String>) -> Self {
        let mut transcript = Transcript::new();
        transcript.push(greeting());

        Self {
            client,
            user_id: user_id.into(),
            session_context: Map::new(),
            transcript,
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }

    /// Builder method: how many history turns `load_history` shows
    pub fn history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn transcript_mut(&mut self) -> &mut Transcript {
        &mut self.transcript
    }

    /// Context forwarded with every message
    pub fn session_context_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.session_context
    }

    /// Send a message and append the companion's reply to the transcript
    pub async fn send(&mut self, text: &str) -> ReplyOutcome {
        let text = text.trim();
        if text.is_empty() {
            return ReplyOutcome::Ignored;
        }

        self.transcript
            .push(TranscriptEntry::message(Speaker::User, text));
        self.transcript.push(TranscriptEntry::TypingIndicator);

        let result = self
            .client
            .send_message(&self.user_id, text, self.session_context.clone())
            .await;

        self.transcript.remove_typing_indicator();

        match result {
            Ok(response) if response.is_success() => {
                let crisis = self.show_reply(response);
                ReplyOutcome::Replied { crisis }
            }
            Ok(response) => {
                tracing::warn!(
                    user_id = %self.user_id,
                    error = ?response.error,
                    "Chat backend returned an error status"
                );
                let reply = response
                    .fallback_response
                    .unwrap_or_else(|| FALLBACK_REPLY.to_string());
                self.transcript
                    .push(TranscriptEntry::message(Speaker::Assistant, reply));
                ReplyOutcome::Fallback
            }
            Err(e) => {
                tracing::error!(user_id = %self.user_id, error = %e, "Error sending message");
                self.transcript.push(TranscriptEntry::message(
                    Speaker::Assistant,
                    CONNECTION_TROUBLE_REPLY,
                ));
                ReplyOutcome::ConnectionTrouble
            }
        }
    }

    /// Append reply, suggestions and crisis panel; returns whether the
    /// crisis panel was shown
    fn show_reply(&mut self, response: ChatResponse) -> bool {
        self.transcript
            .push(TranscriptEntry::message(Speaker::Assistant, response.response));

        if !response.wellness_suggestions.is_empty() {
            let suggestions = response
                .wellness_suggestions
                .into_iter()
                .take(MAX_WELLNESS_SUGGESTIONS)
                .collect();
            self.transcript
                .push(TranscriptEntry::WellnessSuggestions(suggestions));
        }

        if !response.community_suggestions.is_empty() {
            let groups = response
                .community_suggestions
                .support_groups
                .iter()
                .take(MAX_SUPPORT_GROUPS)
                .map(|group| group.label())
                .collect();
            self.transcript
                .push(TranscriptEntry::CommunitySupport(groups));
        }

        let crisis = requires_crisis_panel(&response.safety_status);
        if crisis {
            tracing::warn!(
                user_id = %self.user_id,
                crisis_level = ?response.safety_status.crisis_level,
                "Crisis level reached, showing support resources"
            );
            self.transcript.push(TranscriptEntry::CrisisResources);
        }
        crisis
    }

    /// Show the most recent history turns; returns how many were shown.
    ///
    /// Failures are logged and leave the transcript untouched.
    pub async fn load_history(&mut self) -> usize {
        let history = match self.client.history(&self.user_id).await {
            Ok(history) => history,
            Err(e) => {
                tracing::error!(user_id = %self.user_id, error = %e, "Error loading chat history");
                return 0;
            }
        };

        let skip = history.len().saturating_sub(self.history_limit);
        let mut shown = 0;
        for entry in history.into_iter().skip(skip) {
            let speaker = match entry.role.as_str() {
                "user" => Speaker::User,
                "assistant" => Speaker::Assistant,
                _ => continue,
            };
            self.transcript
                .push(TranscriptEntry::message(speaker, entry.content));
            shown += 1;
        }
        shown
    }

    /// Session insights, `None` when unavailable
    pub async fn insights(&self) -> Option<Value> {
        match self.client.insights(&self.user_id).await {
            Ok(insights) => insights,
            Err(e) => {
                tracing::error!(user_id = %self.user_id, error = %e, "Error fetching insights");
                None
            }
        }
    }

    /// Show up to three personalized wellness suggestions; returns how many
    /// were shown
    pub async fn show_wellness_suggestions(&mut self) -> usize {
        let suggestions = match self.client.wellness_suggestions(&self.user_id).await {
            Ok(suggestions) => suggestions,
            Err(e) => {
                tracing::error!(user_id = %self.user_id, error = %e, "Error fetching wellness suggestions");
                return 0;
            }
        };

        let shown: Vec<_> = suggestions
            .into_iter()
            .take(MAX_WELLNESS_SUGGESTIONS)
            .collect();
        let count = shown.len();
        if count > 0 {
            self.transcript
                .push(TranscriptEntry::WellnessSuggestions(shown));
        }
        count
    }

    /// Clear the conversation on the backend and reset the transcript to
    /// the greeting; returns whether it succeeded
    pub async fn clear_history(&mut self) -> bool {
        match self.client.clear_history(&self.user_id).await {
            Ok(()) => {
                self.transcript.reset(greeting());
                true
            }
            Err(e) => {
                tracing::error!(user_id = %self.user_id, error = %e, "Error clearing history");
                false
            }
        }
    }
}

fn greeting() -> TranscriptEntry {
    TranscriptEntry::Message {
        speaker: Speaker::Assistant,
        text: GREETING.to_string(),
        time_label: "Just now".to_string(),
    }
}
