//! Chat Backend REST Client
//!
//! HTTP client for the AI companion's chat API.

use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use thiserror::Error;

use super::dto::{
    ChatRequest, ChatResponse, HistoryEntry, HistoryResponse, InsightsResponse, StatusResponse,
    WellnessResponse, WellnessSuggestion,
};

/// Chat backend REST client
pub struct ChatbotClient {
    client: Client,
    config: ChatbotConfig,
}

/// Configuration for the chat backend client
#[derive(Debug, Clone)]
pub struct ChatbotConfig {
    /// Base URL of the chat API, including the `/api` prefix
    pub base_url: String,
    /// Request timeout in milliseconds
    pub request_timeout_ms: u64,
}

impl Default for ChatbotConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000/api".to_string(),
            request_timeout_ms: 30_000,
        }
    }
}

impl ChatbotClient {
    /// Create a new client with the given configuration
    pub fn new(config: ChatbotConfig) -> Result<Self, ChatbotError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_millis(config.request_timeout_ms))
            .build()
            .map_err(ChatbotError::Request)?;

        Ok(Self { client, config })
    }

    /// Get the current configuration
    pub fn config(&self) -> &ChatbotConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn user_url(&self, prefix: &str, user_id: &str) -> String {
        self.url(&format!("{}/{}", prefix, urlencoding::encode(user_id)))
    }

    /// Send a user message and get the companion's reply.
    ///
    /// Error statuses that still carry a JSON body (with a fallback reply)
    /// are returned as `Ok` with a non-success `status`.
    pub async fn send_message(
        &self,
        user_id: &str,
        message: &str,
        session_context: Map<String, Value>,
    ) -> Result<ChatResponse, ChatbotError> {
        let body = ChatRequest {
            message: message.to_string(),
            user_id: user_id.to_string(),
            session_context,
        };

        let response = self
            .client
            .post(self.url("/chat/message"))
            .json(&body)
            .send()
            .await
            .map_err(classify)?;

        decode_lenient(response).await
    }

    /// Conversation history for a user, oldest first
    pub async fn history(&self, user_id: &str) -> Result<Vec<HistoryEntry>, ChatbotError> {
        let response = self
            .client
            .get(self.user_url("/chat/history", user_id))
            .send()
            .await
            .map_err(classify)?;

        let history: HistoryResponse = decode(response).await?;
        Ok(history.history)
    }

    /// Session insights for a user
    pub async fn insights(&self, user_id: &str) -> Result<Option<Value>, ChatbotError> {
        let response = self
            .client
            .get(self.user_url("/chat/insights", user_id))
            .send()
            .await
            .map_err(classify)?;

        let insights: InsightsResponse = decode(response).await?;
        Ok(insights.insights)
    }

    /// Personalized wellness suggestions for a user
    pub async fn wellness_suggestions(
        &self,
        user_id: &str,
    ) -> Result<Vec<WellnessSuggestion>, ChatbotError> {
        let response = self
            .client
            .get(self.user_url("/chat/wellness", user_id))
            .send()
            .await
            .map_err(classify)?;

        let wellness: WellnessResponse = decode(response).await?;
        Ok(wellness.suggestions)
    }

    /// Forget the user's conversation on the backend
    pub async fn clear_history(&self, user_id: &str) -> Result<(), ChatbotError> {
        let response = self
            .client
            .delete(self.user_url("/chat/clear", user_id))
            .send()
            .await
            .map_err(classify)?;

        let _: StatusResponse = decode(response).await?;
        Ok(())
    }
}

fn classify(e: reqwest::Error) -> ChatbotError {
    if e.is_timeout() {
        ChatbotError::Timeout
    } else if e.is_connect() {
        ChatbotError::Unavailable
    } else {
        ChatbotError::Request(e)
    }
}

/// Decode a success response; anything else becomes `ApiError`
async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ChatbotError> {
    let status = response.status();
    if !status.is_success() {
        let text = response.text().await.unwrap_or_default();
        return Err(ChatbotError::ApiError {
            status: status.as_u16(),
            message: text,
        });
    }
    response.json().await.map_err(ChatbotError::Decode)
}

/// Decode the body whatever the status, falling back to `ApiError` when the
/// body is not a chat response
async fn decode_lenient(response: Response) -> Result<ChatResponse, ChatbotError> {
    let status = response.status();
    let text = response.text().await.map_err(classify)?;

    match serde_json::from_str::<ChatResponse>(&text) {
        Ok(body) if status.is_success() || !body.status.is_empty() => Ok(body),
        _ => Err(ChatbotError::ApiError {
            status: status.as_u16(),
            message: text,
        }),
    }
}

// ============================================
// Errors
// ============================================

/// Errors that can occur when communicating with the chat backend
#[derive(Error, Debug)]
pub enum ChatbotError {
    #[error("Chat backend unavailable")]
    Unavailable,

    #[error("Request failed: {0}")]
    Request(reqwest::Error),

    #[error("Invalid response body: {0}")]
    Decode(reqwest::Error),

    #[error("API error {status}: {message}")]
    ApiError { status: u16, message: String },

    #[error("Request timeout")]
    Timeout,
}
