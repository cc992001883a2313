//! Chat backend request/response types
//!
//! The backend is loose about shapes (suggestions may be strings or
//! objects, sections may be absent), so every response field is defaulted.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// `status` value of a successful backend response
pub const STATUS_SUCCESS: &str = "success";

/// Body of `POST /chat/message`
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub message: String,
    pub user_id: String,
    pub session_context: Map<String, Value>,
}

/// Reply to `POST /chat/message`, for both success and error statuses
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub response: String,
    #[serde(default)]
    pub wellness_suggestions: Vec<WellnessSuggestion>,
    #[serde(default)]
    pub community_suggestions: CommunitySuggestions,
    #[serde(default)]
    pub safety_status: SafetyStatus,
    #[serde(default)]
    pub emotional_state: Value,
    #[serde(default)]
    pub session_insights: Value,
    /// Reply to show when the backend failed to process the message
    #[serde(default)]
    pub fallback_response: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ChatResponse {
    pub fn is_success(&self) -> bool {
        self.status == STATUS_SUCCESS
    }
}

/// A wellness suggestion: free text or a titled entry
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum WellnessSuggestion {
    Text(String),
    Titled {
        title: String,
        #[serde(default)]
        description: String,
    },
    Other(Value),
}

impl WellnessSuggestion {
    /// Title and description; `None` for shapes that cannot be displayed
    pub fn parts(&self) -> Option<(&str, Option<&str>)> {
        match self {
            WellnessSuggestion::Text(text) => Some((text.as_str(), None)),
            WellnessSuggestion::Titled { title, description } => {
                Some((title.as_str(), Some(description.as_str())))
            }
            WellnessSuggestion::Other(_) => None,
        }
    }
}

/// Community section of a chat response
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CommunitySuggestions {
    #[serde(default)]
    pub support_groups: Vec<SupportGroup>,
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

impl CommunitySuggestions {
    pub fn is_empty(&self) -> bool {
        self.support_groups.is_empty() && self.other.is_empty()
    }
}

/// A support group: a bare name or an object with a name
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum SupportGroup {
    Name(String),
    Named { name: String },
    Other(Value),
}

impl SupportGroup {
    pub fn label(&self) -> String {
        match self {
            SupportGroup::Name(name) | SupportGroup::Named { name } => name.clone(),
            SupportGroup::Other(value) => value.to_string(),
        }
    }
}

/// Safety section of a chat response
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SafetyStatus {
    #[serde(default)]
    pub crisis_level: Option<f64>,
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

/// One turn of `GET /chat/history/{user_id}`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HistoryEntry {
    pub role: String,
    #[serde(default)]
    pub content: String,
}

/// Reply to `GET /chat/history/{user_id}`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HistoryResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
}

/// Reply to `GET /chat/insights/{user_id}`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InsightsResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub insights: Option<Value>,
}

/// Reply to `GET /chat/wellness/{user_id}`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WellnessResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub suggestions: Vec<WellnessSuggestion>,
}

/// Reply to `DELETE /chat/clear/{user_id}`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatusResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
}
