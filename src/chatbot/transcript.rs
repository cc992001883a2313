//! Companion chat transcript
//!
//! Ordered entries of the AI companion view, rendered to HTML fragments.

use chrono::Local;

use super::dto::WellnessSuggestion;
use super::safety::crisis_panel_html;
use crate::chat::escape_html;

/// Who wrote a transcript message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speaker {
    User,
    Assistant,
}

/// One entry of the transcript
#[derive(Debug, Clone, PartialEq)]
pub enum TranscriptEntry {
    Message {
        speaker: Speaker,
        text: String,
        time_label: String,
    },
    TypingIndicator,
    WellnessSuggestions(Vec<WellnessSuggestion>),
    /// Support group names; empty when only other community data was sent
    CommunitySupport(Vec<String>),
    CrisisResources,
}

impl TranscriptEntry {
    /// A message stamped with the current local time
    pub fn message(speaker: Speaker, text: impl Into<String>) -> Self {
        TranscriptEntry::Message {
            speaker,
            text: text.into(),
            time_label: Local::now().format("%H:%M").to_string(),
        }
    }

    pub fn render_html(&self) -> String {
        match self {
            TranscriptEntry::Message {
                speaker,
                text,
                time_label,
            } => {
                let class = match speaker {
                    Speaker::User => "user-message",
                    Speaker::Assistant => "ai-message",
                };
                format!(
                    "<div class=\"message {}\"><div>{}</div><div class=\"message-time\">{}</div></div>",
                    class,
                    escape_html(text),
                    escape_html(time_label)
                )
            }
            TranscriptEntry::TypingIndicator => {
                "<div class=\"typing-indicator\"><span></span><span></span><span></span></div>"
                    .to_string()
            }
            TranscriptEntry::WellnessSuggestions(suggestions) => {
                let items: String = suggestions
                    .iter()
                    .filter_map(WellnessSuggestion::parts)
                    .map(|(title, description)| match description {
                        Some(description) => format!(
                            "<li><strong>{}</strong>: {}</li>",
                            escape_html(title),
                            escape_html(description)
                        ),
                        None => format!("<li>{}</li>", escape_html(title)),
                    })
                    .collect();
                format!(
                    "<div class=\"message ai-message wellness-suggestions\">\
                     <div class=\"suggestions-header\">💡 Wellness Suggestions</div><ul>{}</ul></div>",
                    items
                )
            }
            TranscriptEntry::CommunitySupport(groups) => {
                let mut html = String::from(
                    "<div class=\"message ai-message community-suggestions\">\
                     <div class=\"suggestions-header\">👥 Community Support</div>",
                );
                if !groups.is_empty() {
                    html.push_str("<p>You might find these support groups helpful:</p><ul>");
                    for group in groups {
                        html.push_str(&format!("<li>{}</li>", escape_html(group)));
                    }
                    html.push_str("</ul>");
                }
                html.push_str("</div>");
                html
            }
            TranscriptEntry::CrisisResources => format!(
                "<div class=\"message ai-message crisis-alert\">{}</div>",
                crisis_panel_html()
            ),
        }
    }
}

/// The companion view's entries, oldest first
#[derive(Debug, Default)]
pub struct Transcript {
    entries: Vec<TranscriptEntry>,
    scroll_requested: bool,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry and request a scroll to the bottom
    pub fn push(&mut self, entry: TranscriptEntry) {
        self.entries.push(entry);
        self.scroll_requested = true;
    }

    /// Remove every typing indicator
    pub fn remove_typing_indicator(&mut self) {
        self.entries
            .retain(|entry| *entry != TranscriptEntry::TypingIndicator);
    }

    /// Replace all entries with a single one
    pub fn reset(&mut self, entry: TranscriptEntry) {
        self.entries.clear();
        self.push(entry);
    }

    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn has_crisis_panel(&self) -> bool {
        self.entries.contains(&TranscriptEntry::CrisisResources)
    }

    pub fn take_scroll_request(&mut self) -> bool {
        std::mem::take(&mut self.scroll_requested)
    }

    pub fn render_html(&self) -> String {
        self.entries.iter().map(TranscriptEntry::render_html).collect()
    }
}
