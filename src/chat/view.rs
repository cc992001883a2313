//! Rendering-ready message projections

use chrono::{DateTime, Local, Utc};

use crate::store::{Message, MessageId};

/// Time label shown until the server acknowledges a message
pub const PENDING_TIME_LABEL: &str = "Just now";

/// Avatar label for messages without initials
pub const DEFAULT_INITIALS: &str = "AN";

/// Author label for messages without a display name
pub const DEFAULT_AUTHOR: &str = "Anonymous";

/// Author label for the viewer's own messages
pub const OWN_AUTHOR: &str = "You";

/// A message as one viewer should see it
#[derive(Debug, Clone, PartialEq)]
pub struct MessageView {
    pub id: MessageId,
    pub is_own: bool,
    /// "You" for own messages, else the author's display name
    pub author_label: String,
    pub initials: String,
    /// HTML-escaped message text
    pub text_html: String,
    /// Time of day ("14:05"), or "Just now" while pending
    pub time_label: String,
    /// Ordering key: server timestamp, else client `created_at`
    pub sort_key: DateTime<Utc>,
}

impl MessageView {
    /// Project a stored message for the viewer `viewer_id`
    pub fn project(message: &Message, viewer_id: &str) -> Self {
        let is_own = message.author_id == viewer_id;

        let author_label = if is_own {
            OWN_AUTHOR.to_string()
        } else if message.display_name.trim().is_empty() {
            DEFAULT_AUTHOR.to_string()
        } else {
            message.display_name.clone()
        };

        let initials = if message.initials.trim().is_empty() {
            DEFAULT_INITIALS.to_string()
        } else {
            message.initials.clone()
        };

        Self {
            id: message.id.clone(),
            is_own,
            author_label,
            initials,
            text_html: escape_html(&message.text),
            time_label: time_label(message.server_timestamp),
            sort_key: message.sort_key(),
        }
    }

    /// HTML fragment for the message list
    pub fn render_html(&self) -> String {
        let class = if self.is_own { "message own" } else { "message" };
        format!(
            concat!(
                "<div class=\"{}\" data-message-id=\"{}\">",
                "<div class=\"message-avatar\">{}</div>",
                "<div class=\"message-content\">",
                "<div class=\"message-header\">",
                "<div class=\"message-author\">{}</div>",
                "<div class=\"message-time\">{}</div>",
                "</div>",
                "<div class=\"message-text\">{}</div>",
                "</div></div>"
            ),
            class,
            escape_html(&self.id),
            escape_html(&self.initials),
            escape_html(&self.author_label),
            self.time_label,
            self.text_html,
        )
    }
}

/// Local time of day for a resolved server timestamp
pub fn time_label(server_timestamp: Option<DateTime<Utc>>) -> String {
    match server_timestamp {
        Some(ts) => ts.with_timezone(&Local).format("%H:%M").to_string(),
        None => PENDING_TIME_LABEL.to_string(),
    }
}

/// Escape text for insertion into HTML
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(author: &str) -> Message {
        Message {
            id: "m1".to_string(),
            author_id: author.to_string(),
            display_name: "Serene Cloud".to_string(),
            initials: "SC".to_string(),
            text: "<b>hi</b> & bye".to_string(),
            created_at: Utc::now(),
            server_timestamp: None,
        }
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("plain"), "plain");
        assert_eq!(
            escape_html("<script>alert('x')</script>"),
            "&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt;"
        );
        assert_eq!(escape_html("a & \"b\""), "a &amp; &quot;b&quot;");
    }

    #[test]
    fn test_own_flag_depends_on_viewer() {
        let msg = message("alice");
        let as_author = MessageView::project(&msg, "alice");
        let as_other = MessageView::project(&msg, "bob");

        assert!(as_author.is_own);
        assert_eq!(as_author.author_label, "You");
        assert!(!as_other.is_own);
        assert_eq!(as_other.author_label, "Serene Cloud");
        assert_eq!(as_other.text_html, "&lt;b&gt;hi&lt;/b&gt; &amp; bye");
    }

    #[test]
    fn test_pending_and_resolved_time() {
        let mut msg = message("alice");
        assert_eq!(MessageView::project(&msg, "bob").time_label, "Just now");

        let ts = Utc::now();
        msg.server_timestamp = Some(ts);
        let view = MessageView::project(&msg, "bob");
        assert_eq!(view.time_label, ts.with_timezone(&Local).format("%H:%M").to_string());
        assert_eq!(view.sort_key, ts);
    }

    #[test]
    fn test_defaults_for_missing_author_fields() {
        let mut msg = message("alice");
        msg.display_name = String::new();
        msg.initials = " ".to_string();
        let view = MessageView::project(&msg, "bob");
        assert_eq!(view.author_label, "Anonymous");
        assert_eq!(view.initials, "AN");
    }

    #[test]
    fn test_render_html() {
        let view = MessageView::project(&message("alice"), "alice");
        let html = view.render_html();
        assert!(html.starts_with("<div class=\"message own\" data-message-id=\"m1\">"));
        assert!(html.contains("<div class=\"message-avatar\">SC</div>"));
        assert!(html.contains("<div class=\"message-author\">You</div>"));
        assert!(html.contains("&lt;b&gt;hi&lt;/b&gt;"));
        assert!(!html.contains("<b>hi</b>"));
    }
}
