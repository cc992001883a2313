//! Crisis resources
//!
//! When the backend rates a message at or above [`CRISIS_THRESHOLD`], the
//! widget shows a fixed panel of hotline numbers. The threshold and the copy
//! are product requirements and must not change.

use super::dto::SafetyStatus;

/// Lowest `crisis_level` that shows the crisis panel
pub const CRISIS_THRESHOLD: f64 = 7.0;

pub const CRISIS_HEADER: &str = "⚠️ Immediate Support Resources";

pub const CRISIS_INTRO: &str =
    "If you're in crisis or considering self-harm, please reach out for immediate help:";

/// (service, how to reach it)
pub const CRISIS_HOTLINES: [(&str, &str); 3] = [
    ("National Suicide Prevention Lifeline", "Call or text 988"),
    ("Crisis Text Line", "Text HOME to 741741"),
    ("Emergency Services", "Call 911"),
];

pub const CRISIS_CLOSING: &str = "You're not alone. Help is available 24/7.";

/// Whether a response's safety status calls for the crisis panel
pub fn requires_crisis_panel(status: &SafetyStatus) -> bool {
    status
        .crisis_level
        .is_some_and(|level| level >= CRISIS_THRESHOLD)
}

/// HTML for the crisis-resources panel
pub fn crisis_panel_html() -> String {
    let items: String = CRISIS_HOTLINES
        .iter()
        .map(|(service, contact)| format!("<li><strong>{}:</strong> {}</li>", service, contact))
        .collect();

    format!(
        "<div class=\"crisis-header\">{}</div><p>{}</p><ul>{}</ul><p>{}</p>",
        CRISIS_HEADER, CRISIS_INTRO, items, CRISIS_CLOSING
    )
}
