//! Message list rendering adapter
//!
//! Consumes batches of [`MessageView`]s produced by a session and keeps the
//! visible list ordered, de-duplicated and scrolled to the newest entry.

use super::view::MessageView;
use crate::store::MessageId;

/// The visible message list of one chat view
#[derive(Debug, Default)]
pub struct MessageList {
    /// Views ordered by `sort_key` ascending; ties keep arrival order
    items: Vec<MessageView>,
    scroll_request: Option<MessageId>,
    notice: Option<String>,
}

impl MessageList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one delivered batch in the order received.
    ///
    /// Returns how many views were inserted. After a non-empty batch the list
    /// requests a scroll to its newest entry.
    pub fn apply_batch(&mut self, batch: Vec<MessageView>) -> usize {
        let mut inserted = 0;

        for view in batch {
            if self.items.iter().any(|v| v.id == view.id) {
                tracing::trace!(message_id = %view.id, "Duplicate view ignored");
                continue;
            }
            let pos = self
                .items
                .partition_point(|existing| existing.sort_key <= view.sort_key);
            self.items.insert(pos, view);
            inserted += 1;
        }

        if inserted > 0 {
            self.scroll_request = self.items.last().map(|v| v.id.clone());
        }
        inserted
    }

    /// Pending scroll-to-newest request, if any
    pub fn take_scroll_request(&mut self) -> Option<MessageId> {
        self.scroll_request.take()
    }

    /// Show a non-blocking notice (e.g. a failed send)
    pub fn show_notice(&mut self, notice: impl Into<String>) {
        self.notice = Some(notice.into());
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    pub fn items(&self) -> &[MessageView] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Remove every message, e.g. before subscribing to a new room
    pub fn clear(&mut self) {
        self.items.clear();
        self.scroll_request = None;
    }

    /// HTML for the whole list
    pub fn render_html(&self) -> String {
        self.items.iter().map(MessageView::render_html).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn view(id: &str, offset_secs: i64) -> MessageView {
        MessageView {
            id: id.to_string(),
            is_own: false,
            author_label: "Kind Heart".to_string(),
            initials: "KH".to_string(),
            text_html: id.to_string(),
            time_label: "Just now".to_string(),
            sort_key: Utc::now() + Duration::seconds(offset_secs),
        }
    }

    fn ids(list: &MessageList) -> Vec<&str> {
        list.items().iter().map(|v| v.id.as_str()).collect()
    }

    #[test]
    fn test_out_of_order_delivery_renders_ascending() {
        let mut list = MessageList::new();
        list.apply_batch(vec![view("c", 30), view("a", 10)]);
        list.apply_batch(vec![view("b", 20)]);
        assert_eq!(ids(&list), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_equal_keys_keep_arrival_order() {
        let base = view("x", 0);
        let mut second = base.clone();
        second.id = "y".to_string();

        let mut list = MessageList::new();
        list.apply_batch(vec![base, second]);
        assert_eq!(ids(&list), vec!["x", "y"]);
    }

    #[test]
    fn test_duplicates_ignored() {
        let mut list = MessageList::new();
        assert_eq!(list.apply_batch(vec![view("a", 0)]), 1);
        assert_eq!(list.apply_batch(vec![view("a", 0)]), 0);
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn test_scroll_requested_after_each_batch() {
        let mut list = MessageList::new();
        list.apply_batch(vec![view("a", 0), view("b", 5)]);
        assert_eq!(list.take_scroll_request().as_deref(), Some("b"));
        assert!(list.take_scroll_request().is_none());

        list.apply_batch(vec![]);
        assert!(list.take_scroll_request().is_none());
    }

    #[test]
    fn test_notice_and_clear() {
        let mut list = MessageList::new();
        list.apply_batch(vec![view("a", 0)]);
        list.show_notice("Failed to send message. Please try again.");
        assert!(list.notice().is_some());
        list.dismiss_notice();
        assert!(list.notice().is_none());

        list.clear();
        assert!(list.is_empty());
        assert_eq!(list.render_html(), "");
    }
}
