//! Navigation highlighting
//!
//! Which sidebar item or navbar link belongs to the current page.

/// Page assumed when the path has no file name
pub const DEFAULT_PAGE: &str = "userdashboard.html";

/// A sidebar entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavItem {
    pub label: String,
    pub href: String,
    /// Font Awesome icon class
    pub icon: String,
}

impl NavItem {
    pub fn new(label: &str, href: &str, icon: &str) -> Self {
        Self {
            label: label.to_string(),
            href: href.to_string(),
            icon: icon.to_string(),
        }
    }
}

/// The standard sidebar entries
pub fn default_sidebar() -> Vec<NavItem> {
    vec![
        NavItem::new("Dashboard", "userdashboard.html", "fa-home"),
        NavItem::new("AI Chatbot", "aichatbot.html", "fa-robot"),
        NavItem::new("Community", "community_list.html", "fa-users"),
        NavItem::new("Profile", "profile.html", "fa-user"),
    ]
}

/// Last path segment, or [`DEFAULT_PAGE`] when empty
pub fn current_page(path: &str) -> &str {
    match path.rsplit('/').next() {
        Some(page) if !page.is_empty() => page,
        _ => DEFAULT_PAGE,
    }
}

/// Sidebar rule: the href names the current page or appears in the path
pub fn is_sidebar_item_active(path: &str, href: &str) -> bool {
    current_page(path) == href || path.contains(href)
}

/// Indices of the active sidebar items
pub fn active_sidebar_items(path: &str, items: &[NavItem]) -> Vec<usize> {
    items
        .iter()
        .enumerate()
        .filter(|(_, item)| is_sidebar_item_active(path, &item.href))
        .map(|(i, _)| i)
        .collect()
}

/// Navbar rule: the href names the current page, with `index.html` standing
/// in for an empty one
pub fn is_navbar_link_active(path: &str, href: &str) -> bool {
    let page = path.rsplit('/').next().unwrap_or_default();
    href == page || (page.is_empty() && href == "index.html")
}

/// HTML for the sidebar navigation list with active items marked
pub fn render_sidebar_html(path: &str, items: &[NavItem]) -> String {
    let mut html = String::from("<ul class=\"nav-menu\">");
    for item in items {
        let class = if is_sidebar_item_active(path, &item.href) {
            "nav-item active"
        } else {
            "nav-item"
        };
        html.push_str(&format!(
            "<li class=\"{}\"><a href=\"{}\" class=\"nav-link\"><i class=\"fas {}\"></i><span>{}</span></a></li>",
            class, item.href, item.icon, item.label
        ));
    }
    html.push_str("</ul>");
    html
}
