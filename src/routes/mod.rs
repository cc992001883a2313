//! Page Routing
//!
//! - **RouteGuard**: allow or redirect a page based on sign-in and
//!   verification state
//! - **nav**: sidebar and navbar active-link rules

mod guard;
pub mod nav;

pub use guard::{GuardDecision, PageKind, RouteGuard, RoutePaths};
pub use nav::{default_sidebar, NavItem};
