//! Route guard
//!
//! Decides whether a page may be shown to the current principal or where to
//! redirect instead. Email verification is only demanded from principals
//! that signed in with a password.

use crate::store::{AuthSource, Principal, StoreResult};

/// Page locations the guard redirects between
#[derive(Debug, Clone)]
pub struct RoutePaths {
    /// Pages anyone may see
    pub public: Vec<String>,
    pub login: String,
    pub sign_up: String,
    /// Page for signed-in users still waiting on email verification
    pub waiting: String,
    pub dashboard: String,
}

impl Default for RoutePaths {
    fn default() -> Self {
        Self {
            public: vec![
                "/".to_string(),
                "/index.html".to_string(),
                "/pages/login.html".to_string(),
                "/pages/sign_up.html".to_string(),
            ],
            login: "/pages/login.html".to_string(),
            sign_up: "/pages/sign_up.html".to_string(),
            waiting: "/pages/waiting.html".to_string(),
            dashboard: "/pages/newdash.html".to_string(),
        }
    }
}

/// Outcome of a guard check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    /// Replace the current location with this path
    Redirect(String),
}

/// Kind of page a path points at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    Public,
    Waiting,
    Protected,
}

/// Route policy over a set of page locations
#[derive(Debug, Clone, Default)]
pub struct RouteGuard {
    paths: RoutePaths,
}

impl RouteGuard {
    pub fn new(paths: RoutePaths) -> Self {
        Self { paths }
    }

    pub fn paths(&self) -> &RoutePaths {
        &self.paths
    }

    /// Classify a request path (case-insensitive)
    pub fn classify(&self, path: &str) -> PageKind {
        let path = path.to_lowercase();

        if self.paths.public.iter().any(|p| p.to_lowercase() == path) {
            return PageKind::Public;
        }

        let waiting = self.paths.waiting.to_lowercase();
        let waiting_file = waiting.rsplit('/').next().unwrap_or(&waiting);
        if path.ends_with(&waiting) || path.ends_with(&format!("/{}", waiting_file)) {
            return PageKind::Waiting;
        }

        PageKind::Protected
    }

    /// Decide for an already resolved principal
    pub fn evaluate(&self, path: &str, principal: Option<&Principal>) -> GuardDecision {
        let decision = match (self.classify(path), principal) {
            (PageKind::Public, Some(p)) if p.is_cleared() => self.redirect(&self.paths.dashboard),
            (PageKind::Public, _) => GuardDecision::Allow,

            (PageKind::Waiting, None) => self.redirect(&self.paths.sign_up),
            (PageKind::Waiting, Some(p)) if p.is_cleared() => self.redirect(&self.paths.dashboard),
            (PageKind::Waiting, Some(_)) => GuardDecision::Allow,

            (PageKind::Protected, None) => self.redirect(&self.paths.login),
            (PageKind::Protected, Some(p)) if !p.is_cleared() => self.redirect(&self.paths.waiting),
            (PageKind::Protected, Some(_)) => GuardDecision::Allow,
        };

        tracing::debug!(
            path = %path,
            user_id = ?principal.map(|p| p.uid.as_str()),
            decision = ?decision,
            "Route guard evaluated"
        );
        decision
    }

    /// Reload the principal from `auth` and decide
    pub async fn check(&self, path: &str, auth: &dyn AuthSource) -> StoreResult<GuardDecision> {
        let principal = auth.current_principal().await?;
        Ok(self.evaluate(path, principal.as_ref()))
    }

    fn redirect(&self, target: &str) -> GuardDecision {
        GuardDecision::Redirect(target.to_string())
    }
}
