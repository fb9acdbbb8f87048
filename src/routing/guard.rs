//! Route gating decisions.
//!
//! The guard is a pure function of `(requested route, session state)`:
//! it performs no I/O and is re-evaluated synchronously whenever either
//! input changes. It only *decides*; navigating is the caller's job,
//! which keeps the policy unit-testable without a running UI.

use crate::identity::store::SessionState;

/// Outcome of a guard evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    /// Render the requested route (or a neutral loading view while the
    /// session state is still unsettled)
    Allow,
    /// Navigate to the given route instead
    Redirect(String),
}

/// Route classification the guard evaluates against.
#[derive(Debug, Clone)]
pub struct RoutePolicy {
    /// Where unauthenticated visitors of protected routes are sent
    pub login_route: String,
    /// Authenticated landing route; also the target when a logged-in
    /// user hits a guest-only route
    pub landing_route: String,
    /// Routes only meaningful while logged out (login, register, ...)
    pub guest_only: Vec<String>,
    /// Routes open to everyone; everything not listed here or in
    /// `guest_only` requires authentication
    pub public: Vec<String>,
}

impl Default for RoutePolicy {
    fn default() -> Self {
        Self {
            login_route: "/login".to_string(),
            landing_route: "/dashboard".to_string(),
            guest_only: vec![
                "/login".to_string(),
                "/register".to_string(),
                "/password-reset".to_string(),
                "/forgot-password".to_string(),
            ],
            public: vec![],
        }
    }
}

/// Decides allow-or-redirect for a requested route.
pub struct RouteGuard {
    policy: RoutePolicy,
}

impl RouteGuard {
    pub fn new(policy: RoutePolicy) -> Self {
        Self { policy }
    }

    /// Evaluate the policy, first match wins:
    /// 1. guest-only route while authenticated -> redirect to landing;
    /// 2. state not settled -> allow (defer, never redirect on
    ///    incomplete information);
    /// 3. protected route while anonymous -> redirect to login;
    /// 4. otherwise allow.
    pub fn decide(&self, route: &str, state: &SessionState) -> RouteDecision {
        let path = normalize(route);

        if self.is_guest_only(path) && state.is_authenticated() {
            return RouteDecision::Redirect(self.policy.landing_route.clone());
        }

        if !state.is_settled() {
            return RouteDecision::Allow;
        }

        if self.requires_auth(path) && !state.is_authenticated() {
            return RouteDecision::Redirect(self.policy.login_route.clone());
        }

        RouteDecision::Allow
    }

    fn is_guest_only(&self, path: &str) -> bool {
        self.policy.guest_only.iter().any(|r| r == path)
    }

    fn requires_auth(&self, path: &str) -> bool {
        !self.is_guest_only(path) && !self.policy.public.iter().any(|r| r == path)
    }
}

impl Default for RouteGuard {
    fn default() -> Self {
        Self::new(RoutePolicy::default())
    }
}

/// Strip the query string and a trailing slash so `/dashboard/?tab=jobs`
/// matches `/dashboard`.
fn normalize(route: &str) -> &str {
    let path = route.split('?').next().unwrap_or(route);
    if path.len() > 1 {
        path.trim_end_matches('/')
    } else {
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::models::IdentitySession;
    use chrono::Utc;
    use std::sync::Arc;
    use uuid::Uuid;

    fn authenticated() -> SessionState {
        SessionState::Authenticated(Arc::new(IdentitySession {
            user_id: Uuid::new_v4(),
            email: "a@b.com".to_string(),
            email_confirmed_at: Some(Utc::now()),
            profile: None,
            organization: None,
            roles: vec![],
        }))
    }

    #[test]
    fn test_anonymous_on_protected_route_redirects_to_login() {
        let guard = RouteGuard::default();
        assert_eq!(
            guard.decide("/dashboard", &SessionState::Anonymous),
            RouteDecision::Redirect("/login".to_string())
        );
        assert_eq!(
            guard.decide("/jobs/42", &SessionState::Anonymous),
            RouteDecision::Redirect("/login".to_string())
        );
    }

    #[test]
    fn test_authenticated_on_guest_route_redirects_to_landing() {
        let guard = RouteGuard::default();
        for route in ["/login", "/register", "/password-reset", "/forgot-password"] {
            assert_eq!(
                guard.decide(route, &authenticated()),
                RouteDecision::Redirect("/dashboard".to_string())
            );
        }
    }

    #[test]
    fn test_unsettled_state_defers() {
        let guard = RouteGuard::default();
        assert_eq!(guard.decide("/dashboard", &SessionState::Loading), RouteDecision::Allow);
        assert_eq!(
            guard.decide("/candidates", &SessionState::Uninitialized),
            RouteDecision::Allow
        );
        // Guest-only routes also render while loading
        assert_eq!(guard.decide("/login", &SessionState::Loading), RouteDecision::Allow);
    }

    #[test]
    fn test_allows_settled_matches() {
        let guard = RouteGuard::default();
        assert_eq!(guard.decide("/dashboard", &authenticated()), RouteDecision::Allow);
        assert_eq!(guard.decide("/login", &SessionState::Anonymous), RouteDecision::Allow);
    }

    #[test]
    fn test_public_routes_skip_the_auth_check() {
        let guard = RouteGuard::new(RoutePolicy {
            public: vec!["/about".to_string()],
            ..RoutePolicy::default()
        });
        assert_eq!(guard.decide("/about", &SessionState::Anonymous), RouteDecision::Allow);
    }

    #[test]
    fn test_query_string_and_trailing_slash_are_ignored() {
        let guard = RouteGuard::default();
        assert_eq!(
            guard.decide("/login/?next=%2Fjobs", &authenticated()),
            RouteDecision::Redirect("/dashboard".to_string())
        );
        assert_eq!(
            guard.decide("/dashboard/?tab=jobs", &SessionState::Anonymous),
            RouteDecision::Redirect("/login".to_string())
        );
    }
}
