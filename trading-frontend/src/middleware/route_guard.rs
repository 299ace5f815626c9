//! Request-time access rules: signed-in users are bounced off the anonymous
//! pages, anonymous visitors are bounced off the app pages, everything else
//! passes through untouched.

use axum::{
    body::Body,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::models::user::session_keys;

/// Pages that only make sense without a session (exact match).
const ANONYMOUS_ONLY: [&str; 3] = ["/login", "/signup", "/"];

/// App pages that require a session (prefix match).
const PROTECTED: [&str; 4] = ["/home", "/profile", "/investments", "/transactions"];

/// Static assets and operational endpoints the guard never evaluates.
const EXCLUDED_PREFIXES: [&str; 2] = ["/static/", "/favicon.ico"];
const EXCLUDED_EXACT: [&str; 2] = ["/health", "/metrics"];
const IMAGE_EXTENSIONS: [&str; 6] = [".svg", ".png", ".jpg", ".jpeg", ".gif", ".webp"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    Allow,
    RedirectToLogin,
    RedirectToHome,
}

pub fn is_excluded(path: &str) -> bool {
    EXCLUDED_PREFIXES.iter().any(|p| path.starts_with(p))
        || EXCLUDED_EXACT.contains(&path)
        || IMAGE_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
}

/// The guard's full decision table over (path, session presence).
pub fn evaluate(path: &str, authenticated: bool) -> RouteDecision {
    if is_excluded(path) {
        return RouteDecision::Allow;
    }

    if authenticated && ANONYMOUS_ONLY.contains(&path) {
        return RouteDecision::RedirectToHome;
    }

    if !authenticated && PROTECTED.iter().any(|route| path.starts_with(route)) {
        return RouteDecision::RedirectToLogin;
    }

    RouteDecision::Allow
}

pub async fn route_guard(session: Session, request: Request<Body>, next: Next) -> Response {
    let path = request.uri().path().to_string();

    let access_token: Option<String> = session
        .get(session_keys::ACCESS_TOKEN)
        .await
        .unwrap_or(None);

    match evaluate(&path, access_token.is_some()) {
        RouteDecision::Allow => next.run(request).await,
        RouteDecision::RedirectToLogin => Redirect::to("/login").into_response(),
        RouteDecision::RedirectToHome => Redirect::to("/home").into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authenticated_users_leave_anonymous_pages() {
        assert_eq!(evaluate("/login", true), RouteDecision::RedirectToHome);
        assert_eq!(evaluate("/signup", true), RouteDecision::RedirectToHome);
        assert_eq!(evaluate("/", true), RouteDecision::RedirectToHome);
    }

    #[test]
    fn anonymous_users_leave_protected_pages() {
        assert_eq!(evaluate("/home", false), RouteDecision::RedirectToLogin);
        assert_eq!(evaluate("/profile", false), RouteDecision::RedirectToLogin);
        assert_eq!(
            evaluate("/transactions/export", false),
            RouteDecision::RedirectToLogin
        );
    }

    #[test]
    fn everything_else_passes() {
        assert_eq!(evaluate("/", false), RouteDecision::Allow);
        assert_eq!(evaluate("/login", false), RouteDecision::Allow);
        assert_eq!(evaluate("/home", true), RouteDecision::Allow);
        assert_eq!(evaluate("/forgot-password", false), RouteDecision::Allow);
        assert_eq!(evaluate("/reset-password", false), RouteDecision::Allow);
    }

    #[test]
    fn assets_and_operational_paths_are_never_evaluated() {
        assert_eq!(evaluate("/static/styles.css", false), RouteDecision::Allow);
        assert_eq!(evaluate("/favicon.ico", true), RouteDecision::Allow);
        assert_eq!(evaluate("/health", false), RouteDecision::Allow);
        assert_eq!(evaluate("/metrics", true), RouteDecision::Allow);
        assert_eq!(evaluate("/logo.png", true), RouteDecision::Allow);
    }
}
