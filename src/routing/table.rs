//! Fixed route table.
//!
//! Evaluated in order, first match wins. Path rewrites map the `/app`
//! surface onto the backend's root-relative layout; the SPA shell is
//! served for any other `/app` path.

use axum::http::Method;

/// What the gateway should do with an authenticated request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteAction {
    /// Forward to the fixed upstream origin.
    Forward(ForwardRule),

    /// Redirect `GET /` (non-upgrade) to the app shell.
    RedirectToApp,

    /// Bridge `GET /` (websocket upgrade) to the backend socket endpoint.
    Bridge,

    /// No rule matched.
    NotFound,
}

/// A resolved forwarding rule for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForwardRule {
    /// Upstream path after any rewrite (query string appended separately).
    pub target_path: String,

    /// Inject the configured upstream bearer token. Forwarding fails with
    /// a configuration error when the token is unset.
    pub inject_upstream_token: bool,
}

impl ForwardRule {
    fn passthrough(path: &str) -> RouteAction {
        RouteAction::Forward(Self {
            target_path: path.to_string(),
            inject_upstream_token: false,
        })
    }

    fn rewritten(path: impl Into<String>) -> RouteAction {
        RouteAction::Forward(Self {
            target_path: path.into(),
            inject_upstream_token: false,
        })
    }
}

/// Resolve a request against the fixed table.
pub fn resolve(method: &Method, path: &str, is_upgrade: bool) -> RouteAction {
    if path == "/" {
        return match (method, is_upgrade) {
            (&Method::GET, true) => RouteAction::Bridge,
            (&Method::GET, false) => RouteAction::RedirectToApp,
            _ => RouteAction::NotFound,
        };
    }

    match *method {
        Method::POST => match path {
            "/v1/chat/completions" => RouteAction::Forward(ForwardRule {
                target_path: path.to_string(),
                inject_upstream_token: true,
            }),
            "/tools/invoke" => ForwardRule::passthrough(path),
            _ => RouteAction::NotFound,
        },
        Method::GET => {
            if let Some(rest) = path.strip_prefix("/app/assets/") {
                return ForwardRule::rewritten(format!("/assets/{}", rest));
            }
            if path == "/app/favicon.ico" || path == "/app/favicon.svg" {
                // Fixed target: favicons live at the backend root.
                return ForwardRule::rewritten(path.trim_start_matches("/app").to_string());
            }
            if path == "/app" || path.starts_with("/app/") {
                // SPA shell: every other app path maps to the backend root.
                return ForwardRule::rewritten("/");
            }
            if path.starts_with("/assets/") {
                return ForwardRule::passthrough(path);
            }
            RouteAction::NotFound
        }
        _ => RouteAction::NotFound,
    }
}
