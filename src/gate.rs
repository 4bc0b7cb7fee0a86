// SPDX-License-Identifier: EUPL-1.2

//! Page-level access gate.
//!
//! Every navigation is evaluated afresh: while the session is still being
//! resolved nothing is decided, afterwards the page is either allowed or the
//! caller is redirected.

use serde::Serialize;

pub const HOME_PATH: &str = "/";
pub const LOGIN_PATH: &str = "/login";
pub const SIGNUP_PATH: &str = "/signup";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Access {
    Public,
    AuthOnly,
    AdminOnly,
}

/// Session as seen by the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Loading,
    Resolved { authenticated: bool, is_admin: bool },
}

impl SessionState {
    pub fn anonymous() -> Self {
        SessionState::Resolved { authenticated: false, is_admin: false }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum GateDecision {
    Loading,
    Allow,
    Redirect {
        to: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        return_to: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        notice: Option<String>,
    },
}

impl GateDecision {
    fn redirect(to: &str) -> Self {
        GateDecision::Redirect { to: to.to_string(), return_to: None, notice: None }
    }
}

/// Split `path` into its route and the `?query#fragment` suffix.
fn split_route(path: &str) -> (&str, &str) {
    let end = path.find(['?', '#']).unwrap_or(path.len());
    path.split_at(end)
}

/// The route part of `path` without trailing slashes; `/` stays `/`.
pub fn route_path(path: &str) -> &str {
    let route = split_route(path).0.trim_end_matches('/');
    if route.is_empty() {
        HOME_PATH
    } else {
        route
    }
}

/// Access level of a client route.
pub fn access_for(path: &str) -> Access {
    let path = route_path(path);
    if path == "/admin" || path.starts_with("/admin/") {
        Access::AdminOnly
    } else if matches!(path, "/bookmarks" | "/dashboard") {
        Access::AuthOnly
    } else {
        Access::Public
    }
}

/// Rewrite legacy routes: `/tools/{id}` became `/tool/{id}` and `/tools`
/// folded into the home page.
pub fn canonical_path(path: &str) -> String {
    let suffix = split_route(path).1;
    let route = route_path(path);
    if route == "/tools" {
        return format!("{HOME_PATH}{suffix}");
    }
    match route.strip_prefix("/tools/") {
        Some(id) => format!("/tool/{id}{suffix}"),
        None => path.to_string(),
    }
}

pub fn evaluate(access: Access, path: &str, session: SessionState) -> GateDecision {
    let SessionState::Resolved { authenticated, is_admin } = session else {
        return GateDecision::Loading;
    };

    let needs_auth = matches!(access, Access::AuthOnly | Access::AdminOnly);
    if needs_auth && !authenticated {
        return GateDecision::Redirect {
            to: LOGIN_PATH.to_string(),
            return_to: Some(path.to_string()),
            notice: None,
        };
    }

    if access == Access::AdminOnly && !is_admin {
        return GateDecision::Redirect {
            to: HOME_PATH.to_string(),
            return_to: None,
            notice: Some("Access denied: you don't have permission to view this page".into()),
        };
    }

    let route = route_path(path);
    if authenticated && (route == LOGIN_PATH || route == SIGNUP_PATH) {
        return GateDecision::redirect(HOME_PATH);
    }

    GateDecision::Allow
}

/// Canonicalise `path`, look up its access level and evaluate it.
pub fn navigate(path: &str, session: SessionState) -> GateDecision {
    let canonical = canonical_path(path);
    match evaluate(access_for(&canonical), &canonical, session) {
        GateDecision::Allow if canonical != path => GateDecision::redirect(&canonical),
        decision => decision,
    }
}
