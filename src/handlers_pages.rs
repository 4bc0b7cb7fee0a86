// SPDX-License-Identifier: EUPL-1.2

//! Static pages and client navigation checks.
//!
//! ## Endpoints
//!
//! - `GET /pages/:slug`       — Static page content
//! - `GET /navigate?path=`    — Gate decision for a client route

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde_json::{json, Value};

use crate::{
    db::AppState,
    error::CatalogError,
    gate::{self, GateDecision},
    identity::Caller,
    models::{NavigateQuery, Page},
};

/// `GET /pages/:slug`
pub async fn get_page(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Result<Json<Page>, CatalogError> {
    state
        .store
        .get_page(&slug)
        .await?
        .map(Json)
        .ok_or_else(|| CatalogError::NotFound(format!("Page {slug} not found")))
}

/// `GET /navigate?path=/admin` — Allow, or where to send the caller instead.
///
/// The session is resolved before answering, so the decision is never
/// `loading` here.
pub async fn navigate(caller: Caller, Query(q): Query<NavigateQuery>) -> Result<Json<Value>, CatalogError> {
    if !q.path.starts_with('/') {
        return Err(CatalogError::Validation(format!("path must start with '/', got: {}", q.path)));
    }

    let access = gate::access_for(&gate::canonical_path(&q.path));
    let decision: GateDecision = gate::navigate(&q.path, caller.session_state());

    Ok(Json(json!({
        "path": q.path,
        "access": access,
        "result": decision,
    })))
}

#[cfg(test)]
mod tests {
    use crate::test_support::*;
    use axum::http::StatusCode;
    use serde_json::Value;

    #[tokio::test]
    async fn seeded_pages_are_served() {
        let (server, _) = test_server().await;
        let page: Value = server.get("/pages/about").await.json();
        assert_eq!(page["title"], "About");
        server.get("/pages/missing").await.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn anonymous_admin_visit_goes_to_login() {
        let (server, _) = test_server().await;
        let body: Value = server.get("/navigate").add_query_param("path", "/admin/tools").await.json();

        assert_eq!(body["access"], "admin_only");
        assert_eq!(body["result"]["decision"], "redirect");
        assert_eq!(body["result"]["to"], "/login");
        assert_eq!(body["result"]["return_to"], "/admin/tools");

        let body: Value = server.get("/navigate").add_query_param("path", "/bookmarks/").await.json();
        assert_eq!(body["access"], "auth_only");
        assert_eq!(body["result"]["to"], "/login");
        assert_eq!(body["result"]["return_to"], "/bookmarks/");
    }

    #[tokio::test]
    async fn members_are_turned_away_from_admin_and_login() {
        let (server, state) = test_server().await;
        let token = member_token(&state, "jane@example.com").await;

        let body: Value = server
            .get("/navigate")
            .add_query_param("path", "/admin")
            .add_header(AUTH, bearer(&token))
            .await
            .json();
        assert_eq!(body["result"]["to"], "/");
        assert!(body["result"]["notice"].as_str().unwrap().starts_with("Access denied"));

        let body: Value = server
            .get("/navigate")
            .add_query_param("path", "/login?next=/bookmarks")
            .add_header(AUTH, bearer(&token))
            .await
            .json();
        assert_eq!(body["result"]["to"], "/");

        let body: Value = server
            .get("/navigate")
            .add_query_param("path", "/bookmarks")
            .add_header(AUTH, bearer(&token))
            .await
            .json();
        assert_eq!(body["result"]["decision"], "allow");
    }

    #[tokio::test]
    async fn legacy_tool_paths_redirect() {
        let (server, _) = test_server().await;
        let body: Value = server.get("/navigate").add_query_param("path", "/tools/abc").await.json();
        assert_eq!(body["result"]["decision"], "redirect");
        assert_eq!(body["result"]["to"], "/tool/abc");
    }
}
