// SPDX-License-Identifier: EUPL-1.2

//! Axum route handlers for browsing the catalog.
//!
//! ## Endpoints
//!
//! - `GET /health`                 — Health check
//! - `GET /tools`                  — Filtered, sorted listing
//! - `GET /tools/featured`         — Featured tools
//! - `GET /tools/trending`         — Most viewed tools
//! - `GET /tools/:id`              — Tool detail (counts a view)
//! - `GET /tools/:id/related`      — Tools sharing a category
//! - `GET /search`                 — Plain (`q`) or natural-language (`nq`) search
//! - `GET /categories`             — Visible categories
//! - `GET /categories/:id/tools`   — Tools in one category

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::{
    catalog::{self, ToolFilter},
    db::AppState,
    error::CatalogError,
    identity::Caller,
    intent::{self, SearchIntent},
    models::{LimitQuery, PriceFilter, SearchQuery, SortKey, Tool, ToolListQuery},
};

pub(crate) const MAX_TRENDING_LIMIT: usize = 100;

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Tool by id through the cache, hidden ones included.
pub(crate) async fn load_tool(state: &AppState, id: Uuid) -> Result<Option<Tool>, CatalogError> {
    if let Some(cache) = &state.cache {
        if let Some(tool) = cache.get(id).await {
            return Ok(Some(tool));
        }
    }

    let tool = state.store.get_tool(id).await?;
    if let (Some(cache), Some(tool)) = (&state.cache, &tool) {
        cache.put(tool).await;
    }
    Ok(tool)
}

pub(crate) async fn invalidate_tool(state: &AppState, id: Uuid) {
    if let Some(cache) = &state.cache {
        cache.invalidate(id).await;
    }
}

pub(crate) fn tool_not_found(id: Uuid) -> CatalogError {
    CatalogError::NotFound(format!("Tool {id} not found"))
}

/// A tool the caller may see: hidden tools only exist for admins.
pub(crate) async fn visible_tool(state: &AppState, caller: &Caller, id: Uuid) -> Result<Tool, CatalogError> {
    let is_admin = caller.0.as_ref().is_some_and(|i| i.is_admin);
    load_tool(state, id)
        .await?
        .filter(|t| !t.hidden || is_admin)
        .ok_or_else(|| tool_not_found(id))
}

// ── Health ────────────────────────────────────────────────────────────────────

/// `GET /health` — Health check
pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "toolshelf",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

// ── Listing ───────────────────────────────────────────────────────────────────

/// `GET /tools?category=&price=&sort=` — Catalog listing.
///
/// Hidden tools are never listed. `sort` accepts `Rating` (default),
/// `Latest` and `Trending`; anything else keeps store order.
pub async fn list_tools(
    State(state): State<Arc<AppState>>,
    Query(q): Query<ToolListQuery>,
) -> Result<Json<Value>, CatalogError> {
    let filter = ToolFilter {
        category: q.category,
        price: PriceFilter::parse(q.price.as_deref()).map_err(CatalogError::Validation)?,
        sort: q.sort.as_deref().map(SortKey::parse).unwrap_or_default(),
    };

    let tools = catalog::filter_tools(&state.store.list_tools().await?, &filter);

    Ok(Json(json!({
        "count": tools.len(),
        "tools": tools,
    })))
}

/// `GET /tools/featured`
pub async fn featured_tools(State(state): State<Arc<AppState>>) -> Result<Json<Value>, CatalogError> {
    let tools = catalog::featured(&state.store.list_tools().await?);
    Ok(Json(json!({ "count": tools.len(), "tools": tools })))
}

/// `GET /tools/trending?limit=` — Visible tools by view count, 12 by default.
pub async fn trending_tools(
    State(state): State<Arc<AppState>>,
    Query(q): Query<LimitQuery>,
) -> Result<Json<Value>, CatalogError> {
    let limit = q.limit.unwrap_or(catalog::TRENDING_LIMIT).min(MAX_TRENDING_LIMIT);
    let tools = catalog::trending(&state.store.list_tools().await?, limit);
    Ok(Json(json!({ "count": tools.len(), "tools": tools })))
}

// ── Detail ────────────────────────────────────────────────────────────────────

/// `GET /tools/:id` — Tool detail. Every hit counts as a view.
pub async fn get_tool(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    Path(id): Path<Uuid>,
) -> Result<Json<Tool>, CatalogError> {
    let mut tool = visible_tool(&state, &caller, id).await?;

    if let Some(views) = state.store.record_view(id).await? {
        tool.view_count = views;
    }

    Ok(Json(tool))
}

/// `GET /tools/:id/related` — Up to three best-rated tools sharing a category.
pub async fn related_tools(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, CatalogError> {
    visible_tool(&state, &caller, id).await?;
    let tools = catalog::related(&state.store.list_tools().await?, id);
    Ok(Json(json!({ "count": tools.len(), "tools": tools })))
}

// ── Search ────────────────────────────────────────────────────────────────────

/// `GET /search?q=…` or `GET /search?nq=…`.
///
/// `nq` runs the keyword-intent matcher and wins when both are present.
/// Without either parameter the result is empty.
pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(q): Query<SearchQuery>,
) -> Result<Json<Value>, CatalogError> {
    let natural = q.nq.as_deref().map(str::trim).filter(|s| !s.is_empty());
    let plain = q.q.as_deref().map(str::trim).filter(|s| !s.is_empty());

    match (natural, plain) {
        (Some(query), _) => {
            let tools = state.store.list_tools().await?;
            let categories = state.store.list_categories().await?;

            let intent = SearchIntent::parse(query, &categories);
            let results = intent::natural_search(&tools, &categories, query);

            Ok(Json(json!({
                "mode": "natural",
                "query": query,
                "intent": {
                    "price": intent.price,
                    "categories": intent.categories.iter().map(|c| &c.name).collect::<Vec<_>>(),
                },
                "count": results.len(),
                "tools": results,
            })))
        }
        (None, Some(query)) => {
            let results = catalog::text_search(&state.store.list_tools().await?, query);
            Ok(Json(json!({
                "mode": "keyword",
                "query": query,
                "count": results.len(),
                "tools": results,
            })))
        }
        (None, None) => Ok(Json(json!({
            "mode": "none",
            "query": "",
            "count": 0,
            "tools": [],
        }))),
    }
}

// ── Categories ────────────────────────────────────────────────────────────────

/// `GET /categories` — Visible categories.
pub async fn list_categories(State(state): State<Arc<AppState>>) -> Result<Json<Value>, CatalogError> {
    let categories: Vec<_> = state
        .store
        .list_categories()
        .await?
        .into_iter()
        .filter(|c| !c.hidden)
        .collect();

    Ok(Json(json!({ "count": categories.len(), "categories": categories })))
}

/// `GET /categories/:id/tools` — Visible tools of a visible category.
pub async fn category_tools(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, CatalogError> {
    let category = state
        .store
        .get_category(id)
        .await?
        .filter(|c| !c.hidden)
        .ok_or_else(|| CatalogError::NotFound(format!("Category {id} not found")))?;

    let tools = catalog::in_category(&state.store.list_tools().await?, &category.name);

    Ok(Json(json!({
        "category": category,
        "count": tools.len(),
        "tools": tools,
    })))
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PriceTier;
    use crate::test_support::*;
    use axum::http::StatusCode;

    #[tokio::test]
    async fn health_returns_ok() {
        let resp = health().await;
        assert_eq!(resp.0["status"], "ok");
        assert_eq!(resp.0["service"], "toolshelf");
    }

    #[tokio::test]
    async fn listing_applies_filters_and_hides_hidden_tools() {
        let (server, state) = test_server().await;
        let hidden = tool("Shadow", PriceTier::Paid).in_categories(&["Voice"]).hidden();
        state.store.insert_tool(&hidden).await.unwrap();

        let resp = server
            .get("/tools")
            .add_query_param("price", "Paid")
            .add_query_param("sort", "Trending")
            .await;
        resp.assert_status_ok();
        let body: Value = resp.json();
        let tools = body["tools"].as_array().unwrap();
        assert!(!tools.is_empty());
        assert!(tools.iter().all(|t| t["price"] == "Paid" && t["hidden"] == false));

        let views: Vec<u64> = tools.iter().map(|t| t["view_count"].as_u64().unwrap()).collect();
        assert!(views.windows(2).all(|w| w[0] >= w[1]));
    }

    #[tokio::test]
    async fn bad_price_filter_is_rejected() {
        let (server, _) = test_server().await;
        server
            .get("/tools")
            .add_query_param("price", "cheap")
            .await
            .assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn tool_detail_counts_views_and_hides_hidden_tools() {
        let (server, state) = test_server().await;
        let t = tool("Counter", PriceTier::Free).viewed(10);
        let ghost = tool("Ghost", PriceTier::Free).hidden();
        state.store.insert_tool(&t).await.unwrap();
        state.store.insert_tool(&ghost).await.unwrap();

        let body: Value = server.get(&format!("/tools/{}", t.id)).await.json();
        assert_eq!(body["view_count"], 11);

        server
            .get(&format!("/tools/{}", ghost.id))
            .await
            .assert_status(StatusCode::NOT_FOUND);
        server
            .get(&format!("/tools/{}", Uuid::new_v4()))
            .await
            .assert_status(StatusCode::NOT_FOUND);

        let admin = admin_token(&state).await;
        server
            .get(&format!("/tools/{}", ghost.id))
            .add_header(AUTH, bearer(&admin))
            .await
            .assert_status_ok();
    }

    #[tokio::test]
    async fn natural_search_reports_detected_intent() {
        let (server, _) = test_server().await;
        let body: Value = server
            .get("/search")
            .add_query_param("nq", "free tool for writing")
            .await
            .json();

        assert_eq!(body["mode"], "natural");
        assert_eq!(body["intent"]["price"], "Free");
        assert_eq!(body["intent"]["categories"][0], "Text");
        let tools = body["tools"].as_array().unwrap();
        assert!(!tools.is_empty());
        assert!(tools.iter().all(|t| t["price"] == "Free"));
    }

    #[tokio::test]
    async fn plain_search_and_empty_search() {
        let (server, _) = test_server().await;
        let body: Value = server.get("/search").add_query_param("q", "writer").await.json();
        assert_eq!(body["mode"], "keyword");
        assert_eq!(body["tools"][0]["name"], "WriterAI");

        let body: Value = server.get("/search").await.json();
        assert_eq!(body["count"], 0);
    }

    #[tokio::test]
    async fn category_listing_skips_hidden_categories() {
        let (server, state) = test_server().await;
        let mut cat = category("Secret", &[]);
        cat.hidden = true;
        state.store.insert_category(&cat).await.unwrap();

        let body: Value = server.get("/categories").await.json();
        let names: Vec<&str> = body["categories"]
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["name"].as_str().unwrap())
            .collect();
        assert!(names.contains(&"Text"));
        assert!(!names.contains(&"Secret"));

        server
            .get(&format!("/categories/{}/tools", cat.id))
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn related_and_trending_endpoints() {
        let (server, state) = test_server().await;
        let tools = state.store.list_tools().await.unwrap();
        let writer = tools.iter().find(|t| t.name == "WriterAI").unwrap();

        let body: Value = server.get(&format!("/tools/{}/related", writer.id)).await.json();
        assert_eq!(body["tools"][0]["name"], "SummarizeBot");

        let body: Value = server.get("/tools/trending").add_query_param("limit", 2).await.json();
        assert_eq!(body["count"], 2);
        assert_eq!(body["tools"][0]["name"], "VoiceGenius");
    }
}
