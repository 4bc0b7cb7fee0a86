// SPDX-License-Identifier: EUPL-1.2

//! Back-office handlers. Every route here requires an admin session.
//!
//! ## Endpoints
//!
//! - `GET   /admin/stats`
//! - `GET   /admin/users`
//! - `GET   /admin/categories`                     — Hidden ones included
//! - `POST  /admin/tools`
//! - `PATCH /admin/tools/:id`
//! - `POST  /admin/tools/:id/toggle-hidden`
//! - `POST  /admin/tools/:id/toggle-featured`
//! - `POST  /admin/categories`
//! - `PATCH /admin/categories/:id`
//! - `POST  /admin/categories/:id/toggle-hidden`
//! - `POST  /admin/users/:id/block`
//! - `POST  /admin/users/:id/unblock`
//! - `PUT   /admin/pages/:slug`

use std::sync::{Arc, OnceLock};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use regex::Regex;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::{
    catalog,
    db::AppState,
    error::CatalogError,
    handlers::{invalidate_tool, tool_not_found},
    identity::Caller,
    models::{Category, CategoryPatch, NewCategoryRequest, NewToolRequest, Page, PageRequest, Tool, ToolPatch, User},
};

fn slug_pattern() -> &'static Regex {
    static SLUG: OnceLock<Regex> = OnceLock::new();
    SLUG.get_or_init(|| Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").expect("static regex"))
}

fn category_not_found(id: Uuid) -> CatalogError {
    CatalogError::NotFound(format!("Category {id} not found"))
}

/// Name present, every category known.
async fn validate_tool(state: &AppState, tool: &Tool) -> Result<(), CatalogError> {
    if tool.name.is_empty() {
        return Err(CatalogError::Validation("tool name must not be empty".into()));
    }

    let known = state.store.list_categories().await?;
    if let Some(unknown) = tool.categories.iter().find(|name| !known.iter().any(|c| &c.name == *name)) {
        return Err(CatalogError::Validation(format!("unknown category: {unknown}")));
    }
    Ok(())
}

async fn save_tool(state: &AppState, tool: &Tool) -> Result<(), CatalogError> {
    if !state.store.update_tool(tool).await? {
        return Err(tool_not_found(tool.id));
    }
    invalidate_tool(state, tool.id).await;
    Ok(())
}

async fn existing_tool(state: &AppState, id: Uuid) -> Result<Tool, CatalogError> {
    state.store.get_tool(id).await?.ok_or_else(|| tool_not_found(id))
}

async fn existing_category(state: &AppState, id: Uuid) -> Result<Category, CatalogError> {
    state.store.get_category(id).await?.ok_or_else(|| category_not_found(id))
}

// ── Overview ──────────────────────────────────────────────────────────────────

/// `GET /admin/stats` — Catalog totals and the five most viewed tools.
pub async fn stats(State(state): State<Arc<AppState>>, caller: Caller) -> Result<Json<Value>, CatalogError> {
    caller.require_admin("view statistics")?;

    let tools = state.store.list_tools().await?;
    let comments = state.store.list_all_comments().await?;
    let users = state.store.list_users().await?;

    Ok(Json(json!({
        "catalog": catalog::admin_stats(&tools, &comments),
        "total_users": users.len(),
        "blocked_users": users.iter().filter(|u| u.blocked).count(),
    })))
}

/// `GET /admin/users`
pub async fn list_users(State(state): State<Arc<AppState>>, caller: Caller) -> Result<Json<Value>, CatalogError> {
    caller.require_admin("list users")?;
    let users = state.store.list_users().await?;
    Ok(Json(json!({ "count": users.len(), "users": users })))
}

/// `GET /admin/categories`
pub async fn list_categories(
    State(state): State<Arc<AppState>>,
    caller: Caller,
) -> Result<Json<Value>, CatalogError> {
    caller.require_admin("manage categories")?;
    let categories = state.store.list_categories().await?;
    Ok(Json(json!({ "count": categories.len(), "categories": categories })))
}

// ── Tools ─────────────────────────────────────────────────────────────────────

/// `POST /admin/tools` — Add a listing. Rating and view count start at zero.
pub async fn create_tool(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    Json(req): Json<NewToolRequest>,
) -> Result<(StatusCode, Json<Tool>), CatalogError> {
    let admin = caller.require_admin("add tools")?;

    let tool = req.into_tool(Utc::now());
    validate_tool(&state, &tool).await?;
    state.store.insert_tool(&tool).await?;

    tracing::info!(tool = %tool.id, admin = %admin.user_id, "Tool added: {}", tool.name);
    Ok((StatusCode::CREATED, Json(tool)))
}

/// `PATCH /admin/tools/:id`
pub async fn update_tool(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    Path(id): Path<Uuid>,
    Json(patch): Json<ToolPatch>,
) -> Result<Json<Tool>, CatalogError> {
    caller.require_admin("edit tools")?;

    let mut tool = existing_tool(&state, id).await?;
    patch.apply(&mut tool);
    validate_tool(&state, &tool).await?;
    save_tool(&state, &tool).await?;

    tracing::info!(tool = %id, "Tool updated");
    Ok(Json(tool))
}

/// `POST /admin/tools/:id/toggle-hidden`
pub async fn toggle_tool_hidden(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    Path(id): Path<Uuid>,
) -> Result<Json<Tool>, CatalogError> {
    caller.require_admin("hide tools")?;

    let mut tool = existing_tool(&state, id).await?;
    tool.hidden = !tool.hidden;
    save_tool(&state, &tool).await?;

    tracing::info!(tool = %id, hidden = tool.hidden, "Tool visibility changed");
    Ok(Json(tool))
}

/// `POST /admin/tools/:id/toggle-featured`
pub async fn toggle_tool_featured(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    Path(id): Path<Uuid>,
) -> Result<Json<Tool>, CatalogError> {
    caller.require_admin("feature tools")?;

    let mut tool = existing_tool(&state, id).await?;
    tool.featured = !tool.featured;
    save_tool(&state, &tool).await?;

    Ok(Json(tool))
}

// ── Categories ────────────────────────────────────────────────────────────────

/// `POST /admin/categories` — 409 when the name is taken.
pub async fn create_category(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    Json(req): Json<NewCategoryRequest>,
) -> Result<(StatusCode, Json<Category>), CatalogError> {
    caller.require_admin("add categories")?;

    let name = req.name.trim();
    if name.is_empty() {
        return Err(CatalogError::Validation("category name must not be empty".into()));
    }

    let category = Category {
        id: Uuid::new_v4(),
        name: name.to_string(),
        linked_tags: req.linked_tags,
        hidden: false,
    };
    state.store.insert_category(&category).await?;

    tracing::info!(category = %category.id, "Category added: {}", category.name);
    Ok((StatusCode::CREATED, Json(category)))
}

/// `PATCH /admin/categories/:id` — A rename carries over to the tools listed
/// under the old name.
pub async fn update_category(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    Path(id): Path<Uuid>,
    Json(patch): Json<CategoryPatch>,
) -> Result<Json<Category>, CatalogError> {
    caller.require_admin("edit categories")?;

    let mut category = existing_category(&state, id).await?;
    let old_name = category.name.clone();
    patch.apply(&mut category);
    if category.name.is_empty() {
        return Err(CatalogError::Validation("category name must not be empty".into()));
    }

    // Tools carry category names, so cached copies go stale on a rename.
    let relisted = if category.name != old_name {
        catalog::listed_under(&state.store.list_tools().await?, &old_name)
    } else {
        Vec::new()
    };

    if !state.store.update_category(&category).await? {
        return Err(category_not_found(id));
    }
    for tool_id in relisted {
        invalidate_tool(&state, tool_id).await;
    }
    Ok(Json(category))
}

/// `POST /admin/categories/:id/toggle-hidden`
pub async fn toggle_category_hidden(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    Path(id): Path<Uuid>,
) -> Result<Json<Category>, CatalogError> {
    caller.require_admin("hide categories")?;

    let mut category = existing_category(&state, id).await?;
    category.hidden = !category.hidden;
    if !state.store.update_category(&category).await? {
        return Err(category_not_found(id));
    }
    Ok(Json(category))
}

// ── Users ─────────────────────────────────────────────────────────────────────

async fn set_blocked(state: &AppState, caller: &Caller, id: Uuid, blocked: bool) -> Result<User, CatalogError> {
    let admin = caller.require_admin("block users")?;
    if blocked && admin.user_id == id {
        return Err(CatalogError::Validation("admins cannot block their own account".into()));
    }

    let user = state
        .store
        .set_user_blocked(id, blocked)
        .await?
        .ok_or_else(|| CatalogError::NotFound(format!("User {id} not found")))?;

    tracing::info!(user = %id, admin = %admin.user_id, blocked, "User block state changed");
    Ok(user)
}

/// `POST /admin/users/:id/block`
pub async fn block_user(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    Path(id): Path<Uuid>,
) -> Result<Json<User>, CatalogError> {
    Ok(Json(set_blocked(&state, &caller, id, true).await?))
}

/// `POST /admin/users/:id/unblock`
pub async fn unblock_user(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    Path(id): Path<Uuid>,
) -> Result<Json<User>, CatalogError> {
    Ok(Json(set_blocked(&state, &caller, id, false).await?))
}

// ── Pages ─────────────────────────────────────────────────────────────────────

/// `PUT /admin/pages/:slug` — Create or replace a static page.
pub async fn put_page(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    Path(slug): Path<String>,
    Json(req): Json<PageRequest>,
) -> Result<Json<Page>, CatalogError> {
    caller.require_admin("edit pages")?;

    if !slug_pattern().is_match(&slug) {
        return Err(CatalogError::Validation(format!(
            "slug must be lowercase letters, digits and single hyphens, got: {slug}"
        )));
    }
    if req.title.trim().is_empty() {
        return Err(CatalogError::Validation("page title must not be empty".into()));
    }

    let page = Page {
        slug,
        title: req.title.trim().to_string(),
        content: req.content,
        updated_at: Utc::now(),
    };
    state.store.upsert_page(&page).await?;

    tracing::info!(slug = %page.slug, "Page saved");
    Ok(Json(page))
}

#[cfg(test)]
mod tests {
    use crate::test_support::*;
    use axum::http::StatusCode;
    use serde_json::{json, Value};

    #[tokio::test]
    async fn members_are_kept_out_of_the_back_office() {
        let (server, state) = test_server().await;
        let member = member_token(&state, "jane@example.com").await;

        server.get("/admin/stats").await.assert_status(StatusCode::UNAUTHORIZED);
        let resp = server.get("/admin/stats").add_header(AUTH, bearer(&member)).await;
        resp.assert_status(StatusCode::FORBIDDEN);
        let body: Value = resp.json();
        assert_eq!(body["error"], "Forbidden: only admins can view statistics");
    }

    #[tokio::test]
    async fn stats_count_the_catalog() {
        let (server, state) = test_server().await;
        let admin = admin_token(&state).await;

        let body: Value = server.get("/admin/stats").add_header(AUTH, bearer(&admin)).await.json();
        assert_eq!(body["catalog"]["total_tools"], 8);
        assert_eq!(body["catalog"]["featured_tools"], 3);
        assert_eq!(body["catalog"]["most_viewed"].as_array().unwrap().len(), 5);
        assert_eq!(body["catalog"]["most_viewed"][0]["name"], "VoiceGenius");
        assert_eq!(body["total_users"], 1);
    }

    #[tokio::test]
    async fn added_tools_start_unrated_and_can_be_hidden() {
        let (server, state) = test_server().await;
        let admin = admin_token(&state).await;

        let resp = server
            .post("/admin/tools")
            .add_header(AUTH, bearer(&admin))
            .json(&json!({
                "name": "PromptPal",
                "logo": "/placeholder.svg",
                "one_liner": "Prompt library",
                "description": "Keeps prompts organised.",
                "external_link": "https://example.com",
                "categories": ["Text"],
                "price": "Free",
            }))
            .await;
        resp.assert_status(StatusCode::CREATED);
        let tool: Value = resp.json();
        assert_eq!(tool["rating"], 0.0);
        assert_eq!(tool["view_count"], 0);
        let id = tool["id"].as_str().unwrap().to_string();

        let body: Value = server
            .post(&format!("/admin/tools/{id}/toggle-hidden"))
            .add_header(AUTH, bearer(&admin))
            .await
            .json();
        assert_eq!(body["hidden"], true);
        server.get(&format!("/tools/{id}")).await.assert_status(StatusCode::NOT_FOUND);

        let listed: Value = server.get("/tools").add_query_param("category", "Text").await.json();
        assert!(listed["tools"].as_array().unwrap().iter().all(|t| t["name"] != "PromptPal"));
    }

    #[tokio::test]
    async fn tools_must_reference_known_categories() {
        let (server, state) = test_server().await;
        let admin = admin_token(&state).await;
        let id = state.store.list_tools().await.unwrap()[0].id;

        server
            .patch(&format!("/admin/tools/{id}"))
            .add_header(AUTH, bearer(&admin))
            .json(&json!({ "categories": ["Nope"] }))
            .await
            .assert_status(StatusCode::UNPROCESSABLE_ENTITY);

        let body: Value = server
            .patch(&format!("/admin/tools/{id}"))
            .add_header(AUTH, bearer(&admin))
            .json(&json!({ "video_link": null, "featured": false }))
            .await
            .json();
        assert_eq!(body["featured"], false);
        assert_eq!(body["video_link"], Value::Null);
    }

    #[tokio::test]
    async fn duplicate_category_names_conflict() {
        let (server, state) = test_server().await;
        let admin = admin_token(&state).await;

        server
            .post("/admin/categories")
            .add_header(AUTH, bearer(&admin))
            .json(&json!({ "name": "Text" }))
            .await
            .assert_status(StatusCode::CONFLICT);

        server
            .post("/admin/categories")
            .add_header(AUTH, bearer(&admin))
            .json(&json!({ "name": "Code", "linked_tags": ["coding"] }))
            .await
            .assert_status(StatusCode::CREATED);
    }

    #[tokio::test]
    async fn renamed_category_shows_on_tool_detail() {
        let (server, state) = test_server().await;
        let admin = admin_token(&state).await;
        let categories = state.store.list_categories().await.unwrap();
        let text = categories.iter().find(|c| c.name == "Text").unwrap();
        let writer = state.store.list_tools().await.unwrap()[0].id;

        let before: Value = server.get(&format!("/tools/{writer}")).await.json();
        assert_eq!(before["categories"][0], "Text");

        server
            .patch(&format!("/admin/categories/{}", text.id))
            .add_header(AUTH, bearer(&admin))
            .json(&json!({ "name": "Writing" }))
            .await
            .assert_status_ok();

        let after: Value = server.get(&format!("/tools/{writer}")).await.json();
        assert_eq!(after["categories"][0], "Writing");
    }

    #[tokio::test]
    async fn blocking_stops_sign_in_and_reviews() {
        let (server, state) = test_server().await;
        let admin = admin_token(&state).await;
        member_token(&state, "jane@example.com").await;
        let jane = state.store.find_user_by_email("jane@example.com").await.unwrap().unwrap();

        let body: Value = server
            .post(&format!("/admin/users/{}/block", jane.user.id))
            .add_header(AUTH, bearer(&admin))
            .await
            .json();
        assert_eq!(body["blocked"], true);

        server
            .post("/auth/signin")
            .json(&json!({ "email": "jane@example.com", "password": "secret-pw" }))
            .await
            .assert_status(StatusCode::FORBIDDEN);

        server
            .post(&format!("/admin/users/{}/unblock", jane.user.id))
            .add_header(AUTH, bearer(&admin))
            .await
            .assert_status_ok();
        server
            .post("/auth/signin")
            .json(&json!({ "email": "jane@example.com", "password": "secret-pw" }))
            .await
            .assert_status_ok();
    }

    #[tokio::test]
    async fn pages_are_validated_and_published() {
        let (server, state) = test_server().await;
        let admin = admin_token(&state).await;

        server
            .put("/admin/pages/Bad%20Slug")
            .add_header(AUTH, bearer(&admin))
            .json(&json!({ "title": "Bad", "content": "x" }))
            .await
            .assert_status(StatusCode::UNPROCESSABLE_ENTITY);

        server
            .put("/admin/pages/terms-of-use")
            .add_header(AUTH, bearer(&admin))
            .json(&json!({ "title": "Terms", "content": "Be nice." }))
            .await
            .assert_status_ok();

        let page: Value = server.get("/pages/terms-of-use").await.json();
        assert_eq!(page["title"], "Terms");
    }
}
