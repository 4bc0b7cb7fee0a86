// SPDX-License-Identifier: EUPL-1.2

//! Per-user bookmark sets.
//!
//! ## Endpoints
//!
//! - `GET  /bookmarks`                   — The caller's bookmarked tools
//! - `GET  /bookmarks/:tool_id`          — Whether one tool is bookmarked
//! - `POST /bookmarks/:tool_id/toggle`   — Add or remove one tool

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::{
    bookmarks::{BookmarkChange, BookmarkSet},
    db::AppState,
    error::CatalogError,
    handlers::{load_tool, tool_not_found},
    identity::{Caller, Identity},
};

async fn bookmark_set(state: &AppState, identity: &Identity) -> Result<BookmarkSet, CatalogError> {
    let user = state
        .store
        .get_user(identity.user_id)
        .await?
        .ok_or_else(|| CatalogError::NotFound(format!("User {} not found", identity.user_id)))?;
    Ok(BookmarkSet::new(user.bookmarks))
}

/// `GET /bookmarks` — Bookmarked tools in the order they were added.
///
/// Tools hidden since they were bookmarked are left out.
pub async fn list_bookmarks(
    State(state): State<Arc<AppState>>,
    caller: Caller,
) -> Result<Json<Value>, CatalogError> {
    let identity = caller.require("view your bookmarks")?;
    let set = bookmark_set(&state, identity).await?;

    let tools = state.store.list_tools().await?;
    let bookmarked: Vec<_> = set
        .ids()
        .iter()
        .filter_map(|id| tools.iter().find(|t| t.id == *id && !t.hidden))
        .collect();

    Ok(Json(json!({
        "count": bookmarked.len(),
        "tools": bookmarked,
    })))
}

/// `GET /bookmarks/:tool_id` — Always `false` for anonymous callers.
pub async fn bookmark_status(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    Path(tool_id): Path<Uuid>,
) -> Result<Json<Value>, CatalogError> {
    let bookmarked = match &caller.0 {
        Some(identity) => bookmark_set(&state, identity).await?.contains(tool_id),
        None => false,
    };

    Ok(Json(json!({ "tool_id": tool_id, "bookmarked": bookmarked })))
}

/// `POST /bookmarks/:tool_id/toggle`
///
/// A bookmark on a tool that was hidden later can still be removed, but
/// hidden tools cannot be added.
pub async fn toggle_bookmark(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    Path(tool_id): Path<Uuid>,
) -> Result<Json<Value>, CatalogError> {
    let identity = caller.require("bookmark tools")?;
    let mut set = bookmark_set(&state, identity).await?;

    let tool = load_tool(&state, tool_id).await?.ok_or_else(|| tool_not_found(tool_id))?;
    if tool.hidden && !set.contains(tool_id) {
        return Err(tool_not_found(tool_id));
    }

    let change = set.toggle(tool_id);
    match change {
        BookmarkChange::Added => state.store.add_bookmark(identity.user_id, tool_id).await?,
        BookmarkChange::Removed => state.store.remove_bookmark(identity.user_id, tool_id).await?,
    }

    tracing::info!(user = %identity.user_id, tool = %tool_id, ?change, "Bookmark toggled");

    Ok(Json(json!({
        "tool_id": tool_id,
        "change": change,
        "bookmarked": change == BookmarkChange::Added,
        "count": set.ids().len(),
    })))
}
