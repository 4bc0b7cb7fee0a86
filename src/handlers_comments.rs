// SPDX-License-Identifier: EUPL-1.2

//! Reviews: listing, posting and moderation.
//!
//! ## Endpoints
//!
//! - `GET  /tools/:id/comments`  — Visible reviews, newest first
//! - `POST /tools/:id/comments`  — Post a review (signed-in, not blocked)
//! - `POST /comments/:id/hide`   — Hide a review (admin)
//!
//! Every write recomputes the tool's rating from its visible reviews.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::{
    db::AppState,
    error::CatalogError,
    handlers::{invalidate_tool, visible_tool},
    identity::Caller,
    models::CommentRequest,
    ratings::{self, RatingSummary},
};

/// Recompute and persist the rating of `tool_id`.
async fn refresh_rating(state: &AppState, tool_id: Uuid) -> Result<RatingSummary, CatalogError> {
    let comments = state.store.list_comments(tool_id).await?;
    let summary = ratings::aggregate(&comments, tool_id);

    state.store.set_tool_rating(tool_id, summary).await?;
    invalidate_tool(state, tool_id).await;
    Ok(summary)
}

/// `GET /tools/:id/comments`
pub async fn list_comments(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, CatalogError> {
    let tool = visible_tool(&state, &caller, id).await?;
    let comments = ratings::visible_newest_first(state.store.list_comments(id).await?);

    Ok(Json(json!({
        "tool_id": tool.id,
        "rating": tool.rating,
        "rating_count": tool.rating_count,
        "count": comments.len(),
        "comments": comments,
    })))
}

/// `POST /tools/:id/comments` — Post a 1–5 star review.
///
/// Body: `{ "rating": 4, "text": "Great for drafts" }`
pub async fn create_comment(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    Path(id): Path<Uuid>,
    Json(req): Json<CommentRequest>,
) -> Result<(StatusCode, Json<Value>), CatalogError> {
    let author = caller.require_active("leave a comment")?;
    let tool = visible_tool(&state, &caller, id).await?;
    let rating = ratings::validate_submission(req.rating, &req.text)?;

    let comment = ratings::new_comment(tool.id, author, rating, &req.text, Utc::now());
    state.store.insert_comment(&comment).await?;
    let summary = refresh_rating(&state, tool.id).await?;

    tracing::info!(
        tool = %tool.id,
        user = %author.user_id,
        rating,
        "Review posted"
    );

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "comment": comment,
            "rating": summary.rating,
            "rating_count": summary.count,
        })),
    ))
}

/// `POST /comments/:id/hide` — Hide a review and drop it from the rating.
///
/// Hiding is one-way; hiding an already hidden review changes nothing.
pub async fn hide_comment(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, CatalogError> {
    let admin = caller.require_admin("hide comments")?;
    let mut comment = state
        .store
        .get_comment(id)
        .await?
        .ok_or_else(|| CatalogError::NotFound(format!("Comment {id} not found")))?;

    if ratings::hide(&mut comment, admin.user_id, Utc::now()) {
        state.store.update_comment_visibility(&comment).await?;
        tracing::info!(comment = %id, admin = %admin.user_id, "Review hidden");
    }
    let summary = refresh_rating(&state, comment.tool_id).await?;

    Ok(Json(json!({
        "comment": comment,
        "rating": summary.rating,
        "rating_count": summary.count,
    })))
}
