//! Toolshelf — a directory of AI tools.
//!
//! Lists, filters and searches third-party AI tools, aggregates star ratings
//! from user reviews, keeps per-user bookmarks and gates the admin back office.
//!
//! ## Endpoints
//!
//! - `GET  /health`                   — Health check
//! - `GET  /tools`                    — Catalog listing (`category`, `price`, `sort`)
//! - `GET  /tools/:id`                — Tool detail
//! - `GET  /search`                   — Keyword (`q`) or intent (`nq`) search
//! - `POST /tools/:id/comments`       — Post a review
//! - `POST /bookmarks/:id/toggle`     — Bookmark a tool
//! - `POST /auth/signin`              — Open a session
//! - `/admin/*`                       — Back office
//!
//! See the handler modules for the full list.

mod auth;
mod bookmarks;
mod cache;
mod catalog;
mod config;
mod db;
mod error;
mod gate;
mod handlers;
mod handlers_admin;
mod handlers_auth;
mod handlers_bookmarks;
mod handlers_comments;
mod handlers_pages;
mod identity;
mod intent;
mod models;
mod ratings;
mod store;
#[cfg(test)]
mod test_support;

use axum::{
    routing::{get, patch, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub use db::AppState;

pub fn app(state: Arc<AppState>) -> Router {
    let admin = Router::new()
        .route("/stats", get(handlers_admin::stats))
        .route("/users", get(handlers_admin::list_users))
        .route("/users/:id/block", post(handlers_admin::block_user))
        .route("/users/:id/unblock", post(handlers_admin::unblock_user))
        .route("/tools", post(handlers_admin::create_tool))
        .route("/tools/:id", patch(handlers_admin::update_tool))
        .route("/tools/:id/toggle-hidden", post(handlers_admin::toggle_tool_hidden))
        .route("/tools/:id/toggle-featured", post(handlers_admin::toggle_tool_featured))
        .route(
            "/categories",
            get(handlers_admin::list_categories).post(handlers_admin::create_category),
        )
        .route("/categories/:id", patch(handlers_admin::update_category))
        .route("/categories/:id/toggle-hidden", post(handlers_admin::toggle_category_hidden))
        .route("/pages/:slug", put(handlers_admin::put_page));

    Router::new()
        .route("/health", get(handlers::health))
        // Catalog
        .route("/tools", get(handlers::list_tools))
        .route("/tools/featured", get(handlers::featured_tools))
        .route("/tools/trending", get(handlers::trending_tools))
        .route("/tools/:id", get(handlers::get_tool))
        .route("/tools/:id/related", get(handlers::related_tools))
        .route("/search", get(handlers::search))
        .route("/categories", get(handlers::list_categories))
        .route("/categories/:id/tools", get(handlers::category_tools))
        // Reviews
        .route(
            "/tools/:id/comments",
            get(handlers_comments::list_comments).post(handlers_comments::create_comment),
        )
        .route("/comments/:id/hide", post(handlers_comments::hide_comment))
        // Bookmarks
        .route("/bookmarks", get(handlers_bookmarks::list_bookmarks))
        .route("/bookmarks/:tool_id", get(handlers_bookmarks::bookmark_status))
        .route("/bookmarks/:tool_id/toggle", post(handlers_bookmarks::toggle_bookmark))
        // Sessions
        .route("/auth/signup", post(handlers_auth::sign_up))
        .route("/auth/signin", post(handlers_auth::sign_in))
        .route("/auth/signout", post(handlers_auth::sign_out))
        .route("/auth/session", get(handlers_auth::session))
        // Pages
        .route("/pages/:slug", get(handlers_pages::get_page))
        .route("/navigate", get(handlers_pages::navigate))
        .nest("/admin", admin)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialise structured logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "toolshelf=debug,info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = config::Config::from_env()?;
    let state = Arc::new(AppState::connect(&config).await?);

    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    tracing::info!("Toolshelf listening on http://{}", config.listen_addr);

    axum::serve(listener, app(state)).await?;
    Ok(())
}
