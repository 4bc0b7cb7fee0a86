// SPDX-License-Identifier: EUPL-1.2

//! Persistence boundary.
//!
//! Handlers only see the [`Store`] trait. Two variants exist: an in-memory
//! store seeded with demo data (used when `DATABASE_URL` is unset and by the
//! tests) and a PostgreSQL store.

pub mod memory;
pub mod postgres;
pub mod seed;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    models::{Category, Comment, Page, Session, Tool, User},
    ratings::RatingSummary,
};

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration failed: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("duplicate entry: {0}")]
    Duplicate(String),

    #[error("corrupt record: {0}")]
    Corrupt(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// A user profile together with its credential. Never serialized.
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub user: User,
    pub password_hash: String,
}

#[async_trait]
pub trait Store: Send + Sync {
    // Tools. Listings include hidden tools; narrowing is the caller's job.
    async fn list_tools(&self) -> StoreResult<Vec<Tool>>;
    async fn get_tool(&self, id: Uuid) -> StoreResult<Option<Tool>>;
    async fn insert_tool(&self, tool: &Tool) -> StoreResult<()>;
    /// Returns `false` when no tool has this id.
    async fn update_tool(&self, tool: &Tool) -> StoreResult<bool>;
    /// Bump the view counter, returning the new count.
    async fn record_view(&self, id: Uuid) -> StoreResult<Option<u64>>;
    async fn set_tool_rating(&self, id: Uuid, summary: RatingSummary) -> StoreResult<()>;

    // Categories
    async fn list_categories(&self) -> StoreResult<Vec<Category>>;
    async fn get_category(&self, id: Uuid) -> StoreResult<Option<Category>>;
    /// Fails with [`StoreError::Duplicate`] on a name clash.
    async fn insert_category(&self, category: &Category) -> StoreResult<()>;
    async fn update_category(&self, category: &Category) -> StoreResult<bool>;

    // Comments, oldest first.
    async fn list_comments(&self, tool_id: Uuid) -> StoreResult<Vec<Comment>>;
    async fn list_all_comments(&self) -> StoreResult<Vec<Comment>>;
    async fn get_comment(&self, id: Uuid) -> StoreResult<Option<Comment>>;
    async fn insert_comment(&self, comment: &Comment) -> StoreResult<()>;
    /// Persist the hidden flag and hider stamp of `comment`.
    async fn update_comment_visibility(&self, comment: &Comment) -> StoreResult<bool>;

    // Bookmarks
    async fn add_bookmark(&self, user_id: Uuid, tool_id: Uuid) -> StoreResult<()>;
    async fn remove_bookmark(&self, user_id: Uuid, tool_id: Uuid) -> StoreResult<()>;

    // Users
    async fn get_user(&self, id: Uuid) -> StoreResult<Option<User>>;
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<UserRecord>>;
    /// Fails with [`StoreError::Duplicate`] when the email is taken.
    async fn insert_user(&self, record: &UserRecord) -> StoreResult<()>;
    async fn set_user_blocked(&self, id: Uuid, blocked: bool) -> StoreResult<Option<User>>;
    async fn set_user_admin(&self, id: Uuid, is_admin: bool) -> StoreResult<bool>;
    async fn list_users(&self) -> StoreResult<Vec<User>>;

    // Sessions
    async fn insert_session(&self, session: &Session) -> StoreResult<()>;
    async fn get_session(&self, id: Uuid) -> StoreResult<Option<Session>>;
    async fn revoke_session(&self, id: Uuid, at: DateTime<Utc>) -> StoreResult<bool>;

    // Static pages
    async fn get_page(&self, slug: &str) -> StoreResult<Option<Page>>;
    async fn upsert_page(&self, page: &Page) -> StoreResult<()>;
}
