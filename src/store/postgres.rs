// SPDX-License-Identifier: EUPL-1.2

//! PostgreSQL store.
//!
//! Tools link to categories through `tool_categories`; the category names on
//! a [`Tool`] are materialised with an `ARRAY(...)` subquery, and a user's
//! bookmarks the same way.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::{seed, Store, StoreError, StoreResult, UserRecord};
use crate::{
    models::{Category, Comment, Page, PriceTier, Session, Tool, User},
    ratings::RatingSummary,
};

const TOOL_COLUMNS: &str = "t.id, t.name, t.logo, t.one_liner, t.description, t.external_link,
        t.video_link, t.tags,
        ARRAY(SELECT c.name FROM tool_categories tc
              JOIN categories c ON c.id = tc.category_id
              WHERE tc.tool_id = t.id ORDER BY c.name) AS categories,
        t.price, t.view_count, t.rating, t.rating_count, t.hidden, t.featured, t.created_at";

const USER_COLUMNS: &str = "u.id, u.name, u.email, u.avatar, u.is_admin, u.blocked,
        ARRAY(SELECT b.tool_id FROM bookmarks b
              WHERE b.user_id = u.id ORDER BY b.created_at) AS bookmarks,
        u.created_at";

const COMMENT_COLUMNS: &str = "id, tool_id, user_id, user_name, user_avatar, rating, text,
        hidden, hidden_by, hidden_at, created_at";

/// Raw `tools` row; price is stored as text.
#[derive(sqlx::FromRow)]
struct ToolRow {
    id: Uuid,
    name: String,
    logo: String,
    one_liner: String,
    description: String,
    external_link: String,
    video_link: Option<String>,
    tags: Vec<String>,
    categories: Vec<String>,
    price: String,
    view_count: i64,
    rating: f64,
    rating_count: i32,
    hidden: bool,
    featured: bool,
    created_at: DateTime<Utc>,
}

impl TryFrom<ToolRow> for Tool {
    type Error = StoreError;

    fn try_from(r: ToolRow) -> Result<Self, Self::Error> {
        let price: PriceTier = r
            .price
            .parse()
            .map_err(|e: String| StoreError::Corrupt(format!("tool {}: {e}", r.id)))?;

        Ok(Tool {
            id: r.id,
            name: r.name,
            logo: r.logo,
            one_liner: r.one_liner,
            description: r.description,
            external_link: r.external_link,
            video_link: r.video_link,
            tags: r.tags,
            categories: r.categories,
            price,
            view_count: u64::try_from(r.view_count).unwrap_or(0),
            rating: r.rating,
            rating_count: u32::try_from(r.rating_count).unwrap_or(0),
            hidden: r.hidden,
            featured: r.featured,
            created_at: r.created_at,
        })
    }
}

/// Map a unique-constraint violation to [`StoreError::Duplicate`].
fn unique_violation(e: sqlx::Error, what: impl FnOnce() -> String) -> StoreError {
    match &e {
        sqlx::Error::Database(db) if db.code().as_deref() == Some("23505") => {
            StoreError::Duplicate(what())
        }
        _ => StoreError::Database(e),
    }
}

#[derive(Clone)]
pub struct PgStore {
    pub pool: PgPool,
}

impl PgStore {
    pub async fn connect(database_url: &str) -> StoreResult<Self> {
        let pool = PgPool::connect(database_url).await?;
        Ok(Self { pool })
    }

    pub async fn migrate(&self) -> StoreResult<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    /// Load the demo catalog into an empty database.
    pub async fn seed_if_empty(&self) -> StoreResult<bool> {
        let has_tools: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM tools)")
            .fetch_one(&self.pool)
            .await?;
        if has_tools {
            return Ok(false);
        }

        let demo = seed::demo_catalog(Utc::now());
        for category in &demo.categories {
            self.insert_category(category).await?;
        }
        for tool in &demo.tools {
            self.insert_tool(tool).await?;
        }
        for page in &demo.pages {
            self.upsert_page(page).await?;
        }
        Ok(true)
    }

    async fn link_categories(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        tool: &Tool,
    ) -> StoreResult<()> {
        sqlx::query("DELETE FROM tool_categories WHERE tool_id = $1")
            .bind(tool.id)
            .execute(&mut **tx)
            .await?;

        sqlx::query(
            "INSERT INTO tool_categories (tool_id, category_id)
             SELECT $1, id FROM categories WHERE name = ANY($2)",
        )
        .bind(tool.id)
        .bind(&tool.categories)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl Store for PgStore {
    async fn list_tools(&self) -> StoreResult<Vec<Tool>> {
        let rows = sqlx::query_as::<_, ToolRow>(&format!(
            "SELECT {TOOL_COLUMNS} FROM tools t ORDER BY t.created_at, t.id"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Tool::try_from).collect()
    }

    async fn get_tool(&self, id: Uuid) -> StoreResult<Option<Tool>> {
        sqlx::query_as::<_, ToolRow>(&format!("SELECT {TOOL_COLUMNS} FROM tools t WHERE t.id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(Tool::try_from)
            .transpose()
    }

    async fn insert_tool(&self, tool: &Tool) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO tools
               (id, name, logo, one_liner, description, external_link, video_link, tags,
                price, view_count, rating, rating_count, hidden, featured, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)",
        )
        .bind(tool.id)
        .bind(&tool.name)
        .bind(&tool.logo)
        .bind(&tool.one_liner)
        .bind(&tool.description)
        .bind(&tool.external_link)
        .bind(&tool.video_link)
        .bind(&tool.tags)
        .bind(tool.price.as_str())
        .bind(i64::try_from(tool.view_count).unwrap_or(i64::MAX))
        .bind(tool.rating)
        .bind(i32::try_from(tool.rating_count).unwrap_or(i32::MAX))
        .bind(tool.hidden)
        .bind(tool.featured)
        .bind(tool.created_at)
        .execute(&mut *tx)
        .await?;

        Self::link_categories(&mut tx, tool).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn update_tool(&self, tool: &Tool) -> StoreResult<bool> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "UPDATE tools
             SET name = $2, logo = $3, one_liner = $4, description = $5, external_link = $6,
                 video_link = $7, tags = $8, price = $9, hidden = $10, featured = $11,
                 updated_at = NOW()
             WHERE id = $1",
        )
        .bind(tool.id)
        .bind(&tool.name)
        .bind(&tool.logo)
        .bind(&tool.one_liner)
        .bind(&tool.description)
        .bind(&tool.external_link)
        .bind(&tool.video_link)
        .bind(&tool.tags)
        .bind(tool.price.as_str())
        .bind(tool.hidden)
        .bind(tool.featured)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(false);
        }

        Self::link_categories(&mut tx, tool).await?;
        tx.commit().await?;
        Ok(true)
    }

    async fn record_view(&self, id: Uuid) -> StoreResult<Option<u64>> {
        let count: Option<i64> = sqlx::query_scalar(
            "UPDATE tools SET view_count = view_count + 1 WHERE id = $1 RETURNING view_count",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(count.map(|c| u64::try_from(c).unwrap_or(0)))
    }

    async fn set_tool_rating(&self, id: Uuid, summary: RatingSummary) -> StoreResult<()> {
        sqlx::query("UPDATE tools SET rating = $2, rating_count = $3, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(summary.rating)
            .bind(i32::try_from(summary.count).unwrap_or(i32::MAX))
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list_categories(&self) -> StoreResult<Vec<Category>> {
        Ok(sqlx::query_as::<_, Category>(
            "SELECT id, name, linked_tags, hidden FROM categories ORDER BY created_at, name",
        )
        .fetch_all(&self.pool)
        .await?)
    }

    async fn get_category(&self, id: Uuid) -> StoreResult<Option<Category>> {
        Ok(sqlx::query_as::<_, Category>(
            "SELECT id, name, linked_tags, hidden FROM categories WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn insert_category(&self, category: &Category) -> StoreResult<()> {
        sqlx::query("INSERT INTO categories (id, name, linked_tags, hidden) VALUES ($1, $2, $3, $4)")
            .bind(category.id)
            .bind(&category.name)
            .bind(&category.linked_tags)
            .bind(category.hidden)
            .execute(&self.pool)
            .await
            .map_err(|e| unique_violation(e, || format!("category '{}' already exists", category.name)))?;
        Ok(())
    }

    async fn update_category(&self, category: &Category) -> StoreResult<bool> {
        let result = sqlx::query(
            "UPDATE categories SET name = $2, linked_tags = $3, hidden = $4, updated_at = NOW()
             WHERE id = $1",
        )
        .bind(category.id)
        .bind(&category.name)
        .bind(&category.linked_tags)
        .bind(category.hidden)
        .execute(&self.pool)
        .await
        .map_err(|e| unique_violation(e, || format!("category '{}' already exists", category.name)))?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_comments(&self, tool_id: Uuid) -> StoreResult<Vec<Comment>> {
        Ok(sqlx::query_as::<_, Comment>(&format!(
            "SELECT {COMMENT_COLUMNS} FROM comments WHERE tool_id = $1 ORDER BY created_at"
        ))
        .bind(tool_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn list_all_comments(&self) -> StoreResult<Vec<Comment>> {
        Ok(sqlx::query_as::<_, Comment>(&format!(
            "SELECT {COMMENT_COLUMNS} FROM comments ORDER BY created_at"
        ))
        .fetch_all(&self.pool)
        .await?)
    }

    async fn get_comment(&self, id: Uuid) -> StoreResult<Option<Comment>> {
        Ok(sqlx::query_as::<_, Comment>(&format!(
            "SELECT {COMMENT_COLUMNS} FROM comments WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn insert_comment(&self, comment: &Comment) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO comments
               (id, tool_id, user_id, user_name, user_avatar, rating, text, hidden, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(comment.id)
        .bind(comment.tool_id)
        .bind(comment.user_id)
        .bind(&comment.user_name)
        .bind(&comment.user_avatar)
        .bind(comment.rating)
        .bind(&comment.text)
        .bind(comment.hidden)
        .bind(comment.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update_comment_visibility(&self, comment: &Comment) -> StoreResult<bool> {
        let result = sqlx::query(
            "UPDATE comments SET hidden = $2, hidden_by = $3, hidden_at = $4 WHERE id = $1",
        )
        .bind(comment.id)
        .bind(comment.hidden)
        .bind(comment.hidden_by)
        .bind(comment.hidden_at)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn add_bookmark(&self, user_id: Uuid, tool_id: Uuid) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO bookmarks (user_id, tool_id) VALUES ($1, $2)
             ON CONFLICT (user_id, tool_id) DO NOTHING",
        )
        .bind(user_id)
        .bind(tool_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn remove_bookmark(&self, user_id: Uuid, tool_id: Uuid) -> StoreResult<()> {
        sqlx::query("DELETE FROM bookmarks WHERE user_id = $1 AND tool_id = $2")
            .bind(user_id)
            .bind(tool_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn get_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users u WHERE u.id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<UserRecord>> {
        let Some(user) = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users u WHERE LOWER(u.email) = LOWER($1)"
        ))
        .bind(email.trim())
        .fetch_optional(&self.pool)
        .await?
        else {
            return Ok(None);
        };

        let password_hash: String = sqlx::query_scalar("SELECT password_hash FROM users WHERE id = $1")
            .bind(user.id)
            .fetch_one(&self.pool)
            .await?;

        Ok(Some(UserRecord { user, password_hash }))
    }

    async fn insert_user(&self, record: &UserRecord) -> StoreResult<()> {
        let u = &record.user;
        sqlx::query(
            "INSERT INTO users (id, name, email, avatar, password_hash, is_admin, blocked, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(u.id)
        .bind(&u.name)
        .bind(&u.email)
        .bind(&u.avatar)
        .bind(&record.password_hash)
        .bind(u.is_admin)
        .bind(u.blocked)
        .bind(u.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| unique_violation(e, || "Email already in use".to_string()))?;
        Ok(())
    }

    async fn set_user_blocked(&self, id: Uuid, blocked: bool) -> StoreResult<Option<User>> {
        let result = sqlx::query("UPDATE users SET blocked = $2 WHERE id = $1")
            .bind(id)
            .bind(blocked)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_user(id).await
    }

    async fn set_user_admin(&self, id: Uuid, is_admin: bool) -> StoreResult<bool> {
        let result = sqlx::query("UPDATE users SET is_admin = $2 WHERE id = $1")
            .bind(id)
            .bind(is_admin)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        Ok(sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users u ORDER BY u.created_at"
        ))
        .fetch_all(&self.pool)
        .await?)
    }

    async fn insert_session(&self, session: &Session) -> StoreResult<()> {
        sqlx::query("INSERT INTO sessions (id, user_id, created_at) VALUES ($1, $2, $3)")
            .bind(session.id)
            .bind(session.user_id)
            .bind(session.created_at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn get_session(&self, id: Uuid) -> StoreResult<Option<Session>> {
        Ok(sqlx::query_as::<_, Session>(
            "SELECT id, user_id, created_at, revoked_at FROM sessions WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn revoke_session(&self, id: Uuid, at: DateTime<Utc>) -> StoreResult<bool> {
        let result = sqlx::query(
            "UPDATE sessions SET revoked_at = $2 WHERE id = $1 AND revoked_at IS NULL",
        )
        .bind(id)
        .bind(at)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn get_page(&self, slug: &str) -> StoreResult<Option<Page>> {
        Ok(sqlx::query_as::<_, Page>(
            "SELECT slug, title, content, updated_at FROM pages WHERE slug = $1",
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn upsert_page(&self, page: &Page) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO pages (slug, title, content, updated_at) VALUES ($1, $2, $3, $4)
             ON CONFLICT (slug) DO UPDATE
             SET title = EXCLUDED.title, content = EXCLUDED.content, updated_at = EXCLUDED.updated_at",
        )
        .bind(&page.slug)
        .bind(&page.title)
        .bind(&page.content)
        .bind(page.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
