// SPDX-License-Identifier: EUPL-1.2

//! In-memory store. Holds every table behind one `RwLock`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{seed, Store, StoreError, StoreResult, UserRecord};
use crate::{
    models::{Category, Comment, Page, Session, Tool, User},
    ratings::RatingSummary,
};

#[derive(Debug, Default)]
struct Tables {
    tools: Vec<Tool>,
    categories: Vec<Category>,
    comments: Vec<Comment>,
    users: Vec<UserRecord>,
    sessions: Vec<Session>,
    pages: Vec<Page>,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-filled with the demo catalog and static pages.
    pub fn seeded() -> Self {
        let demo = seed::demo_catalog(Utc::now());
        Self {
            tables: RwLock::new(Tables {
                tools: demo.tools,
                categories: demo.categories,
                pages: demo.pages,
                ..Tables::default()
            }),
        }
    }
}

fn same_email(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}

#[async_trait]
impl Store for MemoryStore {
    async fn list_tools(&self) -> StoreResult<Vec<Tool>> {
        Ok(self.tables.read().await.tools.clone())
    }

    async fn get_tool(&self, id: Uuid) -> StoreResult<Option<Tool>> {
        Ok(self.tables.read().await.tools.iter().find(|t| t.id == id).cloned())
    }

    async fn insert_tool(&self, tool: &Tool) -> StoreResult<()> {
        self.tables.write().await.tools.push(tool.clone());
        Ok(())
    }

    async fn update_tool(&self, tool: &Tool) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        match tables.tools.iter_mut().find(|t| t.id == tool.id) {
            Some(slot) => {
                *slot = tool.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn record_view(&self, id: Uuid) -> StoreResult<Option<u64>> {
        let mut tables = self.tables.write().await;
        Ok(tables.tools.iter_mut().find(|t| t.id == id).map(|t| {
            t.view_count += 1;
            t.view_count
        }))
    }

    async fn set_tool_rating(&self, id: Uuid, summary: RatingSummary) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        if let Some(tool) = tables.tools.iter_mut().find(|t| t.id == id) {
            tool.rating = summary.rating;
            tool.rating_count = summary.count;
        }
        Ok(())
    }

    async fn list_categories(&self) -> StoreResult<Vec<Category>> {
        Ok(self.tables.read().await.categories.clone())
    }

    async fn get_category(&self, id: Uuid) -> StoreResult<Option<Category>> {
        Ok(self.tables.read().await.categories.iter().find(|c| c.id == id).cloned())
    }

    async fn insert_category(&self, category: &Category) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        if tables.categories.iter().any(|c| c.name == category.name) {
            return Err(StoreError::Duplicate(format!(
                "category '{}' already exists",
                category.name
            )));
        }
        tables.categories.push(category.clone());
        Ok(())
    }

    async fn update_category(&self, category: &Category) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        if tables
            .categories
            .iter()
            .any(|c| c.id != category.id && c.name == category.name)
        {
            return Err(StoreError::Duplicate(format!(
                "category '{}' already exists",
                category.name
            )));
        }

        let Some(slot) = tables.categories.iter_mut().find(|c| c.id == category.id) else {
            return Ok(false);
        };
        let old_name = std::mem::replace(slot, category.clone()).name;

        // Tools reference categories by name here, keep them linked on rename.
        if old_name != category.name {
            for name in tables.tools.iter_mut().flat_map(|t| t.categories.iter_mut()) {
                if *name == old_name {
                    *name = category.name.clone();
                }
            }
        }
        Ok(true)
    }

    async fn list_comments(&self, tool_id: Uuid) -> StoreResult<Vec<Comment>> {
        Ok(self
            .tables
            .read()
            .await
            .comments
            .iter()
            .filter(|c| c.tool_id == tool_id)
            .cloned()
            .collect())
    }

    async fn list_all_comments(&self) -> StoreResult<Vec<Comment>> {
        Ok(self.tables.read().await.comments.clone())
    }

    async fn get_comment(&self, id: Uuid) -> StoreResult<Option<Comment>> {
        Ok(self.tables.read().await.comments.iter().find(|c| c.id == id).cloned())
    }

    async fn insert_comment(&self, comment: &Comment) -> StoreResult<()> {
        self.tables.write().await.comments.push(comment.clone());
        Ok(())
    }

    async fn update_comment_visibility(&self, comment: &Comment) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        match tables.comments.iter_mut().find(|c| c.id == comment.id) {
            Some(slot) => {
                slot.hidden = comment.hidden;
                slot.hidden_by = comment.hidden_by;
                slot.hidden_at = comment.hidden_at;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn add_bookmark(&self, user_id: Uuid, tool_id: Uuid) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        if let Some(record) = tables.users.iter_mut().find(|r| r.user.id == user_id) {
            if !record.user.bookmarks.contains(&tool_id) {
                record.user.bookmarks.push(tool_id);
            }
        }
        Ok(())
    }

    async fn remove_bookmark(&self, user_id: Uuid, tool_id: Uuid) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        if let Some(record) = tables.users.iter_mut().find(|r| r.user.id == user_id) {
            record.user.bookmarks.retain(|id| *id != tool_id);
        }
        Ok(())
    }

    async fn get_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(self
            .tables
            .read()
            .await
            .users
            .iter()
            .find(|r| r.user.id == id)
            .map(|r| r.user.clone()))
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<UserRecord>> {
        Ok(self
            .tables
            .read()
            .await
            .users
            .iter()
            .find(|r| same_email(&r.user.email, email))
            .cloned())
    }

    async fn insert_user(&self, record: &UserRecord) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        if tables.users.iter().any(|r| same_email(&r.user.email, &record.user.email)) {
            return Err(StoreError::Duplicate("Email already in use".into()));
        }
        tables.users.push(record.clone());
        Ok(())
    }

    async fn set_user_blocked(&self, id: Uuid, blocked: bool) -> StoreResult<Option<User>> {
        let mut tables = self.tables.write().await;
        Ok(tables.users.iter_mut().find(|r| r.user.id == id).map(|r| {
            r.user.blocked = blocked;
            r.user.clone()
        }))
    }

    async fn set_user_admin(&self, id: Uuid, is_admin: bool) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        match tables.users.iter_mut().find(|r| r.user.id == id) {
            Some(r) => {
                r.user.is_admin = is_admin;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        Ok(self.tables.read().await.users.iter().map(|r| r.user.clone()).collect())
    }

    async fn insert_session(&self, session: &Session) -> StoreResult<()> {
        self.tables.write().await.sessions.push(session.clone());
        Ok(())
    }

    async fn get_session(&self, id: Uuid) -> StoreResult<Option<Session>> {
        Ok(self.tables.read().await.sessions.iter().find(|s| s.id == id).cloned())
    }

    async fn revoke_session(&self, id: Uuid, at: DateTime<Utc>) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        match tables
            .sessions
            .iter_mut()
            .find(|s| s.id == id && s.revoked_at.is_none())
        {
            Some(s) => {
                s.revoked_at = Some(at);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn get_page(&self, slug: &str) -> StoreResult<Option<Page>> {
        Ok(self.tables.read().await.pages.iter().find(|p| p.slug == slug).cloned())
    }

    async fn upsert_page(&self, page: &Page) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        match tables.pages.iter_mut().find(|p| p.slug == page.slug) {
            Some(slot) => *slot = page.clone(),
            None => tables.pages.push(page.clone()),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PriceTier;
    use crate::test_support::*;

    #[tokio::test]
    async fn renaming_a_category_relinks_its_tools() {
        let store = MemoryStore::new();
        let mut cat = category("Text", &["writing"]);
        store.insert_category(&cat).await.unwrap();
        let t = tool("Scribe", PriceTier::Free).in_categories(&["Text"]);
        store.insert_tool(&t).await.unwrap();

        cat.name = "Writing".into();
        assert!(store.update_category(&cat).await.unwrap());

        let stored = store.get_tool(t.id).await.unwrap().unwrap();
        assert_eq!(stored.categories, ["Writing"]);
    }

    #[tokio::test]
    async fn duplicate_category_names_are_rejected() {
        let store = MemoryStore::new();
        store.insert_category(&category("Text", &[])).await.unwrap();
        let err = store.insert_category(&category("Text", &[])).await.unwrap_err();
        assert!(matches!(err, StoreError::Duplicate(_)));
    }

    #[tokio::test]
    async fn sessions_revoke_once() {
        let store = MemoryStore::new();
        let session = Session {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            created_at: day(1),
            revoked_at: None,
        };
        store.insert_session(&session).await.unwrap();
        assert!(store.revoke_session(session.id, day(2)).await.unwrap());
        assert!(!store.revoke_session(session.id, day(3)).await.unwrap());
        let stored = store.get_session(session.id).await.unwrap().unwrap();
        assert_eq!(stored.revoked_at, Some(day(2)));
    }

    #[tokio::test]
    async fn seeded_store_has_demo_catalog() {
        let store = MemoryStore::seeded();
        assert!(!store.list_tools().await.unwrap().is_empty());
        assert!(store.get_page("about").await.unwrap().is_some());
    }
}
