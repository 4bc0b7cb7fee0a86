// SPDX-License-Identifier: EUPL-1.2

//! Fixture builders shared by the unit tests.

use std::sync::Arc;

use axum::http::HeaderValue;
use axum_test::TestServer;
use chrono::{DateTime, TimeZone, Utc};
use uuid::Uuid;

use crate::{
    db::AppState,
    identity::Profile,
    models::{Category, Comment, PriceTier, Tool},
    store::MemoryStore,
};

pub use axum::http::header::AUTHORIZATION as AUTH;

pub fn day(n: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, n, 12, 0, 0).unwrap()
}

pub fn tool(name: &str, price: PriceTier) -> Tool {
    Tool {
        id: Uuid::new_v4(),
        name: name.to_string(),
        logo: "/placeholder.svg".into(),
        one_liner: format!("{name} one-liner"),
        description: format!("{name} description"),
        external_link: "https://example.com".into(),
        video_link: None,
        tags: Vec::new(),
        categories: Vec::new(),
        price,
        view_count: 0,
        rating: 0.0,
        rating_count: 0,
        hidden: false,
        featured: false,
        created_at: day(1),
    }
}

pub fn category(name: &str, tags: &[&str]) -> Category {
    Category {
        id: Uuid::new_v4(),
        name: name.to_string(),
        linked_tags: tags.iter().map(|t| t.to_string()).collect(),
        hidden: false,
    }
}

pub fn comment(tool_id: Uuid, rating: i32) -> Comment {
    Comment {
        id: Uuid::new_v4(),
        tool_id,
        user_id: Uuid::new_v4(),
        user_name: "Jane Smith".into(),
        user_avatar: None,
        rating,
        text: "solid tool".into(),
        hidden: false,
        hidden_by: None,
        hidden_at: None,
        created_at: day(2),
    }
}

pub trait ToolExt {
    fn rated(self, rating: f64) -> Self;
    fn in_categories(self, names: &[&str]) -> Self;
    fn tagged(self, tags: &[&str]) -> Self;
    fn viewed(self, views: u64) -> Self;
    fn created(self, at: DateTime<Utc>) -> Self;
    fn hidden(self) -> Self;
    fn featured(self) -> Self;
}

impl ToolExt for Tool {
    fn rated(mut self, rating: f64) -> Self {
        self.rating = rating;
        self.rating_count = 1;
        self
    }

    fn in_categories(mut self, names: &[&str]) -> Self {
        self.categories = names.iter().map(|n| n.to_string()).collect();
        self
    }

    fn tagged(mut self, tags: &[&str]) -> Self {
        self.tags = tags.iter().map(|t| t.to_string()).collect();
        self
    }

    fn viewed(mut self, views: u64) -> Self {
        self.view_count = views;
        self
    }

    fn created(mut self, at: DateTime<Utc>) -> Self {
        self.created_at = at;
        self
    }

    fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    fn featured(mut self) -> Self {
        self.featured = true;
        self
    }
}

pub fn names(tools: &[Tool]) -> Vec<&str> {
    tools.iter().map(|t| t.name.as_str()).collect()
}

// ── HTTP ──────────────────────────────────────────────────────────────────────

/// Router over a freshly seeded in-memory store.
pub async fn test_server() -> (TestServer, Arc<AppState>) {
    let state = Arc::new(AppState::with_store(Arc::new(MemoryStore::seeded())));
    let server = TestServer::new(crate::app(state.clone())).unwrap();
    (server, state)
}

pub fn bearer(token: &str) -> HeaderValue {
    HeaderValue::from_str(&format!("Bearer {token}")).unwrap()
}

/// Session token for a new member account.
pub async fn member_token(state: &AppState, email: &str) -> String {
    let profile = Profile { name: "Jane Smith".into(), avatar: None };
    state.identity.sign_up(email, "secret-pw", profile).await.unwrap().token
}

/// Session token for a new admin account.
pub async fn admin_token(state: &AppState) -> String {
    let profile = Profile { name: "Root".into(), avatar: None };
    let signed = state
        .identity
        .sign_up(&format!("admin-{}@example.com", Uuid::new_v4()), "secret-pw", profile)
        .await
        .unwrap();
    state.store.set_user_admin(signed.user.id, true).await.unwrap();
    signed.token
}
