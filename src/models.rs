// SPDX-License-Identifier: EUPL-1.2

//! Domain models for Toolshelf.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ── Enumerations ──────────────────────────────────────────────────────────────

/// Commercial tier of a listed tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PriceTier {
    Free,
    Paid,
    Freemium,
}

impl PriceTier {
    pub const ALL: [PriceTier; 3] = [PriceTier::Free, PriceTier::Paid, PriceTier::Freemium];

    pub fn as_str(&self) -> &'static str {
        match self {
            PriceTier::Free => "Free",
            PriceTier::Paid => "Paid",
            PriceTier::Freemium => "Freemium",
        }
    }
}

impl fmt::Display for PriceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PriceTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PriceTier::ALL
            .into_iter()
            .find(|tier| tier.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("price must be one of: Free, Paid, Freemium — got: {s}"))
    }
}

/// Price narrowing applied by the catalog listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PriceFilter {
    #[default]
    All,
    Tier(PriceTier),
}

impl PriceFilter {
    /// `None`, an empty string and `All` all mean "no narrowing".
    pub fn parse(raw: Option<&str>) -> Result<Self, String> {
        match raw.map(str::trim) {
            None | Some("") => Ok(PriceFilter::All),
            Some(s) if s.eq_ignore_ascii_case("all") => Ok(PriceFilter::All),
            Some(s) => s.parse().map(PriceFilter::Tier),
        }
    }

    pub fn admits(&self, price: PriceTier) -> bool {
        match self {
            PriceFilter::All => true,
            PriceFilter::Tier(tier) => *tier == price,
        }
    }
}

/// Ordering of a catalog listing. Every key sorts descending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    Rating,
    Latest,
    Trending,
    /// Unrecognised key: input order is kept as is.
    Unsorted,
}

impl SortKey {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "rating" => SortKey::Rating,
            "latest" => SortKey::Latest,
            "trending" => SortKey::Trending,
            _ => SortKey::Unsorted,
        }
    }
}

// ── Entities ──────────────────────────────────────────────────────────────────

/// A cataloged third-party AI tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tool {
    pub id: Uuid,
    pub name: String,
    /// Logo URL or asset path
    pub logo: String,
    pub one_liner: String,
    pub description: String,
    pub external_link: String,
    pub video_link: Option<String>,
    pub tags: Vec<String>,
    /// Category names the tool is listed under
    pub categories: Vec<String>,
    pub price: PriceTier,
    pub view_count: u64,
    /// Mean of visible review ratings, one decimal; `0.0` without reviews
    pub rating: f64,
    pub rating_count: u32,
    pub hidden: bool,
    pub featured: bool,
    pub created_at: DateTime<Utc>,
}

/// A user review attached to exactly one tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Comment {
    pub id: Uuid,
    pub tool_id: Uuid,
    pub user_id: Uuid,
    pub user_name: String,
    pub user_avatar: Option<String>,
    /// 1–5 stars
    pub rating: i32,
    pub text: String,
    pub hidden: bool,
    pub hidden_by: Option<Uuid>,
    pub hidden_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Public profile of a registered user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub avatar: Option<String>,
    pub is_admin: bool,
    pub blocked: bool,
    /// Bookmarked tool ids, oldest first
    pub bookmarks: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// A browsable category with the free-text tags used for intent matching.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub linked_tags: Vec<String>,
    pub hidden: bool,
}

/// Static content page, e.g. `about` or `privacy`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Page {
    pub slug: String,
    pub title: String,
    pub content: String,
    pub updated_at: DateTime<Utc>,
}

/// Server-side record behind an issued session token.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Session {
    pub id: Uuid,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
}

// ── Requests ──────────────────────────────────────────────────────────────────

/// Query string for `GET /tools`.
#[derive(Debug, Default, Deserialize)]
pub struct ToolListQuery {
    pub category: Option<String>,
    pub price: Option<String>,
    pub sort: Option<String>,
}

/// Query string for `GET /search`: `q` is the plain search, `nq` the
/// natural-language one.
#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
    pub nq: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct NavigateQuery {
    pub path: String,
}

/// Request body for `POST /tools/:id/comments`.
#[derive(Debug, Deserialize)]
pub struct CommentRequest {
    pub rating: i64,
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct SignUpRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub avatar: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

/// Request body for `POST /admin/tools`.
#[derive(Debug, Deserialize)]
pub struct NewToolRequest {
    pub name: String,
    pub logo: String,
    pub one_liner: String,
    pub description: String,
    pub external_link: String,
    pub video_link: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub categories: Vec<String>,
    pub price: PriceTier,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub hidden: bool,
}

impl NewToolRequest {
    pub fn into_tool(self, now: DateTime<Utc>) -> Tool {
        Tool {
            id: Uuid::new_v4(),
            name: self.name.trim().to_string(),
            logo: self.logo,
            one_liner: self.one_liner,
            description: self.description,
            external_link: self.external_link,
            video_link: self.video_link,
            tags: self.tags,
            categories: self.categories,
            price: self.price,
            view_count: 0,
            rating: 0.0,
            rating_count: 0,
            hidden: self.hidden,
            featured: self.featured,
            created_at: now,
        }
    }
}

/// Partial update for `PATCH /admin/tools/:id`. Derived fields (rating,
/// view count) are not patchable.
#[derive(Debug, Default, Deserialize)]
pub struct ToolPatch {
    pub name: Option<String>,
    pub logo: Option<String>,
    pub one_liner: Option<String>,
    pub description: Option<String>,
    pub external_link: Option<String>,
    /// `Some(None)` clears the link
    #[serde(default, with = "double_option")]
    pub video_link: Option<Option<String>>,
    pub tags: Option<Vec<String>>,
    pub categories: Option<Vec<String>>,
    pub price: Option<PriceTier>,
    pub featured: Option<bool>,
    pub hidden: Option<bool>,
}

impl ToolPatch {
    pub fn apply(self, tool: &mut Tool) {
        if let Some(name) = self.name {
            tool.name = name.trim().to_string();
        }
        if let Some(logo) = self.logo {
            tool.logo = logo;
        }
        if let Some(one_liner) = self.one_liner {
            tool.one_liner = one_liner;
        }
        if let Some(description) = self.description {
            tool.description = description;
        }
        if let Some(link) = self.external_link {
            tool.external_link = link;
        }
        if let Some(video) = self.video_link {
            tool.video_link = video;
        }
        if let Some(tags) = self.tags {
            tool.tags = tags;
        }
        if let Some(categories) = self.categories {
            tool.categories = categories;
        }
        if let Some(price) = self.price {
            tool.price = price;
        }
        if let Some(featured) = self.featured {
            tool.featured = featured;
        }
        if let Some(hidden) = self.hidden {
            tool.hidden = hidden;
        }
    }
}

/// Request body for `POST /admin/categories`.
#[derive(Debug, Deserialize)]
pub struct NewCategoryRequest {
    pub name: String,
    #[serde(default)]
    pub linked_tags: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CategoryPatch {
    pub name: Option<String>,
    pub linked_tags: Option<Vec<String>>,
    pub hidden: Option<bool>,
}

impl CategoryPatch {
    pub fn apply(self, category: &mut Category) {
        if let Some(name) = self.name {
            category.name = name.trim().to_string();
        }
        if let Some(tags) = self.linked_tags {
            category.linked_tags = tags;
        }
        if let Some(hidden) = self.hidden {
            category.hidden = hidden;
        }
    }
}

/// Request body for `PUT /admin/pages/:slug`.
#[derive(Debug, Deserialize)]
pub struct PageRequest {
    pub title: String,
    pub content: String,
}

/// Distinguishes an absent field from an explicit `null`.
mod double_option {
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
    where
        T: Deserialize<'de>,
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(de).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn price_filter_parses_all_and_tiers() {
        assert_eq!(PriceFilter::parse(None).unwrap(), PriceFilter::All);
        assert_eq!(PriceFilter::parse(Some("All")).unwrap(), PriceFilter::All);
        assert_eq!(
            PriceFilter::parse(Some("freemium")).unwrap(),
            PriceFilter::Tier(PriceTier::Freemium)
        );
        assert!(PriceFilter::parse(Some("cheap")).is_err());
    }

    #[test]
    fn unknown_sort_key_is_unsorted() {
        assert_eq!(SortKey::parse("Trending"), SortKey::Trending);
        assert_eq!(SortKey::parse("alphabetical"), SortKey::Unsorted);
    }

    #[test]
    fn patch_distinguishes_null_from_absent_video_link() {
        let clear: ToolPatch = serde_json::from_str(r#"{"video_link": null}"#).unwrap();
        assert_eq!(clear.video_link, Some(None));

        let keep: ToolPatch = serde_json::from_str(r#"{"name": "X"}"#).unwrap();
        assert_eq!(keep.video_link, None);
    }
}
