// SPDX-License-Identifier: EUPL-1.2

//! Filter/sort engine over tool collections.
//!
//! Everything here is pure: callers load the tools from the store, narrow and
//! order them with these functions, and serialize the result.

use serde::Serialize;
use uuid::Uuid;

use crate::models::{Comment, PriceFilter, SortKey, Tool};

pub const RELATED_LIMIT: usize = 3;
pub const TRENDING_LIMIT: usize = 12;
pub const MOST_VIEWED_LIMIT: usize = 5;

/// Listing configuration: category and price narrowing plus ordering.
#[derive(Debug, Clone, Default)]
pub struct ToolFilter {
    pub category: Option<String>,
    pub price: PriceFilter,
    pub sort: SortKey,
}

/// Narrow `tools` by `filter` and order the survivors.
///
/// Hidden tools never come out of this function.
pub fn filter_tools(tools: &[Tool], filter: &ToolFilter) -> Vec<Tool> {
    let category = filter.category.as_deref().filter(|c| !c.is_empty());

    let mut out: Vec<Tool> = tools
        .iter()
        .filter(|t| !t.hidden)
        .filter(|t| category.map_or(true, |c| t.categories.iter().any(|n| n == c)))
        .filter(|t| filter.price.admits(t.price))
        .cloned()
        .collect();

    sort_tools(&mut out, filter.sort);
    out
}

/// Stable descending sort; equal keys keep their input order.
pub fn sort_tools(tools: &mut [Tool], key: SortKey) {
    match key {
        SortKey::Rating => tools.sort_by(|a, b| b.rating.total_cmp(&a.rating)),
        SortKey::Latest => tools.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        SortKey::Trending => tools.sort_by(|a, b| b.view_count.cmp(&a.view_count)),
        SortKey::Unsorted => {}
    }
}

/// Plain substring search over name, one-liner, description and tags.
pub fn text_search(tools: &[Tool], query: &str) -> Vec<Tool> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }

    tools
        .iter()
        .filter(|t| !t.hidden)
        .filter(|t| {
            t.name.to_lowercase().contains(&needle)
                || t.one_liner.to_lowercase().contains(&needle)
                || t.description.to_lowercase().contains(&needle)
                || t.tags.iter().any(|tag| tag.to_lowercase().contains(&needle))
        })
        .cloned()
        .collect()
}

pub fn featured(tools: &[Tool]) -> Vec<Tool> {
    tools.iter().filter(|t| !t.hidden && t.featured).cloned().collect()
}

pub fn in_category(tools: &[Tool], name: &str) -> Vec<Tool> {
    tools
        .iter()
        .filter(|t| !t.hidden && t.categories.iter().any(|c| c == name))
        .cloned()
        .collect()
}

/// Ids of every tool listed under `name`, hidden ones included.
pub fn listed_under(tools: &[Tool], name: &str) -> Vec<Uuid> {
    tools
        .iter()
        .filter(|t| t.categories.iter().any(|c| c == name))
        .map(|t| t.id)
        .collect()
}

/// Best-rated visible tools sharing a category with `id`.
pub fn related(tools: &[Tool], id: Uuid) -> Vec<Tool> {
    let Some(anchor) = tools.iter().find(|t| t.id == id) else {
        return Vec::new();
    };

    let mut out: Vec<Tool> = tools
        .iter()
        .filter(|t| t.id != id && !t.hidden)
        .filter(|t| t.categories.iter().any(|c| anchor.categories.contains(c)))
        .cloned()
        .collect();

    sort_tools(&mut out, SortKey::Rating);
    out.truncate(RELATED_LIMIT);
    out
}

pub fn trending(tools: &[Tool], limit: usize) -> Vec<Tool> {
    let mut out: Vec<Tool> = tools.iter().filter(|t| !t.hidden).cloned().collect();
    sort_tools(&mut out, SortKey::Trending);
    out.truncate(limit);
    out
}

/// Back-office summary. Hidden tools and comments are counted, not skipped.
#[derive(Debug, Clone, Serialize)]
pub struct AdminStats {
    pub total_tools: usize,
    pub featured_tools: usize,
    pub hidden_tools: usize,
    pub total_comments: usize,
    pub hidden_comments: usize,
    pub most_viewed: Vec<Tool>,
}

pub fn admin_stats(tools: &[Tool], comments: &[Comment]) -> AdminStats {
    let mut most_viewed = tools.to_vec();
    sort_tools(&mut most_viewed, SortKey::Trending);
    most_viewed.truncate(MOST_VIEWED_LIMIT);

    AdminStats {
        total_tools: tools.len(),
        featured_tools: tools.iter().filter(|t| t.featured).count(),
        hidden_tools: tools.iter().filter(|t| t.hidden).count(),
        total_comments: comments.len(),
        hidden_comments: comments.iter().filter(|c| c.hidden).count(),
        most_viewed,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
