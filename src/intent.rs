// SPDX-License-Identifier: EUPL-1.2

//! Keyword-intent search behind `GET /search?nq=…`.
//!
//! This is a heuristic keyword matcher, not a semantic or embedding search:
//! the query is scanned for a price keyword and for category names or
//! linked tags, and the detected intents become a filter predicate.
//!
//! Price detection checks `free` before `paid` and has no keyword for
//! Freemium, so "freemium" in a query reads as a Free intent.

use crate::{
    catalog,
    models::{Category, PriceTier, SortKey, Tool},
};

/// Intents detected in a free-text query.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchIntent<'a> {
    pub price: Option<PriceTier>,
    pub categories: Vec<&'a Category>,
}

impl<'a> SearchIntent<'a> {
    /// Scan `query` against the visible entries of `categories`.
    pub fn parse(query: &str, categories: &'a [Category]) -> Self {
        let query = query.to_lowercase();

        let price = if query.contains("free") {
            Some(PriceTier::Free)
        } else if query.contains("paid") {
            Some(PriceTier::Paid)
        } else {
            None
        };

        let categories = categories
            .iter()
            .filter(|c| !c.hidden)
            .filter(|c| {
                query.contains(&c.name.to_lowercase())
                    || c.linked_tags
                        .iter()
                        .filter(|tag| !tag.is_empty())
                        .any(|tag| query.contains(&tag.to_lowercase()))
            })
            .collect();

        Self { price, categories }
    }

    pub fn matches(&self, tool: &Tool) -> bool {
        if tool.hidden {
            return false;
        }

        let price_ok = self.price.map_or(true, |p| tool.price == p);

        let category_ok = self.categories.is_empty()
            || self.categories.iter().any(|cat| {
                tool.categories.contains(&cat.name)
                    || tool.tags.iter().any(|tag| cat.linked_tags.contains(tag))
            });

        price_ok && category_ok
    }
}

/// Run a natural-language query; matches come back best-rated first.
pub fn natural_search(tools: &[Tool], categories: &[Category], query: &str) -> Vec<Tool> {
    if query.trim().is_empty() {
        return Vec::new();
    }

    let intent = SearchIntent::parse(query, categories);
    tracing::debug!(
        price = ?intent.price,
        categories = intent.categories.len(),
        "parsed search intent"
    );

    let mut out: Vec<Tool> = tools.iter().filter(|t| intent.matches(t)).cloned().collect();
    catalog::sort_tools(&mut out, SortKey::Rating);
    out
}
