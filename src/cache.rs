// SPDX-License-Identifier: EUPL-1.2

//! Redis cache for tool detail records.
//!
//! Failures never fail a request: they are logged and the caller falls back
//! to the store.

use redis::{aio::ConnectionManager, AsyncCommands};
use uuid::Uuid;

use crate::models::Tool;

#[derive(Clone)]
pub struct ToolCache {
    conn: ConnectionManager,
    ttl_secs: u64,
}

pub fn tool_key(id: Uuid) -> String {
    format!("toolshelf:tool:{id}")
}

impl ToolCache {
    /// Connect to Redis; `None` when the URL is invalid or unreachable.
    pub async fn connect(url: &str, ttl_secs: u64) -> Option<Self> {
        let client = match redis::Client::open(url) {
            Ok(client) => client,
            Err(e) => {
                tracing::warn!("Redis URL invalid (cache disabled): {e}");
                return None;
            }
        };

        match ConnectionManager::new(client).await {
            Ok(conn) => {
                tracing::info!("Redis cache connected: {url}");
                Some(Self { conn, ttl_secs })
            }
            Err(e) => {
                tracing::warn!("Redis connect failed (cache disabled): {e}");
                None
            }
        }
    }

    pub async fn get(&self, id: Uuid) -> Option<Tool> {
        let mut conn = self.conn.clone();
        let raw: Option<String> = match conn.get(tool_key(id)).await {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!("cache read failed for tool {id}: {e}");
                return None;
            }
        };

        raw.and_then(|json| match serde_json::from_str(&json) {
            Ok(tool) => Some(tool),
            Err(e) => {
                tracing::warn!("discarding unreadable cache entry for tool {id}: {e}");
                None
            }
        })
    }

    pub async fn put(&self, tool: &Tool) {
        let json = match serde_json::to_string(tool) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!("cannot serialize tool {} for cache: {e}", tool.id);
                return;
            }
        };

        let mut conn = self.conn.clone();
        if let Err(e) = conn.set_ex::<_, _, ()>(tool_key(tool.id), json, self.ttl_secs).await {
            tracing::warn!("cache write failed for tool {}: {e}", tool.id);
        }
    }

    pub async fn invalidate(&self, id: Uuid) {
        let mut conn = self.conn.clone();
        if let Err(e) = conn.del::<_, ()>(tool_key(id)).await {
            tracing::warn!("cache invalidation failed for tool {id}: {e}");
        }
    }
}
