// SPDX-License-Identifier: EUPL-1.2

//! Store selection, Redis cache, and application state.

use std::sync::Arc;

use crate::{
    auth::SessionKeys,
    cache::ToolCache,
    config::Config,
    identity::{IdentityProvider, StoreIdentity},
    store::{MemoryStore, PgStore, Store},
};

/// Shared application state injected into every Axum handler.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub identity: Arc<dyn IdentityProvider>,
    /// `None` if `REDIS_URL` is not set or unreachable (tool detail reads go
    /// straight to the store).
    pub cache: Option<ToolCache>,
}

impl AppState {
    /// Build the state described by `config`: PostgreSQL when `DATABASE_URL`
    /// is set, the seeded in-memory store otherwise; Redis optional.
    pub async fn connect(config: &Config) -> anyhow::Result<Self> {
        let store: Arc<dyn Store> = match &config.database_url {
            Some(url) => {
                let pg = PgStore::connect(url).await?;
                tracing::info!("Toolshelf connected to database");

                pg.migrate().await?;
                tracing::info!("Migrations applied");

                if pg.seed_if_empty().await? {
                    tracing::info!("Empty database seeded with the demo catalog");
                }
                Arc::new(pg)
            }
            None => {
                tracing::warn!("DATABASE_URL not set — using the in-memory demo store (data is lost on exit)");
                Arc::new(MemoryStore::seeded())
            }
        };

        let keys = match &config.session_seed {
            Some(seed) => {
                tracing::info!("SESSION_SEED set — session tokens survive restarts");
                SessionKeys::from_seed_b64(seed).map_err(|e| anyhow::anyhow!("SESSION_SEED: {e}"))?
            }
            None => {
                tracing::warn!("SESSION_SEED not set — sessions are invalidated on restart (dev mode)");
                SessionKeys::ephemeral()
            }
        };

        let identity = StoreIdentity::new(store.clone(), keys);
        if let Some(admin) = &config.admin {
            identity.ensure_admin(&admin.email, &admin.password).await?;
        }

        let cache = match &config.redis_url {
            Some(url) => ToolCache::connect(url, config.tool_cache_ttl_secs).await,
            None => {
                tracing::info!("REDIS_URL not set — tool cache disabled");
                None
            }
        };

        Ok(Self { store, identity: Arc::new(identity), cache })
    }

    /// State over an explicit store with a throwaway signing key and no cache.
    pub fn with_store(store: Arc<dyn Store>) -> Self {
        let identity = StoreIdentity::new(store.clone(), SessionKeys::ephemeral());
        Self { store, identity: Arc::new(identity), cache: None }
    }
}
