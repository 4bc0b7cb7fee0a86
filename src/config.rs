// SPDX-License-Identifier: EUPL-1.2

//! Runtime configuration, read once from the environment.
//!
//! | Variable | Default |
//! |----------|---------|
//! | `LISTEN_ADDR` | `0.0.0.0:3100` |
//! | `DATABASE_URL` | unset → in-memory store with demo data |
//! | `REDIS_URL` | unset → tool cache disabled |
//! | `SESSION_SEED` | unset → random signing key per process |
//! | `TOOL_CACHE_TTL_SECS` | `300` |
//! | `ADMIN_EMAIL` / `ADMIN_PASSWORD` | unset → no admin bootstrap |

use anyhow::Context;

pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:3100";
pub const DEFAULT_TOOL_CACHE_TTL_SECS: u64 = 300;

#[derive(Debug, Clone)]
pub struct AdminBootstrap {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub listen_addr: String,
    pub database_url: Option<String>,
    pub redis_url: Option<String>,
    /// base64url-encoded 32-byte Ed25519 seed for session tokens
    pub session_seed: Option<String>,
    pub tool_cache_ttl_secs: u64,
    pub admin: Option<AdminBootstrap>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: DEFAULT_LISTEN_ADDR.into(),
            database_url: None,
            redis_url: None,
            session_seed: None,
            tool_cache_ttl_secs: DEFAULT_TOOL_CACHE_TTL_SECS,
            admin: None,
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let tool_cache_ttl_secs = match var("TOOL_CACHE_TTL_SECS") {
            Some(raw) => raw
                .trim()
                .parse()
                .with_context(|| format!("TOOL_CACHE_TTL_SECS must be a number of seconds, got {raw:?}"))?,
            None => DEFAULT_TOOL_CACHE_TTL_SECS,
        };

        let admin = match (var("ADMIN_EMAIL"), var("ADMIN_PASSWORD")) {
            (Some(email), Some(password)) => Some(AdminBootstrap { email, password }),
            (Some(_), None) | (None, Some(_)) => {
                anyhow::bail!("ADMIN_EMAIL and ADMIN_PASSWORD must be set together")
            }
            (None, None) => None,
        };

        Ok(Self {
            listen_addr: var("LISTEN_ADDR").unwrap_or_else(|| DEFAULT_LISTEN_ADDR.into()),
            database_url: var("DATABASE_URL"),
            redis_url: var("REDIS_URL"),
            session_seed: var("SESSION_SEED"),
            tool_cache_ttl_secs,
            admin,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let cfg = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(cfg.listen_addr, DEFAULT_LISTEN_ADDR);
        assert!(cfg.database_url.is_none());
        assert_eq!(cfg.tool_cache_ttl_secs, DEFAULT_TOOL_CACHE_TTL_SECS);
        assert!(cfg.admin.is_none());
    }

    #[test]
    fn empty_values_count_as_unset() {
        let cfg = Config::from_lookup(lookup(&[("DATABASE_URL", "  ")])).unwrap();
        assert!(cfg.database_url.is_none());
    }

    #[test]
    fn bad_ttl_and_half_admin_are_errors() {
        assert!(Config::from_lookup(lookup(&[("TOOL_CACHE_TTL_SECS", "soon")])).is_err());
        assert!(Config::from_lookup(lookup(&[("ADMIN_EMAIL", "a@b.io")])).is_err());

        let cfg = Config::from_lookup(lookup(&[
            ("ADMIN_EMAIL", "a@b.io"),
            ("ADMIN_PASSWORD", "secret-pw"),
            ("TOOL_CACHE_TTL_SECS", "60"),
        ]))
        .unwrap();
        assert_eq!(cfg.admin.unwrap().email, "a@b.io");
        assert_eq!(cfg.tool_cache_ttl_secs, 60);
    }
}
