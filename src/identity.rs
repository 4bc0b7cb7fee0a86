// SPDX-License-Identifier: EUPL-1.2

//! Identity provider and caller extraction.
//!
//! [`IdentityProvider`] is the seam towards whatever holds accounts. The
//! bundled [`StoreIdentity`] keeps users and sessions in the [`Store`] and
//! hands out tokens signed with [`SessionKeys`].

use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use chrono::Utc;
use regex::Regex;
use serde::Serialize;
use uuid::Uuid;

use crate::{
    auth::{self, SessionClaims, SessionKeys},
    db::AppState,
    error::CatalogError,
    gate::SessionState,
    models::{Session, User},
    store::{Store, UserRecord},
};

pub const MIN_PASSWORD_CHARS: usize = 6;

/// Resolved caller of a request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Identity {
    pub user_id: Uuid,
    #[serde(skip)]
    pub session_id: Uuid,
    pub name: String,
    pub email: String,
    pub avatar: Option<String>,
    pub is_admin: bool,
    pub blocked: bool,
}

impl Identity {
    fn from_user(user: User, session_id: Uuid) -> Self {
        Self {
            user_id: user.id,
            session_id,
            name: user.name,
            email: user.email,
            avatar: user.avatar,
            is_admin: user.is_admin,
            blocked: user.blocked,
        }
    }
}

/// Profile fields supplied at sign-up.
#[derive(Debug, Clone)]
pub struct Profile {
    pub name: String,
    pub avatar: Option<String>,
}

/// Outcome of a successful sign-in or sign-up.
#[derive(Debug, Clone, Serialize)]
pub struct SignedIn {
    pub token: String,
    pub user: User,
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str) -> Result<SignedIn, CatalogError>;
    async fn sign_up(&self, email: &str, password: &str, profile: Profile) -> Result<SignedIn, CatalogError>;
    async fn sign_out(&self, token: &str) -> Result<(), CatalogError>;
    /// `None` for unknown, forged or revoked tokens.
    async fn current_session(&self, token: &str) -> Result<Option<Identity>, CatalogError>;
}

fn email_pattern() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("static regex"))
}

pub struct StoreIdentity {
    store: Arc<dyn Store>,
    keys: SessionKeys,
}

impl StoreIdentity {
    pub fn new(store: Arc<dyn Store>, keys: SessionKeys) -> Self {
        Self { store, keys }
    }

    async fn open_session(&self, user: User) -> Result<SignedIn, CatalogError> {
        let session = Session {
            id: Uuid::new_v4(),
            user_id: user.id,
            created_at: Utc::now(),
            revoked_at: None,
        };
        self.store.insert_session(&session).await?;

        let token = self.keys.issue(SessionClaims { session_id: session.id, user_id: user.id });
        Ok(SignedIn { token, user })
    }

    /// Create the configured admin account, or promote it if it already exists.
    pub async fn ensure_admin(&self, email: &str, password: &str) -> Result<(), CatalogError> {
        let user_id = match self.store.find_user_by_email(email).await? {
            Some(record) => record.user.id,
            None => {
                let profile = Profile { name: "Admin".into(), avatar: None };
                self.sign_up(email, password, profile).await?.user.id
            }
        };
        self.store.set_user_admin(user_id, true).await?;
        tracing::info!("Admin account ready: {email}");
        Ok(())
    }
}

#[async_trait]
impl IdentityProvider for StoreIdentity {
    async fn sign_in(&self, email: &str, password: &str) -> Result<SignedIn, CatalogError> {
        let record = self
            .store
            .find_user_by_email(email)
            .await?
            .ok_or(CatalogError::InvalidCredentials)?;

        if !auth::verify_password(password, &record.password_hash) {
            return Err(CatalogError::InvalidCredentials);
        }
        if record.user.blocked {
            tracing::warn!("Blocked account tried to sign in: {}", record.user.id);
            return Err(CatalogError::Blocked);
        }

        self.open_session(record.user).await
    }

    async fn sign_up(&self, email: &str, password: &str, profile: Profile) -> Result<SignedIn, CatalogError> {
        let email = email.trim();
        let name = profile.name.trim();

        if !email_pattern().is_match(email) {
            return Err(CatalogError::Validation(format!("invalid email address: {email}")));
        }
        if name.is_empty() {
            return Err(CatalogError::Validation("name must not be empty".into()));
        }
        if password.chars().count() < MIN_PASSWORD_CHARS {
            return Err(CatalogError::Validation(format!(
                "password must be at least {MIN_PASSWORD_CHARS} characters"
            )));
        }

        let password_hash = auth::hash_password(password).map_err(|e| anyhow::anyhow!(e))?;
        let user = User {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: email.to_string(),
            avatar: profile.avatar,
            is_admin: false,
            blocked: false,
            bookmarks: Vec::new(),
            created_at: Utc::now(),
        };
        self.store
            .insert_user(&UserRecord { user: user.clone(), password_hash })
            .await?;

        tracing::info!("New account registered: {}", user.id);
        self.open_session(user).await
    }

    async fn sign_out(&self, token: &str) -> Result<(), CatalogError> {
        // Forged or unknown tokens have nothing to revoke.
        if let Ok(claims) = self.keys.verify(token) {
            self.store.revoke_session(claims.session_id, Utc::now()).await?;
        }
        Ok(())
    }

    async fn current_session(&self, token: &str) -> Result<Option<Identity>, CatalogError> {
        let claims = match self.keys.verify(token) {
            Ok(claims) => claims,
            Err(e) => {
                tracing::debug!("rejected session token: {e}");
                return Ok(None);
            }
        };

        let live = self
            .store
            .get_session(claims.session_id)
            .await?
            .filter(|s| s.revoked_at.is_none() && s.user_id == claims.user_id);
        if live.is_none() {
            return Ok(None);
        }

        Ok(self
            .store
            .get_user(claims.user_id)
            .await?
            .map(|user| Identity::from_user(user, claims.session_id)))
    }
}

// ── Extraction ────────────────────────────────────────────────────────────────

pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// The caller of a request, anonymous when no valid bearer token was sent.
#[derive(Debug, Clone)]
pub struct Caller(pub Option<Identity>);

impl Caller {
    /// Any signed-in caller; `action` completes "You must be logged in to …".
    pub fn require(&self, action: &'static str) -> Result<&Identity, CatalogError> {
        self.0.as_ref().ok_or(CatalogError::LoginRequired(action))
    }

    /// Signed-in and not blocked.
    pub fn require_active(&self, action: &'static str) -> Result<&Identity, CatalogError> {
        let identity = self.require(action)?;
        if identity.blocked {
            return Err(CatalogError::Blocked);
        }
        Ok(identity)
    }

    pub fn require_admin(&self, action: &str) -> Result<&Identity, CatalogError> {
        let identity = self.require("use the admin back office")?;
        if !identity.is_admin {
            return Err(CatalogError::Forbidden(format!("only admins can {action}")));
        }
        Ok(identity)
    }

    pub fn session_state(&self) -> SessionState {
        SessionState::Resolved {
            authenticated: self.0.is_some(),
            is_admin: self.0.as_ref().is_some_and(|i| i.is_admin),
        }
    }
}

#[axum::async_trait]
impl FromRequestParts<Arc<AppState>> for Caller {
    type Rejection = CatalogError;

    async fn from_request_parts(parts: &mut Parts, state: &Arc<AppState>) -> Result<Self, Self::Rejection> {
        let Some(token) = bearer_token(&parts.headers) else {
            return Ok(Caller(None));
        };
        Ok(Caller(state.identity.current_session(token).await?))
    }
}
