// SPDX-License-Identifier: EUPL-1.2

//! Account and session endpoints.
//!
//! ## Endpoints
//!
//! - `POST /auth/signup`   — Register and open a session
//! - `POST /auth/signin`   — Open a session
//! - `POST /auth/signout`  — Revoke the presented session
//! - `GET  /auth/session`  — Who is calling
//!
//! Sessions are bearer tokens: `Authorization: Bearer <token>`.

use std::sync::Arc;

use axum::{extract::State, http::HeaderMap, http::StatusCode, Json};
use serde_json::{json, Value};

use crate::{
    db::AppState,
    error::CatalogError,
    identity::{bearer_token, Caller, Profile, SignedIn},
    models::{SignInRequest, SignUpRequest},
};

/// `POST /auth/signup`
///
/// Body: `{ "name": "Jane", "email": "jane@example.com", "password": "…", "avatar": null }`
pub async fn sign_up(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SignUpRequest>,
) -> Result<(StatusCode, Json<SignedIn>), CatalogError> {
    let profile = Profile { name: req.name, avatar: req.avatar };
    let signed = state.identity.sign_up(&req.email, &req.password, profile).await?;
    Ok((StatusCode::CREATED, Json(signed)))
}

/// `POST /auth/signin`
pub async fn sign_in(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SignInRequest>,
) -> Result<Json<SignedIn>, CatalogError> {
    let signed = state.identity.sign_in(&req.email, &req.password).await?;
    tracing::info!(user = %signed.user.id, "Signed in");
    Ok(Json(signed))
}

/// `POST /auth/signout` — Succeeds without a token too.
pub async fn sign_out(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Value>, CatalogError> {
    if let Some(token) = bearer_token(&headers) {
        state.identity.sign_out(token).await?;
    }
    Ok(Json(json!({ "signed_out": true })))
}

/// `GET /auth/session`
pub async fn session(caller: Caller) -> Json<Value> {
    Json(json!({
        "authenticated": caller.0.is_some(),
        "user": caller.0,
    }))
}

#[cfg(test)]
mod tests {
    use crate::test_support::*;
    use axum::http::StatusCode;
    use serde_json::{json, Value};

    #[tokio::test]
    async fn sign_up_sign_out_round() {
        let (server, _) = test_server().await;

        let resp = server
            .post("/auth/signup")
            .json(&json!({
                "name": "Jane Smith",
                "email": "jane@example.com",
                "password": "secret-pw",
            }))
            .await;
        resp.assert_status(StatusCode::CREATED);
        let body: Value = resp.json();
        let token = body["token"].as_str().unwrap().to_string();
        assert_eq!(body["user"]["email"], "jane@example.com");
        assert!(body["user"].get("password_hash").is_none());

        let who: Value = server.get("/auth/session").add_header(AUTH, bearer(&token)).await.json();
        assert_eq!(who["authenticated"], true);
        assert_eq!(who["user"]["name"], "Jane Smith");

        server
            .post("/auth/signout")
            .add_header(AUTH, bearer(&token))
            .await
            .assert_status_ok();

        let who: Value = server.get("/auth/session").add_header(AUTH, bearer(&token)).await.json();
        assert_eq!(who["authenticated"], false);
        assert_eq!(who["user"], Value::Null);
    }

    #[tokio::test]
    async fn sign_in_checks_credentials() {
        let (server, state) = test_server().await;
        member_token(&state, "jane@example.com").await;

        server
            .post("/auth/signin")
            .json(&json!({ "email": "jane@example.com", "password": "wrong-pw" }))
            .await
            .assert_status(StatusCode::UNAUTHORIZED);

        let body: Value = server
            .post("/auth/signin")
            .json(&json!({ "email": "Jane@Example.com", "password": "secret-pw" }))
            .await
            .json();
        assert!(body["token"].as_str().is_some());
    }

    #[tokio::test]
    async fn forged_tokens_read_as_anonymous() {
        let (server, _) = test_server().await;
        let who: Value = server
            .get("/auth/session")
            .add_header(AUTH, bearer("bm90.YXRva2Vu"))
            .await
            .json();
        assert_eq!(who["authenticated"], false);
    }

    #[tokio::test]
    async fn duplicate_sign_up_conflicts() {
        let (server, state) = test_server().await;
        member_token(&state, "jane@example.com").await;

        server
            .post("/auth/signup")
            .json(&json!({ "name": "Jane", "email": "jane@example.com", "password": "secret-pw" }))
            .await
            .assert_status(StatusCode::CONFLICT);
    }
}
