// SPDX-License-Identifier: EUPL-1.2

//! Error types for Toolshelf.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::store::StoreError;

/// Application-level errors returned by handlers and the catalog logic.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Validation error: {0}")]
    Validation(String),

    /// Anonymous caller attempted an operation that needs an account.
    #[error("You must be logged in to {0}")]
    LoginRequired(&'static str),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Your account has been blocked")]
    Blocked,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Store error: {0}")]
    Store(StoreError),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<StoreError> for CatalogError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Duplicate(what) => CatalogError::Conflict(what),
            other => CatalogError::Store(other),
        }
    }
}

impl IntoResponse for CatalogError {
    fn into_response(self) -> Response {
        let status = match &self {
            CatalogError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            CatalogError::LoginRequired(_) | CatalogError::InvalidCredentials => {
                StatusCode::UNAUTHORIZED
            }
            CatalogError::Forbidden(_) | CatalogError::Blocked => StatusCode::FORBIDDEN,
            CatalogError::NotFound(_) => StatusCode::NOT_FOUND,
            CatalogError::Conflict(_) => StatusCode::CONFLICT,
            CatalogError::Store(e) => {
                tracing::error!("store call failed: {e}");
                StatusCode::BAD_GATEWAY
            }
            CatalogError::Internal(e) => {
                tracing::error!("internal error: {e:#}");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        // Collaborator failures surface as a generic notice, details stay in the log.
        let message = match &self {
            CatalogError::Store(_) => "Something went wrong, please try again".to_string(),
            CatalogError::Internal(_) => "Internal error".to_string(),
            other => other.to_string(),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_store_entry_maps_to_conflict() {
        let err: CatalogError = StoreError::Duplicate("email taken".into()).into();
        assert!(matches!(err, CatalogError::Conflict(_)));
        assert_eq!(err.into_response().status(), StatusCode::CONFLICT);
    }

    #[test]
    fn login_required_names_the_operation() {
        let err = CatalogError::LoginRequired("bookmark tools");
        assert_eq!(err.to_string(), "You must be logged in to bookmark tools");
        assert_eq!(err.into_response().status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn store_failures_are_bad_gateway() {
        let err: CatalogError = StoreError::Corrupt("price".into()).into();
        assert_eq!(err.into_response().status(), StatusCode::BAD_GATEWAY);
    }
}
