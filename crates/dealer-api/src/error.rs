//! # API Error Types
//!
//! Structured error type implementing `axum::response::IntoResponse`.
//!
//! Clients only ever see a fixed message. Review routes answer with an
//! `{"error": ...}` body, dealership routes with `{"message": ...}`; the
//! underlying store failure is logged server-side and never returned.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::store::StoreError;

pub const FETCH_DOCUMENTS_FAILED: &str = "Error fetching documents";
pub const INSERT_REVIEW_FAILED: &str = "Error inserting review";
pub const INTERNAL_SERVER_ERROR: &str = "Internal server error";
pub const INVALID_DEALER_ID: &str = "Invalid dealer ID";
pub const DEALER_NOT_FOUND: &str = "Dealer not found";

/// JSON error body. Exactly one of the two fields is set.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ErrorBody {
    fn error(text: &str) -> Self {
        Self {
            error: Some(text.to_string()),
            message: None,
        }
    }

    fn message(text: &str) -> Self {
        Self {
            error: None,
            message: Some(text.to_string()),
        }
    }
}

/// Application-level error type that implements [`IntoResponse`] for Axum.
#[derive(Error, Debug)]
pub enum AppError {
    /// Review listing failed (500, `error` body).
    #[error("fetching reviews failed: {0}")]
    ReviewFetch(#[source] StoreError),

    /// Review body unparseable or insert failed (500, `error` body).
    #[error("inserting review failed: {0}")]
    ReviewInsert(String),

    /// Dealership query failed (500, `message` body).
    #[error("fetching dealers failed: {0}")]
    DealerFetch(#[source] StoreError),

    /// Path segment is neither a store id nor numeric (400).
    #[error("invalid dealer id: {0}")]
    InvalidDealerId(String),

    /// No dealership for the lookup (404).
    #[error("dealer not found: {0}")]
    DealerNotFound(String),
}

impl AppError {
    /// Return the HTTP status code and client-facing body for this error.
    fn status_and_body(&self) -> (StatusCode, ErrorBody) {
        match self {
            Self::ReviewFetch(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorBody::error(FETCH_DOCUMENTS_FAILED),
            ),
            Self::ReviewInsert(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorBody::error(INSERT_REVIEW_FAILED),
            ),
            Self::DealerFetch(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorBody::message(INTERNAL_SERVER_ERROR),
            ),
            Self::InvalidDealerId(_) => (StatusCode::BAD_REQUEST, ErrorBody::message(INVALID_DEALER_ID)),
            Self::DealerNotFound(_) => (StatusCode::NOT_FOUND, ErrorBody::message(DEALER_NOT_FOUND)),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = self.status_and_body();

        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, "request rejected");
        }

        (status, Json(body)).into_response()
    }
}

impl From<dealer_core::IdentityError> for AppError {
    fn from(err: dealer_core::IdentityError) -> Self {
        Self::InvalidDealerId(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    fn store_err() -> StoreError {
        StoreError::Unavailable("connection reset".to_string())
    }

    #[test]
    fn status_codes() {
        let cases = [
            (AppError::ReviewFetch(store_err()), StatusCode::INTERNAL_SERVER_ERROR),
            (AppError::ReviewInsert("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (AppError::DealerFetch(store_err()), StatusCode::INTERNAL_SERVER_ERROR),
            (AppError::InvalidDealerId("abc".into()), StatusCode::BAD_REQUEST),
            (AppError::DealerNotFound("7".into()), StatusCode::NOT_FOUND),
        ];
        for (err, expected) in cases {
            assert_eq!(err.status_and_body().0, expected, "{err}");
        }
    }

    #[test]
    fn review_errors_use_error_field() {
        let (_, body) = AppError::ReviewFetch(store_err()).status_and_body();
        assert_eq!(body.error.as_deref(), Some(FETCH_DOCUMENTS_FAILED));
        assert!(body.message.is_none());
    }

    #[test]
    fn dealer_errors_use_message_field() {
        let (_, body) = AppError::DealerNotFound("7".into()).status_and_body();
        assert_eq!(body.message.as_deref(), Some(DEALER_NOT_FOUND));
        assert!(body.error.is_none());
    }

    #[test]
    fn identity_error_converts_to_bad_request() {
        let err = AppError::from(dealer_core::IdentityError::InvalidDealerId("zz".into()));
        assert!(matches!(err, AppError::InvalidDealerId(_)));
    }

    /// Helper to extract status and raw JSON from a Response.
    async fn response_parts(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn into_response_hides_store_details() {
        let (status, body) = response_parts(AppError::DealerFetch(store_err())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, serde_json::json!({"message": "Internal server error"}));
        assert!(!body.to_string().contains("connection reset"));
    }

    #[tokio::test]
    async fn into_response_insert_failure() {
        let (status, body) =
            response_parts(AppError::ReviewInsert("missing field `name`".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, serde_json::json!({"error": "Error inserting review"}));
    }
}
