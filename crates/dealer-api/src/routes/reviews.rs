//! # Review Routes
//!
//! | Method | Path | Handler |
//! |--------|------|---------|
//! | `GET` | `/fetchReviews` | `fetch_reviews` |
//! | `GET` | `/fetchReviews/dealer/{id}` | `fetch_reviews_for_dealer` |
//! | `POST` | `/insert_review` | `insert_review` |
//!
//! Failures answer with an `{"error": ...}` body.

use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use dealer_core::{NewReview, Review};

use crate::error::AppError;
use crate::state::AppState;

/// Build the review router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/fetchReviews", get(fetch_reviews))
        .route("/fetchReviews/dealer/{id}", get(fetch_reviews_for_dealer))
        .route("/insert_review", post(insert_review))
}

/// GET /fetchReviews — every review.
async fn fetch_reviews(State(state): State<AppState>) -> Result<Json<Vec<Review>>, AppError> {
    let reviews = state
        .reviews
        .fetch_reviews()
        .await
        .map_err(AppError::ReviewFetch)?;
    Ok(Json(reviews))
}

/// GET /fetchReviews/dealer/{id} — reviews referencing one dealership.
///
/// The path segment is compared as text and never validated.
async fn fetch_reviews_for_dealer(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Review>>, AppError> {
    let reviews = state
        .reviews
        .fetch_reviews_for_dealer(&id)
        .await
        .map_err(|e| {
            tracing::warn!(dealer = %id, "review query for dealer failed");
            AppError::ReviewFetch(e)
        })?;
    Ok(Json(reviews))
}

/// POST /insert_review — store a review under the next review id.
///
/// The body is read raw and parsed as JSON whatever its content type. A body
/// that cannot be read, including one over the size limit, is an insert
/// failure like any other.
async fn insert_review(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<Review>, AppError> {
    let body = body.map_err(|e| AppError::ReviewInsert(e.to_string()))?;
    let review = NewReview::from_json(&body).map_err(|e| AppError::ReviewInsert(e.to_string()))?;

    let stored = state
        .reviews
        .insert_review(review)
        .await
        .map_err(|e| AppError::ReviewInsert(e.to_string()))?;

    tracing::info!(
        review_id = %stored.id,
        dealership = %stored.content.dealership,
        "review inserted"
    );
    Ok(Json(stored))
}
