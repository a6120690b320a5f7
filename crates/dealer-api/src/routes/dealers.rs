//! # Dealership Routes
//!
//! | Method | Path | Handler |
//! |--------|------|---------|
//! | `GET` | `/fetchDealers` | `fetch_dealers` |
//! | `GET` | `/fetchDealers/{state}` | `fetch_dealers_by_state` |
//! | `GET` | `/fetchDealer/{id}` | `fetch_dealer` |
//!
//! Failures answer with a `{"message": ...}` body.

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use dealer_core::{DealerLookup, Dealership};

use crate::error::AppError;
use crate::state::AppState;

/// Build the dealership router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/fetchDealers", get(fetch_dealers))
        .route("/fetchDealers/{state}", get(fetch_dealers_by_state))
        .route("/fetchDealer/{id}", get(fetch_dealer))
}

/// GET /fetchDealers — every dealership.
async fn fetch_dealers(State(state): State<AppState>) -> Result<Json<Vec<Dealership>>, AppError> {
    let dealers = state
        .dealers
        .fetch_all_dealers()
        .await
        .map_err(AppError::DealerFetch)?;
    Ok(Json(dealers))
}

/// GET /fetchDealers/{state} — dealerships in one state; `[]` when none match.
async fn fetch_dealers_by_state(
    State(state): State<AppState>,
    Path(region): Path<String>,
) -> Result<Json<Vec<Dealership>>, AppError> {
    let dealers = state
        .dealers
        .fetch_dealers_by_state(&region)
        .await
        .map_err(|e| {
            tracing::warn!(state = %region, "dealer state query failed");
            AppError::DealerFetch(e)
        })?;
    Ok(Json(dealers))
}

/// GET /fetchDealer/{id} — one dealership by store id or numeric id.
///
/// A valid store id is looked up as such; otherwise the segment must read
/// as a number. Numbers that cannot be a dealer id (`12.5`, `1e30`) give 404,
/// text that is not a number gives 400.
async fn fetch_dealer(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Dealership>, AppError> {
    let lookup = DealerLookup::parse(&id)?;

    state
        .dealers
        .fetch_dealer(lookup)
        .await
        .map_err(AppError::DealerFetch)?
        .map(Json)
        .ok_or(AppError::DealerNotFound(id))
}
