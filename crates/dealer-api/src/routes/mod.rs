//! # API Route Modules
//!
//! - `dealers` — dealership listing, state filter and single-dealer lookup.
//! - `reviews` — review listing, per-dealer filter and insertion.

pub mod dealers;
pub mod reviews;

use axum::Router;

use crate::state::AppState;

/// Both route families merged.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(dealers::router())
        .merge(reviews::router())
}
