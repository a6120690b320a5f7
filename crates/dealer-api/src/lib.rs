//! # dealer-api — REST Service over Dealerships and Reviews
//!
//! Seeds the document store from two JSON fixtures at startup, then serves
//! read endpoints over both collections and one write endpoint for reviews.
//!
//! ## API Surface
//!
//! | Method | Path                         | Module                 |
//! |--------|------------------------------|------------------------|
//! | `GET`  | `/`                          | welcome text           |
//! | `GET`  | `/fetchReviews`              | [`routes::reviews`]    |
//! | `GET`  | `/fetchReviews/dealer/{id}`  | [`routes::reviews`]    |
//! | `POST` | `/insert_review`             | [`routes::reviews`]    |
//! | `GET`  | `/fetchDealers`              | [`routes::dealers`]    |
//! | `GET`  | `/fetchDealers/{state}`      | [`routes::dealers`]    |
//! | `GET`  | `/fetchDealer/{id}`          | [`routes::dealers`]    |
//! | `GET`  | `/health/*`                  | probes                 |
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! TraceLayer → CorsLayer → DefaultBodyLimit → Handler
//! ```
//!
//! ## Layers
//!
//! - [`store`] — document store trait with Postgres and in-memory backends.
//! - [`db`] — repositories; every store handle is injected, none is global.
//! - [`seed`] — fixture loading at startup.
//! - [`routes`] — HTTP handlers; all errors map through [`AppError`].

pub mod bootstrap;
pub mod config;
pub mod db;
pub mod error;
pub mod routes;
pub mod seed;
pub mod state;
pub mod store;

use axum::extract::{DefaultBodyLimit, State};
use axum::http::{Method, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use error::AppError;
pub use state::AppState;

/// Plain-text body of `GET /`.
pub const WELCOME_TEXT: &str = "Welcome to the Dealership Reviews API";

/// Assemble the full application router with all routes and middleware.
///
/// Health probes (`/health/*`) are mounted outside the CORS and body-limit
/// layers.
pub fn app(state: AppState) -> Router {
    // Any origin, the default method set of a permissive CORS setup.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::HEAD,
            Method::PUT,
            Method::PATCH,
            Method::POST,
            Method::DELETE,
        ])
        .allow_headers(Any);

    let api = Router::new()
        .route("/", get(home))
        .merge(routes::router())
        .layer(DefaultBodyLimit::max(2 * 1024 * 1024))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state.clone());

    let health = Router::new()
        .route("/health/liveness", get(liveness))
        .route("/health/readiness", get(readiness))
        .with_state(state);

    Router::new().merge(health).merge(api)
}

/// GET / — welcome text.
async fn home() -> &'static str {
    WELCOME_TEXT
}

/// Liveness probe — always returns 200 if the process is running.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe — 200 "ready" when the store answers a ping, 503 otherwise.
async fn readiness(State(state): State<AppState>) -> impl IntoResponse {
    match state.store.ping().await {
        Ok(()) => (StatusCode::OK, "ready").into_response(),
        Err(e) => {
            tracing::warn!("Store health check failed: {e}");
            (StatusCode::SERVICE_UNAVAILABLE, "store unreachable").into_response()
        }
    }
}
