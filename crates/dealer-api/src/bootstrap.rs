//! # Startup Sequence
//!
//! Open the store, seed it, and hand back the application state. Seeding is
//! awaited here, before the listener is bound, so the first request already
//! sees fully seeded collections. Any failure aborts startup.

use thiserror::Error;

use crate::config::AppConfig;
use crate::seed::{self, SeedData, SeedError};
use crate::state::AppState;
use crate::store::StoreError;

#[derive(Error, Debug)]
pub enum BootstrapError {
    #[error("store initialization failed: {0}")]
    Store(#[from] StoreError),

    #[error("seeding failed: {0}")]
    Seed(#[from] SeedError),
}

/// Connect to the configured store and, unless disabled, seed it.
pub async fn bootstrap(config: AppConfig) -> Result<AppState, BootstrapError> {
    let store = crate::db::connect(config.database_url.as_deref()).await?;

    if config.seed_on_start {
        let data = SeedData::load(&config.seed_dir).await?;
        let report = seed::seed(store.as_ref(), &data).await?;
        tracing::info!(
            reviews = report.reviews.inserted,
            dealerships = report.dealerships.inserted,
            seed_dir = %config.seed_dir.display(),
            "store seeded"
        );
    } else {
        tracing::info!("seeding disabled, keeping existing collection contents");
    }

    Ok(AppState::new(store))
}
