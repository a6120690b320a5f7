//! # Data Access Layer
//!
//! Repositories over the two collections. Each holds the injected
//! [`SharedStore`]; nothing here is process-global.
//!
//! - [`DealerRepository`] — the four dealership queries plus tagged lookup.
//! - [`ReviewRepository`] — review listing, dealer filtering and insertion
//!   with service-assigned ids.

pub mod dealerships;
pub mod reviews;

use std::sync::Arc;

pub use dealerships::DealerRepository;
pub use reviews::ReviewRepository;

use crate::store::{MemoryStore, PgDocumentStore, SharedStore, StoreError};

/// Open the configured store.
///
/// Uses Postgres when `database_url` is given, the in-memory store otherwise.
/// Returns `Err` if the URL is set but the connection or migration fails.
pub async fn connect(database_url: Option<&str>) -> Result<SharedStore, StoreError> {
    match database_url {
        Some(url) => Ok(Arc::new(PgDocumentStore::connect(url).await?)),
        None => {
            tracing::warn!(
                "DATABASE_URL not set — running with the in-memory store. \
                 Data will not survive restarts."
            );
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}
