//! # Application State
//!
//! Shared state passed to all route handlers via the `State` extractor.
//! Cloning is cheap: the repositories share one store handle, and the review
//! repository shares its id-assignment lock across clones.

use crate::db::{DealerRepository, ReviewRepository};
use crate::store::SharedStore;

#[derive(Debug, Clone)]
pub struct AppState {
    pub dealers: DealerRepository,
    pub reviews: ReviewRepository,
    /// Raw store handle, used by the readiness probe.
    pub store: SharedStore,
}

impl AppState {
    /// Build state around an already-opened store.
    pub fn new(store: SharedStore) -> Self {
        Self {
            dealers: DealerRepository::new(store.clone()),
            reviews: ReviewRepository::new(store.clone()),
            store,
        }
    }
}
