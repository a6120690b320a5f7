//! # Seed Loader
//!
//! Replaces the contents of both collections with the fixture files on
//! startup:
//!
//! - `reviews.json` — `{"reviews": [...]}`
//! - `dealerships.json` — `{"dealerships": [...]}`
//!
//! Every entry must decode as its collection's document type when the files
//! are loaded, so a malformed fixture stops startup rather than failing
//! later reads. Each collection is emptied and then bulk-loaded. The two
//! collections are seeded concurrently and joined; the first failure is
//! returned to the caller, which aborts startup.

use std::path::{Path, PathBuf};

use dealer_core::{CoreError, Dealership, Review, DEALERSHIPS, REVIEWS};
use serde_json::Value;
use thiserror::Error;

use crate::store::{Document, DocumentStore, Filter, StoreError};

pub const REVIEWS_FILE: &str = "reviews.json";
pub const DEALERSHIPS_FILE: &str = "dealerships.json";

#[derive(Error, Debug)]
pub enum SeedError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{} has no array under key {key:?}", path.display())]
    MissingKey { path: PathBuf, key: &'static str },

    #[error("{}: entry {index} under {key:?} is not an object", path.display())]
    NotAnObject {
        path: PathBuf,
        key: &'static str,
        index: usize,
    },

    #[error("{}: entry {index} under {key:?} is invalid: {source}", path.display())]
    InvalidEntry {
        path: PathBuf,
        key: &'static str,
        index: usize,
        #[source]
        source: CoreError,
    },

    #[error("failed to seed {collection}: {source}")]
    Store {
        collection: &'static str,
        #[source]
        source: StoreError,
    },
}

/// Fixture contents for both collections.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeedData {
    pub reviews: Vec<Document>,
    pub dealerships: Vec<Document>,
}

impl SeedData {
    /// Read both fixture files from `dir`.
    pub async fn load(dir: &Path) -> Result<Self, SeedError> {
        let reviews_path = dir.join(REVIEWS_FILE);
        let dealerships_path = dir.join(DEALERSHIPS_FILE);

        let (reviews_raw, dealerships_raw) = tokio::try_join!(
            read_file(&reviews_path),
            read_file(&dealerships_path),
        )?;

        Ok(Self {
            reviews: parse_fixture(
                &reviews_path,
                &reviews_raw,
                REVIEWS,
                Review::fixture_document,
            )?,
            dealerships: parse_fixture(
                &dealerships_path,
                &dealerships_raw,
                DEALERSHIPS,
                Dealership::fixture_document,
            )?,
        })
    }
}

/// Counts for one seeded collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollectionReport {
    pub removed: u64,
    pub inserted: usize,
}

/// Outcome of a seeding run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub reviews: CollectionReport,
    pub dealerships: CollectionReport,
}

/// Replace both collections with `data`.
pub async fn seed(store: &dyn DocumentStore, data: &SeedData) -> Result<SeedReport, SeedError> {
    let (reviews, dealerships) = tokio::try_join!(
        replace_collection(store, REVIEWS, &data.reviews),
        replace_collection(store, DEALERSHIPS, &data.dealerships),
    )?;

    Ok(SeedReport {
        reviews,
        dealerships,
    })
}

async fn replace_collection(
    store: &dyn DocumentStore,
    collection: &'static str,
    docs: &[Document],
) -> Result<CollectionReport, SeedError> {
    let to_store = |source| SeedError::Store { collection, source };

    let removed = store
        .delete_many(collection, &Filter::All)
        .await
        .map_err(to_store)?;

    let inserted = if docs.is_empty() {
        0
    } else {
        store
            .insert_many(collection, docs.to_vec())
            .await
            .map_err(to_store)?
            .len()
    };

    tracing::info!(collection, removed, inserted, "collection seeded");
    Ok(CollectionReport { removed, inserted })
}

async fn read_file(path: &Path) -> Result<Vec<u8>, SeedError> {
    tokio::fs::read(path).await.map_err(|source| SeedError::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn parse_fixture(
    path: &Path,
    raw: &[u8],
    key: &'static str,
    decode: fn(Document) -> Result<Document, CoreError>,
) -> Result<Vec<Document>, SeedError> {
    let value: Value = serde_json::from_slice(raw).map_err(|source| SeedError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    let Some(Value::Array(entries)) = value.get(key).cloned() else {
        return Err(SeedError::MissingKey {
            path: path.to_path_buf(),
            key,
        });
    };

    entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| match entry {
            Value::Object(doc) => decode(doc).map_err(|source| SeedError::InvalidEntry {
                path: path.to_path_buf(),
                key,
                index,
                source,
            }),
            _ => Err(SeedError::NotAnObject {
                path: path.to_path_buf(),
                key,
                index,
            }),
        })
        .collect()
}
