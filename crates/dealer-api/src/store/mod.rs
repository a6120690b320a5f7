//! # Document Store
//!
//! The service talks to its persistence through [`DocumentStore`]: named
//! collections of JSON documents reachable via find, insert and
//! delete-by-filter. Every document carries a store-assigned `_id`.
//!
//! ## Backends
//!
//! - [`PgDocumentStore`] — PostgreSQL via SQLx, one `documents` table holding
//!   JSONB bodies. Used when `DATABASE_URL` is set.
//! - [`MemoryStore`] — process-local, for development and tests. Data does
//!   not survive restarts.

pub mod memory;
pub mod postgres;

use std::cmp::Ordering;
use std::sync::Arc;

use async_trait::async_trait;
use dealer_core::StoreId;
use serde_json::{Map, Value};
use thiserror::Error;

pub use memory::MemoryStore;
pub use postgres::PgDocumentStore;

/// A stored document: a JSON object.
pub type Document = Map<String, Value>;

/// Store handle shared by the repositories.
pub type SharedStore = Arc<dyn DocumentStore>;

/// Field holding the store-assigned id.
pub const ID_FIELD: &str = "_id";

/// Errors raised by a store backend.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("invalid document in {collection}: {reason}")]
    InvalidDocument { collection: String, reason: String },

    #[error("duplicate _id {id} in {collection}")]
    DuplicateId { collection: String, id: StoreId },

    #[error("decode error: {0}")]
    Decode(#[from] dealer_core::CoreError),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Document selection.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Every document in the collection.
    All,
    /// The document with this store id.
    StoreId(StoreId),
    /// Top-level `field` equals `value` (numbers compare numerically).
    Eq { field: String, value: Value },
    /// Textual form of top-level `field` equals `text`.
    TextEq { field: String, text: String },
}

impl Filter {
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Eq {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn text_eq(field: impl Into<String>, text: impl Into<String>) -> Self {
        Self::TextEq {
            field: field.into(),
            text: text.into(),
        }
    }

    /// Evaluate the filter against a document in process.
    pub fn matches(&self, id: &StoreId, doc: &Document) -> bool {
        match self {
            Self::All => true,
            Self::StoreId(wanted) => wanted == id,
            Self::Eq { field, value } => doc.get(field).is_some_and(|v| json_eq(v, value)),
            Self::TextEq { field, text } => {
                doc.get(field).and_then(text_form).as_deref() == Some(text.as_str())
            }
        }
    }
}

/// Sort on a top-level field. Documents lacking the field sort last.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sort {
    pub field: String,
    pub descending: bool,
}

impl Sort {
    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            descending: true,
        }
    }

    /// Order two documents by this sort.
    pub fn compare(&self, a: &Document, b: &Document) -> Ordering {
        match (a.get(&self.field), b.get(&self.field)) {
            (None | Some(Value::Null), None | Some(Value::Null)) => Ordering::Equal,
            (None | Some(Value::Null), _) => Ordering::Greater,
            (_, None | Some(Value::Null)) => Ordering::Less,
            (Some(x), Some(y)) => {
                let ord = compare_values(x, y);
                if self.descending {
                    ord.reverse()
                } else {
                    ord
                }
            }
        }
    }
}

/// Collection-oriented document store.
#[async_trait]
pub trait DocumentStore: Send + Sync + std::fmt::Debug {
    /// Documents matching `filter`, in `sort` order or insertion order, at
    /// most `limit` of them.
    async fn find(
        &self,
        collection: &str,
        filter: &Filter,
        sort: Option<&Sort>,
        limit: Option<usize>,
    ) -> Result<Vec<Document>, StoreError>;

    /// First document matching `filter`.
    async fn find_one(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> Result<Option<Document>, StoreError> {
        Ok(self
            .find(collection, filter, None, Some(1))
            .await?
            .into_iter()
            .next())
    }

    /// Insert documents, assigning `_id` where absent. Returns the stored forms.
    async fn insert_many(
        &self,
        collection: &str,
        docs: Vec<Document>,
    ) -> Result<Vec<Document>, StoreError>;

    /// Insert one document. Returns the stored form.
    async fn insert_one(&self, collection: &str, doc: Document) -> Result<Document, StoreError> {
        self.insert_many(collection, vec![doc])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::InvalidDocument {
                collection: collection.to_string(),
                reason: "insert returned no document".to_string(),
            })
    }

    /// Delete documents matching `filter`. Returns the number removed.
    async fn delete_many(&self, collection: &str, filter: &Filter) -> Result<u64, StoreError>;

    /// Round trip to the backend.
    async fn ping(&self) -> Result<(), StoreError>;
}

/// Take the document's `_id`, or generate one, and return it with the
/// document carrying it.
pub(crate) fn assign_store_id(
    collection: &str,
    mut doc: Document,
) -> Result<(StoreId, Document), StoreError> {
    let id = match doc.get(ID_FIELD) {
        None | Some(Value::Null) => StoreId::generate(),
        Some(Value::String(raw)) => {
            StoreId::parse(raw).map_err(|e| StoreError::InvalidDocument {
                collection: collection.to_string(),
                reason: e.to_string(),
            })?
        }
        Some(other) => {
            return Err(StoreError::InvalidDocument {
                collection: collection.to_string(),
                reason: format!("{ID_FIELD} must be a string, got {other}"),
            })
        }
    };
    doc.insert(ID_FIELD.to_string(), Value::String(id.to_hex()));
    Ok((id, doc))
}

/// JSON equality with numbers compared by value (`15` equals `15.0`).
fn json_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_i64(), y.as_i64()) {
            (Some(x), Some(y)) => x == y,
            _ => x.as_f64() == y.as_f64(),
        },
        _ => a == b,
    }
}

/// Scalar rendered as text, the way `->>` renders it in Postgres.
fn text_form(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn type_rank(v: &Value) -> u8 {
    match v {
        Value::Null => 0,
        Value::String(_) => 1,
        Value::Number(_) => 2,
        Value::Bool(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

/// Total order over JSON values, type rank first (matching JSONB ordering).
fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_i64(), y.as_i64()) {
            (Some(x), Some(y)) => x.cmp(&y),
            _ => x
                .as_f64()
                .unwrap_or(f64::NAN)
                .total_cmp(&y.as_f64().unwrap_or(f64::NAN)),
        },
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}
