//! PostgreSQL document store.
//!
//! Every collection lives in the single `documents` table. The `_id` is kept
//! in the `store_id` column and stripped from the JSONB `body`; `seq` gives
//! insertion order.

use std::time::Duration;

use async_trait::async_trait;
use dealer_core::StoreId;
use serde_json::Value;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::types::Json;
use sqlx::{Postgres, QueryBuilder};

use super::{assign_store_id, Document, DocumentStore, Filter, Sort, StoreError, ID_FIELD};

/// Rows per INSERT statement; three bind parameters each keeps well under
/// the 65535 parameter limit.
const INSERT_CHUNK: usize = 1000;

/// Document store backed by a Postgres pool.
#[derive(Debug, Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    /// Connect and apply the embedded migrations.
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(20)
            .min_connections(2)
            .acquire_timeout(Duration::from_secs(5))
            .connect(url)
            .await?;

        tracing::info!("Connected to PostgreSQL");

        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("Database migrations applied");

        Ok(Self { pool })
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn find(
        &self,
        collection: &str,
        filter: &Filter,
        sort: Option<&Sort>,
        limit: Option<usize>,
    ) -> Result<Vec<Document>, StoreError> {
        let rows = select_query(collection, filter, sort, limit)
            .build_query_as::<DocumentRow>()
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter()
            .map(|row| row.into_document(collection))
            .collect()
    }

    async fn insert_many(
        &self,
        collection: &str,
        docs: Vec<Document>,
    ) -> Result<Vec<Document>, StoreError> {
        let prepared = docs
            .into_iter()
            .map(|doc| assign_store_id(collection, doc))
            .collect::<Result<Vec<_>, _>>()?;

        // All chunks commit together or not at all.
        let mut tx = self.pool.begin().await?;
        for chunk in prepared.chunks(INSERT_CHUNK) {
            insert_query(collection, chunk).build().execute(&mut *tx).await?;
        }
        tx.commit().await?;

        Ok(prepared.into_iter().map(|(_, doc)| doc).collect())
    }

    async fn delete_many(&self, collection: &str, filter: &Filter) -> Result<u64, StoreError> {
        let result = delete_query(collection, filter)
            .build()
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

fn push_filter(qb: &mut QueryBuilder<'static, Postgres>, filter: &Filter) {
    match filter {
        Filter::All => {}
        Filter::StoreId(id) => {
            qb.push(" AND store_id = ").push_bind(id.to_hex());
        }
        Filter::Eq { field, value } => {
            qb.push(" AND body -> ")
                .push_bind(field.clone())
                .push("::text = ")
                .push_bind(Json(value.clone()))
                .push("::jsonb");
        }
        Filter::TextEq { field, text } => {
            qb.push(" AND body ->> ")
                .push_bind(field.clone())
                .push("::text = ")
                .push_bind(text.clone());
        }
    }
}

fn select_query(
    collection: &str,
    filter: &Filter,
    sort: Option<&Sort>,
    limit: Option<usize>,
) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new("SELECT store_id, body FROM documents WHERE collection = ");
    qb.push_bind(collection.to_string());
    push_filter(&mut qb, filter);
    match sort {
        Some(sort) => {
            qb.push(" ORDER BY body -> ")
                .push_bind(sort.field.clone())
                .push(if sort.descending {
                    "::text DESC NULLS LAST, seq"
                } else {
                    "::text ASC NULLS LAST, seq"
                });
        }
        None => {
            qb.push(" ORDER BY seq");
        }
    }
    if let Some(limit) = limit {
        qb.push(" LIMIT ")
            .push_bind(i64::try_from(limit).unwrap_or(i64::MAX));
    }
    qb
}

fn insert_query(collection: &str, rows: &[(StoreId, Document)]) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new("INSERT INTO documents (collection, store_id, body) ");
    qb.push_values(rows, |mut b, (id, doc)| {
        let mut body = doc.clone();
        body.remove(ID_FIELD);
        b.push_bind(collection.to_string())
            .push_bind(id.to_hex())
            .push_bind(Json(Value::Object(body)));
    });
    qb
}

fn delete_query(collection: &str, filter: &Filter) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new("DELETE FROM documents WHERE collection = ");
    qb.push_bind(collection.to_string());
    push_filter(&mut qb, filter);
    qb
}

/// Internal row type for SQLx mapping.
#[derive(sqlx::FromRow)]
struct DocumentRow {
    store_id: String,
    body: Json<Value>,
}

impl DocumentRow {
    fn into_document(self, collection: &str) -> Result<Document, StoreError> {
        match self.body.0 {
            Value::Object(mut doc) => {
                doc.insert(ID_FIELD.to_string(), Value::String(self.store_id));
                Ok(doc)
            }
            other => Err(StoreError::InvalidDocument {
                collection: collection.to_string(),
                reason: format!("stored body is not an object: {other}"),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn select_all_in_insertion_order() {
        let qb = select_query("dealerships", &Filter::All, None, None);
        assert_eq!(
            qb.sql(),
            "SELECT store_id, body FROM documents WHERE collection = $1 ORDER BY seq"
        );
    }

    #[test]
    fn select_with_eq_filter() {
        let qb = select_query("dealerships", &Filter::eq("state", "Texas"), None, None);
        assert_eq!(
            qb.sql(),
            "SELECT store_id, body FROM documents WHERE collection = $1 \
             AND body -> $2::text = $3::jsonb ORDER BY seq"
        );
    }

    #[test]
    fn select_with_text_filter_and_sort() {
        let qb = select_query(
            "reviews",
            &Filter::text_eq("dealership", "15"),
            Some(&Sort::desc("id")),
            None,
        );
        assert_eq!(
            qb.sql(),
            "SELECT store_id, body FROM documents WHERE collection = $1 \
             AND body ->> $2::text = $3 ORDER BY body -> $4::text DESC NULLS LAST, seq"
        );
    }

    #[test]
    fn select_with_limit() {
        let qb = select_query("reviews", &Filter::All, Some(&Sort::desc("id")), Some(1));
        assert_eq!(
            qb.sql(),
            "SELECT store_id, body FROM documents WHERE collection = $1 \
             ORDER BY body -> $2::text DESC NULLS LAST, seq LIMIT $3"
        );
    }

    #[tokio::test]
    #[ignore] // Run with: DATABASE_URL=... cargo test -p dealer-api failed_chunk -- --ignored
    async fn failed_chunk_rolls_back_earlier_chunks() {
        let Ok(url) = std::env::var("DATABASE_URL") else {
            return;
        };
        let store = PgDocumentStore::connect(&url).await.unwrap();
        let collection = format!("rollback-{}", StoreId::generate());
        let repeated = StoreId::generate().to_hex();

        // The clash sits in the second chunk, after the first has been written.
        let mut docs: Vec<Document> = (0..INSERT_CHUNK as i64)
            .map(|i| json!({"id": i}).as_object().cloned().unwrap())
            .collect();
        docs[0].insert(ID_FIELD.to_string(), json!(repeated));
        docs.push(json!({"_id": repeated, "id": -1}).as_object().cloned().unwrap());

        assert!(store.insert_many(&collection, docs).await.is_err());
        assert!(store
            .find(&collection, &Filter::All, None, None)
            .await
            .unwrap()
            .is_empty());
    }

    #[test]
    fn select_by_store_id() {
        let qb = select_query("dealerships", &Filter::StoreId(StoreId::generate()), None, None);
        assert!(qb.sql().contains("AND store_id = $2"));
    }

    #[test]
    fn insert_binds_three_per_row() {
        let rows = vec![
            (StoreId::generate(), json!({"id": 1}).as_object().cloned().unwrap()),
            (StoreId::generate(), json!({"id": 2}).as_object().cloned().unwrap()),
        ];
        let qb = insert_query("reviews", &rows);
        assert_eq!(
            qb.sql(),
            "INSERT INTO documents (collection, store_id, body) VALUES ($1, $2, $3), ($4, $5, $6)"
        );
    }

    #[test]
    fn delete_all_in_collection() {
        let qb = delete_query("reviews", &Filter::All);
        assert_eq!(qb.sql(), "DELETE FROM documents WHERE collection = $1");
    }

    #[test]
    fn row_restores_store_id() {
        let row = DocumentRow {
            store_id: "65a1f0c2b3d4e5f601234567".to_string(),
            body: Json(json!({"id": 4})),
        };
        let doc = row.into_document("reviews").unwrap();
        assert_eq!(doc.get(ID_FIELD), Some(&json!("65a1f0c2b3d4e5f601234567")));

        let bad = DocumentRow {
            store_id: "65a1f0c2b3d4e5f601234567".to_string(),
            body: Json(json!([1, 2])),
        };
        assert!(bad.into_document("reviews").is_err());
    }
}
