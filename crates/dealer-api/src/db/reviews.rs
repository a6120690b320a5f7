//! Review queries and insertion.
//!
//! Review ids belong to the service, not the store: a new review gets one
//! more than the current maximum. The read-max-then-insert sequence runs
//! under a single writer lock shared by all clones of the repository, so two
//! concurrent inserts cannot be handed the same id.

use std::sync::Arc;

use dealer_core::{NewReview, Review, ReviewId, REVIEWS};
use tokio::sync::Mutex;

use crate::store::{Document, Filter, SharedStore, Sort, StoreError};

#[derive(Debug, Clone)]
pub struct ReviewRepository {
    store: SharedStore,
    writer: Arc<Mutex<()>>,
}

impl ReviewRepository {
    pub fn new(store: SharedStore) -> Self {
        Self {
            store,
            writer: Arc::new(Mutex::new(())),
        }
    }

    /// Every review, in store order.
    pub async fn fetch_reviews(&self) -> Result<Vec<Review>, StoreError> {
        let docs = self.store.find(REVIEWS, &Filter::All, None, None).await?;
        decode_all(docs)
    }

    /// Reviews whose `dealership` reads as `dealer` (string comparison).
    pub async fn fetch_reviews_for_dealer(&self, dealer: &str) -> Result<Vec<Review>, StoreError> {
        let docs = self
            .store
            .find(REVIEWS, &Filter::text_eq("dealership", dealer), None, None)
            .await?;
        decode_all(docs)
    }

    /// Every review, highest `id` first.
    pub async fn fetch_reviews_by_id_desc(&self) -> Result<Vec<Review>, StoreError> {
        let docs = self
            .store
            .find(REVIEWS, &Filter::All, Some(&Sort::desc("id")), None)
            .await?;
        decode_all(docs)
    }

    /// Insert a review under the next free id and return the stored review.
    ///
    /// An empty collection starts at [`ReviewId::FIRST`].
    pub async fn insert_review(&self, review: NewReview) -> Result<Review, StoreError> {
        let _guard = self.writer.lock().await;

        let id = self.next_review_id().await?;
        let stored = self
            .store
            .insert_one(REVIEWS, review.into_document(id)?)
            .await?;

        Ok(Review::from_document(stored)?)
    }

    /// One past the highest stored id; only the top document is read.
    async fn next_review_id(&self) -> Result<ReviewId, StoreError> {
        let top = self
            .store
            .find(REVIEWS, &Filter::All, Some(&Sort::desc("id")), Some(1))
            .await?;
        match top.into_iter().next() {
            Some(doc) => Ok(Review::from_document(doc)?.id.next()?),
            None => Ok(ReviewId::FIRST),
        }
    }
}

fn decode_all(docs: Vec<Document>) -> Result<Vec<Review>, StoreError> {
    docs.into_iter()
        .map(|doc| Review::from_document(doc).map_err(StoreError::from))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{DocumentStore, MemoryStore};
    use dealer_core::DealerRef;
    use serde_json::json;
    use std::collections::HashSet;

    fn review_doc(id: i64, dealership: serde_json::Value) -> Document {
        json!({
            "id": id,
            "name": format!("Reviewer {id}"),
            "dealership": dealership,
            "review": "Fine",
            "purchase": false
        })
        .as_object()
        .cloned()
        .unwrap()
    }

    fn new_review(dealership: i64) -> NewReview {
        NewReview {
            name: "Ada".to_string(),
            dealership: DealerRef::Numeric(dealership),
            review: "Quick and friendly".to_string(),
            purchase: true,
            purchase_date: Some("01/02/2023".to_string()),
            car_make: Some("Kia".to_string()),
            car_model: Some("Soul".to_string()),
            car_year: Some(2021),
        }
    }

    async fn repo_with(docs: Vec<Document>) -> ReviewRepository {
        let store = MemoryStore::new();
        if !docs.is_empty() {
            store.insert_many(REVIEWS, docs).await.unwrap();
        }
        ReviewRepository::new(Arc::new(store))
    }

    #[tokio::test]
    async fn insert_takes_max_plus_one() {
        let repo = repo_with(vec![
            review_doc(4, json!(15)),
            review_doc(11, json!(15)),
            review_doc(7, json!(2)),
        ])
        .await;

        let stored = repo.insert_review(new_review(15)).await.unwrap();
        assert_eq!(stored.id, ReviewId(12));
        assert_eq!(stored.content.car_year, Some(2021));

        let all = repo.fetch_reviews().await.unwrap();
        assert_eq!(all.len(), 4);
        assert!(all.iter().any(|r| r.store_id == stored.store_id));
    }

    #[tokio::test]
    async fn insert_into_empty_collection_starts_at_one() {
        let repo = repo_with(Vec::new()).await;
        let stored = repo.insert_review(new_review(1)).await.unwrap();
        assert_eq!(stored.id, ReviewId::FIRST);
    }

    #[tokio::test]
    async fn concurrent_inserts_get_distinct_ids() {
        let repo = repo_with(vec![review_doc(1, json!(1))]).await;

        let handles: Vec<_> = (0..20)
            .map(|_| {
                let repo = repo.clone();
                tokio::spawn(async move { repo.insert_review(new_review(1)).await.unwrap().id })
            })
            .collect();

        let mut ids = HashSet::new();
        for handle in handles {
            ids.insert(handle.await.unwrap());
        }
        let expected: HashSet<_> = (2..=21).map(ReviewId).collect();
        assert_eq!(ids, expected);
    }

    #[tokio::test]
    async fn dealer_filter_compares_text() {
        let repo = repo_with(vec![
            review_doc(1, json!(15)),
            review_doc(2, json!("15")),
            review_doc(3, json!(150)),
        ])
        .await;

        let reviews = repo.fetch_reviews_for_dealer("15").await.unwrap();
        let ids: Vec<i64> = reviews.iter().map(|r| r.id.0).collect();
        assert_eq!(ids, vec![1, 2]);
        assert!(repo.fetch_reviews_for_dealer("abc").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn by_id_desc() {
        let repo = repo_with(vec![
            review_doc(2, json!(1)),
            review_doc(9, json!(1)),
            review_doc(5, json!(1)),
        ])
        .await;
        let ids: Vec<i64> = repo
            .fetch_reviews_by_id_desc()
            .await
            .unwrap()
            .iter()
            .map(|r| r.id.0)
            .collect();
        assert_eq!(ids, vec![9, 5, 2]);
    }
}
