//! Dealership queries.
//!
//! Dealerships are only ever written by the seed loader; everything here
//! is read-only.

use dealer_core::{DealerLookup, DealerNumericId, Dealership, StoreId, DEALERSHIPS};

use crate::store::{Document, Filter, SharedStore, StoreError};

#[derive(Debug, Clone)]
pub struct DealerRepository {
    store: SharedStore,
}

impl DealerRepository {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// Every dealership, in store order.
    pub async fn fetch_all_dealers(&self) -> Result<Vec<Dealership>, StoreError> {
        let docs = self.store.find(DEALERSHIPS, &Filter::All, None, None).await?;
        decode_all(docs)
    }

    /// Dealerships whose `state` equals `state` exactly (case-sensitive).
    pub async fn fetch_dealers_by_state(&self, state: &str) -> Result<Vec<Dealership>, StoreError> {
        let docs = self
            .store
            .find(DEALERSHIPS, &Filter::eq("state", state), None, None)
            .await?;
        decode_all(docs)
    }

    /// Dealership by store document id.
    pub async fn fetch_dealer_by_id(&self, id: StoreId) -> Result<Option<Dealership>, StoreError> {
        let doc = self.store.find_one(DEALERSHIPS, &Filter::StoreId(id)).await?;
        decode_one(doc)
    }

    /// Dealership by application numeric id.
    pub async fn fetch_dealer_by_numeric_id(
        &self,
        id: DealerNumericId,
    ) -> Result<Option<Dealership>, StoreError> {
        let doc = self
            .store
            .find_one(DEALERSHIPS, &Filter::eq("id", id.0))
            .await?;
        decode_one(doc)
    }

    /// Dispatch a tagged lookup.
    pub async fn fetch_dealer(&self, lookup: DealerLookup) -> Result<Option<Dealership>, StoreError> {
        match lookup {
            DealerLookup::ByStoreId(id) => self.fetch_dealer_by_id(id).await,
            DealerLookup::ByNumericId(id) => self.fetch_dealer_by_numeric_id(id).await,
            // Seeded ids are integers, so the store is not consulted.
            DealerLookup::Unmatchable(_) => Ok(None),
        }
    }
}

fn decode_all(docs: Vec<Document>) -> Result<Vec<Dealership>, StoreError> {
    docs.into_iter()
        .map(|doc| Dealership::from_document(doc).map_err(StoreError::from))
        .collect()
}

fn decode_one(doc: Option<Document>) -> Result<Option<Dealership>, StoreError> {
    doc.map(Dealership::from_document)
        .transpose()
        .map_err(StoreError::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{DocumentStore, MemoryStore};
    use serde_json::json;
    use std::sync::Arc;

    async fn seeded() -> (DealerRepository, Vec<Document>) {
        let store = MemoryStore::new();
        let stored = store
            .insert_many(
                DEALERSHIPS,
                vec![
                    json!({"id": 1, "state": "Texas", "city": "El Paso"}),
                    json!({"id": 2, "state": "Kansas", "city": "Topeka"}),
                    json!({"id": 3, "state": "Texas", "city": "Austin"}),
                ]
                .into_iter()
                .map(|v| v.as_object().cloned().unwrap())
                .collect(),
            )
            .await
            .unwrap();
        (DealerRepository::new(Arc::new(store)), stored)
    }

    #[tokio::test]
    async fn all_dealers() {
        let (repo, _) = seeded().await;
        let dealers = repo.fetch_all_dealers().await.unwrap();
        let ids: Vec<i64> = dealers.iter().map(|d| d.id.0).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn by_state_is_exact() {
        let (repo, _) = seeded().await;
        assert_eq!(repo.fetch_dealers_by_state("Texas").await.unwrap().len(), 2);
        assert!(repo.fetch_dealers_by_state("texas").await.unwrap().is_empty());
        assert!(repo.fetch_dealers_by_state("Ohio").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn by_store_id() {
        let (repo, stored) = seeded().await;
        let id = StoreId::parse(stored[1]["_id"].as_str().unwrap()).unwrap();
        let dealer = repo.fetch_dealer_by_id(id).await.unwrap().unwrap();
        assert_eq!(dealer.id, DealerNumericId(2));
        assert!(repo
            .fetch_dealer_by_id(StoreId::generate())
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn by_numeric_id() {
        let (repo, _) = seeded().await;
        let dealer = repo
            .fetch_dealer(DealerLookup::ByNumericId(DealerNumericId(3)))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(dealer.details.get("city"), Some(&json!("Austin")));
        assert!(repo
            .fetch_dealer_by_numeric_id(DealerNumericId(99))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn unmatchable_number_finds_nothing() {
        let (repo, _) = seeded().await;
        for raw in ["1.5", "1e30", "Infinity"] {
            let lookup = DealerLookup::parse(raw).unwrap();
            assert!(repo.fetch_dealer(lookup).await.unwrap().is_none(), "{raw}");
        }
        let lookup = DealerLookup::parse("2.0").unwrap();
        let dealer = repo.fetch_dealer(lookup).await.unwrap().unwrap();
        assert_eq!(dealer.id, DealerNumericId(2));
    }

    #[tokio::test]
    async fn undecodable_document_is_a_store_error() {
        let store = MemoryStore::new();
        store
            .insert_one(DEALERSHIPS, json!({"id": "x"}).as_object().cloned().unwrap())
            .await
            .unwrap();
        let repo = DealerRepository::new(Arc::new(store));
        assert!(matches!(
            repo.fetch_all_dealers().await,
            Err(StoreError::Decode(_))
        ));
    }
}
