use std::{
    sync::atomic::{AtomicU64, Ordering},
    time::Duration,
};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::debug;

use super::{
    entity_store::{EntityCreate, EntityReceipt, EntityRecord, EntityStore},
    query::Query,
};
use crate::utils::{errors::app_error::AppError, time::btl_to_duration};

struct StoredEntity {
    record: EntityRecord,
    expires_at: DateTime<Utc>,
}

/// Process-local store used by tests and the `memory` store mode.
pub struct InMemoryEntityStore {
    entities: RwLock<Vec<StoredEntity>>,
    block_time: Duration,
    nonce: AtomicU64,
}

impl InMemoryEntityStore {
    pub fn new(block_time: Duration) -> Self {
        Self {
            entities: RwLock::new(Vec::new()),
            block_time,
            nonce: AtomicU64::new(0),
        }
    }

    /// Inserts a raw record as-is, bypassing key derivation. Useful for
    /// seeding documents written by other producers.
    pub async fn insert_record(&self, record: EntityRecord, expires_at: DateTime<Utc>) {
        self.entities
            .write()
            .await
            .push(StoredEntity { record, expires_at });
    }

    pub async fn len(&self) -> usize {
        let now = Utc::now();
        self.entities
            .read()
            .await
            .iter()
            .filter(|e| e.expires_at > now)
            .count()
    }
}

#[async_trait]
impl EntityStore for InMemoryEntityStore {
    async fn create_entity(&self, entity: EntityCreate) -> Result<EntityReceipt, AppError> {
        let nonce = self.nonce.fetch_add(1, Ordering::Relaxed);
        let key = entity.derive_key(nonce);
        let lifetime = btl_to_duration(entity.btl, self.block_time);
        let expires_at = Utc::now()
            + chrono::Duration::from_std(lifetime).map_err(|_| AppError::InternalServerError())?;

        self.insert_record(EntityRecord::from_create(key.clone(), entity), expires_at)
            .await;
        debug!("Stored entity {} until {}", key, expires_at);

        Ok(EntityReceipt {
            entity_key: key,
            expires_at,
        })
    }

    async fn query_entities(&self, query: &Query) -> Result<Vec<EntityRecord>, AppError> {
        let now = Utc::now();
        let mut entities = self.entities.write().await;
        entities.retain(|e| e.expires_at > now);

        Ok(entities
            .iter()
            .filter(|e| query.matches(&e.record))
            .map(|e| e.record.clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::entity_store::{NumericAnnotation, StringAnnotation};

    fn entity(date: &str, traders: i64) -> EntityCreate {
        EntityCreate {
            data: format!("{{\"date\":\"{}\"}}", date).into_bytes(),
            btl: 100,
            string_annotations: vec![
                StringAnnotation::new("type", "daily_leaderboard"),
                StringAnnotation::new("date", date),
            ],
            numeric_annotations: vec![NumericAnnotation::new("total_traders", traders)],
        }
    }

    #[tokio::test]
    async fn appends_and_queries() {
        let store = InMemoryEntityStore::new(Duration::from_secs(2));
        let first = store.create_entity(entity("2025-09-07", 5)).await.unwrap();
        let second = store.create_entity(entity("2025-09-07", 50)).await.unwrap();
        store.create_entity(entity("2025-09-08", 50)).await.unwrap();

        assert_ne!(first.entity_key, second.entity_key);
        assert_eq!(store.len().await, 3);

        let query = Query::parse(r#"type = "daily_leaderboard" && date = "2025-09-07""#).unwrap();
        let found = store.query_entities(&query).await.unwrap();
        assert_eq!(found.len(), 2);

        let big = Query::parse("total_traders >= 50").unwrap();
        assert_eq!(store.query_entities(&big).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn expired_entities_disappear() {
        let store = InMemoryEntityStore::new(Duration::from_secs(2));
        let record = EntityRecord::from_create("0xdead".into(), entity("2025-09-07", 5));
        store
            .insert_record(record, Utc::now() - chrono::Duration::seconds(1))
            .await;

        let query = Query::eq("date", "2025-09-07");
        assert!(store.query_entities(&query).await.unwrap().is_empty());
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test]
    async fn receipts_report_lifetime() {
        let store = InMemoryEntityStore::new(Duration::from_secs(5));
        let before = Utc::now();
        let receipt = store.create_entity(entity("2025-09-07", 1)).await.unwrap();
        let lifetime = receipt.expires_at - before;
        assert!(lifetime >= chrono::Duration::seconds(499));
        assert!(lifetime <= chrono::Duration::seconds(501));
    }
}
