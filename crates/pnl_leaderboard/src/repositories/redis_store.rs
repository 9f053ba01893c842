use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use chrono::Utc;
use redis::{aio::MultiplexedConnection, Client, RedisError};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{
    entity_store::{
        EntityCreate, EntityReceipt, EntityRecord, EntityStore, NumericAnnotation,
        StringAnnotation,
    },
    query::Query,
};
use crate::utils::{errors::app_error::AppError, time::btl_to_duration};

pub struct RedisKeys;

impl RedisKeys {
    pub const ENTITY_PREFIX: &'static str = "entity:";
    pub const ENTITY_INDEX: &'static str = "entities:index";

    pub fn get_entity_key(key: &str) -> String {
        format!("{}{}", Self::ENTITY_PREFIX, key)
    }
}

/// Wire form of an entity inside Redis. The payload is base64 so arbitrary
/// bytes survive the JSON envelope.
#[derive(Serialize, Deserialize)]
struct StoredEntity {
    key: String,
    data: String,
    string_annotations: Vec<StringAnnotation>,
    numeric_annotations: Vec<NumericAnnotation>,
}

impl StoredEntity {
    fn into_record(self) -> Result<EntityRecord, base64::DecodeError> {
        Ok(EntityRecord {
            data: STANDARD.decode(self.data)?,
            key: self.key,
            string_annotations: self.string_annotations,
            numeric_annotations: self.numeric_annotations,
        })
    }
}

struct ScannedEntities {
    records: Vec<EntityRecord>,
    /// Indexed keys whose value already expired.
    expired: Vec<String>,
}

/// Pairs indexed keys with their `MGET` values. Missing values are expired
/// entries; unreadable ones are skipped.
fn partition_entries(keys: Vec<String>, values: Vec<Option<String>>) -> ScannedEntities {
    let mut expired = Vec::new();
    let mut records = Vec::with_capacity(values.len());
    for (key, value) in keys.into_iter().zip(values) {
        let Some(raw) = value else {
            expired.push(key);
            continue;
        };
        match serde_json::from_str::<StoredEntity>(&raw)
            .map_err(|e| e.to_string())
            .and_then(|stored| stored.into_record().map_err(|e| e.to_string()))
        {
            Ok(record) => records.push(record),
            Err(e) => warn!("Skipping unreadable entity {}: {}", key, e),
        }
    }

    ScannedEntities { records, expired }
}

/// Entities live under `entity:<key>` with a Redis TTL matching their
/// lifetime; a set tracks the keys so queries can scan them.
pub struct RedisEntityStore {
    connection: MultiplexedConnection,
    block_time: Duration,
}

impl RedisEntityStore {
    pub async fn new(redis_url: &str, block_time: Duration) -> Result<Self, RedisError> {
        let client = Client::open(redis_url)?;
        let connection = client.get_multiplexed_async_connection().await?;

        Ok(Self {
            connection,
            block_time,
        })
    }

    fn ttl_seconds(&self, btl: u64) -> u64 {
        btl_to_duration(btl, self.block_time).as_secs().max(1)
    }

    async fn load_all(&self) -> Result<Vec<EntityRecord>, AppError> {
        let mut connection = self.connection.clone();
        let keys: Vec<String> = redis::cmd("SMEMBERS")
            .arg(RedisKeys::ENTITY_INDEX)
            .query_async(&mut connection)
            .await?;

        if keys.is_empty() {
            return Ok(vec![]);
        }

        let redis_keys: Vec<String> = keys.iter().map(|k| RedisKeys::get_entity_key(k)).collect();
        let values: Vec<Option<String>> = redis::cmd("MGET")
            .arg(&redis_keys)
            .query_async(&mut connection)
            .await?;

        let ScannedEntities { records, expired } = partition_entries(keys, values);

        if !expired.is_empty() {
            debug!("Pruning {} expired entities from the index", expired.len());
            let _: () = redis::cmd("SREM")
                .arg(RedisKeys::ENTITY_INDEX)
                .arg(expired)
                .query_async(&mut connection)
                .await?;
        }

        Ok(records)
    }
}

#[async_trait]
impl EntityStore for RedisEntityStore {
    async fn create_entity(&self, entity: EntityCreate) -> Result<EntityReceipt, AppError> {
        let nonce = Utc::now().timestamp_nanos_opt().unwrap_or_default() as u64;
        let key = entity.derive_key(nonce);
        let ttl_seconds = self.ttl_seconds(entity.btl);

        let stored = StoredEntity {
            key: key.clone(),
            data: STANDARD.encode(&entity.data),
            string_annotations: entity.string_annotations,
            numeric_annotations: entity.numeric_annotations,
        };
        let serialized = serde_json::to_string(&stored)?;

        let mut pipe = redis::pipe();
        pipe.cmd("SET")
            .arg(RedisKeys::get_entity_key(&key))
            .arg(&serialized)
            .arg("EX")
            .arg(ttl_seconds)
            .ignore();
        pipe.cmd("SADD")
            .arg(RedisKeys::ENTITY_INDEX)
            .arg(&key)
            .ignore();

        let mut connection = self.connection.clone();
        let _: () = pipe.query_async(&mut connection).await?;
        debug!("Stored entity {} for {}s", key, ttl_seconds);

        Ok(EntityReceipt {
            entity_key: key,
            expires_at: Utc::now() + chrono::Duration::seconds(ttl_seconds as i64),
        })
    }

    async fn query_entities(&self, query: &Query) -> Result<Vec<EntityRecord>, AppError> {
        let records = self.load_all().await?;
        Ok(records
            .into_iter()
            .filter(|record| query.matches(record))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stored_entities_round_trip_binary_payloads() {
        let stored = StoredEntity {
            key: "0x01".into(),
            data: STANDARD.encode([0u8, 159, 146, 150]),
            string_annotations: vec![StringAnnotation::new("type", "daily_leaderboard")],
            numeric_annotations: vec![],
        };
        let json = serde_json::to_string(&stored).unwrap();
        let record = serde_json::from_str::<StoredEntity>(&json)
            .unwrap()
            .into_record()
            .unwrap();

        assert_eq!(record.key, "0x01");
        assert_eq!(record.data, vec![0u8, 159, 146, 150]);
        assert_eq!(record.string_annotation("type"), Some("daily_leaderboard"));
    }

    #[test]
    fn entity_keys_are_prefixed() {
        assert_eq!(RedisKeys::get_entity_key("0xab"), "entity:0xab");
    }

    fn stored_json(key: &str, date: &str) -> String {
        serde_json::to_string(&StoredEntity {
            key: key.into(),
            data: STANDARD.encode(b"{}"),
            string_annotations: vec![StringAnnotation::new("date", date)],
            numeric_annotations: vec![NumericAnnotation::new("total_traders", 3)],
        })
        .unwrap()
    }

    #[test]
    fn scan_separates_expired_and_unreadable_entries() {
        let keys = vec!["0xa".to_string(), "0xb".to_string(), "0xc".to_string(), "0xd".to_string()];
        let values = vec![
            Some(stored_json("0xa", "2025-09-07")),
            None,
            Some("not json".to_string()),
            Some(stored_json("0xd", "2025-09-08")),
        ];

        let scanned = partition_entries(keys, values);
        let found: Vec<&str> = scanned.records.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(found, vec!["0xa", "0xd"]);
        assert_eq!(scanned.expired, vec!["0xb".to_string()]);
        assert_eq!(scanned.records[1].numeric_annotation("total_traders"), Some(3));
    }

    /// Runs against a live server when `REDIS_URL` is set, e.g.
    /// `REDIS_URL=redis://127.0.0.1:6379 cargo test redis_store`.
    #[tokio::test]
    async fn live_store_queries_and_prunes() {
        let Ok(redis_url) = std::env::var("REDIS_URL") else {
            return;
        };
        let store = RedisEntityStore::new(&redis_url, Duration::from_secs(1))
            .await
            .unwrap();
        let marker = format!("redis-test-{}", Utc::now().timestamp_nanos_opt().unwrap_or_default());
        let entity = |btl: u64, traders: i64| EntityCreate {
            data: b"{}".to_vec(),
            btl,
            string_annotations: vec![StringAnnotation::new("type", marker.as_str())],
            numeric_annotations: vec![NumericAnnotation::new("total_traders", traders)],
        };

        let short = store.create_entity(entity(1, 5)).await.unwrap();
        let long = store.create_entity(entity(60, 50)).await.unwrap();

        let all = Query::eq("type", marker.as_str());
        assert_eq!(store.query_entities(&all).await.unwrap().len(), 2);
        let big = Query::eq("type", marker.as_str()).and(Query::parse("total_traders >= 50").unwrap());
        let found = store.query_entities(&big).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].key, long.entity_key);

        tokio::time::sleep(Duration::from_millis(2100)).await;
        let remaining = store.query_entities(&all).await.unwrap();
        assert_eq!(remaining.len(), 1);

        let mut connection = store.connection.clone();
        let indexed: bool = redis::cmd("SISMEMBER")
            .arg(RedisKeys::ENTITY_INDEX)
            .arg(&short.entity_key)
            .query_async(&mut connection)
            .await
            .unwrap();
        assert!(!indexed);
    }
}
