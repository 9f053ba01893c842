use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};

use super::query::Query;
use crate::utils::errors::app_error::AppError;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct StringAnnotation {
    pub key: String,
    pub value: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct NumericAnnotation {
    pub key: String,
    pub value: i64,
}

impl StringAnnotation {
    pub fn new(key: &str, value: impl Into<String>) -> Self {
        StringAnnotation {
            key: key.to_string(),
            value: value.into(),
        }
    }
}

impl NumericAnnotation {
    pub fn new(key: &str, value: i64) -> Self {
        NumericAnnotation {
            key: key.to_string(),
            value,
        }
    }
}

/// A document to append to the store.
#[derive(Debug, Clone)]
pub struct EntityCreate {
    pub data: Vec<u8>,
    /// Lifetime in blocks.
    pub btl: u64,
    pub string_annotations: Vec<StringAnnotation>,
    pub numeric_annotations: Vec<NumericAnnotation>,
}

impl EntityCreate {
    /// Content-derived `0x` key; `nonce` separates identical payloads.
    pub fn derive_key(&self, nonce: u64) -> String {
        let mut hasher = Keccak256::new();
        hasher.update(&self.data);
        for annotation in &self.string_annotations {
            hasher.update(annotation.key.as_bytes());
            hasher.update(annotation.value.as_bytes());
        }
        hasher.update(nonce.to_be_bytes());
        format!("0x{}", hex::encode(hasher.finalize()))
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct EntityReceipt {
    pub entity_key: String,
    pub expires_at: DateTime<Utc>,
}

/// A stored entity as returned by queries.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct EntityRecord {
    pub key: String,
    pub data: Vec<u8>,
    pub string_annotations: Vec<StringAnnotation>,
    pub numeric_annotations: Vec<NumericAnnotation>,
}

impl EntityRecord {
    pub fn from_create(key: String, entity: EntityCreate) -> Self {
        EntityRecord {
            key,
            data: entity.data,
            string_annotations: entity.string_annotations,
            numeric_annotations: entity.numeric_annotations,
        }
    }

    pub fn string_annotation(&self, key: &str) -> Option<&str> {
        self.string_annotations
            .iter()
            .find(|a| a.key == key)
            .map(|a| a.value.as_str())
    }

    pub fn numeric_annotation(&self, key: &str) -> Option<i64> {
        self.numeric_annotations
            .iter()
            .find(|a| a.key == key)
            .map(|a| a.value)
    }
}

/// Append-only document store with queryable annotations.
///
/// Entities are never updated; each write creates a new key and every entity
/// disappears once its lifetime runs out. Query results carry no ordering
/// guarantee.
#[async_trait]
pub trait EntityStore: Send + Sync {
    async fn create_entity(&self, entity: EntityCreate) -> Result<EntityReceipt, AppError>;

    async fn query_entities(&self, query: &Query) -> Result<Vec<EntityRecord>, AppError>;
}
