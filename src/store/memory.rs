use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{DataStore, Filter, StoreError};

/// In-memory record store: JSON objects keyed by their string `id`.
///
/// Backs the demo binary and the test suite. Reads take a shared lock;
/// writers queue behind it.
#[derive(Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn record_id(record: &Value) -> Option<String> {
    record.get("id").and_then(Value::as_str).map(str::to_owned)
}

#[async_trait]
impl DataStore for MemoryStore {
    async fn query(&self, filter: &Filter) -> Result<Vec<Value>, StoreError> {
        let records = self.records.read().await;
        let mut rows: Vec<Value> = records
            .values()
            .filter(|record| filter.matches(record))
            .cloned()
            .collect();
        // HashMap iteration order is arbitrary; keep listings stable
        rows.sort_by_key(|record| record_id(record).unwrap_or_default());
        Ok(rows)
    }

    async fn insert(&self, mut record: Value) -> Result<Value, StoreError> {
        let map = record
            .as_object_mut()
            .ok_or(StoreError::InvalidRecord("record must be a JSON object"))?;

        let id = match map.get("id").and_then(Value::as_str) {
            Some(id) => id.to_owned(),
            None => {
                let id = Uuid::new_v4().to_string();
                map.insert("id".to_string(), Value::String(id.clone()));
                id
            }
        };

        let mut records = self.records.write().await;
        if records.contains_key(&id) {
            return Err(StoreError::Conflict(id));
        }
        records.insert(id, record.clone());
        Ok(record)
    }

    async fn update(&self, record: Value) -> Result<Value, StoreError> {
        if !record.is_object() {
            return Err(StoreError::InvalidRecord("record must be a JSON object"));
        }
        let id = record_id(&record).ok_or(StoreError::MissingField("id"))?;

        let mut records = self.records.write().await;
        match records.get_mut(&id) {
            Some(existing) => {
                *existing = record.clone();
                Ok(record)
            }
            None => Err(StoreError::NotFound(id)),
        }
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let mut records = self.records.write().await;
        match records.remove(id) {
            Some(_) => Ok(()),
            None => Err(StoreError::NotFound(id.to_string())),
        }
    }
}
