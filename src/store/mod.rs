pub mod memory;

pub use memory::MemoryStore;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Errors from [`DataStore`] implementations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record not found: {0}")]
    NotFound(String),

    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("invalid record: {0}")]
    InvalidRecord(&'static str),

    #[error("conflicting records: {0}")]
    Conflict(String),
}

/// Ordered field-equality filter. An empty filter matches every record.
///
/// Repeating a field overwrites its previous value in place rather than
/// appending a second condition.
#[derive(Debug, Clone, Default)]
pub struct Filter {
    fields: Vec<(String, Value)>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        let field = field.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(name, _)| *name == field) {
            Some(entry) => entry.1 = value,
            None => self.fields.push((field, value)),
        }
        self
    }

    pub fn fields(&self) -> &[(String, Value)] {
        &self.fields
    }

    /// True when every filtered field is present on `record` with an equal
    /// value.
    pub fn matches(&self, record: &Value) -> bool {
        self.fields
            .iter()
            .all(|(field, value)| record.get(field) == Some(value))
    }
}

/// Persistence seam consumed by the resource scaffolding.
///
/// Records are JSON objects carrying a string `id` field. Implementations
/// own storage and lookup; nothing above this trait assembles queries.
#[async_trait]
pub trait DataStore: Send + Sync {
    /// All records matching `filter`, unordered.
    async fn query(&self, filter: &Filter) -> Result<Vec<Value>, StoreError>;

    /// Stores a new record, assigning an `id` when the record has none.
    /// Returns the record as stored.
    async fn insert(&self, record: Value) -> Result<Value, StoreError>;

    /// Replaces the record whose `id` matches the one in `record`.
    async fn update(&self, record: Value) -> Result<Value, StoreError>;

    /// Removes the record with the given id.
    async fn delete(&self, id: &str) -> Result<(), StoreError>;
}
