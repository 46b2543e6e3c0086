//! Keyed record storage for products, locations and movements.
//!
//! One collection per entity kind, keyed by the entity's identifier. Records
//! are created, read and updated; nothing is ever deleted.

pub mod in_memory;
pub mod sqlite;

pub use in_memory::InMemoryRecordStore;
pub use sqlite::SqliteRecordStore;

use stockroom_core::Entity;
use thiserror::Error;

/// Keyed store abstraction for one entity kind.
///
/// Each call is a single atomic write or read. `insert` is a check-and-insert:
/// concurrent inserts of the same id leave exactly one winner.
#[async_trait::async_trait]
pub trait RecordStore<V>: Send + Sync
where
    V: Entity + Send + Sync + 'static,
{
    /// Persist a new record. Fails with `Duplicate` if the id is taken.
    async fn insert(&self, record: V) -> Result<(), RecordStoreError>;

    /// Fetch one record by id. Fails with `NotFound` if absent.
    async fn get(&self, id: &V::Id) -> Result<V, RecordStoreError>;

    /// All records of this kind, ordered by id.
    async fn list(&self) -> Result<Vec<V>, RecordStoreError>;

    /// Replace an existing record in place. Fails with `NotFound` if absent.
    async fn update(&self, record: V) -> Result<(), RecordStoreError>;
}

/// Record store error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordStoreError {
    #[error("{kind} '{id}' already exists")]
    Duplicate { kind: &'static str, id: String },

    #[error("{kind} '{id}' not found")]
    NotFound { kind: &'static str, id: String },

    #[error("storage error: {0}")]
    Storage(String),
}

impl RecordStoreError {
    pub fn duplicate<V: Entity>(id: &V::Id) -> Self {
        Self::Duplicate {
            kind: V::KIND,
            id: id.to_string(),
        }
    }

    pub fn not_found<V: Entity>(id: &V::Id) -> Self {
        Self::NotFound {
            kind: V::KIND,
            id: id.to_string(),
        }
    }
}
