use std::collections::BTreeMap;
use std::sync::RwLock;

use stockroom_core::Entity;

use super::{RecordStore, RecordStoreError};

/// In-memory record store for tests/dev.
///
/// Records live in an id-ordered map behind a `RwLock`; the write lock is held
/// across the existence check and the insert.
#[derive(Debug)]
pub struct InMemoryRecordStore<V>
where
    V: Entity,
{
    inner: RwLock<BTreeMap<V::Id, V>>,
}

impl<V> InMemoryRecordStore<V>
where
    V: Entity,
{
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(BTreeMap::new()),
        }
    }

    /// Number of stored records.
    pub fn len(&self) -> Result<usize, RecordStoreError> {
        self.inner.read().map(|map| map.len()).map_err(|_| poisoned())
    }

    pub fn is_empty(&self) -> Result<bool, RecordStoreError> {
        Ok(self.len()? == 0)
    }
}

impl<V> Default for InMemoryRecordStore<V>
where
    V: Entity,
{
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned() -> RecordStoreError {
    RecordStoreError::Storage("in-memory store lock poisoned".to_string())
}

#[async_trait::async_trait]
impl<V> RecordStore<V> for InMemoryRecordStore<V>
where
    V: Entity + Clone + Send + Sync + 'static,
{
    async fn insert(&self, record: V) -> Result<(), RecordStoreError> {
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        if map.contains_key(record.id()) {
            return Err(RecordStoreError::duplicate::<V>(record.id()));
        }
        map.insert(record.id().clone(), record);
        Ok(())
    }

    async fn get(&self, id: &V::Id) -> Result<V, RecordStoreError> {
        let map = self.inner.read().map_err(|_| poisoned())?;
        map.get(id)
            .cloned()
            .ok_or_else(|| RecordStoreError::not_found::<V>(id))
    }

    async fn list(&self) -> Result<Vec<V>, RecordStoreError> {
        let map = self.inner.read().map_err(|_| poisoned())?;
        Ok(map.values().cloned().collect())
    }

    async fn update(&self, record: V) -> Result<(), RecordStoreError> {
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        match map.get_mut(record.id()) {
            Some(existing) => {
                *existing = record;
                Ok(())
            }
            None => Err(RecordStoreError::not_found::<V>(record.id())),
        }
    }
}
