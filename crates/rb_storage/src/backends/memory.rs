use async_trait::async_trait;
use rb_core::{Error, Record, RecordStore, Result};
use tokio::sync::RwLock;
use uuid::Uuid;

/// Volatile store keeping records in insertion order.
pub struct MemoryStore<T: Record> {
    records: RwLock<Vec<T>>,
}

impl<T: Record> MemoryStore<T> {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(Vec::new()),
        }
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

impl<T: Record> Default for MemoryStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T: Record> RecordStore<T> for MemoryStore<T> {
    async fn save(&self, draft: T::Draft) -> Result<T> {
        let record = T::from_draft(Uuid::new_v4(), draft);
        self.records.write().await.push(record.clone());
        Ok(record)
    }

    async fn find_all(&self) -> Result<Vec<T>> {
        Ok(self.records.read().await.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<T> {
        self.records
            .read()
            .await
            .iter()
            .find(|r| r.id() == id)
            .cloned()
            .ok_or_else(|| Error::not_found(T::KIND, id))
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|r| r.id() != id);
        if records.len() == before {
            return Err(Error::not_found(T::KIND, id));
        }
        Ok(())
    }
}
