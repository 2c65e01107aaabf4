use async_trait::async_trait;
use uuid::Uuid;
use crate::types::Record;
use crate::Result;

#[async_trait]
pub trait RecordStore<T: Record>: Send + Sync {
    /// Persist a new record, assigning its identifier
    async fn save(&self, draft: T::Draft) -> Result<T>;

    /// All records in insertion order
    async fn find_all(&self) -> Result<Vec<T>>;

    /// Exact-match lookup; misses are [`crate::Error::NotFound`]
    async fn find_by_id(&self, id: Uuid) -> Result<T>;

    async fn delete(&self, id: Uuid) -> Result<()>;
}
