use rb_core::{Article, Error, RecordStore, Result, SourceItem};
use std::path::Path;
use std::sync::Arc;

pub mod backends;

pub use backends::*;

/// Handles to the raw and generated record collections.
#[derive(Clone)]
pub struct Stores {
    pub sources: Arc<dyn RecordStore<SourceItem>>,
    pub articles: Arc<dyn RecordStore<Article>>,
}

impl Stores {
    pub fn in_memory() -> Self {
        Self {
            sources: Arc::new(MemoryStore::<SourceItem>::new()),
            articles: Arc::new(MemoryStore::<Article>::new()),
        }
    }

    #[cfg(feature = "sqlite")]
    pub async fn sqlite(path: &Path) -> Result<Self> {
        let storage = Arc::new(SqliteStorage::new_with_path(path).await?);
        Ok(Self {
            sources: storage.clone(),
            articles: storage,
        })
    }
}

/// Opens the backend named `kind` (`memory` or `sqlite`).
pub async fn create_stores(kind: &str, path: &Path) -> Result<Stores> {
    match kind {
        "memory" => Ok(Stores::in_memory()),
        #[cfg(feature = "sqlite")]
        "sqlite" => Stores::sqlite(path).await,
        other => Err(Error::ConfigurationInvalid(format!(
            "Unknown storage backend: {}",
            other
        ))),
    }
}

pub mod prelude {
    pub use super::backends::*;
    pub use super::{create_stores, Stores};
}
