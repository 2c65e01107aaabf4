pub mod config;
pub mod error;
pub mod models;
pub mod source;
pub mod storage;
pub mod types;

pub use error::{Error, ErrorKind, Result};
pub use models::TextTransformer;
pub use source::SourceFetcher;
pub use storage::RecordStore;
pub use types::{
    clamp_count, Article, NewArticle, NewSourceItem, Record, SourceItem, SourceItemDraft,
    DEFAULT_BATCH_SIZE, MAX_BATCH_SIZE, MIN_BATCH_SIZE,
};
