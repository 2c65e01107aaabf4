use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const MIN_BATCH_SIZE: u32 = 1;
pub const MAX_BATCH_SIZE: u32 = 50;
pub const DEFAULT_BATCH_SIZE: i64 = 5;

/// Clamps a caller-supplied item count into `[MIN_BATCH_SIZE, MAX_BATCH_SIZE]`.
pub fn clamp_count(count: i64) -> u32 {
    count.clamp(MIN_BATCH_SIZE as i64, MAX_BATCH_SIZE as i64) as u32
}

/// One item as returned by a source platform, before persistence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceItemDraft {
    pub external_id: String,
    pub title: String,
    pub body: String,
}

impl SourceItemDraft {
    /// Builds a draft, normalizing absent self-text to an empty body.
    pub fn new(external_id: impl Into<String>, title: impl Into<String>, body: Option<String>) -> Self {
        Self {
            external_id: external_id.into(),
            title: title.into(),
            body: body.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSourceItem {
    pub external_id: String,
    pub community: String,
    pub title: String,
    pub body: String,
    pub fetched_at: DateTime<Utc>,
}

/// Raw record of a fetched item. Immutable once written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceItem {
    pub id: Uuid,
    pub external_id: String,
    pub community: String,
    pub title: String,
    pub body: String,
    pub fetched_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewArticle {
    pub source_item_id: Uuid,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Generated long-form article derived from exactly one [`SourceItem`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub id: Uuid,
    pub source_item_id: Uuid,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// A persisted entity whose identifier is assigned by the store.
pub trait Record: Clone + Send + Sync + 'static {
    type Draft: Send + Sync + 'static;

    /// Human-readable entity name used in error messages.
    const KIND: &'static str;

    fn id(&self) -> Uuid;
    fn from_draft(id: Uuid, draft: Self::Draft) -> Self;
}

impl Record for SourceItem {
    type Draft = NewSourceItem;
    const KIND: &'static str = "source item";

    fn id(&self) -> Uuid {
        self.id
    }

    fn from_draft(id: Uuid, draft: NewSourceItem) -> Self {
        Self {
            id,
            external_id: draft.external_id,
            community: draft.community,
            title: draft.title,
            body: draft.body,
            fetched_at: draft.fetched_at,
        }
    }
}

impl Record for Article {
    type Draft = NewArticle;
    const KIND: &'static str = "article";

    fn id(&self) -> Uuid {
        self.id
    }

    fn from_draft(id: Uuid, draft: NewArticle) -> Self {
        Self {
            id,
            source_item_id: draft.source_item_id,
            title: draft.title,
            content: draft.content,
            created_at: draft.created_at,
        }
    }
}
