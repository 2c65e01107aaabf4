//! Fetch → transform → persist orchestration for one ingestion request.
//!
//! A batch is processed strictly in order, one item at a time. Every write
//! commits on its own: when an item fails, items already processed stay in
//! storage and their article ids are still reported.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;
use rb_core::{
    clamp_count, Article, Error, NewArticle, NewSourceItem, RecordStore, Result, SourceFetcher,
    SourceItem, SourceItemDraft, TextTransformer, DEFAULT_BATCH_SIZE,
};
use crate::logging::Logger;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestRequest {
    pub community: String,
    pub count: i64,
    /// Accepted and logged; no publishing side effect exists yet.
    pub publish: bool,
}

impl IngestRequest {
    pub fn new(community: impl Into<String>) -> Self {
        Self {
            community: community.into(),
            count: DEFAULT_BATCH_SIZE,
            publish: false,
        }
    }

    pub fn with_count(mut self, count: i64) -> Self {
        self.count = count;
        self
    }

    pub fn with_publish(mut self, publish: bool) -> Self {
        self.publish = publish;
        self
    }
}

/// Per-item step at which a batch stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    PersistSource,
    Transform,
    PersistArticle,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::PersistSource => "persist source item",
            Stage::Transform => "transform",
            Stage::PersistArticle => "persist article",
        };
        f.write_str(name)
    }
}

#[derive(Debug)]
pub struct BatchFailure {
    pub stage: Stage,
    /// Zero-based position of the failing item in the fetched batch
    pub index: usize,
    pub external_id: String,
    /// Source item written before the failure, left without an article
    pub orphaned_source_item: Option<Uuid>,
    pub error: Error,
}

#[derive(Debug)]
pub struct IngestReport {
    pub community: String,
    pub requested: i64,
    pub effective_count: u32,
    pub fetched: usize,
    /// Ids of the articles created by this run, in batch order
    pub article_ids: Vec<Uuid>,
    pub failure: Option<BatchFailure>,
}

impl IngestReport {
    pub fn processed(&self) -> usize {
        self.article_ids.len()
    }

    pub fn is_complete(&self) -> bool {
        self.failure.is_none()
    }

    /// All-or-nothing view: the ids when every item succeeded, otherwise the
    /// error that stopped the batch.
    pub fn into_result(self) -> Result<Vec<Uuid>> {
        match self.failure {
            None => Ok(self.article_ids),
            Some(failure) => Err(failure.error),
        }
    }
}

fn as_source_unavailable(error: Error) -> Error {
    match error {
        Error::SourceUnavailable(_) => error,
        other => Error::SourceUnavailable(other.to_string()),
    }
}

pub struct IngestionPipeline {
    fetcher: Arc<dyn SourceFetcher>,
    transformer: Arc<dyn TextTransformer>,
    sources: Arc<dyn RecordStore<SourceItem>>,
    articles: Arc<dyn RecordStore<Article>>,
}

impl IngestionPipeline {
    pub fn new(
        fetcher: Arc<dyn SourceFetcher>,
        transformer: Arc<dyn TextTransformer>,
        sources: Arc<dyn RecordStore<SourceItem>>,
        articles: Arc<dyn RecordStore<Article>>,
    ) -> Self {
        Self {
            fetcher,
            transformer,
            sources,
            articles,
        }
    }

    pub fn sources(&self) -> &Arc<dyn RecordStore<SourceItem>> {
        &self.sources
    }

    pub fn articles(&self) -> &Arc<dyn RecordStore<Article>> {
        &self.articles
    }

    /// Runs one ingestion request to completion.
    ///
    /// Fails only when the community name is rejected or the upfront fetch
    /// fails, in which case nothing has been written. Stored items and the
    /// report carry the fetcher's canonical community name. Per-item failures end the batch and are carried in the report.
    pub async fn run(&self, request: &IngestRequest) -> Result<IngestReport> {
        let community = self.fetcher
            .canonical_community(&request.community)
            .map_err(as_source_unavailable)?;
        let logger = Logger::new().with_prefix(format!("[r/{}]", community));
        let effective_count = clamp_count(request.count);
        if effective_count as i64 != request.count {
            logger.debug(&format!("Clamped count {} to {}", request.count, effective_count));
        }
        if request.publish {
            logger.info("Publish requested; articles are stored only");
        }

        logger.info(&format!(
            "🦗 Fetching {} posts from {}",
            effective_count,
            self.fetcher.platform()
        ));
        let mut drafts = self.fetcher
            .fetch(&community, effective_count)
            .await
            .map_err(as_source_unavailable)?;
        if drafts.len() > effective_count as usize {
            logger.warn(&format!(
                "Fetcher returned {} posts for a batch of {}, ignoring the rest",
                drafts.len(),
                effective_count
            ));
            drafts.truncate(effective_count as usize);
        }

        let mut report = IngestReport {
            community: community.clone(),
            requested: request.count,
            effective_count,
            fetched: drafts.len(),
            article_ids: Vec::with_capacity(drafts.len()),
            failure: None,
        };

        let total = drafts.len();
        for (index, draft) in drafts.into_iter().enumerate() {
            let item_logger = logger.clone().with_prefix(format!("[{}/{}]", index + 1, total));
            match self.process_item(&community, index, draft, &item_logger).await {
                Ok(article) => report.article_ids.push(article.id),
                Err(failure) => {
                    item_logger.error(&format!("❌ {} failed: {}", failure.stage, failure.error));
                    report.failure = Some(failure);
                    break;
                }
            }
        }

        logger.info(&format!(
            "✅ Created {} of {} articles",
            report.processed(),
            report.fetched
        ));
        Ok(report)
    }

    async fn process_item(
        &self,
        community: &str,
        index: usize,
        draft: SourceItemDraft,
        logger: &Logger,
    ) -> std::result::Result<Article, BatchFailure> {
        let fail = |stage: Stage, orphaned: Option<Uuid>, error: Error| BatchFailure {
            stage,
            index,
            external_id: draft.external_id.clone(),
            orphaned_source_item: orphaned,
            error,
        };

        let item = self.sources
            .save(NewSourceItem {
                external_id: draft.external_id.clone(),
                community: community.to_string(),
                title: draft.title.clone(),
                body: draft.body.clone(),
                fetched_at: Utc::now(),
            })
            .await
            .map_err(|e| fail(Stage::PersistSource, None, e))?;
        logger.debug(&format!("💾 Stored source item {} ({})", item.id, item.external_id));

        logger.info(&format!("🤖 Generating article for: {}", item.title));
        let content = self.transformer
            .transform(&item.title, &item.body)
            .await
            .map_err(|e| fail(Stage::Transform, Some(item.id), e))?;

        let article = self.articles
            .save(NewArticle {
                source_item_id: item.id,
                title: item.title.clone(),
                content,
                created_at: Utc::now(),
            })
            .await
            .map_err(|e| fail(Stage::PersistArticle, Some(item.id), e))?;
        logger.info(&format!("✨ Stored article {}", article.id));

        Ok(article)
    }

    /// Source items that no stored article references.
    pub async fn find_orphans(&self) -> Result<Vec<SourceItem>> {
        let referenced: HashSet<Uuid> = self.articles
            .find_all()
            .await?
            .into_iter()
            .map(|a| a.source_item_id)
            .collect();
        Ok(self.sources
            .find_all()
            .await?
            .into_iter()
            .filter(|item| !referenced.contains(&item.id))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_defaults() {
        let request = IngestRequest::new("technology");
        assert_eq!(request.count, 5);
        assert!(!request.publish);

        let request = request.with_count(12).with_publish(true);
        assert_eq!(request.count, 12);
        assert!(request.publish);
    }

    #[test]
    fn test_into_result() {
        let ids = vec![Uuid::new_v4()];
        let report = IngestReport {
            community: "rust".to_string(),
            requested: 1,
            effective_count: 1,
            fetched: 1,
            article_ids: ids.clone(),
            failure: None,
        };
        assert!(report.is_complete());
        assert_eq!(report.into_result().unwrap(), ids);

        let report = IngestReport {
            community: "rust".to_string(),
            requested: 2,
            effective_count: 2,
            fetched: 2,
            article_ids: ids,
            failure: Some(BatchFailure {
                stage: Stage::Transform,
                index: 1,
                external_id: "b".to_string(),
                orphaned_source_item: Some(Uuid::new_v4()),
                error: Error::TransformationFailed("boom".to_string()),
            }),
        };
        assert_eq!(report.processed(), 1);
        assert!(matches!(report.into_result(), Err(Error::TransformationFailed(_))));
    }

    #[test]
    fn test_stage_display() {
        assert_eq!(Stage::Transform.to_string(), "transform");
        assert_eq!(serde_json::to_string(&Stage::PersistArticle).unwrap(), "\"persist_article\"");
    }
}
