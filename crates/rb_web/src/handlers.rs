use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;
use rb_core::{Article, SourceItem, DEFAULT_BATCH_SIZE};
use rb_ingest::{IngestReport, IngestRequest, Stage};
use crate::error::{status_for, ApiError, ErrorBody};
use crate::AppState;

type ApiResult<T> = std::result::Result<T, ApiError>;

fn default_limit() -> i64 {
    DEFAULT_BATCH_SIZE
}

#[derive(Debug, Deserialize)]
pub struct FetchParams {
    pub subreddit: String,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub publish: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FailureBody {
    pub stage: Stage,
    pub index: usize,
    pub external_id: String,
    pub orphaned_source_item: Option<Uuid>,
    pub error: ErrorBody,
}

/// Body of a fetch that stopped part-way through its batch.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestResponse {
    pub community: String,
    pub requested: i64,
    pub effective_count: u32,
    pub fetched: usize,
    pub processed: usize,
    pub article_ids: Vec<Uuid>,
    pub failure: Option<FailureBody>,
}

impl From<IngestReport> for IngestResponse {
    fn from(report: IngestReport) -> Self {
        Self {
            processed: report.processed(),
            community: report.community,
            requested: report.requested,
            effective_count: report.effective_count,
            fetched: report.fetched,
            article_ids: report.article_ids,
            failure: report.failure.map(|f| FailureBody {
                stage: f.stage,
                index: f.index,
                external_id: f.external_id,
                orphaned_source_item: f.orphaned_source_item,
                error: ErrorBody::from(&f.error),
            }),
        }
    }
}

/// Replies with the bare list of new article ids when the whole batch went
/// through, otherwise with the partial report and the failing stage's status.
pub async fn fetch_articles(
    State(state): State<Arc<AppState>>,
    Query(params): Query<FetchParams>,
) -> ApiResult<Response> {
    tracing::info!(
        "Ingestion requested: r/{} limit={} publish={}",
        params.subreddit,
        params.limit,
        params.publish
    );
    let request = IngestRequest::new(params.subreddit)
        .with_count(params.limit)
        .with_publish(params.publish);
    let report = state.pipeline.run(&request).await?;

    let failed_status = report.failure.as_ref().map(|f| status_for(f.error.kind()));
    let response = match failed_status {
        None => Json(report.article_ids).into_response(),
        Some(status) => (status, Json(IngestResponse::from(report))).into_response(),
    };
    Ok(response)
}

pub async fn list_articles(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<Article>>> {
    Ok(Json(state.pipeline.articles().find_all().await?))
}

pub async fn get_article(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Article>> {
    Ok(Json(state.pipeline.articles().find_by_id(id).await?))
}

pub async fn delete_article(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state.pipeline.articles().delete(id).await?;
    tracing::info!("Deleted article {}", id);
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_sources(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<SourceItem>>> {
    Ok(Json(state.pipeline.sources().find_all().await?))
}

pub async fn get_source(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<SourceItem>> {
    Ok(Json(state.pipeline.sources().find_by_id(id).await?))
}

pub async fn list_orphans(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<SourceItem>>> {
    Ok(Json(state.pipeline.find_orphans().await?))
}

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}
