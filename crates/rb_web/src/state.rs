use std::sync::Arc;
use rb_ingest::IngestionPipeline;

pub struct AppState {
    pub pipeline: Arc<IngestionPipeline>,
}
