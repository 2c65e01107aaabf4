pub mod cli;
pub mod logging;
pub mod pipeline;
pub mod sources;

pub use cli::{handle_command, IngestArgs, IngestCommands};
pub use logging::{init_logging, Logger};
pub use pipeline::{BatchFailure, IngestReport, IngestRequest, IngestionPipeline, Stage};
pub use sources::{RedditConfig, RedditFetcher};

pub mod prelude {
    pub use super::pipeline::{IngestRequest, IngestionPipeline};
    pub use rb_core::{Article, Error, Result, SourceFetcher, SourceItem, TextTransformer};
}
