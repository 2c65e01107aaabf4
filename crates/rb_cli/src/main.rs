use anyhow::Context;
use clap::Parser;
use rb_core::{SourceFetcher, TextTransformer};
use rb_inference::{create_model, InferenceConfig};
use rb_ingest::{handle_command, init_logging, IngestArgs, IngestCommands, IngestionPipeline, RedditConfig, RedditFetcher};
use rb_web::AppState;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, Level};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[arg(long, default_value = "sqlite", help = "Storage backend: sqlite (default), memory")]
    storage: String,
    #[arg(long, default_value = "blogs.db")]
    database: PathBuf,
    #[arg(long, default_value = "openai", help = "Model used to write articles. Available models: openai (default), dummy")]
    model: String,
    #[arg(long, short)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Serve the HTTP API
    Serve {
        #[arg(long, default_value = "0.0.0.0:8081")]
        bind: String,
    },
    #[command(flatten)]
    Ingest(IngestCommands),
}

async fn build_pipeline(cli: &Cli) -> anyhow::Result<IngestionPipeline> {
    let fetcher: Arc<dyn SourceFetcher> = Arc::new(
        RedditFetcher::new(RedditConfig::from_env()?).context("Failed to set up the Reddit client")?,
    );
    info!("🦗 Source initialized (using {})", fetcher.platform());

    let inference_config = match cli.model.as_str() {
        "openai" => Some(InferenceConfig::from_env()?),
        _ => None,
    };
    let transformer: Arc<dyn TextTransformer> = create_model(&cli.model, inference_config)?;
    info!("🧠 Inference model initialized successfully (using {})", transformer.name());

    let stores = rb_storage::create_stores(&cli.storage, &cli.database).await?;
    match cli.storage.as_str() {
        "sqlite" => info!("✨ Storage initialized successfully (using sqlite at {})", cli.database.display()),
        other => info!("✨ Storage initialized successfully (using {})", other),
    }

    Ok(IngestionPipeline::new(fetcher, transformer, stores.sources, stores.articles))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();
    init_logging(if cli.verbose { Level::DEBUG } else { Level::INFO });

    let pipeline = build_pipeline(&cli).await?;

    match cli.command {
        Commands::Serve { bind } => {
            let state = AppState {
                pipeline: Arc::new(pipeline),
            };
            rb_web::serve(state, &bind).await?;
        }
        Commands::Ingest(command) => {
            handle_command(IngestArgs { command }, &pipeline).await?;
        }
    }

    Ok(())
}
