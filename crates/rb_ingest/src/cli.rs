use clap::{Args, Subcommand};
use uuid::Uuid;
use rb_core::{Result, DEFAULT_BATCH_SIZE};
use crate::pipeline::{IngestRequest, IngestionPipeline};

#[derive(Args, Debug, Clone)]
pub struct IngestArgs {
    #[command(subcommand)]
    pub command: IngestCommands,
}

#[derive(Subcommand, Debug, Clone)]
pub enum IngestCommands {
    /// Fetch hot posts from a subreddit and turn each into an article
    Fetch {
        /// Subreddit name, with or without the r/ prefix
        community: String,
        /// Number of posts to process (clamped to 1..=50)
        #[arg(long, short = 'n', default_value_t = DEFAULT_BATCH_SIZE, allow_negative_numbers = true)]
        count: i64,
        /// Mark the generated articles for publishing
        #[arg(long)]
        publish: bool,
    },
    /// List stored articles
    Articles,
    /// Print one article
    Show {
        id: Uuid,
    },
    /// List stored source posts
    Sources,
    /// List source posts that have no article
    Orphans,
}

pub async fn handle_command(args: IngestArgs, pipeline: &IngestionPipeline) -> Result<()> {
    match args.command {
        IngestCommands::Fetch { community, count, publish } => {
            let request = IngestRequest::new(community)
                .with_count(count)
                .with_publish(publish);
            let report = pipeline.run(&request).await?;

            for id in &report.article_ids {
                match pipeline.articles().find_by_id(*id).await {
                    Ok(article) => println!("🆕 {} - {}", id, article.title),
                    Err(e) => {
                        tracing::warn!("Could not read back article {}: {}", id, e);
                        println!("🆕 {}", id);
                    }
                }
            }
            println!(
                "Created {} of {} fetched posts (batch of {})",
                report.processed(),
                report.fetched,
                report.effective_count
            );

            if let Some(failure) = report.failure {
                eprintln!(
                    "Stopped at post {} ({}) during {}",
                    failure.index + 1,
                    failure.external_id,
                    failure.stage
                );
                if let Some(orphan) = failure.orphaned_source_item {
                    eprintln!("Source item {} has no article", orphan);
                }
                return Err(failure.error);
            }
        }
        IngestCommands::Articles => {
            for article in pipeline.articles().find_all().await? {
                println!("{}  {}  {}", article.id, article.created_at.to_rfc3339(), article.title);
            }
        }
        IngestCommands::Show { id } => {
            let article = pipeline.articles().find_by_id(id).await?;
            println!("{}\n\n{}", article.title, article.content);
        }
        IngestCommands::Sources => {
            for item in pipeline.sources().find_all().await? {
                println!("{}  r/{}  {}  {}", item.id, item.community, item.external_id, item.title);
            }
        }
        IngestCommands::Orphans => {
            let orphans = pipeline.find_orphans().await?;
            if orphans.is_empty() {
                println!("Every source post has an article");
            }
            for item in orphans {
                println!("{}  r/{}  {}  {}", item.id, item.community, item.external_id, item.title);
            }
        }
    }
    Ok(())
}
