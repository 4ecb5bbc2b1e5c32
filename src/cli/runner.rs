//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::config::{load_definition, FeedDefinition};
use crate::error::{Error, Result};
use crate::feed::{FeedController, FetchOutcome};
use crate::fetch::HttpPageFetcher;
use chrono::Utc;
use tracing::info;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Validate => self.validate(),
            Commands::Read { max_pages } => self.read(*max_pages).await,
        }
    }

    /// Load the feed definition named on the command line
    fn load_feed(&self) -> Result<FeedDefinition> {
        let path = self
            .cli
            .feed
            .as_ref()
            .ok_or_else(|| Error::config("Feed definition file not specified (use -f flag)"))?;
        load_definition(path)
    }

    /// Validate a feed definition
    fn validate(&self) -> Result<()> {
        let definition = self.load_feed()?;
        println!(
            "OK: feed '{}' ({} via cursor param '{}')",
            definition.name,
            definition.base_url,
            definition.cursor_param
        );
        Ok(())
    }

    /// Walk the feed to exhaustion, each iteration standing in for one
    /// sentinel visibility event
    async fn read(&self, max_pages: usize) -> Result<()> {
        let definition = self.load_feed()?;
        let name = definition.name.clone();
        let started = Utc::now();

        let fetcher = HttpPageFetcher::new(definition)?;
        let first = fetcher.fetch_first_page().await?;
        info!(feed = %name, items = first.len(), "seeded from first page");

        let controller = FeedController::new(fetcher);
        controller.seed(first).await;

        let mut pages_loaded = 0usize;
        while controller.should_observe_sentinel().await {
            if max_pages > 0 && pages_loaded >= max_pages {
                info!(feed = %name, "stopping at --max-pages limit");
                break;
            }
            match controller.request_next_page_if_eligible().await? {
                FetchOutcome::Merged { appended } => {
                    pages_loaded += 1;
                    info!(feed = %name, page = pages_loaded, appended, "merged page");
                }
                // A single-consumer walk never races itself; anything but a
                // merge means the walk is over
                FetchOutcome::Discarded | FetchOutcome::Skipped | FetchOutcome::Failed => break,
            }
        }

        let snapshot = controller.snapshot().await;
        match self.cli.format {
            OutputFormat::Json => {
                for item in &snapshot.items {
                    println!("{}", serde_json::to_string(&item.fields)?);
                }
            }
            OutputFormat::Pretty => {
                for item in &snapshot.items {
                    println!("{}", item.id);
                }
                let elapsed = Utc::now().signed_duration_since(started);
                println!(
                    "\n{} items in {} pages ({} ms)",
                    snapshot.items.len(),
                    pages_loaded + 1,
                    elapsed.num_milliseconds()
                );
            }
        }

        Ok(())
    }
}
