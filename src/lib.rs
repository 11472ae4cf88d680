pub mod aggregator;
pub mod directory;
pub mod feed;
pub mod fetcher;
pub mod normalize;
pub mod sanitize;
pub mod types;

pub use aggregator::{AggregateOutcome, Aggregator};
pub use fetcher::{FetchItems, SourceFetcher};
pub use types::{AggregatorConfig, AggregatorError, FeedItem, Result, Source};

use std::sync::Arc;

use tracing::info;

/// What one completed run produced.
#[derive(Debug, Clone, Copy)]
pub struct RunSummary {
    pub sources: usize,
    pub failed_sources: usize,
    pub items_written: usize,
}

/// Execute one full aggregation run: directory, fan-out, merge, render,
/// persist.
///
/// Directory failures abort the run before anything is written; individual
/// source failures only shrink the output.
pub async fn run(config: AggregatorConfig) -> Result<RunSummary> {
    let client = fetcher::build_client(&config)?;

    let sources = directory::load_directory(&client, &config.directory_url).await?;
    let source_count = sources.len();

    let aggregator = Aggregator::new(
        Arc::new(SourceFetcher::new(client, &config)),
        config.concurrency,
    );
    let outcome = aggregator.collect(sources).await;

    let items = feed::sort_and_cap(outcome.items, config.max_items);
    let channel = feed::build_channel(&items, &config);
    feed::write_feed(&channel, &config.output_path)?;

    info!(
        "Run complete: {} items from {} sources",
        items.len(),
        source_count
    );
    Ok(RunSummary {
        sources: source_count,
        failed_sources: outcome.failed_sources,
        items_written: items.len(),
    })
}
