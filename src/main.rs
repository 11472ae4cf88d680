use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info};

use community_feed::{run, AggregatorConfig};

/// Aggregate community organisation feeds into a single RSS document.
#[derive(Debug, Parser)]
#[command(name = "community-feed", version)]
struct Args {
    /// URL of the organisation directory CSV
    #[arg(long)]
    directory_url: String,

    /// Public base URL of the site the feed belongs to
    #[arg(long)]
    site_url: String,

    /// Where to write the rendered feed
    #[arg(long, default_value = "public/feed.xml")]
    output: PathBuf,

    /// Public URL of the rendered feed (defaults to <site-url>/feed.xml)
    #[arg(long)]
    feed_url: Option<String>,

    /// Aggregate item cap applied after sorting
    #[arg(long, default_value_t = 100)]
    max_items: usize,

    /// Entries taken from each source
    #[arg(long, default_value_t = 12)]
    per_source_cap: usize,

    /// Plain-text description length cap
    #[arg(long, default_value_t = 300)]
    description_length: usize,

    /// Concurrent source fetches
    #[arg(long, default_value_t = 4)]
    concurrency: usize,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 30)]
    timeout_seconds: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let feed_url = args
        .feed_url
        .unwrap_or_else(|| format!("{}/feed.xml", args.site_url.trim_end_matches('/')));
    let config = AggregatorConfig {
        directory_url: args.directory_url,
        site_url: args.site_url,
        output_path: args.output,
        feed_url,
        max_items: args.max_items,
        per_source_cap: args.per_source_cap,
        description_max_len: args.description_length,
        concurrency: args.concurrency,
        timeout_seconds: args.timeout_seconds,
        ..AggregatorConfig::default()
    };

    let summary = run(config)
        .await
        .map_err(|e| {
            error!("Run failed: {}", e);
            e
        })
        .context("aggregation run aborted")?;

    info!(
        "Done: wrote {} items ({} sources, {} failed)",
        summary.items_written, summary.sources, summary.failed_sources
    );
    Ok(())
}
