use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One organisation from the remote directory, paired with its feed endpoint.
///
/// Produced by the directory loader for rows that carry a non-empty feed URL;
/// lives only for the duration of one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub organisation: String,
    pub feed_url: String,
}

/// Canonical form of one upstream entry, regardless of which wire format it
/// arrived in.
///
/// `raw_description` keeps the original markup; it is sanitized only when the
/// outbound feed is rendered. Items without a parseable date sort as oldest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedItem {
    pub title: String,
    pub link: String,
    pub published_at: Option<DateTime<Utc>>,
    pub raw_description: String,
    pub organisation: String,
}

/// Everything one run needs, passed explicitly into the pipeline entry point.
#[derive(Debug, Clone)]
pub struct AggregatorConfig {
    /// Where the organisation directory CSV lives.
    pub directory_url: String,
    /// Output location of the rendered feed; overwritten on every run.
    pub output_path: PathBuf,
    /// Public base URL of the site the feed belongs to.
    pub site_url: String,
    /// Public URL of the rendered feed itself.
    pub feed_url: String,
    pub feed_title: String,
    pub feed_description: String,
    pub feed_language: String,
    /// Aggregate size cap applied after sorting.
    pub max_items: usize,
    /// How many entries to take from each source, in document order.
    pub per_source_cap: usize,
    /// Plain-text description length cap for outbound entries.
    pub description_max_len: usize,
    pub user_agent: String,
    pub timeout_seconds: u64,
    /// Worker count for the source fan-out.
    pub concurrency: usize,
    /// Minimum spacing between requests to the same host.
    pub host_delay_ms: u64,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            directory_url: String::new(),
            output_path: PathBuf::from("public/feed.xml"),
            site_url: "https://example.org".to_string(),
            feed_url: "https://example.org/feed.xml".to_string(),
            feed_title: "Community Updates".to_string(),
            feed_description: "Latest updates from local community organisations".to_string(),
            feed_language: "en".to_string(),
            max_items: 100,
            per_source_cap: 12,
            description_max_len: 300,
            user_agent: "community-feed/1.0".to_string(),
            timeout_seconds: 30,
            concurrency: 4,
            host_delay_ms: 1000,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AggregatorError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("directory unavailable at {url}: {reason}")]
    Directory { url: String, reason: String },

    #[error("directory parse error: {0}")]
    DirectoryCsv(#[from] csv::Error),

    #[error("feed parse error: {0}")]
    Parse(String),

    #[error("unexpected status {status} from {url}")]
    UpstreamStatus {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("platform fallback failed for {url}: {reason}")]
    FallbackUnavailable { url: String, reason: String },

    #[error("feed render error: {0}")]
    Render(#[from] rss::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AggregatorError>;
