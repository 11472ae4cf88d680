use csv::{ReaderBuilder, Trim};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info};

use crate::types::{AggregatorError, Result, Source};

/// Serde view of one directory row. Unknown columns are ignored; missing
/// ones come back as empty strings.
#[derive(Debug, Deserialize)]
struct DirectoryRow {
    #[serde(default)]
    organisation: String,
    #[serde(default)]
    feed_url: String,
}

/// Fetch the remote organisation directory and turn it into the run's
/// source list.
///
/// Any failure here is fatal to the run: without the directory there is no
/// meaningful set of sources to aggregate.
pub async fn load_directory(client: &Client, url: &str) -> Result<Vec<Source>> {
    debug!("Fetching organisation directory: {}", url);

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| AggregatorError::Directory {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(AggregatorError::Directory {
            url: url.to_string(),
            reason: format!("HTTP {}", status),
        });
    }

    let body = response
        .text()
        .await
        .map_err(|e| AggregatorError::Directory {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    let sources = parse_directory(&body)?;
    info!("Directory listed {} organisations with feeds", sources.len());
    Ok(sources)
}

/// Parse directory CSV into sources, keeping row order.
///
/// Quoted fields may contain commas, doubled quotes, and embedded newlines;
/// all values are trimmed. Rows without a feed URL are organisation listings
/// only and are skipped, not errors.
pub fn parse_directory(text: &str) -> Result<Vec<Source>> {
    let mut reader = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut sources = Vec::new();
    for row in reader.deserialize::<DirectoryRow>() {
        let row = row?;
        if row.feed_url.is_empty() {
            debug!("Skipping directory row without a feed: {}", row.organisation);
            continue;
        }
        sources.push(Source {
            organisation: row.organisation,
            feed_url: row.feed_url,
        });
    }
    Ok(sources)
}
