use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use tokio::sync::Mutex;
use tracing::{debug, info};
use url::Url;

use crate::normalize::{PlatformPost, RawEntry};
use crate::types::{AggregatorConfig, AggregatorError, FeedItem, Result, Source};

/// Host suffix that marks a feed as hosted on the platform with a public
/// posts JSON API.
const PLATFORM_HOST_SUFFIX: &str = ".substack.com";
const PLATFORM_POSTS_PATH: &str = "/api/v1/posts";

/// Seam between the aggregator and the network, so runs can be driven with
/// stub fetchers in tests.
#[async_trait]
pub trait FetchItems: Send + Sync {
    /// Fetch and normalize one source's entries. An `Err` means the source
    /// contributes nothing this run; it never aborts the caller.
    async fn fetch(&self, source: &Source) -> Result<Vec<FeedItem>>;
}

/// Build the HTTP client shared by the directory loader and the fetcher.
pub fn build_client(config: &AggregatorConfig) -> Result<Client> {
    let client = Client::builder()
        .user_agent(&config.user_agent)
        .timeout(Duration::from_secs(config.timeout_seconds))
        .gzip(true)
        .deflate(true)
        .brotli(true)
        .redirect(reqwest::redirect::Policy::limited(10))
        .build()?;
    Ok(client)
}

/// Fetches one source at a time: syndication format first, then the
/// platform posts API for recognized hosts.
pub struct SourceFetcher {
    client: Client,
    per_source_cap: usize,
    host_delay: Duration,
    last_request: Mutex<HashMap<String, Instant>>,
}

impl SourceFetcher {
    pub fn new(client: Client, config: &AggregatorConfig) -> Self {
        Self {
            client,
            per_source_cap: config.per_source_cap,
            host_delay: Duration::from_millis(config.host_delay_ms),
            last_request: Mutex::new(HashMap::new()),
        }
    }

    async fn fetch_syndication(&self, source: &Source) -> Result<Vec<FeedItem>> {
        self.apply_host_delay(&source.feed_url).await;

        let response = self.client.get(&source.feed_url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AggregatorError::UpstreamStatus {
                url: source.feed_url.clone(),
                status,
            });
        }

        let bytes = response.bytes().await?;
        let feed = feed_rs::parser::parse(bytes.as_ref())
            .map_err(|e| AggregatorError::Parse(format!("{}: {}", source.feed_url, e)))?;

        let items: Vec<FeedItem> = feed
            .entries
            .into_iter()
            .take(self.per_source_cap)
            .map(|entry| RawEntry::Syndication(Box::new(entry)).normalize(&source.organisation))
            .collect();

        info!(
            "Fetched {} entries from {} ({})",
            items.len(),
            source.organisation,
            source.feed_url
        );
        Ok(items)
    }

    /// Find the posts endpoint by following wherever the feed URL redirects.
    /// Publications move between custom domains and their platform origin;
    /// only the final origin serves the API.
    async fn resolve_posts_endpoint(&self, feed_url: &str) -> Result<String> {
        let response = self.client.head(feed_url).send().await?;
        posts_endpoint(response.url()).ok_or_else(|| AggregatorError::FallbackUnavailable {
            url: feed_url.to_string(),
            reason: "redirect resolved to a URL without a host".to_string(),
        })
    }

    async fn fetch_platform(&self, source: &Source) -> Result<Vec<FeedItem>> {
        let endpoint = self.resolve_posts_endpoint(&source.feed_url).await?;
        debug!("Trying platform posts endpoint: {}", endpoint);
        self.apply_host_delay(&endpoint).await;

        let response = self.client.get(&endpoint).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AggregatorError::UpstreamStatus {
                url: endpoint,
                status,
            });
        }

        let body = response.text().await?;
        let posts: Vec<PlatformPost> = serde_json::from_str(&body)?;
        let items: Vec<FeedItem> = posts
            .into_iter()
            .take(self.per_source_cap)
            .map(|post| RawEntry::Platform(post).normalize(&source.organisation))
            .collect();

        info!(
            "Fetched {} posts from {} via platform API",
            items.len(),
            source.organisation
        );
        Ok(items)
    }

    async fn apply_host_delay(&self, url: &str) {
        if self.host_delay.is_zero() {
            return;
        }
        let Some(host) = Url::parse(url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
        else {
            return;
        };

        let wait = {
            let mut last = self.last_request.lock().await;
            let now = Instant::now();
            let wait = last
                .get(&host)
                .and_then(|prev| self.host_delay.checked_sub(now.duration_since(*prev)));
            // Reserve the slot this request will actually go out in.
            last.insert(host.clone(), now + wait.unwrap_or_default());
            wait
        };

        if let Some(wait) = wait {
            if !wait.is_zero() {
                debug!("Rate limiting {}: waiting {:?}", host, wait);
                tokio::time::sleep(wait).await;
            }
        }
    }
}

#[async_trait]
impl FetchItems for SourceFetcher {
    async fn fetch(&self, source: &Source) -> Result<Vec<FeedItem>> {
        match self.fetch_syndication(source).await {
            Ok(items) => Ok(items),
            Err(primary) => {
                if !is_platform_host(&source.feed_url) {
                    return Err(primary);
                }
                debug!(
                    "Feed fetch failed for {} ({}), trying platform fallback",
                    source.feed_url, primary
                );
                self.fetch_platform(source)
                    .await
                    .map_err(|fallback| AggregatorError::FallbackUnavailable {
                        url: source.feed_url.clone(),
                        reason: format!("{} (feed error: {})", fallback, primary),
                    })
            }
        }
    }
}

/// Whether a feed URL lives on the hosting platform with a posts API.
pub fn is_platform_host(feed_url: &str) -> bool {
    Url::parse(feed_url)
        .ok()
        .and_then(|u| {
            u.host_str()
                .map(|h| h == "substack.com" || h.ends_with(PLATFORM_HOST_SUFFIX))
        })
        .unwrap_or(false)
}

/// Posts endpoint at the origin of an already redirect-resolved URL.
pub fn posts_endpoint(resolved: &Url) -> Option<String> {
    let host = resolved.host_str()?;
    Some(match resolved.port() {
        Some(port) => format!(
            "{}://{}:{}{}",
            resolved.scheme(),
            host,
            port,
            PLATFORM_POSTS_PATH
        ),
        None => format!("{}://{}{}", resolved.scheme(), host, PLATFORM_POSTS_PATH),
    })
}
