use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::fetcher::FetchItems;
use crate::types::{FeedItem, Source};

/// Collected output of one fan-out over all sources.
#[derive(Debug)]
pub struct AggregateOutcome {
    /// Every item every successful source yielded, in no particular order.
    pub items: Vec<FeedItem>,
    pub failed_sources: usize,
}

/// Runs the fetcher over every source with a bounded worker pool.
///
/// Source outcomes are independent: a failed or slow source never blocks or
/// aborts the others. Ordering is imposed later by the feed builder.
pub struct Aggregator {
    fetcher: Arc<dyn FetchItems>,
    concurrency: usize,
}

impl Aggregator {
    pub fn new(fetcher: Arc<dyn FetchItems>, concurrency: usize) -> Self {
        Self {
            fetcher,
            concurrency: concurrency.max(1),
        }
    }

    pub async fn collect(&self, sources: Vec<Source>) -> AggregateOutcome {
        let total = sources.len();
        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut tasks = JoinSet::new();

        for source in sources {
            let fetcher = Arc::clone(&self.fetcher);
            let semaphore = Arc::clone(&semaphore);
            tasks.spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .expect("semaphore is never closed");
                let outcome = fetcher.fetch(&source).await;
                (source, outcome)
            });
        }

        let mut items = Vec::new();
        let mut failed = 0usize;
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((source, Ok(fetched))) => {
                    debug!("{} contributed {} items", source.organisation, fetched.len());
                    items.extend(fetched);
                }
                Ok((source, Err(e))) => {
                    warn!(
                        "Skipping {} ({}): {}",
                        source.organisation, source.feed_url, e
                    );
                    failed += 1;
                }
                Err(e) => {
                    warn!("Fetch task panicked or was cancelled: {}", e);
                    failed += 1;
                }
            }
        }

        info!(
            "Aggregated {} items from {} sources ({} failed)",
            items.len(),
            total,
            failed
        );
        AggregateOutcome {
            items,
            failed_sources: failed,
        }
    }
}
