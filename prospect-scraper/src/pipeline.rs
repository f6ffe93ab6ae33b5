use crate::discover::Discoverer;
use crate::extract::{ExtractStrategy, MarkerExtractor};
use crate::record::ProfileRecord;
use crate::session::SessionProvider;
use crate::worker::Worker;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};
use tokio_stream::wrappers::ReceiverStream;
use tracing::{info, warn};

pub type ProgressCallback = Arc<dyn Fn(usize, String) + Send + Sync>;

/// Merged worker output, ordered by completion time. Lazy, finite and
/// non-restartable: it closes once every worker has exited.
pub type RecordStream = ReceiverStream<ProfileRecord>;

const RECORD_BUFFER: usize = 64;

#[derive(Debug, Clone)]
pub struct ScrapeConfig {
    pub industry: String,
    pub max_profiles: usize,
    pub concurrency: usize,
    pub max_attempts: u32,
    pub queue_capacity: usize,
    /// Canonical URLs to treat as already visited (resume support).
    pub seed_visited: HashSet<String>,
}

impl ScrapeConfig {
    pub fn new(industry: impl Into<String>) -> Self {
        Self {
            industry: industry.into(),
            max_profiles: 100,
            concurrency: 3,
            max_attempts: 8,
            queue_capacity: 1024,
            seed_visited: HashSet::new(),
        }
    }
}

/// Coordinates one scrape: a discoverer task feeding a bounded queue and
/// `concurrency` worker tasks draining it, all sharing one launched browser.
pub struct Scraper {
    config: ScrapeConfig,
    provider: Arc<dyn SessionProvider>,
    strategy: Arc<dyn ExtractStrategy>,
    progress_callback: Option<ProgressCallback>,
}

impl Scraper {
    pub fn new(config: ScrapeConfig, provider: Arc<dyn SessionProvider>) -> Self {
        Self {
            config,
            provider,
            strategy: Arc::new(MarkerExtractor),
            progress_callback: None,
        }
    }

    pub fn with_strategy(mut self, strategy: Arc<dyn ExtractStrategy>) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Launch the pipeline. Must be called from within a tokio runtime.
    pub fn run(self) -> RecordStream {
        info!(
            industry = %self.config.industry,
            max_profiles = self.config.max_profiles,
            concurrency = self.config.concurrency,
            "starting scrape pipeline"
        );

        let (url_tx, url_rx) = mpsc::channel::<String>(self.config.queue_capacity);
        let (record_tx, record_rx) = mpsc::channel::<ProfileRecord>(RECORD_BUFFER);
        let queue = Arc::new(Mutex::new(url_rx));

        // The discoverer owns the only queue sender; when it finishes the
        // channel closes and the workers drain out deterministically.
        let discoverer = Discoverer::new(
            self.provider.clone(),
            url_tx,
            self.config.industry.clone(),
            self.config.max_profiles,
            self.config.seed_visited,
        );
        let discover_handle = tokio::spawn(async move {
            match discoverer.run().await {
                Ok(discovered) => info!(discovered, "discovery finished"),
                Err(e) => warn!(error = %e, "discovery aborted"),
            }
        });

        let mut worker_handles = Vec::with_capacity(self.config.concurrency);
        for id in 0..self.config.concurrency {
            let worker = Worker {
                id,
                provider: self.provider.clone(),
                strategy: self.strategy.clone(),
                queue: queue.clone(),
                records: record_tx.clone(),
                industry: self.config.industry.clone(),
                max_attempts: self.config.max_attempts,
                progress: self.progress_callback.clone(),
            };
            worker_handles.push(tokio::spawn(worker.run()));
        }
        // The workers hold the remaining record senders; dropping ours ties
        // stream closure to worker exit.
        drop(record_tx);

        tokio::spawn(async move {
            if let Err(e) = discover_handle.await {
                warn!(error = %e, "discovery task failed");
            }
            for handle in worker_handles {
                if let Err(e) = handle.await {
                    warn!(error = %e, "worker task failed");
                }
            }
            info!("scrape pipeline complete");
        });

        ReceiverStream::new(record_rx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeSite, profile_link, profile_page};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio_stream::StreamExt;

    fn listing_site(names: &[&str]) -> FakeSite {
        let mut listing = String::new();
        for name in names {
            listing.push_str(&profile_link(name));
        }
        FakeSite::new().with_listing_snapshots(vec![(listing.clone(), 1000), (listing, 1000)])
    }

    #[tokio::test(start_paused = true)]
    async fn test_end_to_end_discovery_and_extraction() {
        let names = ["ada", "grace", "edsger"];
        let mut site = listing_site(&names);
        for name in &names {
            site = site.with_profile(
                &format!("https://www.linkedin.com/in/{name}"),
                &profile_page("Engineer"),
            );
        }
        let provider = site.provider();

        let mut config = ScrapeConfig::new("Information Technology");
        config.max_profiles = 10;
        config.concurrency = 2;
        let mut stream = Scraper::new(config, provider.clone()).run();

        let mut records = Vec::new();
        while let Some(record) = stream.next().await {
            records.push(record);
        }

        assert_eq!(records.len(), 3);
        let mut ids: Vec<_> = records.iter().map(|r| r.id.as_str()).collect();
        ids.sort_unstable();
        assert_eq!(ids, vec!["ada", "edsger", "grace"]);

        // Discovery session + one session per candidate, all released.
        let counters = provider.counters();
        assert_eq!(counters.created(), 4);
        assert_eq!(counters.closed(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dead_profile_is_skipped_and_stream_still_ends() {
        let names = ["ada", "grace", "edsger", "barbara", "ghost"];
        let mut site = listing_site(&names);
        for name in &names[..4] {
            site = site.with_profile(
                &format!("https://www.linkedin.com/in/{name}"),
                &profile_page("Engineer"),
            );
        }
        let provider = site.provider();

        let mut config = ScrapeConfig::new("Information Technology");
        config.max_profiles = 10;
        config.concurrency = 3;
        config.max_attempts = 2;
        let mut stream = Scraper::new(config, provider.clone()).run();

        let mut records = Vec::new();
        while let Some(record) = stream.next().await {
            records.push(record);
        }

        assert_eq!(records.len(), 4);
        for record in &records {
            assert!(!record.id.is_empty());
            assert!(!record.url.is_empty());
            assert_ne!(record.id, "ghost");
        }
        let counters = provider.counters();
        assert_eq!(counters.created(), counters.closed());
    }

    #[tokio::test(start_paused = true)]
    async fn test_progress_callback_observes_queue_drain() {
        let names = ["ada", "grace"];
        let mut site = listing_site(&names);
        for name in &names {
            site = site.with_profile(
                &format!("https://www.linkedin.com/in/{name}"),
                &profile_page("Engineer"),
            );
        }

        let processed = Arc::new(AtomicUsize::new(0));
        let processed_clone = processed.clone();
        let mut config = ScrapeConfig::new("Information Technology");
        config.max_profiles = 10;
        let mut stream = Scraper::new(config, site.provider())
            .with_progress_callback(Arc::new(move |_worker_id, _url| {
                processed_clone.fetch_add(1, Ordering::SeqCst);
            }))
            .run();

        let mut count = 0;
        while stream.next().await.is_some() {
            count += 1;
        }
        assert_eq!(count, 2);
        // Every dequeued candidate is acknowledged, regardless of outcome.
        assert_eq!(processed.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_custom_strategy_is_used() {
        struct NullStrategy;
        impl ExtractStrategy for NullStrategy {
            fn extract(&self, _html: &str) -> crate::extract::ExtractedFields {
                crate::extract::ExtractedFields::default()
            }
        }

        let names = ["ada"];
        let site = listing_site(&names).with_profile(
            "https://www.linkedin.com/in/ada",
            &profile_page("Engineer"),
        );

        let mut config = ScrapeConfig::new("Information Technology");
        config.max_profiles = 10;
        let mut stream = Scraper::new(config, site.provider())
            .with_strategy(Arc::new(NullStrategy))
            .run();

        let record = stream.next().await.unwrap();
        assert_eq!(record.id, "ada");
        assert_eq!(record.headline, None);
        assert_eq!(record.connections, None);
        assert!(stream.next().await.is_none());
    }
}
