use crate::error::{Result, ScrapeError};
use crate::session::{Session, SessionProvider};
use once_cell::sync::Lazy;
use rand::Rng;
use regex::Regex;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use url::Url;

pub static PROFILE_URL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"https://[a-z]{2,3}\.linkedin\.com/in/[A-Za-z0-9\-_%]+/?").unwrap()
});

const SEARCH_URL_BASE: &str = "https://www.linkedin.com/search/results/people/";

// Politeness jitter between scroll iterations.
const POLITENESS_MIN_MS: u64 = 1_000;
const POLITENESS_MAX_MS: u64 = 3_000;

/// Canonical form used as both queue payload and dedup key:
/// scheme+host+path, query and fragment stripped, trailing slash trimmed.
/// Idempotent.
pub fn normalize_profile_url(raw: &str) -> Result<String> {
    let mut url =
        Url::parse(raw).map_err(|e| ScrapeError::InvalidUrl(format!("{raw}: {e}")))?;
    url.set_query(None);
    url.set_fragment(None);
    let path = url.path().trim_end_matches('/').to_string();
    url.set_path(&path);
    Ok(url.to_string())
}

pub fn search_url(industry: &str) -> String {
    format!("{SEARCH_URL_BASE}?industryCompanyVertical=({industry})")
}

/// Harvests candidate profile URLs from the category search listing.
///
/// State machine: navigate to the listing, then scroll-loop until either the
/// profile cap is reached or the scrollable height stops growing. The height
/// heuristic can false-terminate on slow-loading pages; that is a documented
/// limitation, not a guarantee.
pub(crate) struct Discoverer {
    provider: Arc<dyn SessionProvider>,
    queue: mpsc::Sender<String>,
    visited: HashSet<String>,
    industry: String,
    max_profiles: usize,
}

impl Discoverer {
    pub(crate) fn new(
        provider: Arc<dyn SessionProvider>,
        queue: mpsc::Sender<String>,
        industry: String,
        max_profiles: usize,
        seed_visited: HashSet<String>,
    ) -> Self {
        Self {
            provider,
            queue,
            visited: seed_visited,
            industry,
            max_profiles,
        }
    }

    /// Runs to completion and returns the size of the visited set. The queue
    /// sender drops with `self`, closing the queue - that is the completion
    /// signal the workers drain against.
    pub(crate) async fn run(mut self) -> Result<usize> {
        let mut session = self.provider.create_session().await?;
        let outcome = self.scroll_loop(session.as_mut()).await;
        session.close().await;
        let discovered = outcome?;
        info!(discovered, "discovery complete");
        Ok(discovered)
    }

    async fn scroll_loop(&mut self, session: &mut dyn Session) -> Result<usize> {
        let listing = search_url(&self.industry);
        info!(url = %listing, "opening search listing");
        session.navigate(&listing).await?;

        let mut last_height = 0i64;
        while self.visited.len() < self.max_profiles {
            politeness_pause().await;
            let html = session.content().await?;
            self.harvest(&html).await?;
            if self.visited.len() >= self.max_profiles {
                break;
            }
            let height = session.scroll_height().await?;
            if height == last_height {
                debug!(height, "content height stalled, ending discovery");
                break;
            }
            session.scroll_to_bottom().await?;
            last_height = height;
        }
        Ok(self.visited.len())
    }

    async fn harvest(&mut self, html: &str) -> Result<()> {
        for candidate in PROFILE_URL_RE.find_iter(html) {
            let url = match normalize_profile_url(candidate.as_str()) {
                Ok(url) => url,
                Err(e) => {
                    warn!(error = %e, "skipping unparsable candidate");
                    continue;
                }
            };
            if self.visited.contains(&url) {
                continue;
            }
            self.visited.insert(url.clone());
            debug!(%url, "discovered profile");
            if self.queue.send(url).await.is_err() {
                return Err(ScrapeError::Other("work queue closed".to_string()));
            }
            if self.visited.len() >= self.max_profiles {
                break;
            }
        }
        Ok(())
    }
}

async fn politeness_pause() {
    let delay_ms = rand::thread_rng().gen_range(POLITENESS_MIN_MS..=POLITENESS_MAX_MS);
    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
}
