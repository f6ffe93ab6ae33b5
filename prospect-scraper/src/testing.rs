//! Scripted session fakes driving the pipeline in tests without a browser.

use crate::error::{Result, ScrapeError};
use crate::session::{Session, SessionProvider};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

pub(crate) fn profile_link(slug: &str) -> String {
    format!(r#"<a href="https://www.linkedin.com/in/{slug}">{slug}</a>"#)
}

pub(crate) fn profile_page(headline: &str) -> String {
    format!(
        concat!(
            "<html><body><main>",
            r#"<div class="text-body-medium" >{}</div>"#,
            "<div>connections-and-followers-count 500</div>",
            "</main></body></html>",
        ),
        headline
    )
}

/// A scripted site: successive listing snapshots (content + scroll height per
/// scroll iteration) plus profile pages by URL. Navigating to a URL with no
/// registered page fails, which is how tests model dead targets.
#[derive(Default)]
pub(crate) struct FakeSite {
    listing_snapshots: Vec<(String, i64)>,
    profiles: HashMap<String, String>,
}

impl FakeSite {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_listing_snapshots(mut self, snapshots: Vec<(String, i64)>) -> Self {
        self.listing_snapshots = snapshots;
        self
    }

    pub(crate) fn with_profile(mut self, url: &str, html: &str) -> Self {
        self.profiles.insert(url.to_string(), html.to_string());
        self
    }

    pub(crate) fn provider(self) -> Arc<FakeProvider> {
        Arc::new(FakeProvider {
            site: Arc::new(self),
            counters: Arc::new(Counters::default()),
        })
    }
}

#[derive(Default)]
pub(crate) struct Counters {
    created: AtomicUsize,
    closed: AtomicUsize,
    navigations: AtomicUsize,
}

impl Counters {
    pub(crate) fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    pub(crate) fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }

    pub(crate) fn navigations(&self) -> usize {
        self.navigations.load(Ordering::SeqCst)
    }
}

pub(crate) struct FakeProvider {
    site: Arc<FakeSite>,
    counters: Arc<Counters>,
}

impl FakeProvider {
    pub(crate) fn counters(&self) -> Arc<Counters> {
        self.counters.clone()
    }
}

#[async_trait]
impl SessionProvider for FakeProvider {
    async fn create_session(&self) -> Result<Box<dyn Session>> {
        self.counters.created.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeSession {
            site: self.site.clone(),
            counters: self.counters.clone(),
            location: None,
            snapshot_idx: 0,
        }))
    }
}

pub(crate) struct FakeSession {
    site: Arc<FakeSite>,
    counters: Arc<Counters>,
    location: Option<String>,
    snapshot_idx: usize,
}

impl FakeSession {
    fn on_listing(&self) -> bool {
        self.location
            .as_deref()
            .is_some_and(|url| url.contains("/search/results/people/"))
    }

    fn snapshot(&self) -> Option<&(String, i64)> {
        let last = self.site.listing_snapshots.len().checked_sub(1)?;
        self.site.listing_snapshots.get(self.snapshot_idx.min(last))
    }
}

#[async_trait]
impl Session for FakeSession {
    async fn navigate(&mut self, url: &str) -> Result<()> {
        self.counters.navigations.fetch_add(1, Ordering::SeqCst);
        if url.contains("/search/results/people/") || self.site.profiles.contains_key(url) {
            self.location = Some(url.to_string());
            Ok(())
        } else {
            Err(ScrapeError::Navigation {
                url: url.to_string(),
                reason: "connection reset".to_string(),
            })
        }
    }

    async fn wait_for(&self, _selector: &str) -> Result<()> {
        Ok(())
    }

    async fn content(&self) -> Result<String> {
        let Some(location) = &self.location else {
            return Err(ScrapeError::Other("no page loaded".to_string()));
        };
        if self.on_listing() {
            return Ok(self
                .snapshot()
                .map(|(html, _)| html.clone())
                .unwrap_or_default());
        }
        Ok(self.site.profiles.get(location).cloned().unwrap_or_default())
    }

    async fn scroll_height(&self) -> Result<i64> {
        Ok(self.snapshot().map(|&(_, height)| height).unwrap_or(0))
    }

    async fn scroll_to_bottom(&mut self) -> Result<()> {
        if self.snapshot_idx + 1 < self.site.listing_snapshots.len() {
            self.snapshot_idx += 1;
        }
        Ok(())
    }

    async fn close(self: Box<Self>) {
        self.counters.closed.fetch_add(1, Ordering::SeqCst);
    }
}
