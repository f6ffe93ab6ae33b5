use crate::error::{Result, ScrapeError};
use crate::extract::ExtractStrategy;
use crate::pipeline::ProgressCallback;
use crate::record::{ProfileRecord, profile_id};
use crate::session::{Session, SessionProvider};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, mpsc};
use tracing::{debug, warn};

pub(crate) type SharedQueue = Arc<Mutex<mpsc::Receiver<String>>>;

const BACKOFF_INITIAL: Duration = Duration::from_secs(1);
const BACKOFF_CAP: Duration = Duration::from_secs(32);

/// Capped exponential retry delay: doubles per attempt, never decreases,
/// never exceeds the cap.
pub(crate) struct Backoff {
    delay: Duration,
    cap: Duration,
}

impl Backoff {
    pub(crate) fn new(initial: Duration, cap: Duration) -> Self {
        Self { delay: initial, cap }
    }

    pub(crate) fn next_delay(&mut self) -> Duration {
        let current = self.delay;
        self.delay = (current * 2).min(self.cap);
        current
    }
}

/// One extraction worker: pulls candidates until the queue closes, renders
/// each in a fresh session, and emits validated records. A bad URL never
/// terminates the worker.
pub(crate) struct Worker {
    pub id: usize,
    pub provider: Arc<dyn SessionProvider>,
    pub strategy: Arc<dyn ExtractStrategy>,
    pub queue: SharedQueue,
    pub records: mpsc::Sender<ProfileRecord>,
    pub industry: String,
    pub max_attempts: u32,
    pub progress: Option<ProgressCallback>,
}

impl Worker {
    pub(crate) async fn run(self) {
        debug!(worker = self.id, "worker started");
        loop {
            let candidate = {
                let mut queue = self.queue.lock().await;
                queue.recv().await
            };
            // None means the discoverer is done and the queue has drained.
            let Some(url) = candidate else { break };

            match self.process(&url).await {
                Ok(Some(record)) => {
                    if self.records.send(record).await.is_err() {
                        // Record stream consumer is gone; nothing left to do.
                        break;
                    }
                }
                Ok(None) => {}
                Err(e) => {
                    warn!(worker = self.id, %url, error = %e, "failed to extract profile");
                }
            }
            if let Some(callback) = &self.progress {
                callback(self.id, url);
            }
        }
        debug!(worker = self.id, "worker finished");
    }

    /// Fresh session per candidate, released on every path.
    async fn process(&self, url: &str) -> Result<Option<ProfileRecord>> {
        let mut session = self.provider.create_session().await?;
        let outcome = self.render_and_extract(session.as_mut(), url).await;
        session.close().await;
        outcome
    }

    async fn render_and_extract(
        &self,
        session: &mut dyn Session,
        url: &str,
    ) -> Result<Option<ProfileRecord>> {
        self.navigate_with_retry(session, url).await?;
        let html = session.content().await?;
        let fields = self.strategy.extract(&html);

        let record = ProfileRecord {
            id: profile_id(url).unwrap_or_default(),
            url: url.to_string(),
            industry: Some(self.industry.clone()),
            headline: fields.headline,
            pronouns: fields.pronouns,
            about: fields.about,
            connections: fields.connections,
            ..ProfileRecord::default()
        };
        if let Err(reason) = record.validate() {
            debug!(%url, reason, "dropping invalid record");
            return Ok(None);
        }
        Ok(Some(record))
    }

    async fn navigate_with_retry(&self, session: &mut dyn Session, url: &str) -> Result<()> {
        let mut backoff = Backoff::new(BACKOFF_INITIAL, BACKOFF_CAP);
        for attempt in 1..=self.max_attempts {
            match self.try_navigate(session, url).await {
                Ok(()) => return Ok(()),
                Err(e) => {
                    warn!(%url, attempt, error = %e, "retrying navigation");
                    if attempt < self.max_attempts {
                        tokio::time::sleep(backoff.next_delay()).await;
                    }
                }
            }
        }
        Err(ScrapeError::Unreachable {
            url: url.to_string(),
            attempts: self.max_attempts,
        })
    }

    async fn try_navigate(&self, session: &mut dyn Session, url: &str) -> Result<()> {
        session.navigate(url).await?;
        session.wait_for("main").await
    }
}
