use crate::error::{Result, ScrapeError};
use async_trait::async_trait;
use chromiumoxide::Page;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::network::CookieParam;
use futures::StreamExt;
use rand::Rng;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Minimal embedded pool; extended via `SessionConfig::user_agents_file`.
const DEFAULT_USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
];

const DEFAULT_COOKIE_DOMAIN: &str = ".linkedin.com";
const SELECTOR_POLL_INTERVAL: Duration = Duration::from_millis(250);

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub navigation_timeout_ms: u64,
    pub headless: bool,
    pub proxy: Option<String>,
    /// Raw `name=value; name2=value2` cookie header injected identically
    /// into every session.
    pub login_cookie: Option<String>,
    pub user_agents_file: Option<PathBuf>,
    pub cookie_domain: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            navigation_timeout_ms: 30_000,
            headless: true,
            proxy: None,
            login_cookie: None,
            user_agents_file: None,
            cookie_domain: DEFAULT_COOKIE_DOMAIN.to_string(),
        }
    }
}

/// One rendered-page handle. Acquired per candidate URL, never reused
/// across candidates, released after every attempt.
#[async_trait]
pub trait Session: Send {
    async fn navigate(&mut self, url: &str) -> Result<()>;

    /// Block until `selector` is present, bounded by the navigation timeout.
    async fn wait_for(&self, selector: &str) -> Result<()>;

    /// Snapshot of the fully rendered page markup.
    async fn content(&self) -> Result<String>;

    async fn scroll_height(&self) -> Result<i64>;

    async fn scroll_to_bottom(&mut self) -> Result<()>;

    async fn close(self: Box<Self>);
}

#[async_trait]
pub trait SessionProvider: Send + Sync {
    async fn create_session(&self) -> Result<Box<dyn Session>>;
}

/// Creates isolated browsing sessions off a single launched browser.
///
/// The factory can only be obtained through [`SessionFactory::launch`], so a
/// session can never be requested from an unlaunched browser.
pub struct SessionFactory {
    browser: Mutex<Browser>,
    config: SessionConfig,
    user_agents: Vec<String>,
}

impl SessionFactory {
    pub async fn launch(config: SessionConfig) -> Result<Self> {
        let user_agents = load_user_agent_pool(config.user_agents_file.as_deref())?;

        let mut builder = BrowserConfig::builder()
            .request_timeout(Duration::from_millis(config.navigation_timeout_ms));
        if !config.headless {
            builder = builder.with_head();
        }
        if let Some(proxy) = &config.proxy {
            builder = builder.arg(format!("--proxy-server={proxy}"));
        }
        let browser_config = builder.build().map_err(ScrapeError::Browser)?;

        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(|e| ScrapeError::Browser(e.to_string()))?;

        // The CDP event stream must be drained for the browser to make progress.
        tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                let _ = event;
            }
        });

        info!(
            user_agents = user_agents.len(),
            headless = config.headless,
            "browser launched"
        );

        Ok(Self {
            browser: Mutex::new(browser),
            config,
            user_agents,
        })
    }

    fn pick_user_agent(&self) -> &str {
        let idx = rand::thread_rng().gen_range(0..self.user_agents.len());
        &self.user_agents[idx]
    }
}

#[async_trait]
impl SessionProvider for SessionFactory {
    async fn create_session(&self) -> Result<Box<dyn Session>> {
        let page = {
            let mut browser = self.browser.lock().await;
            // Fresh incognito context per session: independent cookie jar and cache.
            browser
                .start_incognito_context()
                .await
                .map_err(|e| ScrapeError::Browser(e.to_string()))?;
            browser
                .new_page("about:blank")
                .await
                .map_err(|e| ScrapeError::Browser(e.to_string()))?
        };

        let user_agent = self.pick_user_agent();
        page.set_user_agent(user_agent.to_string())
            .await
            .map_err(|e| ScrapeError::Browser(e.to_string()))?;
        debug!(user_agent, "session created");

        if let Some(raw) = &self.config.login_cookie {
            let cookies = build_cookies(raw, &self.config.cookie_domain)?;
            if !cookies.is_empty() {
                page.set_cookies(cookies)
                    .await
                    .map_err(|e| ScrapeError::Browser(e.to_string()))?;
            }
        }

        Ok(Box::new(BrowserSession {
            page,
            timeout: Duration::from_millis(self.config.navigation_timeout_ms),
        }))
    }
}

/// Chromium-backed [`Session`].
struct BrowserSession {
    page: Page,
    timeout: Duration,
}

impl BrowserSession {
    async fn eval_i64(&self, expression: &str) -> Result<i64> {
        self.page
            .evaluate(expression)
            .await
            .map_err(|e| ScrapeError::Browser(e.to_string()))?
            .into_value()
            .map_err(|e| ScrapeError::Browser(e.to_string()))
    }
}

#[async_trait]
impl Session for BrowserSession {
    async fn navigate(&mut self, url: &str) -> Result<()> {
        self.page
            .goto(url)
            .await
            .map_err(|e| ScrapeError::Navigation {
                url: url.to_string(),
                reason: e.to_string(),
            })?;
        self.page
            .wait_for_navigation()
            .await
            .map_err(|e| ScrapeError::Navigation {
                url: url.to_string(),
                reason: e.to_string(),
            })?;
        Ok(())
    }

    async fn wait_for(&self, selector: &str) -> Result<()> {
        let deadline = Instant::now() + self.timeout;
        while self.page.find_element(selector).await.is_err() {
            if Instant::now() >= deadline {
                return Err(ScrapeError::Timeout(selector.to_string()));
            }
            tokio::time::sleep(SELECTOR_POLL_INTERVAL).await;
        }
        Ok(())
    }

    async fn content(&self) -> Result<String> {
        self.page
            .content()
            .await
            .map_err(|e| ScrapeError::Browser(e.to_string()))
    }

    async fn scroll_height(&self) -> Result<i64> {
        self.eval_i64("document.body.scrollHeight").await
    }

    async fn scroll_to_bottom(&mut self) -> Result<()> {
        self.page
            .evaluate("window.scrollTo(0, document.body.scrollHeight)")
            .await
            .map_err(|e| ScrapeError::Browser(e.to_string()))?;
        Ok(())
    }

    async fn close(self: Box<Self>) {
        if let Err(e) = self.page.close().await {
            debug!(error = %e, "failed to close page");
        }
    }
}

fn load_user_agent_pool(path: Option<&Path>) -> Result<Vec<String>> {
    let mut pool: Vec<String> = DEFAULT_USER_AGENTS.iter().map(|ua| ua.to_string()).collect();
    if let Some(path) = path {
        let contents = std::fs::read_to_string(path)?;
        pool.extend(
            contents
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(String::from),
        );
    }
    Ok(pool)
}

/// Split a raw cookie header into CDP cookie params scoped to `domain`.
fn build_cookies(raw: &str, domain: &str) -> Result<Vec<CookieParam>> {
    let mut cookies = Vec::new();
    for pair in raw.split(';') {
        let pair = pair.trim();
        if pair.is_empty() {
            continue;
        }
        let Some((name, value)) = pair.split_once('=') else {
            return Err(ScrapeError::Other(format!(
                "malformed cookie pair: {pair}"
            )));
        };
        let cookie = CookieParam::builder()
            .name(name.trim())
            .value(value.trim().trim_matches('"'))
            .domain(domain)
            .path("/")
            .build()
            .map_err(ScrapeError::Browser)?;
        cookies.push(cookie);
    }
    Ok(cookies)
}
