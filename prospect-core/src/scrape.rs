use crate::data::Database;
use crate::export::CsvExporter;
use crate::settings::Settings;
use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use prospect_scraper::{
    ScrapeConfig, Scraper, SessionConfig, SessionFactory, validate_export_columns,
};
use std::path::PathBuf;
use std::sync::Arc;
use tokio_stream::StreamExt;
use tracing::{info, warn};

/// Options for one scrape run, assembled by the CLI from its arguments and
/// the environment settings.
pub struct ScrapeOptions {
    pub industry: String,
    pub max_profiles: usize,
    pub concurrency: usize,
    pub proxy: Option<String>,
    pub login_cookie: Option<String>,
    pub headless: bool,
    pub resume: bool,
    pub outdir: PathBuf,
    pub settings: Settings,
    pub show_progress: bool,
}

pub struct ScrapeSummary {
    pub session_id: String,
    pub scraped: usize,
    pub cancelled: bool,
    pub db_path: PathBuf,
    pub csv_path: PathBuf,
}

/// Execute a full scrape: launch the browser, run the pipeline, and drain
/// the record stream into the row store and the CSV export.
pub async fn execute_scrape(options: ScrapeOptions) -> Result<ScrapeSummary> {
    validate_export_columns().context("export column table is inconsistent")?;

    std::fs::create_dir_all(&options.outdir).with_context(|| {
        format!("creating output directory {}", options.outdir.display())
    })?;
    let db_path = options.outdir.join("profiles.db");
    let csv_path = options.outdir.join("profiles.csv");

    let db = Database::new(&db_path)
        .with_context(|| format!("opening database {}", db_path.display()))?;
    let exporter = CsvExporter::new(&csv_path);

    let mut config = ScrapeConfig::new(&options.industry);
    config.max_profiles = options.max_profiles;
    config.concurrency = options.concurrency;
    if options.resume {
        let known = db
            .visited_urls()
            .context("loading previously scraped URLs")?;
        info!(known = known.len(), "resuming from existing row store");
        config.seed_visited = known.into_iter().collect();
    }

    let session_config = SessionConfig {
        navigation_timeout_ms: options.settings.navigation_timeout_ms,
        headless: options.headless,
        proxy: options.proxy.clone(),
        login_cookie: options.login_cookie.clone(),
        user_agents_file: options.settings.user_agents_file.clone(),
        ..SessionConfig::default()
    };
    let factory = SessionFactory::launch(session_config)
        .await
        .context("launching browser")?;

    let session_id = db
        .create_session(&options.industry, options.max_profiles)
        .context("recording scrape session")?;

    let progress = options.show_progress.then(spinner);
    let mut stream = Scraper::new(config, Arc::new(factory)).run();

    let consumed = async {
        let mut scraped = 0usize;
        let mut cancelled = false;
        loop {
            tokio::select! {
                next = stream.next() => {
                    let Some(profile) = next else { break };
                    db.insert_profile(&profile)
                        .with_context(|| format!("storing profile {}", profile.id))?;
                    exporter
                        .append(&profile)
                        .with_context(|| format!("exporting profile {}", profile.id))?;
                    scraped += 1;
                    if let Some(bar) = &progress {
                        bar.set_message(format!("{scraped} profiles scraped"));
                        bar.tick();
                    }
                }
                _ = tokio::signal::ctrl_c() => {
                    warn!("interrupted, stopping scrape");
                    cancelled = true;
                    break;
                }
            }
        }
        Ok::<_, anyhow::Error>((scraped, cancelled))
    }
    .await;

    let (scraped, cancelled) = match consumed {
        Ok(outcome) => outcome,
        Err(e) => {
            db.fail_session(&session_id)
                .context("marking scrape session failed")?;
            return Err(e);
        }
    };

    if let Some(bar) = &progress {
        bar.finish_with_message(format!("{scraped} profiles scraped"));
    }
    if cancelled {
        db.cancel_session(&session_id, scraped)
            .context("marking scrape session cancelled")?;
    } else {
        db.complete_session(&session_id, scraped)
            .context("marking scrape session complete")?;
    }
    info!(scraped, cancelled, "scrape finished");

    Ok(ScrapeSummary {
        session_id,
        scraped,
        cancelled,
        db_path,
        csv_path,
    })
}

fn spinner() -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap(),
    );
    bar.set_message("Starting scrape...");
    bar
}
