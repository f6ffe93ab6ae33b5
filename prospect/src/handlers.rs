use clap::ArgMatches;
use colored::Colorize;
use prospect_core::scrape::{ScrapeOptions, execute_scrape};
use prospect_core::settings::Settings;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

const DEFAULT_USER_AGENTS: &str = include_str!("../useragents/default.txt");

/// Expand `~` in a user-supplied path.
pub fn expand_path(raw: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(raw).as_ref())
}

/// Assemble scrape options from parsed CLI arguments plus the environment
/// settings, read once here.
pub fn scrape_options_from_matches(matches: &ArgMatches) -> ScrapeOptions {
    ScrapeOptions {
        industry: matches.get_one::<String>("industry").unwrap().clone(),
        max_profiles: *matches.get_one::<usize>("max-profiles").unwrap(),
        concurrency: *matches.get_one::<usize>("concurrency").unwrap(),
        proxy: matches.get_one::<String>("proxy").cloned(),
        login_cookie: matches.get_one::<String>("login-cookie").cloned(),
        resume: matches.get_flag("resume"),
        headless: *matches.get_one::<bool>("headless").unwrap(),
        outdir: expand_path(matches.get_one::<String>("outdir").unwrap()),
        settings: Settings::from_env(),
        show_progress: true,
    }
}

fn print_divider() {
    println!("{}", "═".repeat(60).bright_blue().bold());
}

fn print_prompt(msg: &str) -> String {
    print!("{} ", msg.bright_cyan().bold());
    io::stdout().flush().unwrap();
    let mut response = String::new();
    io::stdin().read_line(&mut response).unwrap();
    response.trim().to_lowercase()
}

pub fn handle_init(args: &ArgMatches) {
    print_divider();
    println!("{}", "  PROSPECT INITIALIZATION".bright_white().bold());
    print_divider();
    println!();

    let config_path = args.get_one::<String>("PATH").unwrap();
    let force = args.get_flag("force");
    let config_dir = expand_path(config_path);
    let (useragents_dir, useragents_path) = config_asset_paths(&config_dir);

    println!("{} Parsed arguments", "✓".green().bold());
    println!(
        "{} Target: {}",
        "→".blue(),
        config_dir.display().to_string().bright_white()
    );
    println!();

    if useragents_path.exists() && !force {
        println!("{}", "⚠ WARNING".yellow().bold());
        println!("A user-agent list already exists:");
        println!(
            "  {} {}",
            "•".yellow(),
            useragents_path.display().to_string().bright_white()
        );
        println!();

        let response = print_prompt("Overwrite it? [y/N]:");
        println!();

        if response != "y" && response != "yes" {
            println!("{} Initialization cancelled.", "✗".red().bold());
            return;
        }
    }

    println!("{} Creating directory structure...", "→".blue());
    fs::create_dir_all(&config_dir).expect("Failed to create config directory");
    fs::create_dir_all(&useragents_dir).expect("Failed to create useragents directory");
    println!(
        "  {} {}",
        "✓".green(),
        config_dir.display().to_string().bright_white()
    );

    println!("{} Installing default user-agent list...", "→".blue());
    fs::write(&useragents_path, DEFAULT_USER_AGENTS).expect("Failed to write user-agent list");
    let line_count = DEFAULT_USER_AGENTS.lines().count();
    println!(
        "  {} {} ({} entries)",
        "✓".green().bold(),
        useragents_path.display().to_string().bright_white(),
        line_count.to_string().cyan()
    );

    println!();
    print_divider();
    println!("{}", "  INITIALIZATION COMPLETE".green().bold());
    print_divider();
    println!();
    println!(
        "{} Point {} at {} to extend the rotation pool.",
        "ℹ".blue(),
        prospect_core::settings::ENV_USER_AGENTS_FILE.bright_white(),
        useragents_path.display().to_string().bright_white()
    );
    println!();
}

pub async fn handle_scrape(sub_matches: &ArgMatches) {
    // Initialize tracing for logging
    tracing_subscriber::fmt::init();

    let options = scrape_options_from_matches(sub_matches);

    println!("\n🔍 Scraping '{}' profiles", options.industry);
    println!("Workers: {}", options.concurrency);
    println!("Max profiles: {}", options.max_profiles);
    println!("Output: {}", options.outdir.display());
    if options.resume {
        println!("Resume: skipping profiles already stored");
    }
    if let Some(proxy) = &options.proxy {
        println!("Proxy: {proxy}");
    }
    println!();

    match execute_scrape(options).await {
        Ok(summary) => {
            println!();
            if summary.cancelled {
                println!("{} Scrape interrupted", "⚠".yellow().bold());
            } else {
                println!("{} Scrape complete!", "✓".green().bold());
            }
            println!(
                "{} Profiles scraped: {}",
                "✓".green().bold(),
                summary.scraped.to_string().bright_white()
            );
            println!(
                "{} Row store: {}",
                "✓".green().bold(),
                summary.db_path.display().to_string().bright_white()
            );
            println!(
                "{} CSV export: {}",
                "✓".green().bold(),
                summary.csv_path.display().to_string().bright_white()
            );
            println!();
        }
        Err(e) => {
            eprintln!("✗ Scrape failed: {e:#}");
            std::process::exit(1);
        }
    }
}

/// Locations of the configuration assets under a config directory.
pub fn config_asset_paths(config_dir: &Path) -> (PathBuf, PathBuf) {
    let useragents_dir = config_dir.join("useragents");
    let useragents_path = useragents_dir.join("default.txt");
    (useragents_dir, useragents_path)
}
