// Include CLI modules directly so integration tests can exercise them
#[path = "commands.rs"]
pub mod commands;
#[path = "handlers.rs"]
pub mod handlers;

// Re-export commonly used handler functions for convenience
pub use handlers::{config_asset_paths, expand_path, scrape_options_from_matches};

// Re-export scrape orchestration from prospect-core
pub use prospect_core::scrape::{ScrapeOptions, ScrapeSummary, execute_scrape};
